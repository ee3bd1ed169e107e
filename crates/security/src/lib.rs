//! Security module for TfPilot: filesystem confinement for generated files.
//!
//! Provides:
//! - **Path confinement**: model-supplied relative paths must resolve inside
//!   the workspace root they are written to

pub mod path;

pub use path::{PathValidationError, confine, is_within, normalize};
