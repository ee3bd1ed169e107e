//! LLM provider implementations for TfPilot.
//!
//! All providers implement the `tfpilot_core::Provider` trait.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;

use std::sync::Arc;
use std::time::Duration;
use tfpilot_config::AppConfig;
use tfpilot_core::{Error, Provider};
use tracing::info;

/// Build the configured provider.
///
/// A missing model or base URL is a configuration error: there is nothing to
/// send a query to.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, Error> {
    let provider = &config.provider;

    if provider.model.trim().is_empty() {
        return Err(Error::config("No model configured (set provider.model or TFPILOT_MODEL)"));
    }
    if provider.base_url.trim().is_empty() {
        return Err(Error::config(
            "No provider base URL configured (set provider.base_url or TFPILOT_BASE_URL)",
        ));
    }

    let built = OpenAiCompatProvider::new(
        provider.name.clone(),
        provider.base_url.clone(),
        provider.api_key.clone(),
        Duration::from_secs(provider.timeout_secs),
    )?;

    info!(provider = %provider.name, model = %provider.model, "Provider ready");
    Ok(Arc::new(built))
}
