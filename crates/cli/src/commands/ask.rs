//! `tfpilot ask`: one query, answer on stdout.

use super::{CliResult, Interrupts, build_assistant, load_config, resolve_workspace};
use std::path::{Path, PathBuf};
use tfpilot_core::Error;

pub async fn run(config_path: Option<&Path>, message: &str, workspace: Option<PathBuf>) -> CliResult<()> {
    let config = load_config(config_path)?;
    let workspace = resolve_workspace(workspace)?;
    let assistant = build_assistant(&config).await?;

    let interrupts = Interrupts::listen();
    let cancel = interrupts.begin();
    let mut stdout = tokio::io::stdout();
    let result = assistant
        .query(message, workspace.as_deref(), &mut stdout, &cancel)
        .await;
    interrupts.finish();

    match result {
        Ok(outcome) => {
            println!();
            if outcome.files_written {
                for path in &outcome.written_paths {
                    eprintln!("  wrote {path}");
                }
            }
            Ok(())
        }
        Err(Error::Cancelled) => {
            eprintln!("\n  Cancelled.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
