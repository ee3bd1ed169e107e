//! `tfpilot history`: recent turns for a workspace.

use super::{CliResult, load_config, resolve_workspace};
use std::path::{Path, PathBuf};
use tfpilot_agent::context::workspace::workspace_key;

pub async fn run(config_path: Option<&Path>, workspace: Option<PathBuf>, limit: usize) -> CliResult<()> {
    let config = load_config(config_path)?;
    let workspace = resolve_workspace(workspace)?;

    let Some(store) = tfpilot_memory::build_store(&config.memory).await? else {
        println!("History is disabled (memory backend is \"none\").");
        return Ok(());
    };

    let key = workspace_key(workspace.as_deref());
    let turns = store.recent(&key, limit).await?;

    if turns.is_empty() {
        println!("No history yet.");
        return Ok(());
    }

    for turn in turns {
        println!(
            "[{}] {:>9}: {}",
            turn.created_at.format("%Y-%m-%d %H:%M:%S"),
            turn.role,
            turn.content
        );
    }
    Ok(())
}
