//! `tfpilot onboard`: first-time setup.

use super::{CliResult, config_file};
use std::path::Path;
use tfpilot_config::AppConfig;

pub async fn run(config_path: Option<&Path>) -> CliResult<()> {
    let config_path = config_file(config_path);

    println!("TfPilot: First-Time Setup");
    println!("==========================\n");

    if let Some(dir) = config_path.parent() {
        if !dir.exists() {
            std::fs::create_dir_all(dir)?;
            println!("Created config directory: {}", dir.display());
        }
    }

    if config_path.exists() {
        println!("Config already exists at: {}", config_path.display());
        println!("Edit it manually or delete it and re-run onboard.\n");
        return Ok(());
    }

    std::fs::write(&config_path, AppConfig::default_toml())?;
    println!("Created config.toml at: {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Point provider.base_url at your model server (Ollama by default)");
    println!("  2. Set provider.model, and an API key if the server needs one");
    println!("  3. Run: tfpilot ask \"explain terraform plan\"\n");

    Ok(())
}
