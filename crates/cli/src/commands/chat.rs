//! `tfpilot chat`: interactive session over stdin.

use super::{CliResult, Interrupts, build_assistant, load_config, resolve_workspace};
use std::io::Write;
use std::path::{Path, PathBuf};
use tfpilot_core::Error;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(config_path: Option<&Path>, workspace: Option<PathBuf>) -> CliResult<()> {
    let config = load_config(config_path)?;
    let workspace = resolve_workspace(workspace)?;
    let assistant = build_assistant(&config).await?;

    println!();
    println!("  TfPilot: Interactive Mode");
    println!();
    println!("  Provider:  {}", config.provider.name);
    println!("  Model:     {}", config.provider.model);
    match &workspace {
        Some(dir) => println!("  Workspace: {}", dir.display()),
        None => println!("  Workspace: (none, files will not be written)"),
    }
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'exit' or press Ctrl+C at the prompt to quit.");
    println!("  Ctrl+C while a reply streams cancels just that reply.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let interrupts = Interrupts::listen();

    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = interrupts.idle() => {
                println!();
                break;
            }
        };
        let Some(line) = line else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        println!();
        let cancel = interrupts.begin();
        let result = assistant
            .query(line, workspace.as_deref(), &mut stdout, &cancel)
            .await;
        interrupts.finish();
        println!();

        match result {
            Ok(outcome) => {
                for path in &outcome.written_paths {
                    eprintln!("  wrote {path}");
                }
            }
            Err(Error::Cancelled) => eprintln!("  [Cancelled]"),
            Err(e) => eprintln!("  [Error] {e}"),
        }
        println!();
    }

    println!();
    println!("  Goodbye!");
    Ok(())
}
