// pagekeep/src/cli/mod.rs
use crate::cli::args::{Cli, Commands};
use crate::cli::error::{CliError, CliResult};
use crate::config::Settings;
use crate::infrastructure::di::ServiceContainer;
use std::io;

pub mod args;
pub mod commands;
pub mod completion;
pub mod display;
pub mod error;

pub async fn execute_command(cli: Cli, settings: &Settings) -> CliResult<()> {
    if cli.generate_config {
        println!("{}", crate::config::generate_default_config());
        return Ok(());
    }
    let Some(command) = cli.command else {
        return Ok(());
    };
    if let Commands::Completion { shell } = &command {
        return handle_completion(shell);
    }

    let services = ServiceContainer::new(settings)
        .map_err(|e| CliError::Application(e.context("Failed to create service container")))?;

    match command {
        Commands::Save { url, title, raw } => commands::save(&services, &url, title, raw).await,
        Commands::Clone { url } => commands::clone(&services, &url).await,
        Commands::List { is_json } => commands::list(&services, is_json).await,
        Commands::Open { index } => commands::open(&services, index).await,
        Commands::Clear { yes } => commands::clear(&services, yes).await,
        Commands::Serve => commands::serve(&services).await,
        Commands::Completion { .. } => Ok(()),
    }
}

fn handle_completion(shell: &str) -> CliResult<()> {
    match shell.to_lowercase().as_str() {
        "bash" => {
            eprintln!("# Outputting bash completion script for pagekeep");
            eprintln!("# To use: eval \"$(pagekeep completion bash)\"");
        }
        "zsh" => {
            eprintln!("# Outputting zsh completion script for pagekeep");
            eprintln!("# To use: pagekeep completion zsh > ~/.zfunc/_pagekeep");
        }
        "fish" => {
            eprintln!("# Outputting fish completion script for pagekeep");
            eprintln!("# To use: pagekeep completion fish | source");
        }
        _ => {}
    }

    completion::generate_completion(shell, &mut io::stdout())
        .map_err(|e| CliError::CommandFailed(format!("Failed to generate completion: {}", e)))
}
