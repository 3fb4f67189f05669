// pagekeep/src/cli/commands.rs
use crate::cli::display::{clear_failures, write_catalog};
use crate::cli::error::{CliError, CliResult};
use crate::domain::capture::CaptureMode;
use crate::infrastructure::di::ServiceContainer;
use crate::util::helper::confirm;
use crossterm::style::Stylize;
use std::io::{self, Write};
use tokio::io::BufReader;
use tracing::{info, instrument};

pub const SAVING: &str = "Saving page...";
pub const SAVED: &str = "Page saved successfully!";
pub const CLEARING: &str = "Clearing saved pages...";
pub const CLEARED: &str = "All pages cleared!";

#[instrument(skip(services), level = "debug")]
pub async fn save(
    services: &ServiceContainer,
    url: &str,
    title: Option<String>,
    raw: bool,
) -> CliResult<()> {
    eprintln!("{}", SAVING);

    let tab = services.tab_host.open_tab(url).await?;
    let title = title.unwrap_or_else(|| tab.title.clone());
    let mode = if raw { CaptureMode::Raw } else { CaptureMode::Rich };

    let download_id = services
        .capture_service
        .capture(mode, tab.id, &tab.url, &title)
        .await?;

    info!("{} capture of {} stored as download {}", mode, tab.url, download_id);
    eprintln!("{}", SAVED.green());
    Ok(())
}

#[instrument(skip(services), level = "debug")]
pub async fn clone(services: &ServiceContainer, url: &str) -> CliResult<()> {
    let tab = services.tab_host.open_tab(url).await?;
    let clone = services.capture_service.clone_page(tab.id).await?;
    eprintln!("Cloned {} into tab {}", tab.url, clone);
    Ok(())
}

#[instrument(skip(services), level = "debug")]
pub async fn list(services: &ServiceContainer, is_json: bool) -> CliResult<()> {
    let entries = services.catalog_service.list().await?;
    write_catalog(&mut io::stdout().lock(), &entries, is_json)
}

#[instrument(skip(services), level = "debug")]
pub async fn open(services: &ServiceContainer, index: usize) -> CliResult<()> {
    if index == 0 {
        return Err(CliError::InvalidInput(
            "entries are numbered from 1".to_string(),
        ));
    }
    let entry = services.catalog_service.reveal(index - 1).await?;
    eprintln!("Opened {}", entry.label());
    Ok(())
}

#[instrument(skip(services), level = "debug")]
pub async fn clear(services: &ServiceContainer, yes: bool) -> CliResult<()> {
    if !yes && !confirm("Delete all saved pages and their files?") {
        return Err(CliError::OperationAborted);
    }
    eprintln!("{}", CLEARING);

    let report = services.catalog_service.clear_all().await?;
    if let Some(summary) = clear_failures(&report) {
        eprintln!("{}", summary.yellow());
    }
    eprintln!("{}", CLEARED.green());
    Ok(())
}

/// Runs the messaging loop on stdin/stdout until stdin closes.
#[instrument(skip(services), level = "debug")]
pub async fn serve(services: &ServiceContainer) -> CliResult<()> {
    let router = services.message_router();
    let handled = router
        .serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await?;
    info!("Served {} requests", handled);
    io::stdout().flush()?;
    Ok(())
}
