// pagekeep/src/cli/display.rs
use crate::cli::error::{CliError, CliResult};
use crate::domain::catalog::{CatalogEntry, ClearReport, EMPTY_PLACEHOLDER};
use std::io::Write;

/// One row per entry, numbered from 1 as `open` expects; a single
/// placeholder row when nothing is saved.
pub fn catalog_rows(entries: &[CatalogEntry]) -> Vec<String> {
    if entries.is_empty() {
        return vec![EMPTY_PLACEHOLDER.to_string()];
    }
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| format!("{}: {}", i + 1, entry.label()))
        .collect()
}

pub fn write_catalog(out: &mut impl Write, entries: &[CatalogEntry], is_json: bool) -> CliResult<()> {
    if is_json {
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| CliError::Other(format!("Failed to serialize catalog: {}", e)))?;
        writeln!(out, "{}", json)?;
    } else {
        for row in catalog_rows(entries) {
            writeln!(out, "{}", row)?;
        }
    }
    Ok(())
}

/// Summary line for a clear-all run with failures, `None` when everything
/// was removed.
pub fn clear_failures(report: &ClearReport) -> Option<String> {
    if report.removal_failures == 0 && report.erase_failures == 0 {
        return None;
    }
    Some(format!(
        "{} of {} files could not be removed, {} of {} history records could not be erased",
        report.removal_failures, report.removal_attempts, report.erase_failures, report.erase_attempts
    ))
}
