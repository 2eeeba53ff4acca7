//! Show, export and clear the last audit

use crate::reporters::{self, export_file_name, AuditReport};
use crate::session::Session;
use crate::state::FileStateStore;
use anyhow::{bail, Context, Result};
use console::style;
use std::path::PathBuf;

fn open_session() -> Result<Session<FileStateStore>> {
    let store = FileStateStore::open_default().context("Failed to open state directory")?;
    Ok(Session::open(store))
}

fn no_results() -> anyhow::Error {
    anyhow::anyhow!("No saved audit. Run `repolens scan <url>` first.")
}

pub fn show(format: &str) -> Result<()> {
    let session = open_session()?;
    let Some((model, narrative)) = session.results() else {
        return Err(no_results());
    };
    println!(
        "{}",
        reporters::report(&AuditReport::new(model, narrative), format)?
    );
    Ok(())
}

pub fn export(output: Option<PathBuf>) -> Result<()> {
    let session = open_session()?;
    let Some((model, narrative)) = session.results() else {
        return Err(no_results());
    };

    let path = output.unwrap_or_else(|| PathBuf::from(export_file_name(model)));
    if path.is_dir() {
        bail!("{} is a directory", path.display());
    }
    let json = reporters::report(&AuditReport::new(model, narrative), "json")?;
    std::fs::write(&path, json)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!(
        "{} Exported {} to {}",
        style("[OK]").green(),
        style(model.repo().full_name()).cyan(),
        path.display()
    );
    Ok(())
}

pub fn clear() -> Result<()> {
    let mut session = open_session()?;
    session.clear()?;
    println!("{} Cleared last audit", style("[OK]").green());
    Ok(())
}
