//! Status command - show stored state and configuration

use crate::ai::LlmBackend;
use crate::config::UserConfig;
use crate::session::Session;
use crate::state::{FileStateStore, Slot};
use anyhow::{Context, Result};
use console::style;

/// Run the status command
pub fn run() -> Result<()> {
    let store = FileStateStore::open_default().context("Failed to open state directory")?;
    let config = UserConfig::load()?;

    println!("\nRepoLens Status\n");
    println!("  Data: {}", style(store.dir().display()).dim());
    if let Some(path) = UserConfig::user_config_path() {
        println!("  Config: {}", style(path.display()).dim());
    }
    println!();

    let model_path = store.path(Slot::Model);
    let session = Session::open(store);

    match session.results() {
        Some((model, _)) => {
            println!("  {} Last audit", style("[OK]").green());
            println!(
                "      {} scored {} on {}",
                style(model.repo().full_name()).cyan(),
                style(model.overall_score).cyan(),
                model.timestamp.format("%Y-%m-%d %H:%M UTC")
            );
        }
        None if model_path.exists() => {
            println!(
                "  {} Saved audit is incomplete or unreadable. Run {}",
                style("[!!]").yellow(),
                style("repolens clear").cyan()
            );
        }
        None => {
            println!(
                "  {} No audit yet. Run {}",
                style("[--]").dim(),
                style("repolens scan <url>").cyan()
            );
        }
    }

    let token = session.token()?;
    if token.is_some() {
        println!("  {} GitHub token stored", style("[OK]").green());
    } else if config.github_token().is_some() {
        println!("  {} GitHub token from config/environment", style("[OK]").green());
    } else {
        println!(
            "  {} No GitHub token (60 requests/hour limit)",
            style("[--]").dim()
        );
    }

    match config.backend() {
        Ok(backend) => {
            let ready = !backend.requires_api_key() || config.api_key(backend).is_some();
            let model = config
                .ai
                .model
                .clone()
                .unwrap_or_else(|| backend.default_model().to_string());
            if ready {
                println!(
                    "  {} AI backend {} ({})",
                    style("[OK]").green(),
                    style(backend).cyan(),
                    model
                );
            } else {
                println!(
                    "  {} AI backend {} needs {}",
                    style("[!!]").yellow(),
                    style(backend).cyan(),
                    backend.env_key()
                );
            }
        }
        Err(e) => {
            println!("  {} {}", style("[!!]").yellow(), e);
            let names: Vec<&str> = LlmBackend::ALL.iter().map(|b| b.name()).collect();
            println!("      valid backends: {}", names.join(", "));
        }
    }

    println!();
    Ok(())
}
