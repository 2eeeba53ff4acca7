//! Output reporters for RepoLens audits
//!
//! Supports two output formats:
//! - `text` - Terminal output with colors
//! - `json` - The export artifact: `{"model": ..., "aiAnalysis": ...}`

mod json;
mod text;

pub use json::{export_file_name, AuditReport};

use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!("Unknown format '{}'. Valid formats: text, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Render an audit in the specified format
pub fn report(audit: &AuditReport<'_>, format: &str) -> Result<String> {
    let fmt = OutputFormat::from_str(format)?;
    report_with_format(audit, fmt)
}

/// Render an audit using an OutputFormat enum
pub fn report_with_format(audit: &AuditReport<'_>, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(audit),
        OutputFormat::Json => json::render(audit),
    }
}
