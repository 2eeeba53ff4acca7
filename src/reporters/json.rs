//! JSON reporter
//!
//! Outputs the export artifact as pretty-printed JSON. The same shape is
//! written by `repolens export`.

use crate::models::{HealthModel, NarrativeResult};
use anyhow::Result;
use serde::Serialize;

/// The exported pair: deterministic model plus narrative
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport<'a> {
    pub model: &'a HealthModel,
    #[serde(rename = "aiAnalysis")]
    pub narrative: &'a NarrativeResult,
}

impl<'a> AuditReport<'a> {
    pub fn new(model: &'a HealthModel, narrative: &'a NarrativeResult) -> Self {
        Self { model, narrative }
    }
}

/// Render report as JSON
pub fn render(audit: &AuditReport<'_>) -> Result<String> {
    Ok(serde_json::to_string_pretty(audit)?)
}

/// `repolens-audit-{name}.json`
pub fn export_file_name(model: &HealthModel) -> String {
    format!("repolens-audit-{}.json", model.repo().name)
}
