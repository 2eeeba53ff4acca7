//! Narrative generation for scored repositories

use crate::ai::prompts::{response_schema, NarrativePromptBuilder, SYSTEM_INSTRUCTION};
use crate::ai::{AiError, AiResult, StructuredGenerator, StructuredRequest};
use crate::models::{HealthModel, NarrativeResult};
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, info};

/// Asks a [`StructuredGenerator`] for a [`NarrativeResult`]
pub struct Narrator<'a, G: StructuredGenerator + ?Sized> {
    generator: &'a G,
}

impl<'a, G: StructuredGenerator + ?Sized> Narrator<'a, G> {
    pub fn new(generator: &'a G) -> Self {
        Self { generator }
    }

    /// The request sent for `model`
    pub fn request(model: &HealthModel) -> StructuredRequest {
        StructuredRequest {
            system: SYSTEM_INSTRUCTION.to_string(),
            prompt: NarrativePromptBuilder::new(model).build(),
            schema: response_schema(),
        }
    }

    /// Generate the narrative for `model`. Single attempt, no retries.
    pub fn summarize(&self, model: &HealthModel) -> AiResult<NarrativeResult> {
        let request = Self::request(model);
        debug!("Narrative prompt is {} chars", request.prompt.len());

        let response = self.generator.generate_json(&request)?;
        let narrative = parse_narrative(&response)?;

        info!(
            "Narrative for {}: {} risks, {} recommendations",
            model.repo().full_name(),
            narrative.risk_prioritization.len(),
            narrative.recommendations.len()
        );
        Ok(narrative)
    }
}

/// Parse a response body, unwrapping a ```json fence if present
pub(crate) fn parse_narrative(response: &str) -> AiResult<NarrativeResult> {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    let fence = FENCE.get_or_init(|| {
        Regex::new(r"(?s)^\s*```(?:json)?\s*(.*?)\s*```\s*$").expect("valid regex")
    });

    let json_str = fence
        .captures(response)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(response);

    serde_json::from_str(json_str)
        .map_err(|e| AiError::Parse(format!("Failed to parse narrative JSON: {}", e)))
}
