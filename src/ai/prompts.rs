//! Prompt and response schema for repository narratives

use crate::models::HealthModel;
use serde_json::json;

/// Endpoints included verbatim in the prompt
const ENDPOINT_SAMPLE: usize = 10;

pub const SYSTEM_INSTRUCTION: &str = "Output strictly JSON. Follow the Writing Style Guide: \
    professional tone, British English, no Oxford commas, no mid-sentence hyphens. \
    Avoid all structural labels in the output text.";

const STYLE_RULES: &str = "STRICT WRITING STYLE RULES:
- Tone: Professional, calm and clear.
- Voice: Straightforward and direct. Avoid labels like \"Context\", \"What/How/Why\", or \"Next Steps\".
- British English: Use British spelling such as optimise and normalisation.
- Punctuation: Do not use a comma before and. Do not use hyphens in the middle of sentences.
- Formatting: Bold key phrases. Use short paragraphs. Use lists for more than two items.";

/// Builds the user prompt for one health model
pub struct NarrativePromptBuilder<'a> {
    model: &'a HealthModel,
}

impl<'a> NarrativePromptBuilder<'a> {
    pub fn new(model: &'a HealthModel) -> Self {
        Self { model }
    }

    pub fn build(&self) -> String {
        let facts = &self.model.facts;
        let patterns = facts.architecture.patterns.join(", ");
        let endpoints = &facts.api_inventory.endpoints;
        let sample = &endpoints[..endpoints.len().min(ENDPOINT_SAMPLE)];

        format!(
            r#"As a World-Class Senior Staff Engineer, provide a clinical technical assessment of this repository.

Repo: "{name}" ({language})
Architecture Patterns: {patterns}
API Inventory: {endpoint_count} resolved endpoints.
Resolved Routes Sample: {sample}
Test Posture: {test_signal}
Dependencies: {dependency_count} entries.
Docs Health: {docs_health}

{style_rules}

REQUIRED ANALYSIS:
1. Behavioural summary: Define the core business purpose of this software.
2. Executive Summary: A factual technical audit of the current state.
3. Architecture Deep-Dive: A detailed explanation of component interaction and system flow based on patterns like {patterns}.
4. API Intelligence: Evaluate the design of detected routes. Identify RESTful compliance and potential security risks in methods like POST or DELETE. Mention WebSocket presence if detected.
5. Dependency Analysis: Identify technical risk and version lag.
6. Action Items: Factual, prioritised steps for health improvement."#,
            name = facts.repo.name,
            language = facts.runtime.language,
            patterns = patterns,
            endpoint_count = endpoints.len(),
            sample = serde_json::to_string(sample).unwrap_or_else(|_| "[]".to_string()),
            test_signal = facts.test_posture.signal,
            dependency_count = facts.dependencies.len(),
            docs_health = serde_json::to_string(&facts.docs_health).unwrap_or_default(),
            style_rules = STYLE_RULES,
        )
    }
}

/// JSON Schema of [`NarrativeResult`](crate::models::NarrativeResult)
pub fn response_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "behavioralSummary": { "type": "string" },
            "executiveSummary": { "type": "string" },
            "riskPrioritization": { "type": "array", "items": { "type": "string" } },
            "architecturalExplanation": { "type": "string" },
            "recommendations": { "type": "array", "items": { "type": "string" } },
            "dependencyInsights": {
                "type": "object",
                "properties": {
                    "outdated": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "name": { "type": "string" },
                                "current": { "type": "string" },
                                "latest": { "type": "string" },
                                "impact": { "type": "string" }
                            },
                            "required": ["name", "current", "latest", "impact"]
                        }
                    }
                },
                "required": ["outdated"]
            }
        },
        "required": [
            "behavioralSummary",
            "executiveSummary",
            "riskPrioritization",
            "architecturalExplanation",
            "recommendations",
            "dependencyInsights"
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Endpoint, EndpointKind, FactSheet, Method, RepoRef, Scoring};
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn model_with_endpoints(count: usize) -> HealthModel {
        let mut facts = FactSheet::new(RepoRef::parse("https://github.com/acme/shop").unwrap());
        facts.runtime.language = "Node.js".to_string();
        facts.architecture.patterns = vec!["MVC Pattern".into(), "Containerized".into()];
        facts.api_inventory.endpoints = (0..count)
            .map(|i| Endpoint {
                path: format!("/api/r{i}"),
                methods: vec![Method::Get],
                parameters: vec![],
                kind: EndpointKind::Rest,
            })
            .collect();
        let scoring = Scoring {
            dimensions: BTreeMap::new(),
            overall: 0,
        };
        HealthModel::new(facts, scoring, Utc::now())
    }

    #[test]
    fn test_prompt_lists_facts() {
        let model = model_with_endpoints(2);
        let prompt = NarrativePromptBuilder::new(&model).build();

        assert!(prompt.contains(r#"Repo: "shop" (Node.js)"#));
        assert!(prompt.contains("Architecture Patterns: MVC Pattern, Containerized"));
        assert!(prompt.contains("API Inventory: 2 resolved endpoints."));
        assert!(prompt.contains(r#"{"path":"/api/r0","methods":["GET"],"type":"rest"}"#));
        assert!(prompt.contains("Test Posture: None detected"));
        assert!(prompt.contains("Dependencies: 0 entries."));
        assert!(prompt.contains(r#""hasADR":false"#));
        assert!(prompt.contains("British English"));
    }

    #[test]
    fn test_prompt_samples_first_ten_endpoints() {
        let model = model_with_endpoints(12);
        let prompt = NarrativePromptBuilder::new(&model).build();

        assert!(prompt.contains("API Inventory: 12 resolved endpoints."));
        assert!(prompt.contains("/api/r9\""));
        assert!(!prompt.contains("/api/r10"));
    }

    #[test]
    fn test_schema_requires_every_field() {
        let schema = response_schema();
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 6);
        assert_eq!(
            schema["properties"]["dependencyInsights"]["required"][0],
            "outdated"
        );
    }
}
