//! Text (terminal) reporter with colors and formatting

use super::AuditReport;
use crate::models::{Dimension, Severity};
use anyhow::Result;

/// Endpoints listed before the "...and N more" line
const ENDPOINT_LIMIT: usize = 10;

/// Severity colors (ANSI escape codes)
fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Healthy => "\x1b[32m",  // Green
        Severity::Moderate => "\x1b[33m", // Yellow
        Severity::Risk => "\x1b[91m",     // Light red
        Severity::Critical => "\x1b[31m", // Red
    }
}

/// Reset ANSI color
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Render an audit as formatted terminal output
pub fn render(audit: &AuditReport<'_>) -> Result<String> {
    let model = audit.model;
    let facts = &model.facts;
    let narrative = audit.narrative;
    let mut out = String::new();

    // Header
    out.push_str(&format!(
        "\n{BOLD}RepoLens Audit{RESET}  {}\n",
        model.repo().full_name()
    ));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));
    out.push_str(&format!(
        "Score: {}{BOLD}{}/100{RESET}  Runtime: {}",
        score_color(model.overall_score),
        model.overall_score,
        facts.runtime.language
    ));
    if let Some(version) = &facts.runtime.version {
        out.push_str(&format!(" ({})", version));
    }
    out.push_str(&format!(
        "  Dependencies: {}  Scanned: {}\n\n",
        facts.dependencies.len(),
        model.timestamp.format("%Y-%m-%d %H:%M UTC")
    ));

    // Dimensions
    out.push_str(&format!("{BOLD}DIMENSIONS{RESET}\n"));
    for dimension in Dimension::ALL {
        let Some(score) = model.dimension(dimension) else {
            continue;
        };
        let color = severity_color(score.severity);
        out.push_str(&format!(
            "  {:<14} {color}{:>3}  {:<8}{RESET}  {DIM}{} priority. {}{RESET}\n",
            dimension.to_string(),
            score.score,
            score.severity.to_string(),
            score.priority,
            score.explanation
        ));
    }
    out.push('\n');

    // Signals
    out.push_str(&format!("{BOLD}SIGNALS{RESET}\n"));
    let patterns = if facts.architecture.patterns.is_empty() {
        "none".to_string()
    } else {
        facts.architecture.patterns.join(", ")
    };
    out.push_str(&format!("  Patterns: {}\n", patterns));
    out.push_str(&format!("  Tests:    {}", facts.test_posture.signal));
    if !facts.test_posture.frameworks.is_empty() {
        out.push_str(&format!(" ({})", facts.test_posture.frameworks.join(", ")));
    }
    out.push('\n');
    if !facts.docs_health.missing.is_empty() {
        out.push_str(&format!(
            "  Missing:  {}\n",
            facts.docs_health.missing.join(", ")
        ));
    }
    out.push('\n');

    // Endpoints
    let endpoints = &facts.api_inventory.endpoints;
    out.push_str(&format!("{BOLD}ENDPOINTS{RESET} ({} total)\n", endpoints.len()));
    for endpoint in endpoints.iter().take(ENDPOINT_LIMIT) {
        let methods: Vec<&str> = endpoint.methods.iter().map(|m| m.as_str()).collect();
        out.push_str(&format!(
            "  {:<16} {}\n",
            methods.join(","),
            endpoint.path
        ));
    }
    let remaining = endpoints.len().saturating_sub(ENDPOINT_LIMIT);
    if remaining > 0 {
        out.push_str(&format!("  {DIM}...and {} more{RESET}\n", remaining));
    }
    out.push('\n');

    // Narrative
    section(&mut out, "EXECUTIVE SUMMARY", &narrative.executive_summary);
    section(&mut out, "BEHAVIOUR", &narrative.behavioral_summary);
    section(&mut out, "ARCHITECTURE", &narrative.architectural_explanation);
    list(&mut out, "RISKS", &narrative.risk_prioritization, false);
    list(&mut out, "RECOMMENDATIONS", &narrative.recommendations, true);

    let outdated = &narrative.dependency_insights.outdated;
    if !outdated.is_empty() {
        out.push_str(&format!("{BOLD}OUTDATED DEPENDENCIES{RESET}\n"));
        for dep in outdated {
            out.push_str(&format!(
                "  {} {} -> {}  {DIM}{}{RESET}\n",
                dep.name, dep.current, dep.latest, dep.impact
            ));
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "{DIM}Run `repolens export` to save the full audit as JSON.{RESET}\n"
    ));

    Ok(out)
}

fn section(out: &mut String, title: &str, body: &str) {
    if body.trim().is_empty() {
        return;
    }
    out.push_str(&format!("{BOLD}{title}{RESET}\n"));
    for line in body.lines() {
        out.push_str(&format!("  {}\n", line));
    }
    out.push('\n');
}

fn list(out: &mut String, title: &str, items: &[String], numbered: bool) {
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("{BOLD}{title}{RESET}\n"));
    for (i, item) in items.iter().enumerate() {
        if numbered {
            out.push_str(&format!("  {DIM}{:>2}.{RESET} {}\n", i + 1, item));
        } else {
            out.push_str(&format!("  - {}\n", item));
        }
    }
    out.push('\n');
}

/// Color for an overall score
fn score_color(score: u8) -> &'static str {
    if score >= 80 {
        "\x1b[32m"
    } else if score >= 60 {
        "\x1b[33m"
    } else {
        "\x1b[31m"
    }
}
