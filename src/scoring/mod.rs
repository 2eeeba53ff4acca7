//! Health Scoring
//!
//! Turns a [`FactSheet`] into three dimension scores and an overall score.
//! Scoring is a pure function of the fact sheet: no clock, no I/O.
//!
//! # Scoring Formula
//!
//! ```text
//! documentation = 70 × README + 30 × ADR
//! testing       = 80 × tests + 20 × (tests ∧ framework)
//! architecture  = min(100, 50 + 25 × any_tag + 25 × containerized)
//! overall       = round((documentation + testing + architecture) / 3)
//! ```
//!
//! # Severity Tiers
//!
//! | Dimension     | Healthy | Moderate | Risk  |
//! |---------------|---------|----------|-------|
//! | documentation | > 70    | > 30     | else  |
//! | testing       | > 70    | > 0      | else  |
//! | architecture  | > 75    | else     | never |

use crate::analyzer::CONTAINERIZED;
use crate::models::{Dimension, DimensionScore, FactSheet, Priority, Scoring, Severity};
use std::collections::BTreeMap;
use tracing::debug;

const README_POINTS: u8 = 70;
const ADR_POINTS: u8 = 30;
const TESTS_POINTS: u8 = 80;
const FRAMEWORK_POINTS: u8 = 20;
const ARCHITECTURE_BASE: u8 = 50;
const PATTERN_POINTS: u8 = 25;
const CONTAINER_POINTS: u8 = 25;

/// Score every dimension of `facts`
pub fn score(facts: &FactSheet) -> Scoring {
    let mut dimensions = BTreeMap::new();
    dimensions.insert(Dimension::Documentation, documentation(facts));
    dimensions.insert(Dimension::Testing, testing(facts));
    dimensions.insert(Dimension::Architecture, architecture(facts));

    let total: u32 = dimensions.values().map(|d| u32::from(d.score)).sum();
    let overall = (f64::from(total) / dimensions.len() as f64).round() as u8;

    debug!(
        "Scores: documentation={}, testing={}, architecture={}, overall={}",
        dimensions[&Dimension::Documentation].score,
        dimensions[&Dimension::Testing].score,
        dimensions[&Dimension::Architecture].score,
        overall
    );

    Scoring {
        dimensions,
        overall,
    }
}

fn documentation(facts: &FactSheet) -> DimensionScore {
    let mut score = 0;
    if facts.docs_health.has_readme {
        score += README_POINTS;
    }
    if facts.docs_health.has_adr {
        score += ADR_POINTS;
    }

    DimensionScore {
        score,
        severity: if score > 70 {
            Severity::Healthy
        } else if score > 30 {
            Severity::Moderate
        } else {
            Severity::Risk
        },
        explanation: if score == 100 {
            "Comprehensive documentation found.".to_string()
        } else {
            "Missing key documentation like ADRs or README.".to_string()
        },
        priority: if score > 70 {
            Priority::Low
        } else {
            Priority::High
        },
    }
}

fn testing(facts: &FactSheet) -> DimensionScore {
    let posture = &facts.test_posture;
    let mut score = 0;
    if posture.has_tests {
        score += TESTS_POINTS;
        if !posture.frameworks.is_empty() {
            score += FRAMEWORK_POINTS;
        }
    }

    DimensionScore {
        score,
        severity: if score > 70 {
            Severity::Healthy
        } else if score > 0 {
            Severity::Moderate
        } else {
            Severity::Risk
        },
        explanation: if posture.has_tests {
            "Test presence detected.".to_string()
        } else {
            "No automated tests detected in the repository tree.".to_string()
        },
        priority: if score > 50 {
            Priority::Medium
        } else {
            Priority::High
        },
    }
}

fn architecture(facts: &FactSheet) -> DimensionScore {
    let arch = &facts.architecture;
    let mut score = ARCHITECTURE_BASE;
    if !arch.patterns.is_empty() {
        score += PATTERN_POINTS;
    }
    if arch.has_pattern(CONTAINERIZED) {
        score += CONTAINER_POINTS;
    }
    let score = score.min(100);

    DimensionScore {
        score,
        severity: if score > 75 {
            Severity::Healthy
        } else {
            Severity::Moderate
        },
        explanation: "Basic structural patterns identified.".to_string(),
        priority: Priority::Low,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RepoRef;

    fn facts(readme: bool, adr: bool, tests: bool, framework: bool, tags: &[&str]) -> FactSheet {
        let mut facts = FactSheet::new(RepoRef::parse("https://github.com/a/b").unwrap());
        facts.docs_health.has_readme = readme;
        facts.docs_health.has_adr = adr;
        facts.test_posture.has_tests = tests;
        if framework {
            facts.test_posture.frameworks.push("Jest".to_string());
        }
        facts.architecture.patterns = tags.iter().map(|t| t.to_string()).collect();
        facts
    }

    #[test]
    fn test_example_scores() {
        let scoring = score(&facts(true, false, false, false, &[]));
        assert_eq!(scoring.dimensions[&Dimension::Documentation].score, 70);
        assert_eq!(scoring.dimensions[&Dimension::Testing].score, 0);
        assert_eq!(scoring.dimensions[&Dimension::Architecture].score, 50);
        assert_eq!(scoring.overall, 40);
    }

    #[test]
    fn test_documentation_tiers() {
        let readme_only = documentation(&facts(true, false, false, false, &[]));
        assert_eq!(readme_only.severity, Severity::Moderate);
        assert_eq!(readme_only.priority, Priority::High);

        let adr_only = documentation(&facts(false, true, false, false, &[]));
        assert_eq!(adr_only.score, 30);
        assert_eq!(adr_only.severity, Severity::Risk);

        let full = documentation(&facts(true, true, false, false, &[]));
        assert_eq!(full.severity, Severity::Healthy);
        assert_eq!(full.priority, Priority::Low);
        assert_eq!(full.explanation, "Comprehensive documentation found.");
    }

    #[test]
    fn test_framework_without_tests_scores_zero() {
        let scored = testing(&facts(false, false, false, true, &[]));
        assert_eq!(scored.score, 0);
        assert_eq!(scored.severity, Severity::Risk);
        assert_eq!(scored.priority, Priority::High);

        let scored = testing(&facts(false, false, true, false, &[]));
        assert_eq!(scored.score, 80);
        assert_eq!(scored.severity, Severity::Healthy);
        assert_eq!(scored.priority, Priority::Medium);
    }

    #[test]
    fn test_architecture_containerized() {
        assert_eq!(architecture(&facts(false, false, false, false, &["MVC Pattern"])).score, 75);
        let scored = architecture(&facts(false, false, false, false, &[CONTAINERIZED]));
        assert_eq!(scored.score, 100);
        assert_eq!(scored.severity, Severity::Healthy);
    }

    #[test]
    fn test_all_combinations_in_range_and_stable() {
        let tag_sets: [&[&str]; 3] = [&[], &["Service Layer"], &["MVC Pattern", CONTAINERIZED]];
        for bits in 0..16u8 {
            for tags in tag_sets {
                let f = facts(bits & 1 != 0, bits & 2 != 0, bits & 4 != 0, bits & 8 != 0, tags);
                let first = score(&f);
                assert_eq!(first, score(&f));

                let docs = first.dimensions[&Dimension::Documentation].score;
                let tests = first.dimensions[&Dimension::Testing].score;
                let arch = first.dimensions[&Dimension::Architecture].score;
                assert!([0, 30, 70, 100].contains(&docs));
                assert!([0, 80, 100].contains(&tests));
                assert!([50, 75, 100].contains(&arch));
                assert!(first.overall <= 100);
                assert!(first.dimensions.len() == 3);
            }
        }
    }
}
