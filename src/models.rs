//! Core data models for RepoLens
//!
//! These models are shared by the analyzer, the scorer, the narrative
//! adapter and the session. Field names serialize in camelCase so the
//! persisted state and the export artifact keep one stable JSON shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Raised when a repository URL cannot be resolved to an owner/name pair
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepoUrlError {
    #[error("Invalid repository URL '{url}': {reason}")]
    Unparseable { url: String, reason: String },

    #[error("Invalid repository URL format. Use https://github.com/owner/repo")]
    MissingSegments,
}

/// A repository resolved from a user-supplied URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
    /// Host name of the web URL, e.g. `github.com`
    pub host: String,
    /// The URL exactly as supplied
    pub url: String,
}

impl RepoRef {
    /// Resolve owner and name from the first two path segments of `url`.
    pub fn parse(url: &str) -> Result<Self, RepoUrlError> {
        let parsed = url::Url::parse(url.trim()).map_err(|e| RepoUrlError::Unparseable {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|s| s.filter(|p| !p.is_empty()).collect())
            .unwrap_or_default();

        if segments.len() < 2 {
            return Err(RepoUrlError::MissingSegments);
        }

        let name = segments[1].strip_suffix(".git").unwrap_or(segments[1]);

        Ok(Self {
            owner: segments[0].to_string(),
            name: name.to_string(),
            host: parsed.host_str().unwrap_or_default().to_string(),
            url: url.to_string(),
        })
    }

    /// `owner/name`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Kind of a tree entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    File,
    Dir,
}

/// One entry of the recursive repository listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: FileKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl FileEntry {
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: FileKind::File,
            size: None,
        }
    }

    pub fn dir(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: FileKind::Dir,
            size: None,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Dir
    }

    /// Last path segment
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DependencyStatus {
    #[default]
    Current,
    Outdated,
    Critical,
}

/// One manifest entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    pub name: String,
    pub version: String,
    pub ecosystem: String,
    #[serde(default)]
    pub status: DependencyStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_known: Option<String>,
}

/// HTTP-method-like tag attached to an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Wss,
}

impl Method {
    /// Methods a route file can export, in detection order
    pub const ROUTE_METHODS: [Method; 5] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Delete,
        Method::Patch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Wss => "WSS",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointKind {
    Rest,
    Websocket,
    Graphql,
    Rpc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub path: String,
    pub methods: Vec<Method>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<String>,
    #[serde(rename = "type")]
    pub kind: EndpointKind,
}

/// Outcome of reading the runtime manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestStatus {
    /// Manifest fetched and parsed
    Parsed,
    /// Manifest listed but its content could not be fetched
    Unavailable,
    /// Manifest fetched but not valid for its format
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeInfo {
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// `None` when no known manifest exists in the tree
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<ManifestStatus>,
}

impl Default for RuntimeInfo {
    fn default() -> Self {
        Self {
            language: "Unknown".to_string(),
            version: None,
            manifest: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestPosture {
    pub has_tests: bool,
    pub frameworks: Vec<String>,
    pub signal: String,
}

impl Default for TestPosture {
    fn default() -> Self {
        Self {
            has_tests: false,
            frameworks: Vec::new(),
            signal: "None detected".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchitectureInfo {
    /// Tags in detection order; repeats are kept
    pub patterns: Vec<String>,
    pub entry_points: Vec<String>,
    pub components: Vec<String>,
    pub description: String,
}

impl ArchitectureInfo {
    pub fn has_pattern(&self, tag: &str) -> bool {
        self.patterns.iter().any(|p| p == tag)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiInventory {
    pub endpoints: Vec<Endpoint>,
    pub documentation: Vec<String>,
    pub specs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocsHealth {
    pub has_readme: bool,
    #[serde(rename = "hasADR")]
    pub has_adr: bool,
    pub missing: Vec<String>,
}

/// Deterministic analyzer output, before scoring
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactSheet {
    pub repo: RepoRef,
    pub runtime: RuntimeInfo,
    pub dependencies: Vec<Dependency>,
    pub test_posture: TestPosture,
    pub architecture: ArchitectureInfo,
    pub api_inventory: ApiInventory,
    pub docs_health: DocsHealth,
}

impl FactSheet {
    /// Empty fact sheet for `repo`
    pub fn new(repo: RepoRef) -> Self {
        Self {
            repo,
            runtime: RuntimeInfo::default(),
            dependencies: Vec::new(),
            test_posture: TestPosture::default(),
            architecture: ArchitectureInfo::default(),
            api_inventory: ApiInventory::default(),
            docs_health: DocsHealth::default(),
        }
    }
}

/// Named axis of the health score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Documentation,
    Testing,
    Architecture,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [
        Dimension::Documentation,
        Dimension::Testing,
        Dimension::Architecture,
    ];
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dimension::Documentation => write!(f, "documentation"),
            Dimension::Testing => write!(f, "testing"),
            Dimension::Architecture => write!(f, "architecture"),
        }
    }
}

/// Severity tier derived from a dimension score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Healthy,
    Moderate,
    Risk,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Healthy => write!(f, "Healthy"),
            Severity::Moderate => write!(f, "Moderate"),
            Severity::Risk => write!(f, "Risk"),
            Severity::Critical => write!(f, "Critical"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(f, "High"),
            Priority::Medium => write!(f, "Medium"),
            Priority::Low => write!(f, "Low"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub score: u8,
    pub severity: Severity,
    pub explanation: String,
    pub priority: Priority,
}

/// Scorer output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scoring {
    pub dimensions: BTreeMap<Dimension, DimensionScore>,
    pub overall: u8,
}

/// Fact sheet plus scores; the unit that is persisted and exported
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthModel {
    #[serde(flatten)]
    pub facts: FactSheet,
    pub scoring: BTreeMap<Dimension, DimensionScore>,
    pub overall_score: u8,
    pub timestamp: DateTime<Utc>,
}

impl HealthModel {
    pub fn new(facts: FactSheet, scoring: Scoring, timestamp: DateTime<Utc>) -> Self {
        Self {
            facts,
            scoring: scoring.dimensions,
            overall_score: scoring.overall,
            timestamp,
        }
    }

    pub fn repo(&self) -> &RepoRef {
        &self.facts.repo
    }

    pub fn dimension(&self, dimension: Dimension) -> Option<&DimensionScore> {
        self.scoring.get(&dimension)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutdatedDependency {
    pub name: String,
    pub current: String,
    pub latest: String,
    pub impact: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyInsights {
    pub outdated: Vec<OutdatedDependency>,
}

/// Narrative produced by the language model, kept beside the HealthModel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeResult {
    pub behavioral_summary: String,
    pub executive_summary: String,
    pub risk_prioritization: Vec<String>,
    pub architectural_explanation: String,
    pub recommendations: Vec<String>,
    pub dependency_insights: DependencyInsights,
}
