//! Runtime manifest detection
//!
//! The first known manifest found at the repository root decides the runtime
//! language. Its dependency tables are merged by name with development
//! entries applied second, so they win on collision while the first
//! insertion position is kept.

use crate::models::{Dependency, DependencyStatus, FileEntry, ManifestStatus, RuntimeInfo};
use indexmap::IndexMap;
use serde::Deserialize;

/// Known manifests, in lookup order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    PackageJson,
    CargoToml,
}

impl ManifestKind {
    pub const ALL: [ManifestKind; 2] = [ManifestKind::PackageJson, ManifestKind::CargoToml];

    pub fn file_name(&self) -> &'static str {
        match self {
            ManifestKind::PackageJson => "package.json",
            ManifestKind::CargoToml => "Cargo.toml",
        }
    }

    pub fn language(&self) -> &'static str {
        match self {
            ManifestKind::PackageJson => "Node.js",
            ManifestKind::CargoToml => "Rust",
        }
    }

    pub fn ecosystem(&self) -> &'static str {
        match self {
            ManifestKind::PackageJson => "npm",
            ManifestKind::CargoToml => "crates.io",
        }
    }
}

/// Version constraint and merged dependency map of a manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedManifest {
    pub version: Option<String>,
    pub dependencies: IndexMap<String, String>,
}

/// First manifest whose path exactly matches a known file name
pub(super) fn find_manifest(tree: &[FileEntry]) -> Option<ManifestKind> {
    ManifestKind::ALL
        .into_iter()
        .find(|kind| tree.iter().any(|f| f.path == kind.file_name()))
}

/// Parse manifest content. Errors carry the parser's message.
pub fn parse_manifest(kind: ManifestKind, content: &str) -> Result<ParsedManifest, String> {
    match kind {
        ManifestKind::PackageJson => parse_package_json(content),
        ManifestKind::CargoToml => parse_cargo_toml(content),
    }
}

/// Runtime info and dependency list for a fetched manifest.
///
/// Empty content means the fetch failed; parse errors are swallowed. Both
/// leave the language set and the dependency list empty.
pub(super) fn read_manifest(kind: ManifestKind, content: &str) -> (RuntimeInfo, Vec<Dependency>) {
    let mut runtime = RuntimeInfo {
        language: kind.language().to_string(),
        version: None,
        manifest: Some(ManifestStatus::Unavailable),
    };

    if content.is_empty() {
        return (runtime, Vec::new());
    }

    match parse_manifest(kind, content) {
        Ok(parsed) => {
            runtime.version = parsed.version;
            runtime.manifest = Some(ManifestStatus::Parsed);
            let dependencies = parsed
                .dependencies
                .into_iter()
                .map(|(name, version)| Dependency {
                    name,
                    version,
                    ecosystem: kind.ecosystem().to_string(),
                    status: DependencyStatus::Current,
                    latest_known: None,
                })
                .collect();
            (runtime, dependencies)
        }
        Err(e) => {
            tracing::debug!("Ignoring unparseable {}: {}", kind.file_name(), e);
            runtime.manifest = Some(ManifestStatus::Invalid);
            (runtime, Vec::new())
        }
    }
}

/// Minimal package.json structure for parsing
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct PackageJson {
    engines: Option<serde_json::Value>,
    dependencies: Option<IndexMap<String, serde_json::Value>>,
    #[serde(rename = "devDependencies")]
    dev_dependencies: Option<IndexMap<String, serde_json::Value>>,
}

fn parse_package_json(content: &str) -> Result<ParsedManifest, String> {
    let pkg: PackageJson = serde_json::from_str(content).map_err(|e| e.to_string())?;

    let version = pkg
        .engines
        .as_ref()
        .and_then(|e| e.get("node"))
        .and_then(|v| v.as_str())
        .map(str::to_string);

    let mut dependencies = IndexMap::new();
    for table in [pkg.dependencies, pkg.dev_dependencies].into_iter().flatten() {
        for (name, spec) in table {
            let version = match spec {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            dependencies.insert(name, version);
        }
    }

    Ok(ParsedManifest {
        version,
        dependencies,
    })
}

/// Minimal Cargo.toml structure
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CargoToml {
    package: Option<CargoPackage>,
    dependencies: IndexMap<String, toml::Value>,
    #[serde(rename = "dev-dependencies")]
    dev_dependencies: IndexMap<String, toml::Value>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CargoPackage {
    #[serde(rename = "rust-version")]
    rust_version: Option<toml::Value>,
}

fn parse_cargo_toml(content: &str) -> Result<ParsedManifest, String> {
    let cargo: CargoToml = toml::from_str(content).map_err(|e| e.to_string())?;

    let version = cargo
        .package
        .and_then(|p| p.rust_version)
        .and_then(|v| v.as_str().map(str::to_string));

    let mut dependencies = IndexMap::new();
    for table in [cargo.dependencies, cargo.dev_dependencies] {
        for (name, spec) in table {
            dependencies.insert(name, cargo_requirement(&spec));
        }
    }

    Ok(ParsedManifest {
        version,
        dependencies,
    })
}

fn cargo_requirement(spec: &toml::Value) -> String {
    match spec {
        toml::Value::String(s) => s.clone(),
        toml::Value::Table(t) => {
            if t.get("workspace").and_then(|w| w.as_bool()) == Some(true) {
                "workspace".to_string()
            } else {
                t.get("version")
                    .and_then(|v| v.as_str())
                    .unwrap_or("*")
                    .to_string()
            }
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_manifest_exact_path_only() {
        let tree = vec![FileEntry::file("web/package.json")];
        assert_eq!(find_manifest(&tree), None);

        let tree = vec![FileEntry::file("Cargo.toml"), FileEntry::file("package.json")];
        assert_eq!(find_manifest(&tree), Some(ManifestKind::PackageJson));
    }

    #[test]
    fn test_package_json_dev_overrides_runtime() {
        let content = r#"{
            "engines": { "node": ">=18" },
            "dependencies": { "next": "14.1.0", "react": "^18.2.0" },
            "devDependencies": { "typescript": "5.3.3", "react": "18.3.0" }
        }"#;
        let parsed = parse_manifest(ManifestKind::PackageJson, content).unwrap();

        assert_eq!(parsed.version.as_deref(), Some(">=18"));
        let names: Vec<_> = parsed.dependencies.keys().cloned().collect();
        assert_eq!(names, vec!["next", "react", "typescript"]);
        assert_eq!(parsed.dependencies["react"], "18.3.0");
    }

    #[test]
    fn test_package_json_without_tables() {
        let parsed = parse_manifest(ManifestKind::PackageJson, r#"{"name": "x"}"#).unwrap();
        assert!(parsed.version.is_none());
        assert!(parsed.dependencies.is_empty());
    }

    #[test]
    fn test_package_json_non_string_version() {
        let content = r#"{"dependencies": {"odd": 1}}"#;
        let parsed = parse_manifest(ManifestKind::PackageJson, content).unwrap();
        assert_eq!(parsed.dependencies["odd"], "1");
    }

    #[test]
    fn test_cargo_toml_requirements() {
        let content = r#"
[package]
name = "demo"
rust-version = "1.74"

[dependencies]
serde = { version = "1", features = ["derive"] }
anyhow = "1"
local = { path = "../local" }
shared = { workspace = true }

[dev-dependencies]
tempfile = "3"
anyhow = "1.0.80"
"#;
        let parsed = parse_manifest(ManifestKind::CargoToml, content).unwrap();
        assert_eq!(parsed.version.as_deref(), Some("1.74"));
        assert_eq!(parsed.dependencies["serde"], "1");
        assert_eq!(parsed.dependencies["anyhow"], "1.0.80");
        assert_eq!(parsed.dependencies["local"], "*");
        assert_eq!(parsed.dependencies["shared"], "workspace");
        assert_eq!(parsed.dependencies.len(), 5);
    }

    #[test]
    fn test_read_manifest_statuses() {
        let (runtime, deps) = read_manifest(ManifestKind::PackageJson, "");
        assert_eq!(runtime.manifest, Some(ManifestStatus::Unavailable));
        assert!(deps.is_empty());

        let (runtime, deps) = read_manifest(ManifestKind::CargoToml, "[[[ nope");
        assert_eq!(runtime.language, "Rust");
        assert_eq!(runtime.manifest, Some(ManifestStatus::Invalid));
        assert!(deps.is_empty());

        let (runtime, deps) =
            read_manifest(ManifestKind::PackageJson, r#"{"dependencies": {"a": "1"}}"#);
        assert_eq!(runtime.manifest, Some(ManifestStatus::Parsed));
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].ecosystem, "npm");
        assert_eq!(deps[0].status, DependencyStatus::Current);
    }
}
