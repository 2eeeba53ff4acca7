//! Documentation presence and API documentation inventory

use crate::models::{DocsHealth, FileEntry};

const SPEC_FILE_NAMES: [&str; 6] = [
    "openapi.json",
    "openapi.yaml",
    "openapi.yml",
    "swagger.json",
    "swagger.yaml",
    "swagger.yml",
];

pub(super) fn docs_health(tree: &[FileEntry]) -> DocsHealth {
    let lower: Vec<String> = tree.iter().map(|f| f.path.to_lowercase()).collect();

    let has_readme = lower.iter().any(|p| p == "readme.md");
    let has_adr = lower
        .iter()
        .any(|p| p.contains("adr") || p.contains("decision"));
    let has_contributing = lower.iter().any(|p| p == "contributing.md");
    let has_license = lower
        .iter()
        .any(|p| p == "license" || p.starts_with("license."));

    let mut missing = Vec::new();
    if !has_readme {
        missing.push("README.md".to_string());
    }
    if !has_adr {
        missing.push("Architecture Decision Records".to_string());
    }
    if !has_contributing {
        missing.push("CONTRIBUTING.md".to_string());
    }
    if !has_license {
        missing.push("LICENSE".to_string());
    }

    DocsHealth {
        has_readme,
        has_adr,
        missing,
    }
}

/// OpenAPI / Swagger documents and GraphQL schemas
pub(super) fn api_specs(tree: &[FileEntry]) -> Vec<String> {
    tree.iter()
        .filter(|f| !f.is_dir())
        .filter(|f| {
            let name = f.file_name().to_lowercase();
            SPEC_FILE_NAMES.contains(&name.as_str()) || name.ends_with(".graphql")
        })
        .map(|f| f.path.clone())
        .collect()
}

/// Markdown under `docs/` that talks about the API
pub(super) fn api_documentation(tree: &[FileEntry]) -> Vec<String> {
    tree.iter()
        .filter(|f| !f.is_dir())
        .filter(|f| {
            let path = f.path.to_lowercase();
            path.starts_with("docs/") && path.ends_with(".md") && path.contains("api")
        })
        .map(|f| f.path.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readme_must_be_at_root() {
        let health = docs_health(&[FileEntry::file("docs/README.md")]);
        assert!(!health.has_readme);

        let health = docs_health(&[FileEntry::file("Readme.MD")]);
        assert!(health.has_readme);
    }

    #[test]
    fn test_adr_substring_match() {
        assert!(docs_health(&[FileEntry::dir("docs/ADR")]).has_adr);
        assert!(docs_health(&[FileEntry::file("docs/decisions/0001.md")]).has_adr);
        // Substring match is literal, so unrelated names can hit it too
        assert!(docs_health(&[FileEntry::file("src/quadratic.ts")]).has_adr);
        assert!(!docs_health(&[FileEntry::file("src/index.ts")]).has_adr);
    }

    #[test]
    fn test_missing_lists_absent_artifacts() {
        let health = docs_health(&[FileEntry::file("README.md"), FileEntry::file("LICENSE")]);
        assert_eq!(
            health.missing,
            vec!["Architecture Decision Records", "CONTRIBUTING.md"]
        );
    }

    #[test]
    fn test_api_specs_and_docs() {
        let tree = vec![
            FileEntry::file("api/openapi.yaml"),
            FileEntry::file("schema/schema.graphql"),
            FileEntry::file("docs/api-guide.md"),
            FileEntry::file("docs/setup.md"),
            FileEntry::file("src/openapi.ts"),
        ];
        assert_eq!(api_specs(&tree), vec!["api/openapi.yaml", "schema/schema.graphql"]);
        assert_eq!(api_documentation(&tree), vec!["docs/api-guide.md"]);
    }
}
