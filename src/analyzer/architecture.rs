//! Directory-based architecture signals

use crate::models::{ArchitectureInfo, FileEntry};
use indexmap::IndexSet;
use std::collections::HashSet;

const SOURCE_ROOTS: [&str; 3] = ["src", "app", "lib"];

/// Directory name fragment -> appended tag
const LAYER_SIGNALS: [(&str, &str); 4] = [
    ("controllers", "MVC Pattern"),
    ("services", "Service Layer"),
    ("repositories", "Data Access Layer"),
    ("components", "Component Architecture"),
];

const CONTAINER_FILES: [&str; 5] = [
    "Dockerfile",
    "docker-compose.yml",
    "docker-compose.yaml",
    "compose.yml",
    "compose.yaml",
];

const ENTRY_FILES: [&str; 18] = [
    "src/main.rs",
    "src/lib.rs",
    "main.go",
    "cmd/main.go",
    "src/index.ts",
    "src/index.js",
    "src/main.ts",
    "src/main.js",
    "src/app.ts",
    "src/server.ts",
    "index.ts",
    "index.js",
    "server.js",
    "main.py",
    "app.py",
    "manage.py",
    "app/layout.tsx",
    "pages/_app.tsx",
];

pub const CONTAINERIZED: &str = "Containerized";
pub const REALTIME_PATTERN: &str = "WebSocket/Event-Driven";

/// Explicit directory entries in listing order, then parent directories
/// implied by file paths that the listing left out.
pub(super) fn directories(tree: &[FileEntry]) -> Vec<String> {
    let explicit: Vec<&str> = tree
        .iter()
        .filter(|f| f.is_dir())
        .map(|f| f.path.as_str())
        .collect();
    let known: HashSet<&str> = explicit.iter().copied().collect();

    let mut implied: IndexSet<&str> = IndexSet::new();
    for file in tree.iter().filter(|f| !f.is_dir()) {
        let mut end = 0;
        while let Some(pos) = file.path[end..].find('/') {
            let parent = &file.path[..end + pos];
            if !parent.is_empty() && !known.contains(parent) {
                implied.insert(parent);
            }
            end += pos + 1;
        }
    }

    explicit
        .into_iter()
        .chain(implied)
        .map(str::to_string)
        .collect()
}

/// Layer tags, one per matching fragment per directory, no dedup
pub(super) fn layer_patterns(directories: &[String]) -> Vec<String> {
    let mut patterns = Vec::new();
    for dir in directories
        .iter()
        .filter(|d| SOURCE_ROOTS.iter().any(|root| d.starts_with(root)))
    {
        for (fragment, tag) in LAYER_SIGNALS {
            if dir.contains(fragment) {
                patterns.push(tag.to_string());
            }
        }
    }
    patterns
}

pub(super) fn is_containerized(tree: &[FileEntry]) -> bool {
    tree.iter()
        .filter(|f| !f.is_dir())
        .any(|f| CONTAINER_FILES.contains(&f.file_name()))
}

pub(super) fn entry_points(tree: &[FileEntry]) -> Vec<String> {
    tree.iter()
        .filter(|f| !f.is_dir() && ENTRY_FILES.contains(&f.path.as_str()))
        .map(|f| f.path.clone())
        .collect()
}

/// Direct children of the source roots, e.g. `src/services`
pub(super) fn components(directories: &[String]) -> Vec<String> {
    directories
        .iter()
        .filter(|d| {
            let mut parts = d.split('/');
            matches!(
                (parts.next(), parts.next(), parts.next()),
                (Some(root), Some(child), None) if SOURCE_ROOTS.contains(&root) && !child.is_empty()
            )
        })
        .cloned()
        .collect()
}

pub(super) fn describe(info: &ArchitectureInfo) -> String {
    let distinct: IndexSet<&str> = info.patterns.iter().map(String::as_str).collect();
    if distinct.is_empty() {
        return format!(
            "No layering signals detected. {} top-level components, {} entry points.",
            info.components.len(),
            info.entry_points.len()
        );
    }
    format!(
        "Signals: {}. {} top-level components, {} entry points.",
        distinct.into_iter().collect::<Vec<_>>().join(", "),
        info.components.len(),
        info.entry_points.len()
    )
}
