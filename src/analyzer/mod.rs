//! Deterministic repository analyzer
//!
//! Walks the tree listing and a bounded sample of file contents and emits a
//! [`FactSheet`]. Detection is literal substring matching; nothing is parsed
//! beyond the runtime manifest.
//!
//! # Steps (fixed order)
//!
//! 1. Runtime: first known manifest (`package.json`, `Cargo.toml`)
//! 2. Endpoints: first 10 route files, path-keyed, last write wins
//! 3. Real-time channels: first 3 socket-like paths, one synthetic entry
//! 4. Architecture: layer tags from source directories, containerization
//! 5. Test posture: test file paths and framework signals
//! 6. Documentation: README / ADR presence, API specs and docs
//!
//! Per-file fetch or parse failures degrade the affected fields and are
//! never surfaced.

mod architecture;
mod docs;
mod routes;
mod runtime;
mod testing;

pub use architecture::{CONTAINERIZED, REALTIME_PATTERN};
pub use routes::{derive_route_path, detect_methods, REALTIME_KEY};
pub use runtime::{parse_manifest, ManifestKind, ParsedManifest};

use crate::github::RepoHost;
use crate::models::{Endpoint, EndpointKind, FactSheet, FileEntry, Method, RepoRef};
use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::{debug, info, warn};

/// Tuning knobs for one analysis run
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Upper bound on concurrent content fetches (1 = sequential)
    pub workers: usize,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self { workers: 4 }
    }
}

/// Produce the fact sheet for `repo` from its `tree` listing.
pub fn analyze<H>(
    host: &H,
    repo: &RepoRef,
    tree: &[FileEntry],
    token: Option<&str>,
    options: &AnalyzeOptions,
    on_progress: &mut dyn FnMut(&str),
) -> FactSheet
where
    H: RepoHost + ?Sized,
{
    let mut facts = FactSheet::new(repo.clone());
    let fetcher = Fetcher::new(host, repo, token, options.workers);

    // 1. Runtime and dependencies
    if let Some(kind) = runtime::find_manifest(tree) {
        on_progress(&format!(
            "READ: Parsing {} manifest for runtime constraints...",
            kind.file_name()
        ));
        let content = host.fetch_file_content(repo, kind.file_name(), token);
        let (runtime, dependencies) = runtime::read_manifest(kind, &content);
        debug!(
            "Runtime {} ({:?}), {} dependencies",
            runtime.language,
            runtime.manifest,
            dependencies.len()
        );
        facts.runtime = runtime;
        facts.dependencies = dependencies;
    }

    // 2. Route files
    on_progress("GREP: Scanning directory signatures for API patterns...");
    let mut endpoints: IndexMap<String, Endpoint> = IndexMap::new();

    let route_files = routes::route_files(tree);
    for file in &route_files {
        on_progress(&format!("READ: Analysing route logic in {}", file.path));
    }
    let contents = fetcher.fetch_all(&route_files);
    for (file, content) in route_files.iter().zip(&contents) {
        if let Some(endpoint) = routes::route_endpoint(&file.path, content) {
            endpoints.insert(endpoint.path.clone(), endpoint);
        }
    }

    // 3. Real-time channels
    on_progress("GREP: Searching for WebSocket and real-time protocol signatures...");
    let candidates = routes::realtime_candidates(tree);
    for file in &candidates {
        on_progress(&format!(
            "READ: Inspecting real-time channel logic in {}",
            file.path
        ));
    }
    let contents = fetcher.fetch_all(&candidates);
    for (file, content) in candidates.iter().zip(&contents) {
        if routes::has_realtime_marker(content) {
            endpoints.insert(
                REALTIME_KEY.to_string(),
                Endpoint {
                    path: file.path.clone(),
                    methods: vec![Method::Wss],
                    parameters: Vec::new(),
                    kind: EndpointKind::Websocket,
                },
            );
            facts
                .architecture
                .patterns
                .push(REALTIME_PATTERN.to_string());
        }
    }

    facts.api_inventory.endpoints = endpoints.into_values().collect();

    // 4. Architecture
    on_progress("SCAN: Evaluating directory hierarchy for architectural patterns...");
    let directories = architecture::directories(tree);
    facts
        .architecture
        .patterns
        .extend(architecture::layer_patterns(&directories));
    if architecture::is_containerized(tree) {
        facts.architecture.patterns.push(CONTAINERIZED.to_string());
    }
    facts.architecture.entry_points = architecture::entry_points(tree);
    facts.architecture.components = architecture::components(&directories);
    facts.architecture.description = architecture::describe(&facts.architecture);

    // 5. Tests
    on_progress("SCAN: Locating test suites and framework signals...");
    facts.test_posture = testing::posture(tree, &facts.dependencies);

    // 6. Documentation
    on_progress("READ: Verifying documentation health indicators...");
    facts.docs_health = docs::docs_health(tree);
    facts.api_inventory.specs = docs::api_specs(tree);
    facts.api_inventory.documentation = docs::api_documentation(tree);

    info!(
        "Analyzed {}: {} endpoints, {} patterns, {} dependencies",
        repo.full_name(),
        facts.api_inventory.endpoints.len(),
        facts.architecture.patterns.len(),
        facts.dependencies.len()
    );

    facts
}

/// Fetches file contents on a bounded pool, returning them in input order
struct Fetcher<'a, H: ?Sized> {
    host: &'a H,
    repo: &'a RepoRef,
    token: Option<&'a str>,
    pool: Option<rayon::ThreadPool>,
}

impl<'a, H> Fetcher<'a, H>
where
    H: RepoHost + ?Sized,
{
    fn new(host: &'a H, repo: &'a RepoRef, token: Option<&'a str>, workers: usize) -> Self {
        let pool = if workers > 1 {
            match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
                Ok(pool) => Some(pool),
                Err(e) => {
                    warn!("Falling back to sequential fetches: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Self {
            host,
            repo,
            token,
            pool,
        }
    }

    fn fetch_all(&self, files: &[&FileEntry]) -> Vec<String> {
        let fetch = |file: &&FileEntry| {
            self.host
                .fetch_file_content(self.repo, &file.path, self.token)
        };

        match &self.pool {
            Some(pool) if files.len() > 1 => {
                pool.install(|| files.par_iter().map(fetch).collect())
            }
            _ => files.iter().map(fetch).collect(),
        }
    }
}
