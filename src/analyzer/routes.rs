//! Route file and real-time channel detection

use crate::models::{Endpoint, EndpointKind, FileEntry, Method};

const ROUTE_SUFFIXES: [&str; 2] = ["route.ts", "route.js"];
const MAX_ROUTE_FILES: usize = 10;

const REALTIME_PATH_HINTS: [&str; 3] = ["socket", "ws", "subscription"];
const REALTIME_MARKERS: [&str; 3] = ["io.on", "new WebSocket", "wss:"];
const MAX_REALTIME_FILES: usize = 3;

/// Inventory key shared by every real-time detection
pub const REALTIME_KEY: &str = "Real-time Channel";

/// First route files in listing order
pub(super) fn route_files(tree: &[FileEntry]) -> Vec<&FileEntry> {
    tree.iter()
        .filter(|f| ROUTE_SUFFIXES.iter().any(|s| f.path.ends_with(s)))
        .take(MAX_ROUTE_FILES)
        .collect()
}

/// Exported handlers found in `content`, `[GET]` when none match
pub fn detect_methods(content: &str) -> Vec<Method> {
    let methods: Vec<Method> = Method::ROUTE_METHODS
        .into_iter()
        .filter(|m| content.contains(&format!("export async function {}", m.as_str())))
        .collect();

    if methods.is_empty() {
        vec![Method::Get]
    } else {
        methods
    }
}

/// Logical API path of a route file.
///
/// Starts at the last directory segment named `api` and runs up to the
/// file's own directory: `app/api/users/route.ts` -> `/api/users`.
pub fn derive_route_path(file_path: &str) -> Option<String> {
    let parts: Vec<&str> = file_path.split('/').collect();
    let dirs = &parts[..parts.len().saturating_sub(1)];
    let start = dirs.iter().rposition(|p| *p == "api")?;
    Some(format!("/{}", dirs[start..].join("/")))
}

/// Dynamic segment names, e.g. `[id]` and `[...slug]`
fn route_parameters(route_path: &str) -> Vec<String> {
    route_path
        .split('/')
        .filter(|seg| seg.starts_with('[') && seg.ends_with(']'))
        .map(|seg| {
            seg.trim_matches(|c| c == '[' || c == ']')
                .trim_start_matches("...")
                .to_string()
        })
        .filter(|name| !name.is_empty())
        .collect()
}

pub(super) fn route_endpoint(file_path: &str, content: &str) -> Option<Endpoint> {
    let path = derive_route_path(file_path)?;
    Some(Endpoint {
        parameters: route_parameters(&path),
        methods: detect_methods(content),
        kind: EndpointKind::Rest,
        path,
    })
}

/// First entries whose path hints at a real-time channel
pub(super) fn realtime_candidates(tree: &[FileEntry]) -> Vec<&FileEntry> {
    tree.iter()
        .filter(|f| REALTIME_PATH_HINTS.iter().any(|h| f.path.contains(h)))
        .take(MAX_REALTIME_FILES)
        .collect()
}

pub(super) fn has_realtime_marker(content: &str) -> bool {
    REALTIME_MARKERS.iter().any(|m| content.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_route_path() {
        assert_eq!(
            derive_route_path("app/api/users/route.ts").as_deref(),
            Some("/api/users")
        );
        assert_eq!(derive_route_path("app/api/route.ts").as_deref(), Some("/api"));
        assert_eq!(derive_route_path("app/users/route.ts"), None);
        assert_eq!(derive_route_path("route.ts"), None);
    }

    #[test]
    fn test_derive_route_path_uses_last_api_segment() {
        assert_eq!(
            derive_route_path("api/app/api/v1/orders/route.js").as_deref(),
            Some("/api/v1/orders")
        );
    }

    #[test]
    fn test_detect_methods_in_declaration_order() {
        let content = "export async function PATCH() {}\nexport async function GET() {}";
        assert_eq!(detect_methods(content), vec![Method::Get, Method::Patch]);
    }

    #[test]
    fn test_detect_methods_defaults_to_get() {
        assert_eq!(detect_methods("export const GET = handler"), vec![Method::Get]);
        assert_eq!(detect_methods(""), vec![Method::Get]);
    }

    #[test]
    fn test_route_endpoint_parameters() {
        let endpoint = route_endpoint(
            "app/api/users/[id]/posts/[...slug]/route.ts",
            "export async function DELETE() {}",
        )
        .unwrap();
        assert_eq!(endpoint.path, "/api/users/[id]/posts/[...slug]");
        assert_eq!(endpoint.parameters, vec!["id", "slug"]);
        assert_eq!(endpoint.methods, vec![Method::Delete]);
        assert_eq!(endpoint.kind, EndpointKind::Rest);
    }

    #[test]
    fn test_route_files_match_suffix() {
        let tree = vec![
            FileEntry::file("app/api/a/route.ts"),
            FileEntry::file("app/api/a/route.test.ts"),
            FileEntry::file("pages/api/b/route.js"),
            FileEntry::file("src/router.ts"),
        ];
        let paths: Vec<_> = route_files(&tree).iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["app/api/a/route.ts", "pages/api/b/route.js"]);
    }

    #[test]
    fn test_realtime_markers() {
        assert!(has_realtime_marker("socket.io.on('x')"));
        assert!(has_realtime_marker("const url = 'wss://feed'"));
        assert!(!has_realtime_marker("new EventSource('/events')"));
    }
}
