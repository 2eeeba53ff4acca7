//! Test posture: test file paths plus framework signals

use crate::models::{Dependency, FileEntry, TestPosture};

const TEST_PATH_MARKERS: [&str; 4] = ["__tests__/", ".test.", ".spec.", "_test."];
const TEST_DIR_NAMES: [&str; 3] = ["test", "tests", "spec"];

/// Dependency name -> framework label
const FRAMEWORK_DEPENDENCIES: [(&str, &str); 11] = [
    ("jest", "Jest"),
    ("vitest", "Vitest"),
    ("mocha", "Mocha"),
    ("ava", "AVA"),
    ("@playwright/test", "Playwright"),
    ("cypress", "Cypress"),
    ("@testing-library/react", "Testing Library"),
    ("pytest", "pytest"),
    ("proptest", "proptest"),
    ("criterion", "Criterion"),
    ("insta", "insta"),
];

/// Config file prefix -> framework label
const FRAMEWORK_CONFIGS: [(&str, &str); 5] = [
    ("jest.config.", "Jest"),
    ("vitest.config.", "Vitest"),
    ("playwright.config.", "Playwright"),
    ("cypress.config.", "Cypress"),
    ("pytest.ini", "pytest"),
];

pub(super) fn is_test_path(path: &str) -> bool {
    if TEST_PATH_MARKERS.iter().any(|m| path.contains(m)) {
        return true;
    }
    let mut segments: Vec<&str> = path.split('/').collect();
    segments.pop();
    segments.iter().any(|s| TEST_DIR_NAMES.contains(s))
}

pub(super) fn posture(tree: &[FileEntry], dependencies: &[Dependency]) -> TestPosture {
    let test_files = tree
        .iter()
        .filter(|f| !f.is_dir() && is_test_path(&f.path))
        .count();

    let mut frameworks: Vec<String> = Vec::new();
    let mut add = |label: &str| {
        if !frameworks.iter().any(|f| f == label) {
            frameworks.push(label.to_string());
        }
    };

    for dep in dependencies {
        if let Some((_, label)) = FRAMEWORK_DEPENDENCIES.iter().find(|(name, _)| *name == dep.name) {
            add(*label);
        }
    }
    for file in tree.iter().filter(|f| !f.is_dir()) {
        let name = file.file_name();
        if let Some((_, label)) = FRAMEWORK_CONFIGS.iter().find(|(prefix, _)| name.starts_with(prefix)) {
            add(*label);
        }
    }

    TestPosture {
        has_tests: test_files > 0,
        frameworks,
        signal: if test_files > 0 {
            format!("{} test files detected", test_files)
        } else {
            "None detected".to_string()
        },
    }
}
