//! RepoLens - Repository health auditing
//!
//! Reads a GitHub repository through the REST API without cloning it,
//! derives a heuristic fact sheet, scores documentation, testing and
//! architecture, and asks an LLM for a structured narrative.

pub mod ai;
pub mod analyzer;
pub mod cli;
pub mod config;
pub mod github;
pub mod models;
pub mod reporters;
pub mod scoring;
pub mod session;
pub mod state;
