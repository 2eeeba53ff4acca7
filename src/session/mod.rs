//! Scan orchestration
//!
//! A [`Session`] owns the state store and the result of the last scan.
//!
//! # States
//!
//! ```text
//! Idle ──scan──▶ Scanning ──▶ Succeeded
//!                    │
//!                    └──────▶ Failed { message }
//! ```
//!
//! Starting a scan from any state clears prior results and progress. There
//! is no partial success: the model and the narrative are stored (and
//! persisted) together, or not at all.

use crate::ai::{AiError, Narrator, StructuredGenerator};
use crate::analyzer::{self, AnalyzeOptions};
use crate::github::{GithubError, RepoHost};
use crate::models::{HealthModel, NarrativeResult, RepoRef, RepoUrlError};
use crate::scoring;
use crate::state::{Slot, StateResult, StateStore};
use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

/// Shown when a failure carries no message of its own
pub const FALLBACK_FAULT_MESSAGE: &str = "A fatal execution fault was encountered during analysis.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Scanning,
    Succeeded,
    Failed { message: String },
}

/// Errors that terminate a scan
#[derive(Error, Debug)]
pub enum ScanError {
    /// Malformed repository URL
    #[error("{0}")]
    Input(String),

    /// Tree listing failed on both branches
    #[error(transparent)]
    Network(#[from] GithubError),

    /// Narrative request or response failed
    #[error(transparent)]
    Generation(#[from] AiError),
}

impl From<RepoUrlError> for ScanError {
    fn from(err: RepoUrlError) -> Self {
        ScanError::Input(err.to_string())
    }
}

impl ScanError {
    /// Message for display, never empty
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            FALLBACK_FAULT_MESSAGE.to_string()
        } else {
            message
        }
    }
}

pub struct Session<S: StateStore> {
    store: S,
    model: Option<HealthModel>,
    narrative: Option<NarrativeResult>,
    progress: Vec<String>,
    state: ScanState,
}

impl<S: StateStore> Session<S> {
    /// Open a session, restoring the last persisted result pair
    pub fn open(store: S) -> Self {
        let model = load_slot::<S, HealthModel>(&store, Slot::Model);
        let narrative = load_slot::<S, NarrativeResult>(&store, Slot::Narrative);

        let state = if model.is_some() && narrative.is_some() {
            ScanState::Succeeded
        } else {
            ScanState::Idle
        };

        Self {
            store,
            model,
            narrative,
            progress: Vec::new(),
            state,
        }
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    pub fn model(&self) -> Option<&HealthModel> {
        self.model.as_ref()
    }

    pub fn narrative(&self) -> Option<&NarrativeResult> {
        self.narrative.as_ref()
    }

    /// Both halves of the last successful scan
    pub fn results(&self) -> Option<(&HealthModel, &NarrativeResult)> {
        self.model.as_ref().zip(self.narrative.as_ref())
    }

    /// Progress messages of the current or last scan
    pub fn progress(&self) -> &[String] {
        &self.progress
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run one scan of `url` to completion.
    ///
    /// Every progress message is recorded and forwarded to `on_step`.
    pub fn scan<H, G>(
        &mut self,
        url: &str,
        token: Option<&str>,
        host: &H,
        generator: &G,
        options: &AnalyzeOptions,
        on_step: &mut dyn FnMut(&str),
    ) -> Result<(), ScanError>
    where
        H: RepoHost + ?Sized,
        G: StructuredGenerator + ?Sized,
    {
        self.model = None;
        self.narrative = None;
        self.progress.clear();
        self.state = ScanState::Scanning;

        let progress = &mut self.progress;
        let mut step = |msg: &str| {
            progress.push(msg.to_string());
            on_step(msg);
        };

        let outcome = run_pipeline(url, token, host, generator, options, &mut step);

        match outcome {
            Ok((model, narrative)) => {
                self.persist(&model, &narrative);
                info!(
                    "Scan of {} succeeded with overall score {}",
                    model.repo().full_name(),
                    model.overall_score
                );
                self.model = Some(model);
                self.narrative = Some(narrative);
                self.state = ScanState::Succeeded;
                Ok(())
            }
            Err(err) => {
                let message = err.user_message();
                info!("Scan failed: {}", message);
                step(&format!("FAULT: {}", message));
                self.remove_results();
                self.state = ScanState::Failed { message };
                Err(err)
            }
        }
    }

    /// Forget the last scan: result pair, persisted slots and progress.
    ///
    /// Leaves the session `Idle`.
    pub fn clear(&mut self) -> StateResult<()> {
        self.reset();
        self.drop_results()
    }

    /// Back to `Idle`, keeping results
    pub fn reset(&mut self) {
        self.progress.clear();
        self.state = ScanState::Idle;
    }

    pub fn token(&self) -> StateResult<Option<String>> {
        Ok(self
            .store
            .read(Slot::Token)?
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty()))
    }

    pub fn set_token(&self, token: &str) -> StateResult<()> {
        self.store.write(Slot::Token, token.trim())
    }

    pub fn clear_token(&self) -> StateResult<()> {
        self.store.remove(Slot::Token)
    }

    fn persist(&self, model: &HealthModel, narrative: &NarrativeResult) {
        let saved = self
            .store
            .save_json(Slot::Model, model)
            .and_then(|_| self.store.save_json(Slot::Narrative, narrative));
        if let Err(e) = saved {
            warn!("Could not persist scan result: {}", e);
        }
    }

    fn drop_results(&mut self) -> StateResult<()> {
        self.model = None;
        self.narrative = None;
        self.store.remove(Slot::Model)?;
        self.store.remove(Slot::Narrative)
    }

    fn remove_results(&mut self) {
        if let Err(e) = self.drop_results() {
            warn!("Could not clear persisted scan result: {}", e);
        }
    }
}

fn load_slot<S: StateStore, T: serde::de::DeserializeOwned>(store: &S, slot: Slot) -> Option<T> {
    match store.load_json(slot) {
        Ok(value) => value,
        Err(e) => {
            warn!("Ignoring saved state: {}", e);
            None
        }
    }
}

fn run_pipeline<H, G>(
    url: &str,
    token: Option<&str>,
    host: &H,
    generator: &G,
    options: &AnalyzeOptions,
    step: &mut dyn FnMut(&str),
) -> Result<(HealthModel, NarrativeResult), ScanError>
where
    H: RepoHost + ?Sized,
    G: StructuredGenerator + ?Sized,
{
    step("INIT: Initialising RepoLens intelligence cycle...");
    let repo = RepoRef::parse(url)?;

    step(&format!(
        "NETWORK: Establishing secure connection to {}...",
        repo.full_name()
    ));
    let tree = host.fetch_tree(&repo, token)?;
    step(&format!(
        "TREE: Hydrating {} unique file descriptors...",
        tree.len()
    ));

    step("CORE: Commencing deep-scan of deterministic behavioural signals...");
    let facts = analyzer::analyze(host, &repo, &tree, token, options, step);

    step("ANALYSIS: Calculating multidimensional health vectors...");
    let scoring = scoring::score(&facts);
    let model = HealthModel::new(facts, scoring, Utc::now());

    step("AI: Initiating high-level behavioural reasoning layer...");
    let narrative = Narrator::new(generator).summarize(&model)?;

    step("DONE: Intelligence compilation successful. Audit ready.");
    Ok((model, narrative))
}
