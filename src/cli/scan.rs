//! Scan command - audit a repository and print the result

use crate::ai::LlmClient;
use crate::analyzer::AnalyzeOptions;
use crate::config::UserConfig;
use crate::github::GithubClient;
use crate::models::RepoRef;
use crate::reporters::{self, AuditReport};
use crate::session::Session;
use crate::state::FileStateStore;
use anyhow::{anyhow, Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub struct ScanArgs {
    pub url: String,
    pub token: Option<String>,
    pub format: String,
    pub backend: Option<String>,
    pub model: Option<String>,
    pub quiet: bool,
    pub workers: usize,
}

pub fn run(args: ScanArgs) -> Result<()> {
    // Reject bad input before touching the network or the LLM config
    RepoRef::parse(&args.url)?;

    let mut config = UserConfig::load()?;
    if let Some(backend) = &args.backend {
        config.set("ai.backend", backend)?;
    }
    if let Some(model) = args.model {
        config.ai.model = Some(model);
    }

    let client_config = config.client_config()?;
    let backend = client_config.backend;
    let generator = LlmClient::with_key(client_config, config.api_key(backend).map(String::from))?;
    let host = GithubClient::new(config.github_config());

    let store = FileStateStore::open_default().context("Failed to open state directory")?;
    let mut session = Session::open(store);

    let token = match args.token.filter(|t| !t.trim().is_empty()) {
        Some(token) => Some(token),
        None => session
            .token()?
            .or_else(|| config.github_token().map(String::from)),
    };

    let spinner = if args.quiet || !console::Term::stderr().is_term() {
        ProgressBar::hidden()
    } else {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
                .template("{spinner:.green} {msg}")?,
        );
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    };

    let options = AnalyzeOptions {
        workers: args.workers,
    };
    let result = session.scan(
        &args.url,
        token.as_deref(),
        &host,
        &generator,
        &options,
        &mut |msg: &str| {
            spinner.println(format!("  {}", style(msg).dim()));
            spinner.set_message(msg.to_string());
        },
    );
    spinner.finish_and_clear();

    if let Err(err) = result {
        return Err(anyhow!(err.user_message()));
    }

    let (model, narrative) = session
        .results()
        .context("Scan finished without results")?;
    let output = reporters::report(&AuditReport::new(model, narrative), &args.format)?;
    println!("{}", output);
    Ok(())
}
