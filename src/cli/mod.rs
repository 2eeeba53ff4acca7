//! CLI command definitions and handlers

mod results;
mod scan;
mod status;
mod token;

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use std::path::PathBuf;

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

/// RepoLens - Repository health auditing
///
/// Reads a GitHub repository over the API, scores it and asks an LLM for a
/// written assessment.
#[derive(Parser, Debug)]
#[command(name = "repolens")]
#[command(
    version,
    about = "Repository health auditing: heuristic fact sheet, health score and an LLM-written narrative",
    long_about = "RepoLens reads a GitHub repository's file listing and a handful of files \
(manifest, route handlers, socket code), derives a fact sheet of runtime, dependencies, \
endpoints, architecture signals, tests and documentation, scores documentation, testing \
and architecture from 0 to 100 and asks an LLM for a narrative assessment.\n\n\
Nothing is cloned. The last audit is kept locally for `show` and `export`.",
    after_help = "\
Examples:
  repolens scan https://github.com/owner/repo          Audit a repository
  repolens scan https://github.com/owner/repo -f json  JSON output for scripting
  repolens show                                        Show the last audit
  repolens export -o audit.json                        Save the last audit
  repolens token set ghp_...                           Store a GitHub token
  repolens config set ai.backend openai                Switch LLM backend"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Number of parallel file fetches (1-64)
    #[arg(long, global = true, default_value = "4", value_parser = parse_workers)]
    pub workers: usize,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Audit a GitHub repository
    #[command(after_help = "\
Examples:
  repolens scan https://github.com/vercel/next.js
  repolens scan https://github.com/owner/private --token ghp_...
  repolens scan https://github.com/owner/repo --backend ollama --model llama3.1:8b")]
    Scan {
        /// Repository URL, e.g. https://github.com/owner/repo
        url: String,

        /// GitHub access token (default: stored token, then GITHUB_TOKEN)
        #[arg(long)]
        token: Option<String>,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,

        /// LLM backend: gemini, openai, openrouter, ollama, anthropic
        #[arg(long)]
        backend: Option<String>,

        /// Model override for the selected backend
        #[arg(long)]
        model: Option<String>,

        /// Hide progress messages
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Show the last audit
    Show {
        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Write the last audit to a JSON file
    Export {
        /// Output file path (default: ./repolens-audit-<name>.json)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Forget the last audit
    Clear,

    /// Show stored state and configuration status
    Status,

    /// Manage the stored GitHub access token
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Manage user configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show version info
    Version,
}

#[derive(Subcommand, Debug)]
pub enum TokenAction {
    /// Store a token for later scans
    Set {
        /// Personal access token
        token: String,
    },
    /// Remove the stored token
    Clear,
    /// Show whether a token is stored (masked)
    Show,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Initialize config file with example settings
    Init,
    /// Show current config and paths
    Show,
    /// Set a config value
    Set {
        /// Config key (e.g., ai.backend, github.token)
        key: String,
        /// Value to set (empty string unsets)
        value: String,
    },
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Scan {
            url,
            token,
            format,
            backend,
            model,
            quiet,
        } => scan::run(scan::ScanArgs {
            url,
            token,
            format,
            backend,
            model,
            quiet,
            workers: cli.workers,
        }),

        Commands::Show { format } => results::show(&format),

        Commands::Export { output } => results::export(output),

        Commands::Clear => results::clear(),

        Commands::Status => status::run(),

        Commands::Token { action } => token::run(action),

        Commands::Config { action } => run_config_action(action),

        Commands::Version => {
            println!("repolens {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn run_config_action(action: ConfigAction) -> Result<()> {
    use crate::config::UserConfig;
    match action {
        ConfigAction::Init => {
            let path = UserConfig::init_user_config()?;
            println!("{} Config initialized at: {}", style("[OK]").green(), path.display());
            println!("\nEdit to add your API key:");
            println!("  {}", path.display());
            println!("\nOr set via environment:");
            println!("  export GEMINI_API_KEY=\"...\"");
            Ok(())
        }
        ConfigAction::Show => show_config(),
        ConfigAction::Set { key, value } => set_config_value(&key, &value),
    }
}

fn show_config() -> Result<()> {
    use crate::config::UserConfig;

    let config = UserConfig::load()?;
    println!("Config path:");
    if let Some(user_path) = UserConfig::user_config_path() {
        let status = if user_path.exists() {
            style("[OK]").green().to_string()
        } else {
            style("(not found)").dim().to_string()
        };
        println!("  {} {}", user_path.display(), status);
    }
    println!();
    println!("Effective config (file + environment):\n");
    print!("{}", toml::to_string_pretty(&config.redacted())?);
    Ok(())
}

fn set_config_value(key: &str, value: &str) -> Result<()> {
    use crate::config::UserConfig;

    let config_path = UserConfig::user_config_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config path"))?;

    let mut config = if config_path.exists() {
        UserConfig::load_file(&config_path)?
    } else {
        UserConfig::default()
    };
    config.set(key, value)?;
    config.save(&config_path)?;

    println!(
        "{} Set {} in {}",
        style("[OK]").green(),
        style(key).cyan(),
        config_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_workers_bounds() {
        assert_eq!(parse_workers("1"), Ok(1));
        assert_eq!(parse_workers("64"), Ok(64));
        assert!(parse_workers("0").is_err());
        assert!(parse_workers("65").is_err());
        assert!(parse_workers("many").is_err());
    }

    #[test]
    fn test_cli_parses_scan() {
        let cli = Cli::try_parse_from([
            "repolens",
            "--workers",
            "2",
            "scan",
            "https://github.com/acme/shop",
            "--format",
            "json",
            "--backend",
            "ollama",
        ])
        .unwrap();
        assert_eq!(cli.workers, 2);
        match cli.command {
            Commands::Scan {
                url,
                format,
                backend,
                token,
                ..
            } => {
                assert_eq!(url, "https://github.com/acme/shop");
                assert_eq!(format, "json");
                assert_eq!(backend.as_deref(), Some("ollama"));
                assert!(token.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["repolens", "show", "--format", "sarif"]).is_err());
    }

    #[test]
    fn test_cli_token_subcommands() {
        let cli = Cli::try_parse_from(["repolens", "token", "set", "ghp_abc"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Token { action: TokenAction::Set { ref token } } if token == "ghp_abc"
        ));
    }

    #[test]
    fn test_cli_verify() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
