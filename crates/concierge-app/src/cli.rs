//! CLI argument definitions for the Concierge application.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Concierge - a customer-support assistant that answers from each
/// business's own knowledge base.
#[derive(Parser, Debug)]
#[command(name = "concierge", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Path to the businesses catalog (TOML).
    #[arg(long = "catalog")]
    pub catalog: Option<PathBuf>,

    /// Business to answer for.
    #[arg(short = 'b', long = "business")]
    pub business: Option<String>,

    /// Conversation session id. A fresh one is generated when omitted.
    #[arg(short = 's', long = "session")]
    pub session: Option<String>,

    /// Generator API key.
    #[arg(long = "api-key")]
    pub api_key: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Interactive conversation on stdin (default).
    Chat,
    /// Answer a single message and exit.
    Ask {
        message: String,
        /// Print the full response, including debug fields, as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show how every knowledge entry scores against a query.
    Explain { query: String },
    /// List the businesses in the catalog.
    Businesses,
}

impl CliArgs {
    /// The subcommand to run, defaulting to an interactive chat.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Chat)
    }

    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > CONCIERGE_CONFIG env var > ~/.concierge/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("CONCIERGE_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the catalog path.
    ///
    /// Priority: --catalog flag > CONCIERGE_CATALOG env var > config file value.
    pub fn resolve_catalog_path(&self, config_path: &str) -> PathBuf {
        if let Some(ref p) = self.catalog {
            return p.clone();
        }
        if let Ok(p) = std::env::var("CONCIERGE_CATALOG") {
            return PathBuf::from(p);
        }
        expand_home(config_path)
    }

    /// Resolve the generator API key.
    ///
    /// Priority: --api-key flag > GROQ_API_KEY env var > config file value.
    /// Blank values count as absent.
    pub fn resolve_api_key(&self, config_key: Option<&str>) -> Option<String> {
        [
            self.api_key.clone(),
            std::env::var("GROQ_API_KEY").ok(),
            config_key.map(str::to_string),
        ]
        .into_iter()
        .flatten()
        .map(|k| k.trim().to_string())
        .find(|k| !k.is_empty())
    }

    /// Resolve the business id.
    ///
    /// Priority: --business flag > CONCIERGE_BUSINESS env var > the only
    /// business in the catalog.
    pub fn resolve_business(&self, catalog_ids: &[String]) -> Option<String> {
        if let Some(ref b) = self.business {
            return Some(b.clone());
        }
        if let Ok(b) = std::env::var("CONCIERGE_BUSINESS") {
            return Some(b);
        }
        match catalog_ids {
            [only] => Some(only.clone()),
            _ => None,
        }
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > RUST_LOG (handled by the filter) > config
    /// file value. Returns `None` if not overridden.
    pub fn resolve_log_level(&self) -> Option<String> {
        self.log_level.clone()
    }
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(rest)
    } else {
        PathBuf::from(path)
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".concierge").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".concierge").join("config.toml");
    }
    PathBuf::from("config.toml")
}
