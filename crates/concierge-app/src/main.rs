//! Concierge application binary - composition root.
//!
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Initialize tracing
//! 3. Load the business catalog and pick the generator
//! 4. Run the requested command (interactive chat, one-shot ask, explain,
//!    or list businesses)

mod cli;

use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use concierge_chat::{generator, BusinessCatalog, ConversationEngine, KnowledgeStore};
use concierge_core::ConciergeConfig;
use concierge_retrieval::Retrieval;

use crate::cli::{CliArgs, Command};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = ConciergeConfig::load_or_default(&config_file);

    // Tracing.
    let filter = match args.resolve_log_level() {
        Some(level) => tracing_subscriber::EnvFilter::new(level),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting Concierge v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // Catalog.
    let catalog_path = args.resolve_catalog_path(&config.catalog.path);
    let catalog = match BusinessCatalog::load(&catalog_path) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            tracing::error!(
                path = %catalog_path.display(),
                error = %e,
                "Failed to load business catalog"
            );
            return Err(e.into());
        }
    };

    if args.command() == Command::Businesses {
        let list = catalog.list_businesses().await?;
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    let Some(business_id) = args.resolve_business(catalog.ids()) else {
        tracing::error!(
            businesses = catalog.len(),
            "No business selected; pass --business or set CONCIERGE_BUSINESS"
        );
        return Err("no business selected".into());
    };

    // Generator.
    config.generator.api_key = args.resolve_api_key(config.generator.api_key.as_deref());
    let generator = generator::from_config(&config.generator)?;

    let engine = ConversationEngine::new(&config, catalog, generator);
    let session_id = args
        .session
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    match args.command() {
        Command::Ask { message, json } => {
            let response = engine.answer(&message, &business_id, &session_id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!("{}", response.response);
            }
        }
        Command::Explain { query } => {
            let report = engine.explain(&business_id, &query).await?;
            print_explain(&report);
        }
        Command::Chat => chat_loop(&engine, &business_id, &session_id).await?,
        Command::Businesses => {}
    }

    Ok(())
}

/// Read messages from stdin until EOF or `/quit`.
///
/// Slash commands: `/history`, `/clear`, `/stats`, `/quit`.
async fn chat_loop(
    engine: &ConversationEngine,
    business_id: &str,
    session_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(business = business_id, session = session_id, "Interactive chat started");

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();

        match line {
            "" => continue,
            "/quit" | "/exit" => break,
            "/history" => {
                for turn in engine.history(session_id)? {
                    println!("[{:?}] {}", turn.role, turn.content);
                }
            }
            "/clear" => {
                engine.clear_history(Some(session_id))?;
                println!("(history cleared)");
            }
            "/stats" => println!("{}", serde_json::to_string_pretty(&engine.stats()?)?),
            message => match engine.answer(message, business_id, session_id).await {
                Ok(response) => {
                    if let Some(greeting) = response.initial_message {
                        println!("{}", greeting);
                    }
                    println!("{}", response.response);
                    if !response.suggestions.is_empty() {
                        println!("  ({})", response.suggestions.join(" | "));
                    }
                }
                Err(e) if e.is_client_error() => println!("({})", e),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to answer message");
                    return Err(e.into());
                }
            },
        }
    }

    Ok(())
}

fn print_explain(report: &Retrieval) {
    if let Some(note) = &report.normalization.note {
        println!(
            "normalized from {} ({:?}) to {:?}",
            note.original_language, note.original_text, report.normalization.text
        );
    }
    println!("max score: {:.3}", report.max_score);
    for m in &report.contexts {
        let signals: Vec<String> = m.signals.iter().map(|s| format!("{:?}", s)).collect();
        println!(
            "  #{:<3} {:>7.3}  [{}]",
            m.entry_index,
            m.score,
            signals.join(", ")
        );
    }
}
