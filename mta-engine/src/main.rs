//! mta-engine - Magic trick extraction and cross-referencing
//!
//! Command-line front end over [`TrickEngine`]. Every command opens (or
//! creates) the database in the resolved root folder and prints its result
//! as JSON on stdout; logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mta_common::config::{write_toml_config, RootFolderInitializer, RootFolderResolver};
use mta_engine::config::MODULE_NAME;
use mta_engine::{EngineConfig, NewBook, RecomputeScope, TrickEngine};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "mta-engine", version, about = "Extract and cross-reference magic tricks")]
struct Cli {
    /// Root folder holding the database (overrides MTA_ROOT and the config file)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// TOML config file (overrides MTA_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Register a book from a UTF-8 text file
    Register {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        ocr_confidence: Option<f64>,
        #[arg(long)]
        text_file: PathBuf,
        /// Extract tricks right after registering
        #[arg(long)]
        extract: bool,
    },
    /// List registered books
    Books,
    /// Extract tricks from a book (stored text unless --text-file is given)
    Extract {
        #[arg(long)]
        book_id: Uuid,
        #[arg(long)]
        text_file: Option<PathBuf>,
    },
    /// Replace a book's text and re-extract its tricks
    Reprocess {
        #[arg(long)]
        book_id: Uuid,
        #[arg(long)]
        text_file: PathBuf,
    },
    /// List the tricks of a book
    Tricks {
        #[arg(long)]
        book_id: Uuid,
    },
    /// Recompute cross-references: "all", "book:<uuid>" or "trick:<uuid>"
    Recompute {
        #[arg(long, default_value = "all")]
        scope: RecomputeScope,
    },
    /// List the cross-references touching a trick
    Links {
        #[arg(long)]
        trick_id: Uuid,
    },
    /// List effect types, or append one with --add
    EffectTypes {
        #[arg(long)]
        add: Option<String>,
        #[arg(long, requires = "add")]
        description: Option<String>,
    },
    /// Corpus statistics
    Stats,
    /// Write the effective configuration as TOML
    WriteConfig {
        /// Destination (defaults to the located config file)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let resolver = RootFolderResolver::new(MODULE_NAME)
        .with_cli_arg(cli.root.clone())
        .with_config_path(cli.config.clone());
    let config_path = resolver.config_path();
    let config = EngineConfig::load(config_path.as_deref())
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_tracing(&config.logging.level);
    info!(version = env!("CARGO_PKG_VERSION"), "Starting mta-engine");

    if let Command::WriteConfig { path } = &cli.command {
        let target = path
            .clone()
            .or(config_path)
            .context("No config path given and no platform config directory")?;
        write_toml_config(&config, &target)
            .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", target.display(), e))?;
        info!(path = %target.display(), "Configuration written");
        return Ok(());
    }

    let root_folder = resolver.resolve();
    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .map_err(|e| anyhow::anyhow!("Failed to initialize root folder: {}", e))?;

    let db_path = initializer.database_path();
    info!(database = %db_path.display(), "Opening database");
    let pool = mta_common::db::init_database(&db_path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open database: {}", e))?;

    let engine = TrickEngine::new(pool, config);

    match cli.command {
        Command::Register {
            title,
            author,
            year,
            ocr_confidence,
            text_file,
            extract,
        } => {
            let text = read_text(&text_file)?;
            let book = engine
                .register_book(NewBook {
                    title,
                    author,
                    publication_year: year,
                    ocr_confidence,
                    text,
                })
                .await?;
            if extract {
                let tricks = engine.extract_stored(book.id).await?;
                info!(book_id = %book.id, tricks = tricks.len(), "Extraction complete");
            }
            print_json(&book)?;
        }
        Command::Books => print_json(&engine.list_books().await?)?,
        Command::Extract { book_id, text_file } => {
            let tricks = match text_file {
                Some(path) => engine.extract(book_id, &read_text(&path)?).await?,
                None => engine.extract_stored(book_id).await?,
            };
            print_json(&tricks)?;
        }
        Command::Reprocess { book_id, text_file } => {
            let tricks = engine.reprocess_book(book_id, &read_text(&text_file)?).await?;
            print_json(&tricks)?;
        }
        Command::Tricks { book_id } => print_json(&engine.tricks_for_book(book_id).await?)?,
        Command::Recompute { scope } => {
            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupt received, cancelling recompute");
                    on_interrupt.cancel();
                }
            });

            let edges = engine.recompute_cross_references(scope, &cancel).await?;
            print_json(&edges)?;
        }
        Command::Links { trick_id } => {
            print_json(&engine.cross_references_for_trick(trick_id).await?)?
        }
        Command::EffectTypes { add, description } => match add {
            Some(name) => {
                let added = engine.add_effect_type(&name, description.as_deref()).await?;
                print_json(&added)?;
            }
            None => print_json(&engine.effect_types().await?)?,
        },
        Command::Stats => print_json(&engine.corpus_stats().await?)?,
        Command::WriteConfig { .. } => {}
    }

    Ok(())
}
