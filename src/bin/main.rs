//! Groundwork CLI - Ground decomposed queries in a schema catalog
//!
//! Usage:
//!   groundwork enrich <query.json>... [--catalog <catalog.json>] [--today <YYYY-MM-DD>]
//!   groundwork resolve --table <name> --entity-type <type> --value <value>
//!   groundwork tables
//!
//! Examples:
//!   groundwork enrich open_orders.json --catalog demos/catalog.json
//!   groundwork enrich q1.json q2.json --catalog demos/catalog.json --compact
//!   groundwork resolve --catalog demos/catalog.json --table orders --entity-type status --value open

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use groundwork::config::Settings;
use groundwork::filters::FixedClock;
use groundwork::metadata::{InMemoryMetadataProvider, MetadataProvider};
use groundwork::query::{DecomposedQuery, QueryValue};
use groundwork::resolver::EntityColumnResolver;
use groundwork::ContextAssembler;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "groundwork")]
#[command(about = "Groundwork - Ground decomposed natural-language queries in a database schema")]
#[command(version)]
struct Cli {
    /// Path to a groundwork.toml (defaults to the usual search locations)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the JSON metadata catalog (overrides metadata.catalog_path)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enrich one or more decomposed queries into SQL-ready context
    Enrich {
        /// Decomposed query JSON files (flat or query_decomposition envelope)
        #[arg(required = true)]
        queries: Vec<PathBuf>,

        /// Resolve relative dates against this day instead of today
        #[arg(long)]
        today: Option<NaiveDate>,

        /// Print single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// Resolve a single entity to a column
    Resolve {
        /// Table to resolve against
        #[arg(short, long)]
        table: String,

        /// Entity type, e.g. status
        #[arg(short, long)]
        entity_type: String,

        /// Entity value; JSON numbers and arrays are accepted
        #[arg(long)]
        value: String,
    },

    /// List tables in the catalog
    Tables,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = match load_settings(cli.config.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let provider = match load_provider(cli.catalog.as_deref(), &settings) {
        Ok(p) => Arc::new(p),
        Err(e) => {
            eprintln!("Error loading catalog: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Enrich {
            queries,
            today,
            compact,
        } => cmd_enrich(provider, &settings, queries, today, compact).await,
        Commands::Resolve {
            table,
            entity_type,
            value,
        } => cmd_resolve(provider, &settings, &table, &entity_type, &value).await,
        Commands::Tables => cmd_tables(provider).await,
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        "groundwork=debug"
    } else {
        "groundwork=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout carries JSON only
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(path: Option<&Path>) -> Result<Settings, String> {
    match path {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    }
    .map_err(|e| e.to_string())
}

fn load_provider(
    catalog: Option<&Path>,
    settings: &Settings,
) -> Result<InMemoryMetadataProvider, String> {
    let path = match catalog {
        Some(path) => path.to_path_buf(),
        None => settings
            .metadata
            .resolved_catalog_path()
            .map_err(|e| e.to_string())?
            .ok_or("no catalog given; pass --catalog or set metadata.catalog_path")?,
    };

    tracing::debug!(path = %path.display(), "loading catalog");
    InMemoryMetadataProvider::from_path(&path).map_err(|e| format!("{}: {}", path.display(), e))
}

async fn cmd_enrich(
    provider: Arc<InMemoryMetadataProvider>,
    settings: &Settings,
    files: Vec<PathBuf>,
    today: Option<NaiveDate>,
    compact: bool,
) -> ExitCode {
    let mut assembler = ContextAssembler::from_settings(provider, settings);
    if let Some(day) = today {
        assembler = assembler.with_clock(Arc::new(FixedClock(day)));
    }

    let mut parsed = Vec::with_capacity(files.len());
    for file in &files {
        let query = fs::read_to_string(file)
            .map_err(|e| e.to_string())
            .and_then(|s| DecomposedQuery::from_json(&s).map_err(|e| e.to_string()));
        match query {
            Ok(q) => parsed.push((file, q)),
            Err(e) => {
                eprintln!("Error reading query '{}': {}", file.display(), e);
                return ExitCode::FAILURE;
            }
        }
    }

    // One shared provider, all queries in flight together
    let results =
        futures::future::join_all(parsed.iter().map(|(_, q)| assembler.enrich(q))).await;

    let mut failed = false;
    for ((file, _), result) in parsed.iter().zip(results) {
        let data = match result {
            Ok(data) => data,
            Err(e) => {
                eprintln!("Error enriching '{}': {}", file.display(), e);
                failed = true;
                continue;
            }
        };

        let rendered = if compact {
            serde_json::to_string(&data)
        } else {
            serde_json::to_string_pretty(&data)
        };
        match rendered {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing '{}': {}", file.display(), e);
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

async fn cmd_resolve(
    provider: Arc<InMemoryMetadataProvider>,
    settings: &Settings,
    table: &str,
    entity_type: &str,
    value: &str,
) -> ExitCode {
    let resolver = EntityColumnResolver::with_config(provider, settings.resolver_config());
    let value: QueryValue =
        serde_json::from_str(value).unwrap_or_else(|_| QueryValue::text(value));

    match resolver.resolve(entity_type, &value, table).await {
        Ok(hit) => {
            let json = serde_json::json!({
                "column_name": hit.column_name,
                "confidence": hit.confidence,
                "strategy": hit.strategy,
            });
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Resolution error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn cmd_tables(provider: Arc<InMemoryMetadataProvider>) -> ExitCode {
    let tables = match provider.list_tables().await {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error listing tables: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if tables.is_empty() {
        println!("No tables defined.");
        return ExitCode::SUCCESS;
    }

    println!("Tables:");
    for name in &tables {
        match provider.get_table_metadata(name).await {
            Ok(Some(table)) => {
                let keys: Vec<_> = table.primary_keys.iter().map(String::as_str).collect();
                println!(
                    "  - {} ({} columns, keys: {})",
                    table.name,
                    table.columns.len(),
                    keys.join(", ")
                );
            }
            _ => println!("  - {}", name),
        }
    }

    ExitCode::SUCCESS
}
