//! texquery command-line entry point.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    prelude::*,
    registry::Registry,
};

use texquery::store::{HttpDocumentStore, HttpPreprocessor};
use texquery::{Config, QueryService, Snapshot, run_updates};

/// Approximate search over LaTeX formulas.
#[derive(Parser)]
#[command(name = "texquery", version, about)]
struct Cli {
    /// Path of the persistent index snapshot.
    #[arg(long, env = "TEXQUERY_SNAPSHOT", default_value = "/opt/texquery/index_store")]
    snapshot_path: PathBuf,

    /// Base URL of the document store.
    #[arg(long, env = "TEXQUERY_STORE", default_value = "http://127.0.0.1:5984/documents")]
    store_url: String,

    /// URL of the LaTeX preprocessor endpoint.
    #[arg(
        long,
        env = "TEXQUERY_PREPROCESSOR",
        default_value = "http://127.0.0.1:8085/preprocess"
    )]
    preprocessor_url: String,

    /// Increase log verbosity (-v, -vv, ...).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a fresh, empty index snapshot (asks for confirmation).
    Init,
    /// Pull document updates and apply them until the index is current.
    Update,
    /// Serve queries: one JSON request per stdin line, one JSON response
    /// per stdout line.
    Query,
}

fn init_tracing(quiet: bool, verbose: u8) {
    let level_filter = if quiet {
        LevelFilter::ERROR
    } else {
        match verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    };

    // Bridge log crate macros to tracing (the library logs via log::*).
    tracing_log::LogTracer::init().expect("Failed to set log tracer");

    let env_filter = EnvFilter::builder()
        .with_default_directive(level_filter.into())
        .with_env_var("TEXQUERY_LOG")
        .from_env_lossy();

    let subscriber = Registry::default().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .compact(),
    );
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose);

    let config = Config {
        snapshot_path: cli.snapshot_path,
        store_url: cli.store_url,
        preprocessor_url: cli.preprocessor_url,
    };

    match cli.command {
        Command::Init => init(&config),
        Command::Update => update(&config),
        Command::Query => query(&config),
    }
}

fn init(config: &Config) -> Result<()> {
    print!(
        "This will replace the index at {} with an empty one. Continue? (y/n) ",
        config.snapshot_path.display()
    );
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    if answer.trim() != "y" {
        println!("Aborted.");
        return Ok(());
    }

    if let Some(dir) = config.snapshot_path.parent()
        && !dir.as_os_str().is_empty()
    {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating {}", dir.display()))?;
    }
    Snapshot::empty()
        .save(&config.snapshot_path)
        .context("writing empty snapshot")?;
    println!("Empty index written to {}.", config.snapshot_path.display());
    Ok(())
}

fn update(config: &Config) -> Result<()> {
    let store = HttpDocumentStore::new(config.store_url.clone());
    let last = run_updates(&store, &config.snapshot_path).context("reconciling updates")?;
    println!("Index is current at sequence {last}.");
    Ok(())
}

fn query(config: &Config) -> Result<()> {
    let snapshot = Snapshot::load(&config.snapshot_path).context("loading snapshot")?;
    let store = HttpDocumentStore::new(config.store_url.clone());
    let preprocessor = HttpPreprocessor::new(config.preprocessor_url.clone());
    let service = QueryService::new(&snapshot, &store, &preprocessor);

    let stdin = io::stdin();
    let stdout = io::stdout();
    service
        .serve(stdin.lock(), stdout.lock())
        .context("serving queries")?;
    Ok(())
}
