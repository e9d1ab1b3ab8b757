use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use transit_catalogue::catalogue::CatalogueError;
use transit_catalogue::io::{BuildDocument, QueryHandler, ServeDocument, build_catalogue};
use transit_catalogue::routing::{BuildError, TransitGraph};
use transit_catalogue::snapshot::{Snapshot, SnapshotError};

/// Transit-network query engine.
#[derive(Parser)]
#[command(name = "transit-catalogue", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Read the JSON document from this file instead of stdin.
    #[arg(long, global = true)]
    input: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest a network description and write the binary snapshot.
    Build,
    /// Load a snapshot and answer stat requests as a JSON array.
    Serve,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse input document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid network description: {0}")]
    Ingest(#[from] CatalogueError),

    #[error("graph construction failed: {0}")]
    Graph(#[from] BuildError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Build => run_build(&cli),
        Command::Serve => run_serve(&cli),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn read_input(cli: &Cli) -> Result<String, CliError> {
    match &cli.input {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn run_build(cli: &Cli) -> Result<(), CliError> {
    let document: BuildDocument = serde_json::from_str(&read_input(cli)?)?;

    let catalogue = build_catalogue(&document.base_requests)?;
    let graph = TransitGraph::build(&catalogue, &document.routing_settings)?;

    info!(
        stops = catalogue.stops().len(),
        routes = catalogue.routes().len(),
        vertices = graph.graph().vertex_count(),
        edges = graph.graph().edge_count(),
        "network built"
    );

    Snapshot::capture(&catalogue, &graph, &document.render_settings)
        .save(&document.serialization_settings.file)?;
    Ok(())
}

fn run_serve(cli: &Cli) -> Result<(), CliError> {
    let document: ServeDocument = serde_json::from_str(&read_input(cli)?)?;

    let snapshot = Snapshot::load(&document.serialization_settings.file)?;
    let (catalogue, graph, _render) = snapshot.restore()?;

    let handler = QueryHandler::new(&catalogue, &graph);
    let responses = handler.handle_all(&document.stat_requests);
    info!(requests = responses.len(), "stat requests answered");

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer(&mut stdout, &responses)?;
    writeln!(stdout)?;
    Ok(())
}
