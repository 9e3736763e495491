//! Command-line entry point.
//!
//! # Responsibility
//! - Build the note/tag graph from a Bear database and print it.
//! - List store tables for quick diagnostics.
//!
//! # Invariants
//! - Graph output goes to stdout; logs go to stderr or rolling files.
//! - Exit code is 0 on success, 2 when the store cannot be used, 1 otherwise.

use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use notegraph_core::{
    build_graph, default_log_level, init_logging, init_stderr_logging, list_tables,
    open_note_store, resolve_db_path, GraphBuildError, GraphConfig, SqliteNoteSource,
    StoreError, DEFAULT_BACKLINKS_HEADER,
};
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::process::ExitCode;

const CLI_LOG_LEVEL: &str = "warn";

#[derive(Debug, Parser)]
#[command(name = "notegraph")]
#[command(about = "Build a tag and backlink graph from a Bear note database", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build the pruned note/tag graph
    Build {
        /// Path to the Bear database
        #[arg(long, env = "NOTEGRAPH_DB_PATH")]
        db: Option<PathBuf>,

        /// Header that starts the auto-generated backlinks section
        #[arg(long, default_value = DEFAULT_BACKLINKS_HEADER, allow_hyphen_values = true)]
        backlinks_header: String,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
        format: OutputFormat,

        /// Log level (trace, debug, info, warn, error)
        #[arg(long)]
        log_level: Option<String>,

        /// Absolute directory for rolling log files; stderr when omitted
        #[arg(long)]
        log_dir: Option<PathBuf>,
    },

    /// List store tables with row counts
    Tables {
        /// Path to the Bear database
        #[arg(long, env = "NOTEGRAPH_DB_PATH")]
        db: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Summary,
    Json,
}

#[derive(Debug)]
enum CliError {
    NoStorePath,
    Logging(String),
    Store(StoreError),
    Build(GraphBuildError),
    Output(serde_json::Error),
}

impl CliError {
    fn exit_status(&self) -> u8 {
        match self {
            Self::NoStorePath | Self::Store(_) => 2,
            Self::Build(GraphBuildError::DataSourceUnavailable(_)) => 2,
            Self::Build(_) | Self::Logging(_) | Self::Output(_) => 1,
        }
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoStorePath => write!(
                f,
                "no note store path; pass --db or set NOTEGRAPH_DB_PATH"
            ),
            Self::Logging(message) => write!(f, "logging setup failed: {message}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Build(err) => write!(f, "{err}"),
            Self::Output(err) => write!(f, "failed to render output: {err}"),
        }
    }
}

impl From<StoreError> for CliError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<GraphBuildError> for CliError {
    fn from(value: GraphBuildError) -> Self {
        Self::Build(value)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("notegraph: {err}");
            ExitCode::from(err.exit_status())
        }
    }
}

fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Build {
            db,
            backlinks_header,
            format,
            log_level,
            log_dir,
        } => {
            setup_logging(log_level.as_deref(), log_dir)?;
            let path = resolve_db_path(db).ok_or(CliError::NoStorePath)?;
            let conn = open_note_store(&path)?;
            let source = SqliteNoteSource::try_new(&conn)?;
            let config = GraphConfig::with_backlinks_header(backlinks_header);
            let graph = build_graph(source, &config)?;
            info!(
                "event=cli_build module=cli status=ok nodes={} edges={}",
                graph.nodes().len(),
                graph.edges().len()
            );

            match format {
                OutputFormat::Summary => println!("{}", graph.summary()),
                OutputFormat::Json => {
                    let rendered =
                        serde_json::to_string_pretty(&graph).map_err(CliError::Output)?;
                    println!("{rendered}");
                }
            }
            Ok(())
        }
        Command::Tables { db } => {
            setup_logging(None, None)?;
            let path = resolve_db_path(db).ok_or(CliError::NoStorePath)?;
            let conn = open_note_store(&path)?;
            for table in list_tables(&conn)? {
                println!("{}\t{}", table.name, table.row_count);
            }
            Ok(())
        }
    }
}

fn setup_logging(level: Option<&str>, log_dir: Option<PathBuf>) -> Result<(), CliError> {
    match log_dir {
        Some(dir) => {
            let dir = dir
                .to_str()
                .ok_or_else(|| CliError::Logging("log_dir must be valid UTF-8".to_string()))?
                .to_string();
            init_logging(level.unwrap_or(default_log_level()), &dir)
        }
        None => init_stderr_logging(level.unwrap_or(CLI_LOG_LEVEL)),
    }
    .map_err(CliError::Logging)
}
