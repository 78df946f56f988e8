use clap::{Parser, Subcommand};
use std::path::PathBuf;

use reforge::cli;

#[derive(Parser)]
#[command(
    name = "reforge",
    version,
    about = "Project inventory and transformation progress tracking for AI coding assistants"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the MCP server on stdio
    Serve,

    /// Scan a project and initialize its progress ledger
    Scan {
        /// Project root directory
        path: PathBuf,

        /// Include test directories and test files
        #[arg(long)]
        include_tests: bool,

        /// Discard prior completion state instead of preserving it
        #[arg(long)]
        reset_completed: bool,
    },

    /// Show transformation progress statistics
    Stats {
        /// Project root directory
        path: PathBuf,
    },

    /// Mark files complete in the progress ledger
    Record {
        /// Project root directory
        path: PathBuf,

        /// Project-relative paths, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        files: Vec<String>,

        /// Note stored with this update
        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Clear completion state, keeping the tracked file list
    Reset {
        /// Project root directory
        path: PathBuf,
    },

    /// Inject rule templates into an editor workspace
    Inject {
        /// Project root directory
        path: PathBuf,

        /// Editor workspace root receiving .cursor/rules
        #[arg(long)]
        editor_root: PathBuf,

        /// Application theme woven into the generated rules
        #[arg(long)]
        theme: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Stdout is reserved for tool payloads (and the MCP protocol under
    // `serve`); logging goes to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve => cli::serve::run().await?,
        Commands::Scan {
            path,
            include_tests,
            reset_completed,
        } => cli::scan::run(&path, include_tests, reset_completed)?,
        Commands::Stats { path } => cli::progress::run_stats(&path)?,
        Commands::Record { path, files, notes } => {
            cli::progress::run_record(&path, &files, &notes)?
        }
        Commands::Reset { path } => cli::progress::run_reset(&path)?,
        Commands::Inject {
            path,
            editor_root,
            theme,
        } => cli::inject::run(&path, &editor_root, theme.as_deref())?,
    }
    Ok(())
}
