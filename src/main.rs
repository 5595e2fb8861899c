//! Orrery CLI entry point

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use orrery_core::LayoutMode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "orrery")]
#[command(about = "Live dependency-graph layout for code repositories", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Repository root path (defaults to current directory)
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    /// Config file (defaults to <root>/orrery.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

/// Where the graph comes from and per-run layout overrides
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Snapshot with files and edges; without it the root is walked
    #[arg(short, long)]
    pub snapshot: Option<PathBuf>,

    /// Snapshot providing edges for a walked root
    #[arg(long, conflicts_with = "snapshot")]
    pub edges: Option<PathBuf>,

    /// Layout mode (hub-spine, radial, hierarchical, grid, metro)
    #[arg(short, long)]
    pub mode: Option<LayoutMode>,

    /// Maximum number of nodes
    #[arg(short, long)]
    pub budget: Option<usize>,

    /// Spacing factor in pixels
    #[arg(long)]
    pub spacing: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the live layout server
    Serve {
        #[command(flatten)]
        input: InputArgs,

        /// Port to listen on
        #[arg(short, long, default_value = "7890")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Open the health page in a browser (rendering is done by a
        /// separate client connected to /ws)
        #[arg(short, long)]
        open: bool,

        /// Do not rebuild when inputs change
        #[arg(long)]
        no_watch: bool,
    },
    /// Settle the layout headlessly and print the final frame as JSON
    Layout {
        #[command(flatten)]
        input: InputArgs,

        /// Upper bound on simulation steps
        #[arg(long, default_value = "2000")]
        ticks: u64,

        /// Write the frame here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Build the graph and print its statistics
    Stats {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Show version
    Version,
}

const CRATES: [&str; 6] = [
    "orrery",
    "orrery_core",
    "orrery_layout",
    "orrery_interact",
    "orrery_server",
    "orrery_watcher",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG takes precedence over --verbose
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directives: Vec<String> = CRATES.iter().map(|c| format!("{c}={log_level}")).collect();
        EnvFilter::new(directives.join(","))
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Orrery v{}", env!("CARGO_PKG_VERSION"));
    tracing::debug!("Repository root: {}", cli.root.display());

    let ctx = commands::Context {
        root: cli.root,
        config: cli.config,
    };
    match cli.command {
        Commands::Serve {
            input,
            port,
            host,
            open,
            no_watch,
        } => commands::serve(&ctx, &input, host, port, open, !no_watch).await,
        Commands::Layout { input, ticks, output } => commands::layout(&ctx, &input, ticks, output),
        Commands::Stats { input } => commands::stats(&ctx, &input),
        Commands::Version => {
            println!("Orrery v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
