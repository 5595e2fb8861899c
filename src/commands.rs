//! CLI command implementations

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use orrery_core::{BuildOutcome, OrreryConfig};
use orrery_interact::{Session, SessionConfig};
use orrery_server::{OrreryServer, ServerConfig};
use orrery_watcher::{RebuildService, Source};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::InputArgs;

const DEGRADED_NOTE: &str = "no files or no dependency edges; showing folder structure only";

/// Options shared by every command.
pub struct Context {
    pub root: PathBuf,
    pub config: Option<PathBuf>,
}

/// Config file (or defaults), then `ORRERY_*` variables, then flags.
pub fn resolve_config(ctx: &Context, input: &InputArgs) -> Result<OrreryConfig> {
    let mut config = match &ctx.config {
        Some(path) => OrreryConfig::load(path)?,
        None => OrreryConfig::discover(&ctx.root)?,
    };
    config.apply_env(|key| std::env::var(key).ok())?;
    if let Some(mode) = input.mode {
        config.layout_mode = mode;
    }
    if let Some(budget) = input.budget {
        config.node_budget = budget;
    }
    if let Some(spacing) = input.spacing {
        config.spacing_factor = spacing;
    }
    config.validate()?;
    Ok(config)
}

pub fn resolve_source(root: &Path, input: &InputArgs) -> Source {
    match &input.snapshot {
        Some(path) => Source::Snapshot(path.clone()),
        None => Source::Tree {
            root: root.to_path_buf(),
            edges: input.edges.clone(),
        },
    }
}

fn load(ctx: &Context, input: &InputArgs) -> Result<(OrreryConfig, Source, BuildOutcome)> {
    let config = resolve_config(ctx, input)?;
    let source = resolve_source(&ctx.root, input);
    let outcome = source.build(config.node_budget)?;
    let report = &outcome.report;
    info!(
        "Built graph: {} nodes, {} edges ({} skipped, {} pruned)",
        outcome.graph.node_count(),
        outcome.graph.edge_count(),
        report.skipped.len(),
        report.pruned
    );
    if report.pruned > 0 {
        info!(
            "Node budget {} reached; {} nodes folded into their folders",
            config.node_budget, report.pruned
        );
    }
    if report.degraded {
        warn!("{}", DEGRADED_NOTE);
    }
    Ok((config, source, outcome))
}

pub async fn serve(
    ctx: &Context,
    input: &InputArgs,
    host: String,
    port: u16,
    open_browser: bool,
    watch: bool,
) -> Result<()> {
    let (config, source, outcome) = load(ctx, input)?;
    let session = Session::new(outcome, SessionConfig::from(&config));
    let server = OrreryServer::new(
        session,
        ServerConfig {
            host: host.clone(),
            port,
            ..ServerConfig::default()
        },
    );

    let (tx, rx) = mpsc::unbounded_channel();
    let watcher = if watch {
        let service = RebuildService::new(&source, config.node_budget, tx)?;
        Some(tokio::spawn(async move {
            if let Err(e) = service.run().await {
                error!("Watcher stopped: {}", e);
            }
        }))
    } else {
        drop(tx);
        None
    };

    if open_browser {
        let url = browser_url(&host, port);
        if let Err(e) = open::that(&url) {
            warn!("Failed to open browser: {}", e);
        }
    }

    let result = server.start(rx).await;
    if let Some(task) = watcher {
        task.abort();
    }
    result
}

/// Page opened by `serve --open`. Frames go to an external renderer over
/// `/ws`; the server itself only answers JSON.
fn browser_url(host: &str, port: u16) -> String {
    format!("http://{host}:{port}/api/health")
}

/// Run the simulation without a server and emit the last frame.
pub fn layout(ctx: &Context, input: &InputArgs, ticks: u64, output: Option<PathBuf>) -> Result<()> {
    let (config, _, outcome) = load(ctx, input)?;
    let mut session = Session::new(outcome, SessionConfig::from(&config));

    let mut frame = session.frame();
    while session.is_active() && frame.tick < ticks {
        frame = session.frame();
    }
    if session.is_active() {
        warn!("Layout still moving after {} ticks", frame.tick);
    } else {
        info!("Layout settled after {} ticks", frame.tick);
    }

    let json = serde_json::to_string_pretty(&frame)?;
    match output {
        Some(path) => {
            std::fs::write(&path, json).with_context(|| format!("cannot write {}", path.display()))?;
            info!("Wrote frame to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

pub fn stats(ctx: &Context, input: &InputArgs) -> Result<()> {
    let (_, _, outcome) = load(ctx, input)?;
    let stats = outcome.graph.stats();
    let report = &outcome.report;

    println!("Nodes:          {}", outcome.graph.node_count());
    println!("  files:        {}", stats.files);
    println!("  folders:      {}", stats.folders);
    println!("  packages:     {}", stats.packages);
    println!("Edges:          {}", outcome.graph.edge_count());
    println!("  internal:     {}", stats.internal_edges);
    println!("  external:     {}", stats.external_edges);
    println!("  contains:     {}", stats.contains_edges);
    println!("Skipped edges:  {}", report.skipped.len());
    println!("Self edges:     {}", report.self_edges);
    println!("Pruned nodes:   {}", report.pruned);
    if report.degraded {
        println!("Degraded: {DEGRADED_NOTE}");
    }
    for warning in report.skipped.iter().take(10) {
        println!("  skipped: {warning}");
    }
    Ok(())
}
