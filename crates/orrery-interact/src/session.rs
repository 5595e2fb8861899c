//! Single-writer session: graph, simulation and controller behind one owner
//!
//! Interactions are queued by [`Session::submit`] and only take effect in
//! [`Session::frame`], which applies them before the physics step, then
//! resolves highlighting and renders.

use std::collections::VecDeque;

use orrery_core::{BuildOutcome, BuildReport, DiffEngine, Graph, GraphDiff, LayoutConfig, NodeId, OrreryConfig, Viewport};
use orrery_layout::Simulation;
use tracing::{debug, info};

use crate::blast::blast_radius;
use crate::controller::{Controller, ControllerConfig, Interaction, SessionEvent};
use crate::frame::{Frame, FrameMeta, render};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    pub layout: LayoutConfig,
    pub viewport: Viewport,
    pub controller: ControllerConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig::from(&OrreryConfig::default())
    }
}

impl From<&OrreryConfig> for SessionConfig {
    fn from(config: &OrreryConfig) -> Self {
        SessionConfig {
            layout: config.layout(),
            viewport: config.viewport,
            controller: ControllerConfig {
                drag_threshold_px: f64::from(config.drag_threshold_px),
                blast_radius_cap: config.blast_radius_cap,
            },
        }
    }
}

#[derive(Debug)]
pub struct Session {
    graph: Graph,
    report: BuildReport,
    diffs: DiffEngine,
    sequence: u64,
    sim: Simulation,
    controller: Controller,
    pending: VecDeque<Interaction>,
    events: Vec<SessionEvent>,
}

impl Session {
    pub fn new(outcome: BuildOutcome, config: SessionConfig) -> Self {
        let sim = Simulation::new(&outcome.graph, config.layout, config.viewport);
        info!(
            "Session started: {} nodes, {} edges, {} layout",
            outcome.graph.node_count(),
            outcome.graph.edge_count(),
            config.layout.mode
        );
        Session {
            graph: outcome.graph,
            report: outcome.report,
            diffs: DiffEngine::new(),
            sequence: 0,
            sim,
            controller: Controller::new(config.controller),
            pending: VecDeque::new(),
            events: Vec::new(),
        }
    }

    /// Queue an interaction for the next frame.
    pub fn submit(&mut self, interaction: Interaction) {
        self.pending.push_back(interaction);
    }

    /// Swap in a rebuilt graph, warm-starting the simulation.
    pub fn rebuild(&mut self, outcome: BuildOutcome) -> GraphDiff {
        let diff = self.diffs.compute_diff(&self.graph, &outcome.graph);
        self.sequence = diff.sequence;
        info!(
            "Rebuild #{}: +{} -{} nodes, +{} -{} edges",
            diff.sequence,
            diff.added_nodes.len(),
            diff.removed_nodes.len(),
            diff.added_edges.len(),
            diff.removed_edges.len()
        );
        self.graph = outcome.graph;
        self.report = outcome.report;
        self.sim.rebuild(&self.graph, diff.is_structural());
        self.controller.after_rebuild(&self.graph, &mut self.sim);
        diff
    }

    /// Apply pending interactions, advance physics one step, render.
    pub fn frame(&mut self) -> Frame {
        while let Some(interaction) = self.pending.pop_front() {
            debug!("Applying {:?}", interaction);
            if let Some(event) = self.controller.apply(interaction, &self.graph, &mut self.sim) {
                self.events.push(event);
            }
        }
        self.sim.tick();
        self.controller.sync_view(&self.sim);
        self.render()
    }

    /// Render the current state without applying or ticking anything.
    pub fn render(&self) -> Frame {
        let focus = self.controller.highlight_state(&self.graph).focus();
        let meta = FrameMeta {
            sequence: self.sequence,
            degraded: self.report.degraded,
            view: self.controller.view().transform(),
        };
        render(&self.graph, &self.sim, &focus, meta)
    }

    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn blast_radius(&self, id: &NodeId) -> Vec<NodeId> {
        blast_radius(&self.graph, id, self.controller.config().blast_radius_cap)
    }

    /// Work is waiting: pending interactions or a hot simulation.
    pub fn is_active(&self) -> bool {
        !self.pending.is_empty() || self.sim.is_hot()
    }

    pub fn stop(&mut self) {
        self.pending.clear();
        self.sim.stop();
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }
}
