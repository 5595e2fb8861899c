//! Host-side wrapper that owns the world between frames

use orrery_core::{Graph, LayoutConfig, Viewport};
use tracing::{debug, info};

use crate::forces::Forces;
use crate::physics::{World, advance};
use crate::seed::seed_world;
use crate::strategy::compute_targets;
use crate::viewport::{ViewTransform, fit_to_content, placed_fraction};

/// Share of bodies that must be placed before the one-shot fit runs.
pub const FIT_QUORUM: f64 = 0.5;

/// Relaxation state for one graph. Single owner, advanced by [`Simulation::tick`].
#[derive(Debug, Clone)]
pub struct Simulation {
    world: World,
    forces: Forces,
    layout: LayoutConfig,
    dt: f64,
    ticks: u64,
    stopped: bool,
    view: Option<ViewTransform>,
    fit_pending: bool,
}

impl Simulation {
    pub fn new(graph: &Graph, layout: LayoutConfig, viewport: Viewport) -> Self {
        let targets = compute_targets(graph, &layout, viewport);
        let world = seed_world(graph, &targets, None, viewport);
        debug!("Simulation seeded with {} bodies", world.bodies.len());
        Simulation {
            world,
            forces: Forces::for_mode(&layout),
            layout,
            dt: 1.0,
            ticks: 0,
            stopped: false,
            view: None,
            fit_pending: true,
        }
    }

    /// Warm-start onto a rebuilt graph. Surviving bodies keep their state;
    /// `restart` (structure changed) resets energy to 1.0 and re-arms the fit.
    pub fn rebuild(&mut self, graph: &Graph, restart: bool) {
        let viewport = self.world.viewport;
        let targets = compute_targets(graph, &self.layout, viewport);
        self.world = seed_world(graph, &targets, Some(&self.world), viewport);
        if restart {
            info!("Structure changed, restarting simulation ({} bodies)", self.world.bodies.len());
            self.restart();
        }
    }

    /// Switch layout knobs; new targets are computed and the simulation restarts.
    pub fn set_layout(&mut self, graph: &Graph, layout: LayoutConfig) {
        self.layout = layout;
        self.forces = Forces::for_mode(&layout);
        self.retarget(graph);
        self.restart();
    }

    /// Follow a viewport resize with new targets.
    pub fn resize(&mut self, graph: &Graph, viewport: Viewport) {
        if viewport == self.world.viewport {
            return;
        }
        self.world.viewport = viewport;
        self.retarget(graph);
        self.reheat(0.5);
        self.fit_pending = true;
    }

    fn retarget(&mut self, graph: &Graph) {
        let targets = compute_targets(graph, &self.layout, self.world.viewport);
        for body in &mut self.world.bodies {
            body.target = targets.get(&body.id).copied();
        }
    }

    fn restart(&mut self) {
        self.world.alpha = 1.0;
        self.fit_pending = true;
        self.view = None;
    }

    /// One step while hot. Returns whether the world moved.
    pub fn tick(&mut self) -> bool {
        if self.stopped {
            return false;
        }
        let moved = self.world.is_hot();
        if moved {
            self.world = advance(&self.world, &self.forces, self.dt);
            self.ticks += 1;
        }
        if self.fit_pending && !self.world.is_hot() && placed_fraction(&self.world.bodies) >= FIT_QUORUM {
            self.view = fit_to_content(&self.world.bodies, self.world.viewport);
            self.fit_pending = self.view.is_none();
            debug!("Fit to view after {} ticks: {:?}", self.ticks, self.view);
        }
        moved
    }

    /// Tick until settled or `max_ticks` steps; returns the steps taken.
    pub fn run_until_settled(&mut self, max_ticks: u64) -> u64 {
        let start = self.ticks;
        while self.ticks - start < max_ticks && self.tick() {}
        self.ticks - start
    }

    /// Raise energy to at least `alpha`.
    pub fn reheat(&mut self, alpha: f64) {
        if self.stopped {
            return;
        }
        self.world.alpha = self.world.alpha.max(alpha.clamp(0.0, 1.0));
    }

    /// Energy floor held while an interaction is in progress.
    pub fn set_alpha_target(&mut self, alpha_target: f64) {
        self.world.alpha_target = alpha_target.clamp(0.0, 1.0);
    }

    /// Detach: no further ticks, reheats are ignored.
    pub fn stop(&mut self) {
        self.stopped = true;
        self.world.alpha = 0.0;
        self.world.alpha_target = 0.0;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn is_hot(&self) -> bool {
        !self.stopped && self.world.is_hot()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn view(&self) -> Option<ViewTransform> {
        self.view
    }

    pub fn viewport(&self) -> Viewport {
        self.world.viewport
    }
}
