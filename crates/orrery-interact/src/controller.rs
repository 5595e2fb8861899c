//! Interaction state machine: pointer gestures, search, selection and view

use std::collections::HashSet;

use orrery_core::{Graph, LayoutConfig, LayoutMode, NodeId, Viewport};
use orrery_layout::{Point, Simulation};
use tracing::debug;

use crate::blast::{DEFAULT_BLAST_CAP, blast_radius};
use crate::drag::DragState;
use crate::highlight::HighlightState;
use crate::search::SearchState;
use crate::view::ViewState;

/// Energy held while a drag is active.
pub const DRAG_ALPHA_TARGET: f64 = 0.3;
/// Energy after a drag is released.
pub const RELEASE_ALPHA: f64 = 0.3;

/// One user action. Pointer coordinates are in screen space.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    PointerDown { at: Point, node: Option<NodeId> },
    PointerMove { at: Point },
    PointerUp,
    Search(String),
    Select(Option<NodeId>),
    SetLayout(LayoutMode),
    Resize(Viewport),
    Zoom { factor: f64, at: Point },
    Fit,
}

/// Notifications for the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Selected(NodeId),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerConfig {
    pub drag_threshold_px: f64,
    pub blast_radius_cap: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        ControllerConfig {
            drag_threshold_px: 5.0,
            blast_radius_cap: DEFAULT_BLAST_CAP,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Controller {
    config: ControllerConfig,
    drag: Option<DragState>,
    /// Pointer went down on empty canvas.
    background_press: bool,
    search: SearchState,
    selected: Option<NodeId>,
    view: ViewState,
}

impl Controller {
    pub fn new(config: ControllerConfig) -> Self {
        Controller {
            config,
            ..Default::default()
        }
    }

    /// Apply one interaction to the controller and, where needed, the simulation.
    pub fn apply(&mut self, interaction: Interaction, graph: &Graph, sim: &mut Simulation) -> Option<SessionEvent> {
        match interaction {
            Interaction::PointerDown { at, node } => self.pointer_down(at, node, graph, sim),
            Interaction::PointerMove { at } => self.pointer_move(at, sim),
            Interaction::PointerUp => return self.pointer_up(sim),
            Interaction::Search(query) => self.search(&query, graph, sim),
            Interaction::Select(node) => return self.select(node, graph),
            Interaction::SetLayout(mode) => {
                let layout = LayoutConfig {
                    mode,
                    ..*sim.layout()
                };
                sim.set_layout(graph, layout);
            }
            Interaction::Resize(viewport) => {
                if !viewport.is_degenerate() {
                    sim.resize(graph, viewport);
                }
            }
            Interaction::Zoom { factor, at } => self.view.zoom_at(factor, at),
            Interaction::Fit => self.view.fit(&sim.world().bodies, sim.viewport()),
        }
        None
    }

    fn pointer_down(&mut self, at: Point, node: Option<NodeId>, graph: &Graph, sim: &mut Simulation) {
        // A press without a release in between still ends the previous drag.
        if let Some(stale) = self.drag.take().filter(DragState::is_active) {
            debug!("Drag on {} ended without a release", stale.node);
            release(sim);
        }
        let pointer = self.view.to_world(at);
        self.drag = node.and_then(|id| {
            DragState::begin(graph, sim.world(), &id, at, pointer, self.config.drag_threshold_px)
        });
        self.background_press = self.drag.is_none();
    }

    fn pointer_move(&mut self, at: Point, sim: &mut Simulation) {
        let pointer = self.view.to_world(at);
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        if drag.move_to(at, pointer) {
            debug!("Drag started on {}", drag.node);
            sim.set_alpha_target(DRAG_ALPHA_TARGET);
            sim.reheat(DRAG_ALPHA_TARGET);
        }
        let world = sim.world_mut();
        for (id, pin) in drag.pins() {
            if let Some(body) = world.body_mut(&id) {
                body.pinned = Some(pin);
                body.position = pin;
            }
        }
    }

    fn pointer_up(&mut self, sim: &mut Simulation) -> Option<SessionEvent> {
        let background = std::mem::take(&mut self.background_press);
        let drag = self.drag.take();
        match drag {
            Some(drag) if drag.is_active() => {
                release(sim);
                None
            }
            Some(click) => {
                self.selected = Some(click.node.clone());
                Some(SessionEvent::Selected(click.node))
            }
            None => {
                if background {
                    self.selected = None;
                }
                None
            }
        }
    }

    fn search(&mut self, query: &str, graph: &Graph, sim: &Simulation) {
        if query.trim().is_empty() {
            self.search.clear();
            return;
        }
        let first = self.search.set_query(graph, query).cloned();
        if self.selected.is_none() {
            self.focus_on(first.as_ref(), sim);
        }
    }

    fn focus_on(&mut self, node: Option<&NodeId>, sim: &Simulation) {
        if let Some(position) = node.and_then(|id| sim.world().position(id)) {
            self.view.center_on(position, sim.viewport());
        }
    }

    fn select(&mut self, node: Option<NodeId>, graph: &Graph) -> Option<SessionEvent> {
        match node {
            Some(id) if graph.contains_node(&id) => {
                self.selected = Some(id.clone());
                Some(SessionEvent::Selected(id))
            }
            Some(_) => None,
            None => {
                self.selected = None;
                None
            }
        }
    }

    /// Reconcile with a rebuilt graph: stale selection and drags are dropped,
    /// search is re-run.
    pub fn after_rebuild(&mut self, graph: &Graph, sim: &mut Simulation) {
        if self.selected.as_ref().is_some_and(|id| !graph.contains_node(id)) {
            self.selected = None;
        }
        if self.drag.as_ref().is_some_and(|d| !graph.contains_node(&d.node)) {
            self.drag = None;
            sim.world_mut().clear_pins();
            sim.set_alpha_target(0.0);
        }
        let before = self.search.first().cloned();
        self.search.refresh(graph);
        let after = self.search.first().cloned();
        if self.selected.is_none() && after != before {
            self.focus_on(after.as_ref(), sim);
        }
    }

    /// Adopt the simulation's automatic fit.
    pub fn sync_view(&mut self, sim: &Simulation) {
        self.view.adopt(sim.view());
    }

    /// Everything highlight precedence needs for this frame.
    pub fn highlight_state(&self, graph: &Graph) -> HighlightState {
        let selection = self.selected.as_ref().map(|id| {
            let related: HashSet<NodeId> = blast_radius(graph, id, self.config.blast_radius_cap)
                .into_iter()
                .collect();
            (id.clone(), related)
        });
        let drag = self
            .drag
            .as_ref()
            .filter(|d| d.is_active())
            .map(|d| (d.node.clone(), d.related().cloned().collect()));
        HighlightState {
            selection,
            search: self.search.matches().to_vec(),
            drag,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn selected(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    pub fn search_state(&self) -> &SearchState {
        &self.search
    }

    pub fn drag(&self) -> Option<&DragState> {
        self.drag.as_ref()
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }
}

/// Drop every pin and let the layout cool from a warm start.
fn release(sim: &mut Simulation) {
    sim.world_mut().clear_pins();
    sim.set_alpha_target(0.0);
    sim.reheat(RELEASE_ALPHA);
}
