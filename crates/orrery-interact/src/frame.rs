//! Renderer-ready snapshot of the live state

use std::collections::HashMap;

use orrery_core::{Color, EdgeId, EdgeKind, Graph, LayoutMode, NodeId};
use orrery_layout::{EdgeGeometry, Simulation, ViewTransform, edge_geometry};
use serde::Serialize;

use crate::highlight::{DIMMED_OPACITY, Focus, HighlightClass, edge_dimmed, highlight_class_of};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameNode {
    pub id: NodeId,
    pub kind: &'static str,
    pub label: String,
    pub display_name: String,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub color: Color,
    pub selected: bool,
    pub related: bool,
    pub dimmed: bool,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameEdge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub kind: EdgeKind,
    pub external: bool,
    pub weight: u32,
    pub dimmed: bool,
    pub opacity: f64,
    pub geometry: EdgeGeometry,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub tick: u64,
    /// Rebuild sequence the frame was rendered from.
    pub sequence: u64,
    pub alpha: f64,
    pub mode: LayoutMode,
    pub degraded: bool,
    pub show_labels: bool,
    pub nodes: Vec<FrameNode>,
    pub edges: Vec<FrameEdge>,
    pub view: ViewTransform,
}

impl Frame {
    pub fn node(&self, id: &NodeId) -> Option<&FrameNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }
}

/// Inputs for [`render`] that live outside the graph and simulation.
#[derive(Debug, Clone, Copy)]
pub struct FrameMeta {
    pub sequence: u64,
    pub degraded: bool,
    pub view: ViewTransform,
}

pub fn render(graph: &Graph, sim: &Simulation, focus: &Focus, meta: FrameMeta) -> Frame {
    let world = sim.world();
    let layout = sim.layout();
    let mut classes: HashMap<&NodeId, HighlightClass> = HashMap::new();

    let nodes: Vec<FrameNode> = graph
        .nodes()
        .filter_map(|node| {
            let body = world.body(&node.id)?;
            let class = highlight_class_of(&node.id, focus);
            classes.insert(&node.id, class);
            Some(FrameNode {
                id: node.id.clone(),
                kind: node.kind.tag(),
                label: node.label.clone(),
                display_name: node.display_name.clone(),
                x: body.position.x,
                y: body.position.y,
                radius: body.radius,
                color: node.color,
                selected: class.selected,
                related: class.related,
                dimmed: class.dimmed,
                opacity: class.opacity(),
            })
        })
        .collect();

    let edges: Vec<FrameEdge> = graph
        .edges()
        .filter_map(|edge| {
            let from = world.position(&edge.source)?;
            let to = world.position(&edge.target)?;
            let dimmed = edge_dimmed(*classes.get(&edge.source)?, *classes.get(&edge.target)?);
            Some(FrameEdge {
                id: edge.id.clone(),
                source: edge.source.clone(),
                target: edge.target.clone(),
                kind: edge.kind,
                external: edge.is_external,
                weight: edge.weight,
                dimmed,
                opacity: if dimmed { DIMMED_OPACITY } else { 1.0 },
                geometry: edge_geometry(from, to, layout.curved_links),
            })
        })
        .collect();

    Frame {
        tick: sim.ticks(),
        sequence: meta.sequence,
        alpha: world.alpha,
        mode: layout.mode,
        degraded: meta.degraded,
        show_labels: layout.show_labels,
        nodes,
        edges,
        view: meta.view,
    }
}
