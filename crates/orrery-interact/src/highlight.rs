//! Highlight precedence: selection, then search, then drag

use std::collections::HashSet;

use orrery_core::NodeId;
use serde::Serialize;

/// Opacity of dimmed nodes and edges.
pub const DIMMED_OPACITY: f64 = 0.2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HighlightClass {
    pub selected: bool,
    pub related: bool,
    pub dimmed: bool,
}

impl HighlightClass {
    pub fn opacity(&self) -> f64 {
        if self.dimmed { DIMMED_OPACITY } else { 1.0 }
    }
}

/// The single focus that wins for this frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Focus {
    #[default]
    None,
    /// Explicit selection and its blast radius.
    Selection { node: NodeId, related: HashSet<NodeId> },
    /// Search matches; `first` is auto-highlighted.
    Search { first: NodeId, matches: HashSet<NodeId> },
    /// Active drag and the nodes orbiting the grabbed one.
    Drag { node: NodeId, related: HashSet<NodeId> },
}

/// Inputs gathered once per frame; [`HighlightState::focus`] applies precedence.
#[derive(Debug, Clone, Default)]
pub struct HighlightState {
    pub selection: Option<(NodeId, HashSet<NodeId>)>,
    pub search: Vec<NodeId>,
    pub drag: Option<(NodeId, HashSet<NodeId>)>,
}

impl HighlightState {
    pub fn focus(&self) -> Focus {
        if let Some((node, related)) = &self.selection {
            return Focus::Selection {
                node: node.clone(),
                related: related.clone(),
            };
        }
        if let Some(first) = self.search.first() {
            return Focus::Search {
                first: first.clone(),
                matches: self.search.iter().cloned().collect(),
            };
        }
        if let Some((node, related)) = &self.drag {
            return Focus::Drag {
                node: node.clone(),
                related: related.clone(),
            };
        }
        Focus::None
    }
}

pub fn highlight_class_of(node: &NodeId, focus: &Focus) -> HighlightClass {
    let (selected, related) = match focus {
        Focus::None => return HighlightClass::default(),
        Focus::Selection { node: focused, related } | Focus::Drag { node: focused, related } => {
            (focused == node, related.contains(node))
        }
        Focus::Search { first, matches } => (first == node, matches.contains(node)),
    };
    HighlightClass {
        selected,
        related: related && !selected,
        dimmed: !(selected || related),
    }
}

/// Edges are dimmed unless both endpoints are lit.
pub fn edge_dimmed(source: HighlightClass, target: HighlightClass) -> bool {
    source.dimmed || target.dimmed
}
