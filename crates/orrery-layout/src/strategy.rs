//! Target coordinates for each layout mode
//!
//! Every strategy is a pure function of the graph, the layout config and the
//! viewport. Nodes a strategy has no opinion about fall back to the center of
//! their folder's grid cell, so every node always has a finite target.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::f64::consts::TAU;

use orrery_core::{EdgeKind, Graph, GraphNode, LayoutConfig, LayoutMode, NodeId, Viewport};
use serde::Serialize;
use tracing::debug;

use crate::point::Point;

/// Target coordinate per node.
pub type Targets = HashMap<NodeId, Point>;

pub const MAX_HUBS: usize = 20;
pub const HUB_FRACTION: f64 = 0.3;
pub const RING_SLOTS: usize = 8;
pub const RING_BASE_RADIUS: f64 = 80.0;
pub const RING_STEP: f64 = 32.0;
pub const RADIAL_FRACTION: f64 = 0.35;
pub const METRO_MARGIN: f64 = 60.0;
pub const METRO_SLOT_FACTOR: f64 = 0.8;

/// Compute a target for every node of `graph` under `layout.mode`.
pub fn compute_targets(graph: &Graph, layout: &LayoutConfig, viewport: Viewport) -> Targets {
    let viewport = usable(viewport);
    let mut targets = match layout.mode {
        LayoutMode::HubSpine => hub_spine(graph, viewport),
        LayoutMode::Radial => radial(graph, viewport),
        LayoutMode::Hierarchical => hierarchical(graph, viewport),
        LayoutMode::Grid => grid(graph, viewport),
        LayoutMode::Metro => metro_plan(graph).targets(layout, viewport),
    };
    let assigned = targets.len();
    let fallback = FolderGrid::new(graph, viewport);
    for node in graph.nodes() {
        targets
            .entry(node.id.clone())
            .or_insert_with(|| fallback.center_of(&node.folder_path));
    }
    debug!(
        "{} targets: {} assigned, {} from folder grid",
        layout.mode,
        assigned,
        targets.len() - assigned
    );
    targets
}

/// Clamp a degenerate viewport to something strategies can divide by.
pub(crate) fn usable(viewport: Viewport) -> Viewport {
    let side = |v: f64| if v.is_finite() && v >= 1.0 { v } else { 1.0 };
    Viewport::new(side(viewport.width), side(viewport.height))
}

fn center(viewport: Viewport) -> Point {
    Point::new(viewport.width / 2.0, viewport.height / 2.0)
}

/// Grid of folder cells used for fallback targets and new-node seeding.
#[derive(Debug, Clone)]
pub struct FolderGrid {
    cells: HashMap<String, Point>,
    default: Point,
}

impl FolderGrid {
    pub fn new(graph: &Graph, viewport: Viewport) -> Self {
        let viewport = usable(viewport);
        let mut folders: Vec<&str> = Vec::new();
        let mut seen = HashSet::new();
        for node in graph.nodes() {
            if seen.insert(node.folder_path.as_str()) {
                folders.push(node.folder_path.as_str());
            }
        }
        let cols = ((folders.len() as f64).sqrt().ceil() as usize).max(2);
        let rows = folders.len().div_ceil(cols).max(1);
        let cell_w = viewport.width / cols as f64;
        let cell_h = viewport.height / rows as f64;
        let cells = folders
            .into_iter()
            .enumerate()
            .map(|(i, folder)| {
                let col = (i % cols) as f64;
                let row = (i / cols) as f64;
                let point = Point::new((col + 0.5) * cell_w, (row + 0.5) * cell_h);
                (folder.to_string(), point)
            })
            .collect();
        FolderGrid {
            cells,
            default: center(viewport),
        }
    }

    /// Cell center for `folder`, or the viewport center for unknown folders.
    pub fn center_of(&self, folder: &str) -> Point {
        self.cells.get(folder).copied().unwrap_or(self.default)
    }
}

fn hub_spine(graph: &Graph, viewport: Viewport) -> Targets {
    let n = graph.node_count();
    let hub_cap = MAX_HUBS.min((n as f64 * HUB_FRACTION).floor() as usize);

    let mut ranked: Vec<(usize, &NodeId)> = graph
        .nodes()
        .map(|node| (graph.out_degree(&node.id, EdgeKind::Depends), &node.id))
        .filter(|(degree, _)| *degree > 0)
        .collect();
    ranked.sort_by_key(|(degree, _)| Reverse(*degree));
    let hubs: Vec<&NodeId> = ranked.into_iter().take(hub_cap).map(|(_, id)| id).collect();

    let mut targets = Targets::new();
    let spine_y = viewport.height / 2.0;
    let spacing = viewport.width / (hubs.len() + 1) as f64;
    for (i, hub) in hubs.iter().enumerate() {
        targets.insert((*hub).clone(), Point::new(spacing * (i + 1) as f64, spine_y));
    }

    for hub in &hubs {
        let anchor = targets[*hub];
        let mut slot = 0usize;
        for edge in graph.edges_from(hub) {
            if edge.kind != EdgeKind::Depends || targets.contains_key(&edge.target) {
                continue;
            }
            let ring = (slot / RING_SLOTS) as f64;
            let angle = (slot % RING_SLOTS) as f64 / RING_SLOTS as f64 * TAU;
            let radius = RING_BASE_RADIUS + RING_STEP * ring;
            targets.insert(edge.target.clone(), anchor + Point::polar(angle) * radius);
            slot += 1;
        }
    }
    targets
}

fn radial(graph: &Graph, viewport: Viewport) -> Targets {
    let n = graph.node_count().max(1) as f64;
    let radius = RADIAL_FRACTION * viewport.width.min(viewport.height);
    let origin = center(viewport);
    graph
        .nodes()
        .enumerate()
        .map(|(i, node)| {
            let angle = i as f64 / n * TAU;
            (node.id.clone(), origin + Point::polar(angle) * radius)
        })
        .collect()
}

fn hierarchical(graph: &Graph, viewport: Viewport) -> Targets {
    let mut columns: BTreeMap<&str, Vec<&GraphNode>> = BTreeMap::new();
    for node in graph.nodes() {
        columns.entry(node.folder_path.as_str()).or_default().push(node);
    }
    let column_count = columns.len() as f64;
    let mut targets = Targets::new();
    for (c, members) in columns.values().enumerate() {
        let x = viewport.width * (c + 1) as f64 / (column_count + 1.0);
        let m = members.len() as f64;
        for (j, node) in members.iter().enumerate() {
            let y = viewport.height * (j + 1) as f64 / (m + 1.0);
            targets.insert(node.id.clone(), Point::new(x, y));
        }
    }
    targets
}

fn grid(graph: &Graph, viewport: Viewport) -> Targets {
    let n = graph.node_count();
    let cols = ((n as f64).sqrt().ceil() as usize).max(1);
    let rows = n.div_ceil(cols).max(1);
    let cell_w = viewport.width / cols as f64;
    let cell_h = viewport.height / rows as f64;
    graph
        .nodes()
        .enumerate()
        .map(|(i, node)| {
            let col = (i % cols) as f64;
            let row = (i / cols) as f64;
            (node.id.clone(), Point::new((col + 0.5) * cell_w, (row + 0.5) * cell_h))
        })
        .collect()
}

/// One horizontal line of the metro layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetroLine {
    /// First station; `None` for the overflow line of unreachable nodes.
    pub root: Option<NodeId>,
    pub stations: Vec<NodeId>,
}

/// Lines derived from the dependency graph, one per root.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetroPlan {
    pub lines: Vec<MetroLine>,
    /// Nodes promoted to roots because they only sit on dependency cycles.
    pub cycle_breaks: Vec<NodeId>,
}

impl MetroPlan {
    pub fn line_of(&self, id: &NodeId) -> Option<usize> {
        self.lines.iter().position(|line| line.stations.contains(id))
    }

    pub fn targets(&self, layout: &LayoutConfig, viewport: Viewport) -> Targets {
        let line_count = self.lines.len() as f64;
        let step = layout.spacing_factor * METRO_SLOT_FACTOR;
        let mut targets = Targets::new();
        for (li, line) in self.lines.iter().enumerate() {
            let y = viewport.height * (li + 1) as f64 / (line_count + 1.0);
            for (slot, id) in line.stations.iter().enumerate() {
                targets.insert(id.clone(), Point::new(METRO_MARGIN + slot as f64 * step, y));
            }
        }
        targets
    }
}

/// Assign every node to exactly one metro line.
pub fn metro_plan(graph: &Graph) -> MetroPlan {
    let mut plan = MetroPlan::default();
    let mut visited: HashSet<NodeId> = HashSet::new();
    let has_out = |id: &NodeId| graph.out_degree(id, EdgeKind::Depends) > 0;

    let roots: Vec<&NodeId> = graph
        .nodes()
        .map(|node| &node.id)
        .filter(|id| graph.in_degree(id, EdgeKind::Depends) == 0 && has_out(*id))
        .collect();
    for root in roots {
        if !visited.contains(root) {
            plan.lines.push(ride(graph, root, &mut visited));
        }
    }

    // Whatever still has outgoing edges sits only on cycles.
    loop {
        let next = graph
            .nodes()
            .map(|node| &node.id)
            .filter(|id| !visited.contains(*id) && has_out(*id))
            .min();
        let Some(start) = next else {
            break;
        };
        debug!("metro: breaking cycle at {start}");
        plan.cycle_breaks.push(start.clone());
        plan.lines.push(ride(graph, start, &mut visited));
    }

    let overflow: Vec<NodeId> = graph
        .nodes()
        .filter(|node| !visited.contains(&node.id))
        .map(|node| node.id.clone())
        .collect();
    if !overflow.is_empty() {
        plan.lines.push(MetroLine {
            root: None,
            stations: overflow,
        });
    }
    plan
}

/// Breadth-first walk along outgoing dependencies; first visit wins.
fn ride(graph: &Graph, start: &NodeId, visited: &mut HashSet<NodeId>) -> MetroLine {
    let mut stations = vec![start.clone()];
    let mut queue = VecDeque::from([start.clone()]);
    visited.insert(start.clone());
    while let Some(current) = queue.pop_front() {
        for edge in graph.edges_from(&current) {
            if edge.kind == EdgeKind::Depends && visited.insert(edge.target.clone()) {
                stations.push(edge.target.clone());
                queue.push_back(edge.target.clone());
            }
        }
    }
    MetroLine {
        root: Some(start.clone()),
        stations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_core::{FileEntry, RawEdge, build_graph};

    fn graph(files: &[&str], edges: &[(&str, &str)]) -> Graph {
        let files: Vec<FileEntry> = files.iter().map(|f| FileEntry::file(*f)).collect();
        let edges: Vec<RawEdge> = edges.iter().map(|(a, b)| RawEdge::import(*a, *b)).collect();
        build_graph(&files, &edges).graph
    }

    fn config(mode: LayoutMode) -> LayoutConfig {
        LayoutConfig {
            mode,
            ..LayoutConfig::default()
        }
    }

    #[test]
    fn test_grid_fills_rows_in_encounter_order() {
        // Root plus six files: seven nodes on a 3 x 3 grid.
        let g = graph(&["a.ts", "b.ts", "c.ts", "d.ts", "e.ts", "f.ts"], &[]);
        assert_eq!(g.node_count(), 7);
        let targets = grid(&g, Viewport::new(900.0, 600.0));

        let ids: Vec<&NodeId> = g.nodes().map(|n| &n.id).collect();
        assert_eq!(targets[ids[0]], Point::new(150.0, 100.0));
        assert_eq!(targets[ids[2]], Point::new(750.0, 100.0));
        assert_eq!(targets[ids[4]], Point::new(450.0, 300.0));
        assert_eq!(targets[ids[6]], Point::new(150.0, 500.0));

        let mut xs: Vec<i64> = targets.values().map(|p| p.x as i64).collect();
        xs.sort_unstable();
        xs.dedup();
        assert_eq!(xs, vec![150, 450, 750]);
    }

    #[test]
    fn test_hierarchical_stacks_folder_members_evenly() {
        let g = graph(&["src/a.ts", "src/b.ts", "src/c.ts", "lib/d.ts"], &[]);
        let viewport = Viewport::new(800.0, 800.0);
        let targets = hierarchical(&g, viewport);
        assert_eq!(targets.len(), g.node_count());

        let members: Vec<&GraphNode> = g.nodes().filter(|n| n.folder_path == "src").collect();
        assert_eq!(members.len(), 3);
        let x = targets[&members[0].id].x;
        let step = viewport.height / (members.len() + 1) as f64;
        for (j, node) in members.iter().enumerate() {
            let p = targets[&node.id];
            assert_eq!(p.x, x);
            assert!((p.y - step * (j + 1) as f64).abs() < 1e-9, "{}", node.id);
        }
        // Folders are ordered by path, so `lib` sits left of `src`.
        assert!(targets[&NodeId::file("lib/d.ts")].x < x);
    }

    #[test]
    fn test_every_mode_targets_every_node() {
        let g = graph(
            &["src/a.ts", "src/b.ts", "lib/c.ts", "lib/d.ts"],
            &[("src/a.ts", "src/b.ts"), ("src/a.ts", "react"), ("lib/c.ts", "src/a.ts")],
        );
        for mode in LayoutMode::ALL {
            let targets = compute_targets(&g, &config(mode), Viewport::default());
            assert_eq!(targets.len(), g.node_count(), "{mode}");
            assert!(targets.values().all(|p| p.is_finite()), "{mode}");
        }
    }

    #[test]
    fn test_degenerate_viewport_stays_finite() {
        let g = graph(&["a.ts", "b.ts"], &[("a.ts", "b.ts")]);
        for mode in LayoutMode::ALL {
            let targets = compute_targets(&g, &config(mode), Viewport::new(0.0, f64::NAN));
            assert!(targets.values().all(|p| p.is_finite()), "{mode}");
        }
    }

    #[test]
    fn test_hub_rings() {
        let files: Vec<String> = (0..12).map(|i| format!("f{i:02}.ts")).collect();
        let names: Vec<&str> = files.iter().map(String::as_str).collect();
        let edges: Vec<(&str, &str)> = names[1..10].iter().map(|t| (names[0], *t)).collect();
        let g = graph(&names, &edges);
        let targets = hub_spine(&g, Viewport::default());

        let hub = targets[&NodeId::file("f00.ts")];
        assert_eq!(hub, Point::new(640.0, 400.0));
        let first = targets[&NodeId::file("f01.ts")];
        assert!((first.distance(hub) - 80.0).abs() < 1e-9);
        // The ninth dependent spills onto the second ring.
        let ninth = targets[&NodeId::file("f09.ts")];
        assert!((ninth.distance(hub) - 112.0).abs() < 1e-9);
        assert!(!targets.contains_key(&NodeId::file("f11.ts")));
    }

    #[test]
    fn test_radial_circle() {
        let g = graph(&["a.ts", "b.ts", "c.ts"], &[]);
        let targets = radial(&g, Viewport::new(1000.0, 800.0));
        let origin = Point::new(500.0, 400.0);
        for p in targets.values() {
            assert!((p.distance(origin) - 280.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_hierarchical_columns_sorted() {
        let g = graph(&["zeta/a.ts", "alpha/b.ts"], &[]);
        let targets = hierarchical(&g, Viewport::default());
        let alpha = targets[&NodeId::file("alpha/b.ts")];
        let zeta = targets[&NodeId::file("zeta/a.ts")];
        assert!(alpha.x < zeta.x);
    }

    #[test]
    fn test_metro_lines_are_disjoint() {
        let g = graph(
            &["a.ts", "b.ts", "c.ts", "d.ts", "e.ts", "lonely.ts"],
            &[("a.ts", "b.ts"), ("b.ts", "c.ts"), ("d.ts", "c.ts"), ("d.ts", "e.ts")],
        );
        let plan = metro_plan(&g);
        let mut seen = HashSet::new();
        for line in &plan.lines {
            for station in &line.stations {
                assert!(seen.insert(station.clone()), "{station} on two lines");
            }
        }
        assert_eq!(seen.len(), g.node_count());
        assert_eq!(plan.lines[0].stations, vec![NodeId::file("a.ts"), NodeId::file("b.ts"), NodeId::file("c.ts")]);
        assert_eq!(plan.lines[1].stations, vec![NodeId::file("d.ts"), NodeId::file("e.ts")]);
        assert!(plan.cycle_breaks.is_empty());
        let overflow = plan.lines.last().unwrap();
        assert_eq!(overflow.root, None);
        assert!(overflow.stations.contains(&NodeId::file("lonely.ts")));
    }

    #[test]
    fn test_metro_breaks_pure_cycles() {
        let g = graph(&["y.ts", "x.ts"], &[("y.ts", "x.ts"), ("x.ts", "y.ts")]);
        let plan = metro_plan(&g);
        assert_eq!(plan.cycle_breaks, vec![NodeId::file("x.ts")]);
        assert_eq!(plan.lines[0].stations, vec![NodeId::file("x.ts"), NodeId::file("y.ts")]);

        let targets = plan.targets(&LayoutConfig::default(), Viewport::default());
        assert_eq!(targets[&NodeId::file("x.ts")].x, METRO_MARGIN);
        assert_eq!(targets[&NodeId::file("y.ts")].x, METRO_MARGIN + 96.0);
    }

    #[test]
    fn test_folder_grid_has_two_columns_minimum() {
        let g = graph(&["only.ts"], &[]);
        let cells = FolderGrid::new(&g, Viewport::new(400.0, 200.0));
        // Root and the file share the top-level folder "".
        assert_eq!(cells.center_of(""), Point::new(100.0, 100.0));
        assert_eq!(cells.center_of("missing"), Point::new(200.0, 100.0));
    }
}
