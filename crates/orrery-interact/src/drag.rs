//! Drag with orbit-follow
//!
//! Pointer-down snapshots every direct neighbor of the grabbed node as an
//! offset from its start position. Once active, the grabbed node is pinned to
//! the pointer and each neighbor is pinned on its original bearing, at least
//! [`ORBIT_MIN_DISTANCE`] away.

use orrery_core::{Graph, NodeId};
use orrery_layout::{Point, World};

pub const ORBIT_MIN_DISTANCE: f64 = 80.0;

/// A neighbor's bearing from the grabbed node when the drag began.
#[derive(Debug, Clone, PartialEq)]
pub struct Orbit {
    pub id: NodeId,
    pub offset: Point,
    pub distance: f64,
}

#[derive(Debug, Clone)]
pub struct DragState {
    pub node: NodeId,
    /// Pointer-down location, screen space.
    origin: Point,
    /// Latest pointer location, world space.
    pointer: Point,
    orbits: Vec<Orbit>,
    threshold: f64,
    active: bool,
}

impl DragState {
    /// Start a gesture on `node`. `None` if the node has no usable position.
    pub fn begin(
        graph: &Graph,
        world: &World,
        node: &NodeId,
        screen: Point,
        pointer: Point,
        threshold: f64,
    ) -> Option<Self> {
        let start = world.position(node).filter(|p| p.is_finite())?;
        let orbits = graph
            .neighbors(node, None)
            .into_iter()
            .filter_map(|id| {
                let offset = world.position(&id)? - start;
                Some(Orbit {
                    distance: offset.length(),
                    offset,
                    id,
                })
            })
            .collect();
        Some(DragState {
            node: node.clone(),
            origin: screen,
            pointer,
            orbits,
            threshold,
            active: false,
        })
    }

    /// Track the pointer. Returns `true` on the move that activates the drag.
    pub fn move_to(&mut self, screen: Point, pointer: Point) -> bool {
        self.pointer = pointer;
        if self.active {
            return false;
        }
        let moved = screen - self.origin;
        if moved.x.abs() > self.threshold && moved.y.abs() > self.threshold {
            self.active = true;
            return true;
        }
        false
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn orbits(&self) -> &[Orbit] {
        &self.orbits
    }

    pub fn related(&self) -> impl Iterator<Item = &NodeId> {
        self.orbits.iter().map(|o| &o.id)
    }

    /// Pin positions for the current pointer; empty until active.
    pub fn pins(&self) -> Vec<(NodeId, Point)> {
        if !self.active {
            return Vec::new();
        }
        let mut pins = vec![(self.node.clone(), self.pointer)];
        pins.extend(
            self.orbits
                .iter()
                .map(|o| (o.id.clone(), orbit_position(self.pointer, o.offset, o.distance))),
        );
        pins
    }
}

/// `pointer + normalize(offset) * max(80, distance)`; a zero offset uses +x.
pub fn orbit_position(pointer: Point, offset: Point, distance: f64) -> Point {
    let direction = offset.normalized().unwrap_or(Point::new(1.0, 0.0));
    pointer + direction * distance.max(ORBIT_MIN_DISTANCE)
}
