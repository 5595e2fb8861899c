//! Initial and warm-start positions

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};

use orrery_core::{EdgeKind, Graph, NodeId, Viewport};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::physics::{Body, Link, World};
use crate::point::Point;
use crate::strategy::{FolderGrid, Targets};

/// Half-width of the square new nodes are scattered in around their folder cell.
pub const SEED_JITTER: f64 = 12.0;

/// Offset in `[-spread, spread]²` derived only from `id` and `salt`.
pub fn jitter(id: &NodeId, salt: u64, spread: f64) -> Point {
    if !(spread.is_finite() && spread > 0.0) {
        return Point::ZERO;
    }
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    salt.hash(&mut hasher);
    let mut rng = StdRng::seed_from_u64(hasher.finish());
    Point::new(rng.gen_range(-spread..=spread), rng.gen_range(-spread..=spread))
}

/// Bodies and links for `graph`.
///
/// Bodies whose id survives from `previous` keep their position, velocity and
/// pin. New ones start at their folder cell with [`jitter`]. Alpha is taken
/// from `previous` (or 1.0); the caller decides whether to restart.
pub fn seed_world(graph: &Graph, targets: &Targets, previous: Option<&World>, viewport: Viewport) -> World {
    let grid = FolderGrid::new(graph, viewport);
    let bodies: Vec<Body> = graph
        .nodes()
        .map(|node| {
            let target = targets.get(&node.id).copied();
            match previous.and_then(|w| w.body(&node.id)) {
                Some(old) if old.position.is_finite() => Body {
                    id: node.id.clone(),
                    position: old.position,
                    velocity: old.velocity,
                    radius: node.radius(),
                    target,
                    pinned: old.pinned,
                },
                _ => Body::new(
                    node.id.clone(),
                    grid.center_of(&node.folder_path) + jitter(&node.id, 0, SEED_JITTER),
                    node.radius(),
                    target,
                ),
            }
        })
        .collect();

    let index: HashMap<&NodeId, usize> = bodies.iter().enumerate().map(|(i, b)| (&b.id, i)).collect();
    let links: Vec<Link> = graph
        .edges()
        .filter_map(|edge| {
            let source = *index.get(&edge.source)?;
            let target = *index.get(&edge.target)?;
            Some(Link {
                source,
                target,
                weight: edge.weight,
                tree: edge.kind == EdgeKind::Contains,
            })
        })
        .collect();

    let mut world = World::new(bodies, links, viewport);
    if let Some(previous) = previous {
        world.alpha = previous.alpha;
        world.alpha_target = previous.alpha_target;
    }
    world
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jitter_is_deterministic_and_bounded() {
        let id = NodeId::file("src/a.ts");
        assert_eq!(jitter(&id, 0, 12.0), jitter(&id, 0, 12.0));
        assert_ne!(jitter(&id, 0, 12.0), jitter(&id, 1, 12.0));
        let p = jitter(&id, 7, 12.0);
        assert!(p.x.abs() <= 12.0 && p.y.abs() <= 12.0);
        assert_eq!(jitter(&id, 0, 0.0), Point::ZERO);
    }
}
