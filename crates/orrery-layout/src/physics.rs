//! One explicit relaxation step over an immutable world
//!
//! [`advance`] never mutates its input: the host owns the current [`World`]
//! and replaces it with the returned one each frame.

use std::collections::HashMap;

use orrery_core::{NodeId, Viewport};
use serde::Serialize;
use tracing::warn;

use crate::forces::Forces;
use crate::point::Point;
use crate::seed::jitter;
use crate::strategy::usable;

/// Below this energy the simulation is considered settled.
pub const ALPHA_MIN: f64 = 0.001;
/// `1 - ALPHA_MIN^(1/300)`: cools from 1.0 to [`ALPHA_MIN`] in about 300 steps.
pub const ALPHA_DECAY: f64 = 0.0228;
pub const MAX_SPEED: f64 = 80.0;
const RESEED_SPREAD: f64 = 30.0;
const COLLISION_STRENGTH: f64 = 0.7;
const TREE_LINK_FACTOR: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Body {
    pub id: NodeId,
    pub position: Point,
    pub velocity: Point,
    pub radius: f64,
    pub target: Option<Point>,
    /// Held here with zero velocity while set.
    pub pinned: Option<Point>,
}

impl Body {
    pub fn new(id: NodeId, position: Point, radius: f64, target: Option<Point>) -> Self {
        Body {
            id,
            position,
            velocity: Point::ZERO,
            radius,
            target,
            pinned: None,
        }
    }
}

/// Spring between two bodies, by index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Link {
    pub source: usize,
    pub target: usize,
    pub weight: u32,
    /// Containment rather than dependency.
    pub tree: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct World {
    pub bodies: Vec<Body>,
    pub links: Vec<Link>,
    pub viewport: Viewport,
    pub alpha: f64,
    pub alpha_target: f64,
    index: HashMap<NodeId, usize>,
}

impl World {
    pub fn new(bodies: Vec<Body>, links: Vec<Link>, viewport: Viewport) -> Self {
        let index = bodies.iter().enumerate().map(|(i, b)| (b.id.clone(), i)).collect();
        World {
            bodies,
            links,
            viewport,
            alpha: 1.0,
            alpha_target: 0.0,
            index,
        }
    }

    pub fn index_of(&self, id: &NodeId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn body(&self, id: &NodeId) -> Option<&Body> {
        self.index_of(id).map(|i| &self.bodies[i])
    }

    pub fn body_mut(&mut self, id: &NodeId) -> Option<&mut Body> {
        let i = self.index_of(id)?;
        self.bodies.get_mut(i)
    }

    pub fn position(&self, id: &NodeId) -> Option<Point> {
        self.body(id).map(|b| b.position)
    }

    pub fn is_hot(&self) -> bool {
        self.alpha >= ALPHA_MIN || self.alpha_target > 0.0
    }

    /// Drop every pin.
    pub fn clear_pins(&mut self) {
        for body in &mut self.bodies {
            body.pinned = None;
        }
    }
}

/// Advance the world by one step of `dt` frames.
pub fn advance(world: &World, forces: &Forces, dt: f64) -> World {
    let mut next = world.clone();
    let dt = if dt.is_finite() && dt > 0.0 { dt } else { 1.0 };
    let viewport = usable(world.viewport);

    sanitize(&mut next, viewport);
    hold_pins(&mut next);
    let alpha = next.alpha.clamp(0.0, 1.0);
    apply_links(&mut next, forces, alpha);
    apply_repulsion(&mut next, forces, alpha);
    apply_targets(&mut next, forces, alpha);
    integrate(&mut next, forces, dt);
    resolve_collisions(&mut next, forces);
    clamp_to_bounds(&mut next, forces.boundary_padding, viewport);
    hold_pins(&mut next);
    next.alpha += (next.alpha_target - next.alpha) * ALPHA_DECAY;
    next
}

fn sanitize(world: &mut World, viewport: Viewport) {
    let center = Point::new(viewport.width / 2.0, viewport.height / 2.0);
    let degenerate = !world.bodies.is_empty() && world.bodies.iter().all(|b| !b.position.is_placed());
    if degenerate {
        warn!(
            "Degenerate layout: reseeding {} bodies around the viewport center",
            world.bodies.len()
        );
    }
    for body in &mut world.bodies {
        if degenerate || !body.position.is_finite() {
            body.position = center + jitter(&body.id, 1, RESEED_SPREAD);
            body.velocity = Point::ZERO;
        }
        if !body.velocity.is_finite() {
            body.velocity = Point::ZERO;
        }
        if body.pinned.is_some_and(|p| !p.is_finite()) {
            body.pinned = None;
        }
    }
}

fn hold_pins(world: &mut World) {
    for body in &mut world.bodies {
        if let Some(pin) = body.pinned {
            body.position = pin;
            body.velocity = Point::ZERO;
        }
    }
}

fn apply_links(world: &mut World, forces: &Forces, alpha: f64) {
    let mut degree = vec![0usize; world.bodies.len()];
    for link in &world.links {
        degree[link.source] += 1;
        degree[link.target] += 1;
    }
    for link in &world.links {
        let (s, t) = (link.source, link.target);
        if s == t {
            continue;
        }
        let delta = world.bodies[t].position - world.bodies[s].position;
        let length = delta.length().max(1e-6);
        let mut strength = forces.link_strength;
        if link.tree {
            strength *= TREE_LINK_FACTOR;
        }
        let pull = delta * ((length - forces.link_distance) / length * strength * alpha);
        // The better connected end moves less.
        let bias = degree[s] as f64 / (degree[s] + degree[t]) as f64;
        let (s_free, t_free) = (world.bodies[s].pinned.is_none(), world.bodies[t].pinned.is_none());
        let (s_share, t_share) = match (s_free, t_free) {
            (true, true) => (1.0 - bias, bias),
            (true, false) => (1.0, 0.0),
            (false, true) => (0.0, 1.0),
            (false, false) => (0.0, 0.0),
        };
        world.bodies[s].velocity += pull * s_share;
        world.bodies[t].velocity -= pull * t_share;
    }
}

/// Separation vector for bodies sitting on top of each other.
fn nudge(i: usize, j: usize) -> Point {
    let angle = ((i * 31 + j * 17) % 360) as f64 * std::f64::consts::PI / 180.0;
    Point::polar(angle) * 1e-3
}

fn apply_repulsion(world: &mut World, forces: &Forces, alpha: f64) {
    let strength = forces.repulsion() * alpha;
    let max_sq = forces.max_distance * forces.max_distance;
    let n = world.bodies.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let mut delta = world.bodies[j].position - world.bodies[i].position;
            let mut dist_sq = delta.length_squared();
            if dist_sq > max_sq {
                continue;
            }
            if dist_sq < 1e-12 {
                delta = nudge(i, j);
                dist_sq = delta.length_squared();
            }
            let dist = dist_sq.sqrt();
            let push = delta * (strength / dist / dist);
            if world.bodies[i].pinned.is_none() {
                world.bodies[i].velocity -= push;
            }
            if world.bodies[j].pinned.is_none() {
                world.bodies[j].velocity += push;
            }
        }
    }
}

fn apply_targets(world: &mut World, forces: &Forces, alpha: f64) {
    let k = forces.target_strength * alpha;
    for body in world.bodies.iter_mut().filter(|b| b.pinned.is_none()) {
        if let Some(target) = body.target.filter(|t| t.is_finite()) {
            body.velocity += (target - body.position) * k;
        }
    }
}

fn integrate(world: &mut World, forces: &Forces, dt: f64) {
    let keep = 1.0 - forces.velocity_decay;
    for body in world.bodies.iter_mut().filter(|b| b.pinned.is_none()) {
        body.velocity = body.velocity * keep;
        let speed = body.velocity.length();
        if speed > MAX_SPEED {
            body.velocity = body.velocity * (MAX_SPEED / speed);
        }
        body.position += body.velocity * dt;
    }
}

fn resolve_collisions(world: &mut World, forces: &Forces) {
    let n = world.bodies.len();
    for _ in 0..forces.collision_iterations {
        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = (&world.bodies[i], &world.bodies[j]);
                let min = a.radius + b.radius + forces.collision_gap;
                let mut delta = b.position - a.position;
                let mut dist = delta.length();
                if dist >= min {
                    continue;
                }
                if dist < 1e-9 {
                    delta = nudge(i, j);
                    dist = delta.length();
                }
                let shift = delta * ((min - dist) / dist * COLLISION_STRENGTH);
                let (i_share, j_share) = match (a.pinned.is_none(), b.pinned.is_none()) {
                    (true, true) => (0.5, 0.5),
                    (true, false) => (1.0, 0.0),
                    (false, true) => (0.0, 1.0),
                    (false, false) => continue,
                };
                world.bodies[i].position -= shift * i_share;
                world.bodies[j].position += shift * j_share;
            }
        }
    }
}

fn clamp_axis(value: f64, radius: f64, padding: f64, extent: f64) -> (f64, bool) {
    let low = padding + radius;
    let high = extent - padding - radius;
    if low > high {
        return (extent / 2.0, true);
    }
    let clamped = value.clamp(low, high);
    (clamped, clamped != value)
}

fn clamp_to_bounds(world: &mut World, padding: f64, viewport: Viewport) {
    for body in &mut world.bodies {
        let (x, hit_x) = clamp_axis(body.position.x, body.radius, padding, viewport.width);
        let (y, hit_y) = clamp_axis(body.position.y, body.radius, padding, viewport.height);
        body.position = Point::new(x, y);
        if hit_x {
            body.velocity.x = 0.0;
        }
        if hit_y {
            body.velocity.y = 0.0;
        }
        if let Some(pin) = body.pinned.as_mut() {
            *pin = body.position;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forces::BOUNDARY_PADDING as BOUNDARY;

    fn body(name: &str, x: f64, y: f64) -> Body {
        Body::new(NodeId::from(name), Point::new(x, y), 10.0, None)
    }

    fn inside(world: &World, padding: f64) -> bool {
        world.bodies.iter().all(|b| {
            b.position.x >= padding + b.radius - 1e-9
                && b.position.x <= world.viewport.width - padding - b.radius + 1e-9
                && b.position.y >= padding + b.radius - 1e-9
                && b.position.y <= world.viewport.height - padding - b.radius + 1e-9
        })
    }

    #[test]
    fn test_advance_is_pure() {
        let world = World::new(vec![body("a", 100.0, 100.0), body("b", 110.0, 100.0)], vec![], Viewport::default());
        let before = world.clone();
        let next = advance(&world, &Forces::default(), 1.0);
        assert_eq!(world, before);
        assert_ne!(next.bodies[0].position, world.bodies[0].position);
        assert!(next.alpha < world.alpha);
    }

    #[test]
    fn test_bodies_stay_inside_padded_viewport() {
        let bodies = vec![
            body("far-left", -500.0, 400.0),
            body("far-right", 9000.0, -3.0),
            body("middle", 640.0, 400.0),
        ];
        let mut world = World::new(bodies, vec![], Viewport::default());
        world.bodies[0].velocity = Point::new(-1e6, 0.0);
        for _ in 0..5 {
            world = advance(&world, &Forces::default(), 1.0);
            assert!(inside(&world, BOUNDARY));
        }
    }

    #[test]
    fn test_tiny_viewport_centers_nodes() {
        let world = World::new(vec![body("a", 3.0, 3.0)], vec![], Viewport::new(30.0, 500.0));
        let next = advance(&world, &Forces::default(), 1.0);
        assert_eq!(next.bodies[0].position.x, 15.0);
    }

    #[test]
    fn test_pinned_bodies_do_not_move() {
        let mut world = World::new(vec![body("a", 300.0, 300.0), body("b", 305.0, 300.0)], vec![], Viewport::default());
        world.bodies[0].pinned = Some(Point::new(300.0, 300.0));
        world.links.push(Link {
            source: 0,
            target: 1,
            weight: 1,
            tree: false,
        });
        for _ in 0..10 {
            world = advance(&world, &Forces::default(), 1.0);
            assert_eq!(world.bodies[0].position, Point::new(300.0, 300.0));
            assert_eq!(world.bodies[0].velocity, Point::ZERO);
        }
        // Collisions push the free body out of the pinned one.
        assert!(world.bodies[1].position.distance(world.bodies[0].position) > 20.0);
    }

    #[test]
    fn test_degenerate_world_is_reseeded() {
        let bodies = vec![body("a", 0.0, 0.0), body("b", f64::NAN, 0.0), body("c", 0.0, 0.0)];
        let world = World::new(bodies, vec![], Viewport::default());
        let next = advance(&world, &Forces::default(), 1.0);
        assert!(next.bodies.iter().all(|b| b.position.is_placed()));
        let again = advance(&world, &Forces::default(), 1.0);
        assert_eq!(next, again);
    }

    #[test]
    fn test_single_nan_body_is_repaired() {
        let world = World::new(vec![body("a", 200.0, 200.0), body("b", f64::INFINITY, 1.0)], vec![], Viewport::default());
        let next = advance(&world, &Forces::default(), 1.0);
        assert!(next.bodies[1].position.is_finite());
    }

    #[test]
    fn test_targets_attract() {
        let mut world = World::new(vec![body("a", 200.0, 200.0)], vec![], Viewport::default());
        world.bodies[0].target = Some(Point::new(600.0, 200.0));
        let start = world.bodies[0].position.distance(Point::new(600.0, 200.0));
        for _ in 0..30 {
            world = advance(&world, &Forces::default(), 1.0);
        }
        assert!(world.bodies[0].position.distance(Point::new(600.0, 200.0)) < start / 2.0);
    }

    #[test]
    fn test_alpha_cools_toward_target() {
        let mut world = World::new(vec![body("a", 200.0, 200.0)], vec![], Viewport::default());
        for _ in 0..400 {
            world = advance(&world, &Forces::default(), 1.0);
        }
        assert!(!world.is_hot());
    }
}
