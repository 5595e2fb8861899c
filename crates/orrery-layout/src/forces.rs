//! Per-mode force parameters

use orrery_core::{LayoutConfig, LayoutMode};
use serde::Serialize;

/// Scales `spacing_factor` into the repulsion numerator.
pub const REPULSION_SCALE: f64 = 0.25;
pub const BOUNDARY_PADDING: f64 = 20.0;
pub const COLLISION_GAP: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Forces {
    pub link_distance: f64,
    pub link_strength: f64,
    pub spacing_factor: f64,
    pub repulsion_multiplier: f64,
    /// Pairs further apart than this do not repel.
    pub max_distance: f64,
    pub target_strength: f64,
    pub collision_iterations: usize,
    pub collision_gap: f64,
    /// Fraction of velocity lost per step.
    pub velocity_decay: f64,
    pub boundary_padding: f64,
}

impl Forces {
    pub fn for_mode(layout: &LayoutConfig) -> Self {
        // (link strength, repulsion multiplier, target strength, collision passes)
        let (link_strength, repulsion_multiplier, target_strength, collision_iterations) = match layout.mode {
            LayoutMode::HubSpine => (0.1, 1.0, 0.5, 3),
            LayoutMode::Radial => (0.05, 0.7, 0.8, 2),
            LayoutMode::Hierarchical => (0.02, 0.5, 1.0, 2),
            LayoutMode::Grid => (0.02, 0.4, 1.0, 2),
            LayoutMode::Metro => (0.3, 0.6, 0.6, 2),
        };
        Forces {
            link_distance: layout.link_distance,
            link_strength,
            spacing_factor: layout.spacing_factor,
            repulsion_multiplier,
            max_distance: layout.spacing_factor * 4.0,
            target_strength,
            collision_iterations,
            collision_gap: COLLISION_GAP,
            velocity_decay: 0.4,
            boundary_padding: BOUNDARY_PADDING,
        }
    }

    /// Numerator of the inverse-distance repulsion.
    pub fn repulsion(&self) -> f64 {
        self.spacing_factor * self.repulsion_multiplier * REPULSION_SCALE
    }
}

impl Default for Forces {
    fn default() -> Self {
        Forces::for_mode(&LayoutConfig::default())
    }
}
