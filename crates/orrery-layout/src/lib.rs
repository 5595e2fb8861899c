//! Orrery Layout: target strategies and the physics relaxation engine

pub mod forces;
pub mod geometry;
pub mod physics;
pub mod point;
pub mod seed;
pub mod simulation;
pub mod strategy;
pub mod viewport;


pub use forces::Forces;
pub use geometry::{EdgeGeometry, edge_geometry};
pub use physics::{ALPHA_MIN, Body, Link, World, advance};
pub use point::Point;
pub use seed::{jitter, seed_world};
pub use simulation::Simulation;
pub use strategy::{FolderGrid, MetroLine, MetroPlan, Targets, compute_targets, metro_plan};
pub use viewport::{ViewTransform, fit_to_content};
