//! Pan/zoom state layered over the simulation's one-shot fit

use orrery_core::Viewport;
use orrery_layout::{Body, Point, ViewTransform, fit_to_content};

/// The live transform. The automatic fit is adopted until the user takes over.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewState {
    transform: ViewTransform,
    user_adjusted: bool,
}

impl ViewState {
    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn is_user_adjusted(&self) -> bool {
        self.user_adjusted
    }

    /// Take the simulation's fit unless the user has zoomed or panned.
    pub fn adopt(&mut self, fit: Option<ViewTransform>) {
        if let Some(fit) = fit.filter(|_| !self.user_adjusted) {
            self.transform = fit;
        }
    }

    pub fn zoom_at(&mut self, factor: f64, anchor: Point) {
        self.transform = self.transform.zoom_at(factor, anchor);
        self.user_adjusted = true;
    }

    pub fn center_on(&mut self, world: Point, viewport: Viewport) {
        self.transform = self.transform.center_on(world, viewport);
        self.user_adjusted = true;
    }

    /// Explicit fit; hands control back to the automatic fit.
    pub fn fit(&mut self, bodies: &[Body], viewport: Viewport) {
        if let Some(fit) = fit_to_content(bodies, viewport) {
            self.transform = fit;
        }
        self.user_adjusted = false;
    }

    pub fn to_world(&self, screen: Point) -> Point {
        self.transform.to_world(screen)
    }
}
