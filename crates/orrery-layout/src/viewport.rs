//! World-to-screen transform and fit-to-content

use orrery_core::Viewport;
use serde::{Deserialize, Serialize};

use crate::physics::Body;
use crate::point::Point;

pub const FIT_PADDING: f64 = 40.0;
pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 4.0;

/// `screen = world * scale + (tx, ty)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub scale: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        ViewTransform {
            scale: 1.0,
            tx: 0.0,
            ty: 0.0,
        }
    }
}

impl ViewTransform {
    pub fn to_screen(&self, world: Point) -> Point {
        Point::new(world.x * self.scale + self.tx, world.y * self.scale + self.ty)
    }

    pub fn to_world(&self, screen: Point) -> Point {
        Point::new((screen.x - self.tx) / self.scale, (screen.y - self.ty) / self.scale)
    }

    /// Zoom by `factor` keeping the world point under `anchor` (screen space) fixed.
    pub fn zoom_at(&self, factor: f64, anchor: Point) -> ViewTransform {
        if !(factor.is_finite() && factor > 0.0) || !anchor.is_finite() {
            return *self;
        }
        let scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        let pivot = self.to_world(anchor);
        ViewTransform {
            scale,
            tx: anchor.x - pivot.x * scale,
            ty: anchor.y - pivot.y * scale,
        }
    }

    /// Same scale, translated so `world` sits at the viewport center.
    pub fn center_on(&self, world: Point, viewport: Viewport) -> ViewTransform {
        if !world.is_finite() {
            return *self;
        }
        ViewTransform {
            scale: self.scale,
            tx: viewport.width / 2.0 - world.x * self.scale,
            ty: viewport.height / 2.0 - world.y * self.scale,
        }
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        Point::new((self.min.x + self.max.x) / 2.0, (self.min.y + self.max.y) / 2.0)
    }
}

/// Bounds of every finite body, radius included.
pub fn content_bounds(bodies: &[Body]) -> Option<Bounds> {
    bodies
        .iter()
        .filter(|b| b.position.is_finite())
        .map(|b| {
            let r = if b.radius.is_finite() { b.radius.max(0.0) } else { 0.0 };
            Bounds {
                min: Point::new(b.position.x - r, b.position.y - r),
                max: Point::new(b.position.x + r, b.position.y + r),
            }
        })
        .reduce(|a, b| Bounds {
            min: Point::new(a.min.x.min(b.min.x), a.min.y.min(b.min.y)),
            max: Point::new(a.max.x.max(b.max.x), a.max.y.max(b.max.y)),
        })
}

/// Fraction of bodies with a finite position off the origin.
pub fn placed_fraction(bodies: &[Body]) -> f64 {
    if bodies.is_empty() {
        return 0.0;
    }
    bodies.iter().filter(|b| b.position.is_placed()).count() as f64 / bodies.len() as f64
}

/// Transform showing all content with [`FIT_PADDING`], never zooming in past 1:1.
pub fn fit_to_content(bodies: &[Body], viewport: Viewport) -> Option<ViewTransform> {
    if viewport.is_degenerate() {
        return None;
    }
    let bounds = content_bounds(bodies)?;
    let width = (bounds.width() + 2.0 * FIT_PADDING).max(1.0);
    let height = (bounds.height() + 2.0 * FIT_PADDING).max(1.0);
    let scale = (viewport.width / width).min(viewport.height / height).min(1.0);
    let center = bounds.center();
    Some(ViewTransform {
        scale,
        tx: viewport.width / 2.0 - center.x * scale,
        ty: viewport.height / 2.0 - center.y * scale,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_core::NodeId;

    fn at(x: f64, y: f64) -> Body {
        Body::new(NodeId::from("n"), Point::new(x, y), 10.0, None)
    }

    #[test]
    fn test_fit_small_content_is_not_magnified() {
        let bodies = [at(100.0, 100.0), at(200.0, 150.0)];
        let view = fit_to_content(&bodies, Viewport::default()).unwrap();
        assert_eq!(view.scale, 1.0);
        assert_eq!(view.to_screen(Point::new(150.0, 125.0)), Point::new(640.0, 400.0));
    }

    #[test]
    fn test_fit_large_content_scales_down() {
        let bodies = [at(0.0, 0.0), at(2540.0, 0.0)];
        let view = fit_to_content(&bodies, Viewport::new(1280.0, 800.0)).unwrap();
        // 2540 + 2 * 10 + 2 * 40 = 2640
        assert!((view.scale - 1280.0 / 2640.0).abs() < 1e-12);
    }

    #[test]
    fn test_fit_ignores_non_finite() {
        let bodies = [at(f64::NAN, 0.0)];
        assert_eq!(fit_to_content(&bodies, Viewport::default()), None);
        assert_eq!(placed_fraction(&[at(0.0, 0.0), at(5.0, 5.0)]), 0.5);
    }

    #[test]
    fn test_zoom_keeps_anchor_and_clamps() {
        let view = ViewTransform::default();
        let anchor = Point::new(300.0, 200.0);
        let zoomed = view.zoom_at(2.0, anchor);
        assert_eq!(zoomed.scale, 2.0);
        assert_eq!(zoomed.to_world(anchor), view.to_world(anchor));
        assert_eq!(view.zoom_at(100.0, anchor).scale, MAX_SCALE);
        assert_eq!(view.zoom_at(0.0001, anchor).scale, MIN_SCALE);
    }

    #[test]
    fn test_center_on() {
        let view = ViewTransform::default().center_on(Point::new(10.0, 20.0), Viewport::new(200.0, 100.0));
        assert_eq!(view.to_screen(Point::new(10.0, 20.0)), Point::new(100.0, 50.0));
    }
}
