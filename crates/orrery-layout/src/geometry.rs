//! Edge shapes handed to the renderer

use serde::Serialize;

use crate::point::Point;

/// Arc control point offset, as a fraction of the edge length.
pub const ARC_BEND: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum EdgeGeometry {
    Line { x1: f64, y1: f64, x2: f64, y2: f64 },
    /// Quadratic curve through control point `(cx, cy)`.
    Arc { x1: f64, y1: f64, cx: f64, cy: f64, x2: f64, y2: f64 },
}

pub fn edge_geometry(from: Point, to: Point, curved: bool) -> EdgeGeometry {
    let line = EdgeGeometry::Line {
        x1: from.x,
        y1: from.y,
        x2: to.x,
        y2: to.y,
    };
    if !curved {
        return line;
    }
    let delta = to - from;
    let Some(dir) = delta.normalized() else {
        return line;
    };
    let normal = Point::new(-dir.y, dir.x);
    let mid = (from + to) * 0.5;
    let control = mid + normal * (delta.length() * ARC_BEND);
    EdgeGeometry::Arc {
        x1: from.x,
        y1: from.y,
        cx: control.x,
        cy: control.y,
        x2: to.x,
        y2: to.y,
    }
}
