// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Point-in-loop classification.
//!
//! The checks run in order: plane, vertex, edge, then an even-odd crossing
//! count in the loop's plane. All distance checks use
//! [`TOLERANCE`](crate::tolerance::TOLERANCE).
//!
//! The containment test projects onto the coordinate plane that drops the
//! normal's dominant axis and casts a ray along the first remaining axis. An
//! edge is counted when exactly one of its endpoints lies strictly above the
//! ray (half-open rule), so a ray through a vertex is never counted twice and
//! the same input always gives the same answer.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::tolerance::TOLERANCE;

/// Relation between a point and a loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointLoopClassify {
    Outside,
    Inside,
    OnVertex,
    OnEdge,
    NotOnPlane,
    /// Degenerate loop or non-finite input.
    Unknown,
}

impl PointLoopClassify {
    pub fn as_str(&self) -> &'static str {
        match self {
            PointLoopClassify::Outside => "outside",
            PointLoopClassify::Inside => "inside",
            PointLoopClassify::OnVertex => "on_vertex",
            PointLoopClassify::OnEdge => "on_edge",
            PointLoopClassify::NotOnPlane => "not_on_plane",
            PointLoopClassify::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for PointLoopClassify {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies `point` against the closed loop through `points`.
///
/// ```
/// use geowrap::{classify_point, Point3, PointLoopClassify};
///
/// let square = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// assert_eq!(
///     classify_point(&square, &Point3::new(0.5, 0.5, 0.0)),
///     PointLoopClassify::Inside
/// );
/// ```
pub fn classify_point(points: &[Point3<f64>], point: &Point3<f64>) -> PointLoopClassify {
    if points.len() < 3 || !is_finite(point) || !points.iter().all(is_finite) {
        return PointLoopClassify::Unknown;
    }
    let Some(normal) = plane_normal(points) else {
        return PointLoopClassify::Unknown;
    };

    if (point - points[0]).dot(&normal).abs() > TOLERANCE {
        return PointLoopClassify::NotOnPlane;
    }

    if points.iter().any(|p| (point - p).norm() <= TOLERANCE) {
        return PointLoopClassify::OnVertex;
    }

    if segments(points).any(|(a, b)| on_segment(a, b, point)) {
        return PointLoopClassify::OnEdge;
    }

    if crosses_odd(points, point, &normal) {
        PointLoopClassify::Inside
    } else {
        PointLoopClassify::Outside
    }
}

fn is_finite(p: &Point3<f64>) -> bool {
    p.coords.iter().all(|c| c.is_finite())
}

/// Consecutive point pairs, closing the loop.
fn segments(points: &[Point3<f64>]) -> impl Iterator<Item = (&Point3<f64>, &Point3<f64>)> {
    points
        .iter()
        .zip(points.iter().cycle().skip(1))
}

/// Unit normal of the plane through three non-collinear loop points.
///
/// Uses the first point, the first point farther than tolerance from it, and
/// the point that maximizes the triangle area with those two. Returns `None`
/// if every point lies within tolerance of one line.
fn plane_normal(points: &[Point3<f64>]) -> Option<Vector3<f64>> {
    let origin = points[0];
    let axis = points
        .iter()
        .map(|p| p - origin)
        .find(|d| d.norm() > TOLERANCE)?;

    let cross = points
        .iter()
        .map(|p| axis.cross(&(p - origin)))
        .max_by(|a, b| a.norm().total_cmp(&b.norm()))?;

    // |axis × d| / |axis| is the distance of the point from the line.
    if cross.norm() / axis.norm() <= TOLERANCE {
        return None;
    }
    Some(cross.normalize())
}

fn on_segment(a: &Point3<f64>, b: &Point3<f64>, p: &Point3<f64>) -> bool {
    let ab = b - a;
    let len = ab.norm();
    if len <= TOLERANCE {
        return false;
    }
    let ap = p - a;
    let distance = ab.cross(&ap).norm() / len;
    let along = ab.dot(&ap) / len;
    distance <= TOLERANCE && along >= -TOLERANCE && along <= len + TOLERANCE
}

/// Even-odd crossing count of a ray from `point` in the loop's plane.
fn crosses_odd(points: &[Point3<f64>], point: &Point3<f64>, normal: &Vector3<f64>) -> bool {
    let (u, v) = projection_axes(normal);
    let (px, py) = (point[u], point[v]);

    let mut inside = false;
    for (a, b) in segments(points) {
        let (xi, yi) = (a[u], a[v]);
        let (xj, yj) = (b[u], b[v]);
        if (yi > py) != (yj > py) {
            let x = xi + (py - yi) * (xj - xi) / (yj - yi);
            if px < x {
                inside = !inside;
            }
        }
    }
    inside
}

/// The two coordinate axes left after dropping the normal's dominant one.
fn projection_axes(normal: &Vector3<f64>) -> (usize, usize) {
    let n = normal.abs();
    if n.z >= n.x && n.z >= n.y {
        (0, 1)
    } else if n.y >= n.x {
        (2, 0)
    } else {
        (1, 2)
    }
}
