//! Infinite planes, line intersection and the matching-cut search used to
//! carry a root cut over to a tip wire.

use serde::{Deserialize, Serialize};

use super::core::{Point3, Tolerance, Vec3};
use super::polyline::{Polyline, WirePosition};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub origin: Point3,
    /// Unit normal.
    pub normal: Vec3,
}

impl Plane {
    /// Returns `None` for a null normal.
    #[must_use]
    pub fn new(origin: Point3, normal: Vec3) -> Option<Self> {
        Some(Self {
            origin,
            normal: normal.normalized()?,
        })
    }

    /// Plane through three points, `None` when they are colinear.
    #[must_use]
    pub fn from_points(a: Point3, b: Point3, c: Point3) -> Option<Self> {
        Self::new(a, (b - a).cross(c - a))
    }

    #[must_use]
    pub fn signed_distance(&self, p: Point3) -> f64 {
        (p - self.origin).dot(self.normal)
    }

    #[must_use]
    pub fn project_point(&self, p: Point3) -> Point3 {
        p - self.normal * self.signed_distance(p)
    }

    /// Same plane moved by `distance` along its normal.
    #[must_use]
    pub fn offset(&self, distance: f64) -> Self {
        Self {
            origin: self.origin + self.normal * distance,
            normal: self.normal,
        }
    }
}

/// Intersection of the infinite line through `a` and `b` with `plane`.
///
/// A line parallel to the plane gives `None`, unless it lies in the plane,
/// in which case `a` is returned.
#[must_use]
pub fn intersect_line_plane(a: Point3, b: Point3, plane: &Plane) -> Option<Point3> {
    let dir = b - a;
    let denom = dir.dot(plane.normal);
    let da = plane.signed_distance(a);
    if denom.abs() <= Tolerance::ZERO_LENGTH.eps {
        return (da.abs() <= Tolerance::DEFAULT.eps).then_some(a);
    }
    Some(a + dir * (-da / denom))
}

/// Walks the edges of `tip` forward from the edge after `start` and returns
/// the parametric position where the wire first crosses `plane`.
///
/// An edge `v_k → v_k+1` is crossed when the intersection `I` of its line
/// with the plane satisfies `(v_k − I)·(v_k+1 − I) <= 0`. At most
/// `edge_count - 1` edges are visited, so the edge holding the start
/// position itself is never reported.
#[must_use]
pub fn calculate_tip_end_point(tip: &Polyline, start: f64, plane: &Plane) -> Option<f64> {
    let n = tip.len();
    let edges = tip.edge_count();
    if edges < 2 {
        return None;
    }
    let first = WirePosition::resolve(tip, start)?.index;

    for step in 1..edges {
        let k = (first + step) % n;
        let Some((a, b)) = tip.edge(k) else {
            continue;
        };
        let len = a.distance_to(b);
        if len <= Tolerance::ZERO_LENGTH.eps {
            continue;
        }
        let Some(hit) = intersect_line_plane(a, b, plane) else {
            continue;
        };
        if (a - hit).dot(b - hit) <= 0.0 {
            let position = k as f64 + hit.distance_to(a) / len;
            log::debug!("snijpunt tip-draad gevonden op edge {k}: {position:.4}");
            return Some(position.rem_euclid(n as f64));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersect_line_plane_basic() {
        let plane = Plane::new(Point3::new(0.0, 0.0, 2.0), Vec3::Z).unwrap();
        let hit = intersect_line_plane(Point3::ORIGIN, Point3::new(0.0, 0.0, 1.0), &plane);
        assert_eq!(hit, Some(Point3::new(0.0, 0.0, 2.0)));
    }

    #[test]
    fn test_intersect_parallel_line() {
        let plane = Plane::new(Point3::ORIGIN, Vec3::Z).unwrap();
        let above = intersect_line_plane(
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            &plane,
        );
        assert_eq!(above, None);
        let inside = intersect_line_plane(Point3::ORIGIN, Point3::new(1.0, 0.0, 0.0), &plane);
        assert_eq!(inside, Some(Point3::ORIGIN));
    }

    #[test]
    fn test_from_points_colinear() {
        let p = Plane::from_points(
            Point3::ORIGIN,
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        );
        assert!(p.is_none());
    }

    #[test]
    fn test_tip_end_point_on_square() {
        let tip = Polyline::closed(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(4.0, 4.0, 0.0),
            Point3::new(0.0, 4.0, 0.0),
        ]);
        // vertical plane x = 1 crosses the top edge (2 -> 3) at 3/4 of its length
        let plane = Plane::new(Point3::new(1.0, 0.0, 0.0), Vec3::X).unwrap();
        let end = calculate_tip_end_point(&tip, 0.0, &plane).unwrap();
        assert!((end - 2.75).abs() < 1e-12);
        let miss = Plane::new(Point3::new(9.0, 0.0, 0.0), Vec3::X).unwrap();
        assert_eq!(calculate_tip_end_point(&tip, 0.0, &miss), None);
    }
}
