//! Planar slicing of faceted shapes and stitching of the resulting edge
//! soup into ordered loops.

use serde::{Deserialize, Serialize};

use super::core::{BBox, Point3, Tolerance, Vec3};
use super::placement::{Placement, Rotation};
use super::plane::Plane;
use super::polyline::Polyline;
use super::shape::{Edge, Shape, newell_normal};

// ─────────────────────────────────────────────────────────────────────────────
// Reference planes
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RefPlane {
    #[default]
    XY,
    XZ,
    YZ,
}

impl RefPlane {
    pub const NAMES: &'static [&'static str] = &["XY", "XZ", "YZ"];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::XY => "XY",
            Self::XZ => "XZ",
            Self::YZ => "YZ",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "XY" => Some(Self::XY),
            "XZ" => Some(Self::XZ),
            "YZ" => Some(Self::YZ),
            _ => None,
        }
    }

    /// Global axis the offset is measured along.
    #[must_use]
    pub fn axis(self) -> Vec3 {
        match self {
            Self::XY => Vec3::Z,
            Self::XZ => Vec3::Y,
            Self::YZ => Vec3::X,
        }
    }

    /// The two in-plane bbox directions spanning the plane.
    #[must_use]
    pub fn span(self) -> (Vec3, Vec3) {
        match self {
            Self::XY => (Vec3::X, Vec3::Y),
            Self::XZ => (Vec3::X, Vec3::Z),
            Self::YZ => (Vec3::Y, Vec3::Z),
        }
    }

    /// Rotation taking the local XY plane onto this plane.
    #[must_use]
    pub fn rotation(self) -> Rotation {
        let (u, v) = self.span();
        Rotation::from_frame(u, v)
    }

    /// Placement of the cutting plane `offset` above the bbox minimum.
    #[must_use]
    pub fn placement(self, bbox: &BBox, offset: f64) -> Placement {
        Placement::new(bbox.min.to_vec3() + self.axis() * offset, self.rotation())
    }

    /// Length and width of the bbox face lying in this plane.
    #[must_use]
    pub fn extents(self, bbox: &BBox) -> (f64, f64) {
        let (u, v) = self.span();
        (bbox.extent_along(u), bbox.extent_along(v))
    }

    /// Largest meaningful offset: the bbox extent along the axis.
    #[must_use]
    pub fn offset_range(self, bbox: &BBox) -> f64 {
        bbox.extent_along(self.axis())
    }

    #[must_use]
    pub fn cutting_plane(self, bbox: &BBox, offset: f64) -> Plane {
        Plane {
            origin: bbox.min + self.axis() * offset,
            normal: self.axis(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Slicing
// ─────────────────────────────────────────────────────────────────────────────

/// Cuts every facet of `shape` with `plane` and returns the unordered line
/// segments. Facets lying in the plane contribute nothing; a vertex exactly
/// on the plane counts as below it.
#[must_use]
pub fn slice_shape(shape: &Shape, plane: &Plane) -> Vec<Edge> {
    let eps = Tolerance::DEFAULT.eps;
    let weld = Tolerance::WELD;
    let mut segments: Vec<Edge> = Vec::new();

    for facet in shape.faces.iter().flat_map(|f| f.facets()) {
        let n = facet.len();
        let distances: Vec<f64> = facet.iter().map(|p| plane.signed_distance(*p)).collect();
        let above: Vec<bool> = distances.iter().map(|d| *d > eps).collect();
        if above.iter().all(|a| *a) || above.iter().all(|a| !*a) {
            continue;
        }

        let mut crossings: Vec<Point3> = Vec::new();
        for i in 0..n {
            let j = (i + 1) % n;
            if above[i] == above[j] {
                continue;
            }
            let t = distances[i] / (distances[i] - distances[j]);
            crossings.push(facet[i].lerp(facet[j], t));
        }

        let Some(along) = plane.normal.cross(newell_normal(&facet)).normalized() else {
            continue;
        };
        crossings.sort_by(|a, b| a.to_vec3().dot(along).total_cmp(&b.to_vec3().dot(along)));

        for pair in crossings.chunks_exact(2) {
            let (a, b) = (pair[0], pair[1]);
            if weld.approx_eq_point3(a, b) {
                continue;
            }
            let known = segments.iter().any(|s| {
                let (s0, s1) = (s.first_vertex(), s.last_vertex());
                (weld.approx_eq_point3(s0, a) && weld.approx_eq_point3(s1, b))
                    || (weld.approx_eq_point3(s0, b) && weld.approx_eq_point3(s1, a))
            });
            if !known {
                segments.push(Edge::line(a, b));
            }
        }
    }
    segments
}

/// Chains an edge soup into ordered wires. Each edge is used once, flipped
/// when its last vertex is the one that connects. Loops that return to
/// their start become closed wires without a repeated start point.
#[must_use]
pub fn stitch_edges(edges: &[Edge], tol: Tolerance) -> Vec<Polyline> {
    let mut remaining: Vec<Edge> = edges.to_vec();
    let mut wires = Vec::new();

    while !remaining.is_empty() {
        let first = remaining.remove(0);
        let start = first.first_vertex();
        let mut points = vec![start];
        let mut cursor = first.last_vertex();
        let mut closed = false;

        loop {
            if tol.approx_eq_point3(cursor, start) {
                closed = true;
                break;
            }
            points.push(cursor);
            let next = remaining.iter().position(|e| {
                tol.approx_eq_point3(e.first_vertex(), cursor)
                    || tol.approx_eq_point3(e.last_vertex(), cursor)
            });
            let Some(idx) = next else {
                break;
            };
            let edge = remaining.remove(idx);
            let edge = if tol.approx_eq_point3(edge.first_vertex(), cursor) {
                edge
            } else {
                edge.reversed()
            };
            cursor = edge.last_vertex();
        }

        if closed && points.len() < 3 {
            continue;
        }
        wires.push(Polyline::new(points, closed));
    }
    wires
}

/// Slice followed by stitching.
#[must_use]
pub fn section_wires(shape: &Shape, plane: &Plane) -> Vec<Polyline> {
    stitch_edges(&slice_shape(shape, plane), Tolerance::WELD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ref_plane_rotation_normals() {
        let tol = Tolerance::DEFAULT;
        assert!(tol.approx_eq_vec3(RefPlane::XY.rotation().apply(Vec3::Z), Vec3::Z));
        assert!(tol.approx_eq_vec3(RefPlane::XZ.rotation().apply(Vec3::Z), -Vec3::Y));
        assert!(tol.approx_eq_vec3(RefPlane::YZ.rotation().apply(Vec3::Z), Vec3::X));
    }

    #[test]
    fn test_stitch_flips_reversed_edges() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(0.0, 1.0, 0.0);
        let edges = vec![Edge::line(a, b), Edge::line(c, b), Edge::line(c, a)];
        let wires = stitch_edges(&edges, Tolerance::WELD);
        assert_eq!(wires.len(), 1);
        assert!(wires[0].is_closed());
        assert_eq!(wires[0].points(), &[a, b, c]);
    }

    #[test]
    fn test_stitch_open_chain() {
        let edges = vec![
            Edge::line(Point3::ORIGIN, Point3::new(1.0, 0.0, 0.0)),
            Edge::line(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)),
        ];
        let wires = stitch_edges(&edges, Tolerance::WELD);
        assert_eq!(wires.len(), 1);
        assert!(!wires[0].is_closed());
        assert_eq!(wires[0].len(), 3);
    }
}
