//! A small faceted boundary representation.
//!
//! Shapes carry enough topology for the queries features make on their
//! linked solids: boundary edges with orientation, faces in a stable order,
//! face centres of mass and bounding boxes. Curved faces are approximated
//! by facets; edges stay analytic so that discretization and tangents are
//! exact.

use std::f64::consts::TAU;

use serde::Serialize;

use super::core::{BBox, Point3, Tolerance, Vec3};
use super::placement::Placement;
use super::polyline::Polyline;

/// Segments used when a circle has to be turned into a polygon.
pub const CIRCLE_SEGMENTS: usize = 64;

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum ShapeError {
    #[error("loft requires at least 2 sections, got {count}")]
    NotEnoughSections { count: usize },
    #[error("section {index} has fewer than 2 points")]
    DegenerateSection { index: usize },
    #[error("prism requires a closed profile with at least 3 points")]
    OpenProfile,
    #[error("extrusion direction must be finite and non-zero")]
    InvalidDirection,
    #[error("dimensions must be finite and positive")]
    InvalidDimensions,
}

// ─────────────────────────────────────────────────────────────────────────────
// Curves and edges
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Curve {
    Line {
        start: Point3,
        end: Point3,
    },
    /// Full circle starting on `x_axis`, counter-clockwise about `normal`.
    Circle {
        center: Point3,
        normal: Vec3,
        x_axis: Vec3,
        radius: f64,
    },
}

impl Curve {
    /// Point at normalized parameter `t` in `[0, 1]`.
    #[must_use]
    pub fn value_at(&self, t: f64) -> Point3 {
        match *self {
            Self::Line { start, end } => start.lerp(end, t),
            Self::Circle {
                center,
                normal,
                x_axis,
                radius,
            } => {
                let (s, c) = (TAU * t).sin_cos();
                let y_axis = normal.cross(x_axis);
                center + x_axis * (radius * c) + y_axis * (radius * s)
            }
        }
    }

    /// Unit derivative at `t`.
    #[must_use]
    pub fn tangent_at(&self, t: f64) -> Vec3 {
        match *self {
            Self::Line { start, end } => (end - start).normalized_or_zero(),
            Self::Circle { normal, x_axis, .. } => {
                let (s, c) = (TAU * t).sin_cos();
                let y_axis = normal.cross(x_axis);
                (y_axis * c - x_axis * s).normalized_or_zero()
            }
        }
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        match *self {
            Self::Line { start, end } => start.distance_to(end),
            Self::Circle { radius, .. } => TAU * radius,
        }
    }

    #[must_use]
    pub fn transformed(&self, placement: &Placement) -> Self {
        match *self {
            Self::Line { start, end } => Self::Line {
                start: placement.apply_point(start),
                end: placement.apply_point(end),
            },
            Self::Circle {
                center,
                normal,
                x_axis,
                radius,
            } => Self::Circle {
                center: placement.apply_point(center),
                normal: placement.apply_vec(normal),
                x_axis: placement.apply_vec(x_axis),
                radius,
            },
        }
    }
}

/// A curve used as a boundary edge. A reversed edge is traversed from the
/// curve's end to its start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Edge {
    pub curve: Curve,
    pub reversed: bool,
}

impl Edge {
    #[must_use]
    pub fn line(start: Point3, end: Point3) -> Self {
        Self {
            curve: Curve::Line { start, end },
            reversed: false,
        }
    }

    #[must_use]
    pub fn circle(center: Point3, normal: Vec3, radius: f64) -> Self {
        let normal = normal.normalized().unwrap_or(Vec3::Z);
        Self {
            curve: Curve::Circle {
                center,
                normal,
                x_axis: normal.any_perpendicular(),
                radius,
            },
            reversed: false,
        }
    }

    /// Curve parameter for a fraction along the edge's own orientation.
    fn parameter(&self, fraction: f64) -> f64 {
        if self.reversed { 1.0 - fraction } else { fraction }
    }

    #[must_use]
    pub fn value_at_fraction(&self, fraction: f64) -> Point3 {
        self.curve.value_at(self.parameter(fraction))
    }

    /// Tangent along the edge's orientation.
    #[must_use]
    pub fn tangent_at_fraction(&self, fraction: f64) -> Vec3 {
        let t = self.curve.tangent_at(self.parameter(fraction));
        if self.reversed { -t } else { t }
    }

    #[must_use]
    pub fn first_vertex(&self) -> Point3 {
        self.value_at_fraction(0.0)
    }

    #[must_use]
    pub fn last_vertex(&self) -> Point3 {
        self.value_at_fraction(1.0)
    }

    /// `count` points spread uniformly by arc length, both ends included.
    #[must_use]
    pub fn discretize(&self, count: usize) -> Vec<Point3> {
        match count {
            0 => Vec::new(),
            1 => vec![self.first_vertex()],
            _ => (0..count)
                .map(|i| self.value_at_fraction(i as f64 / (count - 1) as f64))
                .collect(),
        }
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.curve.length()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self.curve, Curve::Circle { .. })
    }

    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            curve: self.curve,
            reversed: !self.reversed,
        }
    }

    #[must_use]
    pub fn transformed(&self, placement: &Placement) -> Self {
        Self {
            curve: self.curve.transformed(placement),
            reversed: self.reversed,
        }
    }

    /// Polygon approximation without the closing point.
    fn polygon_points(&self) -> Vec<Point3> {
        if self.is_closed() {
            let mut pts = self.discretize(CIRCLE_SEGMENTS + 1);
            pts.pop();
            pts
        } else {
            vec![self.first_vertex()]
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Faces
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Surface {
    Plane,
    /// Lateral cylinder between the base circle and the one `axis` above it.
    Cylinder {
        base: Point3,
        axis: Vec3,
        x_axis: Vec3,
        radius: f64,
    },
    /// Bilinear patch between two ruling lines.
    Ruled,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Face {
    pub edges: Vec<Edge>,
    pub surface: Surface,
}

impl Face {
    /// Planar face bounded by the closed polygon `points`.
    #[must_use]
    pub fn polygon(points: &[Point3]) -> Self {
        Self::bounded(points, Surface::Plane)
    }

    fn bounded(points: &[Point3], surface: Surface) -> Self {
        let n = points.len();
        let edges = (0..n)
            .map(|i| Edge::line(points[i], points[(i + 1) % n]))
            .collect();
        Self { edges, surface }
    }

    /// Planar polygons approximating the face.
    #[must_use]
    pub fn facets(&self) -> Vec<Vec<Point3>> {
        match self.surface {
            Surface::Plane | Surface::Ruled => {
                let pts: Vec<Point3> = self.edges.iter().flat_map(Edge::polygon_points).collect();
                if pts.len() >= 3 { vec![pts] } else { Vec::new() }
            }
            Surface::Cylinder {
                base,
                axis,
                x_axis,
                radius,
            } => {
                let Some(normal) = axis.normalized() else {
                    return Vec::new();
                };
                let y_axis = normal.cross(x_axis);
                let ring = |k: usize| {
                    let (s, c) = (TAU * k as f64 / CIRCLE_SEGMENTS as f64).sin_cos();
                    base + x_axis * (radius * c) + y_axis * (radius * s)
                };
                (0..CIRCLE_SEGMENTS)
                    .map(|k| {
                        let a = ring(k);
                        let b = ring(k + 1);
                        vec![a, b, b + axis, a + axis]
                    })
                    .collect()
            }
        }
    }

    /// Area-weighted centroid of the facets.
    #[must_use]
    pub fn center_of_mass(&self) -> Option<Point3> {
        let mut weighted = Vec3::ZERO;
        let mut total = 0.0;
        for facet in self.facets() {
            let normal = newell_normal(&facet);
            let Some(unit) = normal.normalized() else {
                continue;
            };
            let origin = facet[0];
            for w in facet[1..].windows(2) {
                let area = 0.5 * (w[0] - origin).cross(w[1] - origin).dot(unit);
                let centroid = (origin.to_vec3() + w[0].to_vec3() + w[1].to_vec3()) / 3.0;
                weighted = weighted + centroid * area;
                total += area;
            }
        }
        if total.abs() <= Tolerance::ZERO_LENGTH.eps {
            let pts: Vec<Point3> = self.edges.iter().flat_map(Edge::polygon_points).collect();
            return BBox::from_points(&pts).map(BBox::center);
        }
        Some(Point3::from(weighted / total))
    }

    #[must_use]
    pub fn transformed(&self, placement: &Placement) -> Self {
        let surface = match self.surface {
            Surface::Cylinder {
                base,
                axis,
                x_axis,
                radius,
            } => Surface::Cylinder {
                base: placement.apply_point(base),
                axis: placement.apply_vec(axis),
                x_axis: placement.apply_vec(x_axis),
                radius,
            },
            other => other,
        };
        Self {
            edges: self.edges.iter().map(|e| e.transformed(placement)).collect(),
            surface,
        }
    }
}

/// Newell normal of a polygon. Its length is twice the polygon area.
#[must_use]
pub fn newell_normal(points: &[Point3]) -> Vec3 {
    let n = points.len();
    let mut normal = Vec3::ZERO;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        normal = normal
            + Vec3::new(
                (a.y - b.y) * (a.z + b.z),
                (a.z - b.z) * (a.x + b.x),
                (a.x - b.x) * (a.y + b.y),
            );
    }
    normal
}

// ─────────────────────────────────────────────────────────────────────────────
// Shapes
// ─────────────────────────────────────────────────────────────────────────────

/// Faces of a solid, or the bare edges of a wire.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Shape {
    pub faces: Vec<Face>,
    pub edges: Vec<Edge>,
}

impl Shape {
    /// Wire shape with one line edge per polyline edge.
    #[must_use]
    pub fn from_polyline(wire: &Polyline) -> Self {
        let edges = (0..wire.edge_count())
            .filter_map(|i| wire.edge(i))
            .map(|(a, b)| Edge::line(a, b))
            .collect();
        Self {
            faces: Vec::new(),
            edges,
        }
    }

    /// Box with FreeCAD face order: x = 0, x = L, y = 0, y = W, z = 0, z = H.
    pub fn make_box(length: f64, width: f64, height: f64) -> Result<Self, ShapeError> {
        validate_dimensions(&[length, width, height])?;
        let p = |x: f64, y: f64, z: f64| Point3::new(x, y, z);
        let (l, w, h) = (length, width, height);
        let faces = vec![
            Face::polygon(&[p(0.0, 0.0, 0.0), p(0.0, 0.0, h), p(0.0, w, h), p(0.0, w, 0.0)]),
            Face::polygon(&[p(l, 0.0, 0.0), p(l, w, 0.0), p(l, w, h), p(l, 0.0, h)]),
            Face::polygon(&[p(0.0, 0.0, 0.0), p(l, 0.0, 0.0), p(l, 0.0, h), p(0.0, 0.0, h)]),
            Face::polygon(&[p(0.0, w, 0.0), p(0.0, w, h), p(l, w, h), p(l, w, 0.0)]),
            Face::polygon(&[p(0.0, 0.0, 0.0), p(l, 0.0, 0.0), p(l, w, 0.0), p(0.0, w, 0.0)]),
            Face::polygon(&[p(0.0, 0.0, h), p(0.0, w, h), p(l, w, h), p(l, 0.0, h)]),
        ];
        Ok(Self::from_faces(faces))
    }

    /// Cylinder along local Z: lateral face, top disk, bottom disk.
    pub fn make_cylinder(radius: f64, height: f64) -> Result<Self, ShapeError> {
        validate_dimensions(&[radius, height])?;
        let bottom = Edge::circle(Point3::ORIGIN, Vec3::Z, radius);
        let top = Edge::circle(Point3::new(0.0, 0.0, height), Vec3::Z, radius);
        let x_axis = Vec3::Z.any_perpendicular();
        let seam = Edge::line(
            Point3::ORIGIN + x_axis * radius,
            Point3::new(0.0, 0.0, height) + x_axis * radius,
        );
        let lateral = Face {
            edges: vec![top, seam, bottom.reversed(), seam.reversed()],
            surface: Surface::Cylinder {
                base: Point3::ORIGIN,
                axis: Vec3::new(0.0, 0.0, height),
                x_axis,
                radius,
            },
        };
        let top_face = Face {
            edges: vec![top],
            surface: Surface::Plane,
        };
        let bottom_face = Face {
            edges: vec![bottom.reversed()],
            surface: Surface::Plane,
        };
        Ok(Self::from_faces(vec![lateral, top_face, bottom_face]))
    }

    /// Extrudes a closed profile by `direction`. Faces are ordered as the
    /// `n` lateral faces, then the base cap (index `n`), then the end cap
    /// (index `n + 1`).
    pub fn make_prism(profile: &Polyline, direction: Vec3) -> Result<Self, ShapeError> {
        if !profile.is_closed() || profile.len() < 3 {
            return Err(ShapeError::OpenProfile);
        }
        if !direction.length().is_finite() || direction.normalized().is_none() {
            return Err(ShapeError::InvalidDirection);
        }
        let base = profile.points();
        let top: Vec<Point3> = base.iter().map(|p| *p + direction).collect();
        let n = base.len();

        let mut faces: Vec<Face> = (0..n)
            .map(|i| {
                let j = (i + 1) % n;
                Face::polygon(&[base[i], base[j], top[j], top[i]])
            })
            .collect();
        faces.push(Face::polygon(base));
        faces.push(Face::polygon(&top));
        Ok(Self::from_faces(faces))
    }

    /// Ruled loft through `sections`. Sections with fewer points than the
    /// densest one are resampled by arc length to its point count. A solid loft of closed sections gets both
    /// end caps.
    pub fn make_loft(sections: &[Polyline], solid: bool) -> Result<Self, ShapeError> {
        if sections.len() < 2 {
            return Err(ShapeError::NotEnoughSections {
                count: sections.len(),
            });
        }
        if let Some(index) = sections.iter().position(|s| s.len() < 2) {
            return Err(ShapeError::DegenerateSection { index });
        }
        let count = sections.iter().map(Polyline::len).max().unwrap_or(2);
        let closed = sections.iter().all(Polyline::is_closed);
        let rings: Vec<Vec<Point3>> = sections
            .iter()
            .map(|s| {
                if s.len() == count {
                    s.points().to_vec()
                } else {
                    s.resample(count)
                }
            })
            .collect();

        let spans = if closed { count } else { count - 1 };
        let mut faces = Vec::new();
        for pair in rings.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            for i in 0..spans {
                let j = (i + 1) % count;
                faces.push(Face::bounded(&[a[i], a[j], b[j], b[i]], Surface::Ruled));
            }
        }
        if solid && closed {
            if let (Some(first), Some(last)) = (rings.first(), rings.last()) {
                faces.push(Face::polygon(first));
                faces.push(Face::polygon(last));
            }
        }
        Ok(Self::from_faces(faces))
    }

    /// Rectangular face `length` × `width` in the local XY plane.
    pub fn make_plane(length: f64, width: f64) -> Result<Self, ShapeError> {
        validate_dimensions(&[length, width])?;
        let face = Face::polygon(&[
            Point3::ORIGIN,
            Point3::new(length, 0.0, 0.0),
            Point3::new(length, width, 0.0),
            Point3::new(0.0, width, 0.0),
        ]);
        Ok(Self::from_faces(vec![face]))
    }

    fn from_faces(faces: Vec<Face>) -> Self {
        let mut edges: Vec<Edge> = Vec::new();
        for edge in faces.iter().flat_map(|f| f.edges.iter()) {
            let duplicate = edges.iter().any(|known| same_edge(known, edge));
            if !duplicate {
                edges.push(*edge);
            }
        }
        Self { faces, edges }
    }

    #[must_use]
    pub fn is_solid(&self) -> bool {
        !self.faces.is_empty()
    }

    /// Distinct edge end points, in edge order.
    #[must_use]
    pub fn vertices(&self) -> Vec<Point3> {
        let tol = Tolerance::WELD;
        let mut out: Vec<Point3> = Vec::new();
        for edge in &self.edges {
            for p in [edge.first_vertex(), edge.last_vertex()] {
                if !out.iter().any(|q| tol.approx_eq_point3(*q, p)) {
                    out.push(p);
                }
            }
        }
        out
    }

    #[must_use]
    pub fn bbox(&self) -> Option<BBox> {
        let mut pts: Vec<Point3> = self
            .faces
            .iter()
            .flat_map(Face::facets)
            .flatten()
            .collect();
        pts.extend(self.edges.iter().flat_map(Edge::polygon_points));
        BBox::from_points(&pts)
    }

    #[must_use]
    pub fn transformed(&self, placement: &Placement) -> Self {
        Self {
            faces: self.faces.iter().map(|f| f.transformed(placement)).collect(),
            edges: self.edges.iter().map(|e| e.transformed(placement)).collect(),
        }
    }
}

fn same_edge(a: &Edge, b: &Edge) -> bool {
    let tol = Tolerance::WELD;
    match (a.curve, b.curve) {
        (Curve::Line { .. }, Curve::Line { .. }) => {
            let (a0, a1) = (a.first_vertex(), a.last_vertex());
            let (b0, b1) = (b.first_vertex(), b.last_vertex());
            (tol.approx_eq_point3(a0, b0) && tol.approx_eq_point3(a1, b1))
                || (tol.approx_eq_point3(a0, b1) && tol.approx_eq_point3(a1, b0))
        }
        (ca @ Curve::Circle { .. }, cb @ Curve::Circle { .. }) => ca == cb,
        _ => false,
    }
}

fn validate_dimensions(values: &[f64]) -> Result<(), ShapeError> {
    if values.iter().all(|v| v.is_finite() && *v > 0.0) {
        Ok(())
    } else {
        Err(ShapeError::InvalidDimensions)
    }
}
