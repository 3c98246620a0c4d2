//! Wire sampling utilities.
//!
//! A [`Polyline`] is the point-list form of a Draft-style wire. Positions on
//! a wire are addressed by a real number `v` whose integer part selects an
//! edge and whose fractional part selects one of the uniform samples on that
//! edge (see [`Sampling`] and [`WirePosition`]).

use serde::{Deserialize, Serialize};

use super::core::{BBox, Point3, Vec3};
use super::placement::Placement;

/// Default number of sample intervals per edge. An edge discretized into
/// `SAMPLE_INTERVALS + 1` points is addressed by sample `0..=100`.
pub const SAMPLE_INTERVALS: u32 = 100;

// ─────────────────────────────────────────────────────────────────────────────
// Polyline
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Point3>,
    closed: bool,
}

impl Polyline {
    /// Builds a wire. Degenerate point lists (0 or 1 point) are accepted;
    /// the sampling functions return zero vectors on them.
    #[must_use]
    pub fn new(points: Vec<Point3>, closed: bool) -> Self {
        Self { points, closed }
    }

    #[must_use]
    pub fn closed(points: Vec<Point3>) -> Self {
        Self::new(points, true)
    }

    #[must_use]
    pub fn open(points: Vec<Point3>) -> Self {
        Self::new(points, false)
    }

    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    #[must_use]
    pub fn into_points(self) -> Vec<Point3> {
        self.points
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of boundary edges. A closed wire of `n >= 3` points has `n`
    /// edges, the closing edge running from the last point back to the first.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        let n = self.points.len();
        match n {
            0 | 1 => 0,
            2 => 1,
            _ if self.closed => n,
            _ => n - 1,
        }
    }

    #[must_use]
    pub fn vertex(&self, index: usize) -> Option<Point3> {
        self.points.get(index).copied()
    }

    /// Vertex at `index + offset`, wrapped modulo the point count on closed
    /// wires and clamped to the ends on open ones.
    #[must_use]
    pub fn neighbour(&self, index: usize, offset: isize) -> Option<Point3> {
        let n = self.points.len();
        if n == 0 {
            return None;
        }
        let raw = index as isize + offset;
        let idx = if self.closed {
            raw.rem_euclid(n as isize) as usize
        } else {
            raw.clamp(0, n as isize - 1) as usize
        };
        self.vertex(idx)
    }

    /// Vertex at `index + offset`, always wrapped modulo the point count.
    #[must_use]
    pub fn cyclic_vertex(&self, index: usize, offset: isize) -> Option<Point3> {
        let n = self.points.len();
        if n == 0 {
            return None;
        }
        let idx = (index as isize + offset).rem_euclid(n as isize) as usize;
        self.vertex(idx)
    }

    /// Start and end point of edge `index`.
    #[must_use]
    pub fn edge(&self, index: usize) -> Option<(Point3, Point3)> {
        if index >= self.edge_count() {
            return None;
        }
        let start = self.points[index];
        let end = self.points[(index + 1) % self.points.len()];
        Some((start, end))
    }

    /// Total arc length, including the closing edge on closed wires.
    #[must_use]
    pub fn length(&self) -> f64 {
        (0..self.edge_count())
            .filter_map(|i| self.edge(i))
            .map(|(a, b)| a.distance_to(b))
            .sum()
    }

    #[must_use]
    pub fn bbox(&self) -> Option<BBox> {
        BBox::from_points(&self.points)
    }

    #[must_use]
    pub fn transformed(&self, placement: &Placement) -> Self {
        Self {
            points: self
                .points
                .iter()
                .map(|p| placement.apply_point(*p))
                .collect(),
            closed: self.closed,
        }
    }

    /// Replaces the point list. Any length is accepted.
    pub fn set_points(&mut self, points: Vec<Point3>) {
        self.points = points;
    }

    /// `count` points spaced uniformly by arc length, starting at the first
    /// vertex. On closed wires the closing edge is part of the walk and the
    /// start point is not repeated.
    #[must_use]
    pub fn resample(&self, count: usize) -> Vec<Point3> {
        if count == 0 || self.points.is_empty() {
            return Vec::new();
        }
        let total = self.length();
        if total <= f64::EPSILON || self.edge_count() == 0 {
            return vec![self.points[0]; count];
        }

        let divisions = if self.closed { count } else { count.saturating_sub(1).max(1) };
        let step = total / divisions as f64;
        let mut out = Vec::with_capacity(count);
        let mut edge = 0;
        let mut walked = 0.0;
        for k in 0..count {
            let target = (step * k as f64).min(total);
            while let Some((a, b)) = self.edge(edge) {
                let len = a.distance_to(b);
                if walked + len >= target || edge + 1 == self.edge_count() {
                    let t = if len > 0.0 { ((target - walked) / len).clamp(0.0, 1.0) } else { 0.0 };
                    out.push(a.lerp(b, t));
                    break;
                }
                walked += len;
                edge += 1;
            }
        }
        out
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Parametric positions
// ─────────────────────────────────────────────────────────────────────────────

/// Edge discretization used to resolve parametric positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sampling {
    intervals: u32,
}

impl Default for Sampling {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Sampling {
    /// 101 samples per edge.
    pub const DEFAULT: Self = Self {
        intervals: SAMPLE_INTERVALS,
    };

    /// Discretization into `samples` points per edge, both vertices
    /// included. Needs at least 2 samples.
    #[must_use]
    pub fn from_samples(samples: u32) -> Option<Self> {
        (samples >= 2).then(|| Self {
            intervals: samples - 1,
        })
    }

    #[must_use]
    pub fn intervals(self) -> u32 {
        self.intervals
    }

    /// Resolves `v` on `wire`.
    ///
    /// `v` is first wrapped into `[0, n)`. The fractional part is rounded to
    /// the nearest sample interval; a fraction that rounds to a whole edge
    /// moves on to the next vertex. Positions on the last vertex of an open
    /// wire have no edge to sample and snap to that vertex.
    #[must_use]
    pub fn position(self, wire: &Polyline, v: f64) -> Option<WirePosition> {
        let n = wire.len();
        if n == 0 || !v.is_finite() {
            return None;
        }
        let wrapped = v.rem_euclid(n as f64);
        let mut index = wrapped.floor() as usize;
        if index >= n {
            index = 0;
        }
        let frac = (wrapped - index as f64).abs();
        let mut sample = (frac * f64::from(self.intervals)).round() as u32;

        if sample >= self.intervals {
            sample = 0;
            index = match index + 1 {
                next if next < n => next,
                _ if wire.is_closed() => 0,
                _ => n - 1,
            };
        }
        if index >= wire.edge_count() {
            sample = 0;
        }
        Some(WirePosition {
            index,
            sample,
            intervals: self.intervals,
        })
    }

    /// Point at parametric position `v`. Integer positions return the
    /// vertex exactly.
    #[must_use]
    pub fn point(self, wire: &Polyline, v: f64) -> Option<Point3> {
        self.position(wire, v)?.point(wire)
    }

    /// See [`cut_wire`].
    #[must_use]
    pub fn cut(self, wire: &Polyline, start: f64, end: f64) -> Option<WireCut> {
        let s = self.position(wire, start)?;
        let e = self.position(wire, end)?;
        cut_between(wire, s, e)
    }

    /// See [`wrap_points`].
    #[must_use]
    pub fn wrap(
        self,
        wire: &Polyline,
        start: f64,
        end: f64,
        thickness: f64,
        tangent_type: TangentType,
        inward: bool,
    ) -> Option<Wrap> {
        let n = wire.len();
        let s = self.position(wire, start)?;
        let cut = self.cut(wire, start, end)?;
        let signed = if inward { thickness } else { -thickness };
        let offset = cut
            .right
            .iter()
            .enumerate()
            .map(|(i, p)| *p + curve_vec(wire, (s.index + i) % n, tangent_type) * signed)
            .collect();
        Some(Wrap {
            inner: cut.right,
            offset,
        })
    }

    /// See [`cut_after_wrap`].
    #[must_use]
    pub fn cut_after_wrap(self, wire: &Polyline, start: f64, end: f64, wrap: &Wrap) -> Option<Vec<Point3>> {
        let cut = self.cut(wire, start, end)?;
        let mut pts = cut.left;
        pts.extend(wrap.offset.iter().copied());
        Some(pts)
    }
}

/// A resolved parametric position: vertex/edge index plus sample number out
/// of `intervals`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WirePosition {
    pub index: usize,
    pub sample: u32,
    pub intervals: u32,
}

impl WirePosition {
    /// Resolves `v` on `wire` with the default 101 samples per edge.
    #[must_use]
    pub fn resolve(wire: &Polyline, v: f64) -> Option<Self> {
        Sampling::DEFAULT.position(wire, v)
    }

    #[must_use]
    pub fn fraction(self) -> f64 {
        f64::from(self.sample) / f64::from(self.intervals)
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.index as f64 + self.fraction()
    }

    #[must_use]
    pub fn is_vertex(self) -> bool {
        self.sample == 0
    }

    /// The point this position designates.
    #[must_use]
    pub fn point(self, wire: &Polyline) -> Option<Point3> {
        if self.sample == 0 {
            return wire.vertex(self.index);
        }
        let (a, b) = wire.edge(self.index)?;
        Some(a.lerp(b, self.fraction()))
    }
}

/// Point at parametric position `v`, with the default sampling.
#[must_use]
pub fn discretized_point(wire: &Polyline, v: f64) -> Option<Point3> {
    Sampling::DEFAULT.point(wire, v)
}

// ─────────────────────────────────────────────────────────────────────────────
// Local frame estimation
// ─────────────────────────────────────────────────────────────────────────────

/// Neighbour policy for tangent estimation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TangentType {
    Previous,
    Next,
    #[default]
    PreviousAndNext,
}

impl TangentType {
    pub const NAMES: &'static [&'static str] = &["Previous", "Next", "PreviousAndNext"];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Previous => "Previous",
            Self::Next => "Next",
            Self::PreviousAndNext => "PreviousAndNext",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Previous" => Some(Self::Previous),
            "Next" => Some(Self::Next),
            "PreviousAndNext" => Some(Self::PreviousAndNext),
            _ => None,
        }
    }
}

/// Unit tangent at vertex `index`, or [`Vec3::ZERO`] when it cannot be
/// estimated.
#[must_use]
pub fn tangent_vec(wire: &Polyline, index: usize, tangent_type: TangentType) -> Vec3 {
    let n = wire.len();
    if n < 2 {
        return Vec3::ZERO;
    }
    if n == 2 {
        return (wire.points[1] - wire.points[0]).normalized_or_zero();
    }
    let index = index % n;
    let (before, after) = match tangent_type {
        TangentType::Previous => (wire.neighbour(index, -1), wire.vertex(index)),
        TangentType::Next => (wire.vertex(index), wire.neighbour(index, 1)),
        TangentType::PreviousAndNext => (wire.neighbour(index, -1), wire.neighbour(index, 1)),
    };
    match (before, after) {
        (Some(a), Some(b)) => (b - a).normalized_or_zero(),
        _ => Vec3::ZERO,
    }
}

/// Normal estimated from two far neighbours, a third of the wire away on
/// each side of `index`.
#[must_use]
pub fn normal_vec(wire: &Polyline, index: usize) -> Vec3 {
    let n = wire.len();
    if n < 3 {
        return Vec3::ZERO;
    }
    let index = index % n;
    let gap = (n / 3) as isize;
    let center = wire.points[index];
    match (wire.cyclic_vertex(index, -gap), wire.cyclic_vertex(index, gap)) {
        (Some(before), Some(after)) => (before - center).cross(after - center).normalized_or_zero(),
        _ => Vec3::ZERO,
    }
}

/// In-plane direction perpendicular to the tangent. On a counter-clockwise
/// wire it points inward.
#[must_use]
pub fn curve_vec(wire: &Polyline, index: usize, tangent_type: TangentType) -> Vec3 {
    tangent_vec(wire, index, tangent_type)
        .cross(normal_vec(wire, index))
        .normalized_or_zero()
}

// ─────────────────────────────────────────────────────────────────────────────
// Cutting
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CutSide {
    Left,
    Right,
}

impl CutSide {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Right => "Right",
        }
    }
}

/// Which halves of a cut are materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CutType {
    Left,
    Right,
    #[default]
    Both,
}

impl CutType {
    pub const NAMES: &'static [&'static str] = &["Left", "Right", "Both"];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Right => "Right",
            Self::Both => "Both",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Left" => Some(Self::Left),
            "Right" => Some(Self::Right),
            "Both" => Some(Self::Both),
            _ => None,
        }
    }

    #[must_use]
    pub fn includes(self, side: CutSide) -> bool {
        matches!(
            (self, side),
            (Self::Both, _) | (Self::Left, CutSide::Left) | (Self::Right, CutSide::Right)
        )
    }
}

/// The two halves of a wire cut at two positions.
///
/// `right` runs from the start position to the end position. `left` runs
/// from the end position around the rest of the wire back to the start
/// position. Both cut points appear in both halves.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WireCut {
    pub left: Vec<Point3>,
    pub right: Vec<Point3>,
}

impl WireCut {
    #[must_use]
    pub fn side(&self, side: CutSide) -> &[Point3] {
        match side {
            CutSide::Left => &self.left,
            CutSide::Right => &self.right,
        }
    }
}

/// Number of whole vertices walked forward from `from` to reach `to`.
fn steps_between(from: WirePosition, to: WirePosition, n: usize) -> usize {
    if to > from {
        to.index - from.index
    } else {
        n - from.index + to.index
    }
}

/// Cuts `wire` at positions `start` and `end`, with the default sampling.
///
/// On a closed wire the walk is cyclic, so an end position before the start
/// position wraps through the first vertex. An open wire has no closing edge
/// to wrap through; there the positions are taken in wire order. Returns
/// `None` when the wire is empty or both positions coincide.
#[must_use]
pub fn cut_wire(wire: &Polyline, start: f64, end: f64) -> Option<WireCut> {
    Sampling::DEFAULT.cut(wire, start, end)
}

fn cut_between(wire: &Polyline, s: WirePosition, e: WirePosition) -> Option<WireCut> {
    if s == e {
        return None;
    }
    if !wire.is_closed() {
        return Some(cut_open(wire, s.min(e), s.max(e)));
    }
    let n = wire.len();
    let p_start = s.point(wire)?;
    let p_end = e.point(wire)?;

    let mut right = vec![p_start];
    right.extend((1..=steps_between(s, e, n)).filter_map(|j| wire.vertex((s.index + j) % n)));
    if !e.is_vertex() {
        right.push(p_end);
    }

    let mut left = vec![p_end];
    left.extend((1..=steps_between(e, s, n)).filter_map(|j| wire.vertex((e.index + j) % n)));
    if !s.is_vertex() {
        left.push(p_start);
    }

    Some(WireCut { left, right })
}

/// Open wire cut at `s <= e`. `right` is the run between both positions.
/// The rest of the wire falls apart in a head before `s` and a tail after
/// `e`; `left` holds whichever of the two is a real run, and stays empty
/// when both are.
fn cut_open(wire: &Polyline, s: WirePosition, e: WirePosition) -> WireCut {
    let points = wire.points();
    let (Some(p_start), Some(p_end)) = (s.point(wire), e.point(wire)) else {
        return WireCut::default();
    };

    let mut right = vec![p_start];
    right.extend_from_slice(&points[s.index + 1..=e.index]);
    if !e.is_vertex() {
        right.push(p_end);
    }

    let mut head = points[..=s.index].to_vec();
    if !s.is_vertex() {
        head.push(p_start);
    }
    let mut tail = vec![p_end];
    tail.extend_from_slice(&points[e.index + 1..]);

    let left = match (head.len() >= 2, tail.len() >= 2) {
        (true, false) => head,
        (false, true) => tail,
        _ => Vec::new(),
    };
    WireCut { left, right }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wrapping
// ─────────────────────────────────────────────────────────────────────────────

/// An offset ribbon built on a wire sub-range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Wrap {
    /// Points on the wire, start to end.
    pub inner: Vec<Point3>,
    /// `inner` moved along the local curve vector, same order.
    pub offset: Vec<Point3>,
}

impl Wrap {
    /// Closed ribbon polygon: the inner run followed by the offset run
    /// walked backwards.
    #[must_use]
    pub fn ribbon(&self) -> Vec<Point3> {
        let mut pts = self.inner.clone();
        pts.extend(self.offset.iter().rev().copied());
        pts
    }
}

/// Builds the wrap of `wire` between `start` and `end`, with the default
/// sampling. `inward` offsets along the curve vector, otherwise against it.
#[must_use]
pub fn wrap_points(
    wire: &Polyline,
    start: f64,
    end: f64,
    thickness: f64,
    tangent_type: TangentType,
    inward: bool,
) -> Option<Wrap> {
    Sampling::DEFAULT.wrap(wire, start, end, thickness, tangent_type, inward)
}

/// The wire with the wrapped range replaced by the wrap's offset run. The
/// result is a closed point list usable to hollow the sheeted region.
#[must_use]
pub fn cut_after_wrap(wire: &Polyline, start: f64, end: f64, wrap: &Wrap) -> Option<Vec<Point3>> {
    Sampling::DEFAULT.cut_after_wrap(wire, start, end, wrap)
}
