mod core;
mod placement;
mod plane;
mod polyline;
mod section;
mod shape;

pub use core::{BBox, Point3, Tolerance, Vec3};
pub use placement::{Placement, Rotation};
pub use plane::{Plane, calculate_tip_end_point, intersect_line_plane};
pub use polyline::{
    CutSide, CutType, Polyline, SAMPLE_INTERVALS, Sampling, TangentType, WireCut, WirePosition, Wrap,
    curve_vec, cut_after_wrap, cut_wire, discretized_point, normal_vec, tangent_vec, wrap_points,
};
pub use section::{RefPlane, section_wires, slice_shape, stitch_edges};
pub use shape::{CIRCLE_SEGMENTS, Curve, Edge, Face, Shape, ShapeError, Surface, newell_normal};

#[cfg(test)]
mod tests;
