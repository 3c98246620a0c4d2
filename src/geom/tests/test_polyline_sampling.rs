use crate::geom::{
    Point3, Polyline, TangentType, Tolerance, Vec3, WirePosition, cut_wire, discretized_point,
    tangent_vec,
};

fn hexagon() -> Polyline {
    let pts = (0..6)
        .map(|i| {
            let a = std::f64::consts::TAU * f64::from(i) / 6.0;
            Point3::new(10.0 * a.cos(), 10.0 * a.sin(), 0.0)
        })
        .collect();
    Polyline::closed(pts)
}

fn quad() -> Polyline {
    Polyline::closed(vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(2.0, 0.0, 0.0),
        Point3::new(3.0, 2.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
    ])
}

#[test]
fn tangents_are_unit_length_on_closed_wires() {
    let wire = hexagon();
    for policy in [
        TangentType::Previous,
        TangentType::Next,
        TangentType::PreviousAndNext,
    ] {
        for i in 0..wire.len() {
            let t = tangent_vec(&wire, i, policy);
            assert!((t.length() - 1.0).abs() < 1e-12, "index {i} policy {policy:?}");
        }
    }
}

#[test]
fn tangent_next_uses_following_vertex() {
    let wire = quad();
    let t = tangent_vec(&wire, 2, TangentType::Next);
    let expected = (wire.points()[3] - wire.points()[2]).normalized().unwrap();
    assert!(Tolerance::DEFAULT.approx_eq_vec3(t, expected));

    let wrapped = tangent_vec(&wire, 3, TangentType::Next);
    let expected = (wire.points()[0] - wire.points()[3]).normalized().unwrap();
    assert!(Tolerance::DEFAULT.approx_eq_vec3(wrapped, expected));
}

#[test]
fn degenerate_wires_give_zero_vectors() {
    let empty = Polyline::closed(Vec::new());
    let single = Polyline::closed(vec![Point3::ORIGIN]);
    assert_eq!(tangent_vec(&empty, 0, TangentType::PreviousAndNext), Vec3::ZERO);
    assert_eq!(tangent_vec(&single, 0, TangentType::Next), Vec3::ZERO);
    assert_eq!(crate::geom::normal_vec(&single, 0), Vec3::ZERO);
    assert_eq!(discretized_point(&empty, 0.5), None);
}

#[test]
fn integer_positions_return_exact_vertices() {
    let wire = hexagon();
    for (i, p) in wire.points().iter().enumerate() {
        assert_eq!(discretized_point(&wire, i as f64), Some(*p));
    }
}

#[test]
fn discretized_point_is_continuous_at_vertices() {
    let wire = hexagon();
    let vertex = wire.points()[2];
    let below = discretized_point(&wire, 1.99).unwrap();
    let above = discretized_point(&wire, 2.01).unwrap();
    let edge = wire.points()[1].distance_to(vertex);
    assert!(below.distance_to(vertex) <= edge * 0.011);
    assert!(above.distance_to(vertex) <= edge * 0.011);
    assert_eq!(discretized_point(&wire, 1.999), Some(vertex));
}

#[test]
fn negative_positions_wrap_around() {
    let wire = hexagon();
    assert_eq!(discretized_point(&wire, -1.0), discretized_point(&wire, 5.0));
    assert_eq!(
        WirePosition::resolve(&wire, -0.25),
        Some(WirePosition { index: 5, sample: 75, intervals: 100 })
    );
}

#[test]
fn cut_mid_edge_starts_right_at_interpolated_point() {
    let wire = hexagon();
    let cut = cut_wire(&wire, 1.5, 3.0).unwrap();
    let p1 = wire.points()[1];
    let p2 = wire.points()[2];
    let mid = p1.lerp(p2, 0.5);

    assert!(Tolerance::DEFAULT.approx_eq_point3(cut.right[0], mid));
    assert_ne!(cut.right[0], p1);
    assert_ne!(cut.right[0], p2);
    assert_eq!(cut.right[1..], [p2, wire.points()[3]]);
}

#[test]
fn cut_halves_cover_every_vertex_once() {
    let wire = hexagon();
    let cut = cut_wire(&wire, 1.5, 3.0).unwrap();

    // left: p3, p4, p5, p0, p1, mid
    assert_eq!(cut.left.len(), 6);
    assert_eq!(cut.left.first(), cut.right.last());
    assert_eq!(cut.left.last(), cut.right.first());

    let mut seen: Vec<Point3> = cut.right[..cut.right.len() - 1].to_vec();
    seen.extend_from_slice(&cut.left[..cut.left.len() - 1]);
    for p in wire.points() {
        let count = seen.iter().filter(|q| *q == p).count();
        assert_eq!(count, 1, "vertex {p:?}");
    }
}
