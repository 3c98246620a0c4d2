use crate::geom::{
    Edge, Placement, Point3, Polyline, Rotation, Shape, ShapeError, Tolerance, Vec3,
};

const TOL: Tolerance = Tolerance::new(1e-9);

#[test]
fn box_face5_is_bottom_with_expected_edges() {
    let shape = Shape::make_box(10.0, 4.0, 2.0).unwrap();
    assert_eq!(shape.faces.len(), 6);
    let face5 = &shape.faces[4];
    let firsts: Vec<Point3> = face5.edges.iter().map(Edge::first_vertex).collect();
    assert_eq!(
        firsts,
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(10.0, 4.0, 0.0),
            Point3::new(0.0, 4.0, 0.0),
        ]
    );
    let com = face5.center_of_mass().unwrap();
    assert!(TOL.approx_eq_point3(com, Point3::new(5.0, 2.0, 0.0)));
    assert_eq!(shape.edges.len(), 12);
    assert_eq!(shape.vertices().len(), 8);
}

#[test]
fn cylinder_face3_is_bottom_disk() {
    let shape = Shape::make_cylinder(2.0, 5.0).unwrap();
    assert_eq!(shape.faces.len(), 3);
    let disk = &shape.faces[2];
    assert_eq!(disk.edges.len(), 1);
    let com = disk.center_of_mass().unwrap();
    assert!(TOL.approx_eq_point3(com, Point3::ORIGIN));
    let bbox = shape.bbox().unwrap();
    assert!((bbox.z_length() - 5.0).abs() < 1e-12);
    assert!((bbox.x_length() - 4.0).abs() < 1e-9);
}

#[test]
fn reversed_edge_swaps_ends_and_tangent() {
    let edge = Edge::line(Point3::ORIGIN, Point3::new(2.0, 0.0, 0.0));
    let rev = edge.reversed();
    assert_eq!(rev.first_vertex(), edge.last_vertex());
    assert_eq!(rev.tangent_at_fraction(0.3), -Vec3::X);
    assert_eq!(rev.value_at_fraction(0.25), Point3::new(1.5, 0.0, 0.0));
    let pts = edge.discretize(101);
    assert_eq!(pts.len(), 101);
    assert_eq!(pts[50], Point3::new(1.0, 0.0, 0.0));
}

#[test]
fn prism_end_cap_follows_base_caps() {
    let profile = Polyline::closed(vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
    ]);
    let prism = Shape::make_prism(&profile, Vec3::new(0.0, 0.0, 3.0)).unwrap();
    assert_eq!(prism.faces.len(), 5);
    let end_cap = &prism.faces[profile.len() + 1];
    let com = end_cap.center_of_mass().unwrap();
    assert!(TOL.approx_eq_point3(com, Point3::new(1.0 / 3.0, 1.0 / 3.0, 3.0)));

    let open = Polyline::open(profile.points().to_vec());
    assert_eq!(
        Shape::make_prism(&open, Vec3::Z),
        Err(ShapeError::OpenProfile)
    );
}

#[test]
fn transformed_shape_moves_faces() {
    let shape = Shape::make_box(1.0, 1.0, 1.0).unwrap();
    let placement = Placement::new(
        Vec3::new(0.0, 0.0, 5.0),
        Rotation::from_axis_degrees(Vec3::Z, 90.0),
    );
    let moved = shape.transformed(&placement);
    let bbox = moved.bbox().unwrap();
    assert!(TOL.approx_eq_point3(bbox.min, Point3::new(-1.0, 0.0, 5.0)));
    assert!(TOL.approx_eq_point3(bbox.max, Point3::new(0.0, 1.0, 6.0)));
}

#[test]
fn loft_rejects_single_section() {
    let wire = Polyline::closed(vec![Point3::ORIGIN, Point3::new(1.0, 0.0, 0.0)]);
    assert_eq!(
        Shape::make_loft(&[wire], true),
        Err(ShapeError::NotEnoughSections { count: 1 })
    );
}
