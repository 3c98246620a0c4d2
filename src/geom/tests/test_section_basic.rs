use crate::geom::{
    Placement, Point3, Polyline, RefPlane, Shape, Tolerance, Vec3, section_wires,
};

fn centered_unit_cube() -> Shape {
    Shape::make_box(1.0, 1.0, 1.0)
        .unwrap()
        .transformed(&Placement::translation(Vec3::new(-0.5, -0.5, -0.5)))
}

#[test]
fn xy_slice_at_zmin_gives_square() {
    let cube = centered_unit_cube();
    let bbox = cube.bbox().unwrap();
    let plane = RefPlane::XY.cutting_plane(&bbox, 0.0);
    let wires = section_wires(&cube, &plane);

    assert_eq!(wires.len(), 1);
    let square = &wires[0];
    assert!(square.is_closed());
    assert_eq!(square.len(), 4);
    assert_eq!(square.edge_count(), 4);
    for p in square.points() {
        assert!((p.z + 0.5).abs() < 1e-12);
        assert!((p.x.abs() - 0.5).abs() < 1e-12);
        assert!((p.y.abs() - 0.5).abs() < 1e-12);
    }
}

#[test]
fn slice_at_far_face_is_empty() {
    let cube = centered_unit_cube();
    let bbox = cube.bbox().unwrap();
    let top = RefPlane::XY.offset_range(&bbox);
    assert!((top - 1.0).abs() < 1e-12);
    let wires = section_wires(&cube, &RefPlane::XY.cutting_plane(&bbox, top));
    assert!(wires.is_empty());
}

#[test]
fn yz_slice_through_middle() {
    let cube = Shape::make_box(2.0, 3.0, 4.0).unwrap();
    let bbox = cube.bbox().unwrap();
    let wires = section_wires(&cube, &RefPlane::YZ.cutting_plane(&bbox, 1.0));
    assert_eq!(wires.len(), 1);
    let loop_bbox = wires[0].bbox().unwrap();
    assert!((loop_bbox.min.x - 1.0).abs() < 1e-12);
    assert!((loop_bbox.y_length() - 3.0).abs() < 1e-12);
    assert!((loop_bbox.z_length() - 4.0).abs() < 1e-12);
}

#[test]
fn loft_slice_follows_sections() {
    let root = Polyline::closed(vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(4.0, 0.0, 0.0),
        Point3::new(4.0, 2.0, 0.0),
        Point3::new(0.0, 2.0, 0.0),
    ]);
    let tip = Polyline::closed(
        root.points()
            .iter()
            .map(|p| Point3::new(p.x * 0.5, p.y * 0.5, 10.0))
            .collect(),
    );
    let loft = Shape::make_loft(&[root, tip], true).unwrap();
    let bbox = loft.bbox().unwrap();
    let wires = section_wires(&loft, &RefPlane::XY.cutting_plane(&bbox, 5.0));
    assert_eq!(wires.len(), 1);
    let mid = wires[0].bbox().unwrap();
    assert!(Tolerance::LOOSE.approx_eq_f64(mid.x_length(), 3.0));
    assert!(Tolerance::LOOSE.approx_eq_f64(mid.y_length(), 1.5));
}

#[test]
fn xz_plane_placement_uses_bbox_minimum() {
    let cube = Shape::make_box(2.0, 3.0, 4.0)
        .unwrap()
        .transformed(&Placement::translation(Vec3::new(1.0, 1.0, 1.0)));
    let bbox = cube.bbox().unwrap();
    let placement = RefPlane::XZ.placement(&bbox, 0.5);
    assert!(Tolerance::DEFAULT.approx_eq_vec3(placement.base, Vec3::new(1.0, 1.5, 1.0)));
    assert_eq!(RefPlane::XZ.extents(&bbox), (2.0, 4.0));
}
