use super::*;

fn rect(x: f64, y: f64, w: f64, h: f64) -> [Point; 4] {
    [
        Point::new(x, y),
        Point::new(x + w, y),
        Point::new(x + w, y + h),
        Point::new(x, y + h),
    ]
}

#[test]
fn content_affine_maps_source_corners_onto_parallelogram() {
    let pts = [
        Point::new(10.0, 10.0),
        Point::new(110.0, 30.0),
        Point::new(130.0, 130.0),
        Point::new(30.0, 110.0),
    ];
    let a = content_affine(&pts, 50.0, 25.0);
    let close = |p: Point, q: Point| (p - q).hypot() < 1e-9;
    assert!(close(a * Point::new(0.0, 0.0), pts[0]));
    assert!(close(a * Point::new(50.0, 0.0), pts[1]));
    assert!(close(a * Point::new(0.0, 25.0), pts[3]));
    assert!(close(a * Point::new(50.0, 25.0), pts[2]));
}

#[test]
fn content_affine_tolerates_zero_sized_source() {
    let a = content_affine(&rect(0.0, 0.0, 10.0, 10.0), 0.0, 0.0);
    assert!(a.as_coeffs().iter().all(|c| c.is_finite()));
}

#[test]
fn quad_path_visits_points_in_order() {
    let pts = rect(0.0, 0.0, 4.0, 2.0);
    let path = quad_path(&pts);
    assert_eq!(path.elements().len(), 5);
    assert_eq!(path.elements()[0], kurbo::PathEl::MoveTo(pts[0]));
    assert_eq!(path.elements()[2], kurbo::PathEl::LineTo(pts[2]));
    assert_eq!(path.elements()[4], kurbo::PathEl::ClosePath);
}

#[test]
fn feather_mask_falls_off_linearly() {
    let pts = rect(0.0, 0.0, 60.0, 80.0);
    let m = FeatherMask::for_quad(&pts, 25.0).unwrap();
    assert_eq!(m.center, Point::new(30.0, 40.0));
    assert_eq!(m.outer, 50.0);
    assert_eq!(m.inner, 25.0);
    assert_eq!(m.alpha_at(Point::new(30.0, 40.0)), 1.0);
    assert!((m.alpha_at(Point::new(30.0, 40.0 + 37.5)) - 0.5).abs() < 1e-9);
    assert_eq!(m.alpha_at(Point::new(30.0, 40.0 + 50.0)), 0.0);
}

#[test]
fn full_feather_fades_from_center() {
    let m = FeatherMask::for_quad(&rect(0.0, 0.0, 10.0, 10.0), 50.0).unwrap();
    assert_eq!(m.inner, 0.0);
    assert!(m.alpha_at(Point::new(5.0, 5.0)) > 0.99);
}

#[test]
fn no_mask_without_feather_or_extent() {
    assert!(FeatherMask::for_quad(&rect(0.0, 0.0, 10.0, 10.0), 0.0).is_none());
    let degenerate = [Point::new(3.0, 3.0); 4];
    assert!(FeatherMask::for_quad(&degenerate, 20.0).is_none());
}
