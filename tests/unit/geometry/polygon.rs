use super::*;

fn square(x: f64, y: f64, s: f64) -> Vec<Point> {
    vec![
        Point::new(x, y),
        Point::new(x + s, y),
        Point::new(x + s, y + s),
        Point::new(x, y + s),
    ]
}

#[test]
fn convex_quads_contain_centroid_and_exclude_outside_bbox() {
    let quads = [
        square(0.0, 0.0, 100.0),
        vec![
            Point::new(10.0, 20.0),
            Point::new(180.0, 5.0),
            Point::new(200.0, 150.0),
            Point::new(-30.0, 120.0),
        ],
        vec![
            Point::new(50.0, 0.0),
            Point::new(100.0, 50.0),
            Point::new(50.0, 100.0),
            Point::new(0.0, 50.0),
        ],
    ];

    for quad in &quads {
        assert!(point_in_polygon(centroid(quad), quad));
        let bb = bounding_box(quad);
        for p in [
            Point::new(bb.min_x - 1.0, bb.min_y + 1.0),
            Point::new(bb.max_x + 0.5, bb.max_y - 1.0),
            Point::new(bb.min_x + 1.0, bb.min_y - 3.0),
            Point::new(bb.max_x - 1.0, bb.max_y + 100.0),
        ] {
            assert!(!point_in_polygon(p, quad), "{p:?} reported inside {quad:?}");
        }
    }
}

#[test]
fn degenerate_quad_never_contains_other_points() {
    let p = Point::new(40.0, 40.0);
    let quad = [p; 4];
    for probe in [
        Point::new(0.0, 0.0),
        Point::new(40.0, 41.0),
        Point::new(39.0, 40.0),
        Point::new(1e9, -1e9),
    ] {
        assert!(!point_in_polygon(probe, &quad));
    }
    // The shared point itself is only required not to panic.
    let _ = point_in_polygon(p, &quad);
}

#[test]
fn collinear_quad_is_empty() {
    let quad = [
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(20.0, 0.0),
        Point::new(30.0, 0.0),
    ];
    assert!(!point_in_polygon(Point::new(5.0, 0.0), &quad));
    assert!(!point_in_polygon(Point::new(5.0, 1.0), &quad));
}

#[test]
fn bowtie_uses_even_odd_rule() {
    // TL, TR, BL, BR order crosses itself in the middle.
    let bowtie = [
        Point::new(0.0, 0.0),
        Point::new(100.0, 0.0),
        Point::new(0.0, 100.0),
        Point::new(100.0, 100.0),
    ];
    assert!(point_in_polygon(Point::new(50.0, 10.0), &bowtie));
    assert!(point_in_polygon(Point::new(50.0, 90.0), &bowtie));
    assert!(!point_in_polygon(Point::new(10.0, 50.0), &bowtie));
    assert!(!point_in_polygon(Point::new(90.0, 50.0), &bowtie));
}

#[test]
fn short_inputs_are_defined() {
    assert!(!point_in_polygon(Point::new(0.0, 0.0), &[]));
    assert!(!point_in_polygon(
        Point::new(0.0, 0.0),
        &[Point::new(-1.0, -1.0), Point::new(1.0, 1.0)]
    ));
    let bb = bounding_box(&[]);
    assert_eq!(bb.width(), 0.0);
    assert_eq!(centroid(&[]), Point::ORIGIN);
}

#[test]
fn bounding_box_and_distance() {
    let bb = bounding_box(&[
        Point::new(3.0, -2.0),
        Point::new(-1.0, 7.0),
        Point::new(5.0, 1.0),
    ]);
    assert_eq!(
        bb,
        BoundingBox {
            min_x: -1.0,
            max_x: 5.0,
            min_y: -2.0,
            max_y: 7.0,
        }
    );
    assert!(bb.contains(Point::new(5.0, 7.0)));
    assert_eq!(distance(Point::new(0.0, 0.0), Point::new(3.0, 4.0)), 5.0);
}
