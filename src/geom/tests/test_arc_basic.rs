use crate::geom::{
    ArcError, GreatCircleArc, Point3, SphericalCoord, Tolerance, Vec3, ViewTransform,
    angular_distance, render_arc,
};

fn top_view() -> ViewTransform {
    ViewTransform::default()
}

#[test]
fn quarter_circle_on_unit_sphere() {
    let arc = GreatCircleArc::from_angles(0.0, 0.0, 0.0, 90.0, 1.0).unwrap();
    let tol = Tolerance::new(1e-12);

    assert!(tol.approx_eq_point3(arc.start(), Point3::new(1.0, 0.0, 0.0)));
    assert!(tol.approx_eq_point3(arc.end(), Point3::new(0.0, 1.0, 0.0)));
    assert!((arc.angle() - 90.0).abs() < 1e-9);
    assert_eq!(arc.step_count(), 90);

    let samples = arc.sample_points();
    assert_eq!(samples.len(), 92);
    for (k, p) in samples.iter().take(91).enumerate() {
        let (s, c) = (k as f64).to_radians().sin_cos();
        assert!(
            tol.approx_eq_point3(*p, Point3::new(c, s, 0.0)),
            "sample {k} off the quarter circle: {p:?}"
        );
        let r2 = p.x * p.x + p.y * p.y + p.z * p.z;
        assert!((r2 - 1.0).abs() < 1e-12);
    }
}

#[test]
fn frame_is_orthogonal_and_scaled_to_radius() {
    let radius = 2.5;
    let arc = GreatCircleArc::from_angles(20.0, 10.0, -35.0, 140.0, radius).unwrap();
    let a = arc.start().to_vec3();
    let c = arc.normal();
    let d = arc.binormal();

    assert!((c.length() - radius).abs() < 1e-12);
    assert!((d.length() - radius).abs() < 1e-12);
    assert!(a.dot(c).abs() < 1e-9);
    assert!(a.dot(d).abs() < 1e-9);
    assert!(c.dot(d).abs() < 1e-9);
    assert!(c.dot(arc.end().to_vec3()).abs() < 1e-9);
    // Walking starts away from D, i.e. toward B.
    assert!(d.dot(arc.end().to_vec3()) < 0.0);
    assert_eq!(arc.direction(), 1.0);
}

#[test]
fn arc_angle_matches_haversine_distance() {
    let pairs = [
        ((0.0, 0.0), (0.0, 90.0)),
        ((10.0, 20.0), (-30.0, 75.0)),
        ((35.264, 45.0), (35.264, 135.0)),
        ((-80.0, 0.0), (80.0, 170.0)),
        ((45.0, 300.0), (12.5, 10.0)),
    ];
    for ((t1, p1), (t2, p2)) in pairs {
        let a = SphericalCoord::new(t1, p1);
        let b = SphericalCoord::new(t2, p2);
        let arc = GreatCircleArc::from_spherical(a, b, 3.0).unwrap();
        let expected = angular_distance(a, b);
        assert!(
            (arc.angle() - expected).abs() < 1e-7,
            "{a:?} -> {b:?}: {} vs {expected}",
            arc.angle()
        );
        assert!((0.0..=180.0).contains(&arc.angle()));
    }
}

#[test]
fn samples_stay_on_sphere_and_keep_endpoints() {
    let radius = 4.0;
    let view = ViewTransform::from_main_coords(70.0, 115.0).unwrap();
    let a = SphericalCoord::new(50.0, -20.0);
    let b = SphericalCoord::new(-40.0, 200.0);
    let split = render_arc(a, b, radius, &view);
    let ordered = split.sampled_points();

    assert_eq!(ordered.len(), split.visible().len() + split.hidden().len());
    assert_eq!(ordered.first().copied(), Some(a.to_cartesian(radius)));
    assert_eq!(ordered.last().copied(), Some(b.to_cartesian(radius)));
    for p in &ordered {
        assert!((p.norm() - radius).abs() < 1e-9);
    }
}

#[test]
fn non_integer_arc_appends_exact_endpoint() {
    let arc = GreatCircleArc::from_angles(0.0, 0.0, 0.0, 10.4, 1.0).unwrap();
    assert_eq!(arc.step_count(), 10);
    let samples = arc.sample_points();
    assert_eq!(samples.len(), 12);
    assert_eq!(samples.last().copied(), Some(arc.end()));
    let last_step = samples[10];
    assert!((last_step.y.atan2(last_step.x).to_degrees() - 10.0).abs() < 1e-9);
}

#[test]
fn rendering_is_idempotent() {
    let view = ViewTransform::from_main_coords(60.0, 30.0).unwrap();
    let a = SphericalCoord::new(5.0, 5.0);
    let b = SphericalCoord::new(25.0, 160.0);
    let first = render_arc(a, b, 1.5, &view);
    let second = render_arc(a, b, 1.5, &view);
    assert_eq!(first, second);
    assert!(!first.is_empty());
}

#[test]
fn coincident_endpoints_are_undefined() {
    assert_eq!(
        GreatCircleArc::from_angles(12.0, 34.0, 12.0, 34.0, 1.0),
        Err(ArcError::UndefinedPlane)
    );
    let split = render_arc(
        SphericalCoord::new(12.0, 34.0),
        SphericalCoord::new(12.0, 34.0),
        1.0,
        &top_view(),
    );
    assert!(split.is_empty());
    assert!(split.visible().is_empty());
    assert!(split.hidden().is_empty());
}

#[test]
fn antipodal_endpoints_fail_soft() {
    assert_eq!(
        GreatCircleArc::from_angles(0.0, 0.0, 0.0, 180.0, 1.0),
        Err(ArcError::UndefinedPlane)
    );
    assert_eq!(
        GreatCircleArc::from_angles(90.0, 0.0, -90.0, 0.0, 2.0),
        Err(ArcError::UndefinedPlane)
    );
    let split = render_arc(
        SphericalCoord::new(0.0, 0.0),
        SphericalCoord::new(0.0, 180.0),
        1.0,
        &top_view(),
    );
    assert!(split.is_empty());
    for p in split.sampled_points() {
        assert!(p.to_vec3().is_finite());
    }
}

#[test]
fn invalid_inputs_are_rejected() {
    assert_eq!(
        GreatCircleArc::from_angles(0.0, 0.0, 0.0, 90.0, 0.0),
        Err(ArcError::InvalidRadius)
    );
    assert_eq!(
        GreatCircleArc::from_angles(0.0, 0.0, 0.0, 90.0, -1.0),
        Err(ArcError::InvalidRadius)
    );
    assert_eq!(
        GreatCircleArc::from_angles(f64::NAN, 0.0, 0.0, 90.0, 1.0),
        Err(ArcError::NonFiniteInput)
    );
    assert_eq!(
        GreatCircleArc::from_directions(Vec3::ZERO, Vec3::X, 1.0),
        Err(ArcError::UndefinedPlane)
    );
}

#[test]
fn directions_are_projected_onto_sphere() {
    let arc = GreatCircleArc::from_directions(
        Vec3::new(1.0, -1.0, 1.0),
        Vec3::new(1.0, 1.0, 1.0),
        2.0,
    )
    .unwrap();
    assert!((arc.start().norm() - 2.0).abs() < 1e-12);
    assert!((arc.end().norm() - 2.0).abs() < 1e-12);
    // Cube edge seen from the center: acos(1/3).
    assert!((arc.angle() - (1.0_f64 / 3.0).acos().to_degrees()).abs() < 1e-9);
}
