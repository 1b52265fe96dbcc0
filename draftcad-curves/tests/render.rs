use glam::DMat4;

use draftcad_core::bspline::FitMethod;
use draftcad_core::geometry::{Point2, Point3, Vector3};
use draftcad_curves::errors::CurveError;
use draftcad_curves::{Bezier, CurveAttribs, EulerSpiral, Layout, Spline};

/// 录制布局替身：记录每次落库调用，供断言分发与顶点数。
#[derive(Debug, Default)]
struct RecordingLayout {
    polylines2d: Vec<(Vec<Point2>, CurveAttribs)>,
    polylines3d: Vec<(Vec<Point3>, CurveAttribs)>,
    open_splines: Vec<(Vec<Point3>, usize, Vec<f64>)>,
}

impl Layout for RecordingLayout {
    fn add_polyline2d(&mut self, points: Vec<Point2>, attribs: &CurveAttribs) {
        self.polylines2d.push((points, attribs.clone()));
    }

    fn add_polyline3d(&mut self, points: Vec<Point3>, attribs: &CurveAttribs) {
        self.polylines3d.push((points, attribs.clone()));
    }

    fn add_open_spline(
        &mut self,
        control_points: Vec<Point3>,
        degree: usize,
        knots: Vec<f64>,
        _attribs: &CurveAttribs,
    ) {
        self.open_splines.push((control_points, degree, knots));
    }
}

fn planar_bezier() -> Bezier {
    let mut curve = Bezier::new();
    curve.start(Point3::new(2.0, 4.0, 0.0), Vector3::new(3.0, 0.0, 0.0));
    curve.append(
        Point3::new(6.0, 7.0, 0.0),
        Vector3::new(-2.0, 0.0, 0.0),
        None,
        10,
    );
    curve.append(
        Point3::new(12.0, 5.0, 0.0),
        Vector3::new(-2.0, 1.0, 0.0),
        None,
        10,
    );
    curve
}

#[test]
fn planar_bezier_renders_as_2d_polyline() {
    let mut layout = RecordingLayout::default();
    let attribs = CurveAttribs::on_layer("SKETCH");
    planar_bezier()
        .render(&mut layout, false, &attribs)
        .expect("render");

    assert!(layout.polylines3d.is_empty());
    let (points, stored_attribs) = &layout.polylines2d[0];
    // 每段 segments + 1 个采样点，段与段的衔接点按原样重复
    assert_eq!(points.len(), 22);
    assert_eq!(points[0], Point2::new(2.0, 4.0));
    assert_eq!(points[10], Point2::new(6.0, 7.0));
    assert_eq!(points[21], Point2::new(12.0, 5.0));
    assert_eq!(stored_attribs.layer.as_deref(), Some("SKETCH"));
}

#[test]
fn force3d_promotes_planar_bezier() {
    let mut layout = RecordingLayout::default();
    planar_bezier()
        .render(&mut layout, true, &CurveAttribs::default())
        .expect("render");
    assert!(layout.polylines2d.is_empty());
    assert_eq!(layout.polylines3d.len(), 1);
}

#[test]
fn nonzero_z_sample_selects_3d_polyline() {
    let mut layout = RecordingLayout::default();
    let mut curve = Bezier::new();
    curve.start(Point3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
    curve.append(
        Point3::new(4.0, 0.0, 2.0),
        Vector3::new(-1.0, 0.0, 0.0),
        None,
        8,
    );
    curve
        .render(&mut layout, false, &CurveAttribs::default())
        .expect("render");
    assert!(layout.polylines2d.is_empty());
    assert_eq!(layout.polylines3d[0].0.len(), 9);
}

#[test]
fn bezier_with_single_point_is_rejected() {
    let mut layout = RecordingLayout::default();
    let mut curve = Bezier::new();
    curve.start(Point3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
    let err = curve
        .render(&mut layout, false, &CurveAttribs::default())
        .unwrap_err();
    assert!(matches!(err, CurveError::NotEnoughPoints(1)));
    assert!(layout.polylines2d.is_empty() && layout.polylines3d.is_empty());
}

fn fit_points() -> Vec<Point3> {
    vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(2.0, 3.0, 0.0),
        Point3::new(5.0, 1.0, 0.0),
        Point3::new(8.0, 4.0, 0.0),
        Point3::new(10.0, 0.0, 0.0),
    ]
}

#[test]
fn fit_point_spline_passes_through_endpoints_in_2d() {
    let mut layout = RecordingLayout::default();
    let mut spline = Spline::with_points(fit_points());
    spline.set_segments(40);
    spline
        .render_as_fit_points(&mut layout, 3, FitMethod::Distance, &CurveAttribs::default())
        .expect("render");

    let (points, _) = &layout.polylines2d[0];
    assert_eq!(points.len(), 41);
    assert!((points[0].x()).abs() < 1e-9);
    assert!((points[40].x() - 10.0).abs() < 1e-9);
    assert!((points[40].y()).abs() < 1e-9);
}

#[test]
fn control_point_renderings_always_use_3d_polylines() {
    let mut layout = RecordingLayout::default();
    let mut spline = Spline::with_points(fit_points());
    spline.set_segments(10);
    spline
        .render_open_bspline(&mut layout, 3, &CurveAttribs::default())
        .expect("open");
    spline
        .render_uniform_bspline(&mut layout, 3, &CurveAttribs::default())
        .expect("uniform");
    spline
        .render_closed_bspline(&mut layout, 3, &CurveAttribs::default())
        .expect("closed");

    assert!(layout.polylines2d.is_empty());
    assert_eq!(layout.polylines3d.len(), 3);
    for (points, _) in &layout.polylines3d {
        assert_eq!(points.len(), 11);
    }
}

#[test]
fn rational_rendering_rejects_mismatched_weights() {
    let mut layout = RecordingLayout::default();
    let spline = Spline::with_points(fit_points());
    let err = spline
        .render_open_rbspline(&mut layout, vec![1.0, 2.0], 3, &CurveAttribs::default())
        .unwrap_err();
    assert!(matches!(err, CurveError::Algebra(_)));
    assert!(layout.polylines3d.is_empty());
}

#[test]
fn rational_weights_pull_the_curve_toward_heavy_control_points() {
    let mut unweighted = RecordingLayout::default();
    let mut weighted = RecordingLayout::default();
    let mut spline = Spline::with_points(fit_points());
    spline.set_segments(20);
    spline
        .render_open_bspline(&mut unweighted, 3, &CurveAttribs::default())
        .expect("plain");
    spline
        .render_open_rbspline(
            &mut weighted,
            vec![1.0, 1.0, 10.0, 1.0, 1.0],
            3,
            &CurveAttribs::default(),
        )
        .expect("weighted");

    let plain_mid = unweighted.polylines3d[0].0[10];
    let heavy_mid = weighted.polylines3d[0].0[10];
    let heavy_point = fit_points()[2];
    let plain_distance = (plain_mid.as_vec3() - heavy_point.as_vec3()).length();
    let heavy_distance = (heavy_mid.as_vec3() - heavy_point.as_vec3()).length();
    assert!(heavy_distance < plain_distance);
}

#[test]
fn spiral_polyline_starts_at_origin() {
    let mut layout = RecordingLayout::default();
    let spiral = EulerSpiral::new(1.0);
    spiral.render_polyline(&mut layout, 1.5, 30, None, &CurveAttribs::default());

    let (points, _) = &layout.polylines3d[0];
    assert_eq!(points.len(), 31);
    assert_eq!(points[0], Point3::new(0.0, 0.0, 0.0));
}

#[test]
fn spiral_transform_relocates_the_samples() {
    let mut layout = RecordingLayout::default();
    let spiral = EulerSpiral::new(1.0);
    let transform = DMat4::from_translation(glam::DVec3::new(10.0, -2.0, 1.0));
    spiral.render_polyline(&mut layout, 1.0, 10, Some(&transform), &CurveAttribs::default());

    let (points, _) = &layout.polylines3d[0];
    assert_eq!(points[0], Point3::new(10.0, -2.0, 1.0));
}

#[test]
fn spiral_spline_hands_control_frame_to_the_sink() {
    let mut layout = RecordingLayout::default();
    let spiral = EulerSpiral::new(2.0);
    spiral
        .render_spline(&mut layout, 1.0, 10, 3, None, &CurveAttribs::default())
        .expect("render spline");

    let (control_points, degree, knots) = &layout.open_splines[0];
    assert_eq!(*degree, 3);
    // 拟合 11 个采样点 -> 11 个控制点，节点数 = 控制点数 + 阶数
    assert_eq!(control_points.len(), 11);
    assert_eq!(knots.len(), control_points.len() + degree + 1);
    assert!((knots[knots.len() - 1] - 2.0).abs() < 1e-12);
}
