use glam::DMat4;

use draftcad_core::geometry::Point3;
use draftcad_core::spiral;

use crate::errors::CurveError;
use crate::layout::{CurveAttribs, Layout};

/// Euler 螺线构建器。曲线始终从原点出发，按给定曲率参数生长；
/// 需要摆放到图面其它位置时传入变换矩阵。
#[derive(Debug, Clone, Copy)]
pub struct EulerSpiral {
    spiral: spiral::EulerSpiral,
}

impl EulerSpiral {
    pub fn new(curvature: f64) -> Self {
        Self {
            spiral: spiral::EulerSpiral::new(curvature),
        }
    }

    /// 沿弧长等距采样并渲染为 3D 折线，顶点数为 `segments + 1`。
    pub fn render_polyline<L: Layout + ?Sized>(
        &self,
        layout: &mut L,
        length: f64,
        segments: usize,
        transform: Option<&DMat4>,
        attribs: &CurveAttribs,
    ) {
        let points = apply_transform(self.spiral.approximate(length, segments), transform);
        layout.add_polyline3d(points, attribs);
    }

    /// 以拟合点插值出 B-spline 控制框架，经 `add_open_spline` 交给布局层，
    /// 由其落成样条实体。
    pub fn render_spline<L: Layout + ?Sized>(
        &self,
        layout: &mut L,
        length: f64,
        fit_points: usize,
        degree: usize,
        transform: Option<&DMat4>,
        attribs: &CurveAttribs,
    ) -> Result<(), CurveError> {
        let spline = self.spiral.bspline(length, fit_points, degree)?;
        let control_points = apply_transform(spline.control_points(), transform);
        layout.add_open_spline(
            control_points,
            spline.degree(),
            spline.knot_values().to_vec(),
            attribs,
        );
        Ok(())
    }
}

fn apply_transform(points: Vec<Point3>, transform: Option<&DMat4>) -> Vec<Point3> {
    match transform {
        None => points,
        Some(matrix) => points
            .into_iter()
            .map(|point| Point3::from_vec(matrix.transform_point3(point.as_vec3())))
            .collect(),
    }
}
