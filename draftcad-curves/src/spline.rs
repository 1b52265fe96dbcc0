use tracing::debug;

use draftcad_core::bspline::{
    bspline_control_frame, BSpline, BSplineClosed, BSplineU, FitMethod,
};
use draftcad_core::geometry::Point3;

use crate::errors::CurveError;
use crate::layout::{add_polyline_auto, CurveAttribs, Layout};

const DEFAULT_SEGMENTS: usize = 100;

/// B-spline 曲线构建器。定义点既可作为拟合点（插值渲染），
/// 也可直接作为控制点（各 `render_*_bspline` 变体）。
#[derive(Debug, Clone)]
pub struct Spline {
    points: Vec<Point3>,
    segments: usize,
}

impl Spline {
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            segments: DEFAULT_SEGMENTS,
        }
    }

    pub fn with_points(points: Vec<Point3>) -> Self {
        Self {
            points,
            segments: DEFAULT_SEGMENTS,
        }
    }

    pub fn push(&mut self, point: Point3) {
        self.points.push(point);
    }

    #[inline]
    pub fn segments(&self) -> usize {
        self.segments
    }

    pub fn set_segments(&mut self, segments: usize) {
        self.segments = segments;
    }

    /// 按定义点数换算总段数：`sub_segments` 为相邻两定义点之间的段数。
    /// 配合均匀参数化可让折线顶点落在拟合点上。
    pub fn subdivide(&mut self, sub_segments: usize) {
        self.segments = self.points.len().saturating_sub(1) * sub_segments;
    }

    /// 把定义点视为拟合点渲染：全局插值出控制框架后折线逼近。
    /// 采样点全部位于 XY 平面时走 2D 折线。
    pub fn render_as_fit_points<L: Layout + ?Sized>(
        &self,
        layout: &mut L,
        degree: usize,
        method: FitMethod,
        attribs: &CurveAttribs,
    ) -> Result<(), CurveError> {
        let spline = bspline_control_frame(&self.points, degree, method)?;
        let samples = spline.approximate(self.segments);
        debug!(
            fit_points = self.points.len(),
            vertices = samples.len(),
            "拟合点样条已采样"
        );
        add_polyline_auto(layout, samples, false, attribs);
        Ok(())
    }

    /// 定义点作为控制点，渲染开放均匀 B-spline（3D 折线）。
    pub fn render_open_bspline<L: Layout + ?Sized>(
        &self,
        layout: &mut L,
        degree: usize,
        attribs: &CurveAttribs,
    ) -> Result<(), CurveError> {
        let spline = BSpline::new(&self.points, degree + 1)?;
        layout.add_polyline3d(spline.approximate(self.segments), attribs);
        Ok(())
    }

    /// 定义点作为控制点，渲染均匀（不钳位）B-spline。
    pub fn render_uniform_bspline<L: Layout + ?Sized>(
        &self,
        layout: &mut L,
        degree: usize,
        attribs: &CurveAttribs,
    ) -> Result<(), CurveError> {
        let spline = BSplineU::new(&self.points, degree + 1)?;
        layout.add_polyline3d(spline.approximate(self.segments), attribs);
        Ok(())
    }

    /// 定义点作为控制点，渲染闭合均匀 B-spline。
    pub fn render_closed_bspline<L: Layout + ?Sized>(
        &self,
        layout: &mut L,
        degree: usize,
        attribs: &CurveAttribs,
    ) -> Result<(), CurveError> {
        let spline = BSplineClosed::new(&self.points, degree + 1)?;
        layout.add_polyline3d(spline.approximate(self.segments), attribs);
        Ok(())
    }

    /// 有理开放 B-spline，每个控制点要求一个权重。
    pub fn render_open_rbspline<L: Layout + ?Sized>(
        &self,
        layout: &mut L,
        weights: Vec<f64>,
        degree: usize,
        attribs: &CurveAttribs,
    ) -> Result<(), CurveError> {
        let spline = BSpline::rational(&self.points, degree + 1, weights)?;
        layout.add_polyline3d(spline.approximate(self.segments), attribs);
        Ok(())
    }

    /// 有理均匀 B-spline。
    pub fn render_uniform_rbspline<L: Layout + ?Sized>(
        &self,
        layout: &mut L,
        weights: Vec<f64>,
        degree: usize,
        attribs: &CurveAttribs,
    ) -> Result<(), CurveError> {
        let spline = BSplineU::rational(&self.points, degree + 1, weights)?;
        layout.add_polyline3d(spline.approximate(self.segments), attribs);
        Ok(())
    }

    /// 有理闭合 B-spline。
    pub fn render_closed_rbspline<L: Layout + ?Sized>(
        &self,
        layout: &mut L,
        weights: Vec<f64>,
        degree: usize,
        attribs: &CurveAttribs,
    ) -> Result<(), CurveError> {
        let spline = BSplineClosed::rational(&self.points, degree + 1, weights)?;
        layout.add_polyline3d(spline.approximate(self.segments), attribs);
        Ok(())
    }
}

impl Default for Spline {
    fn default() -> Self {
        Self::new()
    }
}
