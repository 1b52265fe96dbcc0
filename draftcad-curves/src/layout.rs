use draftcad_core::geometry::{Point2, Point3};

/// 曲线生成结果的公共实体属性，对应 DXF 基础属性的子集。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurveAttribs {
    pub layer: Option<String>,
    pub color: Option<i16>,
}

impl CurveAttribs {
    pub fn on_layer(layer: impl Into<String>) -> Self {
        Self {
            layer: Some(layer.into()),
            color: None,
        }
    }
}

/// 成品点序列的渲染接收端。曲线构建器只负责采样与委派，
/// 折线/样条实体的落库由实现方（布局层）完成。
pub trait Layout {
    fn add_polyline2d(&mut self, points: Vec<Point2>, attribs: &CurveAttribs);

    fn add_polyline3d(&mut self, points: Vec<Point3>, attribs: &CurveAttribs);

    fn add_open_spline(
        &mut self,
        control_points: Vec<Point3>,
        degree: usize,
        knots: Vec<f64>,
        attribs: &CurveAttribs,
    );
}

/// 2D/3D 选择规则：只要有采样点 Z 分量非零（或显式要求）就走 3D 折线，
/// 否则投影到 XY 平面走 2D 折线。
pub(crate) fn add_polyline_auto<L: Layout + ?Sized>(
    layout: &mut L,
    points: Vec<Point3>,
    force3d: bool,
    attribs: &CurveAttribs,
) {
    if force3d || points.iter().any(|point| point.z() != 0.0) {
        layout.add_polyline3d(points, attribs);
    } else {
        layout.add_polyline2d(
            points.into_iter().map(Point3::project_xy).collect(),
            attribs,
        );
    }
}
