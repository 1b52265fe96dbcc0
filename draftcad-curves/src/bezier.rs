use glam::DVec3;

use draftcad_core::bezier::Bezier4P;
use draftcad_core::geometry::{Point3, Vector3};

use crate::errors::CurveError;
use crate::layout::{add_polyline_auto, CurveAttribs, Layout};

const DEFAULT_SEGMENTS: usize = 20;

/// 单个定义点：控制点加两条控制切向量。`tangent_in` 作用于到达本点的
/// 曲线段，`tangent_out` 作用于离开本点的曲线段；`segments` 是从上一个
/// 定义点到本点的折线段数。
#[derive(Debug, Clone, Copy)]
struct DefinitionPoint {
    point: DVec3,
    tangent_in: Option<DVec3>,
    tangent_out: Option<DVec3>,
    segments: usize,
}

/// 多段三次 Bezier 曲线构建器。每相邻两个定义点构成一段四控制点
/// Bezier：起点、起点加出向切向量、终点加入向切向量、终点。
#[derive(Debug, Clone, Default)]
pub struct Bezier {
    points: Vec<DefinitionPoint>,
}

impl Bezier {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置起点与起始切向量。切向量以向量形式给出，
    /// 例如 (5, 0, 0) 表示长度为 5 个图形单位的水平切线。
    pub fn start(&mut self, point: Point3, tangent: Vector3) {
        self.points.push(DefinitionPoint {
            point: point.as_vec3(),
            tangent_in: None,
            tangent_out: Some(tangent.as_vec3()),
            segments: DEFAULT_SEGMENTS,
        });
    }

    /// 追加定义点。`tangent_in` 指向曲线来向一侧；`tangent_out` 省略时
    /// 取 `tangent_in` 的反向，得到光滑连接。
    pub fn append(
        &mut self,
        point: Point3,
        tangent_in: Vector3,
        tangent_out: Option<Vector3>,
        segments: usize,
    ) {
        let tangent_out = tangent_out.unwrap_or_else(|| tangent_in.reversed());
        self.points.push(DefinitionPoint {
            point: point.as_vec3(),
            tangent_in: Some(tangent_in.as_vec3()),
            tangent_out: Some(tangent_out.as_vec3()),
            segments,
        });
    }

    #[inline]
    pub fn definition_point_count(&self) -> usize {
        self.points.len()
    }

    /// 渲染为折线：逐段逼近后拼接采样点，交给布局层落库。
    /// 平面曲线默认走 2D 折线，`force3d` 可强制 3D。
    pub fn render<L: Layout + ?Sized>(
        &self,
        layout: &mut L,
        force3d: bool,
        attribs: &CurveAttribs,
    ) -> Result<(), CurveError> {
        if self.points.len() < 2 {
            return Err(CurveError::NotEnoughPoints(self.points.len()));
        }
        let mut samples = Vec::new();
        for pair in self.points.windows(2) {
            let from = pair[0];
            let to = pair[1];
            let start_tangent = from.tangent_out.unwrap_or(DVec3::ZERO);
            let end_tangent = to.tangent_in.unwrap_or(DVec3::ZERO);
            let segment = Bezier4P::new([
                Point3::from_vec(from.point),
                Point3::from_vec(from.point + start_tangent),
                Point3::from_vec(to.point + end_tangent),
                Point3::from_vec(to.point),
            ]);
            samples.extend(segment.approximate(to.segments));
        }
        add_polyline_auto(layout, samples, force3d, attribs);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_defaults_to_reversed_tangent() {
        let mut curve = Bezier::new();
        curve.start(Point3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
        curve.append(
            Point3::new(5.0, 0.0, 0.0),
            Vector3::new(-1.0, 1.0, 0.0),
            None,
            10,
        );
        assert_eq!(curve.definition_point_count(), 2);
        let last = curve.points[1];
        assert_eq!(last.tangent_out, Some(DVec3::new(1.0, -1.0, 0.0)));
    }
}
