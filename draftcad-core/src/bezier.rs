use glam::DVec3;

use crate::geometry::Point3;

/// 四控制点三次 Bezier 曲线。控制点依次为起点、起点控制点、终点控制点、终点。
#[derive(Debug, Clone)]
pub struct Bezier4P {
    control_points: [DVec3; 4],
}

impl Bezier4P {
    pub fn new(control_points: [Point3; 4]) -> Self {
        Self {
            control_points: control_points.map(Point3::as_vec3),
        }
    }

    #[inline]
    pub fn control_points(&self) -> [Point3; 4] {
        self.control_points.map(Point3::from_vec)
    }

    /// 按 Bernstein 多项式求参数 `t`（0..=1）处的曲线点。
    pub fn point(&self, t: f64) -> Point3 {
        debug_assert!((0.0..=1.0).contains(&t));
        let u = 1.0 - t;
        let [p0, p1, p2, p3] = self.control_points;
        let vec = p0 * (u * u * u)
            + p1 * (3.0 * u * u * t)
            + p2 * (3.0 * u * t * t)
            + p3 * (t * t * t);
        Point3::from_vec(vec)
    }

    /// 折线逼近：返回 `segments + 1` 个采样点，首尾直接取控制点以避免浮点误差。
    pub fn approximate(&self, segments: usize) -> Vec<Point3> {
        let segments = segments.max(1);
        let delta = 1.0 / segments as f64;
        let mut points = Vec::with_capacity(segments + 1);
        points.push(Point3::from_vec(self.control_points[0]));
        for segment in 1..segments {
            points.push(self.point(delta * segment as f64));
        }
        points.push(Point3::from_vec(self.control_points[3]));
        points
    }
}
