use crate::bspline::{bspline_control_frame, BSpline, FitMethod};
use crate::errors::AlgebraError;
use crate::geometry::Point3;

/// Euler 螺线（羊角螺线），曲率随弧长线性增长，曲线始于原点、初始切向沿 X 轴。
/// 位置用弧长的幂级数展开求值，对常用参数范围（t 小于约 2 倍曲率参数）足够精确。
#[derive(Debug, Clone, Copy)]
pub struct EulerSpiral {
    curvature: f64,
}

impl EulerSpiral {
    pub fn new(curvature: f64) -> Self {
        Self { curvature }
    }

    #[inline]
    pub fn curvature(&self) -> f64 {
        self.curvature
    }

    /// 弧长 `t` 处的曲率半径。
    pub fn radius(&self, t: f64) -> f64 {
        if t > 0.0 {
            self.curvature * self.curvature / t
        } else {
            0.0
        }
    }

    /// 弧长 `t` 处的切向角（弧度）。
    pub fn tangent_angle(&self, t: f64) -> f64 {
        t * t / (2.0 * self.curvature * self.curvature)
    }

    /// 弧长 `t` 处的曲线点（幂级数展开，前四项）。
    pub fn point(&self, t: f64) -> Point3 {
        let k2 = self.curvature * self.curvature;
        let k4 = k2 * k2;
        let term = |length_power: i32, curvature_factor: f64, constant: f64| {
            t.powi(length_power) / (constant * curvature_factor)
        };
        let x = t - term(5, k4, 40.0) + term(9, k4 * k4, 3456.0)
            - term(13, k4 * k4 * k4, 599_040.0);
        let y = term(3, k2, 6.0) - term(7, k4 * k2, 336.0) + term(11, k4 * k4 * k2, 42_240.0)
            - term(15, k4 * k4 * k4 * k2, 9_676_800.0);
        Point3::new(x, y, 0.0)
    }

    /// 等弧长采样：返回 `segments + 1` 个点，首点恒为原点。
    pub fn approximate(&self, length: f64, segments: usize) -> Vec<Point3> {
        let segments = segments.max(1);
        let delta = length / segments as f64;
        let mut points = Vec::with_capacity(segments + 1);
        points.push(Point3::new(0.0, 0.0, 0.0));
        for index in 1..=segments {
            points.push(self.point(delta * index as f64));
        }
        points
    }

    /// 以均匀参数化插值拟合点，得到螺线的 B-spline 控制框架。
    /// 节点值按曲率参数缩放，与原始拟合弧长保持一致。
    pub fn bspline(
        &self,
        length: f64,
        fit_points: usize,
        degree: usize,
    ) -> Result<BSpline, AlgebraError> {
        let samples = self.approximate(length, fit_points);
        let frame = bspline_control_frame(&samples, degree, FitMethod::Uniform)?;
        let scaled_knots: Vec<f64> = frame
            .knot_values()
            .iter()
            .map(|knot| knot * self.curvature)
            .collect();
        BSpline::with_knots(&frame.control_points(), frame.order(), scaled_knots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_origin_with_zero_tangent_angle() {
        let spiral = EulerSpiral::new(1.0);
        let points = spiral.approximate(1.0, 10);
        assert_eq!(points.len(), 11);
        assert_eq!(points[0], Point3::new(0.0, 0.0, 0.0));
        assert!(spiral.tangent_angle(0.0).abs() < 1e-12);
    }

    #[test]
    fn point_series_matches_leading_terms() {
        let spiral = EulerSpiral::new(1.0);
        let point = spiral.point(0.1);
        // 小参数时 x ~ t, y ~ t^3 / 6
        assert!((point.x() - 0.1).abs() < 1e-6);
        assert!((point.y() - 0.1_f64.powi(3) / 6.0).abs() < 1e-9);
    }

    #[test]
    fn radius_decreases_along_the_curve() {
        let spiral = EulerSpiral::new(2.0);
        assert_eq!(spiral.radius(0.0), 0.0);
        assert!(spiral.radius(1.0) > spiral.radius(2.0));
        assert!((spiral.radius(2.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn bspline_frame_keeps_degree_and_scales_knots() {
        let spiral = EulerSpiral::new(2.0);
        let spline = spiral.bspline(1.5, 10, 3).expect("control frame");
        assert_eq!(spline.degree(), 3);
        let knots = spline.knot_values();
        assert_eq!(knots.len(), spline.count() + spline.order());
        // 节点按曲率缩放：插值节点域 [0, 1] 变为 [0, curvature]
        assert!((knots[knots.len() - 1] - 2.0).abs() < 1e-12);
    }
}
