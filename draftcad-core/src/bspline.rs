use glam::DVec3;

use crate::errors::AlgebraError;
use crate::geometry::Point3;

/// B-spline 基函数与节点向量工具。控制点数为 `count`，阶数为 `order`
/// （阶数 = 次数 + 1），节点向量长度恒为 `count + order`。

#[inline]
pub fn required_knot_values(count: usize, order: usize) -> usize {
    count + order
}

/// 开放均匀（钳位）节点向量：首尾各重复 `order` 次，内部节点取连续整数。
pub fn knot_open_uniform(count: usize, order: usize) -> Vec<f64> {
    let total = required_knot_values(count, order);
    let mut knots = Vec::with_capacity(total);
    let mut value = 0.0;
    knots.push(value);
    for index in 2..=total {
        if index > order && index < count + 2 {
            value += 1.0;
        }
        knots.push(value);
    }
    knots
}

/// 均匀节点向量：0, 1, 2, ... 不做端点钳位。
pub fn knot_uniform(count: usize, order: usize) -> Vec<f64> {
    (0..required_knot_values(count, order))
        .map(|index| index as f64)
        .collect()
}

/// 基函数求值器，可选权重支持有理 B-spline。
#[derive(Debug, Clone)]
struct Basis {
    knots: Vec<f64>,
    order: usize,
    count: usize,
    weights: Option<Vec<f64>>,
}

impl Basis {
    fn new(
        knots: Vec<f64>,
        order: usize,
        count: usize,
        weights: Option<Vec<f64>>,
    ) -> Result<Self, AlgebraError> {
        if order < 2 {
            return Err(AlgebraError::InvalidOrder(order));
        }
        if count < order {
            return Err(AlgebraError::TooFewPoints {
                expected: order,
                actual: count,
            });
        }
        let expected = required_knot_values(count, order);
        if knots.len() != expected {
            return Err(AlgebraError::KnotCountMismatch {
                expected,
                actual: knots.len(),
            });
        }
        if let Some(weights) = &weights {
            if weights.len() != count {
                return Err(AlgebraError::WeightCountMismatch {
                    expected: count,
                    actual: weights.len(),
                });
            }
        }
        Ok(Self {
            knots,
            order,
            count,
            weights,
        })
    }

    #[inline]
    fn degree(&self) -> usize {
        self.order - 1
    }

    /// 参数定义域终点。钳位节点向量时等于最后一个节点值。
    #[inline]
    fn max_t(&self) -> f64 {
        self.knots[self.knots.len() - 1]
    }

    /// 定位参数所在的节点区间（区间首索引）。定义域之外的参数被钳到边界区间。
    fn find_span(&self, t: f64) -> usize {
        let degree = self.degree();
        if t >= self.knots[self.count] {
            return self.count - 1;
        }
        let mut span = degree;
        while span < self.count - 1 && self.knots[span + 1] <= t {
            span += 1;
        }
        span
    }

    /// 区间内 `order` 个非零基函数值（Cox-de Boor 递推）。
    fn span_basis(&self, span: usize, t: f64) -> Vec<f64> {
        let degree = self.degree();
        let mut values = vec![0.0; self.order];
        let mut left = vec![0.0; self.order];
        let mut right = vec![0.0; self.order];
        values[0] = 1.0;
        for j in 1..=degree {
            left[j] = t - self.knots[span + 1 - j];
            right[j] = self.knots[span + j] - t;
            let mut saved = 0.0;
            for r in 0..j {
                let temp = values[r] / (right[r + 1] + left[j - r]);
                values[r] = saved + right[r + 1] * temp;
                saved = left[j - r] * temp;
            }
            values[j] = saved;
        }
        values
    }

    /// 全长度基函数向量（长度 = 控制点数），有理情形按权重归一化。
    fn basis_vector(&self, t: f64) -> Vec<f64> {
        let span = self.find_span(t);
        let span_values = self.span_basis(span, t);
        let first = span - self.degree();
        let mut vector = vec![0.0; self.count];
        vector[first..=span].copy_from_slice(&span_values);
        if let Some(weights) = &self.weights {
            let denominator: f64 = vector
                .iter()
                .zip(weights)
                .map(|(basis, weight)| basis * weight)
                .sum();
            if denominator != 0.0 {
                for (basis, weight) in vector.iter_mut().zip(weights) {
                    *basis = *basis * weight / denominator;
                }
            }
        }
        vector
    }

    fn point(&self, t: f64, control_points: &[DVec3]) -> DVec3 {
        let span = self.find_span(t);
        let span_values = self.span_basis(span, t);
        let first = span - self.degree();
        match &self.weights {
            None => span_values
                .iter()
                .enumerate()
                .map(|(j, basis)| control_points[first + j] * *basis)
                .sum(),
            Some(weights) => {
                let mut numerator = DVec3::ZERO;
                let mut denominator = 0.0;
                for (j, basis) in span_values.iter().enumerate() {
                    let factor = basis * weights[first + j];
                    numerator += control_points[first + j] * factor;
                    denominator += factor;
                }
                if denominator != 0.0 {
                    numerator / denominator
                } else {
                    numerator
                }
            }
        }
    }
}

/// 开放均匀 B-spline，定义点即控制点，曲线钳位到首尾控制点。
#[derive(Debug, Clone)]
pub struct BSpline {
    control_points: Vec<DVec3>,
    basis: Basis,
}

impl BSpline {
    pub fn new(control_points: &[Point3], order: usize) -> Result<Self, AlgebraError> {
        let knots = knot_open_uniform(control_points.len(), order);
        Self::with_knots(control_points, order, knots)
    }

    pub fn with_knots(
        control_points: &[Point3],
        order: usize,
        knots: Vec<f64>,
    ) -> Result<Self, AlgebraError> {
        let points: Vec<DVec3> = control_points.iter().copied().map(Point3::as_vec3).collect();
        let basis = Basis::new(knots, order, points.len(), None)?;
        Ok(Self {
            control_points: points,
            basis,
        })
    }

    pub fn rational(
        control_points: &[Point3],
        order: usize,
        weights: Vec<f64>,
    ) -> Result<Self, AlgebraError> {
        let points: Vec<DVec3> = control_points.iter().copied().map(Point3::as_vec3).collect();
        let knots = knot_open_uniform(points.len(), order);
        let basis = Basis::new(knots, order, points.len(), Some(weights))?;
        Ok(Self {
            control_points: points,
            basis,
        })
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.control_points.len()
    }

    #[inline]
    pub fn order(&self) -> usize {
        self.basis.order
    }

    #[inline]
    pub fn degree(&self) -> usize {
        self.basis.degree()
    }

    #[inline]
    pub fn knot_values(&self) -> &[f64] {
        &self.basis.knots
    }

    pub fn control_points(&self) -> Vec<Point3> {
        self.control_points
            .iter()
            .copied()
            .map(Point3::from_vec)
            .collect()
    }

    #[inline]
    pub fn max_t(&self) -> f64 {
        self.basis.max_t()
    }

    pub fn point(&self, t: f64) -> Point3 {
        Point3::from_vec(self.basis.point(t, &self.control_points))
    }

    /// 折线逼近：参数域等分采样，返回 `segments + 1` 个点。
    pub fn approximate(&self, segments: usize) -> Vec<Point3> {
        let segments = segments.max(1);
        let max_t = self.max_t();
        (0..=segments)
            .map(|index| self.point(max_t * index as f64 / segments as f64))
            .collect()
    }
}

/// 均匀 B-spline：节点不钳位，曲线不经过首尾控制点，
/// 有效参数域为 `[order - 1, count]`。
#[derive(Debug, Clone)]
pub struct BSplineU {
    inner: BSpline,
}

impl BSplineU {
    pub fn new(control_points: &[Point3], order: usize) -> Result<Self, AlgebraError> {
        let knots = knot_uniform(control_points.len(), order);
        Ok(Self {
            inner: BSpline::with_knots(control_points, order, knots)?,
        })
    }

    pub fn rational(
        control_points: &[Point3],
        order: usize,
        weights: Vec<f64>,
    ) -> Result<Self, AlgebraError> {
        let points: Vec<DVec3> = control_points.iter().copied().map(Point3::as_vec3).collect();
        let knots = knot_uniform(points.len(), order);
        let basis = Basis::new(knots, order, points.len(), Some(weights))?;
        Ok(Self {
            inner: BSpline {
                control_points: points,
                basis,
            },
        })
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.inner.count()
    }

    #[inline]
    pub fn degree(&self) -> usize {
        self.inner.degree()
    }

    pub fn point(&self, t: f64) -> Point3 {
        self.inner.point(t)
    }

    pub fn approximate(&self, segments: usize) -> Vec<Point3> {
        let segments = segments.max(1);
        let base = (self.inner.order() - 1) as f64;
        let span = (self.count() - self.inner.order() + 1) as f64;
        (0..=segments)
            .map(|index| self.point(base + span * index as f64 / segments as f64))
            .collect()
    }
}

/// 闭合均匀 B-spline：控制点回绕 `order - 1` 个，首尾连续。
#[derive(Debug, Clone)]
pub struct BSplineClosed {
    inner: BSplineU,
}

impl BSplineClosed {
    pub fn new(control_points: &[Point3], order: usize) -> Result<Self, AlgebraError> {
        let wrapped = Self::wrap_points(control_points, order);
        Ok(Self {
            inner: BSplineU::new(&wrapped, order)?,
        })
    }

    pub fn rational(
        control_points: &[Point3],
        order: usize,
        weights: Vec<f64>,
    ) -> Result<Self, AlgebraError> {
        if weights.len() != control_points.len() {
            return Err(AlgebraError::WeightCountMismatch {
                expected: control_points.len(),
                actual: weights.len(),
            });
        }
        let wrapped = Self::wrap_points(control_points, order);
        let mut wrapped_weights = weights.clone();
        wrapped_weights.extend_from_slice(&weights[..(order - 1).min(weights.len())]);
        Ok(Self {
            inner: BSplineU::rational(&wrapped, order, wrapped_weights)?,
        })
    }

    fn wrap_points(control_points: &[Point3], order: usize) -> Vec<Point3> {
        let mut wrapped = control_points.to_vec();
        let wrap = (order - 1).min(control_points.len());
        wrapped.extend_from_slice(&control_points[..wrap]);
        wrapped
    }

    pub fn point(&self, t: f64) -> Point3 {
        self.inner.point(t)
    }

    pub fn approximate(&self, segments: usize) -> Vec<Point3> {
        self.inner.approximate(segments)
    }
}

/// 拟合参数化方法。弦长法为默认，向心法附带幂指数（常用 0.5）。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FitMethod {
    Uniform,
    Distance,
    Centripetal(f64),
}

impl Default for FitMethod {
    fn default() -> Self {
        FitMethod::Distance
    }
}

/// 全局曲线插值：求过全部拟合点的 B-spline 控制框架。
/// 参数向量按 `method` 计算，节点向量取滑动平均（knot averaging）。
pub fn bspline_control_frame(
    fit_points: &[Point3],
    degree: usize,
    method: FitMethod,
) -> Result<BSpline, AlgebraError> {
    let order = degree + 1;
    if degree < 1 {
        return Err(AlgebraError::InvalidOrder(order));
    }
    if fit_points.len() < order {
        return Err(AlgebraError::TooFewPoints {
            expected: order,
            actual: fit_points.len(),
        });
    }
    let t_vector = fit_parameters(fit_points, method);
    let knots = control_frame_knots(fit_points.len(), degree, &t_vector);
    let basis = Basis::new(knots.clone(), order, fit_points.len(), None)?;

    let mut matrix: Vec<Vec<f64>> = t_vector
        .iter()
        .map(|t| basis.basis_vector(*t))
        .collect();
    let mut rhs: Vec<DVec3> = fit_points.iter().copied().map(Point3::as_vec3).collect();
    solve_linear_system(&mut matrix, &mut rhs)?;

    let control_points: Vec<Point3> = rhs.into_iter().map(Point3::from_vec).collect();
    BSpline::with_knots(&control_points, order, knots)
}

/// 拟合点参数向量，归一化到 `[0, 1]`。
fn fit_parameters(fit_points: &[Point3], method: FitMethod) -> Vec<f64> {
    let count = fit_points.len();
    match method {
        FitMethod::Uniform => (0..count)
            .map(|index| index as f64 / (count - 1) as f64)
            .collect(),
        FitMethod::Distance => chord_parameters(fit_points, 1.0),
        FitMethod::Centripetal(power) => chord_parameters(fit_points, power),
    }
}

fn chord_parameters(fit_points: &[Point3], power: f64) -> Vec<f64> {
    let distances: Vec<f64> = fit_points
        .windows(2)
        .map(|pair| (pair[1].as_vec3() - pair[0].as_vec3()).length().powf(power))
        .collect();
    let total: f64 = distances.iter().sum();
    if total <= 0.0 {
        // 全部拟合点重合时退化为均匀参数
        return fit_parameters(fit_points, FitMethod::Uniform);
    }
    let mut parameters = Vec::with_capacity(fit_points.len());
    let mut accumulated = 0.0;
    parameters.push(0.0);
    for distance in distances {
        accumulated += distance;
        parameters.push(accumulated / total);
    }
    parameters
}

/// 插值节点向量：首尾各钳位 `degree + 1` 次，内部节点取相邻参数均值。
fn control_frame_knots(count: usize, degree: usize, t_vector: &[f64]) -> Vec<f64> {
    let order = degree + 1;
    let mut knots = vec![0.0; order];
    for j in 1..count - degree {
        let average: f64 = t_vector[j..j + degree].iter().sum::<f64>() / degree as f64;
        knots.push(average);
    }
    knots.extend(std::iter::repeat(1.0).take(order));
    knots
}

/// 列主元高斯消元，右端项是三维点列。矩阵在原地被破坏。
fn solve_linear_system(
    matrix: &mut [Vec<f64>],
    rhs: &mut [DVec3],
) -> Result<(), AlgebraError> {
    let size = matrix.len();
    for column in 0..size {
        let pivot_row = (column..size)
            .max_by(|a, b| {
                matrix[*a][column]
                    .abs()
                    .total_cmp(&matrix[*b][column].abs())
            })
            .unwrap_or(column);
        if matrix[pivot_row][column].abs() < 1e-12 {
            return Err(AlgebraError::SingularMatrix);
        }
        matrix.swap(column, pivot_row);
        rhs.swap(column, pivot_row);
        for row in column + 1..size {
            let factor = matrix[row][column] / matrix[column][column];
            if factor == 0.0 {
                continue;
            }
            for index in column..size {
                matrix[row][index] -= factor * matrix[column][index];
            }
            let delta = rhs[column] * factor;
            rhs[row] -= delta;
        }
    }
    for column in (0..size).rev() {
        let mut value = rhs[column];
        for index in column + 1..size {
            value -= rhs[index] * matrix[column][index];
        }
        rhs[column] = value / matrix[column][column];
    }
    Ok(())
}
