//! One-dimensional laws: scalar functions of a normalized parameter.
//!
//! Radius laws of a fillet map the normalized arc length of a contour (or of
//! one of its edges) in `[0, 1]` to a radius.

use std::fmt;
use std::sync::Arc;

use crate::math::TOLERANCE;

/// A scalar function of a normalized parameter `t` in `[0, 1]`.
pub trait LawFunction: fmt::Debug + Send + Sync {
    /// Evaluates the law at `t`.
    fn value(&self, t: f64) -> f64;

    /// Returns the value if the law is known to be constant.
    fn constant_value(&self) -> Option<f64> {
        None
    }
}

/// A constant law.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantLaw(pub f64);

impl LawFunction for ConstantLaw {
    fn value(&self, _t: f64) -> f64 {
        self.0
    }

    fn constant_value(&self) -> Option<f64> {
        Some(self.0)
    }
}

/// A piecewise-linear law through `(t, value)` samples.
///
/// Outside the sampled range the law is extended by the nearest end value.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolatedLaw {
    points: Vec<(f64, f64)>,
}

impl InterpolatedLaw {
    /// Creates the law, sorting samples by parameter.
    ///
    /// Returns `None` when `points` is empty.
    #[must_use]
    pub fn new(mut points: Vec<(f64, f64)>) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        Some(Self { points })
    }

    /// The straight law from `first` at 0 to `last` at 1.
    #[must_use]
    pub fn linear(first: f64, last: f64) -> Self {
        Self {
            points: vec![(0.0, first), (1.0, last)],
        }
    }

    /// Returns the samples sorted by parameter.
    #[must_use]
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }
}

impl LawFunction for InterpolatedLaw {
    fn value(&self, t: f64) -> f64 {
        interpolate(&self.points, t)
    }

    fn constant_value(&self) -> Option<f64> {
        let first = self.points[0].1;
        self.points
            .iter()
            .all(|(_, r)| (r - first).abs() < TOLERANCE)
            .then_some(first)
    }
}

/// Evaluates a sorted piecewise-linear sample set at `t`, clamping at the ends.
///
/// `points` must not be empty.
#[must_use]
pub fn interpolate(points: &[(f64, f64)], t: f64) -> f64 {
    let (first, last) = (points[0], points[points.len() - 1]);
    if t <= first.0 {
        return first.1;
    }
    if t >= last.0 {
        return last.1;
    }
    let idx = points.partition_point(|(pt, _)| *pt <= t);
    let (t0, r0) = points[idx - 1];
    let (t1, r1) = points[idx];
    if t1 - t0 < TOLERANCE {
        return r1;
    }
    r0 + (r1 - r0) * (t - t0) / (t1 - t0)
}

/// A law defined by a closure.
pub struct FnLaw<F> {
    name: &'static str,
    f: F,
}

impl<F: Fn(f64) -> f64 + Send + Sync> FnLaw<F> {
    /// Wraps `f` as a law; `name` is used for debug output.
    pub fn new(name: &'static str, f: F) -> Self {
        Self { name, f }
    }
}

impl<F> fmt::Debug for FnLaw<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnLaw").field("name", &self.name).finish()
    }
}

impl<F: Fn(f64) -> f64 + Send + Sync> LawFunction for FnLaw<F> {
    fn value(&self, t: f64) -> f64 {
        (self.f)(t)
    }
}

/// Another law seen through an affine change of parameter.
///
/// `value(t) = inner.value(from + t * (to - from))`, with the inner
/// parameter clamped to `[0, 1]`. `from > to` reverses the law.
#[derive(Debug, Clone)]
pub struct ReparameterizedLaw {
    inner: Arc<dyn LawFunction>,
    from: f64,
    to: f64,
}

impl ReparameterizedLaw {
    /// Creates the reparameterized view of `inner`.
    #[must_use]
    pub fn new(inner: Arc<dyn LawFunction>, from: f64, to: f64) -> Self {
        Self { inner, from, to }
    }
}

impl LawFunction for ReparameterizedLaw {
    fn value(&self, t: f64) -> f64 {
        let s = (self.from + t * (self.to - self.from)).clamp(0.0, 1.0);
        self.inner.value(s)
    }

    fn constant_value(&self) -> Option<f64> {
        self.inner.constant_value()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn two_point_law_reports_constant_only_when_flat() {
        assert_eq!(InterpolatedLaw::linear(2.0, 2.0).constant_value(), Some(2.0));
        assert_eq!(InterpolatedLaw::linear(2.0, 3.0).constant_value(), None);
        assert_abs_diff_eq!(InterpolatedLaw::linear(2.0, 3.0).value(0.25), 2.25);
        assert_abs_diff_eq!(ConstantLaw(4.0).value(0.7), 4.0);
    }

    #[test]
    fn interpolated_law_sorts_and_clamps() {
        let law = InterpolatedLaw::new(vec![(1.0, 3.0), (0.0, 1.0), (0.5, 2.0)]).unwrap();
        assert_abs_diff_eq!(law.value(0.25), 1.5);
        assert_abs_diff_eq!(law.value(0.75), 2.5);
        assert_abs_diff_eq!(law.value(-1.0), 1.0);
        assert_abs_diff_eq!(law.value(2.0), 3.0);
    }

    #[test]
    fn interpolated_law_needs_samples() {
        assert!(InterpolatedLaw::new(Vec::new()).is_none());
    }

    #[test]
    fn closure_law_evaluates() {
        let law = FnLaw::new("parabola", |t| 1.0 + t * t);
        assert_abs_diff_eq!(law.value(0.5), 1.25);
        assert!(law.constant_value().is_none());
        assert!(format!("{law:?}").contains("parabola"));
    }

    #[test]
    fn reparameterized_law_can_reverse() {
        let inner: Arc<dyn LawFunction> = Arc::new(InterpolatedLaw::linear(1.0, 5.0));
        let half = ReparameterizedLaw::new(inner.clone(), 0.5, 1.0);
        assert_abs_diff_eq!(half.value(0.0), 3.0);
        assert_abs_diff_eq!(half.value(1.0), 5.0);
        let reversed = ReparameterizedLaw::new(inner, 1.0, 0.0);
        assert_abs_diff_eq!(reversed.value(0.25), 4.0);
    }
}
