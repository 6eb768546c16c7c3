use nalgebra::DMatrix;
use thiserror::Error;

/// Errors that can occur when constructing a trajectory.
#[derive(Debug, Clone, Error)]
pub enum TrajectoryError {
    #[error("trajectory requires at least 2 breakpoints, got {0}")]
    TooFewBreakpoints(usize),
    #[error("breakpoint {index} ({value}) is earlier than the previous one ({previous})")]
    DecreasingBreakpoints { index: usize, value: f64, previous: f64 },
    #[error("expected one coefficient set per segment ({segments}), got {got}")]
    SegmentCountMismatch { segments: usize, got: usize },
    #[error("segment {0} has no polynomial coefficients")]
    EmptySegment(usize),
    #[error("expected one sample per breakpoint ({breakpoints}), got {got}")]
    SampleCountMismatch { breakpoints: usize, got: usize },
    #[error("value at index {index} is {got_rows}x{got_cols}, expected {rows}x{cols}")]
    ShapeMismatch { index: usize, got_rows: usize, got_cols: usize, rows: usize, cols: usize },
    #[error("frame conversion requires a 12-element column trajectory, got {rows}x{cols}")]
    NotAStateTrajectory { rows: usize, cols: usize },
}

fn check_breaks(breaks: &[f64]) -> Result<(), TrajectoryError> {
    if breaks.len() < 2 {
        return Err(TrajectoryError::TooFewBreakpoints(breaks.len()));
    }
    for i in 1..breaks.len() {
        if breaks[i] < breaks[i - 1] {
            return Err(TrajectoryError::DecreasingBreakpoints {
                index: i,
                value: breaks[i],
                previous: breaks[i - 1],
            });
        }
    }
    Ok(())
}

fn check_shape(
    index: usize,
    value: &DMatrix<f64>,
    rows: usize,
    cols: usize,
) -> Result<(), TrajectoryError> {
    if value.nrows() != rows || value.ncols() != cols {
        return Err(TrajectoryError::ShapeMismatch {
            index,
            got_rows: value.nrows(),
            got_cols: value.ncols(),
            rows,
            cols,
        });
    }
    Ok(())
}

/// A matrix-valued piecewise polynomial over an ordered breakpoint sequence.
///
/// Segment `i` covers `[breaks[i], breaks[i + 1]]` and evaluates as a
/// polynomial in local time `t - breaks[i]`. Evaluation outside the domain
/// clamps to the first or last segment.
#[derive(Debug, Clone, PartialEq)]
pub struct PiecewisePolynomial {
    breaks: Vec<f64>,
    /// `coefficients[segment][power]` multiplies `(t - breaks[segment]).powi(power)`.
    coefficients: Vec<Vec<DMatrix<f64>>>,
    rows: usize,
    cols: usize,
}

impl PiecewisePolynomial {
    /// Creates a piecewise polynomial from raw per-segment coefficients.
    pub fn from_coefficients(
        breaks: Vec<f64>,
        coefficients: Vec<Vec<DMatrix<f64>>>,
    ) -> Result<Self, TrajectoryError> {
        check_breaks(&breaks)?;
        let segments = breaks.len() - 1;
        if coefficients.len() != segments {
            return Err(TrajectoryError::SegmentCountMismatch {
                segments,
                got: coefficients.len(),
            });
        }
        let first = coefficients
            .first()
            .and_then(|c| c.first())
            .ok_or(TrajectoryError::EmptySegment(0))?;
        let (rows, cols) = (first.nrows(), first.ncols());
        for (i, segment) in coefficients.iter().enumerate() {
            if segment.is_empty() {
                return Err(TrajectoryError::EmptySegment(i));
            }
            for coefficient in segment {
                check_shape(i, coefficient, rows, cols)?;
            }
        }
        Ok(Self { breaks, coefficients, rows, cols })
    }

    /// A single-segment constant polynomial over `[t0, t1]`.
    pub fn constant_over(
        value: DMatrix<f64>,
        t0: f64,
        t1: f64,
    ) -> Result<Self, TrajectoryError> {
        Self::from_coefficients(vec![t0, t1], vec![vec![value]])
    }

    /// Holds each sample constant until the next breakpoint. The final sample
    /// is discarded: the last segment holds the second-to-last sample, which
    /// is also the value at and beyond the last breakpoint.
    pub fn zero_order_hold(
        breaks: Vec<f64>,
        samples: &[DMatrix<f64>],
    ) -> Result<Self, TrajectoryError> {
        check_breaks(&breaks)?;
        if samples.len() != breaks.len() {
            return Err(TrajectoryError::SampleCountMismatch {
                breakpoints: breaks.len(),
                got: samples.len(),
            });
        }
        let coefficients = samples[..samples.len() - 1]
            .iter()
            .map(|s| vec![s.clone()])
            .collect();
        Self::from_coefficients(breaks, coefficients)
    }

    /// Interpolates linearly between consecutive samples.
    pub fn first_order_hold(
        breaks: Vec<f64>,
        samples: &[DMatrix<f64>],
    ) -> Result<Self, TrajectoryError> {
        check_breaks(&breaks)?;
        if samples.len() != breaks.len() {
            return Err(TrajectoryError::SampleCountMismatch {
                breakpoints: breaks.len(),
                got: samples.len(),
            });
        }
        let mut coefficients = Vec::with_capacity(breaks.len() - 1);
        for i in 0..breaks.len() - 1 {
            let dt = breaks[i + 1] - breaks[i];
            let slope = if dt > 0.0 {
                (&samples[i + 1] - &samples[i]) / dt
            } else {
                DMatrix::zeros(samples[i].nrows(), samples[i].ncols())
            };
            coefficients.push(vec![samples[i].clone(), slope]);
        }
        Self::from_coefficients(breaks, coefficients)
    }

    pub fn breakpoints(&self) -> &[f64] {
        &self.breaks
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Evaluates the polynomial at `t` by Horner's rule on the local time of
    /// the containing segment.
    pub fn evaluate(&self, t: f64) -> DMatrix<f64> {
        let segment = self.segment_index(t);
        let local = t - self.breaks[segment];
        let coefficients = &self.coefficients[segment];

        let mut value = coefficients[coefficients.len() - 1].clone();
        for coefficient in coefficients.iter().rev().skip(1) {
            value *= local;
            value += coefficient;
        }
        value
    }

    fn segment_index(&self, t: f64) -> usize {
        let upper = self.breaks.partition_point(|b| *b <= t);
        upper.saturating_sub(1).min(self.breaks.len() - 2)
    }
}

/// A degenerate constant-valued trajectory with an empty nominal domain.
///
/// Bundles normalize constants into a single-segment [`PiecewisePolynomial`]
/// spanning the state trajectory's domain before storing them.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantTrajectory {
    value: DMatrix<f64>,
    breaks: [f64; 2],
}

impl ConstantTrajectory {
    pub fn new(value: DMatrix<f64>) -> Self {
        Self { value, breaks: [0.0, 0.0] }
    }

    pub fn value(&self) -> &DMatrix<f64> {
        &self.value
    }

    pub fn breakpoints(&self) -> &[f64] {
        &self.breaks
    }

    pub fn rows(&self) -> usize {
        self.value.nrows()
    }

    pub fn cols(&self) -> usize {
        self.value.ncols()
    }

    pub fn evaluate(&self, _t: f64) -> DMatrix<f64> {
        self.value.clone()
    }

    /// Promotes the constant to a uniform piecewise representation over
    /// `[t0, t1]`.
    pub fn over_domain(&self, t0: f64, t1: f64) -> Result<PiecewisePolynomial, TrajectoryError> {
        PiecewisePolynomial::constant_over(self.value.clone(), t0, t1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn column(values: &[f64]) -> DMatrix<f64> {
        DMatrix::from_column_slice(values.len(), 1, values)
    }

    #[test]
    fn rejects_single_breakpoint() {
        let err = PiecewisePolynomial::from_coefficients(vec![0.0], vec![]);
        assert!(matches!(err, Err(TrajectoryError::TooFewBreakpoints(1))));
    }

    #[test]
    fn rejects_decreasing_breakpoints() {
        let err = PiecewisePolynomial::zero_order_hold(
            vec![0.0, 2.0, 1.0],
            &[column(&[1.0]), column(&[2.0]), column(&[3.0])],
        );
        assert!(matches!(err, Err(TrajectoryError::DecreasingBreakpoints { index: 2, .. })));
    }

    #[test]
    fn rejects_mixed_sample_shapes() {
        let err = PiecewisePolynomial::first_order_hold(
            vec![0.0, 1.0],
            &[column(&[1.0]), column(&[1.0, 2.0])],
        );
        assert!(matches!(err, Err(TrajectoryError::ShapeMismatch { .. })));
    }

    #[test]
    fn zero_order_hold_steps_at_breakpoints() {
        let traj = PiecewisePolynomial::zero_order_hold(
            vec![0.0, 1.0, 2.0],
            &[column(&[1.0]), column(&[5.0]), column(&[9.0])],
        )
        .unwrap();
        assert_abs_diff_eq!(traj.evaluate(0.5)[(0, 0)], 1.0);
        assert_abs_diff_eq!(traj.evaluate(1.0)[(0, 0)], 5.0);
        assert_abs_diff_eq!(traj.evaluate(1.9)[(0, 0)], 5.0);
        // the final sample never appears: the last segment holds the
        // second-to-last sample, at the last breakpoint and beyond
        assert_abs_diff_eq!(traj.evaluate(2.0)[(0, 0)], 5.0);
        assert_abs_diff_eq!(traj.evaluate(2.5)[(0, 0)], 5.0);
    }

    #[test]
    fn first_order_hold_interpolates_linearly() {
        let traj = PiecewisePolynomial::first_order_hold(
            vec![0.0, 2.0],
            &[column(&[1.0, 0.0]), column(&[3.0, -4.0])],
        )
        .unwrap();
        let mid = traj.evaluate(1.0);
        assert_abs_diff_eq!(mid[(0, 0)], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(mid[(1, 0)], -2.0, epsilon = 1e-12);
        // endpoint evaluation lands on the final sample
        assert_abs_diff_eq!(traj.evaluate(2.0)[(0, 0)], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn evaluation_clamps_to_the_domain_segments() {
        let traj = PiecewisePolynomial::first_order_hold(
            vec![0.0, 1.0],
            &[column(&[0.0]), column(&[1.0])],
        )
        .unwrap();
        // extrapolates on the last segment's polynomial
        assert_abs_diff_eq!(traj.evaluate(1.5)[(0, 0)], 1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(traj.evaluate(-0.5)[(0, 0)], -0.5, epsilon = 1e-12);
    }

    #[test]
    fn quadratic_segment_uses_horner_evaluation() {
        // 2 + 3*tau + tau^2 on [1, 3]
        let traj = PiecewisePolynomial::from_coefficients(
            vec![1.0, 3.0],
            vec![vec![column(&[2.0]), column(&[3.0]), column(&[1.0])]],
        )
        .unwrap();
        assert_abs_diff_eq!(traj.evaluate(2.0)[(0, 0)], 6.0, epsilon = 1e-12);
    }

    #[test]
    fn constant_promotes_to_piecewise() {
        let constant = ConstantTrajectory::new(column(&[4.0, -1.0]));
        let promoted = constant.over_domain(0.0, 5.0).unwrap();
        assert_eq!(promoted.breakpoints(), &[0.0, 5.0]);
        assert_abs_diff_eq!(promoted.evaluate(3.3)[(1, 0)], -1.0);
    }
}
