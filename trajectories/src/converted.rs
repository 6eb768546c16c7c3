use std::sync::Arc;

use nalgebra::DMatrix;
use state_frames::prelude::*;

use crate::Trajectory;
use crate::piecewise::TrajectoryError;

fn check_state_shape(trajectory: &Trajectory) -> Result<(), TrajectoryError> {
    if trajectory.rows() != 12 || trajectory.cols() != 1 {
        return Err(TrajectoryError::NotAStateTrajectory {
            rows: trajectory.rows(),
            cols: trajectory.cols(),
        });
    }
    Ok(())
}

/// A state trajectory composed point-wise with a frame transform.
///
/// Evaluation converts the inner 12-element sample into the transform's
/// target frame; breakpoints are the inner trajectory's.
#[derive(Debug, Clone)]
pub struct FrameConvertedTrajectory {
    inner: Arc<Trajectory>,
    transform: StateTransform,
}

impl FrameConvertedTrajectory {
    pub fn new(
        inner: Arc<Trajectory>,
        transform: StateTransform,
    ) -> Result<Self, TrajectoryError> {
        check_state_shape(&inner)?;
        Ok(Self { inner, transform })
    }

    /// Skips the shape check for trajectories a bundle already validated.
    pub(crate) fn new_unchecked(inner: Arc<Trajectory>, transform: StateTransform) -> Self {
        Self { inner, transform }
    }

    pub fn target(&self) -> StateFrame {
        self.transform.target()
    }

    pub fn breakpoints(&self) -> &[f64] {
        self.inner.breakpoints()
    }

    pub fn evaluate(&self, t: f64) -> DMatrix<f64> {
        let sample = self.inner.evaluate(t);
        let x = StateVector::from_column_slice(sample.as_slice());
        DMatrix::from_column_slice(12, 1, self.transform.convert(&x).as_slice())
    }
}

/// A gain schedule re-expressed over a converted state basis.
///
/// Evaluates the source gains and post-multiplies by the transform's basis
/// jacobian at the reference attitude, so the gains accept deviations
/// measured in the target frame.
#[derive(Debug, Clone)]
pub struct GainConvertedTrajectory {
    gains: Arc<Trajectory>,
    reference: Arc<Trajectory>,
    transform: StateTransform,
}

impl GainConvertedTrajectory {
    pub fn new(
        gains: Arc<Trajectory>,
        reference: Arc<Trajectory>,
        transform: StateTransform,
    ) -> Result<Self, TrajectoryError> {
        check_state_shape(&reference)?;
        Ok(Self { gains, reference, transform })
    }

    pub(crate) fn new_unchecked(
        gains: Arc<Trajectory>,
        reference: Arc<Trajectory>,
        transform: StateTransform,
    ) -> Self {
        Self { gains, reference, transform }
    }

    /// The source gain trajectory's breakpoints.
    ///
    /// The converted value also varies with the reference state trajectory,
    /// whose breakpoints are not merged in here.
    pub fn breakpoints(&self) -> &[f64] {
        self.gains.breakpoints()
    }

    pub fn rows(&self) -> usize {
        self.gains.rows()
    }

    pub fn cols(&self) -> usize {
        self.gains.cols()
    }

    pub fn evaluate(&self, t: f64) -> DMatrix<f64> {
        let gains = self.gains.evaluate(t);
        let x_ref = self.reference.evaluate(t);
        // attitude elements are identical in both frame variants
        let attitude = EulerAngles::new(x_ref[(3, 0)], x_ref[(4, 0)], x_ref[(5, 0)]);
        let basis = self.transform.gain_basis(&attitude);
        gains * DMatrix::from_column_slice(12, 12, basis.as_slice())
    }
}
