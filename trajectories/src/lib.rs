pub mod bundle;
pub mod converted;
pub mod piecewise;
pub mod schedule;

use nalgebra::DMatrix;

use converted::{FrameConvertedTrajectory, GainConvertedTrajectory};
use piecewise::{ConstantTrajectory, PiecewisePolynomial};

pub mod prelude {
    pub use crate::Trajectory;
    pub use crate::bundle::*;
    pub use crate::converted::*;
    pub use crate::piecewise::*;
    pub use crate::schedule::*;
}

/// Tagged variant over every trajectory representation in the system.
///
/// All variants expose the same capability set: matrix-valued evaluation at a
/// time, an ordered breakpoint sequence, and a fixed value shape. Dispatch is
/// a plain `match`, so no trait objects or registries are involved.
#[derive(Debug, Clone)]
pub enum Trajectory {
    Constant(ConstantTrajectory),
    PiecewisePolynomial(PiecewisePolynomial),
    FrameConverted(FrameConvertedTrajectory),
    GainConverted(GainConvertedTrajectory),
}

impl Trajectory {
    /// Evaluates the trajectory value at time `t`.
    pub fn evaluate(&self, t: f64) -> DMatrix<f64> {
        match self {
            Trajectory::Constant(trajectory) => trajectory.evaluate(t),
            Trajectory::PiecewisePolynomial(trajectory) => trajectory.evaluate(t),
            Trajectory::FrameConverted(trajectory) => trajectory.evaluate(t),
            Trajectory::GainConverted(trajectory) => trajectory.evaluate(t),
        }
    }

    /// The ordered segment boundaries, length >= 2, first and last bounding
    /// the time domain.
    pub fn breakpoints(&self) -> &[f64] {
        match self {
            Trajectory::Constant(trajectory) => trajectory.breakpoints(),
            Trajectory::PiecewisePolynomial(trajectory) => trajectory.breakpoints(),
            Trajectory::FrameConverted(trajectory) => trajectory.breakpoints(),
            Trajectory::GainConverted(trajectory) => trajectory.breakpoints(),
        }
    }

    pub fn rows(&self) -> usize {
        match self {
            Trajectory::Constant(trajectory) => trajectory.rows(),
            Trajectory::PiecewisePolynomial(trajectory) => trajectory.rows(),
            Trajectory::FrameConverted(_) => 12,
            Trajectory::GainConverted(trajectory) => trajectory.rows(),
        }
    }

    pub fn cols(&self) -> usize {
        match self {
            Trajectory::Constant(trajectory) => trajectory.cols(),
            Trajectory::PiecewisePolynomial(trajectory) => trajectory.cols(),
            Trajectory::FrameConverted(_) => 1,
            Trajectory::GainConverted(trajectory) => trajectory.cols(),
        }
    }

    pub fn start_time(&self) -> f64 {
        self.breakpoints()[0]
    }

    pub fn end_time(&self) -> f64 {
        *self
            .breakpoints()
            .last()
            .expect("breakpoints are validated non-empty at construction")
    }
}
