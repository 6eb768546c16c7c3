use std::sync::Arc;

use thiserror::Error;

use state_frames::StateFrame;
use state_frames::transform::StateTransform;

use crate::Trajectory;
use crate::converted::{FrameConvertedTrajectory, GainConvertedTrajectory};
use crate::piecewise::TrajectoryError;
use crate::schedule::{ControllerSchedule, ScheduleError};

/// Tolerance for comparing the state and control time domains.
const DOMAIN_TOL: f64 = 1e-9;

/// Errors that can occur when constructing a `TrajectoryBundle`.
#[derive(Debug, Clone, Error)]
pub enum BundleError {
    #[error("state trajectory must be a 12-element column, got {rows}x{cols}")]
    StateShape { rows: usize, cols: usize },
    #[error("control trajectory must be a column vector, got {rows}x{cols}")]
    ControlNotColumn { rows: usize, cols: usize },
    #[error("state trajectory must start at time 0, got {0}")]
    NonZeroStart(f64),
    #[error("control has {control_rows} channels but the gain schedule drives {schedule_rows}")]
    ControlDimensionMismatch { control_rows: usize, schedule_rows: usize },
    #[error(
        "state spans [{state_start}, {state_end}] but control spans [{control_start}, {control_end}]"
    )]
    TimeDomainMismatch {
        state_start: f64,
        state_end: f64,
        control_start: f64,
        control_end: f64,
    },
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error(transparent)]
    Trajectory(#[from] TrajectoryError),
}

/// A reference state trajectory, its control input, and the time-varying
/// feedback controller designed around them, tagged with the frame variant
/// the state values are expressed in.
///
/// Immutable after construction; frame conversions build a new bundle. The
/// frame tag is trusted: construction does not check that the stored state
/// values actually match it.
#[derive(Debug, Clone)]
pub struct TrajectoryBundle {
    state: Arc<Trajectory>,
    control: Trajectory,
    controller: ControllerSchedule,
    frame: StateFrame,
}

impl TrajectoryBundle {
    /// Validates and assembles a bundle.
    ///
    /// A `Constant` control trajectory is promoted to a single-segment
    /// piecewise polynomial over the state trajectory's time domain, so every
    /// stored control trajectory carries real breakpoints.
    pub fn new(
        state: Trajectory,
        control: Trajectory,
        controller: ControllerSchedule,
        frame: StateFrame,
    ) -> Result<Self, BundleError> {
        if state.rows() != 12 || state.cols() != 1 {
            return Err(BundleError::StateShape { rows: state.rows(), cols: state.cols() });
        }
        // the export grid starts at t = 0, so the domain must too
        if state.start_time().abs() > DOMAIN_TOL {
            return Err(BundleError::NonZeroStart(state.start_time()));
        }
        if control.cols() != 1 {
            return Err(BundleError::ControlNotColumn {
                rows: control.rows(),
                cols: control.cols(),
            });
        }

        let control = match control {
            Trajectory::Constant(constant) => Trajectory::PiecewisePolynomial(
                constant.over_domain(state.start_time(), state.end_time())?,
            ),
            other => other,
        };

        if control.rows() != controller.control_dim() {
            return Err(BundleError::ControlDimensionMismatch {
                control_rows: control.rows(),
                schedule_rows: controller.control_dim(),
            });
        }

        let (state_start, state_end) = (state.start_time(), state.end_time());
        let (control_start, control_end) = (control.start_time(), control.end_time());
        if (state_start - control_start).abs() > DOMAIN_TOL
            || (state_end - control_end).abs() > DOMAIN_TOL
        {
            return Err(BundleError::TimeDomainMismatch {
                state_start,
                state_end,
                control_start,
                control_end,
            });
        }

        Ok(Self { state: Arc::new(state), control, controller, frame })
    }

    pub fn state(&self) -> &Trajectory {
        &self.state
    }

    pub fn control(&self) -> &Trajectory {
        &self.control
    }

    pub fn controller(&self) -> &ControllerSchedule {
        &self.controller
    }

    pub fn frame(&self) -> StateFrame {
        self.frame
    }

    pub fn end_time(&self) -> f64 {
        self.state.end_time()
    }

    /// A new bundle with the state and gains re-expressed in the body-aligned
    /// frame. Control and offsets pass through unchanged since actuator
    /// commands are frame-independent.
    pub fn to_body_aligned(&self) -> TrajectoryBundle {
        self.convert_to(StateFrame::BodyAligned)
    }

    /// Symmetric inverse of [`TrajectoryBundle::to_body_aligned`].
    pub fn to_world_aligned(&self) -> TrajectoryBundle {
        self.convert_to(StateFrame::WorldAligned)
    }

    fn convert_to(&self, target: StateFrame) -> TrajectoryBundle {
        if self.frame == target {
            // already in the target frame, still hand back a fresh bundle
            return self.clone();
        }

        let transform = StateTransform::into_frame(target);
        let state = Arc::new(Trajectory::FrameConverted(
            FrameConvertedTrajectory::new_unchecked(self.state.clone(), transform),
        ));
        let gains = Trajectory::GainConverted(GainConvertedTrajectory::new_unchecked(
            Arc::new(self.controller.gains().clone()),
            self.state.clone(),
            transform,
        ));
        let controller =
            ControllerSchedule::from_parts(gains, self.controller.offsets().clone());

        TrajectoryBundle { state, control: self.control.clone(), controller, frame: target }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piecewise::{ConstantTrajectory, PiecewisePolynomial};
    use approx::assert_abs_diff_eq;
    use nalgebra::DMatrix;
    use std::f64::consts::FRAC_PI_2;

    fn state_trajectory() -> Trajectory {
        let mut start = DMatrix::zeros(12, 1);
        start[(5, 0)] = FRAC_PI_2;
        start[(6, 0)] = 1.0;
        let mut end = start.clone();
        end[(0, 0)] = 2.0;
        Trajectory::PiecewisePolynomial(
            PiecewisePolynomial::first_order_hold(vec![0.0, 2.0], &[start, end]).unwrap(),
        )
    }

    fn schedule() -> ControllerSchedule {
        let gains = Trajectory::PiecewisePolynomial(
            PiecewisePolynomial::constant_over(DMatrix::identity(2, 12), 0.0, 2.0).unwrap(),
        );
        let offsets = Trajectory::PiecewisePolynomial(
            PiecewisePolynomial::constant_over(
                DMatrix::from_column_slice(2, 1, &[0.5, -0.5]),
                0.0,
                2.0,
            )
            .unwrap(),
        );
        ControllerSchedule::new(gains, offsets).unwrap()
    }

    fn constant_control() -> Trajectory {
        Trajectory::Constant(ConstantTrajectory::new(DMatrix::from_column_slice(
            2,
            1,
            &[1.0, 2.0],
        )))
    }

    #[test]
    fn constant_control_is_normalized_over_state_domain() {
        let bundle = TrajectoryBundle::new(
            state_trajectory(),
            constant_control(),
            schedule(),
            StateFrame::WorldAligned,
        )
        .unwrap();
        assert!(matches!(bundle.control(), Trajectory::PiecewisePolynomial(_)));
        assert_eq!(bundle.control().breakpoints(), &[0.0, 2.0]);
        assert_abs_diff_eq!(bundle.control().evaluate(1.7)[(1, 0)], 2.0);
    }

    #[test]
    fn rejects_non_state_trajectory() {
        let err = TrajectoryBundle::new(
            constant_control(),
            constant_control(),
            schedule(),
            StateFrame::WorldAligned,
        );
        assert!(matches!(err, Err(BundleError::StateShape { rows: 2, cols: 1 })));
    }

    #[test]
    fn rejects_control_dimension_mismatch() {
        let control = Trajectory::Constant(ConstantTrajectory::new(DMatrix::zeros(3, 1)));
        let err = TrajectoryBundle::new(
            state_trajectory(),
            control,
            schedule(),
            StateFrame::WorldAligned,
        );
        assert!(matches!(
            err,
            Err(BundleError::ControlDimensionMismatch { control_rows: 3, schedule_rows: 2 })
        ));
    }

    #[test]
    fn rejects_state_domain_not_starting_at_zero() {
        // a bundle over [5, 10] would make the export grid (fixed at t = 0)
        // extrapolate below the trajectory's domain
        let mut start = DMatrix::zeros(12, 1);
        start[(6, 0)] = 1.0;
        let mut end = start.clone();
        end[(0, 0)] = 100.0;
        let state = Trajectory::PiecewisePolynomial(
            PiecewisePolynomial::first_order_hold(vec![5.0, 10.0], &[start, end]).unwrap(),
        );
        let gains = Trajectory::PiecewisePolynomial(
            PiecewisePolynomial::constant_over(DMatrix::identity(2, 12), 5.0, 10.0).unwrap(),
        );
        let offsets = Trajectory::PiecewisePolynomial(
            PiecewisePolynomial::constant_over(DMatrix::zeros(2, 1), 5.0, 10.0).unwrap(),
        );
        let controller = ControllerSchedule::new(gains, offsets).unwrap();

        let err = TrajectoryBundle::new(
            state,
            constant_control(),
            controller,
            StateFrame::WorldAligned,
        );
        assert!(matches!(err, Err(BundleError::NonZeroStart(start)) if start == 5.0));
    }

    #[test]
    fn rejects_mismatched_time_domains() {
        let control = Trajectory::PiecewisePolynomial(
            PiecewisePolynomial::constant_over(DMatrix::zeros(2, 1), 0.0, 3.0).unwrap(),
        );
        let err = TrajectoryBundle::new(
            state_trajectory(),
            control,
            schedule(),
            StateFrame::WorldAligned,
        );
        assert!(matches!(err, Err(BundleError::TimeDomainMismatch { .. })));
    }

    #[test]
    fn body_conversion_flips_tag_and_rotates_velocity() {
        let bundle = TrajectoryBundle::new(
            state_trajectory(),
            constant_control(),
            schedule(),
            StateFrame::WorldAligned,
        )
        .unwrap();

        let body = bundle.to_body_aligned();
        assert_eq!(body.frame(), StateFrame::BodyAligned);

        let sample = body.state().evaluate(0.0);
        // yaw of 90 degrees turns world +x velocity into body -y
        assert_abs_diff_eq!(sample[(7, 0)], -1.0, epsilon = 1e-12);
        // control passes through unchanged
        assert_abs_diff_eq!(body.control().evaluate(1.0)[(0, 0)], 1.0);
    }

    #[test]
    fn conversion_round_trip_restores_state_samples() {
        let bundle = TrajectoryBundle::new(
            state_trajectory(),
            constant_control(),
            schedule(),
            StateFrame::WorldAligned,
        )
        .unwrap();

        let restored = bundle.to_body_aligned().to_world_aligned();
        assert_eq!(restored.frame(), StateFrame::WorldAligned);
        for &t in &[0.0, 0.7, 2.0] {
            let original = bundle.state().evaluate(t);
            let sample = restored.state().evaluate(t);
            for i in 0..12 {
                assert_abs_diff_eq!(sample[(i, 0)], original[(i, 0)], epsilon = 1e-9);
            }
            let k0 = bundle.controller().gains().evaluate(t);
            let k1 = restored.controller().gains().evaluate(t);
            for i in 0..2 {
                for j in 0..12 {
                    assert_abs_diff_eq!(k1[(i, j)], k0[(i, j)], epsilon = 1e-9);
                }
            }
        }
    }

    #[test]
    fn converting_to_the_current_frame_rederives_a_fresh_bundle() {
        let bundle = TrajectoryBundle::new(
            state_trajectory(),
            constant_control(),
            schedule(),
            StateFrame::WorldAligned,
        )
        .unwrap();
        let again = bundle.to_world_aligned();
        assert_eq!(again.frame(), StateFrame::WorldAligned);
        let a = again.state().evaluate(1.0);
        let b = bundle.state().evaluate(1.0);
        for i in 0..12 {
            assert_abs_diff_eq!(a[(i, 0)], b[(i, 0)]);
        }
    }
}
