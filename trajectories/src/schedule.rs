use thiserror::Error;

use crate::Trajectory;

/// Errors that can occur when pairing gain and offset trajectories.
#[derive(Debug, Clone, Error)]
pub enum ScheduleError {
    #[error("gain trajectory must have 12 state columns, got {0}")]
    GainColumns(usize),
    #[error("offset trajectory must be a column vector, got {rows}x{cols}")]
    OffsetNotColumn { rows: usize, cols: usize },
    #[error("gain trajectory has {gain_rows} outputs but offset has {offset_rows}")]
    OutputMismatch { gain_rows: usize, offset_rows: usize },
}

/// A time-varying linear feedback controller around a reference trajectory.
///
/// Pairs a gain trajectory `K(t)` (control dim x 12) with a feed-forward
/// offset trajectory (control dim x 1). The feedback law
/// `u(t) = u_ref(t) + K(t) * (x - x_ref(t))` is never evaluated here; the
/// schedule is only stored, converted, and exported.
#[derive(Debug, Clone)]
pub struct ControllerSchedule {
    gains: Trajectory,
    offsets: Trajectory,
}

impl ControllerSchedule {
    pub fn new(gains: Trajectory, offsets: Trajectory) -> Result<Self, ScheduleError> {
        if gains.cols() != 12 {
            return Err(ScheduleError::GainColumns(gains.cols()));
        }
        if offsets.cols() != 1 {
            return Err(ScheduleError::OffsetNotColumn {
                rows: offsets.rows(),
                cols: offsets.cols(),
            });
        }
        if gains.rows() != offsets.rows() {
            return Err(ScheduleError::OutputMismatch {
                gain_rows: gains.rows(),
                offset_rows: offsets.rows(),
            });
        }
        Ok(Self { gains, offsets })
    }

    /// Builds a schedule from trajectories whose shapes a bundle already
    /// validated.
    pub(crate) fn from_parts(gains: Trajectory, offsets: Trajectory) -> Self {
        Self { gains, offsets }
    }

    /// Number of control outputs the schedule drives.
    pub fn control_dim(&self) -> usize {
        self.gains.rows()
    }

    pub fn gains(&self) -> &Trajectory {
        &self.gains
    }

    pub fn offsets(&self) -> &Trajectory {
        &self.offsets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piecewise::PiecewisePolynomial;
    use nalgebra::DMatrix;

    fn constant(rows: usize, cols: usize) -> Trajectory {
        Trajectory::PiecewisePolynomial(
            PiecewisePolynomial::constant_over(DMatrix::zeros(rows, cols), 0.0, 1.0).unwrap(),
        )
    }

    #[test]
    fn accepts_matching_shapes() {
        let schedule = ControllerSchedule::new(constant(3, 12), constant(3, 1)).unwrap();
        assert_eq!(schedule.control_dim(), 3);
    }

    #[test]
    fn rejects_wrong_gain_columns() {
        let err = ControllerSchedule::new(constant(3, 6), constant(3, 1));
        assert!(matches!(err, Err(ScheduleError::GainColumns(6))));
    }

    #[test]
    fn rejects_row_offset() {
        let err = ControllerSchedule::new(constant(3, 12), constant(1, 3));
        assert!(matches!(err, Err(ScheduleError::OffsetNotColumn { rows: 1, cols: 3 })));
    }

    #[test]
    fn rejects_output_count_mismatch() {
        let err = ControllerSchedule::new(constant(3, 12), constant(2, 1));
        assert!(matches!(
            err,
            Err(ScheduleError::OutputMismatch { gain_rows: 3, offset_rows: 2 })
        ));
    }
}
