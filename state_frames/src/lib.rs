pub mod euler;
pub mod transform;

use std::fmt;

use nalgebra::{SVector, Vector3};
use serde::{Deserialize, Serialize};

use euler::EulerAngles;

pub mod prelude {
    pub use crate::euler::*;
    pub use crate::transform::*;
    pub use crate::{RigidBodyState, StateFrame, StateVector};
}

/// A 12-element rigid body state.
///
/// Layout: `[x, y, z, roll, pitch, yaw, linear(3), angular(3)]`. The meaning
/// of the last six elements depends on the [`StateFrame`] variant the vector
/// is tagged with.
pub type StateVector = SVector<f64, 12>;

/// Frame variant of a state vector's velocity and rate blocks.
///
/// Position and attitude are world-referenced in both variants; only the
/// last six elements differ in meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateFrame {
    /// Linear velocity in world axes, Euler-angle rates.
    WorldAligned,
    /// Linear velocity along body axes, body angular velocity.
    BodyAligned,
}

impl StateFrame {
    /// Column labels for a state table in this frame variant.
    pub fn state_labels(&self) -> [&'static str; 12] {
        match self {
            StateFrame::WorldAligned => [
                "x", "y", "z", "roll", "pitch", "yaw", "xdot", "ydot", "zdot", "rolldot",
                "pitchdot", "yawdot",
            ],
            StateFrame::BodyAligned => {
                ["x", "y", "z", "roll", "pitch", "yaw", "u", "v", "w", "p", "q", "r"]
            }
        }
    }
}

impl fmt::Display for StateFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateFrame::WorldAligned => write!(f, "world-aligned"),
            StateFrame::BodyAligned => write!(f, "body-aligned"),
        }
    }
}

/// Named-field view of a [`StateVector`] together with its frame tag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidBodyState {
    /// Position in world axes [m].
    pub position: Vector3<f64>,
    /// Roll-pitch-yaw attitude [rad].
    pub attitude: EulerAngles,
    /// Linear velocity [m/s], axes per `frame`.
    pub linear: Vector3<f64>,
    /// Angular rate [rad/s], meaning per `frame`.
    pub angular: Vector3<f64>,
    pub frame: StateFrame,
}

impl RigidBodyState {
    pub fn new(vector: &StateVector, frame: StateFrame) -> Self {
        Self {
            position: vector.fixed_rows::<3>(0).into_owned(),
            attitude: EulerAngles::new(vector[3], vector[4], vector[5]),
            linear: vector.fixed_rows::<3>(6).into_owned(),
            angular: vector.fixed_rows::<3>(9).into_owned(),
            frame,
        }
    }

    pub fn to_vector(&self) -> StateVector {
        let mut x = StateVector::zeros();
        x.fixed_rows_mut::<3>(0).copy_from(&self.position);
        x[3] = self.attitude.roll;
        x[4] = self.attitude.pitch;
        x[5] = self.attitude.yaw;
        x.fixed_rows_mut::<3>(6).copy_from(&self.linear);
        x.fixed_rows_mut::<3>(9).copy_from(&self.angular);
        x
    }
}
