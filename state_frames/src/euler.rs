use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

/// A roll-pitch-yaw attitude using the aerospace ZYX sequence.
///
/// Angles are in radians. `rotation_matrix` returns the direction cosine
/// matrix taking body-frame vectors into the world frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EulerAngles {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl EulerAngles {
    pub fn new(roll: f64, pitch: f64, yaw: f64) -> Self {
        Self { roll, pitch, yaw }
    }

    /// Builds the body-to-world rotation matrix `Rz(yaw) * Ry(pitch) * Rx(roll)`.
    ///
    /// # Returns
    ///
    /// The direction cosine matrix rotating body-frame vectors into the world frame.
    pub fn rotation_matrix(&self) -> Matrix3<f64> {
        let rotx =
            |a: f64| Matrix3::new(1.0, 0.0, 0.0, 0.0, a.cos(), -a.sin(), 0.0, a.sin(), a.cos());
        let roty =
            |a: f64| Matrix3::new(a.cos(), 0.0, a.sin(), 0.0, 1.0, 0.0, -a.sin(), 0.0, a.cos());
        let rotz =
            |a: f64| Matrix3::new(a.cos(), -a.sin(), 0.0, a.sin(), a.cos(), 0.0, 0.0, 0.0, 1.0);

        rotz(self.yaw) * roty(self.pitch) * rotx(self.roll)
    }

    /// The kinematic map from Euler-angle rates to body angular velocity,
    /// `[p, q, r] = E(roll, pitch) * [rolldot, pitchdot, yawdot]`.
    pub fn rate_map(&self) -> Matrix3<f64> {
        let (sr, cr) = self.roll.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();

        Matrix3::new(
            1.0, 0.0, -sp, //
            0.0, cr, sr * cp, //
            0.0, -sr, cr * cp,
        )
    }

    /// The inverse kinematic map from body angular velocity to Euler-angle rates.
    ///
    /// Singular at pitch = ±π/2: the map divides by `cos(pitch)` and is not
    /// guarded, so rates are unbounded near gimbal lock.
    pub fn rate_map_inv(&self) -> Matrix3<f64> {
        let (sr, cr) = self.roll.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        let tp = sp / cp;

        Matrix3::new(
            1.0, sr * tp, cr * tp, //
            0.0, cr, -sr, //
            0.0, sr / cp, cr / cp,
        )
    }

    /// Converts Euler-angle rates to body angular velocity.
    ///
    /// # Arguments
    ///
    /// * `rates` - `[rolldot, pitchdot, yawdot]` in rad/s.
    ///
    /// # Returns
    ///
    /// The body angular velocity `[p, q, r]` in rad/s.
    pub fn rates_to_body_rates(&self, rates: Vector3<f64>) -> Vector3<f64> {
        self.rate_map() * rates
    }

    /// Converts body angular velocity to Euler-angle rates.
    ///
    /// Unguarded at gimbal lock, see [`EulerAngles::rate_map_inv`].
    ///
    /// # Arguments
    ///
    /// * `pqr` - The body angular velocity `[p, q, r]` in rad/s.
    ///
    /// # Returns
    ///
    /// The Euler-angle rates `[rolldot, pitchdot, yawdot]` in rad/s.
    pub fn body_rates_to_rates(&self, pqr: Vector3<f64>) -> Vector3<f64> {
        self.rate_map_inv() * pqr
    }
}

impl From<Vector3<f64>> for EulerAngles {
    fn from(v: Vector3<f64>) -> Self {
        Self { roll: v[0], pitch: v[1], yaw: v[2] }
    }
}
