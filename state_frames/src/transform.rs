use nalgebra::SMatrix;

use crate::{StateFrame, StateVector, euler::EulerAngles};

/// Trait defining a state-vector conversion between frame variants.
pub trait FrameTransform {
    /// The frame variant produced by [`FrameTransform::convert`].
    fn target(&self) -> StateFrame;

    /// Converts a 12-element state vector into the target frame variant.
    ///
    /// Position and attitude (elements 0..6) pass through untouched; only
    /// the velocity and rate blocks are re-expressed.
    fn convert(&self, x: &StateVector) -> StateVector;

    /// The jacobian of the inverse state map with respect to the velocity and
    /// rate blocks, evaluated at a reference attitude.
    ///
    /// A feedback gain `K` over the source frame is re-expressed over the
    /// target frame as `K * gain_basis(attitude)`.
    fn gain_basis(&self, attitude: &EulerAngles) -> SMatrix<f64, 12, 12>;
}

/// Converts a world-aligned state into the body-aligned variant.
///
/// World-frame linear velocity is rotated into the body frame and
/// Euler-angle rates are mapped to body angular velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldToBody;

/// Converts a body-aligned state into the world-aligned variant.
///
/// Exact algebraic inverse of [`WorldToBody`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyToWorld;

fn attitude_of(x: &StateVector) -> EulerAngles {
    EulerAngles::new(x[3], x[4], x[5])
}

impl FrameTransform for WorldToBody {
    fn target(&self) -> StateFrame {
        StateFrame::BodyAligned
    }

    fn convert(&self, x: &StateVector) -> StateVector {
        let att = attitude_of(x);
        let r = att.rotation_matrix();

        let v_world = x.fixed_rows::<3>(6).into_owned();
        let rates = x.fixed_rows::<3>(9).into_owned();

        let mut out = *x;
        out.fixed_rows_mut::<3>(6)
            .copy_from(&(r.transpose() * v_world));
        out.fixed_rows_mut::<3>(9)
            .copy_from(&att.rates_to_body_rates(rates));
        out
    }

    fn gain_basis(&self, attitude: &EulerAngles) -> SMatrix<f64, 12, 12> {
        // jacobian of the body-to-world map: world deviations per body deviation
        let mut j = SMatrix::<f64, 12, 12>::identity();
        j.fixed_view_mut::<3, 3>(6, 6)
            .copy_from(&attitude.rotation_matrix());
        j.fixed_view_mut::<3, 3>(9, 9)
            .copy_from(&attitude.rate_map_inv());
        j
    }
}

impl FrameTransform for BodyToWorld {
    fn target(&self) -> StateFrame {
        StateFrame::WorldAligned
    }

    fn convert(&self, x: &StateVector) -> StateVector {
        let att = attitude_of(x);
        let r = att.rotation_matrix();

        let v_body = x.fixed_rows::<3>(6).into_owned();
        let pqr = x.fixed_rows::<3>(9).into_owned();

        let mut out = *x;
        out.fixed_rows_mut::<3>(6).copy_from(&(r * v_body));
        out.fixed_rows_mut::<3>(9)
            .copy_from(&att.body_rates_to_rates(pqr));
        out
    }

    fn gain_basis(&self, attitude: &EulerAngles) -> SMatrix<f64, 12, 12> {
        let mut j = SMatrix::<f64, 12, 12>::identity();
        j.fixed_view_mut::<3, 3>(6, 6)
            .copy_from(&attitude.rotation_matrix().transpose());
        j.fixed_view_mut::<3, 3>(9, 9)
            .copy_from(&attitude.rate_map());
        j
    }
}

/// Enum over the two named frame transforms.
///
/// Dispatches [`FrameTransform`] by matching on the variant, so callers hold
/// a plain value instead of a trait object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StateTransform {
    WorldToBody(WorldToBody),
    BodyToWorld(BodyToWorld),
}

impl StateTransform {
    /// The transform whose output is the given frame variant.
    pub fn into_frame(target: StateFrame) -> Self {
        match target {
            StateFrame::BodyAligned => StateTransform::WorldToBody(WorldToBody),
            StateFrame::WorldAligned => StateTransform::BodyToWorld(BodyToWorld),
        }
    }

    /// The transform undoing this one.
    pub fn inverse(&self) -> Self {
        match self {
            StateTransform::WorldToBody(_) => StateTransform::BodyToWorld(BodyToWorld),
            StateTransform::BodyToWorld(_) => StateTransform::WorldToBody(WorldToBody),
        }
    }
}

impl FrameTransform for StateTransform {
    fn target(&self) -> StateFrame {
        match self {
            StateTransform::WorldToBody(t) => t.target(),
            StateTransform::BodyToWorld(t) => t.target(),
        }
    }

    fn convert(&self, x: &StateVector) -> StateVector {
        match self {
            StateTransform::WorldToBody(t) => t.convert(x),
            StateTransform::BodyToWorld(t) => t.convert(x),
        }
    }

    fn gain_basis(&self, attitude: &EulerAngles) -> SMatrix<f64, 12, 12> {
        match self {
            StateTransform::WorldToBody(t) => t.gain_basis(attitude),
            StateTransform::BodyToWorld(t) => t.gain_basis(attitude),
        }
    }
}
