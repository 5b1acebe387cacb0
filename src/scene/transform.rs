//! Transform math shared by transform nodes and the symmetry constraint.
//!
//! Local channels follow the usual rigging conventions: rotations are Euler
//! angles in degrees applied in the node's [`RotateOrder`], joint orientation
//! is always applied in `xyz` order, and a local matrix is composed as
//! `T · JO · R · S` (column vectors).

use glam::{DMat4, DQuat, DVec3, EulerRot};

/// Order in which the three Euler rotations are applied.
///
/// The discriminant is the enum value stored in `rotateOrder` attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum RotateOrder {
    #[default]
    Xyz = 0,
    Yzx = 1,
    Zxy = 2,
    Xzy = 3,
    Yxz = 4,
    Zyx = 5,
}

impl RotateOrder {
    /// Decodes a stored enum value, falling back to `Xyz` for anything out of range.
    #[must_use]
    pub fn from_index(index: i32) -> Self {
        match index {
            1 => Self::Yzx,
            2 => Self::Zxy,
            3 => Self::Xzy,
            4 => Self::Yxz,
            5 => Self::Zyx,
            _ => Self::Xyz,
        }
    }

    #[inline]
    #[must_use]
    pub fn index(self) -> i32 {
        self as i32
    }

    /// Component indices in application order.
    fn axes(self) -> [usize; 3] {
        match self {
            Self::Xyz => [0, 1, 2],
            Self::Yzx => [1, 2, 0],
            Self::Zxy => [2, 0, 1],
            Self::Xzy => [0, 2, 1],
            Self::Yxz => [1, 0, 2],
            Self::Zyx => [2, 1, 0],
        }
    }

    /// The intrinsic glam order whose composition equals this extrinsic order.
    fn glam_order(self) -> EulerRot {
        match self {
            Self::Xyz => EulerRot::ZYX,
            Self::Yzx => EulerRot::XZY,
            Self::Zxy => EulerRot::YXZ,
            Self::Xzy => EulerRot::YZX,
            Self::Yxz => EulerRot::ZXY,
            Self::Zyx => EulerRot::XYZ,
        }
    }
}

/// Builds a rotation from Euler angles in degrees.
#[must_use]
pub fn euler_to_quat(degrees: DVec3, order: RotateOrder) -> DQuat {
    let r = degrees.to_array().map(f64::to_radians);
    let [a, b, c] = order.axes();
    DQuat::from_euler(order.glam_order(), r[c], r[b], r[a])
}

/// Decomposes a rotation into Euler angles in degrees.
#[must_use]
pub fn quat_to_euler(rotation: DQuat, order: RotateOrder) -> DVec3 {
    let (p, q, s) = rotation.normalize().to_euler(order.glam_order());
    let [a, b, c] = order.axes();
    let mut out = [0.0; 3];
    out[c] = p.to_degrees();
    out[b] = q.to_degrees();
    out[a] = s.to_degrees();
    DVec3::from_array(out)
}

/// Composes a local matrix from transform channels.
#[must_use]
pub fn compose_local(
    translate: DVec3,
    rotate: DVec3,
    scale: DVec3,
    joint_orient: DVec3,
    order: RotateOrder,
) -> DMat4 {
    let orient = euler_to_quat(joint_orient, RotateOrder::Xyz);
    let rotation = orient * euler_to_quat(rotate, order);
    DMat4::from_scale_rotation_translation(scale, rotation, translate)
}

/// World-space pose decomposed from a matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub translation: DVec3,
    pub rotation: DQuat,
    pub scale: DVec3,
}

impl Pose {
    #[must_use]
    pub fn from_matrix(matrix: &DMat4) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
        }
    }

    #[must_use]
    pub fn to_matrix(&self) -> DMat4 {
        DMat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Rotation as Euler degrees in the given order.
    #[must_use]
    pub fn euler(&self, order: RotateOrder) -> DVec3 {
        quat_to_euler(self.rotation, order)
    }
}
