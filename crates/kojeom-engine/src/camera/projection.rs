use std::f32::consts::FRAC_PI_4;

use glam::Mat4;

/// Active projection and its parameters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Projection {
    Perspective {
        fov_y: f32,
        aspect_ratio: f32,
        near_z: f32,
        far_z: f32,
    },
    Orthographic {
        width: f32,
        height: f32,
        near_z: f32,
        far_z: f32,
    },
}

impl Projection {
    pub const DEFAULT_FOV_Y: f32 = FRAC_PI_4;
    pub const DEFAULT_ASPECT_RATIO: f32 = 16.0 / 9.0;
    pub const DEFAULT_NEAR_Z: f32 = 0.1;
    pub const DEFAULT_FAR_Z: f32 = 1000.0;

    /// Left-handed projection matrix with a `[0, 1]` depth range.
    pub fn matrix(&self) -> Mat4 {
        match *self {
            Projection::Perspective {
                fov_y,
                aspect_ratio,
                near_z,
                far_z,
            } => Mat4::perspective_lh(fov_y, aspect_ratio, near_z, far_z),
            Projection::Orthographic {
                width,
                height,
                near_z,
                far_z,
            } => {
                let (hw, hh) = (width * 0.5, height * 0.5);
                Mat4::orthographic_lh(-hw, hw, -hh, hh, near_z, far_z)
            }
        }
    }

    pub fn near_z(&self) -> f32 {
        match *self {
            Projection::Perspective { near_z, .. } | Projection::Orthographic { near_z, .. } => {
                near_z
            }
        }
    }

    pub fn far_z(&self) -> f32 {
        match *self {
            Projection::Perspective { far_z, .. } | Projection::Orthographic { far_z, .. } => far_z,
        }
    }

    pub fn is_perspective(&self) -> bool {
        matches!(self, Projection::Perspective { .. })
    }
}

impl Default for Projection {
    fn default() -> Self {
        Projection::Perspective {
            fov_y: Self::DEFAULT_FOV_Y,
            aspect_ratio: Self::DEFAULT_ASPECT_RATIO,
            near_z: Self::DEFAULT_NEAR_Z,
            far_z: Self::DEFAULT_FAR_Z,
        }
    }
}
