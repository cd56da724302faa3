use std::f32::consts::FRAC_PI_2;

use glam::{EulerRot, Mat4, Quat, Vec3};
use thiserror::Error;

use super::Projection;

/// Largest pitch magnitude reachable through [`Camera::rotate`].
pub const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;

const DEGENERATE_EPSILON: f32 = 1e-6;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
pub enum CameraError {
    #[error("look-at target coincides with the camera position")]
    TargetAtPosition,
    #[error("up vector is parallel to the view direction")]
    UpParallelToForward,
}

/// Camera with lazily recomputed view and projection matrices.
///
/// Mutators only mark the affected matrix dirty; [`Camera::update_matrices`]
/// rebuilds what is stale. The basis vectors, on the other hand, are kept in
/// sync eagerly whenever the rotation changes.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    /// (pitch, yaw, roll) in radians.
    rotation: Vec3,

    forward: Vec3,
    right: Vec3,
    up: Vec3,

    projection: Projection,

    view_matrix: Mat4,
    projection_matrix: Mat4,

    view_dirty: bool,
    projection_dirty: bool,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            forward: Vec3::Z,
            right: Vec3::X,
            up: Vec3::Y,
            projection: Projection::default(),
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
            view_dirty: true,
            projection_dirty: true,
        }
    }

    // ── transform ─────────────────────────────────────────────────────────

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.view_dirty = true;
    }

    /// Sets (pitch, yaw, roll) and rebuilds the basis vectors.
    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.rotation = rotation;
        self.update_vectors();
        self.view_dirty = true;
    }

    /// Points the camera at `target`.
    ///
    /// Pitch and yaw are derived back from the new forward vector; roll is
    /// reset. Fails without touching the camera when the direction is
    /// undefined or `up` is parallel to it.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) -> Result<(), CameraError> {
        let to_target = target - self.position;
        if to_target.length_squared() <= DEGENERATE_EPSILON {
            return Err(CameraError::TargetAtPosition);
        }
        let forward = to_target.normalize();

        let Some(up) = up.try_normalize() else {
            return Err(CameraError::UpParallelToForward);
        };
        let right = up.cross(forward);
        if right.length_squared() <= DEGENERATE_EPSILON {
            return Err(CameraError::UpParallelToForward);
        }
        let right = right.normalize();

        self.forward = forward;
        self.right = right;
        self.up = forward.cross(right);

        let pitch = (-forward.y).clamp(-1.0, 1.0).asin();
        let yaw = forward.x.atan2(forward.z);
        self.rotation = Vec3::new(pitch, yaw, 0.0);

        self.view_dirty = true;
        Ok(())
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
        self.view_dirty = true;
    }

    /// Adds `delta` to the rotation, keeping pitch within ±[`PITCH_LIMIT`].
    pub fn rotate(&mut self, delta: Vec3) {
        self.rotation += delta;
        self.rotation.x = self.rotation.x.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_vectors();
        self.view_dirty = true;
    }

    // ── projection ────────────────────────────────────────────────────────

    pub fn set_perspective(&mut self, fov_y: f32, aspect_ratio: f32, near_z: f32, far_z: f32) {
        self.set_projection(Projection::Perspective {
            fov_y,
            aspect_ratio,
            near_z,
            far_z,
        });
    }

    pub fn set_orthographic(&mut self, width: f32, height: f32, near_z: f32, far_z: f32) {
        self.set_projection(Projection::Orthographic {
            width,
            height,
            near_z,
            far_z,
        });
    }

    pub fn set_projection(&mut self, projection: Projection) {
        self.projection = projection;
        self.projection_dirty = true;
    }

    /// Replaces the aspect ratio of a perspective projection.
    ///
    /// Orthographic projections carry explicit extents and are left alone.
    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        if let Projection::Perspective { aspect_ratio, .. } = &mut self.projection {
            *aspect_ratio = aspect;
            self.projection_dirty = true;
        }
    }

    // ── matrices ──────────────────────────────────────────────────────────

    /// Rebuilds whichever matrices are stale and clears both dirty flags.
    pub fn update_matrices(&mut self) {
        if self.view_dirty {
            self.view_matrix =
                Mat4::look_at_lh(self.position, self.position + self.forward, self.up);
            self.view_dirty = false;
        }

        if self.projection_dirty {
            self.projection_matrix = self.projection.matrix();
            self.projection_dirty = false;
        }
    }

    fn update_vectors(&mut self) {
        let (pitch, yaw, roll) = (self.rotation.x, self.rotation.y, self.rotation.z);
        // Roll, then pitch, then yaw.
        let q = Quat::from_euler(EulerRot::YXZ, yaw, pitch, roll);

        self.forward = q * Vec3::Z;
        self.right = q * Vec3::X;
        self.up = q * Vec3::Y;
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    /// Cached view matrix; stale until `update_matrices` if the view is dirty.
    pub fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    pub fn is_view_dirty(&self) -> bool {
        self.view_dirty
    }

    pub fn is_projection_dirty(&self) -> bool {
        self.projection_dirty
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
