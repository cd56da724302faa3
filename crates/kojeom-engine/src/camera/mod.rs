//! Camera: transform state, projection choice and cached view/projection
//! matrices.
//!
//! Coordinates are left-handed (+X right, +Y up, +Z into the screen) with
//! rotations given as pitch (X), yaw (Y), roll (Z) in radians.

mod camera;
mod projection;

pub use camera::{Camera, CameraError, PITCH_LIMIT};
pub use projection::Projection;
