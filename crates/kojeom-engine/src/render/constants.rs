use bytemuck::{Pod, Zeroable};
use glam::Mat4;

const IDENTITY_COLS: [[f32; 4]; 4] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Per-draw transform block consumed by the vertex stage.
///
/// Matrices are stored column-major, which is what WGSL `mat4x4<f32>`
/// expects; `Mat4::to_cols_array_2d` performs the layout change.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct TransformConstants {
    pub world: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

impl TransformConstants {
    pub const SIZE: u64 = std::mem::size_of::<TransformConstants>() as u64;

    pub const IDENTITY: Self = Self {
        world: IDENTITY_COLS,
        view: IDENTITY_COLS,
        projection: IDENTITY_COLS,
    };

    pub fn new(world: &Mat4, view: &Mat4, projection: &Mat4) -> Self {
        Self {
            world: world.to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
        }
    }
}

impl Default for TransformConstants {
    fn default() -> Self {
        Self::IDENTITY
    }
}
