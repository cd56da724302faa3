use std::sync::Arc;

use crate::paint::Color;
use crate::render::{Mesh, ShaderProgram, Texture, TransformConstants};

/// One acquired surface frame plus the draws recorded against it.
///
/// Holding the surface texture prevents acquisition of subsequent frames, so
/// this lives only between `begin_frame` and `end_frame`.
pub(crate) struct FrameRecording {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub clear: Color,
    pub draws: Vec<PendingDraw>,
}

/// A draw captured with the bindings that were current when it was issued.
pub(crate) struct PendingDraw {
    pub program: Arc<ShaderProgram>,
    pub texture: Option<Arc<Texture>>,
    pub mesh: Arc<Mesh>,
    pub constants: TransformConstants,
}

/// Bindings set through the context since the last frame start.
#[derive(Default)]
pub(crate) struct BoundState {
    program: Option<Arc<ShaderProgram>>,
    texture: Option<Arc<Texture>>,
    constants: TransformConstants,
}

impl BoundState {
    pub fn bind_program(&mut self, program: &Arc<ShaderProgram>) {
        self.program = Some(Arc::clone(program));
    }

    pub fn unbind_program(&mut self) {
        self.program = None;
    }

    pub fn bind_texture(&mut self, texture: &Arc<Texture>) {
        self.texture = Some(Arc::clone(texture));
    }

    pub fn unbind_texture(&mut self) {
        self.texture = None;
    }

    pub fn set_constants(&mut self, constants: &TransformConstants) {
        self.constants = *constants;
    }

    /// Snapshot of the current bindings for `mesh`; `None` without a program.
    pub fn capture(&self, mesh: &Arc<Mesh>) -> Option<PendingDraw> {
        let program = self.program.as_ref()?;
        Some(PendingDraw {
            program: Arc::clone(program),
            texture: self.texture.clone(),
            mesh: Arc::clone(mesh),
            constants: self.constants,
        })
    }
}
