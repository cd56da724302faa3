use std::sync::Arc;

use crate::paint::Color;
use crate::render::{Mesh, ShaderProgram, Texture, TransformConstants};

use super::GraphicsError;

/// Immediate-style command surface used by meshes, shaders, textures and the
/// renderer.
///
/// Calls between `begin_frame` and `end_frame` describe one frame; bindings
/// persist until unbound or until the next frame starts.
pub trait GraphicsContext {
    /// Starts a frame that will be cleared to `clear`.
    fn begin_frame(&mut self, clear: Color) -> Result<(), GraphicsError>;

    /// Finishes and presents the current frame. No-op without a frame.
    fn end_frame(&mut self, vsync: bool) -> Result<(), GraphicsError>;

    fn bind_program(&mut self, program: &Arc<ShaderProgram>);
    fn unbind_program(&mut self);

    /// Binds `texture` to slot 0.
    fn bind_texture(&mut self, texture: &Arc<Texture>);
    fn unbind_texture(&mut self);

    /// Sets the transform block used by subsequent draws.
    fn upload_constants(&mut self, constants: &TransformConstants);

    /// Draws `mesh` with the current bindings.
    fn draw_mesh(&mut self, mesh: &Arc<Mesh>);
}

/// Call recorder standing in for the GPU in unit tests.
#[cfg(test)]
pub(crate) mod recording {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum Call {
        BeginFrame(Color),
        EndFrame(bool),
        BindProgram(String),
        UnbindProgram,
        BindTexture(String),
        UnbindTexture,
        UploadConstants(TransformConstants),
        Draw(String),
    }

    #[derive(Debug, Default)]
    pub(crate) struct RecordingContext {
        pub calls: Vec<Call>,
        pub fail_begin: bool,
    }

    impl RecordingContext {
        pub fn draw_count(&self) -> usize {
            self.calls
                .iter()
                .filter(|c| matches!(c, Call::Draw(_)))
                .count()
        }
    }

    impl GraphicsContext for RecordingContext {
        fn begin_frame(&mut self, clear: Color) -> Result<(), GraphicsError> {
            if self.fail_begin {
                return Err(GraphicsError::FrameSkipped);
            }
            self.calls.push(Call::BeginFrame(clear));
            Ok(())
        }

        fn end_frame(&mut self, vsync: bool) -> Result<(), GraphicsError> {
            self.calls.push(Call::EndFrame(vsync));
            Ok(())
        }

        fn bind_program(&mut self, program: &Arc<ShaderProgram>) {
            self.calls.push(Call::BindProgram(program.label().to_string()));
        }

        fn unbind_program(&mut self) {
            self.calls.push(Call::UnbindProgram);
        }

        fn bind_texture(&mut self, texture: &Arc<Texture>) {
            self.calls.push(Call::BindTexture(texture.label().to_string()));
        }

        fn unbind_texture(&mut self) {
            self.calls.push(Call::UnbindTexture);
        }

        fn upload_constants(&mut self, constants: &TransformConstants) {
            self.calls.push(Call::UploadConstants(*constants));
        }

        fn draw_mesh(&mut self, mesh: &Arc<Mesh>) {
            self.calls.push(Call::Draw(mesh.label().to_string()));
        }
    }
}
