use std::sync::Arc;

use glam::Mat4;
use winit::window::Window;

use crate::camera::Camera;
use crate::device::{GraphicsDevice, GraphicsError};
use crate::paint::Color;
use crate::render::{Mesh, RenderObject, Renderer, Texture};
use crate::time::FrameTime;
use crate::window::EngineConfig;

/// Per-callback context passed to [`Application`](super::Application).
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `GraphicsDevice<'w>`
pub struct EngineCtx<'a, 'w> {
    pub window: &'a Window,
    pub config: &'a EngineConfig,
    pub device: &'a mut GraphicsDevice<'w>,
    pub renderer: &'a mut Renderer,
    pub camera: &'a mut Camera,
    pub time: FrameTime,
}

impl<'a, 'w> EngineCtx<'a, 'w> {
    /// Back-buffer size in physical pixels.
    pub fn client_size(&self) -> (u32, u32) {
        self.device.size()
    }

    /// Starts a renderer frame using the engine camera.
    pub fn begin_frame(&mut self, clear: Color) -> Result<(), GraphicsError> {
        self.renderer
            .begin_frame(&mut *self.device, &mut *self.camera, clear)
    }

    pub fn end_frame(&mut self, vsync: bool) -> Result<(), GraphicsError> {
        self.window.pre_present_notify();
        self.renderer.end_frame(&mut *self.device, vsync)
    }

    pub fn render_object(&mut self, object: &RenderObject<'_>) {
        self.renderer.render_object(&mut *self.device, object);
    }

    pub fn render_mesh(&mut self, mesh: &Arc<Mesh>, world: Mat4, texture: Option<&Arc<Texture>>) {
        self.renderer
            .render_mesh(&mut *self.device, mesh, world, texture);
    }

    pub fn render_mesh_basic(&mut self, mesh: &Arc<Mesh>, world: Mat4) {
        self.renderer.render_mesh_basic(&mut *self.device, mesh, world);
    }
}
