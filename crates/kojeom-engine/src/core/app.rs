use winit::event::WindowEvent;

use crate::device::GraphicsError;

use super::ctx::EngineCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract driven by [`Engine`](crate::window::Engine).
pub trait Application {
    /// Called once after the window, device, renderer and camera exist.
    ///
    /// An error aborts startup.
    fn init(&mut self, ctx: &mut EngineCtx<'_, '_>) -> anyhow::Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Called for window events before the engine handles them.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Advances simulation state by `dt` seconds.
    fn update(&mut self, ctx: &mut EngineCtx<'_, '_>, dt: f32) -> AppControl;

    /// Draws one frame. The default clears to the configured color.
    fn render(&mut self, ctx: &mut EngineCtx<'_, '_>) -> Result<(), GraphicsError> {
        ctx.begin_frame(ctx.config.clear_color)?;
        ctx.end_frame(ctx.config.vsync)
    }
}
