//! Smallest possible application: clears the back buffer every frame.

use kojeom_engine::{
    AppControl, Application, Color, EngineConfig, EngineCtx, GraphicsContext, GraphicsError,
    run_application,
};

const CLEAR: Color = Color::new(0.0, 0.3, 0.6, 1.0);

struct BasicDemo;

impl Application for BasicDemo {
    fn update(&mut self, _ctx: &mut EngineCtx<'_, '_>, _dt: f32) -> AppControl {
        AppControl::Continue
    }

    /// Goes straight to the device; no renderer frame is opened.
    fn render(&mut self, ctx: &mut EngineCtx<'_, '_>) -> Result<(), GraphicsError> {
        ctx.device.begin_frame(CLEAR)?;
        ctx.window.pre_present_notify();
        ctx.device.end_frame(ctx.config.vsync)
    }
}

fn main() {
    let config = EngineConfig::default().with_title("KojeomEngine - Basic");
    std::process::exit(run_application(config, BasicDemo));
}
