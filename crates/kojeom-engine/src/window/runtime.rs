use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::camera::Camera;
use crate::core::{AppControl, Application, EngineCtx};
use crate::device::{GraphicsDevice, GraphicsError};
use crate::logging::{LoggingConfig, init_logging};
use crate::render::Renderer;
use crate::time::{FrameClock, FrameStats, FrameTime};

use super::EngineConfig;

/// Exit code reported when the engine never finished initializing.
pub const EXIT_FAILURE: i32 = -1;

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    device: GraphicsDevice<'this>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum EngineState {
    Constructed,
    Running,
    Stopped,
}

/// What a single loop iteration asked for.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum FrameOutcome {
    Presented,
    Skipped,
    Exit,
}

/// Top-level runtime: owns the window, graphics device, renderer and camera
/// and drives an [`Application`] once per loop iteration.
///
/// Subsystems are created on the first `resumed` event and torn down in
/// reverse order by [`Engine::shutdown`].
pub struct Engine<A: Application> {
    config: EngineConfig,
    app: A,
    state: EngineState,

    entry: Option<WindowEntry>,
    renderer: Option<Renderer>,
    camera: Option<Camera>,

    clock: FrameClock,
    stats: FrameStats,
    exit_code: i32,
}

impl<A: Application> Engine<A> {
    pub fn new(config: EngineConfig, app: A) -> Self {
        Self {
            config,
            app,
            state: EngineState::Constructed,
            entry: None,
            renderer: None,
            camera: None,
            clock: FrameClock::new(),
            stats: FrameStats::new(),
            exit_code: 0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn app(&self) -> &A {
        &self.app
    }

    /// Runs the event loop until the application quits.
    ///
    /// Returns [`EXIT_FAILURE`] if initialization failed or never happened.
    pub fn run(mut self) -> Result<i32> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;

        event_loop
            .run_app(&mut self)
            .context("winit event loop terminated with error")?;

        self.shutdown();

        if self.state == EngineState::Constructed {
            return Ok(EXIT_FAILURE);
        }
        Ok(self.exit_code)
    }

    /// Releases renderer, camera, then device and window. Safe to call
    /// repeatedly.
    pub fn shutdown(&mut self) {
        if self.renderer.is_none() && self.camera.is_none() && self.entry.is_none() {
            return;
        }

        log::info!("engine shutting down");
        self.renderer = None;
        self.camera = None;
        self.entry = None;
    }

    /// Window → device → renderer → camera → application, stopping at the
    /// first failure.
    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.as_str())
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.config.gpu.clone();
        let mut entry = WindowEntryTryBuilder {
            window,
            device_builder: |w| pollster::block_on(GraphicsDevice::new(w, gpu_init)),
        }
        .try_build()
        .context("failed to initialize graphics device")?;

        let mut renderer = Renderer::new().context("failed to initialize renderer")?;

        let (width, height) = entry.with_device(|device| device.size());
        let mut camera = Camera::new();
        camera.set_perspective(
            self.config.fov_y,
            width as f32 / height as f32,
            self.config.near_z,
            self.config.far_z,
        );

        let (app, config) = (&mut self.app, &self.config);
        entry
            .with_mut(|fields| {
                let mut ctx = EngineCtx {
                    window: fields.window,
                    config,
                    device: fields.device,
                    renderer: &mut renderer,
                    camera: &mut camera,
                    time: FrameTime::zero(),
                };
                app.init(&mut ctx)
            })
            .context("application init failed")?;

        self.entry = Some(entry);
        self.renderer = Some(renderer);
        self.camera = Some(camera);
        Ok(())
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.state = EngineState::Stopped;
        event_loop.exit();
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        let Some(aspect) = resize_aspect(width, height) else {
            return;
        };
        let (Some(entry), Some(camera)) = (self.entry.as_mut(), self.camera.as_mut()) else {
            return;
        };

        match entry.with_device_mut(|device| device.resize(width, height)) {
            Ok(()) => camera.set_aspect_ratio(aspect),
            Err(e) => log::warn!("resize to {width}x{height} failed: {e:#}"),
        }
    }

    /// Timer tick, update, render, frame statistics.
    fn run_frame(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(entry), Some(renderer), Some(camera)) = (
            self.entry.as_mut(),
            self.renderer.as_mut(),
            self.camera.as_mut(),
        ) else {
            return;
        };

        let time = self.clock.tick();
        let (app, config) = (&mut self.app, &self.config);

        let outcome = entry.with_mut(|fields| {
            let mut ctx = EngineCtx {
                window: fields.window,
                config,
                device: fields.device,
                renderer,
                camera,
                time,
            };

            if app.update(&mut ctx, time.dt) == AppControl::Exit {
                return FrameOutcome::Exit;
            }
            classify_render_result(app.render(&mut ctx))
        });

        if outcome == FrameOutcome::Exit {
            self.request_exit(event_loop);
            return;
        }

        if let Some(fps) = self.stats.record(time.dt) {
            let title = fps_title(&self.config.title, fps);
            entry.with_window(|w| w.set_title(&title));
        }
    }
}

impl<A: Application> ApplicationHandler for Engine<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state != EngineState::Constructed {
            return;
        }

        match self.initialize(event_loop) {
            Ok(()) => {
                log::info!("engine initialized");
                self.state = EngineState::Running;
                self.clock.reset();
            }
            Err(e) => {
                log::error!("engine initialization failed: {e:#}");
                self.exit_code = EXIT_FAILURE;
                self.shutdown();
                self.request_exit(event_loop);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.state != EngineState::Running {
            return;
        }
        let Some(entry) = self.entry.as_ref() else {
            return;
        };
        if entry.with_window(|w| w.id()) != window_id {
            return;
        }

        if self.app.on_window_event(&event) == AppControl::Exit {
            self.request_exit(event_loop);
            return;
        }

        match event {
            WindowEvent::CloseRequested => self.request_exit(event_loop),

            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape) =>
            {
                self.request_exit(event_loop);
            }

            WindowEvent::Resized(size) => self.on_resize(size.width, size.height),

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        match self.state {
            EngineState::Running => {
                event_loop.set_control_flow(ControlFlow::Poll);
                self.run_frame(event_loop);
            }
            EngineState::Stopped => event_loop.exit(),
            EngineState::Constructed => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}

impl<A: Application> Drop for Engine<A> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Builds an [`Engine`] for `app`, runs it and returns the process exit code.
pub fn run_application<A: Application>(config: EngineConfig, app: A) -> i32 {
    init_logging(LoggingConfig::default());

    let title = config.title.clone();
    log::info!("=== {title} starting ===");

    let code = match Engine::new(config, app).run() {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e:#}");
            EXIT_FAILURE
        }
    };

    log::info!("=== {title} exited with code {code} ===");
    code
}

/// Aspect ratio for a new client size, `None` while minimized.
fn resize_aspect(width: u32, height: u32) -> Option<f32> {
    (width != 0 && height != 0).then(|| width as f32 / height as f32)
}

/// Whole frames per second, truncated.
fn fps_title(title: &str, fps: f32) -> String {
    format!("{title} - FPS: {}", fps as i32)
}

fn classify_render_result(result: Result<(), GraphicsError>) -> FrameOutcome {
    match result {
        Ok(()) => FrameOutcome::Presented,
        Err(GraphicsError::FrameSkipped) => {
            log::debug!("frame skipped");
            FrameOutcome::Skipped
        }
        Err(e @ GraphicsError::SurfaceFatal(_)) => {
            log::error!("{e:#}");
            FrameOutcome::Exit
        }
        Err(e) => {
            log::warn!("render failed: {e:#}");
            FrameOutcome::Skipped
        }
    }
}
