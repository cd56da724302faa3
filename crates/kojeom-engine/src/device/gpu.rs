use std::sync::Arc;

use winit::window::Window;

use crate::paint::Color;
use crate::render::{Mesh, ShaderProgram, Texture, TextureData, TransformConstants};

use super::bindings::BindingLayouts;
use super::constants::ConstantArena;
use super::frame::{BoundState, FrameRecording};
use super::surface::{self, SwapchainExtent, Viewport};
use super::{GpuInit, GraphicsContext, GraphicsError, SurfaceErrorAction};

/// Owns wgpu core objects, the surface configuration and per-frame state.
///
/// This type is the low-level rendering context:
/// - creates and stores Instance/Adapter/Device/Queue
/// - creates and configures the Surface (swapchain)
/// - records draws issued through [`GraphicsContext`] and encodes them into a
///   single render pass at `end_frame`
pub struct GraphicsDevice<'w> {
    /// wgpu instance used to create the adapter and surface.
    #[allow(dead_code)]
    instance: wgpu::Instance,

    /// Surface lifetime is tied to the window; the window must outlive the device.
    surface: wgpu::Surface<'w>,

    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,

    /// Active surface configuration.
    config: wgpu::SurfaceConfiguration,

    /// Current back-buffer size; never zero.
    extent: SwapchainExtent,

    layouts: BindingLayouts,
    constants: ConstantArena,

    /// Bound to slot 0 for draws that have no texture of their own.
    fallback_texture: Arc<Texture>,

    bound: BoundState,
    frame: Option<FrameRecording>,
}

impl<'w> GraphicsDevice<'w> {
    /// Creates a device bound to `window`.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self, GraphicsError> {
        let size = window.inner_size();
        let extent = SwapchainExtent::new(size.width, size.height)?;

        // Use all backends to allow wgpu to select the optimal platform backend.
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        let info = adapter.get_info();
        log::info!("using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("kojeom-engine device"),
                required_features: init.required_features,
                required_limits: init.required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await?;

        let caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&caps, init.prefer_srgb)
            .ok_or(GraphicsError::NoSurfaceFormat)?;
        let alpha_mode = surface::choose_alpha_mode(&caps, init.alpha_mode);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: extent.width(),
            height: extent.height(),
            present_mode: init.present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };

        surface.configure(&device, &config);

        let layouts = BindingLayouts::new(&device);
        let constants = ConstantArena::new(&device, &layouts.constants);
        let fallback_texture = Arc::new(Texture::new(
            "kojeom fallback texture",
            TextureData::solid_color(1, 1, Color::WHITE)?,
        ));

        log::info!(
            "graphics device ready: {}x{} {:?}",
            extent.width(),
            extent.height(),
            format
        );

        Ok(Self {
            instance,
            surface,
            adapter,
            device,
            queue,
            config,
            extent,
            layouts,
            constants,
            fallback_texture,
            bound: BoundState::default(),
            frame: None,
        })
    }

    /// Returns the active surface format.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Returns the current back-buffer size in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.extent.width(), self.extent.height())
    }

    pub fn viewport(&self) -> Viewport {
        self.extent.viewport()
    }

    /// Whether presentation currently waits for vertical blank.
    pub fn vsync(&self) -> bool {
        self.config.present_mode != wgpu::PresentMode::AutoNoVsync
            && self.config.present_mode != wgpu::PresentMode::Immediate
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    /// Resizes the back buffers.
    ///
    /// Zero dimensions are rejected with `InvalidArgument` and leave the
    /// current configuration untouched. An in-flight frame is dropped first
    /// since the surface cannot be reconfigured while its texture is held.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), GraphicsError> {
        let extent = self.extent.resized(width, height)?;

        if self.frame.take().is_some() {
            log::debug!("resize dropped an in-flight frame");
        }

        self.config.width = extent.width();
        self.config.height = extent.height();
        self.surface.configure(&self.device, &self.config);
        self.extent = extent;

        log::debug!("swapchain resized to {width}x{height}");
        Ok(())
    }

    /// Maps an acquire failure to a recovery action and the matching error.
    fn handle_surface_error(&mut self, err: wgpu::SurfaceError) -> GraphicsError {
        let action =
            surface::map_surface_error(&self.surface, &self.device, &self.config, &err);

        match action {
            SurfaceErrorAction::Fatal => GraphicsError::SurfaceFatal(err),
            SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
                log::debug!("surface unavailable ({err}), {action:?}");
                GraphicsError::FrameSkipped
            }
        }
    }

    fn apply_vsync(&mut self, vsync: bool) {
        let mode = surface::present_mode_for(vsync);
        if self.config.present_mode == mode {
            return;
        }

        self.config.present_mode = mode;
        self.surface.configure(&self.device, &self.config);
        log::debug!("present mode switched to {mode:?}");
    }

    fn encode(&mut self, frame: &FrameRecording) -> wgpu::CommandBuffer {
        let draws = &frame.draws;

        self.constants
            .ensure_capacity(&self.device, &self.layouts.constants, draws.len());
        self.constants
            .write(&self.queue, draws.iter().map(|d| &d.constants));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("kojeom frame encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("kojeom frame pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(frame.clear.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            let vp = self.extent.viewport();
            pass.set_viewport(vp.x, vp.y, vp.width, vp.height, vp.min_depth, vp.max_depth);

            let format = self.config.format;

            for (slot, draw) in draws.iter().enumerate() {
                let Some(pipeline) = draw.program.pipeline(&self.device, format, &self.layouts)
                else {
                    continue;
                };

                let texture = draw.texture.as_ref().unwrap_or(&self.fallback_texture);
                let texture =
                    match texture.upload(&self.device, &self.queue, &self.layouts.texture) {
                        Ok(texture) => texture,
                        Err(e) => {
                            log::error!("draw of mesh `{}` skipped: {e}", draw.mesh.label());
                            continue;
                        }
                    };
                let buffers = draw.mesh.upload(&self.device);

                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, self.constants.bind_group(), &[self.constants.offset(slot)]);
                pass.set_bind_group(1, texture.bind_group(), &[]);
                pass.set_vertex_buffer(0, buffers.vertex.slice(..));

                match &buffers.index {
                    Some(index) => {
                        pass.set_index_buffer(index.slice(..), wgpu::IndexFormat::Uint32);
                        pass.draw_indexed(0..draw.mesh.index_count(), 0, 0..1);
                    }
                    None => pass.draw(0..draw.mesh.vertex_count(), 0..1),
                }
            }
        }

        encoder.finish()
    }
}

impl GraphicsContext for GraphicsDevice<'_> {
    fn begin_frame(&mut self, clear: Color) -> Result<(), GraphicsError> {
        if self.frame.take().is_some() {
            log::warn!("begin_frame called twice; the previous frame was discarded");
        }
        self.bound = BoundState::default();

        let surface_texture = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(err) => return Err(self.handle_surface_error(err)),
        };

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.frame = Some(FrameRecording {
            surface_texture,
            view,
            clear,
            draws: Vec::new(),
        });

        Ok(())
    }

    fn end_frame(&mut self, vsync: bool) -> Result<(), GraphicsError> {
        let Some(frame) = self.frame.take() else {
            return Ok(());
        };

        let commands = self.encode(&frame);
        self.queue.submit(Some(commands));

        let FrameRecording { surface_texture, .. } = frame;
        surface_texture.present();

        self.bound = BoundState::default();
        self.apply_vsync(vsync);
        Ok(())
    }

    fn bind_program(&mut self, program: &Arc<ShaderProgram>) {
        self.bound.bind_program(program);
    }

    fn unbind_program(&mut self) {
        self.bound.unbind_program();
    }

    fn bind_texture(&mut self, texture: &Arc<Texture>) {
        self.bound.bind_texture(texture);
    }

    fn unbind_texture(&mut self) {
        self.bound.unbind_texture();
    }

    fn upload_constants(&mut self, constants: &TransformConstants) {
        self.bound.set_constants(constants);
    }

    fn draw_mesh(&mut self, mesh: &Arc<Mesh>) {
        let Some(frame) = self.frame.as_mut() else {
            return;
        };

        match self.bound.capture(mesh) {
            Some(draw) => frame.draws.push(draw),
            None => log::warn!("draw of mesh `{}` skipped: no program bound", mesh.label()),
        }
    }
}
