use std::sync::Arc;

use glam::Mat4;

use crate::camera::Camera;
use crate::device::{GraphicsContext, GraphicsError};
use crate::paint::Color;

use super::{Mesh, ShaderProgram, Texture, TextureManager};

/// Clear color used when callers have no preference.
pub const DEFAULT_CLEAR_COLOR: Color = Color::CORNFLOWER_BLUE;

/// Everything needed for one draw, borrowed for the duration of the call.
#[derive(Debug, Clone, Copy)]
pub struct RenderObject<'a> {
    pub mesh: &'a Arc<Mesh>,
    pub shader: &'a Arc<ShaderProgram>,
    pub texture: Option<&'a Arc<Texture>>,
    pub world: Mat4,
}

#[derive(Debug, Clone, Copy)]
enum FrameState {
    Idle,
    /// Camera matrices captured at `begin_frame`.
    InFrame { view: Mat4, projection: Mat4 },
}

/// Turns render objects into context calls.
///
/// Draws are only issued between [`Renderer::begin_frame`] and
/// [`Renderer::end_frame`]; outside that window they are ignored.
pub struct Renderer {
    basic_shader: Arc<ShaderProgram>,
    textures: TextureManager,
    frame: FrameState,
}

impl Renderer {
    pub fn new() -> Result<Self, GraphicsError> {
        let basic_shader = Arc::new(ShaderProgram::basic_color()?);
        let textures = TextureManager::new()?;

        log::info!("renderer initialized");

        Ok(Self {
            basic_shader,
            textures,
            frame: FrameState::Idle,
        })
    }

    pub fn basic_shader(&self) -> &Arc<ShaderProgram> {
        &self.basic_shader
    }

    pub fn textures(&self) -> &TextureManager {
        &self.textures
    }

    pub fn textures_mut(&mut self) -> &mut TextureManager {
        &mut self.textures
    }

    pub fn is_in_frame(&self) -> bool {
        matches!(self.frame, FrameState::InFrame { .. })
    }

    /// Refreshes the camera matrices once, then starts a device frame.
    ///
    /// The renderer stays idle if the device cannot start a frame.
    pub fn begin_frame<C>(
        &mut self,
        ctx: &mut C,
        camera: &mut Camera,
        clear: Color,
    ) -> Result<(), GraphicsError>
    where
        C: GraphicsContext + ?Sized,
    {
        camera.update_matrices();

        self.frame = FrameState::Idle;
        ctx.begin_frame(clear)?;

        self.frame = FrameState::InFrame {
            view: camera.view_matrix(),
            projection: camera.projection_matrix(),
        };
        Ok(())
    }

    /// Presents the frame. Does nothing when no frame is open.
    pub fn end_frame<C>(&mut self, ctx: &mut C, vsync: bool) -> Result<(), GraphicsError>
    where
        C: GraphicsContext + ?Sized,
    {
        if !self.is_in_frame() {
            return Ok(());
        }

        self.frame = FrameState::Idle;
        ctx.end_frame(vsync)
    }

    /// Binds shader and texture, uploads transforms, draws, then unbinds in
    /// reverse order.
    pub fn render_object<C>(&self, ctx: &mut C, object: &RenderObject<'_>)
    where
        C: GraphicsContext + ?Sized,
    {
        let FrameState::InFrame { view, projection } = self.frame else {
            return;
        };

        object.shader.bind(ctx);
        if let Some(texture) = object.texture {
            texture.bind(ctx);
        }

        object
            .mesh
            .update_constants(ctx, &object.world, &view, &projection);
        object.mesh.render(ctx);

        if let Some(texture) = object.texture {
            texture.unbind(ctx);
        }
        object.shader.unbind(ctx);
    }

    /// Draws `mesh` with the built-in color shader and an optional texture.
    pub fn render_mesh<C>(
        &self,
        ctx: &mut C,
        mesh: &Arc<Mesh>,
        world: Mat4,
        texture: Option<&Arc<Texture>>,
    ) where
        C: GraphicsContext + ?Sized,
    {
        self.render_object(
            ctx,
            &RenderObject {
                mesh,
                shader: &self.basic_shader,
                texture,
                world,
            },
        );
    }

    pub fn render_mesh_basic<C>(&self, ctx: &mut C, mesh: &Arc<Mesh>, world: Mat4)
    where
        C: GraphicsContext + ?Sized,
    {
        self.render_mesh(ctx, mesh, world, None);
    }

    // ── mesh factories ────────────────────────────────────────────────────

    pub fn create_triangle_mesh(&self) -> Arc<Mesh> {
        Arc::new(Mesh::triangle())
    }

    pub fn create_quad_mesh(&self) -> Arc<Mesh> {
        Arc::new(Mesh::quad())
    }

    pub fn create_cube_mesh(&self) -> Arc<Mesh> {
        Arc::new(Mesh::cube())
    }

    pub fn create_sphere_mesh(&self, slices: u32, stacks: u32) -> Result<Arc<Mesh>, GraphicsError> {
        Mesh::sphere(slices, stacks).map(Arc::new)
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        log::info!("renderer released ({} cached textures)", self.textures.cached_count());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::recording::{Call, RecordingContext};
    use glam::Vec3;

    fn setup() -> (Renderer, Camera, RecordingContext, Arc<Mesh>) {
        (
            Renderer::new().unwrap(),
            Camera::new(),
            RecordingContext::default(),
            Arc::new(Mesh::cube()),
        )
    }

    // ── frame guard ───────────────────────────────────────────────────────

    #[test]
    fn render_before_begin_frame_draws_nothing() {
        let (renderer, _, mut ctx, mesh) = setup();
        renderer.render_mesh_basic(&mut ctx, &mesh, Mat4::IDENTITY);
        assert_eq!(ctx.draw_count(), 0);
        assert!(ctx.calls.is_empty());
    }

    #[test]
    fn render_after_end_frame_draws_nothing() {
        let (mut renderer, mut camera, mut ctx, mesh) = setup();
        renderer.begin_frame(&mut ctx, &mut camera, DEFAULT_CLEAR_COLOR).unwrap();
        renderer.render_mesh_basic(&mut ctx, &mesh, Mat4::IDENTITY);
        renderer.end_frame(&mut ctx, true).unwrap();
        renderer.render_mesh_basic(&mut ctx, &mesh, Mat4::IDENTITY);

        assert_eq!(ctx.draw_count(), 1);
        assert_eq!(ctx.calls.last(), Some(&Call::EndFrame(true)));
    }

    #[test]
    fn failed_begin_keeps_renderer_idle() {
        let (mut renderer, mut camera, mut ctx, mesh) = setup();
        ctx.fail_begin = true;

        assert!(renderer.begin_frame(&mut ctx, &mut camera, Color::BLACK).is_err());
        assert!(!renderer.is_in_frame());
        renderer.render_mesh_basic(&mut ctx, &mesh, Mat4::IDENTITY);
        assert_eq!(ctx.draw_count(), 0);
    }

    #[test]
    fn end_frame_without_begin_is_noop() {
        let (mut renderer, _, mut ctx, _) = setup();
        renderer.end_frame(&mut ctx, false).unwrap();
        assert!(ctx.calls.is_empty());
    }

    // ── call order ────────────────────────────────────────────────────────

    #[test]
    fn render_object_follows_strict_order() {
        let (mut renderer, mut camera, mut ctx, mesh) = setup();
        let texture = Arc::clone(renderer.textures().checkerboard());

        renderer.begin_frame(&mut ctx, &mut camera, Color::BLACK).unwrap();
        renderer.render_mesh(&mut ctx, &mesh, Mat4::IDENTITY, Some(&texture));

        let kinds: Vec<&str> = ctx.calls[1..]
            .iter()
            .map(|c| match c {
                Call::BindProgram(_) => "bind_program",
                Call::BindTexture(_) => "bind_texture",
                Call::UploadConstants(_) => "upload",
                Call::Draw(_) => "draw",
                Call::UnbindTexture => "unbind_texture",
                Call::UnbindProgram => "unbind_program",
                Call::BeginFrame(_) | Call::EndFrame(_) => "frame",
            })
            .collect();

        assert_eq!(
            kinds,
            [
                "bind_program",
                "bind_texture",
                "upload",
                "draw",
                "unbind_texture",
                "unbind_program"
            ]
        );
    }

    #[test]
    fn untextured_draw_skips_texture_binding() {
        let (mut renderer, mut camera, mut ctx, mesh) = setup();
        renderer.begin_frame(&mut ctx, &mut camera, Color::BLACK).unwrap();
        renderer.render_mesh_basic(&mut ctx, &mesh, Mat4::IDENTITY);

        assert!(!ctx
            .calls
            .iter()
            .any(|c| matches!(c, Call::BindTexture(_) | Call::UnbindTexture)));
        assert_eq!(ctx.calls[1], Call::BindProgram("basic color".to_string()));
    }

    #[test]
    fn custom_shader_is_used_by_render_object() {
        let (mut renderer, mut camera, mut ctx, mesh) = setup();
        let textured = Arc::new(ShaderProgram::basic_textured().unwrap());

        renderer.begin_frame(&mut ctx, &mut camera, Color::BLACK).unwrap();
        renderer.render_object(
            &mut ctx,
            &RenderObject {
                mesh: &mesh,
                shader: &textured,
                texture: None,
                world: Mat4::IDENTITY,
            },
        );

        assert_eq!(ctx.calls[1], Call::BindProgram("basic textured".to_string()));
    }

    // ── camera ────────────────────────────────────────────────────────────

    #[test]
    fn begin_frame_refreshes_camera_and_uses_its_matrices() {
        let (mut renderer, mut camera, mut ctx, mesh) = setup();
        camera.set_position(Vec3::new(0.0, 0.0, -5.0));
        let world = Mat4::from_translation(Vec3::X);

        renderer.begin_frame(&mut ctx, &mut camera, Color::BLACK).unwrap();
        assert!(!camera.is_view_dirty());
        assert!(!camera.is_projection_dirty());

        renderer.render_mesh_basic(&mut ctx, &mesh, world);

        let expected = crate::render::TransformConstants::new(
            &world,
            &camera.view_matrix(),
            &camera.projection_matrix(),
        );
        assert!(ctx.calls.contains(&Call::UploadConstants(expected)));
    }

    #[test]
    fn camera_changes_mid_frame_do_not_affect_draws() {
        let (mut renderer, mut camera, mut ctx, mesh) = setup();
        renderer.begin_frame(&mut ctx, &mut camera, Color::BLACK).unwrap();
        let view = camera.view_matrix();

        camera.set_position(Vec3::splat(9.0));
        camera.update_matrices();
        renderer.render_mesh_basic(&mut ctx, &mesh, Mat4::IDENTITY);

        let block = ctx
            .calls
            .iter()
            .find_map(|c| match c {
                Call::UploadConstants(b) => Some(*b),
                _ => None,
            })
            .unwrap();
        assert_eq!(block.view, view.to_cols_array_2d());
    }

    #[test]
    fn clear_color_is_forwarded() {
        let (mut renderer, mut camera, mut ctx, _) = setup();
        renderer.begin_frame(&mut ctx, &mut camera, DEFAULT_CLEAR_COLOR).unwrap();
        assert_eq!(ctx.calls[0], Call::BeginFrame(Color::CORNFLOWER_BLUE));
    }

    // ── factories ─────────────────────────────────────────────────────────

    #[test]
    fn factories_build_shareable_meshes() {
        let renderer = Renderer::new().unwrap();
        assert_eq!(renderer.create_triangle_mesh().vertex_count(), 3);
        assert_eq!(renderer.create_quad_mesh().index_count(), 6);
        assert_eq!(renderer.create_cube_mesh().index_count(), 36);
        assert_eq!(renderer.create_sphere_mesh(4, 2).unwrap().vertex_count(), 15);
        assert!(renderer.create_sphere_mesh(1, 1).is_err());
    }
}
