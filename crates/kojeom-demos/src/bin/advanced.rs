//! Full scene: orbiting camera, spinning primitives, a ring of small cubes and
//! a checkerboard floor drawn with the textured shader.

use std::sync::Arc;

use glam::{Mat4, Vec3};
use kojeom_engine::{
    AppControl, Application, Color, EngineConfig, EngineCtx, GraphicsError, Mesh, RenderObject,
    ShaderProgram, Texture, run_application,
};

const CLEAR: Color = Color::new(0.1, 0.1, 0.2, 1.0);

/// Degrees per second.
const SPIN_RATE: f32 = 90.0;
const ORBIT_RATE: f32 = 30.0;

const ORBIT_RADIUS: f32 = 10.0;
const ORBIT_HEIGHT: f32 = 3.0;
const RING_CUBES: usize = 6;

struct Scene {
    triangle: Arc<Mesh>,
    cube: Arc<Mesh>,
    sphere: Arc<Mesh>,
    floor: Arc<Mesh>,
    floor_shader: Arc<ShaderProgram>,
    floor_texture: Arc<Texture>,
}

#[derive(Default)]
struct AdvancedDemo {
    scene: Option<Scene>,
    /// Both in degrees, wrapped to [0, 360).
    rotation: f32,
    camera_angle: f32,
}

impl AdvancedDemo {
    fn draw_scene(&self, scene: &Scene, ctx: &mut EngineCtx<'_, '_>) {
        let spin = self.rotation.to_radians();

        ctx.render_mesh_basic(&scene.cube, Mat4::from_rotation_y(spin));

        ctx.render_mesh_basic(
            &scene.triangle,
            Mat4::from_translation(Vec3::new(-4.0, 0.0, 0.0))
                * Mat4::from_scale(Vec3::new(2.0, 2.0, 1.0))
                * Mat4::from_rotation_z(spin),
        );

        ctx.render_mesh_basic(
            &scene.sphere,
            Mat4::from_translation(Vec3::new(4.0, 0.0, 0.0))
                * Mat4::from_scale(Vec3::splat(1.5))
                * Mat4::from_rotation_x(spin * 0.5),
        );

        for i in 0..RING_CUBES {
            let angle = (self.rotation + i as f32 * 60.0).to_radians();
            let position = Vec3::new(2.0 * angle.cos(), 3.0, 2.0 * angle.sin());
            ctx.render_mesh_basic(
                &scene.cube,
                Mat4::from_translation(position)
                    * Mat4::from_rotation_y(angle * 2.0)
                    * Mat4::from_scale(Vec3::splat(0.3)),
            );
        }

        // The quad faces -Z; tipping it forward makes it face up.
        ctx.render_object(&RenderObject {
            mesh: &scene.floor,
            shader: &scene.floor_shader,
            texture: Some(&scene.floor_texture),
            world: Mat4::from_translation(Vec3::new(0.0, -2.0, 0.0))
                * Mat4::from_rotation_x(std::f32::consts::FRAC_PI_2)
                * Mat4::from_scale(Vec3::new(10.0, 10.0, 1.0)),
        });
    }
}

impl Application for AdvancedDemo {
    fn init(&mut self, ctx: &mut EngineCtx<'_, '_>) -> anyhow::Result<()> {
        let renderer = &*ctx.renderer;
        self.scene = Some(Scene {
            triangle: renderer.create_triangle_mesh(),
            cube: renderer.create_cube_mesh(),
            sphere: renderer.create_sphere_mesh(32, 16)?,
            floor: renderer.create_quad_mesh(),
            floor_shader: Arc::new(ShaderProgram::basic_textured()?),
            floor_texture: Arc::clone(renderer.textures().checkerboard()),
        });

        ctx.camera.set_position(Vec3::new(0.0, 2.0, -8.0));
        ctx.camera.look_at(Vec3::ZERO, Vec3::Y)?;

        log::info!("advanced demo ready");
        Ok(())
    }

    fn update(&mut self, ctx: &mut EngineCtx<'_, '_>, dt: f32) -> AppControl {
        self.rotation = (self.rotation + SPIN_RATE * dt) % 360.0;
        self.camera_angle = (self.camera_angle + ORBIT_RATE * dt) % 360.0;

        let (sin, cos) = self.camera_angle.to_radians().sin_cos();
        ctx.camera
            .set_position(Vec3::new(ORBIT_RADIUS * sin, ORBIT_HEIGHT, ORBIT_RADIUS * cos));
        if let Err(e) = ctx.camera.look_at(Vec3::ZERO, Vec3::Y) {
            log::warn!("camera orbit: {e}");
        }

        AppControl::Continue
    }

    fn render(&mut self, ctx: &mut EngineCtx<'_, '_>) -> Result<(), GraphicsError> {
        ctx.begin_frame(CLEAR)?;
        if let Some(scene) = &self.scene {
            self.draw_scene(scene, ctx);
        }
        ctx.end_frame(true)
    }
}

fn main() {
    let config = EngineConfig::new("Advanced Rendering Example - KojeomEngine", 1280, 720);
    std::process::exit(run_application(config, AdvancedDemo::default()));
}
