//! Spinning triangle drawn with a shader compiled from an inline WGSL string.

use std::sync::Arc;

use glam::{Mat4, Vec3};
use kojeom_engine::render::Vertex;
use kojeom_engine::{
    AppControl, Application, EngineConfig, EngineCtx, GraphicsError, Mesh, RenderObject,
    Shader, ShaderProgram, ShaderStage, run_application,
};

const TRIANGLE_WGSL: &str = r#"
struct Transforms {
    world: mat4x4<f32>,
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> transforms: Transforms;

struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) color: vec4<f32>) -> VsOut {
    var out: VsOut;
    out.clip = transforms.projection * transforms.view * transforms.world * vec4<f32>(position, 1.0);
    out.color = color;
    return out;
}

@fragment
fn fs_main(input: VsOut) -> @location(0) vec4<f32> {
    // Slight gamma lift so the primaries read brighter on a UNORM target.
    return vec4<f32>(sqrt(input.color.rgb), input.color.a);
}
"#;

/// Radians per second around +Z.
const SPIN_SPEED: f32 = 1.0;

#[derive(Default)]
struct TriangleDemo {
    mesh: Option<Arc<Mesh>>,
    shader: Option<Arc<ShaderProgram>>,
    angle: f32,
}

fn build_program() -> Result<ShaderProgram, GraphicsError> {
    let mut program = ShaderProgram::new("triangle demo");
    program.add_shader(Shader::compile(TRIANGLE_WGSL, "vs_main", ShaderStage::Vertex)?);
    program.add_shader(Shader::compile(TRIANGLE_WGSL, "fs_main", ShaderStage::Pixel)?);
    program.create_input_layout(&Vertex::POSITION_COLOR_ATTRIBUTES)?;
    Ok(program)
}

impl Application for TriangleDemo {
    fn init(&mut self, ctx: &mut EngineCtx<'_, '_>) -> anyhow::Result<()> {
        self.mesh = Some(ctx.renderer.create_triangle_mesh());
        self.shader = Some(Arc::new(build_program()?));

        ctx.camera.set_position(Vec3::new(0.0, 0.0, -3.0));
        ctx.camera.look_at(Vec3::ZERO, Vec3::Y)?;

        log::info!("triangle demo ready");
        Ok(())
    }

    fn update(&mut self, _ctx: &mut EngineCtx<'_, '_>, dt: f32) -> AppControl {
        self.angle = (self.angle + SPIN_SPEED * dt) % std::f32::consts::TAU;
        AppControl::Continue
    }

    fn render(&mut self, ctx: &mut EngineCtx<'_, '_>) -> Result<(), GraphicsError> {
        ctx.begin_frame(ctx.config.clear_color)?;

        if let (Some(mesh), Some(shader)) = (&self.mesh, &self.shader) {
            ctx.render_object(&RenderObject {
                mesh,
                shader,
                texture: None,
                world: Mat4::from_rotation_z(self.angle),
            });
        }

        ctx.end_frame(ctx.config.vsync)
    }
}

fn main() {
    let config = EngineConfig::default().with_title("KojeomEngine - Triangle");
    std::process::exit(run_application(config, TriangleDemo::default()));
}
