//! Kojeom engine crate.
//!
//! A small real-time 3D renderer: a window-owning runtime, a wgpu-backed
//! graphics device, a dirty-flag camera and shared mesh/shader/texture
//! resources drawn through a per-object renderer.

pub mod camera;
pub mod core;
pub mod device;
pub mod logging;
pub mod paint;
pub mod render;
pub mod time;
pub mod window;

pub use crate::camera::{Camera, Projection};
pub use crate::core::{AppControl, Application, EngineCtx};
pub use crate::device::{GraphicsContext, GraphicsDevice, GraphicsError};
pub use crate::paint::Color;
pub use crate::render::{Mesh, RenderObject, Renderer, Shader, ShaderProgram, ShaderStage, Texture};
pub use crate::window::{Engine, EngineConfig, run_application};
