//! Rendering primitives and the per-object draw path.
//!
//! Resources (meshes, shader programs, textures) hold CPU-side data and
//! create their GPU objects lazily the first time a device draws them. All
//! draw traffic goes through [`GraphicsContext`](crate::device::GraphicsContext).

mod constants;
mod mesh;
mod renderer;
mod shader;
mod texture;
mod vertex;

pub use constants::TransformConstants;
pub use mesh::{DEFAULT_SPHERE_SLICES, DEFAULT_SPHERE_STACKS, Mesh};
pub use renderer::{DEFAULT_CLEAR_COLOR, RenderObject, Renderer};
pub use shader::{Shader, ShaderProgram, ShaderStage, VertexInput};
pub use texture::{Texture, TextureData, TextureManager};
pub use vertex::Vertex;
