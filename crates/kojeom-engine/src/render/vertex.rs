use bytemuck::{Pod, Zeroable};

use crate::paint::Color;

/// Interleaved vertex shared by every mesh.
///
/// Layout (bytes): position 0, color 12, normal 28, tex_coord 40; stride 48.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
    pub normal: [f32; 3],
    pub tex_coord: [f32; 2],
}

impl Vertex {
    pub const STRIDE: u64 = std::mem::size_of::<Vertex>() as u64;

    pub const POSITION_OFFSET: u64 = 0;
    pub const COLOR_OFFSET: u64 = 12;
    pub const NORMAL_OFFSET: u64 = 28;
    pub const TEX_COORD_OFFSET: u64 = 40;

    /// Position at location 0, color at location 1.
    pub const POSITION_COLOR_ATTRIBUTES: [wgpu::VertexAttribute; 2] = [
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x3,
            offset: Self::POSITION_OFFSET,
            shader_location: 0,
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x4,
            offset: Self::COLOR_OFFSET,
            shader_location: 1,
        },
    ];

    /// Position and color as above, UV at location 2.
    pub const TEXTURED_ATTRIBUTES: [wgpu::VertexAttribute; 3] = [
        Self::POSITION_COLOR_ATTRIBUTES[0],
        Self::POSITION_COLOR_ATTRIBUTES[1],
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x2,
            offset: Self::TEX_COORD_OFFSET,
            shader_location: 2,
        },
    ];

    /// Vertex with an up-facing normal and zero UV.
    pub fn new(position: [f32; 3], color: Color) -> Self {
        Self {
            position,
            color: color.to_array(),
            normal: [0.0, 1.0, 0.0],
            tex_coord: [0.0, 0.0],
        }
    }

    pub fn with_tex_coord(mut self, u: f32, v: f32) -> Self {
        self.tex_coord = [u, v];
        self
    }

    pub fn with_normal(mut self, normal: [f32; 3]) -> Self {
        self.normal = normal;
        self
    }
}

impl Default for Vertex {
    fn default() -> Self {
        Self::new([0.0; 3], Color::WHITE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_and_offsets_match_field_layout() {
        assert_eq!(Vertex::STRIDE, 48);
        assert_eq!(std::mem::offset_of!(Vertex, color) as u64, Vertex::COLOR_OFFSET);
        assert_eq!(std::mem::offset_of!(Vertex, normal) as u64, Vertex::NORMAL_OFFSET);
        assert_eq!(
            std::mem::offset_of!(Vertex, tex_coord) as u64,
            Vertex::TEX_COORD_OFFSET
        );
    }

    #[test]
    fn attribute_sets_use_field_offsets() {
        let [pos, color] = Vertex::POSITION_COLOR_ATTRIBUTES;
        assert_eq!((pos.offset, pos.shader_location), (0, 0));
        assert_eq!((color.offset, color.shader_location), (12, 1));

        let uv = Vertex::TEXTURED_ATTRIBUTES[2];
        assert_eq!(uv.offset, Vertex::TEX_COORD_OFFSET);
        assert_eq!(uv.format, wgpu::VertexFormat::Float32x2);
    }

    #[test]
    fn default_is_white_facing_up() {
        let v = Vertex::default();
        assert_eq!(v.color, [1.0; 4]);
        assert_eq!(v.normal, [0.0, 1.0, 0.0]);
        assert_eq!(v.tex_coord, [0.0, 0.0]);
    }
}
