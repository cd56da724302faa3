//! Static geometry: CPU vertex/index data with lazily created GPU buffers.

mod primitives;

use std::sync::{Arc, OnceLock};

use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::device::{GraphicsContext, GraphicsError};

use super::{TransformConstants, Vertex};

pub use primitives::{DEFAULT_SPHERE_SLICES, DEFAULT_SPHERE_STACKS};

/// One piece of immutable geometry drawn as a triangle list.
///
/// Vertex and index data are fixed at construction. The GPU copies are
/// created on first use and never written again.
pub struct Mesh {
    label: String,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    gpu: OnceLock<MeshBuffers>,
}

pub(crate) struct MeshBuffers {
    pub vertex: wgpu::Buffer,
    /// Present only for indexed meshes.
    pub index: Option<wgpu::Buffer>,
}

impl Mesh {
    /// Builds a mesh; an empty `indices` list means non-indexed drawing.
    pub fn new(
        label: impl Into<String>,
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
    ) -> Result<Self, GraphicsError> {
        let label = label.into();

        if vertices.is_empty() {
            return Err(GraphicsError::invalid(format!("mesh `{label}` has no vertices")));
        }
        let count = vertices.len();
        if let Some(bad) = indices.iter().find(|&&i| i as usize >= count) {
            return Err(GraphicsError::invalid(format!(
                "mesh `{label}` index {bad} out of range for {count} vertices"
            )));
        }

        Ok(Self::from_parts(label, vertices, indices))
    }

    pub(crate) fn from_parts(label: String, vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self {
            label,
            vertices,
            indices,
            gpu: OnceLock::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn is_indexed(&self) -> bool {
        !self.indices.is_empty()
    }

    /// Sets the per-draw transform block for the next draw.
    pub fn update_constants<C>(&self, ctx: &mut C, world: &Mat4, view: &Mat4, projection: &Mat4)
    where
        C: GraphicsContext + ?Sized,
    {
        ctx.upload_constants(&TransformConstants::new(world, view, projection));
    }

    /// Issues the draw with whatever program/texture is currently bound.
    pub fn render<C>(self: &Arc<Self>, ctx: &mut C)
    where
        C: GraphicsContext + ?Sized,
    {
        ctx.draw_mesh(self);
    }

    /// Creates the GPU buffers once and returns them.
    pub(crate) fn upload(&self, device: &wgpu::Device) -> &MeshBuffers {
        self.gpu.get_or_init(|| {
            log::debug!(
                "uploading mesh `{}` ({} vertices, {} indices)",
                self.label,
                self.vertices.len(),
                self.indices.len()
            );

            let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} vbo", self.label)),
                contents: bytemuck::cast_slice(&self.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

            let index = self.is_indexed().then(|| {
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{} ibo", self.label)),
                    contents: bytemuck::cast_slice(&self.indices),
                    usage: wgpu::BufferUsages::INDEX,
                })
            });

            MeshBuffers { vertex, index }
        })
    }

    /// Whether GPU buffers exist yet.
    pub fn is_uploaded(&self) -> bool {
        self.gpu.get().is_some()
    }
}

impl std::fmt::Debug for Mesh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mesh")
            .field("label", &self.label)
            .field("vertices", &self.vertices.len())
            .field("indices", &self.indices.len())
            .field("uploaded", &self.is_uploaded())
            .finish()
    }
}
