use std::f32::consts::{FRAC_PI_2, PI, TAU};

use crate::device::GraphicsError;
use crate::paint::Color;
use crate::render::Vertex;

use super::Mesh;

pub const DEFAULT_SPHERE_SLICES: u32 = 16;
pub const DEFAULT_SPHERE_STACKS: u32 = 16;

const CUBE_INDICES: [u32; 36] = [
    3, 1, 0, 2, 1, 3, // top
    0, 5, 4, 1, 5, 0, // front
    3, 4, 7, 0, 4, 3, // left
    1, 6, 5, 2, 6, 1, // right
    2, 7, 6, 3, 7, 2, // back
    6, 4, 5, 7, 4, 6, // bottom
];

impl Mesh {
    /// Single red/green/blue triangle in the XY plane, non-indexed.
    pub fn triangle() -> Self {
        let vertices = vec![
            Vertex::new([0.0, 0.5, 0.0], Color::RED).with_tex_coord(0.5, 0.0),
            Vertex::new([0.5, -0.5, 0.0], Color::GREEN).with_tex_coord(1.0, 1.0),
            Vertex::new([-0.5, -0.5, 0.0], Color::BLUE).with_tex_coord(0.0, 1.0),
        ];
        Self::from_parts("triangle".to_string(), vertices, Vec::new())
    }

    /// Unit quad in the XY plane facing -Z, UVs spanning the full texture.
    pub fn quad() -> Self {
        let vertices = vec![
            Vertex::new([-0.5, 0.5, 0.0], Color::RED).with_tex_coord(0.0, 0.0),
            Vertex::new([0.5, 0.5, 0.0], Color::GREEN).with_tex_coord(1.0, 0.0),
            Vertex::new([0.5, -0.5, 0.0], Color::BLUE).with_tex_coord(1.0, 1.0),
            Vertex::new([-0.5, -0.5, 0.0], Color::YELLOW).with_tex_coord(0.0, 1.0),
        ];
        Self::from_parts("quad".to_string(), vertices, vec![0, 1, 2, 0, 2, 3])
    }

    /// Cube spanning ±1 with a distinct color per corner.
    pub fn cube() -> Self {
        let vertices = vec![
            Vertex::new([-1.0, 1.0, -1.0], Color::BLUE),
            Vertex::new([1.0, 1.0, -1.0], Color::GREEN),
            Vertex::new([1.0, 1.0, 1.0], Color::CYAN),
            Vertex::new([-1.0, 1.0, 1.0], Color::RED),
            Vertex::new([-1.0, -1.0, -1.0], Color::MAGENTA),
            Vertex::new([1.0, -1.0, -1.0], Color::YELLOW),
            Vertex::new([1.0, -1.0, 1.0], Color::WHITE),
            Vertex::new([-1.0, -1.0, 1.0], Color::BLACK),
        ];
        Self::from_parts("cube".to_string(), vertices, CUBE_INDICES.to_vec())
    }

    /// Unit UV sphere with [`DEFAULT_SPHERE_SLICES`] × [`DEFAULT_SPHERE_STACKS`].
    pub fn default_sphere() -> Self {
        let (vertices, indices) = sphere_geometry(
            DEFAULT_SPHERE_SLICES,
            DEFAULT_SPHERE_STACKS,
            (DEFAULT_SPHERE_SLICES + 1) * (DEFAULT_SPHERE_STACKS + 1),
            6 * DEFAULT_SPHERE_SLICES * (DEFAULT_SPHERE_STACKS - 1),
        );
        Self::from_parts("sphere".to_string(), vertices, indices)
    }

    /// Unit UV sphere.
    ///
    /// Rows run bottom (`i = 0`) to top. The rows touching a pole emit one
    /// triangle per slice instead of two so no triangle collapses onto the
    /// pole. Normals equal positions and colors map position from [-1, 1]
    /// to [0, 1].
    pub fn sphere(slices: u32, stacks: u32) -> Result<Self, GraphicsError> {
        if slices < 3 || stacks < 2 {
            return Err(GraphicsError::invalid(format!(
                "sphere needs at least 3 slices and 2 stacks, got {slices}x{stacks}"
            )));
        }

        let Some((vertex_count, index_count)) = sphere_counts(slices, stacks) else {
            return Err(GraphicsError::invalid(format!(
                "sphere with {slices}x{stacks} divisions exceeds 32-bit vertex or index counts"
            )));
        };

        let (vertices, indices) = sphere_geometry(slices, stacks, vertex_count, index_count);
        Ok(Self::from_parts("sphere".to_string(), vertices, indices))
    }
}

/// Vertex and index counts, `None` when either overflows `u32`.
fn sphere_counts(slices: u32, stacks: u32) -> Option<(u32, u32)> {
    let vertices = slices.checked_add(1)?.checked_mul(stacks.checked_add(1)?)?;
    let indices = slices.checked_mul(stacks.checked_sub(1)?)?.checked_mul(6)?;
    Some((vertices, indices))
}

fn sphere_geometry(
    slices: u32,
    stacks: u32,
    vertex_count: u32,
    index_count: u32,
) -> (Vec<Vertex>, Vec<u32>) {
    let mut vertices = Vec::with_capacity(vertex_count as usize);

    for i in 0..=stacks {
        let stack_angle = PI * i as f32 / stacks as f32 - FRAC_PI_2;
        let ring = stack_angle.cos();
        let y = stack_angle.sin();

        for j in 0..=slices {
            let sector_angle = TAU * j as f32 / slices as f32;
            let position = [ring * sector_angle.cos(), y, ring * sector_angle.sin()];
            let color = Color::new(
                (position[0] + 1.0) * 0.5,
                (position[1] + 1.0) * 0.5,
                (position[2] + 1.0) * 0.5,
                1.0,
            );

            vertices.push(
                Vertex::new(position, color)
                    .with_normal(position)
                    .with_tex_coord(j as f32 / slices as f32, i as f32 / stacks as f32),
            );
        }
    }

    let mut indices = Vec::with_capacity(index_count as usize);

    for i in 0..stacks {
        let mut k1 = i * (slices + 1);
        let mut k2 = k1 + slices + 1;

        for _ in 0..slices {
            if i != 0 {
                indices.extend_from_slice(&[k1, k2, k1 + 1]);
            }
            if i != stacks - 1 {
                indices.extend_from_slice(&[k1 + 1, k2, k2 + 1]);
            }
            k1 += 1;
            k2 += 1;
        }
    }

    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use glam::Vec3;

    fn triangle_area(mesh: &Mesh, tri: &[u32]) -> f32 {
        let p = |i: u32| Vec3::from(mesh.vertices()[i as usize].position);
        let (a, b, c) = (p(tri[0]), p(tri[1]), p(tri[2]));
        (b - a).cross(c - a).length() * 0.5
    }

    // ── fixed shapes ──────────────────────────────────────────────────────

    #[test]
    fn triangle_is_three_unindexed_vertices() {
        let mesh = Mesh::triangle();
        assert_eq!(mesh.vertex_count(), 3);
        assert!(!mesh.is_indexed());
        assert_eq!(mesh.vertices()[0].color, Color::RED.to_array());
        assert_eq!(mesh.vertices()[0].position, [0.0, 0.5, 0.0]);
    }

    #[test]
    fn quad_has_two_triangles() {
        let mesh = Mesh::quad();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices(), &[0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.vertices()[3].color, Color::YELLOW.to_array());
    }

    #[test]
    fn cube_has_eight_vertices_and_thirty_six_indices() {
        let mesh = Mesh::cube();
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.index_count(), 36);
        assert!(mesh.indices().iter().all(|&i| i < 8));
    }

    #[test]
    fn cube_triangles_are_non_degenerate() {
        let mesh = Mesh::cube();
        for tri in mesh.indices().chunks(3) {
            assert_abs_diff_eq!(triangle_area(&mesh, tri), 2.0, epsilon = 1e-5);
        }
    }

    /// In a left-handed frame a triangle that appears clockwise from
    /// outside has its edge cross product pointing outward.
    fn assert_faces_outward(mesh: &Mesh) {
        for tri in mesh.indices().chunks(3) {
            let p = |i: u32| Vec3::from(mesh.vertices()[i as usize].position);
            let (a, b, c) = (p(tri[0]), p(tri[1]), p(tri[2]));
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(normal.dot(centroid) > 0.0, "triangle {tri:?}");
        }
    }

    #[test]
    fn cube_faces_wind_clockwise_seen_from_outside() {
        assert_faces_outward(&Mesh::cube());
    }

    // ── sphere ────────────────────────────────────────────────────────────

    #[test]
    fn sphere_four_by_two_counts() {
        let mesh = Mesh::sphere(4, 2).unwrap();
        assert_eq!(mesh.vertex_count(), 15);
        // One triangle per slice in each of the two pole rows.
        assert_eq!(mesh.index_count(), 24);
    }

    #[test]
    fn sphere_index_count_formula() {
        for (slices, stacks) in [(3, 2), (8, 5), (16, 16), (32, 16)] {
            let mesh = Mesh::sphere(slices, stacks).unwrap();
            assert_eq!(mesh.vertex_count(), (slices + 1) * (stacks + 1));
            assert_eq!(mesh.index_count(), 6 * slices * (stacks - 1));
        }
    }

    #[test]
    fn sphere_has_no_degenerate_triangles() {
        let mesh = Mesh::sphere(8, 6).unwrap();
        for tri in mesh.indices().chunks(3) {
            assert!(triangle_area(&mesh, tri) > 1e-4, "degenerate triangle {tri:?}");
        }
    }

    #[test]
    fn sphere_faces_wind_clockwise_seen_from_outside() {
        assert_faces_outward(&Mesh::sphere(10, 6).unwrap());
    }

    #[test]
    fn sphere_vertices_lie_on_unit_sphere() {
        let mesh = Mesh::sphere(12, 7).unwrap();
        for v in mesh.vertices() {
            let p = Vec3::from(v.position);
            assert_abs_diff_eq!(p.length(), 1.0, epsilon = 1e-5);
            assert_eq!(v.normal, v.position);
            assert_eq!(v.color[3], 1.0);
            for c in &v.color[..3] {
                assert!((-1e-6..=1.0 + 1e-6).contains(c));
            }
        }
    }

    #[test]
    fn sphere_tex_coords_follow_grid() {
        let mesh = Mesh::sphere(4, 2).unwrap();
        // Row 1, column 2.
        let v = mesh.vertices()[5 + 2];
        assert_eq!(v.tex_coord, [0.5, 0.5]);
        assert_abs_diff_eq!(v.position[1], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn sphere_rejects_too_few_divisions() {
        assert!(matches!(
            Mesh::sphere(2, 8),
            Err(GraphicsError::InvalidArgument(_))
        ));
        assert!(matches!(
            Mesh::sphere(8, 1),
            Err(GraphicsError::InvalidArgument(_))
        ));
    }

    #[test]
    fn sphere_rejects_counts_past_u32() {
        for (slices, stacks) in [(u32::MAX, 2), (70_000, 70_000), (3, u32::MAX)] {
            assert!(
                matches!(Mesh::sphere(slices, stacks), Err(GraphicsError::InvalidArgument(_))),
                "{slices}x{stacks}"
            );
        }
    }

    #[test]
    fn sphere_counts_match_generated_geometry() {
        let (vertices, indices) = sphere_counts(8, 5).unwrap();
        let mesh = Mesh::sphere(8, 5).unwrap();
        assert_eq!(mesh.vertex_count(), vertices);
        assert_eq!(mesh.index_count(), indices);
    }

    #[test]
    fn default_sphere_uses_sixteen_divisions() {
        let mesh = Mesh::default_sphere();
        assert_eq!(mesh.vertex_count(), 17 * 17);
    }
}
