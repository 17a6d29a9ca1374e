use crate::error::{Result, TerrainError};
use crate::utils::{HeightField, SplatColor, SplatField};

// Axis-aligned bounds in tile-local space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

// Renderable and collidable triangle mesh, centered on the tile origin.
// Normals and bounds are derived from the current positions and indices.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub uvs: Vec<[f32; 2]>,
    pub colors: Vec<SplatColor>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.indices.is_empty()
    }

    pub fn clear(&mut self) {
        self.positions.clear();
        self.indices.clear();
        self.uvs.clear();
        self.colors.clear();
    }

    // Rejects meshes a backend cannot consume
    pub fn validate(&self) -> Result<()> {
        let vertices = self.positions.len();
        let indices = self.indices.len();
        let degenerate = vertices < 3
            || indices < 3
            || indices % 3 != 0
            || self.uvs.len() != vertices
            || self.colors.len() != vertices
            || self.indices.iter().any(|&i| i as usize >= vertices);
        if degenerate {
            return Err(TerrainError::MeshApplyFailure { vertices, indices });
        }
        Ok(())
    }

    // Area-weighted vertex normals from the triangle list
    pub fn compute_normals(&self) -> Vec<[f32; 3]> {
        let mut normals = vec![[0.0f32; 3]; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let (pa, pb, pc) = (self.positions[a], self.positions[b], self.positions[c]);
            let n = cross(sub(pb, pa), sub(pc, pa));
            for &i in &[a, b, c] {
                normals[i][0] += n[0];
                normals[i][1] += n[1];
                normals[i][2] += n[2];
            }
        }
        for n in normals.iter_mut() {
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            *n = if len > f32::EPSILON {
                [n[0] / len, n[1] / len, n[2] / len]
            } else {
                [0.0, 1.0, 0.0]
            };
        }
        normals
    }

    pub fn bounds(&self) -> Option<Aabb> {
        let first = *self.positions.first()?;
        let mut aabb = Aabb {
            min: first,
            max: first,
        };
        for p in &self.positions[1..] {
            for k in 0..3 {
                aabb.min[k] = aabb.min[k].min(p[k]);
                aabb.max[k] = aabb.max[k].max(p[k]);
            }
        }
        Some(aabb)
    }
}

#[inline]
fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

// Grid triangulation of a height field
pub struct MeshBuilder {
    tile_edge: f32,
    max_height: f32,
}

impl MeshBuilder {
    pub fn new(tile_edge: f32, max_height: f32) -> Self {
        Self {
            tile_edge,
            max_height,
        }
    }

    pub fn build(&self, heights: &HeightField, splat: &SplatField) -> MeshData {
        let mut mesh = MeshData::default();
        self.build_into(heights, splat, &mut mesh);
        mesh
    }

    // Rebuilds `mesh` in place, leaving it empty for unusable input
    pub fn build_into(&self, heights: &HeightField, splat: &SplatField, mesh: &mut MeshData) {
        mesh.clear();
        let w = heights.width();
        let h = heights.height();
        if w <= 1 || h <= 1 || !heights.same_size(splat) {
            return;
        }

        let step_x = self.tile_edge / (w - 1) as f32;
        let step_z = self.tile_edge / (h - 1) as f32;
        let half = self.tile_edge * 0.5;

        mesh.positions.reserve(w * h);
        mesh.uvs.reserve(w * h);
        mesh.colors.reserve(w * h);
        for y in 0..h {
            for x in 0..w {
                mesh.positions.push([
                    x as f32 * step_x - half,
                    heights.get(x, y) * self.max_height,
                    y as f32 * step_z - half,
                ]);
                mesh.uvs.push([x as f32 / (w - 1) as f32, y as f32 / (h - 1) as f32]);
                mesh.colors.push(splat.get(x, y));
            }
        }

        // Row `y` is the top edge of each quad, row `y + 1` the bottom edge
        mesh.indices.reserve((w - 1) * (h - 1) * 6);
        for y in 0..h - 1 {
            for x in 0..w - 1 {
                let top_left = (y * w + x) as u32;
                let top_right = top_left + 1;
                let bottom_left = top_left + w as u32;
                let bottom_right = bottom_left + 1;
                mesh.indices.extend_from_slice(&[top_left, bottom_left, top_right]);
                mesh.indices.extend_from_slice(&[top_right, bottom_left, bottom_right]);
            }
        }
    }
}
