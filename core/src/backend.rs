// Seam between generated tiles and whatever renders and collides them.
//
// The host owns rendering, physics and navigation. Tiles push geometry
// through `TerrainBackend` and never hold onto backend objects themselves.

use std::collections::HashMap;

use crate::mesh::MeshData;

// Stable handle of a tile inside the streamer's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub usize);

pub trait TerrainBackend {
    // World-space origin of the tile
    fn set_transform(&mut self, tile: TileId, origin: [f32; 3]);

    fn set_visible(&mut self, tile: TileId, visible: bool);

    // Replace the render mesh; `material` comes from the dominant biome
    fn upload_render_mesh(&mut self, tile: TileId, mesh: &MeshData, material: Option<&str>);

    fn set_collider_enabled(&mut self, tile: TileId, enabled: bool);

    fn clear_collision_mesh(&mut self, tile: TileId);

    fn assign_collision_mesh(&mut self, tile: TileId, mesh: &MeshData, layer: u32);
}

#[derive(Debug, Clone, PartialEq)]
pub enum BackendOp {
    Transform(TileId, [f32; 3]),
    Visible(TileId, bool),
    RenderMesh {
        tile: TileId,
        vertices: usize,
        material: Option<String>,
    },
    ColliderEnabled(TileId, bool),
    ClearCollision(TileId),
    AssignCollision {
        tile: TileId,
        vertices: usize,
        layer: u32,
    },
}

// What the backend currently holds for one tile
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TileSlot {
    pub origin: [f32; 3],
    pub visible: bool,
    pub render_vertices: usize,
    pub material: Option<String>,
    pub collider_enabled: bool,
    pub collision_vertices: Option<usize>,
    pub collision_layer: Option<u32>,
}

// In-memory backend for headless hosts and tests.
// Keeps the full operation log plus the resulting per-tile state.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    ops: Vec<BackendOp>,
    slots: HashMap<TileId, TileSlot>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[BackendOp] {
        &self.ops
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    pub fn slot(&self, tile: TileId) -> Option<&TileSlot> {
        self.slots.get(&tile)
    }

    pub fn visible_count(&self) -> usize {
        self.slots.values().filter(|s| s.visible).count()
    }

    fn slot_mut(&mut self, tile: TileId) -> &mut TileSlot {
        self.slots.entry(tile).or_default()
    }
}

impl TerrainBackend for RecordingBackend {
    fn set_transform(&mut self, tile: TileId, origin: [f32; 3]) {
        self.ops.push(BackendOp::Transform(tile, origin));
        self.slot_mut(tile).origin = origin;
    }

    fn set_visible(&mut self, tile: TileId, visible: bool) {
        self.ops.push(BackendOp::Visible(tile, visible));
        self.slot_mut(tile).visible = visible;
    }

    fn upload_render_mesh(&mut self, tile: TileId, mesh: &MeshData, material: Option<&str>) {
        self.ops.push(BackendOp::RenderMesh {
            tile,
            vertices: mesh.vertex_count(),
            material: material.map(str::to_string),
        });
        let slot = self.slot_mut(tile);
        slot.render_vertices = mesh.vertex_count();
        slot.material = material.map(str::to_string);
    }

    fn set_collider_enabled(&mut self, tile: TileId, enabled: bool) {
        self.ops.push(BackendOp::ColliderEnabled(tile, enabled));
        self.slot_mut(tile).collider_enabled = enabled;
    }

    fn clear_collision_mesh(&mut self, tile: TileId) {
        self.ops.push(BackendOp::ClearCollision(tile));
        let slot = self.slot_mut(tile);
        slot.collision_vertices = None;
        slot.collision_layer = None;
    }

    fn assign_collision_mesh(&mut self, tile: TileId, mesh: &MeshData, layer: u32) {
        self.ops.push(BackendOp::AssignCollision {
            tile,
            vertices: mesh.vertex_count(),
            layer,
        });
        let slot = self.slot_mut(tile);
        slot.collision_vertices = Some(mesh.vertex_count());
        slot.collision_layer = Some(layer);
    }
}
