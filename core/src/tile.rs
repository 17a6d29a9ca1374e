use tracing::{debug, warn};

use crate::backend::{TerrainBackend, TileId};
use crate::generator::TerrainGenerator;
use crate::grid::GridCoordinate;
use crate::mesh::MeshData;
use crate::utils::{HeightField, SplatField};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileState {
    Pooled,
    Active,
}

// One terrain unit. Constructed once, then loaded and deactivated repeatedly;
// every buffer is kept across cycles.
pub struct Tile {
    id: TileId,
    state: TileState,
    coord: Option<GridCoordinate>,
    heights: HeightField,
    temperature: HeightField,
    humidity: HeightField,
    mask: HeightField,
    splat: SplatField,
    blur_scratch: Vec<f32>,
    mesh: MeshData,
    installed: MeshData, // last mesh handed to the backend
    dominant_biome: Option<usize>,
}

impl Tile {
    pub fn new(id: TileId) -> Self {
        Self {
            id,
            state: TileState::Pooled,
            coord: None,
            heights: HeightField::default(),
            temperature: HeightField::default(),
            humidity: HeightField::default(),
            mask: HeightField::default(),
            splat: SplatField::default(),
            blur_scratch: Vec::new(),
            mesh: MeshData::default(),
            installed: MeshData::default(),
            dominant_biome: None,
        }
    }

    pub fn id(&self) -> TileId {
        self.id
    }

    pub fn state(&self) -> TileState {
        self.state
    }

    // None while pooled
    pub fn coord(&self) -> Option<GridCoordinate> {
        self.coord
    }

    pub fn heights(&self) -> &HeightField {
        &self.heights
    }

    pub fn splat(&self) -> &SplatField {
        &self.splat
    }

    // Mesh currently installed in the backend
    pub fn mesh(&self) -> &MeshData {
        &self.installed
    }

    pub fn dominant_biome(&self) -> Option<usize> {
        self.dominant_biome
    }

    // Generate content for `coord` and install it; never fails outward
    pub fn load<B: TerrainBackend + ?Sized>(
        &mut self,
        coord: GridCoordinate,
        generator: &TerrainGenerator,
        backend: &mut B,
    ) {
        let config = generator.config();
        self.state = TileState::Active;
        self.coord = Some(coord);

        let origin = [
            coord.x as f32 * config.tile_edge,
            0.0,
            coord.z as f32 * config.tile_edge,
        ];
        backend.set_transform(self.id, origin);

        generator.fill_heights(
            coord,
            &mut self.heights,
            &mut self.mask,
            &mut self.blur_scratch,
        );
        generator.fill_climate(coord, &mut self.temperature, &mut self.humidity);
        self.dominant_biome = generator.biomes().classify_into(
            &self.temperature,
            &self.humidity,
            &mut self.splat,
        );
        generator
            .mesher()
            .build_into(&self.heights, &self.splat, &mut self.mesh);

        self.install(generator, backend);
        backend.set_visible(self.id, true);
        debug!(
            tile = self.id.0,
            x = coord.x,
            z = coord.z,
            vertices = self.installed.vertex_count(),
            "tile loaded"
        );
    }

    // Degenerate meshes keep the previous geometry in place
    fn install<B: TerrainBackend + ?Sized>(
        &mut self,
        generator: &TerrainGenerator,
        backend: &mut B,
    ) {
        if let Err(err) = self.mesh.validate() {
            warn!(tile = self.id.0, coord = ?self.coord, %err, "keeping previous mesh");
            return;
        }
        std::mem::swap(&mut self.mesh, &mut self.installed);

        let material = self
            .dominant_biome
            .and_then(|i| generator.biomes().get(i))
            .map(|b| b.material.as_str());
        backend.upload_render_mesh(self.id, &self.installed, material);

        // Collision is swapped atomically: nothing may query a half-updated mesh
        backend.set_collider_enabled(self.id, false);
        backend.clear_collision_mesh(self.id);
        let layer = generator.config().collision_layer;
        backend.assign_collision_mesh(self.id, &self.installed, layer);
        backend.set_collider_enabled(self.id, true);
    }

    pub fn deactivate<B: TerrainBackend + ?Sized>(&mut self, backend: &mut B) {
        if self.state == TileState::Pooled {
            return;
        }
        backend.set_visible(self.id, false);
        backend.set_collider_enabled(self.id, false);
        self.state = TileState::Pooled;
        self.coord = None;
    }
}
