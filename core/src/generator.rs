// Shared, read-only generation context.
//
// Built once at startup from the world configuration and biome table, then
// lent to every tile load. Holds the four noise layers and the filters so
// tiles only carry their own buffers.

use tracing::warn;

use crate::biome::BiomeTable;
use crate::config::{NoiseConfig, WorldConfig};
use crate::constraints::{BuildZoneFlattener, SlopeLimiter};
use crate::grid::GridCoordinate;
use crate::mesh::MeshBuilder;
use crate::noise_field::NoiseField;
use crate::utils::HeightField;

// Value used when a climate layer is not configured
const NEUTRAL_CLIMATE: f32 = 0.5;

pub struct TerrainGenerator {
    config: WorldConfig,
    biomes: BiomeTable,
    height: Option<NoiseField>,
    temperature: Option<NoiseField>,
    humidity: Option<NoiseField>,
    build_zone: Option<NoiseField>,
    slope: SlopeLimiter,
    flattener: BuildZoneFlattener,
    mesher: MeshBuilder,
}

impl TerrainGenerator {
    pub fn new(config: WorldConfig, biomes: BiomeTable) -> Self {
        if config.resolution < 2 {
            warn!(
                resolution = config.resolution,
                "resolution below 2, tiles will have no mesh"
            );
        }
        if config.tile_edge <= 0.0 {
            warn!(tile_edge = config.tile_edge, "tile edge must be positive");
        }

        let layer = |c: &Option<NoiseConfig>| c.as_ref().map(NoiseField::new);
        Self {
            height: layer(&config.height_noise),
            temperature: layer(&config.temperature_noise),
            humidity: layer(&config.humidity_noise),
            build_zone: layer(&config.build_zone_noise),
            slope: SlopeLimiter::from_config(&config),
            flattener: BuildZoneFlattener::new(config.flatten_strength),
            mesher: MeshBuilder::new(config.tile_edge, config.max_height),
            biomes,
            config,
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn biomes(&self) -> &BiomeTable {
        &self.biomes
    }

    pub fn mesher(&self) -> &MeshBuilder {
        &self.mesher
    }

    // Noise, slope clamp and build-zone flattening for one tile.
    // `mask` and `scratch` are caller-owned so buffers survive between loads.
    pub fn fill_heights(
        &self,
        coord: GridCoordinate,
        heights: &mut HeightField,
        mask: &mut HeightField,
        scratch: &mut Vec<f32>,
    ) {
        let res = self.config.resolution;
        let offset = coord.sample_offset(res);

        fill_layer(self.height.as_ref(), "height", 0.0, heights, res, offset);
        self.slope.apply(heights);

        if let Some(layer) = &self.build_zone {
            fill_layer(Some(layer), "build zone", 0.0, mask, res, offset);
            self.flattener.apply(heights, mask, scratch);
        }
    }

    pub fn fill_climate(
        &self,
        coord: GridCoordinate,
        temperature: &mut HeightField,
        humidity: &mut HeightField,
    ) {
        let res = self.config.resolution;
        let offset = coord.sample_offset(res);
        fill_layer(
            self.temperature.as_ref(),
            "temperature",
            NEUTRAL_CLIMATE,
            temperature,
            res,
            offset,
        );
        fill_layer(
            self.humidity.as_ref(),
            "humidity",
            NEUTRAL_CLIMATE,
            humidity,
            res,
            offset,
        );
    }

    // Final normalized height of a tile, computed from scratch
    pub fn compute_heights(&self, coord: GridCoordinate) -> HeightField {
        let mut heights = HeightField::default();
        let mut mask = HeightField::default();
        self.fill_heights(coord, &mut heights, &mut mask, &mut Vec::new());
        heights
    }
}

// Fill from a noise layer, or with `fallback` when it is missing or fails
fn fill_layer(
    layer: Option<&NoiseField>,
    name: &str,
    fallback: f32,
    field: &mut HeightField,
    res: usize,
    offset: (f64, f64),
) {
    let Some(layer) = layer else {
        warn!(layer = name, fallback, "noise config missing, using constant field");
        field.reset(res, res, fallback);
        return;
    };
    if let Err(err) = layer.fill(field, res, res, offset) {
        warn!(layer = name, %err, "noise generation failed, using constant field");
        field.reset(res, res, fallback);
    }
}
