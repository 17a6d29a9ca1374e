//storage loads world configuration and biome definitions from static TOML data

pub mod models;

use std::fs;
use std::path::{Path, PathBuf};

use terrain_core::{BiomeDefinition, BiomeTable, NoiseConfig, SplatColor, WorldConfig};
use thiserror::Error;
use tracing::{info, warn};

use crate::models::{BiomeDoc, NoiseDoc, WorldDoc, WorldFile};

// Data file shipped with the crate
pub const DEFAULT_WORLD_FILE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/world.toml");

#[derive(Error, Debug)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed world file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid world data: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, DataError>;

// Read and convert a world file
pub fn load_world(path: impl AsRef<Path>) -> Result<(WorldConfig, BiomeTable)> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let loaded = parse_world(&text)?;
    info!(path = %path.display(), biomes = loaded.1.biomes().len(), "world data loaded");
    Ok(loaded)
}

pub fn parse_world(text: &str) -> Result<(WorldConfig, BiomeTable)> {
    let file: WorldFile = toml::from_str(text)?;
    let config = world_config(&file.world)?;
    let biomes = biome_table(&file.biomes, file.default_biome.as_deref())?;
    Ok((config, biomes))
}

// Serialize a config and biome table back into the file format
pub fn to_toml(
    config: &WorldConfig,
    biomes: &BiomeTable,
    default: Option<&str>,
) -> Result<String> {
    let file = WorldFile {
        default_biome: default.map(str::to_string),
        world: world_doc(config),
        biomes: biomes.biomes().iter().map(biome_doc).collect(),
    };
    toml::to_string_pretty(&file).map_err(|e| DataError::Invalid(e.to_string()))
}

fn world_config(doc: &WorldDoc) -> Result<WorldConfig> {
    if !(doc.tile_edge > 0.0) {
        return Err(DataError::Invalid(format!(
            "tile_edge must be positive, got {}",
            doc.tile_edge
        )));
    }
    if doc.resolution < 2 {
        return Err(DataError::Invalid(format!(
            "resolution must be at least 2, got {}",
            doc.resolution
        )));
    }
    if !(doc.max_height > 0.0) {
        return Err(DataError::Invalid(format!(
            "max_height must be positive, got {}",
            doc.max_height
        )));
    }
    if doc.view_distance < 0 {
        return Err(DataError::Invalid(format!(
            "view_distance must not be negative, got {}",
            doc.view_distance
        )));
    }
    if !(0.0..90.0).contains(&doc.max_slope_deg) {
        return Err(DataError::Invalid(format!(
            "max_slope_deg must be in [0, 90), got {}",
            doc.max_slope_deg
        )));
    }

    let layer = |name: &str, d: &Option<NoiseDoc>| -> Result<Option<NoiseConfig>> {
        let Some(d) = d else {
            warn!(layer = name, "noise layer not configured");
            return Ok(None);
        };
        if d.octaves == 0 {
            return Err(DataError::Invalid(format!(
                "{name}: octaves must be at least 1"
            )));
        }
        if !(0.0..=1.0).contains(&d.persistence) {
            return Err(DataError::Invalid(format!(
                "{name}: persistence must be in [0, 1], got {}",
                d.persistence
            )));
        }
        if d.lacunarity < 1.0 {
            return Err(DataError::Invalid(format!(
                "{name}: lacunarity must be >= 1, got {}",
                d.lacunarity
            )));
        }
        Ok(Some(NoiseConfig {
            seed: d.seed,
            scale: d.scale,
            octaves: d.octaves,
            persistence: d.persistence,
            lacunarity: d.lacunarity,
            offset: (d.offset[0], d.offset[1]),
        }))
    };

    Ok(WorldConfig {
        tile_edge: doc.tile_edge,
        resolution: doc.resolution,
        max_height: doc.max_height,
        view_distance: doc.view_distance,
        max_slope_deg: doc.max_slope_deg,
        flatten_strength: doc.flatten_strength,
        collision_layer: doc.collision_layer,
        slope_relaxation_passes: doc.slope_relaxation_passes,
        height_noise: layer("height", &doc.height_noise)?,
        temperature_noise: layer("temperature", &doc.temperature_noise)?,
        humidity_noise: layer("humidity", &doc.humidity_noise)?,
        build_zone_noise: layer("build_zone", &doc.build_zone_noise)?,
    })
}

fn biome_table(docs: &[BiomeDoc], default: Option<&str>) -> Result<BiomeTable> {
    let mut biomes = Vec::with_capacity(docs.len());
    for d in docs {
        if d.temperature[0] > d.temperature[1] || d.humidity[0] > d.humidity[1] {
            return Err(DataError::Invalid(format!(
                "biome {}: range min exceeds max",
                d.name
            )));
        }
        let [r, g, b, a] = d.color;
        biomes.push(BiomeDefinition {
            name: d.name.clone(),
            temperature: (d.temperature[0], d.temperature[1]),
            humidity: (d.humidity[0], d.humidity[1]),
            color: SplatColor::new(r, g, b, a),
            material: d
                .material
                .clone()
                .unwrap_or_else(|| format!("terrain/{}", d.name)),
            graph_position: (d.graph_position[0], d.graph_position[1]),
        });
    }

    let default_index = match default {
        Some(name) => {
            let index = biomes.iter().position(|b| b.name == name);
            if index.is_none() {
                warn!(name, "default biome not found, falling back to first entry");
            }
            index
        }
        None => None,
    };
    if biomes.is_empty() {
        warn!("world file defines no biomes, tiles will use the sentinel color");
    }
    Ok(BiomeTable::new(biomes, default_index))
}

fn world_doc(c: &WorldConfig) -> WorldDoc {
    let layer = |n: &Option<NoiseConfig>| {
        n.as_ref().map(|n| NoiseDoc {
            seed: n.seed,
            scale: n.scale,
            octaves: n.octaves,
            persistence: n.persistence,
            lacunarity: n.lacunarity,
            offset: [n.offset.0, n.offset.1],
        })
    };
    WorldDoc {
        tile_edge: c.tile_edge,
        resolution: c.resolution,
        max_height: c.max_height,
        view_distance: c.view_distance,
        max_slope_deg: c.max_slope_deg,
        flatten_strength: c.flatten_strength,
        collision_layer: c.collision_layer,
        slope_relaxation_passes: c.slope_relaxation_passes,
        height_noise: layer(&c.height_noise),
        temperature_noise: layer(&c.temperature_noise),
        humidity_noise: layer(&c.humidity_noise),
        build_zone_noise: layer(&c.build_zone_noise),
    }
}

fn biome_doc(b: &BiomeDefinition) -> BiomeDoc {
    BiomeDoc {
        name: b.name.clone(),
        temperature: [b.temperature.0, b.temperature.1],
        humidity: [b.humidity.0, b.humidity.1],
        color: [b.color.red, b.color.green, b.color.blue, b.color.alpha],
        material: Some(b.material.clone()),
        graph_position: [b.graph_position.0, b.graph_position.1],
    }
}
