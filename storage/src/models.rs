use serde::{Deserialize, Serialize};

// On-disk layout of a world data file.
// Field names mirror the TOML keys; conversion to core types lives in lib.rs.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoiseDoc {
    pub seed: u64,
    pub scale: f64,
    #[serde(default = "default_octaves")]
    pub octaves: usize,
    #[serde(default = "default_persistence")]
    pub persistence: f64,
    #[serde(default = "default_lacunarity")]
    pub lacunarity: f64,
    #[serde(default)]
    pub offset: [f64; 2],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldDoc {
    pub tile_edge: f32,
    pub resolution: usize,
    pub max_height: f32,
    pub view_distance: i32,
    pub max_slope_deg: f32,
    #[serde(default)]
    pub flatten_strength: f32,
    #[serde(default)]
    pub collision_layer: u32,
    #[serde(default = "default_passes")]
    pub slope_relaxation_passes: usize,
    // Any layer may be left out; generation then falls back to a constant field
    pub height_noise: Option<NoiseDoc>,
    pub temperature_noise: Option<NoiseDoc>,
    pub humidity_noise: Option<NoiseDoc>,
    pub build_zone_noise: Option<NoiseDoc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiomeDoc {
    pub name: String,
    pub temperature: [f32; 2], // [min, max)
    pub humidity: [f32; 2],    // [min, max)
    pub color: [f32; 4],       // linear RGBA
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub graph_position: [f32; 2],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldFile {
    // Name of the fallback biome
    pub default_biome: Option<String>,
    pub world: WorldDoc,
    #[serde(default, rename = "biome")]
    pub biomes: Vec<BiomeDoc>,
}

fn default_octaves() -> usize {
    4
}

fn default_persistence() -> f64 {
    0.5
}

fn default_lacunarity() -> f64 {
    2.0
}

fn default_passes() -> usize {
    3
}
