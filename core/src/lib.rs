// core holds the tile generation pipeline and the streamer that drives it
pub mod backend;
pub mod biome;
pub mod config;
pub mod constraints;
pub mod error;
pub mod export;
pub mod generator;
pub mod grid;
pub mod mesh;
pub mod noise_field;
pub mod perlin2;
pub mod signal;
pub mod streamer;
pub mod tile;
pub mod utils;

pub use backend::{BackendOp, RecordingBackend, TerrainBackend, TileId, TileSlot};
pub use biome::{BiomeDefinition, BiomeTable};
pub use config::{NoiseConfig, WorldConfig};
pub use constraints::{BuildZoneFlattener, SlopeLimiter};
pub use error::TerrainError;
pub use generator::TerrainGenerator;
pub use grid::GridCoordinate;
pub use mesh::{Aabb, MeshBuilder, MeshData};
pub use noise_field::NoiseField;
pub use perlin2::Perlin2D;
pub use signal::WorldReadySignal;
pub use streamer::{StreamDelta, WorldStreamer};
pub use tile::{Tile, TileState};
pub use utils::{Field2D, HeightField, SplatColor, SplatField};
