use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use terrain_core::{
    BiomeTable, GridCoordinate, HeightField, MeshBuilder, NoiseConfig, NoiseField,
    RecordingBackend, SlopeLimiter, TerrainGenerator, Tile, TileId, WorldConfig, WorldStreamer,
};

const RES: usize = 33;
const SEED: u64 = 2025;

fn height_config() -> NoiseConfig {
    NoiseConfig {
        octaves: 5,
        ..NoiseConfig::new(SEED, 60.0)
    }
}

fn bench_noise_fill(c: &mut Criterion) {
    let layer = NoiseField::new(&height_config());
    let mut field = HeightField::default();
    c.bench_function("NoiseField fill 33x33 (5 octaves)", |b| {
        b.iter(|| {
            layer
                .fill(&mut field, RES, RES, black_box((64.0, -32.0)))
                .unwrap();
        })
    });
}

fn bench_slope_limiter(c: &mut Criterion) {
    let layer = NoiseField::new(&NoiseConfig {
        octaves: 6,
        ..NoiseConfig::new(SEED, 4.0)
    });
    let rough = layer.generate(RES, RES, (0.0, 0.0)).unwrap();
    let limiter = SlopeLimiter::from_config(&WorldConfig::default());
    c.bench_function("SlopeLimiter 3 passes on rough tile", |b| {
        b.iter(|| {
            let mut field = rough.clone();
            limiter.apply(&mut field);
            black_box(field);
        })
    });
}

fn bench_mesh_build(c: &mut Criterion) {
    let config = WorldConfig::default();
    let generator = TerrainGenerator::new(config.clone(), BiomeTable::default_table());
    let heights = generator.compute_heights(GridCoordinate::new(0, 0));
    let (splat, _) = generator.biomes().classify(
        &HeightField::filled(RES, RES, 0.5),
        &HeightField::filled(RES, RES, 0.3),
    );
    let mesher = MeshBuilder::new(config.tile_edge, config.max_height);
    c.bench_function("MeshBuilder build 33x33", |b| {
        b.iter(|| black_box(mesher.build(&heights, &splat)))
    });
}

fn bench_tile_load(c: &mut Criterion) {
    let mut config = WorldConfig::default();
    config.height_noise = Some(height_config());
    config.temperature_noise = Some(NoiseConfig::new(7, 180.0));
    config.humidity_noise = Some(NoiseConfig::new(11, 140.0));
    config.build_zone_noise = Some(NoiseConfig::new(31, 90.0));
    let generator = TerrainGenerator::new(config, BiomeTable::default_table());
    let mut backend = RecordingBackend::new();
    let mut tile = Tile::new(TileId(0));
    let mut x = 0;
    c.bench_function("Tile load full pipeline", |b| {
        b.iter(|| {
            x += 1;
            tile.load(GridCoordinate::new(x, 3), &generator, &mut backend);
            backend.clear_ops();
        })
    });
}

fn bench_streaming_walk(c: &mut Criterion) {
    c.bench_function("WorldStreamer walk 20 tiles east", |b| {
        b.iter(|| {
            let generator =
                TerrainGenerator::new(WorldConfig::default(), BiomeTable::default_table());
            let edge = generator.config().tile_edge;
            let mut streamer = WorldStreamer::new(generator, RecordingBackend::new());
            for step in 0..20 {
                streamer.tick([step as f32 * edge, 0.0, 0.0]);
            }
            black_box(streamer.active_count());
        })
    });
}

criterion_group!(
    benches,
    bench_noise_fill,
    bench_slope_limiter,
    bench_mesh_build,
    bench_tile_load,
    bench_streaming_walk
);
criterion_main!(benches);
