use std::path::Path;

use image::RgbImage;
use terrain_core::export::{height_to_image, splat_to_image};
use terrain_core::{BiomeTable, RecordingBackend, TerrainGenerator, WorldConfig, WorldStreamer};

// Stream the window around the origin and stitch every active tile into one image
fn main() {
    let config = WorldConfig::default();
    let res = config.resolution as u32;
    let radius = config.view_distance;
    let generator = TerrainGenerator::new(config, BiomeTable::default_table());
    let mut streamer = WorldStreamer::new(generator, RecordingBackend::new());
    streamer.tick([0.0, 0.0, 0.0]);

    // Neighbouring tiles share an edge column, so each one adds res - 1 pixels
    let span = (2 * radius + 1) as u32 * (res - 1) + 1;
    let mut heights = RgbImage::new(span, span);
    let mut biomes = RgbImage::new(span, span);

    for tile in streamer.active_tiles() {
        let Some(coord) = tile.coord() else { continue };
        let ox = (coord.x + radius) as u32 * (res - 1);
        let oy = (coord.z + radius) as u32 * (res - 1);
        let h = height_to_image(tile.heights());
        let s = splat_to_image(tile.splat());
        for (x, y, px) in h.enumerate_pixels() {
            heights.put_pixel(ox + x, oy + y, *px);
        }
        for (x, y, px) in s.enumerate_pixels() {
            biomes.put_pixel(ox + x, oy + y, *px);
        }
    }

    heights.save(Path::new("stream_heights.png")).unwrap();
    biomes.save(Path::new("stream_biomes.png")).unwrap();
    println!(
        "Saved {} tiles ({}x{} px), spawn height at origin {:.2}",
        streamer.active_count(),
        span,
        span,
        streamer.safe_spawn_height(0.0, 0.0, 0.0)
    );
}
