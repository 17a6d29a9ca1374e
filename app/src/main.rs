use std::collections::HashMap;
use std::time::Instant;

use eframe::{App, Frame, NativeOptions, egui, run_native};
use egui::{ColorImage, TextureHandle};
use terrain_core::export::{height_to_image, splat_to_image, splat_to_rgb};
use terrain_core::{
    BiomeTable, GridCoordinate, MeshData, StreamDelta, TerrainBackend, TerrainGenerator, TileId,
    WorldConfig, WorldStreamer,
};
use terrain_data::{DEFAULT_WORLD_FILE, load_world};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// What the viewer keeps per tile; the preview is drawn from tile fields directly
#[derive(Default)]
struct ViewerTile {
    visible: bool,
    triangles: usize,
    material: Option<String>,
    collider: bool,
}

#[derive(Default)]
struct ViewerBackend {
    tiles: HashMap<TileId, ViewerTile>,
    uploads: usize,
}

impl ViewerBackend {
    fn visible(&self) -> usize {
        self.tiles.values().filter(|t| t.visible).count()
    }

    fn colliders(&self) -> usize {
        self.tiles.values().filter(|t| t.collider).count()
    }

    fn triangles(&self) -> usize {
        self.tiles
            .values()
            .filter(|t| t.visible)
            .map(|t| t.triangles)
            .sum()
    }
}

impl TerrainBackend for ViewerBackend {
    fn set_transform(&mut self, tile: TileId, _origin: [f32; 3]) {
        self.tiles.entry(tile).or_default();
    }

    fn set_visible(&mut self, tile: TileId, visible: bool) {
        self.tiles.entry(tile).or_default().visible = visible;
    }

    fn upload_render_mesh(&mut self, tile: TileId, mesh: &MeshData, material: Option<&str>) {
        let slot = self.tiles.entry(tile).or_default();
        slot.triangles = mesh.triangle_count();
        slot.material = material.map(str::to_string);
        self.uploads += 1;
    }

    fn set_collider_enabled(&mut self, tile: TileId, enabled: bool) {
        self.tiles.entry(tile).or_default().collider = enabled;
    }

    fn clear_collision_mesh(&mut self, _tile: TileId) {}

    fn assign_collision_mesh(&mut self, _tile: TileId, _mesh: &MeshData, _layer: u32) {}
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
enum PreviewLayer {
    Shaded,
    Height,
    Biome,
}

struct TerrainApp {
    streamer: WorldStreamer<ViewerBackend>,
    position: [f32; 3],
    speed: f32,
    layer: PreviewLayer,

    preview: Option<TextureHandle>,
    // RGB bytes and size of the last composite, kept for saving
    last_rgb: Option<(Vec<u8>, usize)>,
    dirty: bool,

    last_delta: Option<StreamDelta>,
    last_tick_ms: Option<f32>,
    status_message: String,
}

impl TerrainApp {
    fn new(config: WorldConfig, biomes: BiomeTable) -> Self {
        let generator = TerrainGenerator::new(config, biomes);
        let mut streamer = WorldStreamer::new(generator, ViewerBackend::default());
        streamer.on_world_ready(|| info!("world ready"));
        let mut app = Self {
            streamer,
            position: [0.0; 3],
            speed: 40.0,
            layer: PreviewLayer::Shaded,
            preview: None,
            last_rgb: None,
            dirty: true,
            last_delta: None,
            last_tick_ms: None,
            status_message: String::new(),
        };
        app.tick();
        app
    }

    fn tick(&mut self) {
        let start = Instant::now();
        if let Some(delta) = self.streamer.tick(self.position) {
            self.last_tick_ms = Some(start.elapsed().as_secs_f32() * 1000.0);
            self.last_delta = Some(delta);
            self.dirty = true;
        }
    }

    // Stitch every active tile around the observer into one RGB buffer
    fn composite(&self) -> Option<(Vec<u8>, usize)> {
        let center = self.streamer.observer()?;
        let config = self.streamer.generator().config();
        let radius = config.view_distance;
        let step = config.resolution - 1;
        let size = (2 * radius as usize + 1) * step + 1;
        let mut rgb = vec![0u8; size * size * 3];

        for tile in self.streamer.active_tiles() {
            let Some(coord) = tile.coord() else { continue };
            let ox = (coord.x - center.x + radius) as usize * step;
            let oy = (coord.z - center.z + radius) as usize * step;
            let img = match self.layer {
                PreviewLayer::Shaded => {
                    let (heights, splat) = (tile.heights(), tile.splat());
                    for y in 0..splat.height() {
                        for x in 0..splat.width() {
                            // darker valleys, brighter ridges
                            let shade = 0.45 + 0.55 * heights.get(x, y);
                            let px = splat_to_rgb(splat.get(x, y))
                                .map(|c| (c as f32 * shade) as u8);
                            let i = ((oy + y) * size + ox + x) * 3;
                            rgb[i..i + 3].copy_from_slice(&px);
                        }
                    }
                    continue;
                }
                PreviewLayer::Height => height_to_image(tile.heights()),
                PreviewLayer::Biome => splat_to_image(tile.splat()),
            };
            for (x, y, px) in img.enumerate_pixels() {
                let i = ((oy + y as usize) * size + ox + x as usize) * 3;
                rgb[i..i + 3].copy_from_slice(&px.0);
            }
        }
        Some((rgb, size))
    }

    fn refresh_preview(&mut self, ctx: &egui::Context) {
        if !self.dirty {
            return;
        }
        self.dirty = false;
        let Some((rgb, size)) = self.composite() else {
            return;
        };
        let color_image = ColorImage::from_rgb([size, size], &rgb);
        self.preview =
            Some(ctx.load_texture("terrain", color_image, egui::TextureOptions::NEAREST));
        self.last_rgb = Some((rgb, size));
    }

    fn handle_movement(&mut self, ctx: &egui::Context) {
        let (dt, dx, dz) = ctx.input(|i| {
            let axis = |neg: egui::Key, pos: egui::Key| {
                i.key_down(pos) as i32 as f32 - i.key_down(neg) as i32 as f32
            };
            (
                i.stable_dt.min(0.1),
                axis(egui::Key::A, egui::Key::D),
                axis(egui::Key::W, egui::Key::S),
            )
        });
        if dx != 0.0 || dz != 0.0 {
            self.position[0] += dx * self.speed * dt;
            self.position[2] += dz * self.speed * dt;
            self.tick();
            ctx.request_repaint();
        }
    }

    fn save_png(&mut self) {
        let Some((rgb, size)) = &self.last_rgb else {
            self.status_message = "Nothing to save yet".into();
            return;
        };
        let center = self.streamer.observer().unwrap_or(GridCoordinate::new(0, 0));
        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG", &["png"])
            .set_file_name(format!("terrain_{}_{}.png", center.x, center.z))
            .save_file()
        else {
            return;
        };
        let size = *size as u32;
        self.status_message =
            match image::save_buffer(&path, rgb, size, size, image::ColorType::Rgb8) {
                Ok(()) => format!("Saved {}", path.display()),
                Err(e) => {
                    warn!(error = %e, "failed to save preview");
                    format!("Save failed: {e}")
                }
            };
    }
}

impl App for TerrainApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.handle_movement(ctx);

        egui::SidePanel::left("controls").show(ctx, |ui| {
            ui.heading("Terrain Streamer");
            ui.separator();

            ui.label("Move with W A S D");
            ui.add(egui::Slider::new(&mut self.speed, 5.0..=400.0).text("Speed"));

            ui.horizontal(|ui| {
                ui.label("X");
                ui.add(egui::DragValue::new(&mut self.position[0]).speed(1.0));
                ui.label("Z");
                ui.add(egui::DragValue::new(&mut self.position[2]).speed(1.0));
            });
            if ui.button("Teleport").clicked() {
                self.tick();
            }

            let before = self.layer;
            egui::ComboBox::from_label("Preview")
                .selected_text(format!("{:?}", self.layer))
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut self.layer, PreviewLayer::Shaded, "Shaded");
                    ui.selectable_value(&mut self.layer, PreviewLayer::Height, "Height");
                    ui.selectable_value(&mut self.layer, PreviewLayer::Biome, "Biome");
                });
            if before != self.layer {
                self.dirty = true;
            }

            ui.separator();

            let backend = self.streamer.backend();
            if let Some(center) = self.streamer.observer() {
                ui.label(format!("Center tile ({}, {})", center.x, center.z));
            }
            ui.label(format!(
                "Active {} / pooled {} / visible {}",
                self.streamer.active_count(),
                self.streamer.pooled_count(),
                backend.visible()
            ));
            ui.label(format!(
                "Colliders {}, triangles {}",
                backend.colliders(),
                backend.triangles()
            ));
            ui.label(format!("Mesh uploads {}", backend.uploads));
            if let Some(delta) = &self.last_delta {
                ui.label(format!(
                    "Last step: +{} -{}",
                    delta.loaded.len(),
                    delta.unloaded.len()
                ));
            }
            if let Some(ms) = self.last_tick_ms {
                ui.label(format!("Last tick {ms:.2} ms"));
            }
            let spawn = self
                .streamer
                .safe_spawn_height(self.position[0], self.position[2], 2.0);
            ui.label(format!("Spawn height {spawn:.2}"));
            if let Some(tile) = self.streamer.observer().and_then(|c| self.streamer.tile_at(c)) {
                let material = self
                    .streamer
                    .backend()
                    .tiles
                    .get(&tile.id())
                    .and_then(|t| t.material.as_deref())
                    .unwrap_or("none");
                ui.label(format!("Material {material}"));
            }

            ui.separator();
            if ui.button("Save PNG…").clicked() {
                self.save_png();
            }
            ui.label(&self.status_message);
        });

        self.refresh_preview(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(tex) = &self.preview {
                let side = ui.available_width().min(ui.available_height());
                ui.image((tex.id(), egui::vec2(side, side)));
            } else {
                ui.centered_and_justified(|ui| {
                    ui.label("No tiles loaded");
                });
            }
        });
    }
}

fn main() -> eframe::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let (config, biomes) = match load_world(DEFAULT_WORLD_FILE) {
        Ok(loaded) => loaded,
        Err(e) => {
            warn!(error = %e, "using built-in world");
            (WorldConfig::default(), BiomeTable::default_table())
        }
    };

    let opts = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 640.0])
            .with_min_inner_size([400.0, 300.0]),
        ..Default::default()
    };
    run_native(
        "Terrain Streamer",
        opts,
        Box::new(|_cc| Ok(Box::new(TerrainApp::new(config, biomes)))),
    )
}
