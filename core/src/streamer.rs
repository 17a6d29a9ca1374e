// Observer-centred tile streaming.
//
// The streamer keeps exactly the tiles within `view_distance` (Chebyshev)
// of the observer's tile active. Tiles leaving the window are hidden and
// parked in a pool; tiles entering it reuse pooled instances before any new
// one is constructed. All tiles live in one arena and are referred to by
// `TileId`, so nothing points back at the streamer.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::backend::{TerrainBackend, TileId};
use crate::generator::TerrainGenerator;
use crate::grid::GridCoordinate;
use crate::signal::WorldReadySignal;
use crate::tile::{Tile, TileState};
use crate::utils::HeightField;

// What changed during one streaming step. A non-empty `loaded` list is the
// host's cue to rebake its navigation mesh.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StreamDelta {
    pub observer: GridCoordinate,
    pub loaded: Vec<GridCoordinate>,
    pub unloaded: Vec<GridCoordinate>,
}

pub struct WorldStreamer<B: TerrainBackend> {
    generator: TerrainGenerator,
    backend: B,
    tiles: Vec<Tile>,
    active: HashMap<GridCoordinate, TileId>,
    pool: Vec<TileId>,
    observer: Option<GridCoordinate>,
    world_ready: WorldReadySignal,
}

impl<B: TerrainBackend> WorldStreamer<B> {
    pub fn new(generator: TerrainGenerator, backend: B) -> Self {
        Self {
            generator,
            backend,
            tiles: Vec::new(),
            active: HashMap::new(),
            pool: Vec::new(),
            observer: None,
            world_ready: WorldReadySignal::new(),
        }
    }

    pub fn generator(&self) -> &TerrainGenerator {
        &self.generator
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn observer(&self) -> Option<GridCoordinate> {
        self.observer
    }

    pub fn on_world_ready(&mut self, callback: impl FnOnce() + 'static) {
        self.world_ready.subscribe(callback);
    }

    pub fn is_world_ready(&self) -> bool {
        self.world_ready.is_fired()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn pooled_count(&self) -> usize {
        self.pool.len()
    }

    // Tiles ever constructed
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    // Active coordinates in a stable order
    pub fn active_coords(&self) -> Vec<GridCoordinate> {
        let mut coords: Vec<_> = self.active.keys().copied().collect();
        coords.sort();
        coords
    }

    pub fn pooled_ids(&self) -> &[TileId] {
        &self.pool
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id.0)
    }

    pub fn tile_at(&self, coord: GridCoordinate) -> Option<&Tile> {
        self.active.get(&coord).and_then(|&id| self.tile(id))
    }

    pub fn active_tiles(&self) -> impl Iterator<Item = &Tile> {
        self.active.values().filter_map(|&id| self.tiles.get(id.0))
    }

    // Advance one step for the observer's world position (X and Z are used).
    // Returns None when the observer is still in the same tile, or when the
    // position or tile edge cannot be mapped to a tile.
    pub fn tick(&mut self, observer_position: [f32; 3]) -> Option<StreamDelta> {
        let edge = self.generator.config().tile_edge;
        let [x, _, z] = observer_position;
        if !(edge > 0.0 && edge.is_finite()) {
            warn!(tile_edge = edge, "tile edge must be positive, skipping stream step");
            return None;
        }
        if !(x.is_finite() && z.is_finite()) {
            warn!(x, z, "observer position is not finite, skipping stream step");
            return None;
        }
        let coord = GridCoordinate::from_world(x, z, edge);
        if self.observer == Some(coord) {
            return None;
        }
        self.observer = Some(coord);
        let radius = self.generator.config().view_distance.max(0);
        let reach = radius as u32;

        // Unload first so the pool can feed the loads below
        let mut unloaded: Vec<_> = self
            .active
            .keys()
            .copied()
            .filter(|c| c.chebyshev(coord) > reach)
            .collect();
        unloaded.sort();
        for c in &unloaded {
            if let Some(id) = self.active.remove(c) {
                self.tiles[id.0].deactivate(&mut self.backend);
                self.pool.push(id);
            }
        }

        let mut loaded = Vec::new();
        for c in coord.neighborhood(radius) {
            if self.active.contains_key(&c) {
                continue;
            }
            let id = self.acquire();
            self.tiles[id.0].load(c, &self.generator, &mut self.backend);
            self.active.insert(c, id);
            loaded.push(c);
        }

        debug!(
            x = coord.x,
            z = coord.z,
            loaded = loaded.len(),
            unloaded = unloaded.len(),
            pooled = self.pool.len(),
            "stream step"
        );

        if !self.world_ready.is_fired() {
            info!(tiles = self.active.len(), "initial world ready");
            self.world_ready.fire();
        }

        Some(StreamDelta {
            observer: coord,
            loaded,
            unloaded,
        })
    }

    // Pooled tile if any, else a new one
    fn acquire(&mut self) -> TileId {
        if let Some(id) = self.pool.pop() {
            return id;
        }
        let id = TileId(self.tiles.len());
        self.tiles.push(Tile::new(id));
        id
    }

    // World Y of the terrain at the vertex nearest (world_x, world_z), plus `offset`.
    // Uses the active tile when one covers the point, otherwise regenerates the heights.
    pub fn safe_spawn_height(&self, world_x: f32, world_z: f32, offset: f32) -> f32 {
        let config = self.generator.config();
        let edge = config.tile_edge;
        let res = config.resolution;
        if edge <= 0.0 || res == 0 {
            return offset;
        }

        // Tile meshes are centered on `coord * edge`
        let half = edge * 0.5;
        let coord = GridCoordinate::from_world(world_x + half, world_z + half, edge);
        let local_x = world_x - (coord.x as f32 * edge - half);
        let local_z = world_z - (coord.z as f32 * edge - half);
        let spacing = config.vertex_spacing();
        let vx = nearest_vertex(local_x, spacing, res);
        let vz = nearest_vertex(local_z, spacing, res);

        let cached = self
            .tile_at(coord)
            .filter(|t| t.state() == TileState::Active)
            .map(Tile::heights)
            .filter(|h| h.width() == res && h.height() == res);
        let height = match cached {
            Some(h) => h.get(vx, vz),
            None => sample(&self.generator.compute_heights(coord), vx, vz),
        };
        height * config.max_height + offset
    }
}

fn nearest_vertex(local: f32, spacing: f32, res: usize) -> usize {
    if spacing <= 0.0 {
        return 0;
    }
    ((local / spacing).round().max(0.0) as usize).min(res - 1)
}

fn sample(field: &HeightField, x: usize, y: usize) -> f32 {
    if field.width() == 0 || field.height() == 0 {
        return 0.0;
    }
    field.get(x.min(field.width() - 1), y.min(field.height() - 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordingBackend;
    use crate::biome::BiomeTable;
    use crate::config::WorldConfig;
    use std::cell::Cell;
    use std::collections::HashSet;
    use std::rc::Rc;

    fn streamer(view_distance: i32) -> WorldStreamer<RecordingBackend> {
        let cfg = WorldConfig {
            tile_edge: 10.0,
            resolution: 5,
            view_distance,
            ..WorldConfig::default()
        };
        WorldStreamer::new(
            TerrainGenerator::new(cfg, BiomeTable::default_table()),
            RecordingBackend::new(),
        )
    }

    fn assert_window(s: &WorldStreamer<RecordingBackend>, center: GridCoordinate, r: i32) {
        let expected: HashSet<_> = center.neighborhood(r).collect();
        let actual: HashSet<_> = s.active_coords().into_iter().collect();
        assert_eq!(actual, expected);

        let active_ids: HashSet<_> = s.active.values().copied().collect();
        assert!(s.pooled_ids().iter().all(|id| !active_ids.contains(id)));
        assert_eq!(active_ids.len() + s.pooled_count(), s.tile_count());
    }

    #[test]
    fn first_tick_populates_window() {
        let mut s = streamer(2);
        let delta = s.tick([5.0, 0.0, 5.0]).unwrap();
        assert_eq!(delta.loaded.len(), 25);
        assert!(delta.unloaded.is_empty());
        assert_window(&s, GridCoordinate::new(0, 0), 2);
        assert_eq!(s.backend().visible_count(), 25);
    }

    #[test]
    fn same_cell_is_a_no_op() {
        let mut s = streamer(1);
        s.tick([1.0, 0.0, 1.0]);
        assert!(s.tick([9.0, 3.0, 9.0]).is_none());
    }

    #[test]
    fn step_east_swaps_one_column() {
        let mut s = streamer(1);
        s.tick([5.0, 0.0, 5.0]);
        let delta = s.tick([15.0, 0.0, 5.0]).unwrap();

        let loaded: HashSet<_> = delta.loaded.iter().copied().collect();
        let unloaded: HashSet<_> = delta.unloaded.iter().copied().collect();
        let col = |x| (-1..=1).map(move |z| GridCoordinate::new(x, z)).collect::<HashSet<_>>();
        assert_eq!(loaded, col(2));
        assert_eq!(unloaded, col(-1));
        for z in -1..=1 {
            assert!(s.tile_at(GridCoordinate::new(0, z)).is_some());
            assert!(s.tile_at(GridCoordinate::new(1, z)).is_some());
        }
        // the three unloaded tiles were recycled for the new column
        assert_eq!(s.tile_count(), 9);
        assert_eq!(s.pooled_count(), 0);
        assert_window(&s, GridCoordinate::new(1, 0), 1);
    }

    #[test]
    fn teleport_recycles_through_pool() {
        let mut s = streamer(1);
        s.tick([0.0, 0.0, 0.0]);
        s.tick([1000.0, 0.0, -1000.0]);
        assert_eq!(s.tile_count(), 9);
        assert_window(&s, GridCoordinate::from_world(1000.0, -1000.0, 10.0), 1);
    }

    #[test]
    fn world_ready_fires_once() {
        let mut s = streamer(1);
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        s.on_world_ready(move || h.set(h.get() + 1));
        assert!(!s.is_world_ready());

        s.tick([0.0, 0.0, 0.0]);
        s.tick([25.0, 0.0, 0.0]);
        s.tick([-40.0, 0.0, 12.0]);
        assert!(s.is_world_ready());
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn spawn_height_matches_loaded_mesh() {
        let mut s = streamer(1);
        s.tick([0.0, 0.0, 0.0]);
        let tile = s.tile_at(GridCoordinate::new(1, 0)).unwrap();
        // vertex (3, 1) of tile (1, 0): world x = 10 - 5 + 3 * 2.5, z = -5 + 2.5
        let expected = tile.mesh().positions[1 * 5 + 3][1];
        let got = s.safe_spawn_height(12.4, -2.6, 0.0);
        assert!((got - expected).abs() < 1e-5);
        assert!((s.safe_spawn_height(12.4, -2.6, 1.5) - expected - 1.5).abs() < 1e-5);
    }

    #[test]
    fn spawn_height_outside_window_is_recomputed() {
        let mut s = streamer(1);
        s.tick([0.0, 0.0, 0.0]);
        let far = s.safe_spawn_height(500.0, 500.0, 0.0);

        let mut t = streamer(1);
        t.tick([500.0, 0.0, 500.0]);
        assert!((t.safe_spawn_height(500.0, 500.0, 0.0) - far).abs() < 1e-5);
    }

    #[test]
    fn distant_observer_saturates_instead_of_panicking() {
        let mut s = streamer(2);
        s.tick([0.0, 0.0, 0.0]);
        let delta = s.tick([1e12, 0.0, 0.0]).unwrap();

        let center = GridCoordinate::new(i32::MAX, 0);
        assert_eq!(delta.observer, center);
        assert_eq!(delta.unloaded.len(), 25);
        // columns past i32::MAX collapse onto it: 3 distinct x by 5 z
        assert_eq!(s.active_count(), 15);
        assert!(s.active_coords().iter().all(|c| c.chebyshev(center) <= 2));
        assert_eq!(s.tile_count(), 25);
        assert_eq!(s.active_count() + s.pooled_count(), s.tile_count());

        // and back again
        s.tick([-1e12, 0.0, -1e12]);
        assert_eq!(s.observer(), Some(GridCoordinate::new(i32::MIN, i32::MIN)));
        assert_eq!(s.active_count(), 9);
    }

    #[test]
    fn unusable_edge_or_position_skips_the_step() {
        let cfg = WorldConfig {
            tile_edge: 0.0,
            resolution: 5,
            ..WorldConfig::default()
        };
        let mut s = WorldStreamer::new(
            TerrainGenerator::new(cfg, BiomeTable::default_table()),
            RecordingBackend::new(),
        );
        assert!(s.tick([3.0, 0.0, 3.0]).is_none());
        assert!(s.tick([0.0, 0.0, 0.0]).is_none());
        assert_eq!(s.tile_count(), 0);
        assert!(!s.is_world_ready());

        let mut s = streamer(1);
        assert!(s.tick([f32::NAN, 0.0, 0.0]).is_none());
        assert!(s.tick([0.0, 0.0, f32::INFINITY]).is_none());
        assert_eq!(s.observer(), None);
        assert!(s.tick([0.0, 0.0, 0.0]).is_some());
    }
}
