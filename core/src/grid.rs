// Tile-space addressing

// Integer tile coordinate (not world units)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct GridCoordinate {
    pub x: i32,
    pub z: i32,
}

impl GridCoordinate {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    // Tile containing a world XZ position, `floor(pos / edge)` per axis
    pub fn from_world(world_x: f32, world_z: f32, tile_edge: f32) -> Self {
        Self {
            x: (world_x / tile_edge).floor() as i32,
            z: (world_z / tile_edge).floor() as i32,
        }
    }

    // Max of per-axis absolute differences; exact across the whole i32 range
    pub fn chebyshev(self, other: GridCoordinate) -> u32 {
        self.x.abs_diff(other.x).max(self.z.abs_diff(other.z))
    }

    // Every coordinate within `radius` (Chebyshev), row by row.
    // Saturates at the edge of the i32 range, so coordinates may repeat there.
    pub fn neighborhood(self, radius: i32) -> impl Iterator<Item = GridCoordinate> {
        let r = radius.max(0);
        (-r..=r).flat_map(move |dz| {
            (-r..=r).map(move |dx| {
                GridCoordinate::new(self.x.saturating_add(dx), self.z.saturating_add(dz))
            })
        })
    }

    // Noise sample offset in grid-step units; neighbours share their edge samples
    pub fn sample_offset(self, resolution: usize) -> (f64, f64) {
        let steps = resolution.saturating_sub(1) as f64;
        (self.x as f64 * steps, self.z as f64 * steps)
    }
}

#[cfg(test)]
mod tests {
    use super::GridCoordinate;

    #[test]
    fn from_world_floors_negative_positions() {
        assert_eq!(
            GridCoordinate::from_world(-0.1, 0.0, 10.0),
            GridCoordinate::new(-1, 0)
        );
        assert_eq!(
            GridCoordinate::from_world(19.9, -20.0, 10.0),
            GridCoordinate::new(1, -2)
        );
    }

    #[test]
    fn neighborhood_is_square() {
        let c = GridCoordinate::new(3, -2);
        let n: Vec<_> = c.neighborhood(2).collect();
        assert_eq!(n.len(), 25);
        assert!(n.iter().all(|&p| p.chebyshev(c) <= 2));
    }

    #[test]
    fn extreme_coordinates_do_not_overflow() {
        let lo = GridCoordinate::new(i32::MIN, 0);
        let hi = GridCoordinate::new(i32::MAX, 0);
        assert_eq!(lo.chebyshev(hi), u32::MAX);

        let n: Vec<_> = hi.neighborhood(1).collect();
        assert_eq!(n.len(), 9);
        assert!(n.iter().all(|p| p.x >= i32::MAX - 1));
    }

    #[test]
    fn sample_offset_uses_grid_steps() {
        assert_eq!(GridCoordinate::new(2, -1).sample_offset(33), (64.0, -32.0));
    }
}
