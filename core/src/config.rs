// Startup configuration, immutable while streaming

// Smallest scale a noise layer may use; non-positive scales are clamped to it
pub const MIN_NOISE_SCALE: f64 = 1e-4;

#[derive(Debug, Clone, PartialEq)]
pub struct NoiseConfig {
    pub seed: u64,
    pub scale: f64,         // world-to-noise zoom, larger = smoother
    pub octaves: usize,     // number of layers to sum
    pub persistence: f64,   // amplitude decay per octave, 0..1
    pub lacunarity: f64,    // frequency growth per octave, >= 1
    pub offset: (f64, f64), // global 2D shift added to every octave
}

impl NoiseConfig {
    pub fn new(seed: u64, scale: f64) -> Self {
        Self {
            seed,
            scale,
            ..Self::default()
        }
    }

    // Scale actually used for sampling
    pub fn effective_scale(&self) -> f64 {
        if self.scale <= 0.0 || !self.scale.is_finite() {
            MIN_NOISE_SCALE
        } else {
            self.scale
        }
    }
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            scale: 50.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            offset: (0.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorldConfig {
    pub tile_edge: f32,       // world units per tile edge
    pub resolution: usize,    // vertices per tile edge
    pub max_height: f32,      // world height of a normalized 1.0
    pub view_distance: i32,   // tiles kept around the observer (Chebyshev)
    pub max_slope_deg: f32,   // steepest navigable slope
    pub flatten_strength: f32, // build-zone blend towards the blurred field
    pub collision_layer: u32, // shared with physics and navigation
    pub slope_relaxation_passes: usize,
    pub height_noise: Option<NoiseConfig>,
    pub temperature_noise: Option<NoiseConfig>,
    pub humidity_noise: Option<NoiseConfig>,
    pub build_zone_noise: Option<NoiseConfig>,
}

impl WorldConfig {
    // Distance between neighbouring vertices in world units
    pub fn vertex_spacing(&self) -> f32 {
        if self.resolution < 2 {
            return self.tile_edge;
        }
        self.tile_edge / (self.resolution - 1) as f32
    }

    pub fn vertex_count(&self) -> usize {
        self.resolution * self.resolution
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            tile_edge: 64.0,
            resolution: 33,
            max_height: 24.0,
            view_distance: 2,
            max_slope_deg: 40.0,
            flatten_strength: 0.8,
            collision_layer: 8,
            slope_relaxation_passes: 3,
            height_noise: Some(NoiseConfig {
                seed: 2025,
                scale: 60.0,
                octaves: 5,
                persistence: 0.5,
                lacunarity: 2.0,
                offset: (0.0, 0.0),
            }),
            temperature_noise: Some(NoiseConfig {
                seed: 7,
                scale: 180.0,
                octaves: 2,
                ..NoiseConfig::default()
            }),
            humidity_noise: Some(NoiseConfig {
                seed: 11,
                scale: 140.0,
                octaves: 2,
                ..NoiseConfig::default()
            }),
            build_zone_noise: Some(NoiseConfig {
                seed: 31,
                scale: 90.0,
                octaves: 1,
                ..NoiseConfig::default()
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_positive_scale_is_clamped() {
        assert_eq!(NoiseConfig::new(1, 0.0).effective_scale(), MIN_NOISE_SCALE);
        assert_eq!(NoiseConfig::new(1, -3.0).effective_scale(), MIN_NOISE_SCALE);
        assert_eq!(NoiseConfig::new(1, 12.0).effective_scale(), 12.0);
    }

    #[test]
    fn spacing_spans_the_tile() {
        let cfg = WorldConfig {
            tile_edge: 32.0,
            resolution: 5,
            ..WorldConfig::default()
        };
        assert_eq!(cfg.vertex_spacing(), 8.0);
        assert_eq!(cfg.vertex_count(), 25);
    }
}
