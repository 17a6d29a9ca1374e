// Seeded multi-octave fractal noise over a rectangular vertex grid.
//
// Samples are taken in grid-step units: a tile at coordinate `c` uses
// `sample_offset = c * (resolution - 1)`, so the last column of one tile and
// the first column of its neighbour evaluate exactly the same noise inputs.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::warn;

use crate::config::NoiseConfig;
use crate::error::{Result, TerrainError};
use crate::perlin2::Perlin2D;
use crate::utils::HeightField;

// Range the per-octave offsets are drawn from
const OCTAVE_OFFSET_RANGE: f64 = 100_000.0;

#[derive(Clone)]
pub struct NoiseField {
    base: Perlin2D,
    scale: f64,
    persistence: f64,
    lacunarity: f64,
    octave_offsets: Vec<(f64, f64)>,
    max_amplitude: f64, // sum of persistence^i, used to normalize
}

impl NoiseField {
    pub fn new(config: &NoiseConfig) -> Self {
        let scale = config.effective_scale();
        if scale != config.scale {
            warn!(
                scale = config.scale,
                clamped = scale,
                "noise scale must be positive, clamping"
            );
        }

        if config.octaves == 0 {
            warn!("noise layer has zero octaves, using one");
        }
        let octaves = config.octaves.max(1);
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let octave_offsets = (0..octaves)
            .map(|_| {
                let ox = rng.gen_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE) + config.offset.0;
                let oy = rng.gen_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE) + config.offset.1;
                (ox, oy)
            })
            .collect();

        let mut max_amplitude = 0.0;
        let mut amplitude = 1.0;
        for _ in 0..octaves {
            max_amplitude += amplitude;
            amplitude *= config.persistence;
        }

        Self {
            base: Perlin2D::new(config.seed),
            scale,
            persistence: config.persistence,
            lacunarity: config.lacunarity,
            octave_offsets,
            max_amplitude,
        }
    }

    pub fn octave_offsets(&self) -> &[(f64, f64)] {
        &self.octave_offsets
    }

    // Fractal value at one grid position, normalized into [0, 1]
    pub fn sample(&self, gx: f64, gy: f64) -> f32 {
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut total = 0.0;

        for &(ox, oy) in &self.octave_offsets {
            let sx = gx / self.scale * frequency + ox;
            let sy = gy / self.scale * frequency + oy;
            total += (self.base.sample01(sx, sy) * 2.0 - 1.0) * amplitude;
            amplitude *= self.persistence;
            frequency *= self.lacunarity;
        }

        if self.max_amplitude <= 0.0 {
            return 0.5;
        }
        ((total / self.max_amplitude + 1.0) * 0.5).clamp(0.0, 1.0) as f32
    }

    // Allocate and fill a `width` x `height` field
    pub fn generate(
        &self,
        width: usize,
        height: usize,
        sample_offset: (f64, f64),
    ) -> Result<HeightField> {
        let mut field = HeightField::default();
        self.fill(&mut field, width, height, sample_offset)?;
        Ok(field)
    }

    // Refill an existing buffer in place
    pub fn fill(
        &self,
        field: &mut HeightField,
        width: usize,
        height: usize,
        sample_offset: (f64, f64),
    ) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(TerrainError::InvalidConfig(format!(
                "noise field must be at least 1x1, got {width}x{height}"
            )));
        }

        field.reset(width, height, 0.0);
        for y in 0..height {
            for x in 0..width {
                let v = self.sample(x as f64 + sample_offset.0, y as f64 + sample_offset.1);
                field.set(x, y, v);
            }
        }
        Ok(())
    }
}
