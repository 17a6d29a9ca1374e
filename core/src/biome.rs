// Biome lookup from per-vertex climate.
//
// Each vertex takes the first biome whose temperature and humidity ranges
// both contain it (half-open, `min <= v < max`). Vertices matching nothing
// fall back to the table default, then to the first entry. An empty table
// paints the sentinel color so bad data shows up on screen instead of
// halting the world.

use tracing::warn;

use crate::utils::{HeightField, SplatColor, SplatField};

// Conspicuous magenta written when no biome data is available at all
pub fn sentinel_color() -> SplatColor {
    SplatColor::new(1.0, 0.0, 1.0, 1.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct BiomeDefinition {
    pub name: String,
    pub temperature: (f32, f32), // [min, max)
    pub humidity: (f32, f32),    // [min, max)
    pub color: SplatColor,
    pub material: String,
    pub graph_position: (f32, f32),
}

impl BiomeDefinition {
    pub fn matches(&self, temperature: f32, humidity: f32) -> bool {
        self.temperature.0 <= temperature
            && temperature < self.temperature.1
            && self.humidity.0 <= humidity
            && humidity < self.humidity.1
    }
}

// Immutable biome list, shared by every tile
#[derive(Debug, Clone, Default)]
pub struct BiomeTable {
    biomes: Vec<BiomeDefinition>,
    default: Option<usize>,
}

impl BiomeTable {
    // `default` is an index into `biomes`; out-of-range indices are dropped
    pub fn new(biomes: Vec<BiomeDefinition>, default: Option<usize>) -> Self {
        let default = default.filter(|&i| {
            let ok = i < biomes.len();
            if !ok {
                warn!(index = i, "default biome index out of range, ignoring");
            }
            ok
        });
        Self { biomes, default }
    }

    pub fn default_table() -> Self {
        let biome = |name: &str, t: (f32, f32), h: (f32, f32), c: [f32; 3], g: (f32, f32)| {
            BiomeDefinition {
                name: name.to_string(),
                temperature: t,
                humidity: h,
                color: SplatColor::new(c[0], c[1], c[2], 1.0),
                material: format!("terrain/{name}"),
                graph_position: g,
            }
        };
        Self::new(
            vec![
                biome("tundra", (0.0, 0.35), (0.0, 1.01), [0.65, 0.75, 0.70], (0.2, 0.5)),
                biome("desert", (0.65, 1.01), (0.0, 0.4), [0.89, 0.83, 0.61], (0.8, 0.2)),
                biome("swamp", (0.55, 1.01), (0.7, 1.01), [0.35, 0.50, 0.25], (0.8, 0.85)),
                biome("forest", (0.35, 1.01), (0.5, 1.01), [0.25, 0.55, 0.20], (0.5, 0.75)),
                biome("plains", (0.35, 1.01), (0.0, 0.5), [0.45, 0.75, 0.30], (0.5, 0.3)),
            ],
            Some(4),
        )
    }

    pub fn biomes(&self) -> &[BiomeDefinition] {
        &self.biomes
    }

    pub fn get(&self, index: usize) -> Option<&BiomeDefinition> {
        self.biomes.get(index)
    }

    pub fn is_empty(&self) -> bool {
        self.biomes.is_empty()
    }

    // Index of the biome for one climate sample; None only when the table is empty
    pub fn lookup(&self, temperature: f32, humidity: f32) -> Option<usize> {
        self.biomes
            .iter()
            .position(|b| b.matches(temperature, humidity))
            .or(self.default)
            .or_else(|| (!self.biomes.is_empty()).then_some(0))
    }

    fn color_of(&self, index: Option<usize>) -> SplatColor {
        index
            .and_then(|i| self.biomes.get(i))
            .map_or_else(sentinel_color, |b| b.color)
    }

    // Writes one splat color per vertex and returns the dominant biome,
    // which is whatever classifies the center vertex
    pub fn classify_into(
        &self,
        temperature: &HeightField,
        humidity: &HeightField,
        out: &mut SplatField,
    ) -> Option<usize> {
        let w = temperature.width();
        let h = temperature.height();
        if !temperature.same_size(humidity) {
            warn!(
                temperature = ?(w, h),
                humidity = ?(humidity.width(), humidity.height()),
                "climate fields differ in size, painting sentinel"
            );
            out.reset(w, h, sentinel_color());
            return None;
        }
        if self.biomes.is_empty() {
            warn!("biome table is empty, painting sentinel");
        }

        out.reset(w, h, sentinel_color());
        for y in 0..h {
            for x in 0..w {
                let i = self.lookup(temperature.get(x, y), humidity.get(x, y));
                out.set(x, y, self.color_of(i));
            }
        }

        if w == 0 || h == 0 {
            return None;
        }
        let (cx, cy) = (w / 2, h / 2);
        self.lookup(temperature.get(cx, cy), humidity.get(cx, cy))
    }

    pub fn classify(
        &self,
        temperature: &HeightField,
        humidity: &HeightField,
    ) -> (SplatField, Option<&BiomeDefinition>) {
        let mut splat = SplatField::default();
        let dominant = self.classify_into(temperature, humidity, &mut splat);
        (splat, dominant.and_then(|i| self.biomes.get(i)))
    }
}
