use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

// Single-octave 2D gradient noise, the base signal every NoiseField layer samples
#[derive(Clone)]
pub struct Perlin2D {
    perm: [u8; 512], // permutation table (256 duplicated)
}

impl Perlin2D {
    pub fn new(seed: u64) -> Self {
        let mut p: Vec<u8> = (0..=255u8).collect();
        // Salted so the table does not correlate with the octave offsets drawn from the same seed
        let mut rng = ChaCha8Rng::seed_from_u64(seed ^ 0xDEAD_BEEF_CAFE_BABE);
        p.shuffle(&mut rng);

        // Duplicate into 512 entries so corner lookups never need a modulo
        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = p[i & 255];
        }
        Self { perm }
    }

    // Fade curve 6t^5 - 15t^4 + 10t^3, zero first and second derivative at 0 and 1
    #[inline]
    fn fade(t: f64) -> f64 {
        t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
    }

    #[inline]
    fn lerp(a: f64, b: f64, t: f64) -> f64 {
        a + t * (b - a)
    }

    // Pick one of the gradient directions from the low 4 bits of the hash
    #[inline]
    fn grad(hash: u8, x: f64, y: f64) -> f64 {
        let h = (hash & 0xF) as usize;
        let u = if h < 8 { x } else { y };
        let v = if h < 8 { y } else { x };
        let sign_u = if (h & 1) == 0 { u } else { -u };
        let sign_v = if (h & 2) == 0 { v } else { -v };
        sign_u + sign_v
    }

    // Raw noise at (x, y), roughly in [-1, 1]
    pub fn noise(&self, x: f64, y: f64) -> f64 {
        let xi = (x.floor() as i64 & 255) as usize;
        let yi = (y.floor() as i64 & 255) as usize;
        let xf = x - x.floor();
        let yf = y - y.floor();
        let u = Self::fade(xf);
        let v = Self::fade(yf);

        let p = &self.perm;
        let aa = p[p[xi] as usize + yi];
        let ab = p[p[xi] as usize + yi + 1];
        let ba = p[p[xi + 1] as usize + yi];
        let bb = p[p[xi + 1] as usize + yi + 1];

        let x1 = Self::lerp(Self::grad(aa, xf, yf), Self::grad(ba, xf - 1.0, yf), u);
        let x2 = Self::lerp(
            Self::grad(ab, xf, yf - 1.0),
            Self::grad(bb, xf - 1.0, yf - 1.0),
            u,
        );
        Self::lerp(x1, x2, v)
    }

    // Noise remapped into [0, 1]
    pub fn sample01(&self, x: f64, y: f64) -> f64 {
        (self.noise(x, y) * 0.5 + 0.5).clamp(0.0, 1.0)
    }
}
