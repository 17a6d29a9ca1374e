use palette::LinSrgba;

// Per-vertex blend weight, linear RGBA
pub type SplatColor = LinSrgba<f32>;

// Row-major 2D grid, one value per vertex
// access as `field.get(x, y)`, storage index is `y * width + x`.
#[derive(Debug, Clone, PartialEq)]
pub struct Field2D<T> {
    width: usize,
    height: usize,
    values: Vec<T>,
}

// Normalized [0,1] elevation per vertex
pub type HeightField = Field2D<f32>;
pub type SplatField = Field2D<SplatColor>;

impl<T: Copy> Field2D<T> {
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            values: vec![value; width * height],
        }
    }

    // Build from a row-major vector; returns None if the length does not match
    pub fn from_vec(width: usize, height: usize, values: Vec<T>) -> Option<Self> {
        (values.len() == width * height).then_some(Self {
            width,
            height,
            values,
        })
    }

    // Resize in place, keeping the allocation when the size is unchanged
    pub fn reset(&mut self, width: usize, height: usize, value: T) {
        self.width = width;
        self.height = height;
        self.values.clear();
        self.values.resize(width * height, value);
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.values[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        self.values[y * self.width + x] = value;
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn same_size<U>(&self, other: &Field2D<U>) -> bool {
        self.width == other.width && self.height == other.height
    }
}

impl<T> Default for Field2D<T> {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            values: Vec::new(),
        }
    }
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
