// PNG-ready previews of generated fields

use image::{Rgb, RgbImage};
use palette::{Gradient, LinSrgb};

use crate::utils::{HeightField, SplatColor, SplatField};

// Deep water to beach to grass to rock to snow
fn height_gradient() -> Gradient<LinSrgb> {
    Gradient::with_domain(vec![
        (0.00, LinSrgb::new(0.0, 0.0, 0.5)),
        (0.30, LinSrgb::new(0.8, 0.8, 0.5)),
        (0.50, LinSrgb::new(0.1, 0.6, 0.2)),
        (0.75, LinSrgb::new(0.5, 0.4, 0.3)),
        (1.00, LinSrgb::new(1.0, 1.0, 1.0)),
    ])
}

pub fn height_to_image(field: &HeightField) -> RgbImage {
    let gradient = height_gradient();
    let mut img = RgbImage::new(field.width() as u32, field.height() as u32);
    for y in 0..field.height() {
        for x in 0..field.width() {
            let col: LinSrgb = gradient.get(field.get(x, y).clamp(0.0, 1.0));
            let rgb = col.into_format::<u8>();
            img.put_pixel(x as u32, y as u32, Rgb([rgb.red, rgb.green, rgb.blue]));
        }
    }
    img
}

#[inline]
pub fn splat_to_rgb(c: SplatColor) -> [u8; 3] {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    [channel(c.red), channel(c.green), channel(c.blue)]
}

pub fn splat_to_image(field: &SplatField) -> RgbImage {
    let mut img = RgbImage::new(field.width() as u32, field.height() as u32);
    for y in 0..field.height() {
        for x in 0..field.width() {
            img.put_pixel(x as u32, y as u32, Rgb(splat_to_rgb(field.get(x, y))));
        }
    }
    img
}
