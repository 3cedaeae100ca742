//! Procedural finish textures.
//!
//! Textures are seeded, so the same material always yields the same pixels
//! in the interactive view and in every export.

use std::f64::consts::PI;
use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::{MaterialSpec, TexturePattern};

/// Edge length used by the interactive view.
pub const PRESENTER_TEXTURE_SIZE: u32 = 512;
/// Export cap for mobile viewers.
pub const EXPORT_TEXTURE_CAP: u32 = 1024;

const JITTER_LEN: usize = 64;

fn seed_for(pattern: TexturePattern) -> u64 {
    match pattern {
        TexturePattern::Grain => 0x5eed_0001,
        TexturePattern::Brushed => 0x5eed_0002,
        TexturePattern::Speckle => 0x5eed_0003,
    }
}

/// Square texture of `size` pixels tinted by the material's base colour.
///
/// Materials without a pattern get a flat fill.
#[must_use]
pub fn finish_texture(spec: &MaterialSpec, size: u32) -> RgbaImage {
    let size = size.max(1);
    let Some(pattern) = spec.pattern else {
        return RgbaImage::from_pixel(size, size, tint(spec, 1.0));
    };

    let mut rng = StdRng::seed_from_u64(seed_for(pattern));
    let jitter: Vec<f64> = (0..JITTER_LEN)
        .map(|_| rng.random_range(-1.0..=1.0))
        .collect();
    let extent = f64::from(size);

    RgbaImage::from_fn(size, size, |x, y| {
        let noise: f64 = rng.random_range(-1.0..=1.0);
        let (u, v) = (f64::from(x) / extent, f64::from(y) / extent);
        let shade = match pattern {
            TexturePattern::Grain => {
                let phase = jitter[x as usize % JITTER_LEN] * 0.35;
                let ring = ((v * 40.0 + u * 3.0 + phase) * PI).sin();
                0.9 + 0.08 * ring + 0.04 * noise
            }
            TexturePattern::Brushed => 0.92 + 0.06 * jitter[y as usize % JITTER_LEN] + 0.02 * noise,
            TexturePattern::Speckle => 0.97 + 0.03 * noise,
        };
        tint(spec, shade)
    })
}

fn tint(spec: &MaterialSpec, shade: f64) -> Rgba<u8> {
    let channel = |c: f64| ((c * shade).clamp(0.0, 1.0) * 255.0).round() as u8;
    let [r, g, b] = spec.base_color.to_array();
    Rgba([channel(r), channel(g), channel(b), 255])
}

/// Encodes as PNG, downscaling first when an edge exceeds `max_size`.
pub fn encode_png(image: &RgbaImage, max_size: u32) -> Result<Vec<u8>, image::ImageError> {
    let max_size = max_size.max(1);
    let mut out = Cursor::new(Vec::new());
    if image.width() > max_size || image.height() > max_size {
        let ratio = f64::from(max_size) / f64::from(image.width().max(image.height()));
        let w = ((f64::from(image.width()) * ratio).round() as u32).clamp(1, max_size);
        let h = ((f64::from(image.height()) * ratio).round() as u32).clamp(1, max_size);
        imageops::resize(image, w, h, FilterType::Triangle).write_to(&mut out, ImageFormat::Png)?;
    } else {
        image.write_to(&mut out, ImageFormat::Png)?;
    }
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HANDLE_METAL, MaterialKind, WoodSpecies};

    #[test]
    fn textures_are_deterministic() {
        let spec = MaterialKind::Wood(WoodSpecies::Oak).spec();
        assert_eq!(finish_texture(&spec, 64), finish_texture(&spec, 64));
    }

    #[test]
    fn texture_is_tinted_by_base_colour() {
        let spec = MaterialKind::Wood(WoodSpecies::Cherry).spec();
        let img = finish_texture(&spec, 32);
        let avg_r: f64 = img.pixels().map(|p| f64::from(p.0[0])).sum::<f64>() / 1024.0;
        let avg_b: f64 = img.pixels().map(|p| f64::from(p.0[2])).sum::<f64>() / 1024.0;
        assert!(avg_r > avg_b * 2.0);
        assert!(img.pixels().all(|p| p.0[3] == 255));
    }

    #[test]
    fn flat_fill_without_pattern() {
        let img = finish_texture(&HANDLE_METAL, 4);
        assert!(img.pixels().all(|p| *p == img.pixels().next().copied().unwrap()));
    }

    #[test]
    fn png_respects_cap() {
        let spec = MaterialKind::Plastic.spec();
        let img = finish_texture(&spec, 64);
        let png = encode_png(&img, 16).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        // IHDR width/height, big-endian
        assert_eq!(u32::from_be_bytes([png[16], png[17], png[18], png[19]]), 16);
        assert_eq!(u32::from_be_bytes([png[20], png[21], png[22], png[23]]), 16);
        let full = encode_png(&img, EXPORT_TEXTURE_CAP).unwrap();
        assert_eq!(u32::from_be_bytes([full[16], full[17], full[18], full[19]]), 64);
    }
}
