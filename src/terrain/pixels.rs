//! Decoded image intensities and their global altitude extents.

use std::path::Path;

use image::{DynamicImage, ImageBuffer, Pixel};

/// Read-only grid of per-pixel intensities, stored in row-major order.
///
/// Each value is the arithmetic mean of every channel of the source pixel,
/// alpha included, so RGBA and grayscale+alpha images are averaged the same
/// way as their opaque counterparts. Values keep the native sample scale
/// (0..=255 for 8-bit images, 0..=65535 for 16-bit).
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    values: Vec<f64>,
}

impl PixelBuffer {
    /// Creates a buffer from already averaged intensities.
    ///
    /// Returns `None` if `values.len()` does not equal `width * height`.
    pub fn from_values(width: u32, height: u32, values: Vec<f64>) -> Option<Self> {
        if values.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Self { width, height, values })
    }

    /// Creates a buffer from interleaved multi-channel samples, averaging
    /// the channels of each pixel.
    pub fn from_channels(width: u32, height: u32, channels: usize, samples: &[f64]) -> Option<Self> {
        if channels == 0 || samples.len() != (width as usize) * (height as usize) * channels {
            return None;
        }
        let values = samples
            .chunks_exact(channels)
            .map(|px| px.iter().sum::<f64>() / channels as f64)
            .collect();
        Some(Self { width, height, values })
    }

    /// Converts a decoded image, honouring its native channel count.
    ///
    /// Integer samples are summed exactly and divided once, so an intensity
    /// that sits halfway between two levels stays exactly halfway.
    pub fn from_image(image: &DynamicImage) -> Self {
        let (width, height) = (image.width(), image.height());
        let values = match image {
            DynamicImage::ImageLuma8(img) => mean_samples(img),
            DynamicImage::ImageLumaA8(img) => mean_samples(img),
            DynamicImage::ImageRgb8(img) => mean_samples(img),
            DynamicImage::ImageRgba8(img) => mean_samples(img),
            DynamicImage::ImageLuma16(img) => mean_samples(img),
            DynamicImage::ImageLumaA16(img) => mean_samples(img),
            DynamicImage::ImageRgb16(img) => mean_samples(img),
            DynamicImage::ImageRgba16(img) => mean_samples(img),
            DynamicImage::ImageRgb32F(img) => mean_samples(img),
            DynamicImage::ImageRgba32F(img) => mean_samples(img),
            other => mean_samples(&other.to_rgba16()),
        };

        Self { width, height, values }
    }

    /// Decodes an image file in any format supported by the `image` crate.
    pub fn open(path: &Path) -> Result<Self, image::ImageError> {
        let image = image::open(path)?;
        Ok(Self::from_image(&image))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the intensity at `(x, y)`.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> f64 {
        self.values[(y as usize) * (self.width as usize) + x as usize]
    }

    /// Number of whole `tile_size` tiles along each axis; partial edge tiles are dropped.
    pub fn tile_grid(&self, tile_size: u32) -> (u32, u32) {
        if tile_size == 0 {
            return (0, 0);
        }
        (self.width / tile_size, self.height / tile_size)
    }
}

fn mean_samples<P>(img: &ImageBuffer<P, Vec<P::Subpixel>>) -> Vec<f64>
where
    P: Pixel,
    P::Subpixel: Into<f64>,
{
    img.pixels()
        .map(|p| {
            let channels = p.channels();
            channels.iter().map(|&s| s.into()).sum::<f64>() / channels.len() as f64
        })
        .collect()
}

/// Observed intensity extrema over a whole image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AltitudeRange {
    pub min: f64,
    pub max: f64,
}

impl AltitudeRange {
    /// Scans every pixel of the buffer, not just the ones covered by whole tiles.
    pub fn observe(buffer: &PixelBuffer) -> Self {
        let mut min = f64::MAX;
        let mut max = f64::MIN;
        for &v in &buffer.values {
            min = min.min(v);
            max = max.max(v);
        }
        Self { min, max }
    }

    /// Returns true if the range cannot be rescaled (flat or empty image).
    pub fn is_degenerate(&self) -> bool {
        !(self.max > self.min)
    }

    /// Intensity delta covered by one altitude level.
    pub fn step(&self, max_level: u32) -> f64 {
        (self.max - self.min) / max_level as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma, Rgb, Rgba};

    #[test]
    fn test_from_channels_averages() {
        let buffer = PixelBuffer::from_channels(2, 1, 3, &[0.0, 3.0, 6.0, 1.0, 1.0, 1.0]).unwrap();
        assert_eq!(buffer.get(0, 0), 3.0);
        assert_eq!(buffer.get(1, 0), 1.0);
    }

    #[test]
    fn test_from_values_rejects_bad_length() {
        assert!(PixelBuffer::from_values(3, 3, vec![0.0; 8]).is_none());
        assert!(PixelBuffer::from_channels(1, 1, 0, &[]).is_none());
    }

    #[test]
    fn test_from_image_gray() {
        let img: ImageBuffer<Luma<u8>, Vec<u8>> =
            ImageBuffer::from_fn(4, 2, |x, _| Luma([(x * 50) as u8]));
        let buffer = PixelBuffer::from_image(&DynamicImage::ImageLuma8(img));

        assert_eq!(buffer.width(), 4);
        assert_eq!(buffer.height(), 2);
        assert_eq!(buffer.get(0, 1), 0.0);
        assert_eq!(buffer.get(3, 0), 150.0);
    }

    #[test]
    fn test_from_image_rgb_mean() {
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(1, 1, Rgb([255, 0, 0]));
        let buffer = PixelBuffer::from_image(&DynamicImage::ImageRgb8(img));
        assert_eq!(buffer.get(0, 0), 85.0);
    }

    #[test]
    fn test_from_image_rgba_includes_alpha() {
        let img: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_pixel(1, 1, Rgba([0, 0, 0, 255]));
        let buffer = PixelBuffer::from_image(&DynamicImage::ImageRgba8(img));
        assert_eq!(buffer.get(0, 0), 63.75);
    }

    #[test]
    fn test_from_image_keeps_16bit_scale() {
        let img: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::from_fn(2, 1, |x, _| Luma([x as u16 * 65535]));
        let buffer = PixelBuffer::from_image(&DynamicImage::ImageLuma16(img));
        assert_eq!(buffer.get(1, 0), 65535.0);

        let range = AltitudeRange::observe(&buffer);
        assert_eq!(range, AltitudeRange { min: 0.0, max: 65535.0 });
    }

    #[test]
    fn test_from_image_rgb_mean_is_exact() {
        // (1 + 1 + 2) / 3 computed once, no per-channel normalization
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(1, 1, Rgb([1, 1, 2]));
        let buffer = PixelBuffer::from_image(&DynamicImage::ImageRgb8(img));
        assert_eq!(buffer.get(0, 0), 4.0 / 3.0);
    }

    #[test]
    fn test_altitude_range() {
        let buffer = PixelBuffer::from_values(2, 2, vec![4.0, 10.0, 7.0, 2.0]).unwrap();
        let range = AltitudeRange::observe(&buffer);
        assert_eq!(range, AltitudeRange { min: 2.0, max: 10.0 });
        assert!(!range.is_degenerate());
        assert_eq!(range.step(4), 2.0);

        let flat = PixelBuffer::from_values(2, 1, vec![5.0, 5.0]).unwrap();
        assert!(AltitudeRange::observe(&flat).is_degenerate());
    }

    #[test]
    fn test_tile_grid_drops_partial_tiles() {
        let buffer = PixelBuffer::from_values(70, 33, vec![0.0; 70 * 33]).unwrap();
        assert_eq!(buffer.tile_grid(32), (2, 1));
        assert_eq!(buffer.tile_grid(0), (0, 0));
    }
}
