//! Quantized altitude grid for one tile.

use thiserror::Error;

use super::pixels::{AltitudeRange, PixelBuffer};

/// Errors raised while quantizing a tile.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HeightFieldError {
    #[error("Degenerate altitude range: min ({min}) >= max ({max}); the image has no relief")]
    DegenerateAltitudeRange { min: f64, max: f64 },
    #[error("Tile at pixel ({x}, {y}) with size {size} exceeds the {width}x{height} image")]
    TileOutOfBounds { x: u32, y: u32, size: u32, width: u32, height: u32 },
}

/// Square grid of integer altitude levels in `[0, max_level]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeightField {
    size: usize,
    max_level: u32,
    levels: Vec<u32>,
}

impl HeightField {
    /// Quantizes the `size`x`size` pixel region whose top-left pixel is `(origin_x, origin_y)`.
    ///
    /// Each level is `round((v - range.min) / ((range.max - range.min) / max_level))`,
    /// rounding halves to even.
    ///
    /// # Arguments
    /// * `buffer` - The decoded image
    /// * `origin_x`, `origin_y` - Top-left pixel of the tile
    /// * `size` - Tile edge length in pixels (studs)
    /// * `range` - Altitude extents of the whole image
    /// * `max_level` - Level assigned to `range.max`
    pub fn build(
        buffer: &PixelBuffer,
        origin_x: u32,
        origin_y: u32,
        size: u32,
        range: &AltitudeRange,
        max_level: u32,
    ) -> Result<Self, HeightFieldError> {
        if range.is_degenerate() {
            return Err(HeightFieldError::DegenerateAltitudeRange {
                min: range.min,
                max: range.max,
            });
        }
        if origin_x + size > buffer.width() || origin_y + size > buffer.height() {
            return Err(HeightFieldError::TileOutOfBounds {
                x: origin_x,
                y: origin_y,
                size,
                width: buffer.width(),
                height: buffer.height(),
            });
        }

        let step = range.step(max_level);
        let mut levels = Vec::with_capacity((size as usize) * (size as usize));
        for y in 0..size {
            for x in 0..size {
                let level = if max_level == 0 {
                    0
                } else {
                    let v = buffer.get(origin_x + x, origin_y + y);
                    let q = ((v - range.min) / step).round_ties_even();
                    q.clamp(0.0, max_level as f64) as u32
                };
                levels.push(level);
            }
        }

        Ok(Self { size: size as usize, max_level, levels })
    }

    /// Builds a height field directly from row-major levels.
    ///
    /// Returns `None` if the grid is not `size`x`size` or a level exceeds `max_level`.
    pub fn from_levels(size: usize, max_level: u32, levels: Vec<u32>) -> Option<Self> {
        if levels.len() != size * size || levels.iter().any(|&l| l > max_level) {
            return None;
        }
        Some(Self { size, max_level, levels })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Highest level any column can reach.
    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u32 {
        self.levels[y * self.size + x]
    }

    /// All levels in row-major order.
    pub fn levels(&self) -> &[u32] {
        &self.levels
    }

    /// One digit (`level % 10`) per column, one text row per grid row.
    pub fn render_ascii(&self) -> String {
        render_digits(self.size, &self.levels)
    }
}

pub(crate) fn render_digits(size: usize, values: &[u32]) -> String {
    let mut out = String::with_capacity(size * (size + 1));
    for row in values.chunks(size) {
        for &v in row {
            out.push(char::from(b'0' + (v % 10) as u8));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(width: u32, height: u32) -> PixelBuffer {
        let values = (0..width * height).map(|i| (i % width) as f64).collect();
        PixelBuffer::from_values(width, height, values).unwrap()
    }

    #[test]
    fn test_linear_rescale() {
        // Intensities 0..=8 mapped onto 4 levels: step 2.0
        let buffer = ramp(9, 9);
        let range = AltitudeRange::observe(&buffer);
        let field = HeightField::build(&buffer, 0, 0, 9, &range, 4).unwrap();

        let row: Vec<u32> = (0..9).map(|x| field.get(x, 3)).collect();
        // 1/2 = 0.5 -> 0, 3/2 = 1.5 -> 2, 5/2 = 2.5 -> 2, 7/2 = 3.5 -> 4
        assert_eq!(row, vec![0, 0, 1, 2, 2, 2, 3, 4, 4]);
    }

    fn decoded_gray(samples: [u8; 9]) -> PixelBuffer {
        let img: image::ImageBuffer<image::Luma<u8>, Vec<u8>> =
            image::ImageBuffer::from_fn(3, 3, |x, y| image::Luma([samples[(y * 3 + x) as usize]]));
        PixelBuffer::from_image(&image::DynamicImage::ImageLuma8(img))
    }

    #[test]
    fn test_decoded_ties_round_half_even() {
        let buffer = decoded_gray([0, 25, 75, 30, 50, 70, 100, 100, 100]);
        let range = AltitudeRange::observe(&buffer);
        assert_eq!(range, AltitudeRange { min: 0.0, max: 100.0 });

        // step 50: 25 -> 0.5 -> 0, 75 -> 1.5 -> 2
        let field = HeightField::build(&buffer, 0, 0, 3, &range, 2).unwrap();
        assert_eq!(field.get(1, 0), 0);
        assert_eq!(field.get(2, 0), 2);

        // step 20: 30 -> 1.5 -> 2, 70 -> 3.5 -> 4, 50 -> 2.5 -> 2
        let field = HeightField::build(&buffer, 0, 0, 3, &range, 5).unwrap();
        assert_eq!(field.get(0, 1), 2);
        assert_eq!(field.get(1, 1), 2);
        assert_eq!(field.get(2, 1), 4);

        // 100 / 11 is inexact in f64, so 50 lands just under 5.5
        let field = HeightField::build(&buffer, 0, 0, 3, &range, 11).unwrap();
        assert_eq!(field.get(1, 1), 5);
    }

    #[test]
    fn test_levels_stay_in_range() {
        let buffer = ramp(16, 16);
        let range = AltitudeRange::observe(&buffer);
        let field = HeightField::build(&buffer, 0, 0, 16, &range, 23).unwrap();
        assert!(field.levels().iter().all(|&l| l <= 23));
        assert_eq!(field.get(0, 0), 0);
        assert_eq!(field.get(15, 0), 23);
    }

    #[test]
    fn test_tile_origin_offsets_sampling() {
        let buffer = ramp(8, 4);
        let range = AltitudeRange::observe(&buffer);
        let field = HeightField::build(&buffer, 4, 0, 4, &range, 7).unwrap();
        assert_eq!(field.get(0, 0), 4);
        assert_eq!(field.get(3, 2), 7);
    }

    #[test]
    fn test_degenerate_range_rejected() {
        let buffer = PixelBuffer::from_values(4, 4, vec![3.0; 16]).unwrap();
        let range = AltitudeRange::observe(&buffer);
        let err = HeightField::build(&buffer, 0, 0, 4, &range, 10).unwrap_err();
        assert_eq!(err, HeightFieldError::DegenerateAltitudeRange { min: 3.0, max: 3.0 });
    }

    #[test]
    fn test_out_of_bounds_tile_rejected() {
        let buffer = ramp(8, 8);
        let range = AltitudeRange::observe(&buffer);
        let err = HeightField::build(&buffer, 4, 4, 5, &range, 3).unwrap_err();
        assert!(matches!(err, HeightFieldError::TileOutOfBounds { .. }));
    }

    #[test]
    fn test_single_level_is_flat() {
        let buffer = ramp(4, 4);
        let range = AltitudeRange::observe(&buffer);
        let field = HeightField::build(&buffer, 0, 0, 4, &range, 0).unwrap();
        assert!(field.levels().iter().all(|&l| l == 0));
    }

    #[test]
    fn test_render_ascii() {
        let field = HeightField::from_levels(2, 12, vec![1, 12, 0, 9]).unwrap();
        assert_eq!(field.render_ascii(), "12\n09\n");
    }
}
