//! Floor derivation: the lowest level each column must be filled down to.

use super::heightfield::{render_digits, HeightField};

/// Floor value kept on the outer ring of every tile.
pub const BORDER_FLOOR: u32 = 0;

/// Per-column lower bound of the solid span, same shape as the height field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloorField {
    size: usize,
    floors: Vec<u32>,
}

impl FloorField {
    /// Single-pass 3x3 minimum erosion of `heights`.
    ///
    /// Interior columns take the minimum of their 3x3 neighborhood so every
    /// exposed side is backed down to the lowest neighbor. Border columns stay
    /// at [`BORDER_FLOOR`] and are therefore always built up from the ground.
    pub fn derive(heights: &HeightField) -> Self {
        let size = heights.size();
        let mut floors = vec![BORDER_FLOOR; size * size];

        for y in 1..size.saturating_sub(1) {
            for x in 1..size - 1 {
                let mut lowest = u32::MAX;
                for ny in y - 1..=y + 1 {
                    for nx in x - 1..=x + 1 {
                        lowest = lowest.min(heights.get(nx, ny));
                    }
                }
                floors[y * size + x] = lowest;
            }
        }

        Self { size, floors }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Lowest level that must be filled at `(x, y)`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u32 {
        self.floors[y * self.size + x]
    }

    /// One digit (`floor % 10`) per column, for trace logs.
    pub fn render_ascii(&self) -> String {
        render_digits(self.size, &self.floors)
    }
}
