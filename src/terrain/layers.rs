//! Per-level occupancy masks.

use super::floor::FloorField;
use super::heightfield::HeightField;

/// Boolean occupancy of one altitude level, row-major.
///
/// Tracks the number of set cells so emptiness checks are constant time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerMask {
    level: u32,
    size: usize,
    cells: Vec<bool>,
    filled: usize,
}

impl LayerMask {
    /// Marks every column whose solid span `[floor, height]` contains `level`.
    pub fn derive(level: u32, heights: &HeightField, floor: &FloorField) -> Self {
        let size = heights.size();
        let mut cells = Vec::with_capacity(size * size);
        let mut filled = 0;
        for y in 0..size {
            for x in 0..size {
                let spans = floor.get(x, y) <= level && level <= heights.get(x, y);
                filled += spans as usize;
                cells.push(spans);
            }
        }
        Self { level, size, cells, filled }
    }

    /// Builds a mask from row-major cells. Returns `None` unless there are `size * size` of them.
    pub fn from_cells(level: u32, size: usize, cells: Vec<bool>) -> Option<Self> {
        if cells.len() != size * size {
            return None;
        }
        let filled = cells.iter().filter(|&&c| c).count();
        Some(Self { level, size, cells, filled })
    }

    /// Parses rows of `#` (set) and `.` (clear); convenient for fixtures.
    pub fn from_rows(level: u32, rows: &[&str]) -> Option<Self> {
        let size = rows.len();
        let mut cells = Vec::with_capacity(size * size);
        for row in rows {
            if row.chars().count() != size {
                return None;
            }
            cells.extend(row.chars().map(|c| c == '#'));
        }
        Self::from_cells(level, size, cells)
    }

    /// A mask with no cells set.
    pub fn empty(level: u32, size: usize) -> Self {
        Self { level, size, cells: vec![false; size * size], filled: 0 }
    }

    /// The altitude level this mask describes.
    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of set cells.
    pub fn count(&self) -> usize {
        self.filled
    }

    /// True once every set cell has been claimed.
    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.cells[y * self.size + x]
    }

    /// True if every cell of the `width`x`depth` rectangle at `(left, top)` is set.
    pub fn is_filled(&self, left: usize, top: usize, width: usize, depth: usize) -> bool {
        if left + width > self.size || top + depth > self.size {
            return false;
        }
        (top..top + depth).all(|y| {
            let row = y * self.size;
            self.cells[row + left..row + left + width].iter().all(|&c| c)
        })
    }

    /// Clears the `width`x`depth` rectangle at `(left, top)`.
    pub fn clear(&mut self, left: usize, top: usize, width: usize, depth: usize) {
        for y in top..(top + depth).min(self.size) {
            for x in left..(left + width).min(self.size) {
                let cell = &mut self.cells[y * self.size + x];
                if *cell {
                    *cell = false;
                    self.filled -= 1;
                }
            }
        }
    }

    /// `#` for set cells, `.` for clear ones.
    pub fn render_ascii(&self) -> String {
        let mut out = String::with_capacity(self.size * (self.size + 1));
        for row in self.cells.chunks(self.size.max(1)) {
            out.extend(row.iter().map(|&c| if c { '#' } else { '.' }));
            out.push('\n');
        }
        out
    }
}

/// Masks for every level `0..=max_level` of one tile.
#[derive(Debug, Clone)]
pub struct LayerMaskSet {
    masks: Vec<LayerMask>,
}

impl LayerMaskSet {
    /// Derives one mask per level in `[0, heights.max_level()]`.
    pub fn derive(heights: &HeightField, floor: &FloorField) -> Self {
        let masks = (0..=heights.max_level())
            .map(|level| LayerMask::derive(level, heights, floor))
            .collect();
        Self { masks }
    }

    pub fn len(&self) -> usize {
        self.masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    /// The mask for `level`, if it is in range.
    pub fn get(&self, level: u32) -> Option<&LayerMask> {
        self.masks.get(level as usize)
    }

    /// Masks from level 0 upward.
    pub fn iter(&self) -> impl Iterator<Item = &LayerMask> {
        self.masks.iter()
    }

    /// Hands the masks over to the packer, which consumes them.
    pub fn into_masks(self) -> Vec<LayerMask> {
        self.masks
    }
}
