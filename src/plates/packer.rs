//! Greedy plate packing of a single layer.
//!
//! Shapes are tried largest first. Each shape makes one raster pass over the
//! mask (rows outer, columns inner) and claims every fully set rectangle it
//! meets, clearing it immediately so later anchors cannot overlap. Nothing is
//! ever undone. The unit plate sorts last and mops up whatever is left, so
//! the mask is always empty on return.

use super::catalog::{PlateCatalog, PlateShape};
use crate::terrain::LayerMask;

/// A plate claimed on one layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedPart {
    pub level: u32,
    /// Mask column of the rectangle's corner.
    pub left: usize,
    /// Mask row of the rectangle's corner.
    pub top: usize,
    pub width: usize,
    pub depth: usize,
    pub part: String,
    pub rotated: bool,
}

impl PlacedPart {
    fn new(level: u32, left: usize, top: usize, shape: &PlateShape) -> Self {
        Self {
            level,
            left,
            top,
            width: shape.width,
            depth: shape.depth,
            part: shape.part.clone(),
            rotated: shape.rotated,
        }
    }

    /// Planar center along x, in studs (half-integers for odd widths).
    pub fn center_x(&self) -> f64 {
        self.left as f64 + self.width as f64 / 2.0
    }

    /// Planar center along y, in studs.
    pub fn center_y(&self) -> f64 {
        self.top as f64 + self.depth as f64 / 2.0
    }

    /// True if the two claimed rectangles share at least one cell.
    pub fn overlaps(&self, other: &PlacedPart) -> bool {
        self.level == other.level
            && self.left < other.left + other.width
            && other.left < self.left + self.width
            && self.top < other.top + other.depth
            && other.top < self.top + self.depth
    }
}

/// Covers every set cell of `mask` with catalog plates, leaving it empty.
///
/// Placements come back in claim order, tagged with the mask's level.
pub fn pack_layer(mask: &mut LayerMask, catalog: &PlateCatalog) -> Vec<PlacedPart> {
    let mut parts = Vec::new();
    if mask.is_empty() {
        return parts;
    }

    let level = mask.level();
    let size = mask.size();

    for shape in catalog.ordered_for_level(level) {
        if mask.is_empty() {
            break;
        }
        if shape.width > size || shape.depth > size || shape.area() > mask.count() {
            continue;
        }

        for top in 0..=size - shape.depth {
            for left in 0..=size - shape.width {
                if mask.is_filled(left, top, shape.width, shape.depth) {
                    mask.clear(left, top, shape.width, shape.depth);
                    parts.push(PlacedPart::new(level, left, top, shape));
                }
            }
        }
    }

    debug_assert!(mask.is_empty(), "catalog without a unit plate left cells uncovered");
    parts
}
