//! Plate shapes and the catalog the packer draws from.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while building a catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Plate catalog must contain the 1x1 unit plate, otherwise layers cannot be fully covered")]
    MissingUnitPlate,
    #[error("Plate '{part}' has a zero dimension ({width}x{depth})")]
    EmptyDimension { part: String, width: usize, depth: usize },
}

/// A base plate definition as listed in a catalog: `width`x`depth` studs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlateDef {
    pub width: usize,
    pub depth: usize,
    /// LDraw part file, e.g. `3024.DAT`.
    pub part: String,
}

impl PlateDef {
    /// Creates a plate definition.
    ///
    /// # Arguments
    /// * `width` - Extent along tile columns, in studs
    /// * `depth` - Extent along tile rows, in studs
    /// * `part` - LDraw part file name
    pub fn new(width: usize, depth: usize, part: &str) -> Self {
        Self { width, depth, part: part.to_string() }
    }
}

/// Standard plates: width, depth, LDraw part file.
pub const STANDARD_PLATES: [(usize, usize, &str); 19] = [
    (1, 1, "3024.DAT"),
    (2, 1, "3023.DAT"),
    (3, 1, "3623.DAT"),
    (4, 1, "3710.DAT"),
    (6, 1, "3666.DAT"),
    (8, 1, "3460.DAT"),
    (2, 2, "3022.DAT"),
    (3, 2, "3021.DAT"),
    (4, 2, "3020.DAT"),
    (6, 2, "3795.DAT"),
    (8, 2, "3034.DAT"),
    (12, 2, "2445.DAT"),
    (4, 4, "3031.DAT"),
    (6, 4, "3032.DAT"),
    (8, 4, "3035.DAT"),
    (6, 6, "3958.DAT"),
    (12, 6, "3028.DAT"),
    (16, 6, "3027.DAT"),
    (16, 16, "91405.DAT"),
];

/// One orientation of a plate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlateShape {
    /// Extent along the mask's x axis, in studs.
    pub width: usize,
    /// Extent along the mask's y axis, in studs.
    pub depth: usize,
    pub part: String,
    /// True for the 90 degree variant of a non-square plate.
    pub rotated: bool,
}

impl PlateShape {
    /// Covered cells, `width * depth`.
    #[inline]
    pub fn area(&self) -> usize {
        self.width * self.depth
    }

    pub fn is_unit(&self) -> bool {
        self.width == 1 && self.depth == 1
    }
}

/// Immutable set of plate shapes, closed under rotation and sorted by
/// descending area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlateCatalog {
    shapes: Vec<PlateShape>,
}

impl PlateCatalog {
    /// Builds a catalog from base definitions, adding the rotated variant of
    /// every non-square plate right after its base orientation.
    pub fn new(defs: &[PlateDef]) -> Result<Self, CatalogError> {
        if let Some(def) = defs.iter().find(|d| d.width == 0 || d.depth == 0) {
            return Err(CatalogError::EmptyDimension {
                part: def.part.clone(),
                width: def.width,
                depth: def.depth,
            });
        }
        let catalog = Self::expand(defs.iter().map(|d| (d.width, d.depth, d.part.as_str())));
        if !catalog.shapes.iter().any(PlateShape::is_unit) {
            return Err(CatalogError::MissingUnitPlate);
        }
        Ok(catalog)
    }

    /// The process-wide standard catalog.
    pub fn standard() -> &'static PlateCatalog {
        static STANDARD: OnceLock<PlateCatalog> = OnceLock::new();
        STANDARD.get_or_init(|| Self::expand(STANDARD_PLATES.iter().copied()))
    }

    /// Base definitions of the standard catalog.
    pub fn standard_defs() -> Vec<PlateDef> {
        STANDARD_PLATES
            .iter()
            .map(|&(w, d, part)| PlateDef::new(w, d, part))
            .collect()
    }

    fn expand<'a>(defs: impl Iterator<Item = (usize, usize, &'a str)>) -> Self {
        let mut shapes = Vec::new();
        for (width, depth, part) in defs {
            shapes.push(PlateShape { width, depth, part: part.to_string(), rotated: false });
            if width != depth {
                shapes.push(PlateShape { width: depth, depth: width, part: part.to_string(), rotated: true });
            }
        }
        // Stable, so equal areas keep definition order.
        shapes.sort_by(|a, b| b.area().cmp(&a.area()));
        Self { shapes }
    }

    /// All shapes, rotations included, ordered by area descending.
    pub fn shapes(&self) -> &[PlateShape] {
        &self.shapes
    }

    /// Number of shapes, rotations included.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Packing order for one level.
    ///
    /// Ascending width on even levels, ascending depth on odd levels, then a
    /// stable descending-area sort on top, so area always dominates and the
    /// alternating key only orders shapes of equal area. Consecutive layers
    /// therefore place their seams differently.
    pub fn ordered_for_level(&self, level: u32) -> Vec<&PlateShape> {
        let mut order: Vec<&PlateShape> = self.shapes.iter().collect();
        if level % 2 == 0 {
            order.sort_by_key(|s| s.width);
        } else {
            order.sort_by_key(|s| s.depth);
        }
        order.sort_by(|a, b| b.area().cmp(&a.area()));
        order
    }
}
