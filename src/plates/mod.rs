//! Plate catalog and the greedy layer packer.

mod catalog;
mod packer;

pub use catalog::{CatalogError, PlateCatalog, PlateDef, PlateShape, STANDARD_PLATES};
pub use packer::{pack_layer, PlacedPart};
