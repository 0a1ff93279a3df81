//! Terrain decomposition module.
//!
//! Turns decoded image intensities into per-tile altitude grids, derives the
//! supporting floor of every column and slices the result into one occupancy
//! mask per altitude level.

mod pixels;
mod heightfield;
mod floor;
mod layers;

pub use pixels::{PixelBuffer, AltitudeRange};
pub use heightfield::{HeightField, HeightFieldError};
pub use floor::{FloorField, BORDER_FLOOR};
pub use layers::{LayerMask, LayerMaskSet};
