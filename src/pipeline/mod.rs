//! Pipeline module for running tile generation over a whole image.
//!
//! Measures the image once, lays out the tile grid and assembles every
//! tile, in parallel or sequentially with progress callbacks.

mod generator;

pub use generator::{write_tiles, GenerateError, TileGenerator, TilePlan};
