//! Heightmap to plate terrain generator.
//!
//! This crate slices a grayscale heightmap into square tiles, decomposes
//! each tile into altitude layers and covers every layer with standard
//! rectangular plates, writing one LDraw model per tile. A second stage
//! stitches the tile models back together into a single model.

pub mod color;
pub mod combine;
pub mod config;
pub mod export;
pub mod pipeline;
pub mod plates;
pub mod terrain;
pub mod tile;

pub use color::{ColorSource, LevelColors};
pub use combine::{combine_dir, CombineError, CombinedModel, TileSet};
pub use config::{CombineConfig, GenerateConfig, PlacementTransform};
pub use pipeline::{write_tiles, GenerateError, TileGenerator, TilePlan};
pub use plates::{pack_layer, PlacedPart, PlateCatalog, PlateDef, PlateShape};
pub use terrain::{AltitudeRange, FloorField, HeightField, LayerMask, LayerMaskSet, PixelBuffer};
pub use tile::{TileAssembler, TileId, TileModel};
