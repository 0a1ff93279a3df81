//! Tile identification and per-tile assembly.

mod id;
mod assembler;
mod substructure;

pub use id::{TileId, TileIdError};
pub use assembler::{TileAssembler, TileError, TileModel};
pub use substructure::substructure;
