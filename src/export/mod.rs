//! Export module for writing plate plans as LDraw models.
//!
//! Every tile becomes one `.ldr` file; the combiner reads them back and
//! writes a single merged model in the same format.

mod ldraw;

pub use ldraw::{
    write_header, write_model, read_part_lines, clean_tile_outputs,
    PartLine, PartLineError, LdrawError,
    IDENTITY, QUARTER_TURN,
};

/// Author recorded in per-tile files.
pub const GENERATOR_AUTHOR: &str = "MILSGen";
/// Author recorded in the combined file.
pub const COMBINER_AUTHOR: &str = "MILSCombine";
