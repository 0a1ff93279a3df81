//! Per-tile orchestration: altitude grid to positioned LDraw parts.

use std::path::{Path, PathBuf};

use log::{debug, trace};
use thiserror::Error;

use super::id::TileId;
use super::substructure::substructure;
use crate::color::{ColorTableError, LevelColors};
use crate::config::{GenerateConfig, PlacementTransform};
use crate::export::{write_model, LdrawError, PartLine, GENERATOR_AUTHOR, IDENTITY, QUARTER_TURN};
use crate::plates::{pack_layer, PlacedPart, PlateCatalog};
use crate::terrain::{AltitudeRange, FloorField, HeightField, HeightFieldError, LayerMaskSet, PixelBuffer};

/// Errors that can occur while assembling one tile.
#[derive(Error, Debug)]
pub enum TileError {
    #[error(transparent)]
    HeightField(#[from] HeightFieldError),
    #[error(transparent)]
    Color(#[from] ColorTableError),
}

/// The finished plan of one tile.
#[derive(Debug, Clone)]
pub struct TileModel {
    pub id: TileId,
    /// Baseplate and connectors, empty when disabled.
    pub substructure: Vec<PartLine>,
    /// Claimed plates in layer order, then claim order.
    pub placed: Vec<PlacedPart>,
    /// `placed` converted to LDraw lines, index for index.
    pub parts: Vec<PartLine>,
    /// Number of plates per level.
    pub layer_counts: Vec<usize>,
}

impl TileModel {
    /// Substructure first, then plates.
    pub fn lines(&self) -> impl Iterator<Item = &PartLine> {
        self.substructure.iter().chain(self.parts.iter())
    }

    /// Plate count, substructure excluded.
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Writes `<dir>/<name>.ldr` and returns its path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, LdrawError> {
        let path = dir.join(self.id.file_name());
        write_model(&path, GENERATOR_AUTHOR, self.lines())?;
        Ok(path)
    }
}

/// Builds tiles against one immutable run configuration.
#[derive(Debug, Clone, Copy)]
pub struct TileAssembler<'a> {
    catalog: &'a PlateCatalog,
    colors: &'a LevelColors,
    placement: PlacementTransform,
    tile_size: u32,
    max_level: u32,
    include_substructure: bool,
}

impl<'a> TileAssembler<'a> {
    /// Creates an assembler for one run.
    ///
    /// # Arguments
    /// * `config` - Run configuration; tile size, level count and placement are copied out
    /// * `catalog` - Plate shapes available to the packer
    /// * `colors` - LDraw color for each level, at least `config.levels` long
    pub fn new(config: &GenerateConfig, catalog: &'a PlateCatalog, colors: &'a LevelColors) -> Self {
        Self {
            catalog,
            colors,
            placement: config.placement,
            tile_size: config.tile_size,
            max_level: config.max_level(),
            include_substructure: config.include_substructure,
        }
    }

    /// Quantizes the tile's pixel region, then assembles it.
    ///
    /// # Arguments
    /// * `id` - Tile position; selects the pixel region `column * tile_size, row * tile_size`
    /// * `buffer` - The decoded image
    /// * `range` - Altitude extents of the whole image
    ///
    /// # Returns
    /// The tile's substructure and plates, or the first quantization or color error
    pub fn assemble(
        &self,
        id: TileId,
        buffer: &PixelBuffer,
        range: &AltitudeRange,
    ) -> Result<TileModel, TileError> {
        let heights = HeightField::build(
            buffer,
            id.column * self.tile_size,
            id.row * self.tile_size,
            self.tile_size,
            range,
            self.max_level,
        )?;
        self.assemble_heights(id, &heights)
    }

    /// Floors, layer masks and packing for an already quantized tile.
    ///
    /// Layers are packed bottom to top; empty layers are skipped but still
    /// get a zero entry in `layer_counts`.
    pub fn assemble_heights(&self, id: TileId, heights: &HeightField) -> Result<TileModel, TileError> {
        trace!("Tile {} heights:\n{}", id, heights.render_ascii());
        let floor = FloorField::derive(heights);
        trace!("Tile {} floor:\n{}", id, floor.render_ascii());

        let mut placed = Vec::new();
        let mut layer_counts = Vec::with_capacity(heights.max_level() as usize + 1);

        for mut mask in LayerMaskSet::derive(heights, &floor).into_masks() {
            if mask.is_empty() {
                debug!("Tile {} layer {}: empty, skipping", id, mask.level());
                layer_counts.push(0);
                continue;
            }
            trace!("Tile {} layer {}:\n{}", id, mask.level(), mask.render_ascii());

            let parts = pack_layer(&mut mask, self.catalog);
            debug!("Tile {} layer {}: filled with {} parts", id, mask.level(), parts.len());
            layer_counts.push(parts.len());
            placed.extend(parts);
        }

        let parts = placed
            .iter()
            .map(|p| self.to_part_line(p))
            .collect::<Result<Vec<_>, _>>()?;

        let substructure = if self.include_substructure {
            substructure(self.tile_size)
        } else {
            Vec::new()
        };

        debug!("Tile {} solved with {} parts", id, parts.len());
        Ok(TileModel { id, substructure, placed, parts, layer_counts })
    }

    fn to_part_line(&self, part: &PlacedPart) -> Result<PartLine, ColorTableError> {
        let color = self.colors.color_for(part.level)?;
        let position = self.placement.to_ldu(part.center_x(), part.level, part.center_y());
        let orientation = if part.rotated { QUARTER_TURN } else { IDENTITY };
        Ok(PartLine::new(color, position, orientation, &part.part))
    }
}
