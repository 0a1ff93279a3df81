//! Whole-image tile generation.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use log::info;
use rayon::prelude::*;
use thiserror::Error;

use crate::color::{ColorTableError, LevelColors};
use crate::config::{ConfigError, GenerateConfig};
use crate::export::{clean_tile_outputs, LdrawError};
use crate::plates::{CatalogError, PlateCatalog};
use crate::terrain::{AltitudeRange, HeightFieldError, PixelBuffer};
use crate::tile::{TileAssembler, TileError, TileId, TileModel};

/// Errors that can occur during a generation run.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Invalid plate catalog: {0}")]
    Catalog(#[from] CatalogError),
    #[error("Color table error: {0}")]
    Color(#[from] ColorTableError),
    #[error("Failed to decode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("{0}")]
    Altitude(#[from] HeightFieldError),
    #[error("Image of {width}x{height} pixels holds no complete {tile_size}x{tile_size} tile")]
    ImageTooSmall { width: u32, height: u32, tile_size: u32 },
    #[error("Tile {tile}: {source}")]
    Tile { tile: TileId, source: TileError },
    #[error("Failed to write tile: {0}")]
    Ldraw(#[from] LdrawError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Image-wide quantities shared by every tile of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePlan {
    pub range: AltitudeRange,
    pub columns: u32,
    pub rows: u32,
}

impl TilePlan {
    /// Number of whole tiles in the image.
    pub fn tile_count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    /// Tile ids row by row.
    pub fn tile_ids(&self) -> Vec<TileId> {
        (0..self.rows)
            .flat_map(|row| (0..self.columns).map(move |column| TileId::new(column, row)))
            .collect()
    }
}

/// Generates every tile of an image against one validated configuration.
#[derive(Debug, Clone)]
pub struct TileGenerator {
    config: GenerateConfig,
    catalog: Cow<'static, PlateCatalog>,
    colors: LevelColors,
}

impl TileGenerator {
    /// Validates the configuration and resolves its catalog and colors.
    pub fn new(config: GenerateConfig) -> Result<Self, GenerateError> {
        config.validate()?;
        let catalog = match &config.plates {
            Some(defs) => Cow::Owned(PlateCatalog::new(defs)?),
            None => Cow::Borrowed(PlateCatalog::standard()),
        };
        let colors = LevelColors::resolve(&config.colors, config.levels)?;
        Ok(Self { config, catalog, colors })
    }

    /// The validated run configuration.
    pub fn config(&self) -> &GenerateConfig {
        &self.config
    }

    /// The standard catalog, or the one built from `config.plates`.
    pub fn catalog(&self) -> &PlateCatalog {
        &self.catalog
    }

    /// Measures the image and lays out the tile grid.
    pub fn plan(&self, buffer: &PixelBuffer) -> Result<TilePlan, GenerateError> {
        let tile_size = self.config.tile_size;
        let (columns, rows) = buffer.tile_grid(tile_size);
        if columns == 0 || rows == 0 {
            return Err(GenerateError::ImageTooSmall {
                width: buffer.width(),
                height: buffer.height(),
                tile_size,
            });
        }

        let range = AltitudeRange::observe(buffer);
        if range.is_degenerate() {
            return Err(HeightFieldError::DegenerateAltitudeRange { min: range.min, max: range.max }.into());
        }

        info!(
            "Altitude extents {} - {}, bias {}, scale 1 : {}",
            range.min,
            range.max,
            range.min,
            range.step(self.config.max_level())
        );
        Ok(TilePlan { range, columns, rows })
    }

    fn assembler(&self) -> TileAssembler<'_> {
        TileAssembler::new(&self.config, &self.catalog, &self.colors)
    }

    /// Generates all tiles in parallel; the result is in raster order.
    pub fn run(&self, buffer: &PixelBuffer) -> Result<Vec<TileModel>, GenerateError> {
        let plan = self.plan(buffer)?;
        let assembler = self.assembler();

        plan.tile_ids()
            .par_iter()
            .map(|&id| {
                info!("Processing tile {}", id);
                assembler
                    .assemble(id, buffer, &plan.range)
                    .map_err(|source| GenerateError::Tile { tile: id, source })
            })
            .collect()
    }

    /// Generates tiles one at a time, reporting progress.
    ///
    /// # Arguments
    /// * `buffer` - The decoded image
    /// * `on_tile_start` - Called with the tile, its index and the tile count
    /// * `on_tile_complete` - Called with each finished tile, its index and the tile count
    pub fn run_with_callbacks<F1, F2>(
        &self,
        buffer: &PixelBuffer,
        mut on_tile_start: F1,
        mut on_tile_complete: F2,
    ) -> Result<Vec<TileModel>, GenerateError>
    where
        F1: FnMut(TileId, usize, usize),
        F2: FnMut(&TileModel, usize, usize),
    {
        let plan = self.plan(buffer)?;
        let assembler = self.assembler();
        let ids = plan.tile_ids();
        let total = ids.len();

        let mut tiles = Vec::with_capacity(total);
        for (i, id) in ids.into_iter().enumerate() {
            on_tile_start(id, i, total);
            let tile = assembler
                .assemble(id, buffer, &plan.range)
                .map_err(|source| GenerateError::Tile { tile: id, source })?;
            on_tile_complete(&tile, i, total);
            tiles.push(tile);
        }

        Ok(tiles)
    }
}

/// Writes finished tiles to `dir`, optionally removing earlier `.ldr` output first.
///
/// Nothing is written unless every tile was generated, so callers should
/// only call this with a complete run.
pub fn write_tiles(tiles: &[TileModel], dir: &Path, clean: bool) -> Result<Vec<PathBuf>, GenerateError> {
    std::fs::create_dir_all(dir)?;
    if clean {
        let removed = clean_tile_outputs(dir)?;
        info!("Deleted {} existing tiles from '{}'", removed, dir.display());
    }

    tiles
        .iter()
        .map(|tile| tile.write_to(dir).map_err(GenerateError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorSource;
    use crate::plates::PlateDef;
    use tempfile::tempdir;

    fn slope(width: u32, height: u32) -> PixelBuffer {
        let values = (0..width * height).map(|i| ((i % width) + (i / width)) as f64).collect();
        PixelBuffer::from_values(width, height, values).unwrap()
    }

    fn small_config() -> GenerateConfig {
        GenerateConfig { tile_size: 8, levels: 6, include_substructure: false, ..Default::default() }
    }

    #[test]
    fn test_plan_grid() {
        let generator = TileGenerator::new(small_config()).unwrap();
        let plan = generator.plan(&slope(20, 17)).unwrap();
        assert_eq!((plan.columns, plan.rows), (2, 2));
        let names: Vec<String> = plan.tile_ids().iter().map(TileId::name).collect();
        assert_eq!(names, vec!["A1", "B1", "A2", "B2"]);
    }

    #[test]
    fn test_image_too_small() {
        let generator = TileGenerator::new(small_config()).unwrap();
        let err = generator.plan(&slope(7, 30)).unwrap_err();
        assert!(matches!(err, GenerateError::ImageTooSmall { width: 7, height: 30, tile_size: 8 }));
    }

    #[test]
    fn test_flat_image_is_degenerate() {
        let generator = TileGenerator::new(small_config()).unwrap();
        let flat = PixelBuffer::from_values(8, 8, vec![0.5; 64]).unwrap();
        let err = generator.run(&flat).unwrap_err();
        assert!(matches!(err, GenerateError::Altitude(HeightFieldError::DegenerateAltitudeRange { .. })));
    }

    #[test]
    fn test_catalog_without_unit_plate_rejected() {
        let config = GenerateConfig { plates: Some(vec![PlateDef::new(2, 2, "3022.DAT")]), ..small_config() };
        assert!(matches!(
            TileGenerator::new(config),
            Err(GenerateError::Catalog(CatalogError::MissingUnitPlate))
        ));
    }

    #[test]
    fn test_short_color_table_rejected_up_front() {
        let config = GenerateConfig { colors: ColorSource::Table(vec![15; 5]), ..small_config() };
        assert!(matches!(
            TileGenerator::new(config),
            Err(GenerateError::Color(ColorTableError::MissingLevel { level: 5, .. }))
        ));
    }

    #[test]
    fn test_parallel_and_sequential_runs_agree() {
        let generator = TileGenerator::new(small_config()).unwrap();
        let buffer = slope(24, 16);

        let parallel = generator.run(&buffer).unwrap();
        let mut started = Vec::new();
        let mut completed = 0;
        let sequential = generator
            .run_with_callbacks(&buffer, |id, _, _| started.push(id), |_, _, _| completed += 1)
            .unwrap();

        assert_eq!(parallel.len(), 6);
        assert_eq!(started.len(), 6);
        assert_eq!(completed, 6);
        for (a, b) in parallel.iter().zip(&sequential) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.parts, b.parts);
        }
    }

    #[test]
    fn test_write_tiles_cleans_previous_output() {
        let generator = TileGenerator::new(small_config()).unwrap();
        let tiles = generator.run(&slope(16, 8)).unwrap();

        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("Z9.ldr"), "0\n").unwrap();

        let written = write_tiles(&tiles, dir.path(), true).unwrap();
        assert_eq!(written.len(), 2);
        assert!(dir.path().join("A1.ldr").exists());
        assert!(dir.path().join("B1.ldr").exists());
        assert!(!dir.path().join("Z9.ldr").exists());
    }
}
