//! Run configuration for tile generation and combination.

use std::fs;
use std::path::Path;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::ColorSource;
use crate::plates::PlateDef;

/// LDraw units per stud pitch.
pub const LDU_PER_STUD: i64 = 20;

/// Errors that can occur while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Io { path: String, source: std::io::Error },
    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Tile size must be at least 3 studs, got {0}")]
    InvalidTileSize(u32),
    #[error("At least one altitude level is required")]
    InvalidLevels,
}

/// Maps a plate's planar center and level to LDraw coordinates.
///
/// `(center_x, level, center_y)` is offset, then scaled per axis, then
/// truncated toward zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementTransform {
    pub scale: DVec3,
    pub offset: DVec3,
}

impl Default for PlacementTransform {
    fn default() -> Self {
        Self {
            // One stud is 20 LDU, one plate 8 LDU; y points down and z away.
            scale: DVec3::new(20.0, -8.0, -20.0),
            offset: DVec3::ZERO,
        }
    }
}

impl PlacementTransform {
    /// Converts a plate center in studs and its level to LDraw units.
    ///
    /// # Arguments
    /// * `center_x` - Plate center along the tile columns, in studs
    /// * `level` - Altitude level of the plate
    /// * `center_y` - Plate center along the tile rows, in studs
    ///
    /// # Returns
    /// `[x, y, z]` in LDraw units, each truncated toward zero
    pub fn to_ldu(&self, center_x: f64, level: u32, center_y: f64) -> [i64; 3] {
        let p = (DVec3::new(center_x, level as f64, center_y) + self.offset) * self.scale;
        [p.x as i64, p.y as i64, p.z as i64]
    }
}

/// Parameters of a tile generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// Tile edge length in studs (and image pixels).
    pub tile_size: u32,
    /// Number of altitude levels; the brightest pixel maps to `levels - 1`.
    pub levels: u32,
    /// Prepend baseplate and connector parts to every tile.
    pub include_substructure: bool,
    pub placement: PlacementTransform,
    /// Per-level part colors.
    pub colors: ColorSource,
    /// Plate definitions replacing the standard catalog.
    pub plates: Option<Vec<PlateDef>>,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            tile_size: 32,
            levels: 24,
            include_substructure: true,
            placement: PlacementTransform::default(),
            colors: ColorSource::default(),
            plates: None,
        }
    }
}

impl GenerateConfig {
    /// Loads a JSON config; missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Highest altitude level.
    pub fn max_level(&self) -> u32 {
        self.levels.saturating_sub(1)
    }

    /// Rejects tiles smaller than 3 studs and a zero level count.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tile_size < 3 {
            return Err(ConfigError::InvalidTileSize(self.tile_size));
        }
        if self.levels == 0 {
            return Err(ConfigError::InvalidLevels);
        }
        Ok(())
    }
}

/// Parameters of a tile combination run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombineConfig {
    /// Tile edge length in studs.
    pub tile_studs: u32,
    /// LDraw units per stud, 20 for standard parts.
    pub ldu_per_stud: i64,
}

impl Default for CombineConfig {
    fn default() -> Self {
        Self { tile_studs: 32, ldu_per_stud: LDU_PER_STUD }
    }
}

impl CombineConfig {
    /// Default configuration with a different tile edge length.
    pub fn with_tile_studs(tile_studs: u32) -> Self {
        Self { tile_studs, ..Default::default() }
    }

    /// Distance between neighboring tile origins in LDraw units.
    pub fn stud_offset(&self) -> i64 {
        self.tile_studs as i64 * self.ldu_per_stud
    }
}
