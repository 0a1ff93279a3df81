//! Per-level part colors.
//!
//! Colors come either from a single constant, an explicit table, or a pair
//! of files: a level list of logical color numbers (one per line, first
//! token only) translated through a CSV table whose fourth and fifth columns
//! hold the logical number and the LDraw color code.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// LDraw white.
pub const DEFAULT_COLOR: u32 = 15;

/// Errors that can occur while loading or indexing color tables.
#[derive(Error, Debug)]
pub enum ColorTableError {
    #[error("Failed to read color table '{}': {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },
    #[error("{}:{line}: {reason}", path.display())]
    Parse { path: PathBuf, line: usize, reason: String },
    #[error("No color defined for level {level} (table has {available} entries)")]
    MissingLevel { level: u32, available: usize },
    #[error("Level {level} uses logical color {logical}, which has no LDraw mapping")]
    UnknownLogicalColor { level: u32, logical: u32 },
}

/// Where a run takes its level colors from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorSource {
    /// Same color on every level.
    Constant(u32),
    /// LDraw color per level, level 0 first.
    Table(Vec<u32>),
    /// Level list translated through a logical-to-LDraw CSV table.
    Files { level_colors: PathBuf, color_map: PathBuf },
}

impl Default for ColorSource {
    fn default() -> Self {
        Self::Constant(DEFAULT_COLOR)
    }
}

/// Resolved LDraw color code per level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelColors {
    colors: Vec<u32>,
}

impl LevelColors {
    /// The same color on every one of `levels` levels.
    pub fn constant(color: u32, levels: u32) -> Self {
        Self { colors: vec![color; levels as usize] }
    }

    /// Uses `colors[level]` for each level, in order.
    pub fn from_table(colors: Vec<u32>) -> Self {
        Self { colors }
    }

    /// Resolves a source into a table covering `levels` levels.
    pub fn resolve(source: &ColorSource, levels: u32) -> Result<Self, ColorTableError> {
        let colors = match source {
            ColorSource::Constant(color) => Self::constant(*color, levels),
            ColorSource::Table(table) => Self::from_table(table.clone()),
            ColorSource::Files { level_colors, color_map } => {
                let map = load_color_map(color_map)?;
                Self::load(level_colors, &map)?
            }
        };
        colors.ensure_levels(levels)?;
        Ok(colors)
    }

    /// Reads a level list and translates every entry through `map`.
    pub fn load(path: &Path, map: &HashMap<u32, u32>) -> Result<Self, ColorTableError> {
        let logical = load_level_list(path)?;
        let colors = logical
            .into_iter()
            .enumerate()
            .map(|(level, logical)| {
                map.get(&logical).copied().ok_or(ColorTableError::UnknownLogicalColor {
                    level: level as u32,
                    logical,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { colors })
    }

    /// Number of levels with a color.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Looks up the LDraw color of `level`.
    ///
    /// Returns `MissingLevel` if the table is shorter than the level count.
    pub fn color_for(&self, level: u32) -> Result<u32, ColorTableError> {
        self.colors
            .get(level as usize)
            .copied()
            .ok_or(ColorTableError::MissingLevel { level, available: self.colors.len() })
    }

    /// Fails on the first level in `0..levels` without a color.
    pub fn ensure_levels(&self, levels: u32) -> Result<(), ColorTableError> {
        match levels.checked_sub(1) {
            Some(top) => self.color_for(top).map(|_| ()),
            None => Ok(()),
        }
    }
}

fn read_table(path: &Path) -> Result<String, ColorTableError> {
    fs::read_to_string(path).map_err(|source| ColorTableError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses the logical-to-LDraw color CSV.
///
/// The header row is skipped, as is any row whose logical or LDraw field is empty.
pub fn load_color_map(path: &Path) -> Result<HashMap<u32, u32>, ColorTableError> {
    let text = read_table(path)?;
    let mut map = HashMap::new();

    for (i, row) in text.lines().enumerate().skip(1) {
        let fields: Vec<&str> = row.split(',').map(str::trim).collect();
        let (Some(logical), Some(ldraw)) = (fields.get(3), fields.get(4)) else {
            continue;
        };
        if logical.is_empty() || ldraw.is_empty() {
            continue;
        }

        let parse = |value: &str| {
            value.parse::<u32>().map_err(|_| ColorTableError::Parse {
                path: path.to_path_buf(),
                line: i + 1,
                reason: format!("'{}' is not a color number", value),
            })
        };
        map.insert(parse(logical)?, parse(ldraw)?);
    }

    Ok(map)
}

/// Parses a level list: the first space-separated token of each non-blank line.
pub fn load_level_list(path: &Path) -> Result<Vec<u32>, ColorTableError> {
    let text = read_table(path)?;
    let mut levels = Vec::new();

    for (i, row) in text.lines().enumerate() {
        let Some(token) = row.split_whitespace().next() else {
            continue;
        };
        let logical = token.parse().map_err(|_| ColorTableError::Parse {
            path: path.to_path_buf(),
            line: i + 1,
            reason: format!("'{}' is not a color number", token),
        })?;
        levels.push(logical);
    }

    Ok(levels)
}
