//! Merging per-tile models into one coordinate-shifted model.
//!
//! Tiles are discovered by file name (`B3.ldr` is column 1, row 2). The
//! bounding grid spans from `A1` to the largest column and row seen, and
//! every cell of it must have a file. Parts of tile `(column, row)` are moved
//! by `column * offset` along x and `-row * offset` along z, and tiles are
//! emitted row by row.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use thiserror::Error;

use crate::config::CombineConfig;
use crate::export::{read_part_lines, write_model, LdrawError, PartLine, COMBINER_AUTHOR};
use crate::tile::TileId;

/// Errors that can occur while combining tiles.
#[derive(Error, Debug)]
pub enum CombineError {
    #[error("No tile files (e.g. A1.ldr) found in '{}'", .0.display())]
    NoTiles(PathBuf),
    #[error("Tile {tile} is missing from the {columns}x{rows} grid (expected '{}')", path.display())]
    MissingTile { tile: TileId, columns: u32, rows: u32, path: PathBuf },
    #[error(transparent)]
    Ldraw(#[from] LdrawError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Tile files found in a directory, keyed by grid coordinate.
#[derive(Debug, Clone, Default)]
pub struct TileSet {
    tiles: BTreeMap<TileId, PathBuf>,
}

impl TileSet {
    /// Scans `dir` for `<Column><Row>.ldr` files. Other files are ignored.
    pub fn discover(dir: &Path) -> Result<Self, CombineError> {
        let mut tiles = BTreeMap::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let is_ldr = path
                .extension()
                .map(|e| e.eq_ignore_ascii_case("ldr"))
                .unwrap_or(false);
            if !is_ldr || !path.is_file() {
                continue;
            }

            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
            match stem.parse::<TileId>() {
                Ok(id) => {
                    tiles.insert(id, path);
                }
                Err(e) => warn!("Skipping '{}': {}", path.display(), e),
            }
        }

        if tiles.is_empty() {
            return Err(CombineError::NoTiles(dir.to_path_buf()));
        }
        Ok(Self { tiles })
    }

    /// Builds a set from known paths.
    pub fn from_paths(tiles: impl IntoIterator<Item = (TileId, PathBuf)>) -> Self {
        Self { tiles: tiles.into_iter().collect() }
    }

    /// Number of discovered tile files.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Grid extent `(columns, rows)` implied by the largest column and row seen.
    pub fn grid(&self) -> (u32, u32) {
        let columns = self.tiles.keys().map(|id| id.column + 1).max().unwrap_or(0);
        let rows = self.tiles.keys().map(|id| id.row + 1).max().unwrap_or(0);
        (columns, rows)
    }

    /// Tile files in row-major order, failing on the first gap in the grid.
    pub fn raster_order(&self) -> Result<Vec<(TileId, &Path)>, CombineError> {
        let (columns, rows) = self.grid();
        let mut ordered = Vec::with_capacity(self.tiles.len());
        for row in 0..rows {
            for column in 0..columns {
                let id = TileId::new(column, row);
                let path = self.tiles.get(&id).ok_or_else(|| CombineError::MissingTile {
                    tile: id,
                    columns,
                    rows,
                    path: self.expected_path(id),
                })?;
                ordered.push((id, path.as_path()));
            }
        }
        Ok(ordered)
    }

    fn expected_path(&self, id: TileId) -> PathBuf {
        let dir = self
            .tiles
            .values()
            .next()
            .and_then(|p| p.parent())
            .unwrap_or_else(|| Path::new("."));
        dir.join(id.file_name())
    }
}

/// Planar offset applied to every part of tile `id`, in LDraw units.
pub fn tile_offset(id: TileId, config: &CombineConfig) -> (i64, i64) {
    let offset = config.stud_offset();
    (offset * id.column as i64, -offset * id.row as i64)
}

/// The merged model.
#[derive(Debug, Clone, Default)]
pub struct CombinedModel {
    pub columns: u32,
    pub rows: u32,
    pub parts: Vec<PartLine>,
}

/// Shifts and concatenates tiles given in the order they should be emitted.
pub fn combine_parts<'a, I>(tiles: I, config: &CombineConfig) -> Vec<PartLine>
where
    I: IntoIterator<Item = (TileId, &'a [PartLine])>,
{
    let mut combined = Vec::new();
    for (id, parts) in tiles {
        let (dx, dz) = tile_offset(id, config);
        combined.extend(parts.iter().map(|p| p.shifted(dx, dz)));
    }
    combined
}

/// Reads every tile of the set in raster order and merges them.
pub fn combine_tiles(set: &TileSet, config: &CombineConfig) -> Result<CombinedModel, CombineError> {
    let (columns, rows) = set.grid();
    info!("Found matrix {} wide x {} high", columns, rows);

    let ordered = set.raster_order()?;
    let mut parts = Vec::new();
    for (id, path) in ordered {
        let lines = read_part_lines(path)?;
        debug!("Processing {} ({} parts)", id.file_name(), lines.len());
        parts.extend(combine_parts([(id, lines.as_slice())], config));
    }

    Ok(CombinedModel { columns, rows, parts })
}

/// Discovers the tiles in `input`, merges them and writes `output`.
pub fn combine_dir(input: &Path, output: &Path, config: &CombineConfig) -> Result<CombinedModel, CombineError> {
    let set = TileSet::discover(input)?;
    let model = combine_tiles(&set, config)?;
    write_model(output, COMBINER_AUTHOR, &model.parts)?;
    info!("Wrote {} parts to '{}'", model.parts.len(), output.display());
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::IDENTITY;
    use tempfile::tempdir;

    fn unit_part(x: i64, z: i64) -> PartLine {
        PartLine::new(15, [x, -8, z], IDENTITY, "3024.DAT")
    }

    fn write_tile(dir: &Path, name: &str, parts: &[PartLine]) {
        write_model(&dir.join(format!("{name}.ldr")), "MILSGen", parts).unwrap();
    }

    #[test]
    fn test_offset_law() {
        let config = CombineConfig::with_tile_studs(48);
        let a1 = tile_offset(TileId::new(0, 0), &config);
        let b1 = tile_offset(TileId::new(1, 0), &config);
        let a2 = tile_offset(TileId::new(0, 1), &config);

        assert_eq!(b1.0 - a1.0, config.stud_offset());
        assert_eq!(a2.1 - a1.1, -config.stud_offset());
        assert_eq!(a1, (0, 0));
    }

    #[test]
    fn test_combine_parts_shifts_x_and_z_only() {
        let config = CombineConfig::default();
        let parts = [unit_part(10, -10)];
        let combined = combine_parts([(TileId::new(2, 1), &parts[..])], &config);
        assert_eq!(combined[0].position, [10 + 1280, -8, -10 - 640]);
    }

    #[test]
    fn test_grid_and_raster_order() {
        let set = TileSet::from_paths([
            (TileId::new(1, 1), PathBuf::from("out/B2.ldr")),
            (TileId::new(0, 0), PathBuf::from("out/A1.ldr")),
            (TileId::new(1, 0), PathBuf::from("out/B1.ldr")),
            (TileId::new(0, 1), PathBuf::from("out/A2.ldr")),
        ]);
        assert_eq!(set.grid(), (2, 2));

        let names: Vec<String> = set.raster_order().unwrap().iter().map(|(id, _)| id.name()).collect();
        assert_eq!(names, vec!["A1", "B1", "A2", "B2"]);
    }

    #[test]
    fn test_missing_tile_is_an_error() {
        let set = TileSet::from_paths([
            (TileId::new(0, 0), PathBuf::from("out/A1.ldr")),
            (TileId::new(0, 1), PathBuf::from("out/A2.ldr")),
            (TileId::new(1, 0), PathBuf::from("out/B1.ldr")),
        ]);

        match set.raster_order() {
            Err(CombineError::MissingTile { tile, columns, rows, path }) => {
                assert_eq!(tile.name(), "B2");
                assert_eq!((columns, rows), (2, 2));
                assert_eq!(path, PathBuf::from("out/B2.ldr"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("readme.txt"), "x").unwrap();
        assert!(matches!(TileSet::discover(dir.path()), Err(CombineError::NoTiles(_))));
    }

    #[test]
    fn test_combine_dir() {
        let input = tempdir().unwrap();
        write_tile(input.path(), "A1", &[unit_part(10, -10)]);
        write_tile(input.path(), "B1", &[unit_part(10, -10), unit_part(30, -10)]);
        write_tile(input.path(), "notes", &[unit_part(0, 0)]);

        let out = tempdir().unwrap();
        let output = out.path().join("milscombine.ldr");
        let model = combine_dir(input.path(), &output, &CombineConfig::default()).unwrap();

        assert_eq!((model.columns, model.rows), (2, 1));
        let xs: Vec<i64> = model.parts.iter().map(|p| p.position[0]).collect();
        assert_eq!(xs, vec![10, 650, 670]);

        let text = std::fs::read_to_string(&output).unwrap();
        assert!(text.contains("0 Author: MILSCombine"));
        assert!(text.contains("0 Name: milscombine.ldr"));
        assert!(text.ends_with("\n0\n"));
        assert_eq!(read_part_lines(&output).unwrap(), model.parts);
    }

    #[test]
    fn test_combine_dir_reports_gap() {
        let input = tempdir().unwrap();
        write_tile(input.path(), "A1", &[unit_part(10, -10)]);
        write_tile(input.path(), "A2", &[unit_part(10, -10)]);
        write_tile(input.path(), "B1", &[unit_part(10, -10)]);

        let output = input.path().join("combined.out");
        let err = combine_dir(input.path(), &output, &CombineConfig::default()).unwrap_err();
        assert!(matches!(err, CombineError::MissingTile { tile, .. } if tile == TileId::new(1, 1)));
        assert!(!output.exists());
    }
}
