//! LDraw model files: type-1 part lines, headers and tile output cleanup.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

/// Orientation of an unrotated part.
pub const IDENTITY: [i32; 9] = [1, 0, 0, 0, 1, 0, 0, 0, 1];
/// Orientation of a part turned 90 degrees about the vertical axis.
pub const QUARTER_TURN: [i32; 9] = [0, 0, -1, 0, 1, 0, 1, 0, 0];

/// Errors for a single malformed part line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PartLineError {
    #[error("not a part reference line")]
    NotAPart,
    #[error("expected at least 15 fields, found {0}")]
    TooFewFields(usize),
    #[error("field {field} is not an integer: '{value}'")]
    InvalidNumber { field: usize, value: String },
}

/// Errors that can occur while reading or writing LDraw files.
#[derive(Error, Debug)]
pub enum LdrawError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{}:{line}: {source}", path.display())]
    InvalidPartLine {
        path: PathBuf,
        line: usize,
        source: PartLineError,
    },
}

/// One `1 <color> <x> <y> <z> <matrix> <file>` line, positions in LDraw units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartLine {
    pub color: u32,
    pub position: [i64; 3],
    pub orientation: [i32; 9],
    pub part: String,
}

impl PartLine {
    /// Creates a type-1 (sub-file reference) line.
    ///
    /// # Arguments
    /// * `color` - LDraw color code
    /// * `position` - `[x, y, z]` in LDraw units
    /// * `orientation` - Row-major 3x3 rotation matrix
    /// * `part` - Part file name, e.g. `3024.DAT`
    pub fn new(color: u32, position: [i64; 3], orientation: [i32; 9], part: &str) -> Self {
        Self { color, position, orientation, part: part.to_string() }
    }

    /// Returns the same part moved by `dx`, `dz` in the ground plane.
    pub fn shifted(&self, dx: i64, dz: i64) -> Self {
        let [x, y, z] = self.position;
        Self { position: [x + dx, y, z + dz], ..self.clone() }
    }
}

impl fmt::Display for PartLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x, y, z] = self.position;
        write!(f, "1 {} {} {} {}", self.color, x, y, z)?;
        for m in self.orientation {
            write!(f, " {}", m)?;
        }
        write!(f, " {}", self.part)
    }
}

impl FromStr for PartLine {
    type Err = PartLineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        if fields.first() != Some(&"1") {
            return Err(PartLineError::NotAPart);
        }
        if fields.len() < 15 {
            return Err(PartLineError::TooFewFields(fields.len()));
        }

        fn int<T: FromStr>(fields: &[&str], i: usize) -> Result<T, PartLineError> {
            fields[i].parse().map_err(|_| PartLineError::InvalidNumber {
                field: i,
                value: fields[i].to_string(),
            })
        }

        let color = int(&fields, 1)?;
        let position = [int(&fields, 2)?, int(&fields, 3)?, int(&fields, 4)?];
        let mut orientation = [0i32; 9];
        for (i, m) in orientation.iter_mut().enumerate() {
            *m = int(&fields, 5 + i)?;
        }

        Ok(Self { color, position, orientation, part: fields[14..].join(" ") })
    }
}

/// Writes the standard model header.
pub fn write_header<W: Write>(out: &mut W, name: &str, author: &str) -> std::io::Result<()> {
    writeln!(out, "0 Untitled")?;
    writeln!(out, "0 Name: {}", name)?;
    writeln!(out, "0 Author: {}", author)?;
    writeln!(out, "0 Unofficial Model")?;
    writeln!(out, "0 ROTATION CENTER 0 0 0 1 \"Custom\" ")?;
    writeln!(out, "0 ROTATION CONFIG 0 0")
}

/// Writes a complete model: header, part lines and the closing `0` line.
pub fn write_model<'a, I>(path: &Path, author: &str, parts: I) -> Result<(), LdrawError>
where
    I: IntoIterator<Item = &'a PartLine>,
{
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_header(&mut writer, &name, author)?;
    for part in parts {
        writeln!(writer, "{}", part)?;
    }
    writeln!(writer, "0")?;
    writer.flush()?;
    Ok(())
}

/// Reads every part line of a model, skipping comments, meta and blank lines.
pub fn read_part_lines(path: &Path) -> Result<Vec<PartLine>, LdrawError> {
    let reader = BufReader::new(File::open(path)?);
    let mut parts = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.split_whitespace().next() != Some("1") {
            continue;
        }
        let part = trimmed.parse().map_err(|source| LdrawError::InvalidPartLine {
            path: path.to_path_buf(),
            line: i + 1,
            source,
        })?;
        parts.push(part);
    }

    Ok(parts)
}

/// Removes `*.ldr` files left in `dir` by a previous run.
///
/// A missing directory counts as clean. Returns the number of files removed.
pub fn clean_tile_outputs(dir: &Path) -> std::io::Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_ldr = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("ldr"))
            .unwrap_or(false);
        if is_ldr && path.is_file() {
            fs::remove_file(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}
