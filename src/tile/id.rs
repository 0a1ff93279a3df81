//! Tile grid coordinates and their `<Column><Row>` names.
//!
//! Columns are spelled with uppercase letters in spreadsheet style
//! (`A`..`Z`, `AA`, `AB`, ...), rows with 1-based decimal numbers, so the
//! tile at column index 1, row index 0 is `B1`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors that can occur while parsing a tile name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TileIdError {
    #[error("Tile name '{0}' must be column letters followed by a row number, e.g. 'B3'")]
    Malformed(String),
    #[error("Tile name '{0}' is out of range")]
    OutOfRange(String),
}

/// Zero-based grid coordinate of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId {
    pub column: u32,
    pub row: u32,
}

impl TileId {
    /// Tile at 0-based `column` and `row`.
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Column letters, `A` for index 0.
    pub fn column_letters(&self) -> String {
        let mut n = self.column as u64 + 1;
        let mut letters = Vec::new();
        while n > 0 {
            let rem = ((n - 1) % 26) as u8;
            letters.push(char::from(b'A' + rem));
            n = (n - 1) / 26;
        }
        letters.iter().rev().collect()
    }

    /// 1-based row number.
    pub fn row_number(&self) -> u64 {
        self.row as u64 + 1
    }

    /// Tile name without extension, e.g. `C2`.
    pub fn name(&self) -> String {
        format!("{}{}", self.column_letters(), self.row_number())
    }

    /// Output file name, e.g. `C2.ldr`.
    pub fn file_name(&self) -> String {
        format!("{}.ldr", self.name())
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column_letters(), self.row_number())
    }
}

impl FromStr for TileId {
    type Err = TileIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let split = s.find(|c: char| !c.is_ascii_uppercase()).unwrap_or(s.len());
        let (letters, digits) = s.split_at(split);
        if letters.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TileIdError::Malformed(s.to_string()));
        }

        let mut column: u64 = 0;
        for b in letters.bytes() {
            column = column * 26 + (b - b'A' + 1) as u64;
            if column > u32::MAX as u64 {
                return Err(TileIdError::OutOfRange(s.to_string()));
            }
        }

        let row: u64 = digits.parse().map_err(|_| TileIdError::OutOfRange(s.to_string()))?;
        if row == 0 {
            return Err(TileIdError::Malformed(s.to_string()));
        }
        if row - 1 > u32::MAX as u64 {
            return Err(TileIdError::OutOfRange(s.to_string()));
        }

        Ok(Self { column: (column - 1) as u32, row: (row - 1) as u32 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_letter_names() {
        assert_eq!(TileId::new(0, 0).name(), "A1");
        assert_eq!(TileId::new(1, 0).name(), "B1");
        assert_eq!(TileId::new(25, 9).name(), "Z10");
        assert_eq!(TileId::new(2, 1).file_name(), "C2.ldr");
    }

    #[test]
    fn test_multi_letter_columns() {
        assert_eq!(TileId::new(26, 0).name(), "AA1");
        assert_eq!(TileId::new(27, 0).name(), "AB1");
        assert_eq!(TileId::new(701, 0).name(), "ZZ1");
        assert_eq!(TileId::new(702, 0).name(), "AAA1");
    }

    #[test]
    fn test_parse() {
        assert_eq!("A1".parse::<TileId>().unwrap(), TileId::new(0, 0));
        assert_eq!("B12".parse::<TileId>().unwrap(), TileId::new(1, 11));
        assert_eq!("AB3".parse::<TileId>().unwrap(), TileId::new(27, 2));
    }

    #[test]
    fn test_name_parse_round_trip() {
        for column in [0, 5, 25, 26, 51, 52, 700, 701, 702, 18_277] {
            for row in [0, 1, 99] {
                let id = TileId::new(column, row);
                assert_eq!(id.name().parse::<TileId>().unwrap(), id);
            }
        }
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "1A", "A", "12", "a1", "A0", "A1x", "A-1", "milscombine"] {
            assert!(bad.parse::<TileId>().is_err(), "accepted {bad:?}");
        }
        assert!(matches!("A99999999999".parse::<TileId>(), Err(TileIdError::OutOfRange(_))));
    }

    #[test]
    fn test_display_matches_name() {
        let id = TileId::new(3, 4);
        assert_eq!(id.to_string(), id.name());
    }
}
