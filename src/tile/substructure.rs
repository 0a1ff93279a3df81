//! Fixed baseplate and connector parts placed beneath every tile.

use crate::export::{PartLine, IDENTITY, QUARTER_TURN};

const BASEPLATE_COLOR: u32 = 7;
const CORNER_COLOR: u32 = 0;
const CONNECTOR_COLOR: u32 = 72;

const CORNER_BRICK: &str = "3003.DAT";
const TECHNIC_BRICK: &str = "3701.DAT";

/// Baseplate part and its center offset for the tile sizes that have one.
fn baseplate(size: u32) -> Option<(&'static str, i64)> {
    match size {
        32 => Some(("3811.DAT", 320)),
        48 => Some(("4186.DAT", 480)),
        _ => None,
    }
}

/// Substructure for a `size`x`size` stud tile, in LDraw units.
///
/// A baseplate (32 and 48 stud tiles only), a 2x2 brick in each corner and
/// two technic bricks near both ends of every edge so neighboring tiles can
/// be pinned together.
pub fn substructure(size: u32) -> Vec<PartLine> {
    let mut parts = Vec::with_capacity(13);
    let edge = size as i64 * 20;

    if let Some((part, center)) = baseplate(size) {
        parts.push(PartLine::new(BASEPLATE_COLOR, [center, 32, -center], IDENTITY, part));
    }

    let corner = edge - 20;
    for (x, z) in [(20, 20), (20, corner), (corner, 20), (corner, corner)] {
        parts.push(PartLine::new(CORNER_COLOR, [x, 8, -z], IDENTITY, CORNER_BRICK));
    }

    let near = edge - 80;
    let far = edge - 10;
    let connectors = [
        (80, 10, IDENTITY),
        (near, 10, IDENTITY),
        (10, 80, QUARTER_TURN),
        (10, near, QUARTER_TURN),
        (80, far, IDENTITY),
        (near, far, IDENTITY),
        (far, 80, QUARTER_TURN),
        (far, near, QUARTER_TURN),
    ];
    for (x, z, orientation) in connectors {
        parts.push(PartLine::new(CONNECTOR_COLOR, [x, 8, -z], orientation, TECHNIC_BRICK));
    }

    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_32_stud_fixture() {
        let lines: Vec<String> = substructure(32).iter().map(|p| p.to_string()).collect();
        assert_eq!(lines.len(), 13);
        assert_eq!(lines[0], "1 7 320 32 -320 1 0 0 0 1 0 0 0 1 3811.DAT");
        assert_eq!(lines[4], "1 0 620 8 -620 1 0 0 0 1 0 0 0 1 3003.DAT");
        assert_eq!(lines[6], "1 72 560 8 -10 1 0 0 0 1 0 0 0 1 3701.DAT");
        assert_eq!(lines[8], "1 72 10 8 -560 0 0 -1 0 1 0 1 0 0 3701.DAT");
        assert_eq!(lines[12], "1 72 630 8 -560 0 0 -1 0 1 0 1 0 0 3701.DAT");
    }

    #[test]
    fn test_48_stud_baseplate() {
        let parts = substructure(48);
        assert_eq!(parts[0].part, "4186.DAT");
        assert_eq!(parts[0].position, [480, 32, -480]);
    }

    #[test]
    fn test_other_sizes_have_no_baseplate() {
        let parts = substructure(16);
        assert_eq!(parts.len(), 12);
        assert!(parts.iter().all(|p| p.part != "3811.DAT" && p.part != "4186.DAT"));
        assert_eq!(parts[3].position, [300, 8, -300]);
    }
}
