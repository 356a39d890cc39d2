//! Literal per-tile-id lookup tables used to build the segment/edge indices
//! at load time.
//!
//! These four tables are transcribed verbatim from the reference engine;
//! they are not derived or simplified, because the exact accumulation order
//! and sign convention is what makes the resulting geometry bit-identical
//! to the reference across every tile id (0 empty/1 full, 2-5 half tiles,
//! 6-9 45-degree slopes, 10-13 quarter moons, 14-17 quarter pipes, 18-21
//! short mild slopes, 22-25 raised mild slopes, 26-29 short steep slopes,
//! 30-33 raised steep slopes, 34-37 glitched partial tiles).

use crate::types::Vec2;

/// Per-tile-id half-cell grid edge contributions: first 6 are horizontal
/// half-edges (left to right, then top to bottom), last 6 are vertical
/// half-edges (top to bottom, then left to right). `1` marks a solid edge.
pub fn grid_edge_map(tile_id: u8) -> Option<[u8; 12]> {
    Some(match tile_id {
        0 => [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        1 => [1, 1, 0, 0, 1, 1, 1, 1, 0, 0, 1, 1],
        2 => [1, 1, 1, 1, 0, 0, 1, 0, 0, 0, 1, 0],
        3 => [0, 1, 0, 0, 0, 1, 0, 0, 1, 1, 1, 1],
        4 => [0, 0, 1, 1, 1, 1, 0, 1, 0, 0, 0, 1],
        5 => [1, 0, 0, 0, 1, 0, 1, 1, 1, 1, 0, 0],
        6 => [1, 1, 0, 1, 1, 0, 1, 1, 0, 1, 1, 0],
        7 => [1, 1, 1, 0, 0, 1, 1, 0, 0, 1, 1, 1],
        8 => [0, 1, 1, 0, 1, 1, 0, 1, 1, 0, 1, 1],
        9 => [1, 0, 0, 1, 1, 1, 1, 1, 1, 0, 0, 1],
        10 => [1, 1, 0, 0, 1, 1, 1, 1, 0, 0, 1, 1],
        11 => [1, 1, 0, 0, 1, 1, 1, 1, 0, 0, 1, 1],
        12 => [1, 1, 0, 0, 1, 1, 1, 1, 0, 0, 1, 1],
        13 => [1, 1, 0, 0, 1, 1, 1, 1, 0, 0, 1, 1],
        14 => [1, 1, 0, 1, 1, 0, 1, 1, 0, 1, 1, 0],
        15 => [1, 1, 1, 0, 0, 1, 1, 0, 0, 1, 1, 1],
        16 => [0, 1, 1, 0, 1, 1, 0, 1, 1, 0, 1, 1],
        17 => [1, 0, 0, 1, 1, 1, 1, 1, 1, 0, 0, 1],
        18 => [1, 1, 1, 1, 0, 0, 1, 0, 0, 0, 1, 0],
        19 => [1, 1, 1, 1, 0, 0, 1, 0, 0, 0, 1, 0],
        20 => [0, 0, 1, 1, 1, 1, 0, 1, 0, 0, 0, 1],
        21 => [0, 0, 1, 1, 1, 1, 0, 1, 0, 0, 0, 1],
        22 => [1, 1, 0, 0, 1, 1, 1, 1, 0, 0, 1, 1],
        23 => [1, 1, 0, 0, 1, 1, 1, 1, 0, 0, 1, 1],
        24 => [1, 1, 0, 0, 1, 1, 1, 1, 0, 0, 1, 1],
        25 => [1, 1, 0, 0, 1, 1, 1, 1, 0, 0, 1, 1],
        26 => [1, 0, 0, 0, 1, 0, 1, 1, 1, 1, 0, 0],
        27 => [0, 1, 0, 0, 0, 1, 0, 0, 1, 1, 1, 1],
        28 => [0, 1, 0, 0, 0, 1, 0, 0, 1, 1, 1, 1],
        29 => [1, 0, 0, 0, 1, 0, 1, 1, 1, 1, 0, 0],
        30 => [1, 1, 0, 0, 1, 1, 1, 1, 0, 0, 1, 1],
        31 => [1, 1, 0, 0, 1, 1, 1, 1, 0, 0, 1, 1],
        32 => [1, 1, 0, 0, 1, 1, 1, 1, 0, 0, 1, 1],
        33 => [1, 1, 0, 0, 1, 1, 1, 1, 0, 0, 1, 1],
        34 => [1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        35 => [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1],
        36 => [0, 0, 0, 0, 1, 1, 0, 0, 0, 0, 0, 0],
        37 => [0, 0, 0, 0, 0, 0, 1, 1, 0, 0, 0, 0],
        _ => return None,
    })
}

/// Per-tile-id orthogonal linear segment contributions, same slot order as
/// `grid_edge_map`. `0` no segment, `-1` normal faces left/up, `1` normal
/// faces right/down.
pub fn segment_ortho_map(tile_id: u8) -> Option<[i8; 12]> {
    Some(match tile_id {
        0 => [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        1 => [-1, -1, 0, 0, 1, 1, -1, -1, 0, 0, 1, 1],
        2 => [-1, -1, 1, 1, 0, 0, -1, 0, 0, 0, 1, 0],
        3 => [0, -1, 0, 0, 0, 1, 0, 0, -1, -1, 1, 1],
        4 => [0, 0, -1, -1, 1, 1, 0, -1, 0, 0, 0, 1],
        5 => [-1, 0, 0, 0, 1, 0, -1, -1, 1, 1, 0, 0],
        6 => [-1, -1, 0, 0, 0, 0, -1, -1, 0, 0, 0, 0],
        7 => [-1, -1, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1],
        8 => [0, 0, 0, 0, 1, 1, 0, 0, 0, 0, 1, 1],
        9 => [0, 0, 0, 0, 1, 1, -1, -1, 0, 0, 0, 0],
        10 => [-1, -1, 0, 0, 0, 0, -1, -1, 0, 0, 0, 0],
        11 => [-1, -1, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1],
        12 => [0, 0, 0, 0, 1, 1, 0, 0, 0, 0, 1, 1],
        13 => [0, 0, 0, 0, 1, 1, -1, -1, 0, 0, 0, 0],
        14 => [-1, -1, 0, 0, 0, 0, -1, -1, 0, 0, 0, 0],
        15 => [-1, -1, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1],
        16 => [0, 0, 0, 0, 1, 1, 0, 0, 0, 0, 1, 1],
        17 => [0, 0, 0, 0, 1, 1, -1, -1, 0, 0, 0, 0],
        18 => [-1, -1, 0, 0, 0, 0, -1, 0, 0, 0, 0, 0],
        19 => [-1, -1, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0],
        20 => [0, 0, 0, 0, 1, 1, 0, 0, 0, 0, 0, 1],
        21 => [0, 0, 0, 0, 1, 1, 0, -1, 0, 0, 0, 0],
        22 => [-1, -1, 0, 0, 0, 0, -1, -1, 0, 0, 1, 0],
        23 => [-1, -1, 0, 0, 0, 0, -1, 0, 0, 0, 1, 1],
        24 => [0, 0, 0, 0, 1, 1, 0, -1, 0, 0, 1, 1],
        25 => [0, 0, 0, 0, 1, 1, -1, -1, 0, 0, 0, 1],
        26 => [-1, 0, 0, 0, 0, 0, -1, -1, 0, 0, 0, 0],
        27 => [0, -1, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1],
        28 => [0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1, 1],
        29 => [0, 0, 0, 0, 1, 0, -1, -1, 0, 0, 0, 0],
        30 => [-1, -1, 0, 0, 1, 0, -1, -1, 0, 0, 0, 0],
        31 => [-1, -1, 0, 0, 0, 1, 0, 0, 0, 0, 1, 1],
        32 => [0, -1, 0, 0, 1, 1, 0, 0, 0, 0, 1, 1],
        33 => [-1, 0, 0, 0, 1, 1, -1, -1, 0, 0, 0, 0],
        34 => [-1, -1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
        35 => [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1],
        36 => [0, 0, 0, 0, 1, 1, 0, 0, 0, 0, 0, 0],
        37 => [0, 0, 0, 0, 0, 0, -1, -1, 0, 0, 0, 0],
        _ => return None,
    })
}

/// Per-tile-id diagonal linear segment, as an offset pair added to the
/// tile's top-left world position. Only slope tile ids (6-9, 18-33) have one.
pub fn segment_diag_map(tile_id: u8) -> Option<(Vec2, Vec2)> {
    let xy = |x: f64, y: f64| Vec2::new(x, y);
    Some(match tile_id {
        6 => (xy(0.0, 24.0), xy(24.0, 0.0)),
        7 => (xy(0.0, 0.0), xy(24.0, 24.0)),
        8 => (xy(24.0, 0.0), xy(0.0, 24.0)),
        9 => (xy(24.0, 24.0), xy(0.0, 0.0)),
        18 => (xy(0.0, 12.0), xy(24.0, 0.0)),
        19 => (xy(0.0, 0.0), xy(24.0, 12.0)),
        20 => (xy(24.0, 12.0), xy(0.0, 24.0)),
        21 => (xy(24.0, 24.0), xy(0.0, 12.0)),
        22 => (xy(0.0, 24.0), xy(24.0, 12.0)),
        23 => (xy(0.0, 12.0), xy(24.0, 24.0)),
        24 => (xy(24.0, 0.0), xy(0.0, 12.0)),
        25 => (xy(24.0, 12.0), xy(0.0, 0.0)),
        26 => (xy(0.0, 24.0), xy(12.0, 0.0)),
        27 => (xy(12.0, 0.0), xy(24.0, 24.0)),
        28 => (xy(24.0, 0.0), xy(12.0, 24.0)),
        29 => (xy(12.0, 24.0), xy(0.0, 0.0)),
        30 => (xy(12.0, 24.0), xy(24.0, 0.0)),
        31 => (xy(0.0, 0.0), xy(12.0, 24.0)),
        32 => (xy(12.0, 0.0), xy(0.0, 24.0)),
        33 => (xy(24.0, 24.0), xy(12.0, 0.0)),
        _ => return None,
    })
}

/// Per-tile-id circular segment: center offset (added to the tile's
/// top-left world position), quadrant, and convexity. Only quarter-moon and
/// quarter-pipe tile ids (10-17) have one.
pub fn segment_circular_map(tile_id: u8) -> Option<(Vec2, (f64, f64), bool)> {
    Some(match tile_id {
        10 => (Vec2::new(0.0, 0.0), (1.0, 1.0), true),
        11 => (Vec2::new(24.0, 0.0), (-1.0, 1.0), true),
        12 => (Vec2::new(24.0, 24.0), (-1.0, -1.0), true),
        13 => (Vec2::new(0.0, 24.0), (1.0, -1.0), true),
        14 => (Vec2::new(24.0, 24.0), (-1.0, -1.0), false),
        15 => (Vec2::new(0.0, 24.0), (1.0, -1.0), false),
        16 => (Vec2::new(0.0, 0.0), (1.0, 1.0), false),
        17 => (Vec2::new(24.0, 0.0), (-1.0, 1.0), false),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tile_id_zero_to_thirty_seven_has_edge_and_ortho_entries() {
        for id in 0..=37u8 {
            assert!(grid_edge_map(id).is_some(), "tile {id} missing edge map entry");
            assert!(segment_ortho_map(id).is_some(), "tile {id} missing ortho map entry");
        }
    }

    #[test]
    fn out_of_range_tile_id_is_none() {
        assert!(grid_edge_map(38).is_none());
        assert!(segment_ortho_map(200).is_none());
    }

    #[test]
    fn full_tile_has_all_four_edges_on_both_sides() {
        let edges = grid_edge_map(1).unwrap();
        assert_eq!(edges, [1, 1, 0, 0, 1, 1, 1, 1, 0, 0, 1, 1]);
    }

    #[test]
    fn empty_tile_contributes_nothing() {
        assert_eq!(grid_edge_map(0).unwrap(), [0u8; 12]);
        assert_eq!(segment_ortho_map(0).unwrap(), [0i8; 12]);
        assert!(segment_diag_map(0).is_none());
        assert!(segment_circular_map(0).is_none());
    }

    #[test]
    fn quarter_moon_tiles_have_circular_but_not_diagonal_segments() {
        for id in 10..=17u8 {
            assert!(segment_circular_map(id).is_some());
            assert!(segment_diag_map(id).is_none());
        }
    }
}
