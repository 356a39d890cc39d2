//! Physics and grid constants shared by the ninja, entities, and the tile
//! geometry builder.
//!
//! The physics constants are literal transcriptions from the reference
//! engine. They must be preserved to the bit: replay traces compare equal
//! only if every multiply/add happens in the same order with the same
//! double-precision literal, so nothing here is re-derived from a "nicer"
//! closed form even where one exists (e.g. `DRAG_REGULAR` is `0.99^(2/3)`
//! but is written as the literal, not as `0.99_f64.powf(2.0 / 3.0)`, to
//! avoid depending on libm's `powf` rounding matching the reference's
//! precomputed constant).

/// Downward acceleration applied every frame while airborne and not holding jump.
pub const GRAVITY_FALL: f64 = 0.06666666666666665;
/// Downward acceleration applied every frame while in the jump state (state 3).
pub const GRAVITY_JUMP: f64 = 0.01111111111111111;
/// Horizontal acceleration applied per frame of held input while grounded.
pub const GROUND_ACCEL: f64 = 0.06666666666666665;
/// Horizontal acceleration applied per frame of held input while airborne.
pub const AIR_ACCEL: f64 = 0.04444444444444444;
/// Per-frame velocity multiplier applied before gravity (0.99^(2/3)).
pub const DRAG_REGULAR: f64 = 0.9933221725495059;
/// Per-frame velocity multiplier used while celebrating/airborne-slow (0.80^(2/3)).
pub const DRAG_SLOW: f64 = 0.8617738760127536;
/// Horizontal velocity multiplier applied in ground-sliding friction (0.92^(2/3)).
pub const FRICTION_GROUND: f64 = 0.9459290248857720;
/// Horizontal velocity multiplier applied in immobile-state friction (0.80^(2/3)).
pub const FRICTION_GROUND_SLOW: f64 = 0.8617738760127536;
/// Vertical velocity multiplier applied while wall-sliding (0.87^(2/3)).
pub const FRICTION_WALL: f64 = 0.9113380468927672;
/// Hard cap on horizontal speed; both ground and air accel candidates are
/// rejected (not clamped) once they would exceed this.
pub const MAX_HOR_SPEED: f64 = 3.333333333333333;
/// Number of frames the jump button can hold the jump state before gravity
/// reverts to `GRAVITY_FALL` regardless of input.
pub const MAX_JUMP_DURATION: u32 = 45;
/// Impact speed, in units/frame along the contact normal, above which a
/// floor/ceiling/wall hit kills the ninja (scaled down by `4/3 * |n.y|`).
pub const MAX_SURVIVABLE_IMPACT: f64 = 6.0;
/// Ninja collision circle radius, in world units.
pub const NINJA_RADIUS: f64 = 10.0;

/// Width, in cells, of the nominal tile grid (42 playable + 2 border).
pub const GRID_WIDTH: usize = 44;
/// Height, in cells, of the nominal tile grid (23 playable + 2 border).
pub const GRID_HEIGHT: usize = 25;
/// World-unit length of one tile grid cell's edge.
pub const CELL_SIZE: f64 = 24.0;
/// Width of the segment index, one cell wider than the tile grid on each
/// side to hold segments materialized at the very edge of the border frame.
pub const SEGMENT_GRID_WIDTH: usize = 45;
pub const SEGMENT_GRID_HEIGHT: usize = 26;
/// Half-cell horizontal edge grid dimensions (two half-edges per tile edge).
pub const HOR_EDGE_WIDTH: usize = 88;
pub const HOR_EDGE_HEIGHT: usize = 51;
/// Half-cell vertical edge grid dimensions.
pub const VER_EDGE_WIDTH: usize = 89;
pub const VER_EDGE_HEIGHT: usize = 50;

/// Thwump's line-of-sight ray-step cap. Resolves the open question on which
/// of the two observed reference-engine cap values to adopt: the stricter.
pub const THWUMP_ACTIVATION_RAY_STEPS: u32 = 100;

/// Byte offsets into the map buffer (see `sim::load`).
pub const MAP_TILE_DATA_START: usize = 184;
pub const MAP_TILE_DATA_END: usize = 1150;
pub const MAP_TILE_COLUMNS: usize = 42;
pub const MAP_TILE_ROWS: usize = 23;
pub const MAP_GOLD_COUNT_OFFSET: usize = 1154;
pub const MAP_EXIT_DOOR_COUNT_OFFSET: usize = 1156;
pub const MAP_NINJA_SPAWN_X_OFFSET: usize = 1231;
pub const MAP_NINJA_SPAWN_Y_OFFSET: usize = 1232;
pub const MAP_ENTITY_TABLE_START: usize = 1230;
/// Shortest buffer that still carries the ninja spawn bytes at 1231/1232.
pub const MAP_MIN_LENGTH: usize = MAP_NINJA_SPAWN_Y_OFFSET + 1;
/// Map coordinates are stored in 6-world-unit quanta.
pub const MAP_COORD_SCALE: f64 = 6.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_regular_matches_closed_form() {
        // Kept as a cross-check, not as the source of truth: the constant
        // above is the literal the reference engine embeds.
        let derived = 0.99_f64.powf(2.0 / 3.0);
        assert!((derived - DRAG_REGULAR).abs() < 1e-9);
    }

    #[test]
    fn grid_dimensions_match_segment_grid_expansion() {
        assert_eq!(SEGMENT_GRID_WIDTH, GRID_WIDTH + 1);
        assert_eq!(SEGMENT_GRID_HEIGHT, GRID_HEIGHT + 1);
    }

    #[test]
    fn edge_grids_are_double_density_plus_one() {
        assert_eq!(HOR_EDGE_WIDTH, GRID_WIDTH * 2);
        assert_eq!(HOR_EDGE_HEIGHT, GRID_HEIGHT * 2 + 1);
        assert_eq!(VER_EDGE_WIDTH, GRID_WIDTH * 2 + 1);
        assert_eq!(VER_EDGE_HEIGHT, GRID_HEIGHT * 2);
    }
}
