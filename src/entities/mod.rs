//! Entity state and per-kind behavior.
//!
//! Entities are stored as one tagged-variant enum rather than a trait
//! object list: the kind set is small, fixed, and known up front, so a
//! closed `match` at each dispatch point is both faster and exhaustiveness
//! checked by the compiler (adding a kind here forces every dispatch site
//! to be updated).

use crate::constants::{CELL_SIZE, MAP_COORD_SCALE};
use crate::math::{orientation_to_vector, overlap_circle_vs_circle, penetration_square_vs_point};
use crate::types::Vec2;

pub mod behaviors;

pub use behaviors::{EntityEvent, PhysicalHit};

/// Per-kind data. Field names follow the kind's own behavior section.
#[derive(Debug, Clone)]
pub enum EntityKind {
    ToggleMine {
        /// 0 toggled/armed, 1 untoggled/safe, 2 toggling.
        state: u8,
    },
    Gold {
        collected: bool,
    },
    Exit {
        /// Index of this exit's switch in the simulator's entity list.
        switch_index: usize,
        /// Frame number logged every frame the ninja overlaps the open
        /// exit, mirroring the reference engine's unconditional per-frame
        /// append (not gated on `win()`'s own state guard).
        ninja_exit: Vec<u32>,
    },
    ExitSwitch {
        /// Index of the parent exit in the simulator's entity list.
        exit_index: usize,
        collected: bool,
    },
    DoorRegular {
        open: bool,
        open_timer: u32,
        p1: Vec2,
        p2: Vec2,
        door_cell: (usize, usize),
        is_vertical: bool,
        grid_edges: [(usize, usize); 2],
    },
    DoorLocked {
        open: bool,
        switch_pos: Vec2,
        switch_collected: bool,
        p1: Vec2,
        p2: Vec2,
        door_cell: (usize, usize),
        is_vertical: bool,
        grid_edges: [(usize, usize); 2],
    },
    DoorTrap {
        open: bool,
        switch_pos: Vec2,
        switch_collected: bool,
        p1: Vec2,
        p2: Vec2,
        door_cell: (usize, usize),
        is_vertical: bool,
        grid_edges: [(usize, usize); 2],
    },
    LaunchPad {
        normal: Vec2,
    },
    OneWayPlatform {
        normal: Vec2,
    },
    BounceBlock {
        origin: Vec2,
        vel: Vec2,
    },
    Thwump {
        /// -1 retreating, 0 immobile, 1 charging.
        state: i8,
        dir: Vec2,
        origin: Vec2,
    },
    BoostPad {
        touching: bool,
    },
    ShoveThwump {
        /// 0 immobile, 1 activated, 2 launching, 3 retreating.
        state: u8,
        dir: Vec2,
        origin: Vec2,
        activated_this_frame: bool,
    },
}

/// Common entity record: every instantiated entity, regardless of kind,
/// carries this plus its `kind`-specific data.
#[derive(Debug, Clone)]
pub struct Entity {
    pub entity_type: u8,
    pub pos: Vec2,
    pub active: bool,
    pub cell: (usize, usize),
    pub kind: EntityKind,
}

impl Entity {
    pub fn is_logical_collidable(&self) -> bool {
        matches!(
            self.kind,
            EntityKind::ToggleMine { .. }
                | EntityKind::Gold { .. }
                | EntityKind::Exit { .. }
                | EntityKind::ExitSwitch { .. }
                | EntityKind::DoorRegular { .. }
                | EntityKind::DoorLocked { .. }
                | EntityKind::DoorTrap { .. }
                | EntityKind::LaunchPad { .. }
                | EntityKind::OneWayPlatform { .. }
                | EntityKind::BoostPad { .. }
                | EntityKind::ShoveThwump { .. }
        )
    }

    pub fn is_physical_collidable(&self) -> bool {
        matches!(
            self.kind,
            EntityKind::OneWayPlatform { .. }
                | EntityKind::BounceBlock { .. }
                | EntityKind::Thwump { .. }
                | EntityKind::ShoveThwump { .. }
        )
    }

    /// Shove thwumps are deliberately excluded here: unlike bounce blocks and
    /// regular thwumps, the reference engine drives their movement from
    /// inside `think`, not a separate `move` pass (see `behaviors::think`).
    pub fn is_movable(&self) -> bool {
        matches!(self.kind, EntityKind::BounceBlock { .. } | EntityKind::Thwump { .. })
    }

    pub fn is_thinkable(&self) -> bool {
        matches!(
            self.kind,
            EntityKind::ToggleMine { .. }
                | EntityKind::DoorRegular { .. }
                | EntityKind::Thwump { .. }
                | EntityKind::ShoveThwump { .. }
        )
    }

    /// Whether velocity should be coupled to this entity's own penetration
    /// response in `collide_vs_objects` (bounce blocks, thwumps, shove
    /// thwumps), rather than just position.
    pub fn couples_velocity(&self) -> bool {
        matches!(
            self.kind,
            EntityKind::BounceBlock { .. } | EntityKind::Thwump { .. } | EntityKind::ShoveThwump { .. }
        )
    }

    pub fn radius(&self) -> f64 {
        match &self.kind {
            EntityKind::ToggleMine { state } => match state {
                0 => 4.0,
                1 => 3.5,
                _ => 4.5,
            },
            EntityKind::Gold { .. } => 6.0,
            EntityKind::Exit { .. } => 12.0,
            EntityKind::ExitSwitch { .. } => 6.0,
            EntityKind::DoorRegular { .. } => 10.0,
            EntityKind::DoorLocked { .. } => 5.0,
            EntityKind::DoorTrap { .. } => 5.0,
            EntityKind::LaunchPad { .. } => 6.0,
            EntityKind::BoostPad { .. } => 6.0,
            EntityKind::OneWayPlatform { .. } => 12.0,
            EntityKind::BounceBlock { .. } => 9.0,
            EntityKind::Thwump { .. } => 9.0,
            EntityKind::ShoveThwump { .. } => 12.0,
        }
    }
}

/// Decodes a map-table position `(x6, y6)` (6-unit quanta) into world units.
pub fn decode_map_pos(x6: u8, y6: u8) -> Vec2 {
    Vec2::new(x6 as f64 * MAP_COORD_SCALE, y6 as f64 * MAP_COORD_SCALE)
}

pub(crate) fn cell_of(pos: Vec2) -> (usize, usize) {
    crate::math::clamp_cell((pos.x / CELL_SIZE) as i32, (pos.y / CELL_SIZE) as i32)
}

pub(crate) fn orientation_vec(orientation: u8) -> Vec2 {
    orientation_to_vector(orientation)
}

pub(crate) fn overlaps(a: Vec2, ra: f64, b: Vec2, rb: f64) -> bool {
    overlap_circle_vs_circle(a, ra, b, rb)
}

pub(crate) fn square_penetration(center: Vec2, point: Vec2, semi_side: f64) -> Option<(Vec2, (f64, f64))> {
    penetration_square_vs_point(center, point, semi_side)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_map_pos_scales_by_six() {
        let p = decode_map_pos(10, 20);
        assert_eq!(p, Vec2::new(60.0, 120.0));
    }

    #[test]
    fn toggle_mine_radius_depends_on_state() {
        let armed = Entity {
            entity_type: 1,
            pos: Vec2::ZERO,
            active: true,
            cell: (0, 0),
            kind: EntityKind::ToggleMine { state: 0 },
        };
        let safe = Entity {
            kind: EntityKind::ToggleMine { state: 1 },
            ..armed.clone()
        };
        let toggling = Entity {
            kind: EntityKind::ToggleMine { state: 2 },
            ..armed.clone()
        };
        assert_eq!(armed.radius(), 4.0);
        assert_eq!(safe.radius(), 3.5);
        assert_eq!(toggling.radius(), 4.5);
    }

    #[test]
    fn bounce_block_is_physical_and_movable_but_not_thinkable() {
        let e = Entity {
            entity_type: 17,
            pos: Vec2::ZERO,
            active: true,
            cell: (0, 0),
            kind: EntityKind::BounceBlock {
                origin: Vec2::ZERO,
                vel: Vec2::ZERO,
            },
        };
        assert!(e.is_physical_collidable());
        assert!(e.is_movable());
        assert!(!e.is_thinkable());
        assert!(e.couples_velocity());
    }
}
