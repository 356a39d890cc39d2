//! The simulator: map loading, the per-frame `tick` pipeline, input
//! decoding, and the output logs.

use serde::Serialize;

use crate::constants::{
    CELL_SIZE, MAP_ENTITY_TABLE_START, MAP_EXIT_DOOR_COUNT_OFFSET, MAP_MIN_LENGTH,
    MAP_NINJA_SPAWN_X_OFFSET, MAP_NINJA_SPAWN_Y_OFFSET, MAP_TILE_DATA_END, MAP_TILE_DATA_START,
};
use crate::entities::behaviors::{EntityEvent, NinjaContext};
use crate::entities::{cell_of, decode_map_pos, orientation_vec, Entity, EntityKind};
use crate::error::{Result, SimError};
use crate::grid::World;
use crate::math::clamp_cell;
use crate::ninja::Ninja;
use crate::types::Vec2;

/// Decodes one frame's raw 3-bit input code into `(hor_input, jump_input)`
/// via the fixed `HOR`/`JUMP` lookup tables.
pub fn decode_input(code: u8) -> (i32, u8) {
    const HOR: [i32; 8] = [0, 0, 1, 1, -1, -1, -1, -1];
    const JUMP: [u8; 8] = [0, 1, 0, 1, 0, 1, 0, 1];
    let i = (code & 0x7) as usize;
    (HOR[i], JUMP[i])
}

fn round6(v: f64) -> f64 {
    (v * 1_000_000.0).round() / 1_000_000.0
}

/// One position-log entry, rounded to 6 decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionSample {
    pub frame: u32,
    pub x: f64,
    pub y: f64,
}

/// One velocity-log entry, rounded to 6 decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VelocitySample {
    pub frame: u32,
    pub x: f64,
    pub y: f64,
}

/// Owns the tile/segment world, every entity, and the ninja, and drives
/// them one frame at a time.
#[derive(Debug, Clone)]
pub struct Simulator {
    world: World,
    entities: Vec<Entity>,
    ninja: Ninja,
    frame: u32,
    pos_log: Vec<PositionSample>,
    vel_log: Vec<VelocitySample>,
    entity_log: Vec<EntityEvent>,
}

impl Simulator {
    /// Decodes a raw map byte buffer into a ready-to-step simulator. The
    /// only entry point that touches map bytes; callers own file I/O.
    pub fn load(map: &[u8]) -> Result<Self> {
        if map.len() < MAP_MIN_LENGTH {
            return Err(SimError::MalformedMap {
                reason: format!(
                    "buffer shorter than {} bytes (got {})",
                    MAP_MIN_LENGTH,
                    map.len()
                ),
            });
        }

        let tile_data = &map[MAP_TILE_DATA_START..MAP_TILE_DATA_END];
        let mut world = World::from_playable_tiles(tile_data)?;

        let spawn = decode_map_pos(map[MAP_NINJA_SPAWN_X_OFFSET], map[MAP_NINJA_SPAWN_Y_OFFSET]);
        let ninja = Ninja::new(spawn);

        let exit_door_count = map[MAP_EXIT_DOOR_COUNT_OFFSET] as usize;
        let mut entities: Vec<Entity> = Vec::new();
        let mut index = MAP_ENTITY_TABLE_START;
        while index < map.len() {
            if index + 5 > map.len() {
                return Err(SimError::TruncatedEntityRecord { offset: index });
            }
            let entity_type = map[index];
            let xcoord = map[index + 1];
            let ycoord = map[index + 2];
            let orientation = map[index + 3];

            let primary_idx: Option<usize> = match entity_type {
                1 => {
                    entities.push(make_toggle_mine(xcoord, ycoord, 1, 0));
                    Some(entities.len() - 1)
                }
                2 => {
                    entities.push(make_gold(xcoord, ycoord));
                    Some(entities.len() - 1)
                }
                3 => {
                    let switch_offset = index + 5 * exit_door_count;
                    if switch_offset + 3 > map.len() {
                        return Err(SimError::TruncatedEntityRecord { offset: switch_offset });
                    }
                    let child_x = map[switch_offset + 1];
                    let child_y = map[switch_offset + 2];
                    let exit_index = entities.len();
                    entities.push(make_exit(xcoord, ycoord));
                    entities.push(make_exit_switch(child_x, child_y, exit_index));
                    let switch_index = entities.len() - 1;
                    if let EntityKind::Exit { switch_index: si, .. } = &mut entities[exit_index].kind {
                        *si = switch_index;
                    }
                    Some(switch_index)
                }
                5 => {
                    entities.push(make_door_regular(&mut world, xcoord, ycoord, orientation));
                    Some(entities.len() - 1)
                }
                6 => {
                    if index + 8 > map.len() {
                        return Err(SimError::TruncatedEntityRecord { offset: index + 6 });
                    }
                    let swx = map[index + 6];
                    let swy = map[index + 7];
                    entities.push(make_door_locked(&mut world, xcoord, ycoord, orientation, swx, swy));
                    Some(entities.len() - 1)
                }
                8 => {
                    if index + 8 > map.len() {
                        return Err(SimError::TruncatedEntityRecord { offset: index + 6 });
                    }
                    let swx = map[index + 6];
                    let swy = map[index + 7];
                    entities.push(make_door_trap(&mut world, xcoord, ycoord, orientation, swx, swy));
                    Some(entities.len() - 1)
                }
                10 => {
                    entities.push(make_launch_pad(xcoord, ycoord, orientation));
                    Some(entities.len() - 1)
                }
                11 => {
                    entities.push(make_one_way(xcoord, ycoord, orientation));
                    Some(entities.len() - 1)
                }
                17 => {
                    entities.push(make_bounce_block(xcoord, ycoord));
                    Some(entities.len() - 1)
                }
                20 => {
                    entities.push(make_thwump(xcoord, ycoord, orientation));
                    Some(entities.len() - 1)
                }
                21 => {
                    entities.push(make_toggle_mine(xcoord, ycoord, 21, 1));
                    Some(entities.len() - 1)
                }
                24 => {
                    entities.push(make_boost_pad(xcoord, ycoord));
                    Some(entities.len() - 1)
                }
                28 => {
                    entities.push(make_shove_thwump(xcoord, ycoord));
                    Some(entities.len() - 1)
                }
                // Reserved/unmodeled entity types (drones, rockets, lasers, death
                // balls, floor guards, evil ninjas, ...): no record is created.
                _ => None,
            };

            if let Some(idx) = primary_idx {
                let cell = entities[idx].cell;
                world.add_entity(cell, idx);
            }

            index += 5;
        }

        Ok(Simulator {
            world,
            entities,
            ninja,
            frame: 0,
            pos_log: Vec::new(),
            vel_log: Vec::new(),
            entity_log: Vec::new(),
        })
    }

    /// Advances the simulation by exactly one frame given this frame's
    /// decoded input.
    pub fn tick(&mut self, hor_input: i32, jump_input: u8) {
        self.frame += 1;
        self.ninja.hor_input = hor_input;
        self.ninja.jump_input = jump_input;

        for i in 0..self.entities.len() {
            if self.entities[i].active && self.entities[i].is_movable() {
                self.entities[i].r#move(&self.world);
                let (old, new) = self.entities[i].grid_move();
                if old != new {
                    self.world.remove_entity(old, i);
                    self.world.add_entity(new, i);
                }
            }
        }

        let ctx = NinjaContext {
            pos: self.ninja.pos,
            pos_old: self.ninja.pos_old,
            vel: self.ninja.vel,
            radius: self.ninja.radius,
            state: self.ninja.state,
            frame: self.frame,
        };
        for i in 0..self.entities.len() {
            if self.entities[i].active && self.entities[i].is_thinkable() {
                if let Some(event) = self.entities[i].think(&ctx, &mut self.world) {
                    self.entity_log.push(event);
                }
                let (old, new) = self.entities[i].grid_move();
                if old != new {
                    self.world.remove_entity(old, i);
                    self.world.add_entity(new, i);
                }
            }
        }

        if !matches!(self.ninja.state, 6 | 9) {
            self.ninja.integrate();
            self.ninja.pre_collision();
            for _ in 0..4 {
                self.ninja.collide_vs_objects(&mut self.entities, self.frame);
                self.ninja.collide_vs_tiles(&self.world);
            }
            let _ = self.ninja.post_collision(&mut self.entities, &mut self.world, self.frame);
            self.ninja.think();
        }

        self.pos_log.push(PositionSample {
            frame: self.frame,
            x: round6(self.ninja.pos.x),
            y: round6(self.ninja.pos.y),
        });
        self.vel_log.push(VelocitySample {
            frame: self.frame,
            x: round6(self.ninja.vel.x),
            y: round6(self.ninja.vel.y),
        });
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn ninja(&self) -> &Ninja {
        &self.ninja
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn position_log(&self) -> &[PositionSample] {
        &self.pos_log
    }

    pub fn velocity_log(&self) -> &[VelocitySample] {
        &self.vel_log
    }

    pub fn entity_log(&self) -> &[EntityEvent] {
        &self.entity_log
    }

    /// The unique Exit entity's `ninja_exit` frame log, if the map has one.
    pub fn exit_log(&self) -> Option<&[u32]> {
        self.entities.iter().find_map(|e| match &e.kind {
            EntityKind::Exit { ninja_exit, .. } => Some(ninja_exit.as_slice()),
            _ => None,
        })
    }

    /// True iff the map has exactly one Exit and its `ninja_exit` log
    /// contains exactly one entry equal to `input_len`.
    pub fn is_replay_valid(&self, input_len: u32) -> bool {
        let exits: Vec<&[u32]> = self
            .entities
            .iter()
            .filter_map(|e| match &e.kind {
                EntityKind::Exit { ninja_exit, .. } => Some(ninja_exit.as_slice()),
                _ => None,
            })
            .collect();
        matches!(exits.as_slice(), [log] if log.len() == 1 && log[0] == input_len)
    }
}

fn make_toggle_mine(xcoord: u8, ycoord: u8, entity_type: u8, state: u8) -> Entity {
    let pos = decode_map_pos(xcoord, ycoord);
    Entity {
        entity_type,
        pos,
        active: true,
        cell: cell_of(pos),
        kind: EntityKind::ToggleMine { state },
    }
}

fn make_gold(xcoord: u8, ycoord: u8) -> Entity {
    let pos = decode_map_pos(xcoord, ycoord);
    Entity {
        entity_type: 2,
        pos,
        active: true,
        cell: cell_of(pos),
        kind: EntityKind::Gold { collected: false },
    }
}

fn make_exit(xcoord: u8, ycoord: u8) -> Entity {
    let pos = decode_map_pos(xcoord, ycoord);
    Entity {
        entity_type: 3,
        pos,
        // Not inserted into the world's entity grid until its switch is
        // collected; see `LogicalEffect::ActivateExit` in `Ninja::post_collision`.
        active: false,
        cell: cell_of(pos),
        kind: EntityKind::Exit {
            switch_index: 0,
            ninja_exit: Vec::new(),
        },
    }
}

fn make_exit_switch(xcoord: u8, ycoord: u8, exit_index: usize) -> Entity {
    let pos = decode_map_pos(xcoord, ycoord);
    Entity {
        entity_type: 4,
        pos,
        active: true,
        cell: cell_of(pos),
        kind: EntityKind::ExitSwitch {
            exit_index,
            collected: false,
        },
    }
}

fn make_launch_pad(xcoord: u8, ycoord: u8, orientation: u8) -> Entity {
    let pos = decode_map_pos(xcoord, ycoord);
    Entity {
        entity_type: 10,
        pos,
        active: true,
        cell: cell_of(pos),
        kind: EntityKind::LaunchPad {
            normal: orientation_vec(orientation),
        },
    }
}

fn make_one_way(xcoord: u8, ycoord: u8, orientation: u8) -> Entity {
    let pos = decode_map_pos(xcoord, ycoord);
    Entity {
        entity_type: 11,
        pos,
        active: true,
        cell: cell_of(pos),
        kind: EntityKind::OneWayPlatform {
            normal: orientation_vec(orientation),
        },
    }
}

fn make_bounce_block(xcoord: u8, ycoord: u8) -> Entity {
    let pos = decode_map_pos(xcoord, ycoord);
    Entity {
        entity_type: 17,
        pos,
        active: true,
        cell: cell_of(pos),
        kind: EntityKind::BounceBlock {
            origin: pos,
            vel: Vec2::ZERO,
        },
    }
}

fn make_thwump(xcoord: u8, ycoord: u8, orientation: u8) -> Entity {
    let pos = decode_map_pos(xcoord, ycoord);
    Entity {
        entity_type: 20,
        pos,
        active: true,
        cell: cell_of(pos),
        kind: EntityKind::Thwump {
            state: 0,
            dir: orientation_vec(orientation),
            origin: pos,
        },
    }
}

fn make_boost_pad(xcoord: u8, ycoord: u8) -> Entity {
    let pos = decode_map_pos(xcoord, ycoord);
    Entity {
        entity_type: 24,
        pos,
        active: true,
        cell: cell_of(pos),
        kind: EntityKind::BoostPad { touching: false },
    }
}

fn make_shove_thwump(xcoord: u8, ycoord: u8) -> Entity {
    let pos = decode_map_pos(xcoord, ycoord);
    Entity {
        entity_type: 28,
        pos,
        active: true,
        cell: cell_of(pos),
        kind: EntityKind::ShoveThwump {
            state: 0,
            dir: Vec2::ZERO,
            origin: pos,
            activated_this_frame: false,
        },
    }
}

/// Shared load-time geometry for the three door kinds: the door's own
/// collidable slab (inserted into the segment index as closed) and the two
/// half-cell grid edges it seeds, plus the switch position the entity's
/// `pos`/`cell` track instead of the door's own location.
struct DoorGeometry {
    switch_pos: Vec2,
    p1: Vec2,
    p2: Vec2,
    door_cell: (usize, usize),
    is_vertical: bool,
    grid_edges: [(usize, usize); 2],
}

fn build_door_geometry(
    world: &mut World,
    xcoord: u8,
    ycoord: u8,
    orientation: u8,
    sw_xcoord: u8,
    sw_ycoord: u8,
) -> DoorGeometry {
    let pos = decode_map_pos(xcoord, ycoord);
    let vec = orientation_vec(orientation);
    let is_vertical = orientation == 0 || orientation == 4;
    let door_xcell = ((pos.x - 12.0 * vec.x) / CELL_SIZE).floor() as i32;
    let door_ycell = ((pos.y - 12.0 * vec.y) / CELL_SIZE).floor() as i32;
    let door_cell = clamp_cell(door_xcell, door_ycell);
    let half_x = 2 * (door_cell.0 + 1);
    let half_y = 2 * (door_cell.1 + 1);

    let (p1, p2, grid_edges) = if is_vertical {
        (
            Vec2::new(pos.x, pos.y - 12.0),
            Vec2::new(pos.x, pos.y + 12.0),
            [(half_x, half_y - 2), (half_x, half_y - 1)],
        )
    } else {
        (
            Vec2::new(pos.x - 12.0, pos.y),
            Vec2::new(pos.x + 12.0, pos.y),
            [(half_x - 2, half_y), (half_x - 1, half_y)],
        )
    };

    world.insert_door_segment(door_cell, p1, p2);
    for (ex, ey) in grid_edges {
        if is_vertical {
            world.add_ver_edge(ex, ey, 1);
        } else {
            world.add_hor_edge(ex, ey, 1);
        }
    }

    DoorGeometry {
        switch_pos: decode_map_pos(sw_xcoord, sw_ycoord),
        p1,
        p2,
        door_cell,
        is_vertical,
        grid_edges,
    }
}

fn make_door_regular(world: &mut World, xcoord: u8, ycoord: u8, orientation: u8) -> Entity {
    let geom = build_door_geometry(world, xcoord, ycoord, orientation, xcoord, ycoord);
    Entity {
        entity_type: 5,
        pos: geom.switch_pos,
        active: true,
        cell: cell_of(geom.switch_pos),
        kind: EntityKind::DoorRegular {
            open: false,
            open_timer: 0,
            p1: geom.p1,
            p2: geom.p2,
            door_cell: geom.door_cell,
            is_vertical: geom.is_vertical,
            grid_edges: geom.grid_edges,
        },
    }
}

fn make_door_locked(
    world: &mut World,
    xcoord: u8,
    ycoord: u8,
    orientation: u8,
    sw_xcoord: u8,
    sw_ycoord: u8,
) -> Entity {
    let geom = build_door_geometry(world, xcoord, ycoord, orientation, sw_xcoord, sw_ycoord);
    Entity {
        entity_type: 6,
        pos: geom.switch_pos,
        active: true,
        cell: cell_of(geom.switch_pos),
        kind: EntityKind::DoorLocked {
            open: false,
            switch_pos: geom.switch_pos,
            switch_collected: false,
            p1: geom.p1,
            p2: geom.p2,
            door_cell: geom.door_cell,
            is_vertical: geom.is_vertical,
            grid_edges: geom.grid_edges,
        },
    }
}

fn make_door_trap(
    world: &mut World,
    xcoord: u8,
    ycoord: u8,
    orientation: u8,
    sw_xcoord: u8,
    sw_ycoord: u8,
) -> Entity {
    let geom = build_door_geometry(world, xcoord, ycoord, orientation, sw_xcoord, sw_ycoord);
    // Trap doors start open: undo the closed contribution `build_door_geometry`
    // seeded by default.
    world.set_door_segment_active(geom.door_cell, geom.p1, false);
    for (ex, ey) in geom.grid_edges {
        if geom.is_vertical {
            world.add_ver_edge(ex, ey, -1);
        } else {
            world.add_hor_edge(ex, ey, -1);
        }
    }
    Entity {
        entity_type: 8,
        pos: geom.switch_pos,
        active: true,
        cell: cell_of(geom.switch_pos),
        kind: EntityKind::DoorTrap {
            open: true,
            switch_pos: geom.switch_pos,
            switch_collected: false,
            p1: geom.p1,
            p2: geom.p2,
            door_cell: geom.door_cell,
            is_vertical: geom.is_vertical,
            grid_edges: geom.grid_edges,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_map() -> Vec<u8> {
        let mut map = vec![0u8; MAP_MIN_LENGTH];
        for b in &mut map[MAP_TILE_DATA_START..MAP_TILE_DATA_END] {
            *b = 0;
        }
        map[MAP_NINJA_SPAWN_X_OFFSET] = 5;
        map[MAP_NINJA_SPAWN_Y_OFFSET] = 5;
        map
    }

    #[test]
    fn decode_input_matches_fixed_tables() {
        assert_eq!(decode_input(0), (0, 0));
        assert_eq!(decode_input(1), (0, 1));
        assert_eq!(decode_input(2), (1, 0));
        assert_eq!(decode_input(4), (-1, 0));
        assert_eq!(decode_input(7), (-1, 1));
    }

    #[test]
    fn load_rejects_undersized_buffer() {
        let err = Simulator::load(&[0u8; 10]).unwrap_err();
        assert!(matches!(err, SimError::MalformedMap { .. }));
    }

    #[test]
    fn load_places_ninja_at_spawn_with_zero_velocity() {
        let sim = Simulator::load(&empty_map()).unwrap();
        assert_eq!(sim.ninja().pos, Vec2::new(30.0, 30.0));
        assert_eq!(sim.ninja().vel, Vec2::ZERO);
        assert_eq!(sim.ninja().state, 0);
        assert_eq!(sim.frame(), 0);
    }

    #[test]
    fn tick_advances_frame_counter_and_logs() {
        let mut sim = Simulator::load(&empty_map()).unwrap();
        sim.tick(0, 0);
        assert_eq!(sim.frame(), 1);
        assert_eq!(sim.position_log().len(), 1);
        assert_eq!(sim.velocity_log().len(), 1);
        assert_eq!(sim.position_log()[0].frame, 1);
    }

    #[test]
    fn ninja_falls_under_gravity_with_no_floor_beneath() {
        let mut sim = Simulator::load(&empty_map()).unwrap();
        let y0 = sim.ninja().pos.y;
        sim.tick(0, 0);
        assert!(sim.ninja().pos.y > y0);
    }

    #[test]
    fn replay_validity_is_false_without_an_exit() {
        let mut sim = Simulator::load(&empty_map()).unwrap();
        sim.tick(0, 0);
        assert!(!sim.is_replay_valid(1));
        assert!(sim.exit_log().is_none());
    }

    #[test]
    fn gold_entity_loads_with_correct_type_and_position() {
        let mut map = empty_map();
        map[MAP_ENTITY_TABLE_START] = 2;
        map[MAP_ENTITY_TABLE_START + 1] = 20;
        map[MAP_ENTITY_TABLE_START + 2] = 20;
        let sim = Simulator::load(&map).unwrap();
        assert_eq!(sim.entities().len(), 1);
        assert_eq!(sim.entities()[0].entity_type, 2);
        assert_eq!(sim.entities()[0].pos, Vec2::new(120.0, 120.0));
    }

    #[test]
    fn exit_and_switch_pair_links_back_to_each_other() {
        let mut map = empty_map();
        map[MAP_EXIT_DOOR_COUNT_OFFSET] = 1;
        map[MAP_ENTITY_TABLE_START] = 3;
        map[MAP_ENTITY_TABLE_START + 1] = 10;
        map[MAP_ENTITY_TABLE_START + 2] = 10;
        // switch coordinates at offset + 5*1 + {1,2}
        map[MAP_ENTITY_TABLE_START + 5 + 1] = 15;
        map[MAP_ENTITY_TABLE_START + 5 + 2] = 15;
        let sim = Simulator::load(&map).unwrap();
        assert_eq!(sim.entities().len(), 2);
        assert!(!sim.entities()[0].active);
        assert!(sim.entities()[1].active);
        match &sim.entities()[0].kind {
            EntityKind::Exit { switch_index, .. } => assert_eq!(*switch_index, 1),
            _ => panic!("expected Exit"),
        }
        match &sim.entities()[1].kind {
            EntityKind::ExitSwitch { exit_index, .. } => assert_eq!(*exit_index, 0),
            _ => panic!("expected ExitSwitch"),
        }
    }

    #[test]
    fn truncated_entity_record_is_rejected() {
        let mut map = empty_map();
        map.truncate(MAP_ENTITY_TABLE_START + 3);
        let err = Simulator::load(&map).unwrap_err();
        assert!(matches!(err, SimError::TruncatedEntityRecord { .. }));
    }
}
