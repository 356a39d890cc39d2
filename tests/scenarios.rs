//! End-to-end scenarios driving `Simulator` through `load`/`tick` exactly as
//! a replay consumer would, rather than exercising individual collision
//! primitives in isolation.

use nsim_core::constants::{
    MAP_ENTITY_TABLE_START, MAP_EXIT_DOOR_COUNT_OFFSET, MAP_NINJA_SPAWN_X_OFFSET,
    MAP_NINJA_SPAWN_Y_OFFSET, MAP_TILE_COLUMNS, MAP_TILE_DATA_START,
};
use nsim_core::entities::EntityKind;
use nsim_core::Simulator;

const MAP_LEN: usize = 1300;

fn base_map() -> Vec<u8> {
    vec![0u8; MAP_LEN]
}

fn set_tile_row(map: &mut [u8], row: usize, id: u8) {
    for col in 0..MAP_TILE_COLUMNS {
        map[MAP_TILE_DATA_START + row * MAP_TILE_COLUMNS + col] = id;
    }
}

fn set_spawn(map: &mut [u8], x6: u8, y6: u8) {
    map[MAP_NINJA_SPAWN_X_OFFSET] = x6;
    map[MAP_NINJA_SPAWN_Y_OFFSET] = y6;
}

fn write_entity_at(map: &mut [u8], offset: usize, etype: u8, x6: u8, y6: u8, orientation: u8) {
    map[offset] = etype;
    map[offset + 1] = x6;
    map[offset + 2] = y6;
    map[offset + 3] = orientation;
    map[offset + 4] = 0;
}

fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() < eps
}

#[test]
fn round_trip_spawn_matches_decoded_position() {
    let mut map = base_map();
    set_spawn(&mut map, 7, 11);
    let sim = Simulator::load(&map).unwrap();
    assert_eq!(sim.ninja().pos.x, 42.0);
    assert_eq!(sim.ninja().pos.y, 66.0);
    assert_eq!(sim.ninja().vel.x, 0.0);
    assert_eq!(sim.ninja().vel.y, 0.0);
    assert_eq!(sim.ninja().state, 0);
    assert_eq!(sim.frame(), 0);
}

#[test]
fn determinism_same_map_and_inputs_produce_identical_traces() {
    let mut map = base_map();
    set_spawn(&mut map, 5, 40);
    write_entity_at(&mut map, MAP_ENTITY_TABLE_START + 5, 2, 30, 41, 0);

    let inputs: Vec<(i32, u8)> = (0..80)
        .map(|i| (if i % 10 < 5 { 1 } else { -1 }, if i % 17 == 0 { 1 } else { 0 }))
        .collect();

    let run = |map: &[u8]| -> (Vec<(f64, f64)>, Vec<(f64, f64)>) {
        let mut sim = Simulator::load(map).unwrap();
        for &(h, j) in &inputs {
            sim.tick(h, j);
        }
        let pos = sim.position_log().iter().map(|p| (p.x, p.y)).collect();
        let vel = sim.velocity_log().iter().map(|v| (v.x, v.y)).collect();
        (pos, vel)
    };

    let (pos_a, vel_a) = run(&map);
    let (pos_b, vel_b) = run(&map);
    assert_eq!(pos_a, pos_b);
    assert_eq!(vel_a, vel_b);
}

/// "Still": an open field bordered only by the implicit solid frame. The
/// ninja falls a short distance, lands on the bottom border, and settles
/// into the immobile state with zero velocity.
#[test]
fn s1_still_ninja_settles_to_rest_on_the_border_floor() {
    let mut map = base_map();
    set_spawn(&mut map, 5, 90); // world (30, 540)
    let mut sim = Simulator::load(&map).unwrap();

    for _ in 0..100 {
        sim.tick(0, 0);
    }

    assert_eq!(sim.ninja().state, 0);
    assert!(approx_eq(sim.ninja().vel.x, 0.0, 1e-9));
    assert!(approx_eq(sim.ninja().vel.y, 0.0, 1e-9));
    assert!(approx_eq(sim.ninja().pos.x, 30.0, 1e-6));
    // Bottom border solid begins at world y=576 (cell 24); resting height is
    // one ninja radius above that surface.
    assert!(approx_eq(sim.ninja().pos.y, 566.0, 1e-6));
}

/// "Gold hit": one gold piece sitting on a floor the ninja walks across.
#[test]
fn s2_gold_is_collected_while_walking_on_floor() {
    let mut map = base_map();
    set_tile_row(&mut map, 5, 1); // cell row 6, world y in [144, 168)
    set_spawn(&mut map, 5, 10); // world (30, 60), falls onto the floor
    write_entity_at(&mut map, MAP_ENTITY_TABLE_START + 5, 2, 20, 22, 0); // gold at (120, 132)

    let mut sim = Simulator::load(&map).unwrap();
    for _ in 0..300 {
        sim.tick(1, 0);
    }

    assert_eq!(sim.entities().len(), 1);
    assert!(!sim.entities()[0].active);
    match &sim.entities()[0].kind {
        EntityKind::Gold { collected } => assert!(*collected),
        other => panic!("expected Gold, got {other:?}"),
    }
}

/// First contact with a launch pad sets velocity to its boost vector
/// exactly, with no additive residual from the ninja's prior motion.
#[test]
fn s4_launch_pad_sets_velocity_to_the_boost_vector_exactly() {
    let mut map = base_map();
    set_spawn(&mut map, 10, 10); // world (60, 60)
    // orientation 0 -> unit vector (1, 0): a purely horizontal boost.
    write_entity_at(&mut map, MAP_ENTITY_TABLE_START + 5, 10, 10, 10, 0);

    let mut sim = Simulator::load(&map).unwrap();
    sim.tick(0, 0);

    let expected_vx = (36.0_f64 / 7.0) * (2.0 / 3.0);
    assert!(approx_eq(sim.ninja().vel.x, expected_vx, 1e-9));
    assert!(approx_eq(sim.ninja().vel.y, 0.0, 1e-9));
    assert_eq!(sim.ninja().state, 4);
}

/// "Replay validity": an exit and its switch at the ninja's spawn location.
/// Collecting the switch on frame 1 activates the exit; overlapping it on
/// frame 2 logs the win. A bounce block sits far away, inert, matching the
/// shape of the scenario without affecting it.
#[test]
fn s5_replay_is_valid_once_switch_then_exit_are_reached() {
    let mut map = base_map();
    set_spawn(&mut map, 10, 10); // world (60, 60)
    map[MAP_EXIT_DOOR_COUNT_OFFSET] = 1;

    let exit_offset = MAP_ENTITY_TABLE_START + 5;
    write_entity_at(&mut map, exit_offset, 3, 10, 10, 0);
    let switch_offset = exit_offset + 5 * 1;
    map[switch_offset + 1] = 10;
    map[switch_offset + 2] = 10;

    write_entity_at(&mut map, switch_offset + 5, 17, 100, 100, 0); // inert bounce block

    let mut sim = Simulator::load(&map).unwrap();
    assert_eq!(sim.entities().len(), 3);

    sim.tick(0, 0); // collects the switch, activates the exit
    sim.tick(0, 0); // overlaps the now-active exit, logs the win

    assert_eq!(sim.exit_log(), Some(&[2u32][..]));
    assert!(sim.is_replay_valid(2));
    assert!(!sim.is_replay_valid(3));
}

/// "Death by impact": falling roughly ten tiles onto solid ground builds up
/// enough downward speed to exceed the survivable-impact threshold.
#[test]
fn s6_a_long_fall_onto_solid_ground_kills_the_ninja() {
    let mut map = base_map();
    set_tile_row(&mut map, 19, 1); // cell row 20, world y in [480, 504)
    set_spawn(&mut map, 10, 40); // world (60, 240), ~230 units above the floor

    let mut sim = Simulator::load(&map).unwrap();
    for _ in 0..150 {
        sim.tick(0, 0);
    }

    assert_eq!(sim.ninja().state, 6);
}
