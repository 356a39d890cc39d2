//! The player avatar: physics state, the per-frame collision pipeline, and
//! the ten-state movement state machine.

use crate::constants::{
    AIR_ACCEL, DRAG_REGULAR, DRAG_SLOW, FRICTION_GROUND, FRICTION_GROUND_SLOW, FRICTION_WALL,
    GRAVITY_FALL, GRAVITY_JUMP, GROUND_ACCEL, MAX_HOR_SPEED, MAX_JUMP_DURATION,
    MAX_SURVIVABLE_IMPACT, NINJA_RADIUS,
};
use crate::entities::behaviors::{LogicalEffect, NinjaContext};
use crate::entities::Entity;
use crate::grid::world::World;
use crate::types::Vec2;

const JUMP_BUFFER_RANGE: i32 = 5;
const FLOOR_BUFFER_RANGE: i32 = 5;
const WALL_BUFFER_RANGE: i32 = 5;
const LAUNCH_PAD_BUFFER_RANGE: i32 = 4;

/// Physics state of the single player avatar.
#[derive(Debug, Clone)]
pub struct Ninja {
    pub pos: Vec2,
    pub vel: Vec2,
    pub pos_old: Vec2,
    pub vel_old: Vec2,
    pub radius: f64,
    pub state: u8,
    pub facing: f64,

    pub floor_count: u32,
    pub floor_normal_accum: Vec2,
    pub floor_normal: Vec2,
    pub ceiling_count: u32,
    pub ceiling_normal_accum: Vec2,
    pub ceiling_normal: Vec2,

    pub walled: bool,
    pub wall_normal: f64,

    pub jump_buffer: i32,
    pub floor_buffer: i32,
    pub wall_buffer: i32,
    pub launch_pad_buffer: i32,

    pub jump_duration: u32,
    pub jump_input: u8,
    pub jump_input_old: u8,
    pub hor_input: i32,

    pub gravity: f64,
    pub drag: f64,
    pub lp_normalized: Vec2,

    pub airborn: bool,
}

impl Ninja {
    pub fn new(spawn: Vec2) -> Self {
        Ninja {
            pos: spawn,
            vel: Vec2::ZERO,
            pos_old: spawn,
            vel_old: Vec2::ZERO,
            radius: NINJA_RADIUS,
            state: 0,
            facing: 1.0,
            floor_count: 0,
            floor_normal_accum: Vec2::ZERO,
            floor_normal: Vec2::new(0.0, -1.0),
            ceiling_count: 0,
            ceiling_normal_accum: Vec2::ZERO,
            ceiling_normal: Vec2::new(0.0, 1.0),
            walled: false,
            wall_normal: 0.0,
            jump_buffer: -1,
            floor_buffer: -1,
            wall_buffer: -1,
            launch_pad_buffer: -1,
            jump_duration: 0,
            jump_input: 0,
            jump_input_old: 0,
            hor_input: 0,
            gravity: GRAVITY_FALL,
            drag: DRAG_REGULAR,
            lp_normalized: Vec2::ZERO,
            airborn: true,
        }
    }

    pub fn is_valid_target(&self) -> bool {
        !matches!(self.state, 6 | 8 | 9)
    }

    pub fn win(&mut self) {
        if self.state < 6 {
            if self.state == 3 {
                self.gravity = GRAVITY_FALL;
            }
            self.state = 8;
        }
    }

    pub fn kill(&mut self) {
        if self.state < 6 {
            if self.state == 3 {
                self.gravity = GRAVITY_FALL;
            }
            self.state = 7;
        }
    }

    fn context(&self, frame: u32) -> NinjaContext {
        NinjaContext {
            pos: self.pos,
            pos_old: self.pos_old,
            vel: self.vel,
            radius: self.radius,
            state: self.state,
            frame,
        }
    }

    /// `(vx,vy) *= drag; vy += gravity; (x_old,y_old) = (x,y); (x,y) += (vx,vy)`.
    pub fn integrate(&mut self) {
        self.vel = self.vel * self.drag;
        self.vel.y += self.gravity;
        self.pos_old = self.pos;
        self.pos += self.vel;
    }

    pub fn pre_collision(&mut self) {
        self.vel_old = self.vel;
        self.floor_count = 0;
        self.floor_normal_accum = Vec2::ZERO;
        self.ceiling_count = 0;
        self.ceiling_normal_accum = Vec2::ZERO;
    }

    fn classify_normal(&mut self, normal: Vec2) {
        if normal.y >= -1e-4 {
            self.ceiling_count += 1;
            self.ceiling_normal_accum += normal;
        } else {
            self.floor_count += 1;
            self.floor_normal_accum += normal;
        }
    }

    pub fn collide_vs_objects(&mut self, entities: &mut [Entity], frame: u32) {
        let ctx = self.context(frame);
        let nearby = entities_near(entities, self.pos);
        for idx in nearby {
            let entity = &mut entities[idx];
            if !entity.active || !entity.is_physical_collidable() {
                continue;
            }
            let Some(hit) = entity.physical_collision(&ctx) else {
                continue;
            };
            self.pos += hit.normal * hit.pen_minor;
            if entity.couples_velocity() {
                self.vel += hit.normal * hit.pen_minor;
            }
            if matches!(entity.kind, crate::entities::EntityKind::OneWayPlatform { .. })
                && hit.pen_minor != 0.0
            {
                let n = hit.normal;
                let cross = self.vel.x * n.y - self.vel.y * n.x;
                self.vel = Vec2::new(cross * n.y, cross * -n.x);
            }
            self.classify_normal(hit.normal);
        }
    }

    /// Tiny-dx fudges observed at three literal x-position coordinates in
    /// the reference engine, preserved verbatim rather than "cleaned up".
    fn apply_dx_fudge(dx: f64, x: f64) -> f64 {
        if dx.abs() > 1e-7 {
            return dx;
        }
        const EPS47: f64 = 1.0 / 140_737_488_355_328.0; // 2^-47
        if x == 50.51197510492316 || x == 49.23232124849253 {
            -EPS47
        } else if x == 49.153536108584795 {
            EPS47
        } else {
            0.0
        }
    }

    pub fn collide_vs_tiles(&mut self, world: &World) {
        let delta = self.pos - self.pos_old;
        let t = world.sweep_circle_vs_tiles(self.pos_old, delta, self.radius / 2.0);
        self.pos = self.pos_old + delta * t;

        for _ in 0..32 {
            let segs = world.gather_segments(
                self.pos - Vec2::splat(self.radius + 1.0),
                self.pos + Vec2::splat(self.radius + 1.0),
            );
            let (result, closest) = closest_segment_point(&segs, self.pos, self.radius);
            if result == 0 {
                break;
            }
            let mut dx = self.pos.x - closest.x;
            let dy = self.pos.y - closest.y;
            dx = Self::apply_dx_fudge(dx, self.pos.x);
            let dist = (dx * dx + dy * dy).sqrt();
            if dist == 0.0 || self.radius - dist * result as f64 < 1e-7 {
                break;
            }
            self.pos = closest + Vec2::new(dx, dy) * (result as f64 * self.radius / dist);
            if self.vel.x * dx + self.vel.y * dy < 0.0 {
                let cross = (self.vel.x * dy - self.vel.y * dx) / (dist * dist);
                self.vel = Vec2::new(cross * dy, cross * -dx);
            }
            self.classify_normal(Vec2::new(dx, dy) / dist);
        }
    }

    /// Runs the logical-collision pass, wall-contact sampling, launch-pad
    /// application and the floor/ceiling impact-death check. Returns `true`
    /// if this frame is the one where the ninja enters the exit (the state
    /// transition from "alive" to celebrating), for the simulator's exit log.
    pub fn post_collision(&mut self, entities: &mut [Entity], world: &mut World, frame: u32) -> bool {
        let ctx = self.context(frame);
        let mut wall_normal_sum = 0.0f64;
        let mut launch_effect: Option<Vec2> = None;
        let mut boost_effect: Option<Vec2> = None;
        let mut killed = false;
        let mut won = false;

        let nearby = entities_near(entities, self.pos);
        let mut activations: Vec<usize> = Vec::new();
        for idx in nearby {
            let entity = &mut entities[idx];
            if !entity.active || !entity.is_logical_collidable() {
                continue;
            }
            match entity.logical_collision(&ctx, idx, world) {
                LogicalEffect::None => {}
                LogicalEffect::WallNormal(n) => wall_normal_sum += n,
                LogicalEffect::LaunchBoost(v) => launch_effect = Some(v),
                LogicalEffect::BoostVelocity(v) => boost_effect = Some(v),
                LogicalEffect::Kill => killed = true,
                LogicalEffect::Win => won = true,
                LogicalEffect::ActivateExit(exit_idx) => activations.push(exit_idx),
            }
        }
        if let Some(boost) = boost_effect {
            self.vel += boost;
        }
        for exit_idx in activations {
            if let Some(exit) = entities.get_mut(exit_idx) {
                exit.active = true;
                world.add_entity(exit.cell, exit_idx);
            }
        }

        let segs = world.gather_segments(
            self.pos - Vec2::splat(self.radius + 0.1),
            self.pos + Vec2::splat(self.radius + 0.1),
        );
        for seg in &segs {
            let cp = seg.closest_point(self.pos);
            let d = self.pos - cp.point;
            if d.y.abs() < 1e-5 {
                let dist = d.length();
                if dist > 0.0 && dist <= self.radius + 0.1 {
                    wall_normal_sum += d.x.signum();
                }
            }
        }
        self.walled = wall_normal_sum != 0.0;
        self.wall_normal = wall_normal_sum.signum();

        if let Some(boost) = launch_effect {
            let boosted = boost * (2.0 / 3.0);
            self.vel = boosted;
            self.pos += boosted;
            self.lp_normalized = boosted.try_normalize().unwrap_or(Vec2::ZERO);
            self.floor_count = 0;
            self.floor_normal_accum = Vec2::ZERO;
            self.floor_buffer = -1;
            self.launch_pad_buffer = 0;
            if self.state == 3 {
                self.gravity = GRAVITY_FALL;
            }
            self.state = 4;
        }

        if self.floor_count > 0 {
            self.airborn = false;
            self.floor_normal = self
                .floor_normal_accum
                .try_normalize()
                .unwrap_or(Vec2::new(0.0, -1.0));
            if self.state != 8 {
                let impact = -self.floor_normal.dot(self.vel_old);
                if impact > MAX_SURVIVABLE_IMPACT - (4.0 / 3.0) * self.floor_normal.y.abs() {
                    self.vel = self.vel_old;
                    killed = true;
                }
            }
        } else {
            self.airborn = true;
        }

        if self.ceiling_count > 0 {
            self.ceiling_normal = self
                .ceiling_normal_accum
                .try_normalize()
                .unwrap_or(Vec2::new(0.0, 1.0));
            if self.state != 8 {
                let impact = -self.ceiling_normal.dot(self.vel_old);
                if impact > MAX_SURVIVABLE_IMPACT - (4.0 / 3.0) * self.ceiling_normal.y.abs() {
                    self.vel = self.vel_old;
                    killed = true;
                }
            }
        }

        let exited = won && self.state < 6;
        if won {
            self.win();
        }
        if killed {
            self.kill();
        }
        exited
    }

    fn advance_buffer(value: i32, active_this_frame: bool, range: i32) -> i32 {
        if active_this_frame {
            0
        } else if value >= 0 && value < range - 1 {
            value + 1
        } else {
            -1
        }
    }

    pub fn think(&mut self) {
        let new_jump = self.jump_input == 1 && self.jump_input_old == 0;

        self.jump_buffer = Self::advance_buffer(
            self.jump_buffer,
            new_jump && self.airborn,
            JUMP_BUFFER_RANGE,
        );
        self.floor_buffer =
            Self::advance_buffer(self.floor_buffer, !self.airborn, FLOOR_BUFFER_RANGE);
        self.wall_buffer = Self::advance_buffer(self.wall_buffer, self.walled, WALL_BUFFER_RANGE);
        self.launch_pad_buffer = Self::advance_buffer(
            self.launch_pad_buffer,
            self.launch_pad_buffer == 0,
            LAUNCH_PAD_BUFFER_RANGE,
        );

        self.jump_input_old = self.jump_input;

        if self.state == 7 {
            self.state = 6;
            return;
        }
        if self.state == 8 {
            self.drag = if self.airborn { DRAG_REGULAR } else { DRAG_SLOW };
            return;
        }

        if !self.airborn {
            self.think_grounded(new_jump);
        } else {
            self.think_airborn(new_jump);
        }
    }

    fn in_buffer(value: i32, range: i32) -> bool {
        (0..range).contains(&value)
    }

    fn think_grounded(&mut self, new_jump: bool) {
        let candidate = self.vel.x + GROUND_ACCEL * self.hor_input as f64;
        if candidate.abs() < MAX_HOR_SPEED {
            self.vel.x = candidate;
        }

        let n = self.floor_normal;
        let was_airborne_state = self.state > 2;
        if was_airborne_state {
            self.state = if self.vel.x * self.hor_input as f64 > 0.0 {
                1
            } else {
                2
            };
            self.gravity = GRAVITY_FALL;
        }

        let in_jump_buffer = Self::in_buffer(self.jump_buffer, JUMP_BUFFER_RANGE);
        if !in_jump_buffer && !new_jump {
            let proj = (self.vel.y * n.x - self.vel.x * n.y).abs();
            match self.state {
                2 => {
                    if self.hor_input as f64 * proj * self.vel.x > 0.0 {
                        self.state = 1;
                    } else if proj < 0.1 && n.x == 0.0 {
                        self.state = 0;
                    } else if self.vel.y < 0.0 && n.x != 0.0 {
                        let s = self.vel.length();
                        let f = (self.vel.x * (1.0 - FRICTION_GROUND) * n.y).abs();
                        let f2 = s - f * n.y * n.y;
                        if s != 0.0 {
                            self.vel = self.vel * (f2 / s);
                        }
                    } else {
                        self.vel.x *= FRICTION_GROUND;
                    }
                }
                1 => {
                    let downhill = self.hor_input as f64 * n.x >= 0.0;
                    if self.hor_input as f64 * proj * self.vel.x > 0.0 && downhill {
                        // slope carries the ninja, no extra friction or boost
                    } else {
                        let candidate2 = self.vel.x + GROUND_ACCEL * self.hor_input as f64;
                        if candidate2.abs() < MAX_HOR_SPEED {
                            let boost = (GROUND_ACCEL / 2.0) * self.hor_input as f64;
                            self.vel.x += boost * n.y * n.y;
                            self.vel.y += boost * n.y * -n.x;
                        } else {
                            self.state = 2;
                        }
                    }
                }
                0 => {
                    if self.hor_input != 0 {
                        self.state = 1;
                    } else if proj < 0.1 {
                        self.vel.x *= FRICTION_GROUND_SLOW;
                    } else {
                        self.state = 2;
                    }
                }
                _ => {}
            }
        } else {
            self.floor_jump();
        }
    }

    fn think_airborn(&mut self, new_jump: bool) {
        let candidate = self.vel.x + AIR_ACCEL * self.hor_input as f64;
        if candidate.abs() < MAX_HOR_SPEED {
            self.vel.x = candidate;
        }

        if self.state < 3 {
            self.state = 4;
        }
        if self.state == 3 {
            self.jump_duration += 1;
            if self.jump_input == 0 || self.jump_duration > MAX_JUMP_DURATION {
                self.gravity = GRAVITY_FALL;
                self.state = 4;
            }
        }

        let in_jump_buffer = Self::in_buffer(self.jump_buffer, JUMP_BUFFER_RANGE);
        if in_jump_buffer || new_jump {
            let in_wall_buffer = Self::in_buffer(self.wall_buffer, WALL_BUFFER_RANGE);
            let in_floor_buffer = Self::in_buffer(self.floor_buffer, FLOOR_BUFFER_RANGE);
            let in_lp_buffer = Self::in_buffer(self.launch_pad_buffer, LAUNCH_PAD_BUFFER_RANGE);
            if self.walled || in_wall_buffer {
                self.wall_jump();
            } else if in_floor_buffer {
                self.floor_jump();
            } else if in_lp_buffer && new_jump {
                self.lp_jump();
            }
        } else if self.state == 5 {
            if !self.walled {
                self.state = 4;
            } else if self.hor_input as f64 * self.wall_normal <= 0.0 {
                self.vel.y *= FRICTION_WALL;
            } else {
                self.state = 4;
            }
        } else if self.vel.y > 0.0
            && self.walled
            && self.hor_input as f64 * self.wall_normal < 0.0
        {
            self.gravity = GRAVITY_FALL;
            self.state = 5;
        }
    }

    fn reset_jump_buffers(&mut self) {
        self.jump_buffer = -1;
        self.floor_buffer = -1;
        self.wall_buffer = -1;
        self.launch_pad_buffer = -1;
    }

    fn floor_jump(&mut self) {
        let n = self.floor_normal;
        let downhill = self.vel.x * n.x >= 0.0 && n.x != 0.0;
        let input_downhill = self.hor_input as f64 * n.x >= 0.0;
        let (jx, jy) = if n.x == 0.0 {
            (0.0, -2.0)
        } else if downhill && input_downhill {
            (2.0 / 3.0 * n.x, 2.0 * n.y)
        } else if downhill {
            (0.0, -1.4)
        } else if input_downhill {
            (0.0, -1.4)
        } else {
            self.vel.x = 0.0;
            (2.0 / 3.0 * n.x, 2.0 * n.y)
        };
        self.vel.y = self.vel.y.min(0.0);
        self.vel += Vec2::new(jx, jy);
        self.pos += Vec2::new(jx, jy);
        self.state = 3;
        self.gravity = GRAVITY_JUMP;
        self.jump_duration = 0;
        self.reset_jump_buffers();
    }

    fn wall_jump(&mut self) {
        let sliding = self.hor_input as f64 * self.wall_normal < 0.0 && self.state == 5;
        let (mut jx, jy) = if sliding { (2.0 / 3.0, -1.0) } else { (1.0, -1.4) };
        if self.hor_input as f64 * self.wall_normal < 0.0 {
            self.vel.x = 0.0;
        }
        jx *= self.wall_normal;
        self.vel.y = self.vel.y.min(0.0);
        self.vel += Vec2::new(jx, jy);
        self.pos += Vec2::new(jx, jy);
        self.state = 3;
        self.gravity = GRAVITY_JUMP;
        self.jump_duration = 0;
        self.reset_jump_buffers();
    }

    fn lp_jump(&mut self) {
        let lp = self.lp_normalized;
        let scalar = if lp.x == 0.0 { 1.7 } else { 2.0 * lp.x.abs() + 2.0 };
        self.vel += lp * scalar * (2.0 / 3.0);
        self.reset_jump_buffers();
    }
}

/// Result of a broad-phase closest-segment query: `0` none, `1` front-facing
/// closest, `-1` back-facing closest. Non-back-facing candidates are
/// preferred at equal distance via the `0.1` distance-squared bias.
fn closest_segment_point(
    segments: &[crate::grid::segment::Segment],
    pos: Vec2,
    radius: f64,
) -> (i32, Vec2) {
    let mut best_dist_sq = f64::INFINITY;
    let mut best_point = Vec2::ZERO;
    let mut result = 0i32;
    for seg in segments {
        if !seg.active() {
            continue;
        }
        let cp = seg.closest_point(pos);
        let mut dist_sq = pos.distance_squared(cp.point);
        if dist_sq > (radius + 1.0) * (radius + 1.0) {
            continue;
        }
        if !cp.is_back_facing {
            dist_sq -= 0.1;
        }
        if dist_sq < best_dist_sq {
            best_dist_sq = dist_sq;
            best_point = cp.point;
            result = if cp.is_back_facing { -1 } else { 1 };
        }
    }
    (result, best_point)
}

fn entities_near(entities: &[Entity], pos: Vec2) -> Vec<usize> {
    let radius_cells = 1i32;
    let cell = crate::math::clamp_cell(
        (pos.x / crate::constants::CELL_SIZE) as i32,
        (pos.y / crate::constants::CELL_SIZE) as i32,
    );
    let mut out = Vec::new();
    for (idx, e) in entities.iter().enumerate() {
        let dx = (e.cell.0 as i32 - cell.0 as i32).abs();
        let dy = (e.cell.1 as i32 - cell.1 as i32).abs();
        if dx <= radius_cells && dy <= radius_cells {
            out.push(idx);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrate_applies_drag_before_gravity() {
        let mut n = Ninja::new(Vec2::new(0.0, 0.0));
        n.vel = Vec2::new(1.0, 0.0);
        n.drag = 0.5;
        n.gravity = 1.0;
        n.integrate();
        assert_eq!(n.vel, Vec2::new(0.5, 1.0));
        assert_eq!(n.pos, Vec2::new(0.5, 1.0));
    }

    #[test]
    fn win_is_a_noop_once_dead() {
        let mut n = Ninja::new(Vec2::ZERO);
        n.state = 9;
        n.win();
        assert_eq!(n.state, 9);
    }

    #[test]
    fn kill_transitions_to_awaiting_death_state() {
        let mut n = Ninja::new(Vec2::ZERO);
        n.state = 4;
        n.kill();
        assert_eq!(n.state, 7);
    }

    #[test]
    fn is_valid_target_excludes_celebrating_dead_and_awaiting_death() {
        let mut n = Ninja::new(Vec2::ZERO);
        for s in [6u8, 8, 9] {
            n.state = s;
            assert!(!n.is_valid_target());
        }
        n.state = 4;
        assert!(n.is_valid_target());
    }

    #[test]
    fn lp_jump_uses_special_case_when_boost_x_is_zero() {
        let mut n = Ninja::new(Vec2::ZERO);
        n.lp_normalized = Vec2::new(0.0, -1.0);
        n.lp_jump();
        assert_eq!(n.vel, Vec2::new(0.0, -1.0) * 1.7 * (2.0 / 3.0));
    }
}
