//! Per-kind `move`/`think`/`physical_collision`/`logical_collision`
//! implementations, dispatched from one closed `match` per operation.

use crate::entities::{cell_of, overlaps, square_penetration, Entity, EntityKind};
use crate::grid::world::World;
use crate::types::Vec2;

/// Read-only snapshot of the ninja state an entity's behavior needs this
/// frame. Kept separate from `crate::ninja::Ninja` so this module never
/// depends on it (entities are lower in the dependency order than the
/// ninja, which in turn reacts to entity results).
#[derive(Debug, Clone, Copy)]
pub struct NinjaContext {
    pub pos: Vec2,
    pub pos_old: Vec2,
    pub vel: Vec2,
    pub radius: f64,
    pub state: u8,
    pub frame: u32,
}

impl NinjaContext {
    /// `spec.md` 4.4's `is_valid_target`: not dead, not awaiting-death, not celebrating.
    pub fn is_valid_target(&self) -> bool {
        !matches!(self.state, 6 | 8 | 9)
    }
}

/// Result of `Entity::physical_collision`.
#[derive(Debug, Clone, Copy)]
pub struct PhysicalHit {
    pub normal: Vec2,
    pub pen_minor: f64,
    pub pen_major: f64,
}

/// Side effect of `Entity::logical_collision`, applied by the caller since
/// some effects (exit activation) touch a sibling entity by index.
#[derive(Debug, Clone, Copy)]
pub enum LogicalEffect {
    None,
    /// Scalar x-normal contribution accumulated into the ninja's wall_normal sum.
    WallNormal(f64),
    /// Raw (unscaled) launch-pad boost vector; caller applies the ×2/3 scale.
    LaunchBoost(Vec2),
    /// Boost-pad velocity addition: added to the ninja's velocity directly,
    /// unscaled, with no effect on position or buffered state.
    BoostVelocity(Vec2),
    Kill,
    Win,
    /// This `ExitSwitch` was just collected; caller must activate the exit
    /// at this index (insert it into the world's entity grid).
    ActivateExit(usize),
}

/// Logged entity-state-change event, for the per-run entity log.
#[derive(Debug, Clone, Copy)]
pub struct EntityEvent {
    pub frame: u32,
    pub entity_type: u8,
    pub pos: Vec2,
    pub state: u8,
}

const THWUMP_SEMI_SIDE: f64 = 9.0;
const THWUMP_FORWARD_SPEED: f64 = 20.0 / 7.0;
const THWUMP_BACKWARD_SPEED: f64 = 8.0 / 7.0;
const SHOVE_THWUMP_SEMI_SIDE: f64 = 12.0;
const BOUNCE_BLOCK_SEMI_SIDE: f64 = 9.0;
const BOUNCE_BLOCK_STIFFNESS: f64 = 1.0 / 45.0;
const BOUNCE_BLOCK_DAMPENING: f64 = 0.98;
const BOUNCE_BLOCK_STRENGTH: f64 = 0.2;
const ONE_WAY_SEMI_SIDE: f64 = 12.0;
const LAUNCH_PAD_BOOST: f64 = 36.0 / 7.0;

impl Entity {
    /// `spec.md` 3.4 `grid_move`: relocates the entity between cells when
    /// its center crosses a cell boundary. Callers are responsible for
    /// updating the world's entity index using the returned `(old, new)`
    /// pair when they differ.
    pub fn grid_move(&mut self) -> ((usize, usize), (usize, usize)) {
        let old = self.cell;
        self.cell = cell_of(self.pos);
        (old, self.cell)
    }

    pub fn r#move(&mut self, world: &World) {
        match &mut self.kind {
            EntityKind::BounceBlock { origin, vel } => {
                *vel = *vel * BOUNCE_BLOCK_DAMPENING;
                self.pos = self.pos + *vel;
                let force = (*origin - self.pos) * BOUNCE_BLOCK_STIFFNESS;
                self.pos = self.pos + force;
                *vel = *vel + force;
            }
            EntityKind::Thwump { state, dir, origin } => {
                if *state == 0 {
                    return;
                }
                let axis = *dir;
                let origin = *origin;
                let speed = if *state == 1 { THWUMP_FORWARD_SPEED } else { THWUMP_BACKWARD_SPEED };
                let is_horizontal = axis.y == 0.0;
                let direction = if is_horizontal { axis.x.signum() } else { axis.y.signum() };
                let speed_dir = direction * *state as f64;

                if !is_horizontal {
                    let ypos_new = self.pos.y + speed * speed_dir;
                    if *state == -1 && (ypos_new - origin.y) * (self.pos.y - origin.y) < 0.0 {
                        self.pos.y = origin.y;
                        *state = 0;
                        return;
                    }
                    let cell_y = ((self.pos.y + speed_dir * 11.0) / 12.0).floor() as i32;
                    let cell_y_new = ((ypos_new + speed_dir * 11.0) / 12.0).floor() as i32;
                    if cell_y != cell_y_new {
                        let cell_x1 = ((self.pos.x - 11.0) / 12.0).floor() as i32;
                        let cell_x2 = ((self.pos.x + 11.0) / 12.0).floor() as i32;
                        if row_blocked(world, cell_x1, cell_x2, cell_y, speed_dir as i32) {
                            *state = -1;
                            return;
                        }
                    }
                    self.pos.y = ypos_new;
                } else {
                    let xpos_new = self.pos.x + speed * speed_dir;
                    if *state == -1 && (xpos_new - origin.x) * (self.pos.x - origin.x) < 0.0 {
                        self.pos.x = origin.x;
                        *state = 0;
                        return;
                    }
                    let cell_x = ((self.pos.x + speed_dir * 11.0) / 12.0).floor() as i32;
                    let cell_x_new = ((xpos_new + speed_dir * 11.0) / 12.0).floor() as i32;
                    if cell_x != cell_x_new {
                        let cell_y1 = ((self.pos.y - 11.0) / 12.0).floor() as i32;
                        let cell_y2 = ((self.pos.y + 11.0) / 12.0).floor() as i32;
                        if column_blocked(world, cell_x, cell_y1, cell_y2, speed_dir as i32) {
                            *state = -1;
                            return;
                        }
                    }
                    self.pos.x = xpos_new;
                }
            }
            _ => {}
        }
    }

    pub fn think(&mut self, ctx: &NinjaContext, world: &mut World) -> Option<EntityEvent> {
        match &mut self.kind {
            EntityKind::ToggleMine { state } => {
                if ctx.is_valid_target() {
                    match *state {
                        1 if overlaps(self.pos, self.radius_for(1), ctx.pos, ctx.radius) => {
                            *state = 2;
                            Some(EntityEvent {
                                frame: ctx.frame,
                                entity_type: self.entity_type,
                                pos: self.pos,
                                state: 2,
                            })
                        }
                        2 if !overlaps(self.pos, self.radius_for(2), ctx.pos, ctx.radius) => {
                            *state = 0;
                            None
                        }
                        _ => None,
                    }
                } else if *state == 2 && ctx.state == 6 {
                    *state = 1;
                    None
                } else {
                    None
                }
            }
            EntityKind::DoorRegular {
                open,
                open_timer,
                p1,
                door_cell,
                is_vertical,
                grid_edges,
                ..
            } => {
                if *open {
                    *open_timer += 1;
                    if *open_timer > 5 {
                        *open = false;
                        world.set_door_segment_active(*door_cell, *p1, true);
                        toggle_door_edges(world, *is_vertical, *grid_edges, true);
                    }
                }
                None
            }
            EntityKind::Thwump { state, dir, .. } => {
                if *state != 0 {
                    return None;
                }
                let axis = *dir;
                let is_horizontal = axis.y == 0.0;
                let direction = if is_horizontal { axis.x as i32 } else { axis.y as i32 };
                let activation_range = 2.0 * (THWUMP_SEMI_SIDE + ctx.radius);

                if !is_horizontal {
                    if (self.pos.x - ctx.pos.x).abs() < activation_range {
                        let ninja_ycell = (ctx.pos.y / 12.0).floor() as i32;
                        let mut thwump_ycell =
                            ((self.pos.y - direction as f64 * 11.0) / 12.0).floor() as i32;
                        let thwump_xcell1 = ((self.pos.x - 11.0) / 12.0).floor() as i32;
                        let thwump_xcell2 = ((self.pos.x + 11.0) / 12.0).floor() as i32;
                        let mut dy = ninja_ycell - thwump_ycell;
                        if dy * direction >= 0 {
                            let mut last_i = 0i32;
                            for i in 0..crate::constants::THWUMP_ACTIVATION_RAY_STEPS as i32 {
                                last_i = i;
                                if row_blocked(world, thwump_xcell1, thwump_xcell2, thwump_ycell, direction) {
                                    dy = ninja_ycell - thwump_ycell;
                                    break;
                                }
                                thwump_ycell += direction;
                            }
                            if last_i > 0 && dy * direction <= 0 {
                                *state = 1;
                            }
                        }
                    }
                } else if (self.pos.y - ctx.pos.y).abs() < activation_range {
                    let ninja_xcell = (ctx.pos.x / 12.0).floor() as i32;
                    let mut thwump_xcell =
                        ((self.pos.x - direction as f64 * 11.0) / 12.0).floor() as i32;
                    let thwump_ycell1 = ((self.pos.y - 11.0) / 12.0).floor() as i32;
                    let thwump_ycell2 = ((self.pos.y + 11.0) / 12.0).floor() as i32;
                    let mut dx = ninja_xcell - thwump_xcell;
                    if dx * direction >= 0 {
                        let mut last_i = 0i32;
                        for i in 0..crate::constants::THWUMP_ACTIVATION_RAY_STEPS as i32 {
                            last_i = i;
                            if column_blocked(world, thwump_xcell, thwump_ycell1, thwump_ycell2, direction) {
                                dx = ninja_xcell - thwump_xcell;
                                break;
                            }
                            thwump_xcell += direction;
                        }
                        if last_i > 0 && dx * direction <= 0 {
                            *state = 1;
                        }
                    }
                }
                None
            }
            EntityKind::ShoveThwump {
                state,
                dir,
                origin,
                activated_this_frame,
            } => {
                if *state == 1 {
                    if *activated_this_frame {
                        *activated_this_frame = false;
                        return None;
                    }
                    *state = 2;
                }
                match *state {
                    3 => {
                        let origin_dist = (self.pos.x - origin.x).abs() + (self.pos.y - origin.y).abs();
                        if origin_dist >= 1.0 {
                            if let Some(new_pos) = shove_move_if_possible(world, self.pos, *dir, 1.0, 1.0) {
                                self.pos = new_pos;
                            }
                        } else {
                            self.pos = *origin;
                            *state = 0;
                        }
                    }
                    2 => {
                        if let Some(new_pos) = shove_move_if_possible(world, self.pos, *dir, -1.0, 4.0) {
                            self.pos = new_pos;
                        } else {
                            *state = 3;
                        }
                    }
                    _ => {}
                }
                None
            }
            _ => None,
        }
    }

    fn radius_for(&self, state: u8) -> f64 {
        match state {
            0 => 4.0,
            1 => 3.5,
            _ => 4.5,
        }
    }

    pub fn physical_collision(&mut self, ctx: &NinjaContext) -> Option<PhysicalHit> {
        match &mut self.kind {
            EntityKind::OneWayPlatform { normal } => {
                let (n, pen) = one_way_depenetration(self.pos, *normal, ctx)?;
                Some(PhysicalHit {
                    normal: n,
                    pen_minor: pen,
                    pen_major: 0.0,
                })
            }
            EntityKind::BounceBlock { origin: _, .. } => {
                let (normal, (pen_minor, pen_major)) =
                    square_penetration(self.pos, ctx.pos, BOUNCE_BLOCK_SEMI_SIDE + ctx.radius)?;
                if let EntityKind::BounceBlock { vel, .. } = &mut self.kind {
                    let block_share = normal * (pen_minor * (1.0 - BOUNCE_BLOCK_STRENGTH));
                    self.pos = self.pos - block_share;
                    *vel = *vel - block_share;
                }
                Some(PhysicalHit {
                    normal,
                    pen_minor: pen_minor * BOUNCE_BLOCK_STRENGTH,
                    pen_major,
                })
            }
            EntityKind::Thwump { .. } => {
                let (normal, (pen_minor, pen_major)) =
                    square_penetration(self.pos, ctx.pos, THWUMP_SEMI_SIDE + ctx.radius)?;
                Some(PhysicalHit {
                    normal,
                    pen_minor,
                    pen_major,
                })
            }
            EntityKind::ShoveThwump { state, dir, .. } => {
                if *state > 1 {
                    return None;
                }
                let (normal, (pen_minor, pen_major)) =
                    square_penetration(self.pos, ctx.pos, SHOVE_THWUMP_SEMI_SIDE + ctx.radius)?;
                if *state == 1 && normal.dot(*dir) < 0.01 {
                    return None;
                }
                Some(PhysicalHit {
                    normal,
                    pen_minor,
                    pen_major,
                })
            }
            _ => None,
        }
    }

    pub fn logical_collision(
        &mut self,
        ctx: &NinjaContext,
        self_index: usize,
        world: &mut World,
    ) -> LogicalEffect {
        match &mut self.kind {
            EntityKind::ToggleMine { state } => {
                if ctx.is_valid_target()
                    && *state == 0
                    && overlaps(self.pos, self.radius_for(0), ctx.pos, ctx.radius)
                {
                    *state = 1;
                    LogicalEffect::Kill
                } else {
                    LogicalEffect::None
                }
            }
            EntityKind::Gold { collected } => {
                if !*collected
                    && ctx.state != 8
                    && overlaps(self.pos, 6.0, ctx.pos, ctx.radius)
                {
                    *collected = true;
                    self.active = false;
                    LogicalEffect::None
                } else {
                    LogicalEffect::None
                }
            }
            EntityKind::Exit { ninja_exit, .. } => {
                if overlaps(self.pos, 12.0, ctx.pos, ctx.radius) {
                    ninja_exit.push(ctx.frame);
                    LogicalEffect::Win
                } else {
                    LogicalEffect::None
                }
            }
            EntityKind::ExitSwitch {
                exit_index,
                collected,
            } => {
                if !*collected && overlaps(self.pos, 6.0, ctx.pos, ctx.radius) {
                    *collected = true;
                    self.active = false;
                    LogicalEffect::ActivateExit(*exit_index)
                } else {
                    let _ = self_index;
                    LogicalEffect::None
                }
            }
            EntityKind::DoorRegular {
                open,
                open_timer,
                p1,
                door_cell,
                is_vertical,
                grid_edges,
            } => {
                if !*open && overlaps(self.pos, 10.0, ctx.pos, ctx.radius) {
                    *open = true;
                    world.set_door_segment_active(*door_cell, *p1, false);
                    toggle_door_edges(world, *is_vertical, *grid_edges, false);
                }
                if overlaps(self.pos, 10.0, ctx.pos, ctx.radius) {
                    *open_timer = 0;
                }
                LogicalEffect::None
            }
            EntityKind::DoorLocked {
                open,
                switch_pos,
                switch_collected,
                p1,
                door_cell,
                is_vertical,
                grid_edges,
            } => {
                if !*switch_collected && overlaps(*switch_pos, 5.0, ctx.pos, ctx.radius) {
                    *switch_collected = true;
                    *open = true;
                    self.active = false;
                    world.set_door_segment_active(*door_cell, *p1, false);
                    toggle_door_edges(world, *is_vertical, *grid_edges, false);
                }
                LogicalEffect::None
            }
            EntityKind::DoorTrap {
                open,
                switch_pos,
                switch_collected,
                p1,
                door_cell,
                is_vertical,
                grid_edges,
            } => {
                if !*switch_collected && overlaps(*switch_pos, 5.0, ctx.pos, ctx.radius) {
                    *switch_collected = true;
                    *open = false;
                    self.active = false;
                    world.set_door_segment_active(*door_cell, *p1, true);
                    toggle_door_edges(world, *is_vertical, *grid_edges, true);
                }
                LogicalEffect::None
            }
            EntityKind::LaunchPad { normal } => {
                if !ctx.is_valid_target() {
                    return LogicalEffect::None;
                }
                let ninja_leading = ctx.pos - *normal * ctx.radius;
                let gate = (self.pos - ninja_leading).dot(*normal);
                if !overlaps(self.pos, 6.0, ctx.pos, ctx.radius) || gate < -0.1 {
                    return LogicalEffect::None;
                }
                let yscale = if normal.y < 0.0 { 1.0 - normal.y } else { 1.0 };
                LogicalEffect::LaunchBoost(Vec2::new(normal.x, normal.y * yscale) * LAUNCH_PAD_BOOST)
            }
            EntityKind::OneWayPlatform { normal } => {
                if one_way_depenetration(self.pos, *normal, ctx).is_some() && normal.x.abs() == 1.0 {
                    LogicalEffect::WallNormal(normal.x)
                } else {
                    LogicalEffect::None
                }
            }
            EntityKind::BounceBlock { .. } => {
                let test_radius = BOUNCE_BLOCK_SEMI_SIDE + 0.1 + ctx.radius;
                if let Some((normal, _)) = square_penetration(self.pos, ctx.pos, test_radius) {
                    LogicalEffect::WallNormal(normal.x)
                } else {
                    LogicalEffect::None
                }
            }
            EntityKind::BoostPad { touching } => {
                if !ctx.is_valid_target() {
                    *touching = false;
                    return LogicalEffect::None;
                }
                let now_touching = overlaps(self.pos, 6.0, ctx.pos, ctx.radius);
                let effect = if now_touching && !*touching && ctx.vel.length() > 0.0 {
                    LogicalEffect::BoostVelocity(ctx.vel.normalize() * 2.0)
                } else {
                    LogicalEffect::None
                };
                *touching = now_touching;
                effect
            }
            EntityKind::ShoveThwump {
                state,
                dir,
                activated_this_frame,
                ..
            } => {
                if *state > 1 {
                    return LogicalEffect::None;
                }
                let test_radius = SHOVE_THWUMP_SEMI_SIDE + ctx.radius + 0.1;
                let Some((normal, (_pen_minor, pen_major))) =
                    square_penetration(self.pos, ctx.pos, test_radius)
                else {
                    return LogicalEffect::None;
                };
                if *state == 0 {
                    *activated_this_frame = true;
                    if pen_major > 0.2 {
                        *dir = normal;
                        *state = 1;
                    }
                } else if dir.dot(normal) >= 0.01 {
                    *activated_this_frame = true;
                } else {
                    return LogicalEffect::None;
                }
                LogicalEffect::WallNormal(normal.x)
            }
            _ => LogicalEffect::None,
        }
    }
}

/// Flips a door's two half-cell edge accumulators between the open and
/// closed count. `closing=true` restores the solid (+1) contribution;
/// `closing=false` removes it so thwump/shove-thwump line-of-sight checks
/// see the doorway as passable.
fn toggle_door_edges(world: &mut World, is_vertical: bool, edges: [(usize, usize); 2], closing: bool) {
    let delta = if closing { 1 } else { -1 };
    for (x, y) in edges {
        if is_vertical {
            world.add_ver_edge(x, y, delta);
        } else {
            world.add_hor_edge(x, y, delta);
        }
    }
}

/// One-way platform depenetration shared by `physical_collision` and
/// `logical_collision`: returns the contact normal and penetration depth iff
/// the ninja's hitbox, velocity, and approach lane all admit contact.
fn one_way_depenetration(pos: Vec2, normal: Vec2, ctx: &NinjaContext) -> Option<(Vec2, f64)> {
    let rel = ctx.pos - pos;
    let normal_dist = rel.dot(normal);
    let normal_proj = ctx.vel.dot(normal);
    let lateral = Vec2::new(-normal.y, normal.x);
    let lateral_pos = rel.dot(lateral);
    let direction = ctx.vel.dot(lateral) * lateral_pos;
    let lateral_width = if direction < 0.0 {
        0.91 * ctx.radius + ONE_WAY_SEMI_SIDE
    } else {
        0.51 * ctx.radius + ONE_WAY_SEMI_SIDE
    };
    let rel_old = ctx.pos_old - pos;
    let normal_dist_old = rel_old.dot(normal);
    let admitted = normal_dist > 0.0
        && normal_dist <= ctx.radius
        && normal_proj <= 0.0
        && ctx.radius - normal_dist_old <= 1.1
        && lateral_pos.abs() < lateral_width;
    if !admitted {
        return None;
    }
    Some((normal, ctx.radius - normal_dist))
}

/// Whether the horizontal half-cell edge grid carries a solid edge anywhere
/// across half-cell x-range `[half_x1, half_x2]` at half-cell row `half_y +
/// (1 if dir==1 else 0)`. All three coordinates are already half-cell units
/// (`world position / 12`), matching the reference engine's `is_empty_row`
/// inverted: that function takes the same pre-converted half-cell indices.
fn row_blocked(world: &World, half_x1: i32, half_x2: i32, half_y: i32, dir: i32) -> bool {
    let hy = if dir == 1 { half_y + 1 } else { half_y };
    let (lo, hi) = (half_x1.min(half_x2), half_x1.max(half_x2));
    for hx in lo..=hi {
        let (cx, cy) = crate::math::clamp_half_cell(hx, hy);
        if !world.is_empty_half_row(cx, cy) {
            return true;
        }
    }
    false
}

/// Mirrors `row_blocked` for the vertical half-cell edge grid (the
/// reference engine's `is_empty_column`, inverted).
fn column_blocked(world: &World, half_x: i32, half_y1: i32, half_y2: i32, dir: i32) -> bool {
    let vx = if dir == 1 { half_x + 1 } else { half_x };
    let (lo, hi) = (half_y1.min(half_y2), half_y1.max(half_y2));
    for hy in lo..=hi {
        let (cx, cy) = crate::math::clamp_half_cell(vx, hy);
        if !world.is_empty_half_column(cx, cy) {
            return true;
        }
    }
    false
}

/// Shove thwump movement attempt along its own fixed axis `dir`: `sign`
/// selects launch (-1) vs. retreat (+1) and `speed` the per-frame distance.
/// Returns `None` when the half-cell edge crossed into is solid, leaving the
/// entity in place so the caller can fall back to retreating.
fn shove_move_if_possible(world: &World, pos: Vec2, dir: Vec2, sign: f64, speed: f64) -> Option<Vec2> {
    let is_horizontal = dir.y == 0.0;
    if is_horizontal {
        let step = sign * dir.x.signum() * speed;
        let xpos_new = pos.x + step;
        let cell_x = (pos.x / 12.0).floor() as i32;
        let cell_x_new = (xpos_new / 12.0).floor() as i32;
        if cell_x != cell_x_new {
            let cell_y1 = ((pos.y - 8.0) / 12.0).floor() as i32;
            let cell_y2 = ((pos.y + 8.0) / 12.0).floor() as i32;
            if column_blocked(world, cell_x, cell_y1, cell_y2, step.signum() as i32) {
                return None;
            }
        }
        Some(Vec2::new(xpos_new, pos.y))
    } else {
        let step = sign * dir.y.signum() * speed;
        let ypos_new = pos.y + step;
        let cell_y = (pos.y / 12.0).floor() as i32;
        let cell_y_new = (ypos_new / 12.0).floor() as i32;
        if cell_y != cell_y_new {
            let cell_x1 = ((pos.x - 8.0) / 12.0).floor() as i32;
            let cell_x2 = ((pos.x + 8.0) / 12.0).floor() as i32;
            if row_blocked(world, cell_x1, cell_x2, cell_y, step.signum() as i32) {
                return None;
            }
        }
        Some(Vec2::new(pos.x, ypos_new))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(pos: Vec2, vel: Vec2, state: u8) -> NinjaContext {
        NinjaContext {
            pos,
            pos_old: pos,
            vel,
            radius: 10.0,
            state,
            frame: 1,
        }
    }

    fn empty_world() -> World {
        World::from_playable_tiles(&vec![0u8; 42 * 23]).unwrap()
    }

    #[test]
    fn gold_is_collected_once() {
        let mut gold = Entity {
            entity_type: 2,
            pos: Vec2::new(100.0, 100.0),
            active: true,
            cell: (4, 4),
            kind: EntityKind::Gold { collected: false },
        };
        let c = ctx(Vec2::new(100.0, 100.0), Vec2::ZERO, 0);
        let mut world = empty_world();
        gold.logical_collision(&c, 0, &mut world);
        assert!(!gold.active);
        if let EntityKind::Gold { collected } = gold.kind {
            assert!(collected);
        }
    }

    #[test]
    fn gold_is_not_collected_while_ninja_celebrating() {
        let mut gold = Entity {
            entity_type: 2,
            pos: Vec2::new(100.0, 100.0),
            active: true,
            cell: (4, 4),
            kind: EntityKind::Gold { collected: false },
        };
        let c = ctx(Vec2::new(100.0, 100.0), Vec2::ZERO, 8);
        let mut world = empty_world();
        gold.logical_collision(&c, 0, &mut world);
        assert!(gold.active);
    }

    #[test]
    fn exit_switch_activates_exit_once() {
        let mut switch = Entity {
            entity_type: 4,
            pos: Vec2::new(50.0, 50.0),
            active: true,
            cell: (2, 2),
            kind: EntityKind::ExitSwitch {
                exit_index: 3,
                collected: false,
            },
        };
        let c = ctx(Vec2::new(50.0, 50.0), Vec2::ZERO, 0);
        let mut world = empty_world();
        let effect = switch.logical_collision(&c, 1, &mut world);
        assert!(matches!(effect, LogicalEffect::ActivateExit(3)));
        assert!(!switch.active);
    }

    #[test]
    fn toggle_mine_kills_only_while_armed() {
        let mut mine = Entity {
            entity_type: 1,
            pos: Vec2::new(0.0, 0.0),
            active: true,
            cell: (0, 0),
            kind: EntityKind::ToggleMine { state: 1 },
        };
        let c = ctx(Vec2::new(0.0, 0.0), Vec2::ZERO, 0);
        let mut world = empty_world();
        assert!(matches!(
            mine.logical_collision(&c, 0, &mut world),
            LogicalEffect::None
        ));
        mine = Entity {
            kind: EntityKind::ToggleMine { state: 0 },
            ..mine
        };
        assert!(matches!(
            mine.logical_collision(&c, 0, &mut world),
            LogicalEffect::Kill
        ));
    }

    #[test]
    fn boost_pad_only_fires_on_contact_edge() {
        let mut pad = Entity {
            entity_type: 24,
            pos: Vec2::new(0.0, 0.0),
            active: true,
            cell: (0, 0),
            kind: EntityKind::BoostPad { touching: false },
        };
        let c = ctx(Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), 0);
        let mut world = empty_world();
        let first = pad.logical_collision(&c, 0, &mut world);
        assert!(matches!(first, LogicalEffect::BoostVelocity(_)));
        let second = pad.logical_collision(&c, 0, &mut world);
        assert!(matches!(second, LogicalEffect::None));
    }
}
