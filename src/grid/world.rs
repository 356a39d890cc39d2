//! Builds the collidable segment index and half-cell edge grids from raw
//! tile ids, and provides the broad-phase spatial queries the ninja and
//! entities use every frame.

use crate::constants::{
    CELL_SIZE, GRID_HEIGHT, GRID_WIDTH, HOR_EDGE_HEIGHT, HOR_EDGE_WIDTH, SEGMENT_GRID_HEIGHT,
    SEGMENT_GRID_WIDTH, VER_EDGE_HEIGHT, VER_EDGE_WIDTH,
};
use crate::error::{Result, SimError};
use crate::grid::segment::{CircularSegment, LinearSegment, Segment};
use crate::grid::tile_tables::{grid_edge_map, segment_circular_map, segment_diag_map, segment_ortho_map};
use crate::math::clamp_cell;
use crate::types::Vec2;

fn cell_index(x: usize, y: usize, width: usize) -> usize {
    y * width + x
}

/// Tile geometry plus the two spatial indices built from it: the segment
/// index (used for closest-point depenetration and ray sweeps) and the
/// entity index (used for the 3x3-neighborhood gathers).
///
/// Entities themselves are owned by the caller (the simulator); this index
/// only stores their integer handles per cell.
#[derive(Debug, Clone)]
pub struct World {
    tile_dic: Vec<u8>,
    segment_dic: Vec<Vec<Segment>>,
    entity_dic: Vec<Vec<usize>>,
    hor_edge: Vec<i32>,
    ver_edge: Vec<i32>,
}

impl World {
    /// Builds the world from the 42x23 playable tile byte region (row-major,
    /// `playable[y * 42 + x]`), defaulting every cell outside it to tile id 1
    /// (full solid), realizing the implicit solid border frame.
    pub fn from_playable_tiles(playable: &[u8]) -> Result<Self> {
        if playable.len() != 42 * 23 {
            return Err(SimError::MalformedMap {
                reason: format!(
                    "expected {} playable tile bytes, got {}",
                    42 * 23,
                    playable.len()
                ),
            });
        }

        let mut tile_dic = vec![1u8; GRID_WIDTH * GRID_HEIGHT];
        for py in 0..23 {
            for px in 0..42 {
                let id = playable[py * 42 + px];
                tile_dic[cell_index(px + 1, py + 1, GRID_WIDTH)] = id;
            }
        }
        for (i, &id) in tile_dic.iter().enumerate() {
            if grid_edge_map(id).is_none() {
                let x = i % GRID_WIDTH;
                let y = i / GRID_WIDTH;
                return Err(SimError::UnknownTileId {
                    cell_x: x,
                    cell_y: y,
                    tile_id: id,
                });
            }
        }

        let mut world = World {
            tile_dic,
            segment_dic: vec![Vec::new(); SEGMENT_GRID_WIDTH * SEGMENT_GRID_HEIGHT],
            entity_dic: vec![Vec::new(); GRID_WIDTH * GRID_HEIGHT],
            hor_edge: vec![0; HOR_EDGE_WIDTH * HOR_EDGE_HEIGHT],
            ver_edge: vec![0; VER_EDGE_WIDTH * VER_EDGE_HEIGHT],
        };
        world.seed_border_edges();
        world.accumulate_tile_edges()?;
        world.materialize_segments();
        Ok(world)
    }

    pub fn tile_at(&self, x: usize, y: usize) -> u8 {
        self.tile_dic[cell_index(x, y, GRID_WIDTH)]
    }

    /// Raw signed horizontal half-cell edge accumulator at `(hx, hy)`, `0`
    /// outside the grid. Thwump/shove-thwump line-of-sight and movement
    /// blocking read this directly rather than through the segment index.
    pub fn hor_edge_at(&self, hx: usize, hy: usize) -> i32 {
        if hx < HOR_EDGE_WIDTH && hy < HOR_EDGE_HEIGHT {
            self.hor_edge[cell_index(hx, hy, HOR_EDGE_WIDTH)]
        } else {
            0
        }
    }

    pub fn ver_edge_at(&self, vx: usize, vy: usize) -> i32 {
        if vx < VER_EDGE_WIDTH && vy < VER_EDGE_HEIGHT {
            self.ver_edge[cell_index(vx, vy, VER_EDGE_WIDTH)]
        } else {
            0
        }
    }

    /// True if the half-cell row at `(hx, hy)` carries no solid edge —
    /// passable for a thwump/shove-thwump traveling vertically through it.
    pub fn is_empty_half_row(&self, hx: usize, hy: usize) -> bool {
        self.hor_edge_at(hx, hy) == 0
    }

    /// True if the half-cell column at `(vx, vy)` carries no solid edge —
    /// passable for a thwump/shove-thwump traveling horizontally through it.
    pub fn is_empty_half_column(&self, vx: usize, vy: usize) -> bool {
        self.ver_edge_at(vx, vy) == 0
    }

    /// Adjusts the horizontal half-cell edge accumulator at `(hx, hy)` by
    /// `delta`. Used by door open/close transitions (the door's own edges
    /// were seeded at load time and are toggled in lockstep with its
    /// collidable segment).
    pub fn add_hor_edge(&mut self, hx: usize, hy: usize, delta: i32) {
        if hx < HOR_EDGE_WIDTH && hy < HOR_EDGE_HEIGHT {
            self.hor_edge[cell_index(hx, hy, HOR_EDGE_WIDTH)] += delta;
        }
    }

    /// Adjusts the vertical half-cell edge accumulator at `(vx, vy)`.
    pub fn add_ver_edge(&mut self, vx: usize, vy: usize, delta: i32) {
        if vx < VER_EDGE_WIDTH && vy < VER_EDGE_HEIGHT {
            self.ver_edge[cell_index(vx, vy, VER_EDGE_WIDTH)] += delta;
        }
    }

    /// The outer ring of the half-cell edge grids is always solid: it's the
    /// far side of the implicit border frame, one half-cell beyond any tile
    /// window's own contribution.
    fn seed_border_edges(&mut self) {
        for hx in 0..HOR_EDGE_WIDTH {
            self.hor_edge[cell_index(hx, 0, HOR_EDGE_WIDTH)] = 1;
            self.hor_edge[cell_index(hx, HOR_EDGE_HEIGHT - 1, HOR_EDGE_WIDTH)] = -1;
        }
        for vy in 0..VER_EDGE_HEIGHT {
            self.ver_edge[cell_index(0, vy, VER_EDGE_WIDTH)] = 1;
            self.ver_edge[cell_index(VER_EDGE_WIDTH - 1, vy, VER_EDGE_WIDTH)] = -1;
        }
    }

    /// Each tile contributes to a 2-wide x 3-tall window of horizontal
    /// half-edges and a 3-wide x 2-tall window of vertical half-edges,
    /// anchored at `(2x, 2y)`. Contributions are summed signed, so a shared
    /// edge between two solid tiles cancels to zero (no interior segment).
    fn accumulate_tile_edges(&mut self) -> Result<()> {
        for y in 0..GRID_HEIGHT {
            for x in 0..GRID_WIDTH {
                let id = self.tile_at(x, y);
                let ortho = segment_ortho_map(id).ok_or_else(|| SimError::InvariantViolation {
                    detail: format!("tile {id} has no ortho segment entry"),
                })?;
                let (hor, ver) = ortho.split_at(6);
                for (i, &sign) in hor.iter().enumerate() {
                    if sign == 0 {
                        continue;
                    }
                    let col = i % 2;
                    let row = i / 2;
                    let hx = 2 * x + col;
                    let hy = 2 * y + row;
                    if hx < HOR_EDGE_WIDTH && hy < HOR_EDGE_HEIGHT {
                        self.hor_edge[cell_index(hx, hy, HOR_EDGE_WIDTH)] += sign as i32;
                    }
                }
                for (i, &sign) in ver.iter().enumerate() {
                    if sign == 0 {
                        continue;
                    }
                    let col = i % 3;
                    let row = i / 3;
                    let vx = 2 * x + col;
                    let vy = 2 * y + row;
                    if vx < VER_EDGE_WIDTH && vy < VER_EDGE_HEIGHT {
                        self.ver_edge[cell_index(vx, vy, VER_EDGE_WIDTH)] += sign as i32;
                    }
                }
            }
        }
        Ok(())
    }

    /// Cell that owns a horizontal accumulator slot at half-cell `(hx, hy)`
    /// with sign `s`: `(floor(hx/2), floor((hy - 0.1*s)/2))`. The `0.1`
    /// nudge breaks the tie when `hy` sits exactly on a cell boundary,
    /// assigning the segment to the cell the solid geometry actually faces.
    fn hor_owner_cell(hx: usize, hy: usize, sign: i32) -> (usize, usize) {
        let bias = 0.1 * sign as f64;
        let cx = (hx as f64 / 2.0).floor() as isize;
        let cy = ((hy as f64 - bias) / 2.0).floor() as isize;
        (cx.max(0) as usize, cy.max(0) as usize)
    }

    fn ver_owner_cell(vx: usize, vy: usize, sign: i32) -> (usize, usize) {
        let bias = 0.1 * sign as f64;
        let cx = ((vx as f64 - bias) / 2.0).floor() as isize;
        let cy = (vy as f64 / 2.0).floor() as isize;
        (cx.max(0) as usize, cy.max(0) as usize)
    }

    /// Turns the signed half-cell accumulators plus the per-tile
    /// diagonal/circular tables into the final list of segments, bucketed
    /// by the cell each segment belongs to.
    fn materialize_segments(&mut self) {
        for hy in 0..HOR_EDGE_HEIGHT {
            for hx in 0..HOR_EDGE_WIDTH {
                let sign = self.hor_edge[cell_index(hx, hy, HOR_EDGE_WIDTH)];
                if sign == 0 {
                    continue;
                }
                let world_x0 = hx as f64 * (CELL_SIZE / 2.0);
                let world_x1 = world_x0 + CELL_SIZE / 2.0;
                let world_y = hy as f64 * (CELL_SIZE / 2.0);
                let (mut p1, mut p2) = (
                    Vec2::new(world_x0, world_y),
                    Vec2::new(world_x1, world_y),
                );
                if sign < 0 {
                    std::mem::swap(&mut p1, &mut p2);
                }
                let (cx, cy) = Self::hor_owner_cell(hx, hy, sign);
                self.push_segment(cx, cy, Segment::Linear(LinearSegment::new(p1, p2, true)));
            }
        }
        for vy in 0..VER_EDGE_HEIGHT {
            for vx in 0..VER_EDGE_WIDTH {
                let sign = self.ver_edge[cell_index(vx, vy, VER_EDGE_WIDTH)];
                if sign == 0 {
                    continue;
                }
                let world_x = vx as f64 * (CELL_SIZE / 2.0);
                let world_y0 = vy as f64 * (CELL_SIZE / 2.0);
                let world_y1 = world_y0 + CELL_SIZE / 2.0;
                let (mut p1, mut p2) = (
                    Vec2::new(world_x, world_y0),
                    Vec2::new(world_x, world_y1),
                );
                if sign > 0 {
                    std::mem::swap(&mut p1, &mut p2);
                }
                let (cx, cy) = Self::ver_owner_cell(vx, vy, sign);
                self.push_segment(cx, cy, Segment::Linear(LinearSegment::new(p1, p2, true)));
            }
        }
        for y in 0..GRID_HEIGHT {
            for x in 0..GRID_WIDTH {
                let id = self.tile_at(x, y);
                let top_left = Vec2::new(x as f64 * CELL_SIZE, y as f64 * CELL_SIZE);
                if let Some((off1, off2)) = segment_diag_map(id) {
                    self.push_segment(
                        x,
                        y,
                        Segment::Linear(LinearSegment::new(top_left + off1, top_left + off2, true)),
                    );
                }
                if let Some((center_off, quadrant, convex)) = segment_circular_map(id) {
                    self.push_segment(
                        x,
                        y,
                        Segment::Circular(CircularSegment::new(top_left + center_off, quadrant, convex)),
                    );
                }
            }
        }
    }

    fn push_segment(&mut self, x: usize, y: usize, seg: Segment) {
        let x = x.min(SEGMENT_GRID_WIDTH - 1);
        let y = y.min(SEGMENT_GRID_HEIGHT - 1);
        self.segment_dic[cell_index(x, y, SEGMENT_GRID_WIDTH)].push(seg);
    }

    /// Adds a door's own collidable slab into the segment index at load
    /// time. Door segments are unoriented: they resist penetration from
    /// either side.
    pub fn insert_door_segment(&mut self, cell: (usize, usize), p1: Vec2, p2: Vec2) {
        let (x, y) = (
            cell.0.min(SEGMENT_GRID_WIDTH - 1),
            cell.1.min(SEGMENT_GRID_HEIGHT - 1),
        );
        self.segment_dic[cell_index(x, y, SEGMENT_GRID_WIDTH)]
            .push(Segment::Linear(LinearSegment::new(p1, p2, false)));
    }

    /// Toggles every segment a door previously inserted at `cell` active or
    /// inactive in place, without removing it from the index (closing and
    /// reopening a door must reuse the exact same segment object so
    /// determinism doesn't depend on vector reinsertion order).
    pub fn set_door_segment_active(&mut self, cell: (usize, usize), p1: Vec2, active: bool) {
        let (x, y) = (
            cell.0.min(SEGMENT_GRID_WIDTH - 1),
            cell.1.min(SEGMENT_GRID_HEIGHT - 1),
        );
        for seg in &mut self.segment_dic[cell_index(x, y, SEGMENT_GRID_WIDTH)] {
            if let Segment::Linear(l) = seg {
                if l.p1 == p1 {
                    l.active = active;
                }
            }
        }
    }

    pub fn add_entity(&mut self, cell: (usize, usize), entity_index: usize) {
        let (x, y) = (cell.0.min(GRID_WIDTH - 1), cell.1.min(GRID_HEIGHT - 1));
        self.entity_dic[cell_index(x, y, GRID_WIDTH)].push(entity_index);
    }

    pub fn remove_entity(&mut self, cell: (usize, usize), entity_index: usize) {
        let (x, y) = (cell.0.min(GRID_WIDTH - 1), cell.1.min(GRID_HEIGHT - 1));
        let bucket = &mut self.entity_dic[cell_index(x, y, GRID_WIDTH)];
        if let Some(pos) = bucket.iter().position(|&i| i == entity_index) {
            bucket.swap_remove(pos);
        }
    }

    /// All active segments whose cell falls in the inclusive rectangle
    /// between the two given corner positions.
    pub fn gather_segments(&self, p1: Vec2, p2: Vec2) -> Vec<Segment> {
        let (x1, y1) = clamp_cell(((p1.x) / CELL_SIZE) as i32, ((p1.y) / CELL_SIZE) as i32);
        let (x2, y2) = clamp_cell(((p2.x) / CELL_SIZE) as i32, ((p2.y) / CELL_SIZE) as i32);
        let (xlo, xhi) = (x1.min(x2), x1.max(x2));
        let (ylo, yhi) = (y1.min(y2), y1.max(y2));
        let mut out = Vec::new();
        for y in ylo..=yhi.min(SEGMENT_GRID_HEIGHT - 1) {
            for x in xlo..=xhi.min(SEGMENT_GRID_WIDTH - 1) {
                out.extend(
                    self.segment_dic[cell_index(x, y, SEGMENT_GRID_WIDTH)]
                        .iter()
                        .filter(|s| s.active())
                        .copied(),
                );
            }
        }
        out
    }

    /// All active entity handles in the 3x3 cell neighborhood of `pos`,
    /// clamped so edge/corner cells only search their in-bounds neighbors.
    pub fn gather_entities(&self, pos: Vec2) -> Vec<usize> {
        let (cx, cy) = clamp_cell((pos.x / CELL_SIZE) as i32, (pos.y / CELL_SIZE) as i32);
        let x_lo = cx.saturating_sub(1);
        let x_hi = (cx + 1).min(GRID_WIDTH - 1);
        let y_lo = cy.saturating_sub(1);
        let y_hi = (cy + 1).min(GRID_HEIGHT - 1);
        let mut out = Vec::new();
        for y in y_lo..=y_hi {
            for x in x_lo..=x_hi {
                out.extend(self.entity_dic[cell_index(x, y, GRID_WIDTH)].iter().copied());
            }
        }
        out
    }

    /// First fraction `t` of the frame's displacement at which a circle of
    /// `radius` moving from `pos` by `delta` meets any gathered segment,
    /// `1.0` if no contact occurs within the frame.
    pub fn sweep_circle_vs_tiles(&self, pos: Vec2, delta: Vec2, radius: f64) -> f64 {
        let target = pos + delta;
        let segs = self.gather_segments(pos, target);
        let mut t_min = 1.0f64;
        for seg in &segs {
            if !seg.active() {
                continue;
            }
            let t = seg.intersect_ray(pos, delta, radius);
            if t < t_min {
                t_min = t;
            }
        }
        t_min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_playable() -> Vec<u8> {
        vec![0u8; 42 * 23]
    }

    #[test]
    fn empty_map_has_border_frame_solid() {
        let world = World::from_playable_tiles(&empty_playable()).unwrap();
        assert_eq!(world.tile_at(0, 0), 1);
        assert_eq!(world.tile_at(43, 24), 1);
        assert_eq!(world.tile_at(1, 1), 0);
    }

    #[test]
    fn unknown_tile_id_is_rejected() {
        let mut tiles = empty_playable();
        tiles[0] = 200;
        let err = World::from_playable_tiles(&tiles).unwrap_err();
        assert!(matches!(err, SimError::UnknownTileId { .. }));
    }

    #[test]
    fn wrong_length_buffer_is_malformed() {
        let err = World::from_playable_tiles(&[0u8; 10]).unwrap_err();
        assert!(matches!(err, SimError::MalformedMap { .. }));
    }

    #[test]
    fn gather_segments_near_border_is_nonempty() {
        let world = World::from_playable_tiles(&empty_playable()).unwrap();
        let segs = world.gather_segments(Vec2::new(0.0, 0.0), Vec2::new(24.0, 24.0));
        assert!(!segs.is_empty());
    }

    #[test]
    fn gather_entities_neighborhood_is_clamped_at_corner() {
        let mut world = World::from_playable_tiles(&empty_playable()).unwrap();
        world.add_entity((0, 0), 7);
        let found = world.gather_entities(Vec2::new(0.0, 0.0));
        assert_eq!(found, vec![7]);
    }

    #[test]
    fn remove_entity_drops_it_from_its_cell() {
        let mut world = World::from_playable_tiles(&empty_playable()).unwrap();
        world.add_entity((5, 5), 3);
        world.remove_entity((5, 5), 3);
        let found = world.gather_entities(Vec2::new(5.0 * CELL_SIZE, 5.0 * CELL_SIZE));
        assert!(!found.contains(&3));
    }
}
