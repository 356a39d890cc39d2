//! Collidable geometry primitives anchored to tile cells: straight segments
//! (tile edges, diagonal slopes, door slabs) and quarter-arc segments
//! (quarter-moons and quarter-pipes).

use crate::math::{
    time_of_intersection_circle_vs_arc, time_of_intersection_circle_vs_circle,
    time_of_intersection_circle_vs_lineseg,
};
use crate::types::Vec2;

/// Result of a closest-point query: whether the queried position is on the
/// segment's back (inward) side, and the closest point itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestPoint {
    pub is_back_facing: bool,
    pub point: Vec2,
}

/// A straight collidable edge between two points.
///
/// `oriented` segments (ordinary tile edges) only resist penetration from
/// their outward side — the left-hand normal of `p2 - p1`. Unoriented
/// segments (door slabs) resist from either side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearSegment {
    pub p1: Vec2,
    pub p2: Vec2,
    pub oriented: bool,
    pub active: bool,
}

impl LinearSegment {
    pub fn new(p1: Vec2, p2: Vec2, oriented: bool) -> Self {
        Self {
            p1,
            p2,
            oriented,
            active: true,
        }
    }

    pub fn closest_point(&self, pos: Vec2) -> ClosestPoint {
        let p = self.p2 - self.p1;
        let d = pos - self.p1;
        let seg_len_sq = p.dot(p);
        let mut u = d.dot(p) / seg_len_sq;
        u = u.clamp(0.0, 1.0);
        let point = self.p1 + p * u;
        let is_back_facing = self.oriented && (d.y * p.x - d.x * p.y) < 0.0;
        ClosestPoint {
            is_back_facing,
            point,
        }
    }

    pub fn intersect_ray(&self, pos: Vec2, delta: Vec2, radius: f64) -> f64 {
        let t1 = time_of_intersection_circle_vs_circle(pos, delta, self.p1, radius);
        let t2 = time_of_intersection_circle_vs_circle(pos, delta, self.p2, radius);
        let t3 = time_of_intersection_circle_vs_lineseg(pos, delta, self.p1, self.p2, radius);
        t1.min(t2).min(t3)
    }
}

/// A quarter-circle arc anchored at `center`, occupying the quadrant
/// indicated by `quadrant` (each axis `+1`/`-1`).
///
/// `convex` arcs (quarter-moons) are solid on the side away from the
/// center; concave arcs (quarter-pipes) are solid on the side toward the
/// center (the inside of the pipe).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircularSegment {
    pub center: Vec2,
    pub quadrant: (f64, f64),
    pub convex: bool,
    pub radius: f64,
    pub active: bool,
}

impl CircularSegment {
    pub fn new(center: Vec2, quadrant: (f64, f64), convex: bool) -> Self {
        Self::with_radius(center, quadrant, convex, 24.0)
    }

    pub fn with_radius(center: Vec2, quadrant: (f64, f64), convex: bool, radius: f64) -> Self {
        Self {
            center,
            quadrant,
            convex,
            radius,
            active: true,
        }
    }

    /// The two extremities of the arc, where it meets the cell's axis-aligned edges.
    fn endpoint_hor(&self) -> Vec2 {
        Vec2::new(self.center.x + self.radius * self.quadrant.0, self.center.y)
    }

    fn endpoint_ver(&self) -> Vec2 {
        Vec2::new(self.center.x, self.center.y + self.radius * self.quadrant.1)
    }

    pub fn closest_point(&self, pos: Vec2) -> ClosestPoint {
        let d = pos - self.center;
        if d.x * self.quadrant.0 > 0.0 && d.y * self.quadrant.1 > 0.0 {
            let dist = d.length();
            let point = self.center + d * (self.radius / dist);
            let is_back_facing = if self.convex {
                dist < self.radius
            } else {
                dist > self.radius
            };
            ClosestPoint { is_back_facing, point }
        } else {
            let point = if d.x * self.quadrant.0 > d.y * self.quadrant.1 {
                self.endpoint_hor()
            } else {
                self.endpoint_ver()
            };
            ClosestPoint {
                is_back_facing: false,
                point,
            }
        }
    }

    pub fn intersect_ray(&self, pos: Vec2, delta: Vec2, radius: f64) -> f64 {
        let t1 = time_of_intersection_circle_vs_circle(pos, delta, self.endpoint_hor(), radius);
        let t2 = time_of_intersection_circle_vs_circle(pos, delta, self.endpoint_ver(), radius);
        let t3 = time_of_intersection_circle_vs_arc(
            pos,
            delta,
            self.center,
            self.quadrant,
            self.radius,
            radius,
        );
        t1.min(t2).min(t3)
    }
}

/// Either flavor of collidable segment, as stored in the segment index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Linear(LinearSegment),
    Circular(CircularSegment),
}

impl Segment {
    pub fn active(&self) -> bool {
        match self {
            Segment::Linear(s) => s.active,
            Segment::Circular(s) => s.active,
        }
    }

    pub fn set_active(&mut self, active: bool) {
        match self {
            Segment::Linear(s) => s.active = active,
            Segment::Circular(s) => s.active = active,
        }
    }

    pub fn closest_point(&self, pos: Vec2) -> ClosestPoint {
        match self {
            Segment::Linear(s) => s.closest_point(pos),
            Segment::Circular(s) => s.closest_point(pos),
        }
    }

    pub fn intersect_ray(&self, pos: Vec2, delta: Vec2, radius: f64) -> f64 {
        match self {
            Segment::Linear(s) => s.intersect_ray(pos, delta, radius),
            Segment::Circular(s) => s.intersect_ray(pos, delta, radius),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_segment_midpoint_is_closest_for_perpendicular_query() {
        let seg = LinearSegment::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), true);
        let cp = seg.closest_point(Vec2::new(5.0, 3.0));
        assert_eq!(cp.point, Vec2::new(5.0, 0.0));
    }

    #[test]
    fn linear_segment_back_facing_depends_on_orientation() {
        let oriented = LinearSegment::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), true);
        let unoriented = LinearSegment::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), false);
        // Above the segment: normal of (p2-p1)=(1,0) rotated CCW is (0,-1), so "above" (-y) is the front.
        let above = Vec2::new(5.0, -3.0);
        assert!(!oriented.closest_point(above).is_back_facing);
        assert!(!unoriented.closest_point(above).is_back_facing);
        let below = Vec2::new(5.0, 3.0);
        assert!(oriented.closest_point(below).is_back_facing);
        assert!(!unoriented.closest_point(below).is_back_facing);
    }

    #[test]
    fn circular_segment_closest_point_within_quadrant_lies_on_arc() {
        let seg = CircularSegment::new(Vec2::new(0.0, 0.0), (1.0, 1.0), true);
        let cp = seg.closest_point(Vec2::new(10.0, 10.0));
        assert!((cp.point.length() - seg.radius).abs() < 1e-9);
    }

    #[test]
    fn circular_segment_outside_quadrant_snaps_to_nearest_endpoint() {
        let seg = CircularSegment::new(Vec2::new(0.0, 0.0), (1.0, 1.0), true);
        let cp = seg.closest_point(Vec2::new(-10.0, 1.0));
        assert_eq!(cp.point, seg.endpoint_ver());
    }
}
