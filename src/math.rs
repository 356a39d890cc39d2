//! Standalone collision math: sweeps, penetration and orientation helpers.
//!
//! These are pure functions of their numeric arguments so they can be unit
//! tested in isolation from the grid/entity/ninja machinery that calls them.

use crate::types::Vec2;

/// Time (as a fraction of the frame, `[0,1]`) at which a circle moving from
/// `pos` by `delta` first touches a stationary circle at `center` with
/// combined radius `radius`. Returns `0.0` if already overlapping, `1.0` if
/// no contact occurs within the frame.
pub fn time_of_intersection_circle_vs_circle(
    pos: Vec2,
    delta: Vec2,
    center: Vec2,
    radius: f64,
) -> f64 {
    let d = pos - center;
    let dist_sq = d.dot(d);
    let vel_sq = delta.dot(delta);
    let dot_prod = d.dot(delta);
    if dist_sq - radius * radius > 0.0 {
        let radicand = dot_prod * dot_prod - vel_sq * (dist_sq - radius * radius);
        if vel_sq > 0.0001 && dot_prod < 0.0 && radicand >= 0.0 {
            return (-dot_prod - radicand.sqrt()) / vel_sq;
        }
        1.0
    } else {
        0.0
    }
}

/// Time of intersection of a swept circle against a stationary line segment
/// `[a, b]`, using the perpendicular-projection (slab) method.
pub fn time_of_intersection_circle_vs_lineseg(
    pos: Vec2,
    delta: Vec2,
    a: Vec2,
    b: Vec2,
    radius: f64,
) -> f64 {
    let w = b - a;
    let seg_len = w.length();
    let n = w / seg_len;
    let rel = pos - a;
    let normal_proj = rel.x * n.y - rel.y * n.x;
    let hor_proj = rel.x * n.x + rel.y * n.y;
    if normal_proj.abs() >= radius {
        let dir = delta.x * n.y - delta.y * n.x;
        if dir * normal_proj < 0.0 {
            let t = ((normal_proj.abs() - radius) / dir.abs()).min(1.0);
            let hor_proj2 = hor_proj + t * (delta.x * n.x + delta.y * n.y);
            if (0.0..=seg_len).contains(&hor_proj2) {
                return t;
            }
        }
    } else if (0.0..=seg_len).contains(&hor_proj) {
        return 0.0;
    }
    1.0
}

/// Time of intersection of a swept circle (radius `radius_circle`) against a
/// stationary quarter-arc of radius `radius_arc` centered at `center`, gated
/// to the quadrant given by `quadrant` (each component `+1`/`-1`). Assumes
/// `radius_circle < radius_arc`.
pub fn time_of_intersection_circle_vs_arc(
    pos: Vec2,
    delta: Vec2,
    center: Vec2,
    quadrant: (f64, f64),
    radius_arc: f64,
    radius_circle: f64,
) -> f64 {
    let d = pos - center;
    let dist_sq = d.dot(d);
    let vel_sq = delta.dot(delta);
    let dot_prod = d.dot(delta);
    let r1 = radius_arc + radius_circle;
    let r2 = radius_arc - radius_circle;
    let mut t = 1.0;
    if dist_sq > r1 * r1 {
        let radicand = dot_prod * dot_prod - vel_sq * (dist_sq - r1 * r1);
        if vel_sq > 0.0001 && dot_prod < 0.0 && radicand >= 0.0 {
            t = (-dot_prod - radicand.sqrt()) / vel_sq;
        }
    } else if dist_sq < r2 * r2 {
        let radicand = dot_prod * dot_prod - vel_sq * (dist_sq - r2 * r2);
        if vel_sq > 0.0001 {
            t = ((-dot_prod + radicand.sqrt()) / vel_sq).min(1.0);
        }
    } else {
        t = 0.0;
    }
    let hit = pos + delta * t - center;
    if hit.x * quadrant.0 > 0.0 && hit.y * quadrant.1 > 0.0 {
        t
    } else {
        1.0
    }
}

/// True if two circles (given by center and radius) currently overlap.
pub fn overlap_circle_vs_circle(a: Vec2, radius_a: f64, b: Vec2, radius_b: f64) -> bool {
    a.distance(b) < radius_a + radius_b
}

/// Shortest depenetration of a point out of an axis-aligned square, given the
/// square's center and half side length. Returns `None` if the point is
/// outside the square. Ties between the two axes resolve in favor of the
/// y-axis (`peny <= penx` picks the y-axis normal).
///
/// Returns `(normal, (pen_minor, pen_major))`.
pub fn penetration_square_vs_point(
    square_center: Vec2,
    point: Vec2,
    semi_side: f64,
) -> Option<(Vec2, (f64, f64))> {
    let d = point - square_center;
    let pen_x = semi_side - d.x.abs();
    let pen_y = semi_side - d.y.abs();
    if pen_x > 0.0 && pen_y > 0.0 {
        if pen_y <= pen_x {
            let normal = if d.y < 0.0 { Vec2::new(0.0, -1.0) } else { Vec2::new(0.0, 1.0) };
            Some((normal, (pen_y, pen_x)))
        } else {
            let normal = if d.x < 0.0 { Vec2::new(-1.0, 0.0) } else { Vec2::new(1.0, 0.0) };
            Some((normal, (pen_x, pen_y)))
        }
    } else {
        None
    }
}

/// Unit vector for a map entity's `orientation` byte (`0..8`), the eight
/// compass directions starting at +x and proceeding clockwise in screen
/// space (+y down).
pub fn orientation_to_vector(orientation: u8) -> Vec2 {
    let diag = std::f64::consts::FRAC_1_SQRT_2;
    match orientation % 8 {
        0 => Vec2::new(1.0, 0.0),
        1 => Vec2::new(diag, diag),
        2 => Vec2::new(0.0, 1.0),
        3 => Vec2::new(-diag, diag),
        4 => Vec2::new(-1.0, 0.0),
        5 => Vec2::new(-diag, -diag),
        6 => Vec2::new(0.0, -1.0),
        7 => Vec2::new(diag, -diag),
        _ => unreachable!("orientation % 8 is always in 0..8"),
    }
}

/// Clamp a tile cell coordinate into the nominal `[0,43] x [0,24]` grid.
pub fn clamp_cell(x: i32, y: i32) -> (usize, usize) {
    (x.clamp(0, 43) as usize, y.clamp(0, 24) as usize)
}

/// Clamp a half-cell edge coordinate into the `[0,88] x [0,50]` grid.
pub fn clamp_half_cell(x: i32, y: i32) -> (usize, usize) {
    (x.clamp(0, 88) as usize, y.clamp(0, 50) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_vs_circle_already_overlapping_returns_zero() {
        let t = time_of_intersection_circle_vs_circle(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 0.0),
            5.0,
        );
        assert_eq!(t, 0.0);
    }

    #[test]
    fn circle_vs_circle_head_on_approach() {
        let t = time_of_intersection_circle_vs_circle(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 0.0),
            2.0,
        );
        assert!(t > 0.0 && t < 1.0);
    }

    #[test]
    fn circle_vs_circle_no_approach_returns_one() {
        let t = time_of_intersection_circle_vs_circle(
            Vec2::new(0.0, 0.0),
            Vec2::new(-10.0, 0.0),
            Vec2::new(10.0, 0.0),
            2.0,
        );
        assert_eq!(t, 1.0);
    }

    #[test]
    fn penetration_square_vs_point_ties_favor_y_axis() {
        // Equidistant from both edges: penx == peny.
        let (normal, _) = penetration_square_vs_point(
            Vec2::new(0.0, 0.0),
            Vec2::new(3.0, 3.0),
            5.0,
        )
        .unwrap();
        assert_eq!(normal, Vec2::new(0.0, 1.0));
    }

    #[test]
    fn penetration_square_vs_point_outside_is_none() {
        assert!(penetration_square_vs_point(Vec2::ZERO, Vec2::new(20.0, 20.0), 5.0).is_none());
    }

    #[test]
    fn orientation_vectors_are_unit_length() {
        for o in 0..8 {
            let v = orientation_to_vector(o);
            assert!((v.length() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn clamp_cell_clamps_out_of_range_coords() {
        assert_eq!(clamp_cell(-5, 100), (0, 24));
        assert_eq!(clamp_cell(50, -1), (43, 0));
    }
}
