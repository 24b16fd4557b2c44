//! Collision detection and response
//!
//! Ball-ball collisions are detected after the fact (the balls already
//! overlap), so each pair is first rewound along its velocities to roughly
//! the moment of contact and then given an exact equal-mass elastic
//! exchange. Rails are tested per edge with an angular envelope plus a short
//! lookahead along the velocity; pocket mouths sink the ball instead of
//! reflecting it.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec2;

use super::state::{Ball, SimEvent};
use super::table::{EdgeKind, TableBoundary};
use super::vector::{
    distance_squared, dot, normalize, project_onto, reflect, scale, segment_distance_squared, subtract,
};
use crate::consts::{RAIL_TOLERANCE_INTERCEPT, RAIL_TOLERANCE_SLOPE};
use crate::settings::PhysicsSettings;

/// Mutable access to two distinct balls.
///
/// Panics if `i == j`: resolving a ball against itself is an invariant
/// violation, not a runtime condition.
pub fn pair_mut(balls: &mut [Ball], i: usize, j: usize) -> (&mut Ball, &mut Ball) {
    if i == j {
        log::error!("ball-ball resolver invoked on ball {} against itself", i);
        panic!("ball-ball resolver invoked on ball {} against itself", i);
    }
    if i < j {
        let (lo, hi) = balls.split_at_mut(j);
        (&mut lo[i], &mut hi[0])
    } else {
        let (lo, hi) = balls.split_at_mut(i);
        (&mut hi[0], &mut lo[j])
    }
}

/// Centres within two radii (squared threshold, inclusive)
#[inline]
pub fn balls_overlap(a: &Ball, b: &Ball, threshold_sq: f32) -> bool {
    a.in_play() && b.in_play() && distance_squared(a.pos, b.pos) <= threshold_sq
}

/// Every unordered overlapping pair of balls still in play
pub fn find_overlapping_pairs(balls: &[Ball], threshold_sq: f32) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for i in 0..balls.len() {
        for j in (i + 1)..balls.len() {
            if balls_overlap(&balls[i], &balls[j], threshold_sq) {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

#[inline]
fn pair_key(i: usize, j: usize) -> (usize, usize) {
    if i < j { (i, j) } else { (j, i) }
}

/// Rewind an overlapping pair back along their velocities to (slightly
/// before) first contact, then chase any pair the rewind pushed into
/// overlap, up to `rewind_max_depth` levels.
///
/// No single rewind reaches back further than `dt`, the tick that produced
/// the overlap. Returns false if the pair cannot be separated by rewinding
/// (they are not closing on each other).
pub fn rewind_to_impact(balls: &mut [Ball], i: usize, j: usize, dt: f32, settings: &PhysicsSettings) -> bool {
    let mut path = Vec::with_capacity(settings.rewind_max_depth as usize + 1);
    rewind_pair(balls, i, j, dt, settings, 0, &mut path)
}

fn rewind_pair(
    balls: &mut [Ball],
    i: usize,
    j: usize,
    dt: f32,
    settings: &PhysicsSettings,
    depth: u32,
    path: &mut Vec<(usize, usize)>,
) -> bool {
    let threshold = settings.contact_threshold_sq();
    let step = settings.rewind_step;

    let (a, b) = pair_mut(balls, i, j);
    let current = distance_squared(a.pos, b.pos);
    let back_a = subtract(a.pos, scale(a.vel, step));
    let back_b = subtract(b.pos, scale(b.vel, step));
    let stepped = distance_squared(back_a, back_b);

    let extra_steps = if threshold <= 0.0 {
        settings.rewind_fallback_steps
    } else {
        let slope = stepped - current;
        if slope <= 0.0 {
            log::trace!("pair ({}, {}) not closing, skipping rewind", i, j);
            return false;
        }
        // Linear solve for the steps that bring separation² to the threshold
        ((threshold - stepped) / slope).max(0.0)
    };
    // Overshoot backward rather than under-rewind, but never past the
    // start of the tick: a nearly parallel pair has a tiny slope
    let total = (step * (1.0 + 2.0 * extra_steps)).min(dt);
    a.pos = subtract(a.pos, scale(a.vel, total));
    b.pos = subtract(b.pos, scale(b.vel, total));

    log::trace!(
        "rewound ({}, {}) by {:.5}s at depth {}: {:.6} -> {:.6}",
        i,
        j,
        total,
        depth,
        current,
        distance_squared(a.pos, b.pos)
    );

    if depth < settings.rewind_max_depth {
        path.push(pair_key(i, j));
        for moved in [i, j] {
            for k in 0..balls.len() {
                if k == i || k == j || path.contains(&pair_key(moved, k)) {
                    continue;
                }
                if balls_overlap(&balls[moved], &balls[k], threshold) {
                    rewind_pair(balls, moved, k, dt, settings, depth + 1, path);
                }
            }
        }
        path.pop();
    }

    true
}

/// Exact 2D elastic collision for equal masses.
///
/// Each ball keeps its velocity minus its own component along the
/// centre-to-centre axis, plus the other ball's component. Returns false if
/// the centres coincide and there is no axis.
pub fn resolve_elastic(balls: &mut [Ball], i: usize, j: usize) -> bool {
    let (a, b) = pair_mut(balls, i, j);
    let axis = subtract(b.pos, a.pos);
    if dot(axis, axis) == 0.0 {
        log::warn!("balls {} and {} share a centre, no collision axis", i, j);
        return false;
    }

    let va = a.vel;
    let vb = b.vel;
    let va_axis = project_onto(va, axis);
    let vb_axis = project_onto(vb, axis);
    a.vel = va + vb_axis - va_axis;
    b.vel = vb + va_axis - vb_axis;
    true
}

/// Detect and resolve every ball-ball collision after a tick of `dt`
/// seconds. Returns the number of pairs resolved.
pub fn collide_balls(balls: &mut [Ball], dt: f32, settings: &PhysicsSettings) -> usize {
    let threshold = settings.contact_threshold_sq();
    let mut resolved = 0;
    for i in 0..balls.len() {
        for j in (i + 1)..balls.len() {
            if !balls_overlap(&balls[i], &balls[j], threshold) {
                continue;
            }
            if rewind_to_impact(balls, i, j, dt, settings) && resolve_elastic(balls, i, j) {
                log::debug!("ball {} hit ball {}", i, j);
                resolved += 1;
            }
        }
    }
    resolved
}

/// Empirical angular tolerance for an edge of the given length
#[inline]
pub fn rail_tolerance(edge_length: f32) -> f32 {
    RAIL_TOLERANCE_SLOPE * edge_length + RAIL_TOLERANCE_INTERCEPT
}

#[inline]
fn angle_between_unit(u: Vec2, v: Vec2) -> f32 {
    dot(u, v).clamp(-1.0, 1.0).acos()
}

/// Does the ball need a response from edge `k` this tick?
///
/// Requires the ball to be moving toward the edge, and then either:
/// - the ball sits beside the segment (start angle obtuse, end angle acute)
///   and the angle the segment subtends is within the length-scaled
///   tolerance of a straight angle, or
/// - the ball is beside the segment and already within a radius of its
///   line, or
/// - the path to one lookahead step along the velocity passes within a
///   radius of the segment itself. A ball running past the end of a cushion
///   into a pocket mouth does not touch that cushion.
pub fn touches_edge(ball: &Ball, table: &TableBoundary, k: usize, settings: &PhysicsSettings) -> bool {
    let normal = normalize(table.normal(k));
    if dot(ball.vel, normal) >= 0.0 {
        return false;
    }

    let (start, end) = table.edge(k);
    let edge = subtract(end, start);
    let length = edge.length();
    let direction = normalize(edge);

    let to_start = subtract(start, ball.pos);
    let to_end = subtract(end, ball.pos);
    let near = if dot(to_start, to_start) > 0.0 && dot(to_end, to_end) > 0.0 {
        let angle_start = angle_between_unit(direction, normalize(to_start));
        let angle_end = angle_between_unit(direction, normalize(to_end));
        let beside = angle_start > FRAC_PI_2 && angle_end < FRAC_PI_2;
        beside && PI - (angle_start - angle_end) < rail_tolerance(length)
    } else {
        // Centre exactly on a vertex
        true
    };
    if near {
        return true;
    }

    let radius = settings.ball_radius;
    let along = dot(subtract(ball.pos, start), direction);
    let offset = dot(subtract(ball.pos, start), normal);
    if (0.0..=length).contains(&along) && offset < radius {
        return true;
    }
    let ahead = ball.pos + scale(ball.vel, settings.rail_lookahead);
    segment_distance_squared(ball.pos, ahead, start, end) < radius * radius
}

/// Detect and resolve rail and pocket contacts for every ball in play.
/// Sunk balls are reported through `events`.
pub fn collide_rails(
    balls: &mut [Ball],
    table: &TableBoundary,
    settings: &PhysicsSettings,
    events: &mut Vec<SimEvent>,
) -> usize {
    let mut contacts = 0;
    for ball in balls.iter_mut() {
        for k in 0..table.edge_count() {
            if !ball.in_play() {
                break;
            }
            if !touches_edge(ball, table, k, settings) {
                continue;
            }
            contacts += 1;
            match table.kind(k) {
                EdgeKind::Pocket => {
                    log::info!("ball {} ({:?}) sunk through edge {}", ball.id, ball.kind(), k);
                    ball.sink();
                    events.push(SimEvent::BallSunk {
                        id: ball.id,
                        kind: ball.kind(),
                    });
                }
                EdgeKind::Rail => {
                    log::debug!("ball {} off rail {}", ball.id, k);
                    ball.vel = reflect(ball.vel, table.normal(k));
                }
            }
        }
    }
    contacts
}
