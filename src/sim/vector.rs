//! 2D vector kernel
//!
//! Named operations over `glam::Vec2` used by the collision code, plus the
//! segment distance queries the rail test needs. Everything takes operands
//! by value and returns a fresh value; the only mutating helper is
//! [`normalize_in_place`].

use glam::Vec2;

#[inline]
pub fn subtract(u: Vec2, v: Vec2) -> Vec2 {
    u - v
}

#[inline]
pub fn add(u: Vec2, v: Vec2) -> Vec2 {
    u + v
}

#[inline]
pub fn dot(u: Vec2, v: Vec2) -> f32 {
    u.dot(v)
}

#[inline]
pub fn scale(v: Vec2, a: f32) -> Vec2 {
    v * a
}

/// Divide by the Euclidean magnitude.
///
/// A zero vector yields NaN components; callers must guard.
#[inline]
pub fn normalize(v: Vec2) -> Vec2 {
    v.normalize()
}

/// In-place variant of [`normalize`]
#[inline]
pub fn normalize_in_place(v: &mut Vec2) {
    *v = normalize(*v);
}

/// Projection of `u` onto `v`: (u·v / v·v) v
///
/// A zero `v` yields NaN components; callers must guard.
#[inline]
pub fn project_onto(u: Vec2, v: Vec2) -> Vec2 {
    u.project_onto(v)
}

/// Reflect `u` about the line with normal `n`: u - 2(u·n̂)n̂
///
/// `n` does not need to be unit length.
#[inline]
pub fn reflect(u: Vec2, n: Vec2) -> Vec2 {
    u.reflect(normalize(n))
}

#[inline]
pub fn distance_squared(a: Vec2, b: Vec2) -> f32 {
    a.distance_squared(b)
}

/// Perpendicular-left rotation (-y, x)
#[inline]
pub fn perp_left(v: Vec2) -> Vec2 {
    v.perp()
}

/// Squared distance from `p` to the segment `a`-`b`
pub fn point_segment_distance_squared(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = subtract(b, a);
    let len_sq = dot(ab, ab);
    if len_sq == 0.0 {
        return distance_squared(p, a);
    }
    let t = (dot(subtract(p, a), ab) / len_sq).clamp(0.0, 1.0);
    distance_squared(p, add(a, scale(ab, t)))
}

/// Squared distance between segments `p0`-`p1` and `q0`-`q1`; zero when they
/// cross.
pub fn segment_distance_squared(p0: Vec2, p1: Vec2, q0: Vec2, q1: Vec2) -> f32 {
    let p = subtract(p1, p0);
    let q = subtract(q1, q0);
    let crosses = p.perp_dot(subtract(q0, p0)) * p.perp_dot(subtract(q1, p0)) < 0.0
        && q.perp_dot(subtract(p0, q0)) * q.perp_dot(subtract(p1, q0)) < 0.0;
    if crosses {
        return 0.0;
    }
    point_segment_distance_squared(p0, q0, q1)
        .min(point_segment_distance_squared(p1, q0, q1))
        .min(point_segment_distance_squared(q0, p0, p1))
        .min(point_segment_distance_squared(q1, p0, p1))
}
