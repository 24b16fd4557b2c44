//! Explicit Euler integration with proportional felt friction
//!
//! position += velocity * dt
//! velocity += velocity * (friction * dt)
//!
//! Components that drop below the rest epsilon snap to exactly zero so the
//! table reaches a true rest state instead of creeping forever.

use glam::Vec2;

use super::state::Ball;
use crate::settings::PhysicsSettings;

/// Snap tiny velocity components to zero
#[inline]
pub fn snap_velocity(vel: Vec2, epsilon: f32) -> Vec2 {
    Vec2::new(
        if vel.x.abs() < epsilon { 0.0 } else { vel.x },
        if vel.y.abs() < epsilon { 0.0 } else { vel.y },
    )
}

/// Advance one ball by `dt`. Sunk and still balls are left untouched.
pub fn integrate_ball(ball: &mut Ball, dt: f32, settings: &PhysicsSettings) {
    if !ball.in_play() || ball.is_still() {
        return;
    }
    ball.pos += ball.vel * dt;
    ball.vel += ball.vel * (settings.friction * dt);
    ball.vel = snap_velocity(ball.vel, settings.rest_epsilon);
}

/// Advance every ball by `dt`
pub fn integrate(balls: &mut [Ball], dt: f32, settings: &PhysicsSettings) {
    for ball in balls.iter_mut() {
        integrate_ball(ball, dt, settings);
    }
}

/// Every velocity component is exactly zero
pub fn is_at_rest(balls: &[Ball]) -> bool {
    balls.iter().all(Ball::is_still)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn moving(vel: Vec2) -> Ball {
        let mut b = Ball::new(0, Vec2::ZERO);
        b.vel = vel;
        b
    }

    #[test]
    fn test_position_update() {
        let mut b = moving(Vec2::new(1.0, -2.0));
        integrate_ball(&mut b, 0.5, &PhysicsSettings::frictionless());
        assert_eq!(b.pos, Vec2::new(0.5, -1.0));
        assert_eq!(b.vel, Vec2::new(1.0, -2.0));
    }

    #[test]
    fn test_friction_decays_speed() {
        let settings = PhysicsSettings::default();
        let mut b = moving(Vec2::new(1.0, 0.0));
        integrate_ball(&mut b, 0.1, &settings);
        let expected = 1.0 + settings.friction * 0.1;
        assert!((b.vel.x - expected).abs() < 1e-6);
    }

    #[test]
    fn test_snap_per_component() {
        let v = snap_velocity(Vec2::new(0.009, -0.5), 0.01);
        assert_eq!(v, Vec2::new(0.0, -0.5));
        let v = snap_velocity(Vec2::new(-0.0099, 0.0001), 0.01);
        assert_eq!(v, Vec2::ZERO);
    }

    #[test]
    fn test_friction_reaches_rest() {
        let settings = PhysicsSettings::default();
        let mut balls = vec![moving(Vec2::new(2.0, 1.0))];
        let mut ticks = 0;
        while !is_at_rest(&balls) {
            integrate(&mut balls, 1.0 / 120.0, &settings);
            ticks += 1;
            assert!(ticks < 100_000, "never came to rest");
        }
        assert_eq!(balls[0].vel, Vec2::ZERO);
    }

    #[test]
    fn test_sunk_ball_not_integrated() {
        let mut b = moving(Vec2::new(1.0, 0.0));
        b.sink();
        integrate_ball(&mut b, 1.0, &PhysicsSettings::default());
        assert!(b.sunk);
        assert_eq!(b.vel, Vec2::ZERO);
    }

    proptest! {
        #[test]
        fn prop_rest_is_fixed_point(
            x in -1.0f32..1.0, y in -0.5f32..0.5, dt in 0.0f32..10.0,
        ) {
            let mut balls = vec![Ball::new(0, Vec2::new(x, y)), Ball::new(1, Vec2::new(y, x))];
            let before = balls.clone();
            for _ in 0..5 {
                integrate(&mut balls, dt, &PhysicsSettings::default());
            }
            prop_assert_eq!(balls, before);
        }
    }
}
