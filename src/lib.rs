//! Felt - real-time 2D billiards physics
//!
//! Core modules:
//! - `sim`: Simulation core (ball store, collisions, integration, tick driver)
//! - `renderer`: Render handoff (ball quads, atlas UVs, vertex layout)
//! - `input`: Shot/cue-placement input parsing and the pending-shot slot
//! - `settings`: Data-driven physics tuning

pub mod input;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use settings::PhysicsSettings;

use glam::Vec2;

/// Simulation configuration constants
pub mod consts {
    use glam::Vec2;

    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta accepted by the host loop (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Ball set: cue ball plus fifteen object balls
    pub const NUM_BALLS: usize = 16;
    pub const CUE_BALL: usize = 0;
    pub const EIGHT_BALL: usize = 8;

    /// Ball radius in table units
    pub const BALL_RADIUS: f32 = 0.024;
    /// Felt friction: velocity += velocity * (FRICTION * dt)
    pub const FRICTION: f32 = -0.6;
    /// Velocity components below this magnitude snap to zero
    pub const REST_EPSILON: f32 = 0.01;

    /// Backward step (seconds) used to sample the separation slope when rewinding
    pub const REWIND_STEP: f32 = 0.001;
    /// Rewind step count used when the contact threshold is degenerate
    pub const REWIND_FALLBACK_STEPS: f32 = 50.0;
    /// Nested rewinds allowed for dense clusters (break shots)
    pub const REWIND_MAX_DEPTH: u32 = 2;

    /// Lookahead (seconds) for the rail crossing test
    pub const RAIL_LOOKAHEAD: f32 = 0.016;
    /// Angular tolerance fit: tolerance = SLOPE * edge_length + INTERCEPT
    pub const RAIL_TOLERANCE_SLOPE: f32 = -0.14707;
    pub const RAIL_TOLERANCE_INTERCEPT: f32 = 0.21279;

    /// Where a pocketed ball is parked
    pub const SUNK_POSITION: Vec2 = Vec2::INFINITY;

    /// Default playing surface (half extents of the bundled table asset)
    pub const TABLE_HALF_LENGTH: f32 = 1.0;
    pub const TABLE_HALF_WIDTH: f32 = 0.5;
    /// Rack apex (foot spot)
    pub const FOOT_SPOT: Vec2 = Vec2::new(0.5, 0.0);
    /// Kitchen: everything behind the head string
    pub const HEAD_STRING_X: f32 = -0.5;
    /// Head string position as a fraction of the cushion length
    pub const HEAD_STRING_FRACTION: f32 = 0.25;
    /// Default cue ball spot inside the kitchen
    pub const HEAD_SPOT: Vec2 = Vec2::new(-0.6, 0.0);
}

/// True if the position is the parked "off-table" sentinel
#[inline]
pub fn is_sunk_position(pos: Vec2) -> bool {
    pos.x.is_infinite() || pos.y.is_infinite()
}

/// True if the vector is usable as a velocity (finite components)
#[inline]
pub fn is_finite_velocity(vel: Vec2) -> bool {
    vel.x.is_finite() && vel.y.is_finite()
}
