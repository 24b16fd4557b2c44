//! Render handoff
//!
//! The simulation never draws. After each tick the host projects the ball
//! store into textured quads here and uploads them however it likes.

pub mod quads;
pub mod vertex;

pub use quads::{BallQuad, atlas_uv, ball_positions, ball_quads, quad_vertices};
pub use vertex::QuadVertex;
