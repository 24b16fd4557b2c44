//! Deterministic simulation module
//!
//! All table physics lives here. This module must be pure and deterministic:
//! - Caller-supplied time deltas only
//! - Seeded RNG only (rack shuffle)
//! - Stable iteration order (by ball index)
//! - No rendering or platform dependencies

pub mod collision;
pub mod integrator;
pub mod rack;
pub mod state;
pub mod table;
pub mod tick;
pub mod vector;

pub use collision::{
    collide_balls, collide_rails, find_overlapping_pairs, resolve_elastic, rewind_to_impact,
    touches_edge,
};
pub use integrator::{integrate, is_at_rest};
pub use rack::{Rack, setup};
pub use state::{Ball, BallKind, SimEvent, SimPhase, SimulationClock, SimulationState};
pub use table::{EdgeKind, GeometryError, Kitchen, TableBoundary};
pub use tick::{CuePlacement, TickInput, place_cue_ball, tick};
