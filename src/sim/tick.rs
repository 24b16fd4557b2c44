//! Simulation tick
//!
//! One call per frame: ball-ball collisions, then rails and pockets, then
//! integration. While the table is at rest nothing moves until a shot
//! arrives through [`TickInput`]; the host never blocks inside the tick.

use glam::Vec2;

use super::collision::{collide_balls, collide_rails};
use super::integrator::{integrate, is_at_rest};
use super::state::{SimEvent, SimPhase, SimulationState};
use super::vector::distance_squared;
use crate::consts::CUE_BALL;
use crate::is_finite_velocity;

/// Input polled by the host for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Cue ball velocity; honoured only while the table is at rest
    pub shot: Option<Vec2>,
    /// Ball-in-hand placement for the cue ball
    pub place_cue: Option<Vec2>,
}

/// Outcome of a cue ball placement request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CuePlacement {
    Placed,
    /// Outside the kitchen rectangle
    OutsideKitchen,
    /// Would overlap a ball already on the table
    Blocked,
    /// Balls are moving, or the cue ball is in play after the break
    NotAllowed,
}

/// Put the cue ball at `pos`. Allowed at rest before the first shot or
/// after the cue ball has been pocketed.
pub fn place_cue_ball(state: &mut SimulationState, pos: Vec2) -> CuePlacement {
    if state.phase != SimPhase::AtRest || state.balls.len() <= CUE_BALL {
        return CuePlacement::NotAllowed;
    }
    let before_break = state.time_ticks == 0;
    if !before_break && !state.balls[CUE_BALL].sunk {
        return CuePlacement::NotAllowed;
    }
    if !state.kitchen.contains(pos) {
        return CuePlacement::OutsideKitchen;
    }
    let threshold = state.settings.contact_threshold_sq();
    let blocked = state
        .balls
        .iter()
        .filter(|b| b.id != CUE_BALL && b.in_play())
        .any(|b| distance_squared(b.pos, pos) <= threshold);
    if blocked {
        return CuePlacement::Blocked;
    }

    let cue = &mut state.balls[CUE_BALL];
    cue.pos = pos;
    cue.vel = Vec2::ZERO;
    cue.sunk = false;
    state.events.push(SimEvent::CuePlaced { pos });
    log::info!("Cue ball placed at ({:.3}, {:.3})", pos.x, pos.y);
    CuePlacement::Placed
}

/// Apply a shot if the table accepts one. Returns true if the table is now
/// in motion.
fn take_shot(state: &mut SimulationState, velocity: Vec2) -> bool {
    let cue_ready = state.balls.get(CUE_BALL).is_some_and(|b| b.in_play());
    if !cue_ready {
        log::warn!("Shot ignored: cue ball is off the table");
        return false;
    }
    if !is_finite_velocity(velocity) || velocity == Vec2::ZERO {
        log::warn!("Shot ignored: unusable velocity {:?}", velocity);
        return false;
    }
    state.balls[CUE_BALL].vel = velocity;
    state.phase = SimPhase::InMotion;
    state.events.push(SimEvent::ShotTaken { velocity });
    log::info!("Shot taken: ({:.3}, {:.3})", velocity.x, velocity.y);
    true
}

/// Advance the simulation by one frame
pub fn tick(state: &mut SimulationState, input: &TickInput, dt: f32) {
    let dt = state.clock.advance(dt);

    if state.phase == SimPhase::AtRest {
        if let Some(pos) = input.place_cue {
            place_cue_ball(state, pos);
        }
        match input.shot {
            Some(velocity) if take_shot(state, velocity) => {}
            Some(_) | None => return,
        }
    } else if input.shot.is_some() {
        log::debug!("Shot ignored: balls still moving");
    }

    state.time_ticks += 1;

    let settings = &state.settings;
    collide_balls(&mut state.balls, dt, settings);
    collide_rails(&mut state.balls, &state.table, settings, &mut state.events);
    integrate(&mut state.balls, dt, settings);

    if is_at_rest(&state.balls) {
        state.phase = SimPhase::AtRest;
        state.events.push(SimEvent::CameToRest);
        log::info!(
            "Table at rest after {} ticks, {} ball(s) pocketed",
            state.time_ticks,
            state.pocketed().len()
        );
    }
}
