//! Simulation state and core types
//!
//! The ball store is a fixed, ordered arena: index 0 is the cue ball and the
//! order assigned at rack setup never changes. Everything the physics needs
//! lives in [`SimulationState`]; render-only data belongs to the renderer.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::table::{Kitchen, TableBoundary};
use crate::consts::*;
use crate::is_sunk_position;
use crate::settings::PhysicsSettings;

/// Ball classification by number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallKind {
    Cue,
    Solid,
    Eight,
    Stripe,
}

impl BallKind {
    /// 0 cue, 1-7 solids, 8 the eight ball, 9-15 stripes
    pub fn from_number(number: usize) -> Self {
        match number {
            0 => BallKind::Cue,
            1..=7 => BallKind::Solid,
            EIGHT_BALL => BallKind::Eight,
            _ => BallKind::Stripe,
        }
    }
}

/// A ball on (or off) the table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    /// Ball number, equal to its index in the store
    pub id: usize,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Pocketed: parked at the sentinel position with zero velocity
    pub sunk: bool,
}

impl Ball {
    pub fn new(id: usize, pos: Vec2) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            sunk: false,
        }
    }

    pub fn kind(&self) -> BallKind {
        BallKind::from_number(self.id)
    }

    /// Still taking part in collisions and integration
    #[inline]
    pub fn in_play(&self) -> bool {
        !self.sunk && !is_sunk_position(self.pos)
    }

    /// Pocket the ball
    pub fn sink(&mut self) {
        self.pos = SUNK_POSITION;
        self.vel = Vec2::ZERO;
        self.sunk = true;
    }

    #[inline]
    pub fn is_still(&self) -> bool {
        self.vel.x == 0.0 && self.vel.y == 0.0
    }
}

/// Driver phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimPhase {
    /// Every ball is still; waiting for a shot
    AtRest,
    /// Collisions and integration running
    InMotion,
}

/// Notable things that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    ShotTaken { velocity: Vec2 },
    BallSunk { id: usize, kind: BallKind },
    CameToRest,
    CuePlaced { pos: Vec2 },
}

/// Elapsed-time bookkeeping
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationClock {
    /// Monotonic accumulated simulation time (drives animated uniforms)
    pub time: f32,
    /// Time spent blocked on input, subtracted from the next delta
    pub pause_time: f32,
}

impl SimulationClock {
    /// Record time the host spent blocked (e.g. on a console prompt)
    pub fn add_pause(&mut self, seconds: f32) {
        if seconds > 0.0 {
            self.pause_time += seconds;
        }
    }

    /// Subtract pending pause time from a raw delta without advancing the
    /// clock. Hosts call this before clamping a wall-clock frame delta.
    pub fn consume_pause(&mut self, dt: f32) -> f32 {
        let effective = (dt - self.pause_time).max(0.0);
        // Whatever pause is left over carries into the next frame
        self.pause_time = (self.pause_time - dt).max(0.0);
        effective
    }

    /// Consume pending pause time from a frame delta and advance the clock.
    /// Returns the effective delta.
    pub fn advance(&mut self, dt: f32) -> f32 {
        let effective = self.consume_pause(dt);
        self.time += effective;
        effective
    }
}

/// Complete simulation state, owned by the driver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationState {
    pub balls: Vec<Ball>,
    pub table: TableBoundary,
    pub kitchen: Kitchen,
    pub settings: PhysicsSettings,
    pub phase: SimPhase,
    pub clock: SimulationClock,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Events raised since the last drain
    #[serde(skip)]
    pub events: Vec<SimEvent>,
}

impl SimulationState {
    /// Empty store on the given table; balls are added by rack setup
    pub fn new(table: TableBoundary, settings: PhysicsSettings) -> Self {
        let kitchen = Kitchen::for_table(&table, settings.ball_radius);
        Self {
            balls: Vec::with_capacity(NUM_BALLS),
            table,
            kitchen,
            settings,
            phase: SimPhase::AtRest,
            clock: SimulationClock::default(),
            time_ticks: 0,
            events: Vec::new(),
        }
    }

    /// Build from explicit balls (ids are reassigned to match indices)
    pub fn with_balls(table: TableBoundary, settings: PhysicsSettings, balls: Vec<Ball>) -> Self {
        let mut state = Self::new(table, settings);
        state.balls = balls
            .into_iter()
            .enumerate()
            .map(|(id, ball)| Ball { id, ..ball })
            .collect();
        state.phase = if state.all_still() {
            SimPhase::AtRest
        } else {
            SimPhase::InMotion
        };
        state
    }

    /// Every ball's velocity is exactly zero
    pub fn all_still(&self) -> bool {
        self.balls.iter().all(Ball::is_still)
    }

    pub fn cue_ball(&self) -> Option<&Ball> {
        self.balls.get(CUE_BALL)
    }

    /// Table is at rest with the cue ball pocketed
    pub fn needs_cue_placement(&self) -> bool {
        self.phase == SimPhase::AtRest && self.cue_ball().is_some_and(|b| b.sunk)
    }

    /// Sunk balls in store order
    pub fn pocketed(&self) -> Vec<(usize, BallKind)> {
        self.balls
            .iter()
            .filter(|b| b.sunk)
            .map(|b| (b.id, b.kind()))
            .collect()
    }

    /// Take all events raised since the last call
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }
}
