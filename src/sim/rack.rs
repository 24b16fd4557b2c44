//! Rack setup
//!
//! Fifteen object balls go into a triangle with a constrained shuffle:
//! the eight ball takes slot 5 (centre of the third row) and the two back
//! corners (slots 11 and 15) hold one solid and one stripe.
//!
//! Slots are numbered row by row from the apex:
//!
//! ```text
//!  1
//!  2  3
//!  4  5  6
//!  7  8  9 10
//! 11 12 13 14 15
//! ```

use glam::Vec2;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;

use super::state::{Ball, BallKind, SimPhase, SimulationState};
use super::table::TableBoundary;
use crate::consts::*;
use crate::settings::PhysicsSettings;

pub const RACK_SLOTS: usize = 15;
pub const EIGHT_SLOT: usize = 5;
pub const BACK_CORNERS: (usize, usize) = (11, 15);

/// Slack between racked balls so a fresh rack is not already overlapping
const RACK_GAP: f32 = 0.0005;

/// Slot assignment: `slots[s - 1]` is the ball number in slot `s`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rack {
    pub slots: [usize; RACK_SLOTS],
}

impl Rack {
    /// Constrained shuffle from a seed (deterministic per seed)
    pub fn shuffled(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut numbers: Vec<usize> = (1..NUM_BALLS).filter(|&n| n != EIGHT_BALL).collect();
        numbers.shuffle(&mut rng);

        let mut slots = [0usize; RACK_SLOTS];
        let mut remaining = numbers.into_iter();
        for (i, slot) in slots.iter_mut().enumerate() {
            *slot = if i + 1 == EIGHT_SLOT {
                EIGHT_BALL
            } else {
                remaining.next().unwrap_or(EIGHT_BALL)
            };
        }

        let mut rack = Self { slots };
        rack.balance_corners();
        rack
    }

    /// Ball number in slot `s` (1-based)
    #[inline]
    pub fn ball_in(&self, slot: usize) -> usize {
        self.slots[slot - 1]
    }

    /// Slot (1-based) holding ball `number`
    pub fn slot_of(&self, number: usize) -> Option<usize> {
        self.slots.iter().position(|&n| n == number).map(|i| i + 1)
    }

    /// True if the corner and eight-ball constraints hold
    pub fn is_legal(&self) -> bool {
        let (a, b) = BACK_CORNERS;
        self.ball_in(EIGHT_SLOT) == EIGHT_BALL
            && BallKind::from_number(self.ball_in(a)) != BallKind::from_number(self.ball_in(b))
    }

    /// If both back corners hold the same group, swap the far corner with
    /// the first interior ball of the other group.
    fn balance_corners(&mut self) {
        let (a, b) = BACK_CORNERS;
        let corner_kind = BallKind::from_number(self.ball_in(a));
        if corner_kind != BallKind::from_number(self.ball_in(b)) {
            return;
        }
        let swap = (1..=RACK_SLOTS)
            .filter(|&s| s != EIGHT_SLOT && s != a && s != b)
            .find(|&s| BallKind::from_number(self.ball_in(s)) != corner_kind);
        if let Some(s) = swap {
            self.slots.swap(s - 1, b - 1);
        }
    }
}

/// Row and column (0-based) of slot `s`
pub fn slot_row_col(slot: usize) -> (usize, usize) {
    let mut row = 0;
    let mut first = 1;
    while slot >= first + row + 1 {
        first += row + 1;
        row += 1;
    }
    (row, slot - first)
}

/// Centre of slot `s` for a rack whose apex sits at `apex`, rows growing
/// toward +x (away from the kitchen).
pub fn slot_position(slot: usize, apex: Vec2, ball_radius: f32) -> Vec2 {
    let gap = 2.0 * ball_radius + RACK_GAP;
    let row_offset = gap * 3f32.sqrt() / 2.0;
    let (row, col) = slot_row_col(slot);
    Vec2::new(
        apex.x + row as f32 * row_offset,
        apex.y + (col as f32 - row as f32 / 2.0) * gap,
    )
}

/// Build a racked table: cue ball at `cue_pos`, object balls in a shuffled
/// triangle at the foot spot.
pub fn setup(table: TableBoundary, settings: PhysicsSettings, cue_pos: Vec2) -> (SimulationState, Rack) {
    let rack = Rack::shuffled(settings.seed);
    let radius = settings.ball_radius;

    let mut balls: Vec<Ball> = (0..NUM_BALLS).map(|id| Ball::new(id, Vec2::ZERO)).collect();
    balls[CUE_BALL].pos = cue_pos;
    for slot in 1..=RACK_SLOTS {
        balls[rack.ball_in(slot)].pos = slot_position(slot, FOOT_SPOT, radius);
    }

    let mut state = SimulationState::new(table, settings);
    state.balls = balls;
    state.phase = SimPhase::AtRest;

    log::info!("Racked: {:?} (seed {})", rack.slots, state.settings.seed);
    (state, rack)
}
