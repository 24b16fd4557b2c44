//! Console input
//!
//! Shots are typed as two numbers (`vx vy`) and handed to the tick loop
//! through a [`ShotSlot`]: the reader thread offers, the loop takes. The
//! loop never waits on the slot.

use std::sync::{Arc, Mutex, MutexGuard};

use glam::Vec2;

/// Single-entry mailbox for the next shot
#[derive(Debug, Clone, Default)]
pub struct ShotSlot {
    pending: Arc<Mutex<Option<Vec2>>>,
}

impl ShotSlot {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Vec2>> {
        // A panicked writer leaves at worst a stale Option behind
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Store a shot, replacing any shot not yet taken
    pub fn offer(&self, velocity: Vec2) {
        if self.lock().replace(velocity).is_some() {
            log::debug!("Pending shot replaced");
        }
    }

    /// Take the pending shot, if any
    pub fn take(&self) -> Option<Vec2> {
        self.lock().take()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_none()
    }
}

/// Parse two whitespace- or comma-separated finite numbers
fn parse_pair(line: &str) -> Option<Vec2> {
    let mut parts = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty());
    let x: f32 = parts.next()?.parse().ok()?;
    let y: f32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() || !x.is_finite() || !y.is_finite() {
        return None;
    }
    Some(Vec2::new(x, y))
}

/// Parse a shot velocity line (`vx vy`)
pub fn parse_shot(line: &str) -> Option<Vec2> {
    parse_pair(line).filter(|v| *v != Vec2::ZERO)
}

/// Parse a table position line (`x y`)
pub fn parse_position(line: &str) -> Option<Vec2> {
    parse_pair(line)
}
