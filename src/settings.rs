//! Physics tuning
//!
//! Loaded from a JSON file; any missing field falls back to the constants
//! in [`crate::consts`].

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Errors raised while loading settings
#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "cannot read settings: {}", e),
            SettingsError::Json(e) => write!(f, "invalid settings: {}", e),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io(e) => Some(e),
            SettingsError::Json(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        SettingsError::Io(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::Json(e)
    }
}

/// Physics tuning parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    pub ball_radius: f32,
    /// Acceleration coefficient (negative = deceleration)
    pub friction: f32,
    /// Velocity components below this snap to zero
    pub rest_epsilon: f32,

    // === Rewind ===
    pub rewind_step: f32,
    pub rewind_fallback_steps: f32,
    pub rewind_max_depth: u32,

    // === Rails ===
    pub rail_lookahead: f32,

    // === Host loop ===
    pub max_frame_dt: f32,
    /// Rack shuffle seed
    pub seed: u64,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            ball_radius: BALL_RADIUS,
            friction: FRICTION,
            rest_epsilon: REST_EPSILON,

            rewind_step: REWIND_STEP,
            rewind_fallback_steps: REWIND_FALLBACK_STEPS,
            rewind_max_depth: REWIND_MAX_DEPTH,

            rail_lookahead: RAIL_LOOKAHEAD,

            max_frame_dt: MAX_FRAME_DT,
            seed: 0,
        }
    }
}

impl PhysicsSettings {
    /// Squared centre distance at which two balls touch: (2r)^2
    #[inline]
    pub fn contact_threshold_sq(&self) -> f32 {
        4.0 * self.ball_radius * self.ball_radius
    }

    /// Frictionless variant (for tests and demos)
    pub fn frictionless() -> Self {
        Self {
            friction: 0.0,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded physics settings: {:?}", settings);
        Ok(settings)
    }

    /// Load from a file if it exists, otherwise defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }
}
