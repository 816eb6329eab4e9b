//! Data-driven game balance
//!
//! Every gameplay number that designers may want to tweak. Loaded from JSON;
//! missing fields fall back to the defaults below.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TuningError {
    #[error("couldn't read tuning file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid tuning file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Gameplay constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Encounter scheduler ===
    /// Distance at which a dormant pot notices the player
    pub aggro_radius: f32,
    /// Radius of the slot ring around the player
    pub slot_radius: f32,
    /// How close a pot must be to claim (and keep) its slot
    pub occupancy_distance: f32,
    /// Fraction of the way from slot to player an attacker lunges
    pub attacker_approach: f32,
    /// Lunge impulse scale
    pub attacker_lunge: f32,
    /// Pot steering acceleration per tick
    pub pot_accel: f32,

    // === Combat ===
    /// Ticks a target is immune after taking damage
    pub damage_cooldown_ticks: u64,
    /// Max raymarch distance for a melee hit
    pub melee_range: f32,
    pub melee_damage: u32,
    /// Impulse applied to both parties of a melee hit
    pub knockback: f32,
    pub arrow_speed: f32,
    pub arrow_damage: u32,
    /// Impulse pushing the archer backwards on release
    pub arrow_recoil: f32,
    pub arrow_lifetime_ticks: u64,

    // === Movement ===
    /// Default per-tick velocity multiplier
    pub friction: f32,
    pub player_accel: f32,
    /// Speed factor when moving directly against the facing direction
    pub backpedal_factor: f32,

    // === Camera / UI ===
    /// Fraction of the remaining distance covered per tick
    pub camera_smoothing: f32,
    /// Camera sits this far above the player
    pub camera_lead: f32,
    pub label_lifetime_ticks: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            aggro_radius: 5.0,
            slot_radius: 2.0,
            occupancy_distance: 0.5,
            attacker_approach: 0.6,
            attacker_lunge: 0.07,
            pot_accel: 0.006,

            damage_cooldown_ticks: 5,
            melee_range: 1.5,
            melee_damage: 1,
            knockback: 0.06,
            arrow_speed: 0.13,
            arrow_damage: 1,
            arrow_recoil: 0.03,
            arrow_lifetime_ticks: 240,

            friction: 0.93,
            player_accel: 0.009,
            backpedal_factor: 0.55,

            camera_smoothing: 0.05,
            camera_lead: 1.0,
            label_lifetime_ticks: 60,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON text
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| TuningError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }
}
