//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Stable iteration order (by pool slot)
//! - No rendering or platform dependencies

pub mod anim;
pub mod combat;
pub mod entity;
pub mod labels;
pub mod pool;
pub mod sdf;
pub mod state;
pub mod tick;
pub mod waffle;

pub use combat::{DamageOutcome, apply_damage};
pub use entity::{Art, Entity, Item, Mask, Swing};
pub use labels::{DamageLabel, DamageLabels};
pub use pool::{Edx, Pool, PoolError};
pub use sdf::{RayHit, raymarch, reflect, sd_circle};
pub use state::GameState;
pub use tick::{FixedStep, TickInput, tick};
pub use waffle::{EncounterStatus, Waffle};
