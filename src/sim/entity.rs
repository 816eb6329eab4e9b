//! Entity data
//!
//! Every simulated object is the same flat record; behavior is selected by
//! masks, the held item and a few flags rather than by type.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::ops::{BitAnd, BitOr};

/// Bitset of entity affinities
///
/// An entity's `is` mask says what it is; its `hits` mask says what blocks its
/// motion, and its `item_hits` mask what its weapon can strike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Mask(pub u32);

impl Mask {
    pub const NONE: Mask = Mask(0);
    pub const TERRAIN: Mask = Mask(1 << 0);
    pub const PLAYER: Mask = Mask(1 << 1);
    pub const POT: Mask = Mask(1 << 2);
    pub const PROJECTILE: Mask = Mask(1 << 3);

    #[inline]
    pub fn intersects(self, other: Mask) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for Mask {
    type Output = Mask;

    fn bitor(self, rhs: Mask) -> Mask {
        Mask(self.0 | rhs.0)
    }
}

impl BitAnd for Mask {
    type Output = Mask;

    fn bitand(self, rhs: Mask) -> Mask {
        Mask(self.0 & rhs.0)
    }
}

/// Draw routine selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Art {
    #[default]
    None,
    Player,
    Pot,
    Arrow,
    Rock,
}

/// Held item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Item {
    #[default]
    None,
    Sword,
    Bow,
}

/// In-progress (or last) weapon swing
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Swing {
    /// Tick at which the swing finishes
    pub end_tick: u64,
    /// Unit direction the swing was aimed in
    pub dir: Vec2,
    /// Damage / projectile already delivered this swing
    pub fired: bool,
}

impl Swing {
    #[inline]
    pub fn in_progress(&self, tick: u64) -> bool {
        tick < self.end_tick
    }
}

/// A pooled game entity
///
/// `Default` is the zeroed, inactive slot state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Entity {
    pub active: bool,
    /// Bumped every time the slot is freed
    pub generation: u32,

    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub is: Mask,
    pub hits: Mask,
    pub item_hits: Mask,
    /// Per-tick velocity multiplier; `None` uses the tuned default
    pub friction: Option<f32>,
    /// Damages what it runs into and despawns instead of bouncing
    pub pointy: bool,
    /// Despawn once this tick is reached
    pub despawn_tick: Option<u64>,

    pub art: Art,

    pub hp: u32,
    /// Zero means the entity cannot be damaged
    pub max_hp: u32,
    pub hostile: bool,
    pub aggroed: bool,
    /// Tick of the last damage taken (cooldown)
    pub last_hit: Option<u64>,

    pub item: Item,
    pub swing: Swing,
    /// Unit facing direction
    pub facing: Vec2,
}

impl Entity {
    #[inline]
    pub fn mortal(&self) -> bool {
        self.max_hp > 0
    }

    /// Facing while idle, swing direction while swinging
    pub fn aim(&self, tick: u64) -> Vec2 {
        if self.swing.in_progress(tick) {
            self.swing.dir
        } else {
            self.facing
        }
    }
}
