//! Floating damage numbers
//!
//! Repeated hits on the same entity grow one label instead of stacking new
//! ones. When every label is taken, the oldest is overwritten.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::pool::Edx;
use crate::consts::MAX_DAMAGE_LABELS;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageLabel {
    /// World position where the hit landed
    pub pos: Vec2,
    pub amount: u32,
    /// Tick of the most recent hit folded into this label
    pub tick: u64,
    pub owner: Edx,
}

impl DamageLabel {
    /// Still on screen at `tick`
    #[inline]
    pub fn alive(&self, tick: u64, lifetime: u64) -> bool {
        tick.saturating_sub(self.tick) < lifetime
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DamageLabels {
    slots: [Option<DamageLabel>; MAX_DAMAGE_LABELS],
}

impl DamageLabels {
    /// Fold a hit into an existing label for `owner`, or claim the oldest slot
    pub fn record(&mut self, owner: Edx, pos: Vec2, amount: u32, tick: u64, lifetime: u64) {
        if let Some(label) = self
            .slots
            .iter_mut()
            .flatten()
            .find(|l| l.owner == owner && l.alive(tick, lifetime))
        {
            label.amount += amount;
            label.tick = tick;
            label.pos = pos;
            return;
        }

        let fresh = DamageLabel {
            pos,
            amount,
            tick,
            owner,
        };
        let oldest = (0..MAX_DAMAGE_LABELS)
            .min_by_key(|&i| self.slots[i].map_or(0, |l| l.tick + 1))
            .unwrap_or(0);
        self.slots[oldest] = Some(fresh);
    }

    /// Labels still on screen at `tick`
    pub fn live(&self, tick: u64, lifetime: u64) -> impl Iterator<Item = &DamageLabel> {
        self.slots
            .iter()
            .flatten()
            .filter(move |l| l.alive(tick, lifetime))
    }
}
