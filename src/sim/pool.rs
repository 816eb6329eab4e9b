//! Fixed-capacity entity pool with generational handles
//!
//! Slots never move. Freeing a slot bumps its generation so every handle
//! captured before the free resolves to `None` from then on, even after the
//! slot is handed out again.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::entity::Entity;

/// Weak (index, generation) reference to a pooled entity
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edx {
    pub index: u32,
    pub generation: u32,
}

impl fmt::Debug for Edx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edx({}v{})", self.index, self.generation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("entity pool exhausted ({capacity} slots in use)")]
    Exhausted { capacity: usize },
}

/// Slab of entities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pool {
    slots: Vec<Entity>,
}

impl Pool {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![Entity::default(); capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|e| e.active).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take the first free slot, reset to a zeroed active entity
    pub fn alloc(&mut self) -> Result<Edx, PoolError> {
        let Some(index) = self.slots.iter().position(|e| !e.active) else {
            return Err(PoolError::Exhausted {
                capacity: self.slots.len(),
            });
        };
        let slot = &mut self.slots[index];
        let generation = slot.generation;
        *slot = Entity {
            active: true,
            generation,
            ..Default::default()
        };
        Ok(Edx {
            index: index as u32,
            generation,
        })
    }

    /// Release a live entity. Returns false for a stale handle.
    pub fn free(&mut self, edx: Edx) -> bool {
        match self.slots.get_mut(edx.index as usize) {
            Some(slot) if slot.active && slot.generation == edx.generation => {
                slot.active = false;
                slot.generation = slot.generation.wrapping_add(1);
                true
            }
            _ => false,
        }
    }

    /// Resolve a handle; `None` if freed (or regenerated) since it was issued
    pub fn get(&self, edx: Edx) -> Option<&Entity> {
        self.slots
            .get(edx.index as usize)
            .filter(|e| e.active && e.generation == edx.generation)
    }

    pub fn get_mut(&mut self, edx: Edx) -> Option<&mut Entity> {
        self.slots
            .get_mut(edx.index as usize)
            .filter(|e| e.active && e.generation == edx.generation)
    }

    /// Mutable access to two distinct live entities at once
    pub fn pair_mut(&mut self, a: Edx, b: Edx) -> Option<(&mut Entity, &mut Entity)> {
        if a.index == b.index {
            return None;
        }
        self.get(a)?;
        self.get(b)?;
        let (lo, hi) = (a.index.min(b.index) as usize, a.index.max(b.index) as usize);
        let (head, tail) = self.slots.split_at_mut(hi);
        let (lo_ref, hi_ref) = (&mut head[lo], &mut tail[0]);
        if a.index < b.index {
            Some((lo_ref, hi_ref))
        } else {
            Some((hi_ref, lo_ref))
        }
    }

    /// Handle for the entity currently living in `index`
    fn handle_at(&self, index: usize) -> Edx {
        Edx {
            index: index as u32,
            generation: self.slots[index].generation,
        }
    }

    /// Every active entity, in slot order
    pub fn iter(&self) -> impl Iterator<Item = (Edx, &Entity)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, e)| e.active)
            .map(|(i, e)| {
                (
                    Edx {
                        index: i as u32,
                        generation: e.generation,
                    },
                    e,
                )
            })
    }

    /// Snapshot of active handles, for systems that mutate while walking
    pub fn handles(&self) -> Vec<Edx> {
        (0..self.slots.len())
            .filter(|&i| self.slots[i].active)
            .map(|i| self.handle_at(i))
            .collect()
    }
}

impl Default for Pool {
    fn default() -> Self {
        Self::new(crate::consts::MAX_ENTITIES)
    }
}
