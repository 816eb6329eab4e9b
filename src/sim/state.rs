//! Game state and entity spawners
//!
//! One explicit state block owned by the top-level loop and passed by
//! reference to each system.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Art, Entity, Item, Mask};
use super::labels::DamageLabels;
use super::pool::{Edx, Pool, PoolError};
use super::waffle::Waffle;
use crate::consts::*;
use crate::map::MapData;
use crate::tuning::Tuning;

/// Complete simulation state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Simulation tick counter
    pub tick: u64,
    pub pool: Pool,
    /// Handle of the current player; stale while the player is dead
    pub player: Edx,
    /// Smoothed camera center
    pub camera: Vec2,
    pub waffle: Waffle,
    pub labels: DamageLabels,
    pub tuning: Tuning,
}

impl GameState {
    /// Create a world holding only the player, at the origin
    pub fn new(tuning: Tuning) -> Result<Self, PoolError> {
        Self::with_capacity(tuning, MAX_ENTITIES)
    }

    pub fn with_capacity(tuning: Tuning, capacity: usize) -> Result<Self, PoolError> {
        let mut pool = Pool::new(capacity);
        let player = pool.alloc()?;
        if let Some(e) = pool.get_mut(player) {
            *e = player_entity(e.generation, Vec2::ZERO);
        }
        Ok(Self {
            tick: 0,
            pool,
            player,
            camera: Vec2::new(0.0, tuning.camera_lead),
            waffle: Waffle::default(),
            labels: DamageLabels::default(),
            tuning,
        })
    }

    /// Spawn the map's terrain colliders and pots
    pub fn populate(&mut self, map: &MapData) -> Result<(), PoolError> {
        for circle in &map.circles {
            self.spawn_terrain(circle.pos, circle.radius)?;
        }
        for &pos in &map.pots {
            self.spawn_pot(pos)?;
        }
        log::info!(
            "World populated: {} terrain circles, {} pots, {} entities live",
            map.circles.len(),
            map.pots.len(),
            self.pool.len()
        );
        Ok(())
    }

    /// Live player entity, if any
    pub fn player(&self) -> Option<&Entity> {
        self.pool.get(self.player)
    }

    /// Allocate a slot and fill it with `init`
    fn spawn(&mut self, init: impl FnOnce(u32) -> Entity) -> Result<Edx, PoolError> {
        let edx = self.pool.alloc()?;
        if let Some(e) = self.pool.get_mut(edx) {
            *e = init(edx.generation);
        }
        Ok(edx)
    }

    pub fn spawn_pot(&mut self, pos: Vec2) -> Result<Edx, PoolError> {
        self.spawn(|generation| Entity {
            active: true,
            generation,
            pos,
            radius: POT_RADIUS,
            is: Mask::POT,
            hits: Mask::TERRAIN | Mask::PLAYER | Mask::POT,
            item_hits: Mask::PLAYER,
            art: Art::Pot,
            hp: POT_HP,
            max_hp: POT_HP,
            hostile: true,
            item: Item::Sword,
            facing: Vec2::NEG_Y,
            ..Default::default()
        })
    }

    pub fn spawn_terrain(&mut self, pos: Vec2, radius: f32) -> Result<Edx, PoolError> {
        self.spawn(|generation| Entity {
            active: true,
            generation,
            pos,
            radius,
            is: Mask::TERRAIN,
            art: Art::Rock,
            ..Default::default()
        })
    }

    /// Spawn a pointy projectile that flies unslowed until it hits `hits`
    pub fn spawn_arrow(&mut self, pos: Vec2, vel: Vec2, hits: Mask) -> Result<Edx, PoolError> {
        let despawn_tick = self.tick + self.tuning.arrow_lifetime_ticks;
        self.spawn(|generation| Entity {
            active: true,
            generation,
            pos,
            vel,
            radius: ARROW_RADIUS,
            is: Mask::PROJECTILE,
            hits,
            friction: Some(1.0),
            pointy: true,
            despawn_tick: Some(despawn_tick),
            art: Art::Arrow,
            facing: vel.normalize_or(Vec2::X),
            ..Default::default()
        })
    }

    /// Bring the player back after death. A live player is left alone.
    pub fn respawn_player(&mut self, pos: Vec2) -> Result<Edx, PoolError> {
        if self.player().is_some() {
            return Ok(self.player);
        }
        let edx = self.spawn(|generation| player_entity(generation, pos))?;
        self.player = edx;
        self.waffle.reset();
        log::info!("Player respawned as {:?} at {}", edx, pos);
        Ok(edx)
    }
}

fn player_entity(generation: u32, pos: Vec2) -> Entity {
    Entity {
        active: true,
        generation,
        pos,
        radius: PLAYER_RADIUS,
        is: Mask::PLAYER,
        hits: Mask::TERRAIN | Mask::POT,
        item_hits: Mask::POT,
        art: Art::Player,
        hp: PLAYER_HP,
        max_hp: PLAYER_HP,
        item: Item::Sword,
        facing: Vec2::X,
        ..Default::default()
    }
}
