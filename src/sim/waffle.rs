//! Waffle encounter scheduler
//!
//! Hostiles that notice the player queue into one of a fixed ring of slots
//! around them. Only one slotted hostile at a time is promoted to attacker;
//! the rest hold their slot until it is their turn.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use super::anim;
use super::pool::{Edx, Pool};
use crate::consts::WAFFLE_SLOTS;
use crate::polar_to_cartesian;
use crate::tuning::Tuning;

/// Where a hostile stands in the encounter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncounterStatus {
    /// Not yet aware of the player
    Dormant,
    /// Aware, heading for an open slot
    Seeking,
    /// Holding a slot, waiting its turn
    Slotted,
    /// The single active attacker
    Attacking,
}

/// Slot table plus the current attacker
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Waffle {
    pub slots: [Option<Edx>; WAFFLE_SLOTS],
    pub attacker: Option<Edx>,
}

impl Waffle {
    /// Slot positions around `center`, at equal angular offsets
    pub fn slot_positions(center: Vec2, radius: f32) -> [Vec2; WAFFLE_SLOTS] {
        std::array::from_fn(|i| {
            center + polar_to_cartesian(radius, i as f32 * TAU / WAFFLE_SLOTS as f32)
        })
    }

    /// Slot held by `edx`, if any
    pub fn slot_of(&self, edx: Edx) -> Option<usize> {
        self.slots.iter().position(|s| *s == Some(edx))
    }

    pub fn is_engaged(&self) -> bool {
        self.attacker.is_some() || self.slots.iter().any(Option::is_some)
    }

    /// Drop every occupant and the attacker
    pub fn reset(&mut self) {
        self.slots = [None; WAFFLE_SLOTS];
        self.attacker = None;
    }

    /// Encounter status of a hostile; `None` for stale handles
    pub fn status(&self, pool: &Pool, edx: Edx) -> Option<EncounterStatus> {
        let e = pool.get(edx)?;
        Some(if self.attacker == Some(edx) {
            EncounterStatus::Attacking
        } else if self.slot_of(edx).is_some() {
            EncounterStatus::Slotted
        } else if e.aggroed {
            EncounterStatus::Seeking
        } else {
            EncounterStatus::Dormant
        })
    }

    /// Nearest slot that is free or already ours
    fn nearest_open(&self, slots: &[Vec2; WAFFLE_SLOTS], pos: Vec2, edx: Edx) -> Option<usize> {
        (0..WAFFLE_SLOTS)
            .filter(|&i| self.slots[i].is_none_or(|o| o == edx))
            .min_by(|&a, &b| {
                pos.distance_squared(slots[a])
                    .total_cmp(&pos.distance_squared(slots[b]))
            })
    }
}

/// Run one tick of the scheduler
pub fn update(waffle: &mut Waffle, pool: &mut Pool, player: Edx, tuning: &Tuning, tick: u64) {
    let Some(player_pos) = pool.get(player).map(|p| p.pos) else {
        // No player to fight: the encounter resets and everyone forgets
        if waffle.is_engaged() {
            log::debug!("Player handle {:?} is stale, waffle reset", player);
            waffle.reset();
        }
        for edx in pool.handles() {
            if let Some(e) = pool.get_mut(edx) {
                e.aggroed = false;
            }
        }
        return;
    };
    let slots = Waffle::slot_positions(player_pos, tuning.slot_radius);

    // Attacker role ends once its swing is over
    if let Some(attacker) = waffle.attacker {
        let done = pool.get(attacker).is_none_or(|e| tick > e.swing.end_tick);
        if done {
            log::debug!("Attacker {:?} finished", attacker);
            waffle.attacker = None;
        }
    }

    // Release stale occupants
    let attacker = waffle.attacker;
    for (i, slot) in waffle.slots.iter_mut().enumerate() {
        let Some(edx) = *slot else { continue };
        let keep = match pool.get(edx) {
            None => false,
            Some(_) if attacker == Some(edx) => true,
            Some(e) => e.pos.distance(slots[i]) <= tuning.occupancy_distance,
        };
        if !keep {
            log::debug!("Slot {} released by {:?}", i, edx);
            *slot = None;
        }
    }

    // Aggro, seek and hold
    for edx in pool.handles() {
        if attacker == Some(edx) {
            continue;
        }
        let Some(e) = pool.get(edx) else { continue };
        if !e.hostile {
            continue;
        }
        let (pos, aggroed) = (e.pos, e.aggroed);
        let to_player = player_pos - pos;
        if !aggroed {
            if to_player.length() >= tuning.aggro_radius {
                continue;
            }
            log::debug!("{:?} aggroed at distance {:.2}", edx, to_player.length());
        }

        let target = waffle
            .slot_of(edx)
            .or_else(|| waffle.nearest_open(&slots, pos, edx));
        if let Some(i) = target {
            if waffle.slots[i].is_none() && pos.distance(slots[i]) <= tuning.occupancy_distance {
                log::debug!("{:?} claimed slot {}", edx, i);
                waffle.slots[i] = Some(edx);
            }
        }

        if let Some(e) = pool.get_mut(edx) {
            e.aggroed = true;
            e.facing = to_player.normalize_or(e.facing);
            if let Some(i) = target {
                e.vel += (slots[i] - pos).clamp_length_max(1.0) * tuning.pot_accel;
            }
        }
    }

    // Promote the first slotted occupant that can swing
    if waffle.attacker.is_none() {
        for (i, slot) in waffle.slots.iter().enumerate() {
            let Some(edx) = *slot else { continue };
            let Some(e) = pool.get_mut(edx) else { continue };
            let Some(spec) = anim::spec(e.item) else {
                continue;
            };
            let lunge_to = slots[i].lerp(player_pos, tuning.attacker_approach);
            e.swing = anim::begin_swing(spec, player_pos - e.pos, tick);
            e.vel += (lunge_to - e.pos) * tuning.attacker_lunge;
            waffle.attacker = Some(edx);
            log::debug!("{:?} promoted to attacker from slot {}", edx, i);
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::GameState;

    fn setup(pots: &[Vec2]) -> (GameState, Vec<Edx>) {
        let mut state = GameState::new(Tuning::default()).unwrap();
        let handles = pots.iter().map(|&p| state.spawn_pot(p).unwrap()).collect();
        (state, handles)
    }

    fn run(state: &mut GameState) {
        state.tick += 1;
        update(
            &mut state.waffle,
            &mut state.pool,
            state.player,
            &state.tuning,
            state.tick,
        );
    }

    #[test]
    fn test_slot_positions_ring_player() {
        let center = Vec2::new(3.0, -1.0);
        let slots = Waffle::slot_positions(center, 2.0);
        for s in slots {
            assert!((s.distance(center) - 2.0).abs() < 1e-5);
        }
        assert!((slots[0] - Vec2::new(5.0, -1.0)).length() < 1e-5);
        assert!((slots[2] - Vec2::new(3.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_far_pot_stays_dormant() {
        let (mut state, pots) = setup(&[Vec2::new(10.0, 0.0)]);
        for _ in 0..30 {
            run(&mut state);
        }
        let pot = state.pool.get(pots[0]).unwrap();
        assert_eq!(pot.vel, Vec2::ZERO);
        assert_eq!(
            state.waffle.status(&state.pool, pots[0]),
            Some(EncounterStatus::Dormant)
        );
    }

    #[test]
    fn test_near_pot_seeks() {
        let (mut state, pots) = setup(&[Vec2::new(4.0, 0.5)]);
        run(&mut state);
        assert_eq!(
            state.waffle.status(&state.pool, pots[0]),
            Some(EncounterStatus::Seeking)
        );
        assert!(state.pool.get(pots[0]).unwrap().vel.length() > 0.0);
    }

    #[test]
    fn test_pot_on_slot_claims_and_attacks() {
        // Slot 0 sits at (2, 0)
        let (mut state, pots) = setup(&[Vec2::new(2.1, 0.0)]);
        run(&mut state);
        assert_eq!(state.waffle.slots[0], Some(pots[0]));
        assert_eq!(
            state.waffle.status(&state.pool, pots[0]),
            Some(EncounterStatus::Attacking)
        );
        let pot = state.pool.get(pots[0]).unwrap();
        assert!(pot.swing.in_progress(state.tick));
        // Lunge heads toward the player
        assert!(pot.vel.x < 0.0);
    }

    #[test]
    fn test_only_one_attacker() {
        let (mut state, pots) = setup(&[
            Vec2::new(2.0, 0.0),
            Vec2::new(0.0, 2.0),
            Vec2::new(-2.0, 0.0),
            Vec2::new(0.0, -2.0),
        ]);
        run(&mut state);
        let attacking = pots
            .iter()
            .filter(|&&p| state.waffle.status(&state.pool, p) == Some(EncounterStatus::Attacking))
            .count();
        assert_eq!(attacking, 1);
        let slotted = pots
            .iter()
            .filter(|&&p| state.waffle.status(&state.pool, p) == Some(EncounterStatus::Slotted))
            .count();
        assert_eq!(slotted, 3);
    }

    #[test]
    fn test_stale_occupant_released() {
        let (mut state, pots) = setup(&[Vec2::new(2.0, 0.0), Vec2::new(0.0, 2.0)]);
        run(&mut state);
        // pots[0] attacks from slot 0; pots[1] holds slot 2
        assert_eq!(state.waffle.slots[2], Some(pots[1]));
        state.pool.get_mut(pots[1]).unwrap().pos = Vec2::new(0.0, 4.5);
        run(&mut state);
        assert_eq!(state.waffle.slots[2], None);
        assert_eq!(
            state.waffle.status(&state.pool, pots[1]),
            Some(EncounterStatus::Seeking)
        );
    }

    #[test]
    fn test_freed_attacker_is_cleared() {
        let (mut state, pots) = setup(&[Vec2::new(2.0, 0.0)]);
        run(&mut state);
        assert_eq!(state.waffle.attacker, Some(pots[0]));
        state.pool.free(pots[0]);
        run(&mut state);
        assert_eq!(state.waffle.attacker, None);
        assert_eq!(state.waffle.slots[0], None);
    }

    #[test]
    fn test_dead_player_resets_encounter() {
        let (mut state, pots) = setup(&[Vec2::new(2.0, 0.0)]);
        run(&mut state);
        assert!(state.waffle.is_engaged());
        state.pool.free(state.player);
        run(&mut state);
        assert!(!state.waffle.is_engaged());
        assert_eq!(
            state.waffle.status(&state.pool, pots[0]),
            Some(EncounterStatus::Dormant)
        );
    }
}
