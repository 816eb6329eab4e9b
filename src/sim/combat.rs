//! Damage, knockback and item triggering

use glam::Vec2;

use super::anim;
use super::labels::DamageLabels;
use super::pool::{Edx, Pool};
use super::sdf;
use super::state::GameState;
use crate::consts::ARROW_RADIUS;
use crate::tuning::Tuning;

/// What happened to a damage attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Stale handle, invulnerable target, or still cooling down
    Ignored,
    Wounded,
    /// Hit points ran out and the entity was freed
    Killed,
}

/// Deal `amount` to `target`, honoring the per-target damage cooldown
pub fn apply_damage(
    pool: &mut Pool,
    labels: &mut DamageLabels,
    tuning: &Tuning,
    tick: u64,
    target: Edx,
    amount: u32,
) -> DamageOutcome {
    let Some(e) = pool.get_mut(target) else {
        return DamageOutcome::Ignored;
    };
    if !e.mortal() {
        return DamageOutcome::Ignored;
    }
    if let Some(last) = e.last_hit {
        if tick.saturating_sub(last) < tuning.damage_cooldown_ticks {
            return DamageOutcome::Ignored;
        }
    }

    e.hp = e.hp.saturating_sub(amount);
    e.last_hit = Some(tick);
    let (pos, hp) = (e.pos, e.hp);
    labels.record(target, pos, amount, tick, tuning.label_lifetime_ticks);

    if hp == 0 {
        pool.free(target);
        log::debug!("{:?} killed", target);
        DamageOutcome::Killed
    } else {
        log::debug!("{:?} took {} damage, {} hp left", target, amount, hp);
        DamageOutcome::Wounded
    }
}

/// Push two entities apart along the line between them
fn knockback(pool: &mut Pool, striker: Edx, target: Edx, fallback: Vec2, impulse: f32) {
    if let Some((s, t)) = pool.pair_mut(striker, target) {
        let normal = (t.pos - s.pos).normalize_or(fallback);
        t.vel += normal * impulse;
        s.vel -= normal * impulse;
    }
}

/// Fire instant-window effects for every entity holding an item
///
/// Projectiles spawn on the first tick of the window. Melee raymarches every
/// tick of the window until it connects. Either way a swing delivers at most
/// once.
pub fn trigger_items(state: &mut GameState) {
    let tick = state.tick;
    for edx in state.pool.handles() {
        let Some(e) = state.pool.get(edx) else { continue };
        let Some(spec) = anim::spec(e.item) else {
            continue;
        };
        if e.swing.fired {
            continue;
        }
        let pose = anim::item_pose(spec, &e.swing, tick, e.vel.length());
        if !pose.instant {
            continue;
        }
        let aim = e.aim(tick);
        let (origin, radius, item_hits) = (e.pos, e.radius, e.item_hits);

        if spec.shoots {
            let spawn_at = origin + aim * (radius + ARROW_RADIUS);
            let vel = aim * state.tuning.arrow_speed;
            let hits = item_hits | super::entity::Mask::TERRAIN;
            match state.spawn_arrow(spawn_at, vel, hits) {
                Ok(arrow) => log::debug!("{:?} loosed arrow {:?}", edx, arrow),
                Err(err) => log::warn!("Arrow from {:?} rejected: {}", edx, err),
            }
            if let Some(e) = state.pool.get_mut(edx) {
                e.vel -= aim * state.tuning.arrow_recoil;
                e.swing.fired = true;
            }
        }

        if spec.melee {
            let (pivot, dir) = pose.pose.place(origin, aim);
            let tip = pivot + dir * spec.reach;
            let Some(hit) = sdf::raymarch(&state.pool, tip, dir, Some(edx), item_hits) else {
                continue;
            };
            if !hit.contact || hit.dist > state.tuning.melee_range {
                continue;
            }
            if let Some(e) = state.pool.get_mut(edx) {
                e.swing.fired = true;
            }
            knockback(&mut state.pool, edx, hit.edx, aim, state.tuning.knockback);
            apply_damage(
                &mut state.pool,
                &mut state.labels,
                &state.tuning,
                tick,
                hit.edx,
                state.tuning.melee_damage,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::Item;

    fn state_with_pot(at: Vec2) -> (GameState, Edx) {
        let mut state = GameState::new(Tuning::default()).unwrap();
        let pot = state.spawn_pot(at).unwrap();
        // Keep the scheduler out of it
        state.pool.get_mut(pot).unwrap().hostile = false;
        (state, pot)
    }

    #[test]
    fn test_damage_cooldown() {
        let (mut state, pot) = state_with_pot(Vec2::new(5.0, 0.0));
        let t = Tuning::default();
        let out = apply_damage(&mut state.pool, &mut state.labels, &t, 10, pot, 1);
        assert_eq!(out, DamageOutcome::Wounded);
        let out = apply_damage(&mut state.pool, &mut state.labels, &t, 14, pot, 1);
        assert_eq!(out, DamageOutcome::Ignored);
        let out = apply_damage(&mut state.pool, &mut state.labels, &t, 15, pot, 1);
        assert_eq!(out, DamageOutcome::Wounded);
        assert_eq!(state.pool.get(pot).unwrap().hp, 1);
    }

    #[test]
    fn test_lethal_damage_frees() {
        let (mut state, pot) = state_with_pot(Vec2::new(5.0, 0.0));
        let t = Tuning::default();
        let out = apply_damage(&mut state.pool, &mut state.labels, &t, 1, pot, 10);
        assert_eq!(out, DamageOutcome::Killed);
        assert!(state.pool.get(pot).is_none());
        assert_eq!(state.labels.live(1, 60).count(), 1);
    }

    #[test]
    fn test_terrain_is_invulnerable() {
        let mut state = GameState::new(Tuning::default()).unwrap();
        let rock = state.spawn_terrain(Vec2::new(3.0, 0.0), 1.0).unwrap();
        let t = Tuning::default();
        let out = apply_damage(&mut state.pool, &mut state.labels, &t, 1, rock, 1);
        assert_eq!(out, DamageOutcome::Ignored);
        assert!(state.pool.get(rock).is_some());
    }

    #[test]
    fn test_bow_release_spawns_one_arrow() {
        let mut state = GameState::new(Tuning::default()).unwrap();
        let player = state.player;
        let spec = anim::spec(Item::Bow).unwrap();
        {
            let p = state.pool.get_mut(player).unwrap();
            p.item = Item::Bow;
            p.swing = anim::begin_swing(spec, Vec2::Y, 0);
        }
        for tick in 0..spec.swing_ticks {
            state.tick = tick;
            trigger_items(&mut state);
        }
        let arrows: Vec<_> = state
            .pool
            .iter()
            .filter(|(_, e)| e.pointy)
            .map(|(_, e)| e.clone())
            .collect();
        assert_eq!(arrows.len(), 1);
        assert!((arrows[0].vel - Vec2::Y * 0.13).length() < 1e-6);
        assert_eq!(arrows[0].friction, Some(1.0));
        // Recoil pushed the archer backwards
        assert!(state.pool.get(player).unwrap().vel.y < 0.0);
    }

    #[test]
    fn test_sword_hits_once_per_swing() {
        let (mut state, pot) = state_with_pot(Vec2::new(1.0, 0.0));
        let player = state.player;
        let spec = anim::spec(Item::Sword).unwrap();
        state.pool.get_mut(player).unwrap().swing = anim::begin_swing(spec, Vec2::X, 0);
        for tick in 0..spec.swing_ticks {
            state.tick = tick;
            trigger_items(&mut state);
        }
        let pot = state.pool.get(pot).unwrap();
        assert_eq!(pot.hp, 2);
        // Knocked away from the player
        assert!(pot.vel.x > 0.0);
    }
}
