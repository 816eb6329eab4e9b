//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically. One call to
//! [`tick`] runs every system once, in a fixed order: camera, player input,
//! encounter scheduler, item triggering, then motion.

use glam::Vec2;

use super::anim;
use super::combat::{self, apply_damage};
use super::entity::Item;
use super::pool::Edx;
use super::sdf;
use super::state::GameState;
use super::waffle;
use crate::consts::{REST_SPEED, TICK_MS};

/// Gap below which a mover counts as touching what it is heading into
const CONTACT_GAP: f32 = 1.0e-3;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Held movement keys, not yet normalized
    pub move_dir: Vec2,
    /// World point clicked this tick; starts a swing toward it
    pub aim_at: Option<Vec2>,
    /// Item picked this tick
    pub select: Option<Item>,
    /// Bring the player back if dead
    pub respawn: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    state.tick += 1;

    update_camera(state);
    apply_input(state, input);
    waffle::update(
        &mut state.waffle,
        &mut state.pool,
        state.player,
        &state.tuning,
        state.tick,
    );
    combat::trigger_items(state);
    integrate(state);
}

/// Ease the camera toward a point just above the player
fn update_camera(state: &mut GameState) {
    let Some(player) = state.player() else { return };
    let target = player.pos + Vec2::new(0.0, state.tuning.camera_lead);
    state.camera += (target - state.camera) * state.tuning.camera_smoothing;
}

fn apply_input(state: &mut GameState, input: &TickInput) {
    if input.respawn && state.player().is_none() {
        let at = state.camera - Vec2::new(0.0, state.tuning.camera_lead);
        if let Err(err) = state.respawn_player(at) {
            log::warn!("Respawn rejected: {}", err);
        }
    }

    let tick = state.tick;
    let tuning = &state.tuning;
    let Some(player) = state.pool.get_mut(state.player) else {
        return;
    };

    if let Some(item) = input.select {
        if player.swing.in_progress(tick) {
            log::debug!("Ignoring switch to {:?} mid-swing", item);
        } else if player.item != item {
            log::debug!("Player switched to {:?}", item);
            player.item = item;
        }
    }

    if let Some(target) = input.aim_at {
        let dir = (target - player.pos).normalize_or(player.facing);
        if !player.swing.in_progress(tick) {
            player.facing = dir;
            if let Some(spec) = anim::spec(player.item) {
                player.swing = anim::begin_swing(spec, dir, tick);
            }
        }
    }

    let Some(dir) = input.move_dir.try_normalize() else {
        return;
    };
    // Full speed along the aim, easing down to the backpedal factor against it
    let along = (dir.dot(player.aim(tick)) + 1.0) * 0.5;
    let factor = tuning.backpedal_factor + (1.0 - tuning.backpedal_factor) * along;
    player.vel += dir * tuning.player_accel * factor;
}

/// Move every entity along its velocity, resolving collisions by raymarch
fn integrate(state: &mut GameState) {
    let tick = state.tick;
    for edx in state.pool.handles() {
        let Some(e) = state.pool.get(edx) else { continue };

        if e.despawn_tick.is_some_and(|t| tick >= t) {
            log::debug!("{:?} expired", edx);
            state.pool.free(edx);
            continue;
        }
        if e.vel == Vec2::ZERO {
            continue;
        }

        let (pos, vel, radius, hits, pointy) = (e.pos, e.vel, e.radius, e.hits, e.pointy);
        let speed = vel.length();
        let dir = vel / speed;

        let mut next_vel = vel;
        let step = match sdf::raymarch(&state.pool, pos, dir, Some(edx), hits) {
            None => speed,
            Some(hit) if hit.dist - radius <= CONTACT_GAP => {
                if pointy {
                    strike(state, edx, hit.edx);
                    continue;
                }
                let normal = sdf::field_normal(&state.pool, pos, Some(edx), hits);
                if vel.dot(normal) < 0.0 {
                    next_vel = sdf::reflect(vel, normal);
                    0.0
                } else {
                    speed
                }
            }
            Some(hit) => speed.min(hit.dist - radius),
        };

        let Some(e) = state.pool.get_mut(edx) else { continue };
        e.pos += dir * step;
        e.vel = next_vel * e.friction.unwrap_or(state.tuning.friction);
        if e.vel.length() < REST_SPEED {
            e.vel = Vec2::ZERO;
        }
    }
}

/// A pointy mover ran into `target`: hurt it and despawn
fn strike(state: &mut GameState, projectile: Edx, target: Edx) {
    let outcome = apply_damage(
        &mut state.pool,
        &mut state.labels,
        &state.tuning,
        state.tick,
        target,
        state.tuning.arrow_damage,
    );
    log::debug!("{:?} struck {:?}: {:?}", projectile, target, outcome);
    state.pool.free(projectile);
}

/// Wall-clock accumulator that converts frame time into whole ticks
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FixedStep {
    pub accumulator_ms: f64,
}

impl FixedStep {
    /// Add `elapsed_ms` and return how many ticks are now due. The remainder
    /// carries over to the next frame.
    pub fn advance(&mut self, elapsed_ms: f64) -> u32 {
        self.accumulator_ms += elapsed_ms.max(0.0);
        let mut due = 0;
        while self.accumulator_ms >= TICK_MS {
            self.accumulator_ms -= TICK_MS;
            due += 1;
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::Mask;
    use crate::tuning::Tuning;

    fn fresh() -> GameState {
        GameState::new(Tuning::default()).unwrap()
    }

    fn moving(dir: Vec2) -> TickInput {
        TickInput {
            move_dir: dir,
            ..Default::default()
        }
    }

    #[test]
    fn test_tick_counter_advances() {
        let mut state = fresh();
        tick(&mut state, &TickInput::default());
        tick(&mut state, &TickInput::default());
        assert_eq!(state.tick, 2);
    }

    #[test]
    fn test_move_input_accelerates_player() {
        let mut state = fresh();
        tick(&mut state, &moving(Vec2::new(3.0, 0.0)));
        let p = state.player().unwrap();
        assert!(p.pos.x > 0.0);
        assert!(p.vel.x > 0.0 && p.vel.y == 0.0);
    }

    #[test]
    fn test_backpedal_is_slower() {
        let mut forward = fresh();
        let mut back = fresh();
        tick(&mut forward, &moving(Vec2::X));
        tick(&mut back, &moving(Vec2::NEG_X));
        let f = forward.player().unwrap().vel.length();
        let b = back.player().unwrap().vel.length();
        assert!((b / f - Tuning::default().backpedal_factor).abs() < 1e-4);
    }

    #[test]
    fn test_friction_brings_player_to_rest() {
        let mut state = fresh();
        tick(&mut state, &moving(Vec2::Y));
        for _ in 0..400 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.player().unwrap().vel, Vec2::ZERO);
    }

    #[test]
    fn test_mover_stops_at_terrain() {
        let mut state = fresh();
        state.spawn_terrain(Vec2::new(3.0, 0.0), 1.0).unwrap();
        let player = state.player;
        {
            let p = state.pool.get_mut(player).unwrap();
            p.vel = Vec2::new(0.4, 0.0);
            p.friction = Some(1.0);
        }
        for _ in 0..20 {
            tick(&mut state, &TickInput::default());
            let p = state.pool.get(player).unwrap();
            // Never sinks into the rock
            assert!(p.pos.x <= 1.5 + 1e-3, "{}", p.pos.x);
        }
        // Bounced back off the surface
        assert!(state.pool.get(player).unwrap().vel.x < 0.0);
    }

    #[test]
    fn test_arrow_expires() {
        let mut state = fresh();
        let arrow = state
            .spawn_arrow(Vec2::new(0.0, 5.0), Vec2::new(0.0, 0.13), Mask::TERRAIN)
            .unwrap();
        let lifetime = state.tuning.arrow_lifetime_ticks;
        for _ in 0..lifetime - 1 {
            tick(&mut state, &TickInput::default());
        }
        assert!(state.pool.get(arrow).is_some());
        tick(&mut state, &TickInput::default());
        assert!(state.pool.get(arrow).is_none());
    }

    #[test]
    fn test_click_starts_swing_and_faces_target() {
        let mut state = fresh();
        let input = TickInput {
            aim_at: Some(Vec2::new(0.0, -4.0)),
            ..Default::default()
        };
        tick(&mut state, &input);
        let p = state.player().unwrap();
        assert!(p.swing.in_progress(state.tick));
        assert!((p.facing - Vec2::NEG_Y).length() < 1e-6);
    }

    #[test]
    fn test_select_item() {
        let mut state = fresh();
        let input = TickInput {
            select: Some(Item::Bow),
            ..Default::default()
        };
        tick(&mut state, &input);
        assert_eq!(state.player().unwrap().item, Item::Bow);
    }

    #[test]
    fn test_respawn_only_when_dead() {
        let mut state = fresh();
        let first = state.player;
        let respawn = TickInput {
            respawn: true,
            ..Default::default()
        };
        tick(&mut state, &respawn);
        assert_eq!(state.player, first);

        state.pool.free(first);
        tick(&mut state, &TickInput::default());
        assert!(state.player().is_none());
        tick(&mut state, &respawn);
        assert_ne!(state.player, first);
        assert!(state.player().is_some());
    }

    #[test]
    fn test_fixed_step_carries_remainder() {
        let mut clock = FixedStep::default();
        assert_eq!(clock.advance(10.0), 0);
        assert_eq!(clock.advance(10.0), 1);
        assert!((clock.accumulator_ms - (20.0 - TICK_MS)).abs() < 1e-9);
        assert_eq!(clock.advance(TICK_MS * 3.0), 3);
        assert_eq!(clock.advance(-5.0), 0);
    }

    #[test]
    fn test_determinism() {
        let mut a = fresh();
        let mut b = fresh();
        for s in [&mut a, &mut b] {
            s.spawn_pot(Vec2::new(3.0, 1.0)).unwrap();
            s.spawn_terrain(Vec2::new(-2.0, -2.0), 1.0).unwrap();
        }
        let inputs = [
            moving(Vec2::new(1.0, 1.0)),
            TickInput {
                aim_at: Some(Vec2::new(3.0, 1.0)),
                ..Default::default()
            },
            TickInput::default(),
        ];
        for i in 0..180 {
            let input = &inputs[i % inputs.len()];
            tick(&mut a, input);
            tick(&mut b, input);
        }
        let snap = |s: &GameState| -> Vec<(Edx, Vec2, Vec2)> {
            s.pool.iter().map(|(h, e)| (h, e.pos, e.vel)).collect()
        };
        assert_eq!(snap(&a), snap(&b));
    }
}
