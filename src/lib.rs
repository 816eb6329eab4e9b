//! Pot Waffle - a small real-time 2D action game simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entity pool, raymarching, combat, waffle scheduler)
//! - `platform`: Input event translation
//! - `map`: Static terrain provider
//! - `renderer`: Geometry batches handed to an external renderer
//! - `tuning`: Data-driven game balance

pub mod error;
pub mod game;
pub mod map;
pub mod platform;
pub mod renderer;
pub mod sim;
pub mod tuning;

pub use error::Error;
pub use game::Game;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (60 Hz)
    pub const TICK_MS: f64 = 1000.0 / 60.0;

    /// Entity pool capacity
    pub const MAX_ENTITIES: usize = 256;

    /// Raymarch iteration budget
    pub const RAYMARCH_STEPS: usize = 5;
    /// Field distance that counts as a surface hit
    pub const RAYMARCH_EPSILON: f32 = 0.01;

    /// Number of angular attack slots around the player
    pub const WAFFLE_SLOTS: usize = 8;

    /// World units per half-viewport (horizontal)
    pub const WORLD_SCALE: f32 = 11.8;

    /// Damage label pool size
    pub const MAX_DAMAGE_LABELS: usize = 8;

    /// Collision radii
    pub const PLAYER_RADIUS: f32 = 0.5;
    pub const POT_RADIUS: f32 = 0.5;
    pub const ARROW_RADIUS: f32 = 0.1;

    /// Starting hit points
    pub const PLAYER_HP: u32 = 5;
    pub const POT_HP: u32 = 3;

    /// Speeds below this are snapped to rest after friction
    pub const REST_SPEED: f32 = 1.0e-4;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Interpolate between two angles along the shortest arc
#[inline]
pub fn lerp_angle(from: f32, to: f32, t: f32) -> f32 {
    from + normalize_angle(to - from) * t
}

/// Unit vector pointing at `theta`
#[inline]
pub fn angle_vec(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}

/// Angle of a direction vector
#[inline]
pub fn vec_angle(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

/// Rotate `v` counter-clockwise by `theta`
#[inline]
pub fn rotate(v: Vec2, theta: f32) -> Vec2 {
    angle_vec(theta).rotate(v)
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_lerp_angle_takes_short_way() {
        // 170° -> -170° should pass through 180°, not 0°
        let from = 170.0_f32.to_radians();
        let to = -170.0_f32.to_radians();
        let mid = normalize_angle(lerp_angle(from, to, 0.5));
        assert!((mid.abs() - PI).abs() < 0.001);
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let v = rotate(Vec2::X, PI / 2.0);
        assert!(v.x.abs() < 1e-6);
        assert!((v.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_angle_range() {
        for a in [-7.0, -PI, 0.0, PI, 7.0, 100.0] {
            let n = normalize_angle(a);
            assert!((-PI..PI).contains(&n), "{a} -> {n}");
        }
    }
}
