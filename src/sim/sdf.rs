//! SDF-based collision detection
//!
//! The pool's collision spheres form one signed distance field per mask.
//! Raymarching that field answers both "how far can I move" and "what does
//! this swing or arrow run into".

use glam::Vec2;

use super::entity::Mask;
use super::pool::{Edx, Pool};
use crate::consts::{RAYMARCH_EPSILON, RAYMARCH_STEPS};

/// Signed distance to a circle
#[inline]
pub fn sd_circle(p: Vec2, center: Vec2, radius: f32) -> f32 {
    (p - center).length() - radius
}

/// Nearest surface among entities matching `mask`, skipping `exclude`
///
/// Returns `None` when nothing matches, i.e. the field is +infinity.
pub fn field(pool: &Pool, p: Vec2, exclude: Option<Edx>, mask: Mask) -> Option<(f32, Edx)> {
    let mut nearest: Option<(f32, Edx)> = None;
    for (edx, e) in pool.iter() {
        if Some(edx) == exclude || !e.is.intersects(mask) {
            continue;
        }
        let d = sd_circle(p, e.pos, e.radius);
        if nearest.is_none_or(|(best, _)| d < best) {
            nearest = Some((d, edx));
        }
    }
    nearest
}

/// Compute SDF gradient (surface normal) using central differences
pub fn sdf_gradient<F>(p: Vec2, sdf: F) -> Vec2
where
    F: Fn(Vec2) -> f32,
{
    let eps = 1.0e-3;
    let dx = sdf(p + Vec2::new(eps, 0.0)) - sdf(p - Vec2::new(eps, 0.0));
    let dy = sdf(p + Vec2::new(0.0, eps)) - sdf(p - Vec2::new(0.0, eps));
    Vec2::new(dx, dy).normalize_or_zero()
}

/// Outward normal of the field at `p`
pub fn field_normal(pool: &Pool, p: Vec2, exclude: Option<Edx>, mask: Mask) -> Vec2 {
    sdf_gradient(p, |q| {
        field(pool, q, exclude, mask).map_or(f32::INFINITY, |(d, _)| d)
    })
}

/// Result of a raymarch that found something to march against
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance travelled along the ray
    pub dist: f32,
    /// Nearest entity at the final sample point
    pub edx: Edx,
    /// Whether the march converged onto a surface
    pub contact: bool,
}

/// Sphere-trace from `origin` along unit `dir`
///
/// Runs at most `RAYMARCH_STEPS` steps. Each step advances by the field value,
/// so the reported distance never passes a surface. If the budget runs out
/// before converging, the distance reached so far is returned as a
/// conservative bound. `None` means no entity matches `mask` at all.
pub fn raymarch(
    pool: &Pool,
    origin: Vec2,
    dir: Vec2,
    exclude: Option<Edx>,
    mask: Mask,
) -> Option<RayHit> {
    let mut t = 0.0;
    let mut last = None;
    for _ in 0..RAYMARCH_STEPS {
        let (d, edx) = field(pool, origin + dir * t, exclude, mask)?;
        if d < RAYMARCH_EPSILON {
            return Some(RayHit {
                dist: t,
                edx,
                contact: true,
            });
        }
        last = Some(edx);
        t += d;
    }
    last.map(|edx| RayHit {
        dist: t,
        edx,
        contact: false,
    })
}

/// Reflect velocity off a surface with given normal
#[inline]
pub fn reflect(vel: Vec2, normal: Vec2) -> Vec2 {
    vel - 2.0 * vel.dot(normal) * normal
}
