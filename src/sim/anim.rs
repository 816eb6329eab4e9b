//! Item poses and swing keyframes
//!
//! A swing is a short list of keyframes, each owning a share of the swing's
//! duration. Poses are expressed in the holder's facing frame: `pos.x` points
//! along the facing direction, `rot` is added to the facing angle.

use glam::Vec2;

use super::entity::{Item, Swing};
use crate::{angle_vec, lerp_angle, rotate, vec_angle};

/// Weapon placement relative to its holder
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub pos: Vec2,
    pub rot: f32,
}

impl Pose {
    pub const fn new(x: f32, y: f32, rot: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            rot,
        }
    }

    /// World-space pivot and pointing direction for a holder at `origin`
    /// aiming along `aim`
    pub fn place(&self, origin: Vec2, aim: Vec2) -> (Vec2, Vec2) {
        let facing = vec_angle(aim);
        (origin + rotate(self.pos, facing), angle_vec(facing + self.rot))
    }
}

/// One timed pose target
#[derive(Debug, Clone, Copy)]
pub struct Keyframe {
    /// Fraction of the total swing duration
    pub dur: f32,
    /// Rotation target, if this keyframe rotates
    pub rot: Option<f32>,
    /// Position target, if this keyframe moves the item
    pub pos: Option<Vec2>,
    /// Damage / release window
    pub instant: bool,
}

impl Keyframe {
    const fn to(dur: f32, x: f32, y: f32, rot: f32) -> Self {
        Self {
            dur,
            rot: Some(rot),
            pos: Some(Vec2::new(x, y)),
            instant: false,
        }
    }

    const fn hold(dur: f32) -> Self {
        Self {
            dur,
            rot: None,
            pos: None,
            instant: false,
        }
    }

    const fn instant(mut self) -> Self {
        self.instant = true;
        self
    }
}

/// Per-item behavior table
#[derive(Debug)]
pub struct ItemSpec {
    pub item: Item,
    /// Swing length in ticks
    pub swing_ticks: u64,
    /// Spawns a projectile on the instant window
    pub shoots: bool,
    /// Raymarches for melee hits on the instant window
    pub melee: bool,
    /// Distance from the item's pivot to its tip
    pub reach: f32,
    pub rest: Pose,
    pub keyframes: &'static [Keyframe],
}

// Durations are 5, 5.3, 2, 5.7 and 5 parts of 23.
static SWORD_KEYS: [Keyframe; 5] = [
    Keyframe::to(0.2174, 0.20, 0.45, 1.9),
    Keyframe::to(0.2304, 0.35, 0.20, 0.5),
    Keyframe::to(0.0870, 0.40, -0.15, -0.5).instant(),
    Keyframe::to(0.2478, 0.25, -0.45, -1.6),
    Keyframe::to(0.2174, 0.30, -0.30, 0.4),
];

static BOW_KEYS: [Keyframe; 4] = [
    Keyframe::to(0.5, 0.25, 0.0, 0.0),
    Keyframe::hold(0.3),
    Keyframe::to(0.1, 0.45, 0.0, 0.0).instant(),
    Keyframe::to(0.1, 0.35, -0.2, 0.0),
];

static SWORD: ItemSpec = ItemSpec {
    item: Item::Sword,
    swing_ticks: 30,
    shoots: false,
    melee: true,
    reach: 0.7,
    rest: Pose::new(0.30, -0.30, 0.4),
    keyframes: &SWORD_KEYS,
};

static BOW: ItemSpec = ItemSpec {
    item: Item::Bow,
    swing_ticks: 40,
    shoots: true,
    melee: false,
    reach: 0.5,
    rest: Pose::new(0.35, -0.20, 0.0),
    keyframes: &BOW_KEYS,
};

/// Behavior table for a held item
pub fn spec(item: Item) -> Option<&'static ItemSpec> {
    match item {
        Item::None => None,
        Item::Sword => Some(&SWORD),
        Item::Bow => Some(&BOW),
    }
}

/// Idle pose: breathing plus a jog bob that scales with speed
pub fn rest_pose(spec: &ItemSpec, tick: u64, speed: f32) -> Pose {
    let t = tick as f32;
    let breath = (t / 40.0).sin() * 0.02;
    let jog = (t / 5.0).sin() * speed.min(0.2) * 0.6;
    Pose {
        pos: spec.rest.pos + Vec2::new(jog * 0.5, breath + jog),
        rot: spec.rest.rot + (t / 60.0).sin() * 0.04 + jog * 0.5,
    }
}

/// Which keyframe is running at `progress` (in `[0, 1]`), and how far into it
pub fn active_keyframe(keys: &[Keyframe], progress: f32) -> Option<(usize, f32)> {
    let last = keys.len().checked_sub(1)?;
    let mut cursor = progress.max(0.0);
    for (i, kf) in keys.iter().enumerate() {
        if cursor < kf.dur || i == last {
            let local = if kf.dur > 0.0 {
                (cursor / kf.dur).min(1.0)
            } else {
                1.0
            };
            return Some((i, local));
        }
        cursor -= kf.dur;
    }
    None
}

/// Item transform for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemPose {
    pub pose: Pose,
    /// Inside the damage / release window this tick
    pub instant: bool,
    pub swinging: bool,
}

/// Fraction of the swing elapsed at `tick`, or `None` outside a swing
pub fn swing_progress(spec: &ItemSpec, swing: &Swing, tick: u64) -> Option<f32> {
    if !swing.in_progress(tick) || spec.swing_ticks == 0 {
        return None;
    }
    let remaining = (swing.end_tick - tick).min(spec.swing_ticks) as f32;
    Some(1.0 - remaining / spec.swing_ticks as f32)
}

/// Compute the held item's pose at `tick`
pub fn item_pose(spec: &ItemSpec, swing: &Swing, tick: u64, speed: f32) -> ItemPose {
    let mut pose = rest_pose(spec, tick, speed);
    let Some(progress) = swing_progress(spec, swing, tick) else {
        return ItemPose {
            pose,
            instant: false,
            swinging: false,
        };
    };
    let Some((active, local)) = active_keyframe(spec.keyframes, progress) else {
        return ItemPose {
            pose,
            instant: false,
            swinging: true,
        };
    };

    // Completed keyframes land exactly on their targets
    for kf in &spec.keyframes[..active] {
        if let Some(rot) = kf.rot {
            pose.rot = rot;
        }
        if let Some(pos) = kf.pos {
            pose.pos = pos;
        }
    }
    let kf = &spec.keyframes[active];
    if let Some(rot) = kf.rot {
        pose.rot = lerp_angle(pose.rot, rot, local);
    }
    if let Some(pos) = kf.pos {
        pose.pos = pose.pos.lerp(pos, local);
    }

    ItemPose {
        pose,
        instant: kf.instant,
        swinging: true,
    }
}

/// Start a swing aimed along `dir`
pub fn begin_swing(spec: &ItemSpec, dir: Vec2, tick: u64) -> Swing {
    Swing {
        end_tick: tick + spec.swing_ticks,
        dir: dir.normalize_or(Vec2::X),
        fired: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn all_specs() -> [&'static ItemSpec; 2] {
        [spec(Item::Sword).unwrap(), spec(Item::Bow).unwrap()]
    }

    #[test]
    fn test_keyframe_durations_sum_to_one() {
        for spec in all_specs() {
            let sum: f32 = spec.keyframes.iter().map(|k| k.dur).sum();
            assert!((sum - 1.0).abs() < 1e-3, "{:?} sums to {sum}", spec.item);
        }
    }

    #[test]
    fn test_exactly_one_instant_keyframe() {
        for spec in all_specs() {
            let n = spec.keyframes.iter().filter(|k| k.instant).count();
            assert_eq!(n, 1, "{:?}", spec.item);
        }
    }

    #[test]
    fn test_sword_pulse_window_is_third_keyframe() {
        let keys = spec(Item::Sword).unwrap().keyframes;
        let start = keys[0].dur + keys[1].dur;
        let end = start + keys[2].dur;
        assert_eq!(active_keyframe(keys, start - 0.001).unwrap().0, 1);
        assert_eq!(active_keyframe(keys, start + 0.001).unwrap().0, 2);
        assert_eq!(active_keyframe(keys, end - 0.001).unwrap().0, 2);
        assert_eq!(active_keyframe(keys, end + 0.001).unwrap().0, 3);
    }

    #[test]
    fn test_one_pulse_per_swing() {
        for spec in all_specs() {
            let mut swing = begin_swing(spec, Vec2::X, 100);
            let mut pulses = 0;
            for tick in 100..100 + spec.swing_ticks + 5 {
                let pose = item_pose(spec, &swing, tick, 0.0);
                if pose.instant && !swing.fired {
                    swing.fired = true;
                    pulses += 1;
                }
            }
            assert_eq!(pulses, 1, "{:?}", spec.item);
        }
    }

    #[test]
    fn test_idle_outside_swing() {
        let spec = spec(Item::Sword).unwrap();
        let swing = begin_swing(spec, Vec2::X, 0);
        let pose = item_pose(spec, &swing, spec.swing_ticks, 0.0);
        assert!(!pose.swinging);
        assert!(!pose.instant);
    }

    #[test]
    fn test_place_follows_aim() {
        let pose = Pose::new(1.0, 0.0, 0.0);
        let (pivot, dir) = pose.place(Vec2::new(5.0, 5.0), Vec2::Y);
        assert!((pivot - Vec2::new(5.0, 6.0)).length() < 1e-5);
        assert!((dir - Vec2::Y).length() < 1e-5);
    }

    #[test]
    fn test_rest_pose_jogs_with_speed() {
        let spec = spec(Item::Sword).unwrap();
        let still = rest_pose(spec, 8, 0.0);
        let running = rest_pose(spec, 8, 0.15);
        assert!((still.pos - running.pos).length() > 0.01);
    }

    proptest! {
        #[test]
        fn prop_active_keyframe_covers_unit_interval(progress in 0.0001f32..=1.0) {
            for spec in all_specs() {
                let (i, local) = active_keyframe(spec.keyframes, progress).unwrap();
                prop_assert!(i < spec.keyframes.len());
                prop_assert!((0.0..=1.0).contains(&local));
                let start: f32 = spec.keyframes[..i].iter().map(|k| k.dur).sum();
                let end = start + spec.keyframes[i].dur;
                prop_assert!(progress >= start - 1e-4);
                prop_assert!(progress <= end + 1e-3 || i == spec.keyframes.len() - 1);
            }
        }
    }
}
