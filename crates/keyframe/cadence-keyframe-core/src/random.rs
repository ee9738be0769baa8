//! Deterministic per-keyframe randomization.
//!
//! Samples are a pure function of the context seed, the keyframe identity and
//! the resample bucket, so evaluating the same time twice gives the same value.
//!
//! Parameter slots per mode:
//!
//! | mode            | slot 0       | slot 1       | slot 2   | slot 3    |
//! |-----------------|--------------|--------------|----------|-----------|
//! | `Independent`   | x bound      | y bound      | interval |           |
//! | `Paired`        | x bound      | y bound      | interval |           |
//! | `Scale`         | min factor   | max factor   | interval |           |
//! | `HomingStatic`  | strength 0-1 | max offset   |          | axis mask |
//! | `HomingDynamic` | strength 0-1 | max offset   | interval | axis mask |
//!
//! An interval of 0 samples once per keyframe. A max offset of 0 is unbounded.
//! Axis mask bit `i` enables axis `i`; a mask of 0 enables every axis.

use crate::ids;
use crate::keyframe::{EventKeyframe, RandomMode};

/// Inputs to evaluation beyond the sequence itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvalContext {
    /// Per-object seed mixed into every sample.
    pub seed: u64,
    /// Reference point for homing modes, in channel space.
    pub target: Option<Vec<f32>>,
}

impl EvalContext {
    pub fn with_seed(seed: u64) -> Self {
        Self { seed, target: None }
    }

    pub fn with_target(mut self, target: impl Into<Vec<f32>>) -> Self {
        self.target = Some(target.into());
        self
    }
}

/// Number of leading axes affected by the jitter modes.
const JITTER_AXES: usize = 2;

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}

struct Sampler {
    state: u64,
}

impl Sampler {
    fn new(ctx: &EvalContext, kf: &EventKeyframe, bucket: u64) -> Self {
        let state = splitmix64(ctx.seed ^ ids::seed_of(&kf.id)) ^ splitmix64(bucket);
        Self { state }
    }

    /// Uniform sample in `[0, 1)`.
    fn next_unit(&mut self) -> f32 {
        self.state = splitmix64(self.state);
        (self.state >> 40) as f32 / (1u64 << 24) as f32
    }
}

fn bucket(kf: &EventKeyframe, t: f32, interval: f32) -> u64 {
    if interval > 0.0 && t > kf.time {
        ((t - kf.time) / interval).floor() as u64
    } else {
        0
    }
}

/// Values of `kf` after applying its randomization at time `t`.
pub fn perturb(kf: &EventKeyframe, t: f32, ctx: &EvalContext) -> Vec<f32> {
    let mut values = kf.values.clone();
    let rv = kf.random_values;
    match kf.random_mode {
        RandomMode::None => {}
        RandomMode::Independent => {
            let mut s = Sampler::new(ctx, kf, bucket(kf, t, rv[2]));
            for (i, v) in values.iter_mut().take(JITTER_AXES).enumerate() {
                *v += (rv[i] - *v) * s.next_unit();
            }
        }
        RandomMode::Paired => {
            let u = Sampler::new(ctx, kf, bucket(kf, t, rv[2])).next_unit();
            for (i, v) in values.iter_mut().take(JITTER_AXES).enumerate() {
                *v += (rv[i] - *v) * u;
            }
        }
        RandomMode::Scale => {
            let u = Sampler::new(ctx, kf, bucket(kf, t, rv[2])).next_unit();
            let factor = rv[0] + (rv[1] - rv[0]) * u;
            for v in values.iter_mut() {
                *v *= factor;
            }
        }
        RandomMode::HomingStatic | RandomMode::HomingDynamic => {
            let Some(target) = ctx.target.as_deref() else {
                return values;
            };
            let b = if kf.random_mode == RandomMode::HomingDynamic {
                bucket(kf, t, rv[2])
            } else {
                0
            };
            let pull = rv[0].clamp(0.0, 1.0) * Sampler::new(ctx, kf, b).next_unit();
            let max_offset = rv[1];
            let mask = if rv[3] > 0.0 { rv[3] as u32 } else { u32::MAX };
            for (i, (v, goal)) in values.iter_mut().zip(target).enumerate() {
                if i >= 32 || mask & (1 << i) == 0 {
                    continue;
                }
                let mut delta = (goal - *v) * pull;
                if kf.flee {
                    delta = -delta;
                }
                if max_offset > 0.0 {
                    delta = delta.clamp(-max_offset, max_offset);
                }
                *v += delta;
            }
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kf(mode: RandomMode, rv: [f32; 4]) -> EventKeyframe {
        let mut k = EventKeyframe::new(0.0, vec![0.0, 0.0]).with_random(mode, rv);
        k.id = "fixed-id".into();
        k
    }

    #[test]
    fn none_returns_values_unchanged() {
        let k = kf(RandomMode::None, [5.0, 5.0, 0.0, 0.0]);
        assert_eq!(perturb(&k, 1.0, &EvalContext::default()), vec![0.0, 0.0]);
    }

    #[test]
    fn independent_stays_inside_bounds_and_is_deterministic() {
        let k = kf(RandomMode::Independent, [10.0, -4.0, 0.0, 0.0]);
        let ctx = EvalContext::with_seed(7);
        let a = perturb(&k, 0.5, &ctx);
        assert_eq!(a, perturb(&k, 0.5, &ctx));
        assert!((0.0..=10.0).contains(&a[0]));
        assert!((-4.0..=0.0).contains(&a[1]));
    }

    #[test]
    fn paired_moves_both_axes_by_the_same_fraction() {
        let k = kf(RandomMode::Paired, [10.0, 20.0, 0.0, 0.0]);
        let v = perturb(&k, 0.0, &EvalContext::with_seed(3));
        assert!((v[1] - 2.0 * v[0]).abs() < 1e-4);
    }

    #[test]
    fn scale_multiplies_inside_range() {
        let mut k = kf(RandomMode::Scale, [2.0, 3.0, 0.0, 0.0]);
        k.values = vec![1.0, 2.0];
        let v = perturb(&k, 0.0, &EvalContext::with_seed(11));
        assert!((2.0..=3.0).contains(&v[0]));
        assert!((v[1] - 2.0 * v[0]).abs() < 1e-5);
    }

    #[test]
    fn interval_groups_times_into_buckets() {
        let k = kf(RandomMode::Independent, [100.0, 100.0, 1.0, 0.0]);
        let ctx = EvalContext::with_seed(1);
        assert_eq!(perturb(&k, 0.2, &ctx), perturb(&k, 0.9, &ctx));
    }

    #[test]
    fn homing_needs_a_target_and_flee_reverses_direction() {
        let k = kf(RandomMode::HomingStatic, [1.0, 0.0, 0.0, 0.0]);
        let ctx = EvalContext::with_seed(5);
        assert_eq!(perturb(&k, 0.0, &ctx), vec![0.0, 0.0]);

        let ctx = ctx.with_target(vec![10.0, 10.0]);
        let toward = perturb(&k, 0.0, &ctx);
        let away = perturb(&k.clone().with_flee(true), 0.0, &ctx);
        assert!(toward[0] >= 0.0 && toward[0] <= 10.0);
        assert_eq!(away[0], -toward[0]);
    }

    #[test]
    fn homing_axis_mask_and_max_offset_apply() {
        let k = kf(RandomMode::HomingStatic, [1.0, 0.5, 0.0, 2.0]);
        let ctx = EvalContext::with_seed(9).with_target(vec![10.0, 10.0]);
        let v = perturb(&k, 0.0, &ctx);
        assert_eq!(v[0], 0.0);
        assert!(v[1] <= 0.5);
    }
}
