//! Easing curves applied between two keyframes.
//!
//! Text documents store curves by name (`"InSine"`); older documents used the
//! catalogue index, which is still accepted. Packets store the index as one byte.

use std::f32::consts::PI;
use std::fmt;

/// Named interpolation curve applied when moving into a keyframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EasingKind {
    #[default]
    Linear,
    Instant,
    InSine,
    OutSine,
    InOutSine,
    InElastic,
    OutElastic,
    InOutElastic,
    InBack,
    OutBack,
    InOutBack,
    InBounce,
    OutBounce,
    InOutBounce,
    InQuad,
    OutQuad,
    InOutQuad,
    InCirc,
    OutCirc,
    InOutCirc,
    InExpo,
    OutExpo,
    InOutExpo,
}

impl EasingKind {
    /// Catalogue order; a curve's position is its persisted index.
    pub const ALL: [EasingKind; 23] = [
        Self::Linear,
        Self::Instant,
        Self::InSine,
        Self::OutSine,
        Self::InOutSine,
        Self::InElastic,
        Self::OutElastic,
        Self::InOutElastic,
        Self::InBack,
        Self::OutBack,
        Self::InOutBack,
        Self::InBounce,
        Self::OutBounce,
        Self::InOutBounce,
        Self::InQuad,
        Self::OutQuad,
        Self::InOutQuad,
        Self::InCirc,
        Self::OutCirc,
        Self::InOutCirc,
        Self::InExpo,
        Self::OutExpo,
        Self::InOutExpo,
    ];

    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear => "Linear",
            Self::Instant => "Instant",
            Self::InSine => "InSine",
            Self::OutSine => "OutSine",
            Self::InOutSine => "InOutSine",
            Self::InElastic => "InElastic",
            Self::OutElastic => "OutElastic",
            Self::InOutElastic => "InOutElastic",
            Self::InBack => "InBack",
            Self::OutBack => "OutBack",
            Self::InOutBack => "InOutBack",
            Self::InBounce => "InBounce",
            Self::OutBounce => "OutBounce",
            Self::InOutBounce => "InOutBounce",
            Self::InQuad => "InQuad",
            Self::OutQuad => "OutQuad",
            Self::InOutQuad => "InOutQuad",
            Self::InCirc => "InCirc",
            Self::OutCirc => "OutCirc",
            Self::InOutCirc => "InOutCirc",
            Self::InExpo => "InExpo",
            Self::OutExpo => "OutExpo",
            Self::InOutExpo => "InOutExpo",
        }
    }

    #[inline]
    pub fn index(&self) -> u8 {
        // ALL has 23 entries, so the position always fits.
        Self::ALL.iter().position(|k| k == self).unwrap_or(0) as u8
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.name() == name)
    }
}

impl fmt::Display for EasingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Easing evaluator consumed by the interpolation engine.
///
/// Implementations must be pure and map `0 -> 0` and `1 -> 1`.
pub trait Easing {
    fn interpolate(&self, kind: EasingKind, t: f32) -> f32;
}

/// The stock curve catalogue.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardEasing;

impl Easing for StandardEasing {
    fn interpolate(&self, kind: EasingKind, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        if t == 0.0 {
            return 0.0;
        }
        if t == 1.0 {
            return 1.0;
        }
        ease(kind, t)
    }
}

const BACK_C1: f32 = 1.70158;
const BACK_C2: f32 = BACK_C1 * 1.525;
const BACK_C3: f32 = BACK_C1 + 1.0;
const ELASTIC_C4: f32 = (2.0 * PI) / 3.0;
const ELASTIC_C5: f32 = (2.0 * PI) / 4.5;

fn out_bounce(t: f32) -> f32 {
    const N1: f32 = 7.5625;
    const D1: f32 = 2.75;
    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}

/// Curve body for `t` strictly inside (0, 1).
fn ease(kind: EasingKind, t: f32) -> f32 {
    use EasingKind::*;
    match kind {
        Linear => t,
        Instant => 0.0,
        InSine => 1.0 - (t * PI / 2.0).cos(),
        OutSine => (t * PI / 2.0).sin(),
        InOutSine => -((PI * t).cos() - 1.0) / 2.0,
        InElastic => -(2f32.powf(10.0 * t - 10.0)) * ((10.0 * t - 10.75) * ELASTIC_C4).sin(),
        OutElastic => 2f32.powf(-10.0 * t) * ((10.0 * t - 0.75) * ELASTIC_C4).sin() + 1.0,
        InOutElastic => {
            if t < 0.5 {
                -(2f32.powf(20.0 * t - 10.0) * ((20.0 * t - 11.125) * ELASTIC_C5).sin()) / 2.0
            } else {
                (2f32.powf(-20.0 * t + 10.0) * ((20.0 * t - 11.125) * ELASTIC_C5).sin()) / 2.0
                    + 1.0
            }
        }
        InBack => BACK_C3 * t * t * t - BACK_C1 * t * t,
        OutBack => {
            let u = t - 1.0;
            1.0 + BACK_C3 * u * u * u + BACK_C1 * u * u
        }
        InOutBack => {
            if t < 0.5 {
                let d = 2.0 * t;
                (d * d * ((BACK_C2 + 1.0) * d - BACK_C2)) / 2.0
            } else {
                let d = 2.0 * t - 2.0;
                (d * d * ((BACK_C2 + 1.0) * d + BACK_C2) + 2.0) / 2.0
            }
        }
        InBounce => 1.0 - out_bounce(1.0 - t),
        OutBounce => out_bounce(t),
        InOutBounce => {
            if t < 0.5 {
                (1.0 - out_bounce(1.0 - 2.0 * t)) / 2.0
            } else {
                (1.0 + out_bounce(2.0 * t - 1.0)) / 2.0
            }
        }
        InQuad => t * t,
        OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
        InOutQuad => {
            if t < 0.5 {
                2.0 * t * t
            } else {
                let u = -2.0 * t + 2.0;
                1.0 - u * u / 2.0
            }
        }
        InCirc => 1.0 - (1.0 - t * t).sqrt(),
        OutCirc => (1.0 - (t - 1.0) * (t - 1.0)).sqrt(),
        InOutCirc => {
            if t < 0.5 {
                (1.0 - (1.0 - (2.0 * t) * (2.0 * t)).sqrt()) / 2.0
            } else {
                let u = -2.0 * t + 2.0;
                ((1.0 - u * u).sqrt() + 1.0) / 2.0
            }
        }
        InExpo => 2f32.powf(10.0 * t - 10.0),
        OutExpo => 1.0 - 2f32.powf(-10.0 * t),
        InOutExpo => {
            if t < 0.5 {
                2f32.powf(20.0 * t - 10.0) / 2.0
            } else {
                (2.0 - 2f32.powf(-20.0 * t + 10.0)) / 2.0
            }
        }
    }
}
