//! A single animation sample on a channel.
//!
//! Text layout (all keys optional except `id`):
//!
//! | key   | field                      | legacy keys          |
//! |-------|----------------------------|----------------------|
//! | `id`  | identity                   |                      |
//! | `t`   | time                       | `time`               |
//! | `ct`  | easing curve name          | `curve`              |
//! | `ev`  | value vector               | `x`, `y`, `z`        |
//! | `r`   | random mode code           | `random`             |
//! | `rv`  | random parameter vector    | `rx`, `ry`, `rz`     |
//! | `rel` | relative flag              |                      |
//! | `fl`  | flee flag                  | `flee`               |

use std::io::{Read, Write};

use log::debug;
use serde_json::Value as JsonValue;

use crate::easing::EasingKind;
use crate::error::Result;
use crate::ids;
use crate::object::Entity;
use crate::packet::{PacketReader, PacketWriter};
use crate::tree::{self, Tree};

/// Number of randomization parameter slots.
pub const RANDOM_SLOTS: usize = 4;

/// Randomization strategy applied to a keyframe's values at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RandomMode {
    #[default]
    None,
    /// Each axis sampled independently between `values[i]` and `random_values[i]`.
    Independent,
    /// One sample shared by every axis, moving along the segment to `random_values`.
    Paired,
    /// Uniform multiplier sampled in `[random_values[0], random_values[1]]`.
    Scale,
    /// Pull toward (or push away from) the target, sampled once.
    HomingStatic,
    /// Like [`RandomMode::HomingStatic`] but resampled every interval.
    HomingDynamic,
}

/// Persisted integer codes. Code 4 is a retired alias of `Paired` that older
/// documents still contain; it is read but never written.
const RANDOM_CODES: [(i32, RandomMode); 7] = [
    (0, RandomMode::None),
    (1, RandomMode::Independent),
    (2, RandomMode::Paired),
    (3, RandomMode::Scale),
    (4, RandomMode::Paired),
    (5, RandomMode::HomingStatic),
    (6, RandomMode::HomingDynamic),
];

impl RandomMode {
    /// Canonical persisted code.
    pub fn code(&self) -> u8 {
        match self {
            Self::None => 0,
            Self::Independent => 1,
            Self::Paired => 2,
            Self::Scale => 3,
            Self::HomingStatic => 5,
            Self::HomingDynamic => 6,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        RANDOM_CODES
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, mode)| *mode)
    }

    /// Homing modes are the only ones that consult `flee` and the axis mask.
    #[inline]
    pub fn is_homing(&self) -> bool {
        matches!(self, Self::HomingStatic | Self::HomingDynamic)
    }
}

/// One keyframe. Mutate through the owning sequence so ordering is maintained.
#[derive(Debug, Clone, PartialEq)]
pub struct EventKeyframe {
    pub id: String,
    pub time: f32,
    /// Curve used when moving into this keyframe from the previous one.
    pub curve: EasingKind,
    pub values: Vec<f32>,
    pub random_mode: RandomMode,
    pub random_values: [f32; RANDOM_SLOTS],
    /// Values are a delta added to the accumulated value of prior keyframes.
    pub relative: bool,
    /// Homing modes repel instead of attract.
    pub flee: bool,
}

impl Default for EventKeyframe {
    fn default() -> Self {
        Self {
            id: ids::generate(),
            time: 0.0,
            curve: EasingKind::Linear,
            values: Vec::new(),
            random_mode: RandomMode::None,
            random_values: [0.0; RANDOM_SLOTS],
            relative: false,
            flee: false,
        }
    }
}

impl Entity for EventKeyframe {
    fn id(&self) -> &str {
        &self.id
    }

    fn copy(&self, preserve_id: bool) -> Self {
        let mut out = self.clone();
        if !preserve_id {
            out.id = ids::generate();
        }
        out
    }
}

impl EventKeyframe {
    pub fn new(time: f32, values: impl Into<Vec<f32>>) -> Self {
        Self {
            time,
            values: values.into(),
            ..Self::default()
        }
    }

    pub fn with_curve(mut self, curve: EasingKind) -> Self {
        self.curve = curve;
        self
    }

    pub fn with_random(mut self, mode: RandomMode, random_values: [f32; RANDOM_SLOTS]) -> Self {
        self.random_mode = mode;
        self.random_values = random_values;
        self
    }

    pub fn with_relative(mut self, relative: bool) -> Self {
        self.relative = relative;
        self
    }

    pub fn with_flee(mut self, flee: bool) -> Self {
        self.flee = flee;
        self
    }

    /// Field-wise equality ignoring identity.
    pub fn same_values(&self, other: &Self) -> bool {
        self.time == other.time
            && self.curve == other.curve
            && self.values == other.values
            && self.random_mode == other.random_mode
            && self.random_values == other.random_values
            && self.relative == other.relative
            && self.flee == other.flee
    }

    /// Pad or cut `values` to `arity`, filling new slots from `defaults`.
    pub(crate) fn conform(&mut self, defaults: &[f32]) {
        let arity = defaults.len();
        if self.values.len() != arity {
            debug!(
                "keyframe {} has {} values, channel expects {arity}",
                self.id,
                self.values.len()
            );
            let start = self.values.len().min(arity);
            self.values.resize(arity, 0.0);
            self.values[start..].copy_from_slice(&defaults[start..]);
        }
    }

    /// Sparse text form; `defaults` are the channel's neutral values.
    pub fn to_tree(&self, defaults: &[f32]) -> Tree {
        let mut node = Tree::new();
        node.insert("id".into(), JsonValue::String(self.id.clone()));
        tree::put_f32(&mut node, "t", self.time, 0.0);
        if self.curve != EasingKind::Linear {
            node.insert("ct".into(), JsonValue::String(self.curve.name().into()));
        }
        if self.values != defaults {
            node.insert("ev".into(), tree::f32_array(&self.values));
        }
        tree::put_i32(&mut node, "r", i32::from(self.random_mode.code()), 0);
        if self.random_values != [0.0; RANDOM_SLOTS] {
            node.insert("rv".into(), tree::f32_array(&self.random_values));
        }
        tree::put_bool(&mut node, "rel", self.relative, false);
        tree::put_bool(&mut node, "fl", self.flee, false);
        node
    }

    pub fn from_tree(node: &Tree, defaults: &[f32]) -> Self {
        let id = match tree::find(node, &["id"]) {
            Some(JsonValue::String(s)) if !s.is_empty() => s.clone(),
            _ => ids::generate(),
        };

        let mut values = defaults.to_vec();
        match tree::find(node, &["ev"]) {
            Some(raw) => tree::fill_f32s(raw, &mut values),
            None => {
                for (slot, key) in values.iter_mut().zip(["x", "y", "z"]) {
                    *slot = tree::get_f32(node, &[key], *slot);
                }
            }
        }

        let mut random_values = [0.0; RANDOM_SLOTS];
        match tree::find(node, &["rv"]) {
            Some(raw) => tree::fill_f32s(raw, &mut random_values),
            None => {
                for (slot, key) in random_values.iter_mut().zip(["rx", "ry", "rz"]) {
                    *slot = tree::get_f32(node, &[key], 0.0);
                }
            }
        }

        let code = tree::get_i32(node, &["r", "random"], 0);
        let random_mode = RandomMode::from_code(code).unwrap_or_else(|| {
            debug!("unknown random mode code {code}; treating as none");
            RandomMode::None
        });

        Self {
            id,
            time: tree::get_f32(node, &["t", "time"], 0.0),
            curve: curve_from_tree(node),
            values,
            random_mode,
            random_values,
            relative: tree::get_bool(node, &["rel"], false),
            flee: tree::get_bool(node, &["fl", "flee"], false),
        }
    }

    pub fn write_packet<W: Write>(&self, w: &mut PacketWriter<W>) -> Result<()> {
        w.write_string(&self.id)?;
        w.write_f32(self.time)?;
        w.write_u8(self.curve.index())?;
        w.write_f32s(&self.values)?;
        w.write_u8(self.random_mode.code())?;
        w.write_f32s(&self.random_values)?;
        w.write_bool(self.relative)?;
        w.write_bool(self.flee)
    }

    /// Read a keyframe whose value vector has `arity` components.
    pub fn read_packet<R: Read>(r: &mut PacketReader<R>, arity: usize) -> Result<Self> {
        let id = r.read_string()?;
        let time = r.read_f32()?;
        let curve_index = r.read_u8()?;
        let mut values = vec![0.0; arity];
        r.read_f32s(&mut values)?;
        let code = r.read_u8()?;
        let mut random_values = [0.0; RANDOM_SLOTS];
        r.read_f32s(&mut random_values)?;
        let relative = r.read_bool()?;
        let flee = r.read_bool()?;

        Ok(Self {
            id: if id.is_empty() { ids::generate() } else { id },
            time,
            curve: EasingKind::from_index(curve_index).unwrap_or_else(|| {
                debug!("unknown curve index {curve_index}; using linear");
                EasingKind::Linear
            }),
            values,
            random_mode: RandomMode::from_code(i32::from(code)).unwrap_or_else(|| {
                debug!("unknown random mode code {code}; treating as none");
                RandomMode::None
            }),
            random_values,
            relative,
            flee,
        })
    }
}

fn curve_from_tree(node: &Tree) -> EasingKind {
    match tree::find(node, &["ct", "curve"]) {
        None => EasingKind::Linear,
        Some(JsonValue::String(name)) => EasingKind::from_name(name)
            .or_else(|| name.trim().parse::<u8>().ok().and_then(EasingKind::from_index))
            .unwrap_or_else(|| {
                debug!("unknown curve '{name}'; using linear");
                EasingKind::Linear
            }),
        Some(other) => tree::parse_i32(other)
            .and_then(|i| u8::try_from(i).ok())
            .and_then(EasingKind::from_index)
            .unwrap_or_else(|| {
                debug!("unknown curve {other}; using linear");
                EasingKind::Linear
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: JsonValue) -> Tree {
        match v {
            JsonValue::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn random_codes_map_through_the_table() {
        assert_eq!(RandomMode::from_code(0), Some(RandomMode::None));
        assert_eq!(RandomMode::from_code(4), Some(RandomMode::Paired));
        assert_eq!(RandomMode::from_code(6), Some(RandomMode::HomingDynamic));
        assert_eq!(RandomMode::from_code(7), None);
        assert_eq!(RandomMode::Paired.code(), 2);
        assert!(RandomMode::HomingStatic.is_homing());
        assert!(!RandomMode::Scale.is_homing());
    }

    #[test]
    fn default_keyframe_tree_is_only_the_id() {
        let kf = EventKeyframe::new(0.0, vec![0.0, 0.0]);
        let node = kf.to_tree(&[0.0, 0.0]);
        assert_eq!(node.len(), 1);
        assert_eq!(node["id"], json!(kf.id));
    }

    #[test]
    fn legacy_component_keys_are_read() {
        let node = obj(json!({
            "time": "1.5", "curve": "4", "x": "3", "y": 4,
            "random": "1", "rx": "1", "ry": "2", "rz": "0.5"
        }));
        let kf = EventKeyframe::from_tree(&node, &[0.0, 0.0]);
        assert_eq!(kf.time, 1.5);
        assert_eq!(kf.curve, EasingKind::InOutSine);
        assert_eq!(kf.values, vec![3.0, 4.0]);
        assert_eq!(kf.random_mode, RandomMode::Independent);
        assert_eq!(kf.random_values, [1.0, 2.0, 0.5, 0.0]);
        assert_eq!(kf.id.len(), ids::DEFAULT_ID_LENGTH);
    }

    #[test]
    fn short_value_arrays_keep_channel_defaults() {
        let node = obj(json!({ "id": "k", "ev": ["2"] }));
        let kf = EventKeyframe::from_tree(&node, &[1.0, 1.0]);
        assert_eq!(kf.values, vec![2.0, 1.0]);
    }

    #[test]
    fn conform_pads_from_defaults() {
        let mut kf = EventKeyframe::new(0.0, vec![5.0]);
        kf.conform(&[1.0, 1.0, 3.0]);
        assert_eq!(kf.values, vec![5.0, 1.0, 3.0]);
        kf.conform(&[0.0]);
        assert_eq!(kf.values, vec![5.0]);
    }

    #[test]
    fn copy_regenerates_only_identity() {
        let kf = EventKeyframe::new(2.0, vec![1.0])
            .with_curve(EasingKind::OutBounce)
            .with_relative(true);
        let fresh = kf.copy(false);
        assert_ne!(fresh.id, kf.id);
        assert!(fresh.same_values(&kf));
        assert_eq!(kf.copy(true), kf);
    }
}
