//! Ordered keyframes for one channel, with lookup and interpolation.
//!
//! Model:
//! - The sequence is never empty; index 0 is the baseline keyframe, pinned to
//!   time 0 and never removed.
//! - Keyframes are sorted ascending by time. Ties keep insertion order.
//! - Keyframe identities are unique within the sequence.
//!
//! Evaluation finds the last keyframe at or before `t` and the one after it,
//! eases with the later keyframe's curve, and blends component-wise. Relative
//! keyframes add their values to the accumulated value of everything before
//! them. At a keyframe's own time the accumulated value is returned exactly.

use std::io::{Read, Write};

use hashbrown::HashSet;
use log::debug;
use serde_json::Value as JsonValue;

use crate::channel::ChannelKind;
use crate::easing::{Easing, StandardEasing};
use crate::error::Result;
use crate::ids;
use crate::keyframe::EventKeyframe;
use crate::packet::{PacketReader, PacketWriter};
use crate::random::{self, EvalContext};

/// Time of the baseline keyframe.
pub const BASELINE_TIME: f32 = 0.0;

#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeSequence {
    channel: ChannelKind,
    keyframes: Vec<EventKeyframe>,
}

impl KeyframeSequence {
    /// A sequence holding only a neutral baseline.
    pub fn new(channel: ChannelKind) -> Self {
        Self {
            channel,
            keyframes: vec![Self::neutral_baseline(channel)],
        }
    }

    /// Build from arbitrary keyframes, restoring every invariant: values are
    /// conformed to the channel arity, keyframes are stably sorted, the first
    /// becomes the baseline, and duplicate identities are regenerated. An
    /// empty input yields a neutral baseline.
    pub fn from_keyframes(channel: ChannelKind, mut keyframes: Vec<EventKeyframe>) -> Self {
        if keyframes.is_empty() {
            return Self::new(channel);
        }
        for kf in keyframes.iter_mut() {
            if kf.time.is_nan() || kf.time < BASELINE_TIME {
                kf.time = BASELINE_TIME;
            }
        }
        keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
        let defaults = channel.default_values();
        let mut seen = HashSet::new();
        for kf in keyframes.iter_mut() {
            kf.conform(defaults);
            if !seen.insert(kf.id.clone()) {
                debug!("duplicate keyframe id {} on {channel}; regenerating", kf.id);
                kf.id = ids::generate();
                seen.insert(kf.id.clone());
            }
        }
        keyframes[0].time = BASELINE_TIME;
        Self { channel, keyframes }
    }

    #[inline]
    pub fn channel(&self) -> ChannelKind {
        self.channel
    }

    #[inline]
    pub fn keyframes(&self) -> &[EventKeyframe] {
        &self.keyframes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&EventKeyframe> {
        self.keyframes.get(index)
    }

    #[inline]
    pub fn baseline(&self) -> &EventKeyframe {
        &self.keyframes[0]
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.keyframes.iter().position(|k| k.id == id)
    }

    /// Time of the last keyframe.
    pub fn last_time(&self) -> f32 {
        self.keyframes.last().map(|k| k.time).unwrap_or(BASELINE_TIME)
    }

    /// Index of the last keyframe at or before `time`.
    pub fn preceding_index(&self, time: f32) -> usize {
        self.keyframes
            .partition_point(|k| k.time <= time)
            .saturating_sub(1)
    }

    /// Insert a non-baseline keyframe and return its index.
    ///
    /// The time is clamped to the baseline, the value vector is conformed to
    /// the channel, a clashing identity is regenerated, and the keyframe lands
    /// after every keyframe with an equal time.
    pub fn insert(&mut self, mut keyframe: EventKeyframe) -> usize {
        keyframe.conform(self.channel.default_values());
        if keyframe.time.is_nan() || keyframe.time < BASELINE_TIME {
            keyframe.time = BASELINE_TIME;
        }
        if self.index_of(&keyframe.id).is_some() {
            keyframe.id = ids::generate();
        }
        let index = self.insertion_point(keyframe.time);
        self.keyframes.insert(index, keyframe);
        index
    }

    fn insertion_point(&self, time: f32) -> usize {
        1 + self.keyframes[1..].partition_point(|k| k.time <= time)
    }

    /// Remove a non-baseline keyframe. The baseline is never removed.
    pub fn remove(&mut self, index: usize) -> Option<EventKeyframe> {
        if index == 0 || index >= self.keyframes.len() {
            return None;
        }
        Some(self.keyframes.remove(index))
    }

    pub fn remove_by_id(&mut self, id: &str) -> Option<EventKeyframe> {
        let index = self.index_of(id)?;
        self.remove(index)
    }

    /// Move a non-baseline keyframe to `time` and return its new index.
    pub fn set_time(&mut self, index: usize, time: f32) -> Option<usize> {
        if index == 0 || index >= self.keyframes.len() {
            return None;
        }
        let mut kf = self.keyframes.remove(index);
        kf.time = if time.is_nan() {
            kf.time
        } else {
            time.max(BASELINE_TIME)
        };
        let to = self.insertion_point(kf.time);
        self.keyframes.insert(to, kf);
        Some(to)
    }

    /// Set one value component. Returns whether anything changed.
    pub fn set_value(&mut self, index: usize, axis: usize, value: f32) -> bool {
        match self
            .keyframes
            .get_mut(index)
            .and_then(|k| k.values.get_mut(axis))
        {
            Some(slot) if *slot != value => {
                *slot = value;
                true
            }
            _ => false,
        }
    }

    /// Apply an arbitrary edit to one keyframe, then restore the invariants.
    /// Returns the keyframe's index afterwards.
    pub fn edit<F>(&mut self, index: usize, f: F) -> Option<usize>
    where
        F: FnOnce(&mut EventKeyframe),
    {
        let id = self.keyframes.get(index)?.id.clone();
        f(&mut self.keyframes[index]);
        let edited = &mut self.keyframes[index];
        edited.conform(self.channel.default_values());
        if edited.id.is_empty() {
            edited.id = id;
        }
        if index == 0 {
            self.keyframes[0].time = BASELINE_TIME;
            return Some(0);
        }
        let kf = self.keyframes.remove(index);
        Some(self.insert(kf))
    }

    /// Give every keyframe a fresh identity without touching order.
    pub fn regenerate_ids(&mut self) {
        for kf in self.keyframes.iter_mut() {
            kf.id = ids::generate();
        }
    }

    /// True when the sequence is a single neutral baseline (identity ignored).
    pub fn is_default(&self) -> bool {
        self.keyframes.len() == 1
            && self.keyframes[0].same_values(&Self::neutral_baseline(self.channel))
    }

    /// Accumulated value of keyframe `index` without randomization.
    pub fn accumulated(&self, index: usize) -> Vec<f32> {
        let index = index.min(self.keyframes.len() - 1);
        self.accumulate_to(index, self.keyframes[index].time, &EvalContext::default())
    }

    fn accumulate_to(&self, index: usize, t: f32, ctx: &EvalContext) -> Vec<f32> {
        // An absolute keyframe discards everything before it.
        let start = self.keyframes[1..=index]
            .iter()
            .rposition(|k| !k.relative)
            .map_or(0, |i| i + 1);
        let mut acc = random::perturb(&self.keyframes[start], t, ctx);
        for kf in &self.keyframes[start + 1..=index] {
            let v = random::perturb(kf, t, ctx);
            if kf.relative {
                for (a, d) in acc.iter_mut().zip(&v) {
                    *a += d;
                }
            } else {
                acc = v;
            }
        }
        acc
    }

    /// Evaluate with the stock easing catalogue and a zero-seed context.
    pub fn evaluate(&self, t: f32) -> Vec<f32> {
        self.evaluate_with(t, &EvalContext::default(), &StandardEasing)
    }

    /// Evaluate at `t`. Times outside the sequence clamp to its ends.
    pub fn evaluate_with<E: Easing + ?Sized>(
        &self,
        t: f32,
        ctx: &EvalContext,
        easing: &E,
    ) -> Vec<f32> {
        let kfs = &self.keyframes;
        let t = if t.is_nan() { BASELINE_TIME } else { t };
        let upper = kfs.partition_point(|k| k.time <= t);
        if upper == 0 {
            return self.accumulate_to(0, t, ctx);
        }
        let i = upper - 1;
        let from = self.accumulate_to(i, t, ctx);
        if i + 1 == kfs.len() || kfs[i].time == t {
            return from;
        }

        let next = &kfs[i + 1];
        let span = next.time - kfs[i].time;
        let local = if span > 0.0 {
            (t - kfs[i].time) / span
        } else {
            1.0
        };
        let eased = easing.interpolate(next.curve, local);
        let mut to = random::perturb(next, t, ctx);
        if next.relative {
            for (b, a) in to.iter_mut().zip(&from) {
                *b += a;
            }
        }
        from.iter()
            .zip(&to)
            .map(|(a, b)| a + (b - a) * eased)
            .collect()
    }

    pub fn to_tree(&self) -> JsonValue {
        let defaults = self.channel.default_values();
        JsonValue::Array(
            self.keyframes
                .iter()
                .map(|k| JsonValue::Object(k.to_tree(defaults)))
                .collect(),
        )
    }

    /// Decode from a keyframe array. A non-object baseline entry becomes a
    /// neutral baseline; other non-object entries are skipped.
    pub fn from_tree(channel: ChannelKind, items: &[JsonValue]) -> Self {
        let defaults = channel.default_values();
        let keyframes = items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| match item {
                JsonValue::Object(node) => Some(EventKeyframe::from_tree(node, defaults)),
                other if i == 0 => {
                    debug!("non-object baseline {other} on {channel}; using neutral baseline");
                    Some(Self::neutral_baseline(channel))
                }
                other => {
                    debug!("skipping non-object keyframe {other} on {channel}");
                    None
                }
            })
            .collect();
        Self::from_keyframes(channel, keyframes)
    }

    fn neutral_baseline(channel: ChannelKind) -> EventKeyframe {
        EventKeyframe::new(BASELINE_TIME, channel.default_values().to_vec())
    }

    pub fn write_packet<W: Write>(&self, w: &mut PacketWriter<W>) -> Result<()> {
        w.write_count(self.keyframes.len())?;
        for kf in &self.keyframes {
            w.write_sub(|sub| kf.write_packet(sub))?;
        }
        Ok(())
    }

    /// Read a sequence. A baseline whose payload fails to decode is replaced
    /// by a neutral one; any other undecodable keyframe is dropped.
    pub fn read_packet<R: Read>(r: &mut PacketReader<R>, channel: ChannelKind) -> Result<Self> {
        let arity = channel.arity();
        let count = r.read_count()?;
        let mut keyframes = Vec::with_capacity(count);
        for i in 0..count {
            let kf: Option<EventKeyframe> =
                r.read_sub("keyframe", |sub| EventKeyframe::read_packet(sub, arity).map(Some))?;
            match kf {
                Some(kf) => keyframes.push(kf),
                None if i == 0 => keyframes.push(Self::neutral_baseline(channel)),
                None => {}
            }
        }
        Ok(Self::from_keyframes(channel, keyframes))
    }
}

impl Default for KeyframeSequence {
    fn default() -> Self {
        Self::new(ChannelKind::Position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::EasingKind;

    fn pos(t: f32, x: f32, y: f32) -> EventKeyframe {
        EventKeyframe::new(t, vec![x, y])
    }

    #[test]
    fn new_sequence_has_neutral_baseline() {
        let seq = KeyframeSequence::new(ChannelKind::Scale);
        assert_eq!(seq.len(), 1);
        assert_eq!(seq.baseline().values, vec![1.0, 1.0]);
        assert!(seq.is_default());
    }

    #[test]
    fn insert_sorts_with_stable_ties_and_clamps_to_baseline() {
        let mut seq = KeyframeSequence::new(ChannelKind::Position);
        let a = seq.insert(pos(2.0, 1.0, 0.0));
        let b = seq.insert(pos(1.0, 2.0, 0.0));
        let c = seq.insert(pos(1.0, 3.0, 0.0));
        let d = seq.insert(pos(-5.0, 4.0, 0.0));
        assert_eq!((a, b, c), (1, 1, 2));
        assert_eq!(d, 1);
        let times: Vec<f32> = seq.keyframes().iter().map(|k| k.time).collect();
        assert_eq!(times, vec![0.0, 0.0, 1.0, 1.0, 2.0]);
        assert_eq!(seq.keyframes()[2].values[0], 2.0);
        assert_eq!(seq.keyframes()[3].values[0], 3.0);
    }

    #[test]
    fn baseline_cannot_be_removed_or_moved() {
        let mut seq = KeyframeSequence::new(ChannelKind::Rotation);
        seq.insert(EventKeyframe::new(1.0, vec![90.0]));
        assert!(seq.remove(0).is_none());
        assert!(seq.set_time(0, 3.0).is_none());
        assert!(seq.remove(1).is_some());
        assert_eq!(seq.len(), 1);
    }

    #[test]
    fn set_time_reorders() {
        let mut seq = KeyframeSequence::new(ChannelKind::Rotation);
        seq.insert(EventKeyframe::new(1.0, vec![1.0]));
        seq.insert(EventKeyframe::new(2.0, vec![2.0]));
        assert_eq!(seq.set_time(1, 3.0), Some(2));
        assert_eq!(seq.keyframes()[2].values, vec![1.0]);
    }

    #[test]
    fn duplicate_ids_are_regenerated() {
        let mut a = pos(0.0, 0.0, 0.0);
        a.id = "same".into();
        let mut b = pos(1.0, 0.0, 0.0);
        b.id = "same".into();
        let seq = KeyframeSequence::from_keyframes(ChannelKind::Position, vec![a, b]);
        assert_ne!(seq.keyframes()[0].id, seq.keyframes()[1].id);
    }

    #[test]
    fn linear_midpoint() {
        let mut seq = KeyframeSequence::new(ChannelKind::Position);
        seq.insert(pos(2.0, 10.0, 0.0).with_curve(EasingKind::Linear));
        assert_eq!(seq.evaluate(1.0), vec![5.0, 0.0]);
        assert_eq!(seq.evaluate(-1.0), vec![0.0, 0.0]);
        assert_eq!(seq.evaluate(9.0), vec![10.0, 0.0]);
    }

    #[test]
    fn relative_keyframes_accumulate() {
        let mut seq = KeyframeSequence::new(ChannelKind::Position);
        seq.insert(pos(1.0, 2.0, 1.0).with_relative(true));
        seq.insert(pos(2.0, 3.0, 1.0).with_relative(true));
        seq.insert(pos(3.0, 1.0, 1.0));
        assert_eq!(seq.evaluate(1.0), vec![2.0, 1.0]);
        assert_eq!(seq.evaluate(2.0), vec![5.0, 2.0]);
        assert_eq!(seq.evaluate(1.5), vec![3.5, 1.5]);
        assert_eq!(seq.evaluate(3.0), vec![1.0, 1.0]);
    }

    #[test]
    fn accumulation_restarts_at_absolute_keyframes() {
        let mut seq = KeyframeSequence::new(ChannelKind::Position);
        seq.insert(pos(1.0, 2.0, 2.0).with_relative(true));
        seq.insert(pos(2.0, 10.0, 0.0));
        seq.insert(pos(3.0, 1.0, 1.0).with_relative(true));
        seq.insert(pos(4.0, 1.0, 1.0).with_relative(true));
        assert_eq!(seq.accumulated(1), vec![2.0, 2.0]);
        assert_eq!(seq.accumulated(2), vec![10.0, 0.0]);
        assert_eq!(seq.accumulated(4), vec![12.0, 2.0]);
        assert_eq!(seq.evaluate(3.5), vec![11.5, 1.5]);
    }

    #[test]
    fn remove_by_id_skips_the_baseline() {
        let mut seq = KeyframeSequence::new(ChannelKind::Rotation);
        seq.insert(EventKeyframe::new(1.0, vec![45.0]));
        let baseline = seq.baseline().id.clone();
        let id = seq.keyframes()[1].id.clone();
        assert!(seq.remove_by_id(&baseline).is_none());
        assert!(seq.remove_by_id("missing").is_none());
        assert_eq!(seq.remove_by_id(&id).map(|k| k.values), Some(vec![45.0]));
        assert!(seq.is_default());
    }

    #[test]
    fn non_object_baseline_entry_keeps_sibling_times() {
        let kf = EventKeyframe::new(1.0, vec![90.0]);
        let items = vec![
            JsonValue::String("junk".into()),
            JsonValue::Object(kf.to_tree(ChannelKind::Rotation.default_values())),
            JsonValue::Null,
        ];
        let seq = KeyframeSequence::from_tree(ChannelKind::Rotation, &items);
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.baseline().values, vec![0.0]);
        assert_eq!(seq.keyframes()[1].time, 1.0);
        assert_eq!(seq.evaluate(0.5), vec![45.0]);
    }

    #[test]
    fn edit_keeps_invariants() {
        let mut seq = KeyframeSequence::new(ChannelKind::Position);
        seq.insert(pos(1.0, 0.0, 0.0));
        let at = seq.edit(0, |k| {
            k.time = 5.0;
            k.values = vec![1.0];
        });
        assert_eq!(at, Some(0));
        assert_eq!(seq.baseline().time, BASELINE_TIME);
        assert_eq!(seq.baseline().values, vec![1.0, 0.0]);
    }
}
