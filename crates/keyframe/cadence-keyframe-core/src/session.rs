//! Batch authoring over the sequences of one or more animatables.
//!
//! The selection stores `(sequence, keyframe id)` pairs, so it stays valid when
//! edits reorder a sequence. Entries whose keyframe has since disappeared are
//! skipped item by item. Operations never fail: a rejected or empty batch
//! reports zero affected keyframes.

use hashbrown::HashSet;
use log::debug;

use crate::animatable::{Animatable, SequenceKey};
use crate::channel::ChannelKind;
use crate::config::Config;
use crate::ids;
use crate::keyframe::EventKeyframe;
use crate::sequence::KeyframeSequence;
use crate::snap::{NoSnap, TimeSnap};

/// Edit applied to one value component across the selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueOp {
    Add(f32),
    Subtract(f32),
    Set(f32),
}

impl ValueOp {
    #[inline]
    pub fn apply(&self, value: f32) -> f32 {
        match *self {
            Self::Add(d) => value + d,
            Self::Subtract(d) => value - d,
            Self::Set(v) => v,
        }
    }
}

/// One selected keyframe.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selected {
    pub key: SequenceKey,
    pub keyframe: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClipboardEntry {
    pub channel: ChannelKind,
    /// Time relative to the earliest copied keyframe.
    pub offset: f32,
    pub keyframe: EventKeyframe,
}

/// Keyframes captured by [`TimelineSession::copy`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clipboard {
    entries: Vec<ClipboardEntry>,
}

impl Clipboard {
    pub fn entries(&self) -> &[ClipboardEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub struct TimelineSession<S: TimeSnap = NoSnap> {
    config: Config,
    snap: S,
    selection: Vec<Selected>,
}

impl Default for TimelineSession<NoSnap> {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl TimelineSession<NoSnap> {
    pub fn new(config: Config) -> Self {
        Self::with_snap(config, NoSnap)
    }
}

impl<S: TimeSnap> TimelineSession<S> {
    pub fn with_snap(config: Config, snap: S) -> Self {
        Self {
            config,
            snap,
            selection: Vec::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn selection(&self) -> &[Selected] {
        &self.selection
    }

    pub fn is_selected(&self, key: &SequenceKey, keyframe: &str) -> bool {
        self.selection
            .iter()
            .any(|s| &s.key == key && s.keyframe == keyframe)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Toggle the keyframe at `index` of `key`. A non-additive select clears
    /// the previous selection first. Returns whether the keyframe ends up selected.
    pub fn select<A: Animatable>(
        &mut self,
        objects: &[A],
        key: &SequenceKey,
        index: usize,
        additive: bool,
    ) -> bool {
        if !additive {
            self.selection.clear();
        }
        let Some(id) = find_sequence(objects, key)
            .and_then(|seq| seq.get(index))
            .map(|kf| kf.id.clone())
        else {
            debug!("select: no keyframe {index} on {}/{}", key.object, key.channel);
            return false;
        };

        match self
            .selection
            .iter()
            .position(|s| &s.key == key && s.keyframe == id)
        {
            Some(pos) => {
                self.selection.remove(pos);
                false
            }
            None => {
                self.selection.push(Selected {
                    key: key.clone(),
                    keyframe: id,
                });
                true
            }
        }
    }

    /// Insert a keyframe at `time`, copying the nearest preceding keyframe.
    /// Returns the new keyframe's index.
    pub fn insert_at<A: Animatable>(
        &mut self,
        objects: &mut [A],
        key: &SequenceKey,
        time: f32,
    ) -> Option<usize> {
        let time = self.edit_time(time);
        let id_length = self.config.id_length;
        let owner = find_owner(objects, &key.object)?;
        let seq = owner.sequence_mut(key.channel)?;

        let source = seq.get(seq.preceding_index(time))?;
        let mut keyframe = source.clone();
        keyframe.id = ids::generate_with_len(id_length);
        keyframe.time = time;
        let index = seq.insert(keyframe);
        owner.channels_mut().recalculate_length();
        Some(index)
    }

    /// Delete every selected non-baseline keyframe. Returns how many were removed.
    pub fn delete_selected<A: Animatable>(&mut self, objects: &mut [A]) -> usize {
        let mut removed = 0;
        let mut touched = HashSet::new();
        let mut kept = Vec::with_capacity(self.selection.len());

        for sel in self.selection.drain(..) {
            let Some(seq) = find_owner(objects, &sel.key.object)
                .and_then(|o| o.sequence_mut(sel.key.channel))
            else {
                debug!("delete: stale sequence {}/{}", sel.key.object, sel.key.channel);
                continue;
            };
            match seq.index_of(&sel.keyframe) {
                Some(0) => kept.push(sel),
                Some(index) => {
                    seq.remove(index);
                    removed += 1;
                    touched.insert(sel.key.object);
                }
                None => debug!("delete: stale keyframe {}", sel.keyframe),
            }
        }
        self.selection = kept;

        if removed == 0 {
            debug!("delete: nothing but baselines selected");
        }
        recalculate(objects, &touched);
        removed
    }

    /// Shift every selected keyframe by `delta`. Each keyframe is clamped and
    /// snapped on its own; baselines do not move. Returns how many moved.
    pub fn retime<A: Animatable>(&mut self, objects: &mut [A], delta: f32) -> usize {
        let mut moved = 0;
        let mut touched = HashSet::new();

        for sel in &self.selection {
            let Some(seq) = find_owner(objects, &sel.key.object)
                .and_then(|o| o.sequence_mut(sel.key.channel))
            else {
                continue;
            };
            let Some(index) = seq.index_of(&sel.keyframe).filter(|i| *i > 0) else {
                continue;
            };
            let current = seq.keyframes()[index].time;
            let target = self.edit_time(current + delta);
            if target != current {
                seq.set_time(index, target);
                moved += 1;
                touched.insert(sel.key.object.clone());
            }
        }

        recalculate(objects, &touched);
        moved
    }

    /// Apply `op` to component `axis` of every selected keyframe. Returns how
    /// many keyframes actually changed.
    pub fn broadcast_value<A: Animatable>(
        &mut self,
        objects: &mut [A],
        axis: usize,
        op: ValueOp,
    ) -> usize {
        let mut changed = 0;
        for sel in &self.selection {
            let Some(seq) = find_owner(objects, &sel.key.object)
                .and_then(|o| o.sequence_mut(sel.key.channel))
            else {
                continue;
            };
            let Some(index) = seq.index_of(&sel.keyframe) else {
                continue;
            };
            let Some(current) = seq.keyframes()[index].values.get(axis).copied() else {
                debug!("broadcast: axis {axis} out of range on {}", sel.key.channel);
                continue;
            };
            if seq.set_value(index, axis, op.apply(current)) {
                changed += 1;
            }
        }
        changed
    }

    /// Edit one component of a single keyframe directly.
    pub fn set_value<A: Animatable>(
        &mut self,
        objects: &mut [A],
        key: &SequenceKey,
        index: usize,
        axis: usize,
        value: f32,
    ) -> bool {
        find_owner(objects, &key.object)
            .and_then(|o| o.sequence_mut(key.channel))
            .map(|seq| seq.set_value(index, axis, value))
            .unwrap_or(false)
    }

    /// Capture the selected keyframes with times relative to the earliest one.
    pub fn copy<A: Animatable>(&self, objects: &[A]) -> Clipboard {
        let picked: Vec<(ChannelKind, &EventKeyframe)> = self
            .selection
            .iter()
            .filter_map(|sel| {
                let seq = find_sequence(objects, &sel.key)?;
                let index = seq.index_of(&sel.keyframe)?;
                Some((sel.key.channel, &seq.keyframes()[index]))
            })
            .collect();

        let Some(earliest) = picked.iter().map(|(_, kf)| kf.time).reduce(f32::min) else {
            return Clipboard::default();
        };
        let mut entries: Vec<ClipboardEntry> = picked
            .into_iter()
            .map(|(channel, kf)| ClipboardEntry {
                channel,
                offset: kf.time - earliest,
                keyframe: kf.clone(),
            })
            .collect();
        entries.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        Clipboard { entries }
    }

    /// Insert the clipboard into `target` starting at `origin`, with fresh
    /// identities. The pasted keyframes become the selection. Returns how many
    /// were inserted.
    pub fn paste<A: Animatable>(
        &mut self,
        objects: &mut [A],
        clipboard: &Clipboard,
        target: &str,
        origin: f32,
    ) -> usize {
        let id_length = self.config.id_length;
        let times: Vec<f32> = clipboard
            .entries
            .iter()
            .map(|e| self.edit_time(origin + e.offset))
            .collect();
        let Some(owner) = find_owner(objects, target) else {
            debug!("paste: no animatable {target}");
            return 0;
        };

        let mut pasted = Vec::new();
        for (entry, time) in clipboard.entries.iter().zip(times) {
            let Some(seq) = owner.sequence_mut(entry.channel) else {
                debug!("paste: {target} has no {} channel", entry.channel);
                continue;
            };
            let mut keyframe = entry.keyframe.clone();
            keyframe.id = ids::generate_with_len(id_length);
            keyframe.time = time;
            let index = seq.insert(keyframe);
            pasted.push(Selected {
                key: SequenceKey::new(target, entry.channel),
                keyframe: seq.keyframes()[index].id.clone(),
            });
        }
        owner.channels_mut().recalculate_length();

        let count = pasted.len();
        if count > 0 {
            self.selection = pasted;
        }
        count
    }

    /// Clamp to the configured floor and optionally snap.
    fn edit_time(&self, time: f32) -> f32 {
        let floor = self.config.session.min_keyframe_time.max(0.0);
        let time = if time.is_nan() { floor } else { time.max(floor) };
        if self.config.session.snap_to_grid {
            self.snap.snap(time).max(floor)
        } else {
            time
        }
    }
}

fn find_owner<'a, A: Animatable>(objects: &'a mut [A], id: &str) -> Option<&'a mut A> {
    objects.iter_mut().find(|o| o.object_id() == id)
}

fn find_sequence<'a, A: Animatable>(objects: &'a [A], key: &SequenceKey) -> Option<&'a KeyframeSequence> {
    objects
        .iter()
        .find(|o| o.object_id() == key.object)?
        .sequence(key.channel)
}

fn recalculate<A: Animatable>(objects: &mut [A], touched: &HashSet<String>) {
    for obj in objects.iter_mut() {
        if touched.contains(obj.object_id()) {
            obj.channels_mut().recalculate_length();
        }
    }
}
