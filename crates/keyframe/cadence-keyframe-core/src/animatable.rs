//! Animatable entities: named keyframe sequences plus the derived animation length.

use std::io::{Read, Write};

use indexmap::IndexMap;
use log::debug;

use crate::channel::ChannelKind;
use crate::error::Result;
use crate::packet::{PacketReader, PacketWriter};
use crate::sequence::KeyframeSequence;
use crate::tree::{self, Tree};

/// Addresses one sequence: the owning entity and the channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SequenceKey {
    pub object: String,
    pub channel: ChannelKind,
}

impl SequenceKey {
    pub fn new(object: impl Into<String>, channel: ChannelKind) -> Self {
        Self {
            object: object.into(),
            channel,
        }
    }
}

/// An entity driven by keyframe sequences.
pub trait Animatable {
    fn object_id(&self) -> &str;

    fn channels(&self) -> &AnimChannels;

    fn channels_mut(&mut self) -> &mut AnimChannels;

    #[inline]
    fn sequence(&self, channel: ChannelKind) -> Option<&KeyframeSequence> {
        self.channels().get(channel)
    }

    #[inline]
    fn sequence_mut(&mut self, channel: ChannelKind) -> Option<&mut KeyframeSequence> {
        self.channels_mut().get_mut(channel)
    }

    /// Time of the last keyframe across all channels.
    #[inline]
    fn anim_length(&self) -> f32 {
        self.channels().anim_length()
    }
}

/// The sequences of one animatable, one per channel, in persisted order.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimChannels {
    sequences: IndexMap<ChannelKind, KeyframeSequence>,
    anim_length: f32,
}

impl AnimChannels {
    /// Neutral sequences for each of `kinds`.
    pub fn new(kinds: &[ChannelKind]) -> Self {
        let sequences = kinds
            .iter()
            .map(|k| (*k, KeyframeSequence::new(*k)))
            .collect();
        Self {
            sequences,
            anim_length: 0.0,
        }
    }

    pub fn kinds(&self) -> impl Iterator<Item = ChannelKind> + '_ {
        self.sequences.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyframeSequence> {
        self.sequences.values()
    }

    pub fn get(&self, channel: ChannelKind) -> Option<&KeyframeSequence> {
        self.sequences.get(&channel)
    }

    /// Mutable access. Call [`AnimChannels::recalculate_length`] after editing times.
    pub fn get_mut(&mut self, channel: ChannelKind) -> Option<&mut KeyframeSequence> {
        self.sequences.get_mut(&channel)
    }

    /// Replace the sequence for its channel. Channels not declared at construction are ignored.
    pub fn set(&mut self, sequence: KeyframeSequence) -> bool {
        match self.sequences.get_mut(&sequence.channel()) {
            Some(slot) => {
                *slot = sequence;
                self.recalculate_length();
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn anim_length(&self) -> f32 {
        self.anim_length
    }

    pub fn recalculate_length(&mut self) {
        self.anim_length = self
            .sequences
            .values()
            .map(KeyframeSequence::last_time)
            .fold(0.0, f32::max);
    }

    pub fn copy(&self, preserve_id: bool) -> Self {
        let mut out = self.clone();
        if !preserve_id {
            for seq in out.sequences.values_mut() {
                seq.regenerate_ids();
            }
        }
        out
    }

    /// Sparse form: channels holding only a neutral baseline are omitted.
    pub fn to_tree(&self) -> Tree {
        let mut node = Tree::new();
        for (kind, seq) in &self.sequences {
            if !seq.is_default() {
                node.insert(kind.key().into(), seq.to_tree());
            }
        }
        node
    }

    pub fn from_tree(kinds: &[ChannelKind], node: &Tree) -> Self {
        let mut out = Self::new(kinds);
        for kind in kinds {
            if let Some(items) = tree::get_array(node, kind.keys()) {
                out.sequences
                    .insert(*kind, KeyframeSequence::from_tree(*kind, items));
            }
        }
        out.recalculate_length();
        out
    }

    pub fn write_packet<W: Write>(&self, w: &mut PacketWriter<W>) -> Result<()> {
        for seq in self.sequences.values() {
            w.write_sub(|sub| seq.write_packet(sub))?;
        }
        Ok(())
    }

    /// Read one framed sequence per declared channel. A corrupt sequence
    /// becomes a neutral baseline.
    pub fn read_packet<R: Read>(r: &mut PacketReader<R>, kinds: &[ChannelKind]) -> Result<Self> {
        let mut out = Self::new(kinds);
        for kind in kinds {
            let seq: Option<KeyframeSequence> = r.read_sub("sequence", |sub| {
                KeyframeSequence::read_packet(sub, *kind).map(Some)
            })?;
            match seq {
                Some(seq) => {
                    out.sequences.insert(*kind, seq);
                }
                None => debug!("{kind} sequence missing from packet; using neutral baseline"),
            }
        }
        out.recalculate_length();
        Ok(out)
    }
}
