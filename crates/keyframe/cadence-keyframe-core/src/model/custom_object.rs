//! Free-standing shape objects attached to a player model and driven by keyframes.

use std::io::{Read, Write};

use log::debug;
use serde_json::Value as JsonValue;

use crate::animatable::{AnimChannels, Animatable};
use crate::channel::ChannelKind;
use crate::error::Result;
use crate::ids;
use crate::object::{Entity, PacketCodec, TreeCodec};
use crate::packet::{PacketReader, PacketWriter};
use crate::tree::{self, Tree};

use super::{get_u8, Shape};

/// When the object is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Always,
    WhileBoosting,
    WhileNotBoosting,
    Hidden,
}

impl Visibility {
    pub fn code(&self) -> u8 {
        match self {
            Self::Always => 0,
            Self::WhileBoosting => 1,
            Self::WhileNotBoosting => 2,
            Self::Hidden => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Always),
            1 => Some(Self::WhileBoosting),
            2 => Some(Self::WhileNotBoosting),
            3 => Some(Self::Hidden),
            _ => None,
        }
    }

    fn from_code_or_default(code: u8) -> Self {
        Self::from_code(code).unwrap_or_else(|| {
            debug!("unknown visibility code {code}; using always");
            Self::Always
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomObject {
    pub id: String,
    pub name: String,
    /// Id of the custom object this one follows; empty means the head.
    pub parent: String,
    pub shape: Shape,
    /// Draw order relative to the player parts.
    pub depth: i32,
    pub visibility: Visibility,
    channels: AnimChannels,
}

impl Default for CustomObject {
    fn default() -> Self {
        Self {
            id: ids::generate(),
            name: String::new(),
            parent: String::new(),
            shape: Shape::default(),
            depth: 0,
            visibility: Visibility::Always,
            channels: AnimChannels::new(&ChannelKind::ALL),
        }
    }
}

impl CustomObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = parent.into();
        self
    }
}

impl Entity for CustomObject {
    fn id(&self) -> &str {
        &self.id
    }

    fn copy(&self, preserve_id: bool) -> Self {
        let mut out = self.clone();
        out.channels = self.channels.copy(preserve_id);
        if !preserve_id {
            out.id = ids::generate();
        }
        out
    }
}

impl Animatable for CustomObject {
    fn object_id(&self) -> &str {
        &self.id
    }

    fn channels(&self) -> &AnimChannels {
        &self.channels
    }

    fn channels_mut(&mut self) -> &mut AnimChannels {
        &mut self.channels
    }
}

impl TreeCodec for CustomObject {
    fn to_tree(&self) -> Tree {
        let mut node = Tree::new();
        node.insert("id".into(), JsonValue::String(self.id.clone()));
        tree::put_string(&mut node, "name", &self.name, "");
        tree::put_string(&mut node, "p", &self.parent, "");
        self.shape.write_tree(&mut node);
        tree::put_i32(&mut node, "d", self.depth, 0);
        tree::put_i32(&mut node, "vis", i32::from(self.visibility.code()), 0);
        tree::put_child(&mut node, "events", self.channels.to_tree());
        node
    }

    fn from_tree(node: &Tree) -> Self {
        let id = match tree::find(node, &["id"]) {
            Some(JsonValue::String(s)) if !s.is_empty() => s.clone(),
            _ => ids::generate(),
        };
        let channels = match tree::get_child(node, &["events", "e"]) {
            Some(events) => AnimChannels::from_tree(&ChannelKind::ALL, events),
            None => AnimChannels::new(&ChannelKind::ALL),
        };
        Self {
            id,
            name: tree::get_string(node, &["name", "n"], ""),
            parent: tree::get_string(node, &["p", "parent"], ""),
            shape: Shape::read_tree(node, Shape::default()),
            depth: tree::get_i32(node, &["d", "depth"], 0),
            visibility: Visibility::from_code_or_default(get_u8(node, &["vis", "visibility"], 0)),
            channels,
        }
    }
}

impl PacketCodec for CustomObject {
    fn write_packet<W: Write>(&self, w: &mut PacketWriter<W>) -> Result<()> {
        w.write_string(&self.id)?;
        w.write_string(&self.name)?;
        w.write_string(&self.parent)?;
        self.shape.write_packet(w)?;
        w.write_i32(self.depth)?;
        w.write_u8(self.visibility.code())?;
        self.channels.write_packet(w)
    }

    fn read_packet<R: Read>(r: &mut PacketReader<R>) -> Result<Self> {
        let id = r.read_string()?;
        Ok(Self {
            id: if id.is_empty() { ids::generate() } else { id },
            name: r.read_string()?,
            parent: r.read_string()?,
            shape: Shape::read_packet(r)?,
            depth: r.read_i32()?,
            visibility: Visibility::from_code_or_default(r.read_u8()?),
            channels: AnimChannels::read_packet(r, &ChannelKind::ALL)?,
        })
    }
}
