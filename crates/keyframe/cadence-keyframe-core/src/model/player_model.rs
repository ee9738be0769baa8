//! The top-level player model document.
//!
//! Text layout:
//!
//! | key       | field                          | legacy keys       |
//! |-----------|--------------------------------|-------------------|
//! | `id`      | identity (always written)      |                   |
//! | `base`    | registry model to inherit from | `base_id`         |
//! | `name`    | display name                   | `n`               |
//! | `creator` | author                         | `c`               |
//! | `version` | format version string          | `v`               |
//! | `ctrl`    | control block                  | `control`         |
//! | `head`    | head part                      |                   |
//! | `boost`   | boost part                     |                   |
//! | `tail`    | tail parts, in order           |                   |
//! | `objects` | custom objects                 | `custom_objects`  |

use std::io::{Read, Write};

use hashbrown::HashMap;
use log::debug;
use serde_json::Value as JsonValue;

use crate::animatable::Animatable;
use crate::error::Result;
use crate::ids;
use crate::object::{Entity, PacketCodec, TreeCodec};
use crate::packet::{PacketReader, PacketWriter};
use crate::registry::ModelRegistry;
use crate::tree::{self, Tree};

use super::{CustomObject, PlayerControl, PlayerPart};

pub const DEFAULT_NAME: &str = "New Model";
pub const DEFAULT_VERSION: &str = "1";
pub const DEFAULT_TAIL_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerModel {
    pub id: String,
    pub name: String,
    pub creator: String,
    pub version: String,
    pub control: PlayerControl,
    pub head: PlayerPart,
    pub boost: PlayerPart,
    pub tail: Vec<PlayerPart>,
    pub objects: Vec<CustomObject>,
}

impl Default for PlayerModel {
    fn default() -> Self {
        Self {
            id: ids::generate(),
            name: DEFAULT_NAME.into(),
            creator: String::new(),
            version: DEFAULT_VERSION.into(),
            control: PlayerControl::default(),
            head: PlayerPart::default(),
            boost: PlayerPart::default(),
            tail: vec![PlayerPart::default(); DEFAULT_TAIL_LEN],
            objects: Vec::new(),
        }
    }
}

impl PlayerModel {
    pub fn object(&self, id: &str) -> Option<&CustomObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn object_mut(&mut self, id: &str) -> Option<&mut CustomObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    /// Length of the longest custom object animation.
    pub fn anim_length(&self) -> f32 {
        self.objects
            .iter()
            .map(Animatable::anim_length)
            .fold(0.0, f32::max)
    }

    /// Decode a document, resolving its `base` key against `registry`.
    ///
    /// Fields the document leaves out take the base model's values instead of
    /// the built-in defaults. An unknown base is logged and ignored.
    pub fn from_tree_with(node: &Tree, registry: &ModelRegistry) -> Self {
        let base = match tree::find(node, &["base", "base_id"]) {
            Some(JsonValue::String(base_id)) => match registry.get(base_id) {
                Some(model) => model.copy(false),
                None => {
                    debug!("unknown base model {base_id}; using defaults");
                    Self::default()
                }
            },
            Some(other) => {
                debug!("unexpected base model reference {other}; using defaults");
                Self::default()
            }
            None => Self::default(),
        };
        Self::read_tree(node, base)
    }

    fn read_tree(node: &Tree, base: Self) -> Self {
        let id = match tree::find(node, &["id"]) {
            Some(JsonValue::String(s)) if !s.is_empty() => s.clone(),
            _ => base.id.clone(),
        };
        let control = match tree::get_child(node, &["ctrl", "control"]) {
            Some(child) => PlayerControl::read_tree(child, &base.control),
            None => base.control.clone(),
        };
        let head = read_part(node, "head", &base.head);
        let boost = read_part(node, "boost", &base.boost);

        let tail = match tree::get_array(node, &["tail"]) {
            Some(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    let part_base = base.tail.get(i).cloned().unwrap_or_default();
                    match item {
                        JsonValue::Object(child) => PlayerPart::read_tree(child, &part_base),
                        other => {
                            debug!("tail part {i} is {other}; using default");
                            part_base
                        }
                    }
                })
                .collect(),
            None => base.tail.clone(),
        };

        let objects = match tree::get_array(node, &["objects", "custom_objects"]) {
            Some(items) => items
                .iter()
                .filter_map(|item| match item {
                    JsonValue::Object(child) => Some(CustomObject::from_tree(child)),
                    other => {
                        debug!("skipping non-object custom object {other}");
                        None
                    }
                })
                .collect(),
            None => base.objects.clone(),
        };

        Self {
            id,
            name: tree::get_string(node, &["name", "n"], &base.name),
            creator: tree::get_string(node, &["creator", "c"], &base.creator),
            version: tree::get_string(node, &["version", "v"], &base.version),
            control,
            head,
            boost,
            tail,
            objects,
        }
    }
}

fn read_part(node: &Tree, key: &str, base: &PlayerPart) -> PlayerPart {
    match tree::get_child(node, &[key]) {
        Some(child) => PlayerPart::read_tree(child, base),
        None => base.clone(),
    }
}

impl Entity for PlayerModel {
    fn id(&self) -> &str {
        &self.id
    }

    /// Deep copy. Fresh object ids are propagated to every `parent` link that
    /// pointed at the old ids.
    fn copy(&self, preserve_id: bool) -> Self {
        let mut out = self.clone();
        out.objects = self.objects.iter().map(|o| o.copy(preserve_id)).collect();
        if !preserve_id {
            out.id = ids::generate();
            let remap: HashMap<&str, String> = self
                .objects
                .iter()
                .zip(&out.objects)
                .map(|(old, new)| (old.id.as_str(), new.id.clone()))
                .collect();
            for obj in out.objects.iter_mut() {
                if let Some(parent) = remap.get(obj.parent.as_str()) {
                    obj.parent = parent.clone();
                }
            }
        }
        out
    }
}

impl TreeCodec for PlayerModel {
    fn to_tree(&self) -> Tree {
        let mut node = Tree::new();
        node.insert("id".into(), JsonValue::String(self.id.clone()));
        tree::put_string(&mut node, "name", &self.name, DEFAULT_NAME);
        tree::put_string(&mut node, "creator", &self.creator, "");
        tree::put_string(&mut node, "version", &self.version, DEFAULT_VERSION);
        tree::put_child(&mut node, "ctrl", self.control.to_tree());
        tree::put_child(&mut node, "head", self.head.to_tree());
        tree::put_child(&mut node, "boost", self.boost.to_tree());

        let default_tail = vec![PlayerPart::default(); DEFAULT_TAIL_LEN];
        if self.tail != default_tail {
            let parts = self
                .tail
                .iter()
                .map(|p| JsonValue::Object(p.to_tree()))
                .collect();
            node.insert("tail".into(), JsonValue::Array(parts));
        }
        if !self.objects.is_empty() {
            let objects = self
                .objects
                .iter()
                .map(|o| JsonValue::Object(o.to_tree()))
                .collect();
            node.insert("objects".into(), JsonValue::Array(objects));
        }
        node
    }

    /// Decode without a registry; a `base` key falls back to the defaults.
    fn from_tree(node: &Tree) -> Self {
        Self::from_tree_with(node, &ModelRegistry::default())
    }
}

impl PacketCodec for PlayerModel {
    fn write_packet<W: Write>(&self, w: &mut PacketWriter<W>) -> Result<()> {
        w.write_string(&self.id)?;
        w.write_string(&self.name)?;
        w.write_string(&self.creator)?;
        w.write_string(&self.version)?;
        w.write_sub(|sub| self.control.write_packet(sub))?;
        w.write_sub(|sub| self.head.write_packet(sub))?;
        w.write_sub(|sub| self.boost.write_packet(sub))?;
        w.write_count(self.tail.len())?;
        for part in &self.tail {
            w.write_sub(|sub| part.write_packet(sub))?;
        }
        w.write_count(self.objects.len())?;
        for obj in &self.objects {
            w.write_sub(|sub| obj.write_packet(sub))?;
        }
        Ok(())
    }

    /// A corrupt part decodes as a default part; a corrupt custom object is dropped.
    fn read_packet<R: Read>(r: &mut PacketReader<R>) -> Result<Self> {
        let id = r.read_string()?;
        let name = r.read_string()?;
        let creator = r.read_string()?;
        let version = r.read_string()?;
        let control = r.read_sub("control", |sub| PlayerControl::read_packet(sub))?;
        let head = r.read_sub("head", |sub| PlayerPart::read_packet(sub))?;
        let boost = r.read_sub("boost", |sub| PlayerPart::read_packet(sub))?;

        let tail_len = r.read_count()?;
        let mut tail = Vec::with_capacity(tail_len);
        for _ in 0..tail_len {
            tail.push(r.read_sub("tail part", |sub| PlayerPart::read_packet(sub))?);
        }

        let object_count = r.read_count()?;
        let mut objects = Vec::with_capacity(object_count);
        for _ in 0..object_count {
            let obj: Option<CustomObject> =
                r.read_sub("custom object", |sub| CustomObject::read_packet(sub).map(Some))?;
            objects.extend(obj);
        }

        Ok(Self {
            id: if id.is_empty() { ids::generate() } else { id },
            name,
            creator,
            version,
            control,
            head,
            boost,
            tail,
            objects,
        })
    }
}
