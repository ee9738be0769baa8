//! Concrete entity catalogue: player models and everything they own.

pub mod control;
pub mod custom_object;
pub mod emitter;
pub mod part;
pub mod player_model;
pub mod shape;

pub use control::PlayerControl;
pub use custom_object::{CustomObject, Visibility};
pub use emitter::{ParticleEmitter, TrailEmitter};
pub use part::PlayerPart;
pub use player_model::PlayerModel;
pub use shape::Shape;

use serde_json::Value as JsonValue;

use crate::tree::{self, Tree};

/// Palette index meaning "use the companion hex colour".
pub const CUSTOM_COLOR: i32 = 24;
/// Palette index a new part starts with.
pub const DEFAULT_COLOR: i32 = 23;
pub const DEFAULT_HEX: &str = "FFFFFF";

/// Write a palette index with its hex companion as `{ "x": .., "hex": .. }`.
///
/// The hex is written only when the index selects [`CUSTOM_COLOR`], whatever
/// its own value; the node is omitted entirely when it would be empty.
pub(crate) fn put_color(node: &mut Tree, key: &str, index: i32, hex: &str) {
    let mut color = Tree::new();
    tree::put_i32(&mut color, "x", index, DEFAULT_COLOR);
    if index == CUSTOM_COLOR {
        color.insert("hex".into(), JsonValue::String(hex.to_string()));
    }
    tree::put_child(node, key, color);
}

/// Read a palette index and hex companion, starting from `base`.
/// A bare number under `keys` is accepted as the index alone.
pub(crate) fn get_color(node: &Tree, keys: &[&str], base: (i32, &str)) -> (i32, String) {
    match tree::find(node, keys) {
        Some(JsonValue::Object(color)) => (
            tree::get_i32(color, &["x"], base.0),
            tree::get_string(color, &["hex"], base.1),
        ),
        Some(raw) => (
            tree::parse_i32(raw).unwrap_or(base.0),
            base.1.to_string(),
        ),
        None => (base.0, base.1.to_string()),
    }
}

/// Read a small enumeration index, falling back to `default` when out of range.
pub(crate) fn get_u8(node: &Tree, keys: &[&str], default: u8) -> u8 {
    u8::try_from(tree::get_i32(node, keys, i32::from(default))).unwrap_or(default)
}
