//! Sparse text tree helpers.
//!
//! A tree node is a JSON object whose leaves are written as text: numbers in
//! locale-free decimal form and booleans as `"true"`/`"false"`. Writers only
//! emit a key when the value differs from the field's default. Readers look a
//! field up under a list of accepted keys (current name first, then legacy
//! names; the first key present wins), accept either text or native JSON
//! leaves, and fall back to the default on anything unparseable.

use log::debug;
use serde_json::{Map, Value as JsonValue};

/// One node of the sparse text tree.
pub type Tree = Map<String, JsonValue>;

/// Format a float the way the text format stores it.
///
/// Rust's `Display` for `f32` is locale independent and prints the shortest
/// string that parses back to the same value.
#[inline]
pub fn format_f32(value: f32) -> String {
    value.to_string()
}

/// First value stored under any of `keys`.
pub fn find<'a>(node: &'a Tree, keys: &[&str]) -> Option<&'a JsonValue> {
    keys.iter().find_map(|k| node.get(*k))
}

pub fn parse_f32(value: &JsonValue) -> Option<f32> {
    match value {
        JsonValue::String(s) => s.trim().parse::<f32>().ok(),
        JsonValue::Number(n) => n.as_f64().map(|f| f as f32),
        _ => None,
    }
}

pub fn parse_i32(value: &JsonValue) -> Option<i32> {
    match value {
        JsonValue::String(s) => {
            let s = s.trim();
            s.parse::<i32>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.fract() == 0.0 && *f >= i32::MIN as f64 && *f <= i32::MAX as f64)
                    .map(|f| f as i32)
            })
        }
        JsonValue::Number(n) => n.as_i64().and_then(|i| i32::try_from(i).ok()),
        _ => None,
    }
}

pub fn parse_bool(value: &JsonValue) -> Option<bool> {
    match value {
        JsonValue::Bool(b) => Some(*b),
        JsonValue::String(s) => match s.trim() {
            t if t.eq_ignore_ascii_case("true") => Some(true),
            t if t.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn read_or_default<T: Copy + std::fmt::Debug>(
    node: &Tree,
    keys: &[&str],
    default: T,
    parse: fn(&JsonValue) -> Option<T>,
) -> T {
    match find(node, keys) {
        None => default,
        Some(raw) => parse(raw).unwrap_or_else(|| {
            debug!("unparseable value {raw} under {keys:?}; using default {default:?}");
            default
        }),
    }
}

pub fn get_f32(node: &Tree, keys: &[&str], default: f32) -> f32 {
    read_or_default(node, keys, default, parse_f32)
}

pub fn get_i32(node: &Tree, keys: &[&str], default: i32) -> i32 {
    read_or_default(node, keys, default, parse_i32)
}

pub fn get_bool(node: &Tree, keys: &[&str], default: bool) -> bool {
    read_or_default(node, keys, default, parse_bool)
}

pub fn get_string(node: &Tree, keys: &[&str], default: &str) -> String {
    match find(node, keys) {
        Some(JsonValue::String(s)) => s.clone(),
        Some(JsonValue::Number(n)) => n.to_string(),
        Some(other) => {
            debug!("non-text value {other} under {keys:?}; using default");
            default.to_string()
        }
        None => default.to_string(),
    }
}

/// Read a 2D vector stored either as `{ "x": .., "y": .. }` or as a two-element array.
/// Missing components keep their default.
pub fn get_vec2(node: &Tree, keys: &[&str], default: [f32; 2]) -> [f32; 2] {
    match find(node, keys) {
        Some(JsonValue::Object(obj)) => [
            get_f32(obj, &["x"], default[0]),
            get_f32(obj, &["y"], default[1]),
        ],
        Some(JsonValue::Array(items)) => {
            let mut out = default;
            for (slot, item) in out.iter_mut().zip(items) {
                if let Some(v) = parse_f32(item) {
                    *slot = v;
                }
            }
            out
        }
        Some(other) => {
            debug!("unexpected vector shape {other} under {keys:?}; using default");
            default
        }
        None => default,
    }
}

/// Read a float array into `out`, leaving unparseable or missing slots untouched.
pub fn fill_f32s(value: &JsonValue, out: &mut [f32]) {
    match value {
        JsonValue::Array(items) => {
            for (slot, item) in out.iter_mut().zip(items) {
                match parse_f32(item) {
                    Some(v) => *slot = v,
                    None => debug!("unparseable array element {item}; keeping {slot}"),
                }
            }
        }
        other => debug!("expected array, found {other}"),
    }
}

pub fn get_child<'a>(node: &'a Tree, keys: &[&str]) -> Option<&'a Tree> {
    match find(node, keys)? {
        JsonValue::Object(obj) => Some(obj),
        other => {
            debug!("expected object under {keys:?}, found {other}");
            None
        }
    }
}

pub fn get_array<'a>(node: &'a Tree, keys: &[&str]) -> Option<&'a [JsonValue]> {
    match find(node, keys)? {
        JsonValue::Array(items) => Some(items.as_slice()),
        other => {
            debug!("expected array under {keys:?}, found {other}");
            None
        }
    }
}

pub fn put_f32(node: &mut Tree, key: &str, value: f32, default: f32) {
    if value != default {
        node.insert(key.to_string(), JsonValue::String(format_f32(value)));
    }
}

pub fn put_i32(node: &mut Tree, key: &str, value: i32, default: i32) {
    if value != default {
        node.insert(key.to_string(), JsonValue::String(value.to_string()));
    }
}

pub fn put_bool(node: &mut Tree, key: &str, value: bool, default: bool) {
    if value != default {
        node.insert(key.to_string(), JsonValue::String(value.to_string()));
    }
}

pub fn put_string(node: &mut Tree, key: &str, value: &str, default: &str) {
    if value != default {
        node.insert(key.to_string(), JsonValue::String(value.to_string()));
    }
}

/// Write a vector as `{ "x": .., "y": .. }`; each component is itself sparse.
pub fn put_vec2(node: &mut Tree, key: &str, value: [f32; 2], default: [f32; 2]) {
    if value != default {
        let mut obj = Tree::new();
        put_f32(&mut obj, "x", value[0], default[0]);
        put_f32(&mut obj, "y", value[1], default[1]);
        node.insert(key.to_string(), JsonValue::Object(obj));
    }
}

/// Dense float array, used where the arity is fixed by the owner.
pub fn f32_array(values: &[f32]) -> JsonValue {
    JsonValue::Array(
        values
            .iter()
            .map(|v| JsonValue::String(format_f32(*v)))
            .collect(),
    )
}

/// Insert a nested node unless it is empty.
pub fn put_child(node: &mut Tree, key: &str, child: Tree) {
    if !child.is_empty() {
        node.insert(key.to_string(), JsonValue::Object(child));
    }
}
