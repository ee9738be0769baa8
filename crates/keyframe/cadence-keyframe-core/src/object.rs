//! Shared object model: identity, deep copy, and the two codec contracts.
//!
//! Every persisted entity carries a string identity and implements:
//! - [`Entity::copy`]: structural deep copy, regenerating identities unless asked to keep them;
//! - [`TreeCodec`]: the sparse text tree (default-valued fields omitted);
//! - [`PacketCodec`]: the dense binary packet (fixed order, nothing omitted).

use std::io::{Read, Write};

use serde_json::Value as JsonValue;

use crate::config::PacketLimits;
use crate::error::{Error, Result};
use crate::packet::{PacketReader, PacketWriter};
use crate::tree::Tree;

/// Identity-bearing, deep-copyable object.
pub trait Entity: Clone + Default {
    fn id(&self) -> &str;

    /// Deep copy. With `preserve_id == false` the copy and every nested entity
    /// whose identity regenerates on copy receive fresh identities.
    fn copy(&self, preserve_id: bool) -> Self;
}

/// Copy an optional source; an absent source yields the canonical default.
pub fn copy_or_default<T: Entity>(source: Option<&T>, preserve_id: bool) -> T {
    source.map(|s| s.copy(preserve_id)).unwrap_or_default()
}

/// Conversion to and from the sparse text tree.
pub trait TreeCodec: Sized {
    fn to_tree(&self) -> Tree;

    /// Decode, substituting defaults for anything absent or unparseable.
    fn from_tree(tree: &Tree) -> Self;
}

/// Conversion to and from the binary packet stream.
pub trait PacketCodec: Sized {
    fn write_packet<W: Write>(&self, w: &mut PacketWriter<W>) -> Result<()>;

    fn read_packet<R: Read>(r: &mut PacketReader<R>) -> Result<Self>;
}

/// Serialize an entity as a JSON document.
pub fn to_json_string<T: TreeCodec>(entity: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(&JsonValue::Object(
        entity.to_tree(),
    ))?)
}

/// Parse a JSON document into an entity. Only a malformed document or a
/// non-object root is an error.
pub fn from_json_str<T: TreeCodec>(s: &str) -> Result<T> {
    match serde_json::from_str::<JsonValue>(s)? {
        JsonValue::Object(tree) => Ok(T::from_tree(&tree)),
        other => Err(Error::Json {
            reason: format!("expected an object at the document root, found {other}"),
        }),
    }
}

pub fn to_packet_bytes<T: PacketCodec>(entity: &T) -> Result<Vec<u8>> {
    let mut w = PacketWriter::new(Vec::new());
    entity.write_packet(&mut w)?;
    Ok(w.into_inner())
}

pub fn from_packet_bytes<T: PacketCodec>(bytes: &[u8]) -> Result<T> {
    from_packet_bytes_with(bytes, PacketLimits::default())
}

pub fn from_packet_bytes_with<T: PacketCodec>(bytes: &[u8], limits: PacketLimits) -> Result<T> {
    let mut r = PacketReader::with_limits(bytes, limits);
    T::read_packet(&mut r)
}
