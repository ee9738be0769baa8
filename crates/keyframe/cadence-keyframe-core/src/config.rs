//! Core configuration for cadence-keyframe-core.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::object::{from_packet_bytes_with, PacketCodec};

/// Configuration for codec limits and editing behaviour.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of digits in identities minted by the timeline session, raised
    /// to [`crate::ids::MIN_ID_LENGTH`] when smaller. `Entity::copy` always
    /// uses [`crate::ids::DEFAULT_ID_LENGTH`].
    pub id_length: usize,
    /// Limits used by [`Config::read_packet`].
    pub packet: PacketLimits,
    pub session: SessionConfig,
}

/// Upper bounds checked by the packet reader before it allocates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacketLimits {
    pub max_string_len: usize,
    pub max_list_len: usize,
    /// Largest framed sub-entity payload, in bytes.
    pub max_payload_len: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Route edited times through the snapping collaborator.
    pub snap_to_grid: bool,
    /// Lower clamp for non-baseline keyframe times.
    pub min_keyframe_time: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            id_length: crate::ids::DEFAULT_ID_LENGTH,
            packet: PacketLimits::default(),
            session: SessionConfig::default(),
        }
    }
}

impl Default for PacketLimits {
    fn default() -> Self {
        Self {
            max_string_len: 1 << 20,
            max_list_len: 1 << 16,
            max_payload_len: 1 << 24,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            snap_to_grid: false,
            min_keyframe_time: 0.0,
        }
    }
}

impl Config {
    /// Parse a config document. Missing keys keep their defaults.
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Decode a packet under this config's limits.
    pub fn read_packet<T: PacketCodec>(&self, bytes: &[u8]) -> Result<T> {
        from_packet_bytes_with(bytes, self.packet)
    }
}
