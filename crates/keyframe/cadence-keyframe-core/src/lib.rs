//! Cadence Keyframe Core
//!
//! Data model for animatable player models: identity and deep copy, a sparse
//! JSON tree codec that omits defaults, a dense binary packet codec, keyframe
//! sequences with easing and randomization, and a timeline edit session for
//! batch authoring.

pub mod animatable;
pub mod channel;
pub mod config;
pub mod easing;
pub mod error;
pub mod ids;
pub mod keyframe;
pub mod model;
pub mod object;
pub mod packet;
pub mod random;
pub mod registry;
pub mod sequence;
pub mod session;
pub mod snap;
pub mod tree;

// Re-exports for consumers
pub use animatable::{AnimChannels, Animatable, SequenceKey};
pub use channel::ChannelKind;
pub use config::{Config, PacketLimits, SessionConfig};
pub use easing::{Easing, EasingKind, StandardEasing};
pub use error::{Error, Result};
pub use keyframe::{EventKeyframe, RandomMode, RANDOM_SLOTS};
pub use model::{
    CustomObject, ParticleEmitter, PlayerControl, PlayerModel, PlayerPart, Shape, TrailEmitter,
    Visibility,
};
pub use object::{
    copy_or_default, from_json_str, from_packet_bytes, from_packet_bytes_with, to_json_string,
    to_packet_bytes, Entity, PacketCodec, TreeCodec,
};
pub use packet::{PacketReader, PacketWriter};
pub use random::EvalContext;
pub use registry::{ModelRegistry, ModelRegistryBuilder};
pub use sequence::{KeyframeSequence, BASELINE_TIME};
pub use session::{Clipboard, ClipboardEntry, Selected, TimelineSession, ValueOp};
pub use snap::{BeatGrid, NoSnap, TimeSnap};
pub use tree::Tree;
