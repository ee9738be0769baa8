//! Animated channel kinds: arity, neutral values and persisted keys.

use std::fmt;

/// One animated property of an animatable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChannelKind {
    /// 2D offset `[x, y]`.
    Position,
    /// 2D scale `[x, y]`.
    Scale,
    /// Rotation in degrees `[angle]`.
    Rotation,
    /// `[palette index, opacity, hue, saturation, value]`; opacity 0 is fully opaque.
    Color,
}

impl ChannelKind {
    /// Persisted order of channels.
    pub const ALL: [ChannelKind; 4] = [
        ChannelKind::Position,
        ChannelKind::Scale,
        ChannelKind::Rotation,
        ChannelKind::Color,
    ];

    #[inline]
    pub fn arity(&self) -> usize {
        self.default_values().len()
    }

    /// Values of a freshly created baseline keyframe.
    #[inline]
    pub fn default_values(&self) -> &'static [f32] {
        match self {
            Self::Position => &[0.0, 0.0],
            Self::Scale => &[1.0, 1.0],
            Self::Rotation => &[0.0],
            Self::Color => &[0.0, 0.0, 0.0, 0.0, 0.0],
        }
    }

    /// Current key followed by legacy keys, in lookup order.
    #[inline]
    pub fn keys(&self) -> &'static [&'static str] {
        match self {
            Self::Position => &["pos", "position"],
            Self::Scale => &["sca", "scale"],
            Self::Rotation => &["rot", "rotation"],
            Self::Color => &["col", "color"],
        }
    }

    #[inline]
    pub fn key(&self) -> &'static str {
        self.keys()[0]
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Position => "position",
            Self::Scale => "scale",
            Self::Rotation => "rotation",
            Self::Color => "color",
        })
    }
}
