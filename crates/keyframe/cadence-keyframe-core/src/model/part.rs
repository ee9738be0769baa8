//! A body part of a player model: head, boost or one tail segment.

use std::io::{Read, Write};

use crate::error::Result;
use crate::packet::{PacketReader, PacketWriter};
use crate::tree::{self, Tree};

use super::{get_color, put_color, ParticleEmitter, Shape, TrailEmitter, DEFAULT_COLOR, DEFAULT_HEX};

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerPart {
    pub active: bool,
    pub shape: Shape,
    pub position: [f32; 2],
    pub scale: [f32; 2],
    /// Degrees.
    pub rotation: f32,
    pub color: i32,
    pub hex: String,
    pub opacity: f32,
    pub trail: TrailEmitter,
    pub particles: ParticleEmitter,
}

impl Default for PlayerPart {
    fn default() -> Self {
        Self {
            active: true,
            shape: Shape::default(),
            position: [0.0, 0.0],
            scale: [1.0, 1.0],
            rotation: 0.0,
            color: DEFAULT_COLOR,
            hex: DEFAULT_HEX.into(),
            opacity: 1.0,
            trail: TrailEmitter::default(),
            particles: ParticleEmitter::default(),
        }
    }
}

impl PlayerPart {
    pub fn to_tree(&self) -> Tree {
        let d = Self::default();
        let mut node = Tree::new();
        tree::put_bool(&mut node, "active", self.active, d.active);
        self.shape.write_tree(&mut node);
        tree::put_vec2(&mut node, "pos", self.position, d.position);
        tree::put_vec2(&mut node, "sca", self.scale, d.scale);
        tree::put_f32(&mut node, "rot", self.rotation, d.rotation);
        put_color(&mut node, "col", self.color, &self.hex);
        tree::put_f32(&mut node, "opa", self.opacity, d.opacity);
        tree::put_child(&mut node, "tr", self.trail.to_tree());
        tree::put_child(&mut node, "pa", self.particles.to_tree());
        node
    }

    /// Read over `base`; nested emitters are read over the base's emitters.
    pub fn read_tree(node: &Tree, base: &Self) -> Self {
        let (color, hex) = get_color(node, &["col", "color"], (base.color, &base.hex));
        let trail = match tree::get_child(node, &["tr", "trail"]) {
            Some(child) => TrailEmitter::read_tree(child, &base.trail),
            None => base.trail.clone(),
        };
        let particles = match tree::get_child(node, &["pa", "particles"]) {
            Some(child) => ParticleEmitter::read_tree(child, &base.particles),
            None => base.particles.clone(),
        };
        Self {
            active: tree::get_bool(node, &["active", "a"], base.active),
            shape: Shape::read_tree(node, base.shape),
            position: tree::get_vec2(node, &["pos", "position"], base.position),
            scale: tree::get_vec2(node, &["sca", "scale"], base.scale),
            rotation: tree::get_f32(node, &["rot", "rotation"], base.rotation),
            color,
            hex,
            opacity: tree::get_f32(node, &["opa", "opacity"], base.opacity),
            trail,
            particles,
        }
    }

    pub fn write_packet<W: Write>(&self, w: &mut PacketWriter<W>) -> Result<()> {
        w.write_bool(self.active)?;
        self.shape.write_packet(w)?;
        w.write_vec2(self.position)?;
        w.write_vec2(self.scale)?;
        w.write_f32(self.rotation)?;
        w.write_i32(self.color)?;
        w.write_string(&self.hex)?;
        w.write_f32(self.opacity)?;
        w.write_sub(|sub| self.trail.write_packet(sub))?;
        w.write_sub(|sub| self.particles.write_packet(sub))
    }

    pub fn read_packet<R: Read>(r: &mut PacketReader<R>) -> Result<Self> {
        Ok(Self {
            active: r.read_bool()?,
            shape: Shape::read_packet(r)?,
            position: r.read_vec2()?,
            scale: r.read_vec2()?,
            rotation: r.read_f32()?,
            color: r.read_i32()?,
            hex: r.read_string()?,
            opacity: r.read_f32()?,
            trail: r.read_sub("trail", |sub| TrailEmitter::read_packet(sub))?,
            particles: r.read_sub("particles", |sub| ParticleEmitter::read_packet(sub))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CUSTOM_COLOR;
    use serde_json::json;

    fn as_tree(value: serde_json::Value) -> Tree {
        match value {
            serde_json::Value::Object(m) => m,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn custom_hex_needs_the_sentinel() {
        let part = PlayerPart {
            color: 5,
            hex: "123456".into(),
            ..PlayerPart::default()
        };
        assert_eq!(part.to_tree()["col"], json!({ "x": "5" }));

        let part = PlayerPart {
            color: CUSTOM_COLOR,
            hex: "123456".into(),
            ..PlayerPart::default()
        };
        assert_eq!(part.to_tree()["col"], json!({ "x": "24", "hex": "123456" }));
    }

    #[test]
    fn legacy_keys_and_native_scalars_are_read() {
        let node = as_tree(json!({
            "a": false,
            "position": { "x": 1.5, "y": -2 },
            "scale": ["2", "3"],
            "rotation": 45,
            "trail": { "emitting": "true" }
        }));
        let part = PlayerPart::read_tree(&node, &PlayerPart::default());
        assert!(!part.active);
        assert_eq!(part.position, [1.5, -2.0]);
        assert_eq!(part.scale, [2.0, 3.0]);
        assert_eq!(part.rotation, 45.0);
        assert!(part.trail.emitting);
        assert_eq!(part.opacity, 1.0);
    }

    #[test]
    fn unparseable_fields_fall_back() {
        let node = as_tree(json!({ "rot": "abc", "opa": "0.5" }));
        let part = PlayerPart::read_tree(&node, &PlayerPart::default());
        assert_eq!(part.rotation, 0.0);
        assert_eq!(part.opacity, 0.5);
    }
}
