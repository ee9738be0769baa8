//! Trail and particle emitters attached to player parts.

use std::io::{Read, Write};

use crate::error::Result;
use crate::packet::{PacketReader, PacketWriter};
use crate::tree::{self, Tree};

use super::{get_color, put_color, Shape, DEFAULT_COLOR, DEFAULT_HEX};

#[derive(Debug, Clone, PartialEq)]
pub struct TrailEmitter {
    pub emitting: bool,
    /// Seconds a trail segment stays alive.
    pub lifetime: f32,
    pub start_width: f32,
    pub end_width: f32,
    pub start_color: i32,
    pub start_hex: String,
    pub start_opacity: f32,
    pub end_color: i32,
    pub end_hex: String,
    pub end_opacity: f32,
    pub offset: [f32; 2],
}

impl Default for TrailEmitter {
    fn default() -> Self {
        Self {
            emitting: false,
            lifetime: 1.0,
            start_width: 1.0,
            end_width: 0.2,
            start_color: DEFAULT_COLOR,
            start_hex: DEFAULT_HEX.into(),
            start_opacity: 1.0,
            end_color: DEFAULT_COLOR,
            end_hex: DEFAULT_HEX.into(),
            end_opacity: 0.0,
            offset: [0.0, 0.0],
        }
    }
}

impl TrailEmitter {
    pub fn to_tree(&self) -> Tree {
        let d = Self::default();
        let mut node = Tree::new();
        tree::put_bool(&mut node, "em", self.emitting, d.emitting);
        tree::put_f32(&mut node, "t", self.lifetime, d.lifetime);
        tree::put_f32(&mut node, "sw", self.start_width, d.start_width);
        tree::put_f32(&mut node, "ew", self.end_width, d.end_width);
        put_color(&mut node, "sc", self.start_color, &self.start_hex);
        tree::put_f32(&mut node, "so", self.start_opacity, d.start_opacity);
        put_color(&mut node, "ec", self.end_color, &self.end_hex);
        tree::put_f32(&mut node, "eo", self.end_opacity, d.end_opacity);
        tree::put_vec2(&mut node, "pos", self.offset, d.offset);
        node
    }

    pub fn read_tree(node: &Tree, base: &Self) -> Self {
        let (start_color, start_hex) =
            get_color(node, &["sc", "start_color"], (base.start_color, &base.start_hex));
        let (end_color, end_hex) =
            get_color(node, &["ec", "end_color"], (base.end_color, &base.end_hex));
        Self {
            emitting: tree::get_bool(node, &["em", "emitting"], base.emitting),
            lifetime: tree::get_f32(node, &["t", "time"], base.lifetime),
            start_width: tree::get_f32(node, &["sw"], base.start_width),
            end_width: tree::get_f32(node, &["ew"], base.end_width),
            start_color,
            start_hex,
            start_opacity: tree::get_f32(node, &["so"], base.start_opacity),
            end_color,
            end_hex,
            end_opacity: tree::get_f32(node, &["eo"], base.end_opacity),
            offset: tree::get_vec2(node, &["pos"], base.offset),
        }
    }

    pub fn write_packet<W: Write>(&self, w: &mut PacketWriter<W>) -> Result<()> {
        w.write_bool(self.emitting)?;
        w.write_f32(self.lifetime)?;
        w.write_f32(self.start_width)?;
        w.write_f32(self.end_width)?;
        w.write_i32(self.start_color)?;
        w.write_string(&self.start_hex)?;
        w.write_f32(self.start_opacity)?;
        w.write_i32(self.end_color)?;
        w.write_string(&self.end_hex)?;
        w.write_f32(self.end_opacity)?;
        w.write_vec2(self.offset)
    }

    pub fn read_packet<R: Read>(r: &mut PacketReader<R>) -> Result<Self> {
        Ok(Self {
            emitting: r.read_bool()?,
            lifetime: r.read_f32()?,
            start_width: r.read_f32()?,
            end_width: r.read_f32()?,
            start_color: r.read_i32()?,
            start_hex: r.read_string()?,
            start_opacity: r.read_f32()?,
            end_color: r.read_i32()?,
            end_hex: r.read_string()?,
            end_opacity: r.read_f32()?,
            offset: r.read_vec2()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParticleEmitter {
    pub emitting: bool,
    pub shape: Shape,
    pub color: i32,
    pub hex: String,
    pub start_opacity: f32,
    pub end_opacity: f32,
    pub start_scale: f32,
    pub end_scale: f32,
    pub rotation: f32,
    pub lifetime: f32,
    pub speed: f32,
    /// Particles emitted per burst.
    pub amount: i32,
    pub force: [f32; 2],
    pub trail_emitting: bool,
}

impl Default for ParticleEmitter {
    fn default() -> Self {
        Self {
            emitting: false,
            shape: Shape::default(),
            color: DEFAULT_COLOR,
            hex: DEFAULT_HEX.into(),
            start_opacity: 1.0,
            end_opacity: 0.0,
            start_scale: 1.0,
            end_scale: 0.0,
            rotation: 0.0,
            lifetime: 5.0,
            speed: 5.0,
            amount: 1,
            force: [0.0, 0.0],
            trail_emitting: false,
        }
    }
}

impl ParticleEmitter {
    pub fn to_tree(&self) -> Tree {
        let d = Self::default();
        let mut node = Tree::new();
        tree::put_bool(&mut node, "em", self.emitting, d.emitting);
        self.shape.write_tree(&mut node);
        put_color(&mut node, "col", self.color, &self.hex);
        tree::put_f32(&mut node, "so", self.start_opacity, d.start_opacity);
        tree::put_f32(&mut node, "eo", self.end_opacity, d.end_opacity);
        tree::put_f32(&mut node, "ss", self.start_scale, d.start_scale);
        tree::put_f32(&mut node, "es", self.end_scale, d.end_scale);
        tree::put_f32(&mut node, "rot", self.rotation, d.rotation);
        tree::put_f32(&mut node, "lt", self.lifetime, d.lifetime);
        tree::put_f32(&mut node, "spd", self.speed, d.speed);
        tree::put_i32(&mut node, "amt", self.amount, d.amount);
        tree::put_vec2(&mut node, "frc", self.force, d.force);
        tree::put_bool(&mut node, "trem", self.trail_emitting, d.trail_emitting);
        node
    }

    pub fn read_tree(node: &Tree, base: &Self) -> Self {
        let (color, hex) = get_color(node, &["col", "color"], (base.color, &base.hex));
        Self {
            emitting: tree::get_bool(node, &["em", "emitting"], base.emitting),
            shape: Shape::read_tree(node, base.shape),
            color,
            hex,
            start_opacity: tree::get_f32(node, &["so"], base.start_opacity),
            end_opacity: tree::get_f32(node, &["eo"], base.end_opacity),
            start_scale: tree::get_f32(node, &["ss"], base.start_scale),
            end_scale: tree::get_f32(node, &["es"], base.end_scale),
            rotation: tree::get_f32(node, &["rot"], base.rotation),
            lifetime: tree::get_f32(node, &["lt", "lifetime"], base.lifetime),
            speed: tree::get_f32(node, &["spd", "speed"], base.speed),
            amount: tree::get_i32(node, &["amt", "amount"], base.amount),
            force: tree::get_vec2(node, &["frc", "force"], base.force),
            trail_emitting: tree::get_bool(node, &["trem"], base.trail_emitting),
        }
    }

    pub fn write_packet<W: Write>(&self, w: &mut PacketWriter<W>) -> Result<()> {
        w.write_bool(self.emitting)?;
        self.shape.write_packet(w)?;
        w.write_i32(self.color)?;
        w.write_string(&self.hex)?;
        w.write_f32(self.start_opacity)?;
        w.write_f32(self.end_opacity)?;
        w.write_f32(self.start_scale)?;
        w.write_f32(self.end_scale)?;
        w.write_f32(self.rotation)?;
        w.write_f32(self.lifetime)?;
        w.write_f32(self.speed)?;
        w.write_i32(self.amount)?;
        w.write_vec2(self.force)?;
        w.write_bool(self.trail_emitting)
    }

    pub fn read_packet<R: Read>(r: &mut PacketReader<R>) -> Result<Self> {
        Ok(Self {
            emitting: r.read_bool()?,
            shape: Shape::read_packet(r)?,
            color: r.read_i32()?,
            hex: r.read_string()?,
            start_opacity: r.read_f32()?,
            end_opacity: r.read_f32()?,
            start_scale: r.read_f32()?,
            end_scale: r.read_f32()?,
            rotation: r.read_f32()?,
            lifetime: r.read_f32()?,
            speed: r.read_f32()?,
            amount: r.read_i32()?,
            force: r.read_vec2()?,
            trail_emitting: r.read_bool()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CUSTOM_COLOR;

    #[test]
    fn default_emitters_write_nothing() {
        assert!(TrailEmitter::default().to_tree().is_empty());
        assert!(ParticleEmitter::default().to_tree().is_empty());
    }

    #[test]
    fn trail_colours_gate_their_hex_independently() {
        let trail = TrailEmitter {
            start_color: CUSTOM_COLOR,
            start_hex: "00FF00".into(),
            end_hex: "0000FF".into(),
            ..TrailEmitter::default()
        };
        let node = trail.to_tree();
        assert!(node.contains_key("sc"));
        assert!(!node.contains_key("ec"));

        let back = TrailEmitter::read_tree(&node, &TrailEmitter::default());
        assert_eq!(back.start_hex, "00FF00");
        assert_eq!(back.end_hex, DEFAULT_HEX);
    }
}
