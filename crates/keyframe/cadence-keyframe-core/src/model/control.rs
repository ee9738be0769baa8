//! Player control block: movement and health tuning.

use std::io::{Read, Write};

use crate::error::Result;
use crate::packet::{PacketReader, PacketWriter};
use crate::tree::{self, Tree};

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerControl {
    pub base_speed: f32,
    pub boost_speed: f32,
    pub boost_cooldown: f32,
    pub min_boost_time: f32,
    pub max_boost_time: f32,
    pub hit_cooldown: f32,
    pub health: i32,
    /// Use the exact shape outline for hit detection.
    pub accurate_collision: bool,
}

impl Default for PlayerControl {
    fn default() -> Self {
        Self {
            base_speed: 20.0,
            boost_speed: 85.0,
            boost_cooldown: 0.1,
            min_boost_time: 0.07,
            max_boost_time: 0.18,
            hit_cooldown: 2.5,
            health: 3,
            accurate_collision: false,
        }
    }
}

impl PlayerControl {
    pub fn to_tree(&self) -> Tree {
        let d = Self::default();
        let mut node = Tree::new();
        tree::put_f32(&mut node, "spd", self.base_speed, d.base_speed);
        tree::put_f32(&mut node, "bst_spd", self.boost_speed, d.boost_speed);
        tree::put_f32(&mut node, "bst_cd", self.boost_cooldown, d.boost_cooldown);
        tree::put_f32(&mut node, "bst_min", self.min_boost_time, d.min_boost_time);
        tree::put_f32(&mut node, "bst_max", self.max_boost_time, d.max_boost_time);
        tree::put_f32(&mut node, "hit_cd", self.hit_cooldown, d.hit_cooldown);
        tree::put_i32(&mut node, "hp", self.health, d.health);
        tree::put_bool(&mut node, "col_acc", self.accurate_collision, d.accurate_collision);
        node
    }

    /// Read over `base`: absent keys keep the base values.
    pub fn read_tree(node: &Tree, base: &Self) -> Self {
        Self {
            base_speed: tree::get_f32(node, &["spd", "base_speed"], base.base_speed),
            boost_speed: tree::get_f32(node, &["bst_spd", "boost_speed"], base.boost_speed),
            boost_cooldown: tree::get_f32(node, &["bst_cd", "boost_cooldown"], base.boost_cooldown),
            min_boost_time: tree::get_f32(node, &["bst_min"], base.min_boost_time),
            max_boost_time: tree::get_f32(node, &["bst_max"], base.max_boost_time),
            hit_cooldown: tree::get_f32(node, &["hit_cd", "hit_cooldown"], base.hit_cooldown),
            health: tree::get_i32(node, &["hp", "health"], base.health),
            accurate_collision: tree::get_bool(node, &["col_acc"], base.accurate_collision),
        }
    }

    pub fn write_packet<W: Write>(&self, w: &mut PacketWriter<W>) -> Result<()> {
        w.write_f32(self.base_speed)?;
        w.write_f32(self.boost_speed)?;
        w.write_f32(self.boost_cooldown)?;
        w.write_f32(self.min_boost_time)?;
        w.write_f32(self.max_boost_time)?;
        w.write_f32(self.hit_cooldown)?;
        w.write_i32(self.health)?;
        w.write_bool(self.accurate_collision)
    }

    pub fn read_packet<R: Read>(r: &mut PacketReader<R>) -> Result<Self> {
        Ok(Self {
            base_speed: r.read_f32()?,
            boost_speed: r.read_f32()?,
            boost_cooldown: r.read_f32()?,
            min_boost_time: r.read_f32()?,
            max_boost_time: r.read_f32()?,
            hit_cooldown: r.read_f32()?,
            health: r.read_i32()?,
            accurate_collision: r.read_bool()?,
        })
    }
}
