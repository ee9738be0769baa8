//! Shape selection shared by parts, particles and custom objects.

use std::io::{Read, Write};

use crate::error::Result;
use crate::packet::{PacketReader, PacketWriter};
use crate::tree::{self, Tree};

use super::get_u8;

/// Shape family and the variant within it. Embedded by value in its owner,
/// whose node carries the `s` and `so` keys directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Shape {
    pub shape: u8,
    pub option: u8,
}

impl Shape {
    pub const fn new(shape: u8, option: u8) -> Self {
        Self { shape, option }
    }

    pub fn write_tree(&self, node: &mut Tree) {
        tree::put_i32(node, "s", i32::from(self.shape), 0);
        tree::put_i32(node, "so", i32::from(self.option), 0);
    }

    pub fn read_tree(node: &Tree, base: Shape) -> Self {
        Self {
            shape: get_u8(node, &["s", "shape"], base.shape),
            option: get_u8(node, &["so", "shape_option"], base.option),
        }
    }

    pub fn write_packet<W: Write>(&self, w: &mut PacketWriter<W>) -> Result<()> {
        w.write_u8(self.shape)?;
        w.write_u8(self.option)
    }

    pub fn read_packet<R: Read>(r: &mut PacketReader<R>) -> Result<Self> {
        Ok(Self {
            shape: r.read_u8()?,
            option: r.read_u8()?,
        })
    }
}
