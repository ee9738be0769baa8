//! Binary packet primitives.
//!
//! The packet format carries no field names and omits nothing: each entity
//! writes its fields in a fixed order. Integers and floats are little endian,
//! strings are a `u32` byte length followed by UTF-8, and fixed-size float
//! vectors are written back to back without a length.
//!
//! Composite sub-entities are framed as `presence: u8`, `len: u32`,
//! `payload[len]`. The frame belongs to the enclosing entity, so a short frame
//! is fatal; a payload that fails to decode is logged and replaced by the
//! default value while the outer stream stays aligned. Payload bytes left over
//! after a successful decode are ignored, which lets older readers accept
//! sub-entities written by newer ones.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::warn;

use crate::config::PacketLimits;
use crate::error::{Error, Result};

/// Typed writer over any byte sink.
pub struct PacketWriter<W: Write> {
    inner: W,
}

impl<W: Write> PacketWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn write_u8(&mut self, v: u8) -> Result<()> {
        self.inner.write_u8(v)?;
        Ok(())
    }

    pub fn write_bool(&mut self, v: bool) -> Result<()> {
        self.write_u8(u8::from(v))
    }

    pub fn write_i32(&mut self, v: i32) -> Result<()> {
        self.inner.write_i32::<LittleEndian>(v)?;
        Ok(())
    }

    pub fn write_u32(&mut self, v: u32) -> Result<()> {
        self.inner.write_u32::<LittleEndian>(v)?;
        Ok(())
    }

    pub fn write_f32(&mut self, v: f32) -> Result<()> {
        self.inner.write_f32::<LittleEndian>(v)?;
        Ok(())
    }

    pub fn write_string(&mut self, v: &str) -> Result<()> {
        self.write_len("string", v.len())?;
        self.inner.write_all(v.as_bytes())?;
        Ok(())
    }

    /// Fixed-size float vector; the reader must know the arity.
    pub fn write_f32s(&mut self, values: &[f32]) -> Result<()> {
        for v in values {
            self.write_f32(*v)?;
        }
        Ok(())
    }

    pub fn write_vec2(&mut self, v: [f32; 2]) -> Result<()> {
        self.write_f32s(&v)
    }

    /// Element count for a list that follows.
    pub fn write_count(&mut self, count: usize) -> Result<()> {
        self.write_len("list", count)
    }

    fn write_len(&mut self, what: &'static str, len: usize) -> Result<()> {
        let len32 = u32::try_from(len).map_err(|_| Error::LengthOutOfRange {
            what,
            len,
            limit: u32::MAX as usize,
        })?;
        self.write_u32(len32)
    }

    /// Write a framed sub-entity. `encode` writes the payload into a scratch buffer.
    pub fn write_sub<F>(&mut self, encode: F) -> Result<()>
    where
        F: FnOnce(&mut PacketWriter<Vec<u8>>) -> Result<()>,
    {
        let mut payload = PacketWriter::new(Vec::new());
        encode(&mut payload)?;
        let bytes = payload.into_inner();
        self.write_bool(true)?;
        self.write_len("payload", bytes.len())?;
        self.inner.write_all(&bytes)?;
        Ok(())
    }

    /// Write the absent marker for an optional sub-entity.
    pub fn write_absent(&mut self) -> Result<()> {
        self.write_bool(false)
    }
}

/// Typed reader over any byte source, bounded by [`PacketLimits`].
pub struct PacketReader<R: Read> {
    inner: R,
    limits: PacketLimits,
}

impl<R: Read> PacketReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_limits(inner, PacketLimits::default())
    }

    pub fn with_limits(inner: R, limits: PacketLimits) -> Self {
        Self { inner, limits }
    }

    pub fn limits(&self) -> PacketLimits {
        self.limits
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.inner.read_u8()?)
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(self.inner.read_i32::<LittleEndian>()?)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(self.inner.read_u32::<LittleEndian>()?)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(self.inner.read_f32::<LittleEndian>()?)
    }

    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_len("string", self.limits.max_string_len)?;
        let mut buf = vec![0u8; len];
        self.inner.read_exact(&mut buf)?;
        Ok(String::from_utf8(buf)?)
    }

    /// Fill `out` with `out.len()` consecutive floats.
    pub fn read_f32s(&mut self, out: &mut [f32]) -> Result<()> {
        for slot in out.iter_mut() {
            *slot = self.read_f32()?;
        }
        Ok(())
    }

    pub fn read_vec2(&mut self) -> Result<[f32; 2]> {
        let mut out = [0.0; 2];
        self.read_f32s(&mut out)?;
        Ok(out)
    }

    pub fn read_count(&mut self) -> Result<usize> {
        self.read_len("list", self.limits.max_list_len)
    }

    fn read_len(&mut self, what: &'static str, limit: usize) -> Result<usize> {
        let len = self.read_u32()? as usize;
        if len > limit {
            return Err(Error::LengthOutOfRange { what, len, limit });
        }
        Ok(len)
    }

    /// Read a framed sub-entity.
    ///
    /// An absent marker yields `T::default()`. A frame cut short by the end of
    /// the stream is an error for the caller; a payload that `decode` rejects is
    /// logged and replaced by `T::default()`.
    pub fn read_sub<T, F>(&mut self, what: &str, decode: F) -> Result<T>
    where
        T: Default,
        F: FnOnce(&mut PacketReader<&[u8]>) -> Result<T>,
    {
        if !self.read_bool()? {
            return Ok(T::default());
        }
        let len = self.read_len("payload", self.limits.max_payload_len)?;
        let mut payload = vec![0u8; len];
        self.inner.read_exact(&mut payload)?;

        let mut sub = PacketReader::with_limits(payload.as_slice(), self.limits);
        match decode(&mut sub) {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!("failed to decode {what} ({}): {err}; using default", err.category());
                Ok(T::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Pair(i32, f32);

    fn encode_pair(w: &mut PacketWriter<Vec<u8>>, p: &Pair) -> Result<()> {
        w.write_i32(p.0)?;
        w.write_f32(p.1)
    }

    fn decode_pair(r: &mut PacketReader<&[u8]>) -> Result<Pair> {
        Ok(Pair(r.read_i32()?, r.read_f32()?))
    }

    #[test]
    fn primitives_round_trip() {
        let mut w = PacketWriter::new(Vec::new());
        w.write_u8(7).unwrap();
        w.write_bool(true).unwrap();
        w.write_i32(-42).unwrap();
        w.write_f32(1.25).unwrap();
        w.write_string("héllo").unwrap();
        w.write_vec2([3.0, -4.0]).unwrap();
        let bytes = w.into_inner();

        let mut r = PacketReader::new(bytes.as_slice());
        assert_eq!(r.read_u8().unwrap(), 7);
        assert!(r.read_bool().unwrap());
        assert_eq!(r.read_i32().unwrap(), -42);
        assert_eq!(r.read_f32().unwrap(), 1.25);
        assert_eq!(r.read_string().unwrap(), "héllo");
        assert_eq!(r.read_vec2().unwrap(), [3.0, -4.0]);
    }

    #[test]
    fn corrupt_sub_payload_defaults_and_keeps_alignment() {
        let mut w = PacketWriter::new(Vec::new());
        // Payload too short for a Pair.
        w.write_sub(|sub| sub.write_u8(1)).unwrap();
        w.write_i32(99).unwrap();
        let bytes = w.into_inner();

        let mut r = PacketReader::new(bytes.as_slice());
        let pair: Pair = r.read_sub("pair", decode_pair).unwrap();
        assert_eq!(pair, Pair::default());
        assert_eq!(r.read_i32().unwrap(), 99);
    }

    #[test]
    fn trailing_payload_bytes_are_ignored() {
        let mut w = PacketWriter::new(Vec::new());
        w.write_sub(|sub| {
            encode_pair(sub, &Pair(3, 0.5))?;
            sub.write_string("added in a later version")
        })
        .unwrap();
        w.write_absent().unwrap();
        let bytes = w.into_inner();

        let mut r = PacketReader::new(bytes.as_slice());
        assert_eq!(r.read_sub("pair", decode_pair).unwrap(), Pair(3, 0.5));
        assert_eq!(r.read_sub("pair", decode_pair).unwrap(), Pair::default());
    }

    #[test]
    fn truncated_frame_is_fatal() {
        let mut w = PacketWriter::new(Vec::new());
        w.write_sub(|sub| encode_pair(sub, &Pair(1, 1.0))).unwrap();
        let mut bytes = w.into_inner();
        bytes.truncate(bytes.len() - 2);

        let mut r = PacketReader::new(bytes.as_slice());
        let err = r.read_sub("pair", decode_pair).unwrap_err();
        assert!(err.is_truncation());
    }

    #[test]
    fn oversized_lengths_are_rejected_before_allocating() {
        let mut w = PacketWriter::new(Vec::new());
        w.write_u32(1_000).unwrap();
        let bytes = w.into_inner();
        let limits = PacketLimits {
            max_string_len: 16,
            ..PacketLimits::default()
        };
        let mut r = PacketReader::with_limits(bytes.as_slice(), limits);
        assert!(matches!(
            r.read_string(),
            Err(Error::LengthOutOfRange { len: 1_000, limit: 16, .. })
        ));
    }
}
