//! Cursor for reading BCS bytes out of a borrowed slice.

use crate::{
    error::{
        Result,
        Error,
    },
    uleb128,
};
use num_bigint::BigUint;
use std::mem::size_of;


/// Reads values out of a byte slice, advancing an internal cursor. The
/// cursor never passes the end of the slice; a read that would is an
/// `Error::ShortBuffer`.
///
/// A reader lives for one parse call and must not outlive the bytes it
/// borrows.
#[derive(Debug)]
pub struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

macro_rules! read_le_bytes {
    ($($m:ident($t:ident),)*)=>{$(
        pub fn $m(&mut self) -> Result<$t> {
            let mut buf = [0; size_of::<$t>()];
            let n = buf.len();
            let bytes = self.read_bytes(n)?;
            buf.copy_from_slice(bytes);
            Ok($t::from_le_bytes(buf))
        }
    )*};
}

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Reader { bytes, pos: 0 }
    }

    /// Current cursor position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    /// Returns a view of the next `n` bytes and advances the cursor past
    /// them.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(Error::ShortBuffer {
                pos: self.pos,
                needed: n,
                remaining: self.remaining(),
            });
        }
        let bytes = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    read_le_bytes!(
        read_u8(u8),
        read_u16(u16),
        read_u32(u32),
        read_u64(u64),
        read_u128(u128),
    );

    /// Read a u256 as the concatenation of two little-endian u128 halves.
    pub fn read_u256(&mut self) -> Result<BigUint> {
        let low = self.read_u128()?;
        let high = self.read_u128()?;
        Ok((BigUint::from(high) << 128) | BigUint::from(low))
    }

    /// Read a ULEB128-encoded length or tag.
    pub fn read_uleb128(&mut self) -> Result<u32> {
        let (value, consumed) = uleb128::decode(&self.bytes[self.pos..])
            .map_err(|e| match e {
                // starved mid-value; report against this buffer
                Error::ShortBuffer { .. } => Error::ShortBuffer {
                    pos: self.bytes.len(),
                    needed: 1,
                    remaining: 0,
                },
                other => other,
            })?;
        self.pos += consumed;
        Ok(value)
    }

    /// Read a ULEB128 length prefix, then that many elements via `cb`,
    /// which is called as `cb(reader, index, len)`.
    pub fn read_vec<T>(
        &mut self,
        mut cb: impl FnMut(&mut Self, usize, usize) -> Result<T>,
    ) -> Result<Vec<T>> {
        let len = self.read_uleb128()? as usize;
        // the length prefix is attacker-controlled, cap the preallocation
        let mut out = Vec::with_capacity(usize::min(len, 4096));
        for i in 0..len {
            out.push(cb(self, i, len)?);
        }
        Ok(out)
    }

    /// Read exactly `n` elements via `cb`, no length prefix.
    pub fn read_fixed<T>(
        &mut self,
        n: usize,
        mut cb: impl FnMut(&mut Self, usize, usize) -> Result<T>,
    ) -> Result<Vec<T>> {
        let mut out = Vec::with_capacity(usize::min(n, 4096));
        for i in 0..n {
            out.push(cb(self, i, n)?);
        }
        Ok(out)
    }
}


#[test]
fn reads_are_little_endian() {
    let mut r = Reader::new(&[0x00, 0xef, 0xcd, 0xab, 0x78, 0x56, 0x34, 0x12]);
    assert_eq!(r.read_u64().unwrap(), 0x12345678abcdef00);
    assert_eq!(r.remaining(), 0);

    let mut r = Reader::new(&[0x01, 0x02, 0x03, 0x04]);
    assert_eq!(r.read_u16().unwrap(), 0x0201);
    assert_eq!(r.read_u16().unwrap(), 0x0403);
}

#[test]
fn read_u256_concatenates_halves() {
    let mut bytes = vec![0xff; 32];
    bytes[31] = 0x7f;
    let mut r = Reader::new(&bytes);
    let n = r.read_u256().unwrap();
    assert_eq!(n, (BigUint::from(1u8) << 255) - 1u8);
}

#[test]
fn short_reads_fail_without_advancing_past_end() {
    let mut r = Reader::new(&[0x01, 0x02]);
    let err = r.read_u32().unwrap_err();
    assert!(matches!(
        err,
        Error::ShortBuffer { pos: 0, needed: 4, remaining: 2 },
    ));
    // cursor untouched by the failed read
    assert_eq!(r.position(), 0);
    assert_eq!(r.read_u16().unwrap(), 0x0201);
}

#[test]
fn read_vec_reads_prefix_then_elements() {
    let mut r = Reader::new(&[0x03, 0x0a, 0x0b, 0x0c]);
    let v = r.read_vec(|r, _, _| r.read_u8()).unwrap();
    assert_eq!(v, vec![0x0a, 0x0b, 0x0c]);
}

#[test]
fn read_fixed_has_no_prefix() {
    let mut r = Reader::new(&[0x0a, 0x0b]);
    let v = r.read_fixed(2, |r, _, _| r.read_u8()).unwrap();
    assert_eq!(v, vec![0x0a, 0x0b]);
}

#[test]
fn read_uleb128_advances_by_consumed_bytes() {
    let mut r = Reader::new(&[0xe8, 0x07, 0xff]);
    assert_eq!(r.read_uleb128().unwrap(), 1000);
    assert_eq!(r.position(), 2);
}
