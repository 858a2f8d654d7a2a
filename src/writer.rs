//! Cursor for writing BCS bytes into a growable, bounded buffer.

use crate::{
    error::{
        Result,
        ensure,
        error,
    },
    uleb128,
};
use num_bigint::BigUint;


/// Size parameters for a [`Writer`].
///
/// `max_size` of `None` means "same as `initial_size`", which keeps the
/// buffer from growing at all unless the caller opts in.
#[derive(Debug, Clone, Copy)]
pub struct WriterOptions {
    pub initial_size: usize,
    pub max_size: Option<usize>,
    pub grow_chunk: usize,
}

impl Default for WriterOptions {
    fn default() -> Self {
        WriterOptions {
            initial_size: 1024,
            max_size: None,
            grow_chunk: 1024,
        }
    }
}

/// Writes values into an owned byte buffer, advancing an internal cursor.
///
/// The buffer starts at `initial_size` and grows in increments of
/// `grow_chunk`, never past `max_size`; a write that cannot fit even
/// after growing is an `Error::Capacity`. The buffer never shrinks.
///
/// Write methods return `&mut Self` so calls chain.
#[derive(Debug)]
pub struct Writer {
    buf: Vec<u8>,
    pos: usize,
    max_size: usize,
    grow_chunk: usize,
}

impl Default for Writer {
    fn default() -> Self {
        Writer::new()
    }
}

macro_rules! write_le_bytes {
    ($($m:ident($t:ident),)*)=>{$(
        pub fn $m(&mut self, n: $t) -> Result<&mut Self> {
            self.write_bytes(&n.to_le_bytes())
        }
    )*};
}

impl Writer {
    pub fn new() -> Self {
        Writer::with_options(WriterOptions::default())
    }

    pub fn with_options(options: WriterOptions) -> Self {
        let max_size = options.max_size.unwrap_or(options.initial_size);
        let initial = usize::min(options.initial_size, max_size);
        Writer {
            buf: vec![0; initial],
            pos: 0,
            max_size,
            grow_chunk: options.grow_chunk,
        }
    }

    /// Current cursor position, which is also the number of bytes written
    /// so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Grow until `additional` more bytes fit under the cursor, in
    /// `grow_chunk` increments capped at `max_size`. A growth step that
    /// makes no progress (a zero `grow_chunk`) fails rather than spins.
    fn ensure(&mut self, additional: usize) -> Result<()> {
        let required = self.pos + additional;
        while required > self.buf.len() {
            ensure!(
                self.buf.len() < self.max_size,
                Capacity,
                "write of {} byte(s) at position {} exceeds max_size {}",
                additional,
                self.pos,
                self.max_size,
            );
            let next = usize::min(self.max_size, self.buf.len() + self.grow_chunk);
            ensure!(
                next > self.buf.len(),
                Capacity,
                "write of {} byte(s) at position {} cannot grow the buffer past {} with grow_chunk 0",
                additional,
                self.pos,
                self.buf.len(),
            );
            self.buf.resize(next, 0);
        }
        Ok(())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<&mut Self> {
        self.ensure(bytes.len())?;
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(self)
    }

    write_le_bytes!(
        write_u8(u8),
        write_u16(u16),
        write_u32(u32),
        write_u64(u64),
        write_u128(u128),
    );

    /// Write a u256 as two little-endian u128 halves (32 bytes total).
    pub fn write_u256(&mut self, n: &BigUint) -> Result<&mut Self> {
        ensure!(n.bits() <= 256, Validation, "{} does not fit in a u256", n);
        let mut bytes = n.to_bytes_le();
        bytes.resize(32, 0);
        self.write_bytes(&bytes)
    }

    /// Write a ULEB128-encoded length or tag.
    pub fn write_uleb128(&mut self, n: u32) -> Result<&mut Self> {
        let (buf, len) = uleb128::encode(n);
        self.write_bytes(&buf[..len])
    }

    /// Write a ULEB128 length prefix, then every element via `cb`, which
    /// is called as `cb(writer, element, index, len)`.
    pub fn write_vec<E>(
        &mut self,
        values: &[E],
        mut cb: impl FnMut(&mut Self, &E, usize, usize) -> Result<()>,
    ) -> Result<&mut Self> {
        let len = u32::try_from(values.len()).map_err(|_| {
            error!(Validation, "sequence of {} elements exceeds u32 length", values.len())
        })?;
        self.write_uleb128(len)?;
        for (i, value) in values.iter().enumerate() {
            cb(self, value, i, values.len())?;
        }
        Ok(self)
    }

    /// Write exactly `n` elements via `cb`, no length prefix. A length
    /// mismatch is an error, never a truncation.
    pub fn write_fixed<E>(
        &mut self,
        values: &[E],
        n: usize,
        mut cb: impl FnMut(&mut Self, &E, usize, usize) -> Result<()>,
    ) -> Result<&mut Self> {
        ensure!(
            values.len() == n,
            Validation,
            "expected exactly {} element(s), got {}",
            n,
            values.len(),
        );
        for (i, value) in values.iter().enumerate() {
            cb(self, value, i, n)?;
        }
        Ok(self)
    }

    /// Copy out the bytes written so far.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.buf[..self.pos].to_vec()
    }

    /// Consume the writer, keeping only the bytes written.
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.buf.truncate(self.pos);
        self.buf
    }
}


#[cfg(test)]
use crate::error::Error;

#[test]
fn writes_are_little_endian_and_chain() {
    let mut w = Writer::new();
    w.write_u16(0x0201).unwrap().write_u8(0xff).unwrap();
    assert_eq!(w.to_bytes(), vec![0x01, 0x02, 0xff]);
}

#[test]
fn writer_grows_in_chunks_up_to_max_size() {
    let mut w = Writer::with_options(WriterOptions {
        initial_size: 2,
        max_size: Some(8),
        grow_chunk: 3,
    });
    for i in 0..8u8 {
        w.write_u8(i).unwrap();
    }
    let err = w.write_u8(9).unwrap_err();
    assert!(matches!(err, Error::Capacity(_)));
    assert_eq!(w.to_bytes(), (0..8).collect::<Vec<u8>>());
}

#[test]
fn bulk_write_larger_than_one_chunk_still_fits() {
    let mut w = Writer::with_options(WriterOptions {
        initial_size: 1,
        max_size: Some(64),
        grow_chunk: 4,
    });
    w.write_bytes(&[0xaa; 40]).unwrap();
    assert_eq!(w.position(), 40);
}

#[test]
fn zero_grow_chunk_errors_instead_of_hanging() {
    let mut w = Writer::with_options(WriterOptions {
        initial_size: 10,
        max_size: Some(100),
        grow_chunk: 0,
    });
    // writes within the initial allocation are unaffected
    w.write_bytes(&[0xaa; 10]).unwrap();
    assert!(matches!(w.write_u8(1), Err(Error::Capacity(_))));
    assert_eq!(w.position(), 10);
}

#[test]
fn max_size_defaults_to_initial_size() {
    let mut w = Writer::with_options(WriterOptions {
        initial_size: 4,
        ..WriterOptions::default()
    });
    w.write_u32(7).unwrap();
    assert!(matches!(w.write_u8(1), Err(Error::Capacity(_))));
}

#[test]
fn write_u256_pads_to_32_bytes() {
    let mut w = Writer::new();
    w.write_u256(&BigUint::from(1u8)).unwrap();
    let bytes = w.into_bytes();
    assert_eq!(bytes.len(), 32);
    assert_eq!(bytes[0], 1);
    assert!(bytes[1..].iter().all(|&b| b == 0));
}

#[test]
fn write_u256_rejects_257_bit_values() {
    let mut w = Writer::new();
    let too_big = BigUint::from(1u8) << 256;
    assert!(matches!(w.write_u256(&too_big), Err(Error::Validation(_))));
    // nothing written by the failed call
    assert_eq!(w.position(), 0);
}

#[test]
fn write_vec_prefixes_the_length() {
    let mut w = Writer::new();
    w.write_vec(&[1u8, 2, 3], |w, e, _, _| w.write_u8(*e).map(drop))
        .unwrap();
    assert_eq!(w.to_bytes(), vec![0x03, 1, 2, 3]);
}

#[test]
fn write_fixed_rejects_length_mismatch() {
    let mut w = Writer::new();
    let err = w
        .write_fixed(&[1u8, 2, 3], 2, |w, e, _, _| w.write_u8(*e).map(drop))
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}
