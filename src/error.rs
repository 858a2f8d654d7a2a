//! Error type shared by every fallible operation in the crate.
//!
//! All errors are fatal to the call that produced them; nothing internal
//! retries or swallows. The variants mirror the ways a codec call can go
//! wrong: bad input before any byte moves (`Validation`), the writer
//! hitting its size ceiling (`Capacity`), the reader running off the end
//! of the buffer (`ShortBuffer`), bytes that don't decode (`Malformed`),
//! and misassembled schemas (`Schema`).

use thiserror::Error;


pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// Input failed a validator before serialization touched the writer.
    #[error("invalid input: {0}")]
    Validation(String),
    /// Writer would have to grow past its `max_size`.
    #[error("writer out of capacity: {0}")]
    Capacity(String),
    /// Reader was asked to read past the end of its buffer.
    #[error("unexpected end of input: {needed} byte(s) needed at position {pos}, {remaining} remaining")]
    ShortBuffer {
        pos: usize,
        needed: usize,
        remaining: usize,
    },
    /// Bytes that cannot decode under the schema.
    #[error("malformed data: {0}")]
    Malformed(String),
    /// Schema assembled wrong: unknown registry name, alias cycle, arity
    /// mismatch.
    #[error("schema error: {0}")]
    Schema(String),
}

/// Construct an `Error` of the given variant from format args.
macro_rules! error {
    ($kind:ident, $($t:tt)*)=>{
        $crate::error::Error::$kind(format!($($t)*))
    };
}

/// Return early with an `Error` of the given variant.
macro_rules! bail {
    ($kind:ident, $($t:tt)*)=>{
        return Err($crate::error::error!($kind, $($t)*))
    };
}

/// Return early with an `Error` of the given variant unless the condition
/// holds.
macro_rules! ensure {
    ($c:expr, $kind:ident, $($t:tt)*)=>{
        if !$c {
            $crate::error::bail!($kind, $($t)*);
        }
    };
}

pub(crate) use bail;
pub(crate) use ensure;
pub(crate) use error;


#[test]
fn error_macros_produce_the_right_variants() {
    fn fails() -> Result<()> {
        ensure!(1 > 2, Validation, "{} is not greater than {}", 1, 2);
        Ok(())
    }
    assert!(matches!(fails(), Err(Error::Validation(_))));
    assert!(matches!(
        error!(Malformed, "tag {}", 9),
        Error::Malformed(_),
    ));
}

#[test]
fn error_display_carries_context() {
    let e = Error::ShortBuffer { pos: 4, needed: 8, remaining: 2 };
    let msg = e.to_string();
    assert!(msg.contains("position 4"));
    assert!(msg.contains("2 remaining"));
}
