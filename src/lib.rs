//! # losslesslab
//!
//! Experimental lossless compression library bundling several classical
//! algorithms on top of a shared zero-copy I/O substrate.
//!
//! * [`huffman`] builds a tree from byte frequencies and serializes it on the wire
//!   alongside the bit-packed payload.
//! * [`lzss`] is a sliding-window literal/match coder with block framing.
//! * [`rans`] is a 64-bit range-asymmetric numeral system entropy coder.
//! * [`dmc`] is a small binary state-machine prototype; it is not a codec.
//!
//! The substrate ([`byte_buffer`], [`cursor`], [`bitset`]) is shared by the
//! codecs above. Each codec operates on byte slices in, `Vec<u8>` out; file
//! I/O is a thin wrapper that composes on top (`compress_file`/`decompress_file`
//! in each codec module).
//!
//! ## Buffer Example
//!
//! ```rs
//! use losslesslab::huffman;
//! let test_data = "This is the chaunt of the priests.  The chaunt of the priests of Mung.".as_bytes();
//! let compressed = huffman::compress(test_data).expect("compression failed");
//! let expanded = huffman::decompress(&compressed).expect("expansion failed");
//! assert_eq!(test_data.to_vec(), expanded);
//! ```

pub mod bitset;
pub mod byte_buffer;
pub mod cursor;
pub mod huffman;
pub mod lzss;
pub mod rans;
pub mod dmc;

/// Convenience alias matching the shape of errors that can cross a file-I/O boundary.
pub type DynErr = Box<dyn std::error::Error>;

/// Crate-wide error taxonomy.
///
/// Every fallible boundary function (`compress`/`decompress` on each codec)
/// returns `Result<_, CodecError>`. Unchecked cursor primitives are exempt:
/// their preconditions are established by the caller and a violation panics
/// rather than returning an error, matching an "unchecked primitive" contract.
#[derive(thiserror::Error, Debug)]
pub enum CodecError {
    #[error("allocation failure")]
    AllocationFailure,
    #[error("buffer overflow: {reason}")]
    BufferOverflow { reason: String },
    #[error("malformed input: {reason}")]
    MalformedInput { reason: String },
    #[error("invariant violation: {reason}")]
    InvariantViolation { reason: String },
}

impl CodecError {
    pub(crate) fn overflow<S: Into<String>>(reason: S) -> Self {
        CodecError::BufferOverflow { reason: reason.into() }
    }
    pub(crate) fn malformed<S: Into<String>>(reason: S) -> Self {
        CodecError::MalformedInput { reason: reason.into() }
    }
    pub(crate) fn invariant<S: Into<String>>(reason: S) -> Self {
        CodecError::InvariantViolation { reason: reason.into() }
    }
}
