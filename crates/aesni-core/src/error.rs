//! Error reporting.
//!
//! Every failure is a precondition violation detected before any cryptographic
//! work starts, so no output buffer is ever left partially written.

use core::fmt;

/// Identifies which argument of a call was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Buffer {
    /// The plaintext input or output.
    Plaintext,
    /// The ciphertext input or output.
    Ciphertext,
    /// The initialization vector.
    Iv,
}

impl Buffer {
    fn as_str(self) -> &'static str {
        match self {
            Buffer::Plaintext => "plaintext",
            Buffer::Ciphertext => "ciphertext",
            Buffer::Iv => "iv",
        }
    }
}

impl fmt::Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors reported by key construction, the CBC routines and the byte helpers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// The raw key length is not one of the supported sizes.
    UnsupportedKeySize {
        /// Length of the rejected key in bytes.
        len: usize,
    },
    /// A required buffer is empty.
    EmptyInput {
        /// The empty buffer.
        buffer: Buffer,
    },
    /// A buffer length is not a multiple of the block size.
    BlockAlignment {
        /// The misaligned buffer.
        buffer: Buffer,
        /// Required alignment in bytes.
        block_size: usize,
    },
    /// The destination buffer cannot hold the result.
    BufferTooSmall {
        /// The undersized destination.
        buffer: Buffer,
        /// Bytes needed.
        required: usize,
        /// Bytes available.
        actual: usize,
    },
    /// The requested operation has no implementation for this key or platform.
    UnsupportedOperation {
        /// Short description of what was requested.
        what: &'static str,
    },
    /// Malformed auxiliary input, such as an odd-length hex string.
    InvalidInput {
        /// Why the input was rejected.
        reason: &'static str,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnsupportedKeySize { len } => {
                write!(f, "key size not supported: {len} bytes (expected 16)")
            }
            Error::EmptyInput { buffer } => write!(f, "{buffer} must not be empty"),
            Error::BlockAlignment { buffer, block_size } => {
                write!(f, "{buffer} length must be a multiple of {block_size} bytes")
            }
            Error::BufferTooSmall {
                buffer,
                required,
                actual,
            } => write!(
                f,
                "{buffer} buffer too small: {actual} bytes available, {required} required"
            ),
            Error::UnsupportedOperation { what } => write!(f, "not supported: {what}"),
            Error::InvalidInput { reason } => write!(f, "invalid input: {reason}"),
        }
    }
}

impl std::error::Error for Error {}
