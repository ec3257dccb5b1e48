//! Byte-order and hex helpers used to build key material.

use crate::error::Error;

/// Integers whose byte order can be reversed.
pub trait ReverseBytes: Copy {
    /// Returns the value with its bytes in the opposite order.
    fn reverse_bytes(self) -> Self;
}

macro_rules! impl_reverse_bytes {
    ($($ty:ty),*) => {
        $(
            impl ReverseBytes for $ty {
                #[inline]
                fn reverse_bytes(self) -> Self {
                    self.swap_bytes()
                }
            }
        )*
    };
}

impl_reverse_bytes!(u16, u32, u64);

/// Reverses the byte order of a 16, 32 or 64-bit word.
#[inline]
pub fn reverse_bytes<T: ReverseBytes>(word: T) -> T {
    word.reverse_bytes()
}

/// Decodes a hex string, two digits per byte, in either case.
///
/// Odd-length strings and non-hex characters are rejected.
pub fn hex_decode(s: &str) -> Result<Vec<u8>, Error> {
    hex::decode(s).map_err(|err| match err {
        hex::FromHexError::OddLength => Error::InvalidInput {
            reason: "hex string has an odd number of digits",
        },
        hex::FromHexError::InvalidHexCharacter { .. } => Error::InvalidInput {
            reason: "hex string contains a non-hex character",
        },
        _ => Error::InvalidInput {
            reason: "hex string has an invalid length",
        },
    })
}
