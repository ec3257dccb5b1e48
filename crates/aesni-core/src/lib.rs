//! AES-128 in CBC mode, accelerated by the CPU's AES round instructions.
//!
//! This crate follows FIPS-197 and NIST SP 800-38A and provides:
//! - The AES-128 key schedule for both the forward and the equivalent inverse
//!   cipher, computed once when an [`AesKey`] is created.
//! - CBC encryption and decryption of buffers the caller has already padded
//!   to a multiple of 16 bytes.
//! - Runtime selection between AES-NI, the ARMv8 crypto extension and a
//!   portable table-based implementation, all producing identical output.
//!
//! No padding scheme, authentication or other modes are provided.
//!
//! ```
//! use aesni_core::{decrypt_to_vec, encrypt_to_vec, AesKey};
//!
//! let key = AesKey::create(&[0x2b; 16])?;
//! let iv = [0u8; 16];
//! let ciphertext = encrypt_to_vec(b"sixteen byte msg", &key, &iv)?;
//! assert_eq!(decrypt_to_vec(&ciphertext, &key, &iv)?, b"sixteen byte msg");
//! # Ok::<(), aesni_core::Error>(())
//! ```

#![cfg_attr(
    not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")),
    forbid(unsafe_code)
)]
#![deny(missing_docs)]

mod backend;
mod block;
mod bytes;
mod cbc;
mod error;
mod key;
mod key_schedule;
mod round;
mod sbox;

pub use crate::backend::Backend;
pub use crate::block::{Block, BLOCK_SIZE};
pub use crate::bytes::{hex_decode, reverse_bytes, ReverseBytes};
pub use crate::cbc::{decrypt, decrypt_to_vec, encrypt, encrypt_to_vec};
pub use crate::error::{Buffer, Error};
pub use crate::key::{Aes128Key, AesKey};
pub use crate::key_schedule::{KeySchedule, BYTES_PER_ROUND_KEY, ROUND_COUNT, ROUND_KEY_COUNT};
