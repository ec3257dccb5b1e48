//! Key types.

use core::fmt;

use crate::backend::Backend;
use crate::error::Error;
use crate::key_schedule::{KeySchedule, BYTES_PER_ROUND_KEY};

/// AES-128 key with its precomputed schedule.
///
/// The schedule is derived once at construction and wiped when the key is
/// dropped.
#[derive(Clone)]
pub struct Aes128Key {
    schedule: KeySchedule,
    backend: Backend,
}

impl Aes128Key {
    /// Raw key length in bytes.
    pub const KEY_SIZE: usize = 16;

    fn new(raw: &[u8; 16], backend: Backend) -> Result<Self, Error> {
        if !backend.is_available() {
            return Err(Error::UnsupportedOperation {
                what: "AES backend not available on this CPU",
            });
        }
        log::trace!("expanding AES-128 key with the {backend} backend");
        Ok(Self {
            schedule: backend.expand(raw),
            backend,
        })
    }

    /// The expanded key schedule.
    #[inline]
    pub fn schedule(&self) -> &KeySchedule {
        &self.schedule
    }

    /// Backend that runs the rounds for this key.
    #[inline]
    pub fn backend(&self) -> Backend {
        self.backend
    }
}

impl fmt::Debug for Aes128Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aes128Key")
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}

/// An AES key of one of the supported sizes.
#[derive(Clone, Debug)]
pub enum AesKey {
    /// 128-bit key, ten rounds.
    Aes128(Aes128Key),
}

impl AesKey {
    /// Size of a single round key in bytes.
    pub const BYTES_PER_ROUND_KEY: usize = BYTES_PER_ROUND_KEY;

    /// Expands `raw` using the fastest backend the CPU supports.
    ///
    /// Only 16-byte keys are supported; any other length fails with
    /// [`Error::UnsupportedKeySize`].
    pub fn create(raw: &[u8]) -> Result<Self, Error> {
        Self::create_with_backend(raw, Backend::detect())
    }

    /// Expands `raw` for a specific backend.
    ///
    /// Fails with [`Error::UnsupportedOperation`] when the backend cannot run
    /// on this CPU.
    pub fn create_with_backend(raw: &[u8], backend: Backend) -> Result<Self, Error> {
        match <&[u8; Aes128Key::KEY_SIZE]>::try_from(raw) {
            Ok(raw) => Ok(AesKey::Aes128(Aes128Key::new(raw, backend)?)),
            Err(_) => Err(Error::UnsupportedKeySize { len: raw.len() }),
        }
    }

    /// Raw key length in bytes.
    pub fn key_size(&self) -> usize {
        match self {
            AesKey::Aes128(_) => Aes128Key::KEY_SIZE,
        }
    }

    /// The expanded schedule.
    pub fn schedule(&self) -> &KeySchedule {
        match self {
            AesKey::Aes128(key) => key.schedule(),
        }
    }

    /// The full expanded key schedule as a flat byte slice: encryption round
    /// keys first, then the decryption round keys.
    pub fn expanded_key(&self) -> &[u8] {
        self.schedule().as_bytes()
    }

    /// Backend that runs the rounds for this key.
    pub fn backend(&self) -> Backend {
        match self {
            AesKey::Aes128(key) => key.backend(),
        }
    }
}
