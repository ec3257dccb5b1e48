//! Round-function backends and runtime capability selection.
//!
//! Every backend consumes the same [`KeySchedule`] layout and produces
//! identical output; they differ only in which instructions run the rounds.

use core::fmt;
use core::str::FromStr;
use std::sync::OnceLock;

use crate::block::Block;
use crate::error::Error;
use crate::key_schedule::{KeySchedule, ROUND_KEY_COUNT};

#[cfg(target_arch = "aarch64")]
mod aarch64;
mod portable;
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod x86;

/// Implementation used for the AES rounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Table-based S-box, available everywhere.
    Portable,
    /// x86/x86_64 AES-NI instructions.
    AesNi,
    /// ARMv8 cryptography extension.
    ArmCrypto,
}

impl Backend {
    /// All backends, fastest first.
    pub const ALL: [Backend; 3] = [Backend::AesNi, Backend::ArmCrypto, Backend::Portable];

    /// Returns the fastest backend the running CPU supports.
    ///
    /// The capability check runs once per process.
    pub fn detect() -> Backend {
        static DETECTED: OnceLock<Backend> = OnceLock::new();
        *DETECTED.get_or_init(|| {
            let backend = Self::ALL
                .into_iter()
                .find(|backend| backend.is_available())
                .unwrap_or(Backend::Portable);
            log::debug!("selected AES backend: {}", backend.name());
            backend
        })
    }

    /// Whether this backend can run on the current CPU.
    pub fn is_available(self) -> bool {
        match self {
            Backend::Portable => true,
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Backend::AesNi => x86::is_available(),
            #[cfg(target_arch = "aarch64")]
            Backend::ArmCrypto => aarch64::is_available(),
            _ => false,
        }
    }

    /// Stable lowercase name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Backend::Portable => "portable",
            Backend::AesNi => "aes-ni",
            Backend::ArmCrypto => "arm-crypto",
        }
    }

    pub(crate) fn expand(self, key: &[u8; 16]) -> KeySchedule {
        match self {
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Backend::AesNi => x86::expand(key),
            #[cfg(target_arch = "aarch64")]
            Backend::ArmCrypto => aarch64::expand(key),
            _ => portable::expand(key),
        }
    }

    /// CBC-encrypts `input` into `output`. Both lengths are equal, non-zero
    /// multiples of the block size.
    pub(crate) fn encrypt_cbc(
        self,
        keys: &[Block; ROUND_KEY_COUNT],
        iv: &Block,
        input: &[u8],
        output: &mut [u8],
    ) {
        debug_assert_eq!(input.len(), output.len());
        match self {
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Backend::AesNi => x86::encrypt_cbc(keys, iv, input, output),
            #[cfg(target_arch = "aarch64")]
            Backend::ArmCrypto => aarch64::encrypt_cbc(keys, iv, input, output),
            _ => portable::encrypt_cbc(keys, iv, input, output),
        }
    }

    /// CBC-decrypts `input` into `output` with the decryption round keys.
    pub(crate) fn decrypt_cbc(
        self,
        keys: &[Block; ROUND_KEY_COUNT],
        iv: &Block,
        input: &[u8],
        output: &mut [u8],
    ) {
        debug_assert_eq!(input.len(), output.len());
        match self {
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Backend::AesNi => x86::decrypt_cbc(keys, iv, input, output),
            #[cfg(target_arch = "aarch64")]
            Backend::ArmCrypto => aarch64::decrypt_cbc(keys, iv, input, output),
            _ => portable::decrypt_cbc(keys, iv, input, output),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|backend| backend.name() == s)
            .ok_or(Error::InvalidInput {
                reason: "unknown backend name",
            })
    }
}
