//! AES-128 key schedule for the forward and equivalent inverse ciphers.

use core::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::block::{Block, BLOCK_SIZE};
use crate::round::inv_mix_columns;
use crate::sbox::sbox;

/// Number of full rounds for a 128-bit key.
pub const ROUND_COUNT: usize = 10;

/// Round keys per direction: one per round plus the initial whitening key.
pub const ROUND_KEY_COUNT: usize = ROUND_COUNT + 1;

/// Size of a single round key in bytes.
pub const BYTES_PER_ROUND_KEY: usize = BLOCK_SIZE;

const RCON: [u8; ROUND_COUNT] = [0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80, 0x1b, 0x36];

/// The expanded key: eleven encryption round keys followed by eleven
/// decryption round keys for the equivalent inverse cipher.
///
/// Decryption key `0` is encryption key `10`, decryption key `10` is
/// encryption key `0`, and the nine keys in between are encryption keys `9`
/// down to `1` with InvMixColumns applied. The schedule is wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeySchedule {
    keys: [[Block; ROUND_KEY_COUNT]; 2],
}

impl KeySchedule {
    /// Builds a schedule from forward round keys, deriving the decryption
    /// region with `inv_mix`.
    pub(crate) fn from_forward(
        encrypt: [Block; ROUND_KEY_COUNT],
        inv_mix: impl Fn(&Block) -> Block,
    ) -> Self {
        let mut decrypt = [[0u8; BLOCK_SIZE]; ROUND_KEY_COUNT];
        decrypt[0] = encrypt[ROUND_COUNT];
        for round in 1..ROUND_COUNT {
            decrypt[round] = inv_mix(&encrypt[ROUND_COUNT - round]);
        }
        decrypt[ROUND_COUNT] = encrypt[0];
        Self::from_parts(encrypt, decrypt)
    }

    pub(crate) fn from_parts(
        encrypt: [Block; ROUND_KEY_COUNT],
        decrypt: [Block; ROUND_KEY_COUNT],
    ) -> Self {
        Self {
            keys: [encrypt, decrypt],
        }
    }

    /// Round keys used in order by encryption.
    #[inline]
    pub fn encryption_keys(&self) -> &[Block; ROUND_KEY_COUNT] {
        &self.keys[0]
    }

    /// Round keys used in order by decryption.
    #[inline]
    pub fn decryption_keys(&self) -> &[Block; ROUND_KEY_COUNT] {
        &self.keys[1]
    }

    /// Returns round key `index` of the flat 22-key layout.
    ///
    /// # Panics
    ///
    /// Panics if `index >= 22`.
    #[inline]
    pub fn round_key(&self, index: usize) -> &Block {
        &self.keys[index / ROUND_KEY_COUNT][index % ROUND_KEY_COUNT]
    }

    /// The whole schedule as one contiguous byte slice (352 bytes).
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.keys.as_flattened().as_flattened()
    }
}

impl fmt::Debug for KeySchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeySchedule").finish_non_exhaustive()
    }
}

fn rot_word(word: u32) -> u32 {
    word.rotate_left(8)
}

fn sub_word(word: u32) -> u32 {
    u32::from_be_bytes(word.to_be_bytes().map(sbox))
}

/// Expands a 128-bit key into the eleven forward round keys.
pub(crate) fn expand_forward(key: &[u8; 16]) -> [Block; ROUND_KEY_COUNT] {
    let mut w = [0u32; 4 * ROUND_KEY_COUNT];
    for (word, chunk) in w.iter_mut().zip(key.chunks_exact(4)) {
        *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }

    for i in 4..w.len() {
        let mut temp = w[i - 1];
        if i % 4 == 0 {
            temp = sub_word(rot_word(temp)) ^ (u32::from(RCON[(i / 4) - 1]) << 24);
        }
        w[i] = w[i - 4] ^ temp;
    }

    let mut round_keys = [[0u8; BLOCK_SIZE]; ROUND_KEY_COUNT];
    for (round_key, words) in round_keys.iter_mut().zip(w.chunks_exact(4)) {
        for (dst, word) in round_key.chunks_exact_mut(4).zip(words) {
            dst.copy_from_slice(&word.to_be_bytes());
        }
    }
    w.zeroize();

    round_keys
}

/// Portable expansion of both schedule regions.
pub(crate) fn expand(key: &[u8; 16]) -> KeySchedule {
    KeySchedule::from_forward(expand_forward(key), |round_key| {
        let mut transformed = *round_key;
        inv_mix_columns(&mut transformed);
        transformed
    })
}
