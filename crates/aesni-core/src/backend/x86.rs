//! AES-NI backend for x86 and x86_64.
//!
//! References:
//! - FIPS-197, <https://nvlpubs.nist.gov/nistpubs/fips/nist.fips.197.pdf>
//! - Intel AES-NI white paper, section 5 (key expansion) and the CBC samples.

#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

use super::portable;
use crate::block::{self, Block, BLOCK_SIZE};
use crate::key_schedule::{KeySchedule, ROUND_COUNT, ROUND_KEY_COUNT};

// Independent blocks decrypted per iteration.
const DECRYPT_LANES: usize = 4;

pub(super) fn is_available() -> bool {
    std::is_x86_feature_detected!("aes") && std::is_x86_feature_detected!("sse2")
}

// The safe entry points re-check the cached CPUID result so that the
// `target_feature` functions below are only ever reached on capable CPUs.

pub(super) fn expand(key: &[u8; 16]) -> KeySchedule {
    if !is_available() {
        return portable::expand(key);
    }
    // SAFETY: AES and SSE2 support was checked above.
    unsafe { expand_ni(key) }
}

pub(super) fn encrypt_cbc(
    keys: &[Block; ROUND_KEY_COUNT],
    iv: &Block,
    input: &[u8],
    output: &mut [u8],
) {
    if !is_available() {
        return portable::encrypt_cbc(keys, iv, input, output);
    }
    // SAFETY: AES and SSE2 support was checked above.
    unsafe { encrypt_cbc_ni(keys, iv, input, output) }
}

pub(super) fn decrypt_cbc(
    keys: &[Block; ROUND_KEY_COUNT],
    iv: &Block,
    input: &[u8],
    output: &mut [u8],
) {
    if !is_available() {
        return portable::decrypt_cbc(keys, iv, input, output);
    }
    // SAFETY: AES and SSE2 support was checked above.
    unsafe { decrypt_cbc_ni(keys, iv, input, output) }
}

#[inline]
#[target_feature(enable = "sse2")]
unsafe fn load(block: &Block) -> __m128i {
    _mm_loadu_si128(block.as_ptr().cast())
}

#[inline]
#[target_feature(enable = "sse2")]
unsafe fn store(block: &mut Block, value: __m128i) {
    _mm_storeu_si128(block.as_mut_ptr().cast(), value)
}

#[inline]
#[target_feature(enable = "sse2")]
unsafe fn load_keys(keys: &[Block; ROUND_KEY_COUNT]) -> [__m128i; ROUND_KEY_COUNT] {
    let mut loaded = [_mm_setzero_si128(); ROUND_KEY_COUNT];
    for (dst, key) in loaded.iter_mut().zip(keys.iter()) {
        *dst = load(key);
    }
    loaded
}

/// Folds the `aeskeygenassist` output into the previous round key.
#[inline]
#[target_feature(enable = "sse2")]
unsafe fn expand_step(key: __m128i, assist: __m128i) -> __m128i {
    let assist = _mm_shuffle_epi32(assist, 0xff);
    let mut key = key;
    key = _mm_xor_si128(key, _mm_slli_si128(key, 4));
    key = _mm_xor_si128(key, _mm_slli_si128(key, 4));
    key = _mm_xor_si128(key, _mm_slli_si128(key, 4));
    _mm_xor_si128(key, assist)
}

#[target_feature(enable = "aes,sse2")]
unsafe fn expand_ni(key: &[u8; 16]) -> KeySchedule {
    let mut rk = [_mm_setzero_si128(); ROUND_KEY_COUNT];
    rk[0] = load(key);

    // The round constant is an instruction immediate, hence the macro.
    macro_rules! expand_round {
        ($idx:expr, $rcon:expr) => {
            rk[$idx] = expand_step(rk[$idx - 1], _mm_aeskeygenassist_si128(rk[$idx - 1], $rcon));
        };
    }

    expand_round!(1, 0x01);
    expand_round!(2, 0x02);
    expand_round!(3, 0x04);
    expand_round!(4, 0x08);
    expand_round!(5, 0x10);
    expand_round!(6, 0x20);
    expand_round!(7, 0x40);
    expand_round!(8, 0x80);
    expand_round!(9, 0x1b);
    expand_round!(10, 0x36);

    let mut encrypt = [[0u8; BLOCK_SIZE]; ROUND_KEY_COUNT];
    let mut decrypt = [[0u8; BLOCK_SIZE]; ROUND_KEY_COUNT];
    for (dst, key) in encrypt.iter_mut().zip(rk.iter()) {
        store(dst, *key);
    }
    store(&mut decrypt[0], rk[ROUND_COUNT]);
    for round in 1..ROUND_COUNT {
        store(&mut decrypt[round], _mm_aesimc_si128(rk[ROUND_COUNT - round]));
    }
    store(&mut decrypt[ROUND_COUNT], rk[0]);

    KeySchedule::from_parts(encrypt, decrypt)
}

#[target_feature(enable = "aes,sse2")]
unsafe fn encrypt_cbc_ni(
    keys: &[Block; ROUND_KEY_COUNT],
    iv: &Block,
    input: &[u8],
    output: &mut [u8],
) {
    let rk = load_keys(keys);
    let mut feedback = load(iv);

    for (src, dst) in input
        .chunks_exact(BLOCK_SIZE)
        .zip(output.chunks_exact_mut(BLOCK_SIZE))
    {
        feedback = _mm_xor_si128(load(&block::load(src)), feedback);
        feedback = _mm_xor_si128(feedback, rk[0]);
        for key in &rk[1..ROUND_COUNT] {
            feedback = _mm_aesenc_si128(feedback, *key);
        }
        feedback = _mm_aesenclast_si128(feedback, rk[ROUND_COUNT]);

        let mut out = [0u8; BLOCK_SIZE];
        store(&mut out, feedback);
        block::store(dst, &out);
    }
}

#[inline]
#[target_feature(enable = "aes,sse2")]
unsafe fn decrypt_one(state: __m128i, rk: &[__m128i; ROUND_KEY_COUNT]) -> __m128i {
    let mut state = _mm_xor_si128(state, rk[0]);
    for key in &rk[1..ROUND_COUNT] {
        state = _mm_aesdec_si128(state, *key);
    }
    _mm_aesdeclast_si128(state, rk[ROUND_COUNT])
}

#[target_feature(enable = "aes,sse2")]
unsafe fn decrypt_cbc_ni(
    keys: &[Block; ROUND_KEY_COUNT],
    iv: &Block,
    input: &[u8],
    output: &mut [u8],
) {
    let rk = load_keys(keys);
    let mut feedback = load(iv);

    let mut src_chunks = input.chunks_exact(DECRYPT_LANES * BLOCK_SIZE);
    let mut dst_chunks = output.chunks_exact_mut(DECRYPT_LANES * BLOCK_SIZE);
    for (src, dst) in (&mut src_chunks).zip(&mut dst_chunks) {
        let mut cipher = [_mm_setzero_si128(); DECRYPT_LANES];
        for (lane, block) in cipher.iter_mut().zip(src.chunks_exact(BLOCK_SIZE)) {
            *lane = load(&block::load(block));
        }

        let mut state = cipher;
        for lane in state.iter_mut() {
            *lane = _mm_xor_si128(*lane, rk[0]);
        }
        for key in &rk[1..ROUND_COUNT] {
            for lane in state.iter_mut() {
                *lane = _mm_aesdec_si128(*lane, *key);
            }
        }
        for lane in state.iter_mut() {
            *lane = _mm_aesdeclast_si128(*lane, rk[ROUND_COUNT]);
        }

        // Each lane chains to the ciphertext before it, not to recovered plaintext.
        state[0] = _mm_xor_si128(state[0], feedback);
        for lane in 1..DECRYPT_LANES {
            state[lane] = _mm_xor_si128(state[lane], cipher[lane - 1]);
        }
        feedback = cipher[DECRYPT_LANES - 1];

        for (lane, block) in state.iter().zip(dst.chunks_exact_mut(BLOCK_SIZE)) {
            let mut out = [0u8; BLOCK_SIZE];
            store(&mut out, *lane);
            block::store(block, &out);
        }
    }

    for (src, dst) in src_chunks
        .remainder()
        .chunks_exact(BLOCK_SIZE)
        .zip(dst_chunks.into_remainder().chunks_exact_mut(BLOCK_SIZE))
    {
        let last_in = load(&block::load(src));
        let state = _mm_xor_si128(decrypt_one(last_in, &rk), feedback);
        let mut out = [0u8; BLOCK_SIZE];
        store(&mut out, state);
        block::store(dst, &out);
        feedback = last_in;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key_schedule::tests::{fips_expected_bytes, FIPS_KEY};

    #[test]
    fn hardware_expansion_matches_fips197() {
        if !is_available() {
            eprintln!("AES-NI not detected on this machine; skipping test.");
            return;
        }
        let schedule = expand(&FIPS_KEY);
        let encryption = &schedule.as_bytes()[..ROUND_KEY_COUNT * BLOCK_SIZE];
        assert_eq!(encryption, fips_expected_bytes().as_slice());
    }

    #[test]
    fn single_block_decrypt_matches_interleaved_path() {
        if !is_available() {
            eprintln!("AES-NI not detected on this machine; skipping test.");
            return;
        }
        let schedule = expand(&FIPS_KEY);
        let iv = [0x5cu8; BLOCK_SIZE];
        let plaintext: Vec<u8> = (0..DECRYPT_LANES * BLOCK_SIZE).map(|i| i as u8).collect();
        let mut ciphertext = vec![0u8; plaintext.len()];
        encrypt_cbc(schedule.encryption_keys(), &iv, &plaintext, &mut ciphertext);

        // SAFETY: AES-NI availability was checked at the top of the test.
        let lone = unsafe {
            let rk = load_keys(schedule.decryption_keys());
            let mut out = [0u8; BLOCK_SIZE];
            let first = load(&block::load(&ciphertext[..BLOCK_SIZE]));
            store(&mut out, _mm_xor_si128(decrypt_one(first, &rk), load(&iv)));
            out
        };
        assert_eq!(&lone[..], &plaintext[..BLOCK_SIZE]);

        let mut decrypted = vec![0u8; plaintext.len()];
        decrypt_cbc(schedule.decryption_keys(), &iv, &ciphertext, &mut decrypted);
        assert_eq!(decrypted, plaintext);
    }
}
