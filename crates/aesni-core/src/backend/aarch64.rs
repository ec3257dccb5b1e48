//! ARMv8 cryptography extension backend.
//!
//! `aese`/`aesd` apply AddRoundKey *before* the byte substitution, so each
//! round key is consumed one step earlier than with AES-NI. The schedule is
//! shared with the other backends unchanged.

use core::arch::aarch64::*;

use super::portable;
use crate::block::{self, Block, BLOCK_SIZE};
use crate::key_schedule::{self, KeySchedule, ROUND_COUNT, ROUND_KEY_COUNT};

pub(super) fn is_available() -> bool {
    std::arch::is_aarch64_feature_detected!("aes")
}

pub(super) fn expand(key: &[u8; 16]) -> KeySchedule {
    if !is_available() {
        return portable::expand(key);
    }
    let forward = key_schedule::expand_forward(key);
    KeySchedule::from_forward(forward, |round_key| {
        // SAFETY: the crypto extension was detected above.
        unsafe { inv_mix_columns(round_key) }
    })
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
    // SAFETY: the crypto extension was detected above.
    unsafe { encrypt_cbc_arm(keys, iv, input, output) }
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
    // SAFETY: the crypto extension was detected above.
    unsafe { decrypt_cbc_arm(keys, iv, input, output) }
}

#[target_feature(enable = "aes")]
unsafe fn inv_mix_columns(round_key: &Block) -> Block {
    let mut out = [0u8; BLOCK_SIZE];
    vst1q_u8(out.as_mut_ptr(), vaesimcq_u8(vld1q_u8(round_key.as_ptr())));
    out
}

#[inline]
#[target_feature(enable = "neon")]
unsafe fn load_keys(keys: &[Block; ROUND_KEY_COUNT]) -> [uint8x16_t; ROUND_KEY_COUNT] {
    let mut loaded = [vdupq_n_u8(0); ROUND_KEY_COUNT];
    for (dst, key) in loaded.iter_mut().zip(keys.iter()) {
        *dst = vld1q_u8(key.as_ptr());
    }
    loaded
}

#[target_feature(enable = "aes")]
unsafe fn encrypt_cbc_arm(
    keys: &[Block; ROUND_KEY_COUNT],
    iv: &Block,
    input: &[u8],
    output: &mut [u8],
) {
    let rk = load_keys(keys);
    let mut feedback = vld1q_u8(iv.as_ptr());

    for (src, dst) in input
        .chunks_exact(BLOCK_SIZE)
        .zip(output.chunks_exact_mut(BLOCK_SIZE))
    {
        let plain = block::load(src);
        let mut state = veorq_u8(vld1q_u8(plain.as_ptr()), feedback);
        for key in &rk[..ROUND_COUNT - 1] {
            state = vaesmcq_u8(vaeseq_u8(state, *key));
        }
        state = vaeseq_u8(state, rk[ROUND_COUNT - 1]);
        feedback = veorq_u8(state, rk[ROUND_COUNT]);

        let mut out = [0u8; BLOCK_SIZE];
        vst1q_u8(out.as_mut_ptr(), feedback);
        block::store(dst, &out);
    }
}

#[target_feature(enable = "aes")]
unsafe fn decrypt_cbc_arm(
    keys: &[Block; ROUND_KEY_COUNT],
    iv: &Block,
    input: &[u8],
    output: &mut [u8],
) {
    let rk = load_keys(keys);
    let mut feedback = vld1q_u8(iv.as_ptr());

    for (src, dst) in input
        .chunks_exact(BLOCK_SIZE)
        .zip(output.chunks_exact_mut(BLOCK_SIZE))
    {
        let cipher = block::load(src);
        let last_in = vld1q_u8(cipher.as_ptr());
        let mut state = last_in;
        for key in &rk[..ROUND_COUNT - 1] {
            state = vaesimcq_u8(vaesdq_u8(state, *key));
        }
        state = vaesdq_u8(state, rk[ROUND_COUNT - 1]);
        state = veorq_u8(state, rk[ROUND_COUNT]);
        state = veorq_u8(state, feedback);

        let mut out = [0u8; BLOCK_SIZE];
        vst1q_u8(out.as_mut_ptr(), state);
        block::store(dst, &out);
        feedback = last_in;
    }
}
