//! Table-based fallback for CPUs without AES instructions.

use crate::block::{self, xor_in_place, Block, BLOCK_SIZE};
use crate::key_schedule::{self, KeySchedule, ROUND_COUNT, ROUND_KEY_COUNT};
use crate::round::{add_round_key, dec_last, dec_round, enc_last, enc_round};

pub(super) fn expand(key: &[u8; 16]) -> KeySchedule {
    key_schedule::expand(key)
}

fn encrypt_block(state: &mut Block, keys: &[Block; ROUND_KEY_COUNT]) {
    add_round_key(state, &keys[0]);
    for round_key in &keys[1..ROUND_COUNT] {
        enc_round(state, round_key);
    }
    enc_last(state, &keys[ROUND_COUNT]);
}

fn decrypt_block(state: &mut Block, keys: &[Block; ROUND_KEY_COUNT]) {
    add_round_key(state, &keys[0]);
    for round_key in &keys[1..ROUND_COUNT] {
        dec_round(state, round_key);
    }
    dec_last(state, &keys[ROUND_COUNT]);
}

pub(super) fn encrypt_cbc(
    keys: &[Block; ROUND_KEY_COUNT],
    iv: &Block,
    input: &[u8],
    output: &mut [u8],
) {
    let mut feedback = *iv;
    for (src, dst) in input
        .chunks_exact(BLOCK_SIZE)
        .zip(output.chunks_exact_mut(BLOCK_SIZE))
    {
        xor_in_place(&mut feedback, &block::load(src));
        encrypt_block(&mut feedback, keys);
        block::store(dst, &feedback);
    }
}

pub(super) fn decrypt_cbc(
    keys: &[Block; ROUND_KEY_COUNT],
    iv: &Block,
    input: &[u8],
    output: &mut [u8],
) {
    let mut feedback = *iv;
    for (src, dst) in input
        .chunks_exact(BLOCK_SIZE)
        .zip(output.chunks_exact_mut(BLOCK_SIZE))
    {
        let last_in = block::load(src);
        let mut state = last_in;
        decrypt_block(&mut state, keys);
        xor_in_place(&mut state, &feedback);
        block::store(dst, &state);
        feedback = last_in;
    }
}
