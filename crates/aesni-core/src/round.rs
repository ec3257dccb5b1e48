//! Portable AES round transformations.
//!
//! The state is the usual column-major 16-byte block: byte `4 * c + r` holds
//! row `r` of column `c`. The composite helpers at the bottom have exactly the
//! semantics of the x86 `aesenc`/`aesenclast`/`aesdec`/`aesdeclast`
//! instructions so every backend can share one key schedule.

use crate::block::{xor_in_place, Block};
use crate::sbox::{inv_sbox, sbox};

// Source index for each output byte of ShiftRows and its inverse.
const SHIFT_ROWS: [usize; 16] = [0, 5, 10, 15, 4, 9, 14, 3, 8, 13, 2, 7, 12, 1, 6, 11];
const INV_SHIFT_ROWS: [usize; 16] = [0, 13, 10, 7, 4, 1, 14, 11, 8, 5, 2, 15, 12, 9, 6, 3];

#[inline]
pub(crate) fn sub_bytes(state: &mut Block) {
    for byte in state.iter_mut() {
        *byte = sbox(*byte);
    }
}

#[inline]
pub(crate) fn inv_sub_bytes(state: &mut Block) {
    for byte in state.iter_mut() {
        *byte = inv_sbox(*byte);
    }
}

#[inline]
fn permute(state: &mut Block, table: &[usize; 16]) {
    let src = *state;
    for (dst, &idx) in state.iter_mut().zip(table.iter()) {
        *dst = src[idx];
    }
}

#[inline]
pub(crate) fn shift_rows(state: &mut Block) {
    permute(state, &SHIFT_ROWS);
}

#[inline]
pub(crate) fn inv_shift_rows(state: &mut Block) {
    permute(state, &INV_SHIFT_ROWS);
}

fn xtime(byte: u8) -> u8 {
    let shifted = byte << 1;
    if byte & 0x80 != 0 {
        shifted ^ 0x1b
    } else {
        shifted
    }
}

fn gmul(mut a: u8, mut b: u8) -> u8 {
    let mut product = 0u8;
    for _ in 0..8 {
        if b & 1 != 0 {
            product ^= a;
        }
        a = xtime(a);
        b >>= 1;
    }
    product
}

fn mix_single_column(col: &mut [u8]) {
    let [a0, a1, a2, a3] = [col[0], col[1], col[2], col[3]];
    col[0] = xtime(a0) ^ (xtime(a1) ^ a1) ^ a2 ^ a3;
    col[1] = a0 ^ xtime(a1) ^ (xtime(a2) ^ a2) ^ a3;
    col[2] = a0 ^ a1 ^ xtime(a2) ^ (xtime(a3) ^ a3);
    col[3] = (xtime(a0) ^ a0) ^ a1 ^ a2 ^ xtime(a3);
}

fn inv_mix_single_column(col: &mut [u8]) {
    let [a0, a1, a2, a3] = [col[0], col[1], col[2], col[3]];
    col[0] = gmul(a0, 0x0e) ^ gmul(a1, 0x0b) ^ gmul(a2, 0x0d) ^ gmul(a3, 0x09);
    col[1] = gmul(a0, 0x09) ^ gmul(a1, 0x0e) ^ gmul(a2, 0x0b) ^ gmul(a3, 0x0d);
    col[2] = gmul(a0, 0x0d) ^ gmul(a1, 0x09) ^ gmul(a2, 0x0e) ^ gmul(a3, 0x0b);
    col[3] = gmul(a0, 0x0b) ^ gmul(a1, 0x0d) ^ gmul(a2, 0x09) ^ gmul(a3, 0x0e);
}

#[inline]
pub(crate) fn mix_columns(state: &mut Block) {
    for column in state.chunks_exact_mut(4) {
        mix_single_column(column);
    }
}

/// InvMixColumns over all four columns. Also used to derive the decryption
/// round keys of the equivalent inverse cipher.
#[inline]
pub(crate) fn inv_mix_columns(state: &mut Block) {
    for column in state.chunks_exact_mut(4) {
        inv_mix_single_column(column);
    }
}

#[inline]
pub(crate) fn add_round_key(state: &mut Block, round_key: &Block) {
    xor_in_place(state, round_key);
}

/// One full encryption round: SubBytes, ShiftRows, MixColumns, AddRoundKey.
#[inline]
pub(crate) fn enc_round(state: &mut Block, round_key: &Block) {
    sub_bytes(state);
    shift_rows(state);
    mix_columns(state);
    add_round_key(state, round_key);
}

/// Final encryption round, without MixColumns.
#[inline]
pub(crate) fn enc_last(state: &mut Block, round_key: &Block) {
    sub_bytes(state);
    shift_rows(state);
    add_round_key(state, round_key);
}

/// One equivalent-inverse-cipher round. `round_key` must already carry
/// InvMixColumns.
#[inline]
pub(crate) fn dec_round(state: &mut Block, round_key: &Block) {
    inv_shift_rows(state);
    inv_sub_bytes(state);
    inv_mix_columns(state);
    add_round_key(state, round_key);
}

/// Final decryption round, without InvMixColumns.
#[inline]
pub(crate) fn dec_last(state: &mut Block, round_key: &Block) {
    inv_shift_rows(state);
    inv_sub_bytes(state);
    add_round_key(state, round_key);
}
