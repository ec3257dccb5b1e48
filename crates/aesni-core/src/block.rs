//! Block representation helpers.

/// Size of one AES block in bytes.
pub const BLOCK_SIZE: usize = 16;

/// AES block of 16 bytes.
pub type Block = [u8; BLOCK_SIZE];

/// XORs two blocks, writing the result into `dst`.
#[inline]
pub fn xor_in_place(dst: &mut Block, rhs: &Block) {
    for (d, r) in dst.iter_mut().zip(rhs.iter()) {
        *d ^= *r;
    }
}

/// Copies one block out of a 16-byte slice.
///
/// Callers hand in chunks produced by `chunks_exact(BLOCK_SIZE)`, so a length
/// mismatch is a programming error rather than an input error.
#[inline]
pub(crate) fn load(bytes: &[u8]) -> Block {
    let mut block = [0u8; BLOCK_SIZE];
    block.copy_from_slice(bytes);
    block
}

/// Writes one block into a 16-byte slice.
#[inline]
pub(crate) fn store(bytes: &mut [u8], block: &Block) {
    bytes.copy_from_slice(block);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xor_is_self_inverse() {
        let original: Block = core::array::from_fn(|i| i as u8);
        let mask = [0xa5u8; BLOCK_SIZE];
        let mut block = original;
        xor_in_place(&mut block, &mask);
        assert_ne!(block, original);
        xor_in_place(&mut block, &mask);
        assert_eq!(block, original);
    }

    #[test]
    fn load_and_store_copy_exactly_one_block() {
        let src: Vec<u8> = (0u8..32).collect();
        let block = load(&src[16..]);
        assert_eq!(block[0], 16);
        assert_eq!(block[15], 31);

        let mut dst = [0u8; 32];
        store(&mut dst[..16], &block);
        assert_eq!(&dst[..16], &src[16..]);
        assert_eq!(&dst[16..], &[0u8; 16]);
    }
}
