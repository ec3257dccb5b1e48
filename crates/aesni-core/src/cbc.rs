//! Cipher block chaining over pre-padded buffers.

use crate::block::{self, Block, BLOCK_SIZE};
use crate::error::{Buffer, Error};
use crate::key::AesKey;

/// Checks a call's buffers and returns the IV as a block.
///
/// Runs before any output is written so a rejected call leaves the
/// destination untouched.
fn validate(
    input: &[u8],
    input_id: Buffer,
    output_len: usize,
    output_id: Buffer,
    iv: &[u8],
) -> Result<Block, Error> {
    if input.is_empty() {
        return Err(Error::EmptyInput { buffer: input_id });
    }
    if input.len() % BLOCK_SIZE != 0 {
        return Err(Error::BlockAlignment {
            buffer: input_id,
            block_size: BLOCK_SIZE,
        });
    }
    if iv.is_empty() {
        return Err(Error::EmptyInput { buffer: Buffer::Iv });
    }
    if iv.len() != BLOCK_SIZE {
        return Err(Error::InvalidInput {
            reason: "iv must be exactly one 16-byte block",
        });
    }
    if output_len % BLOCK_SIZE != 0 {
        return Err(Error::BlockAlignment {
            buffer: output_id,
            block_size: BLOCK_SIZE,
        });
    }
    if output_len < input.len() {
        return Err(Error::BufferTooSmall {
            buffer: output_id,
            required: input.len(),
            actual: output_len,
        });
    }
    Ok(block::load(iv))
}

/// Encrypts `plaintext` into the front of `ciphertext` with AES-CBC.
///
/// The plaintext must already be padded to a multiple of 16 bytes. Bytes of
/// `ciphertext` past `plaintext.len()` are left untouched.
pub fn encrypt(
    plaintext: &[u8],
    ciphertext: &mut [u8],
    key: &AesKey,
    iv: &[u8],
) -> Result<(), Error> {
    let iv = validate(
        plaintext,
        Buffer::Plaintext,
        ciphertext.len(),
        Buffer::Ciphertext,
        iv,
    )?;
    let output = &mut ciphertext[..plaintext.len()];
    match key {
        AesKey::Aes128(key) => {
            key.backend()
                .encrypt_cbc(key.schedule().encryption_keys(), &iv, plaintext, output)
        }
    }
    Ok(())
}

/// Decrypts `ciphertext` into the front of `plaintext` with AES-CBC.
///
/// No padding is removed. Bytes of `plaintext` past `ciphertext.len()` are
/// left untouched.
pub fn decrypt(
    plaintext: &mut [u8],
    ciphertext: &[u8],
    key: &AesKey,
    iv: &[u8],
) -> Result<(), Error> {
    let iv = validate(
        ciphertext,
        Buffer::Ciphertext,
        plaintext.len(),
        Buffer::Plaintext,
        iv,
    )?;
    let output = &mut plaintext[..ciphertext.len()];
    match key {
        AesKey::Aes128(key) => {
            key.backend()
                .decrypt_cbc(key.schedule().decryption_keys(), &iv, ciphertext, output)
        }
    }
    Ok(())
}

/// Encrypts into a newly allocated buffer of exactly `plaintext.len()` bytes.
pub fn encrypt_to_vec(plaintext: &[u8], key: &AesKey, iv: &[u8]) -> Result<Vec<u8>, Error> {
    let mut ciphertext = vec![0u8; plaintext.len()];
    encrypt(plaintext, &mut ciphertext, key, iv)?;
    Ok(ciphertext)
}

/// Decrypts into a newly allocated buffer of exactly `ciphertext.len()` bytes.
pub fn decrypt_to_vec(ciphertext: &[u8], key: &AesKey, iv: &[u8]) -> Result<Vec<u8>, Error> {
    let mut plaintext = vec![0u8; ciphertext.len()];
    decrypt(&mut plaintext, ciphertext, key, iv)?;
    Ok(plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Backend;
    use crate::bytes::hex_decode;
    use crate::key_schedule::tests::FIPS_KEY;
    use rand::{Rng, RngCore, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    // NIST SP 800-38A, F.2.1 / F.2.2 (CBC-AES128).
    const SP800_38A_IV: &str = "000102030405060708090a0b0c0d0e0f";
    const SP800_38A_PLAIN: &str = concat!(
        "6bc1bee22e409f96e93d7e117393172a",
        "ae2d8a571e03ac9c9eb76fac45af8e51",
        "30c81c46a35ce411e5fbc1191a0a52ef",
        "f69f2445df4f9b17ad2b417be66c3710",
    );
    const SP800_38A_CIPHER: &str = concat!(
        "7649abac8119b246cee98e9b12e9197d",
        "5086cb9b507219ee95db113a917678b2",
        "73bed6b8e3c1743b7116e69e22229516",
        "3ff1caa1681fac09120eca307586e1a7",
    );

    fn keys() -> Vec<AesKey> {
        Backend::ALL
            .into_iter()
            .filter(|backend| backend.is_available())
            .map(|backend| AesKey::create_with_backend(&FIPS_KEY, backend).unwrap())
            .collect()
    }

    #[test]
    fn zero_block_with_zero_iv_matches_ecb_answer() {
        let expected = hex_decode("7df76b0c1ab899b33e42f047b91b546f").unwrap();
        for key in keys() {
            let mut ciphertext = [0u8; 16];
            encrypt(&[0u8; 16], &mut ciphertext, &key, &[0u8; 16]).unwrap();
            assert_eq!(ciphertext.as_slice(), expected.as_slice(), "{}", key.backend());
        }
    }

    #[test]
    fn fips197_appendix_c1_single_block() {
        let key = AesKey::create(&hex_decode("000102030405060708090a0b0c0d0e0f").unwrap())
            .unwrap();
        let plaintext = hex_decode("00112233445566778899aabbccddeeff").unwrap();
        let ciphertext = encrypt_to_vec(&plaintext, &key, &[0u8; 16]).unwrap();
        assert_eq!(hex::encode(&ciphertext), "69c4e0d86a7b0430d8cdb78070b4c55a");
    }

    #[test]
    fn sp800_38a_cbc_vectors() {
        let iv = hex_decode(SP800_38A_IV).unwrap();
        let plaintext = hex_decode(SP800_38A_PLAIN).unwrap();
        let ciphertext = hex_decode(SP800_38A_CIPHER).unwrap();
        for key in keys() {
            assert_eq!(
                encrypt_to_vec(&plaintext, &key, &iv).unwrap(),
                ciphertext,
                "{} encrypt",
                key.backend()
            );
            assert_eq!(
                decrypt_to_vec(&ciphertext, &key, &iv).unwrap(),
                plaintext,
                "{} decrypt",
                key.backend()
            );
        }
    }

    #[test]
    fn round_trip_random_inputs() {
        let mut rng = ChaCha20Rng::from_seed([42u8; 32]);
        for _ in 0..64 {
            let mut raw = [0u8; 16];
            let mut iv = [0u8; 16];
            rng.fill_bytes(&mut raw);
            rng.fill_bytes(&mut iv);
            let blocks = rng.gen_range(1..=12);
            let mut plaintext = vec![0u8; blocks * BLOCK_SIZE];
            rng.fill_bytes(&mut plaintext);

            let key = AesKey::create(&raw).unwrap();
            let ciphertext = encrypt_to_vec(&plaintext, &key, &iv).unwrap();
            assert_ne!(ciphertext, plaintext);
            assert_eq!(decrypt_to_vec(&ciphertext, &key, &iv).unwrap(), plaintext);
        }
    }

    #[test]
    fn encryption_is_deterministic() {
        let key = AesKey::create(&FIPS_KEY).unwrap();
        let plaintext = [0x33u8; 48];
        let iv = [0x11u8; 16];
        let first = encrypt_to_vec(&plaintext, &key, &iv).unwrap();
        let second = encrypt_to_vec(&plaintext, &key, &iv).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn identical_blocks_encrypt_differently() {
        let key = AesKey::create(&FIPS_KEY).unwrap();
        let ciphertext = encrypt_to_vec(&[0u8; 32], &key, &[0u8; 16]).unwrap();
        assert_ne!(ciphertext[..16], ciphertext[16..]);
    }

    #[test]
    fn corrupted_block_only_affects_itself_and_next() {
        let key = AesKey::create(&FIPS_KEY).unwrap();
        let iv = hex_decode(SP800_38A_IV).unwrap();
        let plaintext = hex_decode(SP800_38A_PLAIN).unwrap();
        let mut ciphertext = encrypt_to_vec(&plaintext, &key, &iv).unwrap();

        ciphertext[3] ^= 0x80;
        let decrypted = decrypt_to_vec(&ciphertext, &key, &iv).unwrap();

        assert_ne!(decrypted[..16], plaintext[..16]);
        // The flipped bit lands in the same position of the following block.
        let mut expected_second = plaintext[16..32].to_vec();
        expected_second[3] ^= 0x80;
        assert_eq!(&decrypted[16..32], expected_second.as_slice());
        assert_eq!(decrypted[32..], plaintext[32..]);
    }

    #[test]
    fn rejects_misaligned_plaintext() {
        let key = AesKey::create(&FIPS_KEY).unwrap();
        let mut ciphertext = [0u8; 32];
        let err = encrypt(&[0u8; 17], &mut ciphertext, &key, &[0u8; 16]).unwrap_err();
        assert_eq!(
            err,
            Error::BlockAlignment {
                buffer: Buffer::Plaintext,
                block_size: 16
            }
        );
        assert_eq!(ciphertext, [0u8; 32]);
    }

    #[test]
    fn rejects_misaligned_output() {
        let key = AesKey::create(&FIPS_KEY).unwrap();
        let mut ciphertext = [0u8; 20];
        let err = encrypt(&[0u8; 16], &mut ciphertext, &key, &[0u8; 16]).unwrap_err();
        assert_eq!(
            err,
            Error::BlockAlignment {
                buffer: Buffer::Ciphertext,
                block_size: 16
            }
        );
    }

    #[test]
    fn too_small_output_is_left_untouched() {
        let key = AesKey::create(&FIPS_KEY).unwrap();
        let mut ciphertext = [0xeeu8; 16];
        let err = encrypt(&[0u8; 32], &mut ciphertext, &key, &[0u8; 16]).unwrap_err();
        assert_eq!(
            err,
            Error::BufferTooSmall {
                buffer: Buffer::Ciphertext,
                required: 32,
                actual: 16
            }
        );
        assert_eq!(ciphertext, [0xeeu8; 16]);
    }

    #[test]
    fn rejects_empty_inputs_and_bad_iv() {
        let key = AesKey::create(&FIPS_KEY).unwrap();
        let mut out = [0u8; 16];
        assert_eq!(
            encrypt(&[], &mut out, &key, &[0u8; 16]).unwrap_err(),
            Error::EmptyInput {
                buffer: Buffer::Plaintext
            }
        );
        assert_eq!(
            encrypt(&[0u8; 16], &mut out, &key, &[]).unwrap_err(),
            Error::EmptyInput { buffer: Buffer::Iv }
        );
        assert!(matches!(
            encrypt(&[0u8; 16], &mut out, &key, &[0u8; 8]),
            Err(Error::InvalidInput { .. })
        ));
        assert_eq!(
            decrypt(&mut out, &[], &key, &[0u8; 16]).unwrap_err(),
            Error::EmptyInput {
                buffer: Buffer::Ciphertext
            }
        );
    }

    #[test]
    fn decrypt_mirrors_validation() {
        let key = AesKey::create(&FIPS_KEY).unwrap();
        let mut out = [0u8; 16];
        assert_eq!(
            decrypt(&mut out, &[0u8; 17], &key, &[0u8; 16]).unwrap_err(),
            Error::BlockAlignment {
                buffer: Buffer::Ciphertext,
                block_size: 16
            }
        );
        assert_eq!(
            decrypt(&mut out, &[0u8; 32], &key, &[0u8; 16]).unwrap_err(),
            Error::BufferTooSmall {
                buffer: Buffer::Plaintext,
                required: 32,
                actual: 16
            }
        );
        assert_eq!(out, [0u8; 16]);
    }

    #[test]
    fn surplus_output_capacity_is_untouched() {
        let key = AesKey::create(&FIPS_KEY).unwrap();
        let mut ciphertext = [0xabu8; 48];
        encrypt(&[0u8; 16], &mut ciphertext, &key, &[0u8; 16]).unwrap();
        assert_eq!(
            hex::encode(&ciphertext[..16]),
            "7df76b0c1ab899b33e42f047b91b546f"
        );
        assert_eq!(ciphertext[16..], [0xabu8; 32]);
    }

    #[test]
    fn shared_key_across_threads() {
        let key = AesKey::create(&FIPS_KEY).unwrap();
        let iv = hex_decode(SP800_38A_IV).unwrap();
        let plaintext = hex_decode(SP800_38A_PLAIN).unwrap();
        let expected = hex_decode(SP800_38A_CIPHER).unwrap();

        let (key, iv, plaintext) = (&key, iv.as_slice(), plaintext.as_slice());
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(move || encrypt_to_vec(plaintext, key, iv).unwrap()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }
}
