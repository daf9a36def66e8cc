/*++

Licensed under the Apache-2.0 license.

File Name:

    aesccm.rs

Abstract:

    File contains implementation of AES-CCM (NIST SP 800-38C). A zero length
    tag selects encryption-only operation.

--*/

use crate::{CryptoError, AEAD_TAG_SIZES, AES_BLOCK_SIZE};
use cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};

type Block = [u8; AES_BLOCK_SIZE];

/// Nonce lengths accepted by CCM
const CCM_NONCE_SIZES: std::ops::RangeInclusive<usize> = 7..=13;

pub enum AesCcm {}

impl AesCcm {
    /// One-shot AES-CCM encryption. Returns the ciphertext and a `tag_len`
    /// byte tag.
    pub fn encrypt(
        key: &[u8],
        nonce: &[u8],
        aad: &[u8],
        plaintext: &[u8],
        tag_len: usize,
    ) -> Result<(Vec<u8>, Vec<u8>), CryptoError> {
        check_params(nonce, tag_len, plaintext.len())?;
        with_aes_cipher!(key, C => {
            let cipher = C::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength)?;
            let encrypt = |block: &mut Block| cipher.encrypt_block(GenericArray::from_mut_slice(block));
            let tag = compute_tag(&encrypt, nonce, aad, plaintext, tag_len);
            let mut ciphertext = plaintext.to_vec();
            apply_keystream(&encrypt, nonce, &mut ciphertext);
            Ok((ciphertext, tag))
        })
    }

    /// One-shot AES-CCM decryption in place.
    ///
    /// `buf` holds the ciphertext on entry and the plaintext on return, also
    /// when the tag does not match and `CryptoError::AuthenticationFailed` is
    /// returned.
    pub fn decrypt_in_place(
        key: &[u8],
        nonce: &[u8],
        aad: &[u8],
        buf: &mut [u8],
        expected_tag: &[u8],
    ) -> Result<(), CryptoError> {
        check_params(nonce, expected_tag.len(), buf.len())?;
        with_aes_cipher!(key, C => {
            let cipher = C::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength)?;
            let encrypt = |block: &mut Block| cipher.encrypt_block(GenericArray::from_mut_slice(block));
            apply_keystream(&encrypt, nonce, buf);
            if compute_tag(&encrypt, nonce, aad, buf, expected_tag.len()) != expected_tag {
                return Err(CryptoError::AuthenticationFailed);
            }
            Ok(())
        })
    }
}

fn check_params(nonce: &[u8], tag_len: usize, data_len: usize) -> Result<(), CryptoError> {
    if !AEAD_TAG_SIZES.contains(&tag_len) {
        return Err(CryptoError::InvalidTagLength);
    }
    if !CCM_NONCE_SIZES.contains(&nonce.len()) {
        return Err(CryptoError::InvalidNonceLength);
    }
    let q = 15 - nonce.len();
    if q < 8 && (data_len as u64) >> (8 * q) != 0 {
        return Err(CryptoError::InvalidLength);
    }
    Ok(())
}

/// Counter block `i` for `nonce`.
fn counter_block(nonce: &[u8], i: u64) -> Block {
    let q = 15 - nonce.len();
    let mut block = [0u8; AES_BLOCK_SIZE];
    block[0] = (q - 1) as u8;
    block[1..1 + nonce.len()].copy_from_slice(nonce);
    block[1 + nonce.len()..].copy_from_slice(&i.to_be_bytes()[8 - q..]);
    block
}

fn apply_keystream(encrypt: &impl Fn(&mut Block), nonce: &[u8], buf: &mut [u8]) {
    for (i, chunk) in buf.chunks_mut(AES_BLOCK_SIZE).enumerate() {
        let mut keystream = counter_block(nonce, i as u64 + 1);
        encrypt(&mut keystream);
        chunk
            .iter_mut()
            .zip(keystream.iter())
            .for_each(|(b, k)| *b ^= k);
    }
}

/// CBC-MAC over the formatted input, masked with the first keystream block.
fn compute_tag(
    encrypt: &impl Fn(&mut Block),
    nonce: &[u8],
    aad: &[u8],
    plaintext: &[u8],
    tag_len: usize,
) -> Vec<u8> {
    if tag_len == 0 {
        return Vec::new();
    }
    let q = 15 - nonce.len();

    let mut b0 = [0u8; AES_BLOCK_SIZE];
    let adata = if aad.is_empty() { 0 } else { 0x40 };
    b0[0] = adata | (((tag_len - 2) / 2) as u8) << 3 | (q - 1) as u8;
    b0[1..1 + nonce.len()].copy_from_slice(nonce);
    b0[1 + nonce.len()..].copy_from_slice(&(plaintext.len() as u64).to_be_bytes()[8 - q..]);

    let mut formatted = Vec::with_capacity(aad.len() + plaintext.len() + 3 * AES_BLOCK_SIZE);
    if !aad.is_empty() {
        if aad.len() < 0xff00 {
            formatted.extend_from_slice(&(aad.len() as u16).to_be_bytes());
        } else {
            formatted.extend_from_slice(&[0xff, 0xfe]);
            formatted.extend_from_slice(&(aad.len() as u32).to_be_bytes());
        }
        formatted.extend_from_slice(aad);
        pad_to_block(&mut formatted);
    }
    formatted.extend_from_slice(plaintext);
    pad_to_block(&mut formatted);

    let mut mac = b0;
    encrypt(&mut mac);
    for chunk in formatted.chunks_exact(AES_BLOCK_SIZE) {
        mac.iter_mut().zip(chunk).for_each(|(m, c)| *m ^= c);
        encrypt(&mut mac);
    }

    let mut s0 = counter_block(nonce, 0);
    encrypt(&mut s0);
    mac.iter()
        .zip(s0.iter())
        .take(tag_len)
        .map(|(m, s)| m ^ s)
        .collect()
}

fn pad_to_block(buf: &mut Vec<u8>) {
    let rem = buf.len() % AES_BLOCK_SIZE;
    if rem != 0 {
        buf.resize(buf.len() + AES_BLOCK_SIZE - rem, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "404142434445464748494a4b4c4d4e4f";

    #[test]
    fn test_sp800_38c_example_1() {
        let key = hex::decode(KEY).unwrap();
        let nonce = hex::decode("10111213141516").unwrap();
        let aad = hex::decode("0001020304050607").unwrap();
        let (ct, tag) = AesCcm::encrypt(&key, &nonce, &aad, &[0x20, 0x21, 0x22, 0x23], 4).unwrap();
        assert_eq!(hex::encode(&ct), "7162015b");
        assert_eq!(hex::encode(&tag), "4dac255d");
    }

    #[test]
    fn test_sp800_38c_example_2() {
        let key = hex::decode(KEY).unwrap();
        let nonce = hex::decode("1011121314151617").unwrap();
        let aad = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        let pt = hex::decode("202122232425262728292a2b2c2d2e2f").unwrap();
        let (ct, tag) = AesCcm::encrypt(&key, &nonce, &aad, &pt, 6).unwrap();
        assert_eq!(hex::encode(&ct), "d2a1f0e051ea5f62081a7792073d593d");
        assert_eq!(hex::encode(&tag), "1fc64fbfaccd");

        let mut buf = ct.clone();
        AesCcm::decrypt_in_place(&key, &nonce, &aad, &mut buf, &tag).unwrap();
        assert_eq!(buf, pt);
    }

    #[test]
    fn test_tag_mismatch_leaves_plaintext() {
        let key = [3u8; 32];
        let nonce = [9u8; 13];
        let pt = b"attack at dawn, bring snacks".to_vec();
        let (ct, mut tag) = AesCcm::encrypt(&key, &nonce, b"hdr", &pt, 16).unwrap();
        tag[0] ^= 1;
        let mut buf = ct;
        assert_eq!(
            AesCcm::decrypt_in_place(&key, &nonce, b"hdr", &mut buf, &tag),
            Err(CryptoError::AuthenticationFailed)
        );
        assert_eq!(buf, pt);
    }

    #[test]
    fn test_zero_length_tag() {
        let key = [3u8; 16];
        let nonce = [1u8; 8];
        let (ct, tag) = AesCcm::encrypt(&key, &nonce, &[], b"no tag here", 0).unwrap();
        assert!(tag.is_empty());
        let mut buf = ct;
        AesCcm::decrypt_in_place(&key, &nonce, &[], &mut buf, &[]).unwrap();
        assert_eq!(buf, b"no tag here");
    }

    #[test]
    fn test_rejects_bad_parameters() {
        let key = [0u8; 16];
        assert_eq!(
            AesCcm::encrypt(&key, &[0; 13], &[], b"x", 5),
            Err(CryptoError::InvalidTagLength)
        );
        assert_eq!(
            AesCcm::encrypt(&key, &[0; 14], &[], b"x", 8),
            Err(CryptoError::InvalidNonceLength)
        );
        assert_eq!(
            AesCcm::encrypt(&key, &[0; 13], &[], &[0; 0x1_0000], 8),
            Err(CryptoError::InvalidLength)
        );
    }
}
