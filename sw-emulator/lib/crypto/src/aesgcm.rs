/*++

Licensed under the Apache-2.0 license.

File Name:

    aesgcm.rs

Abstract:

    File contains implementation of AES-GCM with truncated tags.

--*/

use crate::{CryptoError, AEAD_TAG_SIZES, AES_BLOCK_SIZE};
use aes_gcm::aead::{consts::U12, generic_array::GenericArray, AeadInPlace, KeyInit};
use cipher::{KeyIvInit, StreamCipher};

/// GCM IV size in bytes
pub const GCM_IV_SIZE: usize = 12;

pub enum AesGcm {}

impl AesGcm {
    /// One-shot AES-GCM encryption. Returns the ciphertext and the first
    /// `tag_len` bytes of the tag.
    pub fn encrypt(
        key: &[u8],
        iv: &[u8],
        aad: &[u8],
        plaintext: &[u8],
        tag_len: usize,
    ) -> Result<(Vec<u8>, Vec<u8>), CryptoError> {
        check_params(iv, tag_len)?;
        let mut buf = plaintext.to_vec();
        let tag = with_aes_cipher!(key, C => full_tag::<C>(key, iv, aad, &mut buf))?;
        Ok((buf, tag[..tag_len].to_vec()))
    }

    /// One-shot AES-GCM decryption in place.
    ///
    /// `buf` holds the ciphertext on entry and the plaintext on return, also
    /// when the tag does not match and `CryptoError::AuthenticationFailed` is
    /// returned.
    pub fn decrypt_in_place(
        key: &[u8],
        iv: &[u8],
        aad: &[u8],
        buf: &mut [u8],
        expected_tag: &[u8],
    ) -> Result<(), CryptoError> {
        check_params(iv, expected_tag.len())?;
        let tag = with_aes_cipher!(key, C => {
            // Payload keystream starts at inc32(IV || 0^31 || 1).
            let mut counter = [0u8; AES_BLOCK_SIZE];
            counter[..GCM_IV_SIZE].copy_from_slice(iv);
            counter[AES_BLOCK_SIZE - 1] = 2;
            let mut keystream = ctr::Ctr32BE::<C>::new_from_slices(key, &counter)
                .map_err(|_| CryptoError::InvalidKeyLength)?;
            keystream.apply_keystream(buf);

            // Re-encrypting the recovered plaintext yields the reference tag.
            let mut scratch = buf.to_vec();
            full_tag::<C>(key, iv, aad, &mut scratch)
        })?;
        if tag[..expected_tag.len()] != *expected_tag {
            return Err(CryptoError::AuthenticationFailed);
        }
        Ok(())
    }
}

fn check_params(iv: &[u8], tag_len: usize) -> Result<(), CryptoError> {
    if iv.len() != GCM_IV_SIZE {
        return Err(CryptoError::InvalidNonceLength);
    }
    if !AEAD_TAG_SIZES.contains(&tag_len) {
        return Err(CryptoError::InvalidTagLength);
    }
    Ok(())
}

/// Encrypt `buf` in place and return the untruncated 16 byte tag.
fn full_tag<C>(key: &[u8], iv: &[u8], aad: &[u8], buf: &mut [u8]) -> Result<Vec<u8>, CryptoError>
where
    aes_gcm::AesGcm<C, U12>: KeyInit + AeadInPlace,
{
    let cipher = aes_gcm::AesGcm::<C, U12>::new_from_slice(key)
        .map_err(|_| CryptoError::InvalidKeyLength)?;
    let tag = cipher
        .encrypt_in_place_detached(GenericArray::from_slice(iv), aad, buf)
        .map_err(|_| CryptoError::InvalidLength)?;
    Ok(tag.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    // from https://github.com/C2SP/wycheproof/blob/master/testvectors/aes_gcm_test.json
    const KEY: &str = "92ace3e348cd821092cd921aa3546374299ab46209691bc28b8752d17f123c20";
    const IV: &str = "00112233445566778899aabb";
    const AAD: &str = "00000000ffffffff";
    const PLAINTEXT: &str = "00010203040506070809";
    const CIPHERTEXT: &str = "e27abdd2d2a53d2f136b";
    const TAG: &str = "9a4a2579529301bcfb71c78d4060f52c";

    fn inputs() -> (Vec<u8>, Vec<u8>, Vec<u8>) {
        (
            hex::decode(KEY).unwrap(),
            hex::decode(IV).unwrap(),
            hex::decode(AAD).unwrap(),
        )
    }

    #[test]
    fn test_encrypt_decrypt() {
        let (key, iv, aad) = inputs();
        let pt = hex::decode(PLAINTEXT).unwrap();
        let (ct, tag) = AesGcm::encrypt(&key, &iv, &aad, &pt, 16).unwrap();
        assert_eq!(hex::encode(&ct), CIPHERTEXT);
        assert_eq!(hex::encode(&tag), TAG);

        let mut buf = ct;
        AesGcm::decrypt_in_place(&key, &iv, &aad, &mut buf, &tag).unwrap();
        assert_eq!(hex::encode(&buf), PLAINTEXT);
    }

    #[test]
    fn test_truncated_tag() {
        let (key, iv, aad) = inputs();
        let pt = hex::decode(PLAINTEXT).unwrap();
        let (ct, tag) = AesGcm::encrypt(&key, &iv, &aad, &pt, 8).unwrap();
        assert_eq!(hex::encode(&tag), &TAG[..16]);

        let mut buf = ct;
        AesGcm::decrypt_in_place(&key, &iv, &aad, &mut buf, &tag).unwrap();
        assert_eq!(hex::encode(&buf), PLAINTEXT);
    }

    #[test]
    fn test_tag_mismatch_leaves_plaintext() {
        let (key, iv, aad) = inputs();
        let mut tag = hex::decode(TAG).unwrap();
        tag[15] ^= 0x80;
        let mut buf = hex::decode(CIPHERTEXT).unwrap();
        assert_eq!(
            AesGcm::decrypt_in_place(&key, &iv, &aad, &mut buf, &tag),
            Err(CryptoError::AuthenticationFailed)
        );
        assert_eq!(hex::encode(&buf), PLAINTEXT);
    }

    #[test]
    fn test_rejects_bad_parameters() {
        let key = [0u8; 16];
        assert_eq!(
            AesGcm::encrypt(&key, &[0; 16], &[], b"x", 16),
            Err(CryptoError::InvalidNonceLength)
        );
        assert_eq!(
            AesGcm::encrypt(&key, &[0; 12], &[], b"x", 3),
            Err(CryptoError::InvalidTagLength)
        );
        assert_eq!(
            AesGcm::encrypt(&[0; 8], &[0; 12], &[], b"x", 16),
            Err(CryptoError::InvalidKeyLength)
        );
    }
}
