/*++

Licensed under the Apache-2.0 license.

File Name:

    aesblock.rs

Abstract:

    File contains AES ECB and CBC block modes for 128, 192 and 256 bit keys.

--*/

use crate::{CryptoError, AES_BLOCK_SIZE};
use cipher::{
    generic_array::GenericArray, BlockDecrypt, BlockDecryptMut, BlockEncrypt, BlockEncryptMut,
    KeyInit, KeyIvInit,
};

fn check_blocks(data: &[u8]) -> Result<(), CryptoError> {
    if data.is_empty() || data.len() % AES_BLOCK_SIZE != 0 {
        return Err(CryptoError::InvalidLength);
    }
    Ok(())
}

fn last_block(data: &[u8]) -> [u8; AES_BLOCK_SIZE] {
    let mut block = [0u8; AES_BLOCK_SIZE];
    block.copy_from_slice(&data[data.len() - AES_BLOCK_SIZE..]);
    block
}

pub enum AesEcb {}

impl AesEcb {
    /// Encrypt whole blocks of `data`.
    pub fn encrypt(key: &[u8], data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        check_blocks(data)?;
        with_aes_cipher!(key, C => {
            let cipher = C::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength)?;
            let mut out = data.to_vec();
            for block in out.chunks_exact_mut(AES_BLOCK_SIZE) {
                cipher.encrypt_block(GenericArray::from_mut_slice(block));
            }
            Ok(out)
        })
    }

    /// Decrypt whole blocks of `data`.
    pub fn decrypt(key: &[u8], data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        check_blocks(data)?;
        with_aes_cipher!(key, C => {
            let cipher = C::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength)?;
            let mut out = data.to_vec();
            for block in out.chunks_exact_mut(AES_BLOCK_SIZE) {
                cipher.decrypt_block(GenericArray::from_mut_slice(block));
            }
            Ok(out)
        })
    }
}

pub enum AesCbc {}

impl AesCbc {
    /// Encrypt `data` and return the ciphertext with the IV that continues
    /// the chain (the last ciphertext block).
    pub fn encrypt(
        key: &[u8],
        iv: &[u8],
        data: &[u8],
    ) -> Result<(Vec<u8>, [u8; AES_BLOCK_SIZE]), CryptoError> {
        check_blocks(data)?;
        if iv.len() != AES_BLOCK_SIZE {
            return Err(CryptoError::InvalidNonceLength);
        }
        let out = with_aes_cipher!(key, C => {
            let mut cryptor = cbc::Encryptor::<C>::new_from_slices(key, iv)
                .map_err(|_| CryptoError::InvalidKeyLength)?;
            let mut out = data.to_vec();
            for block in out.chunks_exact_mut(AES_BLOCK_SIZE) {
                cryptor.encrypt_block_mut(GenericArray::from_mut_slice(block));
            }
            Ok(out)
        })?;
        let next_iv = last_block(&out);
        Ok((out, next_iv))
    }

    /// Decrypt `data` and return the plaintext with the IV that continues
    /// the chain (the last ciphertext block of the input).
    pub fn decrypt(
        key: &[u8],
        iv: &[u8],
        data: &[u8],
    ) -> Result<(Vec<u8>, [u8; AES_BLOCK_SIZE]), CryptoError> {
        check_blocks(data)?;
        if iv.len() != AES_BLOCK_SIZE {
            return Err(CryptoError::InvalidNonceLength);
        }
        let out = with_aes_cipher!(key, C => {
            let mut cryptor = cbc::Decryptor::<C>::new_from_slices(key, iv)
                .map_err(|_| CryptoError::InvalidKeyLength)?;
            let mut out = data.to_vec();
            for block in out.chunks_exact_mut(AES_BLOCK_SIZE) {
                cryptor.decrypt_block_mut(GenericArray::from_mut_slice(block));
            }
            Ok(out)
        })?;
        Ok((out, last_block(data)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // NIST SP 800-38A F.1.1 / F.2.1
    const KEY_128: &str = "2b7e151628aed2a6abf7158809cf4f3c";
    const PLAINTEXT: &str = "6bc1bee22e409f96e93d7e117393172aae2d8a571e03ac9c9eb76fac45af8e51";

    #[test]
    fn test_ecb_known_answer() {
        let key = hex::decode(KEY_128).unwrap();
        let pt = hex::decode(PLAINTEXT).unwrap();
        let ct = AesEcb::encrypt(&key, &pt).unwrap();
        assert_eq!(
            hex::encode(&ct),
            "3ad77bb40d7a3660a89ecaf32466ef97f5d3d58503b9699de785895a96fdbaaf"
        );
        assert_eq!(AesEcb::decrypt(&key, &ct).unwrap(), pt);
    }

    #[test]
    fn test_cbc_known_answer() {
        let key = hex::decode(KEY_128).unwrap();
        let iv = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        let pt = hex::decode(PLAINTEXT).unwrap();
        let (ct, next_iv) = AesCbc::encrypt(&key, &iv, &pt).unwrap();
        assert_eq!(
            hex::encode(&ct),
            "7649abac8119b246cee98e9b12e9197d5086cb9b507219ee95db113a917678b2"
        );
        assert_eq!(next_iv[..], ct[16..]);

        let (decrypted, decrypt_iv) = AesCbc::decrypt(&key, &iv, &ct).unwrap();
        assert_eq!(decrypted, pt);
        assert_eq!(decrypt_iv, next_iv);
    }

    #[test]
    fn test_cbc_chaining_across_calls() {
        let key = [7u8; 32];
        let iv = [1u8; 16];
        let pt = [0x5au8; 64];
        let (whole, _) = AesCbc::encrypt(&key, &iv, &pt).unwrap();
        let (first, next_iv) = AesCbc::encrypt(&key, &iv, &pt[..32]).unwrap();
        let (second, _) = AesCbc::encrypt(&key, &next_iv, &pt[32..]).unwrap();
        assert_eq!(whole, [first, second].concat());
    }

    #[test]
    fn test_rejects_bad_lengths() {
        let key = [0u8; 16];
        assert_eq!(AesEcb::encrypt(&key, &[]), Err(CryptoError::InvalidLength));
        assert_eq!(
            AesEcb::encrypt(&key, &[0; 17]),
            Err(CryptoError::InvalidLength)
        );
        assert_eq!(
            AesEcb::encrypt(&[0; 20], &[0; 16]),
            Err(CryptoError::InvalidKeyLength)
        );
        assert_eq!(
            AesCbc::decrypt(&key, &[0; 8], &[0; 16]),
            Err(CryptoError::InvalidNonceLength)
        );
    }
}
