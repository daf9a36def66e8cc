/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the Secure Element Emulator Crypto library.

--*/

/// Expand `$body` once per AES key size with `$cipher` bound to the matching
/// `aes` block cipher type. Evaluates to `Err(CryptoError::InvalidKeyLength)`
/// for any other key length.
macro_rules! with_aes_cipher {
    ($key:expr, $cipher:ident => $body:expr) => {
        match $key.len() {
            16 => {
                type $cipher = aes::Aes128;
                $body
            }
            24 => {
                type $cipher = aes::Aes192;
                $body
            }
            32 => {
                type $cipher = aes::Aes256;
                $body
            }
            _ => Err($crate::CryptoError::InvalidKeyLength),
        }
    };
}

mod aesblock;
mod aesccm;
mod aescmac;
mod aesgcm;
mod ecc;
mod error;
mod jpake;
mod sha;

pub use aesblock::{AesCbc, AesEcb};
pub use aesccm::AesCcm;
pub use aescmac::AesCmac;
pub use aesgcm::{AesGcm, GCM_IV_SIZE};
pub use ecc::{EccPoint, EccScalar, EccSignature, ECC_COORD_SIZE, P256};
pub use error::CryptoError;
pub use jpake::{EcJpake, Round1Output, Round2Output, SchnorrProof};
pub use sha::{HashAlgorithm, HashStream};

/// AES block size in bytes
pub const AES_BLOCK_SIZE: usize = 16;

/// Tag lengths accepted by the AEAD modes
pub const AEAD_TAG_SIZES: [usize; 8] = [0, 4, 6, 8, 10, 12, 14, 16];
