/*++

Licensed under the Apache-2.0 license.

File Name:

    aescmac.rs

Abstract:

    File contains implementation of the AES-CMAC message authentication code.

--*/

use crate::{CryptoError, AES_BLOCK_SIZE};
use cmac::{Cmac, Mac};

pub enum AesCmac {}

impl AesCmac {
    /// One-shot AES-CMAC of `data`.
    pub fn mac(key: &[u8], data: &[u8]) -> Result<[u8; AES_BLOCK_SIZE], CryptoError> {
        with_aes_cipher!(key, C => {
            let mut mac = <Cmac<C> as Mac>::new_from_slice(key)
                .map_err(|_| CryptoError::InvalidKeyLength)?;
            mac.update(data);
            Ok(mac.finalize().into_bytes().into())
        })
    }
}
