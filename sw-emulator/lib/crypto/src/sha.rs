/*++

Licensed under the Apache-2.0 license.

File Name:

    sha.rs

Abstract:

    File contains one-shot and streaming SHA-1 / SHA-2 digests and HMAC.

--*/

use crate::CryptoError;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum HashAlgorithm {
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    /// Digest size in bytes
    pub const fn digest_size(self) -> usize {
        match self {
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Sha224 => 28,
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }

    /// One-shot digest of `data`.
    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        let mut stream = HashStream::new(self);
        stream.update(data);
        stream.finish()
    }

    /// One-shot HMAC of `data` under `key`.
    pub fn hmac(self, key: &[u8], data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        macro_rules! mac {
            ($digest:ty) => {{
                let mut mac = <Hmac<$digest> as Mac>::new_from_slice(key)
                    .map_err(|_| CryptoError::InvalidKeyLength)?;
                mac.update(data);
                mac.finalize().into_bytes().to_vec()
            }};
        }

        Ok(match self {
            HashAlgorithm::Sha1 => mac!(Sha1),
            HashAlgorithm::Sha224 => mac!(Sha224),
            HashAlgorithm::Sha256 => mac!(Sha256),
            HashAlgorithm::Sha384 => mac!(Sha384),
            HashAlgorithm::Sha512 => mac!(Sha512),
        })
    }
}

enum HashState {
    Sha1(Sha1),
    Sha224(Sha224),
    Sha256(Sha256),
    Sha384(Sha384),
    Sha512(Sha512),
}

/// Incremental digest engine bound to one algorithm.
pub struct HashStream {
    state: HashState,
}

impl HashStream {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        let state = match algorithm {
            HashAlgorithm::Sha1 => HashState::Sha1(Sha1::new()),
            HashAlgorithm::Sha224 => HashState::Sha224(Sha224::new()),
            HashAlgorithm::Sha256 => HashState::Sha256(Sha256::new()),
            HashAlgorithm::Sha384 => HashState::Sha384(Sha384::new()),
            HashAlgorithm::Sha512 => HashState::Sha512(Sha512::new()),
        };
        Self { state }
    }

    /// Algorithm the stream was created for
    pub fn algorithm(&self) -> HashAlgorithm {
        match self.state {
            HashState::Sha1(_) => HashAlgorithm::Sha1,
            HashState::Sha224(_) => HashAlgorithm::Sha224,
            HashState::Sha256(_) => HashAlgorithm::Sha256,
            HashState::Sha384(_) => HashAlgorithm::Sha384,
            HashState::Sha512(_) => HashAlgorithm::Sha512,
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        match &mut self.state {
            HashState::Sha1(h) => h.update(data),
            HashState::Sha224(h) => h.update(data),
            HashState::Sha256(h) => h.update(data),
            HashState::Sha384(h) => h.update(data),
            HashState::Sha512(h) => h.update(data),
        }
    }

    /// Consume the stream and return the digest.
    pub fn finish(self) -> Vec<u8> {
        match self.state {
            HashState::Sha1(h) => h.finalize().to_vec(),
            HashState::Sha224(h) => h.finalize().to_vec(),
            HashState::Sha256(h) => h.finalize().to_vec(),
            HashState::Sha384(h) => h.finalize().to_vec(),
            HashState::Sha512(h) => h.finalize().to_vec(),
        }
    }
}
