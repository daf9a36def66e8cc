/*++

Licensed under the Apache-2.0 license.

File Name:

    state.rs

Abstract:

    File contains the process state shared by all commands: volatile keys,
    generated key pairs, the hash stream slot and the random generator.

--*/

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use se_emu_crypto::{EccPoint, EccScalar, HashStream};
use std::collections::HashMap;
use zeroize::Zeroizing;

/// Volatile slot reserved for the NVM3 encryption key
pub const NVM3_KEY_INDEX: u8 = 246;

/// Fixed internal NVM3 encryption key
pub const NVM3_KEY: [u8; 32] = [
    0x4e, 0x56, 0x4d, 0x33, 0x2d, 0x6b, 0x65, 0x79, 0x2d, 0x73, 0x65, 0x2d, 0x65, 0x6d, 0x75,
    0x2d, 0x30, 0x31, 0x32, 0x33, 0x34, 0x35, 0x36, 0x37, 0x38, 0x39, 0x61, 0x62, 0x63, 0x64,
    0x65, 0x66,
];

/// A generated P-256 key pair
pub struct EccKeyPair {
    pub private: Zeroizing<EccScalar>,
    pub public: EccPoint,
}

pub struct SecureElementState {
    volatile_keys: HashMap<u8, Zeroizing<Vec<u8>>>,
    key_pairs: Vec<EccKeyPair>,
    hash_stream: Option<HashStream>,
    rng: StdRng,
}

impl SecureElementState {
    /// Create the state. `rng_seed` makes the random generator deterministic.
    pub fn new(rng_seed: Option<u64>) -> Self {
        let rng = match rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut state = Self {
            volatile_keys: HashMap::new(),
            key_pairs: Vec::new(),
            hash_stream: None,
            rng,
        };
        state.reset();
        state
    }

    /// Clear volatile keys, key pairs and the hash stream, then reseed the
    /// NVM3 slot. The random generator keeps its state.
    pub fn reset(&mut self) {
        self.volatile_keys.clear();
        self.volatile_keys
            .insert(NVM3_KEY_INDEX, Zeroizing::new(NVM3_KEY.to_vec()));
        self.key_pairs.clear();
        self.hash_stream = None;
    }

    pub fn volatile_key(&self, index: u8) -> Option<&[u8]> {
        self.volatile_keys.get(&index).map(|key| key.as_slice())
    }

    pub fn insert_volatile_key(&mut self, index: u8, key: &[u8]) {
        self.volatile_keys
            .insert(index, Zeroizing::new(key.to_vec()));
    }

    /// Returns false when no key lives at `index`.
    pub fn remove_volatile_key(&mut self, index: u8) -> bool {
        self.volatile_keys.remove(&index).is_some()
    }

    pub fn volatile_key_count(&self) -> usize {
        self.volatile_keys.len()
    }

    pub fn push_key_pair(&mut self, private: &EccScalar, public: EccPoint) {
        self.key_pairs.push(EccKeyPair {
            private: Zeroizing::new(*private),
            public,
        });
    }

    /// Public key generated together with `private`.
    pub fn find_public_key(&self, private: &EccScalar) -> Option<&EccPoint> {
        self.key_pairs
            .iter()
            .find(|pair| *pair.private == *private)
            .map(|pair| &pair.public)
    }

    pub fn key_pairs(&self) -> &[EccKeyPair] {
        &self.key_pairs
    }

    pub fn hash_stream(&self) -> Option<&HashStream> {
        self.hash_stream.as_ref()
    }

    pub fn hash_stream_mut(&mut self) -> &mut Option<HashStream> {
        &mut self.hash_stream
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn random_bytes(&mut self, len: usize) -> Zeroizing<Vec<u8>> {
        let mut bytes = Zeroizing::new(vec![0u8; len]);
        self.rng.fill_bytes(&mut bytes);
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use se_emu_crypto::HashAlgorithm;

    #[test]
    fn test_new_state_holds_nvm3_key() {
        let state = SecureElementState::new(Some(1));
        assert_eq!(state.volatile_key(NVM3_KEY_INDEX), Some(&NVM3_KEY[..]));
        assert_eq!(state.volatile_key_count(), 1);
        assert!(state.hash_stream().is_none());
    }

    #[test]
    fn test_reset() {
        let mut state = SecureElementState::new(Some(1));
        state.insert_volatile_key(3, &[1, 2, 3]);
        state.insert_volatile_key(NVM3_KEY_INDEX, &[0; 32]);
        state.push_key_pair(&[7; 32], [8; 64]);
        *state.hash_stream_mut() = Some(HashStream::new(HashAlgorithm::Sha256));

        state.reset();
        assert_eq!(state.volatile_key(3), None);
        assert_eq!(state.volatile_key(NVM3_KEY_INDEX), Some(&NVM3_KEY[..]));
        assert!(state.key_pairs().is_empty());
        assert!(state.hash_stream().is_none());
    }

    #[test]
    fn test_key_pair_lookup() {
        let mut state = SecureElementState::new(Some(1));
        state.push_key_pair(&[1; 32], [2; 64]);
        state.push_key_pair(&[3; 32], [4; 64]);
        assert_eq!(state.find_public_key(&[3; 32]), Some(&[4; 64]));
        assert_eq!(state.find_public_key(&[5; 32]), None);
    }

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let mut a = SecureElementState::new(Some(42));
        let mut b = SecureElementState::new(Some(42));
        assert_eq!(a.random_bytes(16).as_slice(), b.random_bytes(16).as_slice());
        assert!(a.remove_volatile_key(NVM3_KEY_INDEX));
        assert!(!a.remove_volatile_key(NVM3_KEY_INDEX));
    }
}
