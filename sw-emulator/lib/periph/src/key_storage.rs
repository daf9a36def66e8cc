/*++

Licensed under the Apache-2.0 license.

File Name:

    key_storage.rs

Abstract:

    File contains the key storage unit the secure element delegates Ksu mode
    keys to.

--*/

use std::collections::BTreeMap;
use zeroize::Zeroizing;

/// External key storage unit
pub trait KeyStorage {
    fn contains_key(&self, index: u8) -> bool;

    fn get_key(&self, index: u8) -> Option<Zeroizing<Vec<u8>>>;

    /// Store `key` in slot `index`, replacing any previous key.
    fn add_key(&mut self, index: u8, key: &[u8]);
}

/// Key storage unit backed by process memory
#[derive(Default)]
pub struct InMemoryKeyStorage {
    keys: BTreeMap<u8, Zeroizing<Vec<u8>>>,
}

impl InMemoryKeyStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl KeyStorage for InMemoryKeyStorage {
    fn contains_key(&self, index: u8) -> bool {
        self.keys.contains_key(&index)
    }

    fn get_key(&self, index: u8) -> Option<Zeroizing<Vec<u8>>> {
        self.keys.get(&index).cloned()
    }

    fn add_key(&mut self, index: u8, key: &[u8]) {
        self.keys.insert(index, Zeroizing::new(key.to_vec()));
    }
}

impl<T: KeyStorage + ?Sized> KeyStorage for &mut T {
    fn contains_key(&self, index: u8) -> bool {
        T::contains_key(self, index)
    }

    fn get_key(&self, index: u8) -> Option<Zeroizing<Vec<u8>>> {
        T::get_key(self, index)
    }

    fn add_key(&mut self, index: u8, key: &[u8]) {
        T::add_key(self, index, key)
    }
}
