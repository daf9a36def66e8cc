/*++

Licensed under the Apache-2.0 license.

File Name:

    key.rs

Abstract:

    File contains the packed key metadata word and the key resolver that maps
    metadata plus a key descriptor to key material.

--*/

use crate::descriptor::Descriptor;
use crate::{CommandError, KeyStorage, ResponseCode, SecureElementState};
use bitfield::bitfield;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use se_emu_crypto::{EccPoint, EccScalar, ECC_COORD_SIZE};
use zeroize::Zeroizing;

/// Marker filling the IV field of a wrapped key
pub const WRAPPED_KEY_IV: [u8; 12] = [0xAA; 12];

/// Marker filling the tag field of a wrapped key
pub const WRAPPED_KEY_TAG: [u8; 16] = [0xBB; 16];

/// Wrapping overhead in bytes
pub const WRAPPED_KEY_OVERHEAD: usize = WRAPPED_KEY_IV.len() + WRAPPED_KEY_TAG.len();

#[derive(Debug, Copy, Clone, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum KeyType {
    Raw = 0x0,
    EccWeierstrass = 0x8,
    EccEdwards = 0xA,
    EccEddsa = 0xC,
    Ed25519 = 0xD,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum KeyMode {
    /// Key lives in host memory only
    Unprotected = 0,

    /// Key lives in the secure element until reset
    Volatile = 1,

    /// Key travels as `IV || key || tag`
    Wrapped = 2,

    /// Key lives in the key storage unit
    Ksu = 3,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum KeyRestriction {
    Unlocked = 0,
    Locked = 1,
    Internal = 2,
    Restricted = 3,
}

bitfield! {
    /// Key Metadata
    #[derive(Default, PartialEq, Eq, Clone, Copy)]
    pub struct KeyMetadata(u32);
    impl Debug;

    /// Key type
    pub u8, key_type_bits, set_key_type_bits: 31, 28;

    /// Storage mode
    pub u8, mode_bits, set_mode_bits: 27, 26;

    /// Usage restriction
    pub u8, restriction_bits, set_restriction_bits: 25, 24;

    /// Volatile or key storage slot
    pub u8, index, set_index: 23, 16;

    /// Raw key size in bytes
    pub u16, raw_size, set_raw_size: 14, 0;

    /// Weierstrass scalar size in bytes
    pub u16, ecc_size, set_ecc_size: 9, 0;

    /// Weierstrass key used for signing rather than key exchange
    pub ecc_signing, set_ecc_signing: 10;

    /// Weierstrass key buffer carries the public point
    pub ecc_has_public, set_ecc_has_public: 13;

    /// Weierstrass key buffer carries the private scalar
    pub ecc_has_private, set_ecc_has_private: 14;
}

impl From<u32> for KeyMetadata {
    fn from(word: u32) -> Self {
        KeyMetadata(word)
    }
}

impl From<KeyMetadata> for u32 {
    fn from(meta: KeyMetadata) -> Self {
        meta.0
    }
}

impl KeyMetadata {
    pub fn new(key_type: KeyType, mode: KeyMode, restriction: KeyRestriction, index: u8) -> Self {
        let mut meta = KeyMetadata(0);
        meta.set_key_type_bits(key_type.into());
        meta.set_mode_bits(mode.into());
        meta.set_restriction_bits(restriction.into());
        meta.set_index(index);
        meta
    }

    /// Unlocked raw key of `size` bytes
    pub fn raw(mode: KeyMode, index: u8, size: u16) -> Self {
        let mut meta = Self::new(KeyType::Raw, mode, KeyRestriction::Unlocked, index);
        meta.set_raw_size(size);
        meta
    }

    /// Unlocked P-256 key carrying the selected components
    pub fn p256(mode: KeyMode, index: u8, private: bool, public: bool) -> Self {
        let mut meta = Self::new(KeyType::EccWeierstrass, mode, KeyRestriction::Unlocked, index);
        meta.set_ecc_size(ECC_COORD_SIZE as u16);
        meta.set_ecc_has_private(private);
        meta.set_ecc_has_public(public);
        meta
    }

    pub fn with_restriction(mut self, restriction: KeyRestriction) -> Self {
        self.set_restriction_bits(restriction.into());
        self
    }

    pub fn key_type(&self) -> Result<KeyType, ResponseCode> {
        KeyType::try_from(self.key_type_bits()).map_err(|_| ResponseCode::InvalidParameter)
    }

    pub fn mode(&self) -> KeyMode {
        match self.mode_bits() {
            0 => KeyMode::Unprotected,
            1 => KeyMode::Volatile,
            2 => KeyMode::Wrapped,
            _ => KeyMode::Ksu,
        }
    }

    pub fn restriction(&self) -> KeyRestriction {
        match self.restriction_bits() {
            0 => KeyRestriction::Unlocked,
            1 => KeyRestriction::Locked,
            2 => KeyRestriction::Internal,
            _ => KeyRestriction::Restricted,
        }
    }

    /// Size of the plaintext key buffer described by the metadata.
    ///
    /// # Error
    ///
    /// * `ResponseCode::InvalidParameter` - Unsupported type or size
    pub fn key_size(&self) -> Result<usize, ResponseCode> {
        match self.key_type()? {
            KeyType::Raw => Ok(self.raw_size() as usize),
            KeyType::EccWeierstrass => {
                if self.ecc_size() as usize != ECC_COORD_SIZE {
                    return Err(ResponseCode::InvalidParameter);
                }
                Ok(self.ecc_has_private() as usize * ECC_COORD_SIZE
                    + self.ecc_has_public() as usize * 2 * ECC_COORD_SIZE)
            }
            key_type => {
                log::warn!("Unsupported key type {:?}", key_type);
                Err(ResponseCode::InvalidParameter)
            }
        }
    }
}

/// Components of a P-256 key buffer laid out as `private || X || Y`
pub struct EccKey {
    pub private: Option<Zeroizing<EccScalar>>,
    pub public: Option<EccPoint>,
}

impl EccKey {
    /// Split a key buffer according to `meta`.
    pub fn parse(meta: KeyMetadata, buf: &[u8]) -> Result<Self, ResponseCode> {
        if meta.key_type()? != KeyType::EccWeierstrass || buf.len() != meta.key_size()? {
            return Err(ResponseCode::InvalidParameter);
        }
        let (private, rest) = if meta.ecc_has_private() {
            let mut scalar = Zeroizing::new([0u8; ECC_COORD_SIZE]);
            scalar.copy_from_slice(&buf[..ECC_COORD_SIZE]);
            (Some(scalar), &buf[ECC_COORD_SIZE..])
        } else {
            (None, buf)
        };
        let public = meta.ecc_has_public().then(|| {
            let mut point = [0u8; 2 * ECC_COORD_SIZE];
            point.copy_from_slice(rest);
            point
        });
        Ok(Self { private, public })
    }

    /// Key buffer for `meta`, omitting absent components.
    pub fn serialize(&self, meta: KeyMetadata) -> Zeroizing<Vec<u8>> {
        let mut buf = Zeroizing::new(Vec::with_capacity(3 * ECC_COORD_SIZE));
        if let (true, Some(private)) = (meta.ecc_has_private(), &self.private) {
            buf.extend_from_slice(&private[..]);
        }
        if let (true, Some(public)) = (meta.ecc_has_public(), &self.public) {
            buf.extend_from_slice(public);
        }
        buf
    }

    pub fn require_private(&self) -> Result<&EccScalar, ResponseCode> {
        self.private.as_deref().ok_or(ResponseCode::InvalidParameter)
    }

    pub fn require_public(&self) -> Result<&EccPoint, ResponseCode> {
        self.public.as_ref().ok_or(ResponseCode::InvalidParameter)
    }
}

/// Wrap a plaintext key in the marker envelope.
pub fn wrap_key(key: &[u8]) -> Zeroizing<Vec<u8>> {
    let mut wrapped = Zeroizing::new(Vec::with_capacity(key.len() + WRAPPED_KEY_OVERHEAD));
    wrapped.extend_from_slice(&WRAPPED_KEY_IV);
    wrapped.extend_from_slice(key);
    wrapped.extend_from_slice(&WRAPPED_KEY_TAG);
    wrapped
}

/// Resolve the key material for `meta` from its key descriptor.
///
/// # Arguments
///
/// * `meta` - Key metadata word
/// * `key_len` - Expected plaintext size for modes that read host memory
/// * `desc` - The key descriptor, already walked
/// * `state` - Holder of volatile keys
/// * `storage` - Key storage unit
///
/// # Error
///
/// * `ResponseCode::InvalidParameter` - Descriptor too short or key not present
pub fn resolve_key(
    meta: KeyMetadata,
    key_len: usize,
    desc: &Descriptor,
    state: &SecureElementState,
    storage: &dyn KeyStorage,
) -> Result<Zeroizing<Vec<u8>>, CommandError> {
    let index = meta.index();
    let key = match meta.mode() {
        KeyMode::Unprotected => desc
            .contents
            .get(..key_len)
            .map(|key| Zeroizing::new(key.to_vec())),
        KeyMode::Wrapped => {
            let body = desc.contents.len().checked_sub(WRAPPED_KEY_OVERHEAD);
            match body {
                Some(body) if body >= key_len => {
                    let start = WRAPPED_KEY_IV.len();
                    Some(Zeroizing::new(desc.contents[start..start + key_len].to_vec()))
                }
                _ => None,
            }
        }
        KeyMode::Volatile => state.volatile_key(index).map(|key| Zeroizing::new(key.to_vec())),
        KeyMode::Ksu => storage.get_key(index),
    };
    key.ok_or_else(|| {
        log::warn!(
            "Cannot resolve {:?} key at index {} from descriptor {:#010x}",
            meta.mode(),
            index,
            desc.pointer
        );
        ResponseCode::InvalidParameter.into()
    })
}
