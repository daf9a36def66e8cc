/*++

Licensed under the Apache-2.0 license.

File Name:

    mod.rs

Abstract:

    File contains the command dispatch table and the context handed to every
    command handler.

--*/

mod aead;
mod aes;
mod device;
mod ecc;
mod hash;
mod jpake;
mod key_mgmt;
mod random;

use crate::descriptor::{InputChain, OutputChain};
use crate::key::{resolve_key, wrap_key, EccKey, KeyMetadata, KeyMode, KeyType};
use crate::{
    Command, CommandError, CommandId, KeyStorage, ResponseCode, SecureElementConfig,
    SecureElementState,
};
use rand::RngCore;
use se_emu_bus::Bus;
use zeroize::Zeroizing;

/// Everything a handler may touch while executing one command
pub(crate) struct Context<'a, B: Bus> {
    pub bus: &'a mut B,
    pub state: &'a mut SecureElementState,
    pub key_storage: &'a mut dyn KeyStorage,
    pub config: &'a SecureElementConfig,
    pub command: &'a Command,
    input: InputChain,
    output: OutputChain,
}

pub(crate) type Handler<B> = fn(&mut Context<'_, B>) -> Result<(), CommandError>;

impl<'a, B: Bus> Context<'a, B> {
    pub fn new(
        bus: &'a mut B,
        state: &'a mut SecureElementState,
        key_storage: &'a mut dyn KeyStorage,
        config: &'a SecureElementConfig,
        command: &'a Command,
    ) -> Self {
        Self {
            bus,
            state,
            key_storage,
            config,
            command,
            input: InputChain::new(command.input),
            output: OutputChain::new(command.output),
        }
    }

    /// Gather a variable length input field.
    pub fn take(&mut self, len: usize) -> Result<Vec<u8>, CommandError> {
        self.input.take_variable(&mut *self.bus, len)
    }

    pub fn take_fixed(&mut self, len: usize) -> Result<Vec<u8>, CommandError> {
        self.input.take_fixed(&mut *self.bus, len)
    }

    pub fn take_array<const N: usize>(&mut self) -> Result<[u8; N], CommandError> {
        self.input.take_array::<B, N>(&mut *self.bus)
    }

    /// Skip the authorization descriptor leading every key bearing command.
    pub fn skip_auth(&mut self) -> Result<(), CommandError> {
        self.input.skip(&mut *self.bus)
    }

    /// Scatter `data` over the output chain.
    pub fn put(&mut self, data: &[u8]) -> Result<(), CommandError> {
        self.output.put(&mut *self.bus, data)
    }

    /// Scatter `len` random bytes, generated hop by hop.
    pub fn put_random(&mut self, len: usize) -> Result<(), CommandError> {
        let rng = self.state.rng();
        self.output
            .put_generated(&mut *self.bus, len, |chunk| rng.fill_bytes(chunk))
    }

    /// Resolve the next key descriptor to `key_len` bytes of key material.
    pub fn read_key(
        &mut self,
        meta: KeyMetadata,
        key_len: usize,
    ) -> Result<Zeroizing<Vec<u8>>, CommandError> {
        let desc = self.input.take_descriptor(&mut *self.bus)?;
        resolve_key(meta, key_len, &desc, &*self.state, &*self.key_storage)
    }

    /// Key for a symmetric primitive. Non raw key types yield a zeroed key.
    pub fn read_symmetric_key(
        &mut self,
        meta: KeyMetadata,
    ) -> Result<Zeroizing<Vec<u8>>, CommandError> {
        let key_len = meta.raw_size() as usize;
        if meta.key_type() != Ok(KeyType::Raw) {
            log::warn!(
                "Key type {:#x} used for a symmetric operation, substituting a zeroed key",
                meta.key_type_bits()
            );
            self.input.skip(&mut *self.bus)?;
            return Ok(Zeroizing::new(vec![0u8; key_len]));
        }
        self.read_key(meta, key_len)
    }

    /// P-256 key split into its components.
    pub fn read_ecc_key(&mut self, meta: KeyMetadata) -> Result<EccKey, CommandError> {
        if meta.key_type()? != KeyType::EccWeierstrass {
            return Err(ResponseCode::InvalidParameter.into());
        }
        let key = self.read_key(meta, meta.key_size()?)?;
        Ok(EccKey::parse(meta, &key)?)
    }

    /// Deliver a produced key through the storage mode named by `meta`.
    pub fn store_key(&mut self, meta: KeyMetadata, key: &[u8]) -> Result<(), CommandError> {
        let index = meta.index();
        match meta.mode() {
            KeyMode::Unprotected => self.put(key),
            KeyMode::Wrapped => self.put(&wrap_key(key)),
            KeyMode::Volatile => {
                self.state.insert_volatile_key(index, key);
                Ok(())
            }
            KeyMode::Ksu => {
                self.key_storage.add_key(index, key);
                Ok(())
            }
        }
    }
}

/// Handler for every known command.
pub(crate) fn handler<B: Bus>(id: CommandId) -> Handler<B> {
    match id {
        CommandId::ImportKey => key_mgmt::import_key,
        CommandId::ExportKey => key_mgmt::export_key,
        CommandId::DeleteKey => key_mgmt::delete_key,
        CommandId::CreateKey => key_mgmt::create_key,
        CommandId::ReadPubKey => key_mgmt::read_pub_key,
        CommandId::Hash => hash::hash,
        CommandId::HashUpdate => hash::hash_update,
        CommandId::Hmac => hash::hmac,
        CommandId::HashFinish => hash::hash_finish,
        CommandId::AesEncrypt => aes::aes_encrypt,
        CommandId::AesDecrypt => aes::aes_decrypt,
        CommandId::AesGcmEncrypt => aead::gcm_encrypt,
        CommandId::AesGcmDecrypt => aead::gcm_decrypt,
        CommandId::AesCmac => aead::cmac,
        CommandId::AesCcmEncrypt => aead::ccm_encrypt,
        CommandId::AesCcmDecrypt => aead::ccm_decrypt,
        CommandId::SignatureSign => ecc::sign,
        CommandId::SignatureVerify => ecc::verify,
        CommandId::GetRandom => random::get_random,
        CommandId::JpakeRound1Generate => jpake::round1_generate,
        CommandId::JpakeRound1Verify => jpake::round1_verify,
        CommandId::JpakeRound2Generate => jpake::round2_generate,
        CommandId::JpakeRound2Verify => jpake::round2_verify,
        CommandId::JpakeGenSessionKey => jpake::gen_session_key,
        CommandId::DiffieHellman => ecc::diffie_hellman,
        CommandId::FlashErasePage => device::flash_erase_page,
        CommandId::FlashWrite => device::flash_write,
        CommandId::FlashGetInfo => device::flash_get_info,
        CommandId::GetStatus => device::get_status,
        CommandId::ReadSerial => device::read_serial,
    }
}
