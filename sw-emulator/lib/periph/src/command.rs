/*++

Licensed under the Apache-2.0 license.

File Name:

    command.rs

Abstract:

    File contains the command identifiers, option encodings and the decoder
    that turns a framed transaction into a command.

--*/

use crate::{MailboxProtocol, ResponseCode};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use se_emu_crypto::HashAlgorithm;

/// Maximum number of parameter words in one transaction
pub const MAX_PARAMS: usize = 13;

#[derive(Debug, Copy, Clone, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u16)]
pub enum CommandId {
    ImportKey = 0x0100,
    ExportKey = 0x0102,
    DeleteKey = 0x0105,
    CreateKey = 0x0200,
    ReadPubKey = 0x0201,
    Hash = 0x0300,
    HashUpdate = 0x0301,
    Hmac = 0x0302,
    HashFinish = 0x0303,
    AesEncrypt = 0x0400,
    AesDecrypt = 0x0401,
    AesGcmEncrypt = 0x0402,
    AesGcmDecrypt = 0x0403,
    AesCmac = 0x0404,
    AesCcmEncrypt = 0x0405,
    AesCcmDecrypt = 0x0406,
    SignatureSign = 0x0600,
    SignatureVerify = 0x0601,
    GetRandom = 0x0700,
    JpakeRound1Generate = 0x0B00,
    JpakeRound1Verify = 0x0B01,
    JpakeRound2Generate = 0x0B02,
    JpakeRound2Verify = 0x0B03,
    JpakeGenSessionKey = 0x0B04,
    DiffieHellman = 0x0E00,
    FlashErasePage = 0x4301,
    FlashWrite = 0x4302,
    FlashGetInfo = 0x4303,
    GetStatus = 0xFE00,
    ReadSerial = 0xFE01,
}

/// Hash algorithm selector, options bits 15:8
#[derive(Debug, Copy, Clone, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum HashOption {
    Sha1 = 2,
    Sha224 = 3,
    Sha256 = 4,
    Sha384 = 5,
    Sha512 = 6,
}

impl From<HashOption> for HashAlgorithm {
    fn from(option: HashOption) -> Self {
        match option {
            HashOption::Sha1 => HashAlgorithm::Sha1,
            HashOption::Sha224 => HashAlgorithm::Sha224,
            HashOption::Sha256 => HashAlgorithm::Sha256,
            HashOption::Sha384 => HashAlgorithm::Sha384,
            HashOption::Sha512 => HashAlgorithm::Sha512,
        }
    }
}

/// AES chaining mode, options bits 15:8
#[derive(Debug, Copy, Clone, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum AesMode {
    Ecb = 1,
    Cbc = 2,
    Ctr = 3,
    Cfb = 4,
    Ofb = 5,
}

/// Position of a call in a multi-part operation, options bits 7:4
#[derive(Debug, Copy, Clone, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum ContextMode {
    Whole = 0,
    Start = 1,
    End = 2,
    Middle = 3,
}

/// A decoded transaction
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Command {
    /// Raw 16-bit command identifier
    pub id: u16,
    pub options: u16,
    pub input: u32,
    pub output: u32,
    pub params: Vec<u32>,
}

impl Command {
    /// Build the command word `id << 16 | options`.
    pub fn command_word(id: impl Into<u16>, options: u16) -> u32 {
        u32::from(id.into()) << 16 | u32::from(options)
    }

    /// Decode the transaction words following the header, and the handle on
    /// Series 3.
    ///
    /// # Error
    ///
    /// * `ResponseCode::MailboxInvalid` - Transaction shorter than the fixed prefix
    ///   or carrying more than `MAX_PARAMS` parameters
    pub fn decode(words: &[u32], protocol: MailboxProtocol) -> Result<Self, ResponseCode> {
        let prefix = protocol.prefix_words();
        if words.len() < prefix {
            return Err(ResponseCode::MailboxInvalid);
        }
        let params = &words[prefix..];
        if params.len() > MAX_PARAMS {
            return Err(ResponseCode::MailboxInvalid);
        }
        let fixed = &words[prefix - 3..prefix];
        Ok(Self {
            id: (fixed[0] >> 16) as u16,
            options: fixed[0] as u16,
            input: fixed[1],
            output: fixed[2],
            params: params.to_vec(),
        })
    }

    pub fn command_id(&self) -> Option<CommandId> {
        CommandId::try_from(self.id).ok()
    }

    /// Options bits 15:8
    pub fn algorithm_option(&self) -> u8 {
        (self.options >> 8) as u8
    }

    /// Options bits 7:4
    pub fn context_option(&self) -> u8 {
        ((self.options >> 4) & 0xF) as u8
    }

    /// Parameters of a command that takes exactly `N` of them.
    ///
    /// # Error
    ///
    /// * `ResponseCode::Abort` - Parameter count mismatch
    pub fn params<const N: usize>(&self) -> Result<[u32; N], ResponseCode> {
        <[u32; N]>::try_from(self.params.as_slice()).map_err(|_| {
            log::warn!(
                "Command {:#06x} expects {} parameters, got {}",
                self.id,
                N,
                self.params.len()
            );
            ResponseCode::Abort
        })
    }

    pub fn hash_option(&self) -> Result<HashOption, ResponseCode> {
        HashOption::try_from(self.algorithm_option()).map_err(|_| ResponseCode::InvalidParameter)
    }
}
