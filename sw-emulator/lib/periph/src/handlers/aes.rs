/*++

Licensed under the Apache-2.0 license.

File Name:

    aes.rs

Abstract:

    File contains the AES block mode commands.

--*/

use super::Context;
use crate::key::KeyMetadata;
use crate::{AesMode, CommandError, ContextMode, ResponseCode};
use se_emu_bus::Bus;
use se_emu_crypto::{AesCbc, AesEcb, AES_BLOCK_SIZE};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Direction {
    Encrypt,
    Decrypt,
}

pub(super) fn aes_encrypt<B: Bus>(ctx: &mut Context<'_, B>) -> Result<(), CommandError> {
    aes_block(ctx, Direction::Encrypt)
}

pub(super) fn aes_decrypt<B: Bus>(ctx: &mut Context<'_, B>) -> Result<(), CommandError> {
    aes_block(ctx, Direction::Decrypt)
}

/// Check the data length against the rules of `mode`.
fn length_valid(mode: AesMode, len: usize) -> bool {
    match mode {
        AesMode::Ecb | AesMode::Cfb | AesMode::Ofb => len > 0 && len % AES_BLOCK_SIZE == 0,
        AesMode::Cbc => len >= AES_BLOCK_SIZE && len % AES_BLOCK_SIZE == 0,
        AesMode::Ctr => len > 0,
    }
}

/// Inputs are auth, key, iv (CBC only, 16 bytes in every context mode) and
/// data. Outputs are data followed by the next IV for CBC Start and Middle.
fn aes_block<B: Bus>(ctx: &mut Context<'_, B>, direction: Direction) -> Result<(), CommandError> {
    let [key_meta, data_len] = ctx.command.params::<2>()?;
    let mode = AesMode::try_from(ctx.command.algorithm_option())
        .map_err(|_| ResponseCode::InvalidParameter)?;
    let context = ContextMode::try_from(ctx.command.context_option())
        .map_err(|_| ResponseCode::InvalidParameter)?;
    let data_len = data_len as usize;
    if !length_valid(mode, data_len) {
        log::warn!("{} bytes is not a valid {:?} length", data_len, mode);
        return Err(ResponseCode::InvalidParameter.into());
    }
    if !matches!(mode, AesMode::Ecb | AesMode::Cbc) {
        log::warn!("AES {:?} mode is not supported", mode);
        return Err(ResponseCode::Abort.into());
    }

    ctx.skip_auth()?;
    let key = ctx.read_symmetric_key(KeyMetadata::from(key_meta))?;
    if mode == AesMode::Ecb {
        let data = ctx.take(data_len)?;
        let out = match direction {
            Direction::Encrypt => AesEcb::encrypt(&key, &data)?,
            Direction::Decrypt => AesEcb::decrypt(&key, &data)?,
        };
        return ctx.put(&out);
    }

    let iv = ctx.take_fixed(AES_BLOCK_SIZE)?;
    let data = ctx.take(data_len)?;
    let (out, next_iv) = match direction {
        Direction::Encrypt => AesCbc::encrypt(&key, &iv, &data)?,
        Direction::Decrypt => AesCbc::decrypt(&key, &iv, &data)?,
    };
    ctx.put(&out)?;
    if matches!(context, ContextMode::Start | ContextMode::Middle) {
        ctx.put(&next_iv)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_rules() {
        assert!(length_valid(AesMode::Ecb, 32));
        assert!(!length_valid(AesMode::Ecb, 0));
        assert!(!length_valid(AesMode::Ecb, 17));
        assert!(length_valid(AesMode::Cbc, 16));
        assert!(!length_valid(AesMode::Cbc, 8));
        assert!(!length_valid(AesMode::Cbc, 24));
        assert!(length_valid(AesMode::Ctr, 5));
        assert!(!length_valid(AesMode::Ctr, 0));
    }
}
