/*++

Licensed under the Apache-2.0 license.

File Name:

    aead.rs

Abstract:

    File contains the AES-GCM, AES-CCM and AES-CMAC commands.

--*/

use super::Context;
use crate::key::KeyMetadata;
use crate::{CommandError, ContextMode, ResponseCode};
use se_emu_bus::Bus;
use se_emu_crypto::{AesCcm, AesCmac, AesGcm, CryptoError, AEAD_TAG_SIZES, GCM_IV_SIZE};
use std::ops::RangeInclusive;
use zeroize::Zeroizing;

const CCM_NONCE_SIZES: RangeInclusive<usize> = 8..=13;

/// Shape of an AEAD command
struct AeadParams {
    key_meta: KeyMetadata,
    nonce_len: usize,
    tag_len: usize,
    aad_len: usize,
    data_len: usize,
}

/// Symmetric key and the fields common to both AEAD modes.
struct AeadInputs {
    key: Zeroizing<Vec<u8>>,
    nonce: Vec<u8>,
    aad: Vec<u8>,
    data: Vec<u8>,
}

fn check_tag_len(tag_len: usize) -> Result<(), CommandError> {
    if !AEAD_TAG_SIZES.contains(&tag_len) {
        log::warn!("Unsupported AEAD tag length {}", tag_len);
        return Err(ResponseCode::InvalidParameter.into());
    }
    Ok(())
}

fn gcm_params<B: Bus>(ctx: &Context<'_, B>) -> Result<AeadParams, CommandError> {
    let [key_meta, tag_len, aad_len, data_len] = ctx.command.params::<4>()?;
    let context = ContextMode::try_from(ctx.command.context_option())
        .map_err(|_| ResponseCode::InvalidParameter)?;
    if context != ContextMode::Whole {
        log::warn!("AES-GCM context mode {:?} is not supported", context);
        return Err(ResponseCode::Abort.into());
    }
    check_tag_len(tag_len as usize)?;
    Ok(AeadParams {
        key_meta: key_meta.into(),
        nonce_len: GCM_IV_SIZE,
        tag_len: tag_len as usize,
        aad_len: aad_len as usize,
        data_len: data_len as usize,
    })
}

/// CCM packs the nonce length above the tag length.
fn ccm_params<B: Bus>(ctx: &Context<'_, B>) -> Result<AeadParams, CommandError> {
    let [key_meta, lengths, aad_len, data_len] = ctx.command.params::<4>()?;
    let tag_len = (lengths & 0xFFFF) as usize;
    let nonce_len = (lengths >> 16) as usize;
    check_tag_len(tag_len)?;
    if !CCM_NONCE_SIZES.contains(&nonce_len) {
        log::warn!("Unsupported AES-CCM nonce length {}", nonce_len);
        return Err(ResponseCode::InvalidParameter.into());
    }
    Ok(AeadParams {
        key_meta: key_meta.into(),
        nonce_len,
        tag_len,
        aad_len: aad_len as usize,
        data_len: data_len as usize,
    })
}

fn read_inputs<B: Bus>(
    ctx: &mut Context<'_, B>,
    params: &AeadParams,
) -> Result<AeadInputs, CommandError> {
    ctx.skip_auth()?;
    let key = ctx.read_symmetric_key(params.key_meta)?;
    let nonce = ctx.take_fixed(params.nonce_len)?;
    let aad = ctx.take(params.aad_len)?;
    let data = ctx.take(params.data_len)?;
    Ok(AeadInputs {
        key,
        nonce,
        aad,
        data,
    })
}

/// Write the recovered plaintext, also when authentication failed.
fn finish_decrypt<B: Bus>(
    ctx: &mut Context<'_, B>,
    result: Result<(), CryptoError>,
    plaintext: &[u8],
) -> Result<(), CommandError> {
    match result {
        Ok(()) => ctx.put(plaintext),
        Err(CryptoError::AuthenticationFailed) => {
            log::warn!("AEAD tag mismatch");
            ctx.put(plaintext)?;
            Err(CryptoError::AuthenticationFailed.into())
        }
        Err(err) => Err(err.into()),
    }
}

pub(super) fn gcm_encrypt<B: Bus>(ctx: &mut Context<'_, B>) -> Result<(), CommandError> {
    let params = gcm_params(ctx)?;
    let inputs = read_inputs(ctx, &params)?;
    let (ciphertext, tag) = AesGcm::encrypt(
        &inputs.key,
        &inputs.nonce,
        &inputs.aad,
        &inputs.data,
        params.tag_len,
    )?;
    ctx.put(&ciphertext)?;
    ctx.put(&tag)
}

pub(super) fn gcm_decrypt<B: Bus>(ctx: &mut Context<'_, B>) -> Result<(), CommandError> {
    let params = gcm_params(ctx)?;
    let mut inputs = read_inputs(ctx, &params)?;
    let tag = ctx.take(params.tag_len)?;
    let result = AesGcm::decrypt_in_place(
        &inputs.key,
        &inputs.nonce,
        &inputs.aad,
        &mut inputs.data,
        &tag,
    );
    finish_decrypt(ctx, result, &inputs.data)
}

pub(super) fn ccm_encrypt<B: Bus>(ctx: &mut Context<'_, B>) -> Result<(), CommandError> {
    let params = ccm_params(ctx)?;
    let inputs = read_inputs(ctx, &params)?;
    let (ciphertext, tag) = AesCcm::encrypt(
        &inputs.key,
        &inputs.nonce,
        &inputs.aad,
        &inputs.data,
        params.tag_len,
    )?;
    ctx.put(&ciphertext)?;
    ctx.put(&tag)
}

pub(super) fn ccm_decrypt<B: Bus>(ctx: &mut Context<'_, B>) -> Result<(), CommandError> {
    let params = ccm_params(ctx)?;
    let mut inputs = read_inputs(ctx, &params)?;
    let tag = ctx.take(params.tag_len)?;
    let result = AesCcm::decrypt_in_place(
        &inputs.key,
        &inputs.nonce,
        &inputs.aad,
        &mut inputs.data,
        &tag,
    );
    finish_decrypt(ctx, result, &inputs.data)
}

pub(super) fn cmac<B: Bus>(ctx: &mut Context<'_, B>) -> Result<(), CommandError> {
    let [key_meta, data_len] = ctx.command.params::<2>()?;
    ctx.skip_auth()?;
    let key = ctx.read_symmetric_key(KeyMetadata::from(key_meta))?;
    let data = ctx.take(data_len as usize)?;
    ctx.put(&AesCmac::mac(&key, &data)?)
}
