/*++

Licensed under the Apache-2.0 license.

File Name:

    ecc.rs

Abstract:

    File contains the P-256 signature and key agreement commands.

--*/

use super::Context;
use crate::key::KeyMetadata;
use crate::{CommandError, HashOption, ResponseCode};
use se_emu_bus::Bus;
use se_emu_crypto::{EccSignature, P256};

/// Signatures are computed over SHA-256 only.
fn check_hash<B: Bus>(ctx: &Context<'_, B>) -> Result<(), CommandError> {
    let alg = ctx.command.hash_option()?;
    if alg != HashOption::Sha256 {
        log::warn!("P-256 signatures over {:?} are not supported", alg);
        return Err(ResponseCode::InvalidParameter.into());
    }
    Ok(())
}

pub(super) fn sign<B: Bus>(ctx: &mut Context<'_, B>) -> Result<(), CommandError> {
    let [key_meta, data_len] = ctx.command.params::<2>()?;
    check_hash(ctx)?;
    ctx.skip_auth()?;
    let key = ctx.read_ecc_key(KeyMetadata::from(key_meta))?;
    let message = ctx.take(data_len as usize)?;
    let signature = P256::sign(key.require_private()?, &message)?;
    ctx.put(&signature.to_bytes())
}

pub(super) fn verify<B: Bus>(ctx: &mut Context<'_, B>) -> Result<(), CommandError> {
    let [key_meta, data_len] = ctx.command.params::<2>()?;
    check_hash(ctx)?;
    ctx.skip_auth()?;
    let key = ctx.read_ecc_key(KeyMetadata::from(key_meta))?;
    let message = ctx.take(data_len as usize)?;
    let signature = EccSignature::from_bytes(&ctx.take_array::<64>()?);
    Ok(P256::verify(key.require_public()?, &message, &signature)?)
}

pub(super) fn diffie_hellman<B: Bus>(ctx: &mut Context<'_, B>) -> Result<(), CommandError> {
    let [priv_meta, pub_meta] = ctx.command.params::<2>()?;
    ctx.skip_auth()?;
    let private = ctx.read_ecc_key(KeyMetadata::from(priv_meta))?;
    let peer = ctx.read_ecc_key(KeyMetadata::from(pub_meta))?;
    let shared = P256::diffie_hellman(private.require_private()?, peer.require_public()?)?;
    ctx.put(&shared)
}
