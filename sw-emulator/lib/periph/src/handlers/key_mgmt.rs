/*++

Licensed under the Apache-2.0 license.

File Name:

    key_mgmt.rs

Abstract:

    File contains the key lifecycle commands: import, export, delete, create
    and public key readout.

--*/

use super::Context;
use crate::key::{EccKey, KeyMetadata, KeyMode, KeyRestriction, KeyType};
use crate::{CommandError, ResponseCode};
use se_emu_bus::Bus;
use se_emu_crypto::P256;
use zeroize::Zeroizing;

fn key_meta<B: Bus>(ctx: &Context<'_, B>) -> Result<KeyMetadata, CommandError> {
    let [key_meta] = ctx.command.params::<1>()?;
    Ok(KeyMetadata::from(key_meta))
}

/// Store a plaintext key into a protected mode.
pub(super) fn import_key<B: Bus>(ctx: &mut Context<'_, B>) -> Result<(), CommandError> {
    let meta = key_meta(ctx)?;
    if meta.mode() == KeyMode::Unprotected {
        log::warn!("Cannot import into an unprotected key");
        return Err(ResponseCode::InvalidParameter.into());
    }
    let key_size = meta.key_size()?;
    ctx.skip_auth()?;
    let key = Zeroizing::new(ctx.take_fixed(key_size)?);
    ctx.store_key(meta, &key)
}

pub(super) fn export_key<B: Bus>(ctx: &mut Context<'_, B>) -> Result<(), CommandError> {
    let meta = key_meta(ctx)?;
    if meta.restriction() != KeyRestriction::Unlocked {
        log::warn!("Export of a {:?} key refused", meta.restriction());
        return Err(ResponseCode::AuthorizationError.into());
    }
    let key_size = meta.key_size()?;
    ctx.skip_auth()?;
    let key = ctx.read_key(meta, key_size)?;
    ctx.put(&key)
}

pub(super) fn delete_key<B: Bus>(ctx: &mut Context<'_, B>) -> Result<(), CommandError> {
    let meta = key_meta(ctx)?;
    if meta.mode() != KeyMode::Volatile {
        log::warn!("Only volatile keys can be deleted, got {:?}", meta.mode());
        return Err(ResponseCode::InvalidParameter.into());
    }
    ctx.skip_auth()?;
    ctx.read_key(meta, 0)?;
    ctx.state.remove_volatile_key(meta.index());
    Ok(())
}

/// Generate a raw key or a P-256 key pair.
pub(super) fn create_key<B: Bus>(ctx: &mut Context<'_, B>) -> Result<(), CommandError> {
    let meta = key_meta(ctx)?;
    let key_size = meta.key_size()?;
    if key_size == 0 {
        return Err(ResponseCode::InvalidParameter.into());
    }
    ctx.skip_auth()?;
    let key = match meta.key_type()? {
        KeyType::EccWeierstrass => {
            let private = Zeroizing::new(P256::generate_private_key(ctx.state.rng()));
            let public = P256::public_key(&private)?;
            ctx.state.push_key_pair(&private, public);
            EccKey {
                private: Some(private),
                public: Some(public),
            }
            .serialize(meta)
        }
        _ => ctx.state.random_bytes(key_size),
    };
    ctx.store_key(meta, &key)
}

pub(super) fn read_pub_key<B: Bus>(ctx: &mut Context<'_, B>) -> Result<(), CommandError> {
    let meta = key_meta(ctx)?;
    ctx.skip_auth()?;
    let key = ctx.read_ecc_key(meta)?;
    let public = match (&key.public, &key.private) {
        (Some(public), _) => *public,
        (None, Some(private)) => *ctx.state.find_public_key(private).ok_or_else(|| {
            log::warn!("No generated key pair matches the private key");
            ResponseCode::InvalidParameter
        })?,
        (None, None) => return Err(ResponseCode::InvalidParameter.into()),
    };
    ctx.put(&public)
}
