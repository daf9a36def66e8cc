/*++

Licensed under the Apache-2.0 license.

File Name:

    hash.rs

Abstract:

    File contains the one-shot, streaming and keyed hash commands.

--*/

use super::Context;
use crate::key::KeyMetadata;
use crate::{CommandError, ResponseCode};
use se_emu_bus::Bus;
use se_emu_crypto::{HashAlgorithm, HashStream};

fn algorithm<B: Bus>(ctx: &Context<'_, B>) -> Result<HashAlgorithm, CommandError> {
    Ok(ctx.command.hash_option()?.into())
}

pub(super) fn hash<B: Bus>(ctx: &mut Context<'_, B>) -> Result<(), CommandError> {
    let [data_len] = ctx.command.params::<1>()?;
    let alg = algorithm(ctx)?;
    let data = ctx.take(data_len as usize)?;
    ctx.put(&alg.digest(&data))
}

/// Feed the shared hash stream, creating it on first use.
pub(super) fn hash_update<B: Bus>(ctx: &mut Context<'_, B>) -> Result<(), CommandError> {
    let [data_len] = ctx.command.params::<1>()?;
    let alg = algorithm(ctx)?;
    if let Some(stream) = ctx.state.hash_stream() {
        if stream.algorithm() != alg {
            log::warn!(
                "Hash stream started as {:?}, updated as {:?}",
                stream.algorithm(),
                alg
            );
            return Err(ResponseCode::Abort.into());
        }
    }
    let data = ctx.take(data_len as usize)?;
    ctx.state
        .hash_stream_mut()
        .get_or_insert_with(|| HashStream::new(alg))
        .update(&data);
    Ok(())
}

pub(super) fn hash_finish<B: Bus>(ctx: &mut Context<'_, B>) -> Result<(), CommandError> {
    let [] = ctx.command.params::<0>()?;
    let alg = algorithm(ctx)?;
    let stream = match ctx.state.hash_stream_mut().take() {
        Some(stream) if stream.algorithm() == alg => stream,
        other => {
            log::warn!("No {:?} hash stream to finish", alg);
            *ctx.state.hash_stream_mut() = other;
            return Err(ResponseCode::Abort.into());
        }
    };
    ctx.put(&stream.finish())
}

pub(super) fn hmac<B: Bus>(ctx: &mut Context<'_, B>) -> Result<(), CommandError> {
    let [key_meta, data_len] = ctx.command.params::<2>()?;
    let alg = algorithm(ctx)?;
    ctx.skip_auth()?;
    let key = ctx.read_symmetric_key(KeyMetadata::from(key_meta))?;
    let data = ctx.take(data_len as usize)?;
    ctx.put(&alg.hmac(&key, &data)?)
}
