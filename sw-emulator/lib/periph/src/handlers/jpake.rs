/*++

Licensed under the Apache-2.0 license.

File Name:

    jpake.rs

Abstract:

    File contains the EC-JPAKE round and session key commands.

--*/

use super::Context;
use crate::key::{KeyMetadata, KeyType};
use crate::{CommandError, ResponseCode};
use se_emu_bus::Bus;
use se_emu_crypto::{EcJpake, EccPoint, EccScalar, SchnorrProof};

impl<'a, B: Bus> Context<'a, B> {
    fn take_point(&mut self) -> Result<EccPoint, CommandError> {
        self.take_array()
    }

    fn take_scalar(&mut self) -> Result<EccScalar, CommandError> {
        self.take_array()
    }

    fn take_proof(&mut self) -> Result<SchnorrProof, CommandError> {
        Ok(SchnorrProof {
            v: self.take_point()?,
            r: self.take_scalar()?,
        })
    }

    fn put_proof(&mut self, proof: &SchnorrProof) -> Result<(), CommandError> {
        self.put(&proof.v)?;
        self.put(&proof.r)
    }
}

pub(super) fn round1_generate<B: Bus>(ctx: &mut Context<'_, B>) -> Result<(), CommandError> {
    let [user_id_len] = ctx.command.params::<1>()?;
    let user_id = ctx.take(user_id_len as usize)?;
    let round1 = EcJpake::round1_generate(ctx.state.rng(), &user_id)?;
    ctx.put(&round1.x2)?;
    ctx.put(&round1.x1_public)?;
    ctx.put_proof(&round1.x1_proof)?;
    ctx.put(&round1.x2_public)?;
    ctx.put_proof(&round1.x2_proof)
}

pub(super) fn round1_verify<B: Bus>(ctx: &mut Context<'_, B>) -> Result<(), CommandError> {
    let [peer_id_len] = ctx.command.params::<1>()?;
    let peer_id = ctx.take(peer_id_len as usize)?;
    let x3 = ctx.take_point()?;
    let x3_proof = ctx.take_proof()?;
    let x4 = ctx.take_point()?;
    let x4_proof = ctx.take_proof()?;
    Ok(EcJpake::round1_verify(
        &peer_id, &x3, &x3_proof, &x4, &x4_proof,
    )?)
}

pub(super) fn round2_generate<B: Bus>(ctx: &mut Context<'_, B>) -> Result<(), CommandError> {
    let [user_id_len, password_len] = ctx.command.params::<2>()?;
    let user_id = ctx.take(user_id_len as usize)?;
    let password = ctx.take(password_len as usize)?;
    let x2 = ctx.take_scalar()?;
    let x1 = ctx.take_point()?;
    let x3 = ctx.take_point()?;
    let x4 = ctx.take_point()?;
    let round2 =
        EcJpake::round2_generate(ctx.state.rng(), &user_id, &password, &x2, &x1, &x3, &x4)?;
    ctx.put(&round2.a)?;
    ctx.put_proof(&round2.proof)
}

pub(super) fn round2_verify<B: Bus>(ctx: &mut Context<'_, B>) -> Result<(), CommandError> {
    let [peer_id_len] = ctx.command.params::<1>()?;
    let peer_id = ctx.take(peer_id_len as usize)?;
    let x1 = ctx.take_point()?;
    let x2 = ctx.take_point()?;
    let x3 = ctx.take_point()?;
    let b = ctx.take_point()?;
    let proof = ctx.take_proof()?;
    Ok(EcJpake::round2_verify(&peer_id, &x1, &x2, &x3, &b, &proof)?)
}

/// Derive the session key and deliver it through the requested key mode.
pub(super) fn gen_session_key<B: Bus>(ctx: &mut Context<'_, B>) -> Result<(), CommandError> {
    let [key_meta, password_len] = ctx.command.params::<2>()?;
    let meta = KeyMetadata::from(key_meta);
    if meta.key_type()? != KeyType::Raw || meta.raw_size() != 32 {
        log::warn!("Session keys are 32 byte raw keys");
        return Err(ResponseCode::InvalidParameter.into());
    }
    ctx.skip_auth()?;
    let password = ctx.take(password_len as usize)?;
    let x2 = ctx.take_scalar()?;
    let x4 = ctx.take_point()?;
    let b = ctx.take_point()?;
    let key = EcJpake::session_key(&password, &x2, &x4, &b)?;
    ctx.store_key(meta, &key[..])
}
