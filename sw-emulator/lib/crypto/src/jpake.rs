/*++

Licensed under the Apache-2.0 license.

File Name:

    jpake.rs

Abstract:

    File contains the EC-JPAKE password authenticated key exchange over P-256
    with SHA-256, including the Schnorr zero-knowledge proofs it relies on.

--*/

use crate::ecc::{
    decode_nonzero_scalar, decode_point, decode_scalar, encode_point, encode_scalar,
    random_scalar,
};
use crate::{CryptoError, EccPoint, EccScalar};
use p256::elliptic_curve::bigint::U256;
use p256::elliptic_curve::ff::Field;
use p256::elliptic_curve::ops::Reduce;
use p256::{FieldBytes, ProjectivePoint, Scalar};
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

const ROUND1_X1_TAG: &[u8] = b"JPAKE-X1";
const ROUND1_X2_TAG: &[u8] = b"JPAKE-X2";
const ROUND2_TAG: &[u8] = b"JPAKE-Round2";

/// Schnorr proof of knowledge of a discrete logarithm
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SchnorrProof {
    /// Commitment `v * base`
    pub v: EccPoint,

    /// Response `v - c * secret mod n`
    pub r: EccScalar,
}

/// Everything Round 1 hands back to the host
#[derive(Debug, Clone)]
pub struct Round1Output {
    /// Second ephemeral secret, returned in the clear
    pub x2: EccScalar,
    pub x1_public: EccPoint,
    pub x1_proof: SchnorrProof,
    pub x2_public: EccPoint,
    pub x2_proof: SchnorrProof,
}

#[derive(Debug, Clone)]
pub struct Round2Output {
    pub a: EccPoint,
    pub proof: SchnorrProof,
}

fn hash_to_scalar(digest: &[u8]) -> Scalar {
    <Scalar as Reduce<U256>>::reduce_bytes(FieldBytes::from_slice(digest))
}

/// Password scalar `SHA-256(password) mod n`, never zero.
fn password_scalar(password: &[u8]) -> Scalar {
    let s = hash_to_scalar(&Sha256::digest(password));
    if bool::from(s.is_zero()) {
        Scalar::ONE
    } else {
        s
    }
}

fn challenge(
    base: &ProjectivePoint,
    commitment: &ProjectivePoint,
    public: &ProjectivePoint,
    user_id: &[u8],
    tag: &[u8],
) -> Result<Scalar, CryptoError> {
    let mut hasher = Sha256::new();
    hasher.update(encode_point(base)?);
    hasher.update(encode_point(commitment)?);
    hasher.update(encode_point(public)?);
    hasher.update(user_id);
    hasher.update(tag);
    Ok(hash_to_scalar(&hasher.finalize()))
}

fn schnorr_prove(
    rng: &mut impl RngCore,
    base: &ProjectivePoint,
    secret: &Scalar,
    public: &ProjectivePoint,
    user_id: &[u8],
    tag: &[u8],
) -> Result<SchnorrProof, CryptoError> {
    let v = random_scalar(rng, 2);
    let commitment = base * &v;
    let c = challenge(base, &commitment, public, user_id, tag)?;
    Ok(SchnorrProof {
        v: encode_point(&commitment)?,
        r: encode_scalar(&(v - c * secret)),
    })
}

fn schnorr_verify(
    base: &ProjectivePoint,
    public: &ProjectivePoint,
    proof: &SchnorrProof,
    user_id: &[u8],
    tag: &[u8],
) -> Result<(), CryptoError> {
    let commitment = decode_point(&proof.v)?;
    let r = decode_scalar(&proof.r)?;
    let c = challenge(base, &commitment, public, user_id, tag)?;
    if commitment != base * &r + public * &c {
        return Err(CryptoError::ProofVerificationFailed);
    }
    Ok(())
}

pub enum EcJpake {}

impl EcJpake {
    /// Round 1: draw `x1, x2`, publish `X1 = x1*G`, `X2 = x2*G` with proofs
    /// bound to `user_id`.
    pub fn round1_generate(
        rng: &mut impl RngCore,
        user_id: &[u8],
    ) -> Result<Round1Output, CryptoError> {
        let g = ProjectivePoint::GENERATOR;
        let x1 = random_scalar(rng, 2);
        let x2 = random_scalar(rng, 2);
        let x1_public = g * &x1;
        let x2_public = g * &x2;
        Ok(Round1Output {
            x2: encode_scalar(&x2),
            x1_public: encode_point(&x1_public)?,
            x1_proof: schnorr_prove(rng, &g, &x1, &x1_public, user_id, ROUND1_X1_TAG)?,
            x2_public: encode_point(&x2_public)?,
            x2_proof: schnorr_prove(rng, &g, &x2, &x2_public, user_id, ROUND1_X2_TAG)?,
        })
    }

    /// Round 1: check the peer's `X3, X4` and their proofs.
    pub fn round1_verify(
        peer_id: &[u8],
        x3: &EccPoint,
        x3_proof: &SchnorrProof,
        x4: &EccPoint,
        x4_proof: &SchnorrProof,
    ) -> Result<(), CryptoError> {
        let x3_point = decode_point(x3)?;
        let x4_point = decode_point(x4)?;
        if x3_point == x4_point {
            return Err(CryptoError::IdenticalPoints);
        }
        let g = ProjectivePoint::GENERATOR;
        schnorr_verify(&g, &x3_point, x3_proof, peer_id, ROUND1_X1_TAG)?;
        schnorr_verify(&g, &x4_point, x4_proof, peer_id, ROUND1_X2_TAG)
    }

    /// Round 2: publish `A = (x2*s) * (X1 + X3 + X4)` with a proof of `x2*s`.
    pub fn round2_generate(
        rng: &mut impl RngCore,
        user_id: &[u8],
        password: &[u8],
        x2: &EccScalar,
        x1: &EccPoint,
        x3: &EccPoint,
        x4: &EccPoint,
    ) -> Result<Round2Output, CryptoError> {
        let x2 = decode_nonzero_scalar(x2)?;
        let base = decode_point(x1)? + decode_point(x3)? + decode_point(x4)?;
        let k = x2 * password_scalar(password);
        let a = base * &k;
        Ok(Round2Output {
            a: encode_point(&a)?,
            proof: schnorr_prove(rng, &base, &k, &a, user_id, ROUND2_TAG)?,
        })
    }

    /// Round 2: check the peer's combined point `B` against the base
    /// `X1 + X2 + X3` the peer must have used.
    pub fn round2_verify(
        peer_id: &[u8],
        x1: &EccPoint,
        x2: &EccPoint,
        x3: &EccPoint,
        b: &EccPoint,
        proof: &SchnorrProof,
    ) -> Result<(), CryptoError> {
        let base = decode_point(x1)? + decode_point(x2)? + decode_point(x3)?;
        schnorr_verify(&base, &decode_point(b)?, proof, peer_id, ROUND2_TAG)
    }

    /// Session key `SHA-256(X(x2 * (B - (x2*s) * X4)))`.
    pub fn session_key(
        password: &[u8],
        x2: &EccScalar,
        x4: &EccPoint,
        b: &EccPoint,
    ) -> Result<Zeroizing<[u8; 32]>, CryptoError> {
        let x2 = decode_nonzero_scalar(x2)?;
        let k = x2 * password_scalar(password);
        let shared = (decode_point(b)? - decode_point(x4)? * &k) * &x2;
        let encoded = Zeroizing::new(encode_point(&shared)?);
        Ok(Zeroizing::new(Sha256::digest(&encoded[..32]).into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    struct Party {
        id: &'static [u8],
        round1: Round1Output,
    }

    fn exchange(password_a: &[u8], password_b: &[u8]) -> (EccScalar, EccScalar) {
        let mut rng = StdRng::seed_from_u64(0x4a50414b45);
        let alice = Party {
            id: b"client",
            round1: EcJpake::round1_generate(&mut rng, b"client").unwrap(),
        };
        let bob = Party {
            id: b"server",
            round1: EcJpake::round1_generate(&mut rng, b"server").unwrap(),
        };

        for peer in [&alice, &bob] {
            EcJpake::round1_verify(
                peer.id,
                &peer.round1.x1_public,
                &peer.round1.x1_proof,
                &peer.round1.x2_public,
                &peer.round1.x2_proof,
            )
            .unwrap();
        }

        let round2 = |rng: &mut StdRng, me: &Party, peer: &Party, password: &[u8]| {
            EcJpake::round2_generate(
                rng,
                me.id,
                password,
                &me.round1.x2,
                &me.round1.x1_public,
                &peer.round1.x1_public,
                &peer.round1.x2_public,
            )
            .unwrap()
        };
        let alice2 = round2(&mut rng, &alice, &bob, password_a);
        let bob2 = round2(&mut rng, &bob, &alice, password_b);

        EcJpake::round2_verify(
            bob.id,
            &alice.round1.x1_public,
            &alice.round1.x2_public,
            &bob.round1.x1_public,
            &bob2.a,
            &bob2.proof,
        )
        .unwrap();

        let key_a = EcJpake::session_key(
            password_a,
            &alice.round1.x2,
            &bob.round1.x2_public,
            &bob2.a,
        )
        .unwrap();
        let key_b = EcJpake::session_key(
            password_b,
            &bob.round1.x2,
            &alice.round1.x2_public,
            &alice2.a,
        )
        .unwrap();
        (*key_a, *key_b)
    }

    #[test]
    fn test_same_password_agrees() {
        let (a, b) = exchange(b"threadjpaketest", b"threadjpaketest");
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_password_disagrees() {
        let (a, b) = exchange(b"threadjpaketest", b"threadjpaketesu");
        assert_ne!(a, b);
    }

    #[test]
    fn test_tampered_proof_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let peer = EcJpake::round1_generate(&mut rng, b"server").unwrap();

        let mut proof = peer.x1_proof;
        proof.r[31] ^= 1;
        assert_eq!(
            EcJpake::round1_verify(
                b"server",
                &peer.x1_public,
                &proof,
                &peer.x2_public,
                &peer.x2_proof
            ),
            Err(CryptoError::ProofVerificationFailed)
        );

        // proofs are bound to the prover's identity
        assert_eq!(
            EcJpake::round1_verify(
                b"client",
                &peer.x1_public,
                &peer.x1_proof,
                &peer.x2_public,
                &peer.x2_proof
            ),
            Err(CryptoError::ProofVerificationFailed)
        );
    }

    #[test]
    fn test_identical_points_rejected() {
        let mut rng = StdRng::seed_from_u64(2);
        let peer = EcJpake::round1_generate(&mut rng, b"server").unwrap();
        assert_eq!(
            EcJpake::round1_verify(
                b"server",
                &peer.x1_public,
                &peer.x1_proof,
                &peer.x1_public,
                &peer.x1_proof
            ),
            Err(CryptoError::IdenticalPoints)
        );
    }
}
