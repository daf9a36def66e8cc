/*++

Licensed under the Apache-2.0 license.

File Name:

    ecc.rs

Abstract:

    File contains implementation of Elliptic Curve Cryptography over NIST P-256:
    key generation, Diffie-Hellman and ECDSA with SHA-256.

--*/

use crate::CryptoError;
use p256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::elliptic_curve::ff::{Field, PrimeField};
use p256::elliptic_curve::group::Group;
use p256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use p256::{AffinePoint, EncodedPoint, FieldBytes, ProjectivePoint, Scalar};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// P-256 coordinate and scalar size in bytes
pub const ECC_COORD_SIZE: usize = 32;

/// P-256 scalar, big-endian
pub type EccScalar = [u8; ECC_COORD_SIZE];

/// Affine P-256 point encoded as `X || Y`, big-endian
pub type EccPoint = [u8; 2 * ECC_COORD_SIZE];

/// ECDSA Signature
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct EccSignature {
    /// Random point
    pub r: EccScalar,

    /// Proof
    pub s: EccScalar,
}

impl EccSignature {
    /// Encode as `r || s`
    pub fn to_bytes(&self) -> [u8; 2 * ECC_COORD_SIZE] {
        let mut bytes = [0u8; 2 * ECC_COORD_SIZE];
        bytes[..ECC_COORD_SIZE].copy_from_slice(&self.r);
        bytes[ECC_COORD_SIZE..].copy_from_slice(&self.s);
        bytes
    }

    /// Decode from `r || s`
    pub fn from_bytes(bytes: &[u8; 2 * ECC_COORD_SIZE]) -> Self {
        let mut sig = Self {
            r: [0u8; ECC_COORD_SIZE],
            s: [0u8; ECC_COORD_SIZE],
        };
        sig.r.copy_from_slice(&bytes[..ECC_COORD_SIZE]);
        sig.s.copy_from_slice(&bytes[ECC_COORD_SIZE..]);
        sig
    }
}

impl From<Signature> for EccSignature {
    /// Converts to this type from the input type.
    fn from(ecc_sig: Signature) -> Self {
        let (r, s) = ecc_sig.split_bytes();
        Self {
            r: r.into(),
            s: s.into(),
        }
    }
}

pub enum P256 {}

impl P256 {
    /// Draw a private key uniformly from `[1, n-1]`.
    pub fn generate_private_key(rng: &mut impl RngCore) -> EccScalar {
        encode_scalar(&random_scalar(rng, 1))
    }

    /// Public key `priv * G` of a private key.
    pub fn public_key(priv_key: &EccScalar) -> Result<EccPoint, CryptoError> {
        let scalar = decode_nonzero_scalar(priv_key)?;
        encode_point(&(ProjectivePoint::GENERATOR * scalar))
    }

    /// Shared point `priv * peer` of an ECDH exchange.
    pub fn diffie_hellman(
        priv_key: &EccScalar,
        peer_pub_key: &EccPoint,
    ) -> Result<EccPoint, CryptoError> {
        let scalar = decode_nonzero_scalar(priv_key)?;
        let peer = decode_point(peer_pub_key)?;
        encode_point(&(peer * scalar))
    }

    /// ECDSA signature over the SHA-256 digest of `message`.
    pub fn sign(priv_key: &EccScalar, message: &[u8]) -> Result<EccSignature, CryptoError> {
        let signing_key = SigningKey::from_bytes(&FieldBytes::clone_from_slice(priv_key))
            .map_err(|_| CryptoError::InvalidScalar)?;
        let digest = Sha256::digest(message);
        let ecc_sig: Signature = signing_key
            .sign_prehash(&digest)
            .map_err(|_| CryptoError::InvalidScalar)?;
        Ok(ecc_sig.into())
    }

    /// Verify an ECDSA signature over the SHA-256 digest of `message`.
    pub fn verify(
        pub_key: &EccPoint,
        message: &[u8],
        signature: &EccSignature,
    ) -> Result<(), CryptoError> {
        let verifying_key = VerifyingKey::from_encoded_point(&encoded_point(pub_key))
            .map_err(|_| CryptoError::InvalidPoint)?;
        let ecc_sig = Signature::from_scalars(
            FieldBytes::clone_from_slice(&signature.r),
            FieldBytes::clone_from_slice(&signature.s),
        )
        .map_err(|_| CryptoError::InvalidSignature)?;
        verifying_key
            .verify_prehash(&Sha256::digest(message), &ecc_sig)
            .map_err(|_| CryptoError::InvalidSignature)
    }
}

fn encoded_point(point: &EccPoint) -> EncodedPoint {
    EncodedPoint::from_affine_coordinates(
        FieldBytes::from_slice(&point[..ECC_COORD_SIZE]),
        FieldBytes::from_slice(&point[ECC_COORD_SIZE..]),
        false,
    )
}

/// Decode an `X || Y` point, rejecting points off the curve.
pub(crate) fn decode_point(point: &EccPoint) -> Result<ProjectivePoint, CryptoError> {
    Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded_point(point)))
        .map(ProjectivePoint::from)
        .ok_or(CryptoError::InvalidPoint)
}

/// Encode a point as `X || Y`. The identity has no affine encoding.
pub(crate) fn encode_point(point: &ProjectivePoint) -> Result<EccPoint, CryptoError> {
    if bool::from(point.is_identity()) {
        return Err(CryptoError::PointAtInfinity);
    }
    let encoded = point.to_affine().to_encoded_point(false);
    let (x, y) = match (encoded.x(), encoded.y()) {
        (Some(x), Some(y)) => (x, y),
        _ => return Err(CryptoError::PointAtInfinity),
    };
    let mut bytes = [0u8; 2 * ECC_COORD_SIZE];
    bytes[..ECC_COORD_SIZE].copy_from_slice(x);
    bytes[ECC_COORD_SIZE..].copy_from_slice(y);
    Ok(bytes)
}

/// Decode a big-endian scalar that must already be reduced modulo `n`.
pub(crate) fn decode_scalar(scalar: &EccScalar) -> Result<Scalar, CryptoError> {
    Option::<Scalar>::from(Scalar::from_repr(FieldBytes::clone_from_slice(scalar)))
        .ok_or(CryptoError::InvalidScalar)
}

pub(crate) fn decode_nonzero_scalar(scalar: &EccScalar) -> Result<Scalar, CryptoError> {
    let scalar = decode_scalar(scalar)?;
    if bool::from(scalar.is_zero()) {
        return Err(CryptoError::InvalidScalar);
    }
    Ok(scalar)
}

pub(crate) fn encode_scalar(scalar: &Scalar) -> EccScalar {
    scalar.to_repr().into()
}

/// Draw a scalar uniformly from `[min, n-1]`.
pub(crate) fn random_scalar(rng: &mut impl RngCore, min: u64) -> Scalar {
    loop {
        let candidate = Scalar::random(&mut *rng);
        if (0..min).all(|low| candidate != Scalar::from(low)) {
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    const GENERATOR: &str = "6b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296\
                             4fe342e2fe1a7f9b8ee7eb4a7c0f9e162bce33576b315ececbb6406837bf51f5";

    #[test]
    fn test_public_key_of_one_is_generator() {
        let mut one = [0u8; ECC_COORD_SIZE];
        one[31] = 1;
        assert_eq!(hex::encode(P256::public_key(&one).unwrap()), GENERATOR);
        assert_eq!(
            P256::public_key(&[0u8; ECC_COORD_SIZE]),
            Err(CryptoError::InvalidScalar)
        );
        assert_eq!(
            P256::public_key(&[0xffu8; ECC_COORD_SIZE]),
            Err(CryptoError::InvalidScalar)
        );
    }

    #[test]
    fn test_diffie_hellman_agreement() {
        let mut rng = StdRng::seed_from_u64(7);
        let a = P256::generate_private_key(&mut rng);
        let b = P256::generate_private_key(&mut rng);
        let shared_a = P256::diffie_hellman(&a, &P256::public_key(&b).unwrap()).unwrap();
        let shared_b = P256::diffie_hellman(&b, &P256::public_key(&a).unwrap()).unwrap();
        assert_eq!(shared_a, shared_b);
    }

    #[test]
    fn test_rejects_point_off_curve() {
        let mut rng = StdRng::seed_from_u64(8);
        let a = P256::generate_private_key(&mut rng);
        let mut peer = P256::public_key(&a).unwrap();
        peer[63] ^= 1;
        assert_eq!(
            P256::diffie_hellman(&a, &peer),
            Err(CryptoError::InvalidPoint)
        );
    }

    #[test]
    fn test_sign_verify() {
        let mut rng = StdRng::seed_from_u64(9);
        let priv_key = P256::generate_private_key(&mut rng);
        let pub_key = P256::public_key(&priv_key).unwrap();
        let signature = P256::sign(&priv_key, b"firmware image").unwrap();
        assert_eq!(
            EccSignature::from_bytes(&signature.to_bytes()),
            signature
        );
        P256::verify(&pub_key, b"firmware image", &signature).unwrap();
        assert_eq!(
            P256::verify(&pub_key, b"firmware imagf", &signature),
            Err(CryptoError::InvalidSignature)
        );
    }
}
