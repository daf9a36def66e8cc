/*++

Licensed under the Apache-2.0 license.

File Name:

    error.rs

Abstract:

    File contains the error type returned by the crypto primitives.

--*/

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CryptoError {
    /// AES key is not 16, 24 or 32 bytes, or an ECC key is not 32 bytes
    InvalidKeyLength,

    /// Data length does not satisfy the mode's block rules
    InvalidLength,

    /// AEAD tag length outside the accepted set
    InvalidTagLength,

    /// Nonce or IV has the wrong size
    InvalidNonceLength,

    /// Encoded point is not on the curve
    InvalidPoint,

    /// Scalar is zero or not reduced modulo the group order
    InvalidScalar,

    /// A computation produced the point at infinity
    PointAtInfinity,

    /// AEAD tag mismatch
    AuthenticationFailed,

    /// Schnorr zero-knowledge proof did not verify
    ProofVerificationFailed,

    /// Two points that must differ are equal
    IdenticalPoints,

    /// ECDSA signature is malformed or does not verify
    InvalidSignature,
}

impl std::fmt::Display for CryptoError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let msg = match self {
            CryptoError::InvalidKeyLength => "invalid key length",
            CryptoError::InvalidLength => "invalid data length",
            CryptoError::InvalidTagLength => "invalid tag length",
            CryptoError::InvalidNonceLength => "invalid nonce length",
            CryptoError::InvalidPoint => "invalid curve point",
            CryptoError::InvalidScalar => "invalid scalar",
            CryptoError::PointAtInfinity => "point at infinity",
            CryptoError::AuthenticationFailed => "authentication failed",
            CryptoError::ProofVerificationFailed => "zero-knowledge proof verification failed",
            CryptoError::IdenticalPoints => "identical points",
            CryptoError::InvalidSignature => "invalid signature",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for CryptoError {}
