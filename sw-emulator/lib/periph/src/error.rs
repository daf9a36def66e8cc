/*++

Licensed under the Apache-2.0 license.

File Name:

    error.rs

Abstract:

    File contains the fatal error type of the secure element and the error
    type returned by command handlers.

--*/

use crate::ResponseCode;
use se_emu_bus::BusError;
use se_emu_crypto::CryptoError;

/// Contract violations by the host. These are not reported through the
/// response channel.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SeError {
    /// A descriptor chain ended where more data was required
    NullDescriptor { pointer_of: &'static str },

    /// A descriptor chain did not terminate
    DescriptorChainTooLong,

    /// A command was processed before all announced words arrived
    TransactionIncomplete { words_left: usize },

    /// A command was processed with no transaction pending
    NoTransaction,

    /// A word was enqueued with no transaction being received
    UnexpectedWord,

    /// The header announced a transaction shorter than one word
    EmptyHeader,
}

impl std::fmt::Display for SeError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            SeError::NullDescriptor { pointer_of } => {
                write!(f, "walked past the end of the {pointer_of} descriptor chain")
            }
            SeError::DescriptorChainTooLong => write!(f, "descriptor chain too long"),
            SeError::TransactionIncomplete { words_left } => {
                write!(f, "transaction incomplete, {words_left} words outstanding")
            }
            SeError::NoTransaction => write!(f, "no transaction pending"),
            SeError::UnexpectedWord => write!(f, "word enqueued outside of a transaction"),
            SeError::EmptyHeader => write!(f, "header announces an empty transaction"),
        }
    }
}

impl std::error::Error for SeError {}

/// Outcome of a failed command handler
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CommandError {
    /// Reported to the host through the response channel
    Response(ResponseCode),

    /// Aborts processing, nothing is reported through the response channel
    Fault(SeError),
}

impl From<ResponseCode> for CommandError {
    fn from(code: ResponseCode) -> Self {
        CommandError::Response(code)
    }
}

impl From<SeError> for CommandError {
    fn from(err: SeError) -> Self {
        CommandError::Fault(err)
    }
}

impl From<BusError> for CommandError {
    fn from(_: BusError) -> Self {
        CommandError::Response(ResponseCode::BusError)
    }
}

impl From<CryptoError> for CommandError {
    fn from(err: CryptoError) -> Self {
        CommandError::Response(match err {
            CryptoError::AuthenticationFailed
            | CryptoError::ProofVerificationFailed
            | CryptoError::PointAtInfinity => ResponseCode::CryptoError,
            CryptoError::InvalidSignature => ResponseCode::InvalidSignature,
            CryptoError::InvalidPoint
            | CryptoError::IdenticalPoints
            | CryptoError::InvalidKeyLength
            | CryptoError::InvalidLength
            | CryptoError::InvalidTagLength
            | CryptoError::InvalidNonceLength
            | CryptoError::InvalidScalar => ResponseCode::InvalidParameter,
        })
    }
}
