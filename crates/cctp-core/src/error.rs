//! # Error Types — Flat Error-Code Taxonomy
//!
//! Every fallible operation in the library reports through a `Result`.
//! Callers that need the flat result code of the C-style boundary (an
//! out-parameter distinct from the return value) obtain it through
//! [`CodedError::code`]. A negative verification answer is `Ok(false)`
//! and never surfaces here.

use thiserror::Error;

/// Flat result code attached to every library error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Operation completed.
    Ok,
    /// Encoded data is malformed or out of range.
    InvalidValue,
    /// A buffer has the wrong length for the value it should hold.
    InvalidBufferLength,
    /// A list has the wrong number of elements.
    InvalidListLength,
    /// A value could not be written to its byte encoding.
    SerializationError,
    /// A Poseidon arity or rate precondition was violated.
    HashingError,
    /// Merkle tree capacity, index or finalization precondition violated.
    MerkleTreeError,
    /// Merkle root requested before finalization.
    MerkleRootBuildError,
    /// The verifier could not run on the supplied proof.
    ProofVerificationFailure,
    /// The batch verifier was misused.
    BatchVerifierFailure,
    /// Dlog keys for the proving system were never bootstrapped.
    UninitializedParameters,
    /// The test prover could not produce a proof.
    TestProofCreationFailure,
    /// File access failed.
    IoError,
    /// Any other failure.
    GenericError,
}

impl ErrorCode {
    /// Stable name of the code, as used in log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::InvalidValue => "InvalidValue",
            Self::InvalidBufferLength => "InvalidBufferLength",
            Self::InvalidListLength => "InvalidListLength",
            Self::SerializationError => "SerializationError",
            Self::HashingError => "HashingError",
            Self::MerkleTreeError => "MerkleTreeError",
            Self::MerkleRootBuildError => "MerkleRootBuildError",
            Self::ProofVerificationFailure => "ProofVerificationFailure",
            Self::BatchVerifierFailure => "BatchVerifierFailure",
            Self::UninitializedParameters => "UninitializedParameters",
            Self::TestProofCreationFailure => "TestProofCreationFailure",
            Self::IoError => "IoError",
            Self::GenericError => "GenericError",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error that maps onto one [`ErrorCode`].
pub trait CodedError: std::error::Error {
    /// The flat code reported for this error.
    fn code(&self) -> ErrorCode;
}

/// Returns the code of a result: [`ErrorCode::Ok`] on success.
pub fn result_code<T, E: CodedError>(result: &Result<T, E>) -> ErrorCode {
    match result {
        Ok(_) => ErrorCode::Ok,
        Err(e) => e.code(),
    }
}

/// Errors from field element encoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// The encoded integer is not below the field modulus.
    #[error("encoded value is not a canonical field element (value >= modulus)")]
    NonCanonical,

    /// The input buffer does not hold exactly one encoded element.
    #[error("invalid field element buffer length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Required length.
        expected: usize,
        /// Supplied length.
        actual: usize,
    },

    /// The output buffer cannot hold the encoding.
    #[error("cannot serialize field element into a {actual}-byte buffer (need {expected})")]
    Serialization {
        /// Required length.
        expected: usize,
        /// Supplied length.
        actual: usize,
    },

    /// Text form is not valid hex.
    #[error("invalid hex encoding: {0}")]
    Hex(String),
}

impl CodedError for FieldError {
    fn code(&self) -> ErrorCode {
        match self {
            Self::NonCanonical | Self::Hex(_) => ErrorCode::InvalidValue,
            Self::InvalidLength { .. } => ErrorCode::InvalidBufferLength,
            Self::Serialization { .. } => ErrorCode::SerializationError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_code_ok() {
        let r: Result<u8, FieldError> = Ok(1);
        assert_eq!(result_code(&r), ErrorCode::Ok);
    }

    #[test]
    fn test_field_error_codes() {
        assert_eq!(FieldError::NonCanonical.code(), ErrorCode::InvalidValue);
        assert_eq!(
            FieldError::InvalidLength { expected: 32, actual: 31 }.code(),
            ErrorCode::InvalidBufferLength
        );
        assert_eq!(
            FieldError::Serialization { expected: 32, actual: 8 }.code(),
            ErrorCode::SerializationError
        );
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::Ok.to_string(), "OK");
        assert_eq!(ErrorCode::MerkleRootBuildError.to_string(), "MerkleRootBuildError");
    }
}
