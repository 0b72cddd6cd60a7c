//! # Proof Layer Error Types
//!
//! One error enum for parameter bootstrap, artifact parsing, public-input
//! assembly, proving and verification. A verifier that runs to completion
//! and rejects a proof returns `Ok(false)`; everything here is an
//! operation that could not be performed.

use std::path::PathBuf;

use cctp_core::{CodedError, ErrorCode, FieldError};
use cctp_crypto::{HashError, MerkleTreeError};
use thiserror::Error;

use crate::circuit::CircuitType;
use crate::system::ProvingSystem;

/// Errors from the proof layer.
#[derive(Error, Debug)]
pub enum ZkpError {
    /// A field element failed to encode or decode.
    #[error("field element error: {0}")]
    Field(#[from] FieldError),

    /// A Poseidon precondition was violated.
    #[error("hashing error: {0}")]
    Hash(#[from] HashError),

    /// A Merkle tree precondition was violated.
    #[error("merkle tree error: {0}")]
    Merkle(#[from] MerkleTreeError),

    /// The segment size is not a supported power of two.
    #[error("unsupported max segment size {size}: must be a power of two in [{min}, {max}]")]
    InvalidSegmentSize {
        /// Requested size.
        size: usize,
        /// Smallest supported size.
        min: usize,
        /// Largest supported size.
        max: usize,
    },

    /// Dlog keys were already bootstrapped with a different size.
    #[error("{system} dlog keys already initialized for segment size {initialized}, requested {requested}")]
    SegmentSizeMismatch {
        /// Proving system concerned.
        system: ProvingSystem,
        /// Size held by the store.
        initialized: usize,
        /// Size requested now.
        requested: usize,
    },

    /// Dlog keys for the proving system were never bootstrapped.
    #[error("{0} dlog keys are not initialized")]
    UninitializedParameters(ProvingSystem),

    /// An artifact was built against dlog keys of another size.
    #[error("artifact expects 2^{artifact_k} dlog keys, store holds 2^{store_k}")]
    ParamsMismatch {
        /// Size exponent recorded in the artifact.
        artifact_k: u32,
        /// Size exponent of the store's keys.
        store_k: u32,
    },

    /// A byte buffer ended early or carried extra bytes.
    #[error("invalid {what} buffer length: {detail}")]
    InvalidBufferLength {
        /// Which structure was being read.
        what: &'static str,
        /// What went wrong.
        detail: String,
    },

    /// A byte buffer holds a value that cannot be decoded.
    #[error("invalid {what}: {detail}")]
    InvalidValue {
        /// Which structure was being read.
        what: &'static str,
        /// What went wrong.
        detail: String,
    },

    /// A public-input list has the wrong number of elements.
    #[error("{what}: expected {expected} elements, got {actual}")]
    InvalidListLength {
        /// Which list.
        what: &'static str,
        /// Required count.
        expected: usize,
        /// Supplied count.
        actual: usize,
    },

    /// Key and proof belong to different proving systems.
    #[error("proving system mismatch: key is {key}, proof is {proof}")]
    SystemMismatch {
        /// System of the key.
        key: ProvingSystem,
        /// System of the proof.
        proof: ProvingSystem,
    },

    /// Key or proof was made for another circuit type.
    #[error("circuit mismatch: expected {expected}, got {actual}")]
    CircuitMismatch {
        /// Circuit required by the call.
        expected: CircuitType,
        /// Circuit of the artifact.
        actual: CircuitType,
    },

    /// The backend verifier could not run.
    #[error("proof verification failure: {0}")]
    Verification(String),

    /// The test prover could not produce keys or a proof.
    #[error("test proof creation failure: {0}")]
    ProofCreation(String),

    /// The batch verifier was misused.
    #[error("batch verifier failure: {0}")]
    Batch(String),

    /// File access failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File concerned.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl ZkpError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_value(what: &'static str, detail: impl Into<String>) -> Self {
        Self::InvalidValue {
            what,
            detail: detail.into(),
        }
    }

    pub(crate) fn invalid_length(what: &'static str, detail: impl Into<String>) -> Self {
        Self::InvalidBufferLength {
            what,
            detail: detail.into(),
        }
    }
}

impl CodedError for ZkpError {
    fn code(&self) -> ErrorCode {
        match self {
            Self::Field(e) => e.code(),
            Self::Hash(e) => e.code(),
            Self::Merkle(e) => e.code(),
            Self::InvalidSegmentSize { .. }
            | Self::SegmentSizeMismatch { .. }
            | Self::ParamsMismatch { .. }
            | Self::InvalidValue { .. }
            | Self::SystemMismatch { .. }
            | Self::CircuitMismatch { .. } => ErrorCode::InvalidValue,
            Self::UninitializedParameters(_) => ErrorCode::UninitializedParameters,
            Self::InvalidBufferLength { .. } => ErrorCode::InvalidBufferLength,
            Self::InvalidListLength { .. } => ErrorCode::InvalidListLength,
            Self::Verification(_) => ErrorCode::ProofVerificationFailure,
            Self::ProofCreation(_) => ErrorCode::TestProofCreationFailure,
            Self::Batch(_) => ErrorCode::BatchVerifierFailure,
            Self::Io { .. } => ErrorCode::IoError,
        }
    }
}
