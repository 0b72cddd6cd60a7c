//! # Hashing and Tree Error Types
//!
//! Structured errors for the Poseidon sponge and the Ginger Merkle tree.
//! Each maps onto one flat [`ErrorCode`] through [`CodedError`].

use cctp_core::{CodedError, ErrorCode};
use thiserror::Error;

/// Errors from the Poseidon digest.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    /// A constant-length digest was declared with zero inputs.
    #[error("constant-length Poseidon digest requires a nonzero arity")]
    ZeroArity,

    /// A constant-length digest was finalized with the wrong input count.
    #[error("Poseidon digest declared for {expected} inputs, absorbed {absorbed}")]
    ArityMismatch {
        /// Declared arity.
        expected: usize,
        /// Inputs absorbed so far.
        absorbed: usize,
    },

    /// A mod-rate digest was finalized on a count that is zero or not a
    /// multiple of the rate.
    #[error("mod-rate Poseidon digest absorbed {absorbed} inputs, need a nonzero multiple of {rate}")]
    NotModRate {
        /// Inputs absorbed so far.
        absorbed: usize,
        /// Sponge rate.
        rate: usize,
    },
}

impl CodedError for HashError {
    fn code(&self) -> ErrorCode {
        ErrorCode::HashingError
    }
}

/// Errors from the Ginger Merkle tree and its paths.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MerkleTreeError {
    /// The requested dimensions cannot describe a tree.
    #[error("invalid tree dimensions: height {height}, capacity {capacity}")]
    InvalidDimensions {
        /// Requested height.
        height: usize,
        /// Requested leaf capacity.
        capacity: usize,
    },

    /// All leaf slots are taken.
    #[error("tree is full ({capacity} leaves)")]
    CapacityExceeded {
        /// Leaf capacity of the tree.
        capacity: usize,
    },

    /// The tree no longer accepts leaves.
    #[error("tree is finalized; reset it before appending")]
    AlreadyFinalized,

    /// Paths exist only on finalized trees.
    #[error("tree is not finalized")]
    NotFinalized,

    /// The root exists only on finalized trees.
    #[error("cannot build root: tree is not finalized")]
    RootNotBuilt,

    /// No leaf was appended at this index.
    #[error("leaf index {index} out of range ({leaves} leaves appended)")]
    LeafIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of appended leaves.
        leaves: usize,
    },

    /// The path does not describe a tree of the claimed height.
    #[error("path length {actual} does not match tree height {expected}")]
    PathLength {
        /// Claimed tree height.
        expected: usize,
        /// Number of path nodes.
        actual: usize,
    },
}

impl CodedError for MerkleTreeError {
    fn code(&self) -> ErrorCode {
        match self {
            Self::RootNotBuilt => ErrorCode::MerkleRootBuildError,
            _ => ErrorCode::MerkleTreeError,
        }
    }
}
