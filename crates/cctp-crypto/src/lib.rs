//! # cctp-crypto — Field-Native Hashing
//!
//! Provides the hashing building blocks of the library, all operating
//! directly on [`cctp_core::FieldElement`]:
//!
//! - **Poseidon** sponge digest in constant-length, mod-rate and padded
//!   variable-length modes.
//! - **Ginger Merkle tree**: fixed-height append-only accumulator with
//!   domain-separated padding and inclusion paths.
//!
//! ## Crate Policy
//!
//! - Depends only on `cctp-core` internally.
//! - Finalization is a query on digests and a pure builder on trees; no
//!   operation silently truncates or reduces its input.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod merkle;
pub mod poseidon;

pub use error::{HashError, MerkleTreeError};
pub use merkle::{
    empty_subtree_root, padding_leaf, GingerMerkleTree, MerklePath, MAX_MERKLE_HEIGHT,
};
pub use poseidon::{
    domain_constant, hash_constant_length, hash_two, DigestMode, PoseidonDigest, POSEIDON_RATE,
    POSEIDON_WIDTH,
};
