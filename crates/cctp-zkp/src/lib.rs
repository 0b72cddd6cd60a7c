//! # cctp-zkp — Sidechain Proof Verification
//!
//! Verifies the SNARK proofs that sidechains attach to withdrawal
//! certificates and ceased sidechain withdrawals (CSW).
//!
//! ## Architecture
//!
//! - **Systems** (`system.rs`): the two proving systems, CoboundaryMarlin
//!   and Darlin, and the tag every serialized artifact starts with.
//!
//! - **Params** (`params.rs`): `DlogKeyStore`, the per-system dlog
//!   commitment keys. Bootstrapped once per system from a cache directory
//!   and passed explicitly to every call that needs them.
//!
//! - **Artifacts** (`artifacts.rs`): prover keys, verifier keys and proofs,
//!   with their byte and file encodings.
//!
//! - **Inputs** (`inputs.rs`): certificate and CSW public inputs, the
//!   backward-transfer root, the certificate data hash and sidechain ids.
//!
//! - **Backend** (`backend.rs`): the sealed `ProofBackend` trait and its
//!   two implementations.
//!
//! - **Verifier** (`verifier.rs`): single proof verification and the
//!   `ZendooBatchVerifier`.
//!
//! - **Prover** (`prover.rs`): test keys and test proofs over the
//!   `TestCircuit` in `circuit.rs`.
//!
//! ## Crate Policy
//!
//! - Depends on `cctp-core` and `cctp-crypto` internally.
//! - No process-wide state: dlog keys live in a `DlogKeyStore` value.
//! - A proof that fails to verify is `Ok(false)`; errors are reserved for
//!   calls that could not be evaluated.
//! - No `unsafe`. No `.unwrap()` outside tests.

pub mod artifacts;
pub mod backend;
pub mod circuit;
pub mod error;
pub mod inputs;
pub mod params;
pub mod prover;
pub mod system;
pub mod verifier;

pub use artifacts::{ScProof, ScProverKey, ScVerifierKey};
pub use backend::{CoboundaryMarlin, Darlin, ProofBackend};
pub use circuit::{CircuitType, TestCircuit};
pub use error::ZkpError;
pub use inputs::{
    backward_transfers_root, compute_sc_id, get_cert_data_hash, phantom_cert_data_hash,
    BackwardTransfer, CertificateProofInputs, CswProofInputs, McPublicKeyHash,
    BT_MERKLE_TREE_HEIGHT, MC_PK_SIZE,
};
pub use params::{DlogKeyStore, DlogKeys, ParamsConfig};
pub use prover::{create_cert_test_proof, create_csw_test_proof, generate_test_params};
pub use system::{get_proving_system_type, ProvingSystem};
pub use verifier::{
    verify_certificate_proof, verify_csw_proof, BatchVerificationResult, ZendooBatchVerifier,
};
