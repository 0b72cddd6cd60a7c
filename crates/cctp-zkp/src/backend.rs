//! # Proving-System Backends
//!
//! Both proving systems are PLONK arguments over Vesta with an
//! inner-product commitment scheme, sharing key generation and proving.
//! They differ in how the final dlog opening check is decided:
//!
//! - [`CoboundaryMarlin`] checks each proof's opening on its own.
//! - [`Darlin`] accumulates the openings of every proof in a batch and
//!   decides them with one multi-scalar multiplication.
//!
//! The [`ProofBackend`] trait is sealed; the set of backends is exactly
//! the variants of [`ProvingSystem`] and [`verify`] / [`verify_batch`]
//! dispatch to them with an exhaustive `match`.
//!
//! A proof that does not verify is `Ok(false)` under both backends. That
//! includes a malformed transcript and instances the verifying key cannot
//! take, such as more public inputs than the circuit has usable rows.

use halo2_proofs::plonk::{self, BatchVerifier, SingleVerifier, VerifyingKey};
use halo2_proofs::poly::commitment::Params;
use halo2_proofs::transcript::{Blake2bRead, Challenge255};
use pasta_curves::{vesta, Fp};

use crate::error::ZkpError;
use crate::system::ProvingSystem;

mod private {
    pub trait Sealed {}
}

/// One proof and its public inputs, as handed to a batch.
pub type BatchItem<'a> = (&'a [Fp], &'a [u8]);

/// Verification contract shared by every proving system.
///
/// This trait is sealed and cannot be implemented outside this crate.
pub trait ProofBackend: private::Sealed {
    /// The tag artifacts of this backend carry.
    const SYSTEM: ProvingSystem;

    /// Verify one proof.
    fn verify(
        params: &Params<vesta::Affine>,
        vk: &VerifyingKey<vesta::Affine>,
        instances: &[Fp],
        proof: &[u8],
    ) -> Result<bool, ZkpError>;

    /// Verify proofs sharing one verifying key; `true` only if all hold.
    fn verify_batch(
        params: &Params<vesta::Affine>,
        vk: &VerifyingKey<vesta::Affine>,
        items: &[BatchItem<'_>],
    ) -> Result<bool, ZkpError>;
}

/// Per-proof opening checks.
#[derive(Debug, Clone, Copy)]
pub struct CoboundaryMarlin;

/// Accumulated opening checks.
#[derive(Debug, Clone, Copy)]
pub struct Darlin;

impl private::Sealed for CoboundaryMarlin {}
impl private::Sealed for Darlin {}

impl ProofBackend for CoboundaryMarlin {
    const SYSTEM: ProvingSystem = ProvingSystem::CoboundaryMarlin;

    fn verify(
        params: &Params<vesta::Affine>,
        vk: &VerifyingKey<vesta::Affine>,
        instances: &[Fp],
        proof: &[u8],
    ) -> Result<bool, ZkpError> {
        let strategy = SingleVerifier::new(params);
        let mut transcript = Blake2bRead::<_, vesta::Affine, Challenge255<_>>::init(proof);
        let columns: &[&[Fp]] = &[instances];
        match plonk::verify_proof(params, vk, strategy, &[columns], &mut transcript) {
            Ok(()) => Ok(true),
            Err(
                plonk::Error::ConstraintSystemFailure
                | plonk::Error::Opening
                | plonk::Error::Transcript(_)
                | plonk::Error::InstanceTooLarge
                | plonk::Error::InvalidInstances,
            ) => Ok(false),
            Err(e) => Err(ZkpError::Verification(e.to_string())),
        }
    }

    fn verify_batch(
        params: &Params<vesta::Affine>,
        vk: &VerifyingKey<vesta::Affine>,
        items: &[BatchItem<'_>],
    ) -> Result<bool, ZkpError> {
        for (instances, proof) in items {
            if !Self::verify(params, vk, instances, proof)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl ProofBackend for Darlin {
    const SYSTEM: ProvingSystem = ProvingSystem::Darlin;

    fn verify(
        params: &Params<vesta::Affine>,
        vk: &VerifyingKey<vesta::Affine>,
        instances: &[Fp],
        proof: &[u8],
    ) -> Result<bool, ZkpError> {
        Self::verify_batch(params, vk, &[(instances, proof)])
    }

    fn verify_batch(
        params: &Params<vesta::Affine>,
        vk: &VerifyingKey<vesta::Affine>,
        items: &[BatchItem<'_>],
    ) -> Result<bool, ZkpError> {
        let mut batch = BatchVerifier::<vesta::Affine>::new();
        for (instances, proof) in items {
            batch.add_proof(vec![vec![instances.to_vec()]], proof.to_vec());
        }
        Ok(batch.finalize(params, vk))
    }
}

/// Verify one proof with the backend of `system`.
pub fn verify(
    system: ProvingSystem,
    params: &Params<vesta::Affine>,
    vk: &VerifyingKey<vesta::Affine>,
    instances: &[Fp],
    proof: &[u8],
) -> Result<bool, ZkpError> {
    match system {
        ProvingSystem::CoboundaryMarlin => CoboundaryMarlin::verify(params, vk, instances, proof),
        ProvingSystem::Darlin => Darlin::verify(params, vk, instances, proof),
    }
}

/// Verify a batch sharing one verifying key with the backend of `system`.
pub fn verify_batch(
    system: ProvingSystem,
    params: &Params<vesta::Affine>,
    vk: &VerifyingKey<vesta::Affine>,
    items: &[BatchItem<'_>],
) -> Result<bool, ZkpError> {
    match system {
        ProvingSystem::CoboundaryMarlin => CoboundaryMarlin::verify_batch(params, vk, items),
        ProvingSystem::Darlin => Darlin::verify_batch(params, vk, items),
    }
}
