//! # Test Proof Generation
//!
//! Key generation and proving for the test circuits, so that the
//! verifier can be exercised end to end. Both proving systems prove the
//! same way; they only differ at verification.
//!
//! There is no zero-knowledge switch: every proof is blinded with fresh
//! randomness, so two proofs of the same statement differ byte for byte.

use halo2_proofs::plonk::create_proof;
use halo2_proofs::transcript::{Blake2bWrite, Challenge255};
use pasta_curves::{vesta, Fp};
use rand::rngs::OsRng;

use cctp_core::FieldElement;

use crate::artifacts::{ScProof, ScProverKey, ScVerifierKey};
use crate::circuit::{check_fits, CircuitType, TestCircuit};
use crate::error::ZkpError;
use crate::inputs::{CertificateProofInputs, CswProofInputs};
use crate::params::DlogKeyStore;
use crate::system::ProvingSystem;

/// Generate a prover/verifier key pair for a test circuit.
///
/// `num_custom_fields` extends certificate circuits; CSW circuits take
/// none.
pub fn generate_test_params(
    circuit: CircuitType,
    system: ProvingSystem,
    num_custom_fields: usize,
    store: &DlogKeyStore,
) -> Result<(ScProverKey, ScVerifierKey), ZkpError> {
    let num_public_inputs = circuit.num_public_inputs(num_custom_fields)?;
    let keys = store.get(system)?;
    check_fits(num_public_inputs, keys.k())?;
    let pk = ScProverKey::generate(system, circuit, num_public_inputs, keys)
        .map_err(|e| ZkpError::ProofCreation(format!("key generation: {e}")))?;
    let vk = pk.verifier_key();
    tracing::info!(%system, %circuit, num_public_inputs, k = keys.k(), "generated test keys");
    Ok((pk, vk))
}

/// Prove a certificate test circuit for `inputs`.
pub fn create_cert_test_proof(
    inputs: &CertificateProofInputs,
    pk: &ScProverKey,
    store: &DlogKeyStore,
) -> Result<ScProof, ZkpError> {
    prove(CircuitType::Certificate, &inputs.to_public_inputs()?, pk, store)
}

/// Prove a CSW test circuit for `inputs`.
pub fn create_csw_test_proof(
    inputs: &CswProofInputs,
    pk: &ScProverKey,
    store: &DlogKeyStore,
) -> Result<ScProof, ZkpError> {
    prove(CircuitType::Csw, &inputs.to_public_inputs()?, pk, store)
}

fn prove(
    circuit: CircuitType,
    public_inputs: &[FieldElement],
    pk: &ScProverKey,
    store: &DlogKeyStore,
) -> Result<ScProof, ZkpError> {
    if pk.circuit() != circuit {
        return Err(ZkpError::CircuitMismatch {
            expected: circuit,
            actual: pk.circuit(),
        });
    }
    if public_inputs.len() != pk.num_public_inputs() {
        return Err(ZkpError::InvalidListLength {
            what: "public inputs",
            expected: pk.num_public_inputs(),
            actual: public_inputs.len(),
        });
    }
    let keys = store.get(pk.system())?;
    keys.ensure_k(pk.k())?;

    let instances: Vec<Fp> = public_inputs.iter().map(FieldElement::inner).collect();
    let witness = TestCircuit::with_witness(&instances, OsRng);
    let columns: &[&[Fp]] = &[&instances[..]];

    let mut transcript = Blake2bWrite::<_, vesta::Affine, Challenge255<_>>::init(vec![]);
    create_proof(
        keys.params(),
        pk.inner(),
        &[witness],
        &[columns],
        OsRng,
        &mut transcript,
    )
    .map_err(|e| ZkpError::ProofCreation(e.to_string()))?;
    let proof = transcript.finalize();

    tracing::debug!(
        system = %pk.system(),
        %circuit,
        proof_len = proof.len(),
        "created test proof"
    );
    Ok(ScProof::new(pk.system(), circuit, public_inputs.len(), proof))
}
