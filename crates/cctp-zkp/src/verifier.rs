//! # Proof Verifier
//!
//! Verification of certificate and CSW proofs, singly or in batches.
//!
//! Verification is a pure function of the public inputs, the proof, the
//! verifier key and the dlog keys in the store. It returns `Ok(true)` or
//! `Ok(false)` whenever the backend verifier runs; any public-input bit
//! that differs from what was proven yields `Ok(false)`. Errors mean the
//! call itself was invalid: mismatched proving systems or circuits, the
//! wrong number of public inputs, or uninitialized dlog keys.

use std::collections::{BTreeMap, BTreeSet};

use pasta_curves::Fp;

use cctp_core::FieldElement;

use crate::artifacts::{ScProof, ScVerifierKey};
use crate::backend::{self, BatchItem};
use crate::circuit::CircuitType;
use crate::error::ZkpError;
use crate::inputs::{CertificateProofInputs, CswProofInputs};
use crate::params::DlogKeyStore;

/// Verify a certificate proof.
pub fn verify_certificate_proof(
    inputs: &CertificateProofInputs,
    proof: &ScProof,
    vk: &ScVerifierKey,
    store: &DlogKeyStore,
) -> Result<bool, ZkpError> {
    verify_public_inputs(CircuitType::Certificate, &inputs.to_public_inputs()?, proof, vk, store)
}

/// Verify a CSW proof.
pub fn verify_csw_proof(
    inputs: &CswProofInputs,
    proof: &ScProof,
    vk: &ScVerifierKey,
    store: &DlogKeyStore,
) -> Result<bool, ZkpError> {
    verify_public_inputs(CircuitType::Csw, &inputs.to_public_inputs()?, proof, vk, store)
}

/// Check that `proof` and `vk` fit together and fit `circuit`.
fn check_compatible(
    circuit: CircuitType,
    public_inputs: &[FieldElement],
    proof: &ScProof,
    vk: &ScVerifierKey,
) -> Result<(), ZkpError> {
    if proof.system() != vk.system() {
        return Err(ZkpError::SystemMismatch {
            key: vk.system(),
            proof: proof.system(),
        });
    }
    for actual in [vk.circuit(), proof.circuit()] {
        if actual != circuit {
            return Err(ZkpError::CircuitMismatch {
                expected: circuit,
                actual,
            });
        }
    }
    for expected in [vk.num_public_inputs(), proof.num_public_inputs()] {
        if public_inputs.len() != expected {
            return Err(ZkpError::InvalidListLength {
                what: "public inputs",
                expected,
                actual: public_inputs.len(),
            });
        }
    }
    Ok(())
}

fn to_instances(public_inputs: &[FieldElement]) -> Vec<Fp> {
    public_inputs.iter().map(FieldElement::inner).collect()
}

fn verify_public_inputs(
    circuit: CircuitType,
    public_inputs: &[FieldElement],
    proof: &ScProof,
    vk: &ScVerifierKey,
    store: &DlogKeyStore,
) -> Result<bool, ZkpError> {
    check_compatible(circuit, public_inputs, proof, vk)?;
    let keys = store.get(vk.system())?;
    keys.ensure_k(vk.k())?;

    let instances = to_instances(public_inputs);
    let verified = backend::verify(
        vk.system(),
        keys.params(),
        vk.inner(),
        &instances,
        proof.backend_bytes(),
    )?;

    tracing::debug!(system = %vk.system(), %circuit, verified, "verified proof");
    Ok(verified)
}

// ---------------------------------------------------------------------------
// Batch verification
// ---------------------------------------------------------------------------

struct BatchEntry {
    circuit: CircuitType,
    /// Fingerprint of the derived verifying key; entries sharing it share a batch.
    group: [u8; 32],
    instances: Vec<Fp>,
    proof: ScProof,
    vk: ScVerifierKey,
}

/// Outcome of a batch verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchVerificationResult {
    /// Whether every proof in the batch verified.
    pub verified: bool,
    /// Ids of the proofs that did not verify, ascending.
    pub failing_ids: Vec<u32>,
}

/// Collects certificate and CSW proofs under caller-chosen ids and
/// verifies them together.
///
/// Proofs sharing a verifier key are checked as one backend batch; a
/// group that fails is re-verified proof by proof to identify the
/// failing ids.
#[derive(Default)]
pub struct ZendooBatchVerifier {
    entries: BTreeMap<u32, BatchEntry>,
}

impl ZendooBatchVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Queue a certificate proof under `id`.
    pub fn add_certificate_proof(
        &mut self,
        id: u32,
        inputs: &CertificateProofInputs,
        proof: ScProof,
        vk: ScVerifierKey,
    ) -> Result<(), ZkpError> {
        self.add(id, CircuitType::Certificate, inputs.to_public_inputs()?, proof, vk)
    }

    /// Queue a CSW proof under `id`.
    pub fn add_csw_proof(
        &mut self,
        id: u32,
        inputs: &CswProofInputs,
        proof: ScProof,
        vk: ScVerifierKey,
    ) -> Result<(), ZkpError> {
        self.add(id, CircuitType::Csw, inputs.to_public_inputs()?, proof, vk)
    }

    fn add(
        &mut self,
        id: u32,
        circuit: CircuitType,
        public_inputs: Vec<FieldElement>,
        proof: ScProof,
        vk: ScVerifierKey,
    ) -> Result<(), ZkpError> {
        if self.entries.contains_key(&id) {
            return Err(ZkpError::Batch(format!("duplicate proof id {id}")));
        }
        check_compatible(circuit, &public_inputs, &proof, &vk)?;
        self.entries.insert(
            id,
            BatchEntry {
                circuit,
                group: vk.derived_fingerprint(),
                instances: to_instances(&public_inputs),
                proof,
                vk,
            },
        );
        Ok(())
    }

    /// Verify every queued proof.
    pub fn batch_verify_all(&self, store: &DlogKeyStore) -> Result<BatchVerificationResult, ZkpError> {
        let ids: Vec<u32> = self.entries.keys().copied().collect();
        self.verify_ids(&ids, store)
    }

    /// Verify the queued proofs with the given ids.
    pub fn batch_verify_subset(
        &self,
        ids: &[u32],
        store: &DlogKeyStore,
    ) -> Result<BatchVerificationResult, ZkpError> {
        let unique: BTreeSet<u32> = ids.iter().copied().collect();
        if unique.len() != ids.len() {
            return Err(ZkpError::Batch("duplicate id in subset".into()));
        }
        if let Some(missing) = unique.iter().find(|id| !self.entries.contains_key(id)) {
            return Err(ZkpError::Batch(format!("unknown proof id {missing}")));
        }
        let ids: Vec<u32> = unique.into_iter().collect();
        self.verify_ids(&ids, store)
    }

    fn verify_ids(&self, ids: &[u32], store: &DlogKeyStore) -> Result<BatchVerificationResult, ZkpError> {
        let mut groups: BTreeMap<(u8, [u8; 32]), Vec<(u32, &BatchEntry)>> = BTreeMap::new();
        for id in ids {
            let entry = self
                .entries
                .get(id)
                .ok_or_else(|| ZkpError::Batch(format!("unknown proof id {id}")))?;
            groups
                .entry((entry.vk.system().tag(), entry.group))
                .or_default()
                .push((*id, entry));
        }

        let mut failing_ids = Vec::new();
        for members in groups.values() {
            let Some((_, first)) = members.first() else {
                continue;
            };
            let system = first.vk.system();
            let keys = store.get(system)?;
            keys.ensure_k(first.vk.k())?;

            let items: Vec<BatchItem<'_>> = members
                .iter()
                .map(|(_, e)| (e.instances.as_slice(), e.proof.backend_bytes()))
                .collect();
            if backend::verify_batch(system, keys.params(), first.vk.inner(), &items)? {
                continue;
            }

            for (id, entry) in members {
                let ok = backend::verify(
                    system,
                    keys.params(),
                    entry.vk.inner(),
                    &entry.instances,
                    entry.proof.backend_bytes(),
                )?;
                if !ok {
                    tracing::debug!(id, %system, circuit = %entry.circuit, "proof failed in batch");
                    failing_ids.push(*id);
                }
            }
        }

        failing_ids.sort_unstable();
        tracing::debug!(
            proofs = ids.len(),
            failing = failing_ids.len(),
            "batch verification finished"
        );
        Ok(BatchVerificationResult {
            verified: failing_ids.is_empty(),
            failing_ids,
        })
    }
}
