//! # Keys and Proofs
//!
//! Prover keys, verifier keys and proofs as tagged byte artifacts.
//!
//! ## Byte layout
//!
//! Every artifact starts with the same header:
//!
//! | offset | size | field                        |
//! |--------|------|------------------------------|
//! | 0      | 1    | proving system tag           |
//! | 1      | 1    | artifact kind                |
//! | 2      | 1    | circuit type tag             |
//! | 3      | 4    | public-input count (u32 LE)  |
//!
//! Keys follow it with the dlog size exponent `k` (1 byte) and the
//! SHA-256 fingerprint of the verifying key (32 bytes). Key material is
//! re-derived from the dlog keys and the circuit shape on load; with
//! `semantic_checks` the derived fingerprint must match the stored one.
//!
//! Proofs follow it with the backend proof length (u32 LE) and the
//! backend proof bytes. With `semantic_checks` the backend bytes must be
//! a nonempty sequence of 32-byte curve point and scalar encodings.

use std::fs;
use std::path::Path;

use halo2_proofs::plonk::{self, keygen_pk, keygen_vk, ProvingKey, VerifyingKey};
use pasta_curves::vesta;
use sha2::{Digest, Sha256};

use crate::circuit::{check_fits, CircuitType, TestCircuit};
use crate::error::ZkpError;
use crate::params::{DlogKeyStore, DlogKeys};
use crate::system::ProvingSystem;

/// Width of one encoded point or scalar in a backend proof.
pub const PROOF_ELEMENT_SIZE: usize = 32;

const HEADER_SIZE: usize = 7;
const FINGERPRINT_SIZE: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArtifactKind {
    ProverKey,
    VerifierKey,
    Proof,
}

impl ArtifactKind {
    fn tag(self) -> u8 {
        match self {
            Self::ProverKey => 1,
            Self::VerifierKey => 2,
            Self::Proof => 3,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::ProverKey => "prover key",
            Self::VerifierKey => "verifier key",
            Self::Proof => "proof",
        }
    }
}

// ---------------------------------------------------------------------------
// Byte cursor
// ---------------------------------------------------------------------------

struct ByteReader<'a> {
    bytes: &'a [u8],
    offset: usize,
    what: &'static str,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8], what: &'static str) -> Self {
        Self {
            bytes,
            offset: 0,
            what,
        }
    }

    fn read_exact(&mut self, len: usize, field: &str) -> Result<&'a [u8], ZkpError> {
        let end = self.offset.checked_add(len).filter(|end| *end <= self.bytes.len());
        let Some(end) = end else {
            return Err(ZkpError::invalid_length(
                self.what,
                format!("buffer ends before {field} at offset {}", self.offset),
            ));
        };
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn read_u8(&mut self, field: &str) -> Result<u8, ZkpError> {
        Ok(self.read_exact(1, field)?[0])
    }

    fn read_u32(&mut self, field: &str) -> Result<u32, ZkpError> {
        let mut out = [0u8; 4];
        out.copy_from_slice(self.read_exact(4, field)?);
        Ok(u32::from_le_bytes(out))
    }

    fn read_array<const N: usize>(&mut self, field: &str) -> Result<[u8; N], ZkpError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_exact(N, field)?);
        Ok(out)
    }

    fn finish(self) -> Result<(), ZkpError> {
        let remaining = self.bytes.len() - self.offset;
        if remaining != 0 {
            return Err(ZkpError::invalid_length(
                self.what,
                format!("{remaining} trailing bytes after offset {}", self.offset),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Header {
    system: ProvingSystem,
    circuit: CircuitType,
    num_public_inputs: usize,
}

impl Header {
    fn write(&self, kind: ArtifactKind, out: &mut Vec<u8>) {
        out.push(self.system.tag());
        out.push(kind.tag());
        out.push(self.circuit.tag());
        out.extend_from_slice(&(self.num_public_inputs as u32).to_le_bytes());
    }

    fn read(reader: &mut ByteReader<'_>, kind: ArtifactKind) -> Result<Self, ZkpError> {
        let system = ProvingSystem::from_tag(reader.read_u8("proving system")?)?;
        let kind_tag = reader.read_u8("artifact kind")?;
        if kind_tag != kind.tag() {
            return Err(ZkpError::invalid_value(
                kind.name(),
                format!("artifact kind tag {kind_tag}, expected {}", kind.tag()),
            ));
        }
        let circuit = CircuitType::from_tag(reader.read_u8("circuit type")?)?;
        let num_public_inputs = reader.read_u32("public-input count")? as usize;
        circuit.check_public_inputs(num_public_inputs)?;
        Ok(Self {
            system,
            circuit,
            num_public_inputs,
        })
    }
}

// ---------------------------------------------------------------------------
// Key derivation
// ---------------------------------------------------------------------------

fn fingerprint(vk: &VerifyingKey<vesta::Affine>) -> [u8; FINGERPRINT_SIZE] {
    let pinned = format!("{:?}", vk.pinned());
    Sha256::digest(pinned.as_bytes()).into()
}

fn derive_vk(keys: &DlogKeys, header: &Header) -> Result<VerifyingKey<vesta::Affine>, plonk::Error> {
    keygen_vk(keys.params(), &TestCircuit::shape(header.num_public_inputs))
}

/// Key header plus the dlog size and fingerprint shared by both key kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct KeyDescriptor {
    header: Header,
    k: u32,
    fingerprint: [u8; FINGERPRINT_SIZE],
}

impl KeyDescriptor {
    fn encode(&self, kind: ArtifactKind) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_SIZE + 1 + FINGERPRINT_SIZE);
        self.header.write(kind, &mut out);
        out.push(self.k as u8);
        out.extend_from_slice(&self.fingerprint);
        out
    }

    fn decode(bytes: &[u8], kind: ArtifactKind) -> Result<Self, ZkpError> {
        let mut reader = ByteReader::new(bytes, kind.name());
        let header = Header::read(&mut reader, kind)?;
        let k = u32::from(reader.read_u8("dlog size")?);
        let fingerprint = reader.read_array::<FINGERPRINT_SIZE>("fingerprint")?;
        reader.finish()?;
        Ok(Self {
            header,
            k,
            fingerprint,
        })
    }

    /// Re-derive the verifying key this descriptor names.
    fn derive<'s>(
        &self,
        kind: ArtifactKind,
        semantic_checks: bool,
        store: &'s DlogKeyStore,
    ) -> Result<(&'s DlogKeys, VerifyingKey<vesta::Affine>), ZkpError> {
        let keys = store.get(self.header.system)?;
        keys.ensure_k(self.k)?;
        check_fits(self.header.num_public_inputs, self.k)?;
        let vk = derive_vk(keys, &self.header)
            .map_err(|e| ZkpError::invalid_value(kind.name(), format!("cannot derive key: {e}")))?;
        if semantic_checks && fingerprint(&vk) != self.fingerprint {
            return Err(ZkpError::invalid_value(
                kind.name(),
                "fingerprint does not match the derived key",
            ));
        }
        tracing::debug!(
            system = %self.header.system,
            circuit = %self.header.circuit,
            num_public_inputs = self.header.num_public_inputs,
            semantic_checks,
            "loaded {}",
            kind.name()
        );
        Ok((keys, vk))
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), ZkpError> {
    fs::write(path, bytes).map_err(|e| ZkpError::io(path, e))
}

fn read_file(path: &Path) -> Result<Vec<u8>, ZkpError> {
    fs::read(path).map_err(|e| ZkpError::io(path, e))
}

// ---------------------------------------------------------------------------
// Verifier key
// ---------------------------------------------------------------------------

/// Verification key of a certificate or CSW circuit.
#[derive(Clone)]
pub struct ScVerifierKey {
    descriptor: KeyDescriptor,
    vk: VerifyingKey<vesta::Affine>,
}

impl ScVerifierKey {
    pub(crate) fn generate(
        system: ProvingSystem,
        circuit: CircuitType,
        num_public_inputs: usize,
        keys: &DlogKeys,
    ) -> Result<Self, plonk::Error> {
        let header = Header {
            system,
            circuit,
            num_public_inputs,
        };
        let vk = derive_vk(keys, &header)?;
        Ok(Self::from_parts(header, keys.k(), vk))
    }

    fn from_parts(header: Header, k: u32, vk: VerifyingKey<vesta::Affine>) -> Self {
        Self {
            descriptor: KeyDescriptor {
                header,
                k,
                fingerprint: fingerprint(&vk),
            },
            vk,
        }
    }

    pub fn system(&self) -> ProvingSystem {
        self.descriptor.header.system
    }

    pub fn circuit(&self) -> CircuitType {
        self.descriptor.header.circuit
    }

    pub fn num_public_inputs(&self) -> usize {
        self.descriptor.header.num_public_inputs
    }

    /// Size exponent of the dlog keys this key was derived from.
    pub fn k(&self) -> u32 {
        self.descriptor.k
    }

    pub fn fingerprint(&self) -> [u8; FINGERPRINT_SIZE] {
        self.descriptor.fingerprint
    }

    pub(crate) fn inner(&self) -> &VerifyingKey<vesta::Affine> {
        &self.vk
    }

    /// Fingerprint of the derived key, independent of the stored one.
    pub(crate) fn derived_fingerprint(&self) -> [u8; FINGERPRINT_SIZE] {
        fingerprint(&self.vk)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.descriptor.encode(ArtifactKind::VerifierKey)
    }

    pub fn from_bytes(
        bytes: &[u8],
        semantic_checks: bool,
        store: &DlogKeyStore,
    ) -> Result<Self, ZkpError> {
        let descriptor = KeyDescriptor::decode(bytes, ArtifactKind::VerifierKey)?;
        let (_, vk) = descriptor.derive(ArtifactKind::VerifierKey, semantic_checks, store)?;
        Ok(Self { descriptor, vk })
    }

    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), ZkpError> {
        write_file(path.as_ref(), &self.to_bytes())
    }

    pub fn read_from_file(
        path: impl AsRef<Path>,
        semantic_checks: bool,
        store: &DlogKeyStore,
    ) -> Result<Self, ZkpError> {
        Self::from_bytes(&read_file(path.as_ref())?, semantic_checks, store)
    }
}

impl std::fmt::Debug for ScVerifierKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScVerifierKey")
            .field("system", &self.system())
            .field("circuit", &self.circuit())
            .field("num_public_inputs", &self.num_public_inputs())
            .field("k", &self.k())
            .finish_non_exhaustive()
    }
}

impl PartialEq for ScVerifierKey {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor == other.descriptor
    }
}

// ---------------------------------------------------------------------------
// Prover key
// ---------------------------------------------------------------------------

/// Proving key of a test circuit.
#[derive(Clone)]
pub struct ScProverKey {
    descriptor: KeyDescriptor,
    pk: ProvingKey<vesta::Affine>,
}

impl ScProverKey {
    pub(crate) fn generate(
        system: ProvingSystem,
        circuit: CircuitType,
        num_public_inputs: usize,
        keys: &DlogKeys,
    ) -> Result<Self, plonk::Error> {
        let header = Header {
            system,
            circuit,
            num_public_inputs,
        };
        let vk = derive_vk(keys, &header)?;
        let descriptor = KeyDescriptor {
            header,
            k: keys.k(),
            fingerprint: fingerprint(&vk),
        };
        let pk = keygen_pk(keys.params(), vk, &TestCircuit::shape(num_public_inputs))?;
        Ok(Self { descriptor, pk })
    }

    pub fn system(&self) -> ProvingSystem {
        self.descriptor.header.system
    }

    pub fn circuit(&self) -> CircuitType {
        self.descriptor.header.circuit
    }

    pub fn num_public_inputs(&self) -> usize {
        self.descriptor.header.num_public_inputs
    }

    pub fn k(&self) -> u32 {
        self.descriptor.k
    }

    pub(crate) fn inner(&self) -> &ProvingKey<vesta::Affine> {
        &self.pk
    }

    /// The verifier key matching this prover key.
    pub fn verifier_key(&self) -> ScVerifierKey {
        ScVerifierKey {
            descriptor: self.descriptor,
            vk: self.pk.get_vk().clone(),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.descriptor.encode(ArtifactKind::ProverKey)
    }

    pub fn from_bytes(
        bytes: &[u8],
        semantic_checks: bool,
        store: &DlogKeyStore,
    ) -> Result<Self, ZkpError> {
        let descriptor = KeyDescriptor::decode(bytes, ArtifactKind::ProverKey)?;
        let (keys, vk) = descriptor.derive(ArtifactKind::ProverKey, semantic_checks, store)?;
        let pk = keygen_pk(
            keys.params(),
            vk,
            &TestCircuit::shape(descriptor.header.num_public_inputs),
        )
        .map_err(|e| ZkpError::invalid_value("prover key", format!("cannot derive key: {e}")))?;
        Ok(Self { descriptor, pk })
    }

    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), ZkpError> {
        write_file(path.as_ref(), &self.to_bytes())
    }

    pub fn read_from_file(
        path: impl AsRef<Path>,
        semantic_checks: bool,
        store: &DlogKeyStore,
    ) -> Result<Self, ZkpError> {
        Self::from_bytes(&read_file(path.as_ref())?, semantic_checks, store)
    }
}

impl std::fmt::Debug for ScProverKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScProverKey")
            .field("system", &self.system())
            .field("circuit", &self.circuit())
            .field("num_public_inputs", &self.num_public_inputs())
            .field("k", &self.k())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Proof
// ---------------------------------------------------------------------------

/// A proof of a certificate or CSW statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScProof {
    header: Header,
    proof: Vec<u8>,
}

impl ScProof {
    pub(crate) fn new(
        system: ProvingSystem,
        circuit: CircuitType,
        num_public_inputs: usize,
        proof: Vec<u8>,
    ) -> Self {
        Self {
            header: Header {
                system,
                circuit,
                num_public_inputs,
            },
            proof,
        }
    }

    pub fn system(&self) -> ProvingSystem {
        self.header.system
    }

    pub fn circuit(&self) -> CircuitType {
        self.header.circuit
    }

    pub fn num_public_inputs(&self) -> usize {
        self.header.num_public_inputs
    }

    /// The backend proof without the artifact header.
    pub fn backend_bytes(&self) -> &[u8] {
        &self.proof
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_SIZE + 4 + self.proof.len());
        self.header.write(ArtifactKind::Proof, &mut out);
        out.extend_from_slice(&(self.proof.len() as u32).to_le_bytes());
        out.extend_from_slice(&self.proof);
        out
    }

    pub fn from_bytes(bytes: &[u8], semantic_checks: bool) -> Result<Self, ZkpError> {
        let mut reader = ByteReader::new(bytes, ArtifactKind::Proof.name());
        let header = Header::read(&mut reader, ArtifactKind::Proof)?;
        let len = reader.read_u32("proof length")? as usize;
        let proof = reader.read_exact(len, "proof bytes")?.to_vec();
        reader.finish()?;

        if semantic_checks && (proof.is_empty() || proof.len() % PROOF_ELEMENT_SIZE != 0) {
            return Err(ZkpError::invalid_value(
                "proof",
                format!(
                    "backend proof of {} bytes is not a sequence of {PROOF_ELEMENT_SIZE}-byte elements",
                    proof.len()
                ),
            ));
        }
        Ok(Self { header, proof })
    }

    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), ZkpError> {
        write_file(path.as_ref(), &self.to_bytes())
    }

    pub fn read_from_file(path: impl AsRef<Path>, semantic_checks: bool) -> Result<Self, ZkpError> {
        Self::from_bytes(&read_file(path.as_ref())?, semantic_checks)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
