//! # Public Inputs
//!
//! Certificate and CSW public data and their assembly into the ordered
//! field-element vector a circuit commits to.
//!
//! ## Certificate order
//!
//! `constant, epoch_number, quality, bt_root, end_cum_comm_tree_root,
//! btr_fee, ft_min_amount, custom_fields...`
//!
//! `bt_root` compresses the backward-transfer list: each transfer packs
//! into one field element (`pk_hash || amount_le || 0^4`) and the list is
//! the leaf sequence of a Ginger tree of height
//! [`BT_MERKLE_TREE_HEIGHT`].
//!
//! ## CSW order
//!
//! `amount, sc_id, mc_pk_hash, cert_data_hash, end_cum_comm_tree_root`
//!
//! `cert_data_hash` is [`phantom_cert_data_hash`] when the sidechain has
//! no certificate yet.

use serde::{Deserialize, Serialize};

use cctp_core::{FieldElement, FIELD_SIZE};
use cctp_crypto::{domain_constant, hash_constant_length, GingerMerkleTree, PoseidonDigest};

use crate::circuit::CERT_FIXED_PUBLIC_INPUTS;
use crate::error::ZkpError;

/// Length of a mainchain public-key hash.
pub const MC_PK_SIZE: usize = 20;

/// Height of the tree compressing a certificate's backward transfers.
pub const BT_MERKLE_TREE_HEIGHT: usize = 12;

/// Most backward transfers a certificate can carry.
pub const MAX_BACKWARD_TRANSFERS: usize = 1 << BT_MERKLE_TREE_HEIGHT;

const PHANTOM_CERT_DATA_HASH_TAG: &[u8] = b"cctp-phantom-cert-data-hash";

/// Sentinel `cert_data_hash` for a sidechain without certificates.
pub fn phantom_cert_data_hash() -> FieldElement {
    domain_constant(PHANTOM_CERT_DATA_HASH_TAG)
}

/// Field element whose little-endian encoding starts with `prefix`.
fn pack_le(prefix: &[u8]) -> Result<FieldElement, ZkpError> {
    let mut repr = [0u8; FIELD_SIZE];
    repr[..prefix.len()].copy_from_slice(prefix);
    Ok(FieldElement::from_repr(repr)?)
}

// ---------------------------------------------------------------------------
// Mainchain key hash
// ---------------------------------------------------------------------------

/// Hash of a mainchain public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct McPublicKeyHash([u8; MC_PK_SIZE]);

impl McPublicKeyHash {
    pub fn new(bytes: [u8; MC_PK_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; MC_PK_SIZE] {
        &self.0
    }

    /// The hash as a public input: its bytes, little-endian, zero-extended.
    pub fn to_field_element(&self) -> Result<FieldElement, ZkpError> {
        pack_le(&self.0)
    }
}

impl TryFrom<&[u8]> for McPublicKeyHash {
    type Error = ZkpError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let array: [u8; MC_PK_SIZE] = bytes.try_into().map_err(|_| {
            ZkpError::invalid_length(
                "mc public key hash",
                format!("expected {MC_PK_SIZE} bytes, got {}", bytes.len()),
            )
        })?;
        Ok(Self(array))
    }
}

// ---------------------------------------------------------------------------
// Backward transfers
// ---------------------------------------------------------------------------

/// Value moving from the sidechain back to a mainchain address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackwardTransfer {
    pub pk_hash: McPublicKeyHash,
    pub amount: u64,
}

impl BackwardTransfer {
    /// `pk_hash || amount (u64 LE)`, zero-extended to one field element.
    pub fn to_field_element(&self) -> Result<FieldElement, ZkpError> {
        let mut packed = [0u8; MC_PK_SIZE + 8];
        packed[..MC_PK_SIZE].copy_from_slice(self.pk_hash.as_bytes());
        packed[MC_PK_SIZE..].copy_from_slice(&self.amount.to_le_bytes());
        pack_le(&packed)
    }
}

/// Root of the Ginger tree over the packed transfers.
pub fn backward_transfers_root(transfers: &[BackwardTransfer]) -> Result<FieldElement, ZkpError> {
    if transfers.len() > MAX_BACKWARD_TRANSFERS {
        return Err(ZkpError::InvalidListLength {
            what: "backward transfers",
            expected: MAX_BACKWARD_TRANSFERS,
            actual: transfers.len(),
        });
    }
    let mut tree = GingerMerkleTree::new(BT_MERKLE_TREE_HEIGHT, MAX_BACKWARD_TRANSFERS)?;
    for bt in transfers {
        tree.append(&bt.to_field_element()?)?;
    }
    Ok(tree.finalize_in_place().root()?)
}

// ---------------------------------------------------------------------------
// Certificate
// ---------------------------------------------------------------------------

/// Public data of a certificate proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateProofInputs {
    pub constant: FieldElement,
    pub epoch_number: u32,
    pub quality: u64,
    pub backward_transfers: Vec<BackwardTransfer>,
    pub end_cum_comm_tree_root: FieldElement,
    pub btr_fee: u64,
    pub ft_min_amount: u64,
    pub custom_fields: Vec<FieldElement>,
}

impl CertificateProofInputs {
    /// The ordered public-input vector.
    pub fn to_public_inputs(&self) -> Result<Vec<FieldElement>, ZkpError> {
        let mut inputs = Vec::with_capacity(CERT_FIXED_PUBLIC_INPUTS + self.custom_fields.len());
        inputs.push(self.constant);
        inputs.push(FieldElement::from(self.epoch_number));
        inputs.push(FieldElement::from(self.quality));
        inputs.push(backward_transfers_root(&self.backward_transfers)?);
        inputs.push(self.end_cum_comm_tree_root);
        inputs.push(FieldElement::from(self.btr_fee));
        inputs.push(FieldElement::from(self.ft_min_amount));
        inputs.extend_from_slice(&self.custom_fields);
        Ok(inputs)
    }
}

/// Digest binding a certificate's data to its sidechain, as referenced by
/// later CSW proofs.
pub fn get_cert_data_hash(
    sc_id: &FieldElement,
    cert: &CertificateProofInputs,
) -> Result<FieldElement, ZkpError> {
    let mut digest = PoseidonDigest::variable_length(false);
    digest
        .update(sc_id)
        .update(&FieldElement::from(cert.epoch_number))
        .update(&FieldElement::from(cert.quality))
        .update(&backward_transfers_root(&cert.backward_transfers)?);
    for field in &cert.custom_fields {
        digest.update(field);
    }
    digest
        .update(&cert.end_cum_comm_tree_root)
        .update(&FieldElement::from(cert.btr_fee))
        .update(&FieldElement::from(cert.ft_min_amount));
    Ok(digest.finalize()?)
}

// ---------------------------------------------------------------------------
// CSW
// ---------------------------------------------------------------------------

/// Public data of a ceased sidechain withdrawal proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CswProofInputs {
    pub amount: u64,
    pub sc_id: FieldElement,
    pub mc_pk_hash: McPublicKeyHash,
    pub cert_data_hash: FieldElement,
    pub end_cum_comm_tree_root: FieldElement,
}

impl CswProofInputs {
    /// The ordered public-input vector.
    pub fn to_public_inputs(&self) -> Result<Vec<FieldElement>, ZkpError> {
        Ok(vec![
            FieldElement::from(self.amount),
            self.sc_id,
            self.mc_pk_hash.to_field_element()?,
            self.cert_data_hash,
            self.end_cum_comm_tree_root,
        ])
    }
}

/// Sidechain id of the sidechain created by output `output_index` of the
/// mainchain transaction `tx_hash`.
pub fn compute_sc_id(tx_hash: &[u8; 32], output_index: u32) -> Result<FieldElement, ZkpError> {
    let (low, high) = tx_hash.split_at(16);
    Ok(hash_constant_length(&[
        pack_le(low)?,
        pack_le(high)?,
        FieldElement::from(output_index),
    ])?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
