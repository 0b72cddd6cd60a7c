//! Fixtures shared by the verifier scenarios.

#![allow(dead_code)]

use cctp_core::FieldElement;
use cctp_zkp::{
    BackwardTransfer, CertificateProofInputs, CswProofInputs, DlogKeyStore, McPublicKeyHash,
    ProvingSystem, MC_PK_SIZE,
};

/// Segment size used by every scenario; small enough to keep keygen fast.
pub const SEGMENT_SIZE: usize = 1 << 6;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A store with both proving systems bootstrapped into a fresh directory.
pub fn store() -> (tempfile::TempDir, DlogKeyStore) {
    init_tracing();
    let dir = tempfile::tempdir().expect("tempdir");
    let mut store = DlogKeyStore::new();
    for system in ProvingSystem::ALL {
        store
            .init_dlog_keys(system, SEGMENT_SIZE, dir.path())
            .expect("dlog bootstrap");
    }
    (dir, store)
}

pub fn cert_inputs(num_bts: usize) -> CertificateProofInputs {
    let backward_transfers = (0..num_bts)
        .map(|i| BackwardTransfer {
            pk_hash: McPublicKeyHash::new([i as u8; MC_PK_SIZE]),
            amount: 1_000 + i as u64,
        })
        .collect();
    CertificateProofInputs {
        constant: FieldElement::from_u64(1),
        epoch_number: 10,
        quality: 100,
        backward_transfers,
        end_cum_comm_tree_root: FieldElement::from_u64(2),
        btr_fee: 1_000,
        ft_min_amount: 5_000,
        custom_fields: Vec::new(),
    }
}

pub fn csw_inputs(cert_data_hash: FieldElement) -> CswProofInputs {
    CswProofInputs {
        amount: 10,
        sc_id: FieldElement::from_u64(1),
        mc_pk_hash: McPublicKeyHash::new([255u8; MC_PK_SIZE]),
        cert_data_hash,
        end_cum_comm_tree_root: FieldElement::from_u64(2),
    }
}
