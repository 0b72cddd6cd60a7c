//! # CSW Proof Scenarios

mod common;

use cctp_core::{result_code, ErrorCode, FieldElement};
use cctp_zkp::{
    create_cert_test_proof, create_csw_test_proof, generate_test_params, get_cert_data_hash,
    phantom_cert_data_hash, verify_csw_proof, CircuitType, McPublicKeyHash, ProvingSystem,
    ScProof, ScVerifierKey, MC_PK_SIZE,
};
use common::{cert_inputs, csw_inputs, store};

#[test]
fn csw_proof_verifies_after_file_roundtrip() {
    let (dir, store) = store();
    let cert_data_hash = get_cert_data_hash(&FieldElement::from_u64(1), &cert_inputs(10)).unwrap();

    for system in ProvingSystem::ALL {
        let (pk, vk) = generate_test_params(CircuitType::Csw, system, 0, &store).unwrap();
        let vk_path = dir.path().join(format!("{system}_csw_test_vk"));
        vk.write_to_file(&vk_path).unwrap();
        let vk = ScVerifierKey::read_from_file(&vk_path, true, &store).unwrap();

        for hash in [cert_data_hash, phantom_cert_data_hash()] {
            let inputs = csw_inputs(hash);
            let proof = create_csw_test_proof(&inputs, &pk, &store).unwrap();
            let proof_path = dir.path().join(format!("{system}_csw_test_proof"));
            proof.write_to_file(&proof_path).unwrap();
            let proof = ScProof::read_from_file(&proof_path, true).unwrap();

            assert!(verify_csw_proof(&inputs, &proof, &vk, &store).unwrap(), "{system}");

            let mut other_sc = inputs.clone();
            other_sc.sc_id = FieldElement::from_u64(4);
            assert!(!verify_csw_proof(&other_sc, &proof, &vk, &store).unwrap());
        }
    }
}

#[test]
fn phantom_and_real_cert_data_hash_are_not_interchangeable() {
    let (_dir, store) = store();
    let (pk, vk) =
        generate_test_params(CircuitType::Csw, ProvingSystem::Darlin, 0, &store).unwrap();
    let real = get_cert_data_hash(&FieldElement::from_u64(1), &cert_inputs(0)).unwrap();
    assert_ne!(real, phantom_cert_data_hash());

    let inputs = csw_inputs(phantom_cert_data_hash());
    let proof = create_csw_test_proof(&inputs, &pk, &store).unwrap();
    assert!(!verify_csw_proof(&csw_inputs(real), &proof, &vk, &store).unwrap());

    let mut other_pk = inputs.clone();
    other_pk.mc_pk_hash = McPublicKeyHash::new([254u8; MC_PK_SIZE]);
    assert!(!verify_csw_proof(&other_pk, &proof, &vk, &store).unwrap());
}

#[test]
fn csw_takes_no_custom_fields() {
    let (_dir, store) = store();
    let err = generate_test_params(CircuitType::Csw, ProvingSystem::Darlin, 1, &store);
    assert!(err.is_err());
}

#[test]
fn certificate_key_cannot_verify_csw() {
    let (_dir, store) = store();
    let system = ProvingSystem::CoboundaryMarlin;
    let (csw_pk, _) = generate_test_params(CircuitType::Csw, system, 0, &store).unwrap();
    let (cert_pk, cert_vk) = generate_test_params(CircuitType::Certificate, system, 0, &store).unwrap();

    let inputs = csw_inputs(phantom_cert_data_hash());
    let proof = create_csw_test_proof(&inputs, &csw_pk, &store).unwrap();
    let err = verify_csw_proof(&inputs, &proof, &cert_vk, &store);
    assert_eq!(result_code(&err), ErrorCode::InvalidValue);

    let err = create_cert_test_proof(&cert_inputs(0), &csw_pk, &store);
    assert_eq!(result_code(&err), ErrorCode::InvalidValue);
    assert!(create_cert_test_proof(&cert_inputs(0), &cert_pk, &store).is_ok());
}
