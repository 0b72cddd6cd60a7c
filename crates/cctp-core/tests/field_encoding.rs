//! # Field Encoding Boundary Tests
//!
//! Exercises the byte boundary of `FieldElement` the way an external
//! caller holding raw buffers does: serialize, deserialize, compare, and
//! read back the error code on rejection.

use cctp_core::{result_code, ErrorCode, FieldElement, FIELD_SIZE};

#[test]
fn random_element_survives_buffer_roundtrip() {
    let fe = FieldElement::random();
    let mut buf = vec![0u8; FIELD_SIZE];
    fe.serialize_into(&mut buf).expect("buffer has FIELD_SIZE bytes");

    let decoded = FieldElement::from_bytes(&buf);
    assert_eq!(result_code(&decoded), ErrorCode::Ok);
    let decoded = decoded.unwrap();
    assert_eq!(decoded, fe);

    // deserialize(serialize(deserialize(b))) == deserialize(b)
    let again = FieldElement::from_bytes(&decoded.to_bytes()).unwrap();
    assert_eq!(again, decoded);
}

#[test]
fn over_modulus_buffer_yields_no_value() {
    let buf = [0xFFu8; FIELD_SIZE];
    let decoded = FieldElement::from_bytes(&buf);
    assert!(decoded.is_err());
    assert_eq!(result_code(&decoded), ErrorCode::InvalidValue);
}

#[test]
fn distinct_small_integers_are_unequal() {
    let a = FieldElement::from_u64(1);
    let b = FieldElement::from_u64(2);
    assert_ne!(a, b);
    assert_eq!(a, FieldElement::from_bytes(&a.to_bytes()).unwrap());
}

#[test]
fn equality_is_structural() {
    let a = FieldElement::random();
    let copy = a;
    assert_eq!(a, copy);
    assert_eq!(a.to_bytes(), copy.to_bytes());
}
