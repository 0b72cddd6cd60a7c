//! # Field Element
//!
//! `FieldElement` is the atomic value of the library: every hash input,
//! Merkle leaf and circuit public input is one. It wraps the scalar field
//! of the Vesta curve, which is the field the proof system's circuits are
//! defined over.
//!
//! ## Encoding
//!
//! The byte form is `FIELD_SIZE` bytes holding the canonical
//! little-endian integer. Decoding rejects any integer at or above the
//! modulus instead of reducing it, so every element has exactly one valid
//! encoding.

use ff::{Field, PrimeField};
use pasta_curves::Fp;
use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::FieldError;

/// Width in bytes of an encoded field element.
pub const FIELD_SIZE: usize = 32;

/// An element of the prime field used for hashing and public inputs.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FieldElement(Fp);

impl FieldElement {
    /// The additive identity.
    pub fn zero() -> Self {
        Self(Fp::ZERO)
    }

    /// The multiplicative identity.
    pub fn one() -> Self {
        Self(Fp::ONE)
    }

    /// Samples a uniformly random element from the thread-local RNG.
    pub fn random() -> Self {
        Self::random_with(rand::thread_rng())
    }

    /// Samples a uniformly random element from `rng`.
    pub fn random_with(rng: impl RngCore) -> Self {
        Self(Fp::random(rng))
    }

    /// Embeds a small integer.
    pub fn from_u64(n: u64) -> Self {
        Self(Fp::from(n))
    }

    pub fn is_zero(&self) -> bool {
        self.0 == Fp::ZERO
    }

    /// Canonical little-endian encoding.
    pub fn to_bytes(&self) -> [u8; FIELD_SIZE] {
        self.0.to_repr()
    }

    /// Writes the encoding into `out`, which must be exactly `FIELD_SIZE`
    /// bytes long.
    pub fn serialize_into(&self, out: &mut [u8]) -> Result<(), FieldError> {
        if out.len() != FIELD_SIZE {
            return Err(FieldError::Serialization {
                expected: FIELD_SIZE,
                actual: out.len(),
            });
        }
        out.copy_from_slice(&self.to_bytes());
        Ok(())
    }

    /// Decodes a canonical encoding from a slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FieldError> {
        let repr: [u8; FIELD_SIZE] =
            bytes.try_into().map_err(|_| FieldError::InvalidLength {
                expected: FIELD_SIZE,
                actual: bytes.len(),
            })?;
        Self::from_repr(repr)
    }

    /// Decodes a canonical encoding. Values `>= modulus` are rejected.
    pub fn from_repr(repr: [u8; FIELD_SIZE]) -> Result<Self, FieldError> {
        Option::<Fp>::from(Fp::from_repr(repr))
            .map(Self)
            .ok_or(FieldError::NonCanonical)
    }

    /// Lowercase hex of the canonical encoding.
    pub fn to_hex(&self) -> String {
        self.to_bytes().iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parses the output of [`FieldElement::to_hex`].
    pub fn from_hex(hex: &str) -> Result<Self, FieldError> {
        let hex = hex.trim();
        if hex.len() != 2 * FIELD_SIZE {
            return Err(FieldError::InvalidLength {
                expected: FIELD_SIZE,
                actual: hex.len() / 2,
            });
        }
        let mut repr = [0u8; FIELD_SIZE];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let s = std::str::from_utf8(chunk).map_err(|e| FieldError::Hex(e.to_string()))?;
            repr[i] = u8::from_str_radix(s, 16)
                .map_err(|e| FieldError::Hex(format!("invalid hex at {i}: {e}")))?;
        }
        Self::from_repr(repr)
    }

    /// The underlying backend scalar.
    pub fn inner(&self) -> Fp {
        self.0
    }
}

impl Default for FieldElement {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<Fp> for FieldElement {
    fn from(f: Fp) -> Self {
        Self(f)
    }
}

impl From<FieldElement> for Fp {
    fn from(f: FieldElement) -> Self {
        f.0
    }
}

impl From<u64> for FieldElement {
    fn from(n: u64) -> Self {
        Self::from_u64(n)
    }
}

impl From<u32> for FieldElement {
    fn from(n: u32) -> Self {
        Self::from_u64(u64::from(n))
    }
}

impl std::fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FieldElement({})", self.to_hex())
    }
}

impl std::fmt::Display for FieldElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::hash::Hash for FieldElement {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.to_bytes().hash(state);
    }
}

impl Serialize for FieldElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for FieldElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        FieldElement::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CodedError, ErrorCode};

    #[test]
    fn test_field_size_matches_repr() {
        assert_eq!(FieldElement::zero().to_bytes().len(), FIELD_SIZE);
    }

    #[test]
    fn test_small_integer_encoding_is_little_endian() {
        let bytes = FieldElement::from_u64(0x0102).to_bytes();
        assert_eq!(bytes[0], 0x02);
        assert_eq!(bytes[1], 0x01);
        assert!(bytes[2..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_all_ones_buffer_rejected() {
        let err = FieldElement::from_bytes(&[0xFF; FIELD_SIZE]).unwrap_err();
        assert_eq!(err, FieldError::NonCanonical);
        assert_eq!(err.code(), ErrorCode::InvalidValue);
    }

    #[test]
    fn test_modulus_rejected_modulus_minus_one_accepted() {
        let max = -Fp::ONE;
        let max_repr = max.to_repr();
        assert!(FieldElement::from_repr(max_repr).is_ok());

        // p = (p - 1) + 1, carried through the little-endian bytes.
        let mut modulus = max_repr;
        for byte in modulus.iter_mut() {
            let (v, overflow) = byte.overflowing_add(1);
            *byte = v;
            if !overflow {
                break;
            }
        }
        assert_eq!(
            FieldElement::from_repr(modulus),
            Err(FieldError::NonCanonical)
        );
    }

    #[test]
    fn test_wrong_length_buffer() {
        let err = FieldElement::from_bytes(&[0u8; FIELD_SIZE - 1]).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidBufferLength);
    }

    #[test]
    fn test_serialize_into_checks_length() {
        let fe = FieldElement::from_u64(7);
        let mut short = [0u8; 16];
        let err = fe.serialize_into(&mut short).unwrap_err();
        assert_eq!(err.code(), ErrorCode::SerializationError);

        let mut buf = [0u8; FIELD_SIZE];
        fe.serialize_into(&mut buf).unwrap();
        assert_eq!(FieldElement::from_bytes(&buf).unwrap(), fe);
    }

    #[test]
    fn test_random_elements_differ() {
        assert_ne!(FieldElement::random(), FieldElement::random());
    }

    #[test]
    fn test_hex_roundtrip_and_serde() {
        let fe = FieldElement::from_u64(123_456_789);
        assert_eq!(FieldElement::from_hex(&fe.to_hex()).unwrap(), fe);

        let json = serde_json::to_string(&fe).unwrap();
        assert_eq!(json, format!("\"{}\"", fe.to_hex()));
        let back: FieldElement = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fe);
    }

    #[test]
    fn test_zero_and_one() {
        assert!(FieldElement::zero().is_zero());
        assert!(!FieldElement::one().is_zero());
        assert_eq!(FieldElement::one(), FieldElement::from_u64(1));
    }
}
