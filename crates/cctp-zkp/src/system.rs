//! # Proving Systems
//!
//! The closed set of proving systems a key, proof or dlog parameter set
//! can belong to. The tag travels with every serialized artifact; call
//! sites dispatch on it with an exhaustive `match` in [`crate::backend`].

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ZkpError;

/// Proving-system tag carried by keys, proofs and dlog parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProvingSystem {
    /// Every proof carries and fully checks its own opening.
    CoboundaryMarlin,
    /// Dlog opening checks are accumulated and decided once per batch.
    Darlin,
}

impl ProvingSystem {
    /// Every variant, in tag order.
    pub const ALL: [ProvingSystem; 2] = [ProvingSystem::CoboundaryMarlin, ProvingSystem::Darlin];

    /// One-byte tag used in serialized artifacts.
    pub fn tag(&self) -> u8 {
        match self {
            Self::CoboundaryMarlin => 0,
            Self::Darlin => 1,
        }
    }

    pub fn from_tag(tag: u8) -> Result<Self, ZkpError> {
        match tag {
            0 => Ok(Self::CoboundaryMarlin),
            1 => Ok(Self::Darlin),
            other => Err(ZkpError::invalid_value(
                "proving system tag",
                format!("unknown tag {other}"),
            )),
        }
    }

    /// Stable lowercase name, used for parameter file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CoboundaryMarlin => "coboundary_marlin",
            Self::Darlin => "darlin",
        }
    }
}

impl std::fmt::Display for ProvingSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CoboundaryMarlin => f.write_str("CoboundaryMarlin"),
            Self::Darlin => f.write_str("Darlin"),
        }
    }
}

impl FromStr for ProvingSystem {
    type Err = ZkpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "coboundarymarlin" | "marlin" => Ok(Self::CoboundaryMarlin),
            "darlin" => Ok(Self::Darlin),
            _ => Err(ZkpError::invalid_value(
                "proving system",
                format!("unknown name {s:?}"),
            )),
        }
    }
}

/// Read the proving-system tag of a serialized key or proof without
/// parsing the rest of it.
pub fn get_proving_system_type(bytes: &[u8]) -> Result<ProvingSystem, ZkpError> {
    let tag = bytes
        .first()
        .ok_or_else(|| ZkpError::invalid_length("artifact", "empty buffer"))?;
    ProvingSystem::from_tag(*tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_roundtrip() {
        for system in ProvingSystem::ALL {
            assert_eq!(ProvingSystem::from_tag(system.tag()).unwrap(), system);
        }
        assert!(ProvingSystem::from_tag(7).is_err());
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            "CoboundaryMarlin".parse::<ProvingSystem>().unwrap(),
            ProvingSystem::CoboundaryMarlin
        );
        assert_eq!(
            "coboundary_marlin".parse::<ProvingSystem>().unwrap(),
            ProvingSystem::CoboundaryMarlin
        );
        assert_eq!("darlin".parse::<ProvingSystem>().unwrap(), ProvingSystem::Darlin);
        assert!("groth16".parse::<ProvingSystem>().is_err());
    }

    #[test]
    fn test_get_proving_system_type() {
        assert_eq!(get_proving_system_type(&[1, 9, 9]).unwrap(), ProvingSystem::Darlin);
        assert!(get_proving_system_type(&[]).is_err());
        assert!(get_proving_system_type(&[5]).is_err());
    }
}
