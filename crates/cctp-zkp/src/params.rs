//! # Dlog Parameter Store
//!
//! Both proving systems commit to polynomials with an inner-product
//! (discrete-log) commitment scheme over Vesta. Its public parameters, the
//! "dlog keys", are sized by the largest circuit segment they must
//! support and are needed before any proof of that system is generated or
//! verified.
//!
//! [`DlogKeyStore`] is the explicit handle holding them. It is built once,
//! bootstrapped per proving system with [`DlogKeyStore::init_dlog_keys`],
//! then passed by shared reference into every key load, proof and
//! verification call. There is no process-global parameter state.
//!
//! ## On-disk cache
//!
//! Parameters are cached under `params_dir` as
//! `<system>_ck_k<k>.params`: the size exponent `k` as `u32` LE followed
//! by the backend's parameter encoding. A missing file is generated and
//! written; a stale or unreadable file is regenerated and overwritten.
//! Files are written to a temporary sibling and renamed into place.

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use halo2_proofs::poly::commitment::Params;
use pasta_curves::vesta;
use serde::{Deserialize, Serialize};

use crate::error::ZkpError;
use crate::system::ProvingSystem;

/// Smallest supported segment size exponent.
pub const MIN_SEGMENT_LOG2: u32 = 5;

/// Largest supported segment size exponent.
pub const MAX_SEGMENT_LOG2: u32 = 24;

/// Segment size used when none is configured.
pub const DEFAULT_MAX_SEGMENT_SIZE: usize = 1 << 17;

/// Parameter directory used when none is configured.
pub const DEFAULT_PARAMS_DIR: &str = "./params";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Where dlog keys live and how large they are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamsConfig {
    /// Directory holding cached parameter files.
    pub params_dir: PathBuf,
    /// Largest circuit segment the keys must support; a power of two.
    pub max_segment_size: usize,
}

impl Default for ParamsConfig {
    fn default() -> Self {
        Self {
            params_dir: PathBuf::from(DEFAULT_PARAMS_DIR),
            max_segment_size: DEFAULT_MAX_SEGMENT_SIZE,
        }
    }
}

impl ParamsConfig {
    /// Read `CCTP_PARAMS_DIR` and `CCTP_MAX_SEGMENT_SIZE`, falling back to
    /// defaults for unset variables.
    pub fn from_env() -> Result<Self, ZkpError> {
        let mut config = Self::default();
        if let Ok(dir) = std::env::var("CCTP_PARAMS_DIR") {
            config.params_dir = PathBuf::from(dir);
        }
        if let Ok(size) = std::env::var("CCTP_MAX_SEGMENT_SIZE") {
            config.max_segment_size = size.trim().parse().map_err(|e| {
                ZkpError::invalid_value("CCTP_MAX_SEGMENT_SIZE", format!("{size:?}: {e}"))
            })?;
        }
        segment_size_log2(config.max_segment_size)?;
        Ok(config)
    }
}

/// Size exponent `k` with `2^k == size`, if `size` is supported.
pub fn segment_size_log2(size: usize) -> Result<u32, ZkpError> {
    let k = size.trailing_zeros();
    if !size.is_power_of_two() || !(MIN_SEGMENT_LOG2..=MAX_SEGMENT_LOG2).contains(&k) {
        return Err(ZkpError::InvalidSegmentSize {
            size,
            min: 1 << MIN_SEGMENT_LOG2,
            max: 1 << MAX_SEGMENT_LOG2,
        });
    }
    Ok(k)
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Dlog keys of one proving system.
#[derive(Clone)]
pub struct DlogKeys {
    system: ProvingSystem,
    k: u32,
    params: Params<vesta::Affine>,
}

impl DlogKeys {
    pub fn system(&self) -> ProvingSystem {
        self.system
    }

    /// Size exponent: the keys support segments of `2^k` rows.
    pub fn k(&self) -> u32 {
        self.k
    }

    pub fn max_segment_size(&self) -> usize {
        1 << self.k
    }

    pub(crate) fn params(&self) -> &Params<vesta::Affine> {
        &self.params
    }

    /// Fail unless these keys have size exponent `k`.
    pub(crate) fn ensure_k(&self, k: u32) -> Result<(), ZkpError> {
        if self.k != k {
            return Err(ZkpError::ParamsMismatch {
                artifact_k: k,
                store_k: self.k,
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for DlogKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DlogKeys")
            .field("system", &self.system)
            .field("k", &self.k)
            .finish_non_exhaustive()
    }
}

/// Per-proving-system dlog keys, threaded explicitly into every call.
#[derive(Debug, Clone, Default)]
pub struct DlogKeyStore {
    keys: BTreeMap<ProvingSystem, Arc<DlogKeys>>,
}

impl DlogKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store bootstrapped for each of `systems` from `config`.
    pub fn from_config(config: &ParamsConfig, systems: &[ProvingSystem]) -> Result<Self, ZkpError> {
        let mut store = Self::new();
        for system in systems {
            store.init_dlog_keys(*system, config.max_segment_size, &config.params_dir)?;
        }
        Ok(store)
    }

    /// Bootstrap the dlog keys of `system` for segments up to
    /// `max_segment_size`, loading them from `params_dir` or generating
    /// and caching them there.
    ///
    /// Repeating the call with the same size is a no-op. A different size
    /// for an already bootstrapped system is an error.
    pub fn init_dlog_keys(
        &mut self,
        system: ProvingSystem,
        max_segment_size: usize,
        params_dir: impl AsRef<Path>,
    ) -> Result<(), ZkpError> {
        let k = segment_size_log2(max_segment_size)?;
        if let Some(existing) = self.keys.get(&system) {
            if existing.k == k {
                tracing::debug!(%system, k, "dlog keys already initialized");
                return Ok(());
            }
            return Err(ZkpError::SegmentSizeMismatch {
                system,
                initialized: existing.max_segment_size(),
                requested: max_segment_size,
            });
        }

        let path = params_path(params_dir.as_ref(), system, k);
        let params = match read_params(&path, k) {
            Ok(Some(params)) => {
                tracing::debug!(%system, k, path = %path.display(), "loaded cached dlog keys");
                params
            }
            Ok(None) => generate_and_write(&path, system, k)?,
            Err(e) => {
                tracing::warn!(%system, k, path = %path.display(), error = %e, "cached dlog keys unusable; regenerating");
                generate_and_write(&path, system, k)?
            }
        };

        self.keys.insert(system, Arc::new(DlogKeys { system, k, params }));
        Ok(())
    }

    /// Dlog keys of `system`.
    pub fn get(&self, system: ProvingSystem) -> Result<&DlogKeys, ZkpError> {
        self.keys
            .get(&system)
            .map(Arc::as_ref)
            .ok_or(ZkpError::UninitializedParameters(system))
    }

    pub fn is_initialized(&self, system: ProvingSystem) -> bool {
        self.keys.contains_key(&system)
    }
}

fn params_path(dir: &Path, system: ProvingSystem, k: u32) -> PathBuf {
    dir.join(format!("{}_ck_k{k}.params", system.as_str()))
}

/// `Ok(None)` when the file does not exist.
fn read_params(path: &Path, k: u32) -> Result<Option<Params<vesta::Affine>>, ZkpError> {
    let file = match fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ZkpError::io(path, e)),
    };
    let mut reader = BufReader::new(file);

    // Our header, then the size exponent the backend encoding starts with.
    let mut sizes = [0u8; 8];
    reader
        .read_exact(&mut sizes)
        .map_err(|e| ZkpError::io(path, e))?;
    let (header, inner) = sizes.split_at(4);
    for stored in [header, inner] {
        let mut word = [0u8; 4];
        word.copy_from_slice(stored);
        let stored_k = u32::from_le_bytes(word);
        if stored_k != k {
            return Err(ZkpError::ParamsMismatch {
                artifact_k: stored_k,
                store_k: k,
            });
        }
    }

    let params = Params::<vesta::Affine>::read(&mut inner.chain(&mut reader))
        .map_err(|e| ZkpError::io(path, e))?;
    if params.k() != k {
        return Err(ZkpError::ParamsMismatch {
            artifact_k: params.k(),
            store_k: k,
        });
    }
    Ok(Some(params))
}

fn generate_and_write(
    path: &Path,
    system: ProvingSystem,
    k: u32,
) -> Result<Params<vesta::Affine>, ZkpError> {
    tracing::info!(%system, k, "generating dlog keys");
    let params = Params::<vesta::Affine>::new(k);

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| ZkpError::io(dir, e))?;
    }
    let tmp = path.with_extension("params.tmp");
    {
        let file = fs::File::create(&tmp).map_err(|e| ZkpError::io(&tmp, e))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(&k.to_le_bytes())
            .and_then(|()| params.write(&mut writer))
            .and_then(|()| writer.flush())
            .map_err(|e| ZkpError::io(&tmp, e))?;
    }
    fs::rename(&tmp, path).map_err(|e| ZkpError::io(path, e))?;

    tracing::info!(%system, k, path = %path.display(), "dlog keys written");
    Ok(params)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use cctp_core::{CodedError, ErrorCode};

    const SEGMENT: usize = 1 << MIN_SEGMENT_LOG2;

    #[test]
    fn test_segment_size_validation() {
        assert_eq!(segment_size_log2(1 << 9).unwrap(), 9);
        assert!(segment_size_log2(0).is_err());
        assert!(segment_size_log2(3 << 8).is_err());
        assert!(segment_size_log2(1 << (MIN_SEGMENT_LOG2 - 1)).is_err());
        assert!(segment_size_log2(1 << (MAX_SEGMENT_LOG2 + 1)).is_err());
    }

    #[test]
    fn test_uninitialized_store() {
        let store = DlogKeyStore::new();
        let err = store.get(ProvingSystem::Darlin).unwrap_err();
        assert_eq!(err.code(), ErrorCode::UninitializedParameters);
    }

    #[test]
    fn test_init_writes_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DlogKeyStore::new();
        store
            .init_dlog_keys(ProvingSystem::Darlin, SEGMENT, dir.path())
            .unwrap();
        let path = params_path(dir.path(), ProvingSystem::Darlin, MIN_SEGMENT_LOG2);
        assert!(path.exists());

        let reloaded = read_params(&path, MIN_SEGMENT_LOG2).unwrap();
        assert!(reloaded.is_some());

        let mut other = DlogKeyStore::new();
        other
            .init_dlog_keys(ProvingSystem::Darlin, SEGMENT, dir.path())
            .unwrap();
        assert_eq!(other.get(ProvingSystem::Darlin).unwrap().k(), MIN_SEGMENT_LOG2);
    }

    #[test]
    fn test_init_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DlogKeyStore::new();
        for _ in 0..2 {
            store
                .init_dlog_keys(ProvingSystem::CoboundaryMarlin, SEGMENT, dir.path())
                .unwrap();
        }
        assert!(store.is_initialized(ProvingSystem::CoboundaryMarlin));
        assert!(!store.is_initialized(ProvingSystem::Darlin));
    }

    #[test]
    fn test_init_with_other_size_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DlogKeyStore::new();
        store
            .init_dlog_keys(ProvingSystem::Darlin, SEGMENT, dir.path())
            .unwrap();
        let err = store
            .init_dlog_keys(ProvingSystem::Darlin, SEGMENT * 2, dir.path())
            .unwrap_err();
        assert!(matches!(err, ZkpError::SegmentSizeMismatch { .. }));
    }

    #[test]
    fn test_corrupt_cache_regenerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = params_path(dir.path(), ProvingSystem::Darlin, MIN_SEGMENT_LOG2);
        fs::write(&path, b"not parameters").unwrap();

        let mut store = DlogKeyStore::new();
        store
            .init_dlog_keys(ProvingSystem::Darlin, SEGMENT, dir.path())
            .unwrap();
        assert!(read_params(&path, MIN_SEGMENT_LOG2).unwrap().is_some());
    }

    fn write_with_header(path: &Path, header_k: u32, body: &[u8]) {
        let mut bytes = header_k.to_le_bytes().to_vec();
        bytes.extend_from_slice(body);
        fs::write(path, bytes).unwrap();
    }

    #[test]
    fn test_inner_size_mismatch_regenerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = params_path(dir.path(), ProvingSystem::Darlin, MIN_SEGMENT_LOG2);

        let mut larger = Vec::new();
        Params::<vesta::Affine>::new(MIN_SEGMENT_LOG2 + 1)
            .write(&mut larger)
            .unwrap();
        let oversized_k = 200u32.to_le_bytes();

        for body in [&oversized_k[..], &larger[..]] {
            write_with_header(&path, MIN_SEGMENT_LOG2, body);
            assert!(matches!(
                read_params(&path, MIN_SEGMENT_LOG2),
                Err(ZkpError::ParamsMismatch { .. })
            ));

            let mut store = DlogKeyStore::new();
            store
                .init_dlog_keys(ProvingSystem::Darlin, SEGMENT, dir.path())
                .unwrap();
            assert_eq!(store.get(ProvingSystem::Darlin).unwrap().k(), MIN_SEGMENT_LOG2);
            let reloaded = read_params(&path, MIN_SEGMENT_LOG2).unwrap().unwrap();
            assert_eq!(reloaded.k(), MIN_SEGMENT_LOG2);
        }
    }

    #[test]
    fn test_truncated_cache_regenerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = params_path(dir.path(), ProvingSystem::CoboundaryMarlin, MIN_SEGMENT_LOG2);
        let mut valid = Vec::new();
        Params::<vesta::Affine>::new(MIN_SEGMENT_LOG2)
            .write(&mut valid)
            .unwrap();
        write_with_header(&path, MIN_SEGMENT_LOG2, &valid[..valid.len() / 2]);
        assert!(read_params(&path, MIN_SEGMENT_LOG2).is_err());

        let mut store = DlogKeyStore::new();
        store
            .init_dlog_keys(ProvingSystem::CoboundaryMarlin, SEGMENT, dir.path())
            .unwrap();
        assert!(read_params(&path, MIN_SEGMENT_LOG2).unwrap().is_some());
    }

    #[test]
    fn test_config_default_and_serde() {
        let config = ParamsConfig::default();
        assert_eq!(config.max_segment_size, DEFAULT_MAX_SEGMENT_SIZE);
        assert!(segment_size_log2(config.max_segment_size).is_ok());
        let json = serde_json::to_string(&config).unwrap();
        let back: ParamsConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_from_config_bootstraps_each_system() {
        let dir = tempfile::tempdir().unwrap();
        let config = ParamsConfig {
            params_dir: dir.path().to_path_buf(),
            max_segment_size: SEGMENT,
        };
        let store = DlogKeyStore::from_config(&config, &ProvingSystem::ALL).unwrap();
        for system in ProvingSystem::ALL {
            assert_eq!(store.get(system).unwrap().max_segment_size(), SEGMENT);
        }
    }
}
