//! Owned cache of loaded synthesis models.
//!
//! Loading a checkpoint is expensive and a loaded model pins device
//! memory, so at most `capacity` models stay resident. The least recently
//! used model is unloaded to make room for a new one.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::EnrollError;

/// Tensor type requested when loading a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dtype {
    Bf16,
    F16,
    F32,
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bf16 => write!(f, "bf16"),
            Self::F16 => write!(f, "f16"),
            Self::F32 => write!(f, "f32"),
        }
    }
}

/// Loads a model checkpoint.
pub trait ModelLoader<M>: Send + Sync {
    /// Loads the checkpoint at `path` with tensors of type `dtype`.
    fn load(&self, name: &str, path: &Path, dtype: Dtype) -> Result<M, EnrollError>;
}

/// Known model names and their checkpoint locations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelCatalog {
    entries: BTreeMap<String, PathBuf>,
}

impl ModelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an entry.
    pub fn insert(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.entries.insert(name.into(), path.into());
    }

    /// Returns the checkpoint path for `name`.
    pub fn get(&self, name: &str) -> Option<&Path> {
        self.entries.get(name).map(PathBuf::as_path)
    }

    /// Returns all model names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>, P: Into<PathBuf>> FromIterator<(N, P)> for ModelCatalog {
    fn from_iter<I: IntoIterator<Item = (N, P)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(n, p)| (n.into(), p.into()))
                .collect(),
        }
    }
}

/// Configuration for [`ModelCache`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelCacheConfig {
    /// Maximum number of resident models (default: 1). 0 is treated as 1.
    pub capacity: usize,
    /// Tensor types to try, in order, until one loads (default: bf16, f16, f32).
    pub preferred_dtypes: Vec<Dtype>,
}

impl Default for ModelCacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1,
            preferred_dtypes: vec![Dtype::Bf16, Dtype::F16, Dtype::F32],
        }
    }
}

/// LRU cache of loaded models.
///
/// Thread-safe: concurrent `get` calls for a missing model load it once;
/// loads are serialized.
pub struct ModelCache<M, L> {
    catalog: ModelCatalog,
    loader: L,
    capacity: usize,
    dtypes: Vec<Dtype>,
    // Least recently used first.
    resident: Mutex<Vec<(String, Arc<M>)>>,
}

impl<M, L: ModelLoader<M>> ModelCache<M, L> {
    /// Creates an empty cache with default configuration.
    pub fn new(catalog: ModelCatalog, loader: L) -> Self {
        Self::with_config(catalog, loader, ModelCacheConfig::default())
    }

    /// Creates an empty cache.
    pub fn with_config(catalog: ModelCatalog, loader: L, cfg: ModelCacheConfig) -> Self {
        let dtypes = if cfg.preferred_dtypes.is_empty() {
            ModelCacheConfig::default().preferred_dtypes
        } else {
            cfg.preferred_dtypes
        };
        Self {
            catalog,
            loader,
            capacity: cfg.capacity.max(1),
            dtypes,
            resident: Mutex::new(Vec::new()),
        }
    }

    /// Returns the model named `name`, loading it if it is not resident.
    pub fn get(&self, name: &str) -> Result<Arc<M>, EnrollError> {
        let mut resident = self.resident.lock();

        if let Some(pos) = resident.iter().position(|(n, _)| n == name) {
            let entry = resident.remove(pos);
            let model = Arc::clone(&entry.1);
            resident.push(entry);
            return Ok(model);
        }

        let path = self.catalog.get(name).ok_or_else(|| EnrollError::UnknownModel {
            name: name.to_string(),
            available: self.catalog.names().join(", "),
        })?;
        if !path.exists() {
            return Err(EnrollError::ModelNotFound(path.display().to_string()));
        }

        while resident.len() >= self.capacity {
            let (old, _) = resident.remove(0);
            info!(model = %old, "enroll: unloaded model");
        }

        let mut last_err = None;
        for &dtype in &self.dtypes {
            match self.loader.load(name, path, dtype) {
                Ok(m) => {
                    info!(model = name, %dtype, "enroll: loaded model");
                    let model = Arc::new(m);
                    resident.push((name.to_string(), Arc::clone(&model)));
                    return Ok(model);
                }
                Err(e) => {
                    debug!(model = name, %dtype, error = %e, "enroll: load attempt failed");
                    last_err = Some(e);
                }
            }
        }

        Err(EnrollError::ModelLoad {
            name: name.to_string(),
            reason: last_err.map(|e| e.to_string()).unwrap_or_default(),
        })
    }

    /// Unloads `name`. Returns true if it was resident.
    pub fn evict(&self, name: &str) -> bool {
        let mut resident = self.resident.lock();
        match resident.iter().position(|(n, _)| n == name) {
            Some(pos) => {
                resident.remove(pos);
                info!(model = name, "enroll: unloaded model");
                true
            }
            None => false,
        }
    }

    /// Unloads every model.
    pub fn clear(&self) {
        self.resident.lock().clear();
    }

    /// Returns the names of resident models, least recently used first.
    pub fn loaded(&self) -> Vec<String> {
        self.resident.lock().iter().map(|(n, _)| n.clone()).collect()
    }

    /// Returns the number of resident models.
    pub fn len(&self) -> usize {
        self.resident.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct FakeModel {
        name: String,
        dtype: Dtype,
    }

    /// Fails for every dtype not in `accepts`; counts attempts.
    struct FakeLoader {
        accepts: Vec<Dtype>,
        attempts: AtomicUsize,
    }

    impl FakeLoader {
        fn accepting(accepts: &[Dtype]) -> Self {
            Self {
                accepts: accepts.to_vec(),
                attempts: AtomicUsize::new(0),
            }
        }
    }

    impl ModelLoader<FakeModel> for FakeLoader {
        fn load(&self, name: &str, _path: &Path, dtype: Dtype) -> Result<FakeModel, EnrollError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.accepts.contains(&dtype) {
                Ok(FakeModel {
                    name: name.to_string(),
                    dtype,
                })
            } else {
                Err(EnrollError::Model(format!("{dtype} unsupported")))
            }
        }
    }

    fn catalog(dir: &Path, names: &[&str]) -> ModelCatalog {
        names
            .iter()
            .map(|n| {
                let p = dir.join(n);
                std::fs::create_dir_all(&p).unwrap();
                (n.to_string(), p)
            })
            .collect()
    }

    #[test]
    fn hit_returns_same_instance() {
        let dir = tempfile::tempdir().unwrap();
        let cache: ModelCache<FakeModel, _> = ModelCache::new(
            catalog(dir.path(), &["base"]),
            FakeLoader::accepting(&[Dtype::Bf16]),
        );
        let a = cache.get("base").unwrap();
        let b = cache.get("base").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.name, "base");
        assert_eq!(cache.loader.attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn single_entry_evicts_previous() {
        let dir = tempfile::tempdir().unwrap();
        let cache: ModelCache<FakeModel, _> = ModelCache::new(
            catalog(dir.path(), &["base", "custom"]),
            FakeLoader::accepting(&[Dtype::Bf16]),
        );
        let first = cache.get("base").unwrap();
        cache.get("custom").unwrap();
        assert_eq!(cache.loaded(), vec!["custom".to_string()]);
        // Evicted models stay usable by holders.
        assert_eq!(first.name, "base");
    }

    #[test]
    fn lru_order_is_tracked() {
        let dir = tempfile::tempdir().unwrap();
        let cache: ModelCache<FakeModel, _> = ModelCache::with_config(
            catalog(dir.path(), &["a", "b", "c"]),
            FakeLoader::accepting(&[Dtype::F32]),
            ModelCacheConfig {
                capacity: 2,
                ..Default::default()
            },
        );
        cache.get("a").unwrap();
        cache.get("b").unwrap();
        cache.get("a").unwrap();
        cache.get("c").unwrap();
        assert_eq!(cache.loaded(), vec!["a".to_string(), "c".to_string()]);
        assert!(cache.evict("a"));
        assert!(!cache.evict("a"));
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn dtypes_are_tried_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let cache: ModelCache<FakeModel, _> = ModelCache::new(
            catalog(dir.path(), &["base"]),
            FakeLoader::accepting(&[Dtype::F32]),
        );
        let m = cache.get("base").unwrap();
        assert_eq!(m.dtype, Dtype::F32);
        assert_eq!(cache.loader.attempts.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn all_dtypes_failing_reports_last_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache: ModelCache<FakeModel, _> = ModelCache::new(
            catalog(dir.path(), &["base"]),
            FakeLoader::accepting(&[]),
        );
        let err = cache.get("base").unwrap_err();
        match err {
            EnrollError::ModelLoad { name, reason } => {
                assert_eq!(name, "base");
                assert!(reason.contains("f32 unsupported"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(cache.is_empty());
    }

    #[test]
    fn unknown_and_missing_models() {
        let dir = tempfile::tempdir().unwrap();
        let mut cat = catalog(dir.path(), &["base"]);
        cat.insert("ghost", dir.path().join("does-not-exist"));
        let cache: ModelCache<FakeModel, _> =
            ModelCache::new(cat, FakeLoader::accepting(&[Dtype::Bf16]));

        match cache.get("nope").unwrap_err() {
            EnrollError::UnknownModel { available, .. } => assert_eq!(available, "base, ghost"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(cache.get("ghost").unwrap_err(), EnrollError::ModelNotFound(_)));
    }

    #[test]
    fn zero_capacity_keeps_one() {
        let dir = tempfile::tempdir().unwrap();
        let cache: ModelCache<FakeModel, _> = ModelCache::with_config(
            catalog(dir.path(), &["a"]),
            FakeLoader::accepting(&[Dtype::Bf16]),
            ModelCacheConfig {
                capacity: 0,
                preferred_dtypes: Vec::new(),
            },
        );
        cache.get("a").unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn catalog_serializes_as_map() {
        let cat: ModelCatalog = [("base", "./ckpt/base")].into_iter().collect();
        let json = serde_json::to_string(&cat).unwrap();
        assert_eq!(json, r#"{"base":"./ckpt/base"}"#);
    }
}
