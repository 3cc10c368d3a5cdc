//! Shared configuration store.
//!
//! Readers take an `Arc<EngineConfig>` snapshot and never block writers for
//! longer than an `Arc` clone. Writers are serialised by a single mutex
//! around read → merge → validate → persist → publish.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use atomic_write_file::AtomicWriteFile;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;

use super::EngineConfig;
use crate::Result;

/// Merge `patch` into `base` in place.
///
/// Objects merge key by key, recursively. A `null` in the patch leaves the
/// base value untouched. Anything else (scalars, arrays) replaces.
pub fn merge_json(base: &mut Value, patch: &Value) {
    match (base, patch) {
        (_, Value::Null) => {}
        (Value::Object(base_map), Value::Object(patch_map)) => {
            for (key, patch_value) in patch_map {
                match base_map.get_mut(key) {
                    Some(existing) => merge_json(existing, patch_value),
                    None => {
                        if !patch_value.is_null() {
                            base_map.insert(key.clone(), patch_value.clone());
                        }
                    }
                }
            }
        }
        (base, patch) => *base = patch.clone(),
    }
}

struct WriterState {
    path: Option<PathBuf>,
    revision: u64,
    saved_at: Option<DateTime<Utc>>,
}

struct Inner {
    current: RwLock<Arc<EngineConfig>>,
    writer: Mutex<WriterState>,
}

/// Cheaply cloneable handle; clones share one configuration.
#[derive(Clone)]
pub struct ConfigStore {
    inner: Arc<Inner>,
}

impl ConfigStore {
    /// A store with no backing file. `save` still merges and publishes.
    pub fn in_memory(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, None))
    }

    /// Load from a JSON file. A missing file yields the defaults; the file
    /// is created on the first `save`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let config = match std::fs::read_to_string(&path) {
            Ok(text) => EngineConfig::from_json(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "config file not found, using defaults");
                EngineConfig::default()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self::build(config, Some(path)))
    }

    fn build(config: EngineConfig, path: Option<PathBuf>) -> Self {
        Self {
            inner: Arc::new(Inner {
                current: RwLock::new(Arc::new(config)),
                writer: Mutex::new(WriterState { path, revision: 0, saved_at: None }),
            }),
        }
    }

    /// The current configuration. Later saves do not affect the returned value.
    pub fn snapshot(&self) -> Arc<EngineConfig> {
        Arc::clone(&self.inner.current.read())
    }

    /// Deep-merge a partial JSON document into the current configuration,
    /// validate, persist (when file-backed) and publish.
    ///
    /// On any failure the published configuration is unchanged.
    pub fn save(&self, patch: &Value) -> Result<Arc<EngineConfig>> {
        let mut writer = self.inner.writer.lock();

        let mut merged = serde_json::to_value(&*self.snapshot())?;
        merge_json(&mut merged, patch);
        let config: EngineConfig = serde_json::from_value(merged)?;
        config.validate()?;

        self.commit(&mut writer, config)
    }

    /// Replace the whole configuration.
    pub fn replace(&self, config: EngineConfig) -> Result<Arc<EngineConfig>> {
        let mut writer = self.inner.writer.lock();
        config.validate()?;
        self.commit(&mut writer, config)
    }

    fn commit(&self, writer: &mut WriterState, config: EngineConfig) -> Result<Arc<EngineConfig>> {
        if let Some(path) = &writer.path {
            persist(path, &config)?;
        }
        let published = Arc::new(config);
        *self.inner.current.write() = Arc::clone(&published);
        writer.revision += 1;
        writer.saved_at = Some(Utc::now());
        tracing::debug!(revision = writer.revision, "config published");
        Ok(published)
    }

    /// Number of successful saves since the store was created.
    pub fn revision(&self) -> u64 {
        self.inner.writer.lock().revision
    }

    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.inner.writer.lock().saved_at
    }

    pub fn path(&self) -> Option<PathBuf> {
        self.inner.writer.lock().path.clone()
    }
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("path", &self.path())
            .field("revision", &self.revision())
            .finish()
    }
}

/// Write atomically: the target is either the old file or the new one.
fn persist(path: &Path, config: &EngineConfig) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = AtomicWriteFile::open(path)?;
    serde_json::to_writer_pretty(&mut file, config)?;
    file.commit()?;
    Ok(())
}
