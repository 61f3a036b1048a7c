//! Persistence for the learned focus model.
//!
//! A store publishes whole snapshots only. The file store writes to a sibling
//! temp file and renames it over the artifact, so a concurrent reader sees
//! either the previous model or the new one, never a partial write.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::error::ModelStoreError;
use crate::learned::{RidgeFocusModel, MODEL_FORMAT_VERSION};

pub trait ModelStore {
    /// `Ok(None)` when no model has been published yet.
    fn load(&self) -> Result<Option<RidgeFocusModel>, ModelStoreError>;

    fn save(&self, model: &RidgeFocusModel) -> Result<(), ModelStoreError>;
}

impl<S: ModelStore + ?Sized> ModelStore for &S {
    fn load(&self) -> Result<Option<RidgeFocusModel>, ModelStoreError> {
        (**self).load()
    }

    fn save(&self, model: &RidgeFocusModel) -> Result<(), ModelStoreError> {
        (**self).save(model)
    }
}

impl<S: ModelStore + ?Sized> ModelStore for Arc<S> {
    fn load(&self) -> Result<Option<RidgeFocusModel>, ModelStoreError> {
        (**self).load()
    }

    fn save(&self, model: &RidgeFocusModel) -> Result<(), ModelStoreError> {
        (**self).save(model)
    }
}

/// Never holds a model. Useful to run the engine permanently heuristic-only.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullModelStore;

impl ModelStore for NullModelStore {
    fn load(&self) -> Result<Option<RidgeFocusModel>, ModelStoreError> {
        Ok(None)
    }

    fn save(&self, _model: &RidgeFocusModel) -> Result<(), ModelStoreError> {
        Ok(())
    }
}

/// In-process store; readers get a clone of the last published snapshot.
#[derive(Debug, Default)]
pub struct MemoryModelStore {
    slot: RwLock<Option<Arc<RidgeFocusModel>>>,
}

impl MemoryModelStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ModelStore for MemoryModelStore {
    fn load(&self) -> Result<Option<RidgeFocusModel>, ModelStoreError> {
        let guard = self.slot.read().unwrap_or_else(|e| e.into_inner());
        Ok(guard.as_deref().cloned())
    }

    fn save(&self, model: &RidgeFocusModel) -> Result<(), ModelStoreError> {
        let snapshot = Arc::new(model.clone());
        let mut guard = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(snapshot);
        Ok(())
    }
}

static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// JSON artifact on disk at a caller-chosen path.
#[derive(Debug, Clone)]
pub struct FileModelStore {
    path: PathBuf,
}

impl FileModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model".to_string());
        self.path
            .with_file_name(format!(".{name}.{}.{seq}.tmp", std::process::id()))
    }
}

impl ModelStore for FileModelStore {
    fn load(&self) -> Result<Option<RidgeFocusModel>, ModelStoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ModelStoreError::io(&self.path, e)),
        };
        let model: RidgeFocusModel = serde_json::from_str(&raw)?;
        if model.version != MODEL_FORMAT_VERSION {
            return Err(ModelStoreError::Version {
                found: model.version,
                expected: MODEL_FORMAT_VERSION,
            });
        }
        Ok(Some(model))
    }

    fn save(&self, model: &RidgeFocusModel) -> Result<(), ModelStoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| ModelStoreError::io(dir, e))?;
        }

        let json = serde_json::to_vec_pretty(model)?;
        let tmp = self.temp_path();

        let write = || -> std::io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&json)?;
            file.sync_all()
        };
        if let Err(e) = write() {
            fs::remove_file(&tmp).ok();
            return Err(ModelStoreError::io(&tmp, e));
        }

        if let Err(e) = fs::rename(&tmp, &self.path) {
            fs::remove_file(&tmp).ok();
            return Err(ModelStoreError::io(&self.path, e));
        }

        tracing::debug!(path = %self.path.display(), "published model snapshot");
        Ok(())
    }
}
