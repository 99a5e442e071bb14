use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use super::{ObjectStore, StorageError, StorageResult};
use crate::domain::{StorageLocation, check_container_name};

/// Filesystem object store: each container is a directory under `root`, each key a relative path
/// inside it.
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Create a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, location: &StorageLocation) -> StorageResult<PathBuf> {
        check_container_name(&location.container).map_err(|problem| {
            StorageError::InvalidLocation {
                location: location.clone(),
                reason: format!("container {problem}"),
            }
        })?;
        ensure_relative(location, &location.key, "key")?;
        Ok(self.root.join(&location.container).join(&location.key))
    }
}

fn ensure_relative(location: &StorageLocation, part: &str, what: &str) -> StorageResult<()> {
    let invalid = |reason: String| StorageError::InvalidLocation {
        location: location.clone(),
        reason,
    };
    if part.trim().is_empty() {
        return Err(invalid(format!("{what} is empty")));
    }
    let escapes = Path::new(part)
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(invalid(format!(
            "{what} must be a relative path without '..'"
        )));
    }
    Ok(())
}

fn io_error(location: &StorageLocation, source: std::io::Error) -> StorageError {
    if source.kind() == std::io::ErrorKind::NotFound {
        StorageError::NotFound(location.clone())
    } else {
        StorageError::Io {
            location: location.clone(),
            source,
        }
    }
}

#[async_trait]
impl ObjectStore for FsStore {
    async fn get(&self, location: &StorageLocation) -> StorageResult<Vec<u8>> {
        let path = self.path_for(location)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| io_error(location, e))
    }

    async fn put(&self, location: &StorageLocation, bytes: Vec<u8>) -> StorageResult<String> {
        let path = self.path_for(location)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StorageError::Io {
                    location: location.clone(),
                    source,
                })?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| StorageError::Io {
                location: location.clone(),
                source,
            })?;
        Ok(path.display().to_string())
    }
}
