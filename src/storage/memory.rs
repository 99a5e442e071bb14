use async_trait::async_trait;
use dashmap::DashMap;

use super::{ObjectStore, StorageError, StorageResult};
use crate::domain::StorageLocation;

/// Object store kept in process memory.
#[derive(Default)]
pub struct MemoryStore {
    objects: DashMap<StorageLocation, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an object, e.g. an uploaded input file.
    pub fn with_object(self, location: StorageLocation, bytes: impl Into<Vec<u8>>) -> Self {
        self.objects.insert(location, bytes.into());
        self
    }

    /// Returns a copy of a stored object.
    pub fn object(&self, location: &StorageLocation) -> Option<Vec<u8>> {
        self.objects.get(location).map(|entry| entry.value().clone())
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get(&self, location: &StorageLocation) -> StorageResult<Vec<u8>> {
        self.object(location)
            .ok_or_else(|| StorageError::NotFound(location.clone()))
    }

    async fn put(&self, location: &StorageLocation, bytes: Vec<u8>) -> StorageResult<String> {
        self.objects.insert(location.clone(), bytes);
        Ok(format!("memory://{location}"))
    }
}
