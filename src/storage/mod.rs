//! Object storage used to read uploaded datasets and write enriched ones.

mod fs;
mod memory;
mod select;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::StorageLocation;

pub use fs::FsStore;
pub use memory::MemoryStore;
pub use select::{
    InputSerialization, OutputSerialization, SelectQuery, SelectRequest, SelectStream,
    count_resolved, drain_select,
};


/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object not found: {0}")]
    NotFound(StorageLocation),

    #[error("invalid object location '{location}': {reason}")]
    InvalidLocation {
        location: StorageLocation,
        reason: String,
    },

    #[error("IO error on {location}: {source}")]
    Io {
        location: StorageLocation,
        #[source]
        source: std::io::Error,
    },

    #[error("query failed: {0}")]
    Query(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Object store holding datasets as opaque byte blobs, addressed by container and key.
///
/// Implementations must be thread-safe (Send + Sync) so one store can serve a whole run.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Reads a whole object. Fails with [`StorageError::NotFound`] if it does not exist.
    async fn get(&self, location: &StorageLocation) -> StorageResult<Vec<u8>>;

    /// Writes an object, replacing any existing one, and returns its location string.
    async fn put(&self, location: &StorageLocation, bytes: Vec<u8>) -> StorageResult<String>;

    /// Runs a structured query over a stored CSV object and streams the result in chunks.
    ///
    /// Errors found while evaluating the query arrive through the stream, so callers must check both
    /// the returned result and every chunk. [`drain_select`] does both.
    async fn select(
        &self,
        location: &StorageLocation,
        request: SelectRequest,
    ) -> StorageResult<SelectStream> {
        let bytes = self.get(location).await?;
        Ok(select::spawn_select(bytes, request))
    }
}
