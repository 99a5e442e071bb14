//! Module for the types defining the enrichment domain.

mod record;

use std::fmt;

use uuid::Uuid;

pub use record::{BusinessRecord, EnrichedFields};

/// Prefix prepended to the input key to build the output key.
pub(crate) const OUTPUT_KEY_PREFIX: &str = "output-";

/// Correlation value threaded through every lookup of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionToken(Uuid);

impl SessionToken {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where an object lives in the object store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageLocation {
    pub container: String,
    pub key: String,
}

impl StorageLocation {
    pub fn new(container: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.container, self.key)
    }
}

/// Checks that `name` is usable as a container: one plain path segment, so two distinct names can
/// never address the same or nested storage.
pub(crate) fn check_container_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("must not be empty".to_string());
    }
    if name != name.trim() {
        return Err(format!("'{name}' must not have surrounding whitespace"));
    }
    if name.contains(['/', '\\']) {
        return Err(format!("'{name}' must not contain a path separator"));
    }
    if name == "." || name == ".." {
        return Err(format!("'{name}' is not a container name"));
    }
    Ok(())
}

/// Whether two container names address the same container, also on case-insensitive storage.
pub(crate) fn same_container(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Derives the location of the enriched output for a given input object.
pub fn output_location_for(input: &StorageLocation, output_container: &str) -> StorageLocation {
    StorageLocation::new(output_container, format!("{OUTPUT_KEY_PREFIX}{}", input.key))
}
