//! Module defining the errors which are exposed to the users of the crate

use crate::{enrichment::LookupError, storage::StorageError};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid CSV, e.g., rows with differing column counts or invalid UTF-8
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Valid CSV that does not fit the expected row schema
    #[error("decode error at line {line}: {message}")]
    Decode { line: u64, message: String },

    /// The place lookup failed for a record
    #[error("lookup failed for row {row} ({name}): {source}")]
    Lookup {
        row: usize,
        name: String,
        #[source]
        source: LookupError,
    },

    /// Reading or writing the object store failed
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The trigger event could not be decoded
    #[error("invalid trigger event: {0}")]
    Event(#[from] serde_json::Error),

    /// Missing or invalid setting, detected before any work starts
    #[error("configuration error: {0}")]
    Config(String),

    /// The run was asked to read from the container it writes its output to
    #[error("refusing to process '{container}': it is the output container and would re-trigger the pipeline")]
    RecursiveTrigger { container: String },

    /// The run was asked to read from a container other than the configured input container
    #[error("refusing to process '{container}': only uploads to '{expected}' are enriched")]
    UnexpectedContainer { container: String, expected: String },

    /// An enrichment task panicked or was cancelled unexpectedly
    #[error("enrichment task failed: {0}")]
    TaskFailed(String),
}

pub(crate) fn decode_error(line: impl Into<u64>, message: impl Into<String>) -> Error {
    Error::Decode {
        line: line.into(),
        message: message.into(),
    }
}

pub(crate) fn config_error(message: impl Into<String>) -> Error {
    Error::Config(message.into())
}
