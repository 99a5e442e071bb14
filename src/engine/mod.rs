//! Module for the concurrent enrichment of a whole dataset

use std::{fmt, str::FromStr};

use crate::{domain::BusinessRecord, enrichment::LookupError};

mod orchestration;

pub use orchestration::enrich_all;


/// Default number of lookups allowed to run at the same time.
pub const DEFAULT_MAX_CONCURRENCY: usize = 256;

/// What a failed lookup does to the rest of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// The first failure cancels all other lookups and fails the run.
    #[default]
    Abort,
    /// Failed records keep empty fields and are reported; the other records still complete.
    Isolate,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "isolate" => Ok(Self::Isolate),
            other => Err(format!(
                "unknown failure policy '{other}', expected 'abort' or 'isolate'"
            )),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Abort => write!(f, "abort"),
            Self::Isolate => write!(f, "isolate"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub max_concurrency: usize,
    pub failure_policy: FailurePolicy,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            failure_policy: FailurePolicy::default(),
        }
    }
}

/// A record whose lookup failed under [`FailurePolicy::Isolate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFailure {
    /// 1-based position of the record among the data rows.
    pub row: usize,
    pub name: String,
    pub error: LookupError,
}

/// The enriched dataset, in input order, plus the failures that did not abort the run.
#[derive(Debug)]
pub struct EnrichmentReport {
    pub records: Vec<BusinessRecord>,
    pub failures: Vec<RecordFailure>,
}

impl EnrichmentReport {
    /// Records that got a candidate.
    pub fn resolved(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.enrichment().is_resolved())
            .count()
    }

    /// Records that completed without a candidate. Failed records are not counted.
    pub fn unresolved(&self) -> usize {
        self.records.len() - self.resolved() - self.failures.len()
    }
}
