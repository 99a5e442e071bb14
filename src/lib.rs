mod config;
mod domain;
mod engine;
mod enrichment;
mod error;
mod input;
mod output;
mod pipeline;
mod storage;
mod telemetry;
mod trigger;

pub use config::{
    Config, ENV_API_KEY, ENV_BASE_URL, ENV_FAILURE_POLICY, ENV_INPUT_CONTAINER,
    ENV_LOOKUP_TIMEOUT, ENV_MAX_CONCURRENCY, ENV_OUTPUT_CONTAINER, ENV_QUERY_SEPARATOR,
    ENV_STORAGE_ROOT,
};
pub use domain::{BusinessRecord, EnrichedFields, SessionToken, StorageLocation, output_location_for};
pub use engine::{
    DEFAULT_MAX_CONCURRENCY, EngineOptions, EnrichmentReport, FailurePolicy, RecordFailure,
    enrich_all,
};
pub use enrichment::{
    DEFAULT_BASE_URL, Enricher, GooglePlacesClient, LookupError, PlaceCandidate, PlaceDetails,
    PlaceLookup, build_query,
};
/// Test double for [`PlaceLookup`], used by the integration tests and benchmarks.
#[doc(hidden)]
pub use enrichment::MockLookup;
pub use error::Error;
pub use output::OUTPUT_HEADER;
pub use pipeline::{Pipeline, RunSummary};
pub use storage::{
    FsStore, InputSerialization, MemoryStore, ObjectStore, OutputSerialization, SelectQuery,
    SelectRequest, SelectStream, StorageError, StorageResult, count_resolved, drain_select,
};
pub use telemetry::setup_logging;
pub use trigger::StorageEvent;

/// Enriches a CSV dataset held in memory and returns the serialized enriched dataset together with
/// the report of the enrichment.
///
/// The first row of `raw` is a header and is skipped. Every data row is looked up concurrently
/// through `enricher`, all lookups sharing `session`. The output starts with [`OUTPUT_HEADER`] and
/// keeps the rows in input order.
///
/// # Error handling
///
/// Malformed input fails the whole call before any lookup is made. A failing lookup either fails
/// the call or is reported in [`EnrichmentReport::failures`], depending on
/// [`EngineOptions::failure_policy`]. Records for which the lookup finds no candidate are not
/// errors; their enriched columns stay empty.
///
/// # Example
///
/// ```no_run
/// use std::{sync::Arc, time::Duration};
/// use place_enricher::{
///     DEFAULT_BASE_URL, EngineOptions, Enricher, GooglePlacesClient, SessionToken, enrich_csv,
/// };
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let client = GooglePlacesClient::new("api-key", DEFAULT_BASE_URL, Duration::from_secs(10))?;
/// let enricher = Enricher::new(Arc::new(client));
/// let raw = b"Business Name,City,Province\nAcme,Springfield,ON\n";
///
/// let (bytes, report) =
///     enrich_csv(raw, &enricher, SessionToken::new(), &EngineOptions::default()).await?;
/// eprintln!("{} of {} rows resolved", report.resolved(), report.records.len());
/// print!("{}", String::from_utf8_lossy(&bytes));
/// # Ok(())
/// # }
/// ```
pub async fn enrich_csv(
    raw: &[u8],
    enricher: &Enricher,
    session: SessionToken,
    options: &EngineOptions,
) -> Result<(Vec<u8>, EnrichmentReport), Error> {
    let records = input::parse_dataset(raw)?;
    let report = enrich_all(records, enricher, session, options).await?;
    let bytes = output::serialize_records(&report.records)?;
    Ok((bytes, report))
}
