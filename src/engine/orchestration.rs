//! Module focusing on the way lookups are fanned out over tasks and joined back into the dataset

use std::sync::Arc;

use tokio::{sync::Semaphore, task::JoinSet};
use tracing::{debug, error, warn};

use super::{EngineOptions, EnrichmentReport, FailurePolicy, RecordFailure};
use crate::{
    Error,
    domain::{BusinessRecord, EnrichedFields, SessionToken},
    enrichment::{Enricher, LookupError},
};

type TaskOutput = (usize, Result<EnrichedFields, LookupError>);

///
/// Enriches every record with one task per record and waits for all of them before returning.
///
/// At most `options.max_concurrency` lookups run at the same time. Every task uses the same
/// `session`. Results are written back by index, so the output order is the input order no matter
/// in which order the lookups finish.
///
pub async fn enrich_all(
    mut records: Vec<BusinessRecord>,
    enricher: &Enricher,
    session: SessionToken,
    options: &EngineOptions,
) -> Result<EnrichmentReport, Error> {
    let semaphore = Arc::new(Semaphore::new(options.max_concurrency.clamp(1, Semaphore::MAX_PERMITS)));
    let mut join_set: JoinSet<TaskOutput> = JoinSet::new();

    debug!(
        records = records.len(),
        max_concurrency = options.max_concurrency,
        policy = %options.failure_policy,
        "spawning enrichment tasks"
    );

    for (index, record) in records.iter().enumerate() {
        let query = enricher.query_for(record);
        let enricher = enricher.clone();
        let semaphore = semaphore.clone();

        join_set.spawn(async move {
            let result = match semaphore.acquire_owned().await {
                Ok(_permit) => enricher.resolve(&query, session).await,
                Err(e) => Err(LookupError::Transport(format!("lookup slots closed: {e}"))),
            };
            (index, result)
        });
    }

    let mut slots: Vec<Option<Result<EnrichedFields, LookupError>>> = vec![None; records.len()];
    let mut first_error: Option<Error> = None;

    // Drain everything, even after a failure, so no task outlives this call.
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((index, Ok(fields))) => slots[index] = Some(Ok(fields)),
            Ok((index, Err(source))) => match options.failure_policy {
                FailurePolicy::Isolate => {
                    warn!(row = index + 1, name = records[index].name(), %source, "lookup failed, keeping record unresolved");
                    slots[index] = Some(Err(source));
                }
                FailurePolicy::Abort if first_error.is_none() => {
                    error!(row = index + 1, name = records[index].name(), %source, "lookup failed, aborting run");
                    first_error = Some(Error::Lookup {
                        row: index + 1,
                        name: records[index].name().to_string(),
                        source,
                    });
                    join_set.abort_all();
                }
                FailurePolicy::Abort => {}
            },
            Err(join_err) if join_err.is_cancelled() && first_error.is_some() => {
                // Expected: siblings cancelled after the first failure.
            }
            Err(join_err) => {
                if first_error.is_none() {
                    first_error = Some(Error::TaskFailed(join_err.to_string()));
                    join_set.abort_all();
                }
            }
        }
    }

    if let Some(err) = first_error {
        return Err(err);
    }

    let mut failures = Vec::new();
    for (index, (record, slot)) in records.iter_mut().zip(slots).enumerate() {
        match slot {
            Some(Ok(fields)) => record
                .apply_enrichment(fields)
                .map_err(|msg| Error::TaskFailed(format!("row {}: {msg}", index + 1)))?,
            Some(Err(error)) => failures.push(RecordFailure {
                row: index + 1,
                name: record.name().to_string(),
                error,
            }),
            None => {
                return Err(Error::TaskFailed(format!(
                    "row {} finished without a result",
                    index + 1
                )));
            }
        }
    }

    Ok(EnrichmentReport { records, failures })
}
