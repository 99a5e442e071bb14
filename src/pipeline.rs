//! Module driving one pipeline run: download, parse, enrich, serialize, upload.

use std::sync::Arc;

use tracing::{Instrument, debug, info, info_span};

use crate::{
    Error,
    config::Config,
    domain::{SessionToken, StorageLocation, output_location_for, same_container},
    engine::EngineOptions,
    enrich_csv,
    enrichment::{Enricher, PlaceLookup},
    storage::{FsStore, ObjectStore},
    trigger::StorageEvent,
};

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Location string reported by the store for the uploaded output.
    pub location: String,
    pub output: StorageLocation,
    pub rows: usize,
    pub resolved: usize,
    pub unresolved: usize,
    pub failed: usize,
}

pub struct Pipeline {
    store: Arc<dyn ObjectStore>,
    enricher: Enricher,
    input_container: String,
    output_container: String,
    engine: EngineOptions,
}

impl Pipeline {
    /// Wires a pipeline from a validated configuration. Fails before any work if the configuration
    /// could make the pipeline trigger itself.
    pub fn new(
        config: &Config,
        store: Arc<dyn ObjectStore>,
        lookup: Arc<dyn PlaceLookup>,
    ) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            store,
            enricher: Enricher::new(lookup).with_query_separator(&config.query_separator),
            input_container: config.input_container.clone(),
            output_container: config.output_container.clone(),
            engine: config.engine.clone(),
        })
    }

    /// Production wiring: filesystem store under `storage_root` and the Google Places client.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let store = Arc::new(FsStore::new(&config.storage_root));
        let lookup = Arc::new(config.places_client()?);
        Self::new(config, store, lookup)
    }

    /// Enriches the dataset at `input` and uploads the result. Nothing is uploaded if any step fails.
    pub async fn run(&self, input: &StorageLocation) -> Result<RunSummary, Error> {
        let span = info_span!("run", container = %input.container, key = %input.key);
        self.run_inner(input).instrument(span).await
    }

    async fn run_inner(&self, input: &StorageLocation) -> Result<RunSummary, Error> {
        if same_container(&input.container, &self.output_container) {
            return Err(Error::RecursiveTrigger {
                container: input.container.clone(),
            });
        }
        if input.container != self.input_container {
            return Err(Error::UnexpectedContainer {
                container: input.container.clone(),
                expected: self.input_container.clone(),
            });
        }

        info!("received input file");
        let raw = self.store.get(input).await?;

        let session = SessionToken::new();
        debug!(bytes = raw.len(), %session, "enriching dataset");
        let (bytes, report) = enrich_csv(&raw, &self.enricher, session, &self.engine).await?;

        let output = output_location_for(input, &self.output_container);
        let location = self.store.put(&output, bytes).await?;

        let summary = RunSummary {
            location,
            output,
            rows: report.records.len(),
            resolved: report.resolved(),
            unresolved: report.unresolved(),
            failed: report.failures.len(),
        };
        info!(
            output = %summary.output,
            rows = summary.rows,
            resolved = summary.resolved,
            unresolved = summary.unresolved,
            failed = summary.failed,
            "enriched output written"
        );
        Ok(summary)
    }

    /// Runs every object of a trigger event in order, stopping at the first failure.
    pub async fn handle_event(&self, event: &StorageEvent) -> Result<Vec<RunSummary>, Error> {
        let mut summaries = Vec::with_capacity(event.records.len());
        for location in event.locations() {
            summaries.push(self.run(&location).await?);
        }
        Ok(summaries)
    }
}
