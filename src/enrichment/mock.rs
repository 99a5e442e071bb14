//! In-memory place lookup returning preconfigured answers, for tests and benchmarks.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use dashmap::DashMap;

use super::{LookupError, PlaceCandidate, PlaceDetails, PlaceLookup};
use crate::domain::SessionToken;

/// Queries without a registered answer resolve to no candidate.
#[derive(Default)]
pub struct MockLookup {
    candidates: HashMap<String, Vec<String>>,
    details: HashMap<String, PlaceDetails>,
    failing_queries: HashMap<String, LookupError>,
    delays: HashMap<String, Duration>,

    autocomplete_calls: DashMap<String, usize>,
    details_calls: AtomicUsize,
    sessions: DashMap<SessionToken, usize>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a query that resolves to `place_id` with the given details.
    pub fn with_place(
        mut self,
        query: impl Into<String>,
        place_id: impl Into<String>,
        details: PlaceDetails,
    ) -> Self {
        let place_id = place_id.into();
        self.candidates
            .entry(query.into())
            .or_default()
            .push(place_id.clone());
        self.details.insert(place_id, details);
        self
    }

    /// Registers a candidate for `query` without details, so the details call fails.
    pub fn with_candidate(mut self, query: impl Into<String>, place_id: impl Into<String>) -> Self {
        self.candidates
            .entry(query.into())
            .or_default()
            .push(place_id.into());
        self
    }

    /// Registers a query whose autocomplete call fails.
    pub fn with_failure(mut self, query: impl Into<String>, error: LookupError) -> Self {
        self.failing_queries.insert(query.into(), error);
        self
    }

    /// Delays the autocomplete answer for a query, to shuffle completion order.
    pub fn with_delay(mut self, query: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(query.into(), delay);
        self
    }

    /// Number of autocomplete calls made for `query`.
    pub fn autocomplete_calls(&self, query: &str) -> usize {
        self.autocomplete_calls.get(query).map(|c| *c).unwrap_or(0)
    }

    pub fn details_calls(&self) -> usize {
        self.details_calls.load(Ordering::SeqCst)
    }

    /// Distinct session tokens seen by autocomplete calls.
    pub fn sessions_seen(&self) -> Vec<SessionToken> {
        self.sessions.iter().map(|entry| *entry.key()).collect()
    }

    /// Highest number of autocomplete calls that were running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlaceLookup for MockLookup {
    async fn autocomplete(
        &self,
        query: &str,
        session: SessionToken,
    ) -> Result<Vec<PlaceCandidate>, LookupError> {
        *self
            .autocomplete_calls
            .entry(query.to_string())
            .or_default() += 1;
        *self.sessions.entry(session).or_default() += 1;

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        // Yield at least once so concurrently spawned calls overlap.
        match self.delays.get(query) {
            Some(delay) => tokio::time::sleep(*delay).await,
            None => tokio::task::yield_now().await,
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(error) = self.failing_queries.get(query) {
            return Err(error.clone());
        }

        Ok(self
            .candidates
            .get(query)
            .map(|ids| {
                ids.iter()
                    .map(|id| PlaceCandidate {
                        place_id: id.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn details(&self, place_id: &str) -> Result<PlaceDetails, LookupError> {
        self.details_calls.fetch_add(1, Ordering::SeqCst);
        self.details
            .get(place_id)
            .cloned()
            .ok_or_else(|| LookupError::Service {
                status: "NOT_FOUND".to_string(),
                message: format!("no mock details for place '{place_id}'"),
            })
    }
}
