//! Module resolving a business record against the place-lookup service.
//!
//! A lookup is two sequential calls: an autocomplete request that turns a free-text query into ranked
//! candidates, then a details request for the best candidate. Both calls of one run share a
//! [`SessionToken`].

mod google;
mod mock;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::{BusinessRecord, EnrichedFields, SessionToken};

pub use google::{DEFAULT_BASE_URL, GooglePlacesClient};
pub use mock::MockLookup;


/// A ranked match returned by the autocomplete call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceCandidate {
    pub place_id: String,
}

/// Contact data returned by the details call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceDetails {
    pub formatted_address: Option<String>,
    pub international_phone_number: Option<String>,
    pub website: Option<String>,
}

/// Errors from the place-lookup service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// The request never produced a usable HTTP response
    #[error("transport error: {0}")]
    Transport(String),
    /// The service answered with a non-success status
    #[error("service returned {status}: {message}")]
    Service { status: String, message: String },
    /// The response body did not have the expected shape
    #[error("malformed response: {0}")]
    Decode(String),
}

/// Client seam for the place-lookup service, so the engine can run against fakes.
#[async_trait]
pub trait PlaceLookup: Send + Sync {
    /// Maps a free-text query to candidates, best match first.
    async fn autocomplete(
        &self,
        query: &str,
        session: SessionToken,
    ) -> Result<Vec<PlaceCandidate>, LookupError>;

    /// Fetches address and contact data for a place.
    async fn details(&self, place_id: &str) -> Result<PlaceDetails, LookupError>;
}

/// Builds the free-text search string for a record.
///
/// With an empty separator the fields are glued together as-is ("Acme BakerySpringfieldON"), which is
/// what existing match quality was measured against.
pub fn build_query(record: &BusinessRecord, separator: &str) -> String {
    [record.name(), record.city(), record.region()].join(separator)
}

/// Resolves records through a [`PlaceLookup`]. Cheap to clone; clones share the lookup client.
#[derive(Clone)]
pub struct Enricher {
    lookup: Arc<dyn PlaceLookup>,
    query_separator: String,
}

impl Enricher {
    pub fn new(lookup: Arc<dyn PlaceLookup>) -> Self {
        Self {
            lookup,
            query_separator: String::new(),
        }
    }

    /// Sets the string placed between name, city and region in the search query.
    pub fn with_query_separator(mut self, separator: impl Into<String>) -> Self {
        self.query_separator = separator.into();
        self
    }

    pub fn query_for(&self, record: &BusinessRecord) -> String {
        build_query(record, &self.query_separator)
    }

    /// Looks up a single record. No candidate is a success with empty fields.
    pub async fn enrich(
        &self,
        record: &BusinessRecord,
        session: SessionToken,
    ) -> Result<EnrichedFields, LookupError> {
        self.resolve(&self.query_for(record), session).await
    }

    /// Runs autocomplete for `query`, then fetches details for the first candidate.
    pub async fn resolve(
        &self,
        query: &str,
        session: SessionToken,
    ) -> Result<EnrichedFields, LookupError> {
        let candidates = self.lookup.autocomplete(query, session).await?;
        let Some(best) = candidates.into_iter().next() else {
            debug!(query, "no candidate found");
            return Ok(EnrichedFields::default());
        };

        let details = self.lookup.details(&best.place_id).await?;
        debug!(query, place_id = %best.place_id, "candidate resolved");

        Ok(EnrichedFields {
            place_id: Some(best.place_id),
            address: details.formatted_address,
            phone: details.international_phone_number,
            website: details.website,
        })
    }
}
