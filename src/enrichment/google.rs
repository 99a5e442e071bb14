//! HTTP client for the Google Places autocomplete and details endpoints.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{LookupError, PlaceCandidate, PlaceDetails, PlaceLookup};
use crate::domain::SessionToken;

pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";

const DETAILS_FIELDS: &str = "formatted_address,international_phone_number,website";
const STATUS_OK: &str = "OK";
const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";

pub struct GooglePlacesClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GooglePlacesClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LookupError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(transport_error)?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T, LookupError> {
        self.http
            .get(format!("{}/{endpoint}/json", self.base_url))
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(transport_error)?
            .json::<T>()
            .await
            .map_err(transport_error)
    }
}

#[async_trait]
impl PlaceLookup for GooglePlacesClient {
    async fn autocomplete(
        &self,
        query: &str,
        session: SessionToken,
    ) -> Result<Vec<PlaceCandidate>, LookupError> {
        let session = session.to_string();
        let response: AutocompleteResponse = self
            .get_json(
                "autocomplete",
                &[("input", query), ("sessiontoken", session.as_str())],
            )
            .await?;
        response.into_candidates()
    }

    async fn details(&self, place_id: &str) -> Result<PlaceDetails, LookupError> {
        let response: DetailsResponse = self
            .get_json(
                "details",
                &[("place_id", place_id), ("fields", DETAILS_FIELDS)],
            )
            .await?;
        response.into_details()
    }
}

// The request URL carries the API key, so it never goes into the error text.
fn transport_error(err: reqwest::Error) -> LookupError {
    let err = err.without_url();
    if err.is_decode() {
        LookupError::Decode(err.to_string())
    } else {
        LookupError::Transport(err.to_string())
    }
}

fn service_error(status: String, message: Option<String>) -> LookupError {
    LookupError::Service {
        status,
        message: message.unwrap_or_default(),
    }
}

// Wire shapes of the two endpoints. Only the fields the pipeline uses are declared.

#[derive(Debug, Deserialize)]
struct AutocompleteResponse {
    status: String,
    #[serde(default)]
    predictions: Vec<Prediction>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    place_id: String,
}

impl AutocompleteResponse {
    fn into_candidates(self) -> Result<Vec<PlaceCandidate>, LookupError> {
        match self.status.as_str() {
            STATUS_OK => Ok(self
                .predictions
                .into_iter()
                .map(|p| PlaceCandidate {
                    place_id: p.place_id,
                })
                .collect()),
            STATUS_ZERO_RESULTS => Ok(Vec::new()),
            _ => Err(service_error(self.status, self.error_message)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    status: String,
    result: Option<DetailsResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResult {
    formatted_address: Option<String>,
    international_phone_number: Option<String>,
    website: Option<String>,
}

impl DetailsResponse {
    fn into_details(self) -> Result<PlaceDetails, LookupError> {
        if self.status != STATUS_OK {
            return Err(service_error(self.status, self.error_message));
        }
        let result = self
            .result
            .ok_or_else(|| LookupError::Decode("details response without result".to_string()))?;
        Ok(PlaceDetails {
            formatted_address: result.formatted_address,
            international_phone_number: result.international_phone_number,
            website: result.website,
        })
    }
}
