//! Module for the runtime configuration of the pipeline, read from the process environment.

use std::{path::PathBuf, str::FromStr, time::Duration};

use tokio::sync::Semaphore;

use crate::{
    Error,
    domain::{check_container_name, same_container},
    engine::EngineOptions,
    enrichment::{DEFAULT_BASE_URL, GooglePlacesClient},
    error::config_error,
};

pub const ENV_INPUT_CONTAINER: &str = "INPUT_CONTAINER";
pub const ENV_OUTPUT_CONTAINER: &str = "OUTPUT_CONTAINER";
pub const ENV_API_KEY: &str = "PLACES_API_KEY";
pub const ENV_BASE_URL: &str = "PLACES_BASE_URL";
pub const ENV_STORAGE_ROOT: &str = "STORAGE_ROOT";
pub const ENV_MAX_CONCURRENCY: &str = "ENRICH_MAX_CONCURRENCY";
pub const ENV_FAILURE_POLICY: &str = "ENRICH_FAILURE_POLICY";
pub const ENV_QUERY_SEPARATOR: &str = "QUERY_SEPARATOR";
pub const ENV_LOOKUP_TIMEOUT: &str = "LOOKUP_TIMEOUT_SECS";

const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Container whose uploads trigger the pipeline.
    pub input_container: String,
    /// Container receiving enriched output. Never equal to `input_container`.
    pub output_container: String,
    pub api_key: String,
    pub base_url: String,
    pub storage_root: PathBuf,
    pub engine: EngineOptions,
    pub query_separator: String,
    pub lookup_timeout: Duration,
}

impl Config {
    /// Creates a configuration with defaults for every optional setting. Not validated yet.
    pub fn new(
        input_container: impl Into<String>,
        output_container: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            input_container: input_container.into(),
            output_container: output_container.into(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            storage_root: PathBuf::from("."),
            engine: EngineOptions::default(),
            query_separator: String::new(),
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    pub fn with_engine(mut self, engine: EngineOptions) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_query_separator(mut self, separator: impl Into<String>) -> Self {
        self.query_separator = separator.into();
        self
    }

    pub fn with_storage_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.storage_root = root.into();
        self
    }

    /// Reads and validates the configuration from the process environment.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`Config::from_env`] but with a custom variable source.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let required = |name: &str| {
            var(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| config_error(format!("{name} must be set")))
        };

        let mut config = Self::new(
            required(ENV_INPUT_CONTAINER)?,
            required(ENV_OUTPUT_CONTAINER)?,
            required(ENV_API_KEY)?,
        );

        if let Some(base_url) = var(ENV_BASE_URL) {
            config.base_url = base_url;
        }
        if let Some(root) = var(ENV_STORAGE_ROOT) {
            config.storage_root = PathBuf::from(root);
        }
        if let Some(separator) = var(ENV_QUERY_SEPARATOR) {
            config.query_separator = separator;
        }
        if let Some(raw) = var(ENV_MAX_CONCURRENCY) {
            config.engine.max_concurrency = parse_var(ENV_MAX_CONCURRENCY, &raw)?;
        }
        if let Some(raw) = var(ENV_FAILURE_POLICY) {
            config.engine.failure_policy = parse_var(ENV_FAILURE_POLICY, &raw)?;
        }
        if let Some(raw) = var(ENV_LOOKUP_TIMEOUT) {
            config.lookup_timeout = Duration::from_secs(parse_var(ENV_LOOKUP_TIMEOUT, &raw)?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks the settings, reporting every problem at once.
    pub fn validate(&self) -> Result<(), Error> {
        let mut errors = Vec::new();

        if let Err(problem) = check_container_name(&self.input_container) {
            errors.push(format!("input container {problem}"));
        }
        if let Err(problem) = check_container_name(&self.output_container) {
            errors.push(format!("output container {problem}"));
        }
        if same_container(&self.input_container, &self.output_container) {
            errors.push(format!(
                "output container '{}' must differ from the input container, otherwise every upload re-triggers the pipeline",
                self.output_container
            ));
        }
        if self.api_key.trim().is_empty() {
            errors.push("API key must not be empty".to_string());
        }
        if self.engine.max_concurrency == 0 {
            errors.push("max concurrency must be at least 1".to_string());
        }
        if self.engine.max_concurrency > Semaphore::MAX_PERMITS {
            errors.push(format!(
                "max concurrency must be at most {}",
                Semaphore::MAX_PERMITS
            ));
        }
        if self.lookup_timeout.is_zero() {
            errors.push("lookup timeout must be > 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(config_error(errors.join("; ")))
        }
    }

    /// Builds the production lookup client from the credential and endpoint settings.
    pub fn places_client(&self) -> Result<GooglePlacesClient, Error> {
        GooglePlacesClient::new(&self.api_key, &self.base_url, self.lookup_timeout)
            .map_err(|e| config_error(format!("cannot build places client: {e}")))
    }
}

fn parse_var<T>(name: &str, raw: &str) -> Result<T, Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| config_error(format!("invalid {name} '{raw}': {e}")))
}
