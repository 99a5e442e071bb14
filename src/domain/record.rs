//! Module defining the business record flowing through the pipeline and its enrichment fields

/// Fields resolved by the place lookup. All of them stay `None` if the lookup found no candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichedFields {
    pub place_id: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
}

impl EnrichedFields {
    /// Whether the lookup produced a candidate for the record.
    pub fn is_resolved(&self) -> bool {
        self.place_id.is_some()
    }
}

/// One business row: the input columns plus the write-once enrichment result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessRecord {
    name: String,
    city: String,
    region: String,
    enrichment: EnrichedFields,
    enriched: bool,
}

impl BusinessRecord {
    pub fn new(name: impl Into<String>, city: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            city: city.into(),
            region: region.into(),
            enrichment: EnrichedFields::default(),
            enriched: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn enrichment(&self) -> &EnrichedFields {
        &self.enrichment
    }

    /// Stores the lookup result. A record accepts exactly one result, empty or not.
    pub(crate) fn apply_enrichment(&mut self, fields: EnrichedFields) -> Result<(), String> {
        if self.enriched {
            return Err(format!("record '{}' was already enriched", self.name));
        }
        self.enrichment = fields;
        self.enriched = true;
        Ok(())
    }
}
