use serde::Serialize;

use crate::{Error, domain::BusinessRecord};


/// Column names of the enriched dataset, in output order.
pub const OUTPUT_HEADER: [&str; 6] = [
    "Business Name",
    "City",
    "Province",
    "Address",
    "Phone Number",
    "Website",
];

/// Serializes the records to CSV, header first, preserving the input order.
/// The header is written even when there are no records.
pub(crate) fn serialize_records<'a>(
    records: impl IntoIterator<Item = &'a BusinessRecord>,
) -> Result<Vec<u8>, Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    wtr.write_record(OUTPUT_HEADER)?;
    for record in records {
        wtr.serialize(OutputRow::from_domain(record))?;
    }

    wtr.into_inner()
        .map_err(|e| Error::Csv(csv::Error::from(e.into_error())))
}

/// One row of the enriched dataset. Unresolved fields are written as empty strings.
#[derive(Serialize, Debug, PartialEq, Eq)]
pub(crate) struct OutputRow<'a> {
    name: &'a str,
    city: &'a str,
    province: &'a str,
    address: &'a str,
    phone: &'a str,
    website: &'a str,
}

impl<'a> OutputRow<'a> {
    fn from_domain(record: &'a BusinessRecord) -> Self {
        let fields = record.enrichment();
        Self {
            name: record.name(),
            city: record.city(),
            province: record.region(),
            address: fields.address.as_deref().unwrap_or_default(),
            phone: fields.phone.as_deref().unwrap_or_default(),
            website: fields.website.as_deref().unwrap_or_default(),
        }
    }
}
