//! Module defining the parsing logic used to convert the uploaded business list into records that can be enriched.

use std::io::Read;

use crate::domain::BusinessRecord;
use crate::error::{Error, decode_error};


/// Number of leading columns read from each row; anything after them is ignored.
const INPUT_COLUMNS: usize = 3;

/// Parses the data provided by the reader and returns a lazy iterator over the parsing results.
///
/// The first line is treated as a header and skipped. Every following row must have the same number
/// of columns as the header and at least three of them: name, city and region.
pub(crate) fn parse_records(reader: impl Read) -> impl Iterator<Item = Result<BusinessRecord, Error>> {
    let csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .has_headers(true)
        .from_reader(reader);

    csv_reader.into_records().map(|result| {
        let row = result?;
        to_business_record(&row)
    })
}

/// Parses the whole input, failing on the first malformed row.
pub(crate) fn parse_dataset(bytes: &[u8]) -> Result<Vec<BusinessRecord>, Error> {
    parse_records(bytes).collect()
}

fn to_business_record(row: &csv::StringRecord) -> Result<BusinessRecord, Error> {
    let line = row.position().map(|p| p.line()).unwrap_or_default();
    if row.len() < INPUT_COLUMNS {
        return Err(decode_error(
            line,
            format!(
                "expected at least {INPUT_COLUMNS} columns (name, city, region), found {}",
                row.len()
            ),
        ));
    }
    Ok(BusinessRecord::new(&row[0], &row[1], &row[2]))
}
