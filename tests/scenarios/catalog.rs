//! Library of hand-crafted record shapes.
//! Each shape defines one input row, how the lookup service answers for it and the output row it must produce.

use place_enricher::{MockLookup, PlaceDetails};

use super::scenario::Scenario;

pub trait RecordShape {
    fn build(&self, index: usize) -> Scenario;
}

fn details(address: Option<&str>, phone: Option<&str>, website: Option<&str>) -> PlaceDetails {
    PlaceDetails {
        formatted_address: address.map(str::to_string),
        international_phone_number: phone.map(str::to_string),
        website: website.map(str::to_string),
    }
}

/// A business the service knows, with every detail available.
/// Expected: all three enriched columns filled.
pub struct FullyResolved;

impl RecordShape for FullyResolved {
    fn build(&self, index: usize) -> Scenario {
        let name = format!("Bakery {index}");
        let query = format!("{name}TorontoON");
        let place_id = format!("bakery-{index}");
        Scenario {
            input_row: format!("{name},Toronto,ON"),
            query: query.clone(),
            register: Box::new(move |lookup: MockLookup| {
                lookup.with_place(
                    query,
                    place_id,
                    details(Some("12 Queen St W"), Some("+1 416-555-0101"), Some("https://bakery.test")),
                )
            }),
            expected_row: format!("{name},Toronto,ON,12 Queen St W,+1 416-555-0101,https://bakery.test"),
            resolved: true,
        }
    }
}

/// A business found by the service, which only knows its phone number.
/// Expected: phone filled, address and website empty.
pub struct PhoneOnly;

impl RecordShape for PhoneOnly {
    fn build(&self, index: usize) -> Scenario {
        let name = format!("Garage {index}");
        let query = format!("{name}OttawaON");
        let place_id = format!("garage-{index}");
        Scenario {
            input_row: format!("{name},Ottawa,ON"),
            query: query.clone(),
            register: Box::new(move |lookup: MockLookup| {
                lookup.with_place(query, place_id, details(None, Some("+1 613-555-0199"), None))
            }),
            expected_row: format!("{name},Ottawa,ON,,+1 613-555-0199,"),
            resolved: true,
        }
    }
}

/// A business the service does not know.
/// Expected: the input columns followed by three empty columns.
pub struct Unknown;

impl RecordShape for Unknown {
    fn build(&self, index: usize) -> Scenario {
        let name = format!("Ghost Shop {index}");
        Scenario {
            input_row: format!("{name},Nowhere,ZZ"),
            query: format!("{name}NowhereZZ"),
            register: Box::new(|lookup: MockLookup| lookup),
            expected_row: format!("{name},Nowhere,ZZ,,,"),
            resolved: false,
        }
    }
}

/// A name containing the delimiter, with an address that contains it too.
/// Expected: both fields quoted in the output.
pub struct QuotedFields;

impl RecordShape for QuotedFields {
    fn build(&self, index: usize) -> Scenario {
        let name = format!("Smith, Jones & Co {index}");
        let query = format!("{name}HalifaxNS");
        let place_id = format!("smith-{index}");
        Scenario {
            input_row: format!("\"{name}\",Halifax,NS"),
            query: query.clone(),
            register: Box::new(move |lookup: MockLookup| {
                lookup.with_place(
                    query,
                    place_id,
                    details(Some("1 Water St, Halifax"), None, Some("https://smith.test")),
                )
            }),
            expected_row: format!("\"{name}\",Halifax,NS,\"1 Water St, Halifax\",,https://smith.test"),
            resolved: true,
        }
    }
}

/// A row with whitespace around every value.
/// Expected: trimmed values, both in the query and in the output.
pub struct Padded;

impl RecordShape for Padded {
    fn build(&self, index: usize) -> Scenario {
        let name = format!("Cafe {index}");
        let query = format!("{name}MontrealQC");
        let place_id = format!("cafe-{index}");
        Scenario {
            input_row: format!("  {name} , Montreal ,QC "),
            query: query.clone(),
            register: Box::new(move |lookup: MockLookup| {
                lookup.with_place(query, place_id, details(Some("5 Rue Ste-Catherine"), None, None))
            }),
            expected_row: format!("{name},Montreal,QC,5 Rue Ste-Catherine,,"),
            resolved: true,
        }
    }
}

/// Returns all available record shapes.
pub fn all_shapes() -> Vec<Box<dyn RecordShape>> {
    vec![
        Box::new(FullyResolved),
        Box::new(PhoneOnly),
        Box::new(Unknown),
        Box::new(QuotedFields),
        Box::new(Padded),
    ]
}
