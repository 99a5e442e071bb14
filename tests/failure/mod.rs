//! Integration tests for runs that must not produce any output.

use std::{sync::Arc, time::Duration};

use claims::{assert_matches, assert_ok};
use place_enricher::{
    Config, EngineOptions, Error, FailurePolicy, LookupError, MemoryStore, MockLookup, ObjectStore,
    Pipeline, PlaceDetails, StorageError, StorageEvent, StorageLocation,
};
use rstest::rstest;

const INPUT: &str = "Business Name,City,Province\n\
                     Shop 0,Springfield,ON\n\
                     Shop 1,Springfield,ON\n\
                     Shop 2,Springfield,ON\n";

fn query(i: usize) -> String {
    format!("Shop {i}SpringfieldON")
}

fn details() -> PlaceDetails {
    PlaceDetails {
        formatted_address: Some("1 Main St".to_string()),
        international_phone_number: None,
        website: None,
    }
}

fn pipeline(store: Arc<MemoryStore>, lookup: MockLookup, policy: FailurePolicy) -> Pipeline {
    let config = Config::new("incoming", "enriched", "test-key").with_engine(EngineOptions {
        max_concurrency: 8,
        failure_policy: policy,
    });
    assert_ok!(Pipeline::new(&config, store, Arc::new(lookup)))
}

fn seeded_store() -> (Arc<MemoryStore>, StorageLocation) {
    let input = StorageLocation::new("incoming", "leads.csv");
    let store = Arc::new(MemoryStore::new().with_object(input.clone(), INPUT));
    (store, input)
}

#[tokio::test]
async fn failing_lookup_aborts_the_run_and_writes_nothing() {
    let (store, input) = seeded_store();
    let lookup = MockLookup::new()
        .with_place(query(0), "p0", details())
        .with_delay(query(0), Duration::from_millis(100))
        .with_failure(
            query(1),
            LookupError::Service {
                status: "REQUEST_DENIED".to_string(),
                message: "The provided API key is invalid.".to_string(),
            },
        )
        .with_place(query(2), "p2", details());

    let result = pipeline(store.clone(), lookup, FailurePolicy::Abort)
        .run(&input)
        .await;

    assert_matches!(
        result,
        Err(Error::Lookup { row: 2, source: LookupError::Service { .. }, .. })
    );
    assert_eq!(store.object_count(), 1, "only the input may exist");
}

#[tokio::test]
async fn isolated_failure_still_writes_the_other_rows() {
    let (store, input) = seeded_store();
    let lookup = MockLookup::new()
        .with_place(query(0), "p0", details())
        .with_failure(query(1), LookupError::Transport("connection reset".to_string()))
        .with_place(query(2), "p2", details());

    let summary = assert_ok!(
        pipeline(store.clone(), lookup, FailurePolicy::Isolate)
            .run(&input)
            .await
    );

    assert_eq!((summary.resolved, summary.unresolved, summary.failed), (2, 0, 1));
    let written = store.object(&summary.output).unwrap();
    assert_eq!(
        String::from_utf8(written).unwrap(),
        "Business Name,City,Province,Address,Phone Number,Website\n\
         Shop 0,Springfield,ON,1 Main St,,\n\
         Shop 1,Springfield,ON,,,\n\
         Shop 2,Springfield,ON,1 Main St,,\n"
    );
}

#[rstest]
#[case::unequal_columns(b"Business Name,City,Province\nShop 0,Springfield\n")]
#[case::too_few_columns(b"Business Name,City\nShop 0,Springfield\n")]
#[case::invalid_utf8(b"Business Name,City,Province\nSh\x80p,Springfield,ON\n")]
#[tokio::test]
async fn malformed_input_fails_before_any_lookup(#[case] raw: &[u8]) {
    let input = StorageLocation::new("incoming", "bad.csv");
    let store = Arc::new(MemoryStore::new().with_object(input.clone(), raw));
    let lookup = Arc::new(MockLookup::new());
    let config = Config::new("incoming", "enriched", "test-key");
    let pipeline = assert_ok!(Pipeline::new(&config, store.clone(), lookup.clone()));

    let result = pipeline.run(&input).await;

    assert_matches!(result, Err(Error::Csv(_) | Error::Decode { .. }));
    assert!(lookup.sessions_seen().is_empty());
    assert_eq!(store.object_count(), 1);
}

#[tokio::test]
async fn output_container_upload_does_not_trigger_a_run() {
    let store = Arc::new(MemoryStore::new());
    let output = StorageLocation::new("enriched", "output-leads.csv");
    assert_ok!(store.put(&output, INPUT.as_bytes().to_vec()).await);
    let lookup = Arc::new(MockLookup::new());
    let config = Config::new("incoming", "enriched", "test-key");
    let pipeline = assert_ok!(Pipeline::new(&config, store.clone(), lookup.clone()));

    let result = pipeline
        .handle_event(&StorageEvent::single("enriched", "output-leads.csv"))
        .await;

    assert_matches!(result, Err(Error::RecursiveTrigger { .. }));
    assert!(lookup.sessions_seen().is_empty());
    assert_eq!(store.object_count(), 1);
}

#[rstest]
#[case::identical("bucket", "bucket")]
#[case::padded("bucket", " bucket ")]
#[case::trailing_slash("bucket", "bucket/")]
#[case::dot_prefixed("bucket", "./bucket")]
#[case::nested("bucket", "bucket/enriched")]
fn pipeline_refuses_to_share_input_and_output_container(#[case] input: &str, #[case] output: &str) {
    let config = Config::new(input, output, "test-key");

    let result = Pipeline::new(&config, Arc::new(MemoryStore::new()), Arc::new(MockLookup::new()));

    assert_matches!(result.err(), Some(Error::Config(_)));
}

#[tokio::test]
async fn missing_input_object_is_reported() {
    let store = Arc::new(MemoryStore::new());

    let result = pipeline(store, MockLookup::new(), FailurePolicy::Abort)
        .run(&StorageLocation::new("incoming", "gone.csv"))
        .await;

    assert_matches!(result, Err(Error::Storage(StorageError::NotFound(_))));
}
