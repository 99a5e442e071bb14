use std::{sync::Arc, time::Duration};

use place_enricher::{
    Config, EngineOptions, FailurePolicy, MemoryStore, MockLookup, OUTPUT_HEADER, Pipeline,
    RunSummary, StorageLocation,
};

pub const INPUT_CONTAINER: &str = "incoming";
pub const OUTPUT_CONTAINER: &str = "enriched";

type Register = Box<dyn FnOnce(MockLookup) -> MockLookup>;

/// One input row together with the lookup answers it needs and the output row it must produce.
pub struct Scenario {
    pub input_row: String,
    pub query: String,
    pub register: Register,
    pub expected_row: String,
    pub resolved: bool,
}

/// Everything needed to run a dataset through the pipeline and check its output.
pub struct Dataset {
    pub input: String,
    pub expected_output: String,
    pub queries: Vec<String>,
    pub resolved: usize,
    pub lookup: MockLookup,
}

/// Assembles the scenarios into one dataset. `delays[i]` slows down the lookup of row `i`, so that
/// lookups finish in a different order than the rows appear.
pub fn build_dataset(scenarios: Vec<Scenario>, delays: &[u64]) -> Dataset {
    let mut input = String::from("Business Name,City,Province\n");
    let mut expected_output = format!("{}\n", OUTPUT_HEADER.join(","));
    let mut queries = Vec::with_capacity(scenarios.len());
    let mut resolved = 0;
    let mut lookup = MockLookup::new();

    for (i, scenario) in scenarios.into_iter().enumerate() {
        input.push_str(&scenario.input_row);
        input.push('\n');
        expected_output.push_str(&scenario.expected_row);
        expected_output.push('\n');
        if scenario.resolved {
            resolved += 1;
        }

        lookup = (scenario.register)(lookup);
        if let Some(delay) = delays.get(i) {
            lookup = lookup.with_delay(&scenario.query, Duration::from_millis(*delay));
        }
        queries.push(scenario.query);
    }

    Dataset {
        input,
        expected_output,
        queries,
        resolved,
        lookup,
    }
}

pub struct RunOutcome {
    pub summary: RunSummary,
    pub output: String,
    pub lookup: Arc<MockLookup>,
}

/// Uploads the dataset to an in-memory store, runs the pipeline on it and returns what was written.
pub async fn run_dataset(dataset: Dataset, max_concurrency: usize) -> RunOutcome {
    let input = StorageLocation::new(INPUT_CONTAINER, "leads.csv");
    let store = Arc::new(MemoryStore::new().with_object(input.clone(), dataset.input));
    let lookup = Arc::new(dataset.lookup);
    let config = Config::new(INPUT_CONTAINER, OUTPUT_CONTAINER, "test-key").with_engine(
        EngineOptions {
            max_concurrency,
            failure_policy: FailurePolicy::Abort,
        },
    );

    let pipeline = Pipeline::new(&config, store.clone(), lookup.clone())
        .expect("valid pipeline configuration");
    let summary = pipeline.run(&input).await.expect("pipeline run succeeds");

    let bytes = store
        .object(&summary.output)
        .expect("output object was written");
    RunOutcome {
        summary,
        output: String::from_utf8(bytes).expect("output is UTF-8"),
        lookup,
    }
}
