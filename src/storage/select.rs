//! Structured queries over CSV objects, streamed back in chunks.

use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::sync::mpsc;

use super::{ObjectStore, StorageError, StorageResult};
use crate::{domain::StorageLocation, output::OUTPUT_HEADER};

/// Rows per emitted chunk when streaming full rows.
const CHUNK_ROWS: usize = 64;
const CHANNEL_CAPACITY: usize = 16;

/// Receiving end of a query result. Each item is a chunk of output or a query error.
pub type SelectStream = mpsc::Receiver<StorageResult<Vec<u8>>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectQuery {
    /// Every data row.
    All,
    /// Number of data rows whose `column` is present and not blank.
    CountNonEmpty { column: String },
}

/// How the stored object is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputSerialization {
    /// Use the first line as column names. Without a header, columns are addressed as `_1`, `_2`, ...
    pub has_header: bool,
}

impl Default for InputSerialization {
    fn default() -> Self {
        Self { has_header: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputSerialization {
    #[default]
    Csv,
    /// One JSON object per line.
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectRequest {
    pub query: SelectQuery,
    pub input: InputSerialization,
    pub output: OutputSerialization,
}

impl SelectRequest {
    pub fn new(query: SelectQuery) -> Self {
        Self {
            query,
            input: InputSerialization::default(),
            output: OutputSerialization::default(),
        }
    }

    pub fn with_output(mut self, output: OutputSerialization) -> Self {
        self.output = output;
        self
    }

    pub fn with_input(mut self, input: InputSerialization) -> Self {
        self.input = input;
        self
    }
}

/// Evaluates `request` over `bytes` on a background task and returns the stream of results.
pub(crate) fn spawn_select(bytes: Vec<u8>, request: SelectRequest) -> SelectStream {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    tokio::spawn(async move {
        if let Err(e) = evaluate(&bytes, &request, &tx).await {
            // Receiver gone means the caller stopped reading; nothing left to report to.
            let _ = tx.send(Err(e)).await;
        }
    });
    rx
}

/// Reads the whole stream, concatenating chunks and failing on the first stream error.
pub async fn drain_select(mut stream: SelectStream) -> StorageResult<Vec<u8>> {
    let mut out = Vec::new();
    while let Some(chunk) = stream.recv().await {
        out.extend(chunk?);
    }
    Ok(out)
}

#[derive(Deserialize)]
struct CountResponse {
    count: u64,
}

/// Counts the rows of an enriched dataset that received an address.
pub async fn count_resolved(
    store: &dyn ObjectStore,
    location: &StorageLocation,
) -> StorageResult<u64> {
    let request = SelectRequest::new(SelectQuery::CountNonEmpty {
        column: OUTPUT_HEADER[3].to_string(),
    })
    .with_output(OutputSerialization::Json);

    let stream = store.select(location, request).await?;
    let bytes = drain_select(stream).await?;
    let response: CountResponse = serde_json::from_slice(&bytes)
        .map_err(|e| StorageError::Query(format!("unreadable count result: {e}")))?;
    Ok(response.count)
}

async fn evaluate(
    bytes: &[u8],
    request: &SelectRequest,
    tx: &mpsc::Sender<StorageResult<Vec<u8>>>,
) -> StorageResult<()> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(request.input.has_header)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let columns: Vec<String> = if request.input.has_header {
        reader
            .headers()
            .map_err(query_error)?
            .iter()
            .map(str::to_string)
            .collect()
    } else {
        Vec::new()
    };

    match &request.query {
        SelectQuery::CountNonEmpty { column } => {
            let mut count = 0u64;
            let mut index = None;
            for row in reader.records() {
                let row = row.map_err(query_error)?;
                let idx = match index {
                    Some(idx) => idx,
                    None => *index.insert(column_index(&columns, column, row.len())?),
                };
                if row.get(idx).is_some_and(|value| !value.is_empty()) {
                    count += 1;
                }
            }
            if index.is_none() && request.input.has_header {
                // No data rows: still reject unknown columns.
                column_index(&columns, column, columns.len())?;
            }
            let chunk = match request.output {
                OutputSerialization::Json => format!("{{\"count\":{count}}}\n"),
                OutputSerialization::Csv => format!("{count}\n"),
            };
            send(tx, chunk.into_bytes()).await
        }
        SelectQuery::All => {
            let mut buffer = Vec::new();
            let mut rows_in_buffer = 0;
            for row in reader.records() {
                let row = row.map_err(query_error)?;
                encode_row(&row, &columns, request.output, &mut buffer)?;
                rows_in_buffer += 1;
                if rows_in_buffer == CHUNK_ROWS {
                    send(tx, std::mem::take(&mut buffer)).await?;
                    rows_in_buffer = 0;
                }
            }
            if !buffer.is_empty() {
                send(tx, buffer).await?;
            }
            Ok(())
        }
    }
}

/// Resolves a column by header name, or by `_N` position when there is no header.
fn column_index(columns: &[String], column: &str, width: usize) -> StorageResult<usize> {
    if let Some(idx) = columns.iter().position(|c| c == column) {
        return Ok(idx);
    }
    column
        .strip_prefix('_')
        .and_then(|n| n.parse::<usize>().ok())
        .filter(|n| (1..=width).contains(n))
        .map(|n| n - 1)
        .ok_or_else(|| StorageError::Query(format!("unknown column '{column}'")))
}

fn encode_row(
    row: &csv::StringRecord,
    columns: &[String],
    output: OutputSerialization,
    buffer: &mut Vec<u8>,
) -> StorageResult<()> {
    match output {
        OutputSerialization::Csv => {
            let mut wtr = csv::WriterBuilder::new().from_writer(&mut *buffer);
            wtr.write_record(row).map_err(query_error)?;
            wtr.flush()
                .map_err(|e| StorageError::Query(e.to_string()))?;
        }
        OutputSerialization::Json => {
            let object: Map<String, Value> = row
                .iter()
                .enumerate()
                .map(|(i, value)| {
                    let name = columns
                        .get(i)
                        .cloned()
                        .unwrap_or_else(|| format!("_{}", i + 1));
                    (name, Value::String(value.to_string()))
                })
                .collect();
            serde_json::to_writer(&mut *buffer, &object)
                .map_err(|e| StorageError::Query(e.to_string()))?;
            buffer.push(b'\n');
        }
    }
    Ok(())
}

async fn send(tx: &mpsc::Sender<StorageResult<Vec<u8>>>, chunk: Vec<u8>) -> StorageResult<()> {
    tx.send(Ok(chunk))
        .await
        .map_err(|_| StorageError::Query("result stream closed by reader".to_string()))
}

fn query_error(err: csv::Error) -> StorageError {
    StorageError::Query(err.to_string())
}
