//! Module decoding the object-created notifications that start a pipeline run.
//!
//! Only the container and key of each record are read; everything else in the notification is
//! ignored.

use serde::Deserialize;

use crate::{Error, domain::StorageLocation};

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct StorageEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<EventRecord>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct EventRecord {
    pub s3: ObjectEntity,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ObjectEntity {
    pub bucket: BucketRef,
    pub object: ObjectRef,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct BucketRef {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ObjectRef {
    pub key: String,
}

impl StorageEvent {
    pub fn from_json(bytes: &[u8]) -> Result<Self, Error> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Builds an event carrying a single object, as if it had just been uploaded.
    pub fn single(container: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            records: vec![EventRecord {
                s3: ObjectEntity {
                    bucket: BucketRef {
                        name: container.into(),
                    },
                    object: ObjectRef { key: key.into() },
                },
            }],
        }
    }

    /// The uploaded objects, in notification order. Keys arrive form-encoded and are decoded here.
    pub fn locations(&self) -> Vec<StorageLocation> {
        self.records
            .iter()
            .map(|r| StorageLocation::new(&r.s3.bucket.name, decode_key(&r.s3.object.key)))
            .collect()
    }
}

/// Decodes `+` as a space and `%XX` escapes. Malformed escapes are kept verbatim.
fn decode_key(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => match (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                (Some(hi), Some(lo)) => {
                    out.push(hi << 4 | lo);
                    i += 2;
                }
                _ => out.push(b'%'),
            },
            other => out.push(other),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(digit: u8) -> Option<u8> {
    (digit as char).to_digit(16).map(|d| d as u8)
}
