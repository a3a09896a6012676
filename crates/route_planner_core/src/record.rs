use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque, stable key of a source record.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SelectableRecord {
    pub record_id: RecordId,
    pub address: String,
}

impl SelectableRecord {
    pub fn new(record_id: impl Into<RecordId>, address: impl Into<String>) -> Self {
        Self {
            record_id: record_id.into(),
            address: address.into(),
        }
    }
}

/// Read-only provider of the active record set.
pub trait RecordSource {
    fn snapshot(&self) -> Vec<SelectableRecord>;
}

impl RecordSource for Vec<SelectableRecord> {
    fn snapshot(&self) -> Vec<SelectableRecord> {
        self.clone()
    }
}

/// Records with a usable address, in source order. Addresses are trimmed.
pub fn eligible_records<I>(records: I) -> Vec<SelectableRecord>
where
    I: IntoIterator<Item = SelectableRecord>,
{
    records
        .into_iter()
        .filter_map(|record| {
            let address = record.address.trim();
            if address.is_empty() {
                None
            } else {
                Some(SelectableRecord::new(record.record_id, address))
            }
        })
        .collect()
}
