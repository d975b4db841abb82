pub mod file;
pub mod memory;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{LeaseLensError, Result};
use crate::record::AnalysisRecord;

/// Fixed name of the persisted history slot.
pub const HISTORY_SLOT: &str = "lease-lens-history";

/// Schema version written by this build.
pub const SCHEMA_VERSION: u32 = 1;

/// Backend owning the persisted analysis history.
///
/// Records are kept newest-first. Every mutation persists the whole
/// collection or leaves the slot untouched.
pub trait RecordStore: Send + Sync {
    /// Read the persisted history. An absent slot yields an empty list.
    fn load(&self) -> Result<Vec<AnalysisRecord>>;

    /// Insert a record at the head and persist the updated collection.
    fn append(&self, record: AnalysisRecord) -> Result<()>;

    /// Remove the persisted slot entirely.
    fn clear(&self) -> Result<()>;
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    records: &'a [AnalysisRecord],
}

#[derive(Deserialize)]
struct Envelope {
    version: u32,
    records: serde_json::Value,
}

/// Serialize a collection into the current slot layout.
pub fn encode(records: &[AnalysisRecord]) -> Result<String> {
    Ok(serde_json::to_string(&EnvelopeRef {
        version: SCHEMA_VERSION,
        records,
    })?)
}

/// Parse a slot's contents, migrating older layouts to the current one.
pub fn decode(raw: &str) -> Result<Vec<AnalysisRecord>> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| LeaseLensError::CorruptData {
            reason: format!("not valid JSON: {e}"),
        })?;

    let (version, records) = if value.is_array() {
        // Versionless layout: a bare array of records.
        (0, value)
    } else {
        let envelope: Envelope =
            serde_json::from_value(value).map_err(|e| LeaseLensError::CorruptData {
                reason: format!("unexpected layout: {e}"),
            })?;
        (envelope.version, envelope.records)
    };

    let records = migrate(version, records)?;
    validate_collection(&records)?;
    Ok(records)
}

fn migrate(version: u32, records: serde_json::Value) -> Result<Vec<AnalysisRecord>> {
    if version > SCHEMA_VERSION {
        return Err(LeaseLensError::UnsupportedSchema { version });
    }
    if version < SCHEMA_VERSION {
        tracing::debug!("migrating history from schema v{version} to v{SCHEMA_VERSION}");
    }
    // v0 and v1 share the record shape; only the envelope differs.
    serde_json::from_value(records).map_err(|e| LeaseLensError::CorruptData {
        reason: format!("malformed record: {e}"),
    })
}

fn validate_collection(records: &[AnalysisRecord]) -> Result<()> {
    let mut seen = HashSet::new();
    for record in records {
        record.validate()?;
        if !seen.insert(record.id.as_str()) {
            return Err(LeaseLensError::CorruptData {
                reason: format!("duplicate record id {}", record.id),
            });
        }
    }
    Ok(())
}

/// Decode a slot for a write, treating unreadable contents as empty.
fn decode_for_write(raw: Option<&str>) -> Result<Vec<AnalysisRecord>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    match decode(raw) {
        Ok(records) => Ok(records),
        Err(e) if e.is_recoverable_load_failure() => {
            tracing::warn!("overwriting unreadable history: {e}");
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

/// Compute the slot contents after prepending `record` to `raw`.
fn prepend(raw: Option<&str>, record: AnalysisRecord) -> Result<String> {
    record.validate().map_err(|e| LeaseLensError::InvalidInput {
        reason: e.to_string(),
    })?;
    let mut records = decode_for_write(raw)?;
    if records.iter().any(|r| r.id == record.id) {
        return Err(LeaseLensError::InvalidInput {
            reason: format!("an analysis with id {} already exists", record.id),
        });
    }
    records.insert(0, record);
    encode(&records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> AnalysisRecord {
        AnalysisRecord {
            id: id.into(),
            file_name: format!("{id}.pdf"),
            file_size: 1,
            analyzed_at: "2024-01-01T10:00:00Z".into(),
            summary: String::new(),
            red_flags: 0,
            analysis: None,
        }
    }

    #[test]
    fn test_decode_legacy_array() {
        let raw = r#"[{"id":"a","fileName":"a.pdf","fileSize":1,"analyzedAt":"2024-01-01T10:00:00.000Z","summary":"s","redFlags":2}]"#;
        let records = decode(raw).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].red_flags, 2);
        assert!(records[0].analysis.is_none());
    }

    #[test]
    fn test_encode_writes_current_version() {
        let raw = encode(&[record("a")]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], SCHEMA_VERSION);
        assert_eq!(decode(&raw).unwrap(), vec![record("a")]);
    }

    #[test]
    fn test_decode_future_version() {
        let raw = r#"{"version":99,"records":[]}"#;
        assert!(matches!(
            decode(raw),
            Err(LeaseLensError::UnsupportedSchema { version: 99 })
        ));
    }

    #[test]
    fn test_decode_rejects_negative_counts() {
        let raw = r#"[{"id":"a","fileName":"a.pdf","fileSize":1,"analyzedAt":"2024-01-01T10:00:00Z","summary":"s","redFlags":-1}]"#;
        assert!(matches!(decode(raw), Err(LeaseLensError::CorruptData { .. })));
    }

    #[test]
    fn test_decode_rejects_duplicate_ids() {
        let raw = serde_json::to_string(&vec![record("a"), record("a")]).unwrap();
        assert!(matches!(decode(&raw), Err(LeaseLensError::CorruptData { .. })));
    }

    #[test]
    fn test_prepend_over_corrupt_slot() {
        let raw = prepend(Some("{not json"), record("a")).unwrap();
        assert_eq!(decode(&raw).unwrap(), vec![record("a")]);
    }

    #[test]
    fn test_prepend_rejects_duplicate() {
        let raw = encode(&[record("a")]).unwrap();
        assert!(matches!(
            prepend(Some(&raw), record("a")),
            Err(LeaseLensError::InvalidInput { .. })
        ));
    }
}
