use std::sync::Mutex;

use crate::error::Result;
use crate::record::AnalysisRecord;

use super::{decode, prepend, RecordStore};

/// In-process history slot holding the serialized collection.
///
/// Keeps the same serialized form as [`super::file::FileStore`], so decoding
/// and corruption handling behave identically.
#[derive(Default)]
pub struct MemoryStore {
    slot: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the slot with raw contents, valid or not.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(raw.into())),
        }
    }

    /// Current raw slot contents, `None` when the slot is absent.
    pub fn raw(&self) -> Option<String> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl RecordStore for MemoryStore {
    fn load(&self) -> Result<Vec<AnalysisRecord>> {
        let slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        match slot.as_deref() {
            Some(raw) => decode(raw),
            None => Ok(Vec::new()),
        }
    }

    fn append(&self, record: AnalysisRecord) -> Result<()> {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        let updated = prepend(slot.as_deref(), record)?;
        *slot = Some(updated);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = None;
        Ok(())
    }
}
