use chrono::Utc;

use crate::client::AnalysisService;
use crate::error::{LeaseLensError, Result};
use crate::export::{self, ExportFormat, ExportPayload};
use crate::flags::UiVariant;
use crate::query::{project, QueryOptions, RiskFilter, SortBy};
use crate::record::AnalysisRecord;
use crate::storage::RecordStore;
use crate::upload::ValidatedUpload;

const UNREADABLE_HISTORY_NOTICE: &str =
    "Saved analysis history could not be read; starting with an empty history.";

/// Ticket for an in-flight analysis, tied to the view generation that started it.
#[derive(Debug)]
pub struct PendingAnalysis {
    generation: u64,
}

/// What happened to a finished analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    /// Appended to the history under this id.
    Recorded(String),
    /// The view was abandoned before the result arrived; nothing was stored.
    Discarded,
    /// The analysis or the write failed; the message is user-facing.
    Failed(String),
}

/// Totals shown above the enhanced history list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryStats {
    pub total: usize,
    pub total_red_flags: u64,
    /// `analyzedAt` of the newest record.
    pub last_analyzed_at: Option<String>,
}

/// Send an upload for analysis and turn the reply into a record.
pub async fn analyze_upload(
    service: &dyn AnalysisService,
    upload: &ValidatedUpload,
) -> Result<AnalysisRecord> {
    let analysis = service.analyze(upload).await?;
    Ok(AnalysisRecord::from_analysis(
        upload.file_name(),
        upload.size(),
        &analysis,
        Utc::now(),
    ))
}

/// Interactive history list: the store's records plus the current search,
/// sort and filter, the derived projection, and which row's export menu is open.
pub struct HistoryView {
    store: Box<dyn RecordStore>,
    variant: UiVariant,
    records: Vec<AnalysisRecord>,
    options: QueryOptions,
    projection: Vec<AnalysisRecord>,
    open_menu: Option<String>,
    generation: u64,
    notice: Option<String>,
}

impl HistoryView {
    /// Load the history from `store`. Unreadable data yields an empty list and a notice.
    pub fn open(store: Box<dyn RecordStore>, variant: UiVariant) -> Self {
        let mut view = Self {
            store,
            variant,
            records: Vec::new(),
            options: QueryOptions::default(),
            projection: Vec::new(),
            open_menu: None,
            generation: 0,
            notice: None,
        };
        view.reload();
        view
    }

    /// Re-read the store, replacing the in-memory collection.
    pub fn reload(&mut self) {
        match self.store.load() {
            Ok(records) => self.records = records,
            Err(e) => {
                tracing::warn!("failed to load analysis history: {e}");
                self.records.clear();
                self.notice = Some(UNREADABLE_HISTORY_NOTICE.to_string());
            }
        }
        self.open_menu = None;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.projection = project(&self.records, &self.options);
    }

    pub fn variant(&self) -> UiVariant {
        self.variant
    }

    /// Full collection in stored order, newest first.
    pub fn records(&self) -> &[AnalysisRecord] {
        &self.records
    }

    /// Filtered and sorted rows for display.
    pub fn projection(&self) -> &[AnalysisRecord] {
        &self.projection
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.options.search_query = query.into();
        self.recompute();
    }

    pub fn set_sort_by(&mut self, sort_by: SortBy) {
        self.options.sort_by = sort_by;
        self.recompute();
    }

    pub fn set_filter_by(&mut self, filter_by: RiskFilter) {
        self.options.filter_by = filter_by;
        self.recompute();
    }

    /// Id of the row whose export menu is open, if any.
    pub fn open_export_menu(&self) -> Option<&str> {
        self.open_menu.as_deref()
    }

    /// Toggle a row's export menu. Opening one closes any other.
    /// Returns whether the row's menu is now open.
    pub fn toggle_export_menu(&mut self, id: &str) -> bool {
        if self.open_menu.as_deref() == Some(id) {
            self.open_menu = None;
            false
        } else {
            self.open_menu = Some(id.to_string());
            true
        }
    }

    pub fn close_export_menu(&mut self) {
        self.open_menu = None;
    }

    /// Persist a new record at the head of the history.
    pub fn record_analysis(&mut self, record: AnalysisRecord) -> Result<()> {
        self.store.append(record.clone())?;
        self.records.insert(0, record);
        self.recompute();
        Ok(())
    }

    /// Start tracking an analysis launched from this view.
    pub fn begin_analysis(&self) -> PendingAnalysis {
        PendingAnalysis {
            generation: self.generation,
        }
    }

    /// Invalidate every outstanding ticket, so late results are dropped.
    pub fn abandon(&mut self) {
        self.generation += 1;
        tracing::debug!("abandoned pending analyses (generation {})", self.generation);
    }

    /// Apply the result of an analysis started with [`Self::begin_analysis`].
    pub fn complete_analysis(
        &mut self,
        ticket: PendingAnalysis,
        result: Result<AnalysisRecord>,
    ) -> AnalysisOutcome {
        if ticket.generation != self.generation {
            tracing::debug!("discarding analysis result from an abandoned view");
            return AnalysisOutcome::Discarded;
        }
        let outcome = match result {
            Ok(record) => {
                let id = record.id.clone();
                match self.record_analysis(record) {
                    Ok(()) => AnalysisOutcome::Recorded(id),
                    Err(e) => AnalysisOutcome::Failed(e.to_string()),
                }
            }
            Err(e) => AnalysisOutcome::Failed(e.to_string()),
        };
        if let AnalysisOutcome::Failed(message) = &outcome {
            self.notice = Some(message.clone());
        }
        outcome
    }

    /// Quick stats over the whole collection, ignoring search and filter.
    pub fn stats(&self) -> HistoryStats {
        HistoryStats {
            total: self.records.len(),
            total_red_flags: self.records.iter().map(|r| u64::from(r.red_flags)).sum(),
            last_analyzed_at: self.records.first().map(|r| r.analyzed_at.clone()),
        }
    }

    pub fn find(&self, id: &str) -> Option<&AnalysisRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Export one record. Closes the open export menu.
    pub fn export_record(&mut self, id: &str, format: ExportFormat) -> Result<ExportPayload> {
        self.open_menu = None;
        let record = self.find(id).ok_or_else(|| LeaseLensError::RecordNotFound {
            id: id.to_string(),
        })?;
        export::export(record, format)
    }

    /// Combined report of every record that still has its full analysis.
    /// Closes the open export menu.
    pub fn export_all(&mut self) -> Result<ExportPayload> {
        self.open_menu = None;
        let exportable: Vec<AnalysisRecord> = self
            .records
            .iter()
            .filter(|r| r.analysis.is_some())
            .cloned()
            .collect();
        if exportable.is_empty() {
            return Err(LeaseLensError::InvalidInput {
                reason: "no analyses with full text to export".into(),
            });
        }
        export::to_summary_report(&exportable)
    }

    /// Empty the history and remove the persisted slot.
    pub fn clear_all(&mut self) -> Result<()> {
        self.store.clear()?;
        self.records.clear();
        self.open_menu = None;
        self.recompute();
        Ok(())
    }
}
