//! Conversion of analysis records into downloadable text payloads.
//!
//! Every function here is pure: it returns the payload and a suggested file
//! name, and leaves writing it anywhere to the caller.

pub mod html;
pub mod markdown;
pub mod text;

pub use html::to_html;
pub use markdown::{to_markdown, to_summary_report};
pub use text::to_plain_text;

use serde::Serialize;

use crate::error::Result;
use crate::record::AnalysisRecord;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Markdown,
    Text,
    Html,
}

impl ExportFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "text/markdown",
            ExportFormat::Text => "text/plain",
            ExportFormat::Html => "text/html",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Text => "txt",
            ExportFormat::Html => "html",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Markdown => write!(f, "markdown"),
            ExportFormat::Text => write!(f, "text"),
            ExportFormat::Html => write!(f, "html"),
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            "text" | "txt" | "plain" => Ok(ExportFormat::Text),
            "html" | "htm" => Ok(ExportFormat::Html),
            _ => Err(format!("unknown export format: {s}")),
        }
    }
}

/// A rendered export, ready to be saved under `file_name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    pub file_name: String,
    pub mime_type: &'static str,
    pub body: String,
}

/// Render one record in the requested format.
pub fn export(record: &AnalysisRecord, format: ExportFormat) -> Result<ExportPayload> {
    match format {
        ExportFormat::Markdown => to_markdown(record),
        ExportFormat::Text => to_plain_text(record),
        ExportFormat::Html => to_html(record),
    }
}

/// Suggested download name: `lease-analysis-<stem>-<date>.<ext>`.
pub fn suggested_file_name(record: &AnalysisRecord, format: ExportFormat) -> String {
    let stem = record
        .file_name
        .rsplit_once('.')
        .map_or(record.file_name.as_str(), |(stem, _)| stem);
    let stem: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    let stem = if stem.is_empty() { "lease".to_string() } else { stem };
    let date: String = record.analyzed_at.chars().take(10).collect();
    format!("lease-analysis-{}-{}.{}", stem, date, format.extension())
}

/// Human-readable byte count, e.g. `1.5 KB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut unit = 0;
    let mut scale = 1u64;
    while unit + 1 < UNITS.len() && bytes >= scale * 1024 {
        scale *= 1024;
        unit += 1;
    }
    let value = (bytes as f64 / scale as f64 * 100.0).round() / 100.0;
    format!("{} {}", value, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(10 * 1024 * 1024), "10 MB");
        assert_eq!(format_file_size(5 * 1024 * 1024 * 1024 * 1024), "5120 GB");
    }

    #[test]
    fn test_suggested_file_name() {
        let record = AnalysisRecord {
            id: "a".into(),
            file_name: "My Lease (final).pdf".into(),
            file_size: 1,
            analyzed_at: "2024-01-01T10:00:00.000Z".into(),
            summary: String::new(),
            red_flags: 0,
            analysis: None,
        };
        assert_eq!(
            suggested_file_name(&record, ExportFormat::Html),
            "lease-analysis-My-Lease--final--2024-01-01.html"
        );
    }
}
