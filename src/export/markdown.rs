use crate::error::{LeaseLensError, Result};
use crate::record::AnalysisRecord;

use super::{format_file_size, suggested_file_name, ExportFormat, ExportPayload};

pub const SUMMARY_REPORT_FILE_NAME: &str = "lease-lens-summary-report.md";

const ENTRY_SEPARATOR: &str = "\n\n---\n\n";

fn markdown_block(record: &AnalysisRecord, analysis: &str) -> String {
    let mut out = format!(
        "# Lease Analysis: {}\n\n\
         - **Analyzed:** {}\n\
         - **File size:** {} ({} bytes)\n\
         - **Red flags:** {}\n\n",
        record.file_name,
        record.analyzed_at,
        format_file_size(record.file_size),
        record.file_size,
        record.red_flags
    );
    out.push_str(analysis);
    if !analysis.ends_with('\n') {
        out.push('\n');
    }
    out
}

pub fn to_markdown(record: &AnalysisRecord) -> Result<ExportPayload> {
    let analysis = record.require_analysis()?;
    Ok(ExportPayload {
        file_name: suggested_file_name(record, ExportFormat::Markdown),
        mime_type: ExportFormat::Markdown.mime_type(),
        body: markdown_block(record, analysis),
    })
}

/// Combine several analyses into one markdown document.
///
/// Every record must carry its full analysis; callers filter beforehand.
pub fn to_summary_report(records: &[AnalysisRecord]) -> Result<ExportPayload> {
    if records.is_empty() {
        return Err(LeaseLensError::InvalidInput {
            reason: "summary report needs at least one analysis".into(),
        });
    }

    let blocks = records
        .iter()
        .map(|record| -> Result<String> {
            Ok(markdown_block(record, record.require_analysis()?))
        })
        .collect::<Result<Vec<_>>>()?;

    let total_flags: u64 = records.iter().map(|r| u64::from(r.red_flags)).sum();
    let mut body = format!(
        "# Lease Lens Summary Report\n\n\
         - **Analyses:** {}\n\
         - **Total red flags:** {}\n",
        records.len(),
        total_flags
    );
    body.push_str(ENTRY_SEPARATOR);
    body.push_str(&blocks.join(ENTRY_SEPARATOR));

    Ok(ExportPayload {
        file_name: SUMMARY_REPORT_FILE_NAME.to_string(),
        mime_type: ExportFormat::Markdown.mime_type(),
        body,
    })
}
