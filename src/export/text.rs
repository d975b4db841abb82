use crate::error::Result;
use crate::record::AnalysisRecord;

use super::{format_file_size, suggested_file_name, ExportFormat, ExportPayload};

const TITLE: &str = "LEASE ANALYSIS REPORT";

pub fn to_plain_text(record: &AnalysisRecord) -> Result<ExportPayload> {
    let analysis = record.require_analysis()?;

    let mut body = format!(
        "{TITLE}\n{}\n\n\
         File: {}\n\
         Analyzed: {}\n\
         File size: {} ({} bytes)\n\
         Red flags: {}\n\n\
         {}\n\n",
        "=".repeat(TITLE.len()),
        record.file_name,
        record.analyzed_at,
        format_file_size(record.file_size),
        record.file_size,
        record.red_flags,
        "-".repeat(40)
    );
    body.push_str(analysis);
    if !analysis.ends_with('\n') {
        body.push('\n');
    }

    Ok(ExportPayload {
        file_name: suggested_file_name(record, ExportFormat::Text),
        mime_type: ExportFormat::Text.mime_type(),
        body,
    })
}
