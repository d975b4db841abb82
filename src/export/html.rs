use crate::error::Result;
use crate::record::AnalysisRecord;

use super::{format_file_size, suggested_file_name, ExportFormat, ExportPayload};

/// Escape the characters that are significant in HTML text and attributes.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn to_html(record: &AnalysisRecord) -> Result<ExportPayload> {
    let analysis = record.require_analysis()?;
    let file_name = escape_html(&record.file_name);
    let analyzed_at = escape_html(&record.analyzed_at);

    let body = format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>Lease Analysis: {file_name}</title>\n\
         <style>body{{font-family:sans-serif;max-width:50rem;margin:2rem auto;}}pre{{white-space:pre-wrap;}}</style>\n\
         </head>\n\
         <body>\n\
         <h1>Lease Analysis: {file_name}</h1>\n\
         <ul>\n\
         <li><strong>Analyzed:</strong> {analyzed_at}</li>\n\
         <li><strong>File size:</strong> {} ({} bytes)</li>\n\
         <li><strong>Red flags:</strong> {}</li>\n\
         </ul>\n\
         <hr>\n\
         <pre>{}</pre>\n\
         </body>\n\
         </html>\n",
        format_file_size(record.file_size),
        record.file_size,
        record.red_flags,
        escape_html(analysis)
    );

    Ok(ExportPayload {
        file_name: suggested_file_name(record, ExportFormat::Html),
        mime_type: ExportFormat::Html.mime_type(),
        body,
    })
}
