//! Export formatter tests.

use lease_lens::error::LeaseLensError;
use lease_lens::export::{
    export, to_html, to_markdown, to_plain_text, to_summary_report, ExportFormat,
};
use lease_lens::record::AnalysisRecord;

fn make_record(id: &str, name: &str, analysis: Option<&str>) -> AnalysisRecord {
    AnalysisRecord {
        id: id.into(),
        file_name: name.into(),
        file_size: 1536,
        analyzed_at: "2024-02-01T10:00:00.000Z".into(),
        summary: "Rent $1,500".into(),
        red_flags: 2,
        analysis: analysis.map(String::from),
    }
}

const ANALYSIS: &str = "# Lease Lens Report\n\n## Red Flag Analysis\n- Automatic renewal\n";

// ---------------------------------------------------------------------------
// Single-record formats
// ---------------------------------------------------------------------------

#[test]
fn every_format_includes_name_and_timestamp() {
    let record = make_record("a", "lease1.pdf", Some(ANALYSIS));
    for format in [ExportFormat::Markdown, ExportFormat::Text, ExportFormat::Html] {
        let payload = export(&record, format).unwrap();
        assert!(payload.body.contains("lease1.pdf"), "{format}");
        assert!(payload.body.contains("2024-02-01T10:00:00.000Z"), "{format}");
        assert_eq!(payload.mime_type, format.mime_type());
        assert!(payload.file_name.ends_with(format.extension()));
    }
}

#[test]
fn markdown_has_heading_metadata_and_verbatim_body() {
    let record = make_record("a", "lease1.pdf", Some(ANALYSIS));
    let payload = to_markdown(&record).unwrap();
    assert!(payload.body.starts_with("# Lease Analysis: lease1.pdf\n"));
    assert!(payload.body.contains("- **Analyzed:** 2024-02-01T10:00:00.000Z"));
    assert!(payload.body.contains("- **File size:** 1.5 KB (1536 bytes)"));
    assert!(payload.body.contains(ANALYSIS));
    assert_eq!(payload.mime_type, "text/markdown");
    assert_eq!(payload.file_name, "lease-analysis-lease1-2024-02-01.md");
}

#[test]
fn markdown_header_layout() {
    let record = make_record("a", "lease1.pdf", Some("Body"));
    let payload = to_markdown(&record).unwrap();
    assert_eq!(
        payload.body,
        "# Lease Analysis: lease1.pdf\n\n\
         - **Analyzed:** 2024-02-01T10:00:00.000Z\n\
         - **File size:** 1.5 KB (1536 bytes)\n\
         - **Red flags:** 2\n\nBody\n"
    );
}

#[test]
fn plain_text_has_no_markup() {
    let record = make_record("a", "lease1.pdf", Some("All clear."));
    let payload = to_plain_text(&record).unwrap();
    assert!(payload.body.contains("File: lease1.pdf"));
    assert!(payload.body.contains("Analyzed: 2024-02-01T10:00:00.000Z"));
    assert!(!payload.body.contains("**"));
    assert!(!payload.body.contains('<'));
    assert_eq!(payload.mime_type, "text/plain");
}

#[test]
fn html_escapes_source_fields() {
    let record = make_record(
        "x",
        "<script>alert(1)</script>.pdf",
        Some("Clause 4 <b>unfair</b> & vague"),
    );
    let payload = to_html(&record).unwrap();
    assert!(!payload.body.contains("<script>"));
    assert!(!payload.body.contains("<b>unfair</b>"));
    assert!(payload.body.contains("&lt;script&gt;alert(1)&lt;/script&gt;.pdf"));
    assert!(payload.body.contains("Clause 4 &lt;b&gt;unfair&lt;/b&gt; &amp; vague"));
    assert!(payload.body.starts_with("<!DOCTYPE html>"));
    assert_eq!(payload.mime_type, "text/html");
}

#[test]
fn single_export_without_analysis_is_invalid() {
    let record = make_record("a", "lease1.pdf", None);
    for format in [ExportFormat::Markdown, ExportFormat::Text, ExportFormat::Html] {
        assert!(matches!(
            export(&record, format),
            Err(LeaseLensError::InvalidInput { .. })
        ));
    }
}

// ---------------------------------------------------------------------------
// Summary report
// ---------------------------------------------------------------------------

#[test]
fn summary_report_of_nothing_is_invalid() {
    assert!(matches!(
        to_summary_report(&[]),
        Err(LeaseLensError::InvalidInput { .. })
    ));
}

#[test]
fn summary_report_rejects_record_without_analysis() {
    let records = vec![
        make_record("a", "lease1.pdf", Some(ANALYSIS)),
        make_record("b", "lease2.pdf", None),
    ];
    assert!(matches!(
        to_summary_report(&records),
        Err(LeaseLensError::InvalidInput { .. })
    ));
}

#[test]
fn summary_report_concatenates_entries_with_rules() {
    let records = vec![
        make_record("a", "lease1.pdf", Some("First body")),
        make_record("b", "lease2.pdf", Some("Second body")),
    ];
    let payload = to_summary_report(&records).unwrap();
    let body = &payload.body;

    assert!(body.starts_with("# Lease Lens Summary Report\n"));
    assert!(body.contains("- **Analyses:** 2"));
    assert!(body.contains("- **Total red flags:** 4"));

    let first = body.find("# Lease Analysis: lease1.pdf").unwrap();
    let second = body.find("# Lease Analysis: lease2.pdf").unwrap();
    assert!(first < second);
    assert!(body[first..second].contains("\n---\n"));
    assert!(body.contains("First body") && body.contains("Second body"));
    assert_eq!(payload.mime_type, "text/markdown");
}
