use std::sync::LazyLock;

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{LeaseLensError, Result};

/// Red-flag count at or above which a record is considered high risk.
pub const HIGH_RISK_THRESHOLD: u32 = 3;

/// Maximum length, in characters, of a derived summary.
const SUMMARY_MAX_CHARS: usize = 200;

static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s{0,3}(#{1,6})\s+(.*?)\s*#*\s*$").expect("heading pattern should compile")
});
static BULLET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[-*+]|\d+[.)])\s+(.*)$").expect("bullet pattern should compile")
});
static TOP_LEVEL_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[-*+]|\d+[.)])\s+\S").expect("list item pattern should compile")
});
static INLINE_MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*|__|`").expect("markup pattern should compile"));

/// Risk classification derived from the red-flag count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskLevel {
    High,
    Low,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::High => write!(f, "high risk"),
            RiskLevel::Low => write!(f, "low risk"),
        }
    }
}

/// One completed lease analysis, as persisted in the history slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    /// Opaque identifier, unique within the history.
    pub id: String,

    /// Original upload name.
    pub file_name: String,

    /// Upload size in bytes.
    pub file_size: u64,

    /// Creation time as an ISO-8601 string. Kept verbatim so exports echo it exactly.
    pub analyzed_at: String,

    /// Short human-readable synopsis.
    pub summary: String,

    /// Number of red flags found in the analysis.
    pub red_flags: u32,

    /// Full analysis text. Absent when only the summary was persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
}

impl AnalysisRecord {
    /// Build a record from the text returned by the analysis service.
    pub fn from_analysis(
        file_name: &str,
        file_size: u64,
        analysis: &str,
        analyzed_at: DateTime<Utc>,
    ) -> Self {
        let analyzed_at = analyzed_at.to_rfc3339_opts(SecondsFormat::Millis, true);
        Self {
            id: derive_id(file_name, &analyzed_at, analysis),
            file_name: file_name.to_string(),
            file_size,
            summary: extract_summary(analysis),
            red_flags: count_red_flags(analysis),
            analyzed_at,
            analysis: Some(analysis.to_string()),
        }
    }

    pub fn risk_level(&self) -> RiskLevel {
        if self.red_flags >= HIGH_RISK_THRESHOLD {
            RiskLevel::High
        } else {
            RiskLevel::Low
        }
    }

    /// Parsed `analyzed_at`, or `None` if the stored string is not a valid timestamp.
    pub fn analyzed_time(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.analyzed_at)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    /// Check the per-record invariants.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(LeaseLensError::CorruptData {
                reason: format!("record for '{}' has an empty id", self.file_name),
            });
        }
        if self.analyzed_time().is_none() {
            return Err(LeaseLensError::CorruptData {
                reason: format!(
                    "record {} has an invalid timestamp '{}'",
                    self.id, self.analyzed_at
                ),
            });
        }
        Ok(())
    }

    /// The analysis body, or `InvalidInput` if only a summary was kept.
    pub fn require_analysis(&self) -> Result<&str> {
        self.analysis
            .as_deref()
            .ok_or_else(|| LeaseLensError::InvalidInput {
                reason: format!("analysis {} has no full text to export", self.id),
            })
    }
}

fn derive_id(file_name: &str, analyzed_at: &str, analysis: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(file_name.as_bytes());
    hasher.update(b"\n");
    hasher.update(analyzed_at.as_bytes());
    hasher.update(b"\n");
    hasher.update(analysis.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}

/// Lines belonging to the first section whose heading contains `title`
/// (case-insensitive), along with that heading's level.
fn section<'a>(text: &'a str, title: &str) -> Option<(usize, Vec<&'a str>)> {
    let title = title.to_lowercase();
    let mut lines = text.lines();
    let level = loop {
        let line = lines.next()?;
        if let Some(caps) = HEADING.captures(line) {
            if caps[2].to_lowercase().contains(&title) {
                break caps[1].len();
            }
        }
    };

    let body = lines
        .take_while(|line| {
            HEADING
                .captures(line)
                .is_none_or(|caps| caps[1].len() > level)
        })
        .collect();
    Some((level, body))
}

fn strip_markup(line: &str) -> String {
    INLINE_MARKUP.replace_all(line, "").trim().to_string()
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated.trim_end())
    }
}

/// Bullet points of the "Plain English Summary" section, joined; falls back
/// to the first prose line of the report.
pub fn extract_summary(analysis: &str) -> String {
    let from_section = section(analysis, "plain english summary")
        .map(|(_, body)| {
            body.iter()
                .filter_map(|line| BULLET.captures(line))
                .map(|caps| strip_markup(&caps[1]))
                .filter(|item| !item.is_empty())
                .collect::<Vec<_>>()
                .join("; ")
        })
        .filter(|joined| !joined.is_empty());

    let summary = from_section.unwrap_or_else(|| {
        analysis
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty() && !HEADING.is_match(line))
            .map(strip_markup)
            .unwrap_or_default()
    });

    truncate_chars(&summary, SUMMARY_MAX_CHARS)
}

/// Number of red flags listed under the "Red Flag Analysis" section.
///
/// Sub-headings are counted when present; otherwise top-level list items.
pub fn count_red_flags(analysis: &str) -> u32 {
    let Some((level, body)) = section(analysis, "red flag") else {
        return 0;
    };

    let sub_headings = body
        .iter()
        .filter(|line| {
            HEADING
                .captures(line)
                .is_some_and(|caps| caps[1].len() > level)
        })
        .count();

    let count = if sub_headings > 0 {
        sub_headings
    } else {
        body.iter().filter(|line| TOP_LEVEL_ITEM.is_match(line)).count()
    };
    u32::try_from(count).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const REPORT: &str = "# Lease Lens Report\n\
        \n\
        ## Plain English Summary\n\
        - **Monthly Rent:** $1,500\n\
        - **Lease Term (Start/End Dates):** 12 months\n\
        \n\
        ## Red Flag Analysis\n\
        - **Automatic Renewal:** renews without notice\n\
        \x20 - quote: \"shall renew\"\n\
        - **Early Termination:** two months rent\n\
        - **Landlord Access:** no notice required\n\
        \n\
        ## Questions to Ask Your Landlord\n\
        1. Can the renewal clause be removed?\n";

    #[test]
    fn test_summary_from_section_bullets() {
        let summary = extract_summary(REPORT);
        assert_eq!(
            summary,
            "Monthly Rent: $1,500; Lease Term (Start/End Dates): 12 months"
        );
    }

    #[test]
    fn test_summary_fallback_to_first_prose_line() {
        let summary = extract_summary("# Title\n\nThe lease looks standard.\n");
        assert_eq!(summary, "The lease looks standard.");
    }

    #[test]
    fn test_summary_truncated() {
        let long = "x".repeat(500);
        let summary = extract_summary(&long);
        assert!(summary.ends_with("..."));
        assert_eq!(summary.chars().count(), SUMMARY_MAX_CHARS + 3);
    }

    #[test]
    fn test_red_flags_counts_top_level_items_only() {
        assert_eq!(count_red_flags(REPORT), 3);
    }

    #[test]
    fn test_red_flags_prefers_sub_headings() {
        let report = "## Red Flag Analysis\n### Renewal\n- detail\n- more\n### Fees\n- detail\n## Next\n- x\n";
        assert_eq!(count_red_flags(report), 2);
    }

    #[test]
    fn test_red_flags_missing_section() {
        assert_eq!(count_red_flags("no headings here"), 0);
    }

    #[test]
    fn test_from_analysis_fields() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let record = AnalysisRecord::from_analysis("lease.pdf", 2048, REPORT, at);
        assert_eq!(record.analyzed_at, "2024-01-01T10:00:00.000Z");
        assert_eq!(record.id.len(), 16);
        assert_eq!(record.red_flags, 3);
        assert_eq!(record.risk_level(), RiskLevel::High);
        assert!(record.validate().is_ok());

        let again = AnalysisRecord::from_analysis("lease.pdf", 2048, REPORT, at);
        assert_eq!(record.id, again.id);
    }

    #[test]
    fn test_serde_uses_camel_case_and_omits_missing_analysis() {
        let record = AnalysisRecord {
            id: "a".into(),
            file_name: "lease1.pdf".into(),
            file_size: 10,
            analyzed_at: "2024-01-01T10:00:00Z".into(),
            summary: "s".into(),
            red_flags: 4,
            analysis: None,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"fileName\":\"lease1.pdf\""));
        assert!(json.contains("\"redFlags\":4"));
        assert!(!json.contains("analysis\""));
    }

    #[test]
    fn test_validate_rejects_bad_timestamp() {
        let record = AnalysisRecord {
            id: "a".into(),
            file_name: "lease1.pdf".into(),
            file_size: 10,
            analyzed_at: "yesterday".into(),
            summary: String::new(),
            red_flags: 0,
            analysis: None,
        };
        assert!(matches!(
            record.validate(),
            Err(LeaseLensError::CorruptData { .. })
        ));
    }
}
