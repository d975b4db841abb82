use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::record::{AnalysisRecord, RiskLevel};

/// Sort key for the history projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    /// Most recent first.
    #[default]
    Date,
    /// File name, ascending.
    Name,
    /// Red-flag count, highest first.
    RedFlags,
}

/// Risk filter for the history projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskFilter {
    #[default]
    All,
    HighRisk,
    LowRisk,
}

impl RiskFilter {
    pub fn admits(&self, record: &AnalysisRecord) -> bool {
        match self {
            RiskFilter::All => true,
            RiskFilter::HighRisk => record.risk_level() == RiskLevel::High,
            RiskFilter::LowRisk => record.risk_level() == RiskLevel::Low,
        }
    }
}

impl std::fmt::Display for SortBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortBy::Date => write!(f, "date"),
            SortBy::Name => write!(f, "name"),
            SortBy::RedFlags => write!(f, "red-flags"),
        }
    }
}

impl std::str::FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "date" => Ok(SortBy::Date),
            "name" => Ok(SortBy::Name),
            "red-flags" | "redflags" | "risk" => Ok(SortBy::RedFlags),
            _ => Err(format!("unknown sort key: {s}")),
        }
    }
}

impl std::fmt::Display for RiskFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskFilter::All => write!(f, "all"),
            RiskFilter::HighRisk => write!(f, "high-risk"),
            RiskFilter::LowRisk => write!(f, "low-risk"),
        }
    }
}

impl std::str::FromStr for RiskFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(RiskFilter::All),
            "high-risk" | "high" => Ok(RiskFilter::HighRisk),
            "low-risk" | "low" => Ok(RiskFilter::LowRisk),
            _ => Err(format!("unknown risk filter: {s}")),
        }
    }
}

/// Parameters of a projection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    pub search_query: String,
    pub sort_by: SortBy,
    pub filter_by: RiskFilter,
}

/// Case-insensitive substring match on file name or summary.
/// Blank queries match everything.
pub fn matches_search(record: &AnalysisRecord, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    record.file_name.to_lowercase().contains(&needle)
        || record.summary.to_lowercase().contains(&needle)
}

/// Sort key approximating the default Unicode collation order.
///
/// Levels compare in order: base letters (accents and case removed, with
/// whitespace < punctuation < digits < letters), then accents, then case
/// (lowercase first).
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct CollationKey {
    primary: Vec<(u8, char)>,
    secondary: Vec<Vec<char>>,
    tertiary: Vec<bool>,
}

fn char_class(c: char) -> u8 {
    if c.is_whitespace() {
        0
    } else if c.is_alphabetic() {
        3
    } else if c.is_numeric() {
        2
    } else {
        1
    }
}

fn collation_key(s: &str) -> CollationKey {
    let mut key = CollationKey {
        primary: Vec::new(),
        secondary: Vec::new(),
        tertiary: Vec::new(),
    };
    for c in s.nfd() {
        if is_combining_mark(c) {
            if let Some(marks) = key.secondary.last_mut() {
                marks.push(c);
            }
            continue;
        }
        for folded in c.to_lowercase() {
            key.primary.push((char_class(folded), folded));
            key.secondary.push(Vec::new());
            key.tertiary.push(c.is_uppercase());
        }
    }
    key
}

/// Locale-style name comparison: accents and case only break ties between
/// otherwise equal names.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

/// Derive the filtered, sorted view of `records`. The input is not modified.
pub fn project(records: &[AnalysisRecord], options: &QueryOptions) -> Vec<AnalysisRecord> {
    let mut view: Vec<AnalysisRecord> = records
        .iter()
        .filter(|r| options.filter_by.admits(r))
        .filter(|r| matches_search(r, &options.search_query))
        .cloned()
        .collect();

    // `sort_by` is stable: ties keep collection order.
    match options.sort_by {
        SortBy::Date => view.sort_by(|a, b| b.analyzed_time().cmp(&a.analyzed_time())),
        SortBy::Name => view.sort_by(|a, b| compare_names(&a.file_name, &b.file_name)),
        SortBy::RedFlags => view.sort_by(|a, b| b.red_flags.cmp(&a.red_flags)),
    }
    view
}
