use crate::export::format_file_size;
use crate::flags::{FlagSource, UiVariant, KNOWN_FLAGS};
use crate::history::HistoryStats;
use crate::query::{RiskFilter, SortBy};
use crate::record::AnalysisRecord;

use super::{report_notice, CliContext};

/// Print the filtered, sorted history.
pub fn run_history(
    ctx: &CliContext,
    search: &str,
    sort: SortBy,
    filter: RiskFilter,
) -> anyhow::Result<()> {
    let mut view = ctx.open_view();
    report_notice(&mut view);

    if view.records().is_empty() {
        println!("No analyses yet.");
        return Ok(());
    }

    view.set_filter_by(filter);
    view.set_sort_by(sort);
    view.set_search_query(search);

    let rows = view.projection();
    match view.variant() {
        UiVariant::Enhanced => {
            print_stats(&view.stats());
            print_table(rows);
        }
        UiVariant::Classic => {
            for record in rows {
                println!(
                    "{}  {}  {}  {} red flag(s)",
                    record.id, record.file_name, record.analyzed_at, record.red_flags
                );
            }
        }
    }

    println!(
        "\n{} of {} {}",
        rows.len(),
        view.records().len(),
        if view.records().len() == 1 {
            "analysis"
        } else {
            "analyses"
        }
    );
    Ok(())
}

fn print_stats(stats: &HistoryStats) {
    println!("Total analyses: {}", stats.total);
    println!("Red flags found: {}", stats.total_red_flags);
    println!(
        "Last analysis:  {}\n",
        stats.last_analyzed_at.as_deref().unwrap_or("None")
    );
}

fn print_table(rows: &[AnalysisRecord]) {
    println!(
        "{:<16}  {:<32}  {:>10}  {:<24}  {:>5}  RISK",
        "ID", "FILE", "SIZE", "ANALYZED", "FLAGS"
    );
    for record in rows {
        println!(
            "{:<16}  {:<32}  {:>10}  {:<24}  {:>5}  {}",
            record.id,
            truncate(&record.file_name, 32),
            format_file_size(record.file_size),
            record.analyzed_at,
            record.red_flags,
            record.risk_level()
        );
        if !record.summary.is_empty() {
            println!("{:<16}  {}", "", truncate(&record.summary, 96));
        }
    }
}

/// Delete the whole history.
pub fn run_clear(ctx: &CliContext) -> anyhow::Result<()> {
    let mut view = ctx.open_view();
    let count = view.records().len();
    view.clear_all()?;
    eprintln!("lease-lens: cleared {} analysis record(s)", count);
    Ok(())
}

/// Print resolved feature flags and the UI variant they select.
pub fn run_flags(ctx: &CliContext) -> anyhow::Result<()> {
    for flag in KNOWN_FLAGS {
        println!("{}: {}", flag, ctx.flags.is_enabled(flag, false));
    }
    println!("ui variant: {}", UiVariant::select(&ctx.flags));
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}
