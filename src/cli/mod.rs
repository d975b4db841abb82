pub mod analyze;
pub mod export;
pub mod history;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::export::ExportFormat;
use crate::flags::{StaticFlags, UiVariant};
use crate::history::HistoryView;
use crate::query::{RiskFilter, SortBy};
use crate::storage::file::FileStore;

/// Analyze lease PDFs and browse the local analysis history.
#[derive(Debug, Parser)]
#[command(name = "lease-lens", version, about)]
pub struct Cli {
    /// Enable debug logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// History file to use instead of the configured one.
    #[arg(long, global = true, value_name = "PATH")]
    pub history_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Upload a lease PDF for analysis and save the result to the history.
    Analyze {
        /// Path to the lease PDF.
        file: PathBuf,
    },

    /// List past analyses.
    History {
        /// Case-insensitive match on file name or summary.
        #[arg(long, default_value = "")]
        search: String,

        /// date, name or red-flags.
        #[arg(long, default_value_t = SortBy::Date)]
        sort: SortBy,

        /// all, high-risk or low-risk.
        #[arg(long, default_value_t = RiskFilter::All)]
        filter: RiskFilter,
    },

    /// Export one analysis to a file.
    Export {
        /// Analysis id, as shown by `history`.
        id: String,

        /// markdown, text or html.
        #[arg(long, default_value_t = ExportFormat::Markdown)]
        format: ExportFormat,

        /// Output directory (default: current directory).
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },

    /// Export every analysis into one markdown summary report.
    ExportAll {
        /// Output directory (default: current directory).
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },

    /// Delete the analysis history.
    Clear,

    /// Show resolved feature flags.
    Flags,
}

/// Resolved configuration shared by the subcommands.
pub struct CliContext {
    pub config: Config,
    pub flags: StaticFlags,
}

impl CliContext {
    pub fn load(history_file: Option<PathBuf>) -> anyhow::Result<Self> {
        let mut config = Config::load()?;
        if history_file.is_some() {
            config.history_file = history_file;
        }
        let flags = config.feature_flags();
        Ok(Self { config, flags })
    }

    /// Open the history view over the configured file, selecting the UI
    /// variant from the flags once.
    pub fn open_view(&self) -> HistoryView {
        let store = FileStore::new(self.config.history_path());
        tracing::debug!("using history file {}", store.path().display());
        HistoryView::open(Box::new(store), UiVariant::select(&self.flags))
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = CliContext::load(cli.history_file)?;
    match cli.command {
        Command::Analyze { file } => analyze::run_analyze(&ctx, &file).await,
        Command::History {
            search,
            sort,
            filter,
        } => history::run_history(&ctx, &search, sort, filter),
        Command::Export { id, format, out } => {
            export::run_export(&ctx, &id, format, out.as_deref())
        }
        Command::ExportAll { out } => export::run_export_all(&ctx, out.as_deref()),
        Command::Clear => history::run_clear(&ctx),
        Command::Flags => history::run_flags(&ctx),
    }
}

/// Print a load notice, if the view raised one.
fn report_notice(view: &mut HistoryView) {
    if let Some(notice) = view.take_notice() {
        eprintln!("lease-lens: {notice}");
    }
}
