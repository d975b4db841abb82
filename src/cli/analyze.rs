use std::path::Path;

use anyhow::bail;

use crate::client::HttpAnalysisClient;
use crate::history::{analyze_upload, AnalysisOutcome};

use super::{report_notice, CliContext};

/// Validate a PDF, send it for analysis and append the result.
/// Ctrl-C abandons the request; a late reply is never stored.
pub async fn run_analyze(ctx: &CliContext, file: &Path) -> anyhow::Result<()> {
    let upload = ctx.config.upload_policy().from_path(file)?;
    let client = HttpAnalysisClient::new(&ctx.config.endpoint, ctx.config.request_timeout_secs)?;

    let mut view = ctx.open_view();
    report_notice(&mut view);

    eprintln!(
        "lease-lens: analyzing {} via {}...",
        upload.file_name(),
        client.endpoint()
    );

    let ticket = view.begin_analysis();
    let outcome = tokio::select! {
        result = analyze_upload(&client, &upload) => view.complete_analysis(ticket, result),
        _ = tokio::signal::ctrl_c() => {
            view.abandon();
            eprintln!("lease-lens: analysis abandoned.");
            return Ok(());
        }
    };

    match outcome {
        AnalysisOutcome::Recorded(id) => {
            if let Some(record) = view.find(&id) {
                println!("{}", record.analysis.as_deref().unwrap_or_default());
                eprintln!(
                    "lease-lens: saved analysis {} ({} red flag(s), {})",
                    id,
                    record.red_flags,
                    record.risk_level()
                );
            }
            Ok(())
        }
        AnalysisOutcome::Discarded => {
            eprintln!("lease-lens: analysis result discarded.");
            Ok(())
        }
        AnalysisOutcome::Failed(message) => bail!(message),
    }
}
