use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::export::{ExportFormat, ExportPayload};
use crate::flags::{FlagSource, ANALYSIS_EXPORT};

use super::{report_notice, CliContext};

/// Write one analysis in the chosen format.
pub fn run_export(
    ctx: &CliContext,
    id: &str,
    format: ExportFormat,
    out: Option<&Path>,
) -> anyhow::Result<()> {
    warn_if_disabled(ctx);
    let mut view = ctx.open_view();
    report_notice(&mut view);

    let payload = view.export_record(id, format)?;
    let path = save(&payload, out)?;
    eprintln!(
        "lease-lens: exported {} ({}) to {}",
        id,
        payload.mime_type,
        path.display()
    );
    Ok(())
}

/// Write the combined summary report.
pub fn run_export_all(ctx: &CliContext, out: Option<&Path>) -> anyhow::Result<()> {
    warn_if_disabled(ctx);
    let mut view = ctx.open_view();
    report_notice(&mut view);

    let payload = view.export_all()?;
    let path = save(&payload, out)?;
    eprintln!("lease-lens: wrote summary report to {}", path.display());
    Ok(())
}

fn warn_if_disabled(ctx: &CliContext) {
    if !ctx.flags.is_enabled(ANALYSIS_EXPORT, true) {
        tracing::warn!("{ANALYSIS_EXPORT} is switched off; exporting anyway");
    }
}

fn save(payload: &ExportPayload, out: Option<&Path>) -> anyhow::Result<PathBuf> {
    let dir = out.unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(&payload.file_name);
    std::fs::write(&path, &payload.body)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
