//! The `gradebook export` command.

use std::path::PathBuf;

use anyhow::Result;

use gradebook_core::RejectedRow;
use gradebook_report::{export_csv, export_json, export_rejected_csv};
use gradebook_store::Permission;

use super::AppContext;
use crate::ExportFormat;

pub async fn execute(
    ctx: &AppContext,
    format: ExportFormat,
    output: Option<PathBuf>,
    input: Option<PathBuf>,
) -> Result<()> {
    ctx.session(Permission::Export)?;
    let registry = ctx.load_registry(&ctx.input_path(input)).await?;
    let output = output.unwrap_or_else(|| ctx.config.output_dir.clone());

    if matches!(format, ExportFormat::Csv | ExportFormat::All) {
        let path = output.join("eleves_valides.csv");
        export_csv(registry.accepted(), &path)?;
        println!("Wrote {} ({} students)", path.display(), registry.accepted().len());

        let rejected: Vec<RejectedRow> = registry
            .rejected()
            .iter()
            .map(|r| RejectedRow {
                row: r.row.clone(),
                errors: r.errors.clone(),
            })
            .collect();
        let path = output.join("eleves_rejetes.csv");
        export_rejected_csv(&rejected, &path)?;
        println!("Wrote {} ({} students)", path.display(), rejected.len());
    }

    if matches!(format, ExportFormat::Json | ExportFormat::All) {
        let path = output.join("eleves_valides.json");
        export_json(registry.accepted(), &path)?;
        println!("Wrote {} ({} students)", path.display(), registry.accepted().len());
    }

    Ok(())
}
