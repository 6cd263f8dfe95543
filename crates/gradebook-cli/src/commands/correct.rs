//! The `gradebook correct` command.

use std::path::PathBuf;

use anyhow::Result;

use gradebook_core::model::format_errors;
use gradebook_core::{Correction, Field, Partition, StudentEntity};
use gradebook_report::{export_csv, export_rejected_csv};
use gradebook_store::Permission;

use super::AppContext;

/// `patch` holds optional new values in [`Field::ALL`] order.
pub fn execute(
    ctx: &AppContext,
    numero: &str,
    patch: [Option<String>; 6],
    accepted_out: Option<PathBuf>,
    rejected_out: Option<PathBuf>,
    input: Option<PathBuf>,
) -> Result<()> {
    let session = ctx.session(Permission::Write)?;
    let mut partition = Partition::from_rows(ctx.read_rows(&ctx.input_path(input))?);

    let updates = Field::ALL
        .into_iter()
        .zip(patch)
        .filter_map(|(field, value)| value.map(|v| (field, v)));

    match partition.correct(numero, updates)? {
        Correction::Promoted => println!("{numero}: corrected and accepted."),
        Correction::StillRejected(errors) => {
            println!("{numero}: still rejected ({})", format_errors(&errors))
        }
    }
    tracing::info!(user = %session.username, numero, "row corrected");

    println!(
        "{} accepted, {} rejected",
        partition.accepted.len(),
        partition.rejected.len()
    );

    if let Some(path) = accepted_out {
        let students: Vec<StudentEntity> =
            partition.accepted.iter().map(StudentEntity::from_row).collect();
        export_csv(&students, &path)?;
        println!("Wrote {}", path.display());
    }
    if let Some(path) = rejected_out {
        export_rejected_csv(&partition.rejected, &path)?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}
