//! The `gradebook import` command.

use std::path::PathBuf;

use anyhow::Result;

use gradebook_core::model::format_errors;
use gradebook_core::StudentRegistry;
use gradebook_report::import_json;
use gradebook_store::Permission;

use super::{student_table, AppContext};

pub fn execute(ctx: &AppContext, json: PathBuf) -> Result<()> {
    ctx.session(Permission::Import)?;
    let registry = StudentRegistry::from_students(import_json(&json)?);
    let stats = registry.statistics();

    println!("Imported {} students from {}", stats.total, json.display());
    println!("Valid: {}", stats.valid_count);
    println!("Invalid: {}", stats.invalid_count);

    if !registry.accepted().is_empty() {
        println!("{}", student_table(registry.accepted()));
    }
    for rejected in registry.rejected() {
        println!(
            "  [{}] {}",
            rejected.student.numero.as_deref().unwrap_or("?"),
            format_errors(&rejected.errors)
        );
    }
    Ok(())
}
