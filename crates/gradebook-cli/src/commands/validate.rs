//! The `gradebook validate` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use gradebook_core::model::format_errors;
use gradebook_core::{Field, Partition};

use super::AppContext;

pub fn execute(
    ctx: &AppContext,
    input: Option<PathBuf>,
    show_valid: bool,
    limit: Option<usize>,
) -> Result<()> {
    let path = ctx.input_path(input);
    let partition = Partition::from_rows(ctx.read_rows(&path)?);
    let (accepted, rejected) = partition.head(limit.unwrap_or(usize::MAX));

    println!(
        "{}: {} rows, {} accepted, {} rejected",
        path.display(),
        partition.len(),
        partition.accepted.len(),
        partition.rejected.len()
    );

    if show_valid && !accepted.is_empty() {
        let mut table = Table::new();
        table.set_header(Field::ALL.iter().map(|f| f.column()).collect::<Vec<_>>());
        for row in accepted {
            table.add_row(Field::ALL.iter().map(|&f| Cell::new(row.get(f))).collect::<Vec<_>>());
        }
        println!("\nAccepted:\n{table}");
    }

    if partition.rejected.is_empty() {
        println!("All rows valid.");
    } else if !rejected.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Numero", "Nom", "Prenom", "Erreurs"]);
        for entry in rejected {
            table.add_row(vec![
                Cell::new(entry.row.get(Field::Numero)),
                Cell::new(entry.row.get(Field::Nom)),
                Cell::new(entry.row.get(Field::Prenom)),
                Cell::new(format_errors(&entry.errors)),
            ]);
        }
        println!("\nRejected:\n{table}");
    }

    Ok(())
}
