//! The `gradebook show` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use gradebook_core::model::format_errors;
use gradebook_core::partition::Found;
use gradebook_core::{Field, Partition, RawRow};

use super::AppContext;

pub fn execute(ctx: &AppContext, numero: &str, input: Option<PathBuf>) -> Result<()> {
    let partition = Partition::from_rows(ctx.read_rows(&ctx.input_path(input))?);

    let (row, status) = match partition.find(numero) {
        Some(Found::Accepted(row)) => (row, "accepted".to_string()),
        Some(Found::Rejected(entry)) => (
            &entry.row,
            format!("rejected ({})", format_errors(&entry.errors)),
        ),
        None => anyhow::bail!("no row with numero '{numero}'"),
    };

    println!("{}", row_table(row));
    println!("Status: {status}");
    Ok(())
}

pub(crate) fn row_table(row: &RawRow) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Field", "Value"]);
    for field in Field::ALL {
        table.add_row(vec![Cell::new(field.column()), Cell::new(row.get(field))]);
    }
    table
}
