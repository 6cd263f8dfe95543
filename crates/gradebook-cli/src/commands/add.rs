//! The `gradebook add` command.

use std::path::PathBuf;

use anyhow::Result;

use gradebook_core::model::format_errors;
use gradebook_core::{Field, Partition, Placement, RawRow};

use super::show::row_table;
use super::AppContext;

/// `values` holds the six fields in [`Field::ALL`] order.
pub fn execute(ctx: &AppContext, values: [String; 6], input: Option<PathBuf>) -> Result<()> {
    let path = ctx.input_path(input);
    let mut partition = if path.exists() {
        Partition::from_rows(ctx.read_rows(&path)?)
    } else {
        Partition::new()
    };

    let row = RawRow::from_cells(Field::ALL.iter().map(|f| f.column()).zip(values));
    let numero = row.numero().to_string();
    if partition.find(&numero).is_some() {
        println!("Warning: numero {numero} is already present in {}", path.display());
    }

    match partition.add(row) {
        Placement::Accepted => {
            if let Some(added) = partition.accepted.last() {
                println!("{}", row_table(added));
            }
            println!("Accepted.");
        }
        Placement::Rejected(errors) => {
            println!("Rejected: {}", format_errors(&errors));
        }
    }

    println!(
        "{} accepted, {} rejected",
        partition.accepted.len(),
        partition.rejected.len()
    );
    Ok(())
}
