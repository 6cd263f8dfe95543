//! The `gradebook stats` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use super::AppContext;

pub async fn execute(ctx: &AppContext, input: Option<PathBuf>) -> Result<()> {
    let registry = ctx.load_registry(&ctx.input_path(input)).await?;
    let stats = registry.statistics();

    println!("Total students: {}", stats.total);
    println!("Valid: {}", stats.valid_count);
    println!("Invalid: {}", stats.invalid_count);

    let classes = registry.class_summaries();
    if !classes.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Classe", "Students", "Mean", "Min", "Max"]);
        for c in &classes {
            table.add_row(vec![
                Cell::new(&c.classe),
                Cell::new(c.student_count),
                Cell::new(format!("{:.2}", c.mean_average)),
                Cell::new(format!("{:.2}", c.min_average)),
                Cell::new(format!("{:.2}", c.max_average)),
            ]);
        }
        println!("\n{table}");
    }

    let subjects = registry.subject_averages();
    if !subjects.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Subject", "Students", "Mean"]);
        for s in &subjects {
            table.add_row(vec![
                Cell::new(&s.subject),
                Cell::new(s.student_count),
                Cell::new(format!("{:.2}", s.mean_average)),
            ]);
        }
        println!("\n{table}");
    }

    Ok(())
}
