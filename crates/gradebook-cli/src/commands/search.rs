//! The `gradebook search` command.

use std::path::PathBuf;

use anyhow::Result;

use super::{student_table, AppContext};

pub async fn execute(
    ctx: &AppContext,
    name: Option<String>,
    class: Option<String>,
    input: Option<PathBuf>,
) -> Result<()> {
    let registry = ctx.load_registry(&ctx.input_path(input)).await?;

    let (hits, query) = match (name, class) {
        (Some(name), _) => (registry.search_by_name(&name), format!("name '{name}'")),
        (None, Some(class)) => (registry.search_by_class(&class), format!("class '{class}'")),
        (None, None) => anyhow::bail!("pass --name or --class"),
    };

    if hits.is_empty() {
        println!("No accepted student matches {query}.");
    } else {
        println!("{}", student_table(hits.iter().copied()));
        println!("{} student(s) match {query}.", hits.len());
    }
    Ok(())
}
