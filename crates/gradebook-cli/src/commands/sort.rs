//! The `gradebook sort` command.

use std::path::PathBuf;

use anyhow::Result;

use gradebook_core::SortOrder;

use super::{student_table, AppContext};
use crate::SortKey;

pub async fn execute(
    ctx: &AppContext,
    by: SortKey,
    order: Option<SortOrder>,
    limit: Option<usize>,
    input: Option<PathBuf>,
) -> Result<()> {
    let registry = ctx.load_registry(&ctx.input_path(input)).await?;

    let sorted = match by {
        SortKey::Average => registry.sort_by_average(order.unwrap_or(SortOrder::Descending)),
        SortKey::Name => registry.sort_by_name(order.unwrap_or(SortOrder::Ascending)),
    };

    let shown = sorted.into_iter().take(limit.unwrap_or(usize::MAX));
    println!("{}", student_table(shown));
    Ok(())
}
