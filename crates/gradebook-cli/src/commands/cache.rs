//! The `gradebook cache` commands.

use anyhow::Result;

use gradebook_store::{create_cache, Permission};

use super::AppContext;

pub async fn clear(ctx: &AppContext) -> Result<()> {
    ctx.session(Permission::Delete)?;
    let Some(cache) = create_cache(&ctx.config.cache) else {
        println!("Cache is disabled.");
        return Ok(());
    };
    let removed = cache.clear().await?;
    println!("Removed {removed} cache entr{}.", if removed == 1 { "y" } else { "ies" });
    Ok(())
}
