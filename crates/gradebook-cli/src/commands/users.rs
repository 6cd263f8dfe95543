//! The `gradebook users` commands.

use anyhow::Result;
use comfy_table::Table;

use gradebook_store::{Permission, Role};

use super::AppContext;

/// Create an account. Anyone may create the first one; after that an admin is needed.
pub fn add(ctx: &AppContext, username: &str, password: &str, role: Role) -> Result<()> {
    let mut store = ctx.credentials()?;

    if !store.is_empty() {
        let session = ctx.session(Permission::Read)?;
        if session.role != Role::Admin {
            anyhow::bail!("only an admin can add users (logged in as {})", session.username);
        }
    }

    store.add_user(username, password, role)?;
    store.save()?;
    println!("Added user {username} ({role}) to {}", store.path().display());
    Ok(())
}

pub fn list(ctx: &AppContext) -> Result<()> {
    let store = ctx.credentials()?;
    if store.is_empty() {
        println!("No users defined.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["User", "Role"]);
    for (name, role) in store.users() {
        table.add_row(vec![name.to_string(), role.to_string()]);
    }
    println!("{table}");
    Ok(())
}
