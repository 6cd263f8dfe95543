//! The `gradebook report` command.

use std::path::PathBuf;

use anyhow::Result;

use gradebook_report::{write_class_report, write_student_report};

use super::AppContext;

pub async fn execute(
    ctx: &AppContext,
    numero: Option<String>,
    class: Option<String>,
    out: PathBuf,
    input: Option<PathBuf>,
) -> Result<()> {
    let registry = ctx.load_registry(&ctx.input_path(input)).await?;

    match (numero, class) {
        (Some(numero), _) => {
            let student = registry
                .accepted()
                .iter()
                .find(|s| s.numero.as_deref() == Some(numero.as_str()))
                .ok_or_else(|| anyhow::anyhow!("no accepted student with numero '{numero}'"))?;
            write_student_report(student, &out)?;
        }
        (None, Some(class)) => {
            let students = registry.search_by_class(&class);
            write_class_report(&class, &students, &out)?;
        }
        (None, None) => anyhow::bail!("pass --numero or --class"),
    }

    println!("Wrote {}", out.display());
    Ok(())
}
