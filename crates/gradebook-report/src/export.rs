//! CSV and JSON interchange.

use std::path::Path;

use anyhow::{Context, Result};

use gradebook_core::grades;
use gradebook_core::model::{format_errors, Field, CODE_COLUMN};
use gradebook_core::{RejectedRow, StudentEntity};

const AVERAGE_COLUMN: &str = "Moyenne Generale";
const ERRORS_COLUMN: &str = "Erreurs";

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

fn csv_writer(path: &Path) -> Result<csv::Writer<std::fs::File>> {
    create_parent(path)?;
    csv::Writer::from_path(path).with_context(|| format!("failed to create {}", path.display()))
}

/// Write students as CSV, one row each, with their overall average.
///
/// Columns: `CODE`, the six field columns, `Moyenne Generale`.
pub fn export_csv(students: &[StudentEntity], path: &Path) -> Result<()> {
    let mut writer = csv_writer(path)?;

    let mut header = vec![CODE_COLUMN];
    header.extend(Field::ALL.iter().map(|f| f.column()));
    header.push(AVERAGE_COLUMN);
    writer.write_record(&header)?;

    for student in students {
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();
        writer.write_record([
            opt(&student.code),
            opt(&student.numero),
            opt(&student.nom),
            opt(&student.prenom),
            opt(&student.date_naissance),
            opt(&student.classe),
            grades::serialize(student.grades()),
            student
                .overall_average
                .map(|avg| avg.to_string())
                .unwrap_or_default(),
        ])?;
    }

    writer
        .flush()
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), rows = students.len(), "CSV export written");
    Ok(())
}

/// Write rejected rows as CSV with an `Erreurs` column listing their labels.
pub fn export_rejected_csv(rows: &[RejectedRow], path: &Path) -> Result<()> {
    let mut writer = csv_writer(path)?;

    let mut header = vec![CODE_COLUMN];
    header.extend(Field::ALL.iter().map(|f| f.column()));
    header.push(ERRORS_COLUMN);
    writer.write_record(&header)?;

    for rejected in rows {
        let mut record = vec![rejected.row.cell(CODE_COLUMN).unwrap_or("").to_string()];
        record.extend(Field::ALL.iter().map(|&f| rejected.row.get(f).to_string()));
        record.push(format_errors(&rejected.errors));
        writer.write_record(&record)?;
    }

    writer
        .flush()
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), rows = rows.len(), "rejected rows written");
    Ok(())
}

/// Write students as a pretty-printed JSON array.
pub fn export_json(students: &[StudentEntity], path: &Path) -> Result<()> {
    create_parent(path)?;
    let json = serde_json::to_string_pretty(students)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), students = students.len(), "JSON export written");
    Ok(())
}

/// Read students from a JSON array written by [`export_json`].
pub fn import_json(path: &Path) -> Result<Vec<StudentEntity>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let mut students: Vec<StudentEntity> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse JSON: {}", path.display()))?;
    for student in &mut students {
        student.compute_overall_average();
    }
    Ok(students)
}
