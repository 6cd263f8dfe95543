//! Whole-row validation and normalization.

use crate::grades;
use crate::model::{Field, FieldError, RawRow};
use crate::validators;

/// `true` when the grade cell passes the coarse syntax check and every
/// segment parses into a grade record.
pub fn grades_valid(value: &str) -> bool {
    validators::grade_blob_syntactically_valid(value) && grades::parse(value).is_clean()
}

fn field_valid(field: Field, value: &str) -> bool {
    match field {
        Field::Numero => validators::identifier_valid(value),
        Field::Nom | Field::Prenom => validators::name_valid(value),
        Field::DateNaissance => validators::date_valid(value),
        Field::Classe => validators::class_code_valid(value),
        Field::Note => grades_valid(value),
    }
}

/// Check every field of a row and collect one error per failing field.
///
/// Fields are checked in [`Field::ALL`] order and all of them are checked,
/// so the result lists every problem with the row. An empty result means the
/// row is acceptable.
pub fn validate_row(row: &RawRow) -> Vec<FieldError> {
    Field::ALL
        .into_iter()
        .filter(|&field| !field_valid(field, row.get(field)))
        .map(Field::error)
        .collect()
}

/// Rewrite the birth date and class code of a row to canonical form.
///
/// Cells that do not normalize are left untouched; callers only normalize
/// rows that passed [`validate_row`].
pub fn normalize_row(row: &RawRow) -> RawRow {
    let mut normalized = row.clone();
    if let Some(date) = validators::birth_date_normalize(row.get(Field::DateNaissance)) {
        normalized.set(Field::DateNaissance, date);
    }
    if let Some(class) = validators::class_code_normalize(row.get(Field::Classe)) {
        normalized.set(Field::Classe, class);
    }
    normalized
}
