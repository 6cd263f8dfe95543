//! Core data model types for gradebook.
//!
//! Rows arrive as loosely-typed column → value maps. Everything downstream of
//! ingestion addresses cells through [`Field`], so the accepted column
//! spellings are resolved exactly once, in [`RawRow::from_cells`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Column holding the optional external student code.
pub const CODE_COLUMN: &str = "CODE";

/// A validated field of a student row, in validation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Numero,
    Nom,
    Prenom,
    DateNaissance,
    Classe,
    Note,
}

impl Field {
    /// Every field, in the order validation checks them.
    pub const ALL: [Field; 6] = [
        Field::Numero,
        Field::Nom,
        Field::Prenom,
        Field::DateNaissance,
        Field::Classe,
        Field::Note,
    ];

    /// Canonical column label.
    pub fn column(self) -> &'static str {
        match self {
            Field::Numero => "Numero",
            Field::Nom => "Nom",
            Field::Prenom => "Prenom",
            Field::DateNaissance => "Date de naissance",
            Field::Classe => "Classe",
            Field::Note => "Note",
        }
    }

    /// Alternate spellings accepted at ingestion.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Field::Prenom => &["Prénom"],
            Field::DateNaissance => &["Date"],
            _ => &[],
        }
    }

    /// Resolve a column label (canonical or alias) to its field.
    pub fn from_column(label: &str) -> Option<Field> {
        Field::ALL
            .into_iter()
            .find(|f| f.column() == label || f.aliases().contains(&label))
    }

    /// The error reported when this field fails validation.
    pub fn error(self) -> FieldError {
        match self {
            Field::Numero => FieldError::Numero,
            Field::Nom => FieldError::Nom,
            Field::Prenom => FieldError::Prenom,
            Field::DateNaissance => FieldError::Date,
            Field::Classe => FieldError::Classe,
            Field::Note => FieldError::Notes,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// A single failing field. Serialized as its human-readable label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldError {
    #[serde(rename = "Numero invalide")]
    Numero,
    #[serde(rename = "Nom invalide")]
    Nom,
    #[serde(rename = "Prenom invalide")]
    Prenom,
    #[serde(rename = "Date invalide")]
    Date,
    #[serde(rename = "Classe invalide")]
    Classe,
    #[serde(rename = "Notes invalides")]
    Notes,
}

impl FieldError {
    pub fn label(self) -> &'static str {
        match self {
            FieldError::Numero => "Numero invalide",
            FieldError::Nom => "Nom invalide",
            FieldError::Prenom => "Prenom invalide",
            FieldError::Date => "Date invalide",
            FieldError::Classe => "Classe invalide",
            FieldError::Notes => "Notes invalides",
        }
    }

    pub fn field(self) -> Field {
        match self {
            FieldError::Numero => Field::Numero,
            FieldError::Nom => Field::Nom,
            FieldError::Prenom => Field::Prenom,
            FieldError::Date => Field::DateNaissance,
            FieldError::Classe => Field::Classe,
            FieldError::Notes => Field::Note,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Join error labels for display, e.g. `"Numero invalide, Date invalide"`.
pub fn format_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// One record as ingested: column label → cell value.
///
/// Columns other than the six validated fields (such as `CODE`) are kept
/// untouched so they survive export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow {
    cells: BTreeMap<String, String>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from raw `(column, value)` pairs.
    ///
    /// Column labels are trimmed and alternate spellings are mapped onto the
    /// canonical label. When both spellings are present the canonical one wins.
    pub fn from_cells<I, K, V>(cells: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut row = RawRow::new();
        let mut aliased = Vec::new();

        for (column, value) in cells {
            let column = column.as_ref().trim();
            match Field::from_column(column) {
                Some(field) if field.column() != column => aliased.push((field, value.into())),
                _ => {
                    row.cells.insert(column.to_string(), value.into());
                }
            }
        }

        for (field, value) in aliased {
            row.cells.entry(field.column().to_string()).or_insert(value);
        }

        row
    }

    /// Value of a field, or `""` when the cell is absent.
    pub fn get(&self, field: Field) -> &str {
        self.cells
            .get(field.column())
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.cells.insert(field.column().to_string(), value.into());
    }

    /// Value of an arbitrary column (including non-field columns like `CODE`).
    pub fn cell(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    pub fn set_cell(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.cells.insert(column.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn numero(&self) -> &str {
        self.get(Field::Numero)
    }
}

/// A row that failed validation, with its errors in field-check order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedRow {
    pub row: RawRow,
    pub errors: Vec<FieldError>,
}

impl RejectedRow {
    pub fn numero(&self) -> &str {
        self.row.numero()
    }
}

/// Direction for registry sorts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Ascending => write!(f, "ascending"),
            SortOrder::Descending => write!(f, "descending"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" | "a" => Ok(SortOrder::Ascending),
            "desc" | "descending" | "d" => Ok(SortOrder::Descending),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_to_canonical_columns() {
        let row = RawRow::from_cells([
            ("Numero", "AB12345"),
            ("Prénom", "Awa"),
            ("Date", "15/04/02"),
            (" Classe ", "4emA"),
        ]);
        assert_eq!(row.get(Field::Prenom), "Awa");
        assert_eq!(row.get(Field::DateNaissance), "15/04/02");
        assert_eq!(row.get(Field::Classe), "4emA");
        assert!(row.cell("Prénom").is_none());
        assert!(row.cell("Date").is_none());
    }

    #[test]
    fn canonical_spelling_wins_over_alias() {
        let row = RawRow::from_cells([("Prénom", "Alias"), ("Prenom", "Canonical")]);
        assert_eq!(row.get(Field::Prenom), "Canonical");

        let row = RawRow::from_cells([("Prenom", "Canonical"), ("Prénom", "Alias")]);
        assert_eq!(row.get(Field::Prenom), "Canonical");
    }

    #[test]
    fn missing_cells_read_as_empty() {
        let row = RawRow::from_cells([("CODE", "X1")]);
        assert_eq!(row.get(Field::Note), "");
        assert_eq!(row.cell(CODE_COLUMN), Some("X1"));
    }

    #[test]
    fn field_error_labels_and_serde() {
        assert_eq!(FieldError::Notes.to_string(), "Notes invalides");
        assert_eq!(Field::DateNaissance.error(), FieldError::Date);
        assert_eq!(FieldError::Date.field(), Field::DateNaissance);

        let json = serde_json::to_string(&vec![FieldError::Numero, FieldError::Classe]).unwrap();
        assert_eq!(json, r#"["Numero invalide","Classe invalide"]"#);
        let back: Vec<FieldError> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vec![FieldError::Numero, FieldError::Classe]);
    }

    #[test]
    fn format_errors_joins_labels() {
        assert_eq!(
            format_errors(&[FieldError::Numero, FieldError::Date]),
            "Numero invalide, Date invalide"
        );
        assert_eq!(format_errors(&[]), "");
    }

    #[test]
    fn sort_order_display_and_parse() {
        assert_eq!(SortOrder::Ascending.to_string(), "ascending");
        assert_eq!("DESC".parse::<SortOrder>().unwrap(), SortOrder::Descending);
        assert_eq!("a".parse::<SortOrder>().unwrap(), SortOrder::Ascending);
        assert!("sideways".parse::<SortOrder>().is_err());
    }
}
