//! A student as a typed record with parsed grades.

use serde::{Deserialize, Serialize};

use crate::grades::{self, GradeTable, MalformedSegment};
use crate::model::{Field, FieldError, RawRow, CODE_COLUMN};
use crate::validation::validate_row;

/// One student. Identity fields are optional so that partially-filled rows
/// can still be represented.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentEntity {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub numero: Option<String>,
    #[serde(default)]
    pub nom: Option<String>,
    #[serde(default)]
    pub prenom: Option<String>,
    #[serde(default)]
    pub date_naissance: Option<String>,
    #[serde(default)]
    pub classe: Option<String>,
    #[serde(default)]
    grades: GradeTable,
    #[serde(default)]
    pub overall_average: Option<f64>,
    /// Grade segments that could not be parsed when the entity was built.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grade_errors: Vec<MalformedSegment>,
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl StudentEntity {
    /// Build an entity from identity fields and an already-parsed grade table.
    ///
    /// The overall average is computed immediately.
    pub fn new(
        numero: impl AsRef<str>,
        nom: impl AsRef<str>,
        prenom: impl AsRef<str>,
        date_naissance: impl AsRef<str>,
        classe: impl AsRef<str>,
        grades: GradeTable,
    ) -> Self {
        let mut student = StudentEntity {
            numero: non_blank(numero.as_ref()),
            nom: non_blank(nom.as_ref()),
            prenom: non_blank(prenom.as_ref()),
            date_naissance: non_blank(date_naissance.as_ref()),
            classe: non_blank(classe.as_ref()),
            grades,
            ..Default::default()
        };
        student.compute_overall_average();
        student
    }

    /// Build an entity from a row, parsing its grade cell.
    pub fn from_row(row: &RawRow) -> Self {
        let parsed = grades::parse(row.get(Field::Note));
        let mut student = StudentEntity {
            code: row.cell(CODE_COLUMN).and_then(non_blank),
            numero: non_blank(row.get(Field::Numero)),
            nom: non_blank(row.get(Field::Nom)),
            prenom: non_blank(row.get(Field::Prenom)),
            date_naissance: non_blank(row.get(Field::DateNaissance)),
            classe: non_blank(row.get(Field::Classe)),
            grades: parsed.table,
            overall_average: None,
            grade_errors: parsed.malformed,
        };
        student.compute_overall_average();
        student
    }

    /// The row this entity would be written back as.
    ///
    /// Malformed grade segments are appended after the parsed ones, so the
    /// written row fails validation the same way the source did.
    pub fn to_row(&self) -> RawRow {
        let mut row = RawRow::new();
        if let Some(code) = &self.code {
            row.set_cell(CODE_COLUMN, code.as_str());
        }
        let identity = [
            (Field::Numero, &self.numero),
            (Field::Nom, &self.nom),
            (Field::Prenom, &self.prenom),
            (Field::DateNaissance, &self.date_naissance),
            (Field::Classe, &self.classe),
        ];
        for (field, value) in identity {
            row.set(field, value.as_deref().unwrap_or(""));
        }
        let mut note = grades::serialize(&self.grades);
        for bad in &self.grade_errors {
            if !note.is_empty() {
                note.push_str(" #");
            }
            note.push_str(&bad.segment);
        }
        row.set(Field::Note, note);
        row
    }

    pub fn grades(&self) -> &GradeTable {
        &self.grades
    }

    pub fn average_for_subject(&self, subject: &str) -> f64 {
        self.grades.subject_average(subject)
    }

    /// Recompute and store the overall average.
    ///
    /// Left unset for a student without any subject.
    pub fn compute_overall_average(&mut self) -> Option<f64> {
        self.overall_average = (!self.grades.is_empty()).then(|| self.grades.overall_average());
        self.overall_average
    }

    /// Overall average for ranking; a missing average counts as 0.
    pub fn average_or_zero(&self) -> f64 {
        self.overall_average.unwrap_or(0.0)
    }

    /// Validate the entity as if it were a row; see [`to_row`](Self::to_row).
    pub fn validation_errors(&self) -> Vec<FieldError> {
        validate_row(&self.to_row())
    }

    pub fn is_valid(&self) -> bool {
        self.validation_errors().is_empty()
    }

    /// `"Nom Prenom"`, skipping missing parts.
    pub fn display_name(&self) -> String {
        [self.nom.as_deref(), self.prenom.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }
}
