//! The in-memory collection of students and queries over it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::grades::round2;
use crate::model::{FieldError, RawRow, SortOrder};
use crate::partition::{Partition, Placement};
use crate::statistics::{ClassSummary, RegistryStats, SubjectSummary};
use crate::student::StudentEntity;

fn name_key(student: &StudentEntity) -> String {
    student.nom.as_deref().unwrap_or("").to_lowercase()
}

/// A student that failed validation, with the row it was loaded from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedStudent {
    pub student: StudentEntity,
    pub row: RawRow,
    pub errors: Vec<FieldError>,
}

/// Every loaded student, split into accepted and rejected views.
///
/// `rows` holds the source row of each entity in `all`, untouched.
/// `accepted` and `rejected` are derived from those rows by a [`Partition`]
/// and rebuilt as a whole by [`StudentRegistry::revalidate`]. Queries only
/// look at `accepted`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentRegistry {
    rows: Vec<RawRow>,
    all: Vec<StudentEntity>,
    accepted: Vec<StudentEntity>,
    rejected: Vec<RejectedStudent>,
}

impl StudentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from entities and validate it.
    pub fn from_students(students: Vec<StudentEntity>) -> Self {
        let mut registry = StudentRegistry::new();
        registry.load_students(students);
        registry
    }

    /// Append rows as entities, then revalidate.
    pub fn load<'a, I>(&mut self, rows: I)
    where
        I: IntoIterator<Item = &'a RawRow>,
    {
        for row in rows {
            self.all.push(StudentEntity::from_row(row));
            self.rows.push(row.clone());
        }
        self.revalidate();
    }

    /// Append entities, then revalidate.
    ///
    /// Entities carry no source row, so each is validated as [`StudentEntity::to_row`].
    pub fn load_students(&mut self, students: impl IntoIterator<Item = StudentEntity>) {
        for student in students {
            self.rows.push(student.to_row());
            self.all.push(student);
        }
        self.revalidate();
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.all.clear();
        self.accepted.clear();
        self.rejected.clear();
    }

    /// Rebuild `accepted` and `rejected` by partitioning the source rows.
    ///
    /// Accepted students are built from the normalized rows; `all` is left as loaded.
    pub fn revalidate(&mut self) {
        self.accepted.clear();
        self.rejected.clear();

        let mut partition = Partition::new();
        for (row, student) in self.rows.iter().zip(&self.all) {
            match partition.add(row.clone()) {
                Placement::Accepted => {
                    if let Some(normalized) = partition.accepted.last() {
                        self.accepted.push(StudentEntity::from_row(normalized));
                    }
                }
                Placement::Rejected(errors) => self.rejected.push(RejectedStudent {
                    student: student.clone(),
                    row: row.clone(),
                    errors,
                }),
            }
        }

        tracing::debug!(
            total = self.all.len(),
            accepted = self.accepted.len(),
            rejected = self.rejected.len(),
            "registry revalidated"
        );
    }

    /// Source rows, one per entity in [`all`](Self::all).
    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn all(&self) -> &[StudentEntity] {
        &self.all
    }

    pub fn accepted(&self) -> &[StudentEntity] {
        &self.accepted
    }

    pub fn rejected(&self) -> &[RejectedStudent] {
        &self.rejected
    }

    /// Accepted students whose family name matches, ignoring case.
    pub fn search_by_name(&self, name: &str) -> Vec<&StudentEntity> {
        let wanted = name.to_lowercase();
        self.accepted
            .iter()
            .filter(|s| s.nom.as_deref().is_some_and(|nom| nom.to_lowercase() == wanted))
            .collect()
    }

    /// Accepted students in a class, ignoring case. Students without a class never match.
    pub fn search_by_class(&self, classe: &str) -> Vec<&StudentEntity> {
        let wanted = classe.to_lowercase();
        self.accepted
            .iter()
            .filter(|s| s.classe.as_deref().is_some_and(|c| c.to_lowercase() == wanted))
            .collect()
    }

    /// Accepted students ordered by overall average. The sort is stable.
    pub fn sort_by_average(&self, order: SortOrder) -> Vec<&StudentEntity> {
        let mut sorted: Vec<_> = self.accepted.iter().collect();
        sorted.sort_by(|a, b| {
            let (a, b) = (a.average_or_zero(), b.average_or_zero());
            match order {
                SortOrder::Ascending => a.total_cmp(&b),
                SortOrder::Descending => b.total_cmp(&a),
            }
        });
        sorted
    }

    /// Accepted students ordered by family name, ignoring case. The sort is stable.
    pub fn sort_by_name(&self, order: SortOrder) -> Vec<&StudentEntity> {
        let mut sorted: Vec<_> = self.accepted.iter().collect();
        sorted.sort_by(|a, b| {
            let (a, b) = (name_key(a), name_key(b));
            match order {
                SortOrder::Ascending => a.cmp(&b),
                SortOrder::Descending => b.cmp(&a),
            }
        });
        sorted
    }

    pub fn statistics(&self) -> RegistryStats {
        RegistryStats {
            total: self.all.len(),
            valid_count: self.accepted.len(),
            invalid_count: self.rejected.len(),
        }
    }

    /// First loaded student with this numero, valid or not.
    pub fn find_by_numero(&self, numero: &str) -> Option<&StudentEntity> {
        self.all.iter().find(|s| s.numero.as_deref() == Some(numero))
    }

    /// Per subject, the mean subject average across accepted students taking it.
    pub fn subject_averages(&self) -> Vec<SubjectSummary> {
        let mut by_subject: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for student in &self.accepted {
            for (subject, record) in student.grades().iter() {
                by_subject.entry(subject).or_default().push(record.average());
            }
        }
        by_subject
            .into_iter()
            .map(|(subject, averages)| SubjectSummary {
                subject: subject.to_string(),
                student_count: averages.len(),
                mean_average: round2(averages.iter().sum::<f64>() / averages.len() as f64),
            })
            .collect()
    }

    /// Per class, head count and overall-average spread of accepted students.
    pub fn class_summaries(&self) -> Vec<ClassSummary> {
        let mut by_class: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for student in &self.accepted {
            if let Some(classe) = student.classe.as_deref() {
                by_class.entry(classe).or_default().push(student.average_or_zero());
            }
        }
        by_class
            .into_iter()
            .filter_map(|(classe, averages)| ClassSummary::from_averages(classe, &averages))
            .collect()
    }
}
