//! Aggregate figures over a registry.

use serde::{Deserialize, Serialize};

use crate::grades::round2;

/// Head counts over all students.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    pub total: usize,
    pub valid_count: usize,
    pub invalid_count: usize,
}

/// Figures for one class, over accepted students.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSummary {
    pub classe: String,
    pub student_count: usize,
    pub mean_average: f64,
    pub min_average: f64,
    pub max_average: f64,
}

impl ClassSummary {
    /// Summarize a class from its students' overall averages.
    ///
    /// Returns `None` when `averages` is empty.
    pub fn from_averages(classe: impl Into<String>, averages: &[f64]) -> Option<Self> {
        if averages.is_empty() {
            return None;
        }
        let sum: f64 = averages.iter().sum();
        Some(ClassSummary {
            classe: classe.into(),
            student_count: averages.len(),
            mean_average: round2(sum / averages.len() as f64),
            min_average: averages.iter().copied().fold(f64::INFINITY, f64::min),
            max_average: averages.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}

/// Mean of one subject's averages across students.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectSummary {
    pub subject: String,
    pub student_count: usize,
    pub mean_average: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_summary_figures() {
        let summary = ClassSummary::from_averages("4emA", &[12.0, 15.5, 9.25]).unwrap();
        assert_eq!(summary.student_count, 3);
        assert_eq!(summary.mean_average, 12.25);
        assert_eq!(summary.min_average, 9.25);
        assert_eq!(summary.max_average, 15.5);
    }

    #[test]
    fn empty_class_has_no_summary() {
        assert!(ClassSummary::from_averages("3emB", &[]).is_none());
    }
}
