//! gradebook-core: Validation, grade notation, and the student registry.
//!
//! This crate holds everything with actual rules in it: per-field validators,
//! the grade-cell notation, row validation and partitioning, the student
//! entity with its averages, and the registry that queries over students.
//! It performs no I/O beyond the CSV loader in [`loader`].

pub mod error;
pub mod grades;
pub mod loader;
pub mod model;
pub mod partition;
pub mod registry;
pub mod statistics;
pub mod student;
pub mod validation;
pub mod validators;

pub use error::CoreError;
pub use grades::{GradeRecord, GradeTable, MalformedSegment, ParsedGrades, SegmentIssue};
pub use model::{Field, FieldError, RawRow, RejectedRow, SortOrder};
pub use partition::{Correction, Found, Partition, Placement};
pub use registry::{RejectedStudent, StudentRegistry};
pub use statistics::{ClassSummary, RegistryStats, SubjectSummary};
pub use student::StudentEntity;
