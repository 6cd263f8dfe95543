//! gradebook-report: Rendering and interchange formats.
//!
//! Self-contained HTML reports for a single student or a whole class, and
//! CSV/JSON export of student collections.

pub mod export;
pub mod html;

pub use export::{export_csv, export_json, export_rejected_csv, import_json};
pub use html::{generate_class_html, generate_student_html, write_class_report, write_student_report};
