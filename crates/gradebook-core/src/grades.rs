//! Grade-cell notation.
//!
//! A grade cell packs every subject of a student into one string:
//!
//! ```text
//! Math[10|14:16] #Francais[12:9.5]
//! ```
//!
//! `#` separates subjects, `|` separates assignment scores and `:` separates
//! the assignments from the single exam score. Parsing is per segment: a bad
//! segment is reported in [`ParsedGrades::malformed`] and the rest of the cell
//! still parses.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

static SEGMENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]+)\[(.*)\]$").expect("invalid segment regex"));

static NUMBER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)$").expect("invalid number regex")
});

/// Round to two decimals, halves away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Scores for one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeRecord {
    pub assignment_scores: Vec<f64>,
    pub exam_score: f64,
}

impl GradeRecord {
    /// Mean of all assignments and the exam, each with unit weight.
    ///
    /// Returns 0 when there are no assignments.
    pub fn average(&self) -> f64 {
        if self.assignment_scores.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.assignment_scores.iter().sum::<f64>() + self.exam_score;
        round2(sum / (self.assignment_scores.len() + 1) as f64)
    }
}

/// Subject → scores, in first-seen subject order.
///
/// Inserting an existing subject replaces its scores but keeps its position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GradeTable {
    entries: Vec<(String, GradeRecord)>,
}

impl GradeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a subject, returning the previous scores if any.
    pub fn insert(&mut self, subject: impl Into<String>, record: GradeRecord) -> Option<GradeRecord> {
        let subject = subject.into();
        match self.entries.iter_mut().find(|(name, _)| *name == subject) {
            Some((_, existing)) => Some(std::mem::replace(existing, record)),
            None => {
                self.entries.push((subject, record));
                None
            }
        }
    }

    pub fn get(&self, subject: &str) -> Option<&GradeRecord> {
        self.entries
            .iter()
            .find(|(name, _)| name == subject)
            .map(|(_, record)| record)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GradeRecord)> {
        self.entries.iter().map(|(name, record)| (name.as_str(), record))
    }

    pub fn subjects(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Average for one subject; 0 when the subject is absent or has no assignments.
    pub fn subject_average(&self, subject: &str) -> f64 {
        self.get(subject).map(GradeRecord::average).unwrap_or(0.0)
    }

    /// Unweighted mean of the subject averages; 0 for an empty table.
    pub fn overall_average(&self) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        let total: f64 = self.entries.iter().map(|(_, record)| record.average()).sum();
        round2(total / self.entries.len() as f64)
    }
}

impl fmt::Display for GradeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serialize(self))
    }
}

impl Serialize for GradeTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (subject, record) in &self.entries {
            map.serialize_entry(subject, record)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for GradeTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = GradeTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of subject names to grade records")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut table = GradeTable::new();
                while let Some((subject, record)) = access.next_entry::<String, GradeRecord>()? {
                    table.insert(subject, record);
                }
                Ok(table)
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

/// Why a segment could not be turned into a grade record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SegmentIssue {
    /// The segment is not of the form `Subject[...]`.
    NotASubjectBlock,
    /// The bracket body must contain exactly one `:`.
    ExamSeparator { found: usize },
    /// Nothing before the `:`.
    EmptyAssignments,
    /// A score is not a decimal number.
    InvalidNumber { text: String },
}

impl fmt::Display for SegmentIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentIssue::NotASubjectBlock => write!(f, "expected Subject[assignments:exam]"),
            SegmentIssue::ExamSeparator { found } => {
                write!(f, "expected exactly one ':' separator, found {found}")
            }
            SegmentIssue::EmptyAssignments => write!(f, "no assignment scores before ':'"),
            SegmentIssue::InvalidNumber { text } => write!(f, "'{text}' is not a decimal score"),
        }
    }
}

/// A segment of a grade cell that did not parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MalformedSegment {
    pub segment: String,
    pub issue: SegmentIssue,
}

impl From<MalformedSegment> for CoreError {
    fn from(m: MalformedSegment) -> Self {
        CoreError::MalformedGradeSegment {
            segment: m.segment,
            reason: m.issue.to_string(),
        }
    }
}

/// Outcome of parsing one grade cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedGrades {
    pub table: GradeTable,
    /// Segments that were skipped, in cell order.
    pub malformed: Vec<MalformedSegment>,
    /// Subjects that appeared more than once; the last occurrence was kept.
    pub duplicates: Vec<String>,
}

impl ParsedGrades {
    /// `true` when every segment parsed.
    pub fn is_clean(&self) -> bool {
        self.malformed.is_empty()
    }
}

/// Parse a grade cell segment by segment.
pub fn parse(blob: &str) -> ParsedGrades {
    let mut parsed = ParsedGrades::default();

    for segment in blob.split('#').map(str::trim).filter(|s| !s.is_empty()) {
        match parse_segment(segment) {
            Ok((subject, record)) => {
                if parsed.table.insert(subject, record).is_some() {
                    tracing::warn!(subject, "duplicate subject in grade cell, keeping last");
                    parsed.duplicates.push(subject.to_string());
                }
            }
            Err(issue) => {
                tracing::warn!(segment, %issue, "skipping malformed grade segment");
                parsed.malformed.push(MalformedSegment {
                    segment: segment.to_string(),
                    issue,
                });
            }
        }
    }

    parsed
}

/// Parse a grade cell, failing on the first malformed segment.
pub fn parse_strict(blob: &str) -> Result<GradeTable, CoreError> {
    let parsed = parse(blob);
    match parsed.malformed.into_iter().next() {
        Some(bad) => Err(bad.into()),
        None => Ok(parsed.table),
    }
}

fn parse_segment(segment: &str) -> Result<(&str, GradeRecord), SegmentIssue> {
    let caps = SEGMENT_REGEX
        .captures(segment)
        .ok_or(SegmentIssue::NotASubjectBlock)?;
    let subject = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
    let body = caps.get(2).map(|m| m.as_str()).unwrap_or_default();

    let parts: Vec<&str> = body.split(':').collect();
    let [assignments, exam] = parts.as_slice() else {
        return Err(SegmentIssue::ExamSeparator {
            found: parts.len() - 1,
        });
    };

    if assignments.trim().is_empty() {
        return Err(SegmentIssue::EmptyAssignments);
    }

    let assignment_scores = assignments
        .split('|')
        .map(parse_score)
        .collect::<Result<Vec<_>, _>>()?;
    let exam_score = parse_score(exam)?;

    Ok((
        subject,
        GradeRecord {
            assignment_scores,
            exam_score,
        },
    ))
}

fn parse_score(text: &str) -> Result<f64, SegmentIssue> {
    let trimmed = text.trim();
    let invalid = || SegmentIssue::InvalidNumber {
        text: trimmed.to_string(),
    };
    if !NUMBER_REGEX.is_match(trimmed) {
        return Err(invalid());
    }
    trimmed.parse::<f64>().map_err(|_| invalid())
}

/// Render a table back into grade-cell notation.
pub fn serialize(table: &GradeTable) -> String {
    table
        .iter()
        .map(|(subject, record)| {
            let assignments = record
                .assignment_scores
                .iter()
                .map(f64::to_string)
                .collect::<Vec<_>>()
                .join("|");
            format!("{subject}[{assignments}:{}]", record.exam_score)
        })
        .collect::<Vec<_>>()
        .join(" #")
}
