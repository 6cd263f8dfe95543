//! Splitting rows into accepted and rejected sets, and fixing rejected rows.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::{Field, FieldError, RawRow, RejectedRow};
use crate::validation::{normalize_row, validate_row};

/// Rows split by validity. Each side keeps input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    /// Valid rows, with date and class normalized.
    pub accepted: Vec<RawRow>,
    /// Invalid rows, untouched, with their errors.
    pub rejected: Vec<RejectedRow>,
}

/// Where [`Partition::add`] put a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    Accepted,
    Rejected(Vec<FieldError>),
}

/// Result of looking a row up by numero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Found<'a> {
    Accepted(&'a RawRow),
    Rejected(&'a RejectedRow),
}

/// Outcome of a correction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Correction {
    /// The row now validates and moved to the accepted side.
    Promoted,
    /// The row is still invalid; its error list was refreshed.
    StillRejected(Vec<FieldError>),
}

impl Partition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and place every row.
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = RawRow>,
    {
        let mut partition = Partition::new();
        for row in rows {
            partition.add(row);
        }
        tracing::debug!(
            accepted = partition.accepted.len(),
            rejected = partition.rejected.len(),
            "partitioned rows"
        );
        partition
    }

    /// Validate a single row and append it to the matching side.
    pub fn add(&mut self, row: RawRow) -> Placement {
        let errors = validate_row(&row);
        if errors.is_empty() {
            self.accepted.push(normalize_row(&row));
            Placement::Accepted
        } else {
            self.rejected.push(RejectedRow {
                row,
                errors: errors.clone(),
            });
            Placement::Rejected(errors)
        }
    }

    /// First row with this numero, looking at accepted rows first.
    pub fn find(&self, numero: &str) -> Option<Found<'_>> {
        self.accepted
            .iter()
            .find(|row| row.numero() == numero)
            .map(Found::Accepted)
            .or_else(|| {
                self.rejected
                    .iter()
                    .find(|rejected| rejected.numero() == numero)
                    .map(Found::Rejected)
            })
    }

    /// The first `n` rows of each side.
    pub fn head(&self, n: usize) -> (&[RawRow], &[RejectedRow]) {
        (
            &self.accepted[..n.min(self.accepted.len())],
            &self.rejected[..n.min(self.rejected.len())],
        )
    }

    pub fn len(&self) -> usize {
        self.accepted.len() + self.rejected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty() && self.rejected.is_empty()
    }

    /// Patch a rejected row and re-validate it.
    ///
    /// Each non-blank value in `patch` overwrites the matching cell; blank
    /// values keep what is there. A row that now validates is normalized and
    /// moved to the end of `accepted`. Otherwise it stays in place with its new
    /// error list.
    pub fn correct<I, V>(&mut self, numero: &str, patch: I) -> Result<Correction, CoreError>
    where
        I: IntoIterator<Item = (Field, V)>,
        V: AsRef<str>,
    {
        let index = self
            .rejected
            .iter()
            .position(|rejected| rejected.numero() == numero)
            .ok_or_else(|| CoreError::NotFound {
                numero: numero.to_string(),
            })?;

        let mut row = self.rejected[index].row.clone();
        for (field, value) in patch {
            let value = value.as_ref();
            if !value.trim().is_empty() {
                row.set(field, value);
            }
        }

        let errors = validate_row(&row);
        if errors.is_empty() {
            self.rejected.remove(index);
            self.accepted.push(normalize_row(&row));
            tracing::debug!(numero, "corrected row promoted to accepted");
            Ok(Correction::Promoted)
        } else {
            self.rejected[index] = RejectedRow {
                row,
                errors: errors.clone(),
            };
            tracing::debug!(numero, errors = errors.len(), "corrected row still rejected");
            Ok(Correction::StillRejected(errors))
        }
    }
}
