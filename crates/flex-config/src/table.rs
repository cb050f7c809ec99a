//! Ordered columnar record set used for both the current config and the run log.

use flex_core::errors::{ErrorInfo, FlexError};
use indexmap::IndexSet;

use crate::scalar::{Record, Scalar};

/// Ordered rows over the union of all columns ever inserted.
///
/// Every row holds one cell per column; a row that never set a column holds
/// [`Scalar::Missing`] there. Public operations return new documents.
#[derive(Debug, Clone, Default)]
pub struct TabularDocument {
    columns: IndexSet<String>,
    rows: Vec<Vec<Scalar>>,
}

impl TabularDocument {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_rows<I: IntoIterator<Item = Record>>(rows: I) -> Self {
        let mut doc = Self::empty();
        for record in rows {
            doc.push_record(&record);
        }
        doc
    }

    /// Single-row document.
    pub fn from_record(record: Record) -> Self {
        let mut doc = Self::empty();
        doc.push_record(&record);
        doc
    }

    /// Builds a document from positional cells aligned with `columns`.
    pub fn from_cells(columns: Vec<String>, rows: Vec<Vec<Scalar>>) -> Result<Self, FlexError> {
        let width = columns.len();
        let unique: IndexSet<String> = columns.into_iter().collect();
        if unique.len() != width {
            return Err(FlexError::Shape(
                ErrorInfo::new("duplicate-column", "column names must be unique")
                    .with_context("columns", width.to_string())
                    .with_context("unique", unique.len().to_string()),
            ));
        }
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != width) {
            return Err(FlexError::Shape(
                ErrorInfo::new("ragged-row", "row width differs from the header")
                    .with_context("row", idx.to_string())
                    .with_context("expected", width.to_string())
                    .with_context("actual", row.len().to_string()),
            ));
        }
        Ok(Self {
            columns: unique,
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> impl ExactSizeIterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    /// Rows as positional cells aligned with [`TabularDocument::columns`].
    pub fn cells(&self) -> &[Vec<Scalar>] {
        &self.rows
    }

    pub fn row(&self, idx: usize) -> Option<Record> {
        self.rows.get(idx).map(|cells| self.record_of(cells))
    }

    pub fn rows(&self) -> impl ExactSizeIterator<Item = Record> + '_ {
        self.rows.iter().map(|cells| self.record_of(cells))
    }

    /// The most recent row.
    pub fn last_row(&self) -> Result<Record, FlexError> {
        self.rows
            .last()
            .map(|cells| self.record_of(cells))
            .ok_or_else(|| FlexError::empty("last-row-empty", "document"))
    }

    /// The only row of a single-row document.
    pub fn to_mapping(&self) -> Result<Record, FlexError> {
        match self.rows.len() {
            0 => Err(FlexError::empty("mapping-empty", "document")),
            1 => self.last_row(),
            n => Err(FlexError::shape("mapping-rows", "1", n)),
        }
    }

    /// Copy with `record` appended; columns it introduces are backfilled with missing markers.
    pub fn append_row(&self, record: Record) -> Self {
        let mut doc = self.clone();
        doc.push_record(&record);
        doc
    }

    /// Row-wise concatenation: `other`'s rows follow `self`'s.
    pub fn concat_rows(&self, other: &TabularDocument) -> Self {
        let mut doc = self.clone();
        for record in other.rows() {
            doc.push_record(&record);
        }
        doc
    }

    /// Column-wise concatenation of aligned rows. Fields of `other` overwrite
    /// same-named fields of `self`. A document with no rows and no columns is
    /// the identity.
    pub fn concat_columns(&self, other: &TabularDocument) -> Result<Self, FlexError> {
        if self.is_blank() {
            return Ok(other.clone());
        }
        if other.is_blank() {
            return Ok(self.clone());
        }
        if self.len() != other.len() {
            return Err(FlexError::Shape(
                ErrorInfo::new("concat-columns-rows", "column-wise concat needs equal row counts")
                    .with_context("left", self.len().to_string())
                    .with_context("right", other.len().to_string()),
            ));
        }
        Ok(Self::from_rows(
            self.rows()
                .zip(other.rows())
                .map(|(left, right)| left.merged(&right)),
        ))
    }

    /// Projects the named columns, in the order given.
    pub fn select<S: AsRef<str>>(&self, columns: &[S]) -> Result<Self, FlexError> {
        let mut positions = Vec::with_capacity(columns.len());
        for name in columns {
            let name = name.as_ref();
            let idx = self.columns.get_index_of(name).ok_or_else(|| {
                FlexError::Shape(
                    ErrorInfo::new("unknown-column", "column not present in document")
                        .with_context("column", name),
                )
            })?;
            positions.push(idx);
        }
        Self::from_cells(
            columns.iter().map(|name| name.as_ref().to_string()).collect(),
            self.rows
                .iter()
                .map(|cells| positions.iter().map(|&idx| cells[idx].clone()).collect())
                .collect(),
        )
    }

    /// Copy with the last row replaced by `record`. Columns are never removed.
    pub(crate) fn replace_last_row(&self, record: &Record) -> Result<Self, FlexError> {
        if self.is_empty() {
            return Err(FlexError::empty("replace-last-empty", "log"));
        }
        let mut doc = self.without_last_row();
        doc.push_record(record);
        Ok(doc)
    }

    pub(crate) fn without_last_row(&self) -> Self {
        let mut doc = self.clone();
        doc.rows.pop();
        doc
    }

    fn is_blank(&self) -> bool {
        self.rows.is_empty() && self.columns.is_empty()
    }

    fn record_of(&self, cells: &[Scalar]) -> Record {
        self.columns
            .iter()
            .cloned()
            .zip(cells.iter().cloned())
            .collect()
    }

    fn push_record(&mut self, record: &Record) {
        for key in record.keys() {
            if !self.columns.contains(key) {
                self.columns.insert(key.to_string());
                for row in &mut self.rows {
                    row.push(Scalar::Missing);
                }
            }
        }
        let row = self
            .columns
            .iter()
            .map(|column| record.field(column).clone())
            .collect();
        self.rows.push(row);
    }
}

impl PartialEq for TabularDocument {
    fn eq(&self, other: &Self) -> bool {
        self.columns.iter().eq(other.columns.iter()) && self.rows == other.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_columns_backfill_earlier_rows() {
        let doc = TabularDocument::from_record(Record::new().with("lr", 0.1))
            .append_row(Record::new().with("lr", 0.01).with("epochs", 5));
        assert_eq!(doc.cells()[0], vec![Scalar::Float(0.1), Scalar::Missing]);
        assert_eq!(doc.cells()[1], vec![Scalar::Float(0.01), Scalar::Int(5)]);
    }

    #[test]
    fn replace_last_row_keeps_history() {
        let doc = TabularDocument::from_rows([
            Record::new().with("a", 1),
            Record::new().with("a", 2),
        ]);
        let replaced = doc
            .replace_last_row(&Record::new().with("a", 3).with("b", "x"))
            .expect("replace");
        assert_eq!(replaced.row(0), Some(Record::new().with("a", 1)));
        assert_eq!(replaced.last_row().expect("last"), Record::new().with("a", 3).with("b", "x"));
        assert!(TabularDocument::empty()
            .replace_last_row(&Record::new())
            .is_err());
    }
}
