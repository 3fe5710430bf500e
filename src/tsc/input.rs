use crate::Result;
use crate::Value;

use std::collections::HashSet;

use thiserror::Error;

pub type RawRow = Vec<Option<Value>>;

#[derive(Error, Debug)]
pub enum RawTableError {
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Duplicate column in header row: {0}")]
    DuplicateColumn(String),

    #[error("Row {0} has {1} cells but the header only names {2} columns")]
    RaggedRow(usize, usize, usize),
}

/// Tabular input as read from a workbook or CSV file: a header row of names followed by rows
/// of nullable cells
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<RawRow>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Result<Self> {
        let mut seen = HashSet::new();

        for header in headers.iter() {
            if !seen.insert(header.as_str()) {
                Err(RawTableError::DuplicateColumn(header.clone()))?
            }
        }

        return Ok(Self {
            headers,
            rows: vec![],
        });
    }

    /// Appends a row. Short rows are padded with nulls.
    pub fn push_row(&mut self, mut row: RawRow) -> Result {
        if row.len() > self.headers.len() {
            // trailing blank cells past the header are harmless
            while row.len() > self.headers.len() && row.last().map_or(false, Option::is_none) {
                row.pop();
            }

            if row.len() > self.headers.len() {
                Err(RawTableError::RaggedRow(
                    self.rows.len() + 1,
                    row.len(),
                    self.headers.len(),
                ))?
            }
        }

        row.resize(self.headers.len(), None);
        self.rows.push(row);

        return Ok(());
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| RawTableError::MissingColumn(name.to_string()))?;

        return Ok(idx);
    }
}
