use crate::ids::AccountId;
use crate::Result;
use crate::Value;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CondensedTableError {
    #[error("Row for account {0} has {1} cells, expected {2}")]
    RowWidth(AccountId, usize, usize),

    #[error("Column {0} inserted with {1} values for {2} rows")]
    ColumnHeight(String, usize, usize),

    #[error("Column order is not a permutation of {0} columns: {1:?}")]
    BadOrder(usize, Vec<usize>),

    #[error("Column already present: {0}")]
    DuplicateColumn(String),

    #[error("No cell at row {0}, column {1}")]
    CellOutOfRange(usize, usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    General,
    Money,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

impl Column {
    pub fn general(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::General,
        }
    }

    pub fn money(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Money,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CondensedRow {
    pub account_id: AccountId,
    pub cells: Vec<Option<Value>>,
}

/// One row per account over a fixed, ordered column list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CondensedTable {
    columns: Vec<Column>,
    rows: Vec<CondensedRow>,
}

impl CondensedTable {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: vec![],
        }
    }

    pub fn push_row(&mut self, row: CondensedRow) -> Result {
        if row.cells.len() != self.columns.len() {
            Err(CondensedTableError::RowWidth(
                row.account_id.clone(),
                row.cells.len(),
                self.columns.len(),
            ))?
        }

        self.rows.push(row);

        return Ok(());
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    pub fn rows(&self) -> &[CondensedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }

    /// Positions of `base` and its numbered expansions, in column order
    pub fn family_positions(&self, base: &str) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, column)| matches_family(&column.name, base))
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn cell(&self, row_idx: usize, name: &str) -> Option<&Value> {
        let col_idx = self.position(name)?;

        self.rows.get(row_idx)?.cells[col_idx].as_ref()
    }

    pub fn set_cell(&mut self, row_idx: usize, col_idx: usize, value: Option<Value>) -> Result {
        let cell = self
            .rows
            .get_mut(row_idx)
            .and_then(|row| row.cells.get_mut(col_idx))
            .ok_or(CondensedTableError::CellOutOfRange(row_idx, col_idx))?;

        *cell = value;

        return Ok(());
    }

    pub fn insert_column(
        &mut self,
        index: usize,
        column: Column,
        values: Vec<Option<Value>>,
    ) -> Result {
        if self.position(&column.name).is_some() {
            Err(CondensedTableError::DuplicateColumn(column.name.clone()))?
        }

        if values.len() != self.rows.len() {
            Err(CondensedTableError::ColumnHeight(
                column.name.clone(),
                values.len(),
                self.rows.len(),
            ))?
        }

        for (row, value) in self.rows.iter_mut().zip(values) {
            row.cells.insert(index, value);
        }
        self.columns.insert(index, column);

        return Ok(());
    }

    pub fn push_column(&mut self, column: Column, values: Vec<Option<Value>>) -> Result {
        let index = self.columns.len();

        self.insert_column(index, column, values)
    }

    /// Rearranges columns so that new position `i` holds old column `order[i]`
    pub fn reorder(&mut self, order: &[usize]) -> Result {
        let mut seen = vec![false; self.columns.len()];
        let is_permutation = order.len() == self.columns.len()
            && order
                .iter()
                .all(|&idx| idx < seen.len() && !std::mem::replace(&mut seen[idx], true));

        if !is_permutation {
            Err(CondensedTableError::BadOrder(
                self.columns.len(),
                order.to_vec(),
            ))?
        }

        self.columns = order.iter().map(|&idx| self.columns[idx].clone()).collect();

        for row in self.rows.iter_mut() {
            row.cells = order.iter().map(|&idx| row.cells[idx].take()).collect();
        }

        return Ok(());
    }
}

/// Output column names for a field expanded `width` times: the bare name for one column,
/// `name1..nameN` otherwise
pub fn expand_names(name: &str, width: usize) -> Vec<String> {
    if width <= 1 {
        return vec![name.to_string()];
    }

    (1..=width).map(|n| format!("{name}{n}")).collect()
}

/// True for `base` itself and for `base` followed only by digits
pub fn matches_family(name: &str, base: &str) -> bool {
    match name.strip_prefix(base) {
        Some(suffix) => suffix.chars().all(|c| c.is_ascii_digit()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOME_ACCOUNT: AccountId = AccountId::Numeric(1001);

    fn build_table() -> CondensedTable {
        let mut table = CondensedTable::new(vec![
            Column::general("acct_id"),
            Column::general("a"),
            Column::general("b"),
        ]);

        table
            .push_row(CondensedRow {
                account_id: SOME_ACCOUNT,
                cells: vec![
                    Some(Value::Number(1001.0)),
                    Some(Value::Text("x".to_string())),
                    None,
                ],
            })
            .unwrap();

        table
    }

    #[test]
    fn expand_single_and_numbered_names() {
        assert_eq!(expand_names("row_name", 1), vec!["row_name"]);
        assert_eq!(
            expand_names("row_name", 3),
            vec!["row_name1", "row_name2", "row_name3"]
        );
    }

    #[test]
    fn family_matching() {
        assert!(matches_family("owed_seat", "owed_seat"));
        assert!(matches_family("owed_seat12", "owed_seat"));
        assert!(!matches_family("owed_seats", "owed_seat"));
        assert!(!matches_family("total_owed_seat", "owed_seat"));
    }

    #[test]
    fn insert_and_lookup_column() {
        let mut table = build_table();

        table
            .insert_column(1, Column::money("total"), vec![Some(Value::Number(5.0))])
            .unwrap();

        assert_eq!(table.column_names(), vec!["acct_id", "total", "a", "b"]);
        assert_eq!(table.cell(0, "total"), Some(&Value::Number(5.0)));
        assert_eq!(table.cell(0, "b"), None);
    }

    #[test]
    fn fail_to_insert_duplicate_or_short_column() {
        let mut table = build_table();

        assert!(table
            .insert_column(1, Column::general("a"), vec![None])
            .is_err());
        assert!(table
            .insert_column(1, Column::general("c"), vec![])
            .is_err());
    }

    #[test]
    fn set_cell_in_place() {
        let mut table = build_table();

        table.set_cell(0, 2, Some(Value::Number(12.5))).unwrap();

        assert_eq!(table.cell(0, "b"), Some(&Value::Number(12.5)));
        assert!(table.set_cell(0, 3, None).is_err());
        assert!(table.set_cell(1, 0, None).is_err());
    }

    #[test]
    fn reorder_moves_cells_with_headers() {
        let mut table = build_table();

        table.reorder(&[0, 2, 1]).unwrap();

        assert_eq!(table.column_names(), vec!["acct_id", "b", "a"]);
        assert_eq!(table.rows()[0].cells[2], Some(Value::Text("x".to_string())));
    }

    #[test]
    fn fail_to_reorder_with_non_permutation() {
        let mut table = build_table();

        assert!(table.reorder(&[0, 1, 1]).is_err());
        assert!(table.reorder(&[0, 1]).is_err());
        assert!(table.reorder(&[0, 1, 3]).is_err());
    }

    #[test]
    fn fail_to_push_row_of_wrong_width() {
        let mut table = build_table();

        let res = table.push_row(CondensedRow {
            account_id: SOME_ACCOUNT,
            cells: vec![None],
        });

        assert!(res.is_err());
    }
}
