use crate::models::{ColumnKind, CondensedTable};
use crate::Money;
use crate::Value;

/// Currency display format applied to money columns
pub const MONEY_FORMAT: &str = "$#,##0.00";

/// How one output column should be presented
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    pub name: String,
    pub width: usize,
    pub money: bool,
}

/// Plans presentation for every column of the table: money columns get the currency format
/// and each column is as wide as its header or its longest rendered value.
pub fn plan_layout(table: &CondensedTable) -> Vec<ColumnLayout> {
    table
        .columns()
        .iter()
        .enumerate()
        .map(|(col_idx, column)| {
            let money = column.kind == ColumnKind::Money;

            let widest_value = table
                .rows()
                .iter()
                .filter_map(|row| row.cells[col_idx].as_ref())
                .map(|value| render(value, money).chars().count())
                .max()
                .unwrap_or(0);

            ColumnLayout {
                name: column.name.clone(),
                width: widest_value.max(column.name.chars().count()),
                money,
            }
        })
        .collect()
}

/// Text a cell shows once written
pub fn render(value: &Value, money: bool) -> String {
    if money {
        if let Some(amount) = value.as_f64().and_then(|number| Money::from_f64(number).ok()) {
            return amount.to_currency_string();
        }
    }

    value.to_string()
}
