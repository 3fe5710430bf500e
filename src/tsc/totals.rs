use crate::ids::AccountId;
use crate::models::{Column, CondensedTable};
use crate::policy::ColumnPolicy;
use crate::Money;
use crate::Result;
use crate::Value;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TotalsError {
    #[error("Condensed table has no {0} column")]
    MissingColumn(String),

    #[error("Account {0}: column {1} holds a non-numeric amount: {2}")]
    NonNumeric(AccountId, String, Value),
}

/// Adds `total_ticket_cost` (sum of the owed-seat columns) ahead of the handling column and
/// `total_due` (ticket cost plus handling) ahead of the first customer column. Blank amounts
/// count as zero.
pub fn add_totals(table: &mut CondensedTable, policy: &ColumnPolicy) -> Result {
    let owed_positions = table.family_positions(&policy.owed_output);
    let handling_idx = table
        .position(&policy.handling_column)
        .ok_or_else(|| TotalsError::MissingColumn(policy.handling_column.clone()))?;

    log::debug!(
        "Summing {} {} column(s) per account",
        owed_positions.len(),
        policy.owed_output
    );

    let mut ticket_costs = Vec::with_capacity(table.len());
    let mut totals_due = Vec::with_capacity(table.len());

    for row_idx in 0..table.len() {
        let mut ticket_cost = Money::ZERO;

        for &col_idx in owed_positions.iter() {
            let row = &table.rows()[row_idx];

            let value = match &row.cells[col_idx] {
                Some(value) => value,
                None => continue,
            };

            let amount = to_money(value).ok_or_else(|| {
                TotalsError::NonNumeric(
                    row.account_id.clone(),
                    table.columns()[col_idx].name.clone(),
                    value.clone(),
                )
            })?;
            ticket_cost.add(&amount)?;

            // currency text is stored back as a number so it gets the money format
            if value.as_text().is_some() {
                table.set_cell(row_idx, col_idx, Some(Value::Number(amount.to_f64())))?;
            }
        }

        let row = &table.rows()[row_idx];
        let handling = match &row.cells[handling_idx] {
            Some(value) => to_money(value).ok_or_else(|| {
                TotalsError::NonNumeric(
                    row.account_id.clone(),
                    policy.handling_column.clone(),
                    value.clone(),
                )
            })?,
            None => Money::ZERO,
        };

        let mut total_due = ticket_cost;
        total_due.add(&handling)?;

        ticket_costs.push(Some(Value::Number(ticket_cost.to_f64())));
        totals_due.push(Some(Value::Number(total_due.to_f64())));
    }

    table.insert_column(
        handling_idx,
        Column::money(policy.total_ticket_cost_column.clone()),
        ticket_costs,
    )?;

    let customer_idx = table
        .family_positions(&policy.customer_column)
        .first()
        .copied()
        .ok_or_else(|| TotalsError::MissingColumn(policy.customer_column.clone()))?;

    table.insert_column(
        customer_idx,
        Column::money(policy.total_due_column.clone()),
        totals_due,
    )?;

    return Ok(());
}

fn to_money(value: &Value) -> Option<Money> {
    match value {
        Value::Number(number) => Money::from_f64(*number).ok(),
        Value::Text(text) => Money::parse(text).ok(),
        _ => None,
    }
}
