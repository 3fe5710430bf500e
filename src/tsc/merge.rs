use crate::ids::AccountId;
use crate::input::RawTable;
use crate::models::{Column, CondensedTable};
use crate::policy::ColumnPolicy;
use crate::Result;
use crate::Value;

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Rep table column rendered as `MM/DD/YYYY`
const ADD_DATE_COLUMN: &str = "add_date";
/// Appended to rep column names that collide with condensed columns
const REP_SUFFIX: &str = "_rep";

/// Which table the sales-rep merge hands back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeMode {
    /// The condensed table with rep columns attached
    #[default]
    Enriched,
    /// The condensed table exactly as it came in; the join only feeds the report
    Compat,
}

/// Account ids present on only one side of the join
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub condensed_only: Vec<AccountId>,
    pub reps_only: Vec<AccountId>,
}

impl MergeReport {
    pub fn is_clean(&self) -> bool {
        self.condensed_only.is_empty() && self.reps_only.is_empty()
    }
}

impl fmt::Display for MergeReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_clean() {
            return write!(f, "All accounts matched a sales rep");
        }

        let join = |ids: &[AccountId]| {
            ids.iter()
                .map(AccountId::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };

        writeln!(
            f,
            "Accounts without a sales rep ({}): {}",
            self.condensed_only.len(),
            join(&self.condensed_only)
        )?;
        write!(
            f,
            "Sales rep accounts not in the summary ({}): {}",
            self.reps_only.len(),
            join(&self.reps_only)
        )
    }
}

#[derive(Debug)]
pub struct MergeOutcome {
    pub table: CondensedTable,
    pub report: MergeReport,
}

/// Left-joins the sales-rep table onto the condensed table by account id, and reports the
/// account ids that only one side has
pub fn merge_sales_reps(
    mut table: CondensedTable,
    reps: &RawTable,
    policy: &ColumnPolicy,
    mode: MergeMode,
) -> Result<MergeOutcome> {
    let key_idx = reps.require_column(&policy.account_column)?;

    let mut by_account: BTreeMap<AccountId, &Vec<Option<Value>>> = BTreeMap::new();

    for (row_idx, row) in reps.rows().iter().enumerate() {
        let account_id = match row[key_idx].as_ref().and_then(AccountId::from_value) {
            Some(account_id) => account_id,
            None => {
                log::warn!("Sales rep row {}: no usable account id, skipping", row_idx + 2);
                continue;
            }
        };

        match by_account.entry(account_id) {
            Entry::Vacant(entry) => {
                entry.insert(row);
            }
            Entry::Occupied(entry) => {
                log::warn!(
                    "Sales rep account {} listed more than once, keeping the first row",
                    entry.key()
                );
            }
        }
    }

    let condensed_ids: BTreeSet<&AccountId> =
        table.rows().iter().map(|row| &row.account_id).collect();

    let report = MergeReport {
        condensed_only: condensed_ids
            .iter()
            .filter(|id| !by_account.contains_key(**id))
            .map(|id| (*id).clone())
            .collect(),
        reps_only: by_account
            .keys()
            .filter(|id| !condensed_ids.contains(id))
            .cloned()
            .collect(),
    };

    log::debug!(
        "Sales rep merge: {} rep accounts, {} unmatched on the left, {} on the right",
        by_account.len(),
        report.condensed_only.len(),
        report.reps_only.len()
    );

    if mode == MergeMode::Compat {
        return Ok(MergeOutcome { table, report });
    }

    let rep_columns: Vec<(usize, String)> = reps
        .headers()
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != key_idx)
        .map(|(idx, name)| {
            if table.position(name).is_some() {
                (idx, format!("{name}{REP_SUFFIX}"))
            } else {
                (idx, name.clone())
            }
        })
        .collect();

    let account_ids: Vec<AccountId> = table
        .rows()
        .iter()
        .map(|row| row.account_id.clone())
        .collect();

    for (col_idx, name) in rep_columns {
        let is_date = reps.headers()[col_idx] == ADD_DATE_COLUMN;

        let values = account_ids
            .iter()
            .map(|account_id| {
                let value = by_account.get(account_id)?.get(col_idx)?.as_ref()?;

                Some(if is_date {
                    value.to_us_date()
                } else {
                    value.clone()
                })
            })
            .collect();

        table.push_column(Column::general(name), values)?;
    }

    return Ok(MergeOutcome { table, report });
}
