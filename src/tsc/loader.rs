use crate::ids::AccountId;
use crate::input::RawTable;
use crate::models::AccountGroups;
use crate::policy::{ColumnPolicy, FieldPolicy};
use crate::Result;
use crate::Value;

use std::str::FromStr;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Row {0}: account identifier is missing")]
    MissingAccountId(usize),

    #[error("Row {0}: account identifier is malformed: {1}")]
    MalformedAccountId(usize, Value),

    #[error("Unknown bad-row policy: {0} (expected skip or abort)")]
    UnknownPolicy(String),
}

/// What to do with a row whose account can't be identified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataErrorPolicy {
    #[default]
    Skip,
    Abort,
}

impl FromStr for DataErrorPolicy {
    type Err = LoadError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(DataErrorPolicy::Skip),
            "abort" => Ok(DataErrorPolicy::Abort),
            _ => Err(LoadError::UnknownPolicy(s.to_string())),
        }
    }
}

/// Groups raw rows into one multi-valued record per account
pub struct Loader<'a> {
    policy: &'a ColumnPolicy,
    on_error: DataErrorPolicy,
}

impl<'a> Loader<'a> {
    pub fn new(policy: &'a ColumnPolicy, on_error: DataErrorPolicy) -> Self {
        Self { policy, on_error }
    }

    pub fn load(&self, table: &RawTable) -> Result<AccountGroups> {
        for column in self.policy.required_columns() {
            table.require_column(column)?;
        }

        let account_idx = table.require_column(&self.policy.account_column)?;
        let section_idx = table.require_column(&self.policy.section_column)?;

        // (input column index, field name) for every column that survives the policy
        let fields: Vec<(usize, &String)> = table
            .headers()
            .iter()
            .enumerate()
            .filter(|(idx, name)| {
                *idx != account_idx && self.policy.field_policy(name) != FieldPolicy::Drop
            })
            .collect();

        let keep_on_charge: Vec<bool> = fields
            .iter()
            .map(|(_, name)| self.policy.keeps_on_service_charge(name))
            .collect();

        let mut groups =
            AccountGroups::new(fields.iter().map(|(_, name)| (*name).clone()).collect());

        log::debug!(
            "Grouping {} rows over fields: {:?}",
            table.len(),
            groups.fields()
        );

        for (row_idx, row) in table.rows().iter().enumerate() {
            // header is line 1
            let line = row_idx + 2;

            let account_id = match self.parse_account_id(line, row[account_idx].as_ref()) {
                Ok(account_id) => account_id,
                Err(e) => match self.on_error {
                    DataErrorPolicy::Skip => {
                        log::warn!("Skipping row: {e}");
                        continue;
                    }
                    DataErrorPolicy::Abort => Err(e)?,
                },
            };

            let service_charge = self.is_service_charge(row[section_idx].as_ref());
            let group = groups.find_mut_or_create(account_id);
            group.rows += 1;

            if service_charge {
                log::debug!(
                    "Row {line}: service charge for account {}",
                    group.account_id
                );
                group.handling = Some(self.policy.handling_fee);
            }

            for (field_idx, (col_idx, _)) in fields.iter().enumerate() {
                if service_charge && !keep_on_charge[field_idx] {
                    continue;
                }

                if let Some(value) = &row[*col_idx] {
                    group.push(field_idx, value.clone());
                }
            }
        }

        log::debug!("Grouped into {} accounts", groups.len());

        return Ok(groups);
    }

    fn parse_account_id(
        &self,
        line: usize,
        cell: Option<&Value>,
    ) -> std::result::Result<AccountId, LoadError> {
        let value = cell.ok_or(LoadError::MissingAccountId(line))?;

        AccountId::from_value(value)
            .ok_or_else(|| LoadError::MalformedAccountId(line, value.clone()))
    }

    fn is_service_charge(&self, cell: Option<&Value>) -> bool {
        cell.and_then(Value::as_text)
            .map_or(false, |section| section.trim() == self.policy.service_charge_token)
    }
}
