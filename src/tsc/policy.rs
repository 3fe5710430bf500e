//! Column policy: the table that says, per input column, whether repeated values are
//! deduplicated, kept in order, or dropped. Revisions of the table are kept side by side as
//! [`PolicyVersion`]s and can be overridden per column from a CSV file.

use crate::Money;
use crate::Result;

use std::collections::BTreeMap;
use std::fs::File;
use std::io;
use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("Unknown policy version: {0} (expected v1 or v2)")]
    UnknownVersion(String),

    #[error("Policy override for the account column is not allowed: {0}")]
    AccountColumnOverride(String),
}

/// How a field's per-account values become output columns
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldPolicy {
    /// Deduplicate; first occurrence wins the lowest column number
    Set,
    /// Keep every value in row order, duplicates included
    List,
    /// Leave the column out of the output
    Drop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolicyVersion {
    /// Pricing columns dropped
    V1,
    /// Pricing columns kept per seat
    #[default]
    V2,
}

impl FromStr for PolicyVersion {
    type Err = PolicyError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" | "1" => Ok(PolicyVersion::V1),
            "v2" | "2" => Ok(PolicyVersion::V2),
            _ => Err(PolicyError::UnknownVersion(s.to_string())),
        }
    }
}

#[derive(Deserialize, Debug)]
struct PolicyRecord {
    column: String,
    policy: FieldPolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnPolicy {
    pub version: PolicyVersion,

    pub account_column: String,
    pub customer_column: String,
    pub section_column: String,

    /// Input column holding the per-seat amount owed, and the name it is output under
    pub owed_column: String,
    pub owed_output: String,

    pub handling_column: String,
    pub total_ticket_cost_column: String,
    pub total_due_column: String,

    /// Section value that marks a service charge row
    pub service_charge_token: String,
    pub handling_fee: Money,
    /// Fields a service charge row still contributes to its account
    pub service_charge_keep: Vec<String>,

    /// Output columns that are interleaved pairwise
    pub first_seat_column: String,
    pub last_seat_column: String,

    pub date_columns: Vec<String>,

    rules: BTreeMap<String, FieldPolicy>,
}

impl ColumnPolicy {
    pub fn for_version(version: PolicyVersion) -> Self {
        let mut rules = BTreeMap::new();

        for column in ["first_seat", "last_seat", "row_name", "section", "owed_amount"] {
            rules.insert(column.to_string(), FieldPolicy::List);
        }

        let pricing = ["price_code", "cost_per_seat", "total_cost"];
        let pricing_policy = match version {
            PolicyVersion::V1 => FieldPolicy::Drop,
            PolicyVersion::V2 => FieldPolicy::List,
        };
        for column in pricing {
            rules.insert(column.to_string(), pricing_policy);
        }

        rules.insert("quantity".to_string(), FieldPolicy::Drop);

        Self {
            version,
            account_column: "acct_id".to_string(),
            customer_column: "cust_name_id".to_string(),
            section_column: "section".to_string(),
            owed_column: "owed_amount".to_string(),
            owed_output: "owed_seat".to_string(),
            handling_column: "Handling".to_string(),
            total_ticket_cost_column: "total_ticket_cost".to_string(),
            total_due_column: "total_due".to_string(),
            service_charge_token: "SRVCHG".to_string(),
            handling_fee: Money::from_units(20),
            service_charge_keep: vec![
                "description".to_string(),
                "name".to_string(),
                "cust_name_id".to_string(),
            ],
            first_seat_column: "first_seat".to_string(),
            last_seat_column: "last_seat".to_string(),
            date_columns: vec!["renewal_date".to_string()],
            rules,
        }
    }

    /// Policy for an input column; anything not listed is a set
    pub fn field_policy(&self, column: &str) -> FieldPolicy {
        self.rules.get(column).copied().unwrap_or(FieldPolicy::Set)
    }

    pub fn set_rule(&mut self, column: &str, policy: FieldPolicy) -> Result {
        if column == self.account_column {
            Err(PolicyError::AccountColumnOverride(column.to_string()))?
        }

        log::debug!("Column policy override: {column} -> {policy:?}");
        self.rules.insert(column.to_string(), policy);

        return Ok(());
    }

    /// Applies `column,policy` rows read from CSV on top of the current rules
    pub fn apply_overrides<R: io::Read>(&mut self, reader: R) -> Result {
        let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

        for record in rdr.deserialize::<PolicyRecord>() {
            let record = record?;
            self.set_rule(&record.column, record.policy)?;
        }

        return Ok(());
    }

    pub fn load_overrides(&mut self, path: &Path) -> Result {
        let file = File::open(path)
            .with_context(|| format!("Couldn't open policy file: {}", path.display()))?;

        self.apply_overrides(file)
            .with_context(|| format!("Invalid policy file: {}", path.display()))
    }

    /// Input columns the loader cannot work without
    pub fn required_columns(&self) -> Vec<&str> {
        let mut required = vec![
            self.account_column.as_str(),
            self.customer_column.as_str(),
            self.section_column.as_str(),
            self.owed_column.as_str(),
            self.first_seat_column.as_str(),
            self.last_seat_column.as_str(),
            "row_name",
        ];
        required.extend(self.date_columns.iter().map(String::as_str));

        required
    }

    /// Name an input column is output under
    pub fn output_name<'a>(&'a self, column: &'a str) -> &'a str {
        if column == self.owed_column {
            &self.owed_output
        } else {
            column
        }
    }

    pub fn is_date_column(&self, column: &str) -> bool {
        self.date_columns.iter().any(|date| date == column)
    }

    pub fn is_money_column(&self, column: &str) -> bool {
        column == self.owed_column
    }

    pub fn keeps_on_service_charge(&self, column: &str) -> bool {
        self.service_charge_keep.iter().any(|keep| keep == column)
    }
}

impl Default for ColumnPolicy {
    fn default() -> Self {
        Self::for_version(PolicyVersion::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v1_drops_pricing_columns() {
        let policy = ColumnPolicy::for_version(PolicyVersion::V1);

        assert_eq!(policy.field_policy("price_code"), FieldPolicy::Drop);
        assert_eq!(policy.field_policy("total_cost"), FieldPolicy::Drop);
        assert_eq!(policy.field_policy("first_seat"), FieldPolicy::List);
        assert_eq!(policy.field_policy("renewal_date"), FieldPolicy::Set);
    }

    #[test]
    fn v2_keeps_pricing_columns_in_order() {
        let policy = ColumnPolicy::for_version(PolicyVersion::V2);

        assert_eq!(policy.field_policy("price_code"), FieldPolicy::List);
        assert_eq!(policy.field_policy("cost_per_seat"), FieldPolicy::List);
        assert_eq!(policy.field_policy("quantity"), FieldPolicy::Drop);
        assert_eq!(policy.field_policy("cust_name_id"), FieldPolicy::Set);
    }

    #[test]
    fn parse_versions() {
        assert_eq!("v1".parse::<PolicyVersion>().unwrap(), PolicyVersion::V1);
        assert_eq!("V2".parse::<PolicyVersion>().unwrap(), PolicyVersion::V2);
        assert!("v3".parse::<PolicyVersion>().is_err());
    }

    #[test]
    fn apply_csv_overrides() {
        let mut policy = ColumnPolicy::default();
        let data = "column,policy\nquantity,list\nrow_name, set\n";

        policy.apply_overrides(data.as_bytes()).unwrap();

        assert_eq!(policy.field_policy("quantity"), FieldPolicy::List);
        assert_eq!(policy.field_policy("row_name"), FieldPolicy::Set);
    }

    #[test]
    fn fail_on_unknown_policy_keyword() {
        let mut policy = ColumnPolicy::default();
        let data = "column,policy\nquantity,sometimes\n";

        assert!(policy.apply_overrides(data.as_bytes()).is_err());
    }

    #[test]
    fn fail_to_override_account_column() {
        let mut policy = ColumnPolicy::default();

        assert!(policy.set_rule("acct_id", FieldPolicy::List).is_err());
    }

    #[test]
    fn owed_amount_outputs_as_owed_seat() {
        let policy = ColumnPolicy::default();

        assert_eq!(policy.output_name("owed_amount"), "owed_seat");
        assert_eq!(policy.output_name("row_name"), "row_name");
    }
}
