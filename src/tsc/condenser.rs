use crate::models::{
    expand_names, AccountGroup, AccountGroups, Column, CondensedRow, CondensedTable,
};
use crate::policy::{ColumnPolicy, FieldPolicy};
use crate::Result;
use crate::Value;

use std::collections::HashSet;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CondenseError {
    #[error("Field list is missing the {0} column")]
    MissingField(String),
}

/// Output layout of one grouped field
#[derive(Debug, Clone, PartialEq)]
struct FieldPlan {
    name: String,
    policy: FieldPolicy,
    date: bool,
    money: bool,
    width: usize,
}

/// Turns account groups into the condensed table: one row per account, every field expanded
/// into as many numbered columns as the widest account needs
pub struct Condenser<'a> {
    policy: &'a ColumnPolicy,
}

impl<'a> Condenser<'a> {
    pub fn new(policy: &'a ColumnPolicy) -> Self {
        Self { policy }
    }

    pub fn condense(&self, groups: &AccountGroups) -> Result<CondensedTable> {
        if groups.field_index(&self.policy.customer_column).is_none() {
            Err(CondenseError::MissingField(self.policy.customer_column.clone()))?
        }

        let collections: Vec<Vec<Vec<Value>>> = groups
            .iter()
            .map(|group| self.collect_group(groups, group))
            .collect();

        let plans = self.infer_schema(groups, &collections);
        let mut table = CondensedTable::new(self.build_columns(&plans));

        log::debug!("Condensed schema: {:?}", table.column_names());

        for (group, fields) in groups.iter().zip(collections) {
            self.warn_on_unpaired_seats(groups, group, &fields);

            let mut cells = Vec::with_capacity(table.columns().len());
            cells.push(Some(group.account_id.to_value()));

            for (plan, values) in plans.iter().zip(fields) {
                if plan.name == self.policy.customer_column {
                    cells.push(group.handling.map(|fee| Value::Number(fee.to_f64())));
                }

                let padding = plan.width - values.len();
                cells.extend(values.into_iter().map(Some));
                cells.extend(std::iter::repeat(None).take(padding));
            }

            table.push_row(CondensedRow {
                account_id: group.account_id.clone(),
                cells,
            })?;
        }

        return Ok(table);
    }

    /// Reduces each field of one account to its output collection
    fn collect_group(&self, groups: &AccountGroups, group: &AccountGroup) -> Vec<Vec<Value>> {
        groups
            .fields()
            .iter()
            .enumerate()
            .map(|(field_idx, name)| {
                let values: Vec<Value> = if self.policy.is_date_column(name) {
                    group.field(field_idx).iter().map(Value::to_us_date).collect()
                } else {
                    group.field(field_idx).to_vec()
                };

                match self.policy.field_policy(name) {
                    FieldPolicy::List | FieldPolicy::Drop => values,
                    FieldPolicy::Set => dedup(&values),
                }
            })
            .collect()
    }

    /// Decides every field's column count before any row is emitted. A field is at least one
    /// column wide; the seat pair always shares one width.
    fn infer_schema(
        &self,
        groups: &AccountGroups,
        collections: &[Vec<Vec<Value>>],
    ) -> Vec<FieldPlan> {
        let mut plans: Vec<FieldPlan> = groups
            .fields()
            .iter()
            .enumerate()
            .map(|(field_idx, name)| FieldPlan {
                name: name.clone(),
                policy: self.policy.field_policy(name),
                date: self.policy.is_date_column(name),
                money: self.policy.is_money_column(name),
                width: collections
                    .iter()
                    .map(|fields| fields[field_idx].len())
                    .max()
                    .unwrap_or(0)
                    .max(1),
            })
            .collect();

        let first = groups.field_index(&self.policy.first_seat_column);
        let last = groups.field_index(&self.policy.last_seat_column);

        if let (Some(first), Some(last)) = (first, last) {
            let width = plans[first].width.max(plans[last].width);
            plans[first].width = width;
            plans[last].width = width;
        }

        for plan in plans.iter() {
            log::debug!(
                "Field {} ({:?}{}): {} column(s)",
                plan.name,
                plan.policy,
                if plan.date { ", date" } else { "" },
                plan.width
            );
        }

        plans
    }

    fn build_columns(&self, plans: &[FieldPlan]) -> Vec<Column> {
        let mut columns = vec![Column::general(self.policy.account_column.clone())];

        for plan in plans {
            if plan.name == self.policy.customer_column {
                columns.push(Column::money(self.policy.handling_column.clone()));
            }

            for name in expand_names(self.policy.output_name(&plan.name), plan.width) {
                columns.push(if plan.money {
                    Column::money(name)
                } else {
                    Column::general(name)
                });
            }
        }

        columns
    }

    fn warn_on_unpaired_seats(
        &self,
        groups: &AccountGroups,
        group: &AccountGroup,
        fields: &[Vec<Value>],
    ) {
        let first = groups.field_index(&self.policy.first_seat_column);
        let last = groups.field_index(&self.policy.last_seat_column);

        if let (Some(first), Some(last)) = (first, last) {
            if fields[first].len() != fields[last].len() {
                log::warn!(
                    "Account {}: {} {} value(s) but {} {} value(s), padding with blanks",
                    group.account_id,
                    fields[first].len(),
                    self.policy.first_seat_column,
                    fields[last].len(),
                    self.policy.last_seat_column,
                );
            }
        }
    }
}

/// Distinct values, first occurrence order
fn dedup(values: &[Value]) -> Vec<Value> {
    let mut seen = HashSet::new();

    values
        .iter()
        .filter(|value| seen.insert(*value))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::ids::AccountId;
    use crate::Money;

    const FIELDS: [&str; 7] = [
        "section",
        "row_name",
        "first_seat",
        "last_seat",
        "owed_amount",
        "renewal_date",
        "cust_name_id",
    ];

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    fn build_groups() -> AccountGroups {
        AccountGroups::new(FIELDS.iter().map(|f| f.to_string()).collect())
    }

    fn fill(groups: &mut AccountGroups, id: i64, field: &str, values: Vec<Value>) {
        let idx = groups.field_index(field).unwrap();
        let group = groups.find_mut_or_create(AccountId::Numeric(id));
        for value in values {
            group.push(idx, value);
        }
    }

    #[test]
    fn single_row_accounts_keep_bare_names() {
        let policy = ColumnPolicy::default();
        let mut groups = build_groups();
        fill(&mut groups, 1, "section", vec![text("101")]);
        fill(&mut groups, 1, "first_seat", vec![Value::Number(4.0)]);
        fill(&mut groups, 1, "last_seat", vec![Value::Number(5.0)]);
        fill(&mut groups, 1, "owed_amount", vec![Value::Number(50.0)]);
        fill(&mut groups, 1, "cust_name_id", vec![Value::Number(9.0)]);

        let table = Condenser::new(&policy).condense(&groups).unwrap();

        assert_eq!(
            table.column_names(),
            vec![
                "acct_id",
                "section",
                "row_name",
                "first_seat",
                "last_seat",
                "owed_seat",
                "renewal_date",
                "Handling",
                "cust_name_id",
            ]
        );
        assert_eq!(table.cell(0, "first_seat"), Some(&Value::Number(4.0)));
        assert_eq!(table.cell(0, "owed_seat"), Some(&Value::Number(50.0)));
        assert_eq!(table.cell(0, "Handling"), None);
    }

    #[test]
    fn set_fields_deduplicate() {
        let policy = ColumnPolicy::default();
        let mut groups = build_groups();
        fill(&mut groups, 1, "cust_name_id", vec![text("A"), text("A"), text("B")]);

        let table = Condenser::new(&policy).condense(&groups).unwrap();

        let mut values: Vec<&Value> = ["cust_name_id1", "cust_name_id2"]
            .iter()
            .filter_map(|name| table.cell(0, name))
            .collect();
        values.sort();

        assert_eq!(values, vec![&text("A"), &text("B")]);
        assert_eq!(table.position("cust_name_id3"), None);
    }

    #[test]
    fn list_fields_keep_duplicates_in_order() {
        let policy = ColumnPolicy::default();
        let mut groups = build_groups();
        fill(
            &mut groups,
            1,
            "owed_amount",
            vec![Value::Number(5.0), Value::Number(5.0), Value::Number(7.0)],
        );

        let table = Condenser::new(&policy).condense(&groups).unwrap();

        assert_eq!(table.cell(0, "owed_seat1"), Some(&Value::Number(5.0)));
        assert_eq!(table.cell(0, "owed_seat2"), Some(&Value::Number(5.0)));
        assert_eq!(table.cell(0, "owed_seat3"), Some(&Value::Number(7.0)));
    }

    #[test]
    fn shorter_accounts_are_null_filled() {
        let policy = ColumnPolicy::default();
        let mut groups = build_groups();
        fill(&mut groups, 1, "row_name", vec![text("A"), text("B")]);
        fill(&mut groups, 2, "row_name", vec![text("C")]);

        let table = Condenser::new(&policy).condense(&groups).unwrap();

        assert_eq!(table.cell(1, "row_name1"), Some(&text("C")));
        assert_eq!(table.cell(1, "row_name2"), None);
    }

    #[test]
    fn unequal_seat_lists_share_one_width() {
        let policy = ColumnPolicy::default();
        let mut groups = build_groups();
        fill(
            &mut groups,
            1,
            "first_seat",
            vec![Value::Number(1.0), Value::Number(3.0)],
        );
        fill(&mut groups, 1, "last_seat", vec![Value::Number(2.0)]);

        let table = Condenser::new(&policy).condense(&groups).unwrap();

        assert_eq!(table.family_positions("first_seat").len(), 2);
        assert_eq!(table.family_positions("last_seat").len(), 2);
        assert_eq!(table.cell(0, "last_seat2"), None);
    }

    #[test]
    fn handling_sits_before_customer() {
        let policy = ColumnPolicy::default();
        let mut groups = build_groups();
        fill(&mut groups, 1, "cust_name_id", vec![text("A")]);
        groups.find_mut_or_create(AccountId::Numeric(1)).handling = Some(Money::from_units(20));

        let table = Condenser::new(&policy).condense(&groups).unwrap();

        let handling = table.position("Handling").unwrap();
        assert_eq!(table.position("cust_name_id"), Some(handling + 1));
        assert_eq!(table.cell(0, "Handling"), Some(&Value::Number(20.0)));
    }

    #[test]
    fn dates_render_as_month_day_year() {
        let policy = ColumnPolicy::default();
        let mut groups = build_groups();
        fill(
            &mut groups,
            1,
            "renewal_date",
            vec![text("2023-02-01"), text("2023-02-01")],
        );

        let table = Condenser::new(&policy).condense(&groups).unwrap();

        assert_eq!(table.cell(0, "renewal_date"), Some(&text("02/01/2023")));
    }

    #[test]
    fn fail_without_customer_field() {
        let policy = ColumnPolicy::default();
        let groups = AccountGroups::new(vec!["section".to_string()]);

        assert!(Condenser::new(&policy).condense(&groups).is_err());
    }
}
