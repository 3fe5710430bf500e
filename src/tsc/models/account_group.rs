use crate::ids::AccountId;
use crate::{Money, Value};

use std::collections::BTreeMap;

/// Every non-null value an account contributed, per field, in input row order
#[derive(Debug, Clone, PartialEq)]
pub struct AccountGroup {
    pub account_id: AccountId,
    pub values: Vec<Vec<Value>>,
    pub handling: Option<Money>,
    pub rows: usize,
}

impl AccountGroup {
    pub fn new(account_id: AccountId, field_count: usize) -> Self {
        Self {
            account_id,
            values: vec![vec![]; field_count],
            handling: None,
            rows: 0,
        }
    }

    pub fn push(&mut self, field_idx: usize, value: Value) {
        self.values[field_idx].push(value);
    }

    pub fn field(&self, field_idx: usize) -> &[Value] {
        &self.values[field_idx]
    }
}

/// Account groups keyed and ordered by account id, sharing one field list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountGroups {
    fields: Vec<String>,
    map: BTreeMap<AccountId, AccountGroup>,
}

impl AccountGroups {
    pub fn new(fields: Vec<String>) -> Self {
        Self {
            fields,
            map: BTreeMap::new(),
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field == name)
    }

    pub fn find_mut_or_create(&mut self, account_id: AccountId) -> &mut AccountGroup {
        let field_count = self.fields.len();

        self.map
            .entry(account_id.clone())
            .or_insert_with(|| AccountGroup::new(account_id, field_count))
    }

    pub fn get(&self, account_id: &AccountId) -> Option<&AccountGroup> {
        self.map.get(account_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AccountGroup> {
        self.map.values()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
