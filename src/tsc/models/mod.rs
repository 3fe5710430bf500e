mod account_group;
mod condensed_table;

pub use account_group::{AccountGroup, AccountGroups};
pub use condensed_table::{
    expand_names, matches_family, Column, ColumnKind, CondensedRow, CondensedTable,
    CondensedTableError,
};
