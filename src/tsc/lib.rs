pub mod condenser;
pub mod ids;
pub mod input;
pub mod interleave;
pub mod layout;
pub mod loader;
pub mod merge;
pub mod models;
mod money;
pub mod policy;
mod result;
pub mod totals;
mod value;

pub use money::{Money, MoneyError};
pub use result::Result;
pub use value::Value;

use condenser::Condenser;
use input::RawTable;
use loader::{DataErrorPolicy, Loader};
use models::CondensedTable;
use policy::ColumnPolicy;

/// Runs the whole transformation: group rows per account, expand fields into columns, add
/// the totals and interleave the seat columns
pub fn condense_table(
    raw: &RawTable,
    policy: &ColumnPolicy,
    on_error: DataErrorPolicy,
) -> Result<CondensedTable> {
    let groups = Loader::new(policy, on_error).load(raw)?;
    let mut table = Condenser::new(policy).condense(&groups)?;

    totals::add_totals(&mut table, policy)?;
    interleave::interleave_seats(&mut table, policy)?;

    return Ok(table);
}
