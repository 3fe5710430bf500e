/// Crate-wide result; module error enums convert into it with `?`
pub type Result<T = ()> = anyhow::Result<T>;
