mod args;
mod config;
mod reader;
mod writer;

use tsc::merge::{self, MergeMode};
use tsc::models::CondensedTable;
use tsc::policy::ColumnPolicy;
use tsc::Result;

use clap::Parser;

fn main() -> Result {
    let args = args::Args::parse();
    config::configure_app(args.verbose)?;

    log::debug!("Application configured. Beginning process...");

    let args = args.canonicalize_inputs()?;
    log::debug!("Running with: {args:?}");

    let policy = build_policy(&args)?;

    let table = process_data(&args, &policy)?;

    log::debug!("Process complete. Writing {} accounts...", table.len());

    writer::write_workbook(&args.output_file, &args.sheet_name, &table)?;

    log::debug!("Application finished successfully!");

    Ok(())
}

fn build_policy(args: &args::Args) -> Result<ColumnPolicy> {
    let mut policy = ColumnPolicy::for_version(args.policy_version);

    if let Some(path) = &args.policy_file {
        log::debug!("Applying column policy overrides from {path:?}");
        policy.load_overrides(path)?;
    }

    return Ok(policy);
}

/// Read the input, condense it, and merge sales reps when asked to
fn process_data(args: &args::Args, policy: &ColumnPolicy) -> Result<CondensedTable> {
    let raw = reader::read_table(&args.input_file, args.input_sheet.as_deref())?;

    let table = tsc::condense_table(&raw, policy, args.on_bad_row)?;
    log::debug!("Condensed {} input rows into {} accounts", raw.len(), table.len());

    let reps_path = match &args.sales_rep_file {
        Some(path) => path,
        None => return Ok(table),
    };

    let reps = reader::read_table(reps_path, None)?;
    let mode = if args.keep_unmerged {
        MergeMode::Compat
    } else {
        MergeMode::Enriched
    };

    log::debug!("Merging sales reps from {reps_path:?} ({mode:?})");
    let outcome = merge::merge_sales_reps(table, &reps, policy, mode)?;

    println!("{}", outcome.report);

    Ok(outcome.table)
}
