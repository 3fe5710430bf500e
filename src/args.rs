use tsc::loader::DataErrorPolicy;
use tsc::policy::PolicyVersion;
use tsc::Result;

use std::{fs, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputArgsError {
    #[error("File not found: {0}")]
    FileNotFound(String),
}

/// Condenses per-seat ticket rows into one summary row per account
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// File path for the input workbook (.xlsx, .xls, .ods) or CSV file
    #[arg(long = "input_file")]
    pub input_file: PathBuf,

    /// File path for the output workbook
    #[arg(long = "output_file")]
    pub output_file: PathBuf,

    /// Name of the worksheet written to the output workbook
    #[arg(long = "sheet_name", default_value = "Summary")]
    pub sheet_name: String,

    /// Sheet to read from the input workbook (defaults to the first sheet)
    #[arg(long = "input_sheet")]
    pub input_sheet: Option<String>,

    /// Workbook or CSV mapping acct_id to sales reps, joined onto the summary
    #[arg(long = "sales_rep_file")]
    pub sales_rep_file: Option<PathBuf>,

    /// Write the summary without the sales rep columns, only report unmatched accounts
    #[arg(long = "keep_unmerged", requires = "sales_rep_file")]
    pub keep_unmerged: bool,

    /// Column policy revision: v1 drops pricing columns, v2 keeps them per seat
    #[arg(long = "policy_version", default_value = "v2")]
    pub policy_version: PolicyVersion,

    /// CSV of `column,policy` rows (set, list or drop) overriding the column policy
    #[arg(long = "policy_file")]
    pub policy_file: Option<PathBuf>,

    /// What to do with rows lacking a usable acct_id: skip or abort
    #[arg(long = "on_bad_row", default_value = "skip")]
    pub on_bad_row: DataErrorPolicy,

    /// Log at debug level (RUST_LOG still takes precedence)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Resolves every input path, failing early on files that don't exist
    pub fn canonicalize_inputs(mut self) -> Result<Self> {
        self.input_file = canonicalize(&self.input_file)?;

        if let Some(path) = &self.sales_rep_file {
            self.sales_rep_file = Some(canonicalize(path)?);
        }

        if let Some(path) = &self.policy_file {
            self.policy_file = Some(canonicalize(path)?);
        }

        return Ok(self);
    }
}

fn canonicalize(path: &PathBuf) -> Result<PathBuf> {
    let resolved = fs::canonicalize(path)
        .with_context(|| InputArgsError::FileNotFound(path.display().to_string()))?;

    return Ok(resolved);
}
