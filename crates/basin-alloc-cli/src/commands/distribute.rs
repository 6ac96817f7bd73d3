use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Args;
use serde_json::Value;

use basin_alloc_core::allocation::{RatioPolicy, DEFAULT_EXCLUDED_BASIN};
use basin_alloc_core::distribution::{
    run_distribution, write_distribution_sheet, DISTRIBUTION_SHEET,
};
use basin_alloc_core::types::ReportWindow;
use basin_alloc_core::workbook::Workbook;

/// Arguments for the distribution run
#[derive(Args)]
pub struct DistributeArgs {
    /// Workbook directory (one CSV file per sheet)
    pub workbook: PathBuf,

    /// Report window start, ISO 8601 (e.g. 2024-06-01)
    pub start: NaiveDate,

    /// Report window end, ISO 8601 (e.g. 2024-06-30)
    pub end: NaiveDate,

    /// Name of the output sheet (replaced in place)
    #[arg(long, default_value = DISTRIBUTION_SHEET)]
    pub sheet_name: String,

    /// Basin excluded from receiving sprinkled orphan cost
    #[arg(long, default_value = DEFAULT_EXCLUDED_BASIN)]
    pub excluded_basin: String,

    /// Compute and print the report without writing the sheet
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run_distribute(args: DistributeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let window = ReportWindow::new(args.start, args.end)?;
    let wb = Workbook::open(&args.workbook)?;
    let policy = RatioPolicy {
        excluded_basin: args.excluded_basin,
    };

    let output = run_distribution(&wb, &window, &policy)?;

    if !args.dry_run {
        write_distribution_sheet(&wb, &output.result, &args.sheet_name)?;
    }

    Ok(serde_json::to_value(&output)?)
}
