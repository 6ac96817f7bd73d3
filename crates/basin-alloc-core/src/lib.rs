//! # basin-alloc-core
//!
//! Unallocated-cost distribution engine for basin-level month-end
//! reporting.
//!
//! A monthly run reads three normalized tables from a workbook (a
//! directory of CSV sheets): unallocated cost lines, activity records
//! ("pads") and a chemical-cost-by-pad lookup. Costs without a valid
//! six-digit project number are summed per basin (the numerator),
//! basin activity is summed for the report window (the denominator),
//! and per-basin allocation ratios are computed per cost category.
//! Basins carrying cost with zero activity have that cost pooled and
//! redistributed at a flat rate across active basins, excluding the
//! Canadian-dollar basin. Final ratios are applied back onto every pad,
//! and all intermediate tables are written to one auditable sheet.
//!
//! ## Example
//!
//! ```rust,ignore
//! use basin_alloc_core::{
//!     run_distribution, write_distribution_sheet, RatioPolicy, ReportWindow, Workbook,
//!     DISTRIBUTION_SHEET,
//! };
//! use chrono::NaiveDate;
//!
//! let wb = Workbook::open("reports/2024-06")?;
//! let window = ReportWindow::new(
//!     NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
//! )?;
//! let output = run_distribution(&wb, &window, &RatioPolicy::default())?;
//! write_distribution_sheet(&wb, &output.result, DISTRIBUTION_SHEET)?;
//! ```

pub mod allocation;
pub mod distribution;
pub mod error;
pub mod normalize;
pub mod reader;
pub mod report;
pub mod types;
pub mod workbook;

pub use allocation::{
    AllocatedPad, CategoryDistribution, OrphanBasin, RatioPolicy, DEFAULT_EXCLUDED_BASIN,
};
pub use distribution::{run_distribution, write_distribution_sheet, DISTRIBUTION_SHEET};
pub use error::AllocError;
pub use report::{DistributionReport, SummaryRow, SummaryTotals};
pub use types::*;
pub use workbook::{Sheet, Workbook};

/// Standard result type for all allocation operations
pub type AllocResult<T> = Result<T, AllocError>;
