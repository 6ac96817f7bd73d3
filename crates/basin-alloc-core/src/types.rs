use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::AllocError;
use crate::AllocResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Allocation ratios ($ per unit of driver).
pub type Ratio = Decimal;

// Canonical column names. Every source sheet is renamed to these before
// any typed conversion happens (see `normalize::HEADER_ALIASES`).
pub const COL_BASIN: &str = "LBRT BASIN";
pub const COL_PROJECT_NUMBER: &str = "Project Number";
pub const COL_PAD_NO: &str = "Pad No";
pub const COL_PAD_START: &str = "Pad Start";
pub const COL_PAD_END: &str = "Pad End";
pub const COL_PROP_TN: &str = "Prop TN";
pub const COL_CLIENT_FACTOR: &str = "Avg. Client Provided";
pub const COL_PROP_COST: &str = "Prop Cost";
pub const COL_TRUCK_COST: &str = "Truck Cost";
pub const COL_CHEM_COST: &str = "Chem Cost";
pub const COL_FUEL_COST: &str = "Fuel Cost";
pub const COL_MAT_COST: &str = "Mat Cost";
pub const COL_OTHER_PAD_COST: &str = "Other Pad Cost";
pub const COL_ALLOC_VM_COST: &str = "Alloc VM Cost";

/// The four allocation categories. Sand and Handling share the weighted
/// proppant denominator; Daily pools the four daily cost columns against
/// active pad-days; Chemical allocates against chemical spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CostCategory {
    Sand,
    Handling,
    Chemical,
    Daily,
}

impl CostCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            CostCategory::Sand => "Sand",
            CostCategory::Handling => "Handling",
            CostCategory::Chemical => "Chemical",
            CostCategory::Daily => "Daily",
        }
    }
}

impl std::fmt::Display for CostCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive date window for one report month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> AllocResult<Self> {
        if end < start {
            return Err(AllocError::InvalidWindow(format!(
                "end date {} is before start date {}",
                end, start
            )));
        }
        Ok(ReportWindow { start, end })
    }

    /// Whole days in the window.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Overlap of [start, end] with this window, clamped to >= 0 days.
    /// Missing bounds fall back to the window's own bounds (a record with
    /// no dates is treated as active for the whole report month).
    pub fn overlap_days(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> i64 {
        let s = start.unwrap_or(self.start).max(self.start);
        let e = end.unwrap_or(self.end).min(self.end);
        (e - s).num_days().max(0)
    }
}

/// A single ledger row from an unallocated-cost source sheet.
///
/// `project_number` is kept raw; a line is unallocated unless it carries
/// a strict six-digit project identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostLineItem {
    pub basin: String,
    pub project_number: String,
    pub prop_cost: Money,
    pub truck_cost: Money,
    pub fuel_cost: Money,
    pub mat_cost: Money,
    pub other_pad_cost: Money,
    pub alloc_vm_cost: Money,
}

impl CostLineItem {
    /// A line item counts as unallocated unless its project number is
    /// exactly six ASCII digits. Blank, alphabetic, and other-length
    /// values are all unallocated.
    pub fn is_unallocated(&self) -> bool {
        let p = self.project_number.trim();
        !(p.len() == 6 && p.chars().all(|c| c.is_ascii_digit()))
    }

    /// Sum of the four daily cost columns for this line.
    pub fn daily_cost(&self) -> Money {
        self.fuel_cost + self.mat_cost + self.other_pad_cost + self.alloc_vm_cost
    }
}

/// One row of activity ("pad") from the Database sheet, as read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub pad_no: Option<i64>,
    pub basin: Option<String>,
    pub pad_start: Option<NaiveDate>,
    pub pad_end: Option<NaiveDate>,
    pub prop_tn: Decimal,
    pub client_factor: Decimal,
}

/// One row of the chemical-cost-by-pad lookup (the "Current" sheet).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChemCostRow {
    pub basin: Option<String>,
    pub pad_no: Option<i64>,
    pub chem_cost: Money,
}

/// An activity record prepared for allocation: active days clamped into
/// the report window and chemical cost joined by pad number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PadActivity {
    pub pad_no: Option<i64>,
    pub basin: Option<String>,
    pub pad_start: Option<NaiveDate>,
    pub pad_end: Option<NaiveDate>,
    pub prop_tn: Decimal,
    pub client_factor: Decimal,
    pub chem_cost: Money,
    pub pad_days: Decimal,
}

/// Metadata attached to every distribution run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Standard run output envelope: the report plus the data-quality
/// diagnostics accumulated while producing it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutput<T: serde::Serialize> {
    pub result: T,
    pub methodology: String,
    pub warnings: Vec<String>,
    pub metadata: RunMetadata,
}

/// Helper to wrap a run result with metadata.
pub fn with_metadata<T: serde::Serialize>(
    methodology: &str,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> RunOutput<T> {
    RunOutput {
        result,
        methodology: methodology.to_string(),
        warnings,
        metadata: RunMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
