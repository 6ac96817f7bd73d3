//! Source Reader: turns raw workbook sheets into the three typed tables
//! the allocation core consumes.
//!
//! All header renaming, revenue-column stripping, currency coercion and
//! merged-cell forward-fill happen here. Downstream code never sees a raw
//! cell.

use tracing::debug;

use crate::normalize::{
    canonicalize_headers, carry_forward, clean_basin, is_revenue_column, parse_date,
    parse_identifier, parse_money,
};
use crate::types::{
    ActivityRecord, ChemCostRow, CostLineItem, COL_ALLOC_VM_COST, COL_BASIN, COL_CHEM_COST,
    COL_CLIENT_FACTOR, COL_FUEL_COST, COL_MAT_COST, COL_OTHER_PAD_COST, COL_PAD_END, COL_PAD_NO,
    COL_PAD_START, COL_PROJECT_NUMBER, COL_PROP_COST, COL_PROP_TN, COL_TRUCK_COST,
};
use crate::workbook::{Sheet, Workbook};
use crate::AllocResult;

/// The three logical tables of one distribution run.
#[derive(Debug, Clone)]
pub struct SourceTables {
    /// Cost lines from the unallocated-cost sheet(s), concatenated.
    pub cost_lines: Vec<CostLineItem>,
    /// Activity records from the Database sheet.
    pub activity: Vec<ActivityRecord>,
    /// Chemical cost rows from the Current sheet.
    pub chem_costs: Vec<ChemCostRow>,
}

/// Load and normalize every source table for a run.
///
/// Fatal on a missing sheet or a missing required column; everything that
/// is row-level noise (unparseable cells, blank pads) is absorbed by the
/// coercion rules or recorded in `warnings`.
pub fn load_sources(wb: &Workbook, warnings: &mut Vec<String>) -> AllocResult<SourceTables> {
    let unalloc_name = wb.find_sheet(&["p. vm", "unalloc"])?;
    let current_name = wb.find_sheet(&["p. vm", "current"])?;
    let database_name = wb.find_sheet(&["database"])?;

    let cost_lines = read_cost_lines(wb, &unalloc_name, warnings)?;
    let chem_costs = read_chem_costs(wb, &current_name)?;
    let activity = read_activity(wb, &database_name)?;

    debug!(
        cost_lines = cost_lines.len(),
        activity = activity.len(),
        chem_rows = chem_costs.len(),
        "loaded source tables"
    );
    Ok(SourceTables {
        cost_lines,
        activity,
        chem_costs,
    })
}

fn prepare(mut sheet: Sheet) -> Sheet {
    canonicalize_headers(&mut sheet.headers);
    sheet.retain_columns(|h| !is_revenue_column(h));
    sheet
}

/// Read one unallocated-cost sheet into cost line items.
///
/// Blank basin cells are forward-filled from the preceding row before the
/// rows are used anywhere: in the source extracts a blank basin is an
/// Excel merged range continuing the basin above, not missing data. Rows
/// with no basin at all (before the first named one) are dropped with a
/// warning.
pub fn read_cost_lines(
    wb: &Workbook,
    sheet_name: &str,
    warnings: &mut Vec<String>,
) -> AllocResult<Vec<CostLineItem>> {
    let sheet = prepare(wb.read_sheet(sheet_name)?);

    let basin_col = sheet.require_column(COL_BASIN)?;
    let project_col = sheet.require_column(COL_PROJECT_NUMBER)?;
    let prop_col = sheet.require_column(COL_PROP_COST)?;
    let truck_col = sheet.require_column(COL_TRUCK_COST)?;
    let fuel_col = sheet.require_column(COL_FUEL_COST)?;
    let mat_col = sheet.require_column(COL_MAT_COST)?;
    let other_col = sheet.require_column(COL_OTHER_PAD_COST)?;
    let vm_col = sheet.require_column(COL_ALLOC_VM_COST)?;

    let raw_basins: Vec<Option<String>> = sheet
        .rows
        .iter()
        .map(|row| clean_basin(sheet.cell(row, basin_col)))
        .collect();
    let basins = carry_forward(&raw_basins);

    let mut lines = Vec::with_capacity(sheet.rows.len());
    let mut dropped = 0usize;
    for (row, basin) in sheet.rows.iter().zip(basins) {
        let Some(basin) = basin else {
            dropped += 1;
            continue;
        };
        lines.push(CostLineItem {
            basin,
            project_number: sheet.cell(row, project_col).trim().to_string(),
            prop_cost: parse_money(sheet.cell(row, prop_col)),
            truck_cost: parse_money(sheet.cell(row, truck_col)),
            fuel_cost: parse_money(sheet.cell(row, fuel_col)),
            mat_cost: parse_money(sheet.cell(row, mat_col)),
            other_pad_cost: parse_money(sheet.cell(row, other_col)),
            alloc_vm_cost: parse_money(sheet.cell(row, vm_col)),
        });
    }
    if dropped > 0 {
        warnings.push(format!(
            "{dropped} row(s) in '{sheet_name}' had no basin (even after forward-fill) and were dropped"
        ));
    }
    Ok(lines)
}

/// Read the chemical-cost-by-pad lookup from the Current sheet.
/// No forward-fill here: only the unallocated-cost side uses the
/// merged-cell convention.
pub fn read_chem_costs(wb: &Workbook, sheet_name: &str) -> AllocResult<Vec<ChemCostRow>> {
    let sheet = prepare(wb.read_sheet(sheet_name)?);

    let basin_col = sheet.require_column(COL_BASIN)?;
    let chem_col = sheet.require_column(COL_CHEM_COST)?;
    let pad_col = sheet.column(COL_PAD_NO);

    let rows = sheet
        .rows
        .iter()
        .map(|row| ChemCostRow {
            basin: clean_basin(sheet.cell(row, basin_col)),
            pad_no: pad_col.and_then(|c| parse_identifier(sheet.cell(row, c))),
            chem_cost: parse_money(sheet.cell(row, chem_col)),
        })
        .collect();
    Ok(rows)
}

/// Read activity records from the Database sheet. Rows with a blank pad
/// number are layout artifacts and are dropped, mirroring the source
/// extract's `dropna` on `Pad No`.
pub fn read_activity(wb: &Workbook, sheet_name: &str) -> AllocResult<Vec<ActivityRecord>> {
    let sheet = prepare(wb.read_sheet(sheet_name)?);

    let pad_col = sheet.require_column(COL_PAD_NO)?;
    let basin_col = sheet.require_column(COL_BASIN)?;
    let start_col = sheet.require_column(COL_PAD_START)?;
    let end_col = sheet.require_column(COL_PAD_END)?;
    let tn_col = sheet.require_column(COL_PROP_TN)?;
    let factor_col = sheet.require_column(COL_CLIENT_FACTOR)?;

    let mut records = Vec::with_capacity(sheet.rows.len());
    for row in &sheet.rows {
        let pad_cell = sheet.cell(row, pad_col);
        if pad_cell.trim().is_empty() {
            continue;
        }
        records.push(ActivityRecord {
            pad_no: parse_identifier(pad_cell),
            basin: clean_basin(sheet.cell(row, basin_col)),
            pad_start: parse_date(sheet.cell(row, start_col)),
            pad_end: parse_date(sheet.cell(row, end_col)),
            prop_tn: parse_money(sheet.cell(row, tn_col)),
            client_factor: parse_money(sheet.cell(row, factor_col)),
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use std::io::Write;

    fn workbook(sheets: &[(&str, &str)]) -> (tempfile::TempDir, Workbook) {
        let dir = tempfile::tempdir().unwrap();
        for (name, body) in sheets {
            let mut f =
                std::fs::File::create(dir.path().join(format!("{name}.csv"))).unwrap();
            f.write_all(body.as_bytes()).unwrap();
        }
        let wb = Workbook::open(dir.path()).unwrap();
        (dir, wb)
    }

    const UNALLOC_HEADER: &str =
        "ENG BASIN R1,Project Number,Prop Cost,Truck Cost,Fuel Cost,Mat and Containment Costs,Other Pad Costs,Allocation VM";

    #[test]
    fn test_cost_lines_forward_fill_merged_basins() {
        let body = format!(
            "{UNALLOC_HEADER}\nTX,,100,0,0,0,0,0\n,,50,0,0,0,0,0\n,ABC,25,0,0,0,0,0\nND,,10,0,0,0,0,0\n"
        );
        let (_dir, wb) = workbook(&[("P. VM Unalloc", &body)]);
        let mut warnings = Vec::new();
        let lines = read_cost_lines(&wb, "P. VM Unalloc", &mut warnings).unwrap();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1].basin, "TX");
        assert_eq!(lines[2].basin, "TX");
        assert_eq!(lines[3].basin, "ND");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_cost_lines_leading_blank_basin_dropped_with_warning() {
        let body = format!("{UNALLOC_HEADER}\n,,100,0,0,0,0,0\nTX,,50,0,0,0,0,0\n");
        let (_dir, wb) = workbook(&[("P. VM Unalloc", &body)]);
        let mut warnings = Vec::new();
        let lines = read_cost_lines(&wb, "P. VM Unalloc", &mut warnings).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_basin_case_variants_collapse_to_one_group() {
        let body = format!("{UNALLOC_HEADER}\nTX,,100,0,0,0,0,0\ntx,,100,0,0,0,0,0\n");
        let (_dir, wb) = workbook(&[("P. VM Unalloc", &body)]);
        let mut warnings = Vec::new();
        let lines = read_cost_lines(&wb, "P. VM Unalloc", &mut warnings).unwrap();
        assert_eq!(lines[0].basin, "TX");
        assert_eq!(lines[1].basin, "TX");
        let totals = crate::allocation::aggregate_unallocated(&lines, &[]);
        assert_eq!(totals.sand["TX"], dec!(200));
        assert_eq!(totals.sand.len(), 1);
    }

    #[test]
    fn test_cost_lines_currency_coercion() {
        let body = format!("{UNALLOC_HEADER}\nTX,,\"$1,500.00\",\"(200.00)\",bad,0,0,0\n");
        let (_dir, wb) = workbook(&[("P. VM Unalloc", &body)]);
        let mut warnings = Vec::new();
        let lines = read_cost_lines(&wb, "P. VM Unalloc", &mut warnings).unwrap();
        assert_eq!(lines[0].prop_cost, dec!(1500.00));
        assert_eq!(lines[0].truck_cost, dec!(-200.00));
        assert_eq!(lines[0].fuel_cost, dec!(0));
    }

    #[test]
    fn test_missing_required_column_is_fatal() {
        let body = "ENG BASIN R1,Project Number,Prop Cost\nTX,,100\n";
        let (_dir, wb) = workbook(&[("P. VM Unalloc", body)]);
        let mut warnings = Vec::new();
        let err = read_cost_lines(&wb, "P. VM Unalloc", &mut warnings).unwrap_err();
        assert!(err.to_string().contains("Truck Cost"));
    }

    #[test]
    fn test_activity_drops_blank_pad_rows() {
        let body = "Pad No,LBRT BASIN,PAD START,PAD END,Prop TN,Avg. Client Provided\n\
                    101,TX,2024-06-01,2024-06-10,10,1.5\n\
                    ,TX,2024-06-01,2024-06-10,99,1\n\
                    102,,2024-06-05,2024-06-20,5,2\n";
        let (_dir, wb) = workbook(&[("Database", body)]);
        let records = read_activity(&wb, "Database").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].pad_no, Some(101));
        assert_eq!(records[0].prop_tn, dec!(10));
        assert_eq!(records[1].basin, None);
    }

    #[test]
    fn test_chem_costs_identifier_coercion() {
        let body = "LBRT BASIN,Pad No,Chemical and Gel cost\nTX,101.0,$250.00\nTX,,100\n";
        let (_dir, wb) = workbook(&[("P. VM Current", body)]);
        let rows = read_chem_costs(&wb, "P. VM Current").unwrap();
        assert_eq!(rows[0].pad_no, Some(101));
        assert_eq!(rows[0].chem_cost, dec!(250.00));
        assert_eq!(rows[1].pad_no, None);
    }

    #[test]
    fn test_load_sources_missing_sheet_is_fatal() {
        let (_dir, wb) = workbook(&[("Database", "Pad No\n")]);
        let mut warnings = Vec::new();
        let err = load_sources(&wb, &mut warnings).unwrap_err();
        assert!(matches!(
            err,
            crate::error::AllocError::MissingSource { .. }
        ));
    }
}
