//! Auditable report assembly.
//!
//! Every intermediate table of a run — audit copies of the normalized
//! sources, the combined summary, orphan diagnostics, final ratios and
//! the pad-level output — is laid out as a sequence of titled blocks in
//! one output sheet, so an analyst can trace each ratio back to the
//! rows that produced it.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::allocation::{AllocatedPad, CategoryDistribution};
use crate::types::{ChemCostRow, CostLineItem, Money, ReportWindow};

/// One basin row of the distribution summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRow {
    pub basin: String,
    pub sand_unalloc: Money,
    pub prop_total: Decimal,
    pub ratio_sand: Decimal,
    pub handle_unalloc: Money,
    pub ratio_handle: Decimal,
    pub chem_unalloc: Money,
    pub ratio_chem: Decimal,
    pub daily_unalloc: Money,
    pub day_total: Decimal,
    pub ratio_daily: Decimal,
}

/// Column totals for the summary (ratios are not summed).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryTotals {
    pub sand_unalloc: Money,
    pub prop_total: Decimal,
    pub handle_unalloc: Money,
    pub chem_unalloc: Money,
    pub daily_unalloc: Money,
    pub day_total: Decimal,
}

/// Normalized source tables carried along for the audit blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSnapshot {
    pub cost_lines: Vec<CostLineItem>,
    pub chem_costs: Vec<ChemCostRow>,
}

/// The full result of one distribution run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionReport {
    pub window: ReportWindow,
    pub summary: Vec<SummaryRow>,
    pub totals: SummaryTotals,
    pub sand: CategoryDistribution,
    pub handling: CategoryDistribution,
    pub chemical: CategoryDistribution,
    pub daily: CategoryDistribution,
    pub pads: Vec<AllocatedPad>,
    pub sources: SourceSnapshot,
}

impl DistributionReport {
    /// Union of all basins across the four categories, in order.
    pub fn basins(&self) -> Vec<String> {
        let set: BTreeSet<&String> = self
            .sand
            .ratios
            .keys()
            .chain(self.handling.ratios.keys())
            .chain(self.chemical.ratios.keys())
            .chain(self.daily.ratios.keys())
            .collect();
        set.into_iter().cloned().collect()
    }
}

// Cell formatting: currency-like values render with two decimals, ratios
// with six, counts as-is.
fn money(v: Money) -> String {
    format!("{:.2}", v.round_dp(2))
}

fn ratio(v: Decimal) -> String {
    format!("{:.6}", v.round_dp(6))
}

fn qty(v: Decimal) -> String {
    format!("{:.2}", v.round_dp(2))
}

fn opt<T: ToString>(v: &Option<T>) -> String {
    v.as_ref().map(|x| x.to_string()).unwrap_or_default()
}

fn s(v: &str) -> String {
    v.to_string()
}

fn push_block(grid: &mut Vec<Vec<String>>, title: &str, header: &[&str], rows: Vec<Vec<String>>) {
    grid.push(vec![title.to_string()]);
    grid.push(header.iter().map(|h| h.to_string()).collect());
    grid.extend(rows);
    grid.push(Vec::new());
}

/// Render the report as the `Unalloc_Distribution` cell grid.
pub fn render_grid(report: &DistributionReport) -> Vec<Vec<String>> {
    let mut grid: Vec<Vec<String>> = Vec::new();

    grid.push(vec![format!(
        "Unalloc Distribution {} to {}",
        report.window.start, report.window.end
    )]);
    grid.push(Vec::new());

    // audit copies of the normalized inputs
    push_block(
        &mut grid,
        "Source: Unallocated Cost Lines",
        &[
            "LBRT BASIN",
            "Project Number",
            "Prop Cost",
            "Truck Cost",
            "Fuel Cost",
            "Mat Cost",
            "Other Pad Cost",
            "Alloc VM Cost",
        ],
        report
            .sources
            .cost_lines
            .iter()
            .map(|l| {
                vec![
                    s(&l.basin),
                    s(&l.project_number),
                    money(l.prop_cost),
                    money(l.truck_cost),
                    money(l.fuel_cost),
                    money(l.mat_cost),
                    money(l.other_pad_cost),
                    money(l.alloc_vm_cost),
                ]
            })
            .collect(),
    );
    push_block(
        &mut grid,
        "Source: Chemical Cost by Pad",
        &["LBRT BASIN", "Pad No", "Chem Cost"],
        report
            .sources
            .chem_costs
            .iter()
            .map(|r| vec![opt(&r.basin), opt(&r.pad_no), money(r.chem_cost)])
            .collect(),
    );

    // combined summary with TOTAL row
    let mut summary_rows: Vec<Vec<String>> = report
        .summary
        .iter()
        .map(|r| {
            vec![
                s(&r.basin),
                money(r.sand_unalloc),
                qty(r.prop_total),
                ratio(r.ratio_sand),
                money(r.handle_unalloc),
                ratio(r.ratio_handle),
                money(r.chem_unalloc),
                ratio(r.ratio_chem),
                money(r.daily_unalloc),
                qty(r.day_total),
                ratio(r.ratio_daily),
            ]
        })
        .collect();
    summary_rows.push(vec![
        "TOTAL".to_string(),
        money(report.totals.sand_unalloc),
        qty(report.totals.prop_total),
        String::new(),
        money(report.totals.handle_unalloc),
        String::new(),
        money(report.totals.chem_unalloc),
        String::new(),
        money(report.totals.daily_unalloc),
        qty(report.totals.day_total),
        String::new(),
    ]);
    push_block(
        &mut grid,
        "Distribution Summary",
        &[
            "Basin",
            "SandUnalloc",
            "PropTotal",
            "RatioSand",
            "HandleUnalloc",
            "RatioHandle",
            "ChemUnalloc",
            "RatioChem",
            "DailyUnalloc",
            "DayTotal",
            "RatioDaily",
        ],
        summary_rows,
    );

    // orphan diagnostics, two blocks: stranded cost, then sprinkle rates
    let categories = [
        &report.sand,
        &report.handling,
        &report.chemical,
        &report.daily,
    ];
    push_block(
        &mut grid,
        "Orphan Cost (basins with cost but no activity)",
        &["Category", "Basin", "Stranded Cost"],
        categories
            .iter()
            .flat_map(|d| {
                let category = d.category;
                d.orphans.iter().map(move |o| {
                    vec![
                        category.to_string(),
                        s(&o.basin),
                        money(o.stranded_cost),
                    ]
                })
            })
            .collect(),
    );
    push_block(
        &mut grid,
        "Orphan Sprinkle Rates",
        &["Category", "Orphan Pool", "Sprinkle Rate"],
        categories
            .iter()
            .map(|d| {
                vec![
                    d.category.to_string(),
                    money(d.orphan_pool),
                    ratio(d.sprinkle_rate),
                ]
            })
            .collect(),
    );

    // final ratios over the basin union
    push_block(
        &mut grid,
        "Final Ratios",
        &["Basin", "RatioSand", "RatioHandle", "RatioChem", "RatioDaily"],
        report
            .basins()
            .iter()
            .map(|b| {
                let r = |d: &CategoryDistribution| {
                    ratio(d.ratios.get(b).copied().unwrap_or(Decimal::ZERO))
                };
                vec![
                    s(b),
                    r(&report.sand),
                    r(&report.handling),
                    r(&report.chemical),
                    r(&report.daily),
                ]
            })
            .collect(),
    );

    // pad-level output
    push_block(
        &mut grid,
        "Pad Distribution",
        &[
            "Pad No",
            "LBRT BASIN",
            "Pad Start",
            "Pad End",
            "Prop TN",
            "Avg. Client Provided",
            "Chem Cost",
            "pad_days",
            "Unalloc_Sand",
            "Unalloc_Handle",
            "Unalloc_Chem",
            "Unalloc_Daily",
        ],
        report
            .pads
            .iter()
            .map(|p| {
                vec![
                    opt(&p.pad.pad_no),
                    opt(&p.pad.basin),
                    opt(&p.pad.pad_start),
                    opt(&p.pad.pad_end),
                    qty(p.pad.prop_tn),
                    qty(p.pad.client_factor),
                    money(p.pad.chem_cost),
                    qty(p.pad.pad_days),
                    money(p.unalloc_sand),
                    money(p.unalloc_handle),
                    money(p.unalloc_chem),
                    money(p.unalloc_daily),
                ]
            })
            .collect(),
    );

    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::ratio::{distribute_category, RatioPolicy};
    use crate::types::CostCategory;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn empty_dist(category: CostCategory) -> CategoryDistribution {
        let mut warnings = Vec::new();
        distribute_category(
            category,
            &BTreeMap::new(),
            &BTreeMap::new(),
            &RatioPolicy::default(),
            &mut warnings,
        )
    }

    fn sample_report() -> DistributionReport {
        let window = ReportWindow::new(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        )
        .unwrap();
        DistributionReport {
            window,
            summary: vec![SummaryRow {
                basin: "TX".into(),
                sand_unalloc: dec!(100),
                prop_total: dec!(50),
                ratio_sand: dec!(2),
                handle_unalloc: dec!(0),
                ratio_handle: dec!(0),
                chem_unalloc: dec!(0),
                ratio_chem: dec!(0),
                daily_unalloc: dec!(0),
                day_total: dec!(0),
                ratio_daily: dec!(0),
            }],
            totals: SummaryTotals {
                sand_unalloc: dec!(100),
                prop_total: dec!(50),
                ..Default::default()
            },
            sand: empty_dist(CostCategory::Sand),
            handling: empty_dist(CostCategory::Handling),
            chemical: empty_dist(CostCategory::Chemical),
            daily: empty_dist(CostCategory::Daily),
            pads: Vec::new(),
            sources: SourceSnapshot {
                cost_lines: Vec::new(),
                chem_costs: Vec::new(),
            },
        }
    }

    #[test]
    fn test_grid_has_titled_blocks_in_order() {
        let grid = render_grid(&sample_report());
        let titles: Vec<&str> = grid
            .iter()
            .filter(|row| row.len() == 1)
            .map(|row| row[0].as_str())
            .collect();
        assert!(titles[0].starts_with("Unalloc Distribution 2024-06-01"));
        let expected = [
            "Source: Unallocated Cost Lines",
            "Source: Chemical Cost by Pad",
            "Distribution Summary",
            "Orphan Cost (basins with cost but no activity)",
            "Orphan Sprinkle Rates",
            "Final Ratios",
            "Pad Distribution",
        ];
        for title in expected {
            assert!(titles.contains(&title), "missing block: {title}");
        }
    }

    #[test]
    fn test_summary_block_has_total_row() {
        let grid = render_grid(&sample_report());
        let total_row = grid
            .iter()
            .find(|row| row.first().map(String::as_str) == Some("TOTAL"))
            .expect("TOTAL row present");
        assert_eq!(total_row[1], "100.00");
        // ratio columns stay blank on the totals row
        assert_eq!(total_row[3], "");
    }

    #[test]
    fn test_currency_cells_have_two_decimals() {
        let grid = render_grid(&sample_report());
        let tx_row = grid
            .iter()
            .find(|row| row.first().map(String::as_str) == Some("TX"))
            .unwrap();
        assert_eq!(tx_row[1], "100.00");
    }
}
