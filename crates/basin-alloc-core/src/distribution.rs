//! One monthly distribution run, end to end: read sources, aggregate
//! both sides, compute ratios, allocate pads, assemble the report.
//!
//! The run is a pure transform of (workbook, window): nothing is written
//! until the whole report exists in memory, and running it twice on the
//! same inputs produces identical output.

use std::time::Instant;

use rust_decimal::Decimal;
use tracing::info;

use crate::allocation::{
    aggregate_activity, aggregate_unallocated, allocate_pads, distribute_category, RatioPolicy,
};
use crate::reader::load_sources;
use crate::report::{render_grid, DistributionReport, SourceSnapshot, SummaryRow, SummaryTotals};
use crate::types::{with_metadata, CostCategory, ReportWindow, RunOutput};
use crate::workbook::Workbook;
use crate::AllocResult;

/// Name of the output sheet, replaced in place on every run.
pub const DISTRIBUTION_SHEET: &str = "Unalloc_Distribution";

const METHODOLOGY: &str = "Unallocated cost per basin divided by basin activity \
    (weighted tonnage, pad-days, chemical spend); orphan cost sprinkled at a flat \
    rate per unit of valid basin denominator, CA excluded from receiving";

/// Compute the distribution for one report window.
pub fn run_distribution(
    wb: &Workbook,
    window: &ReportWindow,
    policy: &RatioPolicy,
) -> AllocResult<RunOutput<DistributionReport>> {
    let started = Instant::now();
    let mut warnings = Vec::new();

    info!(workbook = %wb.path().display(), start = %window.start, end = %window.end, "starting distribution run");

    let sources = load_sources(wb, &mut warnings)?;

    let numerators = aggregate_unallocated(&sources.cost_lines, &sources.chem_costs);
    let pads = crate::allocation::prepare_pads(
        &sources.activity,
        &sources.chem_costs,
        window,
        &mut warnings,
    );
    let denominators = aggregate_activity(&pads, &sources.chem_costs);

    let sand = distribute_category(
        CostCategory::Sand,
        &numerators.sand,
        &denominators.prop_weighted,
        policy,
        &mut warnings,
    );
    let handling = distribute_category(
        CostCategory::Handling,
        &numerators.handling,
        &denominators.prop_weighted,
        policy,
        &mut warnings,
    );
    let chemical = distribute_category(
        CostCategory::Chemical,
        &numerators.chemical,
        &denominators.chemical,
        policy,
        &mut warnings,
    );
    let daily = distribute_category(
        CostCategory::Daily,
        &numerators.daily,
        &denominators.pad_days,
        policy,
        &mut warnings,
    );

    let allocated = allocate_pads(&pads, &sand, &handling, &chemical, &daily);

    // combined summary over the basin union
    let mut summary = Vec::new();
    let mut totals = SummaryTotals::default();
    let mut basins: Vec<&String> = sand
        .ratios
        .keys()
        .chain(handling.ratios.keys())
        .chain(chemical.ratios.keys())
        .chain(daily.ratios.keys())
        .collect();
    basins.sort();
    basins.dedup();

    let get = |m: &std::collections::BTreeMap<String, Decimal>, b: &String| {
        m.get(b).copied().unwrap_or(Decimal::ZERO)
    };
    for basin in basins {
        let row = SummaryRow {
            basin: basin.clone(),
            sand_unalloc: get(&numerators.sand, basin),
            prop_total: get(&denominators.prop_weighted, basin),
            ratio_sand: get(&sand.ratios, basin),
            handle_unalloc: get(&numerators.handling, basin),
            ratio_handle: get(&handling.ratios, basin),
            chem_unalloc: get(&numerators.chemical, basin),
            ratio_chem: get(&chemical.ratios, basin),
            daily_unalloc: get(&numerators.daily, basin),
            day_total: get(&denominators.pad_days, basin),
            ratio_daily: get(&daily.ratios, basin),
        };
        totals.sand_unalloc += row.sand_unalloc;
        totals.prop_total += row.prop_total;
        totals.handle_unalloc += row.handle_unalloc;
        totals.chem_unalloc += row.chem_unalloc;
        totals.daily_unalloc += row.daily_unalloc;
        totals.day_total += row.day_total;
        summary.push(row);
    }

    let report = DistributionReport {
        window: *window,
        summary,
        totals,
        sand,
        handling,
        chemical,
        daily,
        pads: allocated,
        sources: SourceSnapshot {
            cost_lines: sources.cost_lines,
            chem_costs: sources.chem_costs,
        },
    };

    let elapsed_us = started.elapsed().as_micros() as u64;
    info!(
        basins = report.summary.len(),
        pads = report.pads.len(),
        warnings = warnings.len(),
        elapsed_us,
        "distribution run complete"
    );
    Ok(with_metadata(METHODOLOGY, warnings, elapsed_us, report))
}

/// Write (replace) the distribution sheet in the workbook.
pub fn write_distribution_sheet(
    wb: &Workbook,
    report: &DistributionReport,
    sheet_name: &str,
) -> AllocResult<()> {
    let grid = render_grid(report);
    wb.write_grid(sheet_name, &grid)
}
