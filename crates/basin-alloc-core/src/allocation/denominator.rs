//! Denominator side: basin-level activity totals for the report window.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::debug;

use crate::types::{ActivityRecord, ChemCostRow, Money, PadActivity, ReportWindow};

/// Per-basin activity totals, one series per driver.
#[derive(Debug, Clone, Default)]
pub struct ActivityTotals {
    /// Σ tonnage × client factor. The client-factor weighting is a
    /// deliberate business rule, not a convenience.
    pub prop_weighted: BTreeMap<String, Decimal>,
    /// Σ active pad-days inside the report window.
    pub pad_days: BTreeMap<String, Decimal>,
    /// Σ chemical cost from the Current sheet.
    pub chemical: BTreeMap<String, Money>,
}

/// Join chemical cost and clamp activity into the report window.
///
/// Every record comes back as a `PadActivity`, including records without
/// a basin (they still appear in the pad-level output, they just never
/// contribute to basin totals). Chemical lookup misses and date
/// fallbacks become warnings, never errors.
pub fn prepare_pads(
    records: &[ActivityRecord],
    chem_costs: &[ChemCostRow],
    window: &ReportWindow,
    warnings: &mut Vec<String>,
) -> Vec<PadActivity> {
    let chem_by_pad: BTreeMap<i64, Money> = chem_costs
        .iter()
        .filter_map(|row| row.pad_no.map(|pad| (pad, row.chem_cost)))
        .fold(BTreeMap::new(), |mut acc, (pad, cost)| {
            *acc.entry(pad).or_insert(Decimal::ZERO) += cost;
            acc
        });

    let mut chem_misses = 0usize;
    let mut date_fallbacks = 0usize;

    let pads: Vec<PadActivity> = records
        .iter()
        .map(|rec| {
            if rec.pad_start.is_none() || rec.pad_end.is_none() {
                date_fallbacks += 1;
            }
            let chem_cost = match rec.pad_no.and_then(|pad| chem_by_pad.get(&pad)) {
                Some(cost) => *cost,
                None => {
                    chem_misses += 1;
                    Decimal::ZERO
                }
            };
            PadActivity {
                pad_no: rec.pad_no,
                basin: rec.basin.clone(),
                pad_start: rec.pad_start,
                pad_end: rec.pad_end,
                prop_tn: rec.prop_tn,
                client_factor: rec.client_factor,
                chem_cost,
                pad_days: Decimal::from(window.overlap_days(rec.pad_start, rec.pad_end)),
            }
        })
        .collect();

    if chem_misses > 0 {
        warnings.push(format!(
            "{chem_misses} activity record(s) had no chemical-cost match by pad number (treated as 0)"
        ));
    }
    if date_fallbacks > 0 {
        warnings.push(format!(
            "{date_fallbacks} activity record(s) had missing dates; missing bounds default to the report window"
        ));
    }
    pads
}

/// Sum activity per basin. Records without a basin are excluded from all
/// totals.
pub fn aggregate_activity(pads: &[PadActivity], chem_costs: &[ChemCostRow]) -> ActivityTotals {
    let mut totals = ActivityTotals::default();

    for pad in pads {
        let Some(basin) = &pad.basin else { continue };
        *totals
            .prop_weighted
            .entry(basin.clone())
            .or_insert(Decimal::ZERO) += pad.prop_tn * pad.client_factor;
        *totals
            .pad_days
            .entry(basin.clone())
            .or_insert(Decimal::ZERO) += pad.pad_days;
    }

    for row in chem_costs {
        if let Some(basin) = &row.basin {
            *totals
                .chemical
                .entry(basin.clone())
                .or_insert(Decimal::ZERO) += row.chem_cost;
        }
    }

    debug!(
        basins = totals.prop_weighted.len(),
        "aggregated basin activity"
    );
    totals
}
