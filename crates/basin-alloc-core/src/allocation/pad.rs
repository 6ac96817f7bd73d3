//! Pad-level allocator: applies final basin ratios back onto each
//! activity record.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::allocation::ratio::CategoryDistribution;
use crate::types::{Money, PadActivity};

/// An activity record with its four allocated cost columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocatedPad {
    #[serde(flatten)]
    pub pad: PadActivity,
    pub unalloc_sand: Money,
    pub unalloc_handle: Money,
    pub unalloc_chem: Money,
    pub unalloc_daily: Money,
}

fn ratio_for(dist: &CategoryDistribution, basin: Option<&String>) -> Decimal {
    basin
        .and_then(|b| dist.ratios.get(b))
        .copied()
        .unwrap_or(Decimal::ZERO)
}

/// `allocated = driver × ratio(basin)` per category: tonnage for sand
/// and handling, chemical cost for chemical, active days for daily.
/// Pads whose basin has no ratio entry get 0 everywhere, never an error.
pub fn allocate_pads(
    pads: &[PadActivity],
    sand: &CategoryDistribution,
    handling: &CategoryDistribution,
    chemical: &CategoryDistribution,
    daily: &CategoryDistribution,
) -> Vec<AllocatedPad> {
    pads.iter()
        .map(|pad| {
            let basin = pad.basin.as_ref();
            AllocatedPad {
                unalloc_sand: pad.prop_tn * ratio_for(sand, basin),
                unalloc_handle: pad.prop_tn * ratio_for(handling, basin),
                unalloc_chem: pad.chem_cost * ratio_for(chemical, basin),
                unalloc_daily: pad.pad_days * ratio_for(daily, basin),
                pad: pad.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::ratio::{distribute_category, RatioPolicy};
    use crate::types::CostCategory;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn dist(category: CostCategory, ratios: &[(&str, Decimal)]) -> CategoryDistribution {
        // ratios fed through the engine with denominator 1 so the final
        // ratio equals the numerator
        let numer: BTreeMap<String, Decimal> =
            ratios.iter().map(|(b, v)| (b.to_string(), *v)).collect();
        let denom: BTreeMap<String, Decimal> = ratios
            .iter()
            .map(|(b, _)| (b.to_string(), dec!(1)))
            .collect();
        let mut warnings = Vec::new();
        distribute_category(category, &numer, &denom, &RatioPolicy::default(), &mut warnings)
    }

    fn pad(basin: Option<&str>, tn: Decimal, chem: Decimal, days: Decimal) -> PadActivity {
        PadActivity {
            pad_no: Some(1),
            basin: basin.map(String::from),
            pad_start: None,
            pad_end: None,
            prop_tn: tn,
            client_factor: dec!(1),
            chem_cost: chem,
            pad_days: days,
        }
    }

    #[test]
    fn test_drivers_per_category() {
        let sand = dist(CostCategory::Sand, &[("TX", dec!(2))]);
        let handling = dist(CostCategory::Handling, &[("TX", dec!(3))]);
        let chemical = dist(CostCategory::Chemical, &[("TX", dec!(0.5))]);
        let daily = dist(CostCategory::Daily, &[("TX", dec!(100))]);

        let pads = vec![pad(Some("TX"), dec!(10), dec!(40), dec!(7))];
        let out = allocate_pads(&pads, &sand, &handling, &chemical, &daily);

        assert_eq!(out[0].unalloc_sand, dec!(20)); // tn 10 * 2
        assert_eq!(out[0].unalloc_handle, dec!(30)); // tn 10 * 3
        assert_eq!(out[0].unalloc_chem, dec!(20)); // chem 40 * 0.5
        assert_eq!(out[0].unalloc_daily, dec!(700)); // days 7 * 100
    }

    #[test]
    fn test_unknown_basin_gets_zero() {
        let sand = dist(CostCategory::Sand, &[("TX", dec!(2))]);
        let handling = dist(CostCategory::Handling, &[("TX", dec!(2))]);
        let chemical = dist(CostCategory::Chemical, &[("TX", dec!(2))]);
        let daily = dist(CostCategory::Daily, &[("TX", dec!(2))]);

        let pads = vec![
            pad(Some("MYSTERY"), dec!(10), dec!(10), dec!(10)),
            pad(None, dec!(10), dec!(10), dec!(10)),
        ];
        let out = allocate_pads(&pads, &sand, &handling, &chemical, &daily);
        for p in &out {
            assert_eq!(p.unalloc_sand, dec!(0));
            assert_eq!(p.unalloc_handle, dec!(0));
            assert_eq!(p.unalloc_chem, dec!(0));
            assert_eq!(p.unalloc_daily, dec!(0));
        }
    }
}
