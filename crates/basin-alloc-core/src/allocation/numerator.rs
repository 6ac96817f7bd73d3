//! Numerator side: basin-level sums of cost that is not yet assigned to
//! a project.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::debug;

use crate::types::{ChemCostRow, CostLineItem, Money};

/// Per-basin unallocated cost, one series per allocation category.
/// `BTreeMap` keys keep every downstream table in deterministic order.
#[derive(Debug, Clone, Default)]
pub struct UnallocTotals {
    pub sand: BTreeMap<String, Money>,
    pub handling: BTreeMap<String, Money>,
    pub daily: BTreeMap<String, Money>,
    pub chemical: BTreeMap<String, Money>,
}

fn add(map: &mut BTreeMap<String, Money>, basin: &str, amount: Money) {
    *map.entry(basin.to_string()).or_insert(Decimal::ZERO) += amount;
}

/// Sum unallocated cost lines per basin.
///
/// Only lines without a strict six-digit project number participate. The
/// four daily cost columns (fuel, materials, other-pad, VM allocation)
/// collapse into one "daily" series; sand and handling stay distinct.
/// The chemical series comes from the Current sheet's per-basin sums, as
/// the source reports chemical spend there rather than on the
/// unallocated-cost sheet.
pub fn aggregate_unallocated(
    cost_lines: &[CostLineItem],
    chem_costs: &[ChemCostRow],
) -> UnallocTotals {
    let mut totals = UnallocTotals::default();

    for line in cost_lines {
        if !line.is_unallocated() {
            continue;
        }
        add(&mut totals.sand, &line.basin, line.prop_cost);
        add(&mut totals.handling, &line.basin, line.truck_cost);
        add(&mut totals.daily, &line.basin, line.daily_cost());
    }

    for row in chem_costs {
        if let Some(basin) = &row.basin {
            add(&mut totals.chemical, basin, row.chem_cost);
        }
    }

    debug!(
        sand_basins = totals.sand.len(),
        chem_basins = totals.chemical.len(),
        "aggregated unallocated cost"
    );
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn line(basin: &str, project: &str, prop: Money, truck: Money, fuel: Money) -> CostLineItem {
        CostLineItem {
            basin: basin.into(),
            project_number: project.into(),
            prop_cost: prop,
            truck_cost: truck,
            fuel_cost: fuel,
            mat_cost: dec!(0),
            other_pad_cost: dec!(0),
            alloc_vm_cost: dec!(0),
        }
    }

    #[test]
    fn test_six_digit_projects_excluded() {
        let lines = vec![
            line("TX", "123456", dec!(100), dec!(0), dec!(0)),
            line("TX", "", dec!(40), dec!(0), dec!(0)),
            line("TX", "12345", dec!(10), dec!(0), dec!(0)),
            line("TX", "ABC", dec!(5), dec!(0), dec!(0)),
        ];
        let totals = aggregate_unallocated(&lines, &[]);
        assert_eq!(totals.sand["TX"], dec!(55));
    }

    #[test]
    fn test_daily_columns_pool_into_one_series() {
        let mut l = line("ND", "", dec!(0), dec!(0), dec!(10));
        l.mat_cost = dec!(20);
        l.other_pad_cost = dec!(30);
        l.alloc_vm_cost = dec!(40);
        let totals = aggregate_unallocated(&[l], &[]);
        assert_eq!(totals.daily["ND"], dec!(100));
        assert_eq!(totals.sand["ND"], dec!(0));
    }

    #[test]
    fn test_chemical_series_from_current_rows() {
        let chem = vec![
            ChemCostRow {
                basin: Some("TX".into()),
                pad_no: Some(1),
                chem_cost: dec!(300),
            },
            ChemCostRow {
                basin: Some("TX".into()),
                pad_no: Some(2),
                chem_cost: dec!(200),
            },
            ChemCostRow {
                basin: None,
                pad_no: Some(3),
                chem_cost: dec!(999),
            },
        ];
        let totals = aggregate_unallocated(&[], &chem);
        assert_eq!(totals.chemical["TX"], dec!(500));
        assert_eq!(totals.chemical.len(), 1);
    }

    #[test]
    fn test_multiple_basins_grouped() {
        let lines = vec![
            line("TX", "", dec!(1), dec!(2), dec!(0)),
            line("ND", "", dec!(3), dec!(4), dec!(0)),
            line("TX", "x", dec!(5), dec!(6), dec!(0)),
        ];
        let totals = aggregate_unallocated(&lines, &[]);
        assert_eq!(totals.sand["TX"], dec!(6));
        assert_eq!(totals.handling["ND"], dec!(4));
    }
}
