//! Ratio engine: per-basin allocation ratios with orphan sprinkling.
//!
//! For each category, `ratio = numerator / denominator` per basin, with
//! an explicit zero-denominator guard. Basins that carry cost but have
//! no activity ("orphans") have their cost pooled and redistributed as a
//! flat rate added to every valid basin's ratio, per unit of the basin's
//! own denominator rather than proportionally per basin. One designated
//! basin (the Canadian-dollar basin) never receives redistributed cost.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::types::{CostCategory, Money, Ratio};

/// Default basin excluded from receiving sprinkled cost.
pub const DEFAULT_EXCLUDED_BASIN: &str = "CA";

/// Policy knobs for the ratio engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatioPolicy {
    /// Basin that never receives redistributed orphan cost. It keeps its
    /// own base ratio if it has activity.
    pub excluded_basin: String,
}

impl RatioPolicy {
    /// Case-insensitive match against the excluded basin, so a policy
    /// built from user input behaves the same as the default.
    pub fn excludes(&self, basin: &str) -> bool {
        basin.eq_ignore_ascii_case(&self.excluded_basin)
    }
}

impl Default for RatioPolicy {
    fn default() -> Self {
        RatioPolicy {
            excluded_basin: DEFAULT_EXCLUDED_BASIN.to_string(),
        }
    }
}

/// A basin with unallocated cost but zero activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrphanBasin {
    pub basin: String,
    pub stranded_cost: Money,
}

/// Result of distributing one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDistribution {
    pub category: CostCategory,
    /// Final per-basin ratio over the union of all basins seen.
    pub ratios: BTreeMap<String, Ratio>,
    /// Orphan basins detected for this category.
    pub orphans: Vec<OrphanBasin>,
    /// Total cost pooled from orphan basins.
    pub orphan_pool: Money,
    /// Flat rate added to every valid basin's ratio.
    pub sprinkle_rate: Ratio,
}

/// Distribute one category.
///
/// Numerator and denominator series are reindexed to the union of their
/// basins, missing entries filling with 0, so the two sides always align.
pub fn distribute_category(
    category: CostCategory,
    numerator: &BTreeMap<String, Money>,
    denominator: &BTreeMap<String, Decimal>,
    policy: &RatioPolicy,
    warnings: &mut Vec<String>,
) -> CategoryDistribution {
    let basins: BTreeSet<&String> = numerator.keys().chain(denominator.keys()).collect();

    let mut ratios: BTreeMap<String, Ratio> = BTreeMap::new();
    let mut orphans: Vec<OrphanBasin> = Vec::new();
    let mut orphan_pool = Decimal::ZERO;
    let mut valid_denom_sum = Decimal::ZERO;

    for basin in &basins {
        let numer = numerator.get(*basin).copied().unwrap_or(Decimal::ZERO);
        let denom = denominator.get(*basin).copied().unwrap_or(Decimal::ZERO);

        // base ratio with explicit divide-by-zero guard
        let base = if denom.is_zero() {
            Decimal::ZERO
        } else {
            numer / denom
        };
        ratios.insert((*basin).clone(), base);

        if denom.is_zero() && numer > Decimal::ZERO {
            orphan_pool += numer;
            orphans.push(OrphanBasin {
                basin: (*basin).clone(),
                stranded_cost: numer,
            });
        }
        if denom > Decimal::ZERO && !policy.excludes(basin.as_str()) {
            valid_denom_sum += denom;
        }
    }

    // Flat-rate sprinkle: the pool spreads per unit of valid denominator,
    // not proportionally per basin.
    let sprinkle_rate = if valid_denom_sum.is_zero() {
        Decimal::ZERO
    } else {
        orphan_pool / valid_denom_sum
    };

    if !orphan_pool.is_zero() && valid_denom_sum.is_zero() {
        // Known fallback: with no active basin to receive it, the pool
        // is dropped rather than invented elsewhere.
        warn!(%category, %orphan_pool, "orphan cost has no valid basin to receive it; dropped");
        warnings.push(format!(
            "{category}: {orphan_pool} of orphan cost could not be redistributed (no basin with activity) and was dropped"
        ));
    }

    if !sprinkle_rate.is_zero() {
        for basin in &basins {
            let denom = denominator.get(*basin).copied().unwrap_or(Decimal::ZERO);
            if denom > Decimal::ZERO && !policy.excludes(basin.as_str()) {
                if let Some(r) = ratios.get_mut(*basin) {
                    *r += sprinkle_rate;
                }
            }
        }
    }

    if !orphans.is_empty() {
        warnings.push(format!(
            "{category}: {} orphan basin(s) with cost but no activity: {}",
            orphans.len(),
            orphans
                .iter()
                .map(|o| o.basin.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }

    debug!(
        %category,
        basins = basins.len(),
        orphans = orphans.len(),
        %sprinkle_rate,
        "distributed category"
    );

    CategoryDistribution {
        category,
        ratios,
        orphans,
        orphan_pool,
        sprinkle_rate,
    }
}
