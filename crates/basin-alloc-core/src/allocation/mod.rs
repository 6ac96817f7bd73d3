//! The allocation core: numerator/denominator aggregation, the ratio
//! engine with orphan sprinkling, and the pad-level allocator.

pub mod denominator;
pub mod numerator;
pub mod pad;
pub mod ratio;

pub use denominator::{aggregate_activity, prepare_pads, ActivityTotals};
pub use numerator::{aggregate_unallocated, UnallocTotals};
pub use pad::{allocate_pads, AllocatedPad};
pub use ratio::{
    distribute_category, CategoryDistribution, OrphanBasin, RatioPolicy, DEFAULT_EXCLUDED_BASIN,
};
