//! Deterministic trip calculators: affordability, catalog queries, budget
//! allocation and booking links.

pub mod breakdown;
pub mod budget;
pub mod catalog;
pub mod links;

pub use breakdown::{build_budget_breakdown, compute_breakdown, BreakdownRequest};
pub use budget::{tier_for_daily_spend, validate_budget};
pub use catalog::{
    daily_cost_ceiling, CatalogError, DestinationCatalog, DestinationFilter, StaticCatalog,
};
pub use links::{booking_links, local_links, travel_links, HotelSearch};

/// Rounds halves towards positive infinity.
pub(crate) fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

#[cfg(test)]
mod tests {
    use super::round_half_up;

    #[test]
    fn halves_round_up_including_negatives() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(2.4999), 2);
        assert_eq!(round_half_up(-2.5), -2);
    }
}
