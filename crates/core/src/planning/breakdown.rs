use crate::domain::destination::Destination;
use crate::domain::plan::BudgetBreakdown;
use crate::planning::catalog::DestinationCatalog;
use crate::planning::round_half_up;

/// Assumed round-trip travel cost per person when no direct route is known.
const MULTI_LEG_FARE: i64 = 3_000;
const STAY_SHARE: f64 = 0.35;
const MEALS_PER_DAY: i64 = 3;
const COMMUTE_DAY_SHARE: f64 = 0.6;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BreakdownRequest {
    pub destination: String,
    pub origin: String,
    pub days: u32,
    pub people: u32,
    pub budget: u32,
}

/// Looks the destination up and allocates the budget. `None` when the
/// destination is not in the catalog.
pub fn build_budget_breakdown<C>(catalog: &C, request: &BreakdownRequest) -> Option<BudgetBreakdown>
where
    C: DestinationCatalog + ?Sized,
{
    let destination = catalog.get_by_name(&request.destination)?;
    Some(compute_breakdown(&destination, request))
}

pub fn compute_breakdown(destination: &Destination, request: &BreakdownRequest) -> BudgetBreakdown {
    let days = i64::from(request.days.max(1));
    let people = i64::from(request.people.max(1));
    let budget = i64::from(request.budget);

    let cheapest = destination
        .reachability_from(&request.origin)
        .and_then(|route| route.cheapest_fare());
    let (travel, transport_note) = match cheapest {
        Some((mode, fare)) => (
            i64::from(fare) * 2 * people,
            format!("Cheapest: {} at ₹{fare}/person", mode.label()),
        ),
        None => (MULTI_LEG_FARE * people, "Multi-leg travel needed".to_string()),
    };

    let stay = round_half_up((budget - travel) as f64 * STAY_SHARE);
    let local = &destination.local_data;
    let food = i64::from(local.avg_meal_cost) * MEALS_PER_DAY * days * people;
    let commute_days = (days as f64 * COMMUTE_DAY_SHARE).ceil() as i64;
    let commute = i64::from(local.scooty_cost_per_day.min(local.taxi_cost_per_day)) * commute_days;

    let allocated = travel + stay + food + commute;
    let nights = (days - 1).max(1);

    BudgetBreakdown {
        travel,
        stay,
        food,
        commute,
        buffer: (budget - allocated).max(0),
        total: budget,
        max_stay_per_night: round_half_up(stay as f64 / nights as f64),
        within_budget: allocated <= budget,
        transport_note,
    }
}

#[cfg(test)]
mod tests {
    use super::{build_budget_breakdown, BreakdownRequest};
    use crate::planning::catalog::StaticCatalog;

    fn request(destination: &str, origin: &str, budget: u32) -> BreakdownRequest {
        BreakdownRequest {
            destination: destination.to_string(),
            origin: origin.to_string(),
            days: 5,
            people: 2,
            budget,
        }
    }

    #[test]
    fn manali_from_pune_fits_a_twenty_thousand_budget() {
        let catalog = StaticCatalog::bundled().expect("catalog");
        let breakdown =
            build_budget_breakdown(&catalog, &request("manali", "Pune", 20_000)).expect("known");

        assert_eq!(breakdown.travel, 7_200);
        assert_eq!(breakdown.stay, 4_480);
        assert_eq!(breakdown.food, 6_000);
        assert_eq!(breakdown.commute, 1_500);
        assert_eq!(breakdown.buffer, 820);
        assert_eq!(breakdown.total, 20_000);
        assert_eq!(breakdown.max_stay_per_night, 1_120);
        assert!(breakdown.within_budget);
        assert_eq!(breakdown.transport_note, "Cheapest: Train at ₹1800/person");
        assert_eq!(breakdown.allocated() + breakdown.buffer, breakdown.total);
    }

    #[test]
    fn unreachable_origin_assumes_multi_leg_fare() {
        let catalog = StaticCatalog::bundled().expect("catalog");
        let breakdown =
            build_budget_breakdown(&catalog, &request("Goa", "Surat", 30_000)).expect("known");

        assert_eq!(breakdown.travel, 6_000);
        assert_eq!(breakdown.transport_note, "Multi-leg travel needed");
    }

    #[test]
    fn overspent_plan_clamps_buffer_to_zero() {
        let catalog = StaticCatalog::bundled().expect("catalog");
        let breakdown =
            build_budget_breakdown(&catalog, &request("Goa", "Delhi", 5_000)).expect("known");

        assert!(!breakdown.within_budget);
        assert_eq!(breakdown.buffer, 0);
        assert!(breakdown.allocated() > breakdown.total);
    }

    #[test]
    fn unknown_destination_yields_none() {
        let catalog = StaticCatalog::bundled().expect("catalog");
        assert!(build_budget_breakdown(&catalog, &request("Atlantis", "Delhi", 20_000)).is_none());
    }
}
