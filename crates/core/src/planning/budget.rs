use crate::domain::plan::{BudgetTier, BudgetValidation};
use crate::planning::round_half_up;

const COMFORTABLE_FLOOR: f64 = 3_000.0;
const MODERATE_FLOOR: f64 = 2_000.0;
const BUDGET_FLOOR: f64 = 1_200.0;
const VERY_TIGHT_FLOOR: f64 = 800.0;

pub fn tier_for_daily_spend(per_person_per_day: f64) -> BudgetTier {
    if per_person_per_day >= COMFORTABLE_FLOOR {
        BudgetTier::Comfortable
    } else if per_person_per_day >= MODERATE_FLOOR {
        BudgetTier::Moderate
    } else if per_person_per_day >= BUDGET_FLOOR {
        BudgetTier::Budget
    } else if per_person_per_day >= VERY_TIGHT_FLOOR {
        BudgetTier::VeryTight
    } else {
        BudgetTier::Impossible
    }
}

/// Classifies a total budget by what it leaves per person per day.
///
/// Zero days or people are treated as one so the result stays finite.
pub fn validate_budget(budget: u32, days: u32, people: u32) -> BudgetValidation {
    let days = days.max(1);
    let people = people.max(1);
    let per_person_per_day = f64::from(budget) / (f64::from(people) * f64::from(days));
    let tier = tier_for_daily_spend(per_person_per_day);
    let daily = round_half_up(per_person_per_day);

    let analysis = if tier.is_feasible() {
        format!(
            "₹{budget} for {people} person(s) over {days} days gives ₹{daily}/person/day: {} tier travel.",
            tier.as_str()
        )
    } else {
        format!(
            "₹{budget} for {people} people over {days} days is ₹{daily}/person/day, not feasible for most trips."
        )
    };

    BudgetValidation {
        feasible: tier.is_feasible(),
        budget_tier: tier,
        per_person_per_day: daily,
        total_per_person: round_half_up(f64::from(budget) / f64::from(people)),
        analysis,
    }
}
