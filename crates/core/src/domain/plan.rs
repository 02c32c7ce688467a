use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Affordability bracket derived from spend per person per day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetTier {
    Comfortable,
    Moderate,
    Budget,
    VeryTight,
    Impossible,
}

impl BudgetTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Comfortable => "comfortable",
            Self::Moderate => "moderate",
            Self::Budget => "budget",
            Self::VeryTight => "very_tight",
            Self::Impossible => "impossible",
        }
    }

    pub fn is_feasible(self) -> bool {
        self != Self::Impossible
    }
}

impl fmt::Display for BudgetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BudgetTier {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "comfortable" => Ok(Self::Comfortable),
            "moderate" => Ok(Self::Moderate),
            "budget" => Ok(Self::Budget),
            "very_tight" | "very-tight" => Ok(Self::VeryTight),
            "impossible" => Ok(Self::Impossible),
            other => Err(format!("unknown budget tier `{other}`")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetValidation {
    pub feasible: bool,
    pub budget_tier: BudgetTier,
    pub per_person_per_day: i64,
    pub total_per_person: i64,
    pub analysis: String,
}

/// Allocation of a fixed total budget for one destination, in INR.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetBreakdown {
    pub travel: i64,
    pub stay: i64,
    pub food: i64,
    pub commute: i64,
    pub buffer: i64,
    pub total: i64,
    pub max_stay_per_night: i64,
    pub within_budget: bool,
    pub transport_note: String,
}

impl BudgetBreakdown {
    /// Travel, stay, food and commute, excluding the buffer.
    pub fn allocated(&self) -> i64 {
        self.travel + self.stay + self.food + self.commute
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingLinks {
    pub booking_com: String,
    pub goibibo: String,
    pub make_my_trip: String,
    pub hostelworld: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelLinks {
    pub red_bus: String,
    pub irctc: String,
    pub google_flights: String,
    pub ixigo: String,
    pub make_my_trip_bus: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalLinks {
    pub food: String,
    pub scooty_rental: String,
    pub sightseeing: String,
    pub cafes: String,
    pub atm: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLinks {
    pub booking: BookingLinks,
    pub travel: TravelLinks,
    pub local: LocalLinks,
}
