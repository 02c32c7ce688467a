use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Trip style shared by user preferences and destination records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripType {
    Beach,
    Mountains,
    Culture,
    Adventure,
    Mix,
}

impl TripType {
    pub const ALL: [TripType; 5] =
        [Self::Beach, Self::Mountains, Self::Culture, Self::Adventure, Self::Mix];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beach => "beach",
            Self::Mountains => "mountains",
            Self::Culture => "culture",
            Self::Adventure => "adventure",
            Self::Mix => "mix",
        }
    }
}

impl fmt::Display for TripType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TripType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| format!("unknown trip type `{value}`"))
    }
}

/// Slots the planner needs before it can validate a budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequiredSlot {
    Budget,
    Origin,
    TravelDates,
    PartySize,
}

impl RequiredSlot {
    pub fn label(self) -> &'static str {
        match self {
            Self::Budget => "budget",
            Self::Origin => "origin city",
            Self::TravelDates => "travel dates",
            Self::PartySize => "number of people",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedSlots {
    /// Total budget in INR.
    pub budget: Option<u32>,
    pub origin: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub trip_days: Option<u32>,
    pub party_size: Option<u8>,
    pub preference: Option<TripType>,
}

impl CollectedSlots {
    /// Budget, origin, start date and party size are all known.
    pub fn requirements_collected(&self) -> bool {
        self.budget.is_some()
            && self.origin.is_some()
            && self.start_date.is_some()
            && self.party_size.is_some()
    }

    pub fn missing_requirements(&self) -> Vec<RequiredSlot> {
        let mut missing = Vec::new();
        if self.budget.is_none() {
            missing.push(RequiredSlot::Budget);
        }
        if self.origin.is_none() {
            missing.push(RequiredSlot::Origin);
        }
        if self.start_date.is_none() || self.end_date.is_none() {
            missing.push(RequiredSlot::TravelDates);
        }
        if self.party_size.is_none() {
            missing.push(RequiredSlot::PartySize);
        }
        missing
    }

    /// Three-letter month of the trip start, `Feb` when no dates are known.
    pub fn travel_month(&self) -> String {
        self.start_date
            .map(|date| date.format("%b").to_string())
            .unwrap_or_else(|| "Feb".to_string())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{CollectedSlots, RequiredSlot, TripType};

    #[test]
    fn trip_type_parses_case_insensitively() {
        assert_eq!("Mountains".parse::<TripType>(), Ok(TripType::Mountains));
        assert_eq!(" mix ".parse::<TripType>(), Ok(TripType::Mix));
        assert!("luxury".parse::<TripType>().is_err());
    }

    #[test]
    fn missing_requirements_lists_unset_slots_in_order() {
        let slots = CollectedSlots {
            origin: Some("Pune".to_string()),
            ..CollectedSlots::default()
        };
        assert_eq!(
            slots.missing_requirements(),
            vec![RequiredSlot::Budget, RequiredSlot::TravelDates, RequiredSlot::PartySize]
        );
        assert!(!slots.requirements_collected());
    }

    #[test]
    fn travel_month_defaults_to_february() {
        let mut slots = CollectedSlots::default();
        assert_eq!(slots.travel_month(), "Feb");

        slots.start_date = NaiveDate::from_ymd_opt(2026, 10, 3);
        assert_eq!(slots.travel_month(), "Oct");
    }
}
