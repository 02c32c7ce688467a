use serde::{Deserialize, Serialize};

use crate::domain::slots::TripType;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TripType,
    pub state: String,
    /// Average spend per person per day in INR.
    pub avg_daily_cost: u32,
    /// Three-letter month names, e.g. `Feb`.
    pub best_seasons: Vec<String>,
    pub reachable_from: Vec<Reachability>,
    pub highlights: Vec<String>,
    pub description: String,
    pub local_data: LocalData,
}

impl Destination {
    pub fn reachability_from(&self, origin: &str) -> Option<&Reachability> {
        self.reachable_from.iter().find(|entry| entry.city.eq_ignore_ascii_case(origin.trim()))
    }

    pub fn in_season(&self, month: &str) -> bool {
        self.best_seasons.iter().any(|season| season.eq_ignore_ascii_case(month.trim()))
    }
}

/// One-way fares and durations from an origin city.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reachability {
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bus_avg: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub train_avg: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight_avg: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bus_duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub train_duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight_duration: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TravelMode {
    Bus,
    Train,
    Flight,
}

impl TravelMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Bus => "Bus",
            Self::Train => "Train",
            Self::Flight => "Flight",
        }
    }
}

impl Reachability {
    /// Cheapest non-zero one-way fare. Ties keep bus, then train.
    pub fn cheapest_fare(&self) -> Option<(TravelMode, u32)> {
        [
            (TravelMode::Bus, self.bus_avg),
            (TravelMode::Train, self.train_avg),
            (TravelMode::Flight, self.flight_avg),
        ]
        .into_iter()
        .filter_map(|(mode, fare)| fare.filter(|value| *value > 0).map(|value| (mode, value)))
        .fold(None, |best: Option<(TravelMode, u32)>, candidate| match best {
            Some(current) if current.1 <= candidate.1 => Some(current),
            _ => Some(candidate),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalData {
    pub scooty_cost_per_day: u32,
    pub taxi_cost_per_day: u32,
    pub avg_meal_cost: u32,
    #[serde(default)]
    pub top_restaurants: Vec<Restaurant>,
    #[serde(default)]
    pub sightseeing: Vec<Sightseeing>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub name: String,
    pub cuisine: String,
    pub avg_cost: u32,
    pub rating: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sightseeing {
    pub name: String,
    pub entry_cost: u32,
    pub time_needed: String,
    pub description: String,
}

/// How a destination is reached from the requested origin.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TravelFromOrigin {
    MultiLeg { city: String, note: String },
    Direct(Reachability),
}

/// Catalog query result as shown on destination cards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TripType,
    pub state: String,
    pub avg_daily_cost: u32,
    pub highlights: Vec<String>,
    pub description: String,
    pub travel_from_origin: TravelFromOrigin,
    pub reachable: bool,
}

impl DestinationSummary {
    pub fn for_origin(destination: &Destination, origin: &str) -> Self {
        let (travel_from_origin, reachable) = match destination.reachability_from(origin) {
            Some(entry) => (TravelFromOrigin::Direct(entry.clone()), true),
            None => (
                TravelFromOrigin::MultiLeg {
                    city: origin.to_string(),
                    note: "Multi-leg travel needed".to_string(),
                },
                false,
            ),
        };

        Self {
            name: destination.name.clone(),
            kind: destination.kind,
            state: destination.state.clone(),
            avg_daily_cost: destination.avg_daily_cost,
            highlights: destination.highlights.clone(),
            description: destination.description.clone(),
            travel_from_origin,
            reachable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Reachability, TravelFromOrigin, TravelMode};

    fn route(bus: Option<u32>, train: Option<u32>, flight: Option<u32>) -> Reachability {
        Reachability {
            city: "Delhi".to_string(),
            bus_avg: bus,
            train_avg: train,
            flight_avg: flight,
            bus_duration: None,
            train_duration: None,
            flight_duration: None,
        }
    }

    #[test]
    fn cheapest_fare_ignores_missing_and_zero_fares() {
        assert_eq!(
            route(Some(0), Some(900), Some(4500)).cheapest_fare(),
            Some((TravelMode::Train, 900))
        );
        assert_eq!(route(None, None, Some(4200)).cheapest_fare(), Some((TravelMode::Flight, 4200)));
        assert_eq!(route(None, None, None).cheapest_fare(), None);
    }

    #[test]
    fn multi_leg_placeholder_survives_json_round_trip() {
        let placeholder = TravelFromOrigin::MultiLeg {
            city: "Surat".to_string(),
            note: "Multi-leg travel needed".to_string(),
        };
        let json = serde_json::to_string(&placeholder).expect("serialize");
        let decoded: TravelFromOrigin = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(decoded, placeholder);

        let direct: TravelFromOrigin =
            serde_json::from_str(r#"{"city":"Delhi","busAvg":1200}"#).expect("deserialize");
        assert!(matches!(direct, TravelFromOrigin::Direct(entry) if entry.bus_avg == Some(1200)));
    }
}
