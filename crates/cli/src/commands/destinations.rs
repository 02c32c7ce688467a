use chrono::Utc;
use tripgenie_core::config::LoadOptions;
use tripgenie_core::domain::plan::BudgetTier;
use tripgenie_core::domain::slots::TripType;
use tripgenie_core::planning::{DestinationCatalog, DestinationFilter, StaticCatalog};

use crate::commands::{load_config, CommandResult};

const MONTHS: [&str; 12] =
    ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"];

#[derive(Clone, Debug, Default)]
pub struct DestinationQuery {
    pub origin: String,
    pub month: Option<String>,
    pub tier: Option<String>,
    pub preference: Option<String>,
    pub multi_leg: bool,
}

/// Prints the matching destinations, cheapest first, as a JSON array.
pub fn run(options: &LoadOptions, query: DestinationQuery) -> CommandResult {
    let config = match load_config("destinations", options) {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let filter = match build_filter(&query) {
        Ok(filter) => filter,
        Err(message) => {
            return CommandResult::failure("destinations", "invalid_argument", message, 2)
        }
    };

    let catalog = match &config.agent.catalog_path {
        Some(path) => StaticCatalog::from_path(path),
        None => StaticCatalog::bundled(),
    };
    let catalog = match catalog {
        Ok(catalog) => catalog,
        Err(error) => {
            return CommandResult::failure("destinations", "catalog_load", error.to_string(), 4)
        }
    };

    match serde_json::to_string_pretty(&catalog.query(&filter)) {
        Ok(output) => CommandResult { exit_code: 0, output },
        Err(error) => {
            CommandResult::failure("destinations", "serialization", error.to_string(), 5)
        }
    }
}

fn build_filter(query: &DestinationQuery) -> Result<DestinationFilter, String> {
    let origin = query.origin.trim();
    if origin.is_empty() {
        return Err("--origin must not be empty".to_string());
    }

    let month = match query.month.as_deref() {
        Some(month) => normalize_month(month)?,
        None => Utc::now().format("%b").to_string(),
    };
    let tier = query.tier.as_deref().map(str::parse::<BudgetTier>).transpose()?;
    let preference = query.preference.as_deref().map(str::parse::<TripType>).transpose()?;

    Ok(DestinationFilter::new(origin, month)
        .with_tier(tier)
        .with_preference(preference)
        .with_multi_leg(query.multi_leg))
}

/// `february` and `FEB` both become `Feb`.
fn normalize_month(month: &str) -> Result<String, String> {
    let prefix = month.trim().chars().take(3).collect::<String>().to_ascii_lowercase();
    MONTHS
        .into_iter()
        .find(|candidate| candidate.to_ascii_lowercase() == prefix)
        .map(str::to_string)
        .ok_or_else(|| format!("unknown month `{month}`"))
}

#[cfg(test)]
mod tests {
    use tripgenie_core::domain::plan::BudgetTier;
    use tripgenie_core::domain::slots::TripType;

    use super::{build_filter, normalize_month, DestinationQuery};

    #[test]
    fn months_are_normalized_to_three_letters() {
        assert_eq!(normalize_month("february").as_deref(), Ok("Feb"));
        assert_eq!(normalize_month(" DEC ").as_deref(), Ok("Dec"));
        assert!(normalize_month("Smarch").is_err());
    }

    #[test]
    fn filter_parses_tier_and_preference() {
        let filter = build_filter(&DestinationQuery {
            origin: "Pune".to_string(),
            month: Some("feb".to_string()),
            tier: Some("very-tight".to_string()),
            preference: Some("Mountains".to_string()),
            multi_leg: true,
        })
        .expect("valid query");

        assert_eq!(filter.month, "Feb");
        assert_eq!(filter.tier, Some(BudgetTier::VeryTight));
        assert_eq!(filter.preference, Some(TripType::Mountains));
        assert!(filter.include_multi_leg);
    }

    #[test]
    fn bad_arguments_are_reported() {
        let base = DestinationQuery { origin: "Pune".to_string(), ..DestinationQuery::default() };

        let blank = DestinationQuery { origin: " ".to_string(), ..base.clone() };
        assert!(build_filter(&blank).is_err());
        let error = build_filter(&DestinationQuery { tier: Some("lavish".to_string()), ..base })
            .expect_err("unknown tier");
        assert_eq!(error, "unknown budget tier `lavish`");
    }
}
