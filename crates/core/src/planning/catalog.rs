use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::destination::{Destination, DestinationSummary};
use crate::domain::plan::BudgetTier;
use crate::domain::slots::TripType;

const BUNDLED_DESTINATIONS: &str = include_str!("../../data/destinations.json");
const DEFAULT_DAILY_CEILING: u32 = 2_200;

/// Read-only access to destination records.
pub trait DestinationCatalog: Send + Sync {
    /// Matching destinations for `filter`, cheapest first.
    fn query(&self, filter: &DestinationFilter) -> Vec<DestinationSummary>;

    /// Case-insensitive lookup.
    fn get_by_name(&self, name: &str) -> Option<Destination>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DestinationFilter {
    pub origin: String,
    pub month: String,
    pub tier: Option<BudgetTier>,
    pub preference: Option<TripType>,
    pub include_multi_leg: bool,
}

impl DestinationFilter {
    pub fn new(origin: impl Into<String>, month: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            month: month.into(),
            tier: None,
            preference: None,
            include_multi_leg: false,
        }
    }

    pub fn with_tier(mut self, tier: Option<BudgetTier>) -> Self {
        self.tier = tier;
        self
    }

    pub fn with_preference(mut self, preference: Option<TripType>) -> Self {
        self.preference = preference;
        self
    }

    pub fn with_multi_leg(mut self, include: bool) -> Self {
        self.include_multi_leg = include;
        self
    }

    fn matches_preference(&self, kind: TripType) -> bool {
        match self.preference {
            None | Some(TripType::Mix) => true,
            Some(preference) => preference == kind,
        }
    }
}

/// Highest average daily cost allowed for a tier. `None` means no ceiling.
pub fn daily_cost_ceiling(tier: Option<BudgetTier>) -> Option<u32> {
    match tier {
        Some(BudgetTier::VeryTight) => Some(1_600),
        Some(BudgetTier::Budget) => Some(2_200),
        Some(BudgetTier::Moderate) => Some(3_000),
        Some(BudgetTier::Comfortable) => None,
        Some(BudgetTier::Impossible) | None => Some(DEFAULT_DAILY_CEILING),
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read destination catalog {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse destination catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("destination catalog is empty")]
    Empty,
}

/// Catalog backed by an in-memory list of records.
#[derive(Clone, Debug)]
pub struct StaticCatalog {
    destinations: Vec<Destination>,
}

impl StaticCatalog {
    pub fn new(destinations: Vec<Destination>) -> Self {
        Self { destinations }
    }

    /// The dataset compiled into the crate.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json(BUNDLED_DESTINATIONS)
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let destinations: Vec<Destination> = serde_json::from_str(raw)?;
        if destinations.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self::new(destinations))
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|source| CatalogError::ReadFile { path: path.to_path_buf(), source })?;
        Self::from_json(&raw)
    }

    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }

    pub fn destinations(&self) -> &[Destination] {
        &self.destinations
    }
}

impl DestinationCatalog for StaticCatalog {
    fn query(&self, filter: &DestinationFilter) -> Vec<DestinationSummary> {
        let ceiling = daily_cost_ceiling(filter.tier);
        let mut matches: Vec<&Destination> = self
            .destinations
            .iter()
            .filter(|destination| destination.in_season(&filter.month))
            .filter(|destination| ceiling.map_or(true, |max| destination.avg_daily_cost <= max))
            .filter(|destination| filter.matches_preference(destination.kind))
            .collect();
        matches.sort_by_key(|destination| destination.avg_daily_cost);

        matches
            .into_iter()
            .map(|destination| DestinationSummary::for_origin(destination, &filter.origin))
            .filter(|summary| summary.reachable || filter.include_multi_leg)
            .collect()
    }

    fn get_by_name(&self, name: &str) -> Option<Destination> {
        let name = name.trim();
        self.destinations
            .iter()
            .find(|destination| destination.name.eq_ignore_ascii_case(name))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::{daily_cost_ceiling, CatalogError, DestinationCatalog, DestinationFilter, StaticCatalog};
    use crate::domain::destination::TravelFromOrigin;
    use crate::domain::plan::BudgetTier;
    use crate::domain::slots::TripType;

    fn catalog() -> StaticCatalog {
        StaticCatalog::bundled().expect("bundled catalog parses")
    }

    #[test]
    fn bundled_catalog_is_not_empty_and_resolves_names_case_insensitively() {
        let catalog = catalog();
        assert!(catalog.len() >= 20);
        let manali = catalog.get_by_name("  mAnAlI ").expect("manali present");
        assert_eq!(manali.name, "Manali");
        assert!(catalog.get_by_name("Atlantis").is_none());
    }

    #[test]
    fn query_filters_by_season_tier_preference_and_reachability() {
        let filter = DestinationFilter::new("Pune", "Feb")
            .with_tier(Some(BudgetTier::Moderate))
            .with_preference(Some(TripType::Mountains));

        let results = catalog().query(&filter);

        assert!(!results.is_empty());
        assert!(results.iter().any(|summary| summary.name == "Manali"));
        for summary in &results {
            assert_eq!(summary.kind, TripType::Mountains);
            assert!(summary.avg_daily_cost <= 3_000);
            assert!(summary.reachable);
            assert!(matches!(
                &summary.travel_from_origin,
                TravelFromOrigin::Direct(entry) if entry.city == "Pune"
            ));
        }
        assert!(results.windows(2).all(|pair| pair[0].avg_daily_cost <= pair[1].avg_daily_cost));
    }

    #[test]
    fn multi_leg_results_are_opt_in() {
        let catalog = catalog();
        let reachable_only = catalog.query(&DestinationFilter::new("Surat", "Feb"));
        let with_multi_leg =
            catalog.query(&DestinationFilter::new("Surat", "Feb").with_multi_leg(true));

        assert!(with_multi_leg.len() > reachable_only.len());
        assert!(with_multi_leg.iter().any(|summary| {
            !summary.reachable
                && matches!(
                    &summary.travel_from_origin,
                    TravelFromOrigin::MultiLeg { note, .. } if note == "Multi-leg travel needed"
                )
        }));
    }

    #[test]
    fn mix_preference_passes_every_type() {
        let catalog = catalog();
        let base = DestinationFilter::new("Delhi", "Feb").with_tier(Some(BudgetTier::Comfortable));
        let unfiltered = catalog.query(&base);
        let mixed = catalog.query(&base.clone().with_preference(Some(TripType::Mix)));
        assert_eq!(unfiltered, mixed);
    }

    #[test]
    fn tier_ceilings_match_affordability_brackets() {
        assert_eq!(daily_cost_ceiling(Some(BudgetTier::VeryTight)), Some(1_600));
        assert_eq!(daily_cost_ceiling(Some(BudgetTier::Budget)), Some(2_200));
        assert_eq!(daily_cost_ceiling(Some(BudgetTier::Moderate)), Some(3_000));
        assert_eq!(daily_cost_ceiling(Some(BudgetTier::Comfortable)), None);
        assert_eq!(daily_cost_ceiling(Some(BudgetTier::Impossible)), Some(2_200));
        assert_eq!(daily_cost_ceiling(None), Some(2_200));
    }

    #[test]
    fn catalog_loads_from_file_and_rejects_empty_lists() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"[]").expect("write catalog");
        let error = StaticCatalog::from_path(file.path()).expect_err("empty catalog must fail");
        assert!(matches!(error, CatalogError::Empty));

        let missing = StaticCatalog::from_path(std::path::Path::new("/nonexistent/catalog.json"))
            .expect_err("missing file must fail");
        assert!(matches!(missing, CatalogError::ReadFile { .. }));
    }
}
