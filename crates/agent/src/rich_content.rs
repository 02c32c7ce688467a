use std::sync::Arc;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use tripgenie_core::domain::destination::DestinationSummary;
use tripgenie_core::domain::plan::{BudgetBreakdown, BudgetTier, PlanLinks};
use tripgenie_core::domain::rich_content::RichContent;
use tripgenie_core::domain::session::Session;
use tripgenie_core::domain::slots::{CollectedSlots, TripType};
use tripgenie_core::flows::Phase;
use tripgenie_core::planning::{
    booking_links, build_budget_breakdown, local_links, travel_links, BreakdownRequest,
    DestinationCatalog, DestinationFilter, HotelSearch,
};

static PLAN_CONTEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)breakdown|budget|links|itinerary|plan")
        .unwrap_or_else(|err| panic!("invalid plan context pattern: {err}"))
});

pub const MAX_PROPOSALS: usize = 10;

/// Values used for plans built before every slot is known.
pub struct PlanDefaults;

impl PlanDefaults {
    pub const ORIGIN: &'static str = "Delhi";
    pub const DAYS: u32 = 5;
    pub const PEOPLE: u32 = 1;
    pub const BUDGET: u32 = 20_000;
    pub const MAX_NIGHTLY_PRICE: i64 = 2_000;
    pub const TIER: BudgetTier = BudgetTier::Budget;
    const CHECKIN: (u32, u32) = (2, 20);
    const CHECKOUT: (u32, u32) = (2, 25);

    pub fn checkin(year: i32) -> String {
        iso_date(year, Self::CHECKIN)
    }

    pub fn checkout(year: i32) -> String {
        iso_date(year, Self::CHECKOUT)
    }
}

fn iso_date(year: i32, (month, day): (u32, u32)) -> String {
    NaiveDate::from_ymd_opt(year, month, day)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| format!("{year}-{month:02}-{day:02}"))
}

fn format_slot_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|date| date.format("%Y-%m-%d").to_string())
}

pub fn breakdown_request(slots: &CollectedSlots, destination: &str) -> BreakdownRequest {
    BreakdownRequest {
        destination: destination.to_string(),
        origin: slots.origin.clone().unwrap_or_else(|| PlanDefaults::ORIGIN.to_string()),
        days: slots.trip_days.unwrap_or(PlanDefaults::DAYS),
        people: slots.party_size.map(u32::from).unwrap_or(PlanDefaults::PEOPLE),
        budget: slots.budget.unwrap_or(PlanDefaults::BUDGET),
    }
}

pub fn plan_links(
    slots: &CollectedSlots,
    destination: &str,
    breakdown: Option<&BudgetBreakdown>,
    year: i32,
) -> PlanLinks {
    let checkin =
        format_slot_date(slots.start_date).unwrap_or_else(|| PlanDefaults::checkin(year));
    let checkout =
        format_slot_date(slots.end_date).unwrap_or_else(|| PlanDefaults::checkout(year));
    let origin = slots.origin.as_deref().unwrap_or(PlanDefaults::ORIGIN);
    let max_price_per_night = breakdown
        .map(|plan| plan.max_stay_per_night)
        .filter(|price| *price != 0)
        .unwrap_or(PlanDefaults::MAX_NIGHTLY_PRICE);

    PlanLinks {
        booking: booking_links(&HotelSearch {
            city: destination.to_string(),
            checkin: checkin.clone(),
            checkout,
            max_price_per_night,
            people: slots.party_size.map(u32::from).unwrap_or(PlanDefaults::PEOPLE),
        }),
        travel: travel_links(origin, destination, &checkin),
        local: local_links(destination),
    }
}

/// Picks the structured payload that accompanies an assistant reply.
#[derive(Clone)]
pub struct RichContentAssembler {
    catalog: Arc<dyn DestinationCatalog>,
}

impl RichContentAssembler {
    pub fn new(catalog: Arc<dyn DestinationCatalog>) -> Self {
        Self { catalog }
    }

    /// A selected destination gets the full plan when the reply talks about
    /// the plan or no breakdown exists yet. Otherwise, while proposing, the
    /// matching destinations are attached.
    pub fn assemble(&self, session: &mut Session, narrative: &str, year: i32) -> RichContent {
        if let Some(destination) = session.selected_destination.clone() {
            if PLAN_CONTEXT.is_match(narrative) || session.budget_breakdown.is_none() {
                return self.full_plan(session, &destination, year);
            }
        }

        if session.phase == Phase::ProposeDestinations && !session.has_destination() {
            let destinations = self.proposals(session);
            if !destinations.is_empty() {
                return RichContent::Destinations { destinations };
            }
        }

        RichContent::Text
    }

    pub fn full_plan(&self, session: &mut Session, destination: &str, year: i32) -> RichContent {
        let budget_breakdown = self.ensure_breakdown(session, destination);
        let links = plan_links(&session.slots, destination, budget_breakdown.as_ref(), year);
        RichContent::FullPlan { budget_breakdown, links }
    }

    /// Cached breakdown, or a fresh one that is then cached. `None` for places
    /// missing from the catalog.
    pub fn ensure_breakdown(
        &self,
        session: &mut Session,
        destination: &str,
    ) -> Option<BudgetBreakdown> {
        if let Some(cached) = &session.budget_breakdown {
            return Some(cached.clone());
        }
        let breakdown = build_budget_breakdown(
            self.catalog.as_ref(),
            &breakdown_request(&session.slots, destination),
        );
        session.budget_breakdown = breakdown.clone();
        breakdown
    }

    pub fn proposals(&self, session: &Session) -> Vec<DestinationSummary> {
        let slots = &session.slots;
        let filter = DestinationFilter::new(
            slots.origin.as_deref().unwrap_or(PlanDefaults::ORIGIN),
            slots.travel_month(),
        )
        .with_tier(Some(session.budget_tier.unwrap_or(PlanDefaults::TIER)))
        .with_preference(Some(slots.preference.unwrap_or(TripType::Mix)));

        let mut destinations = self.catalog.query(&filter);
        destinations.truncate(MAX_PROPOSALS);
        destinations
    }
}
