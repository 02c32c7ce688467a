//! Rule-based replies used when no model is configured or the model fails.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;
use tripgenie_core::domain::destination::DestinationSummary;
use tripgenie_core::domain::rich_content::RichContent;
use tripgenie_core::domain::session::Session;
use tripgenie_core::domain::slots::RequiredSlot;
use tripgenie_core::flows::{Phase, PhaseMachine, TransitionTrigger};
use tripgenie_core::planning::validate_budget;

use crate::rich_content::{PlanDefaults, RichContentAssembler};

static SALUTATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(hi|hello|hey|hola|namaste)[!?\s]*$")
        .unwrap_or_else(|err| panic!("invalid salutation pattern: {err}"))
});

pub const ONBOARDING: &str = "Hello! 👋 I'm TravelGenie, your AI travel buddy for India!\n\nTo get started, tell me:\n1️⃣ Your **budget** (e.g. 20k INR)\n2️⃣ **Where** you're travelling from\n3️⃣ **When** you want to go (e.g. 20-25 Feb)\n\nOr just describe your dream trip and I'll figure it out! ✨";

/// Reply produced by a turn driver before the runtime records it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DriverReply {
    pub narrative: String,
    /// `None` leaves the payload to the rich content assembler.
    pub rich_content: Option<RichContent>,
}

fn prompt_for(slot: RequiredSlot) -> &'static str {
    match slot {
        RequiredSlot::Budget => "💰 **Total budget** (e.g. 20k, ₹15000)",
        RequiredSlot::Origin => "📍 **Starting city** (e.g. Delhi, Pune, Mumbai)",
        RequiredSlot::TravelDates => "📅 **Travel dates** (e.g. 20-25 Feb)",
        RequiredSlot::PartySize => "👥 **Number of people** (e.g. 1, 2, solo, couple)",
    }
}

/// `20000` as `20,000`.
pub fn group_thousands(amount: u32) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

fn keycap(position: usize) -> String {
    format!("{position}\u{fe0f}\u{20e3}")
}

#[derive(Clone)]
pub struct FallbackDriver {
    assembler: RichContentAssembler,
    machine: PhaseMachine,
}

impl FallbackDriver {
    pub fn new(assembler: RichContentAssembler) -> Self {
        Self { assembler, machine: PhaseMachine::new() }
    }

    /// Greets, then asks for missing slots, then plans the selected
    /// destination or proposes some.
    pub fn respond(&self, session: &mut Session, message: &str, year: i32) -> DriverReply {
        if SALUTATION.is_match(message.trim()) {
            return DriverReply {
                narrative: ONBOARDING.to_string(),
                rich_content: Some(RichContent::Text),
            };
        }

        let missing = session.slots.missing_requirements();
        if !missing.is_empty() {
            return DriverReply {
                narrative: missing_slots_reply(session, &missing),
                rich_content: Some(RichContent::Text),
            };
        }

        match session.selected_destination.clone() {
            Some(destination) => self.plan(session, &destination, year),
            None => self.propose(session),
        }
    }

    fn advance(&self, session: &mut Session, to: Phase) {
        if let Err(error) = self.machine.advance_to(session, to, TransitionTrigger::DriverDirective)
        {
            warn!(
                event_name = "agent.fallback_transition_skipped",
                session_id = %session.id,
                error = %error,
                "fallback could not move the phase"
            );
        }
    }

    fn plan(&self, session: &mut Session, destination: &str, year: i32) -> DriverReply {
        // Priced from the current slots every time; a model turn may have
        // cached one built on defaults.
        session.budget_breakdown = None;
        let content = self.assembler.full_plan(session, destination, year);
        self.advance(session, Phase::BuildPlan);

        let verdict = match &session.budget_breakdown {
            Some(priced) if priced.within_budget => " It fits within your budget!".to_string(),
            Some(breakdown) => format!(
                " Heads up: it runs about ₹{} over your budget, so fewer days or a cheaper stay would help.",
                breakdown.allocated() - breakdown.total
            ),
            None => " I don't have cost data for this place yet, so the links are the best place to start.".to_string(),
        };

        DriverReply {
            narrative: format!(
                "Great choice! **{destination}** is a fantastic pick! 🎉\n\nI've put together a budget breakdown and booking links for your trip below.{verdict}"
            ),
            rich_content: Some(content),
        }
    }

    fn propose(&self, session: &mut Session) -> DriverReply {
        let slots = &session.slots;
        let budget = slots.budget.unwrap_or(PlanDefaults::BUDGET);
        let days = slots.trip_days.unwrap_or(PlanDefaults::DAYS);
        let people = slots.party_size.map(u32::from).unwrap_or(PlanDefaults::PEOPLE);
        let origin = slots.origin.clone().unwrap_or_else(|| PlanDefaults::ORIGIN.to_string());

        let validation = validate_budget(budget, days, people);
        session.budget_tier = Some(validation.budget_tier);
        self.advance(session, Phase::ProposeDestinations);

        let destinations = self.assembler.proposals(session);
        let mut narrative = format!("Nice! {}\n\n", validation.analysis);

        if destinations.is_empty() {
            narrative.push_str(&format!(
                "I couldn't find destinations reachable from {origin} that fit ₹{} in {}. Could you stretch the budget or pick different dates?",
                group_thousands(budget),
                session.slots.travel_month()
            ));
            return DriverReply { narrative, rich_content: Some(RichContent::Text) };
        }

        narrative.push_str(&format!(
            "### 🏔️ Best Options Under ₹{} from {origin}:\n\n",
            group_thousands(budget)
        ));
        for (index, destination) in destinations.iter().enumerate() {
            narrative.push_str(&proposal_entry(index + 1, destination));
        }
        narrative
            .push_str("👉 Which one catches your eye? Tell me and I'll build a complete plan!");

        DriverReply { narrative, rich_content: Some(RichContent::Destinations { destinations }) }
    }
}

fn proposal_entry(position: usize, destination: &DestinationSummary) -> String {
    let highlights: Vec<_> = destination.highlights.iter().take(3).map(String::as_str).collect();
    format!(
        "{} **{}** ({})\n• ~₹{}/day • {}\n• {}\n\n",
        keycap(position),
        destination.name,
        destination.state,
        destination.avg_daily_cost,
        destination.kind,
        highlights.join(" • ")
    )
}

fn missing_slots_reply(session: &Session, missing: &[RequiredSlot]) -> String {
    let slots = &session.slots;
    let mut known = Vec::new();
    if let Some(budget) = slots.budget {
        known.push(format!("Budget: ₹{}", group_thousands(budget)));
    }
    if let Some(origin) = &slots.origin {
        known.push(format!("From: {origin}"));
    }
    if let (Some(start), Some(end)) = (slots.start_date, slots.end_date) {
        known.push(format!("Dates: {start} to {end}"));
    }
    if let Some(people) = slots.party_size {
        known.push(format!("People: {people}"));
    }
    if let Some(preference) = slots.preference {
        known.push(format!("Vibe: {preference}"));
    }

    let asks: Vec<_> = missing.iter().map(|slot| prompt_for(*slot)).collect();
    let asks = asks.join("\n");

    if known.is_empty() {
        format!(
            "I'd love to help! I just need a few things to plan your trip:\n{asks}\n\nTell me in one go or one by one, both work! 😊"
        )
    } else {
        format!(
            "Got it! Here's what I have so far:\n✅ {}\n\nI still need:\n{asks}\n\nPlease share these details!",
            known.join("\n✅ ")
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{NaiveDate, TimeZone, Utc};
    use tripgenie_core::domain::plan::BudgetBreakdown;
    use tripgenie_core::domain::rich_content::RichContent;
    use tripgenie_core::domain::session::{Session, SessionId};
    use tripgenie_core::flows::{narrative_transition, Phase};
    use tripgenie_core::planning::StaticCatalog;

    use super::{group_thousands, FallbackDriver, ONBOARDING};
    use crate::rich_content::RichContentAssembler;

    fn driver() -> FallbackDriver {
        let catalog = Arc::new(StaticCatalog::bundled().expect("bundled catalog"));
        FallbackDriver::new(RichContentAssembler::new(catalog))
    }

    fn session() -> Session {
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).single().expect("timestamp");
        let mut session = Session::new(SessionId("fallback".to_string()), now);
        session.phase = Phase::CollectRequirements;
        session
    }

    fn ready(session: &mut Session) {
        session.slots.budget = Some(20_000);
        session.slots.origin = Some("Pune".to_string());
        session.slots.start_date = NaiveDate::from_ymd_opt(2026, 2, 20);
        session.slots.end_date = NaiveDate::from_ymd_opt(2026, 2, 24);
        session.slots.trip_days = Some(5);
        session.slots.party_size = Some(2);
        session.phase = Phase::ValidateBudget;
    }

    #[test]
    fn groups_thousands_with_commas() {
        assert_eq!(group_thousands(500), "500");
        assert_eq!(group_thousands(20_000), "20,000");
        assert_eq!(group_thousands(1_250_000), "1,250,000");
    }

    #[test]
    fn salutation_gets_onboarding() {
        let mut session = session();
        let reply = driver().respond(&mut session, " Hey!! ", 2026);

        assert_eq!(reply.narrative, ONBOARDING);
        assert_eq!(reply.rich_content, Some(RichContent::Text));
        assert_eq!(session.phase, Phase::CollectRequirements);
    }

    #[test]
    fn missing_slots_are_requested_without_proposal_wording() {
        let mut session = session();
        session.slots.budget = Some(15_000);

        let reply = driver().respond(&mut session, "15k", 2026);

        let expected = "Got it! Here's what I have so far:\n✅ Budget: ₹15,000";
        assert!(reply.narrative.starts_with(expected));
        assert!(reply.narrative.contains("📍 **Starting city**"));
        assert!(!reply.narrative.contains("💰"));
        assert!(narrative_transition(&reply.narrative, session.phase, false).is_none());
    }

    #[test]
    fn nothing_known_yet_asks_for_everything() {
        let mut session = session();
        let reply = driver().respond(&mut session, "plan a trip", 2026);

        assert!(reply.narrative.starts_with("I'd love to help!"));
        assert_eq!(reply.narrative.matches("**").count(), 8);
    }

    #[test]
    fn complete_slots_propose_destinations() {
        let mut session = session();
        ready(&mut session);

        let reply = driver().respond(&mut session, "ok", 2026);

        assert_eq!(session.phase, Phase::ProposeDestinations);
        assert!(session.budget_tier.is_some());
        assert!(reply.narrative.starts_with("Nice! ₹20000 for 2 person(s) over 5 days"));
        assert!(reply.narrative.contains("### 🏔️ Best Options Under ₹20,000 from Pune:"));
        assert!(reply.narrative.contains("1\u{fe0f}\u{20e3} **"));
        match reply.rich_content {
            Some(RichContent::Destinations { destinations }) => {
                assert!(!destinations.is_empty());
                assert!(destinations.len() <= 10);
            }
            other => panic!("expected destinations, got {other:?}"),
        }
    }

    #[test]
    fn unreachable_origin_gets_plain_text() {
        let mut session = session();
        ready(&mut session);
        session.slots.origin = Some("Nowhere".to_string());

        let reply = driver().respond(&mut session, "ok", 2026);

        assert_eq!(reply.rich_content, Some(RichContent::Text));
        assert!(reply.narrative.contains("I couldn't find destinations reachable from Nowhere"));
        assert_eq!(session.phase, Phase::ProposeDestinations);
    }

    #[test]
    fn selected_destination_builds_the_plan() {
        let mut session = session();
        ready(&mut session);
        session.select_destination("Manali");
        session.phase = Phase::DestinationSelected;

        let reply = driver().respond(&mut session, "Manali", 2026);

        assert_eq!(session.phase, Phase::BuildPlan);
        assert!(reply.narrative.starts_with("Great choice! **Manali** is a fantastic pick!"));
        assert!(reply.narrative.ends_with("It fits within your budget!"));
        assert_eq!(reply.rich_content.as_ref().map(RichContent::kind), Some("fullPlan"));
        assert!(session.budget_breakdown.is_some());
    }

    #[test]
    fn plan_reprices_a_breakdown_cached_on_defaults() {
        let mut session = session();
        ready(&mut session);
        session.slots.budget = Some(50_000);
        session.select_destination("Manali");
        session.phase = Phase::DestinationSelected;
        session.budget_breakdown = Some(BudgetBreakdown {
            travel: 6_000,
            stay: 6_160,
            food: 3_000,
            commute: 1_500,
            buffer: 3_340,
            total: 20_000,
            max_stay_per_night: 1_540,
            within_budget: true,
            transport_note: "Multi-leg travel needed".to_string(),
        });

        let reply = driver().respond(&mut session, "the model is down", 2026);

        let breakdown = session.budget_breakdown.clone().expect("fresh breakdown");
        assert_eq!(breakdown.total, 50_000);
        assert_ne!(breakdown.stay, 6_160);
        match reply.rich_content {
            Some(RichContent::FullPlan { budget_breakdown, .. }) => {
                assert_eq!(budget_breakdown, Some(breakdown));
            }
            other => panic!("expected full plan, got {other:?}"),
        }
    }

    #[test]
    fn selection_with_missing_slots_still_asks_first() {
        let mut session = session();
        session.select_destination("Goa");

        let reply = driver().respond(&mut session, "Goa", 2026);

        assert!(reply.narrative.starts_with("I'd love to help!"));
        assert_eq!(session.phase, Phase::CollectRequirements);
    }
}
