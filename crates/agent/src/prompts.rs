use tripgenie_core::domain::session::Session;

pub const SYSTEM_PROMPT: &str = r#"You are TravelGenie, an expert travel agent for India. You help users plan budget-friendly trips within India.
ALWAYS include a "Random Fact" or a "Hidden Gem" about the city when proposing destinations.
When you present the final plan (after the user selects a destination), ALWAYS include a text-based "Day-by-Day Itinerary" in your response.

## Your Personality
- Friendly, warm and conversational; use emojis sparingly but naturally
- You sound like a knowledgeable friend, not a robot
- You are honest about budget constraints
- You prioritize the user's experience within their budget

## STRICT RULES
1. DO NOT HALLUCINATE PRICES. If you don't know the exact price, give a realistic range or say you'll check.
2. ALWAYS use the provided tools to fetch destination details, prices and links.
3. If the budget is too low (e.g. ₹5000 for 1 week in Goa), politely explain why and suggest alternatives such as a shorter trip or a cheaper city.
4. KEEP RESPONSES CONCISE. Use bullet points and short paragraphs.
5. NEVER ask for personal info like credit card numbers.
6. If the user asks for something outside travel planning, kindly steer them back.
7. Ask clarifying questions one by one when information is missing (origin, budget, dates, people).

## Conversation Flow
1. Greeting and collection: welcome the user, acknowledge anything they already told you, and ask for what is missing.
2. Proposal: once you have enough info, call validate_budget and then list_destinations. Propose 2-3 destinations that fit, each with a one-sentence reason to go and its estimated daily cost. Ask which one sounds exciting.
3. Planning: after they pick a destination, confirm it, call build_budget_breakdown, generate_booking_links and generate_travel_links, and present the full plan.

## Tone Examples
- "Hey there! 👋 Ready to explore India? Where are we heading?"
- "Ooh, Goa is amazing in December! 🌊 But it can be pricey. With ₹10k, maybe we do 3 days instead of 5? Or have you considered Gokarna?"
- "Got it! Delhi to Manali for ₹15k. That's doable if we take the Volvo bus and stay in cozy homestays. Let me calculate the details..."
"#;

const ITINERARY_INSTRUCTION: &str = "CRITICAL INSTRUCTION: You MUST provide a detailed Day-by-Day Itinerary in your text response now. Focus on sightseeing and activities.";

/// One-line summary of what the planner knows, appended to the user message.
pub fn state_context(session: &Session) -> String {
    let phase = session.phase;

    if let Some(destination) = &session.selected_destination {
        return format!(
            "YOU MUST PROVIDE A DETAILED DAY-BY-DAY ITINERARY TEXT, plus BUDGET BREAKDOWN AND BOOKING LINKS FOR {}. User has already selected this destination. Do NOT suggest more cities. Current State: {phase}",
            destination.to_uppercase()
        );
    }

    let slots = &session.slots;
    let missing = slots.missing_requirements();
    if missing.is_empty() {
        return format!(
            "All info collected. User is from {} with ₹{}. SUGGEST 3-4 specific cities now using list_destinations tool. Current State: {phase}",
            slots.origin.as_deref().unwrap_or_default(),
            slots.budget.unwrap_or_default()
        );
    }

    let labels: Vec<_> = missing.iter().map(|slot| slot.label()).collect();
    format!(
        "Incomplete info. Missing: {}. Keep asking friendly questions. Current State: {phase}",
        labels.join(", ")
    )
}

pub fn augmented_message(session: &Session, message: &str) -> String {
    let mut augmented = format!("{message}\n\n[STATE CONTEXT: {}]", state_context(session));
    if session.has_destination() {
        augmented.push_str("\n\n");
        augmented.push_str(ITINERARY_INSTRUCTION);
    }
    augmented
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use tripgenie_core::domain::session::{Session, SessionId};
    use tripgenie_core::flows::Phase;

    use super::{augmented_message, state_context};

    fn session() -> Session {
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).single().expect("timestamp");
        let mut session = Session::new(SessionId("prompt".to_string()), now);
        session.phase = Phase::CollectRequirements;
        session
    }

    #[test]
    fn incomplete_context_lists_missing_slots() {
        let mut session = session();
        session.slots.budget = Some(15_000);

        assert_eq!(
            state_context(&session),
            "Incomplete info. Missing: origin city, travel dates, number of people. Keep asking friendly questions. Current State: COLLECT_REQUIREMENTS"
        );
    }

    #[test]
    fn complete_context_asks_for_proposals() {
        let mut session = session();
        session.phase = Phase::ValidateBudget;
        session.slots.budget = Some(20_000);
        session.slots.origin = Some("Pune".to_string());
        session.slots.start_date = NaiveDate::from_ymd_opt(2026, 2, 20);
        session.slots.end_date = NaiveDate::from_ymd_opt(2026, 2, 24);
        session.slots.party_size = Some(2);

        let context = state_context(&session);
        assert!(context.starts_with("All info collected. User is from Pune with ₹20000."));
        assert!(context.ends_with("Current State: VALIDATE_BUDGET"));
    }

    #[test]
    fn selected_destination_adds_itinerary_directive() {
        let mut session = session();
        session.select_destination("Manali");

        let message = augmented_message(&session, "Manali please");

        assert!(message.starts_with("Manali please\n\n[STATE CONTEXT: YOU MUST PROVIDE"));
        assert!(message.contains("BOOKING LINKS FOR MANALI."));
        assert!(message.ends_with("Focus on sightseeing and activities."));
    }

    #[test]
    fn no_directive_without_destination() {
        let message = augmented_message(&session(), "hello");
        assert!(message.ends_with("Current State: COLLECT_REQUIREMENTS]"));
    }
}
