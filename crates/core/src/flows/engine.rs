use thiserror::Error;
use tracing::info;

use crate::domain::session::Session;
use crate::flows::states::{Phase, PhaseTransition, TransitionTrigger};

const PROPOSAL_KEYWORDS: [&str; 4] = ["here are", "suggest", "options", "recommend"];
const PLAN_KEYWORDS: [&str; 6] = ["breakdown", "₹", "plan", "itinerary", "|", "link"];

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FlowTransitionError {
    #[error("phase cannot move backwards from {from} to {to}")]
    Regression { from: Phase, to: Phase },
}

/// Narrative-driven transitions: proposal wording before a destination is
/// chosen, plan wording after.
pub fn narrative_transition(
    narrative: &str,
    phase: Phase,
    destination_selected: bool,
) -> Option<(Phase, TransitionTrigger)> {
    let lowered = narrative.to_lowercase();

    if !destination_selected
        && matches!(phase, Phase::CollectRequirements | Phase::ValidateBudget)
        && PROPOSAL_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
    {
        return Some((Phase::ProposeDestinations, TransitionTrigger::DestinationsProposed));
    }

    if destination_selected
        && phase < Phase::BuildPlan
        && PLAN_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
    {
        return Some((Phase::BuildPlan, TransitionTrigger::PlanPresented));
    }

    None
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PhaseMachine;

impl PhaseMachine {
    pub fn new() -> Self {
        Self
    }

    /// Applies every rule that fires, in priority order, and returns the
    /// transitions taken. Narrative rules only run when a narrative is given.
    pub fn evaluate(&self, session: &mut Session, narrative: Option<&str>) -> Vec<PhaseTransition> {
        let mut applied = Vec::new();

        if session.phase == Phase::Idle {
            applied.extend(step(session, Phase::CollectRequirements, TransitionTrigger::FirstMessage));
        }

        if session.has_destination()
            && matches!(
                session.phase,
                Phase::CollectRequirements | Phase::ValidateBudget | Phase::ProposeDestinations
            )
        {
            applied.extend(step(
                session,
                Phase::DestinationSelected,
                TransitionTrigger::DestinationSelected,
            ));
        }

        if session.phase == Phase::CollectRequirements && session.slots.requirements_collected() {
            applied.extend(step(
                session,
                Phase::ValidateBudget,
                TransitionTrigger::RequirementsCollected,
            ));
        }

        if let Some((to, trigger)) = narrative.and_then(|narrative| {
            narrative_transition(narrative, session.phase, session.has_destination())
        }) {
            applied.extend(step(session, to, trigger));
        }

        applied
    }

    /// Moves forward to `to`. Staying put is a no-op; moving back is an error.
    pub fn advance_to(
        &self,
        session: &mut Session,
        to: Phase,
        trigger: TransitionTrigger,
    ) -> Result<Option<PhaseTransition>, FlowTransitionError> {
        if to < session.phase {
            return Err(FlowTransitionError::Regression { from: session.phase, to });
        }
        Ok(step(session, to, trigger))
    }
}

fn step(session: &mut Session, to: Phase, trigger: TransitionTrigger) -> Option<PhaseTransition> {
    if session.phase >= to {
        return None;
    }

    let transition = PhaseTransition { from: session.phase, to, trigger };
    session.phase = to;
    info!(
        event_name = "flow.transition_applied",
        session_id = %session.id,
        from = transition.from.as_str(),
        to = transition.to.as_str(),
        trigger = ?transition.trigger,
        "phase transition applied"
    );
    Some(transition)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::{narrative_transition, FlowTransitionError, PhaseMachine};
    use crate::domain::session::{Session, SessionId};
    use crate::flows::states::{Phase, TransitionTrigger};

    fn session() -> Session {
        let now = Utc.with_ymd_and_hms(2026, 1, 10, 8, 0, 0).single().expect("timestamp");
        Session::new(SessionId("flow-test".to_string()), now)
    }

    fn fill_requirements(session: &mut Session) {
        session.slots.budget = Some(20_000);
        session.slots.origin = Some("Pune".to_string());
        session.slots.start_date = NaiveDate::from_ymd_opt(2026, 2, 20);
        session.slots.end_date = NaiveDate::from_ymd_opt(2026, 2, 24);
        session.slots.trip_days = Some(5);
        session.slots.party_size = Some(2);
    }

    #[test]
    fn first_message_leaves_idle() {
        let machine = PhaseMachine::new();
        let mut session = session();

        let applied = machine.evaluate(&mut session, None);

        assert_eq!(session.phase, Phase::CollectRequirements);
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].trigger, TransitionTrigger::FirstMessage);
    }

    #[test]
    fn complete_requirements_and_proposal_wording_chain_in_one_evaluation() {
        let machine = PhaseMachine::new();
        let mut session = session();
        fill_requirements(&mut session);

        let applied =
            machine.evaluate(&mut session, Some("Here are some options that fit your budget"));

        let phases: Vec<Phase> = applied.iter().map(|transition| transition.to).collect();
        assert_eq!(
            phases,
            vec![Phase::CollectRequirements, Phase::ValidateBudget, Phase::ProposeDestinations]
        );
    }

    #[test]
    fn selection_jumps_ahead_and_plan_wording_builds_plan() {
        let machine = PhaseMachine::new();
        let mut session = session();
        session.phase = Phase::ProposeDestinations;
        session.select_destination("Manali");

        machine.evaluate(&mut session, None);
        assert_eq!(session.phase, Phase::DestinationSelected);

        machine.evaluate(&mut session, Some("Your itinerary is ready"));
        assert_eq!(session.phase, Phase::BuildPlan);
    }

    #[test]
    fn proposal_wording_is_ignored_once_destination_is_selected() {
        assert_eq!(narrative_transition("I suggest Kasol", Phase::ValidateBudget, true), None);
        assert_eq!(
            narrative_transition("I RECOMMEND these", Phase::ValidateBudget, false),
            Some((Phase::ProposeDestinations, TransitionTrigger::DestinationsProposed))
        );
        assert_eq!(narrative_transition("Total ₹18,000", Phase::ProposeDestinations, false), None);
    }

    #[test]
    fn phases_never_regress() {
        let machine = PhaseMachine::new();
        let mut session = session();
        session.phase = Phase::BuildPlan;
        session.select_destination("Goa");
        fill_requirements(&mut session);

        let applied = machine.evaluate(&mut session, Some("here are more options and a plan"));
        assert!(applied.is_empty());
        assert_eq!(session.phase, Phase::BuildPlan);

        let error = machine
            .advance_to(&mut session, Phase::ProposeDestinations, TransitionTrigger::DriverDirective)
            .expect_err("backwards move must fail");
        assert_eq!(
            error,
            FlowTransitionError::Regression {
                from: Phase::BuildPlan,
                to: Phase::ProposeDestinations
            }
        );
    }

    #[test]
    fn advance_to_current_phase_is_a_no_op() {
        let machine = PhaseMachine::new();
        let mut session = session();
        session.phase = Phase::ProposeDestinations;

        let outcome = machine
            .advance_to(&mut session, Phase::ProposeDestinations, TransitionTrigger::DriverDirective)
            .expect("same phase is allowed");
        assert!(outcome.is_none());
    }
}
