use serde::{Deserialize, Serialize};

/// Conversation phase. Declaration order is the forward order.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    #[default]
    Idle,
    CollectRequirements,
    ValidateBudget,
    ProposeDestinations,
    DestinationSelected,
    BuildPlan,
    GenerateLinks,
    FinalItinerary,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::CollectRequirements => "COLLECT_REQUIREMENTS",
            Self::ValidateBudget => "VALIDATE_BUDGET",
            Self::ProposeDestinations => "PROPOSE_DESTINATIONS",
            Self::DestinationSelected => "DESTINATION_SELECTED",
            Self::BuildPlan => "BUILD_PLAN",
            Self::GenerateLinks => "GENERATE_LINKS",
            Self::FinalItinerary => "FINAL_ITINERARY",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Idle => "Waiting for the traveller to start a conversation",
            Self::CollectRequirements => {
                "Gathering budget, origin, dates, party size and trip vibe"
            }
            Self::ValidateBudget => "Checking whether the budget works for the trip",
            Self::ProposeDestinations => "Suggesting destinations that fit the budget",
            Self::DestinationSelected => "A destination has been chosen",
            Self::BuildPlan => "Building the cost breakdown and itinerary",
            Self::GenerateLinks => "Preparing booking and travel links",
            Self::FinalItinerary => "Final plan delivered",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a phase change happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionTrigger {
    FirstMessage,
    DestinationSelected,
    RequirementsCollected,
    DestinationsProposed,
    PlanPresented,
    DriverDirective,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTransition {
    pub from: Phase,
    pub to: Phase,
    pub trigger: TransitionTrigger,
}
