pub mod config;
pub mod domain;
pub mod errors;
pub mod flows;
pub mod planning;

pub use domain::destination::{
    Destination, DestinationSummary, LocalData, Reachability, TravelFromOrigin, TravelMode,
};
pub use domain::plan::{
    BookingLinks, BudgetBreakdown, BudgetTier, BudgetValidation, LocalLinks, PlanLinks,
    TravelLinks,
};
pub use domain::rich_content::RichContent;
pub use domain::session::{Session, SessionId, Turn, TurnRole};
pub use domain::slots::{CollectedSlots, RequiredSlot, TripType};
pub use errors::{ApplicationError, InterfaceError};
pub use flows::{Phase, PhaseMachine, PhaseTransition, TransitionTrigger};
pub use planning::{DestinationCatalog, DestinationFilter, StaticCatalog};
