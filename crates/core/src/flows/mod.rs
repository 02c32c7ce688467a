pub mod engine;
pub mod states;

pub use engine::{narrative_transition, FlowTransitionError, PhaseMachine};
pub use states::{Phase, PhaseTransition, TransitionTrigger};
