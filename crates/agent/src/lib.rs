//! Conversation agent for budget trip planning.
//!
//! Each turn runs a constrained loop:
//! 1. **Slot extraction** (`extraction`) parses free text into trip facts.
//! 2. **Phase evaluation** (`tripgenie_core::flows`) moves the session forward.
//! 3. **Reply** from the tool-calling model loop (`driver`) or, when no model
//!    is configured or it fails, the rule-based `fallback`.
//! 4. **Rich content** (`rich_content`) picks the structured payload.
//!
//! The model only writes narrative. Budgets, tiers, breakdowns and links come
//! from the deterministic calculators in `tripgenie_core::planning`, reached
//! through the `tools` dispatcher.

pub mod driver;
pub mod extraction;
pub mod fallback;
pub mod llm;
pub mod openai;
pub mod prompts;
pub mod rich_content;
pub mod runtime;
pub mod tools;

pub use driver::LlmTurnDriver;
pub use extraction::{ExtractedSlot, SlotExtractor};
pub use fallback::{DriverReply, FallbackDriver};
pub use llm::{LlmClient, LlmError, LlmErrorKind, ModelMessage, ModelReply, ModelRequest};
pub use openai::OpenAiCompatibleClient;
pub use rich_content::RichContentAssembler;
pub use runtime::{
    AgentRuntime, Clock, FixedClock, RuntimeSettings, SessionStart, SystemClock, TurnResult,
};
pub use tools::{tool_schema, ToolCall, ToolDispatcher, ToolError};
