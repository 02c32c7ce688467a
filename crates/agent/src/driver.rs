use std::sync::Arc;

use tracing::{debug, info};
use tripgenie_core::domain::session::{Session, TurnRole};

use crate::llm::{LlmClient, LlmError, ModelMessage, ModelRequest, ToolResult};
use crate::prompts::{augmented_message, SYSTEM_PROMPT};
use crate::tools::{tool_schema, ToolDispatcher};

pub const GENERIC_COMPLETION: &str =
    "I have prepared your plan! Let me know if you need any adjustments.";

/// Bounded tool-calling loop against a model.
#[derive(Clone)]
pub struct LlmTurnDriver {
    client: Arc<dyn LlmClient>,
    tools: ToolDispatcher,
    max_rounds: u32,
    history_window: usize,
}

impl LlmTurnDriver {
    pub fn new(
        client: Arc<dyn LlmClient>,
        tools: ToolDispatcher,
        max_rounds: u32,
        history_window: usize,
    ) -> Self {
        Self { client, tools, max_rounds, history_window }
    }

    pub fn model_id(&self) -> &str {
        self.client.model_id()
    }

    /// Expects the current user turn to already be the last turn of the
    /// session; it is excluded from the history and sent augmented instead.
    pub async fn respond(&self, session: &mut Session, message: &str) -> Result<String, LlmError> {
        let mut messages = history(session, self.history_window);
        messages.push(ModelMessage::User(augmented_message(session, message)));

        let mut request =
            ModelRequest { system: SYSTEM_PROMPT.to_string(), messages, tools: tool_schema() };
        let mut reply = self.client.complete(&request).await?;
        let mut rounds = 0;

        while reply.wants_tools() && rounds < self.max_rounds {
            rounds += 1;
            let results: Vec<ToolResult> = reply
                .tool_calls
                .iter()
                .map(|invocation| self.tools.execute(session, invocation))
                .collect();
            debug!(
                event_name = "agent.tool_round_completed",
                session_id = %session.id,
                round = rounds,
                calls = results.len(),
                "tool round completed"
            );

            request.messages.push(ModelMessage::Assistant {
                text: reply.text.take(),
                tool_calls: std::mem::take(&mut reply.tool_calls),
            });
            request.messages.push(ModelMessage::ToolResults(results));
            reply = self.client.complete(&request).await?;
        }

        info!(
            event_name = "agent.llm_turn_completed",
            session_id = %session.id,
            model = self.client.model_id(),
            tool_rounds = rounds,
            exhausted = reply.wants_tools(),
            "model turn completed"
        );

        Ok(reply
            .text
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| GENERIC_COMPLETION.to_string()))
    }
}

fn history(session: &Session, window: usize) -> Vec<ModelMessage> {
    session
        .prior_turns(window)
        .iter()
        .map(|turn| match turn.role {
            TurnRole::User => ModelMessage::User(turn.text.clone()),
            TurnRole::Assistant => {
                ModelMessage::Assistant { text: Some(turn.text.clone()), tool_calls: Vec::new() }
            }
        })
        .collect()
}
