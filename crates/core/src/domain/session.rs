use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::plan::{BudgetBreakdown, BudgetTier};
use crate::domain::rich_content::RichContent;
use crate::domain::slots::CollectedSlots;
use crate::flows::Phase;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rich_content: Option<RichContent>,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn user(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self { role: TurnRole::User, text: text.into(), rich_content: None, timestamp }
    }

    pub fn assistant(
        text: impl Into<String>,
        rich_content: Option<RichContent>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self { role: TurnRole::Assistant, text: text.into(), rich_content, timestamp }
    }
}

/// Conversation state carried between turns.
///
/// The breakdown and tier caches are derived data: selecting a different
/// destination drops the breakdown, and a reset drops both.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub phase: Phase,
    pub turns: Vec<Turn>,
    pub slots: CollectedSlots,
    pub selected_destination: Option<String>,
    pub budget_breakdown: Option<BudgetBreakdown>,
    pub budget_tier: Option<BudgetTier>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: SessionId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            phase: Phase::Idle,
            turns: Vec::new(),
            slots: CollectedSlots::default(),
            selected_destination: None,
            budget_breakdown: None,
            budget_tier: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_destination(&self) -> bool {
        self.selected_destination.is_some()
    }

    pub fn select_destination(&mut self, name: impl Into<String>) {
        self.selected_destination = Some(name.into());
        self.budget_breakdown = None;
    }

    /// Returns the session to `Idle`. The transcript is kept.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.phase = Phase::Idle;
        self.slots = CollectedSlots::default();
        self.selected_destination = None;
        self.budget_breakdown = None;
        self.budget_tier = None;
        self.updated_at = now;
    }

    pub fn push_turn(&mut self, turn: Turn) {
        self.updated_at = turn.timestamp;
        self.turns.push(turn);
    }

    /// Up to `window` turns preceding the most recent one.
    pub fn prior_turns(&self, window: usize) -> &[Turn] {
        let end = self.turns.len().saturating_sub(1);
        let start = end.saturating_sub(window);
        &self.turns[start..end]
    }
}
