use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use tracing::{error, info, warn};
use tripgenie_core::config::{AgentConfig, AppConfig};
use tripgenie_core::domain::rich_content::RichContent;
use tripgenie_core::domain::session::{Session, SessionId, Turn};
use tripgenie_core::domain::slots::CollectedSlots;
use tripgenie_core::errors::ApplicationError;
use tripgenie_core::flows::{Phase, PhaseMachine};
use tripgenie_core::planning::{DestinationCatalog, StaticCatalog};
use tripgenie_db::{RepositoryError, SessionRepository};

use crate::driver::LlmTurnDriver;
use crate::extraction::SlotExtractor;
use crate::fallback::{DriverReply, FallbackDriver};
use crate::llm::LlmClient;
use crate::openai::OpenAiCompatibleClient;
use crate::rich_content::RichContentAssembler;
use crate::tools::ToolDispatcher;

pub const WELCOME: &str = "Hello! 👋 I'm your **AI Travel Manager**.\n\nI'm excited to help you plan your next budget adventure in India! ⛵\n\nTo get started, just let me know:\n1. Where are you starting from?\n2. What's your total budget and for how many people?\n3. What are your travel dates?\n\nor just say **'Hi'** and let's chat!";

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always reports the same instant. Dates without a year resolve against it.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuntimeSettings {
    pub max_tool_rounds: u32,
    pub history_window: usize,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self { max_tool_rounds: 5, history_window: 10 }
    }
}

impl From<&AgentConfig> for RuntimeSettings {
    fn from(config: &AgentConfig) -> Self {
        Self { max_tool_rounds: config.max_tool_rounds, history_window: config.history_window }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnResult {
    pub narrative: String,
    pub rich_content: RichContent,
    pub phase: Phase,
    pub slots: CollectedSlots,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStart {
    pub session_id: SessionId,
    pub welcome: Turn,
}

/// Hosts the per-turn flow: extraction, phase evaluation, a driver reply and
/// the structured payload, persisted through the session store.
pub struct AgentRuntime {
    store: Arc<dyn SessionRepository>,
    machine: PhaseMachine,
    llm: Option<LlmTurnDriver>,
    fallback: FallbackDriver,
    assembler: RichContentAssembler,
    clock: Arc<dyn Clock>,
}

impl AgentRuntime {
    pub fn new(
        catalog: Arc<dyn DestinationCatalog>,
        store: Arc<dyn SessionRepository>,
        llm: Option<Arc<dyn LlmClient>>,
        settings: RuntimeSettings,
    ) -> Self {
        let assembler = RichContentAssembler::new(catalog.clone());
        let llm = llm.map(|client| {
            LlmTurnDriver::new(
                client,
                ToolDispatcher::new(catalog),
                settings.max_tool_rounds,
                settings.history_window,
            )
        });

        Self {
            store,
            machine: PhaseMachine::new(),
            llm,
            fallback: FallbackDriver::new(assembler.clone()),
            assembler,
            clock: Arc::new(SystemClock),
        }
    }

    /// Catalog from `agent.catalog_path` (bundled data otherwise) and a model
    /// client unless the provider is `none`.
    pub fn from_config(
        config: &AppConfig,
        store: Arc<dyn SessionRepository>,
    ) -> Result<Self, ApplicationError> {
        let catalog = match &config.agent.catalog_path {
            Some(path) => StaticCatalog::from_path(path),
            None => StaticCatalog::bundled(),
        }
        .map_err(|error| ApplicationError::Configuration(error.to_string()))?;

        let client = OpenAiCompatibleClient::from_config(&config.llm)
            .map_err(|error| ApplicationError::Configuration(error.to_string()))?
            .map(|client| Arc::new(client) as Arc<dyn LlmClient>);

        Ok(Self::new(Arc::new(catalog), store, client, RuntimeSettings::from(&config.agent)))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn has_model(&self) -> bool {
        self.llm.is_some()
    }

    pub async fn create_session(&self) -> Result<SessionStart, ApplicationError> {
        let now = self.clock.now();
        let mut session = Session::new(SessionId::generate(), now);
        let welcome = Turn::assistant(WELCOME, Some(RichContent::Welcome), now);
        session.push_turn(welcome.clone());
        let session_id = session.id.clone();

        self.store.save(session).await.map_err(persistence)?;
        info!(
            event_name = "agent.session_created",
            session_id = %session_id,
            "session created"
        );
        Ok(SessionStart { session_id, welcome })
    }

    pub async fn load_session(&self, id: &SessionId) -> Result<Option<Session>, ApplicationError> {
        self.store.find_by_id(id).await.map_err(persistence)
    }

    /// Returns the session to `Idle`. `false` when no such session exists.
    pub async fn reset_session(&self, id: &SessionId) -> Result<bool, ApplicationError> {
        let Some(mut session) = self.load_session(id).await? else {
            return Ok(false);
        };
        session.reset(self.clock.now());
        self.store.save(session).await.map_err(persistence)?;
        info!(event_name = "agent.session_reset", session_id = %id, "session reset");
        Ok(true)
    }

    /// Load, process and save. A missing session starts fresh; store failures
    /// turn into an apology instead of an error.
    pub async fn handle_message(&self, id: &SessionId, message: &str) -> TurnResult {
        let mut session = match self.store.find_by_id(id).await {
            Ok(Some(session)) => session,
            Ok(None) => Session::new(id.clone(), self.clock.now()),
            Err(error) => return self.apology(id, error, Phase::Idle, CollectedSlots::default()),
        };

        let result = self.process_message(&mut session, message).await;
        match self.store.save(session).await {
            Ok(()) => result,
            Err(error) => self.apology(id, error, result.phase, result.slots),
        }
    }

    /// Runs one turn against an in-memory session. Model failures fall back to
    /// the rule-based driver, so this never fails.
    pub async fn process_message(&self, session: &mut Session, message: &str) -> TurnResult {
        let now = self.clock.now();
        let year = now.year();

        self.machine.evaluate(session, None);
        session.push_turn(Turn::user(message, now));
        SlotExtractor::for_year(year).apply(session, message);
        self.machine.evaluate(session, None);

        let reply = match &self.llm {
            Some(driver) => match driver.respond(session, message).await {
                Ok(narrative) => {
                    self.machine.evaluate(session, Some(&narrative));
                    DriverReply { narrative, rich_content: None }
                }
                Err(error) => {
                    warn!(
                        event_name = "agent.llm_fallback",
                        session_id = %session.id,
                        model = driver.model_id(),
                        error_kind = ?error.kind,
                        error = %error,
                        "model unavailable, using rule-based reply"
                    );
                    self.fallback.respond(session, message, year)
                }
            },
            None => self.fallback.respond(session, message, year),
        };

        let rich_content = match reply.rich_content {
            Some(content) => content,
            None => self.assembler.assemble(session, &reply.narrative, year),
        };
        let turn = Turn::assistant(reply.narrative.clone(), Some(rich_content.clone()), now);
        session.push_turn(turn);

        info!(
            event_name = "agent.turn_completed",
            session_id = %session.id,
            phase = session.phase.as_str(),
            rich_content = rich_content.kind(),
            "turn completed"
        );

        TurnResult {
            narrative: reply.narrative,
            rich_content,
            phase: session.phase,
            slots: session.slots.clone(),
        }
    }

    fn apology(
        &self,
        id: &SessionId,
        error: RepositoryError,
        phase: Phase,
        slots: CollectedSlots,
    ) -> TurnResult {
        error!(
            event_name = "agent.turn_failed",
            session_id = %id,
            error = %error,
            "session store failed during turn"
        );
        let interface = persistence(error).into_interface(id.as_str());
        TurnResult {
            narrative: interface.user_message().to_string(),
            rich_content: RichContent::Text,
            phase,
            slots,
        }
    }
}

fn persistence(error: RepositoryError) -> ApplicationError {
    ApplicationError::Persistence(error.to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use tripgenie_core::domain::rich_content::RichContent;
    use tripgenie_core::domain::session::{Session, SessionId, TurnRole};
    use tripgenie_core::flows::Phase;
    use tripgenie_core::planning::StaticCatalog;
    use tripgenie_db::{InMemorySessionRepository, RepositoryError, SessionRepository};

    use super::{AgentRuntime, FixedClock, RuntimeSettings, WELCOME};

    struct BrokenStore;

    #[async_trait]
    impl SessionRepository for BrokenStore {
        async fn find_by_id(&self, _id: &SessionId) -> Result<Option<Session>, RepositoryError> {
            Err(RepositoryError::Decode("corrupt document".to_string()))
        }

        async fn save(&self, _session: Session) -> Result<(), RepositoryError> {
            Err(RepositoryError::Decode("disk full".to_string()))
        }
    }

    fn runtime(store: Arc<dyn SessionRepository>) -> AgentRuntime {
        let catalog = Arc::new(StaticCatalog::bundled().expect("bundled catalog"));
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).single().expect("timestamp");
        AgentRuntime::new(catalog, store, None, RuntimeSettings::default())
            .with_clock(Arc::new(FixedClock(now)))
    }

    #[tokio::test]
    async fn created_session_starts_with_welcome_turn() {
        let store = Arc::new(InMemorySessionRepository::default());
        let runtime = runtime(store.clone());

        let start = runtime.create_session().await.expect("create");

        assert_eq!(start.welcome.text, WELCOME);
        assert_eq!(start.welcome.rich_content, Some(RichContent::Welcome));
        let stored = store.find_by_id(&start.session_id).await.expect("load").expect("saved");
        assert_eq!(stored.phase, Phase::Idle);
        assert_eq!(stored.turns.len(), 1);
    }

    #[tokio::test]
    async fn unknown_session_id_starts_fresh_and_is_saved() {
        let store = Arc::new(InMemorySessionRepository::default());
        let runtime = runtime(store.clone());
        let id = SessionId("fresh".to_string());

        let result = runtime.handle_message(&id, "Hi").await;

        assert_eq!(result.phase, Phase::CollectRequirements);
        let stored = store.find_by_id(&id).await.expect("load").expect("saved");
        assert_eq!(stored.turns.len(), 2);
        assert_eq!(stored.turns[0].role, TurnRole::User);
        assert_eq!(stored.turns[1].role, TurnRole::Assistant);
    }

    #[tokio::test]
    async fn store_failure_becomes_an_apology() {
        let runtime = runtime(Arc::new(BrokenStore));

        let result = runtime.handle_message(&SessionId("broken".to_string()), "Hi").await;

        assert_eq!(
            result.narrative,
            "Sorry, I'm having trouble right now. Please try again in a moment."
        );
        assert_eq!(result.rich_content, RichContent::Text);
        assert!(runtime.create_session().await.is_err());
    }

    #[tokio::test]
    async fn reset_returns_session_to_idle() {
        let store = Arc::new(InMemorySessionRepository::default());
        let runtime = runtime(store.clone());
        let id = SessionId("reset".to_string());
        runtime.handle_message(&id, "15k from Pune").await;

        assert!(runtime.reset_session(&id).await.expect("reset"));
        assert!(!runtime.reset_session(&SessionId("missing".to_string())).await.expect("reset"));

        let stored = store.find_by_id(&id).await.expect("load").expect("saved");
        assert_eq!(stored.phase, Phase::Idle);
        assert_eq!(stored.slots.budget, None);
        assert_eq!(stored.turns.len(), 2);
    }
}
