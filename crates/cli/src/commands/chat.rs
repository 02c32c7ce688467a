use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tripgenie_agent::runtime::{AgentRuntime, TurnResult};
use tripgenie_core::config::{AppConfig, LoadOptions};
use tripgenie_core::domain::plan::BudgetBreakdown;
use tripgenie_core::domain::rich_content::RichContent;
use tripgenie_core::domain::session::SessionId;
use tripgenie_db::{
    connect_with_settings, migrations, InMemorySessionRepository, SessionRepository,
    SqlSessionRepository,
};

use crate::commands::{async_runtime, load_config, CommandResult};

const RESET_REPLY: &str = "Fresh start! Tell me your budget, starting city and dates.";

#[derive(Clone, Debug, Default)]
pub struct ChatOptions {
    pub session: Option<String>,
    pub ephemeral: bool,
}

pub fn run(options: &LoadOptions, chat: ChatOptions) -> CommandResult {
    let config = match load_config("chat", options) {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match async_runtime("chat") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let store = open_store(&config, chat.ephemeral).await?;
        let agent = AgentRuntime::from_config(&config, store)
            .map_err(|error| ("agent_init", error.to_string(), 3u8))?;

        let mut stdout = tokio::io::stdout();
        let session_id = open_session(&agent, chat.session, &mut stdout)
            .await
            .map_err(|error| ("session", format!("{error:#}"), 4u8))?;
        let turns = converse(&agent, &session_id, BufReader::new(tokio::io::stdin()), &mut stdout)
            .await
            .map_err(|error| ("io", format!("{error:#}"), 6u8))?;
        Ok::<_, (&'static str, String, u8)>((session_id, turns))
    });

    match result {
        Ok((session_id, turns)) => CommandResult::success(
            "chat",
            format!("session {session_id} ended after {turns} message(s)"),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("chat", error_class, message, exit_code)
        }
    }
}

async fn open_store(
    config: &AppConfig,
    ephemeral: bool,
) -> Result<Arc<dyn SessionRepository>, (&'static str, String, u8)> {
    if ephemeral {
        return Ok(Arc::new(InMemorySessionRepository::default()));
    }

    let pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
    migrations::run_pending(&pool)
        .await
        .map_err(|error| ("migration", error.to_string(), 5u8))?;
    Ok(Arc::new(SqlSessionRepository::new(pool)))
}

/// Resumes `requested` when it exists. Otherwise starts a session, reusing the
/// requested id if there is one.
async fn open_session<W>(
    agent: &AgentRuntime,
    requested: Option<String>,
    output: &mut W,
) -> Result<SessionId>
where
    W: AsyncWrite + Unpin,
{
    if let Some(id) = requested.map(SessionId) {
        match agent.load_session(&id).await.context("loading session")? {
            Some(session) => {
                let mut banner = format!("Resumed session {id} ({})\n", session.phase);
                if let Some(last) = session.turns.last() {
                    banner.push_str(&format!("{}\n", last.text));
                }
                output.write_all(banner.as_bytes()).await?;
            }
            None => {
                let banner = format!("New session {id}\n{}\n", tripgenie_agent::runtime::WELCOME);
                output.write_all(banner.as_bytes()).await?;
            }
        }
        return Ok(id);
    }

    let start = agent.create_session().await.context("creating session")?;
    let banner = format!("{}\n(session {})\n", start.welcome.text, start.session_id);
    output.write_all(banner.as_bytes()).await?;
    Ok(start.session_id)
}

/// Feeds each input line to the runtime until EOF or `/quit`. Returns the
/// number of messages handled.
pub async fn converse<R, W>(
    agent: &AgentRuntime,
    session_id: &SessionId,
    input: R,
    output: &mut W,
) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut handled = 0;

    output.write_all(b"> ").await?;
    output.flush().await?;
    while let Some(line) = lines.next_line().await.context("reading input")? {
        let message = line.trim();
        match message {
            "" => {}
            "/quit" | "/exit" => break,
            "/reset" => {
                let reply = match agent.reset_session(session_id).await {
                    Ok(_) => RESET_REPLY,
                    Err(error) => error.into_interface(session_id.as_str()).user_message(),
                };
                output.write_all(format!("{reply}\n").as_bytes()).await?;
            }
            _ => {
                let result = agent.handle_message(session_id, message).await;
                handled += 1;
                output.write_all(render_turn(&result).as_bytes()).await?;
            }
        }
        output.write_all(b"> ").await?;
        output.flush().await?;
    }

    output.write_all(b"\n").await?;
    output.flush().await?;
    Ok(handled)
}

pub fn render_turn(result: &TurnResult) -> String {
    let mut rendered = format!("{}\n", result.narrative);
    for line in summarize(&result.rich_content) {
        rendered.push_str(&line);
        rendered.push('\n');
    }
    rendered.push_str(&format!("[{}]\n", result.phase));
    rendered
}

/// Compact terminal rendering of the structured payload.
pub fn summarize(content: &RichContent) -> Vec<String> {
    match content {
        RichContent::Text | RichContent::Welcome => Vec::new(),
        RichContent::Destinations { destinations } => destinations
            .iter()
            .enumerate()
            .map(|(index, destination)| {
                format!(
                    "  {}. {} ({}) ~₹{}/day, {}{}",
                    index + 1,
                    destination.name,
                    destination.state,
                    destination.avg_daily_cost,
                    destination.kind,
                    if destination.reachable { "" } else { ", multi-leg" }
                )
            })
            .collect(),
        RichContent::BudgetBreakdown { budget_breakdown } => vec![breakdown_line(budget_breakdown)],
        RichContent::FullPlan { budget_breakdown, links } => {
            let mut lines: Vec<String> = budget_breakdown.iter().map(breakdown_line).collect();
            lines.push(format!("  stay:   {}", links.booking.booking_com));
            lines.push(format!("  travel: {}", links.travel.red_bus));
            lines.push(format!("  trains: {}", links.travel.irctc));
            lines.push(format!("  food:   {}", links.local.food));
            lines
        }
    }
}

fn breakdown_line(breakdown: &BudgetBreakdown) -> String {
    format!(
        "  budget: travel ₹{}, stay ₹{}, food ₹{}, commute ₹{}, buffer ₹{} of ₹{} ({})",
        breakdown.travel,
        breakdown.stay,
        breakdown.food,
        breakdown.commute,
        breakdown.buffer,
        breakdown.total,
        if breakdown.within_budget { "within budget" } else { "over budget" }
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use tripgenie_agent::runtime::{AgentRuntime, FixedClock, RuntimeSettings};
    use tripgenie_core::domain::session::SessionId;
    use tripgenie_core::planning::StaticCatalog;
    use tripgenie_db::InMemorySessionRepository;

    use super::{converse, RESET_REPLY};

    fn agent() -> AgentRuntime {
        let catalog = Arc::new(StaticCatalog::bundled().expect("bundled catalog"));
        let store = Arc::new(InMemorySessionRepository::default());
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).single().expect("timestamp");
        AgentRuntime::new(catalog, store, None, RuntimeSettings::default())
            .with_clock(Arc::new(FixedClock(now)))
    }

    #[tokio::test]
    async fn conversation_prints_proposals_and_plan() {
        let input: &[u8] =
            b"Hi\n20k budget from Pune, 20-24 Feb, 2 people, mountains\nManali\n/quit\nignored\n";
        let mut output = Vec::new();

        let handled = converse(&agent(), &SessionId("repl".to_string()), input, &mut output)
            .await
            .expect("conversation");

        let transcript = String::from_utf8(output).expect("utf8");
        assert_eq!(handled, 3);
        assert!(transcript.contains("[COLLECT_REQUIREMENTS]"));
        assert!(transcript.contains("[PROPOSE_DESTINATIONS]"));
        assert!(transcript.contains("  1. "));
        assert!(transcript.contains("  budget: travel ₹7200"));
        assert!(transcript.contains("pune-to-manali"));
        assert!(transcript.contains("[BUILD_PLAN]"));
    }

    #[tokio::test]
    async fn reset_command_starts_over() {
        let input: &[u8] = b"15k from Pune\n/reset\n";
        let mut output = Vec::new();
        let agent = agent();
        let id = SessionId("repl-reset".to_string());

        let handled = converse(&agent, &id, input, &mut output).await.expect("conversation");

        let transcript = String::from_utf8(output).expect("utf8");
        assert_eq!(handled, 1);
        assert!(transcript.contains(RESET_REPLY));
        let session = agent.load_session(&id).await.expect("load").expect("saved");
        assert_eq!(session.slots.budget, None);
    }
}
