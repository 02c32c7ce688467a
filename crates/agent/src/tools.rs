use std::sync::Arc;

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{info, warn};
use tripgenie_core::domain::session::Session;
use tripgenie_core::planning::{
    booking_links, build_budget_breakdown, local_links, travel_links, validate_budget,
    BreakdownRequest, DestinationCatalog, DestinationFilter, HotelSearch,
};

use crate::llm::{ToolInvocation, ToolResult, ToolSpec};

pub const VALIDATE_BUDGET: &str = "validate_budget";
pub const LIST_DESTINATIONS: &str = "list_destinations";
pub const DESTINATION_DETAILS: &str = "destination_details";
pub const BUILD_BUDGET_BREAKDOWN: &str = "build_budget_breakdown";
pub const GENERATE_BOOKING_LINKS: &str = "generate_booking_links";
pub const GENERATE_TRAVEL_LINKS: &str = "generate_travel_links";
pub const GENERATE_LOCAL_LINKS: &str = "generate_local_links";

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: &'static str, message: String },
    #[error("unknown destination `{0}`")]
    UnknownDestination(String),
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("failed to serialize tool result: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateBudgetArgs {
    #[serde(deserialize_with = "whole_u32")]
    pub budget: u32,
    #[serde(deserialize_with = "whole_u32")]
    pub days: u32,
    #[serde(deserialize_with = "whole_u32")]
    pub people: u32,
    #[serde(default)]
    pub origin: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDestinationsArgs {
    pub origin: String,
    #[serde(default = "default_month")]
    pub month: String,
    #[serde(default)]
    pub budget_tier: Option<String>,
    #[serde(default)]
    pub preference: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationDetailsArgs {
    pub destination_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildBudgetBreakdownArgs {
    pub destination: String,
    pub origin: String,
    #[serde(deserialize_with = "whole_u32")]
    pub days: u32,
    #[serde(deserialize_with = "whole_u32")]
    pub people: u32,
    #[serde(deserialize_with = "whole_u32")]
    pub budget: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBookingLinksArgs {
    pub city: String,
    pub checkin: String,
    pub checkout: String,
    #[serde(deserialize_with = "whole_i64")]
    pub max_price_per_night: i64,
    #[serde(default = "one", deserialize_with = "whole_u32")]
    pub people: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct GenerateTravelLinksArgs {
    pub from: String,
    pub to: String,
    pub date: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct GenerateLocalLinksArgs {
    pub city: String,
}

fn default_month() -> String {
    "Feb".to_string()
}

fn one() -> u32 {
    1
}

fn round_finite(value: f64) -> Option<i64> {
    value.is_finite().then(|| value.round() as i64)
}

/// Models often send integers as `20000.0` or `"20,000"`.
fn whole_number(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => {
            number.as_i64().or_else(|| number.as_f64().and_then(round_finite))
        }
        Value::String(text) => {
            text.trim().replace(',', "").parse::<f64>().ok().and_then(round_finite)
        }
        _ => None,
    }
}

fn whole_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    whole_number(&value)
        .and_then(|number| u32::try_from(number).ok())
        .ok_or_else(|| {
            D::Error::custom(format!("expected a non-negative whole number, got {value}"))
        })
}

fn whole_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    whole_number(&value)
        .ok_or_else(|| D::Error::custom(format!("expected a whole number, got {value}")))
}

/// Every tool the planner exposes to the model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ToolCall {
    ValidateBudget(ValidateBudgetArgs),
    ListDestinations(ListDestinationsArgs),
    DestinationDetails(DestinationDetailsArgs),
    BuildBudgetBreakdown(BuildBudgetBreakdownArgs),
    GenerateBookingLinks(GenerateBookingLinksArgs),
    GenerateTravelLinks(GenerateTravelLinksArgs),
    GenerateLocalLinks(GenerateLocalLinksArgs),
    Unknown(String),
}

fn parse_args<T: DeserializeOwned>(tool: &'static str, arguments: &Value) -> Result<T, ToolError> {
    let arguments = if arguments.is_null() { json!({}) } else { arguments.clone() };
    serde_json::from_value(arguments)
        .map_err(|error| ToolError::InvalidArguments { tool, message: error.to_string() })
}

impl ToolCall {
    pub fn parse(name: &str, arguments: &Value) -> Result<Self, ToolError> {
        Ok(match name {
            VALIDATE_BUDGET => Self::ValidateBudget(parse_args(VALIDATE_BUDGET, arguments)?),
            LIST_DESTINATIONS => Self::ListDestinations(parse_args(LIST_DESTINATIONS, arguments)?),
            DESTINATION_DETAILS => {
                Self::DestinationDetails(parse_args(DESTINATION_DETAILS, arguments)?)
            }
            BUILD_BUDGET_BREAKDOWN => {
                Self::BuildBudgetBreakdown(parse_args(BUILD_BUDGET_BREAKDOWN, arguments)?)
            }
            GENERATE_BOOKING_LINKS => {
                Self::GenerateBookingLinks(parse_args(GENERATE_BOOKING_LINKS, arguments)?)
            }
            GENERATE_TRAVEL_LINKS => {
                Self::GenerateTravelLinks(parse_args(GENERATE_TRAVEL_LINKS, arguments)?)
            }
            GENERATE_LOCAL_LINKS => {
                Self::GenerateLocalLinks(parse_args(GENERATE_LOCAL_LINKS, arguments)?)
            }
            other => Self::Unknown(other.to_string()),
        })
    }

    pub fn name(&self) -> &str {
        match self {
            Self::ValidateBudget(_) => VALIDATE_BUDGET,
            Self::ListDestinations(_) => LIST_DESTINATIONS,
            Self::DestinationDetails(_) => DESTINATION_DETAILS,
            Self::BuildBudgetBreakdown(_) => BUILD_BUDGET_BREAKDOWN,
            Self::GenerateBookingLinks(_) => GENERATE_BOOKING_LINKS,
            Self::GenerateTravelLinks(_) => GENERATE_TRAVEL_LINKS,
            Self::GenerateLocalLinks(_) => GENERATE_LOCAL_LINKS,
            Self::Unknown(name) => name,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ToolOutcome {
    pub name: String,
    pub result: Value,
    pub is_error: bool,
}

impl ToolOutcome {
    fn failure(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self { name: name.into(), result: json!({ "error": message.into() }), is_error: true }
    }
}

/// Runs tool calls against the catalog and the session caches. Failures are
/// reported to the model as `{"error": ...}` and never abort the turn.
#[derive(Clone)]
pub struct ToolDispatcher {
    catalog: Arc<dyn DestinationCatalog>,
}

impl ToolDispatcher {
    pub fn new(catalog: Arc<dyn DestinationCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Arc<dyn DestinationCatalog> {
        &self.catalog
    }

    /// Parses and runs a model-issued invocation.
    pub fn execute(&self, session: &mut Session, invocation: &ToolInvocation) -> ToolResult {
        let outcome = match ToolCall::parse(&invocation.name, &invocation.arguments) {
            Ok(call) => self.dispatch(session, &call),
            Err(error) => ToolOutcome::failure(&invocation.name, error.to_string()),
        };

        info!(
            event_name = "agent.tool_executed",
            session_id = %session.id,
            tool = %invocation.name,
            is_error = outcome.is_error,
            "tool call executed"
        );

        ToolResult {
            call_id: invocation.id.clone(),
            name: outcome.name,
            content: outcome.result,
            is_error: outcome.is_error,
        }
    }

    pub fn dispatch(&self, session: &mut Session, call: &ToolCall) -> ToolOutcome {
        match self.run(session, call) {
            Ok(result) => ToolOutcome { name: call.name().to_string(), result, is_error: false },
            Err(error) => {
                warn!(
                    event_name = "agent.tool_failed",
                    session_id = %session.id,
                    tool = call.name(),
                    error = %error,
                    "tool call failed"
                );
                ToolOutcome::failure(call.name(), error.to_string())
            }
        }
    }

    fn run(&self, session: &mut Session, call: &ToolCall) -> Result<Value, ToolError> {
        match call {
            ToolCall::ValidateBudget(args) => {
                let validation = validate_budget(args.budget, args.days, args.people);
                session.budget_tier = Some(validation.budget_tier);
                Ok(serde_json::to_value(validation)?)
            }
            ToolCall::ListDestinations(args) => {
                let filter = DestinationFilter::new(&args.origin, &args.month)
                    .with_tier(args.budget_tier.as_deref().and_then(|tier| tier.parse().ok()))
                    .with_preference(args.preference.as_deref().and_then(|kind| kind.parse().ok()));
                Ok(serde_json::to_value(self.catalog.query(&filter))?)
            }
            ToolCall::DestinationDetails(args) => {
                let destination = self
                    .catalog
                    .get_by_name(&args.destination_name)
                    .ok_or_else(|| ToolError::UnknownDestination(args.destination_name.clone()))?;
                Ok(serde_json::to_value(destination)?)
            }
            ToolCall::BuildBudgetBreakdown(args) => {
                let request = BreakdownRequest {
                    destination: args.destination.clone(),
                    origin: args.origin.clone(),
                    days: args.days,
                    people: args.people,
                    budget: args.budget,
                };
                let breakdown = build_budget_breakdown(self.catalog.as_ref(), &request);
                let value = serde_json::to_value(&breakdown)?;
                if breakdown.is_some() {
                    session.budget_breakdown = breakdown;
                }
                Ok(value)
            }
            ToolCall::GenerateBookingLinks(args) => {
                Ok(serde_json::to_value(booking_links(&HotelSearch {
                    city: args.city.clone(),
                    checkin: args.checkin.clone(),
                    checkout: args.checkout.clone(),
                    max_price_per_night: args.max_price_per_night,
                    people: args.people,
                }))?)
            }
            ToolCall::GenerateTravelLinks(args) => {
                Ok(serde_json::to_value(travel_links(&args.from, &args.to, &args.date))?)
            }
            ToolCall::GenerateLocalLinks(args) => {
                Ok(serde_json::to_value(local_links(&args.city))?)
            }
            ToolCall::Unknown(name) => Err(ToolError::UnknownTool(name.clone())),
        }
    }
}

/// JSON schema for each tool, as sent to the model.
pub fn tool_schema() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: VALIDATE_BUDGET.to_string(),
            description: "Analyzes if the budget is realistic for the trip duration and people count."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "budget": { "type": "number", "description": "Total budget in INR" },
                    "days": { "type": "number", "description": "Number of days" },
                    "people": { "type": "number", "description": "Number of travelers" },
                    "origin": { "type": "string", "description": "Origin city" }
                },
                "required": ["budget", "days", "people", "origin"]
            }),
        },
        ToolSpec {
            name: LIST_DESTINATIONS.to_string(),
            description: "Fetches destinations reachable from the origin that fit the budget tier, season and preference, cheapest first."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "budgetTier": {
                        "type": "string",
                        "enum": ["comfortable", "moderate", "budget", "very_tight"],
                        "description": "Tier returned by validate_budget"
                    },
                    "month": { "type": "string", "description": "Travel month (e.g. \"Feb\")" },
                    "origin": { "type": "string", "description": "Starting city" },
                    "preference": {
                        "type": "string",
                        "enum": ["beach", "mountains", "culture", "adventure", "mix"],
                        "description": "Type of trip"
                    }
                },
                "required": ["budgetTier", "month", "origin"]
            }),
        },
        ToolSpec {
            name: DESTINATION_DETAILS.to_string(),
            description: "Gets detailed information about a specific city (costs, highlights, best time)."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "destinationName": { "type": "string", "description": "City name" }
                },
                "required": ["destinationName"]
            }),
        },
        ToolSpec {
            name: BUILD_BUDGET_BREAKDOWN.to_string(),
            description: "Calculates cost estimates for travel, stay, food and local commute."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "destination": { "type": "string", "description": "Destination city" },
                    "origin": { "type": "string", "description": "Origin city" },
                    "days": { "type": "number", "description": "Trip duration in days" },
                    "people": { "type": "number", "description": "Number of travelers" },
                    "budget": { "type": "number", "description": "Total user budget" }
                },
                "required": ["destination", "origin", "days", "people", "budget"]
            }),
        },
        ToolSpec {
            name: GENERATE_BOOKING_LINKS.to_string(),
            description: "Generates hotel search links capped at a nightly price.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "city": { "type": "string" },
                    "checkin": { "type": "string", "description": "YYYY-MM-DD" },
                    "checkout": { "type": "string", "description": "YYYY-MM-DD" },
                    "maxPricePerNight": { "type": "number" },
                    "people": { "type": "number" }
                },
                "required": ["city", "checkin", "checkout", "maxPricePerNight", "people"]
            }),
        },
        ToolSpec {
            name: GENERATE_TRAVEL_LINKS.to_string(),
            description: "Generates search links for flights, trains and buses.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "from": { "type": "string" },
                    "to": { "type": "string" },
                    "date": { "type": "string", "description": "YYYY-MM-DD" }
                },
                "required": ["from", "to", "date"]
            }),
        },
        ToolSpec {
            name: GENERATE_LOCAL_LINKS.to_string(),
            description: "Generates search links for local food, rentals and sightseeing."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "city": { "type": "string" }
                },
                "required": ["city"]
            }),
        },
    ]
}
