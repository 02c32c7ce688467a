use serde::{Deserialize, Serialize};

use crate::domain::destination::DestinationSummary;
use crate::domain::plan::{BudgetBreakdown, PlanLinks};

/// Structured payload rendered next to an assistant reply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RichContent {
    Text,
    Welcome,
    Destinations {
        destinations: Vec<DestinationSummary>,
    },
    #[serde(rename_all = "camelCase")]
    BudgetBreakdown {
        budget_breakdown: BudgetBreakdown,
    },
    #[serde(rename_all = "camelCase")]
    FullPlan {
        budget_breakdown: Option<BudgetBreakdown>,
        links: PlanLinks,
    },
}

impl RichContent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Welcome => "welcome",
            Self::Destinations { .. } => "destinations",
            Self::BudgetBreakdown { .. } => "budgetBreakdown",
            Self::FullPlan { .. } => "fullPlan",
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::RichContent;
    use crate::domain::plan::BudgetBreakdown;

    #[test]
    fn payloads_carry_camel_case_type_tag() {
        let text = serde_json::to_value(RichContent::Text).expect("serialize text");
        assert_eq!(text, json!({ "type": "text" }));

        let breakdown = RichContent::BudgetBreakdown {
            budget_breakdown: BudgetBreakdown {
                travel: 1,
                stay: 2,
                food: 3,
                commute: 4,
                buffer: 0,
                total: 10,
                max_stay_per_night: 2,
                within_budget: true,
                transport_note: "Multi-leg travel needed".to_string(),
            },
        };
        let value = serde_json::to_value(&breakdown).expect("serialize breakdown");
        assert_eq!(value["type"], "budgetBreakdown");
        assert_eq!(value["budgetBreakdown"]["maxStayPerNight"], 2);
        assert_eq!(breakdown.kind(), "budgetBreakdown");
    }
}
