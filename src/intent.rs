//! Chat message intent classification.
//!
//! Plain keyword matching: the first rule whose keyword appears anywhere in
//! the lowercased message decides the outcome. No stemming, no negation, no
//! multi-intent handling, and conversation history is never consulted.

use crate::models::{IntentResult, NextAction, QuickAction};

/// Messages scoring at or above this get the booking quick actions.
pub const HOT_QUICK_ACTION_THRESHOLD: i32 = 70;

struct IntentRule {
    keywords: &'static [&'static str],
    lead_score: i32,
    is_hot_lead: bool,
    next_action: NextAction,
}

/// Evaluated in order; first match wins.
const RULES: &[IntentRule] = &[
    IntentRule {
        keywords: &["estimate", "quote", "price"],
        lead_score: 85,
        is_hot_lead: true,
        next_action: NextAction::ScheduleEstimate,
    },
    IntentRule {
        keywords: &["emergency", "urgent", "leak"],
        lead_score: 95,
        is_hot_lead: true,
        next_action: NextAction::EmergencyResponse,
    },
    IntentRule {
        keywords: &["schedule", "appointment", "inspection"],
        lead_score: 75,
        is_hot_lead: true,
        next_action: NextAction::ScheduleInspection,
    },
    IntentRule {
        keywords: &["material", "shingle", "warranty"],
        lead_score: 45,
        is_hot_lead: false,
        next_action: NextAction::ProvideInfo,
    },
];

const DEFAULT_LEAD_SCORE: i32 = 25;

/// Classifies a single chat message.
pub fn classify_message(message: &str) -> IntentResult {
    let normalized = message.to_lowercase();

    let (lead_score, is_hot_lead, next_action) = RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|kw| normalized.contains(kw)))
        .map(|rule| (rule.lead_score, rule.is_hot_lead, rule.next_action))
        .unwrap_or((DEFAULT_LEAD_SCORE, false, NextAction::ContinueConversation));

    IntentResult {
        lead_score,
        is_hot_lead,
        next_action,
        quick_actions: quick_actions_for(lead_score),
    }
}

/// Quick-action buttons for a given message score.
pub fn quick_actions_for(lead_score: i32) -> Vec<QuickAction> {
    if lead_score >= HOT_QUICK_ACTION_THRESHOLD {
        vec![
            quick_action(
                "schedule",
                "Schedule Free Inspection",
                "schedule",
                "schedule_inspection",
            ),
            quick_action("estimate", "Get Estimate", "estimate", "get_estimate"),
        ]
    } else {
        vec![
            quick_action(
                "services",
                "Our Services",
                "message",
                "Tell me about your roofing services",
            ),
            quick_action(
                "materials",
                "Roofing Materials",
                "message",
                "What roofing materials do you offer?",
            ),
            quick_action(
                "inspection",
                "Free Inspection",
                "schedule",
                "schedule_inspection",
            ),
        ]
    }
}

fn quick_action(id: &str, label: &str, action: &str, value: &str) -> QuickAction {
    QuickAction {
        id: id.to_string(),
        label: label.to_string(),
        action: action.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emergency_leak_message() {
        let result = classify_message("I need an emergency repair, my roof is leaking");
        assert_eq!(result.lead_score, 95);
        assert!(result.is_hot_lead);
        assert_eq!(result.next_action, NextAction::EmergencyResponse);
    }

    #[test]
    fn test_empty_message_continues_conversation() {
        let result = classify_message("");
        assert_eq!(result.lead_score, 25);
        assert!(!result.is_hot_lead);
        assert_eq!(result.next_action, NextAction::ContinueConversation);
        assert_eq!(result.quick_actions.len(), 3);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let result = classify_message("EMERGENCY!!");
        assert_eq!(result.next_action, NextAction::EmergencyResponse);
    }

    #[test]
    fn test_first_rule_wins_over_later_rules() {
        // "quote" (rule 1) beats "leak" (rule 2) and "shingle" (rule 4).
        let result = classify_message("Can I get a quote for shingle work on my leak?");
        assert_eq!(result.lead_score, 85);
        assert_eq!(result.next_action, NextAction::ScheduleEstimate);
    }

    #[test]
    fn test_info_request_is_not_hot() {
        let result = classify_message("What warranty do you offer?");
        assert_eq!(result.lead_score, 45);
        assert!(!result.is_hot_lead);
        assert_eq!(result.next_action, NextAction::ProvideInfo);
    }

    #[test]
    fn test_inspection_request() {
        let result = classify_message("Could you book an appointment next week");
        assert_eq!(result.lead_score, 75);
        assert_eq!(result.next_action, NextAction::ScheduleInspection);
        assert_eq!(result.quick_actions.len(), 2);
    }

    #[test]
    fn test_quick_action_threshold() {
        let hot = quick_actions_for(70);
        assert_eq!(hot.len(), 2);
        assert_eq!(hot[0].id, "schedule");
        assert_eq!(hot[1].id, "estimate");

        let cold = quick_actions_for(69);
        let ids: Vec<&str> = cold.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["services", "materials", "inspection"]);
    }
}
