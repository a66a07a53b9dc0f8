//! Lead scoring.
//!
//! Two weighting schemes exist for the same concept and are kept apart on
//! purpose: the capture form and the qualification form ask different
//! questions, and each call site picks its own model.
//!
//! - **Capture** rewards completeness: contact details, project details and
//!   engagement signals.
//! - **Qualification** rewards sales readiness: urgency, budget and project
//!   size, with a small bonus for reachable contact details.
//!
//! Both return an integer in `0..=100`; the clamp is applied once to the
//! total, never per category.

use crate::models::{LeadInput, LeadScore, Priority, ScoringModel};

/// Upper bound for every score.
pub const MAX_SCORE: i32 = 100;

/// Scores at or above this are `high` priority.
pub const HIGH_PRIORITY_THRESHOLD: i32 = 80;

/// Scores at or above this are `medium` priority.
pub const MEDIUM_PRIORITY_THRESHOLD: i32 = 50;

/// Scores a lead with the given model and derives its priority.
pub fn score_lead(input: &LeadInput, model: ScoringModel) -> LeadScore {
    let score = match model {
        ScoringModel::Capture => capture_score(input),
        ScoringModel::Qualification => qualification_score(input),
    };

    LeadScore {
        score,
        priority: priority_for(score),
    }
}

/// Maps a score to its priority tier.
pub fn priority_for(score: i32) -> Priority {
    if score >= HIGH_PRIORITY_THRESHOLD {
        Priority::High
    } else if score >= MEDIUM_PRIORITY_THRESHOLD {
        Priority::Medium
    } else {
        Priority::Low
    }
}

/// Capture-context score (general intake form).
pub fn capture_score(input: &LeadInput) -> i32 {
    let mut score = 0;

    // Contact completeness (max 30)
    if is_present(&input.email) {
        score += 15;
    }
    if is_present(&input.phone) {
        score += 15;
    }

    // Project detail (max 40)
    if is_present(&input.project_type) {
        score += 10;
    }
    if is_present(&input.address) {
        score += 15;
    }
    if is_present(&input.timeline) {
        score += 10;
    }
    if is_present(&input.budget_range) {
        score += 5;
    }

    // Engagement (max 30)
    if is_present(&input.first_name) && is_present(&input.last_name) {
        score += 10;
    }
    if is_present(&input.property_type) {
        score += 10;
    }
    if is_present(&input.session_id) {
        score += 10;
    }

    score.min(MAX_SCORE)
}

/// Qualification-context score (urgency/budget/project type asked explicitly).
pub fn qualification_score(input: &LeadInput) -> i32 {
    let mut score = urgency_points(input.urgency_level);

    score += input
        .budget_range
        .as_deref()
        .map(budget_points)
        .unwrap_or(0);

    score += input
        .project_type
        .as_deref()
        .map(project_type_points)
        .unwrap_or(0);

    if is_present(&input.phone) {
        score += 10;
    }
    if is_present(&input.email) {
        score += 10;
    }
    if is_present(&input.address) {
        score += 5;
    }

    score.min(MAX_SCORE)
}

/// Tiers are exclusive and checked highest first.
fn urgency_points(urgency_level: Option<i32>) -> i32 {
    match urgency_level {
        Some(level) if level >= 4 => 30,
        Some(level) if level >= 3 => 20,
        Some(level) if level >= 2 => 10,
        _ => 0,
    }
}

fn budget_points(budget_range: &str) -> i32 {
    match budget_range {
        "above_25k" => 30,
        "15k_to_25k" => 25,
        "10k_to_15k" => 20,
        "5k_to_10k" => 15,
        "under_5k" => 5,
        _ => 0,
    }
}

fn project_type_points(project_type: &str) -> i32 {
    match project_type {
        "commercial" => 30,
        "full_replacement" => 25,
        "partial_replacement" => 15,
        "repair" => 10,
        _ => 0,
    }
}

fn is_present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    fn full_capture_input() -> LeadInput {
        LeadInput {
            email: some("jane@example.com"),
            phone: some("+15125550147"),
            address: some("12 Oak St"),
            first_name: some("Jane"),
            last_name: some("Doe"),
            property_type: some("residential"),
            project_type: some("repair"),
            timeline: some("asap"),
            budget_range: some("5k_to_10k"),
            session_id: some("sess-1"),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_input_scores_zero_low() {
        let input = LeadInput::default();
        for model in [ScoringModel::Capture, ScoringModel::Qualification] {
            let result = score_lead(&input, model);
            assert_eq!(result.score, 0);
            assert_eq!(result.priority, Priority::Low);
        }
    }

    #[test]
    fn test_capture_contact_only_is_low() {
        let input = LeadInput {
            email: some("jane@example.com"),
            phone: some("+15125550147"),
            ..Default::default()
        };
        let result = score_lead(&input, ScoringModel::Capture);
        assert_eq!(result.score, 30);
        assert_eq!(result.priority, Priority::Low);
    }

    #[test]
    fn test_capture_all_fields_is_high() {
        let result = score_lead(&full_capture_input(), ScoringModel::Capture);
        assert_eq!(result.score, 100);
        assert_eq!(result.priority, Priority::High);
    }

    #[test]
    fn test_capture_name_requires_both_parts() {
        let first_only = LeadInput {
            first_name: some("Jane"),
            ..Default::default()
        };
        assert_eq!(capture_score(&first_only), 0);

        let both = LeadInput {
            first_name: some("Jane"),
            last_name: some("Doe"),
            ..Default::default()
        };
        assert_eq!(capture_score(&both), 10);
    }

    #[test]
    fn test_empty_strings_contribute_nothing() {
        let input = LeadInput {
            email: some(""),
            phone: some(""),
            address: some(""),
            ..Default::default()
        };
        assert_eq!(capture_score(&input), 0);
        assert_eq!(qualification_score(&input), 0);
    }

    #[test]
    fn test_whitespace_counts_as_present() {
        // Callers trim before scoring; the scorer does not
        let input = LeadInput {
            phone: some("   "),
            budget_range: some(" above_25k "),
            project_type: some("Commercial"),
            ..Default::default()
        };
        // phone 15 + project type 10 + budget 5
        assert_eq!(capture_score(&input), 30);
        // only the phone bonus; keys are matched exactly
        assert_eq!(qualification_score(&input), 10);
    }

    #[test]
    fn test_qualification_maximum_is_clamped() {
        let input = LeadInput {
            urgency_level: Some(4),
            budget_range: some("above_25k"),
            project_type: some("commercial"),
            phone: some("+15125550147"),
            email: some("jane@example.com"),
            address: some("12 Oak St"),
            ..Default::default()
        };
        let result = score_lead(&input, ScoringModel::Qualification);
        assert_eq!(result.score, 100);
        assert_eq!(result.priority, Priority::High);
    }

    #[test]
    fn test_urgency_tiers() {
        assert_eq!(urgency_points(None), 0);
        assert_eq!(urgency_points(Some(1)), 0);
        assert_eq!(urgency_points(Some(2)), 10);
        assert_eq!(urgency_points(Some(3)), 20);
        assert_eq!(urgency_points(Some(4)), 30);
        assert_eq!(urgency_points(Some(5)), 30);
    }

    #[test]
    fn test_unknown_categories_score_zero() {
        assert_eq!(budget_points("unsure"), 0);
        assert_eq!(project_type_points("gutters"), 0);
    }

    #[test]
    fn test_qualification_mid_range() {
        let input = LeadInput {
            urgency_level: Some(3),
            budget_range: some("10k_to_15k"),
            project_type: some("repair"),
            ..Default::default()
        };
        let result = score_lead(&input, ScoringModel::Qualification);
        assert_eq!(result.score, 50);
        assert_eq!(result.priority, Priority::Medium);
    }

    #[test]
    fn test_priority_boundaries() {
        assert_eq!(priority_for(0), Priority::Low);
        assert_eq!(priority_for(49), Priority::Low);
        assert_eq!(priority_for(50), Priority::Medium);
        assert_eq!(priority_for(79), Priority::Medium);
        assert_eq!(priority_for(80), Priority::High);
        assert_eq!(priority_for(100), Priority::High);
    }
}
