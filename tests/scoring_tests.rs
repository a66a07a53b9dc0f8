#[cfg(test)]
mod capture_scoring_tests {
    use roofing_leads_api::models::{LeadInput, Priority, ScoringModel};
    use roofing_leads_api::scoring::score_lead;

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_empty_input_scores_zero() {
        let result = score_lead(&LeadInput::default(), ScoringModel::Capture);
        assert_eq!(result.score, 0);
        assert_eq!(result.priority, Priority::Low);
    }

    #[test]
    fn test_contact_only_stays_low() {
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
    fn test_complete_form_scores_full() {
        let input = LeadInput {
            email: some("jane@example.com"),
            phone: some("+15125550147"),
            address: some("12 Oak St, Austin TX"),
            first_name: some("Jane"),
            last_name: some("Doe"),
            property_type: some("residential"),
            project_type: some("full_replacement"),
            timeline: some("1_3_months"),
            budget_range: some("10k_to_15k"),
            session_id: some("sess-42"),
            ..Default::default()
        };

        let result = score_lead(&input, ScoringModel::Capture);
        assert_eq!(result.score, 100);
        assert_eq!(result.priority, Priority::High);
    }

    #[test]
    fn test_first_name_alone_earns_nothing() {
        let input = LeadInput {
            first_name: some("Jane"),
            ..Default::default()
        };
        assert_eq!(score_lead(&input, ScoringModel::Capture).score, 0);
    }

    #[test]
    fn test_empty_string_is_absent_but_whitespace_is_not() {
        let empty = LeadInput {
            email: some(""),
            phone: some(""),
            ..Default::default()
        };
        assert_eq!(score_lead(&empty, ScoringModel::Capture).score, 0);

        let spaces = LeadInput {
            email: some("   "),
            ..Default::default()
        };
        assert_eq!(score_lead(&spaces, ScoringModel::Capture).score, 15);
    }

    #[test]
    fn test_medium_boundary() {
        // 15 + 15 + 10 + 10 = 50
        let input = LeadInput {
            email: some("jane@example.com"),
            phone: some("+15125550147"),
            project_type: some("repair"),
            timeline: some("asap"),
            ..Default::default()
        };

        let result = score_lead(&input, ScoringModel::Capture);
        assert_eq!(result.score, 50);
        assert_eq!(result.priority, Priority::Medium);
    }
}

#[cfg(test)]
mod qualification_scoring_tests {
    use roofing_leads_api::models::{LeadInput, Priority, ScoringModel};
    use roofing_leads_api::scoring::score_lead;

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_hottest_lead_clamps_to_100() {
        let input = LeadInput {
            urgency_level: Some(4),
            budget_range: some("above_25k"),
            project_type: some("commercial"),
            phone: some("+15125550147"),
            email: some("ops@example.com"),
            address: some("500 Commerce Blvd"),
            ..Default::default()
        };

        let result = score_lead(&input, ScoringModel::Qualification);
        assert_eq!(result.score, 100);
        assert_eq!(result.priority, Priority::High);
    }

    #[test]
    fn test_urgency_tiers_are_exclusive() {
        let score_for = |level: i32| {
            let input = LeadInput {
                urgency_level: Some(level),
                ..Default::default()
            };
            score_lead(&input, ScoringModel::Qualification).score
        };

        assert_eq!(score_for(1), 0);
        assert_eq!(score_for(2), 10);
        assert_eq!(score_for(3), 20);
        assert_eq!(score_for(4), 30);
        assert_eq!(score_for(5), 30);
    }

    #[test]
    fn test_unknown_budget_and_project_earn_nothing() {
        let input = LeadInput {
            budget_range: some("a_lot"),
            project_type: some("gutters"),
            ..Default::default()
        };
        assert_eq!(score_lead(&input, ScoringModel::Qualification).score, 0);
    }

    #[test]
    fn test_mid_range_lead() {
        // 20 + 15 + 10 + 10 = 55
        let input = LeadInput {
            urgency_level: Some(3),
            budget_range: some("5k_to_10k"),
            project_type: some("repair"),
            phone: some("+15125550147"),
            ..Default::default()
        };

        let result = score_lead(&input, ScoringModel::Qualification);
        assert_eq!(result.score, 55);
        assert_eq!(result.priority, Priority::Medium);
    }

    #[test]
    fn test_models_disagree_on_same_input() {
        let input = LeadInput {
            email: some("jane@example.com"),
            session_id: some("sess-1"),
            ..Default::default()
        };

        assert_eq!(score_lead(&input, ScoringModel::Capture).score, 25);
        assert_eq!(score_lead(&input, ScoringModel::Qualification).score, 10);
    }
}

#[cfg(test)]
mod priority_tests {
    use roofing_leads_api::models::Priority;
    use roofing_leads_api::scoring::priority_for;

    #[test]
    fn test_thresholds() {
        assert_eq!(priority_for(0), Priority::Low);
        assert_eq!(priority_for(49), Priority::Low);
        assert_eq!(priority_for(50), Priority::Medium);
        assert_eq!(priority_for(79), Priority::Medium);
        assert_eq!(priority_for(80), Priority::High);
        assert_eq!(priority_for(100), Priority::High);
    }
}
