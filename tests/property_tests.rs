/// Property-based tests using proptest
/// Tests invariants that should hold for all inputs
use proptest::prelude::*;
use roofing_leads_api::handlers::submission_fingerprint;
use roofing_leads_api::intent::classify_message;
use roofing_leads_api::models::{LeadInput, Priority, ScoringModel};
use roofing_leads_api::scoring::{priority_for, score_lead};
use roofing_leads_api::validation::{is_valid_email, validate_us_phone};

fn optional_text() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop_oneof![
        Just("above_25k".to_string()),
        Just("15k_to_25k".to_string()),
        Just("under_5k".to_string()),
        Just("commercial".to_string()),
        Just("full_replacement".to_string()),
        Just("repair".to_string()),
        "[a-z ]{0,12}",
    ])
}

prop_compose! {
    fn lead_input()(
        email in optional_text(),
        phone in optional_text(),
        address in optional_text(),
        first_name in optional_text(),
        last_name in optional_text(),
        property_type in optional_text(),
        project_type in optional_text(),
        timeline in optional_text(),
        budget_range in optional_text(),
        session_id in optional_text(),
        urgency_level in prop::option::of(-3i32..10),
    ) -> LeadInput {
        LeadInput {
            email,
            phone,
            address,
            first_name,
            last_name,
            property_type,
            project_type,
            timeline,
            budget_range,
            session_id,
            urgency_level,
            ..Default::default()
        }
    }
}

fn scoring_model() -> impl Strategy<Value = ScoringModel> {
    prop_oneof![Just(ScoringModel::Capture), Just(ScoringModel::Qualification)]
}

// Property: scores are bounded and priority always matches the score
proptest! {
    #[test]
    fn score_is_within_bounds(input in lead_input(), model in scoring_model()) {
        let result = score_lead(&input, model);
        prop_assert!((0..=100).contains(&result.score));
        prop_assert_eq!(result.priority, priority_for(result.score));
    }

    #[test]
    fn scoring_is_deterministic(input in lead_input(), model in scoring_model()) {
        prop_assert_eq!(score_lead(&input, model), score_lead(&input, model));
    }

    #[test]
    fn filling_a_field_never_lowers_score(
        input in lead_input(),
        model in scoring_model(),
        value in "[a-z]{1,8}",
    ) {
        let before = score_lead(&input, model).score;

        let mut with_phone = input.clone();
        if with_phone.phone.is_none() {
            with_phone.phone = Some(value.clone());
        }
        prop_assert!(score_lead(&with_phone, model).score >= before);

        let mut with_address = input.clone();
        if with_address.address.is_none() {
            with_address.address = Some(value);
        }
        prop_assert!(score_lead(&with_address, model).score >= before);
    }

    #[test]
    fn priority_is_monotonic(a in 0i32..=100, b in 0i32..=100) {
        let rank = |p: Priority| match p {
            Priority::Low => 0,
            Priority::Medium => 1,
            Priority::High => 2,
        };
        if a <= b {
            prop_assert!(rank(priority_for(a)) <= rank(priority_for(b)));
        }
    }
}

// Property: classification never panics and ignores case
proptest! {
    #[test]
    fn classify_never_panics(message in "\\PC*") {
        let result = classify_message(&message);
        prop_assert!(!result.quick_actions.is_empty());
    }

    #[test]
    fn classify_is_case_insensitive(message in "[a-zA-Z ]{0,40}") {
        let lower = classify_message(&message.to_lowercase());
        let upper = classify_message(&message.to_uppercase());
        prop_assert_eq!(lower, upper);
    }

    #[test]
    fn hot_leads_get_booking_actions(message in "\\PC*") {
        let result = classify_message(&message);
        let offers_schedule = result.quick_actions.iter().any(|a| a.id == "schedule");
        prop_assert_eq!(offers_schedule, result.lead_score >= 70);
    }
}

// Property: contact validation never panics
proptest! {
    #[test]
    fn email_validation_never_panics(email in "\\PC*") {
        let _ = is_valid_email(&email);
    }

    #[test]
    fn well_formed_emails_pass(
        local in "[a-z]{1,10}",
        domain in "[a-z]{1,10}",
        tld in "[a-z]{2,4}"
    ) {
        let email = format!("{}@{}.{}", local, domain, tld);
        prop_assert!(is_valid_email(&email));
    }

    #[test]
    fn phone_validation_never_panics(phone in "\\PC*") {
        let _ = validate_us_phone(&phone);
    }

    #[test]
    fn valid_us_phones_normalize_to_e164(
        area in 201u16..=989u16,
        exchange in 200u16..=999u16,
        line in 0u16..=9999u16,
    ) {
        let phone = format!("{}{}{:04}", area, exchange, line);
        let (valid, normalized) = validate_us_phone(&phone);
        if valid {
            prop_assert!(normalized.starts_with("+1"));
            prop_assert_eq!(normalized.len(), 12);
        }
    }

    #[test]
    fn fingerprint_is_stable_hex(input in lead_input(), model in scoring_model()) {
        let first = submission_fingerprint(&input, model);
        prop_assert_eq!(first.len(), 64);
        prop_assert_eq!(first, submission_fingerprint(&input, model));
    }
}
