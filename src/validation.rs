/// Contact validation shared by the intake and chat handlers.
///
/// - Email: basic format, fake placeholder patterns, simplified RFC 5322 regex
/// - Phone: parsed with the US region and normalized to E.164
use phonenumber::country::Id as CountryId;
use phonenumber::Mode;
use regex::Regex;
use std::sync::OnceLock;

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(
            r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
        )
        .expect("email regex is valid")
    })
}

/// Validate email address
///
/// Checks for:
/// - Basic email format (contains @ and .)
/// - Fake/placeholder patterns (repeated digits like 9999, 1111)
/// - Minimum length requirements
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 5 || !email.contains('@') || !email.contains('.') {
        return false;
    }

    let fake_patterns = ["999999", "111111", "000000", "123456789"];

    for pattern in &fake_patterns {
        if email.contains(pattern) {
            tracing::warn!(
                "❌ Invalid email detected (fake pattern '{}'): {}",
                pattern,
                email
            );
            return false;
        }
    }

    if !email_regex().is_match(email) {
        tracing::warn!("❌ Invalid email format: {}", email);
        return false;
    }

    true
}

/// Trims and lowercases an email, returning it only if it validates.
pub fn normalize_email(raw: &str) -> Option<String> {
    let email = raw.trim().to_lowercase();
    if is_valid_email(&email) {
        Some(email)
    } else {
        None
    }
}

/// Validate and normalize a US phone number
///
/// Returns: (is_valid, normalized_phone_or_error_msg)
pub fn validate_us_phone(raw: &str) -> (bool, String) {
    if raw.trim().is_empty() || raw.len() < 8 {
        return (false, "Phone too short".to_string());
    }

    match phonenumber::parse(Some(CountryId::US), raw) {
        Ok(number) => {
            if phonenumber::is_valid(&number) {
                let formatted = number.format().mode(Mode::E164).to_string();
                tracing::debug!("✓ Valid US phone: {} → {}", raw, formatted);
                (true, formatted)
            } else {
                tracing::warn!("❌ Invalid US phone number: {}", raw);
                (false, "Invalid US phone number".to_string())
            }
        }
        Err(e) => {
            tracing::warn!("❌ Failed to parse US phone '{}': {:?}", raw, e);
            (false, format!("Parse error: {:?}", e))
        }
    }
}
