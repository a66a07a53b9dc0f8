use failsafe::backoff::{self, Exponential};
use failsafe::failure_policy::{self, ConsecutiveFailures};
use failsafe::{Config, StateMachine};
use std::time::Duration;

/// Consecutive failures before the breaker opens.
pub const FAILURE_THRESHOLD: u32 = 5;

/// Breaker type held by the workflow webhook client.
pub type WebhookCircuitBreaker = StateMachine<ConsecutiveFailures<Exponential>, ()>;

/// Creates a circuit breaker for the workflow-automation webhook.
///
/// # Configuration
///
/// - **Failure threshold**: 5 consecutive failures triggers OPEN state.
/// - **Backoff**: Exponential backoff from 10s to 60s before attempting recovery.
///
/// While OPEN, lead notifications fail fast instead of waiting on the
/// request timeout.
pub fn create_webhook_circuit_breaker() -> WebhookCircuitBreaker {
    let backoff_strategy = backoff::exponential(Duration::from_secs(10), Duration::from_secs(60));

    let failure_policy = failure_policy::consecutive_failures(FAILURE_THRESHOLD, backoff_strategy);

    Config::new().failure_policy(failure_policy).build()
}
