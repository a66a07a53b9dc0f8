use crate::circuit_breaker::{create_webhook_circuit_breaker, WebhookCircuitBreaker};
use crate::errors::AppError;
use crate::models::{LeadInput, LeadScore, ScoringModel};
use failsafe::CircuitBreaker;
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

/// Payload posted to the workflow-automation webhook for every new lead.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadNotification {
    pub event: &'static str,
    pub lead_id: Uuid,
    pub lead: LeadInput,
    pub score: i32,
    pub priority: String,
    pub scoring_model: ScoringModel,
}

impl LeadNotification {
    pub fn lead_created(
        lead_id: Uuid,
        lead: LeadInput,
        score: &LeadScore,
        scoring_model: ScoringModel,
    ) -> Self {
        Self {
            event: "lead.created",
            lead_id,
            lead,
            score: score.score,
            priority: score.priority.to_string(),
            scoring_model,
        }
    }
}

/// Client for the workflow-automation webhook (new-lead notifications).
#[derive(Clone)]
pub struct WorkflowClient {
    client: reqwest::Client,
    webhook_url: String,
    secret: Option<String>,
    breaker: WebhookCircuitBreaker,
}

impl WorkflowClient {
    pub fn new(webhook_url: String, secret: Option<String>) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create workflow client: {}", e))
            })?;

        Ok(Self {
            client,
            webhook_url,
            secret,
            breaker: create_webhook_circuit_breaker(),
        })
    }

    /// Posts a lead notification. Fails fast while the breaker is open.
    pub async fn notify_lead(&self, notification: &LeadNotification) -> Result<(), AppError> {
        if !self.breaker.is_call_permitted() {
            tracing::warn!(
                "⚠️  Workflow webhook circuit open, skipping lead {}",
                notification.lead_id
            );
            return Err(AppError::ExternalApiError(
                "Workflow webhook circuit open".to_string(),
            ));
        }

        let outcome = self.post(notification).await;

        // Record the outcome with the breaker
        match self.breaker.call(|| outcome) {
            Ok(()) => Ok(()),
            Err(failsafe::Error::Inner(e)) => Err(e),
            Err(failsafe::Error::Rejected) => Err(AppError::ExternalApiError(
                "Workflow webhook circuit open".to_string(),
            )),
        }
    }

    async fn post(&self, notification: &LeadNotification) -> Result<(), AppError> {
        tracing::info!(
            "Sending lead {} to workflow webhook ({} priority)",
            notification.lead_id,
            notification.priority
        );

        let mut request = self.client.post(&self.webhook_url).json(notification);
        if let Some(ref secret) = self.secret {
            request = request.header("X-Webhook-Secret", secret);
        }

        let response = request.send().await.map_err(|e| {
            AppError::ExternalApiError(format!("Workflow webhook request failed: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Workflow webhook returned {}: {}",
                status, error_text
            )));
        }

        tracing::info!("✅ Workflow webhook accepted lead {}", notification.lead_id);
        Ok(())
    }
}
