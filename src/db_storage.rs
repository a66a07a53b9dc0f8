use crate::errors::{AppError, ResultExt};
use crate::models::{
    ChatMessageRecord, Lead, LeadInput, LeadScore, NextAction, Priority, ScoringModel,
};
use sqlx::PgPool;
use uuid::Uuid;

const LEAD_COLUMNS: &str = r#"
    id, email, phone, address, first_name, last_name, property_type, project_type,
    timeline, budget_range, session_id, urgency_level, source, utm_source, utm_medium,
    utm_campaign, utm_term, utm_content, message, lead_score, priority, scoring_model,
    status, notification_status, notification_error, created_at, notified_at
"#;

/// Notification state of a stored lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationStatus {
    Pending,
    Sent,
    Failed,
    /// No workflow webhook configured.
    Skipped,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationStatus::Pending => "pending",
            NotificationStatus::Sent => "sent",
            NotificationStatus::Failed => "failed",
            NotificationStatus::Skipped => "skipped",
        }
    }
}

/// Postgres storage for leads and chat transcripts
#[derive(Clone)]
pub struct LeadStorage {
    pool: PgPool,
}

impl LeadStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a scored lead and return its id
    pub async fn insert_lead(
        &self,
        input: &LeadInput,
        score: &LeadScore,
        model: ScoringModel,
        notification: NotificationStatus,
    ) -> Result<Uuid, AppError> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO leads (
                id, email, phone, address, first_name, last_name, property_type,
                project_type, timeline, budget_range, session_id, urgency_level, source,
                utm_source, utm_medium, utm_campaign, utm_term, utm_content, message,
                lead_score, priority, scoring_model, status, notification_status, created_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                $14, $15, $16, $17, $18, $19, $20, $21, $22, 'new', $23, now()
            )
            "#,
        )
        .bind(id)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.property_type)
        .bind(&input.project_type)
        .bind(&input.timeline)
        .bind(&input.budget_range)
        .bind(&input.session_id)
        .bind(input.urgency_level)
        .bind(&input.source)
        .bind(&input.utm_source)
        .bind(&input.utm_medium)
        .bind(&input.utm_campaign)
        .bind(&input.utm_term)
        .bind(&input.utm_content)
        .bind(&input.message)
        .bind(score.score)
        .bind(score.priority.as_str())
        .bind(model.as_str())
        .bind(notification.as_str())
        .execute(&self.pool)
        .await
        .context("Failed to insert lead")?;

        tracing::info!(
            "✓ Stored lead {} (score={}, priority={}, model={})",
            id,
            score.score,
            score.priority,
            model
        );
        Ok(id)
    }

    pub async fn find_lead(&self, id: Uuid) -> Result<Option<Lead>, AppError> {
        let query = format!("SELECT {} FROM leads WHERE id = $1", LEAD_COLUMNS);
        let lead = sqlx::query_as::<_, Lead>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(lead)
    }

    /// Newest leads first, optionally filtered by priority
    pub async fn list_leads(
        &self,
        priority: Option<Priority>,
        limit: i64,
    ) -> Result<Vec<Lead>, AppError> {
        let query = format!(
            "SELECT {} FROM leads WHERE ($1::text IS NULL OR priority = $1) ORDER BY created_at DESC LIMIT $2",
            LEAD_COLUMNS
        );
        let leads = sqlx::query_as::<_, Lead>(&query)
            .bind(priority.map(|p| p.as_str()))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(leads)
    }

    /// Every stored lead, oldest first
    pub async fn all_leads(&self) -> Result<Vec<Lead>, AppError> {
        let query = format!("SELECT {} FROM leads ORDER BY created_at ASC", LEAD_COLUMNS);
        let leads = sqlx::query_as::<_, Lead>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(leads)
    }

    pub async fn update_score(&self, id: Uuid, score: &LeadScore) -> Result<(), AppError> {
        sqlx::query("UPDATE leads SET lead_score = $2, priority = $3 WHERE id = $1")
            .bind(id)
            .bind(score.score)
            .bind(score.priority.as_str())
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to update score for lead {}", id))?;
        Ok(())
    }

    /// Mark lead notification as sent (only from pending)
    pub async fn mark_notification_sent(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE leads
            SET notification_status = 'sent', notified_at = now(), notification_error = NULL
            WHERE id = $1 AND notification_status = 'pending'
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            tracing::warn!("No pending lead found to mark as notified: id={}", id);
        }

        Ok(())
    }

    /// Mark lead notification as failed (only from pending)
    pub async fn mark_notification_failed(
        &self,
        id: Uuid,
        error_message: &str,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE leads
            SET notification_status = 'failed', notification_error = $2
            WHERE id = $1 AND notification_status = 'pending'
            "#,
        )
        .bind(id)
        .bind(error_message)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            tracing::warn!("No pending lead found to mark as failed: id={}", id);
        }

        Ok(())
    }

    /// Append one line to a chat transcript
    pub async fn store_chat_message(
        &self,
        session_id: &str,
        role: &str,
        content: &str,
        lead_score: Option<i32>,
        next_action: Option<NextAction>,
    ) -> Result<Uuid, AppError> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO chat_messages (id, session_id, role, content, lead_score, next_action, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, now())
            "#,
        )
        .bind(id)
        .bind(session_id)
        .bind(role)
        .bind(content)
        .bind(lead_score)
        .bind(next_action.map(|a| a.as_str()))
        .execute(&self.pool)
        .await
        .context("Failed to store chat message")?;

        tracing::debug!("Stored {} message for session {}", role, session_id);
        Ok(id)
    }

    /// Most recent `limit` transcript lines for a session, oldest first
    pub async fn session_transcript(
        &self,
        session_id: &str,
        limit: i64,
    ) -> Result<Vec<ChatMessageRecord>, AppError> {
        let mut messages = sqlx::query_as::<_, ChatMessageRecord>(
            r#"
            SELECT id, session_id, role, content, lead_score, next_action, created_at
            FROM chat_messages
            WHERE session_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(session_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        messages.reverse();
        Ok(messages)
    }
}
