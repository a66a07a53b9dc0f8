use crate::chat::{ChatService, MAX_HISTORY_TURNS, MAX_MESSAGE_CHARS};
use crate::config::Config;
use crate::db_storage::{LeadStorage, NotificationStatus};
use crate::errors::{AppError, ResultExt};
use crate::models::*;
use crate::scoring::score_lead;
use crate::validation::{normalize_email, validate_us_phone};
use crate::workflow_client::{LeadNotification, WorkflowClient};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use moka::future::Cache;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

/// Default and maximum page sizes for the admin lead listing.
const DEFAULT_LIST_LIMIT: i64 = 50;
const MAX_LIST_LIMIT: i64 = 200;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Lead and chat transcript storage.
    pub storage: LeadStorage,
    /// Chat assistant, built once at startup.
    pub chat: Arc<ChatService>,
    /// Workflow-automation webhook client (optional).
    pub workflow_client: Option<WorkflowClient>,
    /// Submission fingerprint -> stored lead id and score, to absorb double submits.
    pub recent_submissions: Cache<String, (Uuid, LeadScore)>,
}

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "roofing-leads-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// POST /api/v1/leads
///
/// Captures a lead from the general intake form and scores it with the
/// capture model.
#[utoipa::path(
    post,
    path = "/api/v1/leads",
    tag = "leads",
    request_body = LeadInput,
    responses(
        (status = 201, description = "Lead stored", body = LeadIntakeResponse),
        (status = 200, description = "Duplicate submission", body = LeadIntakeResponse),
        (status = 400, description = "No usable contact details")
    )
)]
pub async fn capture_lead(
    State(state): State<Arc<AppState>>,
    Json(input): Json<LeadInput>,
) -> Result<(StatusCode, Json<LeadIntakeResponse>), AppError> {
    tracing::info!("POST /leads - source: {:?}", input.source);
    ingest_lead(&state, input, ScoringModel::Capture).await
}

/// POST /api/v1/leads/qualify
///
/// Stores a lead from the qualification form and scores it with the
/// qualification model.
#[utoipa::path(
    post,
    path = "/api/v1/leads/qualify",
    tag = "leads",
    request_body = LeadInput,
    responses(
        (status = 201, description = "Lead stored", body = LeadIntakeResponse),
        (status = 200, description = "Duplicate submission", body = LeadIntakeResponse),
        (status = 400, description = "No usable contact details or urgency out of range")
    )
)]
pub async fn qualify_lead(
    State(state): State<Arc<AppState>>,
    Json(input): Json<LeadInput>,
) -> Result<(StatusCode, Json<LeadIntakeResponse>), AppError> {
    tracing::info!(
        "POST /leads/qualify - urgency: {:?}, budget: {:?}",
        input.urgency_level,
        input.budget_range
    );
    ingest_lead(&state, input, ScoringModel::Qualification).await
}

/// POST /api/v1/leads/score
///
/// Scores a form without storing anything.
#[utoipa::path(
    post,
    path = "/api/v1/leads/score",
    tag = "leads",
    params(ScoreQueryParams),
    request_body = LeadInput,
    responses((status = 200, description = "Score preview", body = ScoreResponse))
)]
pub async fn score_preview(
    Query(params): Query<ScoreQueryParams>,
    Json(input): Json<LeadInput>,
) -> Result<Json<ScoreResponse>, AppError> {
    let model = params.model.unwrap_or_default();
    let input = normalize_input(input)?;
    let result = score_lead(&input, model);

    tracing::debug!(
        "Score preview: model={}, score={}, priority={}",
        model,
        result.score,
        result.priority
    );

    Ok(Json(ScoreResponse {
        score: result.score,
        priority: result.priority,
        scoring_model: model,
    }))
}

/// GET /api/v1/leads/:id
#[utoipa::path(
    get,
    path = "/api/v1/leads/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Lead id")),
    responses(
        (status = 200, description = "Stored lead", body = Lead),
        (status = 401, description = "Missing or invalid admin token"),
        (status = 404, description = "Lead not found")
    ),
    security(("bearer" = []))
)]
pub async fn get_lead(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Lead>, AppError> {
    authorize_admin(&state.config, &headers)?;
    tracing::info!("GET /leads/{}", id);

    let lead = state
        .storage
        .find_lead(id)
        .await
        .with_context(|| format!("Failed to load lead {}", id))?
        .ok_or_else(|| AppError::NotFound(format!("Lead with id {} not found", id)))?;

    Ok(Json(lead))
}

/// GET /api/v1/leads
#[utoipa::path(
    get,
    path = "/api/v1/leads",
    tag = "admin",
    params(LeadListParams),
    responses(
        (status = 200, description = "Newest leads first", body = [Lead]),
        (status = 401, description = "Missing or invalid admin token")
    ),
    security(("bearer" = []))
)]
pub async fn list_leads(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<LeadListParams>,
) -> Result<Json<Vec<Lead>>, AppError> {
    authorize_admin(&state.config, &headers)?;

    let limit = clamp_limit(params.limit);
    tracing::info!("GET /leads - priority: {:?}, limit: {}", params.priority, limit);

    let leads = state
        .storage
        .list_leads(params.priority, limit)
        .await
        .context("Failed to list leads")?;
    Ok(Json(leads))
}

/// POST /api/v1/chat
///
/// Classifies the message, answers it, stores the transcript and captures
/// hot leads that came with contact details.
#[utoipa::path(
    post,
    path = "/api/v1/chat",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply", body = ChatResponse),
        (status = 400, description = "Empty or oversized message")
    )
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(AppError::BadRequest("Message cannot be empty".to_string()));
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(AppError::BadRequest(format!(
            "Message exceeds {} characters",
            MAX_MESSAGE_CHARS
        )));
    }

    let session_id = request
        .session_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    tracing::info!("POST /chat - session: {:?}", session_id);

    let history = if request.conversation_history.is_empty() {
        match session_id {
            Some(ref sid) => load_session_history(&state.storage, sid).await,
            None => Vec::new(),
        }
    } else {
        request.conversation_history
    };

    let reply = state.chat.respond(message, &history).await;

    if let Some(ref sid) = session_id {
        store_transcript(&state.storage, sid, message, &reply.message, &reply.intent).await;
    }

    let lead_id = if reply.intent.is_hot_lead {
        capture_chat_lead(&state, request.user_info.as_ref(), session_id.as_deref(), message)
            .await
    } else {
        None
    };

    Ok(Json(ChatResponse {
        message: reply.message,
        lead_score: reply.intent.lead_score,
        is_hot_lead: reply.intent.is_hot_lead,
        next_action: reply.intent.next_action,
        quick_actions: reply.intent.quick_actions,
        session_id,
        ai_generated: reply.ai_generated,
        lead_id,
    }))
}

/// Shared intake flow for capture and qualification.
///
/// 1. Normalize and validate contact fields.
/// 2. Absorb duplicates seen within the dedup window.
/// 3. Score with the chosen model.
/// 4. Store, then notify the workflow webhook in the background.
pub async fn ingest_lead(
    state: &Arc<AppState>,
    input: LeadInput,
    model: ScoringModel,
) -> Result<(StatusCode, Json<LeadIntakeResponse>), AppError> {
    let input = normalize_input(input)?;

    if input.email.is_none() && input.phone.is_none() && input.session_id.is_none() {
        return Err(AppError::BadRequest(
            "At least one valid contact required (email, phone, or sessionId)".to_string(),
        ));
    }

    let fingerprint = submission_fingerprint(&input, model);

    // Answer with what was stored, not a rescore of the repeat
    if let Some((existing_id, stored)) = state.recent_submissions.get(&fingerprint).await {
        tracing::warn!("⚠️  Duplicate submission for lead {}", existing_id);
        return Ok((
            StatusCode::OK,
            Json(LeadIntakeResponse {
                success: true,
                lead_id: existing_id,
                score: stored.score,
                priority: stored.priority,
                scoring_model: model,
                duplicate: true,
            }),
        ));
    }

    let result = score_lead(&input, model);

    let notification = if state.workflow_client.is_some() {
        NotificationStatus::Pending
    } else {
        NotificationStatus::Skipped
    };

    let lead_id = state
        .storage
        .insert_lead(&input, &result, model, notification)
        .await?;

    state
        .recent_submissions
        .insert(fingerprint, (lead_id, result))
        .await;

    if let Some(ref client) = state.workflow_client {
        spawn_lead_notification(
            state.storage.clone(),
            client.clone(),
            LeadNotification::lead_created(lead_id, input, &result, model),
        );
    }

    tracing::info!(
        "✅ Lead {} captured (score={}, priority={})",
        lead_id,
        result.score,
        result.priority
    );

    Ok((
        StatusCode::CREATED,
        Json(LeadIntakeResponse {
            success: true,
            lead_id,
            score: result.score,
            priority: result.priority,
            scoring_model: model,
            duplicate: false,
        }),
    ))
}

/// Trims every field, drops blanks and invalid contact details, and checks
/// the urgency range.
pub fn normalize_input(input: LeadInput) -> Result<LeadInput, AppError> {
    if let Some(level) = input.urgency_level {
        if !(1..=5).contains(&level) {
            return Err(AppError::BadRequest(format!(
                "urgencyLevel must be between 1 and 5, got {}",
                level
            )));
        }
    }

    let email = clean(input.email).and_then(|e| {
        let normalized = normalize_email(&e);
        if normalized.is_none() {
            tracing::warn!("❌ Dropping invalid email from lead: {}", e);
        }
        normalized
    });

    let phone = clean(input.phone).and_then(|p| {
        let (valid, normalized) = validate_us_phone(&p);
        if valid {
            Some(normalized)
        } else {
            tracing::warn!("❌ Dropping invalid phone from lead: {}", p);
            None
        }
    });

    Ok(LeadInput {
        email,
        phone,
        address: clean(input.address),
        first_name: clean(input.first_name),
        last_name: clean(input.last_name),
        property_type: clean(input.property_type),
        project_type: clean(input.project_type),
        timeline: clean(input.timeline),
        budget_range: clean(input.budget_range),
        session_id: clean(input.session_id),
        urgency_level: input.urgency_level,
        source: clean(input.source),
        utm_source: clean(input.utm_source),
        utm_medium: clean(input.utm_medium),
        utm_campaign: clean(input.utm_campaign),
        utm_term: clean(input.utm_term),
        utm_content: clean(input.utm_content),
        message: clean(input.message),
    })
}

/// Dedup key for a normalized submission.
pub fn submission_fingerprint(input: &LeadInput, model: ScoringModel) -> String {
    let mut hasher = Sha256::new();
    hasher.update(model.as_str().as_bytes());
    for field in [
        &input.email,
        &input.phone,
        &input.session_id,
        &input.project_type,
    ] {
        hasher.update(b"|");
        hasher.update(field.as_deref().unwrap_or("").trim().to_lowercase().as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Builds a capture-form lead from chat widget details.
pub fn chat_lead_input(
    user_info: &UserInfo,
    session_id: Option<&str>,
    message: &str,
) -> LeadInput {
    let mut names = user_info
        .name
        .as_deref()
        .unwrap_or("")
        .split_whitespace();
    let first_name = names.next().map(str::to_string);
    let rest: Vec<&str> = names.collect();
    let last_name = if rest.is_empty() {
        None
    } else {
        Some(rest.join(" "))
    };

    LeadInput {
        email: user_info.email.clone(),
        phone: user_info.phone.clone(),
        first_name,
        last_name,
        session_id: session_id.map(str::to_string),
        source: Some("chatbot".to_string()),
        message: Some(message.to_string()),
        ..Default::default()
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clamp_limit(limit: Option<i64>) -> i64 {
    limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT)
}

/// Validate the admin bearer token
fn authorize_admin(config: &Config, headers: &HeaderMap) -> Result<(), AppError> {
    let Some(ref expected) = config.admin_api_key else {
        return Err(AppError::Unauthorized(
            "Admin API key not configured".to_string(),
        ));
    };

    let token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

    if !constant_time_compare(token.trim(), expected) {
        return Err(AppError::Unauthorized("Invalid admin token".to_string()));
    }

    Ok(())
}

/// Constant-time string comparison
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.as_bytes()
        .iter()
        .zip(b.as_bytes().iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// Stored transcript as model history, for clients that do not send it.
async fn load_session_history(storage: &LeadStorage, session_id: &str) -> Vec<ChatTurn> {
    match storage
        .session_transcript(session_id, MAX_HISTORY_TURNS as i64)
        .await
    {
        Ok(records) => records
            .into_iter()
            .map(|r| ChatTurn {
                role: r.role,
                content: r.content,
            })
            .collect(),
        Err(e) => {
            tracing::warn!("⚠️  Failed to load transcript for session {}: {}", session_id, e);
            Vec::new()
        }
    }
}

/// Stores both sides of the exchange. Failures are logged only.
async fn store_transcript(
    storage: &LeadStorage,
    session_id: &str,
    user_message: &str,
    reply: &str,
    intent: &IntentResult,
) {
    if let Err(e) = storage
        .store_chat_message(
            session_id,
            "user",
            user_message,
            Some(intent.lead_score),
            Some(intent.next_action),
        )
        .await
    {
        tracing::warn!("⚠️  Failed to store user chat message: {}", e);
        return;
    }

    if let Err(e) = storage
        .store_chat_message(session_id, "assistant", reply, None, None)
        .await
    {
        tracing::warn!("⚠️  Failed to store assistant chat message: {}", e);
    }
}

/// Captures a hot chat lead when the widget supplied an email or phone.
async fn capture_chat_lead(
    state: &Arc<AppState>,
    user_info: Option<&UserInfo>,
    session_id: Option<&str>,
    message: &str,
) -> Option<Uuid> {
    let user_info = user_info?;
    if user_info.email.is_none() && user_info.phone.is_none() {
        return None;
    }

    let input = chat_lead_input(user_info, session_id, message);
    match ingest_lead(state, input, ScoringModel::Capture).await {
        Ok((_, Json(response))) => Some(response.lead_id),
        Err(e) => {
            tracing::warn!("⚠️  Failed to capture hot chat lead: {}", e);
            None
        }
    }
}

/// Spawn background workflow notification (non-blocking)
fn spawn_lead_notification(
    storage: LeadStorage,
    client: WorkflowClient,
    notification: LeadNotification,
) {
    tokio::spawn(async move {
        let lead_id = notification.lead_id;

        match client.notify_lead(&notification).await {
            Ok(()) => {
                if let Err(e) = storage.mark_notification_sent(lead_id).await {
                    tracing::error!("Failed to mark lead {} as notified: {}", lead_id, e);
                }
            }
            Err(e) => {
                tracing::error!("Failed to notify workflow for lead {}: {}", lead_id, e);
                if let Err(e) = storage
                    .mark_notification_failed(lead_id, &e.to_string())
                    .await
                {
                    tracing::error!("Failed to mark lead {} notification failed: {}", lead_id, e);
                }
            }
        }
    });
}
