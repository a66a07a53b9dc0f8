use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

// ============ Lead Intake Models ============

/// Contact/project form as submitted by the site.
///
/// Every field is optional. An absent field and an empty string are kept
/// distinct here; the scorer treats blank strings as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadInput {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// e.g. "residential", "commercial".
    pub property_type: Option<String>,
    /// e.g. "repair", "partial_replacement", "full_replacement", "commercial".
    pub project_type: Option<String>,
    pub timeline: Option<String>,
    /// e.g. "under_5k", "5k_to_10k", "10k_to_15k", "15k_to_25k", "above_25k".
    pub budget_range: Option<String>,
    pub session_id: Option<String>,
    /// Self-reported urgency, 1 (browsing) to 5 (active leak).
    pub urgency_level: Option<i32>,
    pub source: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,
    /// Free-text notes from the form.
    pub message: Option<String>,
}

/// Priority tier derived from a lead score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("Unknown priority '{}'", other)),
        }
    }
}

/// Which weighting scheme produced a score.
///
/// `Capture` is used for the general intake form, `Qualification` for the
/// form that explicitly asks urgency, budget and project type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ScoringModel {
    #[default]
    Capture,
    Qualification,
}

impl ScoringModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringModel::Capture => "capture",
            ScoringModel::Qualification => "qualification",
        }
    }
}

impl fmt::Display for ScoringModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScoringModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "capture" => Ok(ScoringModel::Capture),
            "qualification" => Ok(ScoringModel::Qualification),
            other => Err(format!("Unknown scoring model '{}'", other)),
        }
    }
}

/// Score and priority for a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LeadScore {
    /// Always within 0..=100.
    pub score: i32,
    pub priority: Priority,
}

/// Query parameters for the score preview endpoint.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ScoreQueryParams {
    /// "capture" (default) or "qualification".
    pub model: Option<ScoringModel>,
}

/// Response for score previews.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResponse {
    pub score: i32,
    pub priority: Priority,
    pub scoring_model: ScoringModel,
}

/// Response for lead capture/qualification.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadIntakeResponse {
    pub success: bool,
    pub lead_id: Uuid,
    pub score: i32,
    pub priority: Priority,
    pub scoring_model: ScoringModel,
    /// True when the same submission was seen within the dedup window.
    pub duplicate: bool,
}

/// Query parameters for listing leads.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeadListParams {
    pub priority: Option<Priority>,
    pub limit: Option<i64>,
}

// ============ Database Models ============

/// A stored lead.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub property_type: Option<String>,
    pub project_type: Option<String>,
    pub timeline: Option<String>,
    pub budget_range: Option<String>,
    pub session_id: Option<String>,
    pub urgency_level: Option<i32>,
    pub source: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,
    pub message: Option<String>,
    pub lead_score: i32,
    pub priority: String,
    pub scoring_model: String,
    pub status: String,
    /// "pending", "sent", "failed" or "skipped".
    pub notification_status: String,
    pub notification_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub notified_at: Option<DateTime<Utc>>,
}

impl Lead {
    /// Rebuilds the form input this lead was created from.
    pub fn to_input(&self) -> LeadInput {
        LeadInput {
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            property_type: self.property_type.clone(),
            project_type: self.project_type.clone(),
            timeline: self.timeline.clone(),
            budget_range: self.budget_range.clone(),
            session_id: self.session_id.clone(),
            urgency_level: self.urgency_level,
            source: self.source.clone(),
            utm_source: self.utm_source.clone(),
            utm_medium: self.utm_medium.clone(),
            utm_campaign: self.utm_campaign.clone(),
            utm_term: self.utm_term.clone(),
            utm_content: self.utm_content.clone(),
            message: self.message.clone(),
        }
    }
}

/// A stored chat transcript line.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ChatMessageRecord {
    pub id: Uuid,
    pub session_id: String,
    pub role: String,
    pub content: String,
    pub lead_score: Option<i32>,
    pub next_action: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ============ Chat Models ============

/// Suggested follow-up for a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NextAction {
    ScheduleEstimate,
    EmergencyResponse,
    ScheduleInspection,
    ProvideInfo,
    ContinueConversation,
}

impl NextAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            NextAction::ScheduleEstimate => "schedule_estimate",
            NextAction::EmergencyResponse => "emergency_response",
            NextAction::ScheduleInspection => "schedule_inspection",
            NextAction::ProvideInfo => "provide_info",
            NextAction::ContinueConversation => "continue_conversation",
        }
    }
}

impl fmt::Display for NextAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canned reply button surfaced to the chat widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct QuickAction {
    pub id: String,
    pub label: String,
    pub action: String,
    pub value: String,
}

/// Outcome of classifying one chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IntentResult {
    pub lead_score: i32,
    pub is_hot_lead: bool,
    pub next_action: NextAction,
    pub quick_actions: Vec<QuickAction>,
}

/// One prior turn of the conversation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatTurn {
    /// "user" or "assistant"; anything else is dropped before the model call.
    pub role: String,
    pub content: String,
}

/// Visitor details the widget may have collected.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UserInfo {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Request body for the chat endpoint.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    pub session_id: Option<String>,
    #[serde(default)]
    pub conversation_history: Vec<ChatTurn>,
    pub user_info: Option<UserInfo>,
}

/// Response body for the chat endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub message: String,
    pub lead_score: i32,
    pub is_hot_lead: bool,
    pub next_action: NextAction,
    pub quick_actions: Vec<QuickAction>,
    pub session_id: Option<String>,
    /// False when the canned fallback reply was used.
    pub ai_generated: bool,
    /// Set when a hot chat lead was captured.
    pub lead_id: Option<Uuid>,
}

// ============ Knowledge Base ============

/// A knowledge-base passage returned by the similarity search.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct KnowledgeMatch {
    pub id: String,
    pub content: String,
    pub similarity: f64,
}
