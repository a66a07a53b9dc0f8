use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers;
use crate::models::{
    ChatRequest, ChatResponse, ChatTurn, IntentResult, Lead, LeadInput, LeadIntakeResponse,
    LeadScore, NextAction, Priority, QuickAction, ScoreResponse, ScoringModel, UserInfo,
};

/// OpenAPI document for the public and admin routes.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Roofing Leads API",
        description = "Lead capture, scoring and chat assistant for the roofing site"
    ),
    paths(
        handlers::health,
        handlers::capture_lead,
        handlers::qualify_lead,
        handlers::score_preview,
        handlers::list_leads,
        handlers::get_lead,
        handlers::chat,
    ),
    components(schemas(
        LeadInput,
        LeadScore,
        LeadIntakeResponse,
        ScoreResponse,
        ScoringModel,
        Priority,
        Lead,
        ChatRequest,
        ChatResponse,
        ChatTurn,
        UserInfo,
        IntentResult,
        NextAction,
        QuickAction,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "leads", description = "Lead capture and scoring"),
        (name = "chat", description = "Site chat assistant"),
        (name = "admin", description = "Stored lead access"),
        (name = "system", description = "Health")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}
