use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;

use roofing_leads_api::api::docs::ApiDoc;
use roofing_leads_api::api::handlers::{self, AppState};
use roofing_leads_api::chat::ChatService;
use roofing_leads_api::config::Config;
use roofing_leads_api::data::db::Database;
use roofing_leads_api::data::db_storage::LeadStorage;
use roofing_leads_api::integrations::knowledge::KnowledgeBase;
use roofing_leads_api::integrations::llm_client::ChatModelClient;
use roofing_leads_api::integrations::workflow_client::WorkflowClient;

/// Serves the generated OpenAPI document.
async fn serve_openapi_spec() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// Serves the Swagger UI HTML page pointing at `serve_openapi_spec`.
async fn serve_swagger_ui() -> impl IntoResponse {
    let html = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Roofing Leads API - Swagger UI</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        body { margin: 0; padding: 0; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = function() {
            window.ui = SwaggerUIBundle({
                url: "/api-docs/openapi.json",
                dom_id: '#swagger-ui',
                deepLinking: true,
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout"
            });
        };
    </script>
</body>
</html>
"#;
    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
}

/// Main entry point for the application.
///
/// Initializes tracing, configuration, the database pool, the submission
/// dedup cache, the optional chat-model and workflow clients, then serves
/// the routes behind CORS, body-size and rate limits.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roofing_leads_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    let db = Database::new(&config.database_url).await?;
    tracing::info!("Database connection pool established");

    // Double-submit window: 5 minute TTL, 10k max entries
    let recent_submissions = Cache::builder()
        .time_to_live(Duration::from_secs(300))
        .max_capacity(10_000)
        .build();
    tracing::info!("Submission deduplication cache initialized");

    let llm_client = match config.llm_api_key {
        Some(ref api_key) => match ChatModelClient::new(
            config.llm_base_url.clone(),
            api_key.clone(),
            config.llm_model.clone(),
            config.embedding_model.clone(),
        ) {
            Ok(client) => {
                tracing::info!("✓ Chat model client initialized: {}", client.model());
                Some(client)
            }
            Err(e) => {
                tracing::error!("Failed to initialize chat model client: {}", e);
                None
            }
        },
        None => None,
    };

    let workflow_client = match config.workflow_webhook_url {
        Some(ref url) => {
            match WorkflowClient::new(url.clone(), config.workflow_webhook_secret.clone()) {
                Ok(client) => {
                    tracing::info!("✓ Workflow webhook client initialized");
                    Some(client)
                }
                Err(e) => {
                    tracing::error!("Failed to initialize workflow client: {}", e);
                    None
                }
            }
        }
        None => None,
    };

    let chat_service = Arc::new(ChatService::new(
        llm_client,
        Some(KnowledgeBase::new(db.pool.clone())),
        config.business_name.clone(),
        config.knowledge_match_threshold,
        config.knowledge_match_count,
    ));

    let app_state = Arc::new(AppState {
        config: config.clone(),
        storage: LeadStorage::new(db.pool.clone()),
        chat: chat_service,
        workflow_client,
        recent_submissions,
    });

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?,
    );

    let protected_routes = Router::new()
        // API Documentation
        .route("/docs", get(serve_swagger_ui))
        .route("/api-docs/openapi.json", get(serve_openapi_spec))
        // Lead intake
        .route(
            "/api/v1/leads",
            post(handlers::capture_lead).get(handlers::list_leads),
        )
        .route("/api/v1/leads/qualify", post(handlers::qualify_lead))
        .route("/api/v1/leads/score", post(handlers::score_preview))
        .route("/api/v1/leads/:id", get(handlers::get_lead))
        // Chat assistant
        .route("/api/v1/chat", post(handlers::chat))
        .layer(
            ServiceBuilder::new()
                // Forms and chat messages are small
                .layer(RequestBodyLimitLayer::new(1024 * 1024))
                .layer(GovernorLayer {
                    config: governor_conf,
                }),
        );

    // Health check bypasses rate limiting
    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected_routes)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
