use serde::Deserialize;

pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_BUSINESS_NAME: &str = "Summit Roofing";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Bearer token for the admin lead endpoints. Unset means they always answer 401.
    pub admin_api_key: Option<String>,
    pub workflow_webhook_url: Option<String>,
    pub workflow_webhook_secret: Option<String>,
    /// Unset disables the hosted model; the chat falls back to canned replies.
    pub llm_api_key: Option<String>,
    pub llm_base_url: String,
    pub llm_model: String,
    pub embedding_model: String,
    pub knowledge_match_threshold: f32,
    pub knowledge_match_count: i32,
    pub business_name: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: database_url_from_env()?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            admin_api_key: optional_var("ADMIN_API_KEY"),
            workflow_webhook_url: optional_var("WORKFLOW_WEBHOOK_URL")
                .map(|url| validate_http_url("WORKFLOW_WEBHOOK_URL", url))
                .transpose()?,
            workflow_webhook_secret: optional_var("WORKFLOW_WEBHOOK_SECRET"),
            llm_api_key: optional_var("LLM_API_KEY").or_else(|| optional_var("OPENAI_API_KEY")),
            llm_base_url: optional_var("LLM_BASE_URL")
                .map(|url| validate_http_url("LLM_BASE_URL", url))
                .transpose()?
                .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
            llm_model: optional_var("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            embedding_model: optional_var("EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            knowledge_match_threshold: optional_var("KNOWLEDGE_MATCH_THRESHOLD")
                .map(|v| v.parse::<f32>())
                .transpose()
                .map_err(|_| anyhow::anyhow!("KNOWLEDGE_MATCH_THRESHOLD must be a number"))
                .and_then(|v| {
                    let threshold = v.unwrap_or(0.78);
                    if !(0.0..=1.0).contains(&threshold) {
                        anyhow::bail!("KNOWLEDGE_MATCH_THRESHOLD must be between 0 and 1");
                    }
                    Ok(threshold)
                })?,
            knowledge_match_count: optional_var("KNOWLEDGE_MATCH_COUNT")
                .map(|v| v.parse::<i32>())
                .transpose()
                .map_err(|_| anyhow::anyhow!("KNOWLEDGE_MATCH_COUNT must be an integer"))
                .and_then(|v| {
                    let count = v.unwrap_or(3);
                    if !(1..=20).contains(&count) {
                        anyhow::bail!("KNOWLEDGE_MATCH_COUNT must be between 1 and 20");
                    }
                    Ok(count)
                })?,
            business_name: optional_var("BUSINESS_NAME")
                .unwrap_or_else(|| DEFAULT_BUSINESS_NAME.to_string()),
        };

        // Log successful configuration load (without sensitive values)
        tracing::debug!(
            "Database URL: {}...",
            redacted_prefix(&config.database_url)
        );
        tracing::debug!("Server Port: {}", config.port);
        match config.workflow_webhook_url {
            Some(ref url) => tracing::info!("Workflow webhook configured: {}", url),
            None => tracing::warn!("WORKFLOW_WEBHOOK_URL not set - lead notifications disabled"),
        }
        if config.llm_api_key.is_some() {
            tracing::info!(
                "Chat model configured: {} via {}",
                config.llm_model,
                config.llm_base_url
            );
        } else {
            tracing::warn!("LLM_API_KEY not set - chat will use canned replies");
        }
        if config.admin_api_key.is_none() {
            tracing::warn!("ADMIN_API_KEY not set - admin lead endpoints are locked");
        }

        Ok(config)
    }
}

/// Database URL shared by the server and the maintenance binaries.
///
/// `DB_URL` wins over `DATABASE_URL`.
pub fn database_url_from_env() -> anyhow::Result<String> {
    resolve_database_url(
        std::env::var("DB_URL").ok(),
        std::env::var("DATABASE_URL").ok(),
    )
}

fn resolve_database_url(
    db_url: Option<String>,
    database_url: Option<String>,
) -> anyhow::Result<String> {
    let url = db_url.or(database_url).ok_or_else(|| {
        anyhow::anyhow!("DB_URL or DATABASE_URL environment variable required")
    })?;

    if url.trim().is_empty() {
        anyhow::bail!("DB_URL cannot be empty");
    }
    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
        anyhow::bail!("DB_URL must start with postgresql:// or postgres://");
    }
    Ok(url)
}

/// First 20 characters, for logs.
fn redacted_prefix(value: &str) -> String {
    value.chars().take(20).collect()
}

/// Reads a variable, treating unset and blank the same.
fn optional_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_http_url(name: &str, raw: String) -> anyhow::Result<String> {
    let parsed = url::Url::parse(&raw)
        .map_err(|e| anyhow::anyhow!("{} is not a valid URL: {}", name, e))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        anyhow::bail!("{} must start with http:// or https://", name);
    }
    Ok(raw.trim_end_matches('/').to_string())
}
