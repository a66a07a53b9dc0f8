//! Recomputes stored lead scores after a weighting change.
//!
//! Usage: `rescore_leads [--dry-run]`

use dotenvy::dotenv;
use roofing_leads_api::config::database_url_from_env;
use roofing_leads_api::db::Database;
use roofing_leads_api::db_storage::LeadStorage;
use roofing_leads_api::models::ScoringModel;
use roofing_leads_api::scoring::score_lead;
use std::env;

/// Main entry point for the rescoring script.
///
/// Scores every lead again with the model it was captured under and
/// updates rows whose score or priority changed.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let dry_run = env::args().any(|arg| arg == "--dry-run");

    let database_url = database_url_from_env()?;
    let db = Database::new(&database_url).await?;
    let storage = LeadStorage::new(db.pool.clone());

    let leads = storage
        .all_leads()
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    tracing::info!("Loaded {} leads (dry_run={})", leads.len(), dry_run);

    let mut changed = 0;
    let mut skipped = 0;

    for lead in &leads {
        let model = match lead.scoring_model.parse::<ScoringModel>() {
            Ok(model) => model,
            Err(e) => {
                tracing::warn!("Skipping lead {}: {}", lead.id, e);
                skipped += 1;
                continue;
            }
        };

        let result = score_lead(&lead.to_input(), model);
        if result.score == lead.lead_score && result.priority.as_str() == lead.priority {
            continue;
        }

        tracing::info!(
            "Lead {}: {} ({}) -> {} ({})",
            lead.id,
            lead.lead_score,
            lead.priority,
            result.score,
            result.priority
        );
        changed += 1;

        if !dry_run {
            storage
                .update_score(lead.id, &result)
                .await
                .map_err(|e| anyhow::anyhow!(e.to_string()))?;
        }
    }

    tracing::info!(
        "Rescoring complete. {} changed, {} skipped{}.",
        changed,
        skipped,
        if dry_run { " (dry run, nothing written)" } else { "" }
    );

    Ok(())
}
