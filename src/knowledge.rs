//! Knowledge-base retrieval for the chat assistant.
//!
//! Similarity search runs inside Postgres through the `match_documents`
//! SQL function (pgvector). This module only formats the query embedding,
//! calls the function and turns the matches into prompt context.

use crate::errors::{AppError, ResultExt};
use crate::models::KnowledgeMatch;
use sqlx::PgPool;

/// Maximum characters of retrieved context handed to the model.
pub const MAX_CONTEXT_CHARS: usize = 4000;

#[derive(Clone)]
pub struct KnowledgeBase {
    pool: PgPool,
}

impl KnowledgeBase {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Passages whose cosine similarity exceeds `threshold`, best first.
    pub async fn match_documents(
        &self,
        embedding: &[f32],
        threshold: f32,
        count: i32,
    ) -> Result<Vec<KnowledgeMatch>, AppError> {
        if embedding.is_empty() {
            return Ok(Vec::new());
        }

        let matches = sqlx::query_as::<_, KnowledgeMatch>(
            r#"
            SELECT id::text AS id, content, similarity::float8 AS similarity
            FROM match_documents($1::text::vector, $2::float8, $3::int4)
            "#,
        )
        .bind(to_pgvector_literal(embedding))
        .bind(threshold as f64)
        .bind(count)
        .fetch_all(&self.pool)
        .await
        .context("Knowledge base search failed")?;

        tracing::debug!(
            "Knowledge base returned {} match(es) above {}",
            matches.len(),
            threshold
        );
        Ok(matches)
    }
}

/// Text form pgvector accepts for a vector value, e.g. `[0.1,0.2]`.
pub fn to_pgvector_literal(embedding: &[f32]) -> String {
    let values: Vec<String> = embedding.iter().map(|v| v.to_string()).collect();
    format!("[{}]", values.join(","))
}

/// Joins matches into a context block, truncated at a passage boundary.
pub fn format_context(matches: &[KnowledgeMatch]) -> Option<String> {
    let mut context = String::new();

    for m in matches {
        let passage = m.content.trim();
        if passage.is_empty() {
            continue;
        }
        if context.chars().count() + passage.chars().count() > MAX_CONTEXT_CHARS {
            break;
        }
        if !context.is_empty() {
            context.push_str("\n---\n");
        }
        context.push_str(passage);
    }

    if context.is_empty() {
        None
    } else {
        Some(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passage(content: &str) -> KnowledgeMatch {
        KnowledgeMatch {
            id: "1".to_string(),
            content: content.to_string(),
            similarity: 0.9,
        }
    }

    #[test]
    fn test_pgvector_literal() {
        assert_eq!(to_pgvector_literal(&[0.5, -1.0, 0.25]), "[0.5,-1,0.25]");
        assert_eq!(to_pgvector_literal(&[]), "[]");
    }

    #[test]
    fn test_format_context_joins_passages() {
        let context = format_context(&[
            passage("We install asphalt shingles."),
            passage("  "),
            passage("Inspections are free."),
        ])
        .unwrap();
        assert_eq!(
            context,
            "We install asphalt shingles.\n---\nInspections are free."
        );
    }

    #[test]
    fn test_format_context_respects_limit() {
        let long = "x".repeat(MAX_CONTEXT_CHARS);
        let context = format_context(&[passage("short"), passage(&long)]).unwrap();
        assert_eq!(context, "short");
        assert!(format_context(&[]).is_none());
    }
}
