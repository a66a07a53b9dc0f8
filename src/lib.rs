//! Roofing Leads API Library
//!
//! Lead capture and scoring, chat intent classification, and the HTTP
//! service around them.
//!
//! # Modules
//!
//! - `api`: HTTP handlers and API docs.
//! - `core`: Scoring, classification, shared models and errors.
//! - `data`: Data access layer.
//! - `integrations`: External service integrations.
//! - `scoring`: Lead scorer (capture and qualification models).
//! - `intent`: Chat message intent classifier and quick actions.
//! - `chat`: Chat assistant service (classification, retrieval, model reply).
//! - `validation`: Email and US phone validation.
//! - `models`: Request, response and database models.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `db`: Database connection and pool management.
//! - `db_storage`: Lead and transcript storage.
//! - `knowledge`: Knowledge-base similarity search.
//! - `llm_client`: Hosted chat-model client.
//! - `workflow_client`: Workflow-automation webhook client.
//! - `circuit_breaker`: Circuit breaker for outbound webhooks.
//! - `handlers`: HTTP request handlers.
//! - `api_docs`: OpenAPI document.

pub mod api;
pub mod core;
pub mod data;
pub mod integrations;

pub mod api_docs;
pub mod chat;
pub mod circuit_breaker;
pub mod config;
pub mod db;
pub mod db_storage;
pub mod errors;
pub mod handlers;
pub mod intent;
pub mod knowledge;
pub mod llm_client;
pub mod models;
pub mod scoring;
pub mod validation;
pub mod workflow_client;
