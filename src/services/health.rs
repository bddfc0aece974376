//! Liveness and readiness endpoints, plus a report of the bot's in-memory state.

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::connection::DatabaseManager;
use crate::services::reminder::StartTimeNotifier;
use crate::services::sessions::SessionStore;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub database: DatabaseHealth,
    pub bot: BotHealth,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseHealth {
    pub status: String,
    pub connection_pool_size: u32,
    pub response_time_ms: u64,
}

/// In-memory bot state, lost on restart.
#[derive(Debug, Serialize, Deserialize)]
pub struct BotHealth {
    pub setup_sessions: usize,
    pub pending_reminders: usize,
}

#[derive(Clone)]
struct HealthState {
    db: Arc<DatabaseManager>,
    sessions: Arc<SessionStore>,
    reminders: StartTimeNotifier,
    started_at: DateTime<Utc>,
}

pub struct HealthService {
    pub router: Router,
}

impl HealthService {
    pub fn new(db: Arc<DatabaseManager>, sessions: Arc<SessionStore>, reminders: StartTimeNotifier) -> Self {
        let state = HealthState { db, sessions, reminders, started_at: Utc::now() };

        let router = Router::new()
            .route("/health", get(health_check))
            .route("/health/ready", get(readiness_check))
            .route("/health/live", get(liveness_check))
            .with_state(state);

        Self { router }
    }
}

async fn health_check(State(state): State<HealthState>) -> Result<Json<HealthResponse>, StatusCode> {
    let probe = Instant::now();
    if let Err(e) = state.db.ping().await {
        tracing::warn!("Health check failed, database unreachable: {}", e);
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    let response_time_ms = probe.elapsed().as_millis() as u64;

    let now = Utc::now();
    let uptime_seconds = now.signed_duration_since(state.started_at).num_seconds().max(0) as u64;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: now,
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: DatabaseHealth {
            status: "healthy".to_string(),
            connection_pool_size: state.db.pool.size(),
            response_time_ms,
        },
        bot: BotHealth {
            setup_sessions: state.sessions.len(),
            pending_reminders: state.reminders.armed_count(),
        },
        uptime_seconds,
    }))
}

async fn readiness_check(State(state): State<HealthState>) -> Result<Json<&'static str>, StatusCode> {
    state
        .db
        .ping()
        .await
        .map(|_| Json("ready"))
        .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)
}

async fn liveness_check() -> Json<&'static str> {
    Json("alive")
}
