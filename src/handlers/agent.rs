//! Agent ingest handler
//!
//! The collecting agent posts one telemetry row per run, carrying the
//! operator id it was configured with. Rows upsert by (owner, serial number)
//! so the store always holds the latest snapshot per machine.

use axum::{extract::State, http::HeaderMap, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::models::{AgentReport, Device, User};
use crate::{AppError, AppResult, AppState};

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub device_id: Uuid,
    pub received_at: DateTime<Utc>,
}

/// Ingest one device telemetry row
pub async fn report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<AgentReport>,
) -> AppResult<Json<ReportResponse>> {
    verify_agent_key(&headers, &state.config.agent_key)?;

    // Reject malformed rows before they reach the store; a missing
    // compliance boolean is a contract violation, not a pass
    let record = req.validate()?;

    // The owner id comes from the downloaded agent config; unknown ids are
    // a not-found outcome, not a silent drop
    User::find_by_id(&state.pool, record.owner_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Owner not found".to_string()))?;

    let device = Device::upsert(&state.pool, &record).await?;

    tracing::info!(
        "Telemetry received: {} ({}) for owner {}",
        device.hostname,
        device.id,
        device.owner_id
    );

    Ok(Json(ReportResponse {
        device_id: device.id,
        received_at: device.last_checkin,
    }))
}

/// Compare the presented agent key against the configured one. Both sides are
/// hashed so the raw key never sits in a comparison that could be logged.
fn verify_agent_key(headers: &HeaderMap, expected: &str) -> Result<(), AppError> {
    let presented = headers
        .get("X-Agent-Key")
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    if hash_key(presented) != hash_key(expected) {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

fn hash_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    format!("{:x}", hasher.finalize())
}
