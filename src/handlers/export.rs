//! Agent config export handler
//!
//! Serves the minimal configuration the collecting agent needs, as a file
//! download. Pure plumbing; no evaluation logic.

use axum::{http::header, response::IntoResponse, Json};
use serde::Serialize;
use uuid::Uuid;

use crate::middleware::auth::UserContext;
use crate::AppResult;

#[derive(Debug, Serialize)]
pub struct AgentConfig {
    pub owner_id: Uuid,
}

/// Download `agent-config.json` for the authenticated operator
pub async fn agent_config(user: UserContext) -> AppResult<impl IntoResponse> {
    let config = AgentConfig {
        owner_id: user.user_id,
    };

    Ok((
        [(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"agent-config.json\"",
        )],
        Json(config),
    ))
}
