//! Alert and activity feed handlers

use axum::{extract::{State, Query}, Json};
use chrono::Utc;
use serde::Deserialize;

use crate::compliance::{self, ActivityEntry, ActivityFilter, AlertEntry};
use crate::middleware::auth::UserContext;
use crate::models::Device;
use crate::{AppResult, AppState};

/// Ranked alert feed across the operator's fleet
pub async fn list(
    State(state): State<AppState>,
    user: UserContext,
) -> AppResult<Json<Vec<AlertEntry>>> {
    let snapshot = Device::list_by_owner(&state.pool, user.user_id).await?;
    Ok(Json(compliance::synthesize(&snapshot)?))
}

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub filter: Option<String>,
}

/// Activity log view of the same synthesized issues
pub async fn activity(
    State(state): State<AppState>,
    user: UserContext,
    Query(query): Query<ActivityQuery>,
) -> AppResult<Json<Vec<ActivityEntry>>> {
    let filter = match query.filter.as_deref() {
        Some(value) => value.parse::<ActivityFilter>()?,
        None => ActivityFilter::default(),
    };

    let snapshot = Device::list_by_owner(&state.pool, user.user_id).await?;
    Ok(Json(compliance::activity_feed(&snapshot, Utc::now(), filter)?))
}
