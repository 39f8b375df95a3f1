//! Reports handlers

use axum::{extract::State, Json};

use crate::compliance::{self, ComplianceSummary};
use crate::middleware::auth::UserContext;
use crate::models::Device;
use crate::{AppResult, AppState};

/// Organization-wide compliance summary for the operator's fleet.
/// Recomputed from the current snapshot on every request; an empty fleet
/// reports zeroed counts and ratios.
pub async fn summary(
    State(state): State<AppState>,
    user: UserContext,
) -> AppResult<Json<ComplianceSummary>> {
    let snapshot = Device::list_by_owner(&state.pool, user.user_id).await?;
    Ok(Json(compliance::summarize(&snapshot)?))
}
