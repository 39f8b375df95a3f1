//! Device table handlers

use axum::{extract::{State, Path, Query}, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::compliance::{self, DeviceFilter, Evaluation, SortDirection, SortField};
use crate::middleware::auth::UserContext;
use crate::models::Device;
use crate::{AppError, AppResult, AppState};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub sort: Option<String>,
    pub direction: Option<String>,
    pub filter: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeviceDetail {
    #[serde(flatten)]
    pub device: Device,
    pub issues: Vec<compliance::Issue>,
    pub severity: compliance::Severity,
}

/// Sorted/filtered device table for the operator's fleet.
///
/// Absent parameters fall back to the dashboard defaults (hostname,
/// ascending, all); present-but-unknown values are rejected outright.
pub async fn list(
    State(state): State<AppState>,
    user: UserContext,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Device>>> {
    let sort = match query.sort.as_deref() {
        Some(value) => value.parse::<SortField>()?,
        None => SortField::Hostname,
    };
    let direction = match query.direction.as_deref() {
        Some(value) => value.parse::<SortDirection>()?,
        None => SortDirection::default(),
    };
    let filter = match query.filter.as_deref() {
        Some(value) => value.parse::<DeviceFilter>()?,
        None => DeviceFilter::default(),
    };

    let snapshot = Device::list_by_owner(&state.pool, user.user_id).await?;
    let subset = compliance::filtered(&snapshot, filter)?;
    Ok(Json(compliance::sorted(&subset, sort, direction)))
}

/// Single device with its evaluation
pub async fn get(
    State(state): State<AppState>,
    user: UserContext,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DeviceDetail>> {
    let device = Device::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Device not found".to_string()))?;

    // Verify ownership
    if device.owner_id != user.user_id {
        return Err(AppError::Forbidden);
    }

    let Evaluation { issues, severity } = compliance::evaluate(&device)?;

    Ok(Json(DeviceDetail {
        device,
        issues,
        severity,
    }))
}

/// Delete device
pub async fn delete(
    State(state): State<AppState>,
    user: UserContext,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let deleted = Device::delete(&state.pool, id, user.user_id).await?;

    if !deleted {
        return Err(AppError::NotFound("Device not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}
