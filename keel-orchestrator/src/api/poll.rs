//! Poll API Handlers
//!
//! Read-only view of the poll schedule.

use axum::{
    Json,
    extract::{Path, State},
};
use keel_core::domain::poll::TargetKind;
use keel_core::dto::poll::PollPeek;

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::repository::schedule_repository;

/// GET /poll/{kind}/peek
/// Soonest due target of a kind
pub async fn peek(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> ApiResult<Json<PollPeek>> {
    let kind: TargetKind = kind.parse().map_err(ApiError::BadRequest)?;

    let peeked = schedule_repository::peek_soonest(&state.pool, kind).await?;

    Ok(Json(PollPeek::from(peeked)))
}
