//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! Every mutating handler works on a copy of the snapshot under the write
//! lock, persists the copy, and only then swaps it in. A failed write
//! leaves both the file and the in-memory state unchanged.

use super::{
    AppState,
    types::{
        AllocateRequest, AllocateResponse, HealthResponse, PreviewRequest, ResetRequest,
        ResetResponse, ResetSelectionsRequest, ResultsQuery, ResultsResponse, SnapshotResponse,
        StatusResponse,
    },
};
use crate::{audit, store};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use gradtrack_core::{GradTrackError, Snapshot, results};

/// HTTP status for an error surfaced by a handler.
fn error_status(error: &GradTrackError) -> StatusCode {
    match error {
        GradTrackError::DuplicateProjects(_) => StatusCode::CONFLICT,
        GradTrackError::SerializationError(_) | GradTrackError::IoError(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        GradTrackError::DuplicateTeam(_)
        | GradTrackError::EmptyIdentifier(_)
        | GradTrackError::UnknownTeam(_)
        | GradTrackError::InvalidConfig(_)
        | GradTrackError::SnapshotTooLarge { .. }
        | GradTrackError::DeserializationError(_) => StatusCode::BAD_REQUEST,
    }
}

/// Write `snapshot` to the backing file, if the server has one.
fn persist(state: &AppState, snapshot: &Snapshot) -> Result<(), GradTrackError> {
    match &state.snapshot_path {
        Some(path) => store::save_snapshot(snapshot, path),
        None => Ok(()),
    }
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// STATUS HANDLER
// =============================================================================

/// Distribution progress per cohort.
pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.snapshot.read().await;
    (StatusCode::OK, Json(StatusResponse::from_snapshot(&snapshot)))
}

// =============================================================================
// RESULTS HANDLER
// =============================================================================

/// Assigned teams of a cohort with project details.
pub async fn results_handler(
    State(state): State<AppState>,
    Query(query): Query<ResultsQuery>,
) -> impl IntoResponse {
    let snapshot = state.snapshot.read().await;
    let response = ResultsResponse {
        cohort: query.cohort,
        results: results(&snapshot, query.cohort),
    };
    (StatusCode::OK, Json(response))
}

// =============================================================================
// ALLOCATE HANDLERS
// =============================================================================

/// Run the allocation over the server's snapshot.
///
/// Holds the write lock for the whole run so two allocations (or an
/// allocation and a reset) never interleave.
pub async fn allocate_handler(
    State(state): State<AppState>,
    Json(request): Json<AllocateRequest>,
) -> impl IntoResponse {
    let options = request.options(&state.config.allocation);
    let mut snapshot = state.snapshot.write().await;

    let result = match snapshot.allocate(options) {
        Ok(r) => r,
        Err(e) => {
            return (
                error_status(&e),
                Json(AllocateResponse::error(format!("Allocation failed: {}", e))),
            );
        }
    };

    if !request.apply {
        audit::log_run(&options, &result, false);
        return (
            StatusCode::OK,
            Json(AllocateResponse::success(&options, result, None)),
        );
    }

    let mut updated = snapshot.clone();
    let applied = match updated
        .apply_result(&result, store::now())
        .and_then(|count| persist(&state, &updated).map(|()| count))
    {
        Ok(count) => count,
        Err(e) => {
            audit::log_run(&options, &result, false);
            return (
                error_status(&e),
                Json(AllocateResponse::error(format!("Apply failed: {}", e))),
            );
        }
    };
    *snapshot = updated;
    audit::log_run(&options, &result, true);

    (
        StatusCode::OK,
        Json(AllocateResponse::success(&options, result, Some(applied))),
    )
}

/// Allocate a snapshot posted in the body. Never touches server state.
pub async fn preview_handler(
    State(state): State<AppState>,
    Json(request): Json<PreviewRequest>,
) -> impl IntoResponse {
    let options = state
        .config
        .allocation
        .options(request.cohort, request.tie_break);

    match request.snapshot.allocate(options) {
        Ok(result) => {
            tracing::debug!(
                event = "allocation_preview",
                assigned = result.statistics.assigned_count,
                total_teams = result.statistics.total_teams,
                "Preview allocation"
            );
            (
                StatusCode::OK,
                Json(AllocateResponse::success(&options, result, None)),
            )
        }
        Err(e) => (
            error_status(&e),
            Json(AllocateResponse::error(format!("Allocation failed: {}", e))),
        ),
    }
}

// =============================================================================
// RESET HANDLERS
// =============================================================================

/// Clear assignments, optionally for one cohort only.
pub async fn reset_handler(
    State(state): State<AppState>,
    Json(request): Json<ResetRequest>,
) -> impl IntoResponse {
    let mut snapshot = state.snapshot.write().await;
    let mut updated = snapshot.clone();
    let cleared = updated.reset_assignments(request.cohort);

    if let Err(e) = persist(&state, &updated) {
        return (
            error_status(&e),
            Json(ResetResponse::error(format!("Reset failed: {}", e))),
        );
    }
    *snapshot = updated;

    tracing::info!(
        event = "reset_assignments",
        cohort = request.cohort.map_or("all", |c| c.name()),
        cleared,
        "Assignments reset"
    );
    (StatusCode::OK, Json(ResetResponse::success(cleared)))
}

/// Clear the project selections of one cohort.
pub async fn reset_selections_handler(
    State(state): State<AppState>,
    Json(request): Json<ResetSelectionsRequest>,
) -> impl IntoResponse {
    let mut snapshot = state.snapshot.write().await;
    let mut updated = snapshot.clone();
    let cleared = updated.reset_selections(request.cohort);

    if let Err(e) = persist(&state, &updated) {
        return (
            error_status(&e),
            Json(ResetResponse::error(format!("Reset failed: {}", e))),
        );
    }
    *snapshot = updated;

    tracing::info!(
        event = "reset_selections",
        cohort = request.cohort.name(),
        cleared,
        "Selections reset"
    );
    (StatusCode::OK, Json(ResetResponse::success(cleared)))
}

// =============================================================================
// SNAPSHOT HANDLER
// =============================================================================

/// Replace the server's snapshot with the posted document.
pub async fn replace_snapshot_handler(
    State(state): State<AppState>,
    Json(replacement): Json<Snapshot>,
) -> impl IntoResponse {
    if let Err(e) = replacement.validate_limits() {
        return (
            error_status(&e),
            Json(SnapshotResponse::error(format!("Invalid snapshot: {}", e))),
        );
    }

    let mut snapshot = state.snapshot.write().await;
    if let Err(e) = persist(&state, &replacement) {
        return (
            error_status(&e),
            Json(SnapshotResponse::error(format!("Store failed: {}", e))),
        );
    }

    let response = SnapshotResponse::success(&replacement);
    *snapshot = replacement;
    tracing::info!(
        event = "snapshot_replaced",
        teams = response.teams,
        students = response.students,
        projects = response.projects,
        "Snapshot replaced"
    );
    (StatusCode::OK, Json(response))
}
