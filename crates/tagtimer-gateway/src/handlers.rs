// SPDX-FileCopyrightText: 2026 Tagtimer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the timer REST API.
//!
//! Every handler behind the session middleware receives the caller as a
//! [`CurrentUser`] extension. Failures map onto status codes through
//! [`ApiError`] and carry a `{"error": ...}` body.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};
use tagtimer_core::{
    DateRange, HealthStatus, StatsSummary, TagTimerError, TimerSession, TimerStatus, User,
    UserTagStats,
};
use tagtimer_engine::{IdleView, LiveTimer, validate_tag};

use crate::auth::CurrentUser;
use crate::server::AppState;

/// Error wrapper that renders a [`TagTimerError`] as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub TagTimerError);

impl From<TagTimerError> for ApiError {
    fn from(err: TagTimerError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            TagTimerError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            TagTimerError::NotFound { .. } => StatusCode::NOT_FOUND,
            TagTimerError::Validation(_) => StatusCode::BAD_REQUEST,
            TagTimerError::InvalidTransition { .. } => StatusCode::CONFLICT,
            TagTimerError::ClockAnomaly { .. }
            | TagTimerError::Storage { .. }
            | TagTimerError::Config(_)
            | TagTimerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match &self.0 {
            TagTimerError::Storage { .. } | TagTimerError::Config(_) | TagTimerError::Internal(_) => {
                tracing::error!(error = %self.0, "request failed");
                "internal server error".to_string()
            }
            other => {
                if status.is_server_error() {
                    tracing::error!(error = %other, "request failed");
                } else {
                    tracing::debug!(error = %other, status = status.as_u16(), "request rejected");
                }
                other.to_string()
            }
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A running or stopped timer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerResponse {
    pub session: TimerSession,
    /// Seconds on the clock as of the response.
    pub duration: i64,
    pub status: TimerStatus,
}

impl From<TimerSession> for TimerResponse {
    fn from(session: TimerSession) -> Self {
        Self {
            duration: session.duration,
            status: session.status,
            session,
        }
    }
}

impl From<LiveTimer> for TimerResponse {
    fn from(live: LiveTimer) -> Self {
        Self {
            duration: live.duration,
            status: live.session.status,
            session: live.session,
        }
    }
}

/// No active timer; lists the tags the user can pick from.
#[derive(Debug, Serialize)]
pub struct IdleResponse {
    pub status: &'static str,
    pub tags: Vec<String>,
}

impl From<IdleView> for IdleResponse {
    fn from(view: IdleView) -> Self {
        Self {
            status: "idle",
            tags: view.tags,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TagListResponse {
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TagSessionsResponse {
    pub tag: String,
    pub sessions: Vec<TimerSession>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// `?start=&end=` query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl RangeQuery {
    fn resolve(&self, state: &AppState) -> Result<DateRange, TagTimerError> {
        DateRange::from_query(
            self.start.as_deref(),
            self.end.as_deref(),
            state.engine.clock().now(),
        )
    }
}

/// Public detail reported when the storage health check fails.
pub const STORAGE_UNAVAILABLE: &str = "storage unavailable";

/// GET /health
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let failure = match state.storage.health_check().await {
        Ok(HealthStatus::Healthy) => None,
        Ok(HealthStatus::Degraded(reason)) | Ok(HealthStatus::Unhealthy(reason)) => Some(reason),
        Err(e) => Some(e.to_string()),
    };
    match failure {
        None => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "up",
                detail: None,
            }),
        ),
        Some(reason) => {
            // The reason can carry paths and driver messages; it stays in the log.
            tracing::warn!(reason = %reason, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "down",
                    detail: Some(STORAGE_UNAVAILABLE.to_string()),
                }),
            )
        }
    }
}

/// POST /api/v1/timer/{tag}/start
pub async fn start_timer(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(tag): Path<String>,
) -> Result<Json<TimerResponse>, ApiError> {
    let session = state.engine.timers.start(user.as_str(), &tag).await?;
    Ok(Json(session.into()))
}

/// POST /api/v1/timer/{tag}/stop
pub async fn stop_timer(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(tag): Path<String>,
) -> Result<Json<TimerResponse>, ApiError> {
    let session = state.engine.timers.stop(user.as_str(), &tag).await?;
    Ok(Json(session.into()))
}

/// POST /api/v1/timer/{tag}/reset
pub async fn reset_timer(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(tag): Path<String>,
) -> Result<Json<IdleResponse>, ApiError> {
    let view = state.engine.timers.reset(user.as_str(), &tag).await?;
    Ok(Json(view.into()))
}

/// GET /api/v1/timer/{tag}
pub async fn current_timer(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(tag): Path<String>,
) -> Result<Json<TimerResponse>, ApiError> {
    let live = state.engine.timers.current(user.as_str(), &tag).await?;
    Ok(Json(live.into()))
}

/// GET /api/v1/tags
pub async fn list_tags(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<TagListResponse>, ApiError> {
    let tags = state.engine.tag_stats.list_tags(user.as_str()).await?;
    Ok(Json(TagListResponse { tags }))
}

/// GET /api/v1/stats
pub async fn lifetime_stats(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Vec<UserTagStats>>, ApiError> {
    Ok(Json(state.engine.tag_stats.find_all(user.as_str()).await?))
}

/// GET /api/v1/stats/summary
pub async fn stats_summary(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<StatsSummary>, ApiError> {
    let range = query.resolve(&state)?;
    let summary = state
        .engine
        .summary
        .get_stats_summary(user.as_str(), &range)
        .await?;
    Ok(Json(summary))
}

/// GET /api/v1/stats/tag/{tag}/sessions
pub async fn tag_sessions(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(tag): Path<String>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<TagSessionsResponse>, ApiError> {
    let tag = validate_tag(&tag)?.to_string();
    let range = query.resolve(&state)?;
    let sessions = state
        .engine
        .summary
        .get_tag_sessions(user.as_str(), &tag, &range)
        .await?;
    Ok(Json(TagSessionsResponse { tag, sessions }))
}

/// DELETE /api/v1/stats/tag/{tag}
pub async fn delete_tag(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(tag): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.engine.tag_stats.delete_tag(user.as_str(), &tag).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/me
pub async fn me(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.engine.users.get_user(user.as_str()).await?))
}

/// POST /logout
///
/// Sessions are stateless, so logging out only clears the cookie.
pub async fn logout(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    jar: CookieJar,
) -> (StatusCode, CookieJar) {
    tracing::info!(user_id = %user, "user logged out");
    // Always sent, whether the caller authenticated by cookie or bearer token.
    let mut removal = Cookie::build((state.cookie.name.clone(), ""))
        .path("/")
        .http_only(true)
        .secure(state.cookie.secure)
        .build();
    removal.make_removal();
    (StatusCode::NO_CONTENT, jar.add(removal))
}
