use crate::domain::models::{Answers, Chapter, Feedback, SpiceOption, TraitScores};
use crate::domain::scoring::calc_scores;
use crate::domain::session::{
    load_snapshot, save_snapshot, ChapterProgress, QuizSession, SessionError, SessionSnapshot,
};
use crate::report::render_report;
use crate::services::feedback::resolve_feedback;
use crate::state::SharedState;
use crate::web::{api_error, ApiError, ApiResult};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const REPORT_FILE_NAME: &str = "perfume_personality_report.png";
const DEFAULT_DISPLAY_NAME: &str = "你";

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/chapters", get(chapters))
        .route("/spices", get(spices))
        .route("/sessions", post(create_session))
        .route("/sessions/restore", post(restore_session))
        .route("/sessions/:id", get(session_status))
        .route("/sessions/:id/spices", post(select_spices))
        .route("/sessions/:id/chapter", post(submit_chapter))
        .route("/sessions/:id/save", post(save_session))
        .route("/sessions/:id/result", get(result))
        .route("/sessions/:id/report.png", get(report_png))
        .with_state(state)
}

#[derive(Serialize)]
struct SessionStatusResponse {
    session_id: Uuid,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    progress: ChapterProgress,
    selected_spices: Vec<String>,
    chapter: Option<Chapter>,
}

#[derive(Serialize)]
struct SaveResponse {
    path: String,
    snapshot: SessionSnapshot,
}

#[derive(Serialize)]
struct ResultResponse {
    scores: TraitScores,
    feedback: Feedback,
    completed_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct SpicesPayload {
    codes: Vec<String>,
}

#[derive(Serialize)]
struct SpicesResponse {
    selected_spices: Vec<String>,
}

#[derive(Deserialize)]
struct ChapterPayload {
    answers: Answers,
}

#[derive(Deserialize)]
struct ReportParams {
    name: Option<String>,
}

fn status_response(
    state: &SharedState,
    session_id: Uuid,
    session: &QuizSession,
) -> SessionStatusResponse {
    let chapter = if session.is_completed() {
        None
    } else {
        session.current_chapter(&state.catalog).cloned()
    };
    SessionStatusResponse {
        session_id,
        started_at: session.started_at,
        completed_at: session.completed_at,
        progress: session.progress(&state.catalog),
        selected_spices: session.selected_spices.clone(),
        chapter,
    }
}

fn session_error(err: SessionError) -> (StatusCode, Json<ApiError>) {
    let status = match &err {
        SessionError::UnknownItem { .. }
        | SessionError::MissingItems { .. }
        | SessionError::OutOfRange { .. }
        | SessionError::UnknownSpice { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        SessionError::AlreadyCompleted => StatusCode::CONFLICT,
        SessionError::Io(_) | SessionError::Format(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!("Session storage failed: {}", err);
    } else {
        tracing::warn!("Rejected session update: {}", err);
    }
    api_error(status, err)
}

async fn load_session(state: &SharedState, id: Uuid) -> ApiResult<QuizSession> {
    state
        .sessions
        .read()
        .await
        .get(&id)
        .cloned()
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("session {id} not found")))
}

fn require_completed(session: &QuizSession) -> ApiResult<()> {
    if session.is_completed() {
        Ok(())
    } else {
        Err(api_error(
            StatusCode::CONFLICT,
            "quiz not completed yet; answer every chapter first",
        ))
    }
}

async fn chapters(State(state): State<SharedState>) -> Json<Vec<Chapter>> {
    Json(state.catalog.chapters.clone())
}

async fn spices(State(state): State<SharedState>) -> Json<Vec<SpiceOption>> {
    Json(state.catalog.spice_options())
}

async fn create_session(
    State(state): State<SharedState>,
) -> (StatusCode, Json<SessionStatusResponse>) {
    let id = Uuid::new_v4();
    let session = QuizSession::new();
    let body = status_response(&state, id, &session);
    state.sessions.write().await.insert(id, session);
    tracing::info!("Started quiz session {}", id);
    (StatusCode::CREATED, Json(body))
}

async fn restore_session(
    State(state): State<SharedState>,
) -> ApiResult<(StatusCode, Json<SessionStatusResponse>)> {
    let snapshot = load_snapshot(&state.results_dir).map_err(|e| match e {
        SessionError::Io(ref io) if io.kind() == std::io::ErrorKind::NotFound => {
            api_error(StatusCode::NOT_FOUND, "no saved session")
        }
        other => session_error(other),
    })?;
    let id = Uuid::new_v4();
    let session = QuizSession::from_snapshot(snapshot, &state.catalog);
    let body = status_response(&state, id, &session);
    state.sessions.write().await.insert(id, session);
    tracing::info!("Restored saved quiz progress into session {}", id);
    Ok((StatusCode::CREATED, Json(body)))
}

async fn session_status(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SessionStatusResponse>> {
    let session = load_session(&state, id).await?;
    Ok(Json(status_response(&state, id, &session)))
}

async fn select_spices(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SpicesPayload>,
) -> ApiResult<Json<SpicesResponse>> {
    let mut sessions = state.sessions.write().await;
    let session = sessions
        .get_mut(&id)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("session {id} not found")))?;
    let selected_spices = session
        .select_spices(&state.catalog, &payload.codes)
        .map_err(session_error)?;
    Ok(Json(SpicesResponse { selected_spices }))
}

async fn submit_chapter(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChapterPayload>,
) -> ApiResult<Json<SessionStatusResponse>> {
    let mut sessions = state.sessions.write().await;
    let session = sessions
        .get_mut(&id)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("session {id} not found")))?;
    let progress = session
        .submit_chapter(&state.catalog, &payload.answers)
        .map_err(session_error)?;
    if progress.completed {
        tracing::info!(
            "Session {} completed with {} answers",
            id,
            progress.answered
        );
    }
    Ok(Json(status_response(&state, id, session)))
}

async fn save_session(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SaveResponse>> {
    let session = load_session(&state, id).await?;
    let snapshot = session.snapshot(Utc::now());
    let path = save_snapshot(&state.results_dir, &snapshot).map_err(session_error)?;
    Ok(Json(SaveResponse {
        path: path.display().to_string(),
        snapshot,
    }))
}

async fn result(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ResultResponse>> {
    let session = load_session(&state, id).await?;
    require_completed(&session)?;
    let scores = calc_scores(&session.answers, &state.catalog.chapters);
    let feedback = resolve_feedback(&scores);
    Ok(Json(ResultResponse {
        scores,
        feedback,
        completed_at: session.completed_at,
    }))
}

async fn report_png(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Query(params): Query<ReportParams>,
) -> ApiResult<Response> {
    let session = load_session(&state, id).await?;
    require_completed(&session)?;

    let font = state.font.get().map_err(|e| {
        tracing::error!("Cannot render report: {}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, e)
    })?;

    let scores = calc_scores(&session.answers, &state.catalog.chapters);
    let feedback = resolve_feedback(&scores);
    let name = params
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string());

    let report = tokio::task::spawn_blocking(move || render_report(&scores, &feedback, &name, &font))
        .await
        .map_err(|e| {
            tracing::error!("Report render task failed: {}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "report rendering failed")
        })?
        .map_err(|e| {
            tracing::error!("Report render failed: {}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, e)
        })?;

    Ok((
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{REPORT_FILE_NAME}\""),
            ),
            (
                header::HeaderName::from_static("x-report-generated-at"),
                report.generated_at.to_rfc3339(),
            ),
        ],
        report.png,
    )
        .into_response())
}
