use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
    routing::{get, patch, post},
    Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::match_dto::{
        MatchListResponse, MatchResponse, ScorePairQuery, ScorePairResponse,
        UpdateMatchStatusPayload,
    },
    error::Result,
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/matches/score", get(score_pair))
        .route(
            "/api/matches/candidates/:id/run",
            post(run_candidate_matching),
        )
        .route(
            "/api/matches/job-postings/:id/run",
            post(run_job_posting_matching),
        )
        .route("/api/matches/candidates/:id", get(list_candidate_matches))
        .route(
            "/api/matches/job-postings/:id",
            get(list_job_posting_matches),
        )
        .route("/api/matches/:id", get(get_match))
        .route("/api/matches/:id/status", patch(update_match_status))
}

#[utoipa::path(
    post,
    path = "/api/matches/candidates/{id}/run",
    params(
        ("id" = Uuid, Path, description = "Candidate ID")
    ),
    responses(
        (status = 200, description = "Candidate scored against all open job postings", body = MatchListResponse),
        (status = 404, description = "Candidate not found"),
        (status = 422, description = "Candidate profile is malformed")
    )
)]
#[axum::debug_handler]
pub async fn run_candidate_matching(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let matches = state.matching_service.match_candidate(id).await?;
    Ok(Json(MatchListResponse::from(matches)))
}

#[utoipa::path(
    post,
    path = "/api/matches/job-postings/{id}/run",
    params(
        ("id" = Uuid, Path, description = "Job posting ID")
    ),
    responses(
        (status = 200, description = "Job posting scored against all active candidates", body = MatchListResponse),
        (status = 404, description = "Job posting not found"),
        (status = 422, description = "Job requirements are malformed")
    )
)]
#[axum::debug_handler]
pub async fn run_job_posting_matching(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let matches = state.matching_service.match_job_posting(id).await?;
    Ok(Json(MatchListResponse::from(matches)))
}

#[utoipa::path(
    get,
    path = "/api/matches/candidates/{id}",
    params(
        ("id" = Uuid, Path, description = "Candidate ID")
    ),
    responses(
        (status = 200, description = "Matches for the candidate, best first", body = MatchListResponse)
    )
)]
#[axum::debug_handler]
pub async fn list_candidate_matches(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let matches = state.matching_service.get_candidate_matches(id).await?;
    Ok(Json(MatchListResponse::from(matches)))
}

#[utoipa::path(
    get,
    path = "/api/matches/job-postings/{id}",
    params(
        ("id" = Uuid, Path, description = "Job posting ID")
    ),
    responses(
        (status = 200, description = "Matches for the job posting, best first", body = MatchListResponse)
    )
)]
#[axum::debug_handler]
pub async fn list_job_posting_matches(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let matches = state.matching_service.get_job_posting_matches(id).await?;
    Ok(Json(MatchListResponse::from(matches)))
}

#[utoipa::path(
    get,
    path = "/api/matches/{id}",
    params(
        ("id" = Uuid, Path, description = "Match ID")
    ),
    responses(
        (status = 200, description = "Match found", body = MatchResponse),
        (status = 404, description = "Match not found")
    )
)]
#[axum::debug_handler]
pub async fn get_match(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let record = state.matching_service.get_match(id).await?;
    Ok(Json(MatchResponse::from(record)))
}

#[utoipa::path(
    patch,
    path = "/api/matches/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Match ID")
    ),
    request_body = UpdateMatchStatusPayload,
    responses(
        (status = 200, description = "Match status updated", body = MatchResponse),
        (status = 400, description = "Unknown status value"),
        (status = 404, description = "Match not found")
    )
)]
#[axum::debug_handler]
pub async fn update_match_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMatchStatusPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let record = state
        .matching_service
        .update_match_status(id, &payload.status)
        .await?;
    Ok(Json(MatchResponse::from(record)))
}

#[utoipa::path(
    get,
    path = "/api/matches/score",
    params(
        ("candidate_id" = Uuid, Query, description = "Candidate ID"),
        ("job_posting_id" = Uuid, Query, description = "Job posting ID")
    ),
    responses(
        (status = 200, description = "Score preview, nothing is stored", body = ScorePairResponse),
        (status = 404, description = "Candidate or job posting not found"),
        (status = 422, description = "Candidate or job posting data is malformed")
    )
)]
#[axum::debug_handler]
pub async fn score_pair(
    State(state): State<AppState>,
    Query(query): Query<ScorePairQuery>,
) -> Result<impl IntoResponse> {
    let details = state
        .matching_service
        .score_pair(query.candidate_id, query.job_posting_id)
        .await?;
    Ok(Json(ScorePairResponse::new(
        query.candidate_id,
        query.job_posting_id,
        details,
    )))
}
