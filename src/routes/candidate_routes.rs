use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use futures::StreamExt;

use crate::{
    dto::candidate_dto::{
        CandidateDetailResponse, CandidateListQuery, CandidateListResponse, CandidatePayload,
        CandidateResponse, FavoritePayload,
    },
    error::Result,
    models::candidate::Candidate,
    services::candidate_repository::CandidateListStream,
    state::{home::compose, selection::SelectedView},
    utils::format::{convert_salary_to_pounds, format_pounds},
    utils::time::{age_from_stored, today},
    AppState,
};

async fn first_snapshot(mut stream: CandidateListStream) -> Result<Vec<Candidate>> {
    stream.next().await.unwrap_or_else(|| Ok(Vec::new()))
}

#[axum::debug_handler]
pub async fn list_candidates(
    State(state): State<AppState>,
    Query(query): Query<CandidateListQuery>,
) -> Result<impl IntoResponse> {
    let view = query.view.unwrap_or_default();
    let (all, favorites) = match view {
        SelectedView::All => (
            first_snapshot(state.candidate_repository.get_all_candidates()).await?,
            Vec::new(),
        ),
        SelectedView::Favorites => (
            Vec::new(),
            first_snapshot(state.candidate_repository.get_all_favorite_candidates()).await?,
        ),
    };
    let search = query.search.unwrap_or_default();
    let items = compose(&all, &favorites, &search, view);
    Ok(Json(CandidateListResponse::from(items)))
}

#[axum::debug_handler]
pub async fn create_candidate(
    State(state): State<AppState>,
    Json(payload): Json<CandidatePayload>,
) -> Result<impl IntoResponse> {
    let candidate = payload.into_candidate()?;
    let id = state.candidate_repository.add_candidate(&candidate).await?;
    let created = Candidate {
        id: Some(id),
        ..candidate
    };
    Ok((StatusCode::CREATED, Json(CandidateResponse::from(created))))
}

/// Detail with the salary in pounds when a rate is available. A failed rate
/// lookup degrades to `salary_gbp: null`.
#[axum::debug_handler]
pub async fn get_candidate(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let candidate = state.candidate_repository.get_candidate(id).await?;

    let rate = match state.currency_repository.get_euro_to_gbp_rate().await {
        Ok(rate) => rate,
        Err(e) => {
            tracing::warn!(candidate_id = id, message = %e.user_message(), "Salary conversion unavailable");
            None
        }
    };
    let salary_gbp = rate.map(|rate| convert_salary_to_pounds(candidate.salary, rate));
    let age = age_from_stored(&candidate.birthdate, today());

    Ok(Json(CandidateDetailResponse {
        candidate: CandidateResponse::from(candidate),
        age,
        salary_gbp,
        salary_gbp_display: salary_gbp.map(format_pounds),
    }))
}

#[axum::debug_handler]
pub async fn update_candidate(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<CandidatePayload>,
) -> Result<impl IntoResponse> {
    let existing = state.candidate_repository.get_candidate(id).await?;
    let edited = Candidate {
        id: existing.id,
        favorite: existing.favorite,
        ..payload.into_candidate()?
    };
    state.candidate_repository.update_candidate(&edited).await?;
    Ok(Json(CandidateResponse::from(edited)))
}

#[axum::debug_handler]
pub async fn delete_candidate(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let existing = state.candidate_repository.get_candidate(id).await?;
    state.candidate_repository.delete_candidate(&existing).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn set_favorite(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<FavoritePayload>,
) -> Result<impl IntoResponse> {
    state
        .candidate_repository
        .update_favorite(id, payload.favorite)
        .await?;
    let candidate = state.candidate_repository.get_candidate(id).await?;
    Ok(Json(CandidateResponse::from(candidate)))
}
