use std::collections::HashSet;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::db::models::{BloodRequest, NewBloodRequest, Notification, NotificationStatus};
use crate::db::repositories::RequestRepository;
use crate::error::{AppError, AppResult};
use crate::matching::{find_matches_for_request, MatchCandidate};

pub async fn create_request(
    State(state): State<AppState>,
    Json(payload): Json<NewBloodRequest>,
) -> AppResult<(StatusCode, Json<BloodRequest>)> {
    payload.validate()?;
    let request = RequestRepository::create(&state.db, &payload).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

#[derive(Debug, Deserialize)]
pub struct ListRequestsParams {
    pub clinic_id: Uuid,
}

pub async fn list_requests(
    State(state): State<AppState>,
    Query(params): Query<ListRequestsParams>,
) -> AppResult<Json<Vec<BloodRequest>>> {
    let requests = RequestRepository::list_for_clinic(&state.db, params.clinic_id).await?;
    Ok(Json(requests))
}

#[derive(Debug, Deserialize)]
pub struct CandidateParams {
    pub max_distance_km: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct CandidateResponse {
    #[serde(flatten)]
    pub candidate: MatchCandidate,
    /// Whether this donor already has a live outreach record for the
    /// request (failed attempts do not count as contacted).
    pub already_contacted: bool,
}

/// Ranked, distance-filtered, type-compatible donors for one request.
pub async fn list_candidates(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
    Query(params): Query<CandidateParams>,
) -> AppResult<Json<Vec<CandidateResponse>>> {
    let max_distance_km = params
        .max_distance_km
        .unwrap_or(state.env.matching.default_max_distance_km);

    let candidates = find_matches_for_request(&state.db, request_id, max_distance_km).await?;

    let contacted: HashSet<Uuid> = state
        .ledger
        .list_for_request(request_id)
        .await?
        .into_iter()
        .filter(|n| n.status != NotificationStatus::Failed)
        .map(|n| n.donor_id)
        .collect();

    let response = candidates
        .into_iter()
        .map(|candidate| CandidateResponse {
            already_contacted: contacted.contains(&candidate.donor_id),
            candidate,
        })
        .collect();
    Ok(Json(response))
}

/// Outreach history for one request, newest first.
pub async fn request_notifications(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> AppResult<Json<Vec<Notification>>> {
    RequestRepository::get_by_id(&state.db, request_id)
        .await?
        .ok_or(AppError::RequestNotFound)?;

    let notifications = state.ledger.list_for_request(request_id).await?;
    Ok(Json(notifications))
}
