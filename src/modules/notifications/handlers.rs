use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::db::models::Notification;
use crate::db::repositories::{ClinicRepository, DonorRepository, RequestRepository};
use crate::dispatch::{DispatchReport, Dispatcher, MessageTemplate};
use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize, Validate)]
pub struct DispatchPayload {
    pub request_id: Uuid,
    pub donor_ids: Vec<Uuid>,
    #[validate(length(min = 1))]
    pub subject: String,
    #[validate(length(min = 1))]
    pub message: String,
}

/// Fan outreach out to the clinic's selected donors and record every
/// outcome. Returns the aggregate report even when every send failed.
pub async fn dispatch_notifications(
    State(state): State<AppState>,
    Json(payload): Json<DispatchPayload>,
) -> AppResult<Json<DispatchReport>> {
    payload.validate()?;

    let request = RequestRepository::get_by_id(&state.db, payload.request_id)
        .await?
        .ok_or(AppError::RequestNotFound)?;
    let clinic = ClinicRepository::get_by_id(&state.db, request.clinic_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Clinic not found".to_string()))?;
    let donors = DonorRepository::get_by_ids(&state.db, &payload.donor_ids).await?;

    let template = MessageTemplate {
        subject: payload.subject,
        body: payload.message,
    };

    let dispatcher = Dispatcher::new(
        state.ledger.as_ref(),
        state.mailer.as_ref(),
        Duration::from_secs(state.env.mail.send_timeout_secs),
    );
    let report = dispatcher
        .dispatch(&request, &clinic, &payload.donor_ids, donors, &template)
        .await?;
    Ok(Json(report))
}

/// Full outreach history, newest first.
pub async fn notification_history(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Notification>>> {
    let notifications = state.ledger.list_all().await?;
    Ok(Json(notifications))
}

#[derive(Debug, Deserialize)]
pub struct InterestPayload {
    pub donor_id: Uuid,
    /// `false` withdraws a previously expressed interest.
    pub interested: bool,
}

pub async fn set_interest(
    State(state): State<AppState>,
    Path(notification_id): Path<Uuid>,
    Json(payload): Json<InterestPayload>,
) -> AppResult<Json<Notification>> {
    let notification = state
        .ledger
        .set_interest(notification_id, payload.donor_id, payload.interested)
        .await?;
    Ok(Json(notification))
}

/// Clinic confirms the donor physically donated: transitions the record to
/// `donated` and credits the reward points, atomically.
pub async fn confirm_donation(
    State(state): State<AppState>,
    Path(notification_id): Path<Uuid>,
) -> AppResult<Json<Notification>> {
    let notification = state.ledger.confirm_donation(notification_id).await?;
    Ok(Json(notification))
}
