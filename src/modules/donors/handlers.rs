use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::models::{BloodType, Urgency};
use crate::db::repositories::{ClinicRepository, DonorRepository, RequestRepository};
use crate::error::{AppError, AppResult};
use crate::matching::{compatible_donor_types, haversine_km, round_km};

#[derive(Debug, Serialize)]
pub struct DonorSummary {
    pub name: String,
    pub blood_type: BloodType,
    pub points: i32,
    pub last_donation: Option<OffsetDateTime>,
    /// 56 days after the last donation; epoch when there is none.
    pub eligible_to_donate_from: OffsetDateTime,
    pub is_eligible: bool,
}

#[derive(Debug, Deserialize)]
pub struct DonorListParams {
    /// Clinical label of a recipient blood group, e.g. "AB-". When present,
    /// only donors whose group can give to that recipient are returned.
    pub compatible_with: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DonorListItem {
    pub id: Uuid,
    pub full_name: String,
    pub blood_type: BloodType,
    pub email: String,
    pub phone_number: String,
    pub last_donation: Option<OffsetDateTime>,
    pub is_eligible: bool,
}

pub async fn list_donors(
    State(state): State<AppState>,
    Query(params): Query<DonorListParams>,
) -> AppResult<Json<Vec<DonorListItem>>> {
    let blood_types: &[BloodType] = match &params.compatible_with {
        Some(label) => compatible_donor_types(label.parse::<BloodType>()?),
        None => &BloodType::ALL,
    };

    let now = OffsetDateTime::now_utc();
    let donors = DonorRepository::get_by_blood_types(&state.db, blood_types)
        .await?
        .into_iter()
        .map(|donor| DonorListItem {
            is_eligible: donor.is_eligible_at(now),
            id: donor.id,
            full_name: donor.full_name,
            blood_type: donor.blood_type,
            email: donor.email,
            phone_number: donor.phone_number,
            last_donation: donor.last_donation,
        })
        .collect();

    Ok(Json(donors))
}

#[derive(Debug, Serialize)]
pub struct OpenOutreach {
    pub notification_id: Uuid,
    pub request_id: Uuid,
    pub clinic: String,
    pub location: String,
    pub blood_type: BloodType,
    pub urgency: Urgency,
    pub message: String,
    /// Projection of the persisted status, never tracked separately.
    pub is_interested: bool,
    pub distance_km: Option<f64>,
    pub received_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub donor: DonorSummary,
    pub requests: Vec<OpenOutreach>,
}

/// The donor's profile plus their open outreach (pending, sent or
/// interested), joined with clinic and request details, nearest first.
pub async fn donor_dashboard(
    State(state): State<AppState>,
    Path(donor_id): Path<Uuid>,
) -> AppResult<Json<DashboardResponse>> {
    let donor = DonorRepository::get_by_id(&state.db, donor_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Donor not found".to_string()))?;
    let donor_location = donor.geo_point();

    let notifications = state.ledger.list_for_donor(donor_id).await?;

    let mut requests = Vec::new();
    for notification in notifications {
        if notification.status.is_terminal() {
            continue;
        }

        let Some(clinic) = ClinicRepository::get_by_id(&state.db, notification.clinic_id).await?
        else {
            continue;
        };
        let Some(request) =
            RequestRepository::get_by_id(&state.db, notification.blood_request_id).await?
        else {
            continue;
        };

        let distance_km = match (donor_location, clinic.geo_point()) {
            (Some(donor_point), Some(clinic_point)) => {
                Some(round_km(haversine_km(donor_point, clinic_point)))
            }
            _ => None,
        };

        requests.push(OpenOutreach {
            notification_id: notification.id,
            request_id: request.id,
            clinic: clinic.name,
            location: clinic.address,
            blood_type: request.blood_type,
            urgency: request.urgency,
            is_interested: notification.is_interested(),
            message: notification.message,
            distance_km,
            received_at: notification.created_at,
        });
    }

    requests.sort_by(|a, b| {
        a.distance_km
            .unwrap_or(f64::INFINITY)
            .total_cmp(&b.distance_km.unwrap_or(f64::INFINITY))
    });

    Ok(Json(DashboardResponse {
        donor: DonorSummary {
            name: donor.full_name.clone(),
            blood_type: donor.blood_type,
            points: donor.points,
            last_donation: donor.last_donation,
            eligible_to_donate_from: donor.eligible_to_donate_from(),
            is_eligible: donor.is_eligible_at(OffsetDateTime::now_utc()),
        },
        requests,
    }))
}
