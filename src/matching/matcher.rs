use serde::Serialize;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::models::{BloodRequest, BloodType, Donor, GeoPoint};
use crate::db::repositories::{ClinicRepository, DonorRepository, RequestRepository};

use super::compatibility::compatible_donor_types;
use super::distance::{haversine_km, round_km};
use super::MatchError;

/// A donor who passed both the blood-type and distance filters for one
/// request. Computed per call, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct MatchCandidate {
    pub donor_id: Uuid,
    pub full_name: String,
    pub blood_type: BloodType,
    pub email: String,
    pub phone_number: String,
    pub last_donation: Option<OffsetDateTime>,
    /// Kilometers from the clinic, rounded to two decimals.
    pub distance_km: f64,
}

/// Pure matching pass over an already-fetched donor population.
///
/// Donors outside the request's compatibility set are dropped, donors
/// without a valid location are skipped (not errored), and candidates beyond
/// `max_distance_km` are discarded. Output is sorted nearest-first; ties
/// break on donor id so the ordering is deterministic. Sorting compares the
/// full-precision distance; only the reported value is rounded.
pub fn find_matches(
    request: &BloodRequest,
    clinic_location: GeoPoint,
    donors: &[Donor],
    max_distance_km: f64,
) -> Vec<MatchCandidate> {
    let compatible = compatible_donor_types(request.blood_type);

    let mut ranked: Vec<(f64, &Donor)> = donors
        .iter()
        .filter(|donor| compatible.contains(&donor.blood_type))
        .filter_map(|donor| {
            let location = donor.geo_point()?;
            let distance = haversine_km(clinic_location, location);
            (distance <= max_distance_km).then_some((distance, donor))
        })
        .collect();

    ranked.sort_by(|(da, a), (db, b)| da.total_cmp(db).then_with(|| a.id.cmp(&b.id)));

    ranked
        .into_iter()
        .map(|(distance, donor)| MatchCandidate {
            donor_id: donor.id,
            full_name: donor.full_name.clone(),
            blood_type: donor.blood_type,
            email: donor.email.clone(),
            phone_number: donor.phone_number.clone(),
            last_donation: donor.last_donation,
            distance_km: round_km(distance),
        })
        .collect()
}

/// Resolve a request to its ranked candidate list: load the request and the
/// owning clinic's location, narrow the donor population to the compatible
/// blood groups, then run the pure matching pass.
pub async fn find_matches_for_request(
    pool: &PgPool,
    request_id: Uuid,
    max_distance_km: f64,
) -> Result<Vec<MatchCandidate>, MatchError> {
    let request = RequestRepository::get_by_id(pool, request_id)
        .await?
        .ok_or(MatchError::RequestNotFound)?;

    let clinic = ClinicRepository::get_by_id(pool, request.clinic_id)
        .await?
        .ok_or(MatchError::ClinicLocationMissing)?;
    let clinic_location = clinic.geo_point().ok_or(MatchError::ClinicLocationMissing)?;

    let donors =
        DonorRepository::get_by_blood_types(pool, compatible_donor_types(request.blood_type))
            .await?;

    Ok(find_matches(
        &request,
        clinic_location,
        &donors,
        max_distance_km,
    ))
}
