use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::{BloodRequest, NewBloodRequest, RequestStatus};

const REQUEST_COLUMNS: &str =
    "id, clinic_id, blood_type, quantity, urgency, status, created_at, updated_at";

pub struct RequestRepository;

impl RequestRepository {
    pub async fn create(
        pool: &PgPool,
        new_request: &NewBloodRequest,
    ) -> Result<BloodRequest, sqlx::Error> {
        sqlx::query_as::<_, BloodRequest>(&format!(
            "INSERT INTO blood_requests (clinic_id, blood_type, quantity, urgency, status) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {REQUEST_COLUMNS}"
        ))
        .bind(new_request.clinic_id)
        .bind(new_request.blood_type)
        .bind(new_request.quantity)
        .bind(new_request.urgency)
        .bind(RequestStatus::Active)
        .fetch_one(pool)
        .await
    }

    pub async fn get_by_id(
        pool: &PgPool,
        request_id: Uuid,
    ) -> Result<Option<BloodRequest>, sqlx::Error> {
        sqlx::query_as::<_, BloodRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM blood_requests WHERE id = $1"
        ))
        .bind(request_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_for_clinic(
        pool: &PgPool,
        clinic_id: Uuid,
    ) -> Result<Vec<BloodRequest>, sqlx::Error> {
        sqlx::query_as::<_, BloodRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM blood_requests \
             WHERE clinic_id = $1 ORDER BY created_at DESC"
        ))
        .bind(clinic_id)
        .fetch_all(pool)
        .await
    }
}
