use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::Clinic;

const CLINIC_COLUMNS: &str =
    "id, name, email, phone_number, address, latitude, longitude, created_at, updated_at";

pub struct ClinicRepository;

impl ClinicRepository {
    pub async fn get_by_id(pool: &PgPool, clinic_id: Uuid) -> Result<Option<Clinic>, sqlx::Error> {
        sqlx::query_as::<_, Clinic>(&format!(
            "SELECT {CLINIC_COLUMNS} FROM clinics WHERE id = $1"
        ))
        .bind(clinic_id)
        .fetch_optional(pool)
        .await
    }
}
