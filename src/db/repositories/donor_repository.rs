use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::{BloodType, Donor};

const DONOR_COLUMNS: &str = "id, full_name, email, phone_number, address, blood_type, \
     latitude, longitude, last_donation, points, created_at, updated_at";

pub struct DonorRepository;

impl DonorRepository {
    pub async fn get_by_id(pool: &PgPool, donor_id: Uuid) -> Result<Option<Donor>, sqlx::Error> {
        sqlx::query_as::<_, Donor>(&format!(
            "SELECT {DONOR_COLUMNS} FROM donors WHERE id = $1"
        ))
        .bind(donor_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn get_by_ids(pool: &PgPool, donor_ids: &[Uuid]) -> Result<Vec<Donor>, sqlx::Error> {
        sqlx::query_as::<_, Donor>(&format!(
            "SELECT {DONOR_COLUMNS} FROM donors WHERE id = ANY($1)"
        ))
        .bind(donor_ids)
        .fetch_all(pool)
        .await
    }

    /// The donor population eligible for matching against a request: every
    /// donor whose blood group is in the request's compatibility set.
    pub async fn get_by_blood_types(
        pool: &PgPool,
        blood_types: &[BloodType],
    ) -> Result<Vec<Donor>, sqlx::Error> {
        sqlx::query_as::<_, Donor>(&format!(
            "SELECT {DONOR_COLUMNS} FROM donors WHERE blood_type = ANY($1)"
        ))
        .bind(blood_types)
        .fetch_all(pool)
        .await
    }
}
