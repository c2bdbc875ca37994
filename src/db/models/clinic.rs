use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::OffsetDateTime;

use super::GeoPoint;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Clinic {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Clinic {
    pub fn geo_point(&self) -> Option<GeoPoint> {
        GeoPoint::from_columns(self.latitude, self.longitude)
    }
}
