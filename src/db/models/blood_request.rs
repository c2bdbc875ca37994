use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::OffsetDateTime;
use validator::Validate;

use super::BloodType;

/// Display ordering only; urgency does not influence matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "urgency_level", rename_all = "snake_case")]
pub enum Urgency {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "request_status", rename_all = "snake_case")]
pub enum RequestStatus {
    Active,
    Fulfilled,
    Cancelled,
    Expired,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct BloodRequest {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub blood_type: BloodType,
    pub quantity: i32,
    pub urgency: Urgency,
    pub status: RequestStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewBloodRequest {
    pub clinic_id: Uuid,
    pub blood_type: BloodType,
    #[validate(range(min = 1, message = "Quantity must be at least 1 unit"))]
    pub quantity: i32,
    pub urgency: Urgency,
}
