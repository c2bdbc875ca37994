use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::{Duration, OffsetDateTime};

use super::{BloodType, GeoPoint};

/// Donors may donate again 56 days after their last donation. Advisory:
/// surfaced on the dashboard, not enforced by the notification ledger.
pub const DONATION_COOLDOWN_DAYS: i64 = 56;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Donor {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub blood_type: BloodType,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub last_donation: Option<OffsetDateTime>,
    pub points: i32,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Donor {
    pub fn geo_point(&self) -> Option<GeoPoint> {
        GeoPoint::from_columns(self.latitude, self.longitude)
    }

    /// The instant from which the donor is eligible to donate again.
    /// Donors with no recorded donation are eligible immediately.
    pub fn eligible_to_donate_from(&self) -> OffsetDateTime {
        match self.last_donation {
            Some(last) => last + Duration::days(DONATION_COOLDOWN_DAYS),
            None => OffsetDateTime::UNIX_EPOCH,
        }
    }

    pub fn is_eligible_at(&self, now: OffsetDateTime) -> bool {
        self.eligible_to_donate_from() <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn donor(last_donation: Option<OffsetDateTime>) -> Donor {
        Donor {
            id: Uuid::new_v4(),
            full_name: "Test Donor".to_string(),
            email: "donor@example.com".to_string(),
            phone_number: "+971500000000".to_string(),
            address: "Dubai".to_string(),
            blood_type: BloodType::ONegative,
            latitude: Some(25.2),
            longitude: Some(55.3),
            last_donation,
            points: 0,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn donor_without_history_is_immediately_eligible() {
        let d = donor(None);
        assert!(d.is_eligible_at(datetime!(2024-01-01 00:00 UTC)));
    }

    #[test]
    fn cooldown_ends_56_days_after_last_donation() {
        let d = donor(Some(datetime!(2024-01-01 00:00 UTC)));
        assert!(!d.is_eligible_at(datetime!(2024-02-25 00:00 UTC)));
        assert!(d.is_eligible_at(datetime!(2024-02-26 00:00 UTC)));
    }
}
