use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::OffsetDateTime;
use validator::Validate;

/// Lifecycle of one outreach attempt to one donor for one blood request.
///
/// ```text
/// pending -> sent | failed
/// sent <-> interested          (donor expresses / withdraws interest)
/// sent | interested -> donated (clinic confirms, credits reward points)
/// ```
///
/// `failed` and `donated` are terminal. A later outreach to the same donor
/// for the same request is a new notification row, never a reopened one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "notification_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    Pending,
    Sent,
    Failed,
    Interested,
    Donated,
}

impl NotificationStatus {
    /// Whether the state machine permits the edge `self -> to`.
    pub fn can_transition(self, to: NotificationStatus) -> bool {
        use NotificationStatus::*;
        matches!(
            (self, to),
            (Pending, Sent)
                | (Pending, Failed)
                | (Sent, Interested)
                | (Interested, Sent)
                | (Sent, Donated)
                | (Interested, Donated)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, NotificationStatus::Failed | NotificationStatus::Donated)
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub donor_id: Uuid,
    pub clinic_id: Uuid,
    pub blood_request_id: Uuid,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub status: NotificationStatus,
    pub failure_reason: Option<String>,
    pub sent_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Notification {
    /// Donor-facing interest flag, derived from the persisted status so it
    /// can never drift from the source of truth.
    pub fn is_interested(&self) -> bool {
        self.status == NotificationStatus::Interested
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewNotification {
    pub donor_id: Uuid,
    pub clinic_id: Uuid,
    pub blood_request_id: Uuid,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub subject: String,
    #[validate(length(min = 1))]
    pub message: String,
}
