//! Notification Ledger: owns the lifecycle of every outreach record and the
//! once-only reward credit on confirmed donations.

mod pg;
#[cfg(test)]
pub mod testing;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::db::models::{NewNotification, Notification, NotificationStatus};

pub use pg::PgLedger;

/// Credited to the donor exactly once, when their notification first
/// transitions into `donated`.
pub const DONATION_REWARD_POINTS: i32 = 100;

/// Result of one outbound send attempt, as reported by the mail collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Delivered,
    Failed { reason: String },
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Notification not found")]
    NotFound,

    #[error("Donor is not authorized to act on this notification")]
    Unauthorized,

    #[error("Invalid notification transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: NotificationStatus,
        to: NotificationStatus,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// State-machine operations over notification records. Implementations must
/// make every transition a single atomic check-and-set: a conditional update
/// keyed on the current status, with the reward credit of
/// [`confirm_donation`](NotificationLedger::confirm_donation) applied in the
/// same transaction as the status change.
#[async_trait]
pub trait NotificationLedger: Send + Sync {
    /// Record a new outreach attempt in state `pending`.
    async fn create(&self, new: NewNotification) -> Result<Notification, LedgerError>;

    /// `pending -> sent | failed`, per the collaborator's delivery outcome.
    /// Failure detail is recorded; the ledger never retries on its own.
    async fn record_send_outcome(
        &self,
        notification_id: Uuid,
        outcome: SendOutcome,
    ) -> Result<Notification, LedgerError>;

    /// `sent <-> interested`, driven by the notification's own donor.
    /// `interested = false` withdraws a previously expressed interest.
    async fn set_interest(
        &self,
        notification_id: Uuid,
        donor_id: Uuid,
        interested: bool,
    ) -> Result<Notification, LedgerError>;

    /// `sent | interested -> donated`, plus the 100-point donor credit.
    /// At most one caller ever observes success for a given notification.
    async fn confirm_donation(&self, notification_id: Uuid) -> Result<Notification, LedgerError>;

    /// History projection for one request ("Sent" vs "Not Sent" surface).
    async fn list_for_request(&self, request_id: Uuid) -> Result<Vec<Notification>, LedgerError>;

    /// A donor's outreach history, newest first.
    async fn list_for_donor(&self, donor_id: Uuid) -> Result<Vec<Notification>, LedgerError>;

    /// Full outreach history, newest first.
    async fn list_all(&self) -> Result<Vec<Notification>, LedgerError>;
}

impl SendOutcome {
    pub fn status(&self) -> NotificationStatus {
        match self {
            SendOutcome::Delivered => NotificationStatus::Sent,
            SendOutcome::Failed { .. } => NotificationStatus::Failed,
        }
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            SendOutcome::Delivered => None,
            SendOutcome::Failed { reason } => Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::testing::InMemoryLedger;
    use super::*;

    fn new_notification(donor_id: Uuid) -> NewNotification {
        NewNotification {
            donor_id,
            clinic_id: Uuid::new_v4(),
            blood_request_id: Uuid::new_v4(),
            email: "donor@example.com".to_string(),
            subject: "Urgent blood request".to_string(),
            message: "A nearby clinic needs your blood group.".to_string(),
        }
    }

    #[tokio::test]
    async fn creation_starts_in_pending() {
        let ledger = InMemoryLedger::new();
        let notification = ledger.create(new_notification(Uuid::new_v4())).await.unwrap();
        assert_eq!(notification.status, NotificationStatus::Pending);
        assert!(notification.sent_at.is_none());
    }

    #[tokio::test]
    async fn create_rejects_empty_subject() {
        let ledger = InMemoryLedger::new();
        let mut new = new_notification(Uuid::new_v4());
        new.subject = String::new();
        assert!(matches!(
            ledger.create(new).await,
            Err(LedgerError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn send_outcome_moves_pending_to_sent_or_failed() {
        let ledger = InMemoryLedger::new();

        let ok = ledger.create(new_notification(Uuid::new_v4())).await.unwrap();
        let ok = ledger
            .record_send_outcome(ok.id, SendOutcome::Delivered)
            .await
            .unwrap();
        assert_eq!(ok.status, NotificationStatus::Sent);
        assert!(ok.sent_at.is_some());

        let bad = ledger.create(new_notification(Uuid::new_v4())).await.unwrap();
        let bad = ledger
            .record_send_outcome(
                bad.id,
                SendOutcome::Failed {
                    reason: "mailbox unavailable".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(bad.status, NotificationStatus::Failed);
        assert_eq!(bad.failure_reason.as_deref(), Some("mailbox unavailable"));

        // Delivery outcomes only apply once.
        assert!(matches!(
            ledger.record_send_outcome(ok.id, SendOutcome::Delivered).await,
            Err(LedgerError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn donor_can_express_and_withdraw_interest() {
        let ledger = InMemoryLedger::new();
        let donor_id = Uuid::new_v4();

        let n = ledger.create(new_notification(donor_id)).await.unwrap();
        ledger
            .record_send_outcome(n.id, SendOutcome::Delivered)
            .await
            .unwrap();

        let n = ledger.set_interest(n.id, donor_id, true).await.unwrap();
        assert_eq!(n.status, NotificationStatus::Interested);
        assert!(n.is_interested());

        let n = ledger.set_interest(n.id, donor_id, false).await.unwrap();
        assert_eq!(n.status, NotificationStatus::Sent);
        assert!(!n.is_interested());
    }

    #[tokio::test]
    async fn interest_by_the_wrong_donor_is_rejected_and_state_unchanged() {
        let ledger = InMemoryLedger::new();
        let donor_id = Uuid::new_v4();

        let n = ledger.create(new_notification(donor_id)).await.unwrap();
        ledger
            .record_send_outcome(n.id, SendOutcome::Delivered)
            .await
            .unwrap();

        let result = ledger.set_interest(n.id, Uuid::new_v4(), true).await;
        assert!(matches!(result, Err(LedgerError::Unauthorized)));

        let unchanged = ledger.list_for_donor(donor_id).await.unwrap();
        assert_eq!(unchanged[0].status, NotificationStatus::Sent);
    }

    #[tokio::test]
    async fn interest_before_delivery_is_an_invalid_transition() {
        let ledger = InMemoryLedger::new();
        let donor_id = Uuid::new_v4();
        let n = ledger.create(new_notification(donor_id)).await.unwrap();

        assert!(matches!(
            ledger.set_interest(n.id, donor_id, true).await,
            Err(LedgerError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn confirming_a_pending_notification_is_rejected() {
        let ledger = InMemoryLedger::new();
        let n = ledger.create(new_notification(Uuid::new_v4())).await.unwrap();

        assert!(matches!(
            ledger.confirm_donation(n.id).await,
            Err(LedgerError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn confirmation_credits_exactly_once() {
        let ledger = InMemoryLedger::new();
        let donor_id = Uuid::new_v4();

        let n = ledger.create(new_notification(donor_id)).await.unwrap();
        ledger
            .record_send_outcome(n.id, SendOutcome::Delivered)
            .await
            .unwrap();
        ledger.set_interest(n.id, donor_id, true).await.unwrap();

        let confirmed = ledger.confirm_donation(n.id).await.unwrap();
        assert_eq!(confirmed.status, NotificationStatus::Donated);
        assert_eq!(ledger.donor_points(donor_id), DONATION_REWARD_POINTS);

        // Second confirmation must fail and must not credit again.
        assert!(matches!(
            ledger.confirm_donation(n.id).await,
            Err(LedgerError::InvalidTransition { .. })
        ));
        assert_eq!(ledger.donor_points(donor_id), DONATION_REWARD_POINTS);
    }

    #[tokio::test]
    async fn concurrent_confirmations_apply_a_single_credit() {
        let ledger = Arc::new(InMemoryLedger::new());
        let donor_id = Uuid::new_v4();

        let n = ledger.create(new_notification(donor_id)).await.unwrap();
        ledger
            .record_send_outcome(n.id, SendOutcome::Delivered)
            .await
            .unwrap();

        let a = tokio::spawn({
            let ledger = Arc::clone(&ledger);
            async move { ledger.confirm_donation(n.id).await }
        });
        let b = tokio::spawn({
            let ledger = Arc::clone(&ledger);
            async move { ledger.confirm_donation(n.id).await }
        });

        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        assert_eq!(
            [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(),
            1,
            "exactly one confirmation may succeed"
        );
        assert_eq!(ledger.donor_points(donor_id), DONATION_REWARD_POINTS);
    }

    #[tokio::test]
    async fn failed_is_terminal() {
        let ledger = InMemoryLedger::new();
        let donor_id = Uuid::new_v4();

        let n = ledger.create(new_notification(donor_id)).await.unwrap();
        ledger
            .record_send_outcome(
                n.id,
                SendOutcome::Failed {
                    reason: "connection reset".to_string(),
                },
            )
            .await
            .unwrap();

        assert!(ledger.set_interest(n.id, donor_id, true).await.is_err());
        assert!(ledger.confirm_donation(n.id).await.is_err());
    }

    #[tokio::test]
    async fn history_is_newest_first() {
        let ledger = InMemoryLedger::new();
        let request_id = Uuid::new_v4();

        for _ in 0..3 {
            let mut new = new_notification(Uuid::new_v4());
            new.blood_request_id = request_id;
            ledger.create(new).await.unwrap();
        }

        let history = ledger.list_for_request(request_id).await.unwrap();
        assert_eq!(history.len(), 3);
        assert!(history.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }
}
