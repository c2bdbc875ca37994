//! In-memory ledger used as an injectable test double. Mirrors the Postgres
//! implementation's semantics: every transition is a check-and-set under one
//! lock, and the reward credit happens under the same lock as the `donated`
//! transition.

use std::collections::HashMap;
use std::sync::Mutex;

use time::OffsetDateTime;
use uuid::Uuid;
use validator::Validate;

use crate::db::models::{NewNotification, Notification, NotificationStatus};

use super::{LedgerError, NotificationLedger, SendOutcome, DONATION_REWARD_POINTS};

#[derive(Default)]
struct LedgerState {
    notifications: HashMap<Uuid, Notification>,
    donor_points: HashMap<Uuid, i32>,
}

#[derive(Default)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn donor_points(&self, donor_id: Uuid) -> i32 {
        self.state
            .lock()
            .unwrap()
            .donor_points
            .get(&donor_id)
            .copied()
            .unwrap_or(0)
    }

    fn transition(
        state: &mut LedgerState,
        notification_id: Uuid,
        target: NotificationStatus,
        authorized_donor: Option<Uuid>,
    ) -> Result<Notification, LedgerError> {
        let notification = state
            .notifications
            .get_mut(&notification_id)
            .ok_or(LedgerError::NotFound)?;

        if authorized_donor.is_some_and(|donor| donor != notification.donor_id) {
            return Err(LedgerError::Unauthorized);
        }

        if !notification.status.can_transition(target) {
            return Err(LedgerError::InvalidTransition {
                from: notification.status,
                to: target,
            });
        }

        notification.status = target;
        notification.updated_at = OffsetDateTime::now_utc();
        Ok(notification.clone())
    }
}

#[async_trait::async_trait]
impl NotificationLedger for InMemoryLedger {
    async fn create(&self, new: NewNotification) -> Result<Notification, LedgerError> {
        new.validate()
            .map_err(|err| LedgerError::Validation(err.to_string()))?;

        let now = OffsetDateTime::now_utc();
        let notification = Notification {
            id: Uuid::new_v4(),
            donor_id: new.donor_id,
            clinic_id: new.clinic_id,
            blood_request_id: new.blood_request_id,
            email: new.email,
            subject: new.subject,
            message: new.message,
            status: NotificationStatus::Pending,
            failure_reason: None,
            sent_at: None,
            created_at: now,
            updated_at: now,
        };

        self.state
            .lock()
            .unwrap()
            .notifications
            .insert(notification.id, notification.clone());
        Ok(notification)
    }

    async fn record_send_outcome(
        &self,
        notification_id: Uuid,
        outcome: SendOutcome,
    ) -> Result<Notification, LedgerError> {
        let mut state = self.state.lock().unwrap();
        Self::transition(&mut state, notification_id, outcome.status(), None)?;

        let stored = state
            .notifications
            .get_mut(&notification_id)
            .ok_or(LedgerError::NotFound)?;
        match &outcome {
            SendOutcome::Delivered => stored.sent_at = Some(OffsetDateTime::now_utc()),
            SendOutcome::Failed { reason } => stored.failure_reason = Some(reason.clone()),
        }
        Ok(stored.clone())
    }

    async fn set_interest(
        &self,
        notification_id: Uuid,
        donor_id: Uuid,
        interested: bool,
    ) -> Result<Notification, LedgerError> {
        let target = if interested {
            NotificationStatus::Interested
        } else {
            NotificationStatus::Sent
        };

        let mut state = self.state.lock().unwrap();
        Self::transition(&mut state, notification_id, target, Some(donor_id))
    }

    async fn confirm_donation(&self, notification_id: Uuid) -> Result<Notification, LedgerError> {
        let mut state = self.state.lock().unwrap();
        let notification = Self::transition(
            &mut state,
            notification_id,
            NotificationStatus::Donated,
            None,
        )?;

        *state.donor_points.entry(notification.donor_id).or_insert(0) +=
            DONATION_REWARD_POINTS;
        Ok(notification)
    }

    async fn list_for_request(&self, request_id: Uuid) -> Result<Vec<Notification>, LedgerError> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<Notification> = state
            .notifications
            .values()
            .filter(|n| n.blood_request_id == request_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn list_for_donor(&self, donor_id: Uuid) -> Result<Vec<Notification>, LedgerError> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<Notification> = state
            .notifications
            .values()
            .filter(|n| n.donor_id == donor_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn list_all(&self) -> Result<Vec<Notification>, LedgerError> {
        let state = self.state.lock().unwrap();
        let mut rows: Vec<Notification> = state.notifications.values().cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}
