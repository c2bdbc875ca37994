use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;
use validator::Validate;

use crate::db::models::{NewNotification, Notification, NotificationStatus};

use super::{LedgerError, NotificationLedger, SendOutcome, DONATION_REWARD_POINTS};

const NOTIFICATION_COLUMNS: &str = "id, donor_id, clinic_id, blood_request_id, email, subject, \
     message, status, failure_reason, sent_at, created_at, updated_at";

/// Postgres-backed ledger. Every transition is one conditional `UPDATE`
/// keyed on the current status; the donation credit shares a transaction
/// with the `donated` transition, so concurrent confirmations serialize on
/// the row lock and only the first sees a matching predicate.
#[derive(Clone)]
pub struct PgLedger {
    pool: PgPool,
}

impl PgLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn get(&self, notification_id: Uuid) -> Result<Option<Notification>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = $1"
        ))
        .bind(notification_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// A conditional update matched nothing: report why.
    async fn rejection(
        &self,
        notification_id: Uuid,
        attempted: NotificationStatus,
        donor_id: Option<Uuid>,
    ) -> LedgerError {
        match self.get(notification_id).await {
            Ok(Some(existing)) => {
                if donor_id.is_some_and(|donor| donor != existing.donor_id) {
                    LedgerError::Unauthorized
                } else {
                    LedgerError::InvalidTransition {
                        from: existing.status,
                        to: attempted,
                    }
                }
            }
            Ok(None) => LedgerError::NotFound,
            Err(err) => LedgerError::Database(err),
        }
    }
}

/// A dangling donor/clinic/request reference surfaces as a foreign-key
/// violation; that is bad input, not a database fault.
fn create_error(err: sqlx::Error) -> LedgerError {
    match err {
        sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => LedgerError::Validation(
            "notification references a missing donor, clinic or blood request".to_string(),
        ),
        other => LedgerError::Database(other),
    }
}

#[async_trait::async_trait]
impl NotificationLedger for PgLedger {
    async fn create(&self, new: NewNotification) -> Result<Notification, LedgerError> {
        new.validate()
            .map_err(|err| LedgerError::Validation(err.to_string()))?;

        let notification = sqlx::query_as::<_, Notification>(&format!(
            "INSERT INTO notifications \
                 (donor_id, clinic_id, blood_request_id, email, subject, message, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(new.donor_id)
        .bind(new.clinic_id)
        .bind(new.blood_request_id)
        .bind(&new.email)
        .bind(&new.subject)
        .bind(&new.message)
        .bind(NotificationStatus::Pending)
        .fetch_one(&self.pool)
        .await
        .map_err(create_error)?;

        Ok(notification)
    }

    async fn record_send_outcome(
        &self,
        notification_id: Uuid,
        outcome: SendOutcome,
    ) -> Result<Notification, LedgerError> {
        let target = outcome.status();
        let updated = sqlx::query_as::<_, Notification>(&format!(
            "UPDATE notifications \
             SET status = $2, \
                 failure_reason = $3, \
                 sent_at = CASE WHEN $2 = 'sent'::notification_status THEN NOW() ELSE sent_at END, \
                 updated_at = NOW() \
             WHERE id = $1 AND status = 'pending' \
             RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(notification_id)
        .bind(target)
        .bind(outcome.failure_reason())
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(notification) => Ok(notification),
            None => Err(self.rejection(notification_id, target, None).await),
        }
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

        let updated = sqlx::query_as::<_, Notification>(&format!(
            "UPDATE notifications \
             SET status = $3, updated_at = NOW() \
             WHERE id = $1 AND donor_id = $2 AND status = ANY($4) \
             RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(notification_id)
        .bind(donor_id)
        .bind(target)
        .bind(vec![NotificationStatus::Sent, NotificationStatus::Interested])
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(notification) => Ok(notification),
            None => Err(self.rejection(notification_id, target, Some(donor_id)).await),
        }
    }

    async fn confirm_donation(&self, notification_id: Uuid) -> Result<Notification, LedgerError> {
        let mut tx: Transaction<'_, Postgres> = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Notification>(&format!(
            "UPDATE notifications \
             SET status = $2, updated_at = NOW() \
             WHERE id = $1 AND status = ANY($3) \
             RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(notification_id)
        .bind(NotificationStatus::Donated)
        .bind(vec![NotificationStatus::Sent, NotificationStatus::Interested])
        .fetch_optional(&mut *tx)
        .await?;

        let Some(notification) = updated else {
            let existing = sqlx::query_as::<_, Notification>(&format!(
                "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = $1"
            ))
            .bind(notification_id)
            .fetch_optional(&mut *tx)
            .await?;
            tx.rollback().await?;

            return Err(match existing {
                Some(n) => LedgerError::InvalidTransition {
                    from: n.status,
                    to: NotificationStatus::Donated,
                },
                None => LedgerError::NotFound,
            });
        };

        sqlx::query("UPDATE donors SET points = points + $2, updated_at = NOW() WHERE id = $1")
            .bind(notification.donor_id)
            .bind(DONATION_REWARD_POINTS)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            notification_id = %notification.id,
            donor_id = %notification.donor_id,
            points = DONATION_REWARD_POINTS,
            "Donation confirmed, reward credited"
        );

        Ok(notification)
    }

    async fn list_for_request(&self, request_id: Uuid) -> Result<Vec<Notification>, LedgerError> {
        let rows = sqlx::query_as::<_, Notification>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications \
             WHERE blood_request_id = $1 ORDER BY created_at DESC"
        ))
        .bind(request_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_for_donor(&self, donor_id: Uuid) -> Result<Vec<Notification>, LedgerError> {
        let rows = sqlx::query_as::<_, Notification>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications \
             WHERE donor_id = $1 ORDER BY created_at DESC"
        ))
        .bind(donor_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_all(&self) -> Result<Vec<Notification>, LedgerError> {
        let rows = sqlx::query_as::<_, Notification>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
