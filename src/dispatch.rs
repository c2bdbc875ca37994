//! Dispatch Orchestrator: fans outreach out to a clinic's selected donors,
//! one send + one ledger record per donor. Donors are independent; a failed
//! send is recorded and reported, never allowed to abort its siblings.

use std::collections::HashSet;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::db::models::{BloodRequest, Clinic, Donor, NewNotification};
use crate::ledger::{NotificationLedger, SendOutcome};
use crate::mailer::Mailer;

/// Bound on in-flight sends within one dispatch call.
const MAX_CONCURRENT_SENDS: usize = 8;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("No donors selected for dispatch")]
    NoDonorsSelected,
}

/// Subject/body pair with `{donor_name}`, `{blood_type}` and `{clinic_name}`
/// placeholders substituted per donor.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageTemplate {
    pub subject: String,
    pub body: String,
}

impl MessageTemplate {
    fn render(&self, donor: &Donor, clinic: &Clinic) -> (String, String) {
        let fill = |text: &str| {
            text.replace("{donor_name}", &donor.full_name)
                .replace("{blood_type}", donor.blood_type.as_label())
                .replace("{clinic_name}", &clinic.name)
        };
        (fill(&self.subject), fill(&self.body))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DispatchFailure {
    pub donor_id: Uuid,
    pub reason: String,
}

/// Aggregate outcome of one dispatch call. Always returned, even when every
/// individual send failed.
#[derive(Debug, Default, Serialize)]
pub struct DispatchReport {
    pub sent: usize,
    pub failed: usize,
    pub notification_ids: Vec<Uuid>,
    pub failures: Vec<DispatchFailure>,
}

enum DonorOutcome {
    Delivered {
        notification_id: Uuid,
    },
    NotDelivered {
        notification_id: Uuid,
        donor_id: Uuid,
        reason: String,
    },
    /// The ledger rejected the record itself; no notification row exists.
    NotRecorded { donor_id: Uuid, reason: String },
}

pub struct Dispatcher<'a> {
    ledger: &'a dyn NotificationLedger,
    mailer: &'a dyn Mailer,
    send_timeout: Duration,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        ledger: &'a dyn NotificationLedger,
        mailer: &'a dyn Mailer,
        send_timeout: Duration,
    ) -> Self {
        Self {
            ledger,
            mailer,
            send_timeout,
        }
    }

    /// Notify every selected donor and record each outcome in the ledger.
    /// Per-donor results are merged after the fan-out completes; the only
    /// whole-call failure is an empty selection. Selected ids with no
    /// donor record are reported as per-donor failures, never dropped.
    pub async fn dispatch(
        &self,
        request: &BloodRequest,
        clinic: &Clinic,
        selected: &[Uuid],
        donors: Vec<Donor>,
        template: &MessageTemplate,
    ) -> Result<DispatchReport, DispatchError> {
        if selected.is_empty() {
            return Err(DispatchError::NoDonorsSelected);
        }

        let found: HashSet<Uuid> = donors.iter().map(|donor| donor.id).collect();

        let outcomes: Vec<DonorOutcome> = stream::iter(
            donors
                .into_iter()
                .map(|donor| self.notify_donor(request, clinic, donor, template)),
        )
        .buffer_unordered(MAX_CONCURRENT_SENDS)
        .collect()
        .await;

        let mut report = DispatchReport::default();
        for donor_id in selected {
            if !found.contains(donor_id) {
                report.failed += 1;
                report.failures.push(DispatchFailure {
                    donor_id: *donor_id,
                    reason: "no donor record for this id".to_string(),
                });
            }
        }
        for outcome in outcomes {
            match outcome {
                DonorOutcome::Delivered { notification_id } => {
                    report.sent += 1;
                    report.notification_ids.push(notification_id);
                }
                DonorOutcome::NotDelivered {
                    notification_id,
                    donor_id,
                    reason,
                } => {
                    report.failed += 1;
                    report.notification_ids.push(notification_id);
                    report.failures.push(DispatchFailure { donor_id, reason });
                }
                DonorOutcome::NotRecorded { donor_id, reason } => {
                    report.failed += 1;
                    report.failures.push(DispatchFailure { donor_id, reason });
                }
            }
        }
        Ok(report)
    }

    async fn notify_donor(
        &self,
        request: &BloodRequest,
        clinic: &Clinic,
        donor: Donor,
        template: &MessageTemplate,
    ) -> DonorOutcome {
        let (subject, message) = template.render(&donor, clinic);

        let created = self
            .ledger
            .create(NewNotification {
                donor_id: donor.id,
                clinic_id: clinic.id,
                blood_request_id: request.id,
                email: donor.email.clone(),
                subject: subject.clone(),
                message,
            })
            .await;

        let notification = match created {
            Ok(notification) => notification,
            Err(err) => {
                warn!(donor_id = %donor.id, error = %err, "Could not record outreach attempt");
                return DonorOutcome::NotRecorded {
                    donor_id: donor.id,
                    reason: err.to_string(),
                };
            }
        };

        // A send that never returns within the timeout counts as failed;
        // the record must not stay pending indefinitely.
        let send_result = tokio::time::timeout(
            self.send_timeout,
            self.mailer.send(&donor.email, &subject, &notification.message),
        )
        .await;

        let outcome = match send_result {
            Ok(Ok(())) => SendOutcome::Delivered,
            Ok(Err(err)) => SendOutcome::Failed {
                reason: err.to_string(),
            },
            Err(_) => SendOutcome::Failed {
                reason: format!("send timed out after {:?}", self.send_timeout),
            },
        };

        let failure_reason = outcome.failure_reason().map(|r| r.to_string());
        match self
            .ledger
            .record_send_outcome(notification.id, outcome)
            .await
        {
            Ok(_) => match failure_reason {
                None => DonorOutcome::Delivered {
                    notification_id: notification.id,
                },
                Some(reason) => {
                    warn!(donor_id = %donor.id, %reason, "Outreach delivery failed");
                    DonorOutcome::NotDelivered {
                        notification_id: notification.id,
                        donor_id: donor.id,
                        reason,
                    }
                }
            },
            Err(err) => DonorOutcome::NotDelivered {
                notification_id: notification.id,
                donor_id: donor.id,
                reason: err.to_string(),
            },
        }
    }
}
