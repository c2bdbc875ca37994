use std::sync::Arc;

use sqlx::PgPool;

use crate::config;
use crate::ledger::NotificationLedger;
use crate::mailer::Mailer;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub env: config::Config,
    pub mailer: Arc<dyn Mailer>,
    pub ledger: Arc<dyn NotificationLedger>,
}

impl AppState {
    pub fn new(
        db: PgPool,
        env: config::Config,
        mailer: Arc<dyn Mailer>,
        ledger: Arc<dyn NotificationLedger>,
    ) -> Self {
        Self {
            db,
            env,
            mailer,
            ledger,
        }
    }
}
