use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use tracing::info;

mod app;
mod app_state;
mod config;
mod db;
mod dispatch;
mod error;
mod ledger;
mod mailer;
mod matching;
mod middleware;
mod modules;
mod telemetry;

use app_state::AppState;
use ledger::{NotificationLedger, PgLedger};
use mailer::{HttpMailer, LogMailer, Mailer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = config::init()?;
    let telemetry = telemetry::init_telemetry(None).await?;

    let pool = db::init_pool().await?;

    let mailer: Arc<dyn Mailer> = match &config.mail.api_endpoint {
        Some(endpoint) => Arc::new(HttpMailer::new(
            endpoint.clone(),
            config.mail.from_address.clone(),
            config.mail.api_key.clone(),
        )),
        None => {
            info!("MAIL_API_ENDPOINT not set, outbound mail will be logged only");
            Arc::new(LogMailer)
        }
    };

    let ledger: Arc<dyn NotificationLedger> = Arc::new(PgLedger::new(pool.clone()));

    let state = AppState::new(pool, config.clone(), mailer, ledger);
    let app = app::create_router(state);

    let addr = config.server_addr();
    info!("{} listening on {}", config.app.name, addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .await
        .context("Failed to serve application")?;

    telemetry.shutdown().await?;

    Ok(())
}
