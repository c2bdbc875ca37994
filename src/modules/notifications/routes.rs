use axum::{
    routing::{get, post},
    Router,
};

use crate::app_state::AppState;

use super::handlers::{
    confirm_donation, dispatch_notifications, notification_history, set_interest,
};

pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(notification_history))
        .route("/dispatch", post(dispatch_notifications))
        .route("/:id/interest", post(set_interest))
        .route("/:id/confirm-donation", post(confirm_donation))
}
