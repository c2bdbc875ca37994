use axum::{routing::get, Router};

use crate::app_state::AppState;

use super::handlers::{donor_dashboard, list_donors};

pub fn donor_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_donors))
        .route("/:id/dashboard", get(donor_dashboard))
}
