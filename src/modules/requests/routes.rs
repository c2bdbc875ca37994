use axum::{
    routing::{get, post},
    Router,
};

use crate::app_state::AppState;

use super::handlers::{create_request, list_candidates, list_requests, request_notifications};

pub fn request_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_request).get(list_requests))
        .route("/:id/donors", get(list_candidates))
        .route("/:id/notifications", get(request_notifications))
}
