use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::{apply_security_headers, create_cors_layer};
use crate::handlers::{self, statistics};
use crate::AppState;

pub fn create_routes(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/events",
            post(handlers::create_event).get(handlers::list_events),
        )
        // Static segment must be registered alongside the capture route.
        .route("/events/statistics", get(statistics::event_statistics))
        .route(
            "/events/:id",
            get(handlers::get_event)
                .patch(handlers::update_event)
                .delete(handlers::delete_event),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(create_cors_layer());

    apply_security_headers(router)
}
