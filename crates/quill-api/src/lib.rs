pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::handlers::stream;
use crate::routes::{drafts, feedback, health, messages, scheduled, threads};
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health & docs
        .route("/health", get(health::health_check))
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
        // Threads
        .route("/threads", post(threads::create_thread).get(threads::list_threads))
        .route(
            "/threads/:thread_id",
            get(threads::get_thread)
                .patch(threads::update_thread)
                .delete(threads::delete_thread),
        )
        // Messages
        .route(
            "/threads/:thread_id/messages",
            get(messages::list_messages).post(stream::send_message_stream),
        )
        // Drafts
        .route("/threads/:thread_id/drafts", get(drafts::list_drafts))
        .route(
            "/drafts/:draft_id",
            get(drafts::get_draft)
                .patch(drafts::rename_draft)
                .delete(drafts::delete_draft),
        )
        .route(
            "/drafts/:draft_id/versions",
            get(drafts::list_versions).post(drafts::append_version),
        )
        .route(
            "/drafts/:draft_id/versions/:version",
            get(drafts::get_version).put(drafts::overwrite_version),
        )
        .route("/drafts/:draft_id/schedule", post(scheduled::schedule_from_draft))
        // Scheduled drafts
        .route(
            "/scheduled",
            post(scheduled::create_scheduled).get(scheduled::list_scheduled),
        )
        .route("/scheduled/calendar", get(scheduled::calendar))
        .route(
            "/scheduled/:id",
            get(scheduled::get_scheduled)
                .patch(scheduled::update_scheduled)
                .delete(scheduled::delete_scheduled),
        )
        // Feedback
        .route(
            "/messages/:message_id/feedback",
            get(feedback::get_feedback).put(feedback::submit_feedback),
        )
        .route("/threads/:thread_id/feedback", get(feedback::list_thread_feedback));

    api_routes
        .layer(axum_middleware::from_fn(middleware::logging::log_request))
        .layer(TimeoutLayer::new(std::time::Duration::from_secs(300)))
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if config.cors.enabled {
        let cors = CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::PATCH,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers(Any);

        if config.cors.origins.iter().any(|o| o == "*") {
            cors.allow_origin(Any)
        } else {
            let parsed_origins: Vec<axum::http::HeaderValue> = config
                .cors
                .origins
                .iter()
                .filter_map(|o| o.parse::<axum::http::HeaderValue>().ok())
                .collect();

            cors.allow_origin(parsed_origins)
        }
    } else {
        CorsLayer::permissive()
    }
}
