pub mod auth;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod state;

pub use auth::{Principal, Role, RoleResolver};
pub use state::ApiState;

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use sqlx::Error as SqlxError;

use crate::application::error::ErrorReport;
use crate::infra::db::PostgresRepositories;

use self::middleware::{log_responses, set_request_context};

/// Build the catalog API router. Reads are public; the role resolved by
/// the authentication layer gates the mutating handlers.
pub fn build_router(state: ApiState) -> Router {
    let auth_state = state.clone();

    Router::new()
        .route(
            "/api/authors",
            get(handlers::authors::list).post(handlers::authors::create),
        )
        .route(
            "/api/authors/{id}",
            get(handlers::authors::detail)
                .put(handlers::authors::update)
                .delete(handlers::authors::remove),
        )
        .route(
            "/api/books",
            get(handlers::books::list).post(handlers::books::create),
        )
        .route(
            "/api/books/{id}",
            get(handlers::books::detail)
                .put(handlers::books::update)
                .delete(handlers::books::remove),
        )
        .with_state(state)
        .layer(axum_middleware::from_fn_with_state(
            auth_state,
            auth::authenticate,
        ))
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}

pub fn build_health_router(db: Arc<PostgresRepositories>) -> Router {
    Router::new().route("/healthz", get(health)).with_state(db)
}

async fn health(State(db): State<Arc<PostgresRepositories>>) -> Response {
    db_health_response(db.health_check().await)
}

fn db_health_response(result: Result<(), SqlxError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::db_health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}
