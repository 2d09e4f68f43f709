pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod helpers;
pub mod middleware;
pub mod models;

#[cfg(test)]
pub mod testing;

use axum::{
    middleware::from_fn,
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use handlers::AppState;

/// The full HTTP surface: public reads, admin-only writes.
pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(handlers::health::health))
        .merge(job_public_routes())
        .merge(job_admin_routes())
        .merge(company_routes())
        .layer(from_fn(middleware::authenticate_jwt));

    let config = config::config();
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    if config.security.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    router.with_state(state)
}

fn job_public_routes() -> Router<AppState> {
    use handlers::jobs;

    Router::new()
        .route("/jobs", get(jobs::job_list))
        .route("/jobs/:id", get(jobs::job_get))
}

fn job_admin_routes() -> Router<AppState> {
    use axum::routing::{patch, post};
    use handlers::jobs;

    Router::new()
        .route("/jobs", post(jobs::job_post))
        .route("/jobs/:id", patch(jobs::job_patch).delete(jobs::job_delete))
        .route_layer(from_fn(middleware::ensure_admin))
}

fn company_routes() -> Router<AppState> {
    Router::new().route("/companies/:handle/jobs", get(handlers::companies::company_jobs))
}
