//! Operator API, mounted under `/admin` when enabled.
//!
//! Every route requires the admin bearer key. This is the only surface that
//! exposes diagnostics or debug commands.

pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::http::server::AppState;

pub fn setup_admin_router(state: AppState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/backends", get(get_backends))
        .route("/admin/generate", post(post_generate))
        .route("/admin/reproduce", post(post_reproduce))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}
