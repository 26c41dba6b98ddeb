//! Admin introspection API.
//!
//! # Responsibilities
//! - Expose the sealed context (routes, beans, startup report) as JSON
//! - Require `Authorization: Bearer <api_key>` on every endpoint
//!
//! # Design Decisions
//! - Served on its own listener, never on the dispatch port
//! - Read-only: the context is immutable once sealed

pub mod auth;
pub mod handlers;

use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use crate::container::ApplicationContext;
use self::auth::admin_auth_middleware;
use self::handlers::*;

/// State shared by the admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub context: Arc<ApplicationContext>,
    pub api_key: Arc<str>,
}

impl AdminState {
    pub fn new(context: Arc<ApplicationContext>, api_key: &str) -> Self {
        Self {
            context,
            api_key: Arc::from(api_key),
        }
    }
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/routes", get(get_routes))
        .route("/admin/beans", get(get_beans))
        .route("/admin/report", get(get_report))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}
