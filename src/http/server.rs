//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the dispatch handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Buffer request bodies and hand them to the dispatcher
//! - Bind server to listener, with the admin API alongside when enabled

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use http_body_util::LengthLimitError;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::{setup_admin_router, AdminState};
use crate::config::DispatcherConfig;
use crate::container::ApplicationContext;
use crate::dispatch::Dispatcher;
use crate::http::request::{HttpRequest, UuidRequestId};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub max_body_bytes: usize,
}

/// HTTP server hosting the dispatcher.
pub struct HttpServer {
    router: Router,
    config: DispatcherConfig,
    context: Arc<ApplicationContext>,
}

impl HttpServer {
    /// Create a new HTTP server over a sealed application context.
    pub fn new(config: DispatcherConfig, context: Arc<ApplicationContext>) -> Self {
        let state = AppState {
            dispatcher: Dispatcher::new(Arc::clone(&context)),
            max_body_bytes: config.dispatch.max_body_bytes,
        };
        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            context,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &DispatcherConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(dispatch_handler).post(dispatch_handler))
            .route("/{*path}", get(dispatch_handler).post(dispatch_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// The router, for driving the server without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.context.routes().len(),
            "HTTP server starting"
        );

        if self.config.admin.enabled {
            let admin_listener = TcpListener::bind(&self.config.admin.bind_address).await?;
            let admin_router = setup_admin_router(AdminState::new(
                Arc::clone(&self.context),
                &self.config.admin.api_key,
            ));
            let mut admin_shutdown = shutdown.resubscribe();
            tracing::info!(address = %self.config.admin.bind_address, "Admin API starting");
            tokio::spawn(async move {
                let result = axum::serve(admin_listener, admin_router)
                    .with_graceful_shutdown(async move {
                        let _ = admin_shutdown.recv().await;
                    })
                    .await;
                if let Err(e) = result {
                    tracing::error!(error = %e, "Admin API failed");
                }
            });
        }

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }
}

/// Buffers the request and runs the dispatcher on a blocking worker.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, path = %parts.uri.path(), "Request body rejected");
            return body_rejection(&e).into_response();
        }
    };

    let request = HttpRequest::new(parts.method, &parts.uri, parts.headers, body);
    let dispatcher = state.dispatcher.clone();
    match tokio::task::spawn_blocking(move || dispatcher.handle(request)).await {
        Ok(parts) => parts.into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Dispatch worker failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "500 Internal Server Error").into_response()
        }
    }
}

/// 413 when the body exceeded the limit, 400 when it could not be read.
fn body_rejection(error: &axum::Error) -> (StatusCode, &'static str) {
    let mut source: Option<&(dyn Error + 'static)> = Some(error);
    while let Some(current) = source {
        if current.is::<LengthLimitError>() {
            return (StatusCode::PAYLOAD_TOO_LARGE, "413 Payload Too Large");
        }
        source = current.source();
    }
    (StatusCode::BAD_REQUEST, "400 Bad Request")
}
