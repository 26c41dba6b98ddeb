//! Per-request dispatch.
//!
//! # Responsibilities
//! - Normalize the request path and look up its route
//! - Bind handler arguments from the route's parameter bindings
//! - Invoke the handler on its owning bean and produce the response
//!
//! # Design Decisions
//! - Reads only the sealed `ApplicationContext`; no locks on the hot path
//! - Handler errors and panics are contained to the request that caused them
//! - On success the response is exactly what the handler wrote

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use axum::http::StatusCode;

use crate::component::Argument;
use crate::container::ApplicationContext;
use crate::dispatch::failure::{panic_message, DispatchError};
use crate::http::{HttpRequest, HttpResponse, Parameters, ResponseParts};
use crate::observability::metrics;
use crate::routing::path::normalize_request_path;
use crate::routing::{ParameterBinding, Route};

/// Body of the response for unmapped URLs.
pub const NOT_FOUND_BODY: &str = "404 Not Found";

/// Per-request state, dropped once the response is produced.
struct DispatchContext<'r> {
    normalized_url: String,
    parameters: &'r Parameters,
    arguments: Vec<Argument>,
}

impl<'r> DispatchContext<'r> {
    fn new(normalized_url: String, parameters: &'r Parameters) -> Self {
        Self {
            normalized_url,
            parameters,
            arguments: Vec::new(),
        }
    }

    fn bind(&mut self, route: &Route, request: &HttpRequest, response: &HttpResponse) {
        self.arguments = route
            .parameters
            .iter()
            .map(|binding| match binding {
                ParameterBinding::Request => Argument::Request(request.clone()),
                ParameterBinding::Response => Argument::Response(response.clone()),
                ParameterBinding::RequestParam(name) => Argument::Text {
                    name: name.clone(),
                    value: self.parameters.joined(name),
                },
            })
            .collect();
    }
}

/// Routes requests to handler methods of the sealed context.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    context: Arc<ApplicationContext>,
}

impl Dispatcher {
    pub fn new(context: Arc<ApplicationContext>) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &Arc<ApplicationContext> {
        &self.context
    }

    /// The route a request path would be dispatched to.
    pub fn resolve(&self, path: &str) -> Option<&Route> {
        let url = normalize_request_path(path, &self.context.settings().context_path);
        self.context.routes().get(&url)
    }

    /// Dispatches one request.
    pub fn handle(&self, request: HttpRequest) -> ResponseParts {
        let started = Instant::now();
        let (outcome, parts) = self.dispatch(&request);
        metrics::record_dispatch(outcome, parts.status.as_u16(), started);
        parts
    }

    fn dispatch(&self, request: &HttpRequest) -> (&'static str, ResponseParts) {
        let settings = self.context.settings();
        let routes = self.context.routes();
        let mut dispatch = DispatchContext::new(
            normalize_request_path(request.path(), &settings.context_path),
            request.parameters(),
        );

        if routes.is_empty() {
            tracing::warn!(url = %dispatch.normalized_url, "No routes are mapped");
            return ("not_found", not_found());
        }

        let Some(route) = routes.get(&dispatch.normalized_url) else {
            tracing::debug!(url = %dispatch.normalized_url, "No route matched");
            return ("not_found", not_found());
        };

        let response = HttpResponse::new();
        dispatch.bind(route, request, &response);

        match self.invoke(route, dispatch.arguments) {
            Ok(()) => ("ok", response.take_parts()),
            Err(error) => {
                tracing::error!(
                    request_id = request.request_id().unwrap_or("unknown"),
                    url = %route.url,
                    handler = %route.handler_label(),
                    error = %error,
                    "Dispatch failed"
                );
                (error.kind(), error.render(settings.detailed_errors))
            }
        }
    }

    fn invoke(&self, route: &Route, arguments: Vec<Argument>) -> Result<(), DispatchError> {
        let handler = route.handler_label();
        let bean = self
            .context
            .bean(&route.owner)
            .ok_or_else(|| DispatchError::MissingTarget {
                owner: route.owner.clone(),
                handler: handler.clone(),
            })?;

        match panic::catch_unwind(AssertUnwindSafe(|| route.invoke(&bean.instance, arguments))) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(error)) => Err(DispatchError::from_invoke(handler, error)),
            Err(payload) => Err(DispatchError::Panic {
                handler,
                message: panic_message(payload.as_ref()),
            }),
        }
    }
}

fn not_found() -> ResponseParts {
    ResponseParts::text(StatusCode::NOT_FOUND, NOT_FOUND_BODY)
}
