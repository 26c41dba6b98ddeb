//! Request handles passed to handlers.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for every inbound request
//! - Decode query and form parameters into an ordered multi-map
//! - Expose an immutable, cheaply cloned request handle
//!
//! # Design Decisions
//! - Form bodies are merged after query parameters, so query values come first
//! - The body is buffered by the host before dispatch; handlers never stream

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::http::uri::InvalidUri;
use axum::http::{header, HeaderMap, HeaderValue, Method, Request, Uri};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Standard header for request correlation.
pub const X_REQUEST_ID: &str = "x-request-id";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Generates `x-request-id` values for the request-id layers.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Request parameters, name → values in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    values: HashMap<String, Vec<String>>,
}

impl Parameters {
    /// Decodes an `application/x-www-form-urlencoded` string.
    pub fn parse(encoded: &str) -> Self {
        let mut parameters = Self::default();
        parameters.extend_encoded(encoded.as_bytes());
        parameters
    }

    fn extend_encoded(&mut self, encoded: &[u8]) {
        for (name, value) in url::form_urlencoded::parse(encoded) {
            self.values
                .entry(name.into_owned())
                .or_default()
                .push(value.into_owned());
        }
    }

    pub fn values(&self, name: &str) -> &[String] {
        self.values.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn first(&self, name: &str) -> Option<&str> {
        self.values(name).first().map(String::as_str)
    }

    /// All values of `name` joined with `,`, or `None` if absent.
    pub fn joined(&self, name: &str) -> Option<String> {
        self.values.get(name).map(|values| values.join(","))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug)]
struct RequestParts {
    method: Method,
    path: String,
    query: Option<String>,
    headers: HeaderMap,
    parameters: Parameters,
    body: Bytes,
}

/// Read-only view of one inbound request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    inner: Arc<RequestParts>,
}

impl HttpRequest {
    pub fn new(method: Method, uri: &Uri, headers: HeaderMap, body: Bytes) -> Self {
        let mut parameters = Parameters::default();
        if let Some(query) = uri.query() {
            parameters.extend_encoded(query.as_bytes());
        }
        if method == Method::POST && is_form(&headers) {
            parameters.extend_encoded(&body);
        }

        Self {
            inner: Arc::new(RequestParts {
                method,
                path: uri.path().to_string(),
                query: uri.query().map(str::to_string),
                headers,
                parameters,
                body,
            }),
        }
    }

    /// A bodiless GET for `target` (path plus optional query).
    pub fn get(target: &str) -> Result<Self, InvalidUri> {
        let uri = target.parse::<Uri>()?;
        Ok(Self::new(Method::GET, &uri, HeaderMap::new(), Bytes::new()))
    }

    /// A POST for `target` carrying a form-encoded body.
    pub fn post_form(target: &str, form: &str) -> Result<Self, InvalidUri> {
        let uri = target.parse::<Uri>()?;
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
        Ok(Self::new(Method::POST, &uri, headers, Bytes::copy_from_slice(form.as_bytes())))
    }

    pub fn method(&self) -> &Method {
        &self.inner.method
    }

    /// Raw request path, before context path stripping.
    pub fn path(&self) -> &str {
        &self.inner.path
    }

    pub fn query(&self) -> Option<&str> {
        self.inner.query.as_deref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.inner.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn request_id(&self) -> Option<&str> {
        self.header(X_REQUEST_ID)
    }

    pub fn parameters(&self) -> &Parameters {
        &self.inner.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.inner.parameters.first(name)
    }

    pub fn body(&self) -> &Bytes {
        &self.inner.body
    }
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
        .unwrap_or(false)
}
