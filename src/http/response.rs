//! Response handles written by handlers.
//!
//! # Responsibilities
//! - Buffer status, headers and body written during a handler call
//! - Convert the finished buffer into an axum response
//!
//! # Design Decisions
//! - One handle per request; clones share the same buffer
//! - Defaults are 200 and `text/plain; charset=utf-8`
//! - A poisoned buffer is still readable, so a panicking handler never
//!   prevents the error response

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

pub const TEXT_PLAIN_UTF_8: &str = "text/plain; charset=utf-8";

#[derive(Debug)]
struct ResponseBuffer {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Default for ResponseBuffer {
    fn default() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN_UTF_8));
        Self {
            status: StatusCode::OK,
            headers,
            body: Vec::new(),
        }
    }
}

/// Writable response handle for one request.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    buffer: Arc<Mutex<ResponseBuffer>>,
}

impl HttpResponse {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ResponseBuffer> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends text to the body.
    pub fn write(&self, text: &str) {
        self.lock().body.extend_from_slice(text.as_bytes());
    }

    pub fn write_bytes(&self, bytes: &[u8]) {
        self.lock().body.extend_from_slice(bytes);
    }

    pub fn set_status(&self, status: StatusCode) {
        self.lock().status = status;
    }

    pub fn status(&self) -> StatusCode {
        self.lock().status
    }

    pub fn set_header(&self, name: HeaderName, value: HeaderValue) {
        self.lock().headers.insert(name, value);
    }

    /// Discards everything written so far.
    pub fn reset(&self) {
        *self.lock() = ResponseBuffer::default();
    }

    /// Moves the buffered response out, leaving a fresh default buffer.
    pub fn take_parts(&self) -> ResponseParts {
        let buffer = std::mem::take(&mut *self.lock());
        ResponseParts {
            status: buffer.status,
            headers: buffer.headers,
            body: Bytes::from(buffer.body),
        }
    }
}

/// A finished response produced by the dispatcher.
#[derive(Debug, Clone)]
pub struct ResponseParts {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ResponseParts {
    /// A `text/plain` response with the given status and body.
    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN_UTF_8));
        Self {
            status,
            headers,
            body: Bytes::from(body.into()),
        }
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl IntoResponse for ResponseParts {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let parts = HttpResponse::new().take_parts();
        assert_eq!(parts.status, StatusCode::OK);
        assert_eq!(parts.headers[header::CONTENT_TYPE], TEXT_PLAIN_UTF_8);
        assert!(parts.body.is_empty());
    }

    #[test]
    fn test_clones_share_buffer() {
        let response = HttpResponse::new();
        let handle = response.clone();
        handle.write("Hello ");
        response.write("World");
        handle.set_status(StatusCode::CREATED);

        let parts = response.take_parts();
        assert_eq!(parts.status, StatusCode::CREATED);
        assert_eq!(parts.body_text(), "Hello World");
    }

    #[test]
    fn test_reset_discards_partial_output() {
        let response = HttpResponse::new();
        response.write("partial");
        response.set_header(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        response.reset();

        let parts = response.take_parts();
        assert!(parts.body.is_empty());
        assert!(parts.headers.get(header::CACHE_CONTROL).is_none());
    }

    #[test]
    fn test_poisoned_buffer_is_still_usable() {
        let response = HttpResponse::new();
        let handle = response.clone();
        let _ = std::thread::spawn(move || {
            let _guard = handle.buffer.lock().unwrap();
            panic!("poison");
        })
        .join();

        response.write("after");
        assert_eq!(response.take_parts().body_text(), "after");
    }

    #[test]
    fn test_into_response() {
        let response = ResponseParts::text(StatusCode::NOT_FOUND, "404 Not Found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[header::CONTENT_TYPE], TEXT_PLAIN_UTF_8);
    }
}
