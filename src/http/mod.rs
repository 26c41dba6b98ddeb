//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout, body buffering)
//!     → request.rs (decode parameters into an HttpRequest)
//!     → [dispatcher resolves route and invokes handler]
//!     → response.rs (buffered HttpResponse → ResponseParts)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{HttpRequest, Parameters, UuidRequestId, X_REQUEST_ID};
pub use response::{HttpResponse, ResponseParts};
pub use server::HttpServer;
