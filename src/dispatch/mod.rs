//! Request dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! HttpRequest
//!     → dispatcher.rs (normalize URL, look up route)
//!         → UNMATCHED → 404 "404 Not Found"
//!         → MATCHED → bind arguments → invoke handler on owner bean
//!             → Ok → handler-written response
//!             → Err / panic → failure.rs (500 with details)
//! ```

pub mod dispatcher;
pub mod failure;

pub use dispatcher::{Dispatcher, NOT_FOUND_BODY};
pub use failure::DispatchError;
