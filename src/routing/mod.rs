//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     Controller beans (catalog order)
//!     → path.rs (compose "/" + base + "/" + method path, collapse "/")
//!     → router.rs (bind parameter strategies, apply collision policy)
//!     → Freeze as immutable RouteTable
//!
//! Incoming Request:
//!     → path.rs (strip context path, collapse "/")
//!     → router.rs (exact lookup)
//!     → Return: matched Route or None
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Exact string match only
//! - Deterministic: same input always matches same route

pub mod path;
pub mod router;

pub use router::{build_routes, ParameterBinding, Route, RouteTable};
