//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Catalog → Registry → Injector → Route table → seal ApplicationContext
//!     (report.rs collects fatal errors and advisory issues)
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain in-flight requests → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then container, then listeners
//! - Ordered shutdown: stop accept, drain, close

pub mod report;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use report::{StartupError, StartupIssue, StartupReport};
pub use shutdown::Shutdown;
