//! Inversion-of-control container.
//!
//! # Data Flow
//! ```text
//! Catalog
//!     → registry.rs (one instance per controller/service, stored by name)
//!     → injector.rs (fill Autowired fields from the registry)
//!     → context.rs (seal registry + routes into ApplicationContext)
//! ```
//!
//! # Design Decisions
//! - Every bean is a process-wide singleton shared through `Arc`
//! - Startup mutates a `ContextBuilder`; serving only sees the sealed context

pub mod context;
pub mod injector;
pub mod registry;

pub use context::{ApplicationContext, ContextBuilder, DispatchSettings};
pub use injector::{InjectError, InjectionTarget};
pub use registry::{default_bean_name, Bean, BeanRegistry};
