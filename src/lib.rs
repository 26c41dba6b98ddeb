//! Minimal web dispatch engine.
//!
//! Components are discovered under a root namespace, instantiated once,
//! wired through `Autowired` fields, and their handler methods mapped to
//! URLs. Requests are then dispatched to those methods with bound arguments.

pub mod admin;
pub mod catalog;
pub mod component;
pub mod config;
pub mod container;
pub mod demo;
pub mod dispatch;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

#[cfg(test)]
pub(crate) mod test_support;

pub use inventory;

pub use config::schema::DispatcherConfig;
pub use container::ApplicationContext;
pub use dispatch::Dispatcher;
pub use http::HttpServer;
pub use lifecycle::Shutdown;

/// Everything a component definition needs.
pub mod prelude {
    pub use crate::component::{
        Autowired, Component, ComponentError, ComponentMeta, DynError,
    };
    pub use crate::http::{HttpRequest, HttpResponse};
}

/// Registers component types with the catalog.
///
/// Each type is recorded under `module_path!()`, so the scan namespace selects
/// it by the module it is declared in.
#[macro_export]
macro_rules! component {
    ($($component:ident),+ $(,)?) => {
        $(
            $crate::inventory::submit! {
                $crate::catalog::ComponentRegistration::new(
                    concat!(module_path!(), "::", stringify!($component)),
                    stringify!($component),
                    $crate::component::metadata_of::<$component>,
                )
            }
        )+
    };
}
