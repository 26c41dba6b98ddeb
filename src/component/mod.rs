//! Component markers.
//!
//! # Data Flow
//! ```text
//! impl Component for T
//!     → T::describe(&mut ComponentMeta<T>)   (stereotype, fields, routes)
//!     → metadata_of::<T>() erases it into ComponentMetadata
//!     → component!(T) submits a ComponentRegistration to the catalog
//! ```
//!
//! # Design Decisions
//! - Markers are plain builder calls, read once at startup
//! - Typed fields and handler methods are captured as closures, so nothing
//!   is looked up by name once the application is serving
//! - Instances are shared as `Arc<dyn Any + Send + Sync>`

pub mod autowired;
pub mod handler;
pub mod meta;

use std::any::TypeId;

pub use autowired::{Autowired, UnsatisfiedDependency};
pub use handler::{Argument, ArgumentKind, BindError, FromArgument, HandlerFn, IntoHandlerResult, InvokeError};
pub use meta::{
    metadata_of, ComponentMeta, ComponentMetadata, FieldDecl, Instance, InterfaceDecl, MethodDecl,
    RouteMapping, Stereotype,
};

/// Boxed error returned by handlers and constructors.
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// A type that can be discovered, instantiated and wired by the container.
pub trait Component: Send + Sync + Sized + 'static {
    /// No-argument constructor invoked once at startup.
    fn construct() -> Result<Self, ComponentError>;

    /// Declares the markers attached to this component.
    fn describe(meta: &mut ComponentMeta<Self>);
}

/// Failure raised by a component constructor.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ComponentError {
    message: String,
}

impl ComponentError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Type name and type id.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct TypeInfo {
    pub type_name: &'static str,
    pub type_id: TypeId,
}

impl TypeInfo {
    pub fn of<T: ?Sized + 'static>() -> TypeInfo {
        TypeInfo {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }

    /// Fully-qualified path of the type, without the `dyn ` prefix of trait objects.
    pub fn qualified_name(&self) -> &'static str {
        self.type_name
            .strip_prefix("dyn ")
            .unwrap_or(self.type_name)
    }
}

impl std::fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.qualified_name())
    }
}
