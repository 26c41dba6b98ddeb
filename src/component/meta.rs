//! Marker builder and erased component metadata.
//!
//! # Responsibilities
//! - Collect stereotype, base path, interfaces, injection fields and routes
//!   declared by `Component::describe`
//! - Erase the typed declarations into closures over `Instance`
//!
//! # Design Decisions
//! - Every view of a bean is stored as `Arc<V>` inside an `Instance`, so the
//!   concrete type and each trait object are resolved the same way
//! - Handler parameter kinds are fixed here, when the route is declared

use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use heck::ToLowerCamelCase;

use crate::component::handler::{Argument, ArgumentKind, BindError, HandlerFn, InvokeError};
use crate::component::{Autowired, Component, ComponentError, TypeInfo};
use crate::container::injector::InjectError;
use crate::container::registry::Bean;

/// A shared, type-erased component instance.
pub type Instance = Arc<dyn Any + Send + Sync>;

pub(crate) type Upcast = Arc<dyn Fn(&Instance) -> Option<Instance> + Send + Sync>;
pub(crate) type Injector = Arc<dyn Fn(&Instance, &Bean) -> Result<(), InjectError> + Send + Sync>;
pub(crate) type Invoker = Arc<dyn Fn(&Instance, Vec<Argument>) -> Result<(), InvokeError> + Send + Sync>;

/// Role of a component in the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stereotype {
    /// Not managed by the container.
    Plain,
    /// Handler group exposing routes.
    Controller,
    /// Injectable service, optionally with an explicit bean name.
    Service { name: Option<String> },
}

impl Stereotype {
    pub fn label(&self) -> &'static str {
        match self {
            Stereotype::Plain => "plain",
            Stereotype::Controller => "controller",
            Stereotype::Service { .. } => "service",
        }
    }
}

/// A capability trait implemented by a component.
#[derive(Clone)]
pub struct InterfaceDecl {
    pub info: TypeInfo,
    pub(crate) upcast: Upcast,
}

/// A field tagged for injection.
#[derive(Clone)]
pub struct FieldDecl {
    pub field: &'static str,
    pub qualifier: Option<String>,
    pub expects: TypeInfo,
    pub(crate) inject: Injector,
}

impl FieldDecl {
    /// Bean name this field resolves to: the override, else the field name in lowerCamelCase.
    pub fn target_name(&self) -> String {
        match &self.qualifier {
            Some(name) => name.clone(),
            None => self.field.to_lower_camel_case(),
        }
    }
}

/// A route-mapped handler method.
#[derive(Clone)]
pub struct MethodDecl {
    pub name: &'static str,
    pub path: String,
    pub kinds: Vec<ArgumentKind>,
    pub param_names: Vec<String>,
    pub(crate) invoker: Invoker,
}

impl fmt::Debug for MethodDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDecl")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("kinds", &self.kinds)
            .field("param_names", &self.param_names)
            .finish_non_exhaustive()
    }
}

/// Typed builder handed to `Component::describe`.
pub struct ComponentMeta<T> {
    stereotype: Stereotype,
    base_path: Option<String>,
    interfaces: Vec<InterfaceDecl>,
    fields: Vec<FieldDecl>,
    methods: Vec<MethodDecl>,
    _component: PhantomData<fn() -> T>,
}

impl<T: Component> ComponentMeta<T> {
    fn new() -> Self {
        Self {
            stereotype: Stereotype::Plain,
            base_path: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            _component: PhantomData,
        }
    }

    /// Marks the component as a handler group.
    pub fn controller(&mut self) -> &mut Self {
        self.stereotype = Stereotype::Controller;
        self
    }

    /// Marks the component as a service named after its type.
    pub fn service(&mut self) -> &mut Self {
        self.stereotype = Stereotype::Service { name: None };
        self
    }

    /// Marks the component as a service with an explicit bean name.
    ///
    /// A blank name falls back to the type-derived name.
    pub fn service_named(&mut self, name: &str) -> &mut Self {
        let name = name.trim();
        self.stereotype = Stereotype::Service {
            name: (!name.is_empty()).then(|| name.to_string()),
        };
        self
    }

    /// Base path prepended to every route of this component.
    pub fn request_mapping(&mut self, base: &str) -> &mut Self {
        self.base_path = Some(base.to_string());
        self
    }

    /// Declares that the component can be viewed as `V`, usually `dyn Trait`.
    pub fn implements<V>(&mut self, upcast: fn(Arc<T>) -> Arc<V>) -> &mut Self
    where
        V: ?Sized + Send + Sync + 'static,
    {
        self.interfaces.push(InterfaceDecl {
            info: TypeInfo::of::<V>(),
            upcast: Arc::new(move |instance: &Instance| {
                let concrete = Arc::clone(instance).downcast::<T>().ok()?;
                Some(Arc::new(upcast(concrete)) as Instance)
            }),
        });
        self
    }

    /// Injection point resolved by field name.
    pub fn autowired<V>(&mut self, field: &'static str, access: fn(&T) -> &Autowired<V>) -> &mut Self
    where
        V: ?Sized + Send + Sync + 'static,
    {
        self.push_field(field, None, access)
    }

    /// Injection point resolved by an explicit bean name.
    pub fn autowired_named<V>(
        &mut self,
        field: &'static str,
        name: &str,
        access: fn(&T) -> &Autowired<V>,
    ) -> &mut Self
    where
        V: ?Sized + Send + Sync + 'static,
    {
        let name = name.trim();
        let qualifier = (!name.is_empty()).then(|| name.to_string());
        self.push_field(field, qualifier, access)
    }

    fn push_field<V>(
        &mut self,
        field: &'static str,
        qualifier: Option<String>,
        access: fn(&T) -> &Autowired<V>,
    ) -> &mut Self
    where
        V: ?Sized + Send + Sync + 'static,
    {
        let expects = TypeInfo::of::<V>();
        self.fields.push(FieldDecl {
            field,
            qualifier,
            expects,
            inject: Arc::new(move |owner: &Instance, bean: &Bean| {
                let owner = owner
                    .downcast_ref::<T>()
                    .ok_or(InjectError::OwnerMismatch {
                        expected: std::any::type_name::<T>(),
                    })?;
                let view = bean.view::<V>().ok_or_else(|| InjectError::Incompatible {
                    bean: bean.name.clone(),
                    expected: expects.qualified_name(),
                })?;
                access(owner).inject(view)
            }),
        });
        self
    }

    /// Maps `path` (relative to the base path) to a handler method.
    pub fn route<Args, H>(&mut self, path: &str, method_name: &'static str, handler: H) -> RouteMapping<'_>
    where
        H: HandlerFn<T, Args>,
        Args: 'static,
    {
        let invoker: Invoker = Arc::new(move |target: &Instance, arguments: Vec<Argument>| {
            let this = target
                .downcast_ref::<T>()
                .ok_or(BindError::TargetMismatch {
                    expected: std::any::type_name::<T>(),
                })?;
            HandlerFn::<T, Args>::call(&handler, this, arguments)
        });
        self.methods.push(MethodDecl {
            name: method_name,
            path: path.to_string(),
            kinds: H::argument_kinds(),
            param_names: Vec::new(),
            invoker,
        });
        let index = self.methods.len() - 1;
        RouteMapping {
            method: &mut self.methods[index],
        }
    }

    fn finish(self) -> ComponentMetadata {
        ComponentMetadata {
            type_info: TypeInfo::of::<T>(),
            stereotype: self.stereotype,
            base_path: self.base_path,
            interfaces: self.interfaces,
            fields: self.fields,
            methods: self.methods,
            construct: construct_instance::<T>,
            concrete_view: concrete_view::<T>,
        }
    }
}

/// Handle returned by `ComponentMeta::route` for naming text parameters.
pub struct RouteMapping<'m> {
    method: &'m mut MethodDecl,
}

impl RouteMapping<'_> {
    /// Names the next text parameter of the handler, in declaration order.
    pub fn request_param(self, name: &str) -> Self {
        self.method.param_names.push(name.to_string());
        self
    }
}

/// Type-erased markers of one component.
pub struct ComponentMetadata {
    pub type_info: TypeInfo,
    pub stereotype: Stereotype,
    pub base_path: Option<String>,
    pub interfaces: Vec<InterfaceDecl>,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<MethodDecl>,
    pub(crate) construct: fn() -> Result<Instance, ComponentError>,
    pub(crate) concrete_view: fn(&Instance) -> Option<Instance>,
}

impl ComponentMetadata {
    /// Runs the no-argument constructor.
    pub fn instantiate(&self) -> Result<Instance, ComponentError> {
        (self.construct)()
    }

    /// All views the instance can be injected as, keyed by the viewed type.
    pub(crate) fn views(&self, instance: &Instance) -> Vec<(TypeId, Instance)> {
        let mut views = Vec::with_capacity(self.interfaces.len() + 1);
        if let Some(view) = (self.concrete_view)(instance) {
            views.push((self.type_info.type_id, view));
        }
        for interface in &self.interfaces {
            if let Some(view) = (interface.upcast)(instance) {
                views.push((interface.info.type_id, view));
            }
        }
        views
    }
}

impl fmt::Debug for ComponentMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentMetadata")
            .field("type", &self.type_info.qualified_name())
            .field("stereotype", &self.stereotype)
            .field("base_path", &self.base_path)
            .field(
                "interfaces",
                &self.interfaces.iter().map(|i| i.info.qualified_name()).collect::<Vec<_>>(),
            )
            .field("fields", &self.fields.iter().map(|f| f.field).collect::<Vec<_>>())
            .field("methods", &self.methods)
            .finish()
    }
}

/// Reads the markers of `T`.
pub fn metadata_of<T: Component>() -> ComponentMetadata {
    let mut meta = ComponentMeta::<T>::new();
    T::describe(&mut meta);
    meta.finish()
}

fn construct_instance<T: Component>() -> Result<Instance, ComponentError> {
    T::construct().map(|component| Arc::new(component) as Instance)
}

fn concrete_view<T: Component>(instance: &Instance) -> Option<Instance> {
    let concrete = Arc::clone(instance).downcast::<T>().ok()?;
    Some(Arc::new(concrete) as Instance)
}
