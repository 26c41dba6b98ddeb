//! Fixture components for unit tests.
//!
//! Registrations are listed explicitly under synthetic `fixtures::*`
//! namespaces, so unit tests never depend on what else is linked in.

use std::sync::Arc;

use crate::catalog::ComponentRegistration;
use crate::component::{metadata_of, Autowired, Component, ComponentError, ComponentMeta, DynError};
use crate::http::{HttpRequest, HttpResponse};

macro_rules! fixture {
    ($namespace:literal, $ty:ident) => {
        ComponentRegistration::new(
            concat!($namespace, "::", stringify!($ty)),
            stringify!($ty),
            metadata_of::<$ty>,
        )
    };
}

pub trait Greeter: Send + Sync {
    fn greet(&self, name: &str) -> String;
}

#[derive(Default)]
pub struct GreeterImpl;

impl Greeter for GreeterImpl {
    fn greet(&self, name: &str) -> String {
        format!("Hello {name}")
    }
}

impl Component for GreeterImpl {
    fn construct() -> Result<Self, ComponentError> {
        Ok(GreeterImpl)
    }

    fn describe(meta: &mut ComponentMeta<Self>) {
        meta.service_named("greeter")
            .implements::<dyn Greeter>(|this| this as Arc<dyn Greeter>);
    }
}

#[derive(Default)]
pub struct GreetingController {
    pub greeter: Autowired<dyn Greeter>,
    pub loud_greeter: Autowired<dyn Greeter>,
    pub audit_log: Autowired<dyn Greeter>,
    pub wrong_type: Autowired<dyn Greeter>,
}

impl GreetingController {
    fn hello(&self, response: HttpResponse, name: Option<String>) -> Result<(), DynError> {
        let greeter = self.greeter.require()?;
        response.write(&greeter.greet(name.as_deref().unwrap_or("stranger")));
        Ok(())
    }

    fn raw(&self, request: HttpRequest, response: HttpResponse) {
        response.write(&format!(
            "{} {} {}",
            request.method(),
            request.path(),
            String::from_utf8_lossy(request.body())
        ));
    }

    fn fail(&self, response: HttpResponse) -> Result<(), DynError> {
        response.write("partial");
        Err("greeting unavailable".into())
    }

    fn panic(&self) {
        panic!("handler exploded");
    }

    fn unnamed(&self, _response: HttpResponse, _name: String) {}
}

impl Component for GreetingController {
    fn construct() -> Result<Self, ComponentError> {
        Ok(Self::default())
    }

    fn describe(meta: &mut ComponentMeta<Self>) {
        meta.controller()
            .request_mapping("/greet")
            .autowired("greeter", |this| &this.greeter)
            .autowired_named("loud_greeter", "greeter", |this| &this.loud_greeter)
            .autowired("audit_log", |this| &this.audit_log)
            .autowired_named("wrong_type", "greetingController", |this| &this.wrong_type);
        meta.route("/hello", "hello", Self::hello).request_param("name");
        meta.route("/raw", "raw", Self::raw);
        meta.route("/fail", "fail", Self::fail);
        meta.route("/panic", "panic", Self::panic);
        meta.route("/unnamed", "unnamed", Self::unnamed);
    }
}

pub struct PlainHelper;

impl Component for PlainHelper {
    fn construct() -> Result<Self, ComponentError> {
        Ok(PlainHelper)
    }

    fn describe(_meta: &mut ComponentMeta<Self>) {}
}

pub struct BrokenService;

impl Component for BrokenService {
    fn construct() -> Result<Self, ComponentError> {
        Err(ComponentError::new("database unreachable"))
    }

    fn describe(meta: &mut ComponentMeta<Self>) {
        meta.service();
    }
}

pub struct PanickyService;

impl Component for PanickyService {
    fn construct() -> Result<Self, ComponentError> {
        panic!("constructor exploded")
    }

    fn describe(meta: &mut ComponentMeta<Self>) {
        meta.service();
    }
}

pub struct FirstShared;

impl Component for FirstShared {
    fn construct() -> Result<Self, ComponentError> {
        Ok(FirstShared)
    }

    fn describe(meta: &mut ComponentMeta<Self>) {
        meta.service_named("shared");
    }
}

pub struct SecondShared;

impl Component for SecondShared {
    fn construct() -> Result<Self, ComponentError> {
        Ok(SecondShared)
    }

    fn describe(meta: &mut ComponentMeta<Self>) {
        meta.service_named("shared");
    }
}

#[derive(Default)]
pub struct LeftNode {
    pub peer: Autowired<RightNode>,
}

impl Component for LeftNode {
    fn construct() -> Result<Self, ComponentError> {
        Ok(Self::default())
    }

    fn describe(meta: &mut ComponentMeta<Self>) {
        meta.service_named("left")
            .autowired_named("peer", "right", |this| &this.peer);
    }
}

#[derive(Default)]
pub struct RightNode {
    pub peer: Autowired<LeftNode>,
}

impl Component for RightNode {
    fn construct() -> Result<Self, ComponentError> {
        Ok(Self::default())
    }

    fn describe(meta: &mut ComponentMeta<Self>) {
        meta.service_named("right")
            .autowired_named("peer", "left", |this| &this.peer);
    }
}

pub struct AlphaRoutes;

impl AlphaRoutes {
    fn first(&self, response: HttpResponse) {
        response.write("first");
    }
}

impl Component for AlphaRoutes {
    fn construct() -> Result<Self, ComponentError> {
        Ok(AlphaRoutes)
    }

    fn describe(meta: &mut ComponentMeta<Self>) {
        meta.controller().request_mapping("/");
        meta.route("/dup", "first", Self::first);
    }
}

pub struct BetaRoutes;

impl BetaRoutes {
    fn second(&self, response: HttpResponse) {
        response.write("second");
    }
}

impl Component for BetaRoutes {
    fn construct() -> Result<Self, ComponentError> {
        Ok(BetaRoutes)
    }

    fn describe(meta: &mut ComponentMeta<Self>) {
        meta.controller();
        meta.route("dup", "second", Self::second);
    }
}

static APP: [ComponentRegistration; 6] = [
    fixture!("fixtures::app", GreetingController),
    fixture!("fixtures::app", GreeterImpl),
    fixture!("fixtures::app", PlainHelper),
    fixture!("fixtures::app::nested", BrokenService),
    fixture!("fixtures::app::nested::deeper", PanickyService),
    // Listed twice; the catalog keeps one.
    fixture!("fixtures::app", GreeterImpl),
];

static CLASH: [ComponentRegistration; 2] = [
    fixture!("fixtures::clash::second", SecondShared),
    fixture!("fixtures::clash::first", FirstShared),
];

static CYCLE: [ComponentRegistration; 2] = [
    fixture!("fixtures::cycle", LeftNode),
    fixture!("fixtures::cycle", RightNode),
];

static ROUTES: [ComponentRegistration; 2] = [
    fixture!("fixtures::routes", BetaRoutes),
    fixture!("fixtures::routes", AlphaRoutes),
];

pub fn app_registrations() -> impl Iterator<Item = &'static ComponentRegistration> {
    APP.iter()
}

pub fn clash_registrations() -> impl Iterator<Item = &'static ComponentRegistration> {
    CLASH.iter()
}

pub fn all_registrations() -> impl Iterator<Item = &'static ComponentRegistration> {
    APP.iter().chain(CLASH.iter()).chain(CYCLE.iter()).chain(ROUTES.iter())
}
