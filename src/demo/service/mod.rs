//! Greeting service.

use std::sync::Arc;

use crate::component;
use crate::component::{Component, ComponentError, ComponentMeta};

pub trait MyService: Send + Sync {
    fn get(&self, name: &str) -> String;
}

#[derive(Debug, Default)]
pub struct MyServiceImpl;

impl MyServiceImpl {
    pub fn new() -> Self {
        MyServiceImpl
    }
}

impl MyService for MyServiceImpl {
    fn get(&self, name: &str) -> String {
        format!("Hello {name}")
    }
}

impl Component for MyServiceImpl {
    fn construct() -> Result<Self, ComponentError> {
        Ok(MyServiceImpl::new())
    }

    fn describe(meta: &mut ComponentMeta<Self>) {
        meta.service_named("myService")
            .implements::<dyn MyService>(|this| this as Arc<dyn MyService>);
    }
}

component!(MyServiceImpl);
