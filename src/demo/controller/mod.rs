//! HTTP entry points of the sample application.

use crate::component;
use crate::component::{Autowired, Component, ComponentError, ComponentMeta, DynError};
use crate::demo::service::MyService;
use crate::http::HttpResponse;

#[derive(Debug, Default)]
pub struct TestController {
    my_service: Autowired<dyn MyService>,
}

impl TestController {
    /// Number of mapped handler methods.
    pub fn describe_routes() -> usize {
        component::metadata_of::<Self>().methods.len()
    }

    fn get(&self, response: HttpResponse, name: Option<String>) -> Result<(), DynError> {
        let service = self.my_service.require()?;
        response.write(&service.get(name.as_deref().unwrap_or_default()));
        Ok(())
    }

    fn add(&self) {
        tracing::debug!("add invoked");
    }
}

impl Component for TestController {
    fn construct() -> Result<Self, ComponentError> {
        Ok(Self::default())
    }

    fn describe(meta: &mut ComponentMeta<Self>) {
        meta.controller()
            .request_mapping("/test")
            .autowired("my_service", |this| &this.my_service);
        meta.route("/get", "get", Self::get).request_param("name");
        meta.route("/add", "add", Self::add);
    }
}

component!(TestController);
