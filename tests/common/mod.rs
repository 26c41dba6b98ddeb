//! Shared fixtures and server helpers for integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mvc_dispatch::config::DispatcherConfig;
use mvc_dispatch::lifecycle::startup;
use mvc_dispatch::{ApplicationContext, Dispatcher, HttpServer, Shutdown};
use tokio::net::TcpListener;

/// Root namespace of the fixture components below.
pub const NAMESPACE: &str = module_path!();

pub mod greeting {
    use std::sync::Arc;

    use mvc_dispatch::prelude::*;

    pub trait Greeting: Send + Sync {
        fn greet(&self, name: &str) -> String;
    }

    #[derive(Default)]
    pub struct GreetingServiceImpl;

    impl Greeting for GreetingServiceImpl {
        fn greet(&self, name: &str) -> String {
            format!("Hello {name}")
        }
    }

    impl Component for GreetingServiceImpl {
        fn construct() -> Result<Self, ComponentError> {
            Ok(GreetingServiceImpl)
        }

        fn describe(meta: &mut ComponentMeta<Self>) {
            meta.service_named("greetingService")
                .implements::<dyn Greeting>(|this| this as Arc<dyn Greeting>);
        }
    }

    mvc_dispatch::component!(GreetingServiceImpl);
}

pub mod web {
    use axum::http::StatusCode;
    use mvc_dispatch::prelude::*;

    use super::greeting::Greeting;

    #[derive(Default)]
    pub struct EchoController {
        pub greeting: Autowired<dyn Greeting>,
        pub greeting_service: Autowired<dyn Greeting>,
    }

    impl EchoController {
        fn hello(&self, response: HttpResponse, name: Option<String>) -> Result<(), DynError> {
            let greeting = self.greeting.require()?;
            response.write(&greeting.greet(name.as_deref().unwrap_or("nobody")));
            Ok(())
        }

        fn required(&self, response: HttpResponse, id: String) {
            response.write(&format!("id={id}"));
        }

        fn form(&self, request: HttpRequest, response: HttpResponse) {
            let mut names: Vec<_> = request
                .parameters()
                .joined("a")
                .into_iter()
                .chain(request.parameters().joined("b"))
                .collect();
            names.sort();
            response.write(&format!("{} {}", request.method(), names.join("|")));
        }

        fn created(&self, response: HttpResponse) {
            response.set_status(StatusCode::CREATED);
            response.write("created");
        }

        fn fail(&self, response: HttpResponse) -> Result<(), DynError> {
            response.write("half-written");
            Err("disk on fire".into())
        }

        fn explode(&self) {
            panic!("handler blew up");
        }
    }

    impl Component for EchoController {
        fn construct() -> Result<Self, ComponentError> {
            Ok(Self::default())
        }

        fn describe(meta: &mut ComponentMeta<Self>) {
            meta.controller()
                .request_mapping("/echo/")
                .autowired_named("greeting", "greetingService", |this| &this.greeting)
                .autowired("greeting_service", |this| &this.greeting_service);
            meta.route("/hello", "hello", Self::hello).request_param("name");
            meta.route("/required", "required", Self::required).request_param("id");
            meta.route("/form", "form", Self::form);
            meta.route("/created", "created", Self::created);
            meta.route("/fail", "fail", Self::fail);
            meta.route("/explode", "explode", Self::explode);
        }
    }

    mvc_dispatch::component!(EchoController);

    pub mod nested {
        use mvc_dispatch::prelude::*;

        pub struct NestedController;

        impl NestedController {
            fn ping(&self, response: HttpResponse) {
                response.write("pong");
            }
        }

        impl Component for NestedController {
            fn construct() -> Result<Self, ComponentError> {
                Ok(NestedController)
            }

            fn describe(meta: &mut ComponentMeta<Self>) {
                meta.controller().request_mapping("nested");
                meta.route("ping", "ping", Self::ping);
            }
        }

        mvc_dispatch::component!(NestedController);
    }
}

/// Config scanning the fixtures above.
pub fn config() -> DispatcherConfig {
    DispatcherConfig {
        scan_package: NAMESPACE.to_string(),
        ..DispatcherConfig::default()
    }
}

pub fn context(config: &DispatcherConfig) -> Arc<ApplicationContext> {
    Arc::new(startup::initialize(config).expect("fixture startup"))
}

pub fn dispatcher() -> Dispatcher {
    Dispatcher::new(context(&config()))
}

/// Start the dispatch server on an ephemeral port.
pub async fn start_server(config: DispatcherConfig) -> (SocketAddr, Shutdown) {
    let context = context(&config);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, context);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
