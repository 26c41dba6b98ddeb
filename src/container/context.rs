//! Application context sealing.
//!
//! Startup fills a `ContextBuilder` stage by stage. `seal` consumes it and
//! yields the `ApplicationContext` that the dispatcher and admin API read;
//! nothing can be registered or remapped afterwards.

use crate::config::DispatcherConfig;
use crate::container::injector::InjectionTarget;
use crate::container::registry::{Bean, BeanRegistry};
use crate::lifecycle::report::StartupReport;
use crate::routing::RouteTable;

use std::sync::Arc;

/// Request-time settings taken from the configuration.
#[derive(Debug, Clone, Default)]
pub struct DispatchSettings {
    pub context_path: String,
    pub detailed_errors: bool,
}

impl DispatchSettings {
    pub fn from_config(config: &DispatcherConfig) -> Self {
        Self {
            context_path: config.context_path.clone(),
            detailed_errors: config.dispatch.detailed_errors,
        }
    }
}

/// Mutable startup state.
#[derive(Debug, Default)]
pub struct ContextBuilder {
    settings: DispatchSettings,
    registry: BeanRegistry,
    injections: Vec<InjectionTarget>,
    routes: RouteTable,
    report: StartupReport,
}

impl ContextBuilder {
    pub fn new(settings: DispatchSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn report_mut(&mut self) -> &mut StartupReport {
        &mut self.report
    }

    /// The registry together with the report, for stages that read one and write the other.
    pub fn registry_and_report(&mut self) -> (&BeanRegistry, &mut StartupReport) {
        (&self.registry, &mut self.report)
    }

    pub fn set_registry(&mut self, registry: BeanRegistry) {
        self.registry = registry;
    }

    pub fn set_injections(&mut self, injections: Vec<InjectionTarget>) {
        self.injections = injections;
    }

    pub fn set_routes(&mut self, routes: RouteTable) {
        self.routes = routes;
    }

    /// Freezes the startup state.
    pub fn seal(mut self, components_scanned: usize) -> ApplicationContext {
        self.report.components_scanned = components_scanned;
        self.report.beans = self.registry.live_beans().count();
        self.report.routes = self.routes.len();

        ApplicationContext {
            settings: self.settings,
            registry: self.registry,
            injections: self.injections,
            routes: self.routes,
            report: self.report,
        }
    }
}

/// Immutable result of startup, shared by every request.
#[derive(Debug)]
pub struct ApplicationContext {
    settings: DispatchSettings,
    registry: BeanRegistry,
    injections: Vec<InjectionTarget>,
    routes: RouteTable,
    report: StartupReport,
}

impl ApplicationContext {
    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    pub fn registry(&self) -> &BeanRegistry {
        &self.registry
    }

    pub fn bean(&self, name: &str) -> Option<&Arc<Bean>> {
        self.registry.get(name)
    }

    pub fn injections(&self) -> &[InjectionTarget] {
        &self.injections
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn report(&self) -> &StartupReport {
        &self.report
    }
}
