//! Startup orchestration.
//!
//! # Responsibilities
//! - Scan the catalog under the configured namespace
//! - Instantiate beans, inject dependencies, build routes, in that order
//! - Seal the result into an `ApplicationContext`
//!
//! # Design Decisions
//! - Fail fast only on `StartupError`; component problems become issues
//! - Stages run sequentially on the calling thread
//! - Runs before any listener is bound (traffic only when ready)

use crate::catalog::{Catalog, ComponentRegistration};
use crate::config::DispatcherConfig;
use crate::container::{injector, ApplicationContext, BeanRegistry, ContextBuilder, DispatchSettings};
use crate::lifecycle::report::StartupError;
use crate::routing::build_routes;

/// Starts the container over every component linked into the binary.
pub fn initialize(config: &DispatcherConfig) -> Result<ApplicationContext, StartupError> {
    let catalog = Catalog::scan_linked(&config.scan_package)?;
    build_context(config, &catalog)
}

/// Starts the container over an explicit set of registrations.
pub fn initialize_with<I>(config: &DispatcherConfig, registrations: I) -> Result<ApplicationContext, StartupError>
where
    I: IntoIterator<Item = &'static ComponentRegistration>,
{
    let catalog = Catalog::scan(&config.scan_package, registrations)?;
    build_context(config, &catalog)
}

fn build_context(config: &DispatcherConfig, catalog: &Catalog) -> Result<ApplicationContext, StartupError> {
    let policy = config.dispatch.collision_policy;
    let mut builder = ContextBuilder::new(DispatchSettings::from_config(config));

    tracing::info!(
        namespace = %catalog.namespace(),
        components = catalog.len(),
        "Components discovered"
    );

    // 1. Instantiate
    let registry = BeanRegistry::instantiate(catalog, policy, builder.report_mut())?;
    builder.set_registry(registry);

    // 2. Inject
    let (registry, report) = builder.registry_and_report();
    let injections = injector::inject(registry, report);

    // 3. Map routes
    let (registry, report) = builder.registry_and_report();
    let routes = build_routes(registry, policy, report)?;

    builder.set_injections(injections);
    builder.set_routes(routes);
    let context = builder.seal(catalog.len());

    let report = context.report();
    tracing::info!(
        components = report.components_scanned,
        beans = report.beans,
        routes = report.routes,
        issues = report.issues.len(),
        "Application context sealed"
    );

    Ok(context)
}
