//! Route table construction and lookup.
//!
//! # Responsibilities
//! - Compose a URL for every route-mapped method of every controller
//! - Fix each handler's parameter bindings once, at startup
//! - Look up the route for a normalized request path
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) exact lookup via HashMap; no patterns or wildcards
//! - Controllers are visited in catalog order, so collisions resolve the
//!   same way on every start

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::component::meta::{Invoker, MethodDecl};
use crate::component::{Argument, ArgumentKind, Instance, InvokeError};
use crate::config::CollisionPolicy;
use crate::container::registry::{Bean, BeanRegistry};
use crate::lifecycle::report::{StartupError, StartupIssue, StartupReport};
use crate::routing::path::compose;

/// How one handler parameter is supplied at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum ParameterBinding {
    Request,
    Response,
    RequestParam(String),
}

/// A URL mapped to a method on a registered controller.
pub struct Route {
    pub url: String,
    /// Bean name of the owning controller.
    pub owner: String,
    pub owner_type: &'static str,
    pub handler: &'static str,
    pub parameters: Vec<ParameterBinding>,
    invoker: Invoker,
}

impl Route {
    /// `Type::method` label used in logs and error bodies.
    pub fn handler_label(&self) -> String {
        format!("{}::{}", self.owner_type, self.handler)
    }

    pub(crate) fn invoke(&self, target: &Instance, arguments: Vec<Argument>) -> Result<(), InvokeError> {
        (self.invoker)(target, arguments)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("url", &self.url)
            .field("owner", &self.owner)
            .field("handler", &self.handler_label())
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// Normalized URL → route.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: HashMap<String, Route>,
}

impl RouteTable {
    pub fn get(&self, url: &str) -> Option<&Route> {
        self.routes.get(url)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Routes sorted by URL.
    pub fn routes(&self) -> Vec<&Route> {
        let mut routes: Vec<&Route> = self.routes.values().collect();
        routes.sort_by(|a, b| a.url.cmp(&b.url));
        routes
    }

    fn insert(
        &mut self,
        route: Route,
        policy: CollisionPolicy,
        report: &mut StartupReport,
    ) -> Result<(), StartupError> {
        if let Some(existing) = self.routes.get(&route.url) {
            match policy {
                CollisionPolicy::Reject => {
                    return Err(StartupError::DuplicateRoute {
                        url: route.url.clone(),
                        existing: existing.handler_label(),
                        incoming: route.handler_label(),
                    });
                }
                CollisionPolicy::LastWins => report.record(StartupIssue::RouteOverwritten {
                    url: route.url.clone(),
                    previous: existing.handler_label(),
                    replacement: route.handler_label(),
                }),
            }
        }

        tracing::info!(url = %route.url, handler = %route.handler_label(), "Mapped route");
        self.routes.insert(route.url.clone(), route);
        Ok(())
    }
}

/// Builds the route table from every live controller in the registry.
pub fn build_routes(
    registry: &BeanRegistry,
    policy: CollisionPolicy,
    report: &mut StartupReport,
) -> Result<RouteTable, StartupError> {
    let mut table = RouteTable::default();

    for bean in registry.live_beans().filter(|bean| bean.is_controller()) {
        let base = bean.metadata.base_path.as_deref().unwrap_or("");
        for method in &bean.metadata.methods {
            let url = compose(base, &method.path);
            match bind_parameters(method) {
                Ok(parameters) => table.insert(route_for(bean, method, url, parameters), policy, report)?,
                Err(reason) => report.record(StartupIssue::RouteRejected {
                    url,
                    handler: format!("{}::{}", bean.type_info.qualified_name(), method.name),
                    reason,
                }),
            }
        }
    }

    Ok(table)
}

fn route_for(bean: &Bean, method: &MethodDecl, url: String, parameters: Vec<ParameterBinding>) -> Route {
    Route {
        url,
        owner: bean.name.clone(),
        owner_type: bean.type_info.qualified_name(),
        handler: method.name,
        parameters,
        invoker: method.invoker.clone(),
    }
}

/// Pairs each text parameter with its declared request parameter name.
fn bind_parameters(method: &MethodDecl) -> Result<Vec<ParameterBinding>, String> {
    let mut names = method.param_names.iter();
    let mut bindings = Vec::with_capacity(method.kinds.len());

    for (position, kind) in method.kinds.iter().enumerate() {
        let binding = match kind {
            ArgumentKind::Request => ParameterBinding::Request,
            ArgumentKind::Response => ParameterBinding::Response,
            ArgumentKind::Text => match names.next() {
                Some(name) if !name.trim().is_empty() => ParameterBinding::RequestParam(name.clone()),
                _ => return Err(format!("text parameter at position {position} has no request parameter name")),
            },
        };
        bindings.push(binding);
    }

    let surplus = names.count();
    if surplus > 0 {
        return Err(format!("{surplus} request parameter name(s) without a matching text parameter"));
    }

    Ok(bindings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::test_support;

    fn table(root: &str, policy: CollisionPolicy) -> (Result<RouteTable, StartupError>, StartupReport) {
        let catalog = Catalog::scan(root, test_support::all_registrations()).unwrap();
        let mut report = StartupReport::default();
        let registry = BeanRegistry::instantiate(&catalog, policy, &mut report).unwrap();
        (build_routes(&registry, policy, &mut report), report)
    }

    #[test]
    fn test_route_count_matches_distinct_urls() {
        let (routes, _) = table("fixtures.app", CollisionPolicy::LastWins);
        let routes = routes.unwrap();
        let urls: Vec<_> = routes.routes().iter().map(|r| r.url.clone()).collect();
        assert_eq!(urls, vec!["/greet/fail", "/greet/hello", "/greet/panic", "/greet/raw"]);
    }

    #[test]
    fn test_bindings_are_resolved_at_build_time() {
        let (routes, _) = table("fixtures.app", CollisionPolicy::LastWins);
        let routes = routes.unwrap();
        let hello = routes.get("/greet/hello").unwrap();
        assert_eq!(hello.owner, "greetingController");
        assert_eq!(hello.handler, "hello");
        assert_eq!(
            hello.parameters,
            vec![ParameterBinding::Response, ParameterBinding::RequestParam("name".into())]
        );
    }

    #[test]
    fn test_unnamed_text_parameter_rejects_route() {
        let (routes, report) = table("fixtures.app", CollisionPolicy::LastWins);
        assert!(routes.unwrap().get("/greet/unnamed").is_none());
        assert!(report.issues.iter().any(|issue| matches!(
            issue,
            StartupIssue::RouteRejected { url, .. } if url == "/greet/unnamed"
        )));
    }

    #[test]
    fn test_url_collision_last_wins() {
        let (routes, report) = table("fixtures.routes", CollisionPolicy::LastWins);
        let routes = routes.unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes.get("/dup").unwrap().handler, "second");
        assert!(report
            .issues
            .iter()
            .any(|issue| matches!(issue, StartupIssue::RouteOverwritten { .. })));
    }

    #[test]
    fn test_url_collision_reject() {
        let (routes, _) = table("fixtures.routes", CollisionPolicy::Reject);
        assert!(matches!(
            routes,
            Err(StartupError::DuplicateRoute { ref url, .. }) if url == "/dup"
        ));
    }
}
