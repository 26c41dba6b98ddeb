//! Instance registry.
//!
//! # Responsibilities
//! - Instantiate exactly one object per controller or service
//! - Store each instance under its bean name and, for services, under every
//!   implemented interface
//! - Apply the collision policy when two components claim the same name
//!
//! # Design Decisions
//! - All names of one component point at the same `Arc<Bean>`
//! - A component that fails to describe or construct is skipped; the rest
//!   of the catalog is still processed

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::panic;
use std::sync::Arc;

use crate::catalog::{Catalog, ComponentRegistration};
use crate::component::{ComponentMetadata, Instance, Stereotype, TypeInfo};
use crate::config::CollisionPolicy;
use crate::dispatch::failure::panic_message;
use crate::lifecycle::report::{StartupError, StartupIssue, StartupReport};

/// One instantiated component.
pub struct Bean {
    /// Primary name: the explicit service name or the type-derived name.
    pub name: String,
    pub qualified_name: &'static str,
    pub type_info: TypeInfo,
    pub stereotype: Stereotype,
    pub instance: Instance,
    pub interfaces: Vec<TypeInfo>,
    pub metadata: Arc<ComponentMetadata>,
    views: HashMap<TypeId, Instance>,
}

impl Bean {
    /// The instance viewed as `V`: the concrete type or a declared interface.
    pub fn view<V>(&self) -> Option<Arc<V>>
    where
        V: ?Sized + Send + Sync + 'static,
    {
        self.views
            .get(&TypeId::of::<V>())?
            .downcast_ref::<Arc<V>>()
            .cloned()
    }

    pub fn is_controller(&self) -> bool {
        self.stereotype == Stereotype::Controller
    }
}

impl fmt::Debug for Bean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bean")
            .field("name", &self.name)
            .field("qualified_name", &self.qualified_name)
            .field("stereotype", &self.stereotype)
            .field("interfaces", &self.interfaces)
            .finish_non_exhaustive()
    }
}

/// Type-derived bean name: the simple type name with a lowercase first letter.
pub fn default_bean_name(simple_name: &str) -> String {
    let mut chars = simple_name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Bean name → instance.
#[derive(Debug, Default)]
pub struct BeanRegistry {
    entries: HashMap<String, Arc<Bean>>,
    beans: Vec<Arc<Bean>>,
}

impl BeanRegistry {
    /// Instantiates every controller and service in the catalog.
    pub fn instantiate(
        catalog: &Catalog,
        policy: CollisionPolicy,
        report: &mut StartupReport,
    ) -> Result<Self, StartupError> {
        let mut registry = Self::default();
        for registration in catalog.registrations() {
            if let Some(bean) = build_bean(registration, report) {
                registry.register(bean, policy, report)?;
            }
        }
        Ok(registry)
    }

    fn register(
        &mut self,
        bean: Bean,
        policy: CollisionPolicy,
        report: &mut StartupReport,
    ) -> Result<(), StartupError> {
        let mut names = vec![bean.name.clone()];
        if let Stereotype::Service { .. } = bean.stereotype {
            names.extend(bean.interfaces.iter().map(|i| i.qualified_name().to_string()));
        }

        let bean = Arc::new(bean);
        for name in names {
            self.insert(name, Arc::clone(&bean), policy, report)?;
        }
        self.beans.push(bean);
        Ok(())
    }

    fn insert(
        &mut self,
        name: String,
        bean: Arc<Bean>,
        policy: CollisionPolicy,
        report: &mut StartupReport,
    ) -> Result<(), StartupError> {
        if let Some(existing) = self.entries.get(&name) {
            if Arc::ptr_eq(existing, &bean) {
                return Ok(());
            }
            match policy {
                CollisionPolicy::Reject => {
                    return Err(StartupError::DuplicateBean {
                        name,
                        existing: existing.qualified_name.to_string(),
                        incoming: bean.qualified_name.to_string(),
                    });
                }
                CollisionPolicy::LastWins => report.record(StartupIssue::BeanOverwritten {
                    name: name.clone(),
                    previous: existing.qualified_name.to_string(),
                    replacement: bean.qualified_name.to_string(),
                }),
            }
        }

        tracing::debug!(name = %name, component = bean.qualified_name, "Registered bean");
        self.entries.insert(name, bean);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Bean>> {
        self.entries.get(name)
    }

    /// Number of name entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Name entries sorted by name.
    pub fn entries(&self) -> Vec<(&str, &Arc<Bean>)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|(name, bean)| (name.as_str(), bean))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Names under which `bean` is reachable, sorted.
    pub fn names_of(&self, bean: &Arc<Bean>) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .entries
            .iter()
            .filter(|(_, entry)| Arc::ptr_eq(entry, bean))
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Distinct beans still reachable by at least one name, in catalog order.
    pub fn live_beans(&self) -> impl Iterator<Item = &Arc<Bean>> + '_ {
        self.beans
            .iter()
            .filter(|bean| self.entries.values().any(|entry| Arc::ptr_eq(entry, bean)))
    }
}

fn build_bean(registration: &ComponentRegistration, report: &mut StartupReport) -> Option<Bean> {
    let component = registration.qualified_name;

    let metadata = match panic::catch_unwind(registration.describe) {
        Ok(metadata) => metadata,
        Err(payload) => {
            report.record(StartupIssue::MetadataMissing {
                component: component.to_string(),
                reason: panic_message(payload.as_ref()),
            });
            return None;
        }
    };

    let name = match &metadata.stereotype {
        Stereotype::Plain => {
            tracing::debug!(component, "Skipping component without controller or service role");
            return None;
        }
        Stereotype::Controller | Stereotype::Service { name: None } => {
            default_bean_name(registration.simple_name)
        }
        Stereotype::Service { name: Some(name) } => name.clone(),
    };

    let instance = match panic::catch_unwind(metadata.construct) {
        Ok(Ok(instance)) => instance,
        Ok(Err(error)) => {
            report.record(StartupIssue::ConstructionFailed {
                component: component.to_string(),
                reason: error.to_string(),
            });
            return None;
        }
        Err(payload) => {
            report.record(StartupIssue::ConstructionFailed {
                component: component.to_string(),
                reason: format!("constructor panicked: {}", panic_message(payload.as_ref())),
            });
            return None;
        }
    };

    let views = metadata.views(&instance).into_iter().collect();
    Some(Bean {
        name,
        qualified_name: component,
        type_info: metadata.type_info,
        stereotype: metadata.stereotype.clone(),
        interfaces: metadata.interfaces.iter().map(|i| i.info).collect(),
        instance,
        metadata: Arc::new(metadata),
        views,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{self, Greeter};

    fn registry(policy: CollisionPolicy) -> (Result<BeanRegistry, StartupError>, StartupReport) {
        let catalog = Catalog::scan("fixtures.app", test_support::app_registrations()).unwrap();
        let mut report = StartupReport::default();
        (BeanRegistry::instantiate(&catalog, policy, &mut report), report)
    }

    #[test]
    fn test_default_bean_name() {
        assert_eq!(default_bean_name("TestController"), "testController");
        assert_eq!(default_bean_name("URLService"), "uRLService");
        assert_eq!(default_bean_name(""), "");
    }

    #[test]
    fn test_controller_registered_under_default_name() {
        let (registry, _) = registry(CollisionPolicy::LastWins);
        let registry = registry.unwrap();
        let bean = registry.get("greetingController").unwrap();
        assert!(bean.is_controller());
        assert_eq!(registry.names_of(bean), vec!["greetingController"]);
    }

    #[test]
    fn test_service_shares_instance_across_name_and_interface() {
        let (registry, _) = registry(CollisionPolicy::LastWins);
        let registry = registry.unwrap();

        let by_name = registry.get("greeter").unwrap();
        let by_interface = registry.get(TypeInfo::of::<dyn Greeter>().qualified_name()).unwrap();
        assert!(Arc::ptr_eq(by_name, by_interface));

        let greeter = by_name.view::<dyn Greeter>().unwrap();
        assert_eq!(greeter.greet("Ann"), "Hello Ann");
    }

    #[test]
    fn test_plain_component_is_ignored() {
        let (registry, _) = registry(CollisionPolicy::LastWins);
        let registry = registry.unwrap();
        assert!(registry.get("plainHelper").is_none());
    }

    #[test]
    fn test_failing_constructor_is_skipped() {
        let (registry, report) = registry(CollisionPolicy::LastWins);
        let registry = registry.unwrap();
        assert!(registry.get("brokenService").is_none());
        assert!(registry.get("panickyService").is_none());

        let failures: Vec<_> = report
            .issues
            .iter()
            .filter(|i| matches!(i, StartupIssue::ConstructionFailed { .. }))
            .collect();
        assert_eq!(failures.len(), 2);
        assert!(registry.get("greeter").is_some());
        assert!(registry.get("greetingController").is_some());
    }

    #[test]
    fn test_collision_last_wins_records_overwrite() {
        let catalog = Catalog::scan("fixtures.clash", test_support::clash_registrations()).unwrap();
        let mut report = StartupReport::default();
        let registry =
            BeanRegistry::instantiate(&catalog, CollisionPolicy::LastWins, &mut report).unwrap();

        let bean = registry.get("shared").unwrap();
        assert_eq!(bean.qualified_name, "fixtures::clash::second::SecondShared");
        assert!(report
            .issues
            .iter()
            .any(|i| matches!(i, StartupIssue::BeanOverwritten { name, .. } if name == "shared")));
        assert_eq!(registry.live_beans().count(), 1);
    }

    #[test]
    fn test_collision_reject_is_fatal() {
        let catalog = Catalog::scan("fixtures.clash", test_support::clash_registrations()).unwrap();
        let mut report = StartupReport::default();
        let result = BeanRegistry::instantiate(&catalog, CollisionPolicy::Reject, &mut report);
        assert!(matches!(
            result,
            Err(StartupError::DuplicateBean { ref name, .. }) if name == "shared"
        ));
    }
}
