//! Dependency injection.
//!
//! # Responsibilities
//! - Resolve each `Autowired` field to a bean name (override, else the
//!   field name in lowerCamelCase)
//! - Populate the field with the bean's view of the declared type
//!
//! # Design Decisions
//! - Runs once, after every bean exists, so cycles resolve without ordering
//! - Best-effort per field: a failure is reported and the field stays empty

use serde::Serialize;

use crate::container::registry::{Bean, BeanRegistry};
use crate::lifecycle::report::{StartupIssue, StartupReport};

/// A field that was successfully injected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InjectionTarget {
    pub owning_bean: String,
    pub field_name: String,
    pub resolved_bean_name: String,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum InjectError {
    #[error("bean `{bean}` does not provide `{expected}`")]
    Incompatible { bean: String, expected: &'static str },

    #[error("field is already injected")]
    AlreadyInjected,

    #[error("owner is not a `{expected}`")]
    OwnerMismatch { expected: &'static str },
}

/// Populates every injection field of every live bean.
pub fn inject(registry: &BeanRegistry, report: &mut StartupReport) -> Vec<InjectionTarget> {
    let mut injected = Vec::new();

    for bean in registry.live_beans() {
        for field in &bean.metadata.fields {
            let target = field.target_name();
            let Some(dependency) = registry.get(&target) else {
                report.record(StartupIssue::DependencyMissing {
                    bean: bean.name.clone(),
                    field: field.field.to_string(),
                    target,
                });
                continue;
            };

            let dependency: &Bean = dependency;
            match (field.inject)(&bean.instance, dependency) {
                Ok(()) => {
                    tracing::debug!(
                        bean = %bean.name,
                        field = field.field,
                        resolved = %target,
                        "Injected dependency"
                    );
                    injected.push(InjectionTarget {
                        owning_bean: bean.name.clone(),
                        field_name: field.field.to_string(),
                        resolved_bean_name: target,
                    });
                }
                Err(error) => report.record(StartupIssue::InjectionFailed {
                    bean: bean.name.clone(),
                    field: field.field.to_string(),
                    target,
                    reason: error.to_string(),
                }),
            }
        }
    }

    injected
}
