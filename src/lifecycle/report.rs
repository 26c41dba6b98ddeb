//! Startup outcome.
//!
//! `StartupError` aborts startup. `StartupIssue` is advisory: the component
//! or field involved is skipped and startup continues.

use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid scan namespace `{namespace}`")]
    InvalidNamespace { namespace: String },

    #[error("no components registered under `{namespace}`")]
    NamespaceNotFound { namespace: String },

    #[error("bean name `{name}` is claimed by both `{existing}` and `{incoming}`")]
    DuplicateBean {
        name: String,
        existing: String,
        incoming: String,
    },

    #[error("url `{url}` is mapped by both {existing} and {incoming}")]
    DuplicateRoute {
        url: String,
        existing: String,
        incoming: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StartupIssue {
    #[error("component `{component}` could not be described: {reason}")]
    MetadataMissing { component: String, reason: String },

    #[error("component `{component}` failed to construct: {reason}")]
    ConstructionFailed { component: String, reason: String },

    #[error("bean `{name}` from `{previous}` replaced by `{replacement}`")]
    BeanOverwritten {
        name: String,
        previous: String,
        replacement: String,
    },

    #[error("{bean}.{field}: no bean named `{target}`")]
    DependencyMissing {
        bean: String,
        field: String,
        target: String,
    },

    #[error("{bean}.{field}: cannot inject `{target}`: {reason}")]
    InjectionFailed {
        bean: String,
        field: String,
        target: String,
        reason: String,
    },

    #[error("route `{url}` for {previous} replaced by {replacement}")]
    RouteOverwritten {
        url: String,
        previous: String,
        replacement: String,
    },

    #[error("route `{url}` for {handler} rejected: {reason}")]
    RouteRejected {
        url: String,
        handler: String,
        reason: String,
    },
}

/// Counts and advisory issues gathered while starting up.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StartupReport {
    pub components_scanned: usize,
    pub beans: usize,
    pub routes: usize,
    pub issues: Vec<StartupIssue>,
}

impl StartupReport {
    pub fn record(&mut self, issue: StartupIssue) {
        tracing::warn!(issue = %issue, "Startup issue");
        self.issues.push(issue);
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}
