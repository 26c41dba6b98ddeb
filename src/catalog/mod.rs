//! Component discovery.
//!
//! # Responsibilities
//! - Collect the `ComponentRegistration` records submitted by `component!`
//! - Select the ones declared at or under a root namespace, at any depth
//! - Hand each selected component's metadata to the registry
//!
//! # Design Decisions
//! - A namespace is a Rust module path; `.` is accepted as a separator
//! - Matching is per whole segment, so `demo` never matches `demo_extra`
//! - Results are sorted, giving a deterministic registration order

use std::collections::BTreeSet;

use crate::component::ComponentMetadata;
use crate::lifecycle::report::StartupError;

/// Static record for one component type, submitted through `inventory`.
#[derive(Debug)]
pub struct ComponentRegistration {
    pub qualified_name: &'static str,
    pub simple_name: &'static str,
    pub describe: fn() -> ComponentMetadata,
}

impl ComponentRegistration {
    pub const fn new(
        qualified_name: &'static str,
        simple_name: &'static str,
        describe: fn() -> ComponentMetadata,
    ) -> Self {
        Self {
            qualified_name,
            simple_name,
            describe,
        }
    }
}

inventory::collect!(ComponentRegistration);

/// A root module path, split into segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    segments: Vec<String>,
}

impl Namespace {
    pub fn parse(raw: &str) -> Result<Self, StartupError> {
        let invalid = || StartupError::InvalidNamespace {
            namespace: raw.to_string(),
        };
        let normalized = raw.trim().replace("::", ".");
        if normalized.is_empty() {
            return Err(invalid());
        }

        let segments = normalized
            .split('.')
            .map(|segment| {
                if is_identifier(segment) {
                    Ok(segment.to_string())
                } else {
                    Err(invalid())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { segments })
    }

    /// Whether `qualified` (a `::` path ending in a type name) lives at or under this namespace.
    pub fn contains(&self, qualified: &str) -> bool {
        let mut parts = qualified.split("::");
        // Every namespace segment must match and at least the type name must remain.
        self.segments
            .iter()
            .all(|segment| parts.next() == Some(segment.as_str()))
            && parts.next().is_some()
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.segments.join("::"))
    }
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => {}
        _ => return false,
    }
    segment != "_" && chars.all(|c| c == '_' || c.is_alphanumeric())
}

/// A discovered component, identified by its fully-qualified name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ComponentDescriptor {
    pub qualified_name: String,
}

/// The components found under one namespace.
#[derive(Debug, Clone)]
pub struct Catalog {
    namespace: Namespace,
    entries: Vec<&'static ComponentRegistration>,
}

impl Catalog {
    /// Scans every component linked into the binary.
    pub fn scan_linked(root: &str) -> Result<Self, StartupError> {
        Self::scan(root, inventory::iter::<ComponentRegistration>)
    }

    /// Scans the given registrations.
    pub fn scan<I>(root: &str, registrations: I) -> Result<Self, StartupError>
    where
        I: IntoIterator<Item = &'static ComponentRegistration>,
    {
        let namespace = Namespace::parse(root)?;

        let mut seen = BTreeSet::new();
        let mut entries: Vec<&'static ComponentRegistration> = registrations
            .into_iter()
            .filter(|registration| namespace.contains(registration.qualified_name))
            .filter(|registration| seen.insert(registration.qualified_name))
            .collect();
        entries.sort_by_key(|registration| registration.qualified_name);

        if entries.is_empty() {
            return Err(StartupError::NamespaceNotFound {
                namespace: namespace.to_string(),
            });
        }

        tracing::debug!(
            namespace = %namespace,
            components = entries.len(),
            "Catalog scanned"
        );

        Ok(Self { namespace, entries })
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = ComponentDescriptor> + '_ {
        self.entries.iter().map(|registration| ComponentDescriptor {
            qualified_name: registration.qualified_name.to_string(),
        })
    }

    pub(crate) fn registrations(&self) -> impl Iterator<Item = &'static ComponentRegistration> + '_ {
        self.entries.iter().copied()
    }

    /// The registration behind a descriptor, if it was part of this scan.
    pub fn load(&self, descriptor: &ComponentDescriptor) -> Option<&'static ComponentRegistration> {
        self.entries
            .iter()
            .copied()
            .find(|registration| registration.qualified_name == descriptor.qualified_name)
    }
}
