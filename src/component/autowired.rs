//! Injection slots.

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::container::injector::InjectError;

/// A field populated by the container at startup.
///
/// The slot is written at most once, during injection. Components read it
/// while serving; an unresolved dependency simply stays empty.
pub struct Autowired<V: ?Sized> {
    slot: OnceLock<Arc<V>>,
}

impl<V: ?Sized> Autowired<V> {
    pub const fn new() -> Self {
        Self {
            slot: OnceLock::new(),
        }
    }

    /// The injected bean, if the container resolved one.
    pub fn get(&self) -> Option<&Arc<V>> {
        self.slot.get()
    }

    pub fn is_injected(&self) -> bool {
        self.slot.get().is_some()
    }

    /// The injected bean, or an error naming the missing type.
    pub fn require(&self) -> Result<&V, UnsatisfiedDependency> {
        self.slot
            .get()
            .map(|bean| &**bean)
            .ok_or(UnsatisfiedDependency {
                expected: std::any::type_name::<V>(),
            })
    }

    pub(crate) fn inject(&self, bean: Arc<V>) -> Result<(), InjectError> {
        self.slot
            .set(bean)
            .map_err(|_| InjectError::AlreadyInjected)
    }
}

impl<V: ?Sized> Default for Autowired<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: ?Sized> fmt::Debug for Autowired<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Autowired")
            .field("type", &std::any::type_name::<V>())
            .field("injected", &self.is_injected())
            .finish()
    }
}

/// Raised when a handler reads a dependency the container never injected.
#[derive(Debug, Clone, thiserror::Error)]
#[error("dependency `{expected}` was not injected")]
pub struct UnsatisfiedDependency {
    pub expected: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> &'static str;
    }

    struct Hello;

    impl Greeter for Hello {
        fn greet(&self) -> &'static str {
            "hello"
        }
    }

    #[test]
    fn test_empty_slot_reports_missing_type() {
        let slot: Autowired<dyn Greeter> = Autowired::default();
        assert!(!slot.is_injected());
        let err = slot.require().err().unwrap();
        assert!(err.expected.contains("Greeter"));
    }

    #[test]
    fn test_slot_is_written_once() {
        let slot: Autowired<dyn Greeter> = Autowired::new();
        slot.inject(Arc::new(Hello)).unwrap();
        assert_eq!(slot.require().unwrap().greet(), "hello");

        let second = slot.inject(Arc::new(Hello));
        assert!(matches!(second, Err(InjectError::AlreadyInjected)));
    }
}
