//! Registry mapping action identifiers to factories.
//!
//! New action types are pluggable by name: each concrete action module
//! registers a factory at startup, and leaf nodes resolve their
//! `action` identifier through the registry at execution time.

use std::sync::Arc;

use dashmap::DashMap;

use crate::action::action::Action;

/// Constructs a fresh [`Action`] instance per leaf execution.
pub trait ActionFactory: Send + Sync {
    fn create(&self) -> Box<dyn Action>;
}

impl<F> ActionFactory for F
where
    F: Fn() -> Box<dyn Action> + Send + Sync,
{
    fn create(&self) -> Box<dyn Action> {
        (self)()
    }
}

/// Registry for action factories
#[derive(Clone)]
pub struct ActionRegistry {
    factories: Arc<DashMap<String, Arc<dyn ActionFactory>>>,
}

impl ActionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            factories: Arc::new(DashMap::new()),
        }
    }

    /// Register a factory under an action identifier. Re-registering a name
    /// replaces the previous factory.
    pub fn register(&self, name: impl Into<String>, factory: Arc<dyn ActionFactory>) {
        self.factories.insert(name.into(), factory);
    }

    /// Register a plain constructor function.
    pub fn register_fn<F>(&self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Action> + Send + Sync + 'static,
    {
        self.register(name, Arc::new(factory));
    }

    /// Get the factory registered under an identifier.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ActionFactory>> {
        self.factories.get(name).map(|entry| Arc::clone(&entry))
    }

    /// Resolve an identifier straight to a fresh action instance.
    pub fn resolve(&self, name: &str) -> Option<Box<dyn Action>> {
        self.get(name).map(|factory| factory.create())
    }

    /// Check if an identifier is registered
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// List all registered action identifiers
    pub fn list(&self) -> Vec<String> {
        self.factories
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Register a `Default`-constructible action type under a name.
#[macro_export]
macro_rules! register_action {
    ($registry:expr, $name:expr, $ty:ty) => {{
        $registry.register_fn($name, || {
            Box::new(<$ty>::default()) as Box<dyn $crate::action::Action>
        })
    }};
}
