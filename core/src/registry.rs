//! Maps operation kinds to invoker factories.
//!
//! # Design
//! The context creates invokers through a table of factories keyed by
//! `OperationKind`, all sharing one signature: `SessionBinding -> Invoker`.
//! The table is filled when the registry is built, so supporting a new
//! operation is a registration, not a change to the context.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::definition::{ApiDefinition, OperationKind, STANDARD};
use crate::error::{BeehiveError, Result};
use crate::invoker::{Invoker, SessionBinding};

/// Builds an invoker bound to a session.
pub type InvokerFactory = Arc<dyn Fn(SessionBinding) -> Invoker + Send + Sync>;

/// Table of the operation kinds a context can instantiate.
#[derive(Clone, Default)]
pub struct InvokerRegistry {
    factories: HashMap<OperationKind, InvokerFactory>,
}

impl InvokerRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every operation in `definition::STANDARD`.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for definition in STANDARD {
            registry.register_definition(definition);
        }
        registry
    }

    /// Registers the plain invoker for `definition`.
    pub fn register_definition(&mut self, definition: &'static ApiDefinition) -> &mut Self {
        self.register(definition.kind, move |session| {
            Invoker::new(definition, session)
        })
    }

    /// Registers a custom factory. Replaces any factory already registered
    /// for `kind`.
    pub fn register<F>(&mut self, kind: OperationKind, factory: F) -> &mut Self
    where
        F: Fn(SessionBinding) -> Invoker + Send + Sync + 'static,
    {
        self.factories.insert(kind, Arc::new(factory));
        self
    }

    pub fn contains(&self, kind: OperationKind) -> bool {
        self.factories.contains_key(&kind)
    }

    /// Registered kinds in name order.
    pub fn kinds(&self) -> Vec<OperationKind> {
        let mut kinds: Vec<_> = self.factories.keys().copied().collect();
        kinds.sort();
        kinds
    }

    /// Runs the factory registered for `kind`.
    ///
    /// An unregistered kind, or a factory that hands back an invoker for a
    /// different kind, is a wiring bug and reported as `IllegalState`.
    pub(crate) fn instantiate(
        &self,
        kind: OperationKind,
        session: SessionBinding,
    ) -> Result<Invoker> {
        let factory = self.factories.get(&kind).ok_or_else(|| {
            BeehiveError::illegal_state(format!("no invoker registered for operation {kind}"))
        })?;
        let invoker = (**factory)(session);
        let built = invoker.definition().kind;
        if built != kind {
            return Err(BeehiveError::illegal_state(format!(
                "factory for {kind} built an invoker for {built}"
            )));
        }
        Ok(invoker)
    }
}

impl fmt::Debug for InvokerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvokerRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
