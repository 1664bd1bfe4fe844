//! Registry binding event matchers to event handlers.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::RegistryError;
use crate::handler::{EventHandler, HandlerType};
use crate::matcher::EventMatcher;

/// A matcher/handler pair stored under the handler's type.
pub struct HandlerEntry<P> {
    pub matcher: EventMatcher,
    pub handler: Arc<dyn EventHandler<P>>,
}

impl<P> Clone for HandlerEntry<P> {
    fn clone(&self) -> Self {
        Self {
            matcher: self.matcher.clone(),
            handler: Arc::clone(&self.handler),
        }
    }
}

/// Supplies one handler registration.
///
/// Projection and saga modules each expose a provider; the process collects
/// them into a registry at startup.
pub trait HandlerProvider<P>: Send + Sync {
    /// The event types the handler cares about.
    fn matcher(&self) -> EventMatcher;

    /// The handler itself.
    fn handler(&self) -> Arc<dyn EventHandler<P>>;
}

/// Thread-safe map from [`HandlerType`] to its matcher/handler pair.
///
/// Writes happen only during the registration phase at startup; lookups are
/// read-mostly thereafter. A lookup never observes a partially constructed
/// entry.
pub struct HandlerRegistry<P> {
    handlers_by_type: RwLock<HashMap<HandlerType, HandlerEntry<P>>>,
}

impl<P> HandlerRegistry<P> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            handlers_by_type: RwLock::new(HashMap::new()),
        }
    }

    /// Builds a registry from providers, failing fast on the first
    /// registration error. A collision or missing matcher is a programming
    /// error, not a runtime condition to recover from.
    pub fn from_providers<'a, I>(providers: I) -> Result<Self, RegistryError>
    where
        P: 'a,
        I: IntoIterator<Item = &'a dyn HandlerProvider<P>>,
    {
        let registry = Self::new();
        for provider in providers {
            registry.add_handler(provider.matcher(), provider.handler())?;
        }
        Ok(registry)
    }

    /// Inserts an entry under the handler's type.
    ///
    /// Fails with `MissingMatcher` for an empty matcher and with
    /// `DuplicateHandler` when an entry already exists; the existing entry
    /// is never replaced.
    pub fn add_handler(
        &self,
        matcher: EventMatcher,
        handler: Arc<dyn EventHandler<P>>,
    ) -> Result<(), RegistryError> {
        if matcher.is_empty() {
            return Err(RegistryError::MissingMatcher);
        }

        let handler_type = handler.handler_type();
        let mut handlers = self
            .handlers_by_type
            .write()
            .expect("handler registry lock poisoned");

        if handlers.contains_key(&handler_type) {
            return Err(RegistryError::DuplicateHandler(handler_type));
        }

        handlers.insert(handler_type, HandlerEntry { matcher, handler });
        Ok(())
    }

    /// Looks up the matcher/handler pair for a handler type.
    pub fn get_handler(
        &self,
        handler_type: &HandlerType,
    ) -> Result<(EventMatcher, Arc<dyn EventHandler<P>>), RegistryError> {
        let handlers = self
            .handlers_by_type
            .read()
            .expect("handler registry lock poisoned");

        let entry = handlers
            .get(handler_type)
            .ok_or_else(|| RegistryError::HandlerNotFound(handler_type.clone()))?;

        Ok((entry.matcher.clone(), Arc::clone(&entry.handler)))
    }

    /// Consistent snapshot of all entries. Used at subscription-wiring time,
    /// not on the hot path.
    pub fn handlers(&self) -> Vec<(HandlerType, HandlerEntry<P>)> {
        let handlers = self
            .handlers_by_type
            .read()
            .expect("handler registry lock poisoned");

        handlers
            .iter()
            .map(|(handler_type, entry)| (handler_type.clone(), entry.clone()))
            .collect()
    }
}

impl<P> Default for HandlerRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use event_store::DecodedEvent;

    #[derive(Debug, Clone)]
    struct TestEvent;

    struct NoopHandler {
        name: &'static str,
    }

    #[async_trait]
    impl EventHandler<TestEvent> for NoopHandler {
        fn handler_type(&self) -> HandlerType {
            HandlerType::from(self.name)
        }

        async fn handle_event(
            &self,
            _event: &DecodedEvent<TestEvent>,
        ) -> Result<(), crate::handler::HandlerError> {
            Ok(())
        }
    }

    struct NoopProvider {
        name: &'static str,
    }

    impl HandlerProvider<TestEvent> for NoopProvider {
        fn matcher(&self) -> EventMatcher {
            EventMatcher::for_events(["account_opened"])
        }

        fn handler(&self) -> Arc<dyn EventHandler<TestEvent>> {
            Arc::new(NoopHandler { name: self.name })
        }
    }

    fn matcher() -> EventMatcher {
        EventMatcher::for_events(["account_opened"])
    }

    #[test]
    fn add_and_get_handler() {
        let registry = HandlerRegistry::new();
        let handler: Arc<dyn EventHandler<TestEvent>> = Arc::new(NoopHandler { name: "account" });

        registry.add_handler(matcher(), Arc::clone(&handler)).unwrap();

        let (resolved_matcher, resolved_handler) =
            registry.get_handler(&HandlerType::from("account")).unwrap();
        assert!(resolved_matcher.matches("account_opened"));
        assert_eq!(resolved_handler.handler_type(), handler.handler_type());
    }

    #[test]
    fn empty_matcher_is_rejected() {
        let registry = HandlerRegistry::new();
        let handler: Arc<dyn EventHandler<TestEvent>> = Arc::new(NoopHandler { name: "account" });

        let result = registry.add_handler(EventMatcher::for_events(Vec::<String>::new()), handler);
        assert!(matches!(result, Err(RegistryError::MissingMatcher)));
    }

    #[test]
    fn duplicate_registration_rejected_and_first_entry_kept() {
        let registry = HandlerRegistry::new();
        let first: Arc<dyn EventHandler<TestEvent>> = Arc::new(NoopHandler { name: "account" });
        let second: Arc<dyn EventHandler<TestEvent>> = Arc::new(NoopHandler { name: "account" });

        registry.add_handler(matcher(), Arc::clone(&first)).unwrap();
        let result = registry.add_handler(
            EventMatcher::for_events(["account_closed"]),
            Arc::clone(&second),
        );
        assert!(matches!(result, Err(RegistryError::DuplicateHandler(_))));

        // The original entry is untouched.
        let (resolved_matcher, resolved_handler) =
            registry.get_handler(&HandlerType::from("account")).unwrap();
        assert!(resolved_matcher.matches("account_opened"));
        assert!(!resolved_matcher.matches("account_closed"));
        assert!(Arc::ptr_eq(&resolved_handler, &first));
    }

    #[test]
    fn unknown_handler_type_is_not_found() {
        let registry: HandlerRegistry<TestEvent> = HandlerRegistry::new();
        let result = registry.get_handler(&HandlerType::from("account"));
        assert!(matches!(result, Err(RegistryError::HandlerNotFound(_))));
    }

    #[test]
    fn from_providers_registers_all() {
        let providers = [
            NoopProvider { name: "account" },
            NoopProvider { name: "movement_type" },
        ];
        let registry = HandlerRegistry::from_providers(
            providers.iter().map(|p| p as &dyn HandlerProvider<TestEvent>),
        )
        .unwrap();

        assert_eq!(registry.handlers().len(), 2);
        assert!(registry.get_handler(&HandlerType::from("account")).is_ok());
        assert!(
            registry
                .get_handler(&HandlerType::from("movement_type"))
                .is_ok()
        );
    }

    #[test]
    fn from_providers_fails_fast_on_collision() {
        let providers = [
            NoopProvider { name: "account" },
            NoopProvider { name: "account" },
        ];
        let result = HandlerRegistry::from_providers(
            providers.iter().map(|p| p as &dyn HandlerProvider<TestEvent>),
        );
        assert!(matches!(result, Err(RegistryError::DuplicateHandler(_))));
    }

    #[test]
    fn concurrent_registration_is_safe() {
        let registry = Arc::new(HandlerRegistry::<TestEvent>::new());
        let names = ["account", "movement_type", "saga_opening_balance"];

        let threads: Vec<_> = names
            .into_iter()
            .map(|name| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    registry
                        .add_handler(
                            EventMatcher::for_events(["account_opened"]),
                            Arc::new(NoopHandler { name }),
                        )
                        .unwrap();
                })
            })
            .collect();
        for thread in threads {
            thread.join().unwrap();
        }

        assert_eq!(registry.handlers().len(), 3);
    }
}
