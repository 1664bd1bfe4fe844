//! Saga trait and the adapter exposing sagas as event handlers.

use std::sync::Arc;

use async_trait::async_trait;
use domain::{WalletCommand, WalletEvent};
use event_store::DecodedEvent;
use subscriptions::{EventHandler, EventMatcher, HandlerError, HandlerProvider, HandlerType};

use crate::error::{CommandDispatchError, SagaError};

/// The command-bus seam sagas dispatch through.
///
/// What happens behind it (a service call, a queue, a remote bus) is opaque
/// to the saga.
#[async_trait]
pub trait CommandSender: Send + Sync {
    /// Dispatches one command.
    async fn send(&self, command: WalletCommand) -> Result<(), CommandDispatchError>;
}

/// A process manager reacting to events by issuing further commands.
#[async_trait]
pub trait Saga: Send + Sync {
    /// Short saga name; the handler type is derived from it.
    fn name(&self) -> &'static str;

    /// The event types this saga reacts to.
    fn matcher(&self) -> EventMatcher;

    /// Reacts to one event.
    async fn run_saga(
        &self,
        event: &DecodedEvent<WalletEvent>,
        commands: &dyn CommandSender,
    ) -> Result<(), SagaError>;
}

/// Adapts a [`Saga`] plus a [`CommandSender`] into the engine's handler
/// seam, namespaced under `saga_<name>`.
pub struct SagaEventHandler {
    saga: Arc<dyn Saga>,
    commands: Arc<dyn CommandSender>,
}

impl SagaEventHandler {
    pub fn new(saga: Arc<dyn Saga>, commands: Arc<dyn CommandSender>) -> Self {
        Self { saga, commands }
    }
}

#[async_trait]
impl EventHandler<WalletEvent> for SagaEventHandler {
    fn handler_type(&self) -> HandlerType {
        HandlerType::for_saga(self.saga.name())
    }

    async fn handle_event(&self, event: &DecodedEvent<WalletEvent>) -> Result<(), HandlerError> {
        self.saga.run_saga(event, self.commands.as_ref()).await?;
        metrics::counter!("saga_events_handled", "saga" => self.saga.name()).increment(1);
        Ok(())
    }
}

/// Provider wiring one saga into the saga registry.
pub struct SagaConfig {
    saga: Arc<dyn Saga>,
    commands: Arc<dyn CommandSender>,
}

impl SagaConfig {
    pub fn new(saga: Arc<dyn Saga>, commands: Arc<dyn CommandSender>) -> Self {
        Self { saga, commands }
    }
}

impl HandlerProvider<WalletEvent> for SagaConfig {
    fn matcher(&self) -> EventMatcher {
        self.saga.matcher()
    }

    fn handler(&self) -> Arc<dyn EventHandler<WalletEvent>> {
        Arc::new(SagaEventHandler::new(
            Arc::clone(&self.saga),
            Arc::clone(&self.commands),
        ))
    }
}
