//! Process lifecycle binding for subscription consumers.
//!
//! Wires consumer start/stop to the host process: `subscribe_*` is called
//! once per aggregate type at startup and spawns the consumer task;
//! [`Lifecycle::shutdown`] cancels the shared token and drains every task.

use std::future::Future;
use std::sync::Arc;

use common::AggregateType;
use event_store::{EventDecoder, EventSubscriber};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::consumer::{SubscriptionConsumer, SubscriptionPurpose, group_name};
use crate::error::SubscribeError;
use crate::handler::HandlerType;
use crate::registry::HandlerRegistry;

/// Owns the consumer tasks and the cancellation token bounding them.
///
/// Consumers observe cancellation at the next receive boundary, so nothing
/// is interrupted mid-handler-call and no event is processed twice on the
/// way down.
pub struct Lifecycle {
    token: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl Lifecycle {
    /// Creates a lifecycle with a fresh root token.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            tasks: Vec::new(),
        }
    }

    /// The root token from which per-consumer tokens are derived.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.token
    }

    /// Spawns a task bounded by this lifecycle.
    pub fn spawn(&mut self, task: impl Future<Output = ()> + Send + 'static) {
        self.tasks.push(tokio::spawn(task));
    }

    /// Number of tasks currently owned.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Cancels the token and awaits every task.
    pub async fn shutdown(self) {
        self.token.cancel();
        for task in self.tasks {
            if let Err(err) = task.await {
                tracing::error!(error = %err, "subscription task failed to join");
            }
        }
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// Wires one projection consumer for an aggregate type.
pub async fn subscribe_for_projections<P: Send + Sync + 'static>(
    aggregate_type: &AggregateType,
    handler_type: &HandlerType,
    client: Arc<dyn EventSubscriber>,
    decoder: Arc<EventDecoder<P>>,
    registry: &HandlerRegistry<P>,
    lifecycle: &mut Lifecycle,
) -> Result<(), SubscribeError> {
    subscribe_event_stream(
        aggregate_type,
        handler_type,
        SubscriptionPurpose::Projections,
        client,
        decoder,
        registry,
        lifecycle,
    )
    .await
}

/// Wires one saga consumer for an aggregate type.
pub async fn subscribe_for_sagas<P: Send + Sync + 'static>(
    aggregate_type: &AggregateType,
    handler_type: &HandlerType,
    client: Arc<dyn EventSubscriber>,
    decoder: Arc<EventDecoder<P>>,
    registry: &HandlerRegistry<P>,
    lifecycle: &mut Lifecycle,
) -> Result<(), SubscribeError> {
    subscribe_event_stream(
        aggregate_type,
        handler_type,
        SubscriptionPurpose::Sagas,
        client,
        decoder,
        registry,
        lifecycle,
    )
    .await
}

/// Resolves the handler, idempotently creates the durable group, and spawns
/// the consumer task.
///
/// Called once per aggregate type at startup; any failure here aborts
/// initialization.
pub async fn subscribe_event_stream<P: Send + Sync + 'static>(
    aggregate_type: &AggregateType,
    handler_type: &HandlerType,
    purpose: SubscriptionPurpose,
    client: Arc<dyn EventSubscriber>,
    decoder: Arc<EventDecoder<P>>,
    registry: &HandlerRegistry<P>,
    lifecycle: &mut Lifecycle,
) -> Result<(), SubscribeError> {
    let (matcher, handler) =
        registry
            .get_handler(handler_type)
            .map_err(|source| SubscribeError::HandlerResolution {
                handler_type: handler_type.clone(),
                group: group_name(purpose),
                source,
            })?;

    let consumer =
        SubscriptionConsumer::new(aggregate_type, purpose, client, decoder, matcher, handler);

    consumer
        .ensure_group()
        .await
        .map_err(|source| SubscribeError::GroupCreation {
            stream: consumer.stream().to_string(),
            group: consumer.group().to_string(),
            source,
        })?;

    let token = lifecycle.cancellation_token().child_token();
    lifecycle.spawn(consumer.run(token));

    Ok(())
}
