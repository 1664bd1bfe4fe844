//! Durable event-stream consumption: the receive → route → ack loop.
//!
//! One consumer owns the connection to one durable group on one category
//! stream and feeds exactly one resolved handler. Messages are processed
//! strictly one at a time in receipt order; consumers for different
//! aggregate types run as independent tasks with no ordering relationship.

use std::sync::Arc;

use common::AggregateType;
use event_store::{
    DecodeError, DroppedSubscription, EventDecoder, EventStoreError, EventSubscriber,
    ResolvedEnvelope, SubscriptionHandle, SubscriptionMessage,
};
use tokio_util::sync::CancellationToken;

use crate::handler::EventHandler;
use crate::matcher::EventMatcher;

/// Event type of log metadata markers. Such records are permanently
/// undeliverable: they are nack-skipped, never retried.
pub const METADATA_EVENT_TYPE: &str = "$metadata";

/// What a consumer group is wired for; selects the group name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionPurpose {
    Projections,
    Sagas,
}

impl SubscriptionPurpose {
    /// The literal suffix used in the group name.
    pub fn group_suffix(&self) -> &'static str {
        match self {
            Self::Projections => "projections",
            Self::Sagas => "sagas",
        }
    }
}

/// Category stream name for an aggregate type.
pub fn stream_name(aggregate_type: &AggregateType) -> String {
    format!("$ce-{aggregate_type}")
}

/// Durable group name for a purpose.
pub fn group_name(purpose: SubscriptionPurpose) -> String {
    format!("subscription-group-{}", purpose.group_suffix())
}

enum PumpOutcome {
    Cancelled,
    Dropped(EventStoreError),
}

/// Maintains a resilient one-directional flow of events from a durable log
/// group to exactly one resolved handler, with explicit acknowledgment.
pub struct SubscriptionConsumer<P> {
    client: Arc<dyn EventSubscriber>,
    decoder: Arc<EventDecoder<P>>,
    matcher: EventMatcher,
    handler: Arc<dyn EventHandler<P>>,
    stream: String,
    group: String,
}

impl<P: Send + Sync + 'static> SubscriptionConsumer<P> {
    /// Creates a consumer for one aggregate type and purpose.
    pub fn new(
        aggregate_type: &AggregateType,
        purpose: SubscriptionPurpose,
        client: Arc<dyn EventSubscriber>,
        decoder: Arc<EventDecoder<P>>,
        matcher: EventMatcher,
        handler: Arc<dyn EventHandler<P>>,
    ) -> Self {
        Self {
            client,
            decoder,
            matcher,
            handler,
            stream: stream_name(aggregate_type),
            group: group_name(purpose),
        }
    }

    /// The category stream this consumer reads.
    pub fn stream(&self) -> &str {
        &self.stream
    }

    /// The durable group this consumer belongs to.
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Creates the durable group, treating "already exists" as success so
    /// restarts never fail here. Any other error is fatal at startup.
    pub async fn ensure_group(&self) -> event_store::Result<()> {
        match self
            .client
            .create_subscription_group(&self.stream, &self.group)
            .await
        {
            Ok(()) | Err(EventStoreError::GroupAlreadyExists { .. }) => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Runs the consumer until the cancellation token fires.
    ///
    /// A dropped subscription reconnects immediately, with no backoff. A
    /// failed subscribe call terminates this consumer; only a process
    /// restart brings it back.
    pub async fn run(self, token: CancellationToken) {
        loop {
            let mut subscription = match self
                .client
                .subscribe_to_group(&self.stream, &self.group)
                .await
            {
                Ok(subscription) => subscription,
                Err(err) => {
                    tracing::error!(
                        stream = %self.stream,
                        group = %self.group,
                        error = %err,
                        "failed to subscribe to stream"
                    );
                    return;
                }
            };

            tracing::info!(
                stream = %self.stream,
                group = %self.group,
                "start persistent subscription"
            );

            match self.pump(&token, subscription.as_mut()).await {
                PumpOutcome::Cancelled => {
                    self.close_subscription(subscription.as_mut()).await;
                    return;
                }
                PumpOutcome::Dropped(err) => {
                    self.close_subscription(subscription.as_mut()).await;
                    if token.is_cancelled() {
                        return;
                    }
                    tracing::warn!(
                        stream = %self.stream,
                        group = %self.group,
                        error = %err,
                        "subscription dropped, reconnecting"
                    );
                }
            }
        }
    }

    /// Inner receive loop. Returns on cancellation or drop; every other
    /// condition is handled in place and the loop continues. The receive is
    /// the loop's single suspension point.
    async fn pump(
        &self,
        token: &CancellationToken,
        subscription: &mut dyn SubscriptionHandle,
    ) -> PumpOutcome {
        loop {
            let message = tokio::select! {
                biased;
                () = token.cancelled() => return PumpOutcome::Cancelled,
                message = subscription.recv() => message,
            };

            match message {
                SubscriptionMessage::DeadlineExceeded => {
                    // Liveness heartbeat from the store, not a failure.
                    continue;
                }
                SubscriptionMessage::Dropped(dropped) => {
                    return self.handle_drop(subscription, dropped).await;
                }
                SubscriptionMessage::Event(envelope) => {
                    self.route(subscription, envelope).await;
                }
            }
        }
    }

    /// Nack-retries any event attached to the drop so it is redelivered,
    /// then surfaces the drop reason to the reconnect loop.
    async fn handle_drop(
        &self,
        subscription: &mut dyn SubscriptionHandle,
        dropped: DroppedSubscription,
    ) -> PumpOutcome {
        if let Some(envelope) = dropped.envelope {
            let message = format!(
                "subscription dropped. Stream: {} Group: {} Error: {}",
                self.stream, self.group, dropped.reason
            );
            self.nack_retry(subscription, &message, &envelope).await;
        }

        PumpOutcome::Dropped(dropped.reason)
    }

    /// Decides ack vs. nack-retry vs. nack-skip for one delivered envelope.
    async fn route(&self, subscription: &mut dyn SubscriptionHandle, envelope: ResolvedEnvelope) {
        let Some(event) = envelope.event.as_ref() else {
            // Bare link with no resolvable event: nothing to process.
            self.ack(subscription, &envelope).await;
            return;
        };

        if event.event_type == METADATA_EVENT_TYPE {
            let message = format!(
                "metadata event, skipping. {} Stream: {} Group: {}",
                envelope.describe(),
                self.stream,
                self.group
            );
            self.nack_skip(subscription, &message, &envelope).await;
            return;
        }

        tracing::debug!(
            event_type = %event.event_type,
            stream = %self.stream,
            group = %self.group,
            "processing new event"
        );

        let decoded = match self.decoder.decode(event) {
            Ok(decoded) => decoded,
            Err(err) => {
                self.nack_decode_failure(subscription, err, &envelope).await;
                return;
            }
        };

        if !self.matcher.matches(&decoded.event_type) {
            // Delivered to the group but irrelevant to this handler; acking
            // prevents redelivery storms.
            self.ack(subscription, &envelope).await;
            return;
        }

        match self.handler.handle_event(&decoded).await {
            Ok(()) => {
                metrics::counter!("subscription_events_handled").increment(1);
                self.ack(subscription, &envelope).await;
            }
            Err(err) => {
                let message = format!(
                    "failed to handle event. Error: {} Event: {} Stream: {} Group: {}",
                    err, decoded.event_type, self.stream, self.group
                );
                self.nack_retry(subscription, &message, &envelope).await;
            }
        }
    }

    /// Decode failures are retried: the payload may be transiently
    /// malformed (a race against schema registration), and retrying is
    /// preferred over data loss.
    async fn nack_decode_failure(
        &self,
        subscription: &mut dyn SubscriptionHandle,
        err: DecodeError,
        envelope: &ResolvedEnvelope,
    ) {
        let message = format!(
            "failed to decode event. Error: {} Event: {} Stream: {} Group: {}",
            err,
            envelope.event_type().unwrap_or("<unknown>"),
            self.stream,
            self.group
        );
        self.nack_retry(subscription, &message, envelope).await;
    }

    async fn ack(&self, subscription: &mut dyn SubscriptionHandle, envelope: &ResolvedEnvelope) {
        metrics::counter!("subscription_events_acked").increment(1);
        if let Err(err) = subscription.ack(envelope).await {
            tracing::error!(error = %err, "failed to ACK event");
        }
    }

    async fn nack_retry(
        &self,
        subscription: &mut dyn SubscriptionHandle,
        reason: &str,
        envelope: &ResolvedEnvelope,
    ) {
        tracing::error!("{reason}");
        metrics::counter!("subscription_events_nacked_retry").increment(1);
        if let Err(err) = subscription.nack_retry(reason, envelope).await {
            tracing::error!(error = %err, "failed to NACK retry event");
        }
    }

    async fn nack_skip(
        &self,
        subscription: &mut dyn SubscriptionHandle,
        message: &str,
        envelope: &ResolvedEnvelope,
    ) {
        tracing::warn!("{message}");
        metrics::counter!("subscription_events_nacked_skip").increment(1);
        if let Err(err) = subscription.nack_skip(message, envelope).await {
            tracing::error!(error = %err, "failed to NACK skip event");
        }
    }

    async fn close_subscription(&self, subscription: &mut dyn SubscriptionHandle) {
        if let Err(err) = subscription.close().await {
            tracing::error!(
                stream = %self.stream,
                group = %self.group,
                error = %err,
                "failed to close subscription"
            );
        }
    }
}
