use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    exception::EventResult,
    model::event::{DomainEvent, EventType},
};

/// Publishes envelopes to a topic.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, topic: &str, event: &DomainEvent) -> anyhow::Result<()>;
}

/// Execution context handed to an [`EventHandler`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventContext {
    /// Correlation id of the envelope being handled.
    pub correlation_id: String,
    /// Topic the envelope was read from.
    pub topic: String,
}

/// Reacts to one event type.
///
/// Delivery is at-least-once: the same envelope may be handled more than once.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, ctx: &EventContext, event: &DomainEvent) -> anyhow::Result<()>;
}

/// Consumes envelopes and dispatches them to registered handlers.
#[async_trait]
pub trait EventConsumer: Send + Sync {
    /// Register the handler of `event_type`. Only allowed before [`start`](Self::start).
    fn register_handler(
        &self,
        event_type: EventType,
        handler: Arc<dyn EventHandler>,
    ) -> EventResult<()>;

    async fn start(&self) -> EventResult<()>;

    /// Signal every fetch loop to stop and wait for them to drain.
    async fn stop(&self) -> EventResult<()>;
}
