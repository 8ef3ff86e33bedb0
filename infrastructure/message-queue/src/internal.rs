use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use anyhow::Context;
use async_trait::async_trait;
use domain_asset::{model::event::DomainEvent, service::EventPublisher};

use crate::{InboundMessage, MessageReader};

struct Topic {
    sender: flume::Sender<InboundMessage>,
    receiver: flume::Receiver<InboundMessage>,
    next_offset: i64,
    committed: Option<i64>,
}

impl Topic {
    fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        Self {
            sender,
            receiver,
            next_offset: 0,
            committed: None,
        }
    }
}

/// In-process message bus with one single-partition channel per topic.
#[derive(Clone, Default)]
pub struct InternalEventBus {
    topics: Arc<Mutex<HashMap<String, Topic>>>,
}

impl InternalEventBus {
    fn topics(&self) -> MutexGuard<'_, HashMap<String, Topic>> {
        self.topics.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a raw payload to `topic` and return its offset.
    pub fn send(&self, topic: &str, key: Option<&[u8]>, payload: Vec<u8>) -> anyhow::Result<i64> {
        let mut topics = self.topics();
        let entry = topics.entry(topic.to_owned()).or_insert_with(Topic::new);
        let offset = entry.next_offset;
        entry
            .sender
            .send(InboundMessage {
                topic: topic.to_owned(),
                partition: 0,
                offset,
                key: key.map(<[u8]>::to_vec),
                payload,
            })
            .with_context(|| format!("Topic: {topic} is closed."))?;
        entry.next_offset += 1;
        Ok(offset)
    }

    /// Offset following the last committed message of `topic`.
    pub fn committed(&self, topic: &str) -> Option<i64> {
        self.topics().get(topic).and_then(|t| t.committed)
    }

    fn commit(&self, topic: &str, next_offset: i64) {
        let mut topics = self.topics();
        let entry = topics.entry(topic.to_owned()).or_insert_with(Topic::new);
        entry.committed = entry.committed.max(Some(next_offset));
    }

    pub fn reader(&self, topic: &str) -> InternalMessageReader {
        let receiver = self
            .topics()
            .entry(topic.to_owned())
            .or_insert_with(Topic::new)
            .receiver
            .clone();
        InternalMessageReader {
            topic: topic.to_owned(),
            receiver,
            pending: None,
            bus: self.clone(),
        }
    }

    pub fn publisher(&self) -> InternalEventPublisher {
        InternalEventPublisher { bus: self.clone() }
    }
}

pub struct InternalEventPublisher {
    bus: InternalEventBus,
}

#[async_trait]
impl EventPublisher for InternalEventPublisher {
    async fn publish(&self, topic: &str, event: &DomainEvent) -> anyhow::Result<()> {
        let payload = serde_json::to_vec(event)?;
        let offset = self.bus.send(topic, Some(event.aggregate_id.as_bytes()), payload)?;
        tracing::trace!(topic, offset, event_id = %event.id, "Event published.");
        Ok(())
    }
}

pub struct InternalMessageReader {
    topic: String,
    receiver: flume::Receiver<InboundMessage>,
    /// Released message, handed out again before anything new.
    pending: Option<InboundMessage>,
    bus: InternalEventBus,
}

#[async_trait]
impl MessageReader for InternalMessageReader {
    fn topic(&self) -> &str {
        &self.topic
    }

    async fn fetch(&mut self) -> anyhow::Result<InboundMessage> {
        if let Some(message) = self.pending.take() {
            return Ok(message);
        }
        Ok(self.receiver.recv_async().await?)
    }

    async fn commit(&mut self, message: &InboundMessage) -> anyhow::Result<()> {
        self.bus.commit(&message.topic, message.offset + 1);
        Ok(())
    }

    async fn release(&mut self, message: &InboundMessage) -> anyhow::Result<()> {
        self.pending = Some(message.to_owned());
        Ok(())
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        self.pending = None;
        Ok(())
    }
}
