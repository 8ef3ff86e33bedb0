use std::{collections::HashMap, time::Duration};

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use domain_asset::{model::event::DomainEvent, service::EventPublisher};
use rdkafka::{
    config::RDKafkaLogLevel,
    consumer::{CommitMode, Consumer, StreamConsumer},
    message::{Header, OwnedHeaders},
    producer::{FutureProducer, FutureRecord},
    ClientConfig, Message, Offset, TopicPartitionList,
};

use crate::{InboundMessage, MessageReader};

fn client_config(client_options: &HashMap<String, String>) -> ClientConfig {
    let mut kafka_config = ClientConfig::new();
    for (option_key, option_value) in client_options.iter() {
        kafka_config.set(option_key.as_str(), option_value.as_str());
    }
    kafka_config.set_log_level(RDKafkaLogLevel::Warning);
    kafka_config
}

/// Consumer of a single topic with auto commit disabled.
pub struct KafkaMessageReader {
    topic: String,
    consumer: StreamConsumer,
    seek_timeout: Duration,
}

impl KafkaMessageReader {
    pub fn new(
        client_options: &HashMap<String, String>,
        group_id: &str,
        topic: &str,
    ) -> anyhow::Result<Self> {
        let mut kafka_config = client_config(client_options);
        kafka_config
            .set("group.id", group_id)
            .set("enable.auto.commit", "false")
            .set("enable.partition.eof", "false");
        if !client_options.contains_key("auto.offset.reset") {
            kafka_config.set("auto.offset.reset", "earliest");
        }
        let consumer: StreamConsumer =
            kafka_config.create().context("Failed to create kafka consumer.")?;
        consumer
            .subscribe(&[topic])
            .with_context(|| format!("Failed to subscribe topic: {topic}."))?;
        tracing::info!(topic, group_id, "Kafka reader subscribed.");
        Ok(Self {
            topic: topic.to_owned(),
            consumer,
            seek_timeout: Duration::from_secs(5),
        })
    }
}

#[async_trait]
impl MessageReader for KafkaMessageReader {
    fn topic(&self) -> &str {
        &self.topic
    }

    async fn fetch(&mut self) -> anyhow::Result<InboundMessage> {
        let message = self.consumer.recv().await?;
        Ok(InboundMessage {
            topic: message.topic().to_owned(),
            partition: message.partition(),
            offset: message.offset(),
            key: message.key().map(<[u8]>::to_vec),
            payload: message.payload().unwrap_or_default().to_vec(),
        })
    }

    async fn commit(&mut self, message: &InboundMessage) -> anyhow::Result<()> {
        let mut partitions = TopicPartitionList::new();
        partitions.add_partition_offset(
            &message.topic,
            message.partition,
            Offset::Offset(message.offset + 1),
        )?;
        self.consumer.commit(&partitions, CommitMode::Async)?;
        Ok(())
    }

    async fn release(&mut self, message: &InboundMessage) -> anyhow::Result<()> {
        self.consumer.seek(
            &message.topic,
            message.partition,
            Offset::Offset(message.offset),
            self.seek_timeout,
        )?;
        Ok(())
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        self.consumer.unsubscribe();
        Ok(())
    }
}

/// Publishes envelopes keyed by their aggregate id.
pub struct KafkaEventPublisher {
    producer: FutureProducer,
    queue_timeout: Duration,
}

impl KafkaEventPublisher {
    pub fn new(client_options: &HashMap<String, String>) -> anyhow::Result<Self> {
        Ok(Self {
            producer: client_config(client_options)
                .create()
                .context("Failed to create kafka producer.")?,
            queue_timeout: Duration::from_secs(5),
        })
    }
}

#[async_trait]
impl EventPublisher for KafkaEventPublisher {
    async fn publish(&self, topic: &str, event: &DomainEvent) -> anyhow::Result<()> {
        let payload = serde_json::to_vec(event)?;
        let headers = OwnedHeaders::new()
            .insert(Header {
                key: "event-type",
                value: Some(event.event_type.as_str()),
            })
            .insert(Header {
                key: "event-id",
                value: Some(event.id.as_str()),
            })
            .insert(Header {
                key: "correlation-id",
                value: Some(event.correlation_id()),
            });
        let record = FutureRecord::to(topic)
            .payload(&payload)
            .key(&event.aggregate_id)
            .headers(headers);
        let (partition, offset) = self
            .producer
            .send(record, self.queue_timeout)
            .await
            .map_err(|(e, _)| anyhow!("Failed to send event: {} to topic: {topic}: {e}", event.id))?;
        tracing::debug!(topic, partition, offset, event_id = %event.id, "Event published.");
        Ok(())
    }
}
