use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use domain_asset::{
    exception::EventException,
    mock::MockEventHandler,
    model::event::{DomainEvent, EventType},
    service::{EventConsumer, EventContext, EventHandler},
};
use infrastructure_message_queue::{EventDispatcher, InternalEventBus, MessageReader, RetryPolicy};

const TOPIC: &str = "user.events";

/// Records every delivery and fails the first `failures` of them.
#[derive(Default)]
struct RecordingHandler {
    failures: usize,
    seen: Mutex<Vec<(EventContext, DomainEvent)>>,
}

impl RecordingHandler {
    fn failing(failures: usize) -> Self {
        Self {
            failures,
            ..Default::default()
        }
    }

    fn seen(&self) -> Vec<(EventContext, DomainEvent)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventHandler for RecordingHandler {
    async fn handle(&self, ctx: &EventContext, event: &DomainEvent) -> anyhow::Result<()> {
        let mut seen = self.seen.lock().unwrap();
        seen.push((ctx.clone(), event.clone()));
        if seen.len() <= self.failures {
            anyhow::bail!("attempt {} failed", seen.len());
        }
        Ok(())
    }
}

fn dispatcher(bus: &InternalEventBus) -> EventDispatcher {
    let readers: Vec<Box<dyn MessageReader>> = vec![Box::new(bus.reader(TOPIC))];
    EventDispatcher::builder()
        .readers(readers)
        .retry(RetryPolicy::flat(Duration::from_millis(10)))
        .drain_timeout(Duration::from_secs(5))
        .build()
}

fn user_created(user_id: &str) -> DomainEvent {
    DomainEvent::new(EventType::user_created(), user_id, serde_json::json!({ "user_id": user_id }))
}

async fn publish(bus: &InternalEventBus, event: &DomainEvent) {
    use domain_asset::service::EventPublisher;
    bus.publisher().publish(TOPIC, event).await.unwrap();
}

async fn wait_for_commit(bus: &InternalEventBus, next_offset: i64) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while bus.committed(TOPIC) != Some(next_offset) {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("offset {next_offset} never committed"));
}

#[tokio::test]
async fn failed_event_is_redelivered() {
    let bus = InternalEventBus::default();
    let dispatcher = dispatcher(&bus);
    let handler = Arc::new(RecordingHandler::failing(2));
    dispatcher.register_handler(EventType::user_created(), handler.clone()).unwrap();
    dispatcher.start().await.unwrap();

    let event = user_created("u-1");
    publish(&bus, &event).await;
    wait_for_commit(&bus, 1).await;
    dispatcher.stop().await.unwrap();

    let seen = handler.seen();
    assert_eq!(seen.len(), 3);
    assert!(seen.iter().all(|(_, delivered)| delivered == &event));
}

#[tokio::test]
async fn unknown_type_is_committed() {
    let bus = InternalEventBus::default();
    let dispatcher = dispatcher(&bus);
    let handler = Arc::new(RecordingHandler::default());
    dispatcher.register_handler(EventType::user_created(), handler.clone()).unwrap();
    dispatcher.start().await.unwrap();

    let unknown = DomainEvent::new(EventType::new("user_deleted"), "u-1", serde_json::json!({}));
    publish(&bus, &unknown).await;
    wait_for_commit(&bus, 1).await;
    dispatcher.stop().await.unwrap();

    assert!(handler.seen().is_empty());
}

#[tokio::test]
async fn malformed_payload_is_not_committed() {
    let bus = InternalEventBus::default();
    let dispatcher = dispatcher(&bus);
    let handler = Arc::new(RecordingHandler::default());
    dispatcher.register_handler(EventType::user_created(), handler.clone()).unwrap();
    dispatcher.start().await.unwrap();

    bus.send(TOPIC, None, b"{not json".to_vec()).unwrap();
    publish(&bus, &user_created("u-1")).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    dispatcher.stop().await.unwrap();

    assert_eq!(bus.committed(TOPIC), None);
    assert!(handler.seen().is_empty());
}

#[tokio::test]
async fn keeps_order_and_threads_correlation() {
    let bus = InternalEventBus::default();
    let dispatcher = dispatcher(&bus);
    let handler = Arc::new(RecordingHandler::default());
    dispatcher.register_handler(EventType::user_created(), handler.clone()).unwrap();
    dispatcher.start().await.unwrap();

    let events: Vec<DomainEvent> = ["u-1", "u-2", "u-3"].into_iter().map(user_created).collect();
    for event in &events {
        publish(&bus, event).await;
    }
    wait_for_commit(&bus, 3).await;
    dispatcher.stop().await.unwrap();

    let seen = handler.seen();
    let ids: Vec<&str> = seen.iter().map(|(_, e)| e.id.as_str()).collect();
    let expected: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, expected);
    for (ctx, event) in &seen {
        assert_eq!(ctx.correlation_id, event.metadata.correlation_id);
        assert_eq!(ctx.topic, TOPIC);
    }
}

#[tokio::test]
async fn registration_is_sealed_at_start() {
    let bus = InternalEventBus::default();
    let dispatcher = dispatcher(&bus);

    let mut handler = MockEventHandler::new();
    handler.expect_handle().never();
    let handler = Arc::new(handler);
    dispatcher.register_handler(EventType::user_created(), handler.clone()).unwrap();

    let duplicate = dispatcher.register_handler(EventType::user_created(), handler.clone());
    assert!(matches!(duplicate, Err(EventException::DuplicateHandler { .. })));

    dispatcher.start().await.unwrap();
    let late = dispatcher.register_handler(EventType::log_activity(), handler.clone());
    assert!(matches!(late, Err(EventException::AlreadyStarted)));
    assert!(matches!(dispatcher.start().await, Err(EventException::AlreadyStarted)));

    dispatcher.stop().await.unwrap();
}

#[tokio::test]
async fn stop_interrupts_retry_backoff() {
    let bus = InternalEventBus::default();
    let readers: Vec<Box<dyn MessageReader>> = vec![Box::new(bus.reader(TOPIC))];
    let dispatcher = EventDispatcher::builder()
        .readers(readers)
        .retry(RetryPolicy::flat(Duration::from_secs(3600)))
        .drain_timeout(Duration::from_secs(5))
        .build();
    let handler = Arc::new(RecordingHandler::failing(usize::MAX));
    dispatcher.register_handler(EventType::user_created(), handler.clone()).unwrap();
    dispatcher.start().await.unwrap();

    publish(&bus, &user_created("u-1")).await;
    tokio::time::timeout(Duration::from_secs(5), async {
        while handler.seen().is_empty() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();

    tokio::time::timeout(Duration::from_secs(1), dispatcher.stop()).await.unwrap().unwrap();
    assert_eq!(handler.seen().len(), 1);
    assert_eq!(bus.committed(TOPIC), None);
}
