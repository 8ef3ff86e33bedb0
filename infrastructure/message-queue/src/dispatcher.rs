use std::{
    collections::{hash_map::Entry, HashMap},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
    time::Duration,
};

use async_trait::async_trait;
use domain_asset::{
    exception::{EventException, EventResult},
    model::event::{DomainEvent, EventType},
    service::{EventConsumer, EventContext, EventHandler},
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use typed_builder::TypedBuilder;

use crate::{Backoff, InboundMessage, MessageReader, RetryPolicy};

type HandlerMap = HashMap<EventType, Arc<dyn EventHandler>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Delivers envelopes from every reader to the handler registered for their type.
///
/// Each reader gets its own fetch loop handling one message at a time, so order is kept per
/// partition. A message is committed only after its handler succeeded, or when no handler
/// exists for its type. Anything else is released and fetched again after a backoff.
#[derive(TypedBuilder)]
pub struct EventDispatcher {
    #[builder(setter(transform = |readers: Vec<Box<dyn MessageReader>>| Mutex::new(readers)))]
    readers: Mutex<Vec<Box<dyn MessageReader>>>,
    #[builder(default)]
    retry: RetryPolicy,
    /// How long [`stop`](EventConsumer::stop) waits for loops before aborting them.
    #[builder(default = Duration::from_secs(30))]
    drain_timeout: Duration,
    #[builder(default)]
    shutdown: CancellationToken,
    #[builder(default, setter(skip))]
    handlers: Mutex<HandlerMap>,
    #[builder(default, setter(skip))]
    started: AtomicBool,
    #[builder(default, setter(skip))]
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

#[async_trait]
impl EventConsumer for EventDispatcher {
    fn register_handler(
        &self,
        event_type: EventType,
        handler: Arc<dyn EventHandler>,
    ) -> EventResult<()> {
        let mut handlers = lock(&self.handlers);
        if self.started.load(Ordering::Acquire) {
            return Err(EventException::AlreadyStarted);
        }
        match handlers.entry(event_type) {
            Entry::Occupied(e) => Err(EventException::DuplicateHandler {
                event_type: e.key().to_owned(),
            }),
            Entry::Vacant(e) => {
                tracing::debug!(event_type = %e.key(), "Handler registered.");
                e.insert(handler);
                Ok(())
            }
        }
    }

    async fn start(&self) -> EventResult<()> {
        let handlers = {
            let handlers = lock(&self.handlers);
            if self.started.swap(true, Ordering::AcqRel) {
                return Err(EventException::AlreadyStarted);
            }
            Arc::new(handlers.clone())
        };
        let readers = std::mem::take(&mut *lock(&self.readers));
        if readers.is_empty() {
            tracing::warn!("Event dispatcher started without readers.");
        }

        let mut tasks = lock(&self.tasks);
        for reader in readers {
            let span = tracing::info_span!("fetch_loop", topic = reader.topic());
            let fetch_loop = FetchLoop {
                reader,
                handlers: handlers.clone(),
                backoff: Backoff::new(self.retry.to_owned()),
                shutdown: self.shutdown.child_token(),
            };
            tasks.push(tokio::spawn(fetch_loop.run().instrument(span)));
        }
        tracing::info!(readers = tasks.len(), handlers = handlers.len(), "Event dispatcher started.");
        Ok(())
    }

    async fn stop(&self) -> EventResult<()> {
        self.shutdown.cancel();
        let tasks = std::mem::take(&mut *lock(&self.tasks));
        let aborts: Vec<_> = tasks.iter().map(JoinHandle::abort_handle).collect();

        match tokio::time::timeout(self.drain_timeout, futures::future::join_all(tasks)).await {
            Ok(results) => {
                for e in results.into_iter().filter_map(Result::err) {
                    tracing::error!("Fetch loop ended abnormally: {e}");
                }
                tracing::info!("Event dispatcher stopped.");
            }
            Err(_) => {
                tracing::warn!(
                    timeout = ?self.drain_timeout,
                    "Fetch loops didn't drain in time, aborting them."
                );
                for abort in aborts {
                    abort.abort();
                }
            }
        }
        Ok(())
    }
}

struct FetchLoop {
    reader: Box<dyn MessageReader>,
    handlers: Arc<HandlerMap>,
    backoff: Backoff,
    shutdown: CancellationToken,
}

impl FetchLoop {
    async fn run(mut self) {
        loop {
            let fetched = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                fetched = self.reader.fetch() => fetched,
            };
            let settled = match fetched {
                Ok(message) => self.dispatch(message).await,
                Err(e) => {
                    tracing::warn!("Fetch failed: {e:#}");
                    false
                }
            };
            if settled {
                self.backoff.reset();
            } else if !self.pause().await {
                break;
            }
        }
        if let Err(e) = self.reader.close().await {
            tracing::warn!("Failed to close reader: {e:#}");
        }
        tracing::info!("Fetch loop stopped.");
    }

    /// `false` when cancelled while waiting.
    async fn pause(&mut self) -> bool {
        let delay = self.backoff.next_delay();
        tokio::select! {
            _ = self.shutdown.cancelled() => false,
            _ = tokio::time::sleep(delay) => true,
        }
    }

    /// Whether the message was committed.
    async fn dispatch(&mut self, message: InboundMessage) -> bool {
        let event: DomainEvent = match serde_json::from_slice(&message.payload) {
            Ok(event) => event,
            Err(source) => {
                let e = EventException::Deserialize {
                    topic: message.topic.to_owned(),
                    source,
                };
                tracing::warn!(partition = message.partition, offset = message.offset, "{e}");
                self.release(&message).await;
                return false;
            }
        };

        let Some(handler) = self.handlers.get(&event.event_type).cloned() else {
            tracing::debug!(event_type = %event.event_type, event_id = %event.id, "No handler, skipped.");
            return self.commit(&message).await;
        };

        let ctx = EventContext {
            correlation_id: event.correlation_id().to_owned(),
            topic: message.topic.to_owned(),
        };
        let span = tracing::info_span!(
            "handle_event",
            event_type = %event.event_type,
            event_id = %event.id,
            correlation_id = %ctx.correlation_id,
        );
        match handler.handle(&ctx, &event).instrument(span.clone()).await {
            Ok(()) => self.commit(&message).instrument(span).await,
            Err(source) => {
                let e = EventException::Handler {
                    event_type: event.event_type,
                    event_id: event.id,
                    source,
                };
                span.in_scope(|| tracing::warn!(offset = message.offset, "{e:#}"));
                self.release(&message).await;
                false
            }
        }
    }

    async fn commit(&mut self, message: &InboundMessage) -> bool {
        match self.reader.commit(message).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(offset = message.offset, "Commit failed: {e:#}");
                self.release(message).await;
                false
            }
        }
    }

    async fn release(&mut self, message: &InboundMessage) {
        if let Err(e) = self.reader.release(message).await {
            tracing::warn!(offset = message.offset, "Release failed: {e:#}");
        }
    }
}
