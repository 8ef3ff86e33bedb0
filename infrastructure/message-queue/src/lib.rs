mod backoff;
mod dispatcher;
#[cfg(feature = "flume-mq")]
mod internal;
#[cfg(feature = "kafka-mq")]
mod kafka;
mod reader;

#[rustfmt::skip]
pub use {
    backoff::{Backoff, RetryPolicy},
    dispatcher::EventDispatcher,
    reader::{InboundMessage, MessageReader},
};
#[cfg(feature = "flume-mq")]
pub use internal::{InternalEventBus, InternalEventPublisher, InternalMessageReader};
#[cfg(feature = "kafka-mq")]
pub use kafka::{KafkaEventPublisher, KafkaMessageReader};
