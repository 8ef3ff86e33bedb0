use crate::model::event::EventType;

pub type EventResult<T> = Result<T, EventException>;

#[derive(Debug, thiserror::Error)]
pub enum EventException {
    #[error("The consumer already started, handlers can't be registered anymore.")]
    AlreadyStarted,

    #[error("A handler for event type: {event_type} is already registered.")]
    DuplicateHandler { event_type: EventType },

    #[error("Malformed envelope on topic: {topic}: {source}")]
    Deserialize {
        topic: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Handler of event: {event_id} with type: {event_type} failed: {source}")]
    Handler {
        event_type: EventType,
        event_id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Event internal error: {source}")]
    InternalError {
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for EventException {
    fn from(e: anyhow::Error) -> Self {
        EventException::InternalError { source: e }
    }
}
