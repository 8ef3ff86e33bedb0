use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tag naming the kind of a [`DomainEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventType(String);

impl EventType {
    pub const USER_CREATED: &'static str = "user_created";
    pub const USER_AVATAR_UPDATED: &'static str = "user_avatar_updated";
    pub const LOG_ACTIVITY: &'static str = "log_activity";

    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn user_created() -> Self {
        Self::new(Self::USER_CREATED)
    }

    pub fn user_avatar_updated() -> Self {
        Self::new(Self::USER_AVATAR_UPDATED)
    }

    pub fn log_activity() -> Self {
        Self::new(Self::LOG_ACTIVITY)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable message unit carrying one domain event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// The entity the event concerns.
    #[serde(default)]
    pub aggregate_id: String,
    #[serde(default)]
    pub version: i64,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub metadata: EventMetadata,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventMetadata {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub correlation_id: String,
    #[serde(default)]
    pub causation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl DomainEvent {
    pub const SOURCE: &'static str = "assets-service";

    /// New first-version event whose correlation id is its own id.
    pub fn new(
        event_type: EventType,
        aggregate_id: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        let id = Uuid::new_v4().to_string();
        Self {
            metadata: EventMetadata {
                source: Self::SOURCE.to_owned(),
                correlation_id: id.to_owned(),
                causation_id: String::new(),
                user_id: None,
            },
            id,
            event_type,
            aggregate_id: aggregate_id.into(),
            version: 1,
            data,
            timestamp: Utc::now(),
        }
    }

    /// Chain this event to the one that caused it.
    pub fn caused_by(mut self, parent: &DomainEvent) -> Self {
        if !parent.metadata.correlation_id.is_empty() {
            self.metadata.correlation_id = parent.metadata.correlation_id.to_owned();
        }
        self.metadata.causation_id = parent.id.to_owned();
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.metadata.user_id = Some(user_id.into());
        self
    }

    /// Correlation id, falling back to the event id.
    pub fn correlation_id(&self) -> &str {
        if self.metadata.correlation_id.is_empty() {
            &self.id
        } else {
            &self.metadata.correlation_id
        }
    }
}
