mod event;

pub use event::{EventException, EventResult};

use uuid::Uuid;

pub type AssetResult<T> = Result<T, AssetException>;

/// Failures of the asset service.
///
/// Variants tell "nothing happened" apart from "something happened and the backends now
/// disagree", see [`AssetException::is_inconsistent`].
#[derive(Debug, thiserror::Error)]
pub enum AssetException {
    #[error("Invalid input: {reason}.")]
    InvalidInput { reason: String },

    #[error("Asset with id: {id} can't be found.")]
    NotFound { id: Uuid },

    #[error("Asset with id: {id} doesn't belong to user: {user_id}.")]
    Unauthorized { id: Uuid, user_id: String },

    #[error("Failed to write object with key: {storage_key}: {source}")]
    StorageWriteFailed {
        storage_key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to delete object with key: {storage_key}: {source}")]
    StorageDeleteFailed {
        storage_key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to read object with key: {storage_key}: {source}")]
    StorageReadFailed {
        storage_key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Asset repository error: {source}")]
    RepositoryError {
        #[source]
        source: anyhow::Error,
    },

    /// The record write failed after the object was written, and removing the object failed too.
    /// No record references the object.
    #[error("Object with key: {storage_key} is orphaned, record write failed: {source}, rollback failed: {rollback}")]
    OrphanedObject {
        storage_key: String,
        #[source]
        source: anyhow::Error,
        rollback: anyhow::Error,
    },

    /// The object is gone but the record still claims it exists.
    #[error("Object with key: {storage_key} of asset: {id} was deleted but the record wasn't: {source}")]
    PartialDeleteInconsistency {
        id: Uuid,
        storage_key: String,
        #[source]
        source: anyhow::Error,
    },
}

impl AssetException {
    /// Stable machine readable code.
    pub fn code(&self) -> &'static str {
        use AssetException::*;
        match self {
            InvalidInput { .. } => "invalid_input",
            NotFound { .. } => "not_found",
            Unauthorized { .. } => "unauthorized",
            StorageWriteFailed { .. } => "storage_write_failed",
            StorageDeleteFailed { .. } => "storage_delete_failed",
            StorageReadFailed { .. } => "storage_read_failed",
            RepositoryError { .. } => "repository_error",
            OrphanedObject { .. } => "orphaned_object",
            PartialDeleteInconsistency { .. } => "partial_delete_inconsistency",
        }
    }

    /// Whether the backends were left disagreeing and need reconciliation.
    pub fn is_inconsistent(&self) -> bool {
        matches!(
            self,
            AssetException::OrphanedObject { .. }
                | AssetException::PartialDeleteInconsistency { .. }
        )
    }

    pub fn invalid_input(reason: impl Into<String>) -> Self {
        AssetException::InvalidInput {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inconsistency_classes() {
        let orphan = AssetException::OrphanedObject {
            storage_key: "users/1_avatar.png".to_owned(),
            source: anyhow::anyhow!("insert failed"),
            rollback: anyhow::anyhow!("delete failed"),
        };
        assert!(orphan.is_inconsistent());
        assert_eq!(orphan.code(), "orphaned_object");

        let clean = AssetException::RepositoryError {
            source: anyhow::anyhow!("insert failed"),
        };
        assert!(!clean.is_inconsistent());
        assert!(!AssetException::invalid_input("empty").is_inconsistent());
    }
}
