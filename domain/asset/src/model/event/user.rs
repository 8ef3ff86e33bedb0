use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload of an inbound `user_created` event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserCreated {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub locale: Option<String>,
    pub country: Option<String>,
    pub user_type: Option<String>,
}

/// Payload of the outbound `user_avatar_updated` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAvatarUpdated {
    pub user_id: String,
    pub asset_id: Uuid,
    pub avatar_url: String,
}
