/// Filters for querying assets. `None` fields do not constrain the query.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetFilter {
    pub user_id: Option<String>,
    pub content_type: Option<String>,
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,
    pub access_level: Option<super::AccessLevel>,
    pub secure: Option<bool>,
    pub is_encrypted: Option<bool>,
    pub storage_provider: Option<String>,
    /// Every tag listed must be present on the asset.
    pub tags: Vec<String>,
    pub limit: u64,
    pub offset: u64,
}

impl AssetFilter {
    pub const DEFAULT_LIMIT: u64 = 20;
}

impl Default for AssetFilter {
    fn default() -> Self {
        Self {
            user_id: None,
            content_type: None,
            resource_type: None,
            resource_id: None,
            access_level: None,
            secure: None,
            is_encrypted: None,
            storage_provider: None,
            tags: vec![],
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
        }
    }
}
