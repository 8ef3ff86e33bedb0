/// Association of an asset to an external resource.
///
/// A resource id without a resource type carries no association.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    pub resource_type: String,
    pub resource_id: Option<String>,
}

impl ResourceRef {
    /// Blank parts count as absent.
    pub fn from_parts(resource_type: Option<&str>, resource_id: Option<&str>) -> Option<Self> {
        let resource_type = resource_type.filter(|s| !s.is_empty())?;
        Some(Self {
            resource_type: resource_type.to_owned(),
            resource_id: resource_id.filter(|s| !s.is_empty()).map(str::to_owned),
        })
    }

    /// Prefix under which objects of this resource are stored.
    pub fn key_prefix(&self) -> String {
        match &self.resource_id {
            Some(id) => format!("{}/{id}", self.resource_type),
            None => self.resource_type.to_owned(),
        }
    }
}
