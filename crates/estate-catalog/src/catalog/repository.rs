use super::domain::{District, Property, PropertyId};

/// Storage abstraction so the service can be exercised in isolation.
pub trait PropertyRepository: Send + Sync {
    /// Stores a new property. The caller's `id` and `slug` are replaced by the
    /// repository-assigned identifier and a unique slug derived from the title.
    fn insert(&self, property: Property) -> Result<Property, RepositoryError>;
    fn update(&self, property: Property) -> Result<Property, RepositoryError>;
    fn fetch(&self, id: PropertyId) -> Result<Option<Property>, RepositoryError>;
    fn delete(&self, id: PropertyId) -> Result<Property, RepositoryError>;
    /// Point-in-time copy of every stored property.
    fn snapshot(&self) -> Result<Vec<Property>, RepositoryError>;
    fn districts(&self) -> Result<Vec<District>, RepositoryError>;
    /// Returns the district matching `name` by slug or name, creating it when absent.
    fn ensure_district(&self, name: &str) -> Result<District, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("invalid district name '{0}'")]
    InvalidDistrict(String),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
