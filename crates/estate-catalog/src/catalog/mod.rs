//! Real estate catalog: typed property records, filter criteria, query execution and the
//! HTTP surface that serves them.
//!
//! Requests flow through [`criteria`] (raw parameters to typed filters), [`query`]
//! (filters to predicates, ordering and a page window), [`projection`] (records to wire
//! shapes) and finally [`router`], which negotiates JSON or XML per request.

pub mod criteria;
pub mod domain;
pub mod draft;
pub mod memory;
pub mod nonce;
pub mod presentation;
pub mod projection;
pub mod query;
pub mod repository;
pub mod router;
pub mod service;
pub mod xml;

#[cfg(test)]
mod tests;

pub use criteria::{FilterCriteria, ParsePolicy, RawParams, SortKey};
pub use domain::{
    BuildingType, District, DistrictId, EcoRating, Floors, Premise, Price, Property, PropertyId,
    RoomCount,
};
pub use draft::{PremiseDraft, PropertyDraft, ValidationError};
pub use memory::InMemoryPropertyRepository;
pub use nonce::NonceGuard;
pub use projection::{Pagination, PropertyDetail, PropertySummary, Projector};
pub use repository::{PropertyRepository, RepositoryError};
pub use router::{catalog_router, AJAX_PATH, FILTER_ACTION};
pub use service::{CatalogService, CatalogServiceError, FilterOutcome};
