use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{CatalogConfig, MAX_REST_PER_PAGE};

use super::criteria::{parse_per_page, CriteriaError, FilterCriteria, ParsePolicy, RawParams};
use super::domain::{District, Property, PropertyId};
use super::draft::{PropertyChanges, PropertyDraft, ValidationError};
use super::nonce::{constant_time_eq, NonceGuard, FILTER_NONCE_ACTION};
use super::projection::{Pagination, PropertyDetail, PropertySummary, Projector};
use super::query::PropertyQuery;
use super::repository::{PropertyRepository, RepositoryError};

/// One page of filter results as returned to the storefront.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOutcome {
    pub results: Vec<PropertySummary>,
    pub pagination: Pagination,
}

/// One page of the REST listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListOutcome {
    pub items: Vec<PropertyDetail>,
    pub pagination: Pagination,
}

/// Response body of a successful delete.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteOutcome {
    pub deleted: bool,
    pub previous: PropertyDetail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistrictSummary {
    pub id: u64,
    pub name: String,
    pub slug: String,
    pub count: usize,
}

/// Service composing the criteria parser, query translator, projector and repository.
pub struct CatalogService<R> {
    repository: Arc<R>,
    projector: Projector,
    nonces: NonceGuard,
    admin_token: Option<String>,
    filter_page_size: u32,
    rest_per_page: u32,
}

impl<R> CatalogService<R>
where
    R: PropertyRepository + 'static,
{
    pub fn new(repository: Arc<R>, config: &CatalogConfig) -> Self {
        Self {
            repository,
            projector: Projector::new(config.public_base_url.clone(), config.excerpt_words),
            nonces: NonceGuard::new(config.nonce_secret.clone(), config.nonce_lifetime_secs),
            admin_token: config.admin_token.clone(),
            filter_page_size: config.filter_page_size.max(1),
            rest_per_page: config.rest_per_page.clamp(1, MAX_REST_PER_PAGE),
        }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    pub fn projector(&self) -> &Projector {
        &self.projector
    }

    /// Storefront filter: lenient parsing, fixed page size, summary projections.
    pub fn filter(&self, params: &RawParams) -> Result<FilterOutcome, CatalogServiceError> {
        let criteria = FilterCriteria::parse(params, ParsePolicy::Lenient)?;
        let page = self.run_query(criteria, self.filter_page_size)?;

        Ok(FilterOutcome {
            results: page
                .items
                .iter()
                .map(|property| self.projector.summary(property))
                .collect(),
            pagination: Pagination::from_page(&page),
        })
    }

    /// REST listing: strict parsing, caller-selected page size, detail projections.
    pub fn list(&self, params: &RawParams) -> Result<ListOutcome, CatalogServiceError> {
        let criteria = FilterCriteria::parse(params, ParsePolicy::Strict)?;
        let per_page = parse_per_page(
            params,
            self.rest_per_page,
            MAX_REST_PER_PAGE,
            ParsePolicy::Strict,
        )?;
        let page = self.run_query(criteria, per_page)?;

        Ok(ListOutcome {
            items: page
                .items
                .iter()
                .map(|property| self.projector.detail(property))
                .collect(),
            pagination: Pagination::from_page(&page),
        })
    }

    fn run_query(
        &self,
        mut criteria: FilterCriteria,
        page_size: u32,
    ) -> Result<super::query::QueryPage, CatalogServiceError> {
        if criteria.district.is_some() {
            let districts = self.repository.districts()?;
            criteria.retain_known_district(&districts);
        }

        let query = PropertyQuery::from_criteria(&criteria, page_size);
        let page = query.execute(self.repository.snapshot()?);
        debug!(
            predicates = query.predicates.len(),
            sort = criteria.sort.as_str(),
            page = query.window.page,
            total = page.total_items,
            "executed property query"
        );
        Ok(page)
    }

    pub fn get(&self, id: PropertyId) -> Result<PropertyDetail, CatalogServiceError> {
        let property = self.fetch_existing(id)?;
        Ok(self.projector.detail(&property))
    }

    pub fn create(&self, draft: PropertyDraft) -> Result<PropertyDetail, CatalogServiceError> {
        let changes = draft.validate()?;
        let title = changes
            .title
            .clone()
            .ok_or_else(|| ValidationError::new("title", "title is required"))?;
        let districts = self.resolve_districts(&changes)?;

        let mut property = Property {
            id: PropertyId(0),
            slug: String::new(),
            title,
            content: String::new(),
            districts: districts.unwrap_or_default(),
            building_name: String::new(),
            coordinates: String::new(),
            floors: Default::default(),
            building_type: Default::default(),
            eco_rating: Default::default(),
            price: None,
            image_url: None,
            premises: Vec::new(),
        };
        changes.apply_to(&mut property);

        let stored = self.repository.insert(property)?;
        info!(id = %stored.id, slug = %stored.slug, "created property");
        Ok(self.projector.detail(&stored))
    }

    pub fn update(
        &self,
        id: PropertyId,
        draft: PropertyDraft,
    ) -> Result<PropertyDetail, CatalogServiceError> {
        let mut property = self.fetch_existing(id)?;
        let changes = draft.validate()?;
        if let Some(districts) = self.resolve_districts(&changes)? {
            property.districts = districts;
        }
        changes.apply_to(&mut property);

        let stored = self.repository.update(property)?;
        info!(id = %stored.id, "updated property");
        Ok(self.projector.detail(&stored))
    }

    pub fn delete(&self, id: PropertyId) -> Result<DeleteOutcome, CatalogServiceError> {
        let removed = self.repository.delete(id).map_err(|err| match err {
            RepositoryError::NotFound => CatalogServiceError::NotFound(id),
            other => CatalogServiceError::Repository(other),
        })?;
        info!(id = %removed.id, "deleted property");
        Ok(DeleteOutcome {
            deleted: true,
            previous: self.projector.detail(&removed),
        })
    }

    pub fn districts(&self) -> Result<Vec<DistrictSummary>, CatalogServiceError> {
        let properties = self.repository.snapshot()?;
        Ok(self
            .repository
            .districts()?
            .into_iter()
            .map(|district| DistrictSummary {
                count: properties
                    .iter()
                    .filter(|property| property.in_district(&district.slug))
                    .count(),
                id: district.id.0,
                name: district.name,
                slug: district.slug,
            })
            .collect())
    }

    pub fn issue_filter_nonce(&self, now: DateTime<Utc>) -> String {
        self.nonces.issue(FILTER_NONCE_ACTION, now)
    }

    pub fn verify_filter_nonce(&self, token: Option<&str>, now: DateTime<Utc>) -> bool {
        token.is_some_and(|token| self.nonces.verify(token, FILTER_NONCE_ACTION, now))
    }

    /// Checks an `Authorization` header value against the configured admin token.
    pub fn authorize_admin(&self, authorization: Option<&str>) -> Result<(), CatalogServiceError> {
        let Some(expected) = self.admin_token.as_deref() else {
            return Err(CatalogServiceError::Forbidden);
        };
        let presented = authorization
            .and_then(|value| value.trim().strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or(CatalogServiceError::Unauthenticated)?;

        if constant_time_eq(presented, expected) {
            Ok(())
        } else {
            Err(CatalogServiceError::Forbidden)
        }
    }

    fn fetch_existing(&self, id: PropertyId) -> Result<Property, CatalogServiceError> {
        self.repository
            .fetch(id)?
            .ok_or(CatalogServiceError::NotFound(id))
    }

    fn resolve_districts(
        &self,
        changes: &PropertyChanges,
    ) -> Result<Option<Vec<District>>, CatalogServiceError> {
        let Some(names) = &changes.districts else {
            return Ok(None);
        };

        let mut resolved: Vec<District> = Vec::with_capacity(names.len());
        for name in names {
            let district = self
                .repository
                .ensure_district(name)
                .map_err(|err| match err {
                    RepositoryError::InvalidDistrict(name) => CatalogServiceError::Validation(
                        ValidationError::new("district", format!("invalid district name '{name}'")),
                    ),
                    other => CatalogServiceError::Repository(other),
                })?;
            if !resolved.iter().any(|known| known.id == district.id) {
                resolved.push(district);
            }
        }
        Ok(Some(resolved))
    }
}

/// Error raised by the catalog service.
#[derive(Debug, thiserror::Error)]
pub enum CatalogServiceError {
    #[error(transparent)]
    Criteria(#[from] CriteriaError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("property {0} not found")]
    NotFound(PropertyId),
    #[error("authentication required")]
    Unauthenticated,
    #[error("insufficient privileges for this operation")]
    Forbidden,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
