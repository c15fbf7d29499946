use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{slugify, District, DistrictId, Property, PropertyId};
use super::repository::{PropertyRepository, RepositoryError};

const FALLBACK_SLUG: &str = "property";

#[derive(Default)]
struct CatalogTables {
    properties: BTreeMap<PropertyId, Property>,
    districts: Vec<District>,
    next_property_id: u64,
    next_district_id: u64,
}

/// Mutex-guarded catalog kept in process memory.
#[derive(Default, Clone)]
pub struct InMemoryPropertyRepository {
    tables: Arc<Mutex<CatalogTables>>,
}

impl InMemoryPropertyRepository {
    fn lock(&self) -> Result<MutexGuard<'_, CatalogTables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("catalog mutex poisoned".to_string()))
    }

    pub fn len(&self) -> usize {
        self.lock().map(|tables| tables.properties.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CatalogTables {
    fn unique_slug(&self, title: &str, own_id: Option<PropertyId>) -> String {
        let base = match slugify(title) {
            slug if slug.is_empty() => FALLBACK_SLUG.to_string(),
            slug => slug,
        };
        let taken: HashSet<&str> = self
            .properties
            .values()
            .filter(|property| Some(property.id) != own_id)
            .map(|property| property.slug.as_str())
            .collect();

        if !taken.contains(base.as_str()) {
            return base;
        }
        let mut suffix = 2u32;
        loop {
            let candidate = format!("{base}-{suffix}");
            if !taken.contains(candidate.as_str()) {
                return candidate;
            }
            suffix += 1;
        }
    }

    /// Replaces embedded district copies with the stored ones.
    fn refresh_districts(&self, property: &mut Property) {
        for district in &mut property.districts {
            if let Some(stored) = self
                .districts
                .iter()
                .find(|stored| stored.id == district.id)
            {
                *district = stored.clone();
            }
        }
    }
}

impl PropertyRepository for InMemoryPropertyRepository {
    fn insert(&self, mut property: Property) -> Result<Property, RepositoryError> {
        let mut tables = self.lock()?;
        tables.next_property_id += 1;
        property.id = PropertyId(tables.next_property_id);
        property.slug = tables.unique_slug(&property.title, None);
        tables.refresh_districts(&mut property);
        tables.properties.insert(property.id, property.clone());
        Ok(property)
    }

    fn update(&self, mut property: Property) -> Result<Property, RepositoryError> {
        let mut tables = self.lock()?;
        if !tables.properties.contains_key(&property.id) {
            return Err(RepositoryError::NotFound);
        }
        tables.refresh_districts(&mut property);
        tables.properties.insert(property.id, property.clone());
        Ok(property)
    }

    fn fetch(&self, id: PropertyId) -> Result<Option<Property>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables.properties.get(&id).cloned())
    }

    fn delete(&self, id: PropertyId) -> Result<Property, RepositoryError> {
        let mut tables = self.lock()?;
        tables.properties.remove(&id).ok_or(RepositoryError::NotFound)
    }

    fn snapshot(&self) -> Result<Vec<Property>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables.properties.values().cloned().collect())
    }

    fn districts(&self) -> Result<Vec<District>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables.districts.clone())
    }

    fn ensure_district(&self, name: &str) -> Result<District, RepositoryError> {
        let name = name.trim();
        let slug = slugify(name);
        if slug.is_empty() {
            return Err(RepositoryError::InvalidDistrict(name.to_string()));
        }

        let mut tables = self.lock()?;
        if let Some(existing) = tables
            .districts
            .iter()
            .find(|district| district.slug == slug || district.name == name)
        {
            return Ok(existing.clone());
        }

        tables.next_district_id += 1;
        let district = District {
            id: DistrictId(tables.next_district_id),
            name: name.to_string(),
            slug,
        };
        tables.districts.push(district.clone());
        Ok(district)
    }
}
