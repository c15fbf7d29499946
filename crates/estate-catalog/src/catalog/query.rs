use std::cmp::Ordering;

use super::criteria::{FilterCriteria, SortKey};
use super::domain::{BuildingType, EcoRating, Floors, Premise, Property, RoomCount};

/// A single conjunctive clause over a property record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    InDistrict(String),
    BuildingTypeIs(BuildingType),
    FloorsAtLeast(Floors),
    FloorsAtMost(Floors),
    EcoRatingAtLeast(EcoRating),
    /// Some premise has exactly this many rooms.
    AnyPremiseRooms(RoomCount),
    AnyPremiseBalcony(bool),
    AnyPremiseBathroom(bool),
}

fn any_premise(property: &Property, test: impl Fn(&Premise) -> bool) -> bool {
    property.premises.iter().any(test)
}

impl Predicate {
    pub fn matches(&self, property: &Property) -> bool {
        match self {
            Self::InDistrict(slug) => property.in_district(slug),
            Self::BuildingTypeIs(kind) => property.building_type == *kind,
            Self::FloorsAtLeast(min) => property.floors >= *min,
            Self::FloorsAtMost(max) => property.floors <= *max,
            Self::EcoRatingAtLeast(min) => property.eco_rating >= *min,
            Self::AnyPremiseRooms(rooms) => any_premise(property, |premise| premise.rooms == *rooms),
            Self::AnyPremiseBalcony(balcony) => {
                any_premise(property, |premise| premise.balcony == *balcony)
            }
            Self::AnyPremiseBathroom(bathroom) => {
                any_premise(property, |premise| premise.bathroom == *bathroom)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    EcoRating,
    Price,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Primary ordering; ties always fall back to ascending identifier so pages never
/// overlap or skip records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSpec {
    pub field: SortField,
    pub direction: Direction,
}

impl From<SortKey> for OrderSpec {
    fn from(sort: SortKey) -> Self {
        let (field, direction) = match sort {
            SortKey::EcoDesc => (SortField::EcoRating, Direction::Descending),
            SortKey::EcoAsc => (SortField::EcoRating, Direction::Ascending),
            SortKey::PriceAsc => (SortField::Price, Direction::Ascending),
            SortKey::PriceDesc => (SortField::Price, Direction::Descending),
        };
        Self { field, direction }
    }
}

impl OrderSpec {
    pub fn compare(&self, left: &Property, right: &Property) -> Ordering {
        let primary = match self.field {
            SortField::EcoRating => left.eco_rating.cmp(&right.eco_rating),
            SortField::Price => left.effective_price().total_cmp(&right.effective_price()),
        };
        let primary = match self.direction {
            Direction::Ascending => primary,
            Direction::Descending => primary.reverse(),
        };
        primary.then_with(|| left.id.cmp(&right.id))
    }
}

/// One-based page and its size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u32,
    pub page_size: u32,
}

impl PageWindow {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page as usize - 1).saturating_mul(self.page_size as usize)
    }

    pub fn limit(&self) -> usize {
        self.page_size as usize
    }
}

/// Translated filter: predicates, ordering and the page to cut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyQuery {
    pub predicates: Vec<Predicate>,
    pub order: OrderSpec,
    pub window: PageWindow,
}

/// A page of matched records plus the size of the full filtered set.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPage {
    pub items: Vec<Property>,
    pub total_items: usize,
    pub window: PageWindow,
}

impl PropertyQuery {
    pub fn from_criteria(criteria: &FilterCriteria, page_size: u32) -> Self {
        let mut predicates = Vec::new();

        if let Some(slug) = &criteria.district {
            predicates.push(Predicate::InDistrict(slug.clone()));
        }
        if let Some(kind) = criteria.building_type {
            predicates.push(Predicate::BuildingTypeIs(kind));
        }
        if let Some(min) = criteria.min_floors {
            predicates.push(Predicate::FloorsAtLeast(min));
        }
        if let Some(max) = criteria.max_floors {
            predicates.push(Predicate::FloorsAtMost(max));
        }
        if let Some(min) = criteria.min_eco_rating {
            predicates.push(Predicate::EcoRatingAtLeast(min));
        }
        // Each premise field is matched on its own; different premises may satisfy them.
        if let Some(rooms) = criteria.rooms {
            predicates.push(Predicate::AnyPremiseRooms(rooms));
        }
        if let Some(balcony) = criteria.balcony {
            predicates.push(Predicate::AnyPremiseBalcony(balcony));
        }
        if let Some(bathroom) = criteria.bathroom {
            predicates.push(Predicate::AnyPremiseBathroom(bathroom));
        }

        Self {
            predicates,
            order: OrderSpec::from(criteria.sort),
            window: PageWindow::new(criteria.page, page_size),
        }
    }

    pub fn matches(&self, property: &Property) -> bool {
        self.predicates
            .iter()
            .all(|predicate| predicate.matches(property))
    }

    /// Filters, orders and pages a snapshot of the record store.
    pub fn execute(&self, records: impl IntoIterator<Item = Property>) -> QueryPage {
        let mut matched: Vec<Property> = records
            .into_iter()
            .filter(|property| self.matches(property))
            .collect();
        matched.sort_by(|left, right| self.order.compare(left, right));

        let total_items = matched.len();
        let items = matched
            .into_iter()
            .skip(self.window.offset())
            .take(self.window.limit())
            .collect();

        QueryPage {
            items,
            total_items,
            window: self.window,
        }
    }
}
