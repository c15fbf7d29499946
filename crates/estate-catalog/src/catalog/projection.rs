use serde::{Deserialize, Serialize};

use super::domain::{BuildingType, District, Premise, Property, PropertyId};
use super::query::QueryPage;

/// Compact projection used by the filter results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySummary {
    pub id: PropertyId,
    pub title: String,
    pub excerpt: String,
    pub link: String,
    pub image_url: String,
    pub building_name: String,
    pub floors: u8,
    pub building_type: BuildingType,
    pub eco_rating: u8,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrictView {
    pub id: u64,
    pub name: String,
    pub slug: String,
}

impl From<&District> for DistrictView {
    fn from(district: &District) -> Self {
        Self {
            id: district.id.0,
            name: district.name.clone(),
            slug: district.slug.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiseView {
    pub area: String,
    pub rooms: u8,
    pub balcony: bool,
    pub bathroom: bool,
    pub image_url: String,
}

impl From<&Premise> for PremiseView {
    fn from(premise: &Premise) -> Self {
        Self {
            area: premise.area.clone(),
            rooms: premise.rooms.get(),
            balcony: premise.balcony,
            bathroom: premise.bathroom,
            image_url: premise.image_url.clone().unwrap_or_default(),
        }
    }
}

/// Full projection returned by the REST resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDetail {
    pub id: PropertyId,
    pub title: String,
    pub content: String,
    pub link: String,
    pub districts: Vec<DistrictView>,
    pub building_name: String,
    pub coordinates: String,
    pub floors: u8,
    pub building_type: BuildingType,
    pub eco_rating: u8,
    pub price: f64,
    pub image_url: String,
    pub premises: Vec<PremiseView>,
}

/// Pagination block attached to every filter response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Requested page, echoed even when it lies past the last page.
    pub current: u32,
    /// Total pages; zero when nothing matched.
    pub total: u32,
    pub per_page: u32,
    pub total_items: usize,
}

impl Pagination {
    pub fn new(current: u32, per_page: u32, total_items: usize) -> Self {
        let per_page = per_page.max(1);
        let total = total_items.div_ceil(per_page as usize);
        Self {
            current,
            total: u32::try_from(total).unwrap_or(u32::MAX),
            per_page,
            total_items,
        }
    }

    pub fn from_page(page: &QueryPage) -> Self {
        Self::new(page.window.page, page.window.page_size, page.total_items)
    }

    pub fn has_controls(&self) -> bool {
        self.total > 1
    }
}

/// Builds display projections; owns the permalink base and excerpt length.
#[derive(Debug, Clone)]
pub struct Projector {
    base_url: String,
    excerpt_words: usize,
}

impl Projector {
    pub fn new(base_url: impl Into<String>, excerpt_words: usize) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            excerpt_words,
        }
    }

    pub fn permalink(&self, property: &Property) -> String {
        format!("{}/real-estate/{}/", self.base_url, property.slug)
    }

    pub fn summary(&self, property: &Property) -> PropertySummary {
        PropertySummary {
            id: property.id,
            title: property.title.clone(),
            excerpt: excerpt(&property.content, self.excerpt_words),
            link: self.permalink(property),
            image_url: property.image_url.clone().unwrap_or_default(),
            building_name: property.building_name.clone(),
            floors: property.floors.get(),
            building_type: property.building_type,
            eco_rating: property.eco_rating.get(),
            price: property.effective_price().amount(),
        }
    }

    pub fn detail(&self, property: &Property) -> PropertyDetail {
        PropertyDetail {
            id: property.id,
            title: property.title.clone(),
            content: property.content.clone(),
            link: self.permalink(property),
            districts: property.districts.iter().map(DistrictView::from).collect(),
            building_name: property.building_name.clone(),
            coordinates: property.coordinates.clone(),
            floors: property.floors.get(),
            building_type: property.building_type,
            eco_rating: property.eco_rating.get(),
            price: property.effective_price().amount(),
            image_url: property.image_url.clone().unwrap_or_default(),
            premises: property.premises.iter().map(PremiseView::from).collect(),
        }
    }
}

const EXCERPT_MORE: &str = " [\u{2026}]";

/// Strips markup, collapses whitespace and keeps the first `words` words.
pub fn excerpt(content: &str, words: usize) -> String {
    let text = strip_tags(content);
    let mut tokens = text.split_whitespace();
    let kept: Vec<&str> = tokens.by_ref().take(words).collect();
    let mut excerpt = kept.join(" ");
    if tokens.next().is_some() {
        excerpt.push_str(EXCERPT_MORE);
    }
    excerpt
}

fn strip_tags(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len());
    let mut in_tag = false;
    for ch in raw.chars() {
        match ch {
            '<' => {
                in_tag = true;
                text.push(' ');
            }
            '>' if in_tag => in_tag = false,
            _ if in_tag => {}
            other => text.push(other),
        }
    }
    text
}
