use std::sync::Arc;

use axum::http::{header, Request};
use axum::response::Response;
use axum::body::Body;
use chrono::Utc;
use serde_json::Value;

use crate::catalog::domain::{
    BuildingType, District, EcoRating, Floors, Premise, Price, Property, PropertyId, RoomCount,
};
use crate::catalog::memory::InMemoryPropertyRepository;
use crate::catalog::repository::{PropertyRepository, RepositoryError};
use crate::catalog::{catalog_router, CatalogService, RawParams};
use crate::config::CatalogConfig;

pub(super) const ADMIN_TOKEN: &str = "admin-secret";

pub(super) fn catalog_config() -> CatalogConfig {
    CatalogConfig {
        public_base_url: "http://estate.test".to_string(),
        admin_token: Some(ADMIN_TOKEN.to_string()),
        nonce_secret: "test-nonce-secret".to_string(),
        nonce_lifetime_secs: 86_400,
        filter_page_size: 5,
        rest_per_page: 10,
        excerpt_words: 55,
    }
}

pub(super) fn premise(rooms: i64, balcony: bool, bathroom: bool) -> Premise {
    Premise {
        area: format!("{}", rooms * 20),
        rooms: RoomCount::new(rooms).expect("rooms in range"),
        balcony,
        bathroom,
        image_url: None,
    }
}

pub(super) fn property(
    title: &str,
    building_type: BuildingType,
    floors: i64,
    eco_rating: i64,
    price: Option<f64>,
) -> Property {
    Property {
        id: PropertyId(0),
        slug: String::new(),
        title: title.to_string(),
        content: format!("<p>{title} with a <strong>courtyard</strong></p>"),
        districts: Vec::new(),
        building_name: format!("{title} Residence"),
        coordinates: "50.4501, 30.5234".to_string(),
        floors: Floors::new(floors).expect("floors in range"),
        building_type,
        eco_rating: EcoRating::new(eco_rating).expect("eco rating in range"),
        price: price.map(|amount| Price::new(amount).expect("non-negative price")),
        image_url: None,
        premises: vec![premise(2, true, true)],
    }
}

fn in_district(mut property: Property, district: &District) -> Property {
    property.districts = vec![district.clone()];
    property
}

/// Catalog of 20 properties: twelve brick buildings rated 4 or 5 with distinct prices,
/// plus panel, foam block and low-rated brick distractors.
pub(super) fn seeded_repository() -> Arc<InMemoryPropertyRepository> {
    let repository = Arc::new(InMemoryPropertyRepository::default());
    let central = repository.ensure_district("Central").expect("district");
    let northern = repository.ensure_district("Northern").expect("district");

    for index in 1..=12i64 {
        let district = if index % 2 == 0 { &central } else { &northern };
        let eco = if index % 3 == 0 { 5 } else { 4 };
        let listing = property(
            &format!("Brick House {index}"),
            BuildingType::Brick,
            index.min(20),
            eco,
            Some(10_000.0 * (13 - index) as f64),
        );
        repository
            .insert(in_district(listing, district))
            .expect("insert brick");
    }

    for index in 1..=4i64 {
        let listing = property(
            &format!("Panel Block {index}"),
            BuildingType::Panel,
            9,
            5,
            Some(5_000.0 * index as f64),
        );
        repository
            .insert(in_district(listing, &central))
            .expect("insert panel");
    }

    for index in 1..=2i64 {
        let mut listing = property(
            &format!("Foam Cottage {index}"),
            BuildingType::FoamBlock,
            2,
            3,
            None,
        );
        listing.premises = vec![premise(3, false, false), premise(1, true, true)];
        repository.insert(listing).expect("insert foam block");
    }

    for index in 1..=2i64 {
        let listing = property(
            &format!("Old Brick {index}"),
            BuildingType::Brick,
            5,
            2,
            Some(1_000.0),
        );
        repository
            .insert(in_district(listing, &northern))
            .expect("insert low rated brick");
    }

    repository
}

pub(super) fn build_service() -> (
    CatalogService<InMemoryPropertyRepository>,
    Arc<InMemoryPropertyRepository>,
) {
    let repository = seeded_repository();
    let service = CatalogService::new(repository.clone(), &catalog_config());
    (service, repository)
}

pub(super) fn catalog_router_with_service(
    service: CatalogService<InMemoryPropertyRepository>,
) -> axum::Router {
    catalog_router(Arc::new(service))
}

pub(super) fn params(pairs: &[(&str, &str)]) -> RawParams {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

pub(super) fn filter_form(
    service: &CatalogService<InMemoryPropertyRepository>,
    pairs: &[(&str, &str)],
) -> Request<Body> {
    let nonce = service.issue_filter_nonce(Utc::now());
    let mut fields = vec![
        ("action".to_string(), crate::catalog::FILTER_ACTION.to_string()),
        ("nonce".to_string(), nonce),
    ];
    fields.extend(
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string())),
    );
    form_request(&fields)
}

pub(super) fn form_request(fields: &[(String, String)]) -> Request<Body> {
    let body = fields
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    Request::post(crate::catalog::AJAX_PATH)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .expect("request")
}

pub(super) fn admin_json(method: &str, uri: &str, payload: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
        .body(Body::from(
            serde_json::to_vec(payload).expect("serialize payload"),
        ))
        .expect("request")
}

pub(super) struct UnavailableRepository;

impl PropertyRepository for UnavailableRepository {
    fn insert(&self, _property: Property) -> Result<Property, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _property: Property) -> Result<Property, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: PropertyId) -> Result<Option<Property>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _id: PropertyId) -> Result<Property, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn snapshot(&self) -> Result<Vec<Property>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn districts(&self) -> Result<Vec<District>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn ensure_district(&self, _name: &str) -> Result<District, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
