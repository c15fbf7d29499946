use std::collections::BTreeMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::Utc;
use estate_catalog::catalog::draft::{DistrictInput, FlagInput, NumericInput};
use estate_catalog::catalog::presentation::{
    FetchOutcome, ViewAction, ViewEffect, ViewMode, ViewState,
};
use estate_catalog::catalog::{
    catalog_router, BuildingType, CatalogService, FilterOutcome, InMemoryPropertyRepository,
    PremiseDraft, PropertyDraft, SortKey,
};
use estate_catalog::config::CatalogConfig;
use serde_json::Value;
use tower::ServiceExt;

fn config() -> CatalogConfig {
    CatalogConfig {
        public_base_url: "https://homes.example".to_string(),
        admin_token: Some("workflow-admin".to_string()),
        nonce_secret: "workflow-secret".to_string(),
        ..CatalogConfig::default()
    }
}

fn draft(
    title: &str,
    building_type: BuildingType,
    eco: u8,
    price: f64,
    balcony: bool,
) -> PropertyDraft {
    PropertyDraft {
        title: Some(title.to_string()),
        content: Some(format!("{title} near the river")),
        district: Some(DistrictInput::One("Podil".to_string())),
        floors: Some(NumericInput::Number(9.0)),
        building_type: Some(building_type.as_str().to_string()),
        eco_rating: Some(NumericInput::Number(f64::from(eco))),
        price: Some(NumericInput::Number(price)),
        premises: Some(vec![PremiseDraft {
            rooms: Some(NumericInput::Text("2".to_string())),
            balcony: Some(FlagInput::Text(if balcony { "yes" } else { "no" }.to_string())),
            ..PremiseDraft::default()
        }]),
        ..PropertyDraft::default()
    }
}

fn seeded_service() -> Arc<CatalogService<InMemoryPropertyRepository>> {
    let service = CatalogService::new(Arc::new(InMemoryPropertyRepository::default()), &config());
    for index in 0..7u8 {
        let building_type = if index % 2 == 0 {
            BuildingType::Brick
        } else {
            BuildingType::Panel
        };
        service
            .create(draft(
                &format!("Riverside {index}"),
                building_type,
                1 + index % 5,
                50_000.0 + 1_000.0 * f64::from(index),
                index % 3 == 0,
            ))
            .expect("seed property");
    }
    Arc::new(service)
}

async fn post_form(router: &axum::Router, params: &[(String, String)]) -> (StatusCode, Value) {
    let body = params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    let response = router
        .clone()
        .oneshot(
            Request::post("/ajax")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .expect("request"),
        )
        .await
        .expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("body");
    (status, serde_json::from_slice(&bytes).expect("json"))
}

fn outcome_of(payload: &Value) -> FilterOutcome {
    serde_json::from_value(payload["data"].clone()).expect("filter outcome")
}

#[tokio::test]
async fn storefront_filter_session_round_trips_through_http() {
    let service = seeded_service();
    let nonce = service.issue_filter_nonce(Utc::now());
    let router = catalog_router(service);
    let mut state = ViewState::new(nonce);

    let (status, payload) = post_form(&router, &state.initial_fetch().params).await;
    assert_eq!(status, StatusCode::OK);
    let first = state.receive(FetchOutcome::Success(outcome_of(&payload)));
    assert!(first.results_html.contains("results-grid"));
    assert!(first.pagination_html.contains("data-page=\"2\""));

    let mut form = BTreeMap::new();
    form.insert("building_type".to_string(), "brick".to_string());
    let ViewEffect::Fetch(request) = state.apply(ViewAction::Submit(form)) else {
        panic!("submitting the form fetches results");
    };
    let (_, payload) = post_form(&router, &request.params).await;
    let bricks = outcome_of(&payload);
    assert_eq!(bricks.pagination.total_items, 4);
    assert!(bricks
        .results
        .iter()
        .all(|item| item.building_type == BuildingType::Brick));
    state.receive(FetchOutcome::Success(bricks));

    let ViewEffect::Fetch(request) = state.apply(ViewAction::ChangeSort(SortKey::PriceDesc)) else {
        panic!("changing sort fetches results");
    };
    let (_, payload) = post_form(&router, &request.params).await;
    let sorted = outcome_of(&payload);
    let prices: Vec<f64> = sorted.results.iter().map(|item| item.price).collect();
    assert_eq!(prices, vec![56_000.0, 54_000.0, 52_000.0, 50_000.0]);
    state.receive(FetchOutcome::Success(sorted));

    let ViewEffect::Render(list) = state.apply(ViewAction::SwitchView(ViewMode::List)) else {
        panic!("switching view re-renders cached results");
    };
    assert!(list.results_html.contains("Riverside 6"));
    assert!(list.pagination_html.is_empty());
}

#[tokio::test]
async fn storefront_shows_rejection_for_forged_nonce() {
    let router = catalog_router(seeded_service());
    let mut state = ViewState::new("00000000000000000000");

    let (status, payload) = post_form(&router, &state.initial_fetch().params).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let message = payload["data"].as_str().expect("message").to_string();

    let rendered = state.receive(FetchOutcome::Rejected(message));
    assert!(rendered.results_html.contains("Error: Invalid nonce"));
    assert!(state.last_page().is_none());
}
