use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::FormRejection, Path, Query, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use super::criteria::RawParams;
use super::domain::PropertyId;
use super::draft::PropertyDraft;
use super::repository::{PropertyRepository, RepositoryError};
use super::service::{CatalogService, CatalogServiceError};
use super::xml::{self, XmlNode};

/// Form `action` value dispatched to the property filter.
pub const FILTER_ACTION: &str = "real_estate_filter";
pub const AJAX_PATH: &str = "/ajax";

pub const TOTAL_COUNT_HEADER: HeaderName = HeaderName::from_static("x-total-count");
pub const TOTAL_PAGES_HEADER: HeaderName = HeaderName::from_static("x-total-pages");

const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";

/// Router exposing the REST resource, the district list and the storefront filter.
pub fn catalog_router<R>(service: Arc<CatalogService<R>>) -> Router
where
    R: PropertyRepository + 'static,
{
    Router::new()
        .route(
            "/real-estate/v1/properties",
            get(list_handler::<R>).post(create_handler::<R>),
        )
        .route(
            "/real-estate/v1/properties/:id",
            get(get_handler::<R>)
                .put(update_handler::<R>)
                .patch(update_handler::<R>)
                .delete(delete_handler::<R>),
        )
        .route("/real-estate/v1/districts", get(districts_handler::<R>))
        .route("/real-estate/v1/filter/nonce", get(nonce_handler::<R>))
        .route(AJAX_PATH, post(ajax_handler::<R>))
        .with_state(service)
}

fn wants_xml(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::ACCEPT)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.contains("application/xml"))
}

/// Serializes `payload` as JSON, or as XML when the client asked for it.
pub(crate) fn negotiated<T: Serialize>(headers: &HeaderMap, status: StatusCode, payload: &T) -> Response {
    let value = match serde_json::to_value(payload) {
        Ok(value) => value,
        Err(err) => {
            error!(error = %err, "failed to serialize response payload");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "code": "internal_error", "message": err.to_string() })),
            )
                .into_response();
        }
    };

    if wants_xml(headers) {
        let document = xml::to_document(&XmlNode::from(&value));
        (status, [(header::CONTENT_TYPE, XML_CONTENT_TYPE)], document).into_response()
    } else {
        (status, Json(value)).into_response()
    }
}

pub(crate) fn error_response(headers: &HeaderMap, err: CatalogServiceError) -> Response {
    let (status, payload) = match &err {
        CatalogServiceError::Criteria(criteria) => (
            StatusCode::BAD_REQUEST,
            json!({
                "code": "invalid_param",
                "message": criteria.to_string(),
                "field": criteria.field,
            }),
        ),
        CatalogServiceError::Validation(validation) => (
            StatusCode::BAD_REQUEST,
            json!({
                "code": "invalid_field",
                "message": validation.message,
                "field": validation.field,
            }),
        ),
        CatalogServiceError::NotFound(_) | CatalogServiceError::Repository(RepositoryError::NotFound) => (
            StatusCode::NOT_FOUND,
            json!({ "code": "not_found", "message": "property not found" }),
        ),
        CatalogServiceError::Unauthenticated => (
            StatusCode::UNAUTHORIZED,
            json!({ "code": "unauthorized", "message": err.to_string() }),
        ),
        CatalogServiceError::Forbidden => (
            StatusCode::FORBIDDEN,
            json!({ "code": "forbidden", "message": err.to_string() }),
        ),
        CatalogServiceError::Repository(RepositoryError::InvalidDistrict(_)) => (
            StatusCode::BAD_REQUEST,
            json!({ "code": "invalid_field", "message": err.to_string(), "field": "district" }),
        ),
        CatalogServiceError::Repository(RepositoryError::Unavailable(_)) => {
            error!(error = %err, "catalog repository failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "code": "repository_error", "message": err.to_string() }),
            )
        }
    };

    let mut response = negotiated(headers, status, &payload);
    if status == StatusCode::UNAUTHORIZED {
        response
            .headers_mut()
            .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    }
    response
}

fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}

fn parse_draft(body: &Bytes) -> Result<PropertyDraft, CatalogServiceError> {
    if body.is_empty() {
        return Ok(PropertyDraft::default());
    }
    serde_json::from_slice(body).map_err(|err| {
        CatalogServiceError::Validation(super::draft::ValidationError::new(
            "body",
            format!("malformed JSON payload: {err}"),
        ))
    })
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<CatalogService<R>>>,
    headers: HeaderMap,
    Query(params): Query<RawParams>,
) -> Response
where
    R: PropertyRepository + 'static,
{
    match service.list(&params) {
        Ok(outcome) => {
            let mut response = negotiated(&headers, StatusCode::OK, &outcome.items);
            let pagination = outcome.pagination;
            let response_headers = response.headers_mut();
            response_headers.insert(TOTAL_COUNT_HEADER, HeaderValue::from(pagination.total_items));
            response_headers.insert(TOTAL_PAGES_HEADER, HeaderValue::from(pagination.total));
            response
        }
        Err(err) => error_response(&headers, err),
    }
}

pub(crate) async fn get_handler<R>(
    State(service): State<Arc<CatalogService<R>>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Response
where
    R: PropertyRepository + 'static,
{
    match service.get(PropertyId(id)) {
        Ok(detail) => negotiated(&headers, StatusCode::OK, &detail),
        Err(err) => error_response(&headers, err),
    }
}

pub(crate) async fn create_handler<R>(
    State(service): State<Arc<CatalogService<R>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    R: PropertyRepository + 'static,
{
    let result = service
        .authorize_admin(authorization(&headers))
        .and_then(|()| parse_draft(&body))
        .and_then(|draft| service.create(draft));

    match result {
        Ok(detail) => negotiated(&headers, StatusCode::CREATED, &detail),
        Err(err) => error_response(&headers, err),
    }
}

pub(crate) async fn update_handler<R>(
    State(service): State<Arc<CatalogService<R>>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    body: Bytes,
) -> Response
where
    R: PropertyRepository + 'static,
{
    let result = service
        .authorize_admin(authorization(&headers))
        .and_then(|()| parse_draft(&body))
        .and_then(|draft| service.update(PropertyId(id), draft));

    match result {
        Ok(detail) => negotiated(&headers, StatusCode::OK, &detail),
        Err(err) => error_response(&headers, err),
    }
}

pub(crate) async fn delete_handler<R>(
    State(service): State<Arc<CatalogService<R>>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Response
where
    R: PropertyRepository + 'static,
{
    let result = service
        .authorize_admin(authorization(&headers))
        .and_then(|()| service.delete(PropertyId(id)));

    match result {
        Ok(outcome) => negotiated(&headers, StatusCode::OK, &outcome),
        Err(err) => error_response(&headers, err),
    }
}

pub(crate) async fn districts_handler<R>(
    State(service): State<Arc<CatalogService<R>>>,
    headers: HeaderMap,
) -> Response
where
    R: PropertyRepository + 'static,
{
    match service.districts() {
        Ok(districts) => negotiated(&headers, StatusCode::OK, &districts),
        Err(err) => error_response(&headers, err),
    }
}

pub(crate) async fn nonce_handler<R>(
    State(service): State<Arc<CatalogService<R>>>,
    headers: HeaderMap,
) -> Response
where
    R: PropertyRepository + 'static,
{
    let payload = json!({
        "ajax_url": AJAX_PATH,
        "nonce": service.issue_filter_nonce(Utc::now()),
    });
    let mut response = negotiated(&headers, StatusCode::OK, &payload);
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn ajax_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "success": false, "data": message }))).into_response()
}

/// Storefront form endpoint. The nonce is checked before the action or any criteria are
/// looked at; a body that is not a form reads as an empty one and fails the nonce check.
pub(crate) async fn ajax_handler<R>(
    State(service): State<Arc<CatalogService<R>>>,
    form: Result<Form<RawParams>, FormRejection>,
) -> Response
where
    R: PropertyRepository + 'static,
{
    let params = match form {
        Ok(Form(params)) => params,
        Err(rejection) => {
            debug!(error = %rejection, "storefront body is not a form");
            RawParams::default()
        }
    };

    if !service.verify_filter_nonce(params.get("nonce").map(String::as_str), Utc::now()) {
        warn!("rejected filter request with missing or invalid nonce");
        return ajax_error(StatusCode::FORBIDDEN, "Invalid nonce");
    }

    if params.get("action").map(String::as_str) != Some(FILTER_ACTION) {
        return ajax_error(StatusCode::BAD_REQUEST, "Unknown action");
    }

    match service.filter(&params) {
        Ok(outcome) => {
            let payload: Value = json!({ "success": true, "data": outcome });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => {
            error!(error = %err, "filter request failed");
            ajax_error(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string())
        }
    }
}
