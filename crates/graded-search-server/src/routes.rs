//! HTTP surface of the search core.
//!
//! JSON in, JSON out. The searcher is shared read-only state; polars queries
//! are synchronous, so handlers push them onto the blocking pool.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use graded_search::{
    Classification, DirectorySearcher, NearestPlace, SearchFilter, SuggestionScope, Suggestions,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::error;

#[derive(Clone)]
pub struct AppState {
    pub searcher: Arc<DirectorySearcher>,
}

pub fn router(searcher: Arc<DirectorySearcher>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/search/nearest", post(nearest))
        .route("/api/search/suggestions", get(suggestions))
        .route("/api/search/suggestions", post(popular))
        .route("/api/search/classify", get(classify))
        .with_state(AppState { searcher })
}

struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!(error = %self.0, "request failed");
        let body = Json(json!({"error": "internal error"}));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({"error": message}))).into_response()
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// `POST /api/search/nearest` with body `{lat, lng}`.
///
/// The body is inspected as loose JSON so that non-numeric coordinates map to
/// a 400 rather than a framework rejection.
async fn nearest(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Response, AppError> {
    let (Some(lat), Some(lng)) = (
        body.get("lat").and_then(Value::as_f64),
        body.get("lng").and_then(Value::as_f64),
    ) else {
        return Ok(bad_request("lat and lng must be numeric"));
    };
    if !lat.is_finite() || !lng.is_finite() {
        return Ok(bad_request("lat and lng must be finite"));
    }

    let searcher = state.searcher.clone();
    let place: Option<NearestPlace> =
        tokio::task::spawn_blocking(move || searcher.nearest_place(lat, lng)).await??;

    Ok(Json(json!({ "place": place })).into_response())
}

#[derive(Debug, Deserialize)]
struct SuggestionParams {
    #[serde(default)]
    q: String,
    #[serde(default, rename = "type")]
    scope: SuggestionScope,
}

/// `GET /api/search/suggestions?q=&type=`.
async fn suggestions(
    State(state): State<AppState>,
    Query(params): Query<SuggestionParams>,
) -> Result<Json<Suggestions>, AppError> {
    let searcher = state.searcher.clone();
    let suggestions =
        tokio::task::spawn_blocking(move || searcher.suggest(&params.q, params.scope)).await??;
    Ok(Json(suggestions))
}

/// `POST /api/search/suggestions` with body `{type: "categories"|"places"}`.
///
/// The body is inspected as loose JSON so that a missing or unknown `type`
/// maps to a 400 rather than a framework rejection.
async fn popular(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> Result<Response, AppError> {
    let kind = body
        .as_ref()
        .and_then(|Json(v)| v.get("type"))
        .and_then(Value::as_str);

    let searcher = state.searcher.clone();
    let response = match kind {
        Some("categories") => {
            let categories =
                tokio::task::spawn_blocking(move || searcher.popular_categories()).await??;
            json!({ "categories": categories })
        }
        Some("places") => {
            let places = tokio::task::spawn_blocking(move || searcher.popular_places()).await??;
            json!({ "places": places })
        }
        _ => return Ok(bad_request("type must be 'categories' or 'places'")),
    };
    Ok(Json(response).into_response())
}

#[derive(Debug, Deserialize)]
struct ClassifyParams {
    #[serde(default)]
    q: String,
    #[serde(default, rename = "type")]
    filter: SearchFilter,
}

/// `GET /api/search/classify?q=&type=`.
async fn classify(
    State(state): State<AppState>,
    Query(params): Query<ClassifyParams>,
) -> Result<Json<Classification>, AppError> {
    let searcher = state.searcher.clone();
    let classification =
        tokio::task::spawn_blocking(move || searcher.classify(&params.q, params.filter)).await?;
    Ok(Json(classification))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use graded_search::DirectoryData;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        router(Arc::new(DirectorySearcher::new(DirectoryData::sample())))
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn nearest_returns_a_place() {
        let request = json_post("/api/search/nearest", json!({"lat": 53.48, "lng": -2.24}));
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["place"]["slug"], "manchester");
        assert_eq!(body["place"]["countrySlug"], "england");
    }

    #[tokio::test]
    async fn nearest_rejects_non_numeric_coordinates() {
        let request = json_post("/api/search/nearest", json!({"lat": "fifty", "lng": -2.0}));
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn nearest_rejects_missing_coordinates() {
        let request = json_post("/api/search/nearest", json!({"lat": 53.0}));
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn suggestions_short_query_is_empty() {
        let response = app()
            .oneshot(
                Request::get("/api/search/suggestions?q=m")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["places"], json!([]));
        assert_eq!(body["categories"], json!([]));
        assert_eq!(body["brands"], json!([]));
    }

    #[tokio::test]
    async fn suggestions_scope_filters_tables() {
        let response = app()
            .oneshot(
                Request::get("/api/search/suggestions?q=man&type=location")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = body_json(response).await;
        assert!(!body["places"].as_array().unwrap().is_empty());
        assert!(body["categories"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn popular_categories_are_listed() {
        let request = json_post("/api/search/suggestions", json!({"type": "categories"}));
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["categories"][0]["name"], "Washing Machines");
    }

    #[tokio::test]
    async fn popular_rejects_unknown_kind() {
        let request = json_post("/api/search/suggestions", json!({"type": "stores"}));
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn popular_rejects_missing_body() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/search/suggestions")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn classify_routes_a_query() {
        let response = app()
            .oneshot(
                Request::get("/api/search/classify?q=bosch&type=buy")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["type"], "brand");
        assert_eq!(body["url"], "/bosch-repair/");
        assert_eq!(body["matchedName"], "Bosch");
    }
}
