//! HTTP JSON API over the store.
//!
//! # Endpoints
//!
//! - `GET /api/health`
//! - `GET /api/ingredients`, `PUT|DELETE /api/ingredients/{id}`
//! - `GET /api/recipes`, `PUT|DELETE /api/recipes/{id}`
//! - `GET /api/patterns`, `PUT|DELETE /api/patterns/{id}`
//! - `GET|PUT /api/settings`
//! - `GET|PUT|DELETE /api/overrides/{week}`
//! - `GET /api/weeks/{date}`, `GET /api/weeks/{date}/shopping-list`
//! - `GET /api/export`, `POST /api/import`

pub mod error;
mod handlers;

use axum::{
    routing::{get, post, put},
    Router,
};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ErrorResponse};
pub use handlers::LAST_PATTERN_MESSAGE;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/ingredients", get(handlers::list_ingredients))
        .route(
            "/api/ingredients/{id}",
            put(handlers::put_ingredient).delete(handlers::delete_ingredient),
        )
        .route("/api/recipes", get(handlers::list_recipes))
        .route(
            "/api/recipes/{id}",
            put(handlers::put_recipe).delete(handlers::delete_recipe),
        )
        .route("/api/patterns", get(handlers::list_patterns))
        .route(
            "/api/patterns/{id}",
            put(handlers::put_pattern).delete(handlers::delete_pattern),
        )
        .route(
            "/api/settings",
            get(handlers::get_settings).put(handlers::put_settings),
        )
        .route(
            "/api/overrides/{week}",
            get(handlers::get_override)
                .put(handlers::put_override)
                .delete(handlers::delete_override),
        )
        .route("/api/weeks/{date}", get(handlers::get_week))
        .route(
            "/api/weeks/{date}/shopping-list",
            get(handlers::get_shopping_list),
        )
        .route("/api/export", get(handlers::export_data))
        .route("/api/import", post(handlers::import_data))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct TestContext {
        app: Router,
        _temp_dir: TempDir,
    }

    async fn setup() -> TestContext {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_db(&temp_dir.path().join("test.db")).await.unwrap();
        TestContext {
            app: router(AppState::new(pool)),
            _temp_dir: temp_dir,
        }
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn seed_week(app: &Router) {
        send(app, "PUT", "/api/ingredients/i1", Some(json!({"name": "Carrot", "unit": "cup"}))).await;
        send(
            app,
            "PUT",
            "/api/recipes/r1",
            Some(json!({
                "name": "Soup",
                "ingredients": [{"ingredientId": "i1", "quantity": 1, "unit": "cup"}],
                "steps": ["Simmer"]
            })),
        )
        .await;
        send(
            app,
            "PUT",
            "/api/recipes/r2",
            Some(json!({
                "name": "Stew",
                "ingredients": [{"ingredientId": "i1", "quantity": 2, "unit": "cup"}],
                "steps": []
            })),
        )
        .await;
        send(
            app,
            "PUT",
            "/api/patterns/p1",
            Some(json!({
                "name": "Week A",
                "mealBlocks": [
                    {"id": "m1", "recipeId": "r1", "startDayIndex": 0, "durationDays": 2},
                    {"id": "m2", "recipeId": "r2", "startDayIndex": 3, "durationDays": 1}
                ]
            })),
        )
        .await;
        send(
            app,
            "PUT",
            "/api/settings",
            Some(json!({"patternStartDate": "2026-02-09", "patternOrder": ["p1"]})),
        )
        .await;
    }

    #[tokio::test]
    async fn test_health() {
        let ctx = setup().await;
        let (status, body) = send(&ctx.app, "GET", "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_ingredient_crud() {
        let ctx = setup().await;

        let (status, _) = send(
            &ctx.app,
            "PUT",
            "/api/ingredients/i1",
            Some(json!({"name": "Carrot", "unit": "g"})),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&ctx.app, "GET", "/api/ingredients", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["id"], "i1");
        assert_eq!(body[0]["unit"], "g");

        let (status, _) = send(&ctx.app, "DELETE", "/api/ingredients/i1", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, body) = send(&ctx.app, "GET", "/api/ingredients", None).await;
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_missing_fields_rejected() {
        let ctx = setup().await;
        let (status, body) = send(
            &ctx.app,
            "PUT",
            "/api/ingredients/i1",
            Some(json!({"name": "Carrot"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");
        assert!(body["message"].as_str().unwrap().contains("unit"));
    }

    #[tokio::test]
    async fn test_overlapping_pattern_rejected() {
        let ctx = setup().await;
        let (status, body) = send(
            &ctx.app,
            "PUT",
            "/api/patterns/p1",
            Some(json!({
                "name": "Week A",
                "mealBlocks": [
                    {"id": "m1", "recipeId": "r1", "startDayIndex": 0, "durationDays": 3},
                    {"id": "m2", "recipeId": "r2", "startDayIndex": 2, "durationDays": 1}
                ]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("overlap"));
    }

    #[tokio::test]
    async fn test_duplicate_block_ids_rejected() {
        let ctx = setup().await;
        let blocks = json!([
            {"id": "m1", "recipeId": "r1", "startDayIndex": 0, "durationDays": 1},
            {"id": "m1", "recipeId": "r2", "startDayIndex": 3, "durationDays": 1}
        ]);

        let (status, body) = send(
            &ctx.app,
            "PUT",
            "/api/patterns/p1",
            Some(json!({"name": "Week A", "mealBlocks": blocks.clone()})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("m1"));

        let (status, _) = send(
            &ctx.app,
            "PUT",
            "/api/overrides/2026-02-09",
            Some(json!({"mealBlocks": blocks.clone()})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &ctx.app,
            "POST",
            "/api/import",
            Some(json!({
                "version": 1,
                "exportedAt": "2026-02-09T10:00:00Z",
                "patterns": [{"id": "p1", "name": "Week A", "mealBlocks": blocks}]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, patterns) = send(&ctx.app, "GET", "/api/patterns", None).await;
        assert_eq!(patterns, json!([]));
    }

    #[tokio::test]
    async fn test_cannot_delete_last_pattern() {
        let ctx = setup().await;
        seed_week(&ctx.app).await;

        let (status, body) = send(&ctx.app, "DELETE", "/api/patterns/p1", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], LAST_PATTERN_MESSAGE);

        send(&ctx.app, "PUT", "/api/patterns/p2", Some(json!({"name": "Week B", "mealBlocks": []}))).await;
        let (status, _) = send(&ctx.app, "DELETE", "/api/patterns/p1", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, settings) = send(&ctx.app, "GET", "/api/settings", None).await;
        assert_eq!(settings["patternOrder"], json!([]));
    }

    #[tokio::test]
    async fn test_week_view_and_shopping_list() {
        let ctx = setup().await;
        seed_week(&ctx.app).await;

        let (status, week) = send(&ctx.app, "GET", "/api/weeks/2026-02-11", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(week["weekStart"], "2026-02-09");
        assert_eq!(week["label"], "Feb 9 - Feb 15");
        assert_eq!(week["source"]["kind"], "pattern");
        assert_eq!(week["patternName"], "Week A");
        assert_eq!(week["days"][0]["meal"]["recipeName"], "Soup");
        assert_eq!(week["days"][1]["meal"]["isLeftoverDay"], true);
        assert_eq!(week["days"][2]["meal"], Value::Null);

        let (status, list) = send(&ctx.app, "GET", "/api/weeks/2026-02-11/shopping-list", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list[0]["name"], "Carrot");
        assert_eq!(list[0]["quantity"], 3.0);
    }

    #[tokio::test]
    async fn test_invalid_date_rejected() {
        let ctx = setup().await;
        let (status, body) = send(&ctx.app, "GET", "/api/weeks/next-tuesday", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("YYYY-MM-DD"));
    }

    #[tokio::test]
    async fn test_override_lifecycle() {
        let ctx = setup().await;
        seed_week(&ctx.app).await;

        let (status, _) = send(&ctx.app, "GET", "/api/overrides/2026-02-09", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &ctx.app,
            "PUT",
            "/api/overrides/2026-02-12",
            Some(json!({"mealBlocks": [
                {"id": "m9", "recipeId": "r2", "startDayIndex": 5, "durationDays": 2}
            ]})),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, week) = send(&ctx.app, "GET", "/api/weeks/2026-02-09", None).await;
        assert_eq!(week["source"]["kind"], "override");
        assert_eq!(week["patternName"], "Week A");
        assert_eq!(week["days"][6]["meal"]["blockId"], "m9");

        let (status, _) = send(&ctx.app, "DELETE", "/api/overrides/2026-02-09", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, week) = send(&ctx.app, "GET", "/api/weeks/2026-02-09", None).await;
        assert_eq!(week["source"]["kind"], "pattern");
    }

    #[tokio::test]
    async fn test_export_then_import_round_trip() {
        let ctx = setup().await;
        seed_week(&ctx.app).await;

        let (status, exported) = send(&ctx.app, "GET", "/api/export", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(exported["version"], 1);

        let other = setup().await;
        let (status, _) = send(&other.app, "POST", "/api/import", Some(exported.clone())).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, patterns) = send(&other.app, "GET", "/api/patterns", None).await;
        assert_eq!(patterns, exported["patterns"]);
    }

    #[tokio::test]
    async fn test_import_rejects_invalid_document() {
        let ctx = setup().await;
        seed_week(&ctx.app).await;

        let (status, body) = send(
            &ctx.app,
            "POST",
            "/api/import",
            Some(json!({"version": 7, "exportedAt": "2026-02-09T10:00:00Z"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("version"));

        // Existing data untouched
        let (_, patterns) = send(&ctx.app, "GET", "/api/patterns", None).await;
        assert_eq!(patterns.as_array().unwrap().len(), 1);
    }
}
