pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::session::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Layout engine
        .route(
            "/api/v1/resumes/:id/layout",
            get(handlers::handle_get_layout),
        )
        .route(
            "/api/v1/resumes/:id/layout/move",
            post(handlers::handle_move_section),
        )
        .route(
            "/api/v1/resumes/:id/layout/pages",
            post(handlers::handle_add_page),
        )
        .route(
            "/api/v1/resumes/:id/layout/pages/:index",
            delete(handlers::handle_remove_page),
        )
        .route(
            "/api/v1/resumes/:id/layout/reset",
            post(handlers::handle_reset_layout),
        )
        .route(
            "/api/v1/resumes/:id/layout/overflow",
            post(handlers::handle_check_overflow),
        )
        // Live editing session (drag events + rendering-surface protocol)
        .route(
            "/api/v1/resumes/:id/layout/ws",
            get(handlers::handle_layout_ws),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::config::Config;
    use crate::layout::default_layout;
    use crate::session::locks::LayoutLocks;
    use crate::session::store::memory::MemoryStore;
    use crate::session::store::{MetadataStore, LAYOUT_PATH};

    fn test_config() -> Config {
        Config::from_vars(|key: &str| match key {
            "DATABASE_URL" => Some("postgres://localhost/test".to_string()),
            "PAGE_MARGIN_PX" => Some("0".to_string()),
            _ => None,
        })
        .unwrap()
    }

    async fn app_with(layout: Option<Value>) -> (Router, Arc<MemoryStore>, Uuid) {
        let id = Uuid::new_v4();
        let store = Arc::new(MemoryStore::with_resume(id));
        if let Some(layout) = layout {
            store.set_value(id, LAYOUT_PATH, layout).await.unwrap();
        }
        let state = AppState {
            config: test_config(),
            store: store.clone(),
            locks: LayoutLocks::new(),
        };
        (build_router(state), store, id)
    }

    async fn call(
        app: Router,
        method: Method,
        uri: String,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _, _) = app_with(None).await;
        let (status, body) = call(app, Method::GET, "/health".into(), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_get_layout_defaults_to_template() {
        let (app, _, id) = app_with(None).await;
        let (status, body) =
            call(app, Method::GET, format!("/api/v1/resumes/{id}/layout"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::to_value(default_layout()).unwrap());
    }

    #[tokio::test]
    async fn test_get_layout_unknown_resume() {
        let (app, _, _) = app_with(None).await;
        let other = Uuid::new_v4();
        let (status, body) =
            call(app, Method::GET, format!("/api/v1/resumes/{other}/layout"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_move_persists_new_layout() {
        let (app, store, id) =
            app_with(Some(json!([[["summary", "experience"], ["skills"]]]))).await;
        let (status, body) = call(
            app,
            Method::POST,
            format!("/api/v1/resumes/{id}/layout/move"),
            Some(json!({
                "from": {"page": 0, "column": 1, "section": 0},
                "to": {"page": 0, "column": 0, "section": 1}
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let expected = json!([[["summary", "skills", "experience"], []]]);
        assert_eq!(body, expected);
        assert_eq!(store.raw(id, LAYOUT_PATH), Some(expected));
    }

    #[tokio::test]
    async fn test_stale_move_is_a_noop() {
        let original = json!([[["summary"], ["skills"]]]);
        let (app, _, id) = app_with(Some(original.clone())).await;
        let (status, body) = call(
            app,
            Method::POST,
            format!("/api/v1/resumes/{id}/layout/move"),
            Some(json!({
                "from": {"page": 0, "column": 0, "section": 9},
                "to": {"page": 0, "column": 1, "section": 0}
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, original);
    }

    #[tokio::test]
    async fn test_add_page_without_body_appends_blank_page() {
        let (app, _, id) = app_with(Some(json!([[["summary"], []]]))).await;
        let (status, body) =
            call(app, Method::POST, format!("/api/v1/resumes/{id}/layout/pages"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["layout"], json!([[["summary"], []], [[], []]]));
        assert_eq!(body["pages_added"], 1);
    }

    #[tokio::test]
    async fn test_add_page_redistributes_overflow() {
        let (app, _, id) = app_with(Some(json!([[["profile", "projects"], []]]))).await;
        let (status, body) = call(
            app,
            Method::POST,
            format!("/api/v1/resumes/{id}/layout/pages"),
            Some(json!({"main": ["projects"], "sidebar": []})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["layout"], json!([[["profile"], []], [["projects"], []]]));
        assert_eq!(body["converged"], true);
    }

    #[tokio::test]
    async fn test_remove_page() {
        let (app, _, id) =
            app_with(Some(json!([[["summary"], ["skills"]], [["awards"], ["languages"]]]))).await;
        let (status, body) = call(
            app.clone(),
            Method::DELETE,
            format!("/api/v1/resumes/{id}/layout/pages/1"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([[["summary", "awards"], ["skills", "languages"]]]));

        let (status, _) = call(
            app.clone(),
            Method::DELETE,
            format!("/api/v1/resumes/{id}/layout/pages/0"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = call(
            app,
            Method::DELETE,
            format!("/api/v1/resumes/{id}/layout/pages/5"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "PAGE_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_reset_appends_custom_sections() {
        let (app, _, id) = app_with(Some(json!([[["skills"], ["custom.abc"]]]))).await;
        let (status, body) =
            call(app, Method::POST, format!("/api/v1/resumes/{id}/layout/reset"), None).await;
        assert_eq!(status, StatusCode::OK);
        let main = body[0][0].as_array().unwrap();
        assert_eq!(main.last().unwrap(), "custom.abc");
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_overflow_check_uses_budget_override() {
        let (app, _, id) =
            app_with(Some(json!([[["summary", "experience"], ["skills"]]]))).await;
        let (status, body) = call(
            app,
            Method::POST,
            format!("/api/v1/resumes/{id}/layout/overflow"),
            Some(json!({
                "heights": {"summary": 300.0, "experience": 300.0, "skills": 100.0},
                "max_height_px": 500.0
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"main": ["experience"], "sidebar": []}));
    }
}
