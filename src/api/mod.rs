//! REST API layer: route handlers, DTOs, and router composition.
//!
//! All endpoints are mounted under `/api/v1`, except `/health`.

pub mod dto;
pub mod handlers;
pub mod openapi;

use axum::Router;

use crate::app_state::AppState;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::persistence::seed::initial_drivers;
    use crate::persistence::{MemoryStore, PersistenceGateway, RideStore};
    use crate::service::pricing::PricingModel;
    use crate::service::pricing::tests::ScriptedModel;
    use crate::service::{PricingClient, SessionStore, WorkflowController, WorkflowSettings};

    async fn app() -> Router {
        let store: Arc<dyn RideStore> = Arc::new(MemoryStore::with_drivers(&initial_drivers()));
        let model: Arc<dyn PricingModel> =
            Arc::new(ScriptedModel::answering(json!(42), "rural car trip"));
        let controller = WorkflowController::new(
            PersistenceGateway::new(store),
            PricingClient::new(model),
            SessionStore::in_memory(),
            WorkflowSettings {
                confirmation_delay: Duration::from_secs(60),
                ..WorkflowSettings::default()
            },
        );
        controller.startup().await;
        build_router().with_state(AppState::new(Arc::new(controller)))
    }

    async fn call(
        router: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        };
        let Ok(request) = request else {
            panic!("request should build");
        };
        let Ok(response) = router.clone().oneshot(request).await else {
            panic!("router is infallible");
        };
        let status = response.status();
        let Ok(bytes) = to_bytes(response.into_body(), usize::MAX).await else {
            panic!("body should read");
        };
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (status, body) = call(&app().await, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn unknown_phone_is_404_with_error_body() {
        let router = app().await;
        let (status, body) = call(
            &router,
            Method::POST,
            "/api/v1/auth/client/login",
            Some(json!({ "phone": "000" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], 2001);
    }

    #[tokio::test]
    async fn unknown_entry_point_is_400() {
        let router = app().await;
        let (status, _) = call(
            &router,
            Method::POST,
            "/api/v1/auth/admin/login",
            Some(json!({ "phone": "1" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn workflow_requires_login() {
        let router = app().await;
        let (status, body) = call(&router, Method::POST, "/api/v1/workflow/quote", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], 2004);
    }

    #[tokio::test]
    async fn driver_directory_filters() {
        let router = app().await;
        let (status, body) =
            call(&router, Method::GET, "/api/v1/drivers?vehicle_type=van", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["data"][0]["name"], "Ana Pereira");
        assert_eq!(
            body["data"][0]["services"],
            json!(["Passageiro", "Encomenda/Pacote", "Frete/Mudança"])
        );

        let (_, body) =
            call(&router, Method::GET, "/api/v1/drivers?vehicle_type=moto", None).await;
        assert_eq!(body["total"], 2);
        assert_eq!(
            body["data"][0]["services"],
            json!(["Passageiro", "Entrega (Comida/Pequeno)", "Encomenda/Pacote"])
        );

        let (status, _) =
            call(&router, Method::GET, "/api/v1/drivers?vehicle_type=boat", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn register_quote_and_confirm_over_http() {
        let router = app().await;

        let (status, body) = call(
            &router,
            Method::POST,
            "/api/v1/auth/client/register",
            Some(json!({ "name": "Ana", "phone": "35999990000" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["phase"], "browsing");
        assert_eq!(body["session"]["kind"], "client");

        let (status, _) = call(
            &router,
            Method::POST,
            "/api/v1/workflow/driver",
            Some(json!({ "driver_id": "2" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(
            &router,
            Method::PATCH,
            "/api/v1/workflow/trip",
            Some(json!({
                "destination": "Rua Rural 10",
                "service_type": "Passageiro",
                "payment_method": "PIX"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["can_request_quote"], true);

        let (status, body) = call(&router, Method::POST, "/api/v1/workflow/quote", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["transaction"]["quote"]["price"], 42.0);
        assert_eq!(body["can_confirm"], true);

        let (status, body) = call(&router, Method::POST, "/api/v1/workflow/confirm", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["phase"], "confirmed");
        assert_eq!(body["confirmed_ride"]["status"], "pending");
        assert_eq!(body["pix_key"], "saa.drivers@email.com");

        let (status, body) = call(&router, Method::GET, "/api/v1/rides", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["data"][0]["driverName"], "Maria Oliveira");

        let (status, _) = call(&router, Method::GET, "/api/v1/dashboard", None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn unsupported_service_is_400() {
        let router = app().await;
        let _ = call(
            &router,
            Method::POST,
            "/api/v1/auth/client/register",
            Some(json!({ "name": "Ana", "phone": "35999990000" })),
        )
        .await;
        let _ = call(
            &router,
            Method::POST,
            "/api/v1/workflow/driver",
            Some(json!({ "driver_id": "1" })),
        )
        .await;
        let (status, body) = call(
            &router,
            Method::PATCH,
            "/api/v1/workflow/trip",
            Some(json!({ "destination": "Rua Nova 3", "service_type": "Frete/Mudança" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], 1003);

        let (_, state) = call(&router, Method::GET, "/api/v1/state", None).await;
        assert_eq!(state["transaction"]["service_type"], Value::Null);
    }

    #[tokio::test]
    async fn duplicate_registration_is_409() {
        let router = app().await;
        let (status, body) = call(
            &router,
            Method::POST,
            "/api/v1/auth/driver/register",
            Some(json!({ "name": "Outro", "phone": "(35) 99901-0003" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], 2002);
    }
}
