pub mod accept_routes;
pub mod booking_routes;
pub mod driver_routes;
pub mod mileage_routes;
pub mod queue_routes;

use axum::{response::Json, routing::get, Router};
use serde_json::json;

use crate::middleware::cors::cors_middleware;
use crate::state::AppState;

/// Armar el router completo de la aplicación.
pub fn create_app(app_state: AppState) -> Router {
    Router::new()
        .route("/test", get(test_endpoint))
        .nest("/bookings", booking_routes::create_booking_router())
        .nest("/queue", queue_routes::create_queue_router())
        .nest("/mileage", mileage_routes::create_mileage_router())
        .nest("/drivers", driver_routes::create_driver_router())
        .merge(accept_routes::create_accept_router())
        .layer(cors_middleware())
        .with_state(app_state)
}

/// Endpoint de prueba simple
async fn test_endpoint() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Fleet Dispatch funcionando correctamente",
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
