//! Rutas de registro de kilometraje

use axum::{extract::State, routing::post, Json, Router};

use crate::controllers::booking_controller::BookingController;
use crate::dto::booking_dto::{BookingResponse, MileageFinishRequest, MileageStartRequest};
use crate::dto::common_dto::ApiResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_mileage_router() -> Router<AppState> {
    Router::new()
        .route("/start", post(start_mileage))
        .route("/finish", post(finish_mileage))
}

async fn start_mileage(
    State(state): State<AppState>,
    Json(request): Json<MileageStartRequest>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let controller = BookingController::new(
        state.pool.clone(),
        state.notifier.clone(),
        state.config.accept_token_ttl_hours,
    );
    let response = controller.start_mileage(request).await?;
    Ok(Json(response))
}

async fn finish_mileage(
    State(state): State<AppState>,
    Json(request): Json<MileageFinishRequest>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let controller = BookingController::new(
        state.pool.clone(),
        state.notifier.clone(),
        state.config.accept_token_ttl_hours,
    );
    let response = controller.finish_mileage(request).await?;
    Ok(Json(response))
}
