//! Rutas del gestor de cola de conductores

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::controllers::queue_controller::QueueController;
use crate::dto::queue_dto::{
    AdvanceQueueRequest, QueueNextResponse, QueueOrderResponse, SeedQueueRequest,
};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_queue_router() -> Router<AppState> {
    Router::new()
        .route("/next", get(queue_next))
        .route("/advance", post(queue_advance))
        .route("/renumber", post(queue_renumber))
        .route("/seed", post(queue_seed))
}

async fn queue_next(
    State(state): State<AppState>,
) -> Result<Json<QueueNextResponse>, AppError> {
    let controller = QueueController::new(state.pool.clone());
    let response = controller.next().await?;
    Ok(Json(response))
}

async fn queue_advance(
    State(state): State<AppState>,
    Json(request): Json<AdvanceQueueRequest>,
) -> Result<Json<QueueOrderResponse>, AppError> {
    let controller = QueueController::new(state.pool.clone());
    let response = controller.advance(request.driver_id).await?;
    Ok(Json(response))
}

async fn queue_renumber(
    State(state): State<AppState>,
) -> Result<Json<QueueOrderResponse>, AppError> {
    let controller = QueueController::new(state.pool.clone());
    let response = controller.renumber().await?;
    Ok(Json(response))
}

async fn queue_seed(
    State(state): State<AppState>,
    Json(request): Json<SeedQueueRequest>,
) -> Result<Json<QueueOrderResponse>, AppError> {
    let controller = QueueController::new(state.pool.clone());
    let response = controller.seed(&request.version, request.seeds).await?;
    Ok(Json(response))
}
