//! Rutas de Booking
//!
//! La identidad del caller llega como contexto explícito en headers
//! (`x-requester-id`, `x-external-id`), nunca como estado de sesión
//! ambiente.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::accept_controller::AcceptController;
use crate::controllers::booking_controller::BookingController;
use crate::dto::booking_dto::{AssignRequest, BookingResponse, CreateBookingRequest};
use crate::dto::common_dto::ApiResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_booking_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_booking))
        .route("/", get(list_bookings))
        .route("/retro", post(create_retro_booking))
        .route("/:id", get(get_booking))
        .route("/:id/approve", post(approve_booking))
        .route("/:id/reject", post(reject_booking))
        .route("/:id/assign", post(assign_booking))
        .route("/:id/claim", post(claim_booking))
        .route("/:id/cancel", put(cancel_booking))
}

/// Extraer la identidad del solicitante del header `x-requester-id`.
fn requester_id(headers: &HeaderMap) -> Result<Uuid, AppError> {
    headers
        .get("x-requester-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v).ok())
        .ok_or_else(|| {
            AppError::Validation("x-requester-id header is required".to_string())
        })
}

/// Extraer la identidad de mensajería externa del header `x-external-id`.
fn external_id(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .get("x-external-id")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
        .ok_or_else(|| AppError::Validation("x-external-id header is required".to_string()))
}

async fn create_booking(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateBookingRequest>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let requester = requester_id(&headers)?;
    let controller = BookingController::new(
        state.pool.clone(),
        state.notifier.clone(),
        state.config.accept_token_ttl_hours,
    );
    let response = controller.create(requester, request, false).await?;
    Ok(Json(response))
}

/// Entrada retroactiva cargada por un administrador en nombre del
/// solicitante; arranca en PENDING_RETRO.
async fn create_retro_booking(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateBookingRequest>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let requester = requester_id(&headers)?;
    let controller = BookingController::new(
        state.pool.clone(),
        state.notifier.clone(),
        state.config.accept_token_ttl_hours,
    );
    let response = controller.create(requester, request, true).await?;
    Ok(Json(response))
}

async fn list_bookings(
    State(state): State<AppState>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let controller = BookingController::new(
        state.pool.clone(),
        state.notifier.clone(),
        state.config.accept_token_ttl_hours,
    );
    let response = controller.list().await?;
    Ok(Json(response))
}

async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let controller = BookingController::new(
        state.pool.clone(),
        state.notifier.clone(),
        state.config.accept_token_ttl_hours,
    );
    let response = controller.get_by_id(id).await?;
    Ok(Json(response))
}

async fn approve_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let controller = BookingController::new(
        state.pool.clone(),
        state.notifier.clone(),
        state.config.accept_token_ttl_hours,
    );
    let response = controller.approve(id).await?;
    Ok(Json(response))
}

async fn reject_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let controller = BookingController::new(
        state.pool.clone(),
        state.notifier.clone(),
        state.config.accept_token_ttl_hours,
    );
    let response = controller.reject(id).await?;
    Ok(Json(response))
}

async fn assign_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AssignRequest>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let controller = BookingController::new(
        state.pool.clone(),
        state.notifier.clone(),
        state.config.accept_token_ttl_hours,
    );
    let response = controller.assign(id, request).await?;
    Ok(Json(response))
}

/// Auto-reclamo del conductor asignado, sin token.
async fn claim_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let identity = external_id(&headers)?;
    let controller = AcceptController::new(state.pool.clone());
    let response = controller.self_claim(id, &identity).await?;
    Ok(Json(response))
}

async fn cancel_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let requester = requester_id(&headers)?;
    let controller = BookingController::new(
        state.pool.clone(),
        state.notifier.clone(),
        state.config.accept_token_ttl_hours,
    );
    let response = controller.cancel(id, requester).await?;
    Ok(Json(response))
}
