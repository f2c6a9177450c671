//! Ruta de canje del token de aceptación
//!
//! El conductor llega acá siguiendo el deep link enviado por mensajería.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::controllers::accept_controller::AcceptController;
use crate::dto::booking_dto::BookingResponse;
use crate::dto::common_dto::ApiResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_accept_router() -> Router<AppState> {
    Router::new().route("/accept", get(redeem_token))
}

#[derive(Debug, Deserialize)]
struct AcceptParams {
    token: Option<String>,
    #[serde(rename = "externalId")]
    external_id: Option<String>,
}

async fn redeem_token(
    State(state): State<AppState>,
    Query(params): Query<AcceptParams>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let token = params
        .token
        .ok_or_else(|| AppError::Validation("token parameter is required".to_string()))?;
    let external_id = params
        .external_id
        .ok_or_else(|| AppError::Validation("externalId parameter is required".to_string()))?;

    let controller = AcceptController::new(state.pool.clone());
    let response = controller.redeem(&token, &external_id).await?;
    Ok(Json(response))
}
