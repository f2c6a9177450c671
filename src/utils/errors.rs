//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP apropiadas.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Una transición de estado cuyo guard falló (re-aceptar, cancelar un
    /// viaje completado, asignar un conductor ocupado, etc.)
    #[error("State conflict: {0}")]
    StateConflict(String),

    /// Token de aceptación presente pero vencido. Se reporta distinto de
    /// NotFound para que el cliente pueda mostrar "enlace vencido".
    #[error("Expired token: {0}")]
    ExpiredToken(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            AppError::Database(e) => {
                // El detalle se loggea del lado del servidor; al cliente
                // solo le llega una falla genérica.
                error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "Database Error".to_string(),
                        message: "An error occurred while accessing the database".to_string(),
                        code: Some("DB_ERROR".to_string()),
                    },
                )
            }

            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "Validation Error".to_string(),
                    message: msg,
                    code: Some("VALIDATION_ERROR".to_string()),
                },
            ),

            AppError::Forbidden(msg) => (
                StatusCode::FORBIDDEN,
                ErrorResponse {
                    error: "Forbidden".to_string(),
                    message: msg,
                    code: Some("FORBIDDEN".to_string()),
                },
            ),

            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    error: "Not Found".to_string(),
                    message: msg,
                    code: Some("NOT_FOUND".to_string()),
                },
            ),

            AppError::StateConflict(msg) => (
                StatusCode::CONFLICT,
                ErrorResponse {
                    error: "State Conflict".to_string(),
                    message: msg,
                    code: Some("STATE_CONFLICT".to_string()),
                },
            ),

            AppError::ExpiredToken(msg) => (
                StatusCode::GONE,
                ErrorResponse {
                    error: "Expired Token".to_string(),
                    message: msg,
                    code: Some("EXPIRED_TOKEN".to_string()),
                },
            ),

            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "Internal Server Error".to_string(),
                        message: "An unexpected error occurred".to_string(),
                        code: Some("INTERNAL_ERROR".to_string()),
                    },
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: &str) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

/// Función helper para crear errores de conflicto de estado
pub fn state_conflict_error(operation: &str, reason: &str) -> AppError {
    AppError::StateConflict(format!("Cannot {}: {}", operation, reason))
}

/// Función helper para crear errores de validación
pub fn validation_error(message: &str) -> AppError {
    AppError::Validation(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expired_token_maps_to_410() {
        let response = AppError::ExpiredToken("token vencido".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::GONE);
    }

    #[test]
    fn test_state_conflict_maps_to_409() {
        let response = state_conflict_error("accept booking", "already accepted").into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_not_found_helper_message() {
        let err = not_found_error("Booking", "b-123");
        assert_eq!(err.to_string(), "Not found: Booking with id 'b-123' not found");
    }
}
