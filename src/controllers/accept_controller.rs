//! Controller del protocolo de aceptación
//!
//! Canje del token de un solo uso que llega por deep link de mensajería,
//! y el camino alternativo de auto-reclamo por match directo de conductor.

use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::booking_dto::BookingResponse;
use crate::dto::common_dto::ApiResponse;
use crate::repositories::booking_repository::BookingRepository;
use crate::repositories::driver_repository::DriverRepository;
use crate::repositories::token_repository::TokenRepository;
use crate::utils::errors::AppError;

pub struct AcceptController {
    tokens: TokenRepository,
    bookings: BookingRepository,
    drivers: DriverRepository,
}

impl AcceptController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            tokens: TokenRepository::new(pool.clone()),
            bookings: BookingRepository::new(pool.clone()),
            drivers: DriverRepository::new(pool),
        }
    }

    /// Canjear un token de aceptación. La validación y los tres efectos
    /// (booking, driver, token) corren en una sola transacción dentro del
    /// repositorio; un segundo canje del mismo token siempre falla porque
    /// el token ya no existe.
    pub async fn redeem(
        &self,
        token: &str,
        caller_external_identity: &str,
    ) -> Result<ApiResponse<BookingResponse>, AppError> {
        if token.trim().is_empty() || caller_external_identity.trim().is_empty() {
            return Err(AppError::Validation(
                "token and externalId parameters are required".to_string(),
            ));
        }

        let booking = self.tokens.redeem(token, caller_external_identity).await?;
        Ok(ApiResponse::success_with_message(
            BookingResponse::from(booking),
            "Solicitud aceptada".to_string(),
        ))
    }

    /// Auto-reclamo: el conductor acepta directamente una solicitud que ya
    /// lo tiene asignado, sin pasar por el token. Camino deliberadamente
    /// más laxo que el canje; ver DESIGN.md.
    pub async fn self_claim(
        &self,
        booking_id: Uuid,
        caller_external_identity: &str,
    ) -> Result<ApiResponse<BookingResponse>, AppError> {
        let driver = self
            .drivers
            .find_by_external_identity(caller_external_identity)
            .await?
            .ok_or_else(|| {
                AppError::Forbidden("no driver matches this messaging identity".to_string())
            })?;

        let booking = self.bookings.self_claim(booking_id, driver.id).await?;
        Ok(ApiResponse::success_with_message(
            BookingResponse::from(booking),
            "Solicitud aceptada por auto-reclamo".to_string(),
        ))
    }
}
