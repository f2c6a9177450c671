//! Controller del ciclo de vida de Booking
//!
//! Orquesta creación, revisión, asignación, kilometraje y cancelación.
//! Las notificaciones salen siempre después del commit y nunca pueden
//! frenar ni revertir la mutación principal.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::booking_dto::{
    AssignRequest, BookingResponse, CreateBookingRequest, MileageFinishRequest,
    MileageStartRequest,
};
use crate::dto::common_dto::ApiResponse;
use crate::models::booking::BookingStatus;
use crate::repositories::booking_repository::BookingRepository;
use crate::repositories::driver_repository::DriverRepository;
use crate::services::notification_service::NotificationService;
use crate::utils::codes::{generate_accept_token, generate_request_code};
use crate::utils::errors::{not_found_error, AppError};

pub struct BookingController {
    bookings: BookingRepository,
    drivers: DriverRepository,
    notifier: NotificationService,
    token_ttl_hours: i64,
}

impl BookingController {
    pub fn new(pool: PgPool, notifier: NotificationService, token_ttl_hours: i64) -> Self {
        Self {
            bookings: BookingRepository::new(pool.clone()),
            drivers: DriverRepository::new(pool),
            notifier,
            token_ttl_hours,
        }
    }

    /// Crear una solicitud de viaje (estado inicial REQUESTED, o
    /// PENDING_RETRO para entradas retroactivas cargadas por un admin).
    pub async fn create(
        &self,
        requester_id: Uuid,
        request: CreateBookingRequest,
        retroactive: bool,
    ) -> Result<ApiResponse<BookingResponse>, AppError> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if request.end_at < request.start_at {
            return Err(AppError::Validation(
                "end_at must not be before start_at".to_string(),
            ));
        }

        let initial_status = if retroactive {
            BookingStatus::PendingRetro
        } else {
            BookingStatus::Requested
        };

        let request_code = generate_request_code(request.start_at.date());
        let booking = self
            .bookings
            .create(
                request_code,
                requester_id,
                request.purpose,
                request.destination,
                request.start_at,
                request.end_at,
                initial_status,
            )
            .await?;

        Ok(ApiResponse::success_with_message(
            BookingResponse::from(booking),
            "Solicitud creada exitosamente".to_string(),
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<BookingResponse, AppError> {
        let booking = self
            .bookings
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Booking", &id.to_string()))?;
        Ok(BookingResponse::from(booking))
    }

    pub async fn list(&self) -> Result<Vec<BookingResponse>, AppError> {
        let bookings = self.bookings.list().await?;
        Ok(bookings.into_iter().map(BookingResponse::from).collect())
    }

    pub async fn approve(&self, id: Uuid) -> Result<ApiResponse<BookingResponse>, AppError> {
        let booking = self.bookings.approve(id).await?;
        Ok(ApiResponse::success_with_message(
            BookingResponse::from(booking),
            "Solicitud aprobada".to_string(),
        ))
    }

    pub async fn reject(&self, id: Uuid) -> Result<ApiResponse<BookingResponse>, AppError> {
        let booking = self.bookings.reject(id).await?;
        Ok(ApiResponse::success_with_message(
            BookingResponse::from(booking),
            "Solicitud rechazada".to_string(),
        ))
    }

    /// Asignar conductor y vehículo. La transacción reserva al conductor,
    /// transiciona el booking y emite el token; recién después del commit
    /// se despacha el enlace de aceptación al conductor.
    pub async fn assign(
        &self,
        id: Uuid,
        request: AssignRequest,
    ) -> Result<ApiResponse<BookingResponse>, AppError> {
        let driver = self
            .drivers
            .find_by_id(request.driver_id)
            .await?
            .ok_or_else(|| not_found_error("Driver", &request.driver_id.to_string()))?;

        let token = generate_accept_token();
        let expire_at = Utc::now() + Duration::hours(self.token_ttl_hours);

        let (booking, token_row) = self
            .bookings
            .assign(id, request.driver_id, request.vehicle_id, token, expire_at)
            .await?;

        // Fire-and-forget: una falla de entrega se loggea y nada más
        if let Some(identity) = driver.external_identity {
            self.notifier.dispatch_assignment(
                identity,
                booking.request_code.clone(),
                token_row.token,
            );
        }

        Ok(ApiResponse::success_with_message(
            BookingResponse::from(booking),
            "Conductor asignado y enlace de aceptación enviado".to_string(),
        ))
    }

    /// Registrar el kilometraje de salida: ACCEPTED → STARTED.
    pub async fn start_mileage(
        &self,
        request: MileageStartRequest,
    ) -> Result<ApiResponse<BookingResponse>, AppError> {
        let booking = self
            .bookings
            .start_mileage(request.booking_id, request.start_mileage)
            .await?;
        Ok(ApiResponse::success_with_message(
            BookingResponse::from(booking),
            "Kilometraje de salida registrado".to_string(),
        ))
    }

    /// Registrar el kilometraje de llegada y cerrar el viaje:
    /// STARTED → COMPLETED, conductor de vuelta a AVAILABLE.
    pub async fn finish_mileage(
        &self,
        request: MileageFinishRequest,
    ) -> Result<ApiResponse<BookingResponse>, AppError> {
        if request.end_mileage < request.start_mileage {
            return Err(AppError::Validation(format!(
                "end_mileage ({}) must be >= start_mileage ({})",
                request.end_mileage, request.start_mileage
            )));
        }

        let booking = self
            .bookings
            .finish_mileage(request.booking_id, request.end_mileage)
            .await?;

        // Notificación de cierre, después del commit
        self.notifier
            .dispatch_completion(booking.request_code.clone());

        Ok(ApiResponse::success_with_message(
            BookingResponse::from(booking),
            "Viaje completado".to_string(),
        ))
    }

    /// Cancelación por el solicitante; la identidad llega como contexto
    /// explícito del request, nunca como estado ambiente.
    pub async fn cancel(
        &self,
        id: Uuid,
        requester_id: Uuid,
    ) -> Result<ApiResponse<BookingResponse>, AppError> {
        let booking = self.bookings.cancel(id, requester_id).await?;
        Ok(ApiResponse::success_with_message(
            BookingResponse::from(booking),
            "Solicitud cancelada".to_string(),
        ))
    }
}
