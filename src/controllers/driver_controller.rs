//! Controller de administración de conductores

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::common_dto::ApiResponse;
use crate::dto::driver_dto::{DriverResponse, RegisterDriverRequest, UpdateDriverRequest};
use crate::repositories::driver_repository::DriverRepository;
use crate::utils::errors::AppError;

pub struct DriverController {
    repository: DriverRepository,
}

impl DriverController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: DriverRepository::new(pool),
        }
    }

    /// Registrar un conductor; entra al final de la cola de rotación.
    pub async fn register(
        &self,
        request: RegisterDriverRequest,
    ) -> Result<ApiResponse<DriverResponse>, AppError> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let driver = self
            .repository
            .create(request.full_name, request.phone, request.external_identity)
            .await?;

        Ok(ApiResponse::success_with_message(
            DriverResponse::from(driver),
            "Conductor registrado exitosamente".to_string(),
        ))
    }

    pub async fn list(&self) -> Result<Vec<DriverResponse>, AppError> {
        let drivers = self.repository.list_by_queue_order().await?;
        Ok(drivers.into_iter().map(DriverResponse::from).collect())
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateDriverRequest,
    ) -> Result<ApiResponse<DriverResponse>, AppError> {
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let driver = self
            .repository
            .update(
                id,
                request.full_name,
                request.phone,
                request.external_identity,
                request.active,
            )
            .await?;

        Ok(ApiResponse::success_with_message(
            DriverResponse::from(driver),
            "Conductor actualizado exitosamente".to_string(),
        ))
    }
}
