//! Controller del gestor de cola de conductores

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::dto::driver_dto::DriverResponse;
use crate::dto::queue_dto::{QueueNextResponse, QueueOrderResponse};
use crate::repositories::driver_repository::DriverRepository;
use crate::utils::errors::AppError;

pub struct QueueController {
    drivers: DriverRepository,
}

impl QueueController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            drivers: DriverRepository::new(pool),
        }
    }

    /// Próximo conductor elegible de la rotación, o null si no hay nadie
    /// disponible.
    pub async fn next(&self) -> Result<QueueNextResponse, AppError> {
        let driver = self.drivers.select_next().await?;
        Ok(QueueNextResponse {
            driver: driver.map(DriverResponse::from),
        })
    }

    /// Rotar la cola para que el conductor indicado quede primero.
    pub async fn advance(&self, driver_id: Uuid) -> Result<QueueOrderResponse, AppError> {
        let drivers = self.drivers.move_to_front(driver_id).await?;
        Ok(QueueOrderResponse {
            drivers: drivers.into_iter().map(DriverResponse::from).collect(),
        })
    }

    /// Renumerar 1..N preservando el orden actual.
    pub async fn renumber(&self) -> Result<QueueOrderResponse, AppError> {
        let drivers = self.drivers.renumber_all().await?;
        Ok(QueueOrderResponse {
            drivers: drivers.into_iter().map(DriverResponse::from).collect(),
        })
    }

    /// Siembra prioritaria de la cola desde configuración externa
    /// versionada. Operación administrativa de única vez, no lógica de
    /// negocio permanente.
    pub async fn seed(
        &self,
        version: &str,
        seeds: Vec<String>,
    ) -> Result<QueueOrderResponse, AppError> {
        if seeds.is_empty() {
            return Err(AppError::Validation(
                "seeds list must not be empty".to_string(),
            ));
        }

        info!("🌱 Aplicando siembra de cola versión '{}' ({} seeds)", version, seeds.len());
        let drivers = self.drivers.seed_priority(&seeds).await?;
        Ok(QueueOrderResponse {
            drivers: drivers.into_iter().map(DriverResponse::from).collect(),
        })
    }
}
