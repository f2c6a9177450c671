//! DTOs del gestor de cola de conductores

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dto::driver_dto::DriverResponse;

/// Request para rotar un conductor al frente de la cola
#[derive(Debug, Deserialize)]
pub struct AdvanceQueueRequest {
    pub driver_id: Uuid,
}

/// Response de `GET /queue/next`: el próximo conductor elegible o null
#[derive(Debug, Serialize)]
pub struct QueueNextResponse {
    pub driver: Option<DriverResponse>,
}

/// Response con el orden completo de la cola tras una operación
#[derive(Debug, Serialize)]
pub struct QueueOrderResponse {
    pub drivers: Vec<DriverResponse>,
}

/// Request para la siembra prioritaria de la cola.
///
/// Los seeds llegan como configuración externa versionada; la operación
/// es idempotente y pensada para ejecutarse una sola vez por versión.
#[derive(Debug, Deserialize)]
pub struct SeedQueueRequest {
    pub version: String,
    pub seeds: Vec<String>,
}
