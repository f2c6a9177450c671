//! DTOs de Driver

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::driver::Driver;

/// Request para registrar un conductor
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterDriverRequest {
    #[validate(length(min = 2, max = 100))]
    pub full_name: String,

    #[validate(length(min = 6, max = 20))]
    pub phone: String,

    /// Identidad de mensajería externa (p.ej. número de WhatsApp)
    pub external_identity: Option<String>,
}

/// Request para actualizar un conductor existente
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDriverRequest {
    #[validate(length(min = 2, max = 100))]
    pub full_name: Option<String>,

    #[validate(length(min = 6, max = 20))]
    pub phone: Option<String>,

    pub external_identity: Option<String>,
    pub active: Option<bool>,
}

/// Response de conductor para la API
#[derive(Debug, Serialize)]
pub struct DriverResponse {
    pub id: Uuid,
    pub full_name: String,
    pub phone: String,
    pub external_identity: Option<String>,
    pub active: bool,
    pub status: String,
    pub queue_order: i32,
}

impl From<Driver> for DriverResponse {
    fn from(driver: Driver) -> Self {
        Self {
            id: driver.id,
            full_name: driver.full_name,
            phone: driver.phone,
            external_identity: driver.external_identity,
            active: driver.active,
            status: driver.status,
            queue_order: driver.queue_order,
        }
    }
}
