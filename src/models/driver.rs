//! Modelo de Driver
//!
//! Este módulo contiene el struct Driver y el enum de estados del
//! conductor. Mapea exactamente a la tabla drivers del schema.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Estado operativo de un conductor
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DriverStatus {
    Available,
    Busy,
    Off,
}

impl DriverStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverStatus::Available => "available",
            DriverStatus::Busy => "busy",
            DriverStatus::Off => "off",
        }
    }

    pub fn parse_str(value: &str) -> Option<Self> {
        match value {
            "available" => Some(DriverStatus::Available),
            "busy" => Some(DriverStatus::Busy),
            "off" => Some(DriverStatus::Off),
            _ => None,
        }
    }
}

/// Driver principal - mapea exactamente a la tabla drivers
///
/// Invariante: entre los conductores con `active = true`, los valores de
/// `queue_order` forman una permutación densa de 1..N.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Driver {
    pub id: Uuid,
    pub full_name: String,
    pub phone: String,
    /// Identidad de mensajería externa; globalmente única cuando existe
    pub external_identity: Option<String>,
    pub active: bool,
    pub status: String,
    pub queue_order: i32,
}

impl Driver {
    pub fn status_enum(&self) -> Option<DriverStatus> {
        DriverStatus::parse_str(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in [DriverStatus::Available, DriverStatus::Busy, DriverStatus::Off] {
            assert_eq!(DriverStatus::parse_str(status.as_str()), Some(status));
        }
        assert_eq!(DriverStatus::parse_str("resting"), None);
    }
}
