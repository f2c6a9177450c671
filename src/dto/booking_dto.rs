//! DTOs de Booking
//!
//! Requests y responses del ciclo de vida de una solicitud de vehículo.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::booking::Booking;
use crate::utils::offhours::is_off_hours;

/// Request para crear una solicitud de viaje
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    #[validate(length(min = 3, max = 200))]
    pub purpose: String,

    #[validate(length(min = 3, max = 200))]
    pub destination: String,

    pub start_at: NaiveDateTime,
    pub end_at: NaiveDateTime,
}

/// Request para asignar conductor y vehículo a una solicitud
#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub driver_id: Uuid,
    pub vehicle_id: Uuid,
}

/// Request para registrar el kilometraje de salida
#[derive(Debug, Deserialize)]
pub struct MileageStartRequest {
    pub booking_id: Uuid,
    pub start_mileage: i32,
}

/// Request para registrar el kilometraje de llegada y cerrar el viaje
#[derive(Debug, Deserialize)]
pub struct MileageFinishRequest {
    pub booking_id: Uuid,
    pub start_mileage: i32,
    pub end_mileage: i32,
}

/// Response de solicitud para la API
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub request_code: String,
    pub requester_id: Uuid,
    pub status: String,
    pub vehicle_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub purpose: String,
    pub destination: String,
    pub start_at: NaiveDateTime,
    pub end_at: NaiveDateTime,
    pub start_mileage: Option<i32>,
    pub end_mileage: Option<i32>,
    pub driver_attempts: i32,
    /// Flag informativo: el viaje comienza fuera del horario hábil
    pub off_hours: bool,
    pub driver_accepted_at: Option<String>,
    pub completed_at: Option<String>,
    pub created_at: String,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        let off_hours = is_off_hours(booking.start_at);
        Self {
            id: booking.id,
            request_code: booking.request_code,
            requester_id: booking.requester_id,
            status: booking.status,
            vehicle_id: booking.vehicle_id,
            driver_id: booking.driver_id,
            purpose: booking.purpose,
            destination: booking.destination,
            start_at: booking.start_at,
            end_at: booking.end_at,
            start_mileage: booking.start_mileage,
            end_mileage: booking.end_mileage,
            driver_attempts: booking.driver_attempts,
            off_hours,
            driver_accepted_at: booking.driver_accepted_at.map(|t| t.to_rfc3339()),
            completed_at: booking.completed_at.map(|t| t.to_rfc3339()),
            created_at: booking.created_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn booking_starting_at(start_at: NaiveDateTime) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            request_code: "VR-20260829-TEST".to_string(),
            requester_id: Uuid::new_v4(),
            status: "requested".to_string(),
            vehicle_id: None,
            driver_id: None,
            purpose: "Traslado de documentación".to_string(),
            destination: "Oficina regional".to_string(),
            start_at,
            end_at: start_at,
            start_mileage: None,
            end_mileage: None,
            driver_attempts: 0,
            driver_accepted_at: None,
            completed_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_off_hours_flag_stamped_on_response() {
        // Domingo al mediodía
        let sunday = NaiveDate::from_ymd_opt(2026, 8, 30)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let response = BookingResponse::from(booking_starting_at(sunday));
        assert!(response.off_hours);

        // Martes 10:00
        let tuesday = NaiveDate::from_ymd_opt(2026, 8, 25)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let response = BookingResponse::from(booking_starting_at(tuesday));
        assert!(!response.off_hours);
    }
}
