//! Modelo de Booking
//!
//! Este módulo contiene el struct Booking, el enum de estados y la tabla
//! de transiciones del ciclo de vida de una solicitud de vehículo.
//! Mapea exactamente al schema PostgreSQL con primary key 'id'.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Estado de una solicitud de vehículo.
///
/// Se persiste como TEXT; `as_str`/`parse_str` son la única conversión.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Creada por el solicitante
    Requested,
    /// Entrada retroactiva cargada por un administrador
    PendingRetro,
    Approved,
    Assigned,
    Accepted,
    Started,
    Completed,
    Cancelled,
    Rejected,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Requested => "requested",
            BookingStatus::PendingRetro => "pending_retro",
            BookingStatus::Approved => "approved",
            BookingStatus::Assigned => "assigned",
            BookingStatus::Accepted => "accepted",
            BookingStatus::Started => "started",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Rejected => "rejected",
        }
    }

    pub fn parse_str(value: &str) -> Option<Self> {
        match value {
            "requested" => Some(BookingStatus::Requested),
            "pending_retro" => Some(BookingStatus::PendingRetro),
            "approved" => Some(BookingStatus::Approved),
            "assigned" => Some(BookingStatus::Assigned),
            "accepted" => Some(BookingStatus::Accepted),
            "started" => Some(BookingStatus::Started),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            "rejected" => Some(BookingStatus::Rejected),
            _ => None,
        }
    }

    /// Estados terminales: no admiten ninguna mutación posterior.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Completed | BookingStatus::Cancelled | BookingStatus::Rejected
        )
    }

    /// Estados desde los que un administrador puede aprobar o rechazar.
    pub fn can_review(&self) -> bool {
        matches!(self, BookingStatus::Requested | BookingStatus::PendingRetro)
    }

    /// Estados desde los que se puede asignar conductor y vehículo.
    pub fn can_assign(&self) -> bool {
        matches!(self, BookingStatus::Approved | BookingStatus::Requested)
    }

    /// Estados desde los que un conductor puede aceptar. El camino con
    /// token exige `Assigned`; el auto-reclamo directo admite también
    /// `Requested` cuando el conductor ya figura asignado.
    pub fn can_accept(&self, via_token: bool) -> bool {
        if via_token {
            matches!(self, BookingStatus::Assigned)
        } else {
            matches!(self, BookingStatus::Assigned | BookingStatus::Requested)
        }
    }

    /// El solicitante puede cancelar cualquier estado no terminal.
    pub fn can_cancel(&self) -> bool {
        !matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }
}

/// Booking principal - mapea exactamente a la tabla bookings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub request_code: String,
    pub requester_id: Uuid,
    pub status: String,
    pub vehicle_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub purpose: String,
    pub destination: String,
    // Hora civil local, sin conversión de zona horaria
    pub start_at: NaiveDateTime,
    pub end_at: NaiveDateTime,
    pub start_mileage: Option<i32>,
    pub end_mileage: Option<i32>,
    pub driver_attempts: i32,
    pub driver_accepted_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn status_enum(&self) -> Option<BookingStatus> {
        BookingStatus::parse_str(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in [
            BookingStatus::Requested,
            BookingStatus::PendingRetro,
            BookingStatus::Approved,
            BookingStatus::Assigned,
            BookingStatus::Accepted,
            BookingStatus::Started,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
            BookingStatus::Rejected,
        ] {
            assert_eq!(BookingStatus::parse_str(status.as_str()), Some(status));
        }
        assert_eq!(BookingStatus::parse_str("en_route"), None);
    }

    #[test]
    fn test_review_only_from_initial_states() {
        assert!(BookingStatus::Requested.can_review());
        assert!(BookingStatus::PendingRetro.can_review());
        assert!(!BookingStatus::Approved.can_review());
        assert!(!BookingStatus::Assigned.can_review());
        assert!(!BookingStatus::Completed.can_review());
    }

    #[test]
    fn test_assign_from_approved_or_requested() {
        assert!(BookingStatus::Approved.can_assign());
        assert!(BookingStatus::Requested.can_assign());
        assert!(!BookingStatus::Assigned.can_assign());
        assert!(!BookingStatus::Cancelled.can_assign());
    }

    #[test]
    fn test_token_accept_requires_assigned() {
        assert!(BookingStatus::Assigned.can_accept(true));
        assert!(!BookingStatus::Requested.can_accept(true));
        // Reintentos sobre una solicitud ya aceptada se rechazan,
        // nunca se aceptan en silencio
        assert!(!BookingStatus::Accepted.can_accept(true));
        assert!(!BookingStatus::Started.can_accept(true));
        assert!(!BookingStatus::Completed.can_accept(true));
    }

    #[test]
    fn test_self_claim_also_allows_requested() {
        assert!(BookingStatus::Assigned.can_accept(false));
        assert!(BookingStatus::Requested.can_accept(false));
        assert!(!BookingStatus::Accepted.can_accept(false));
    }

    #[test]
    fn test_cancel_blocked_on_completed_and_cancelled() {
        assert!(!BookingStatus::Completed.can_cancel());
        assert!(!BookingStatus::Cancelled.can_cancel());
        // Un viaje iniciado todavía se puede cancelar
        assert!(BookingStatus::Started.can_cancel());
        assert!(BookingStatus::Requested.can_cancel());
    }

    #[test]
    fn test_terminal_states() {
        assert!(BookingStatus::Completed.is_terminal());
        assert!(BookingStatus::Cancelled.is_terminal());
        assert!(BookingStatus::Rejected.is_terminal());
        assert!(!BookingStatus::Started.is_terminal());
    }
}
