//! Modelo de AcceptanceToken
//!
//! Capacidad de un solo uso, con vencimiento, que liga una solicitud a la
//! acción de aceptación de un conductor vía deep link de mensajería.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// AcceptanceToken - mapea exactamente a la tabla acceptance_tokens.
///
/// Se borra en el primer uso exitoso. Un token presente con
/// `now > expire_at` se trata como inexistente a efectos de canje.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AcceptanceToken {
    pub token: String,
    pub booking_id: Uuid,
    pub expire_at: DateTime<Utc>,
}

impl AcceptanceToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expire_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token_expiring_at(expire_at: DateTime<Utc>) -> AcceptanceToken {
        AcceptanceToken {
            token: "abc123".to_string(),
            booking_id: Uuid::new_v4(),
            expire_at,
        }
    }

    #[test]
    fn test_not_expired_before_deadline() {
        let now = Utc::now();
        let token = token_expiring_at(now + Duration::hours(24));
        assert!(!token.is_expired(now));
    }

    #[test]
    fn test_expired_after_deadline() {
        let now = Utc::now();
        let token = token_expiring_at(now - Duration::seconds(1));
        assert!(token.is_expired(now));
    }

    #[test]
    fn test_exact_deadline_still_valid() {
        // El vencimiento es estricto: now > expire_at
        let now = Utc::now();
        let token = token_expiring_at(now);
        assert!(!token.is_expired(now));
    }
}
