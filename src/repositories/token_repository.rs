//! Repositorio de AcceptanceToken
//!
//! El canje toca tres entidades (token, booking, driver). Todo el flujo
//! corre dentro de una única transacción: o el set completo de efectos se
//! aplica (booking→ACCEPTED, driver→AVAILABLE, token borrado) o ninguno.
//! Un token borrado con un booking sin transicionar sería un bug de
//! correctitud, no una carrera aceptable.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::acceptance_token::AcceptanceToken;
use crate::models::booking::Booking;
use crate::models::driver::Driver;
use crate::utils::errors::{state_conflict_error, AppError};

/// Pasos 1-2 del canje: el token debe existir y no estar vencido. Un token
/// ya consumido fue borrado, así que el segundo canje cae siempre en
/// NotFound.
fn check_token(
    token_row: Option<AcceptanceToken>,
    now: DateTime<Utc>,
) -> Result<AcceptanceToken, AppError> {
    let token_row =
        token_row.ok_or_else(|| AppError::NotFound("invalid acceptance token".to_string()))?;
    if token_row.is_expired(now) {
        return Err(AppError::ExpiredToken(
            "acceptance link has expired".to_string(),
        ));
    }
    Ok(token_row)
}

/// Paso 3: la identidad externa debe resolver a un conductor y ese
/// conductor debe ser el asignado a la solicitud.
fn check_identity(
    driver: Option<Driver>,
    assigned_driver_id: Option<Uuid>,
) -> Result<Driver, AppError> {
    let driver = driver.ok_or_else(|| {
        AppError::Forbidden("no driver matches this messaging identity".to_string())
    })?;
    if assigned_driver_id != Some(driver.id) {
        return Err(AppError::Forbidden(
            "this booking is assigned to a different driver".to_string(),
        ));
    }
    Ok(driver)
}

pub struct TokenRepository {
    pool: PgPool,
}

impl TokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Canjear un token: validar, transicionar el booking a ACCEPTED,
    /// liberar al conductor y consumir (borrar) el token.
    ///
    /// Orden de validación:
    /// 1. token inexistente → NotFound
    /// 2. token vencido → ExpiredToken (sin mutación; lo junta el GC)
    /// 3. identidad externa sin conductor o distinta del asignado → Forbidden
    /// 4. transición condicional + update de driver + DELETE del token
    pub async fn redeem(
        &self,
        token: &str,
        caller_external_identity: &str,
    ) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await?;

        // FOR UPDATE: dos canjes concurrentes del mismo token se serializan
        // y el segundo ya no lo encuentra
        let token_row = sqlx::query_as::<_, AcceptanceToken>(
            "SELECT * FROM acceptance_tokens WHERE token = $1 FOR UPDATE",
        )
        .bind(token)
        .fetch_optional(&mut *tx)
        .await?;
        let token_row = check_token(token_row, Utc::now())?;

        let caller = sqlx::query_as::<_, Driver>(
            "SELECT * FROM drivers WHERE external_identity = $1",
        )
        .bind(caller_external_identity)
        .fetch_optional(&mut *tx)
        .await?;

        let booking = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE id = $1 FOR UPDATE",
        )
        .bind(token_row.booking_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("booking for this token no longer exists".to_string()))?;

        let driver = check_identity(caller, booking.driver_id)?;

        let accepted = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET status = 'accepted',
                driver_accepted_at = $2,
                driver_attempts = driver_attempts + 1
            WHERE id = $1 AND status = 'assigned'
            RETURNING *
            "#,
        )
        .bind(booking.id)
        .bind(Utc::now())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            state_conflict_error(
                "accept booking",
                &format!("booking is in status '{}'", booking.status),
            )
        })?;

        sqlx::query("UPDATE drivers SET status = 'available' WHERE id = $1")
            .bind(driver.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM acceptance_tokens WHERE token = $1")
            .bind(token)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(accepted)
    }

    /// Garbage collection de tokens vencidos; corre con el job diario.
    pub async fn delete_expired(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM acceptance_tokens WHERE expire_at < $1")
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
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

    fn driver_with_identity(identity: &str) -> Driver {
        Driver {
            id: Uuid::new_v4(),
            full_name: "Carlos Pérez".to_string(),
            phone: "5491155550000".to_string(),
            external_identity: Some(identity.to_string()),
            active: true,
            status: "busy".to_string(),
            queue_order: 1,
        }
    }

    #[test]
    fn test_consumed_token_is_not_found() {
        // El token se borra al consumirse: el segundo canje no lo
        // encuentra y recibe NotFound, nunca un éxito silencioso
        let err = check_token(None, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_expired_token_is_reported_distinctly() {
        let now = Utc::now();
        let token = token_expiring_at(now - Duration::hours(1));
        let err = check_token(Some(token), now).unwrap_err();
        assert!(matches!(err, AppError::ExpiredToken(_)));
    }

    #[test]
    fn test_valid_token_passes() {
        let now = Utc::now();
        let token = token_expiring_at(now + Duration::hours(24));
        assert!(check_token(Some(token), now).is_ok());
    }

    #[test]
    fn test_unknown_identity_is_forbidden() {
        let err = check_identity(None, Some(Uuid::new_v4())).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn test_identity_mismatch_is_forbidden() {
        let caller = driver_with_identity("549112345678");
        let other_driver = Uuid::new_v4();
        let err = check_identity(Some(caller), Some(other_driver)).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn test_unassigned_booking_is_forbidden() {
        let caller = driver_with_identity("549112345678");
        let err = check_identity(Some(caller), None).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn test_assigned_driver_passes() {
        let caller = driver_with_identity("549112345678");
        let id = caller.id;
        let driver = check_identity(Some(caller), Some(id)).unwrap();
        assert_eq!(driver.id, id);
    }
}
