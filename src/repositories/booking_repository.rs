//! Repositorio de Booking
//!
//! Todas las transiciones de estado se escriben como updates condicionales
//! (`... WHERE status = $from`): dos actores concurrentes sobre la misma
//! solicitud nunca pueden ganar los dos. Cuando el update condicional no
//! afecta filas, se vuelve a leer la fila para diagnosticar y devolver el
//! error correcto sin haber mutado nada.

use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::acceptance_token::AcceptanceToken;
use crate::models::booking::{Booking, BookingStatus};
use crate::utils::errors::{not_found_error, state_conflict_error, AppError};

pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        request_code: String,
        requester_id: Uuid,
        purpose: String,
        destination: String,
        start_at: NaiveDateTime,
        end_at: NaiveDateTime,
        initial_status: BookingStatus,
    ) -> Result<Booking, AppError> {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings
                (id, request_code, requester_id, status, purpose, destination,
                 start_at, end_at, driver_attempts, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request_code)
        .bind(requester_id)
        .bind(initial_status.as_str())
        .bind(purpose)
        .bind(destination)
        .bind(start_at)
        .bind(end_at)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(booking)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, AppError> {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(booking)
    }

    pub async fn list(&self) -> Result<Vec<Booking>, AppError> {
        let bookings =
            sqlx::query_as::<_, Booking>("SELECT * FROM bookings ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(bookings)
    }

    /// Aprobar una solicitud pendiente de revisión.
    pub async fn approve(&self, id: Uuid) -> Result<Booking, AppError> {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings SET status = 'approved'
            WHERE id = $1 AND status IN ('requested', 'pending_retro')
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match booking {
            Some(b) => Ok(b),
            None => Err(self.diagnose(id, "approve booking").await),
        }
    }

    /// Rechazar una solicitud pendiente de revisión.
    pub async fn reject(&self, id: Uuid) -> Result<Booking, AppError> {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings SET status = 'rejected'
            WHERE id = $1 AND status IN ('requested', 'pending_retro')
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match booking {
            Some(b) => Ok(b),
            None => Err(self.diagnose(id, "reject booking").await),
        }
    }

    /// Asignar conductor y vehículo, reservando al conductor y emitiendo el
    /// token de aceptación, todo en una sola transacción. O se aplican los
    /// tres efectos (booking→ASSIGNED, driver→BUSY, token insertado) o
    /// ninguno.
    pub async fn assign(
        &self,
        id: Uuid,
        driver_id: Uuid,
        vehicle_id: Uuid,
        token: String,
        expire_at: DateTime<Utc>,
    ) -> Result<(Booking, AcceptanceToken), AppError> {
        let mut tx = self.pool.begin().await?;

        // Reservar al conductor: solo si sigue activo y disponible
        let reserved = sqlx::query(
            r#"
            UPDATE drivers SET status = 'busy'
            WHERE id = $1 AND active = TRUE AND status = 'available'
            "#,
        )
        .bind(driver_id)
        .execute(&mut *tx)
        .await?;

        if reserved.rows_affected() == 0 {
            return Err(state_conflict_error(
                "assign driver",
                "driver is not available",
            ));
        }

        let booking = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings SET status = 'assigned', driver_id = $2, vehicle_id = $3
            WHERE id = $1 AND status IN ('approved', 'requested')
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(driver_id)
        .bind(vehicle_id)
        .fetch_optional(&mut *tx)
        .await?;

        let booking = match booking {
            Some(b) => b,
            // Rollback implícito: el conductor no queda reservado
            None => return Err(self.diagnose(id, "assign booking").await),
        };

        let token_row = sqlx::query_as::<_, AcceptanceToken>(
            r#"
            INSERT INTO acceptance_tokens (token, booking_id, expire_at)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(token)
        .bind(id)
        .bind(expire_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((booking, token_row))
    }

    /// Auto-reclamo: el conductor acepta sin pasar por el token, por match
    /// directo de identificador contra `booking.driver_id`.
    pub async fn self_claim(&self, id: Uuid, driver_id: Uuid) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await?;

        let booking = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET status = 'accepted',
                driver_accepted_at = $3,
                driver_attempts = driver_attempts + 1
            WHERE id = $1 AND driver_id = $2 AND status IN ('assigned', 'requested')
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(driver_id)
        .bind(Utc::now())
        .fetch_optional(&mut *tx)
        .await?;

        let booking = match booking {
            Some(b) => b,
            None => return Err(self.diagnose(id, "accept booking").await),
        };

        sqlx::query("UPDATE drivers SET status = 'available' WHERE id = $1")
            .bind(driver_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(booking)
    }

    /// Registrar kilometraje de salida: ACCEPTED → STARTED, solo si aún no
    /// se registró un valor.
    pub async fn start_mileage(&self, id: Uuid, start_mileage: i32) -> Result<Booking, AppError> {
        if start_mileage < 0 {
            return Err(AppError::Validation(
                "start_mileage must be a non-negative number".to_string(),
            ));
        }

        let booking = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings SET status = 'started', start_mileage = $2
            WHERE id = $1 AND status = 'accepted' AND start_mileage IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(start_mileage)
        .fetch_optional(&self.pool)
        .await?;

        match booking {
            Some(b) => Ok(b),
            None => {
                let current = self
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| not_found_error("Booking", &id.to_string()))?;
                if current.start_mileage.is_some() {
                    Err(AppError::Validation(
                        "start mileage already recorded".to_string(),
                    ))
                } else {
                    Err(state_conflict_error(
                        "record start mileage",
                        &format!("booking is in status '{}'", current.status),
                    ))
                }
            }
        }
    }

    /// Registrar kilometraje de llegada: STARTED → COMPLETED y el conductor
    /// vuelve a AVAILABLE, en una sola transacción. El guard
    /// `end_mileage >= start_mileage` va también en el WHERE para cubrir la
    /// carrera contra otro cierre concurrente.
    pub async fn finish_mileage(&self, id: Uuid, end_mileage: i32) -> Result<Booking, AppError> {
        if end_mileage < 0 {
            return Err(AppError::Validation(
                "end_mileage must be a non-negative number".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let booking = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET status = 'completed', end_mileage = $2, completed_at = $3
            WHERE id = $1 AND status = 'started'
              AND start_mileage IS NOT NULL AND $2 >= start_mileage
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(end_mileage)
        .bind(Utc::now())
        .fetch_optional(&mut *tx)
        .await?;

        let booking = match booking {
            Some(b) => b,
            None => {
                let current = self
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| not_found_error("Booking", &id.to_string()))?;
                if let Some(start) = current.start_mileage {
                    if end_mileage < start {
                        return Err(AppError::Validation(format!(
                            "end_mileage ({}) must be >= start_mileage ({})",
                            end_mileage, start
                        )));
                    }
                }
                return Err(state_conflict_error(
                    "finish trip",
                    &format!("booking is in status '{}'", current.status),
                ));
            }
        };

        if let Some(driver_id) = booking.driver_id {
            sqlx::query("UPDATE drivers SET status = 'available' WHERE id = $1")
                .bind(driver_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(booking)
    }

    /// Cancelación por el solicitante: cualquier estado no terminal.
    pub async fn cancel(&self, id: Uuid, requester_id: Uuid) -> Result<Booking, AppError> {
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Booking", &id.to_string()))?;

        if current.requester_id != requester_id {
            return Err(AppError::Forbidden(
                "only the requester can cancel this booking".to_string(),
            ));
        }

        let booking = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings SET status = 'cancelled'
            WHERE id = $1 AND status NOT IN ('completed', 'cancelled')
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match booking {
            Some(b) => Ok(b),
            None => Err(self.diagnose(id, "cancel booking").await),
        }
    }

    /// Releer la fila tras un update condicional fallido y construir el
    /// error apropiado: NotFound si no existe, StateConflict si el guard
    /// de estado falló.
    async fn diagnose(&self, id: Uuid, operation: &str) -> AppError {
        match self.find_by_id(id).await {
            Ok(Some(current)) => state_conflict_error(
                operation,
                &format!("booking is in status '{}'", current.status),
            ),
            Ok(None) => not_found_error("Booking", &id.to_string()),
            Err(e) => e,
        }
    }
}
