//! Repositorio de Driver y gestor de cola de rotación
//!
//! Todas las operaciones que tocan varias filas (rotación, renumeración,
//! siembra prioritaria) se ejecutan como un único batch atómico dentro de
//! una transacción. Un loop de updates individuales rompería la invariante
//! de permutación densa si el proceso cae a mitad de camino.

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::driver::{Driver, DriverStatus};
use crate::utils::errors::{not_found_error, AppError};

/// Rotar `ids` cíclicamente para que `target` quede primero.
///
/// Los predecesores del target pasan a la cola conservando su orden
/// relativo original. Devuelve None si el target no está en la lista.
fn rotate_to_front(ids: &[Uuid], target: Uuid) -> Option<Vec<Uuid>> {
    let pos = ids.iter().position(|id| *id == target)?;
    let mut rotated = Vec::with_capacity(ids.len());
    rotated.extend_from_slice(&ids[pos..]);
    rotated.extend_from_slice(&ids[..pos]);
    Some(rotated)
}

/// Ajuste de cola que exige un cambio del flag `active`.
#[derive(Debug, PartialEq, Eq)]
enum QueueAdjustment {
    /// La membresía no cambia: el orden no se toca
    None,
    /// Desactivación: queda un hueco en 1..N, se renumera
    Renumber,
    /// Reactivación: el orden viejo puede estar repetido, entra al final
    AppendToTail,
}

fn queue_adjustment(currently_active: bool, requested: Option<bool>) -> QueueAdjustment {
    match requested {
        Some(false) if currently_active => QueueAdjustment::Renumber,
        Some(true) if !currently_active => QueueAdjustment::AppendToTail,
        _ => QueueAdjustment::None,
    }
}

/// Calcular el orden sembrado: primero los conductores cuyo nombre contiene
/// cada seed (en orden de seeds), después el resto en su orden actual.
fn seeded_order(drivers: &[(Uuid, String)], seeds: &[String]) -> Vec<Uuid> {
    let mut placed = vec![false; drivers.len()];
    let mut ordered = Vec::with_capacity(drivers.len());

    for seed in seeds {
        for (i, (id, name)) in drivers.iter().enumerate() {
            if !placed[i] && name.contains(seed.as_str()) {
                placed[i] = true;
                ordered.push(*id);
            }
        }
    }
    for (i, (id, _)) in drivers.iter().enumerate() {
        if !placed[i] {
            ordered.push(*id);
        }
    }
    ordered
}

/// Clave del advisory lock que serializa toda mutación de la cola.
const QUEUE_LOCK_KEY: i64 = 0x464c4f5441;

pub struct DriverRepository {
    pool: PgPool,
}

impl DriverRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Registrar un conductor. Entra al final de la cola:
    /// `queue_order = max(queue_order) + 1` calculado en el mismo INSERT.
    /// El lock de cola impide que dos registros concurrentes lean el mismo
    /// máximo y dupliquen un rango.
    pub async fn create(
        &self,
        full_name: String,
        phone: String,
        external_identity: Option<String>,
    ) -> Result<Driver, AppError> {
        let mut tx = self.pool.begin().await?;
        Self::lock_queue(&mut tx).await?;

        // La identidad externa es globalmente única: se limpia de
        // cualquier titular previo antes de asignarla
        if let Some(identity) = &external_identity {
            sqlx::query("UPDATE drivers SET external_identity = NULL WHERE external_identity = $1")
                .bind(identity)
                .execute(&mut *tx)
                .await?;
        }

        let driver = sqlx::query_as::<_, Driver>(
            r#"
            INSERT INTO drivers (id, full_name, phone, external_identity, active, status, queue_order)
            VALUES ($1, $2, $3, $4, TRUE, 'available',
                    (SELECT COALESCE(MAX(queue_order), 0) + 1 FROM drivers WHERE active = TRUE))
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(full_name)
        .bind(phone)
        .bind(external_identity)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(driver)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Driver>, AppError> {
        let driver = sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(driver)
    }

    pub async fn find_by_external_identity(
        &self,
        external_identity: &str,
    ) -> Result<Option<Driver>, AppError> {
        let driver =
            sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE external_identity = $1")
                .bind(external_identity)
                .fetch_optional(&self.pool)
                .await?;
        Ok(driver)
    }

    pub async fn list_by_queue_order(&self) -> Result<Vec<Driver>, AppError> {
        let drivers = sqlx::query_as::<_, Driver>(
            "SELECT * FROM drivers WHERE active = TRUE ORDER BY queue_order ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(drivers)
    }

    /// Actualizar datos de un conductor. Si se asigna una identidad externa
    /// ya en uso, primero se limpia del titular anterior; si cambia la
    /// membresía en la cola (activar/desactivar), el orden se ajusta en la
    /// misma transacción para mantener la permutación densa 1..N.
    pub async fn update(
        &self,
        id: Uuid,
        full_name: Option<String>,
        phone: Option<String>,
        external_identity: Option<String>,
        active: Option<bool>,
    ) -> Result<Driver, AppError> {
        let mut tx = self.pool.begin().await?;
        Self::lock_queue(&mut tx).await?;

        let current = sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| not_found_error("Driver", &id.to_string()))?;

        if let Some(identity) = &external_identity {
            sqlx::query(
                "UPDATE drivers SET external_identity = NULL WHERE external_identity = $1 AND id <> $2",
            )
            .bind(identity)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }

        let adjustment = queue_adjustment(current.active, active);

        let driver = sqlx::query_as::<_, Driver>(
            r#"
            UPDATE drivers
            SET full_name = $2, phone = $3, external_identity = $4, active = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(full_name.unwrap_or(current.full_name))
        .bind(phone.unwrap_or(current.phone))
        .bind(external_identity.or(current.external_identity))
        .bind(active.unwrap_or(current.active))
        .fetch_one(&mut *tx)
        .await?;

        let driver = match adjustment {
            // Desactivar deja un hueco en 1..N; se repara antes de commitear
            QueueAdjustment::Renumber => {
                Self::renumber_in_tx(&mut tx).await?;
                driver
            }
            // Reactivar con el queue_order viejo duplicaría un rango que la
            // renumeración ya reasignó: el conductor vuelve al final
            QueueAdjustment::AppendToTail => {
                sqlx::query_as::<_, Driver>(
                    r#"
                    UPDATE drivers
                    SET queue_order = (SELECT COALESCE(MAX(queue_order), 0) + 1
                                       FROM drivers
                                       WHERE active = TRUE AND id <> $1)
                    WHERE id = $1
                    RETURNING *
                    "#,
                )
                .bind(id)
                .fetch_one(&mut *tx)
                .await?
            }
            QueueAdjustment::None => driver,
        };

        tx.commit().await?;
        Ok(driver)
    }

    /// Próximo conductor elegible: activo, disponible y con el menor
    /// `queue_order`. No hay empates posibles porque los órdenes son únicos.
    pub async fn select_next(&self) -> Result<Option<Driver>, AppError> {
        let driver = sqlx::query_as::<_, Driver>(
            r#"
            SELECT * FROM drivers
            WHERE active = TRUE AND status = 'available'
            ORDER BY queue_order ASC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(driver)
    }

    /// Rotar la cola para que `driver_id` quede en la posición 1.
    ///
    /// El conductor debe estar en el conjunto elegible (activo y
    /// disponible); si no, se reporta NotFound. Si ya es el primero del
    /// conjunto elegible la operación es un no-op, lo que la hace
    /// idempotente.
    pub async fn move_to_front(&self, driver_id: Uuid) -> Result<Vec<Driver>, AppError> {
        let mut tx = self.pool.begin().await?;
        Self::lock_queue(&mut tx).await?;

        let all_active = sqlx::query_as::<_, Driver>(
            "SELECT * FROM drivers WHERE active = TRUE ORDER BY queue_order ASC FOR UPDATE",
        )
        .fetch_all(&mut *tx)
        .await?;

        let eligible_first = all_active
            .iter()
            .find(|d| d.status_enum() == Some(DriverStatus::Available));
        let in_eligible_set = all_active
            .iter()
            .any(|d| d.id == driver_id && d.status_enum() == Some(DriverStatus::Available));

        if !in_eligible_set {
            return Err(not_found_error("Driver in rotation queue", &driver_id.to_string()));
        }

        if eligible_first.map(|d| d.id) != Some(driver_id) {
            let ids: Vec<Uuid> = all_active.iter().map(|d| d.id).collect();
            let rotated = rotate_to_front(&ids, driver_id)
                .ok_or_else(|| not_found_error("Driver", &driver_id.to_string()))?;
            Self::apply_order_in_tx(&mut tx, &rotated).await?;
        }

        let drivers = sqlx::query_as::<_, Driver>(
            "SELECT * FROM drivers WHERE active = TRUE ORDER BY queue_order ASC",
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(drivers)
    }

    /// Reasignar 1..N preservando el orden actual; repara huecos dejados
    /// por desactivaciones. Un único statement, atómico por sí mismo.
    pub async fn renumber_all(&self) -> Result<Vec<Driver>, AppError> {
        let mut tx = self.pool.begin().await?;
        Self::lock_queue(&mut tx).await?;
        Self::renumber_in_tx(&mut tx).await?;

        let drivers = sqlx::query_as::<_, Driver>(
            "SELECT * FROM drivers WHERE active = TRUE ORDER BY queue_order ASC",
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(drivers)
    }

    /// Siembra prioritaria de la cola a partir de una lista de seeds
    /// provista externamente. Idempotente: aplicarla dos veces con los
    /// mismos seeds produce el mismo orden final.
    pub async fn seed_priority(&self, seeds: &[String]) -> Result<Vec<Driver>, AppError> {
        let mut tx = self.pool.begin().await?;
        Self::lock_queue(&mut tx).await?;

        let all_active: Vec<(Uuid, String)> = sqlx::query_as(
            "SELECT id, full_name FROM drivers WHERE active = TRUE ORDER BY queue_order ASC FOR UPDATE",
        )
        .fetch_all(&mut *tx)
        .await?;

        let ordered = seeded_order(&all_active, seeds);
        Self::apply_order_in_tx(&mut tx, &ordered).await?;

        let drivers = sqlx::query_as::<_, Driver>(
            "SELECT * FROM drivers WHERE active = TRUE ORDER BY queue_order ASC",
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(drivers)
    }

    /// Recuperación diaria: conductores en BUSY sin ninguna solicitud viva
    /// vuelven a AVAILABLE. Compensa flujos abandonados a mitad de camino.
    pub async fn reset_stuck(&self) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE drivers SET status = 'available'
            WHERE status = 'busy'
              AND id NOT IN (
                  SELECT driver_id FROM bookings
                  WHERE driver_id IS NOT NULL
                    AND status IN ('assigned', 'accepted', 'started')
              )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Serializar las mutaciones de la cola dentro de la transacción.
    /// El lock se libera solo en el commit o rollback.
    async fn lock_queue(tx: &mut Transaction<'_, Postgres>) -> Result<(), AppError> {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(QUEUE_LOCK_KEY)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Escribir el nuevo orden completo como un solo UPDATE via unnest.
    async fn apply_order_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        ordered_ids: &[Uuid],
    ) -> Result<(), AppError> {
        let ids: Vec<Uuid> = ordered_ids.to_vec();
        let orders: Vec<i32> = (1..=ids.len() as i32).collect();

        sqlx::query(
            r#"
            UPDATE drivers SET queue_order = v.ord
            FROM (SELECT UNNEST($1::uuid[]) AS id, UNNEST($2::int4[]) AS ord) AS v
            WHERE drivers.id = v.id
            "#,
        )
        .bind(&ids)
        .bind(&orders)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn renumber_in_tx(tx: &mut Transaction<'_, Postgres>) -> Result<(), AppError> {
        sqlx::query(
            r#"
            WITH ranked AS (
                SELECT id, ROW_NUMBER() OVER (ORDER BY queue_order ASC, id ASC) AS rn
                FROM drivers WHERE active = TRUE
            )
            UPDATE drivers SET queue_order = ranked.rn
            FROM ranked WHERE drivers.id = ranked.id
            "#,
        )
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn test_rotate_moves_target_to_front() {
        // [D1, D2, D3] con moveToFront(D3) → [D3, D1, D2]
        let queue = ids(3);
        let rotated = rotate_to_front(&queue, queue[2]).unwrap();
        assert_eq!(rotated, vec![queue[2], queue[0], queue[1]]);
    }

    #[test]
    fn test_rotate_preserves_relative_order_of_successors() {
        let queue = ids(5);
        let rotated = rotate_to_front(&queue, queue[1]).unwrap();
        assert_eq!(
            rotated,
            vec![queue[1], queue[2], queue[3], queue[4], queue[0]]
        );
    }

    #[test]
    fn test_rotate_is_idempotent() {
        let queue = ids(4);
        let once = rotate_to_front(&queue, queue[2]).unwrap();
        let twice = rotate_to_front(&once, queue[2]).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_rotate_unknown_driver_is_none() {
        let queue = ids(3);
        assert!(rotate_to_front(&queue, Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_rotate_front_is_noop() {
        let queue = ids(3);
        let rotated = rotate_to_front(&queue, queue[0]).unwrap();
        assert_eq!(rotated, queue);
    }

    #[test]
    fn test_seeded_order_front_loads_matches_in_seed_order() {
        let drivers: Vec<(Uuid, String)> = vec![
            (Uuid::new_v4(), "Carlos Pérez".to_string()),
            (Uuid::new_v4(), "Ana Gómez".to_string()),
            (Uuid::new_v4(), "Luis Mendoza".to_string()),
            (Uuid::new_v4(), "Marta Díaz".to_string()),
        ];
        let seeds = vec!["Mendoza".to_string(), "Pérez".to_string()];

        let ordered = seeded_order(&drivers, &seeds);
        assert_eq!(
            ordered,
            vec![drivers[2].0, drivers[0].0, drivers[1].0, drivers[3].0]
        );
    }

    #[test]
    fn test_seeded_order_is_idempotent_and_complete() {
        let drivers: Vec<(Uuid, String)> = vec![
            (Uuid::new_v4(), "Carlos Pérez".to_string()),
            (Uuid::new_v4(), "Ana Gómez".to_string()),
        ];
        let seeds = vec!["Gómez".to_string()];

        let first = seeded_order(&drivers, &seeds);
        assert_eq!(first.len(), drivers.len());

        let reordered: Vec<(Uuid, String)> = first
            .iter()
            .map(|id| drivers.iter().find(|d| d.0 == *id).unwrap().clone())
            .collect();
        let second = seeded_order(&reordered, &seeds);
        assert_eq!(first, second);
    }

    #[test]
    fn test_deactivation_renumbers_queue() {
        assert_eq!(queue_adjustment(true, Some(false)), QueueAdjustment::Renumber);
    }

    #[test]
    fn test_reactivation_appends_to_tail() {
        // Con D1:1, D2:2, D3:3, desactivar D2 renumera a D1:1, D3:2;
        // reactivar D2 con su orden viejo (2) duplicaría el rango de D3.
        // La reactivación tiene que reubicar al conductor, nunca dejarlo
        // con el orden stale.
        assert_eq!(
            queue_adjustment(false, Some(true)),
            QueueAdjustment::AppendToTail
        );
    }

    #[test]
    fn test_no_membership_change_keeps_order() {
        assert_eq!(queue_adjustment(true, Some(true)), QueueAdjustment::None);
        assert_eq!(queue_adjustment(false, Some(false)), QueueAdjustment::None);
        assert_eq!(queue_adjustment(true, None), QueueAdjustment::None);
        assert_eq!(queue_adjustment(false, None), QueueAdjustment::None);
    }

    #[test]
    fn test_seeded_order_driver_matches_first_seed_only() {
        // Un conductor que matchea dos seeds se coloca una sola vez
        let drivers: Vec<(Uuid, String)> =
            vec![(Uuid::new_v4(), "Ana María Gómez".to_string())];
        let seeds = vec!["Ana".to_string(), "Gómez".to_string()];

        let ordered = seeded_order(&drivers, &seeds);
        assert_eq!(ordered.len(), 1);
    }
}
