//! Job diario de recuperación
//!
//! Único mecanismo de auto-reparación del sistema: devuelve a AVAILABLE a
//! los conductores que quedaron BUSY sin ninguna solicitud viva (flujos
//! abandonados) y borra los tokens de aceptación vencidos. Corre una vez
//! por día a la hora local configurada.

use chrono::{Local, NaiveTime, Timelike};
use sqlx::PgPool;
use std::time::Duration;
use tracing::{error, info};

use crate::repositories::driver_repository::DriverRepository;
use crate::repositories::token_repository::TokenRepository;

/// Segundos hasta la próxima ocurrencia de `run_at` en hora local.
fn seconds_until(now: NaiveTime, run_at: NaiveTime) -> u64 {
    let now_secs = now.num_seconds_from_midnight() as i64;
    let run_secs = run_at.num_seconds_from_midnight() as i64;
    let delta = run_secs - now_secs;
    if delta > 0 {
        delta as u64
    } else {
        (delta + 86_400) as u64
    }
}

/// Lanzar el loop del job en background.
pub fn spawn_reset_job(pool: PgPool, run_at_hour: u32) {
    let run_at = NaiveTime::from_hms_opt(run_at_hour, 0, 0)
        .unwrap_or_else(|| NaiveTime::from_hms_opt(0, 0, 0).unwrap());

    tokio::spawn(async move {
        let drivers = DriverRepository::new(pool.clone());
        let tokens = TokenRepository::new(pool);

        loop {
            let wait = seconds_until(Local::now().time(), run_at);
            info!("🕐 Próximo reset de conductores en {} segundos", wait);
            tokio::time::sleep(Duration::from_secs(wait)).await;

            match drivers.reset_stuck().await {
                Ok(count) => info!("🔄 Reset diario: {} conductores liberados", count),
                Err(e) => error!("❌ Falló el reset de conductores: {}", e),
            }

            match tokens.delete_expired().await {
                Ok(count) => info!("🧹 GC de tokens: {} tokens vencidos borrados", count),
                Err(e) => error!("❌ Falló el GC de tokens vencidos: {}", e),
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_seconds_until_later_today() {
        assert_eq!(seconds_until(t(10, 0), t(11, 0)), 3600);
    }

    #[test]
    fn test_seconds_until_wraps_to_tomorrow() {
        assert_eq!(seconds_until(t(23, 0), t(1, 0)), 2 * 3600);
    }

    #[test]
    fn test_exact_hour_waits_a_full_day() {
        assert_eq!(seconds_until(t(6, 0), t(6, 0)), 86_400);
    }
}
