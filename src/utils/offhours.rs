//! Clasificador de horario de oficina
//!
//! Función pura que marca un timestamp como dentro o fuera del horario
//! hábil. El valor se interpreta como hora civil local ya resuelta:
//! no se hace ninguna conversión de zona horaria.

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};

/// Hora de apertura (inclusiva)
const BUSINESS_OPEN_HOUR: u32 = 8;
/// Hora de cierre (exclusiva)
const BUSINESS_CLOSE_HOUR: u32 = 16;

/// Determinar si un timestamp cae fuera del horario hábil.
///
/// Horario hábil: lunes a viernes, 08:00 inclusive a 16:00 exclusivo,
/// evaluado sobre la hora de pared literal del timestamp. Sábado y
/// domingo son siempre fuera de horario.
pub fn is_off_hours(timestamp: NaiveDateTime) -> bool {
    match timestamp.weekday() {
        Weekday::Sat | Weekday::Sun => true,
        _ => {
            let hour = timestamp.hour();
            hour < BUSINESS_OPEN_HOUR || hour >= BUSINESS_CLOSE_HOUR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_weekday_inside_business_hours() {
        // Miércoles 10:30
        assert!(!is_off_hours(ts(2026, 8, 26, 10, 30)));
    }

    #[test]
    fn test_open_boundary_is_inclusive() {
        // Lunes 08:00 en punto cuenta como horario hábil
        assert!(!is_off_hours(ts(2026, 8, 24, 8, 0)));
    }

    #[test]
    fn test_close_boundary_is_exclusive() {
        // Viernes 16:00 ya es fuera de horario
        assert!(is_off_hours(ts(2026, 8, 28, 16, 0)));
        // 15:59 todavía es hábil
        assert!(!is_off_hours(ts(2026, 8, 28, 15, 59)));
    }

    #[test]
    fn test_early_morning_is_off_hours() {
        assert!(is_off_hours(ts(2026, 8, 25, 7, 59)));
    }

    #[test]
    fn test_weekend_always_off_hours() {
        // Sábado y domingo al mediodía
        assert!(is_off_hours(ts(2026, 8, 29, 12, 0)));
        assert!(is_off_hours(ts(2026, 8, 30, 12, 0)));
    }
}
