//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de
//! configuración.

use std::env;

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    /// TTL del token de aceptación, en horas
    pub accept_token_ttl_hours: i64,
    /// URL base del deep link de aceptación enviado al conductor
    pub accept_base_url: String,
    /// Webhook del dispatcher de notificaciones; sin valor solo se loggea
    pub notify_webhook_url: Option<String>,
    /// Hora local (0-23) del job diario de reset de conductores
    pub reset_job_hour: u32,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("PORT must be a valid number"),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            accept_token_ttl_hours: env::var("ACCEPT_TOKEN_TTL_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .expect("ACCEPT_TOKEN_TTL_HOURS must be a valid number"),
            accept_base_url: env::var("ACCEPT_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            notify_webhook_url: env::var("NOTIFY_WEBHOOK_URL").ok(),
            reset_job_hour: env::var("RESET_JOB_HOUR")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .expect("RESET_JOB_HOUR must be a valid hour (0-23)"),
        }
    }
}

impl EnvironmentConfig {
    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
