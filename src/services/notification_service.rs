//! Dispatcher de notificaciones
//!
//! Entrega best-effort hacia el webhook de mensajería. Se invoca siempre
//! después del commit de la transacción principal: una falla de entrega se
//! loggea y se ignora, nunca llega al caller ni revierte la mutación.

use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct NotificationService {
    client: Client,
    webhook_url: Option<String>,
    accept_base_url: String,
}

impl NotificationService {
    pub fn new(client: Client, webhook_url: Option<String>, accept_base_url: String) -> Self {
        Self {
            client,
            webhook_url,
            accept_base_url,
        }
    }

    /// Enviar el enlace de aceptación al conductor asignado (fire-and-forget).
    pub fn dispatch_assignment(&self, recipient: String, request_code: String, token: String) {
        let link = format!(
            "{}/accept?token={}&externalId={}",
            self.accept_base_url, token, recipient
        );
        let message = format!(
            "Se le asignó la solicitud {}. Acepte el viaje en: {}",
            request_code, link
        );
        self.dispatch(recipient, message);
    }

    /// Notificar el cierre de un viaje (fire-and-forget).
    pub fn dispatch_completion(&self, request_code: String) {
        let message = format!("La solicitud {} fue completada.", request_code);
        self.dispatch("fleet-admin".to_string(), message);
    }

    fn dispatch(&self, recipient: String, message: String) {
        let service = self.clone();
        tokio::spawn(async move {
            if let Err(e) = service.send(&recipient, &message).await {
                warn!("⚠️ Falló la entrega de notificación a '{}': {}", recipient, e);
            }
        });
    }

    /// Entrega real contra el webhook configurado. Sin webhook (tests,
    /// desarrollo) la notificación solo se loggea.
    async fn send(&self, recipient: &str, message: &str) -> Result<(), reqwest::Error> {
        match &self.webhook_url {
            Some(url) => {
                self.client
                    .post(url)
                    .json(&json!({ "recipient": recipient, "message": message }))
                    .send()
                    .await?
                    .error_for_status()?;
                Ok(())
            }
            None => {
                debug!("📨 Notificación (sin webhook) para '{}': {}", recipient, message);
                Ok(())
            }
        }
    }
}
