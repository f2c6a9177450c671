use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

use fleet_dispatch::config::environment::EnvironmentConfig;
use fleet_dispatch::state::AppState;
use fleet_dispatch::{database, routes, services};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("🚘 Fleet Dispatch - Flota vehicular de oficina");
    info!("==============================================");

    // Inicializar base de datos
    let pool = match database::create_pool(None).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    let config = EnvironmentConfig::default();
    let reset_hour = config.reset_job_hour;

    // Job diario: libera conductores trabados en BUSY y borra tokens vencidos
    services::reset_service::spawn_reset_job(pool.clone(), reset_hour);

    // Crear router de la API
    let app_state = AppState::new(pool, config.clone());
    let app = routes::create_app(app_state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /test - Endpoint de prueba");
    info!("📋 Endpoints - Booking:");
    info!("   POST /bookings - Crear solicitud");
    info!("   POST /bookings/retro - Crear entrada retroactiva");
    info!("   GET  /bookings - Listar solicitudes");
    info!("   GET  /bookings/:id - Obtener solicitud");
    info!("   POST /bookings/:id/approve - Aprobar solicitud");
    info!("   POST /bookings/:id/reject - Rechazar solicitud");
    info!("   POST /bookings/:id/assign - Asignar conductor y vehículo");
    info!("   POST /bookings/:id/claim - Auto-reclamo del conductor");
    info!("   PUT  /bookings/:id/cancel - Cancelar solicitud");
    info!("🔁 Endpoints - Cola de conductores:");
    info!("   GET  /queue/next - Próximo conductor elegible");
    info!("   POST /queue/advance - Rotar conductor al frente");
    info!("   POST /queue/renumber - Renumerar 1..N");
    info!("   POST /queue/seed - Siembra prioritaria (única vez)");
    info!("🧾 Endpoints - Kilometraje:");
    info!("   POST /mileage/start - Registrar kilometraje de salida");
    info!("   POST /mileage/finish - Registrar llegada y cerrar viaje");
    info!("🎫 Endpoints - Aceptación:");
    info!("   GET  /accept?token=&externalId= - Canjear token de aceptación");
    info!("🧑‍✈️ Endpoints - Conductores:");
    info!("   POST /drivers - Registrar conductor");
    info!("   GET  /drivers - Listar conductores por orden de cola");
    info!("   PUT  /drivers/:id - Actualizar conductor");
    info!("🕐 Job diario de reset de conductores a las {}:00", reset_hour);

    // Iniciar servidor en background
    let server_handle = tokio::spawn(async move {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                error!("❌ Error del servidor: {}", e);
                e
            })
    });

    // Esperar a que el servidor termine
    if let Err(e) = server_handle.await? {
        error!("❌ Servidor terminó con error: {}", e);
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
