use anyhow::Result;
use axum::Router;
use energy_dashboard::{api, config::Config, controller, telemetry};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }
    telemetry::init_tracing();

    let cfg = Config::load()?;
    let app_state = controller::AppState::new(cfg.clone());

    #[allow(unused_mut)]
    let mut app: Router = api::router(app_state.clone(), &cfg);

    #[cfg(feature = "metrics")]
    {
        app = api::with_metrics(app);
    }

    let addr = cfg.server.socket_addr()?;
    if cfg.server.host == "0.0.0.0" {
        warn!("binding to 0.0.0.0, the dashboard backend is reachable from the network");
    }

    info!(
        %addr,
        tick_seconds = cfg.simulation.tick_seconds,
        autostart = cfg.simulation.autostart,
        "starting energy dashboard"
    );

    let clock_task = controller::spawn_simulation_task(app_state.clone());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(telemetry::shutdown_signal())
        .await?;

    clock_task.abort();
    info!("shutdown complete");
    Ok(())
}
