use axum::{
    routing::{delete, get, post},
    Router,
};

use super::{alerts, changes, energy, functions, preferences, simulation};
use crate::controller::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/functions/energy-simulation", post(functions::energy_simulation))
        .route(
            "/functions/backfill-historical-data",
            post(functions::backfill_historical_data),
        )
        .route("/functions/check-gamification", post(functions::check_gamification))
        .route("/energy/series", get(energy::get_series))
        .route("/energy/chart", get(energy::get_chart))
        .route("/alerts", get(alerts::list_alerts))
        .route("/alerts/read-all", post(alerts::mark_all_read))
        .route("/alerts/:id", delete(alerts::delete_alert))
        .route("/alerts/:id/read", post(alerts::mark_read))
        .route("/simulation", get(simulation::get_state))
        .route("/simulation/start", post(simulation::start))
        .route("/simulation/stop", post(simulation::stop))
        .route("/simulation/reset", post(simulation::reset))
        .route("/simulation/speed", post(simulation::set_speed))
        .route("/simulation/devices", post(simulation::add_device))
        .route("/simulation/devices/:id", delete(simulation::remove_device))
        .route(
            "/simulation/devices/:id/status",
            post(simulation::set_device_status),
        )
        .route("/simulation/devices/:id/tasks", post(simulation::schedule_task))
        .route(
            "/simulation/devices/:id/tasks/:task_id",
            delete(simulation::cancel_task),
        )
        .route("/devices/library", get(simulation::library))
        .route(
            "/preferences",
            get(preferences::get_preferences).put(preferences::update_preferences),
        )
        .route("/changes", get(changes::change_feed))
        .with_state(state)
}
