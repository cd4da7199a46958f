//! Chartable energy series built from stored records.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::repo::{Repositories, StoreResult};

pub mod chart;
pub mod reconcile;

pub use chart::{
    chart_series_or_fallback, fallback_series, validate_chart_data, ChartSeries, MIN_CHART_POINTS,
};
pub use reconcile::{reconcile, ReconcileConfig, ReconciledSeries, SeriesSource};

/// Query the store and reconcile everything inside the configured window.
///
/// Real-time points belong to the household, not to a user, so they are only
/// considered for the household view (`user_id = None`). A user-scoped series
/// is built from that user's own logs and readings.
pub async fn load_series(
    repos: &Repositories,
    now: DateTime<Utc>,
    cfg: &ReconcileConfig,
    user_id: Option<Uuid>,
) -> StoreResult<ReconciledSeries> {
    let since = now - cfg.window;
    if user_id.is_none() {
        let realtime = repos.energy.realtime_points_since(since).await?;
        if !realtime.is_empty() {
            return Ok(reconcile(&realtime, &[], &[], now, cfg));
        }
    }
    let logs = repos.energy.energy_logs_since(since, user_id).await?;
    // Readings just before the window can still pair with the earliest logs.
    let solar = repos
        .energy
        .solar_readings_since(since - cfg.match_window, user_id)
        .await?;
    Ok(reconcile(&[], &logs, &solar, now, cfg))
}
