use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{EnergyDataPoint, EnergyLog, RealtimePoint, SolarReading};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileConfig {
    /// How far back authoritative points are considered
    pub window: Duration,
    /// Maximum distance for pairing a log with a solar reading (inclusive)
    pub match_window: Duration,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            window: Duration::hours(24),
            match_window: Duration::minutes(30),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesSource {
    /// Authoritative real-time points
    Realtime,
    /// Consumption logs joined with solar readings
    Paired,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledSeries {
    pub source: SeriesSource,
    /// Ascending by timestamp
    pub points: Vec<EnergyDataPoint>,
}

/// Build one chartable series.
///
/// Real-time points inside `cfg.window` win when there are any. Otherwise each
/// consumption log is paired with the nearest solar reading no further than
/// `cfg.match_window` away; a log without a partner gets solar = 0.
pub fn reconcile(
    realtime: &[RealtimePoint],
    logs: &[EnergyLog],
    solar: &[SolarReading],
    now: DateTime<Utc>,
    cfg: &ReconcileConfig,
) -> ReconciledSeries {
    let since = now - cfg.window;

    let mut live: Vec<EnergyDataPoint> = realtime
        .iter()
        .filter(|p| p.timestamp >= since && p.timestamp <= now)
        .map(|p| EnergyDataPoint::new(p.timestamp, p.consumption_kw, p.solar_kw))
        .collect();
    if !live.is_empty() {
        live.sort_by_key(|p| p.timestamp);
        return ReconciledSeries {
            source: SeriesSource::Realtime,
            points: live,
        };
    }

    let mut readings: Vec<&SolarReading> = solar.iter().collect();
    readings.sort_by_key(|r| r.timestamp);

    let mut points: Vec<EnergyDataPoint> = logs
        .iter()
        .filter(|l| l.timestamp >= since && l.timestamp <= now)
        .map(|log| {
            let solar_kw = nearest(&readings, log.timestamp, cfg.match_window)
                .map(|r| r.generation_kw)
                .unwrap_or(0.0);
            EnergyDataPoint::new(log.timestamp, log.consumption_kw, solar_kw)
        })
        .collect();
    points.sort_by_key(|p| p.timestamp);

    debug!(
        logs = points.len(),
        readings = readings.len(),
        "reconciled series from logged records"
    );

    ReconciledSeries {
        source: SeriesSource::Paired,
        points,
    }
}

/// Nearest reading to `at` within `max_gap`; ties go to the earlier reading.
fn nearest<'a>(
    sorted: &[&'a SolarReading],
    at: DateTime<Utc>,
    max_gap: Duration,
) -> Option<&'a SolarReading> {
    let idx = sorted.partition_point(|r| r.timestamp < at);
    let after = sorted.get(idx).copied();
    let before = idx.checked_sub(1).and_then(|i| sorted.get(i)).copied();

    let best = match (before, after) {
        (Some(b), Some(a)) => {
            if at - b.timestamp <= a.timestamp - at {
                b
            } else {
                a
            }
        }
        (Some(b), None) => b,
        (None, Some(a)) => a,
        (None, None) => return None,
    };
    ((best.timestamp - at).abs() <= max_gap).then_some(best)
}
