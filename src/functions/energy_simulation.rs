use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{EnergyLog, NewAlert, SolarReading, WeatherCondition};
use crate::repo::{PurgeCounts, Repositories, StoreResult};
use crate::simulation::{AlertEvaluator, AlertInputs, EnergySample, Environment};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSummary {
    pub temperature: f64,
    pub cloud_cover: f64,
    pub condition: WeatherCondition,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationData {
    pub consumption: f64,
    pub solar_generation: f64,
    pub net_usage: f64,
    pub grid_price: f64,
    pub current_cost: f64,
    pub weather: WeatherSummary,
}

impl From<&EnergySample> for SimulationData {
    fn from(s: &EnergySample) -> Self {
        Self {
            consumption: s.consumption_kw,
            solar_generation: s.solar_kw,
            net_usage: s.net_usage_kw,
            grid_price: s.grid_price,
            current_cost: s.current_cost,
            weather: WeatherSummary {
                temperature: s.weather.temperature,
                cloud_cover: s.weather.cloud_cover,
                condition: s.weather.condition,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergySimulationResponse {
    pub success: bool,
    pub timestamp: DateTime<Utc>,
    pub data: SimulationData,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecordOutcome {
    pub alerts_created: usize,
    pub purged: PurgeCounts,
}

/// Persist one sample as demo rows, store the triggered alerts and apply the
/// retention window to the demo tables.
///
/// The energy log and the solar reading are written independently; a failure
/// on the second leaves the first in place.
pub async fn record_sample(
    repos: &Repositories,
    sample: &EnergySample,
    alerts: Vec<NewAlert>,
    at: DateTime<Utc>,
    retention: Duration,
) -> StoreResult<RecordOutcome> {
    repos
        .energy
        .insert_energy_log(EnergyLog::demo(at, sample.consumption_kw))
        .await?;
    repos
        .energy
        .insert_solar_reading(SolarReading::demo(at, sample.solar_kw))
        .await?;

    let alerts_created = alerts.len();
    for alert in alerts {
        repos.alerts.insert_alert(alert.into_alert(at, true)).await?;
    }

    let purged = repos.purge_demo_before(at - retention).await?;
    if purged.total() > 0 {
        info!(
            energy_logs = purged.energy_logs,
            solar_data = purged.solar_data,
            realtime_energy = purged.realtime_energy,
            alerts = purged.alerts,
            "purged expired demo rows"
        );
    }

    Ok(RecordOutcome {
        alerts_created,
        purged,
    })
}

/// One on-demand simulation step at `now`
pub async fn run_energy_simulation(
    repos: &Repositories,
    env: &mut Environment,
    evaluator: &AlertEvaluator,
    now: DateTime<Utc>,
    retention: Duration,
) -> StoreResult<EnergySimulationResponse> {
    let sample = env.sample_at(now);
    let alerts = evaluator.evaluate(&AlertInputs {
        consumption_kw: sample.consumption_kw,
        solar_kw: sample.solar_kw,
        hour: sample.hour,
    });
    let outcome = record_sample(repos, &sample, alerts, now, retention).await?;

    info!(
        consumption_kw = sample.consumption_kw,
        solar_kw = sample.solar_kw,
        grid_price = sample.grid_price,
        alerts = outcome.alerts_created,
        "energy simulation recorded"
    );

    Ok(EnergySimulationResponse {
        success: true,
        timestamp: now,
        data: SimulationData::from(&sample),
    })
}
