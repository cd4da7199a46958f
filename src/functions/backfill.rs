//! Historical backfill for a user: `days_back` days of hourly records.

use chrono::{DateTime, Datelike, Duration, DurationRound, Utc};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::FunctionError;
use crate::domain::{
    grid_import, BackfillBatch, Co2Record, EnergyLog, GridPriceRecord, ProcessedFeatureRecord,
    RawEnergyRecord, SolarReading, WeatherRecord,
};
use crate::repo::{RecordsCreated, Repositories};
use crate::simulation::{seeded_rng, uniform, Environment, EnvironmentConfig, PriceTier};

const RAW_READINGS_PER_HOUR: i64 = 4;
const RAW_NOISE: f64 = 0.05;
const ROLLING_WINDOW_HOURS: usize = 24;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BackfillRequest {
    pub user_id: Uuid,
    /// Signed so out-of-range values reach validation instead of failing to parse
    #[validate(range(min = 1, max = 365))]
    pub days_back: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackfillResponse {
    pub success: bool,
    pub records_created: RecordsCreated,
}

/// Grid carbon intensity in g/kWh for a tariff tier
fn co2_intensity(tier: PriceTier) -> f64 {
    match tier {
        PriceTier::Peak => 420.0,
        PriceTier::Standard => 320.0,
        PriceTier::OffPeak => 260.0,
    }
}

pub struct BackfillGenerator {
    env: Environment,
    rng: StdRng,
}

impl BackfillGenerator {
    pub fn new(config: EnvironmentConfig) -> Self {
        let seed = config.weather.random_seed.map(|s| s.wrapping_add(3));
        Self {
            env: Environment::new(config),
            rng: seeded_rng(seed),
        }
    }

    /// Hourly records for the `days_back` days ending at the hour containing `now`.
    /// Non-positive `days_back` yields an empty batch.
    pub fn generate(&mut self, user_id: Uuid, days_back: i64, now: DateTime<Utc>) -> BackfillBatch {
        let end = now.duration_trunc(Duration::hours(1)).unwrap_or(now);
        let hours = days_back.max(0) * 24;
        let start = end - Duration::hours(hours);

        let mut batch = BackfillBatch::default();
        let mut recent: VecDeque<f64> = VecDeque::with_capacity(ROLLING_WINDOW_HOURS);

        for h in 0..hours {
            let ts = start + Duration::hours(h);
            let sample = self.env.sample_at(ts);
            let consumption = sample.consumption_kw;
            let solar = sample.solar_kw;

            let mut log = EnergyLog::demo(ts, consumption);
            log.user_id = Some(user_id);
            log.is_demo = false;
            batch.energy_logs.push(log);

            let mut reading = SolarReading::demo(ts, solar);
            reading.user_id = Some(user_id);
            reading.is_demo = false;
            batch.solar_data.push(reading);

            batch.weather_data.push(WeatherRecord {
                user_id,
                timestamp: ts,
                temperature_c: sample.weather.temperature,
                cloud_cover: sample.weather.cloud_cover,
                wind_speed_ms: sample.weather.wind_speed,
                humidity_percent: sample.weather.humidity,
                condition: sample.weather.condition,
            });

            batch.grid_prices.push(GridPriceRecord {
                user_id,
                timestamp: ts,
                price_per_kwh: sample.grid_price,
                tier: sample.tier.to_string(),
            });

            let intensity = co2_intensity(sample.tier);
            batch.co2_data.push(Co2Record {
                user_id,
                timestamp: ts,
                intensity_g_per_kwh: intensity,
                emitted_kg: grid_import(consumption, solar) * intensity / 1000.0,
            });

            let step = 60 / RAW_READINGS_PER_HOUR;
            for i in 0..RAW_READINGS_PER_HOUR {
                let power_kw =
                    (consumption * (1.0 + uniform(&mut self.rng, -RAW_NOISE, RAW_NOISE))).max(0.0);
                batch.raw_energy_data.push(RawEnergyRecord {
                    user_id,
                    timestamp: ts + Duration::minutes(i * step),
                    power_kw,
                    energy_kwh: power_kw * step as f64 / 60.0,
                });
            }

            let lag_1h = recent.back().copied();
            if recent.len() == ROLLING_WINDOW_HOURS {
                recent.pop_front();
            }
            recent.push_back(consumption);
            let rolling_mean = recent.iter().sum::<f64>() / recent.len() as f64;

            let weekday = ts.weekday().num_days_from_sunday();
            batch.processed_features.push(ProcessedFeatureRecord {
                user_id,
                timestamp: ts,
                hour_of_day: sample.hour,
                day_of_week: weekday,
                is_weekend: weekday == 0 || weekday == 6,
                temperature_c: sample.weather.temperature,
                consumption_kw: consumption,
                solar_kw: solar,
                lag_1h_consumption_kw: lag_1h,
                rolling_24h_mean_kw: rolling_mean,
            });
        }

        batch
    }
}

pub async fn backfill(
    repos: &Repositories,
    generator: &mut BackfillGenerator,
    request: &BackfillRequest,
    now: DateTime<Utc>,
) -> Result<RecordsCreated, FunctionError> {
    request.validate()?;
    let batch = generator.generate(request.user_id, request.days_back, now);
    let created = repos.history.insert_backfill(batch).await?;
    info!(
        user_id = %request.user_id,
        days_back = request.days_back,
        total = created.total(),
        "historical backfill complete"
    );
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 34, 0).unwrap()
    }

    fn generator() -> BackfillGenerator {
        BackfillGenerator::new(EnvironmentConfig::default().with_random_seed(5))
    }

    #[test]
    fn one_day_produces_hourly_records() {
        let user = Uuid::new_v4();
        let batch = generator().generate(user, 1, now());
        assert_eq!(batch.energy_logs.len(), 24);
        assert_eq!(batch.solar_data.len(), 24);
        assert_eq!(batch.weather_data.len(), 24);
        assert_eq!(batch.grid_prices.len(), 24);
        assert_eq!(batch.co2_data.len(), 24);
        assert_eq!(batch.raw_energy_data.len(), 96);
        assert_eq!(batch.processed_features.len(), 24);

        let first = &batch.energy_logs[0];
        assert_eq!(first.user_id, Some(user));
        assert!(!first.is_demo);
        assert_eq!(
            batch.energy_logs[23].timestamp,
            Utc.with_ymd_and_hms(2024, 6, 15, 11, 0, 0).unwrap()
        );
    }

    #[test]
    fn features_carry_lag_and_rolling_mean() {
        let batch = generator().generate(Uuid::new_v4(), 2, now());
        let f = &batch.processed_features;
        assert_eq!(f[0].lag_1h_consumption_kw, None);
        assert_eq!(f[1].lag_1h_consumption_kw, Some(f[0].consumption_kw));

        let window = &f[25 - 23..=25];
        let expected = window.iter().map(|r| r.consumption_kw).sum::<f64>() / 24.0;
        assert!((f[25].rolling_24h_mean_kw - expected).abs() < 1e-9);
    }

    #[test]
    fn weekdays_count_from_sunday() {
        // 2024-06-14 is a Friday, 2024-06-15 a Saturday.
        let batch = generator().generate(Uuid::new_v4(), 1, now());
        let friday = &batch.processed_features[0];
        assert_eq!(friday.day_of_week, 5);
        assert!(!friday.is_weekend);
        let saturday = batch.processed_features.last().unwrap();
        assert_eq!(saturday.day_of_week, 6);
        assert!(saturday.is_weekend);

        let sunday = Utc.with_ymd_and_hms(2024, 6, 16, 12, 0, 0).unwrap();
        let batch = generator().generate(Uuid::new_v4(), 1, sunday);
        let last = batch.processed_features.last().unwrap();
        assert_eq!(last.day_of_week, 0);
        assert!(last.is_weekend);
    }

    #[test]
    fn co2_follows_grid_import() {
        let batch = generator().generate(Uuid::new_v4(), 1, now());
        for (co2, (log, solar)) in batch
            .co2_data
            .iter()
            .zip(batch.energy_logs.iter().zip(&batch.solar_data))
        {
            let import = grid_import(log.consumption_kw, solar.generation_kw);
            assert!((co2.emitted_kg - import * co2.intensity_g_per_kwh / 1000.0).abs() < 1e-12);
        }
    }

    #[tokio::test]
    async fn out_of_range_days_are_rejected() {
        let repos = Repositories::in_memory();
        let mut g = generator();
        for days_back in [-3, 0, 366] {
            let req = BackfillRequest {
                user_id: Uuid::new_v4(),
                days_back,
            };
            let err = backfill(&repos, &mut g, &req, now()).await.unwrap_err();
            assert!(matches!(err, FunctionError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn backfill_reports_counts() {
        let repos = Repositories::in_memory();
        let req = BackfillRequest {
            user_id: Uuid::new_v4(),
            days_back: 3,
        };
        let created = backfill(&repos, &mut generator(), &req, now()).await.unwrap();
        assert_eq!(created.energy_logs, 72);
        assert_eq!(created.raw_energy_data, 288);
        let logs = repos
            .energy
            .energy_logs_since(now() - Duration::days(4), Some(req.user_id))
            .await
            .unwrap();
        assert_eq!(logs.len(), 72);
    }
}
