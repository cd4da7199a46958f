//! Rows generated by the historical backfill

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::WeatherCondition;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub user_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub temperature_c: f64,
    pub cloud_cover: f64,
    pub wind_speed_ms: f64,
    pub humidity_percent: f64,
    pub condition: WeatherCondition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridPriceRecord {
    pub user_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub price_per_kwh: f64,
    pub tier: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Co2Record {
    pub user_id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Grid carbon intensity (gCO2/kWh)
    pub intensity_g_per_kwh: f64,
    /// Emissions attributed to the hour's grid import (kg)
    pub emitted_kg: f64,
}

/// 15-minute smart meter reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEnergyRecord {
    pub user_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub power_kw: f64,
    pub energy_kwh: f64,
}

/// Per-hour feature row for downstream forecasting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedFeatureRecord {
    pub user_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub hour_of_day: u32,
    /// 0 = Sunday .. 6 = Saturday
    pub day_of_week: u32,
    pub is_weekend: bool,
    pub temperature_c: f64,
    pub consumption_kw: f64,
    pub solar_kw: f64,
    pub lag_1h_consumption_kw: Option<f64>,
    pub rolling_24h_mean_kw: f64,
}

/// Everything one backfill run produced, inserted table by table.
#[derive(Debug, Clone, Default)]
pub struct BackfillBatch {
    pub energy_logs: Vec<super::EnergyLog>,
    pub solar_data: Vec<super::SolarReading>,
    pub weather_data: Vec<WeatherRecord>,
    pub grid_prices: Vec<GridPriceRecord>,
    pub co2_data: Vec<Co2Record>,
    pub raw_energy_data: Vec<RawEnergyRecord>,
    pub processed_features: Vec<ProcessedFeatureRecord>,
}
