//! # Environment Orchestrator
//!
//! Bundles the weather, solar, consumption and pricing models and samples them
//! together for one point in time.

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

use super::{
    ConsumptionModel, ConsumptionModelConfig, PriceTier, PricingModel, SolarModelConfig,
    SolarProductionModel, TariffConfig, WeatherModel, WeatherModelConfig,
};
use crate::domain::{grid_import, WeatherState};

/// One sample of every model for the same instant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergySample {
    pub weather: WeatherState,
    /// Household consumption in kW
    pub consumption_kw: f64,
    /// PV generation in kW
    pub solar_kw: f64,
    /// consumption - solar; negative when exporting
    pub net_usage_kw: f64,
    /// $/kWh
    pub grid_price: f64,
    pub tier: PriceTier,
    /// Hourly cost of the current grid import in $
    pub current_cost: f64,
    pub hour: u32,
    pub minute: u32,
}

impl EnergySample {
    /// Assemble a sample from already computed parts
    pub fn compose(
        weather: WeatherState,
        consumption_kw: f64,
        solar_kw: f64,
        pricing: &PricingModel,
        hour: u32,
        minute: u32,
    ) -> Self {
        let tier = pricing.tier(hour);
        let grid_price = pricing.price_for_tier(tier);
        Self {
            weather,
            consumption_kw,
            solar_kw,
            net_usage_kw: consumption_kw - solar_kw,
            grid_price,
            tier,
            current_cost: grid_import(consumption_kw, solar_kw) * grid_price,
            hour,
            minute,
        }
    }
}

/// Environment configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub weather: WeatherModelConfig,
    pub solar: SolarModelConfig,
    pub consumption: ConsumptionModelConfig,
    pub tariff: TariffConfig,
    /// Offset from UTC in hours used to derive the household's local hour
    pub timezone_offset_hours: i32,
}

impl EnvironmentConfig {
    /// Set PV capacity
    pub fn with_pv_capacity(mut self, capacity_kw: f64) -> Self {
        self.solar.max_capacity_kw = capacity_kw;
        self
    }

    /// Set random seed for all components
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.weather.random_seed = Some(seed);
        self.solar.random_seed = Some(seed.wrapping_add(1));
        self.consumption.random_seed = Some(seed.wrapping_add(2));
        self
    }

    pub fn with_timezone_offset(mut self, hours: i32) -> Self {
        self.timezone_offset_hours = hours;
        self
    }
}

pub struct Environment {
    weather: WeatherModel,
    solar: SolarProductionModel,
    consumption: ConsumptionModel,
    pricing: PricingModel,
    timezone_offset_hours: i32,
}

impl Environment {
    pub fn new(config: EnvironmentConfig) -> Self {
        Self {
            weather: WeatherModel::new(config.weather),
            solar: SolarProductionModel::new(config.solar),
            consumption: ConsumptionModel::new(config.consumption),
            pricing: PricingModel::new(config.tariff),
            timezone_offset_hours: config.timezone_offset_hours,
        }
    }

    pub fn pricing(&self) -> &PricingModel {
        &self.pricing
    }

    /// Household-local (hour, minute) for a UTC instant
    pub fn local_hour_minute(&self, at: DateTime<Utc>) -> (u32, u32) {
        let local = at + Duration::hours(self.timezone_offset_hours as i64);
        (local.hour(), local.minute())
    }

    /// Sample weather -> solar & consumption -> pricing for a local time of day
    pub fn sample(&mut self, hour: u32, minute: u32) -> EnergySample {
        let weather = self.weather.sample(hour);
        let solar_kw = self.solar.generate(hour, minute);
        let consumption_kw = self.consumption.sample(hour);
        EnergySample::compose(weather, consumption_kw, solar_kw, &self.pricing, hour, minute)
    }

    pub fn sample_at(&mut self, at: DateTime<Utc>) -> EnergySample {
        let (hour, minute) = self.local_hour_minute(at);
        self.sample(hour, minute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn sample_is_internally_consistent() {
        let mut env = Environment::new(EnvironmentConfig::default().with_random_seed(42));
        for hour in 0..24 {
            let s = env.sample(hour, 0);
            assert!((s.net_usage_kw - (s.consumption_kw - s.solar_kw)).abs() < 1e-12);
            assert_eq!(s.grid_price, env.pricing().price(hour));
            assert!(s.current_cost >= 0.0);
        }
    }

    #[test]
    fn exporting_costs_nothing() {
        let pricing = PricingModel::default();
        let s = EnergySample::compose(WeatherState::default(), 1.0, 4.0, &pricing, 12, 0);
        assert_eq!(s.current_cost, 0.0);
        assert!((s.net_usage_kw + 3.0).abs() < 1e-12);
    }

    #[test]
    fn evening_scenario_prices_at_peak() {
        let pricing = PricingModel::default();
        let s = EnergySample::compose(WeatherState::default(), 5.0, 1.0, &pricing, 19, 0);
        assert_eq!(s.grid_price, 0.25);
        assert_eq!(s.tier, PriceTier::Peak);
        assert!((s.current_cost - 1.0).abs() < 1e-12);
    }

    #[test]
    fn timezone_offset_shifts_local_hour() {
        let env = Environment::new(EnvironmentConfig::default().with_timezone_offset(2));
        let at = Utc.with_ymd_and_hms(2024, 6, 15, 23, 30, 0).unwrap();
        assert_eq!(env.local_hour_minute(at), (1, 30));
    }

    #[test]
    fn night_has_no_solar() {
        let mut env = Environment::new(EnvironmentConfig::default().with_random_seed(3));
        let at = Utc.with_ymd_and_hms(2024, 6, 15, 2, 0, 0).unwrap();
        assert_eq!(env.sample_at(at).solar_kw, 0.0);
    }
}
