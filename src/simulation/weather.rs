//! # Weather Model
//!
//! Produces a [`WeatherState`] for an hour of day: a daily temperature sine
//! wave plus noise, cloud cover jittered around a climate baseline, and a sky
//! condition derived from the hour and the cloud band.

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use super::{seeded_rng, uniform};
use crate::domain::{WeatherCondition, WeatherState};

/// Daylight window used for condition labelling, `[start, end)`
const DAYLIGHT_START_HOUR: u32 = 6;
const DAYLIGHT_END_HOUR: u32 = 18;

/// Weather model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherModelConfig {
    /// Daily mean temperature (°C)
    pub base_temperature_c: f64,
    /// Amplitude of the daily temperature wave (°C)
    pub temperature_amplitude_c: f64,
    /// Half-width of uniform temperature noise (°C)
    pub temperature_noise_c: f64,
    /// Climate cloud cover baseline (0.0-1.0)
    pub base_cloud_cover: f64,
    /// Half-width of uniform cloud cover noise
    pub cloud_cover_noise: f64,
    /// Random seed for reproducibility (None = random)
    pub random_seed: Option<u64>,
}

impl Default for WeatherModelConfig {
    fn default() -> Self {
        Self {
            base_temperature_c: 20.0,
            temperature_amplitude_c: 8.0,
            temperature_noise_c: 1.5,
            base_cloud_cover: 0.3,
            cloud_cover_noise: 0.2,
            random_seed: None,
        }
    }
}

pub struct WeatherModel {
    config: WeatherModelConfig,
    rng: StdRng,
}

impl WeatherModel {
    pub fn new(config: WeatherModelConfig) -> Self {
        let rng = seeded_rng(config.random_seed);
        Self { config, rng }
    }

    /// Sample the weather for an hour of day (0-23)
    pub fn sample(&mut self, hour: u32) -> WeatherState {
        let hour = hour % 24;
        let cfg = &self.config;

        let wave = (hour as f64 / 24.0 * 2.0 * PI).sin();
        let temperature = cfg.base_temperature_c
            + cfg.temperature_amplitude_c * wave
            + uniform(&mut self.rng, -cfg.temperature_noise_c, cfg.temperature_noise_c);

        let cloud_cover = (cfg.base_cloud_cover
            + uniform(&mut self.rng, -cfg.cloud_cover_noise, cfg.cloud_cover_noise))
        .clamp(0.0, 1.0);

        let wind_speed = 2.0 + uniform(&mut self.rng, 0.0, 6.0) + 4.0 * cloud_cover;
        let humidity =
            (55.0 + 30.0 * cloud_cover + uniform(&mut self.rng, -5.0, 5.0)).clamp(0.0, 100.0);

        WeatherState {
            temperature,
            cloud_cover,
            wind_speed,
            humidity,
            condition: classify_condition(hour, cloud_cover),
        }
    }
}

/// Map hour and cloud cover onto a sky condition.
///
/// Heavy cloud bands apply at any hour. Below them, daylight hours read
/// sunny unless cover exceeds 0.4; at night the mildest label is partly cloudy.
pub fn classify_condition(hour: u32, cloud_cover: f64) -> WeatherCondition {
    let daylight = (DAYLIGHT_START_HOUR..DAYLIGHT_END_HOUR).contains(&(hour % 24));

    if cloud_cover >= 0.9 {
        WeatherCondition::Stormy
    } else if cloud_cover >= 0.75 {
        WeatherCondition::Rainy
    } else if cloud_cover >= 0.55 {
        WeatherCondition::Cloudy
    } else if cloud_cover > 0.4 || !daylight {
        WeatherCondition::PartlyCloudy
    } else {
        WeatherCondition::Sunny
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn seeded(seed: u64) -> WeatherModel {
        WeatherModel::new(WeatherModelConfig {
            random_seed: Some(seed),
            ..Default::default()
        })
    }

    #[test]
    fn temperature_stays_within_wave_and_noise() {
        let mut model = seeded(42);
        for hour in 0..24 {
            let w = model.sample(hour);
            let wave = 20.0 + 8.0 * (hour as f64 / 24.0 * 2.0 * PI).sin();
            assert!((w.temperature - wave).abs() <= 1.5, "hour {hour}: {}", w.temperature);
        }
    }

    #[test]
    fn cloud_cover_is_bounded() {
        let mut model = seeded(7);
        for _ in 0..500 {
            let w = model.sample(12);
            assert!((0.1..=0.5).contains(&w.cloud_cover));
            assert!((0.0..=100.0).contains(&w.humidity));
            assert!(w.wind_speed >= 2.0);
        }
    }

    #[test]
    fn cloudy_climate_is_clamped() {
        let mut model = WeatherModel::new(WeatherModelConfig {
            base_cloud_cover: 0.95,
            cloud_cover_noise: 0.2,
            random_seed: Some(3),
            ..Default::default()
        });
        for _ in 0..100 {
            assert!(model.sample(10).cloud_cover <= 1.0);
        }
    }

    #[test]
    fn zero_noise_is_deterministic() {
        let mut model = WeatherModel::new(WeatherModelConfig {
            temperature_noise_c: 0.0,
            cloud_cover_noise: 0.0,
            ..Default::default()
        });
        let w = model.sample(6);
        assert!((w.temperature - 28.0).abs() < 1e-9);
        assert!((w.cloud_cover - 0.3).abs() < 1e-9);
        assert_eq!(w.condition, WeatherCondition::Sunny);
    }

    #[rstest]
    #[case(12, 0.3, WeatherCondition::Sunny)]
    #[case(12, 0.45, WeatherCondition::PartlyCloudy)]
    #[case(2, 0.3, WeatherCondition::PartlyCloudy)]
    #[case(18, 0.1, WeatherCondition::PartlyCloudy)]
    #[case(6, 0.1, WeatherCondition::Sunny)]
    #[case(9, 0.6, WeatherCondition::Cloudy)]
    #[case(23, 0.8, WeatherCondition::Rainy)]
    #[case(14, 0.95, WeatherCondition::Stormy)]
    fn condition_bands(#[case] hour: u32, #[case] cloud: f64, #[case] expected: WeatherCondition) {
        assert_eq!(classify_condition(hour, cloud), expected);
    }
}
