//! # Solar Production Model
//!
//! Models rooftop PV output as a half-sine over the daylight window scaled by
//! installed capacity and a random cloud factor.

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use super::{seeded_rng, uniform};

/// Solar model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolarModelConfig {
    /// Peak output of the array in kW
    pub max_capacity_kw: f64,
    /// First hour of the production window
    pub sunrise_hour: u32,
    /// Last hour of the production window (curve reaches zero here)
    pub sunset_hour: u32,
    /// Lowest cloud transmission factor; the factor is drawn from `[min, 1.0)`
    pub min_cloud_factor: f64,
    /// Random seed for reproducibility (None = random)
    pub random_seed: Option<u64>,
}

impl Default for SolarModelConfig {
    fn default() -> Self {
        Self {
            max_capacity_kw: 8.0,
            sunrise_hour: 6,
            sunset_hour: 18,
            min_cloud_factor: 0.7,
            random_seed: None,
        }
    }
}

pub struct SolarProductionModel {
    config: SolarModelConfig,
    rng: StdRng,
}

impl SolarProductionModel {
    pub fn new(config: SolarModelConfig) -> Self {
        let rng = seeded_rng(config.random_seed);
        Self { config, rng }
    }

    /// Normalised clear-sky curve (0.0-1.0) for a time of day.
    ///
    /// Zero outside `[sunrise_hour, sunset_hour]`; inside, a half-sine over
    /// fractional day progress that peaks at solar noon.
    pub fn clear_sky_curve(&self, hour: u32, minute: u32) -> f64 {
        let (rise, set) = (self.config.sunrise_hour, self.config.sunset_hour);
        if hour < rise || hour > set || set <= rise {
            return 0.0;
        }

        let hours = hour as f64 + minute as f64 / 60.0;
        let day_progress = (hours - rise as f64) / (set - rise) as f64;
        (day_progress * PI).sin().max(0.0)
    }

    /// Generation in kW for an explicit cloud factor
    pub fn generation_with_cloud_factor(
        &self,
        hour: u32,
        minute: u32,
        cloud_factor: f64,
    ) -> f64 {
        let curve = self.clear_sky_curve(hour, minute);
        (curve * self.config.max_capacity_kw * cloud_factor).max(0.0)
    }

    /// Draw a cloud factor and return generation in kW (never negative)
    pub fn generate(&mut self, hour: u32, minute: u32) -> f64 {
        let cloud_factor = uniform(&mut self.rng, self.config.min_cloud_factor, 1.0);
        self.generation_with_cloud_factor(hour, minute, cloud_factor)
    }
}
