//! # Household Consumption Model
//!
//! Time-of-day banded household load: a fixed base draw, a per-band offset
//! with a random spread, and a small symmetric jitter. Output is clamped at zero.

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use super::{seeded_rng, uniform};

/// Time-of-day band of the household load profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumptionBand {
    /// 06:00-09:00: breakfast, showers
    MorningPeak,
    /// 17:00-22:00: cooking, appliances
    EveningPeak,
    /// 09:00-17:00: reduced load
    Daytime,
    /// Everything else
    Night,
}

impl ConsumptionBand {
    pub fn for_hour(hour: u32) -> Self {
        match hour % 24 {
            6..=8 => ConsumptionBand::MorningPeak,
            17..=21 => ConsumptionBand::EveningPeak,
            9..=16 => ConsumptionBand::Daytime,
            _ => ConsumptionBand::Night,
        }
    }

    /// Fixed offset above base load and width of the random spread (kW)
    pub fn offset_and_spread(&self) -> (f64, f64) {
        match self {
            ConsumptionBand::MorningPeak => (2.0, 1.5),
            ConsumptionBand::EveningPeak => (3.0, 2.0),
            ConsumptionBand::Daytime => (1.0, 1.0),
            ConsumptionBand::Night => (0.0, 0.5),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumptionModelConfig {
    /// Always-on household draw in kW
    pub base_load_kw: f64,
    /// Half-width of the final uniform jitter in kW
    pub jitter_kw: f64,
    /// Random seed for reproducibility (None = random)
    pub random_seed: Option<u64>,
}

impl Default for ConsumptionModelConfig {
    fn default() -> Self {
        Self {
            base_load_kw: 0.5,
            jitter_kw: 0.25,
            random_seed: None,
        }
    }
}

pub struct ConsumptionModel {
    config: ConsumptionModelConfig,
    rng: StdRng,
}

impl ConsumptionModel {
    pub fn new(config: ConsumptionModelConfig) -> Self {
        let rng = seeded_rng(config.random_seed);
        Self { config, rng }
    }

    /// Inclusive bounds a sample for this hour can take (before clamping)
    pub fn bounds(&self, hour: u32) -> (f64, f64) {
        let (offset, spread) = ConsumptionBand::for_hour(hour).offset_and_spread();
        let low = self.config.base_load_kw + offset - self.config.jitter_kw;
        let high = self.config.base_load_kw + offset + spread + self.config.jitter_kw;
        (low, high)
    }

    /// Household consumption in kW for an hour of day
    pub fn sample(&mut self, hour: u32) -> f64 {
        let (offset, spread) = ConsumptionBand::for_hour(hour).offset_and_spread();
        let banded = self.config.base_load_kw + offset + uniform(&mut self.rng, 0.0, spread);
        let jitter = uniform(&mut self.rng, -self.config.jitter_kw, self.config.jitter_kw);
        (banded + jitter).max(0.0)
    }
}
