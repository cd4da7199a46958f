use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{NewAlert, Severity};

pub const HIGH_USAGE_TITLE: &str = "High Energy Usage";
pub const PEAK_PRICING_TITLE: &str = "Peak Pricing";
pub const EXCELLENT_SOLAR_TITLE: &str = "Excellent Solar";

/// Fixed thresholds for the advisory rules. Comparisons are strict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertThresholds {
    pub high_usage_kw: f64,
    pub peak_net_usage_kw: f64,
    pub excellent_solar_kw: f64,
    /// Peak advisory window, both ends inclusive
    pub peak_start_hour: u32,
    pub peak_end_hour: u32,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            high_usage_kw: 6.0,
            peak_net_usage_kw: 3.0,
            excellent_solar_kw: 6.0,
            peak_start_hour: 16,
            peak_end_hour: 20,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AlertInputs {
    pub consumption_kw: f64,
    pub solar_kw: f64,
    pub hour: u32,
}

impl AlertInputs {
    pub fn net_usage_kw(&self) -> f64 {
        self.consumption_kw - self.solar_kw
    }
}

/// Evaluates the advisory rules independently; every satisfied rule yields
/// one alert per evaluation, with no deduplication across calls.
#[derive(Debug, Clone, Default)]
pub struct AlertEvaluator {
    thresholds: AlertThresholds,
}

impl AlertEvaluator {
    pub fn new(thresholds: AlertThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &AlertThresholds {
        &self.thresholds
    }

    pub fn evaluate(&self, inputs: &AlertInputs) -> Vec<NewAlert> {
        let t = &self.thresholds;
        let net_usage = inputs.net_usage_kw();
        let mut alerts = Vec::new();

        if inputs.consumption_kw > t.high_usage_kw {
            alerts.push(NewAlert {
                title: HIGH_USAGE_TITLE.to_string(),
                message: format!(
                    "Current consumption of {:.1} kW is above normal levels. Consider turning off unused appliances.",
                    inputs.consumption_kw
                ),
                severity: Severity::Warning,
            });
        }

        let in_peak = (t.peak_start_hour..=t.peak_end_hour).contains(&inputs.hour);
        if in_peak && net_usage > t.peak_net_usage_kw {
            alerts.push(NewAlert {
                title: PEAK_PRICING_TITLE.to_string(),
                message: format!(
                    "You are drawing {:.1} kW from the grid during peak pricing hours. Shift flexible loads to later.",
                    net_usage
                ),
                severity: Severity::Info,
            });
        }

        if inputs.solar_kw > t.excellent_solar_kw {
            alerts.push(NewAlert {
                title: EXCELLENT_SOLAR_TITLE.to_string(),
                message: format!(
                    "Solar panels are producing {:.1} kW. Great time to run energy-intensive appliances.",
                    inputs.solar_kw
                ),
                severity: Severity::Info,
            });
        }

        if !alerts.is_empty() {
            info!(
                count = alerts.len(),
                consumption_kw = inputs.consumption_kw,
                solar_kw = inputs.solar_kw,
                net_usage_kw = net_usage,
                hour = inputs.hour,
                "alert rules triggered"
            );
        }

        alerts
    }
}
