use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Logged household consumption sample (`energy_logs` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyLog {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    pub timestamp: DateTime<Utc>,
    pub consumption_kw: f64,
    /// Rows written by the demo simulation are subject to retention
    pub is_demo: bool,
}

impl EnergyLog {
    pub fn demo(timestamp: DateTime<Utc>, consumption_kw: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: None,
            timestamp,
            consumption_kw,
            is_demo: true,
        }
    }
}

/// Logged PV generation sample (`solar_data` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolarReading {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    pub timestamp: DateTime<Utc>,
    pub generation_kw: f64,
    pub is_demo: bool,
}

impl SolarReading {
    pub fn demo(timestamp: DateTime<Utc>, generation_kw: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: None,
            timestamp,
            generation_kw,
            is_demo: true,
        }
    }
}

/// High-resolution metered point with both sides already aligned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimePoint {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub consumption_kw: f64,
    pub solar_kw: f64,
}

/// Chartable point. `grid` is always derived and never negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyDataPoint {
    /// Display label, `HH:MM`
    pub time: String,
    pub consumption: f64,
    pub solar: f64,
    pub grid: f64,
    pub timestamp: DateTime<Utc>,
}

impl EnergyDataPoint {
    pub fn new(timestamp: DateTime<Utc>, consumption: f64, solar: f64) -> Self {
        Self {
            time: timestamp.format("%H:%M").to_string(),
            consumption,
            solar,
            grid: grid_import(consumption, solar),
            timestamp,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.consumption.is_finite() && self.solar.is_finite() && self.grid.is_finite()
    }
}

/// Power drawn from the grid once solar has been netted off.
pub fn grid_import(consumption_kw: f64, solar_kw: f64) -> f64 {
    (consumption_kw - solar_kw).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn grid_is_never_negative() {
        assert_eq!(grid_import(1.0, 3.0), 0.0);
        assert!((grid_import(3.0, 1.0) - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn data_point_label_is_hour_minute() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 15, 7, 5, 0).unwrap();
        let p = EnergyDataPoint::new(ts, 2.0, 0.5);
        assert_eq!(p.time, "07:05");
        assert!((p.grid - 1.5).abs() < 1e-9);
        assert!(p.is_finite());
    }

    #[test]
    fn nan_point_is_not_finite() {
        let p = EnergyDataPoint::new(Utc::now(), f64::NAN, 0.5);
        assert!(!p.is_finite());
    }
}
