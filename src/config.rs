use anyhow::{ensure, Result};
use chrono::Duration;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::functions::GamificationRules;
use crate::series::ReconcileConfig;
use crate::simulation::{AlertThresholds, ClockConfig, EnvironmentConfig, TariffConfig};

pub const ENV_PREFIX: &str = "ENERGY__";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub simulation: SimulationConfig,
    pub tariff: TariffConfig,
    pub alerts: AlertThresholds,
    pub retention: RetentionConfig,
    pub reconciliation: ReconciliationConfig,
    pub gamification: GamificationRules,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            enable_cors: true,
            request_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Wall-clock cadence of the clock task
    pub tick_seconds: u64,
    pub speed_multiplier: f64,
    pub max_speed_multiplier: f64,
    pub solar_capacity_kw: f64,
    pub timezone_offset_hours: i32,
    /// Start the clock at boot instead of waiting for a start request
    pub autostart: bool,
    pub random_seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_seconds: 5,
            speed_multiplier: 1.0,
            max_speed_multiplier: 1000.0,
            solar_capacity_kw: 8.0,
            timezone_offset_hours: 0,
            autostart: false,
            random_seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Demo rows older than this are purged on every simulation run
    pub demo_hours: i64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self { demo_hours: 24 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationConfig {
    pub window_hours: i64,
    pub match_window_minutes: i64,
    /// Fewer valid points than this and charts show the fallback series
    pub min_points: usize,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            window_hours: 24,
            match_window_minutes: 30,
            min_points: crate::series::MIN_CHART_POINTS,
        }
    }
}

impl Config {
    /// Built-in defaults, then `config/default.toml`, then `ENERGY__*` env vars.
    pub fn load() -> Result<Self> {
        Self::load_from("config/default.toml")
    }

    pub fn load_from(path: &str) -> Result<Self> {
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));
        let cfg: Config = figment.extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let sim = &self.simulation;
        ensure!(sim.tick_seconds > 0, "simulation.tick_seconds must be positive");
        ensure!(
            sim.max_speed_multiplier > 0.0
                && sim.speed_multiplier > 0.0
                && sim.speed_multiplier <= sim.max_speed_multiplier,
            "simulation.speed_multiplier must be in (0, {}]",
            sim.max_speed_multiplier
        );
        ensure!(
            sim.solar_capacity_kw.is_finite() && sim.solar_capacity_kw >= 0.0,
            "simulation.solar_capacity_kw must be a non-negative number"
        );
        ensure!(
            (-12..=14).contains(&sim.timezone_offset_hours),
            "simulation.timezone_offset_hours out of range"
        );
        ensure!(self.retention.demo_hours > 0, "retention.demo_hours must be positive");
        ensure!(
            self.reconciliation.window_hours > 0 && self.reconciliation.match_window_minutes >= 0,
            "reconciliation windows must be positive"
        );
        Ok(())
    }

    pub fn environment_config(&self) -> EnvironmentConfig {
        let mut env = EnvironmentConfig {
            tariff: self.tariff,
            ..EnvironmentConfig::default()
        }
        .with_pv_capacity(self.simulation.solar_capacity_kw)
        .with_timezone_offset(self.simulation.timezone_offset_hours);
        if let Some(seed) = self.simulation.random_seed {
            env = env.with_random_seed(seed);
        }
        env
    }

    pub fn clock_config(&self) -> ClockConfig {
        ClockConfig {
            environment: self.environment_config(),
            alerts: self.alerts,
            speed_multiplier: self.simulation.speed_multiplier,
            max_speed_multiplier: self.simulation.max_speed_multiplier,
            random_seed: self.simulation.random_seed.map(|s| s.wrapping_add(4)),
        }
    }

    pub fn reconcile_config(&self) -> ReconcileConfig {
        ReconcileConfig {
            window: Duration::hours(self.reconciliation.window_hours),
            match_window: Duration::minutes(self.reconciliation.match_window_minutes),
        }
    }

    pub fn retention(&self) -> Duration {
        Duration::hours(self.retention.demo_hours)
    }

    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.simulation.tick_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = Config::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.retention(), Duration::hours(24));
        assert_eq!(cfg.reconcile_config(), ReconcileConfig::default());
        assert_eq!(cfg.tariff.peak, 0.25);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = Config::load_from("does/not/exist.toml").unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.alerts.high_usage_kw, 6.0);
    }

    #[test]
    fn rejects_bad_speed() {
        let mut cfg = Config::default();
        cfg.simulation.speed_multiplier = 0.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn environment_uses_configured_capacity() {
        let mut cfg = Config::default();
        cfg.simulation.solar_capacity_kw = 5.0;
        cfg.simulation.random_seed = Some(1);
        let env = cfg.environment_config();
        assert_eq!(env.solar.max_capacity_kw, 5.0);
        assert_eq!(env.weather.random_seed, Some(1));
    }

    #[test]
    fn socket_addr_parses() {
        let addr = ServerConfig::default().socket_addr().unwrap();
        assert_eq!(addr.port(), 8080);
    }
}
