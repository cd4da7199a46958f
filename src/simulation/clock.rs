//! # Simulation Clock
//!
//! Owns the single mutable [`SimulationState`] of a session and advances it.
//! Each tick moves simulated time forward by the wall-clock interval times the
//! speed multiplier, then recomputes weather, solar, household baseline,
//! device usage, price and alerts.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::devices::{device_library, fire_due_tasks, sample_usage_kw, FiredTask};
use super::{
    seeded_rng, AlertEvaluator, AlertInputs, AlertThresholds, EnergySample, Environment,
    EnvironmentConfig, SimulationError,
};
use crate::domain::{
    DeviceStatus, DeviceTemplate, NewAlert, Recurrence, ScheduledTask, SimulatedDevice,
    TaskAction, WeatherState,
};

/// Session snapshot. `total_consumption` is always the household baseline plus
/// the usage of every device that is on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationState {
    pub devices: Vec<SimulatedDevice>,
    pub current_time: DateTime<Utc>,
    pub weather: WeatherState,
    /// kW
    pub solar_production: f64,
    /// $/kWh
    pub grid_price: f64,
    /// kW
    pub total_consumption: f64,
    /// Household draw not attributed to a simulated device (kW)
    pub baseline_consumption: f64,
    pub is_running: bool,
    pub speed_multiplier: f64,
}

impl SimulationState {
    pub fn device_usage_kw(&self) -> f64 {
        self.devices
            .iter()
            .filter(|d| d.is_on())
            .map(|d| d.current_usage_kw)
            .sum()
    }

    pub fn net_usage_kw(&self) -> f64 {
        self.total_consumption - self.solar_production
    }

    fn device_mut(&mut self, id: Uuid) -> Result<&mut SimulatedDevice, SimulationError> {
        self.devices
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(SimulationError::DeviceNotFound(id))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockConfig {
    pub environment: EnvironmentConfig,
    pub alerts: AlertThresholds,
    pub speed_multiplier: f64,
    pub max_speed_multiplier: f64,
    /// Seed for device usage noise (None = random)
    pub random_seed: Option<u64>,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            environment: EnvironmentConfig::default(),
            alerts: AlertThresholds::default(),
            speed_multiplier: 1.0,
            max_speed_multiplier: 1000.0,
            random_seed: None,
        }
    }
}

/// Result of one recomputation
#[derive(Debug, Clone, Serialize)]
pub struct TickReport {
    pub at: DateTime<Utc>,
    /// Sample with consumption already including device usage
    pub sample: EnergySample,
    pub alerts: Vec<NewAlert>,
    pub fired_tasks: Vec<FiredTask>,
}

pub struct SimulationClock {
    env: Environment,
    evaluator: AlertEvaluator,
    library: Vec<DeviceTemplate>,
    state: SimulationState,
    rng: StdRng,
    default_speed: f64,
    max_speed: f64,
}

impl SimulationClock {
    pub fn new(config: ClockConfig, now: DateTime<Utc>) -> Self {
        let speed = config.speed_multiplier.clamp(f64::MIN_POSITIVE, config.max_speed_multiplier);
        let mut clock = Self {
            env: Environment::new(config.environment),
            evaluator: AlertEvaluator::new(config.alerts),
            library: device_library(),
            state: SimulationState {
                devices: Vec::new(),
                current_time: now,
                weather: WeatherState::default(),
                solar_production: 0.0,
                grid_price: 0.0,
                total_consumption: 0.0,
                baseline_consumption: 0.0,
                is_running: false,
                speed_multiplier: speed,
            },
            rng: seeded_rng(config.random_seed),
            default_speed: speed,
            max_speed: config.max_speed_multiplier,
        };
        clock.step();
        clock
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn start(&mut self) {
        self.state.is_running = true;
    }

    pub fn stop(&mut self) {
        self.state.is_running = false;
    }

    pub fn set_speed(&mut self, multiplier: f64) -> Result<(), SimulationError> {
        if !multiplier.is_finite() || multiplier <= 0.0 || multiplier > self.max_speed {
            return Err(SimulationError::InvalidSpeed {
                got: multiplier,
                max: self.max_speed,
            });
        }
        self.state.speed_multiplier = multiplier;
        Ok(())
    }

    /// Remove all devices and restart the session at `now`, stopped.
    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.state.devices.clear();
        self.state.current_time = now;
        self.state.is_running = false;
        self.state.speed_multiplier = self.default_speed;
        self.step();
    }

    pub fn add_device(&mut self, template_id: &str) -> Result<SimulatedDevice, SimulationError> {
        let template = self
            .library
            .iter()
            .find(|t| t.id == template_id)
            .ok_or_else(|| SimulationError::UnknownTemplate(template_id.to_string()))?;
        let device = SimulatedDevice::from_template(template, self.state.current_time);
        self.state.devices.push(device.clone());
        Ok(device)
    }

    pub fn remove_device(&mut self, id: Uuid) -> Result<(), SimulationError> {
        let before = self.state.devices.len();
        self.state.devices.retain(|d| d.id != id);
        if self.state.devices.len() == before {
            return Err(SimulationError::DeviceNotFound(id));
        }
        self.refresh_totals();
        Ok(())
    }

    pub fn set_device_status(
        &mut self,
        id: Uuid,
        status: DeviceStatus,
    ) -> Result<SimulatedDevice, SimulationError> {
        let now = self.state.current_time;
        let device = self.state.device_mut(id)?;
        device.status = status;
        let mut snapshot = device.clone();
        let template = self.library.iter().find(|t| t.id == snapshot.template_id);
        let usage = sample_usage_kw(&snapshot, template, &mut self.rng);

        let device = self.state.device_mut(id)?;
        device.current_usage_kw = usage;
        device.last_usage_update = now;
        snapshot.current_usage_kw = usage;
        snapshot.last_usage_update = now;

        self.refresh_totals();
        Ok(snapshot)
    }

    pub fn schedule_task(
        &mut self,
        device_id: Uuid,
        action: TaskAction,
        scheduled_time: DateTime<Utc>,
        value: Option<f64>,
        recurrence: Option<Recurrence>,
    ) -> Result<ScheduledTask, SimulationError> {
        if action.requires_value() && value.map_or(true, |v| !v.is_finite()) {
            return Err(SimulationError::InvalidTask(format!(
                "{action} requires a numeric value"
            )));
        }
        if action == TaskAction::SetBrightness && value.map_or(false, |v| !(0.0..=100.0).contains(&v)) {
            return Err(SimulationError::InvalidTask(
                "brightness must be between 0 and 100".to_string(),
            ));
        }
        if let Some(r) = &recurrence {
            if r.days.iter().any(|d| *d > 6) {
                return Err(SimulationError::InvalidTask(
                    "recurrence days must be 0 (Sunday) to 6 (Saturday)".to_string(),
                ));
            }
        }

        let device = self.state.device_mut(device_id)?;
        let task = ScheduledTask {
            id: Uuid::new_v4(),
            device_id,
            action,
            scheduled_time,
            value,
            recurrence,
        };
        device.push_task(task.clone());
        Ok(task)
    }

    pub fn cancel_task(&mut self, device_id: Uuid, task_id: Uuid) -> Result<(), SimulationError> {
        let device = self.state.device_mut(device_id)?;
        let before = device.scheduled_tasks.len();
        device.scheduled_tasks.retain(|t| t.id != task_id);
        if device.scheduled_tasks.len() == before {
            return Err(SimulationError::TaskNotFound(task_id));
        }
        Ok(())
    }

    /// Advance by a wall-clock interval scaled by the speed multiplier.
    /// Returns `None` while the session is stopped.
    pub fn tick(&mut self, wall_elapsed: std::time::Duration) -> Option<TickReport> {
        if !self.state.is_running {
            return None;
        }
        let simulated_ms = wall_elapsed.as_secs_f64() * 1000.0 * self.state.speed_multiplier;
        Some(self.advance(Duration::milliseconds(simulated_ms.round() as i64)))
    }

    /// Advance simulated time by `delta` and recompute, running or not
    pub fn advance(&mut self, delta: Duration) -> TickReport {
        self.state.current_time += delta;
        self.step()
    }

    fn step(&mut self) -> TickReport {
        let now = self.state.current_time;
        let (hour, minute) = self.env.local_hour_minute(now);
        let base = self.env.sample(hour, minute);

        let mut fired_tasks = Vec::new();
        for device in self.state.devices.iter_mut() {
            fired_tasks.extend(fire_due_tasks(device, now));
            let template = self.library.iter().find(|t| t.id == device.template_id);
            device.current_usage_kw = sample_usage_kw(device, template, &mut self.rng);
            device.last_usage_update = now;
        }

        self.state.weather = base.weather;
        self.state.solar_production = base.solar_kw;
        self.state.grid_price = base.grid_price;
        self.state.baseline_consumption = base.consumption_kw;
        self.refresh_totals();

        let sample = EnergySample::compose(
            base.weather,
            self.state.total_consumption,
            base.solar_kw,
            self.env.pricing(),
            hour,
            minute,
        );
        let alerts = self.evaluator.evaluate(&AlertInputs {
            consumption_kw: sample.consumption_kw,
            solar_kw: sample.solar_kw,
            hour,
        });

        debug!(
            time = %now,
            consumption_kw = sample.consumption_kw,
            solar_kw = sample.solar_kw,
            grid_price = sample.grid_price,
            devices_on = self.state.devices.iter().filter(|d| d.is_on()).count(),
            fired_tasks = fired_tasks.len(),
            "simulation tick"
        );

        TickReport {
            at: now,
            sample,
            alerts,
            fired_tasks,
        }
    }

    fn refresh_totals(&mut self) {
        self.state.total_consumption = self.state.baseline_consumption + self.state.device_usage_kw();
    }
}
