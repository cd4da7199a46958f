//! # Simulated Appliances
//!
//! Built-in device library, per-appliance usage patterns, and firing of
//! scheduled tasks (with daily/weekly/monthly recurrence).

use chrono::{DateTime, Datelike, Duration, Months, Utc};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{
    DeviceCategory, DeviceSettings, DeviceStatus, DeviceTemplate, RecurrenceKind, ScheduledTask,
    SimulatedDevice, TaskAction,
};

/// Relative standard deviation of appliance draw around its nominal value
const USAGE_NOISE_STD_DEV: f64 = 0.05;
/// Load change per °C of setpoint away from the template default
const SETPOINT_SENSITIVITY: f64 = 0.05;

fn template(
    id: &str,
    name: &str,
    category: DeviceCategory,
    power_rating_w: f64,
    duty_cycle: f64,
    default_settings: DeviceSettings,
) -> DeviceTemplate {
    DeviceTemplate {
        id: id.to_string(),
        name: name.to_string(),
        category,
        power_rating_w,
        duty_cycle,
        default_settings,
    }
}

/// Appliances a user can add to the simulation
pub fn device_library() -> Vec<DeviceTemplate> {
    let thermostat = |t: f64| DeviceSettings {
        temperature: Some(t),
        brightness: None,
    };
    let dimmer = DeviceSettings {
        temperature: None,
        brightness: Some(100.0),
    };

    vec![
        template("refrigerator", "Refrigerator", DeviceCategory::Kitchen, 150.0, 0.4, thermostat(4.0)),
        template("dishwasher", "Dishwasher", DeviceCategory::Kitchen, 1800.0, 0.8, DeviceSettings::default()),
        template("oven", "Electric Oven", DeviceCategory::Kitchen, 2400.0, 0.7, thermostat(180.0)),
        template("washing-machine", "Washing Machine", DeviceCategory::Laundry, 2000.0, 0.6, DeviceSettings::default()),
        template("dryer", "Tumble Dryer", DeviceCategory::Laundry, 3000.0, 0.9, DeviceSettings::default()),
        template("heat-pump", "Heat Pump", DeviceCategory::Climate, 3000.0, 0.7, thermostat(21.0)),
        template("air-conditioner", "Air Conditioner", DeviceCategory::Climate, 2500.0, 0.75, thermostat(22.0)),
        template("smart-lights", "Smart Lights", DeviceCategory::Lighting, 60.0, 1.0, dimmer),
        template("television", "Television", DeviceCategory::Entertainment, 120.0, 1.0, DeviceSettings::default()),
        template("ev-charger", "EV Charger", DeviceCategory::Mobility, 7200.0, 1.0, DeviceSettings::default()),
        template("water-heater", "Water Heater", DeviceCategory::Water, 4000.0, 0.5, thermostat(55.0)),
    ]
}

pub fn find_template(id: &str) -> Option<DeviceTemplate> {
    device_library().into_iter().find(|t| t.id == id)
}

/// Nominal draw in kW for a running device before noise
pub fn nominal_usage_kw(device: &SimulatedDevice, template: Option<&DeviceTemplate>) -> f64 {
    if !device.is_on() {
        return 0.0;
    }

    let duty_cycle = template.map(|t| t.duty_cycle).unwrap_or(1.0);
    let mut kw = device.power_rating_w / 1000.0 * duty_cycle;

    if let Some(brightness) = device.settings.brightness {
        kw *= (brightness / 100.0).clamp(0.0, 1.0);
    }

    let default_setpoint = template.and_then(|t| t.default_settings.temperature);
    if let (Some(setpoint), Some(default)) = (device.settings.temperature, default_setpoint) {
        // Cooling devices (setpoint below ambient) work harder as the setpoint drops.
        let cooling = template.map_or(false, |t| {
            matches!(t.id.as_str(), "refrigerator" | "air-conditioner")
        });
        let delta = if cooling { default - setpoint } else { setpoint - default };
        kw *= (1.0 + SETPOINT_SENSITIVITY * delta).clamp(0.5, 1.5);
    }

    kw
}

/// Draw in kW with multiplicative noise; zero unless the device is on
pub fn sample_usage_kw<R: Rng>(
    device: &SimulatedDevice,
    template: Option<&DeviceTemplate>,
    rng: &mut R,
) -> f64 {
    let nominal = nominal_usage_kw(device, template);
    if nominal <= 0.0 {
        return 0.0;
    }
    let factor = Normal::new(1.0, USAGE_NOISE_STD_DEV)
        .map(|n| n.sample(rng))
        .unwrap_or(1.0);
    (nominal * factor).max(0.0)
}

/// A task that fired during a tick
#[derive(Debug, Clone, Serialize)]
pub struct FiredTask {
    pub task_id: Uuid,
    pub device_id: Uuid,
    pub action: TaskAction,
    pub fired_at: DateTime<Utc>,
    /// Next occurrence for recurring tasks
    pub rescheduled_for: Option<DateTime<Utc>>,
}

/// Apply a task action to its device
pub fn apply_action(device: &mut SimulatedDevice, action: TaskAction, value: Option<f64>) {
    match action {
        TaskAction::TurnOn => device.status = DeviceStatus::On,
        TaskAction::TurnOff => device.status = DeviceStatus::Off,
        TaskAction::SetTemperature => {
            if let Some(v) = value {
                device.settings.temperature = Some(v);
            }
        }
        TaskAction::SetBrightness => {
            if let Some(v) = value {
                device.settings.brightness = Some(v.clamp(0.0, 100.0));
            }
        }
    }
}

/// Fire every task due at or before `now`.
///
/// Tasks that point at another device are inert and left untouched. One-shot
/// tasks are removed once fired; recurring tasks move to their next
/// occurrence after `now`.
pub fn fire_due_tasks(device: &mut SimulatedDevice, now: DateTime<Utc>) -> Vec<FiredTask> {
    let mut fired = Vec::new();
    let mut remaining = Vec::with_capacity(device.scheduled_tasks.len());
    let tasks = std::mem::take(&mut device.scheduled_tasks);

    for mut task in tasks {
        if task.device_id != device.id || task.scheduled_time > now {
            remaining.push(task);
            continue;
        }

        apply_action(device, task.action, task.value);

        let next = next_occurrence(&task, now);
        fired.push(FiredTask {
            task_id: task.id,
            device_id: device.id,
            action: task.action,
            fired_at: now,
            rescheduled_for: next,
        });

        if let Some(next) = next {
            task.scheduled_time = next;
            remaining.push(task);
        }
    }

    remaining.sort_by_key(|t| t.scheduled_time);
    device.scheduled_tasks = remaining;
    fired
}

/// First occurrence of a recurring task strictly after `after`
pub fn next_occurrence(task: &ScheduledTask, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let recurrence = task.recurrence.as_ref()?;
    let mut next = task.scheduled_time;

    // Catch up when simulated time jumped over several occurrences.
    for _ in 0..10_000 {
        next = match recurrence.kind {
            RecurrenceKind::Daily => next + Duration::days(1),
            RecurrenceKind::Weekly => next_weekly(next, &recurrence.days),
            RecurrenceKind::Monthly => next.checked_add_months(Months::new(1))?,
        };
        if next > after {
            return Some(next);
        }
    }
    None
}

fn next_weekly(from: DateTime<Utc>, days: &[u32]) -> DateTime<Utc> {
    if days.is_empty() {
        return from + Duration::weeks(1);
    }
    (1..=7)
        .map(|offset| from + Duration::days(offset))
        .find(|candidate| days.contains(&candidate.weekday().num_days_from_sunday()))
        .unwrap_or_else(|| from + Duration::weeks(1))
}
