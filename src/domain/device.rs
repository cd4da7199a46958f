use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeviceStatus {
    On,
    Off,
    Standby,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeviceCategory {
    Kitchen,
    Laundry,
    Climate,
    Lighting,
    Entertainment,
    Mobility,
    Water,
}

/// Catalogue entry a simulated device is created from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceTemplate {
    pub id: String,
    pub name: String,
    pub category: DeviceCategory,
    /// Nameplate rating in watts
    pub power_rating_w: f64,
    /// Fraction of time the appliance actually draws its rating while on
    pub duty_cycle: f64,
    pub default_settings: DeviceSettings,
}

/// Adjustable knobs; only the ones a template supports are populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceSettings {
    /// Target temperature (°C) for climate and water devices
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Brightness percent (0-100) for lighting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskAction {
    TurnOn,
    TurnOff,
    SetTemperature,
    SetBrightness,
}

impl TaskAction {
    /// Whether the action needs a numeric `value`
    pub fn requires_value(&self) -> bool {
        matches!(self, TaskAction::SetTemperature | TaskAction::SetBrightness)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceKind {
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    #[serde(rename = "type")]
    pub kind: RecurrenceKind,
    /// Weekday numbers (0 = Sunday .. 6 = Saturday) for weekly recurrence.
    #[serde(default)]
    pub days: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub id: Uuid,
    /// Weak reference; a task whose device is gone never fires.
    pub device_id: Uuid,
    pub action: TaskAction,
    pub scheduled_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatedDevice {
    pub id: Uuid,
    pub template_id: String,
    pub name: String,
    pub status: DeviceStatus,
    pub power_rating_w: f64,
    /// Instantaneous draw in kW
    pub current_usage_kw: f64,
    /// Kept ordered by `scheduled_time`
    pub scheduled_tasks: Vec<ScheduledTask>,
    pub settings: DeviceSettings,
    pub last_usage_update: DateTime<Utc>,
}

impl SimulatedDevice {
    pub fn from_template(template: &DeviceTemplate, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            template_id: template.id.clone(),
            name: template.name.clone(),
            status: DeviceStatus::Off,
            power_rating_w: template.power_rating_w,
            current_usage_kw: 0.0,
            scheduled_tasks: Vec::new(),
            settings: template.default_settings.clone(),
            last_usage_update: now,
        }
    }

    pub fn is_on(&self) -> bool {
        self.status == DeviceStatus::On
    }

    /// Insert keeping tasks ordered by scheduled time
    pub fn push_task(&mut self, task: ScheduledTask) {
        let idx = self
            .scheduled_tasks
            .partition_point(|t| t.scheduled_time <= task.scheduled_time);
        self.scheduled_tasks.insert(idx, task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn template() -> DeviceTemplate {
        DeviceTemplate {
            id: "tv".into(),
            name: "Television".into(),
            category: DeviceCategory::Entertainment,
            power_rating_w: 120.0,
            duty_cycle: 1.0,
            default_settings: DeviceSettings::default(),
        }
    }

    #[test]
    fn new_device_starts_off() {
        let d = SimulatedDevice::from_template(&template(), Utc::now());
        assert_eq!(d.status, DeviceStatus::Off);
        assert_eq!(d.current_usage_kw, 0.0);
        assert_eq!(d.template_id, "tv");
    }

    #[test]
    fn tasks_stay_ordered() {
        let now = Utc::now();
        let mut d = SimulatedDevice::from_template(&template(), now);
        for offset in [30, 10, 20] {
            d.push_task(ScheduledTask {
                id: Uuid::new_v4(),
                device_id: d.id,
                action: TaskAction::TurnOn,
                scheduled_time: now + Duration::minutes(offset),
                value: None,
                recurrence: None,
            });
        }
        let times: Vec<_> = d.scheduled_tasks.iter().map(|t| t.scheduled_time).collect();
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn recurrence_uses_type_key() {
        let r: Recurrence = serde_json::from_str(r#"{"type":"weekly","days":[1,3]}"#).unwrap();
        assert_eq!(r.kind, RecurrenceKind::Weekly);
        assert_eq!(r.days, vec![1, 3]);
    }
}
