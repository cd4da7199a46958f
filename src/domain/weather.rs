use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Sky condition shown on the weather widget
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum WeatherCondition {
    Sunny,
    PartlyCloudy,
    Cloudy,
    Rainy,
    Stormy,
}

/// Weather snapshot for a single simulation tick. Never persisted as a source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherState {
    /// Air temperature (°C)
    pub temperature: f64,
    /// Cloud cover fraction (0.0-1.0)
    pub cloud_cover: f64,
    /// Wind speed (m/s)
    pub wind_speed: f64,
    /// Relative humidity (%)
    pub humidity: f64,
    pub condition: WeatherCondition,
}

impl Default for WeatherState {
    fn default() -> Self {
        Self {
            temperature: 20.0,
            cloud_cover: 0.3,
            wind_speed: 3.0,
            humidity: 60.0,
            condition: WeatherCondition::Sunny,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_wire_names_are_kebab_case() {
        assert_eq!(WeatherCondition::PartlyCloudy.to_string(), "partly-cloudy");
        assert_eq!(
            serde_json::to_string(&WeatherCondition::Stormy).unwrap(),
            "\"stormy\""
        );
        assert_eq!(
            "partly-cloudy".parse::<WeatherCondition>().unwrap(),
            WeatherCondition::PartlyCloudy
        );
    }

    #[test]
    fn weather_state_serializes_camel_case() {
        let json = serde_json::to_value(WeatherState::default()).unwrap();
        assert_eq!(json["cloudCover"], 0.3);
        assert_eq!(json["condition"], "sunny");
    }
}
