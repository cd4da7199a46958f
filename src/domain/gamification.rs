use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AchievementKind {
    /// First hour with any solar generation
    SolarStarter,
    /// An hour where solar covered all consumption
    GreenHour,
    /// A whole day of peak hours below the peak-usage limit
    PeakShaver,
    /// Average daily consumption below the saver limit
    EnergySaver,
}

impl AchievementKind {
    pub fn title(&self) -> &'static str {
        match self {
            AchievementKind::SolarStarter => "Solar Starter",
            AchievementKind::GreenHour => "Green Hour",
            AchievementKind::PeakShaver => "Peak Shaver",
            AchievementKind::EnergySaver => "Energy Saver",
        }
    }

    pub fn points(&self) -> u32 {
        match self {
            AchievementKind::SolarStarter => 10,
            AchievementKind::GreenHour => 25,
            AchievementKind::PeakShaver => 50,
            AchievementKind::EnergySaver => 40,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: AchievementKind,
    pub title: String,
    pub points: u32,
    pub earned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPoints {
    pub user_id: Uuid,
    pub total_points: u32,
}
