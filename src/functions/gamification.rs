use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::info;
use uuid::Uuid;

use super::FunctionError;
use crate::domain::{Achievement, AchievementKind, EnergyDataPoint};
use crate::repo::Repositories;
use crate::series::{load_series, ReconcileConfig};

/// Thresholds behind each achievement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GamificationRules {
    pub peak_start_hour: u32,
    pub peak_end_hour: u32,
    /// Every peak-hour point must import at most this much (kW)
    pub peak_grid_limit_kw: f64,
    pub saver_min_points: usize,
    /// Mean consumption must stay strictly below this (kW)
    pub saver_mean_kw: f64,
}

impl Default for GamificationRules {
    fn default() -> Self {
        Self {
            peak_start_hour: 16,
            peak_end_hour: 20,
            peak_grid_limit_kw: 3.0,
            saver_min_points: 12,
            saver_mean_kw: 1.5,
        }
    }
}

impl GamificationRules {
    fn satisfied(&self, kind: AchievementKind, points: &[EnergyDataPoint]) -> bool {
        match kind {
            AchievementKind::SolarStarter => points.iter().any(|p| p.solar > 0.0),
            AchievementKind::GreenHour => points
                .iter()
                .any(|p| p.consumption > 0.0 && p.solar >= p.consumption),
            AchievementKind::PeakShaver => {
                let mut peak = points
                    .iter()
                    .filter(|p| {
                        (self.peak_start_hour..=self.peak_end_hour).contains(&p.timestamp.hour())
                    })
                    .peekable();
                peak.peek().is_some() && peak.all(|p| p.grid <= self.peak_grid_limit_kw)
            }
            AchievementKind::EnergySaver => {
                points.len() >= self.saver_min_points
                    && points.iter().map(|p| p.consumption).sum::<f64>() / (points.len() as f64)
                        < self.saver_mean_kw
            }
        }
    }

    /// Every achievement the series qualifies for, in catalogue order
    pub fn earned(&self, points: &[EnergyDataPoint]) -> Vec<AchievementKind> {
        AchievementKind::iter()
            .filter(|k| self.satisfied(*k, points))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamificationOutcome {
    pub new_achievements: Vec<Achievement>,
    pub total_points: u32,
}

/// Award every newly qualified achievement once and credit its points.
pub async fn check_gamification(
    repos: &Repositories,
    user_id: Uuid,
    now: DateTime<Utc>,
    reconcile_cfg: &ReconcileConfig,
    rules: &GamificationRules,
) -> Result<GamificationOutcome, FunctionError> {
    let series = load_series(repos, now, reconcile_cfg, Some(user_id)).await?;
    let mut new_achievements = Vec::new();

    for kind in rules.earned(&series.points) {
        let achievement = Achievement {
            id: Uuid::new_v4(),
            user_id,
            kind,
            title: kind.title().to_string(),
            points: kind.points(),
            earned_at: now,
        };
        if repos.gamification.award(achievement.clone()).await? {
            repos.gamification.add_points(user_id, kind.points()).await?;
            new_achievements.push(achievement);
        }
    }

    let total_points = repos.gamification.points(user_id).await?.total_points;
    if !new_achievements.is_empty() {
        info!(
            %user_id,
            awarded = new_achievements.len(),
            total_points,
            "achievements awarded"
        );
    }

    Ok(GamificationOutcome {
        new_achievements,
        total_points,
    })
}
