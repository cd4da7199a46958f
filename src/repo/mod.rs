//! Repository traits for the dashboard tables and the change feed.
//!
//! The hosted backend's tables are reached only through these traits so the
//! simulation, reconciliation and HTTP layers never see a storage engine.
//! [`MemoryStore`] implements every trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::{AsRefStr, Display};
use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::domain::{
    Achievement, AchievementKind, Alert, BackfillBatch, EnergyLog, RealtimePoint, SolarReading,
    UserPoints,
};

pub mod memory;

pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{table} row {id} not found")]
    NotFound { table: ChangeTable, id: Uuid },
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ChangeTable {
    EnergyLogs,
    SolarData,
    RealtimeEnergy,
    Alerts,
    WeatherData,
    GridPrices,
    Co2Data,
    RawEnergyData,
    ProcessedFeatures,
    Achievements,
    UserPoints,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChangeOp {
    Insert,
    Update,
    Delete,
}

/// Notification emitted after every committed mutation.
/// Bulk operations emit one event per table with no row id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub table: ChangeTable,
    pub op: ChangeOp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub at: DateTime<Utc>,
}

/// Row counts written by one backfill run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordsCreated {
    pub energy_logs: usize,
    pub solar_data: usize,
    pub weather_data: usize,
    pub grid_prices: usize,
    pub co2_data: usize,
    pub raw_energy_data: usize,
    pub processed_features: usize,
}

impl RecordsCreated {
    pub fn total(&self) -> usize {
        self.energy_logs
            + self.solar_data
            + self.weather_data
            + self.grid_prices
            + self.co2_data
            + self.raw_energy_data
            + self.processed_features
    }
}

/// Demo rows removed by a retention pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgeCounts {
    pub energy_logs: usize,
    pub solar_data: usize,
    pub realtime_energy: usize,
    pub alerts: usize,
}

impl PurgeCounts {
    pub fn total(&self) -> usize {
        self.energy_logs + self.solar_data + self.realtime_energy + self.alerts
    }
}

#[async_trait]
pub trait EnergyRepository: Send + Sync {
    async fn insert_energy_log(&self, log: EnergyLog) -> StoreResult<()>;
    async fn insert_solar_reading(&self, reading: SolarReading) -> StoreResult<()>;
    async fn insert_realtime_point(&self, point: RealtimePoint) -> StoreResult<()>;

    /// Logs at or after `since`, ascending. `user_id = None` returns every row.
    async fn energy_logs_since(
        &self,
        since: DateTime<Utc>,
        user_id: Option<Uuid>,
    ) -> StoreResult<Vec<EnergyLog>>;

    async fn solar_readings_since(
        &self,
        since: DateTime<Utc>,
        user_id: Option<Uuid>,
    ) -> StoreResult<Vec<SolarReading>>;

    async fn realtime_points_since(&self, since: DateTime<Utc>) -> StoreResult<Vec<RealtimePoint>>;

    /// Delete demo energy logs and solar readings older than `cutoff`.
    /// Returns `(energy_logs, solar_data)` counts.
    async fn purge_demo_before(&self, cutoff: DateTime<Utc>) -> StoreResult<(usize, usize)>;

    /// Delete real-time points older than `cutoff`. Every point is clock output.
    async fn purge_realtime_before(&self, cutoff: DateTime<Utc>) -> StoreResult<usize>;
}

#[async_trait]
pub trait AlertRepository: Send + Sync {
    async fn insert_alert(&self, alert: Alert) -> StoreResult<Alert>;
    /// Newest first
    async fn list_alerts(&self, limit: Option<usize>) -> StoreResult<Vec<Alert>>;
    async fn unread_count(&self) -> StoreResult<usize>;
    async fn mark_read(&self, id: Uuid) -> StoreResult<Alert>;
    async fn mark_all_read(&self) -> StoreResult<usize>;
    async fn delete_alert(&self, id: Uuid) -> StoreResult<()>;
    async fn purge_demo_alerts_before(&self, cutoff: DateTime<Utc>) -> StoreResult<usize>;
}

#[async_trait]
pub trait HistoryRepository: Send + Sync {
    async fn insert_backfill(&self, batch: BackfillBatch) -> StoreResult<RecordsCreated>;
}

#[async_trait]
pub trait GamificationRepository: Send + Sync {
    async fn has_achievement(&self, user_id: Uuid, kind: AchievementKind) -> StoreResult<bool>;
    /// Returns `false` without writing when the user already holds that kind.
    async fn award(&self, achievement: Achievement) -> StoreResult<bool>;
    async fn points(&self, user_id: Uuid) -> StoreResult<UserPoints>;
    async fn add_points(&self, user_id: Uuid, points: u32) -> StoreResult<UserPoints>;
}

pub trait ChangeFeed: Send + Sync {
    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent>;
}

/// Handles to every repository, shared by the controller and handlers.
#[derive(Clone)]
pub struct Repositories {
    pub energy: Arc<dyn EnergyRepository>,
    pub alerts: Arc<dyn AlertRepository>,
    pub history: Arc<dyn HistoryRepository>,
    pub gamification: Arc<dyn GamificationRepository>,
    pub changes: Arc<dyn ChangeFeed>,
}

impl Repositories {
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: EnergyRepository
            + AlertRepository
            + HistoryRepository
            + GamificationRepository
            + ChangeFeed
            + 'static,
    {
        Self {
            energy: store.clone(),
            alerts: store.clone(),
            history: store.clone(),
            gamification: store.clone(),
            changes: store,
        }
    }

    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(MemoryStore::new()))
    }

    /// Retention pass over the demo tables and the real-time feed
    pub async fn purge_demo_before(&self, cutoff: DateTime<Utc>) -> StoreResult<PurgeCounts> {
        let (energy_logs, solar_data) = self.energy.purge_demo_before(cutoff).await?;
        let realtime_energy = self.energy.purge_realtime_before(cutoff).await?;
        let alerts = self.alerts.purge_demo_alerts_before(cutoff).await?;
        Ok(PurgeCounts {
            energy_logs,
            solar_data,
            realtime_energy,
            alerts,
        })
    }
}
