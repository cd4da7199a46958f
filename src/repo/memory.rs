//! In-memory store backing every repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use super::{
    AlertRepository, ChangeEvent, ChangeFeed, ChangeOp, ChangeTable, EnergyRepository,
    GamificationRepository, HistoryRepository, RecordsCreated, StoreError, StoreResult,
};
use crate::domain::{
    Achievement, AchievementKind, Alert, BackfillBatch, Co2Record, EnergyLog, GridPriceRecord,
    ProcessedFeatureRecord, RawEnergyRecord, RealtimePoint, SolarReading, UserPoints,
    WeatherRecord,
};

const CHANGE_CHANNEL_CAPACITY: usize = 256;

#[derive(Default)]
struct Tables {
    energy_logs: Vec<EnergyLog>,
    solar_data: Vec<SolarReading>,
    realtime: Vec<RealtimePoint>,
    alerts: Vec<Alert>,
    weather_data: Vec<WeatherRecord>,
    grid_prices: Vec<GridPriceRecord>,
    co2_data: Vec<Co2Record>,
    raw_energy_data: Vec<RawEnergyRecord>,
    processed_features: Vec<ProcessedFeatureRecord>,
    achievements: Vec<Achievement>,
    points: HashMap<Uuid, u32>,
}

pub struct MemoryStore {
    tables: RwLock<Tables>,
    changes: broadcast::Sender<ChangeEvent>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            tables: RwLock::new(Tables::default()),
            changes,
        }
    }

    fn emit(&self, table: ChangeTable, op: ChangeOp, id: Option<Uuid>) {
        // No subscribers is not an error.
        let _ = self.changes.send(ChangeEvent {
            table,
            op,
            id,
            at: Utc::now(),
        });
    }
}

fn ensure_finite(field: &str, value: f64) -> StoreResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(StoreError::InvalidRecord(format!("{field} must be finite, got {value}")))
    }
}

fn insert_sorted<T>(rows: &mut Vec<T>, row: T, key: impl Fn(&T) -> DateTime<Utc>) {
    let ts = key(&row);
    let idx = rows.partition_point(|r| key(r) <= ts);
    rows.insert(idx, row);
}

fn matches_user(row_user: Option<Uuid>, filter: Option<Uuid>) -> bool {
    filter.map_or(true, |u| row_user == Some(u))
}

#[async_trait]
impl EnergyRepository for MemoryStore {
    async fn insert_energy_log(&self, log: EnergyLog) -> StoreResult<()> {
        ensure_finite("consumption_kw", log.consumption_kw)?;
        let id = log.id;
        insert_sorted(&mut self.tables.write().energy_logs, log, |l| l.timestamp);
        self.emit(ChangeTable::EnergyLogs, ChangeOp::Insert, Some(id));
        Ok(())
    }

    async fn insert_solar_reading(&self, reading: SolarReading) -> StoreResult<()> {
        ensure_finite("generation_kw", reading.generation_kw)?;
        let id = reading.id;
        insert_sorted(&mut self.tables.write().solar_data, reading, |r| r.timestamp);
        self.emit(ChangeTable::SolarData, ChangeOp::Insert, Some(id));
        Ok(())
    }

    async fn insert_realtime_point(&self, point: RealtimePoint) -> StoreResult<()> {
        ensure_finite("consumption_kw", point.consumption_kw)?;
        ensure_finite("solar_kw", point.solar_kw)?;
        let id = point.id;
        insert_sorted(&mut self.tables.write().realtime, point, |p| p.timestamp);
        self.emit(ChangeTable::RealtimeEnergy, ChangeOp::Insert, Some(id));
        Ok(())
    }

    async fn energy_logs_since(
        &self,
        since: DateTime<Utc>,
        user_id: Option<Uuid>,
    ) -> StoreResult<Vec<EnergyLog>> {
        let tables = self.tables.read();
        Ok(tables
            .energy_logs
            .iter()
            .filter(|l| l.timestamp >= since && matches_user(l.user_id, user_id))
            .cloned()
            .collect())
    }

    async fn solar_readings_since(
        &self,
        since: DateTime<Utc>,
        user_id: Option<Uuid>,
    ) -> StoreResult<Vec<SolarReading>> {
        let tables = self.tables.read();
        Ok(tables
            .solar_data
            .iter()
            .filter(|r| r.timestamp >= since && matches_user(r.user_id, user_id))
            .cloned()
            .collect())
    }

    async fn realtime_points_since(&self, since: DateTime<Utc>) -> StoreResult<Vec<RealtimePoint>> {
        let tables = self.tables.read();
        Ok(tables
            .realtime
            .iter()
            .filter(|p| p.timestamp >= since)
            .cloned()
            .collect())
    }

    async fn purge_demo_before(&self, cutoff: DateTime<Utc>) -> StoreResult<(usize, usize)> {
        let (logs, solar) = {
            let mut tables = self.tables.write();
            let before_logs = tables.energy_logs.len();
            tables
                .energy_logs
                .retain(|l| !(l.is_demo && l.timestamp < cutoff));
            let before_solar = tables.solar_data.len();
            tables
                .solar_data
                .retain(|r| !(r.is_demo && r.timestamp < cutoff));
            (
                before_logs - tables.energy_logs.len(),
                before_solar - tables.solar_data.len(),
            )
        };
        if logs > 0 {
            self.emit(ChangeTable::EnergyLogs, ChangeOp::Delete, None);
        }
        if solar > 0 {
            self.emit(ChangeTable::SolarData, ChangeOp::Delete, None);
        }
        debug!(%cutoff, energy_logs = logs, solar_data = solar, "purged demo energy rows");
        Ok((logs, solar))
    }

    async fn purge_realtime_before(&self, cutoff: DateTime<Utc>) -> StoreResult<usize> {
        let removed = {
            let mut tables = self.tables.write();
            // Rows are kept sorted, so the stale ones form a prefix.
            let stale = tables.realtime.partition_point(|p| p.timestamp < cutoff);
            tables.realtime.drain(..stale);
            stale
        };
        if removed > 0 {
            self.emit(ChangeTable::RealtimeEnergy, ChangeOp::Delete, None);
        }
        Ok(removed)
    }
}

#[async_trait]
impl AlertRepository for MemoryStore {
    async fn insert_alert(&self, alert: Alert) -> StoreResult<Alert> {
        if alert.title.trim().is_empty() {
            return Err(StoreError::InvalidRecord("alert title is empty".to_string()));
        }
        insert_sorted(&mut self.tables.write().alerts, alert.clone(), |a| a.created_at);
        self.emit(ChangeTable::Alerts, ChangeOp::Insert, Some(alert.id));
        Ok(alert)
    }

    async fn list_alerts(&self, limit: Option<usize>) -> StoreResult<Vec<Alert>> {
        let tables = self.tables.read();
        let newest_first = tables.alerts.iter().rev().cloned();
        Ok(match limit {
            Some(n) => newest_first.take(n).collect(),
            None => newest_first.collect(),
        })
    }

    async fn unread_count(&self) -> StoreResult<usize> {
        Ok(self.tables.read().alerts.iter().filter(|a| !a.is_read).count())
    }

    async fn mark_read(&self, id: Uuid) -> StoreResult<Alert> {
        let alert = {
            let mut tables = self.tables.write();
            let alert = tables
                .alerts
                .iter_mut()
                .find(|a| a.id == id)
                .ok_or(StoreError::NotFound {
                    table: ChangeTable::Alerts,
                    id,
                })?;
            alert.is_read = true;
            alert.clone()
        };
        self.emit(ChangeTable::Alerts, ChangeOp::Update, Some(id));
        Ok(alert)
    }

    async fn mark_all_read(&self) -> StoreResult<usize> {
        let updated = {
            let mut tables = self.tables.write();
            let mut updated = 0;
            for alert in tables.alerts.iter_mut().filter(|a| !a.is_read) {
                alert.is_read = true;
                updated += 1;
            }
            updated
        };
        if updated > 0 {
            self.emit(ChangeTable::Alerts, ChangeOp::Update, None);
        }
        Ok(updated)
    }

    async fn delete_alert(&self, id: Uuid) -> StoreResult<()> {
        {
            let mut tables = self.tables.write();
            let before = tables.alerts.len();
            tables.alerts.retain(|a| a.id != id);
            if tables.alerts.len() == before {
                return Err(StoreError::NotFound {
                    table: ChangeTable::Alerts,
                    id,
                });
            }
        }
        self.emit(ChangeTable::Alerts, ChangeOp::Delete, Some(id));
        Ok(())
    }

    async fn purge_demo_alerts_before(&self, cutoff: DateTime<Utc>) -> StoreResult<usize> {
        let removed = {
            let mut tables = self.tables.write();
            let before = tables.alerts.len();
            tables
                .alerts
                .retain(|a| !(a.is_demo && a.created_at < cutoff));
            before - tables.alerts.len()
        };
        if removed > 0 {
            self.emit(ChangeTable::Alerts, ChangeOp::Delete, None);
        }
        Ok(removed)
    }
}

#[async_trait]
impl HistoryRepository for MemoryStore {
    async fn insert_backfill(&self, batch: BackfillBatch) -> StoreResult<RecordsCreated> {
        for log in &batch.energy_logs {
            ensure_finite("consumption_kw", log.consumption_kw)?;
        }
        for reading in &batch.solar_data {
            ensure_finite("generation_kw", reading.generation_kw)?;
        }
        for raw in &batch.raw_energy_data {
            ensure_finite("power_kw", raw.power_kw)?;
        }

        let created = RecordsCreated {
            energy_logs: batch.energy_logs.len(),
            solar_data: batch.solar_data.len(),
            weather_data: batch.weather_data.len(),
            grid_prices: batch.grid_prices.len(),
            co2_data: batch.co2_data.len(),
            raw_energy_data: batch.raw_energy_data.len(),
            processed_features: batch.processed_features.len(),
        };

        {
            let mut tables = self.tables.write();
            for log in batch.energy_logs {
                insert_sorted(&mut tables.energy_logs, log, |l| l.timestamp);
            }
            for reading in batch.solar_data {
                insert_sorted(&mut tables.solar_data, reading, |r| r.timestamp);
            }
            tables.weather_data.extend(batch.weather_data);
            tables.grid_prices.extend(batch.grid_prices);
            tables.co2_data.extend(batch.co2_data);
            tables.raw_energy_data.extend(batch.raw_energy_data);
            tables.processed_features.extend(batch.processed_features);
        }

        let counts = [
            (ChangeTable::EnergyLogs, created.energy_logs),
            (ChangeTable::SolarData, created.solar_data),
            (ChangeTable::WeatherData, created.weather_data),
            (ChangeTable::GridPrices, created.grid_prices),
            (ChangeTable::Co2Data, created.co2_data),
            (ChangeTable::RawEnergyData, created.raw_energy_data),
            (ChangeTable::ProcessedFeatures, created.processed_features),
        ];
        for (table, n) in counts {
            if n > 0 {
                self.emit(table, ChangeOp::Insert, None);
            }
        }
        Ok(created)
    }
}

#[async_trait]
impl GamificationRepository for MemoryStore {
    async fn has_achievement(&self, user_id: Uuid, kind: AchievementKind) -> StoreResult<bool> {
        let tables = self.tables.read();
        Ok(tables
            .achievements
            .iter()
            .any(|a| a.user_id == user_id && a.kind == kind))
    }

    async fn award(&self, achievement: Achievement) -> StoreResult<bool> {
        let id = achievement.id;
        {
            let mut tables = self.tables.write();
            if tables
                .achievements
                .iter()
                .any(|a| a.user_id == achievement.user_id && a.kind == achievement.kind)
            {
                return Ok(false);
            }
            tables.achievements.push(achievement);
        }
        self.emit(ChangeTable::Achievements, ChangeOp::Insert, Some(id));
        Ok(true)
    }

    async fn points(&self, user_id: Uuid) -> StoreResult<UserPoints> {
        let total_points = self.tables.read().points.get(&user_id).copied().unwrap_or(0);
        Ok(UserPoints {
            user_id,
            total_points,
        })
    }

    async fn add_points(&self, user_id: Uuid, points: u32) -> StoreResult<UserPoints> {
        let total_points = {
            let mut tables = self.tables.write();
            let entry = tables.points.entry(user_id).or_insert(0);
            *entry = entry.saturating_add(points);
            *entry
        };
        self.emit(ChangeTable::UserPoints, ChangeOp::Update, Some(user_id));
        Ok(UserPoints {
            user_id,
            total_points,
        })
    }
}

impl ChangeFeed for MemoryStore {
    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }
}
