use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::domain::{
    DeviceStatus, RealtimePoint, Recurrence, ScheduledTask, SimulatedDevice, TaskAction,
};
use crate::functions::{
    self, BackfillGenerator, BackfillRequest, EnergySimulationResponse, FunctionError,
    GamificationOutcome,
};
use crate::prefs::PreferencesService;
use crate::repo::{PurgeCounts, RecordsCreated, Repositories, StoreResult};
use crate::series::{self, ReconciledSeries};
use crate::simulation::{
    AlertEvaluator, Environment, SimulationClock, SimulationError, SimulationState, TickReport,
};

/// Shared context handed to every handler and background task
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub repos: Repositories,
    pub simulation: Arc<SimulationController>,
    pub prefs: PreferencesService,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(cfg: Config) -> Self {
        Self::with_repositories(cfg, Repositories::in_memory())
    }

    pub fn with_repositories(cfg: Config, repos: Repositories) -> Self {
        let now = Utc::now();
        let simulation = Arc::new(SimulationController::new(&cfg, repos.clone(), now));
        Self {
            cfg: Arc::new(cfg),
            repos,
            simulation,
            prefs: PreferencesService::in_memory(),
            started_at: now,
        }
    }
}

/// Drives the simulation clock on a fixed interval
pub fn spawn_simulation_task(state: AppState) -> JoinHandle<()> {
    let controller = state.simulation.clone();
    let every = state.cfg.tick_interval();
    tokio::spawn(async move { controller.run(every).await })
}

/// Owner of the single simulation session and the on-demand functions.
pub struct SimulationController {
    clock: RwLock<SimulationClock>,
    on_demand: Mutex<Environment>,
    backfill: Mutex<BackfillGenerator>,
    evaluator: AlertEvaluator,
    repos: Repositories,
    cfg: Config,
}

impl SimulationController {
    pub fn new(cfg: &Config, repos: Repositories, now: DateTime<Utc>) -> Self {
        let mut clock = SimulationClock::new(cfg.clock_config(), now);
        if cfg.simulation.autostart {
            clock.start();
        }
        Self {
            clock: RwLock::new(clock),
            on_demand: Mutex::new(Environment::new(cfg.environment_config())),
            backfill: Mutex::new(BackfillGenerator::new(cfg.environment_config())),
            evaluator: AlertEvaluator::new(cfg.alerts),
            repos,
            cfg: cfg.clone(),
        }
    }

    pub async fn run(&self, every: std::time::Duration) {
        let mut interval = tokio::time::interval(every.max(std::time::Duration::from_millis(100)));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        interval.tick().await;
        let mut last = tokio::time::Instant::now();
        info!(every_ms = every.as_millis() as u64, "simulation clock task started");
        loop {
            interval.tick().await;
            let now = tokio::time::Instant::now();
            let elapsed = now.duration_since(last);
            last = now;
            if let Err(e) = self.tick(elapsed).await {
                warn!(error = %e, "failed to persist simulation tick");
            }
        }
    }

    /// Advance the clock by a wall-clock interval and persist the outcome.
    /// A stopped clock does nothing.
    pub async fn tick(&self, elapsed: std::time::Duration) -> StoreResult<Option<TickReport>> {
        let report = self.clock.write().await.tick(elapsed);
        match report {
            Some(report) => {
                self.persist_tick(&report).await?;
                Ok(Some(report))
            }
            None => Ok(None),
        }
    }

    async fn persist_tick(&self, report: &TickReport) -> StoreResult<PurgeCounts> {
        self.repos
            .energy
            .insert_realtime_point(RealtimePoint {
                id: Uuid::new_v4(),
                timestamp: report.at,
                consumption_kw: report.sample.consumption_kw,
                solar_kw: report.sample.solar_kw,
            })
            .await?;
        for alert in &report.alerts {
            self.repos
                .alerts
                .insert_alert(alert.clone().into_alert(report.at, true))
                .await?;
        }
        let purged = self
            .repos
            .purge_demo_before(report.at - self.cfg.retention())
            .await?;
        if purged.total() > 0 {
            debug!(
                realtime_energy = purged.realtime_energy,
                alerts = purged.alerts,
                "expired rows purged after tick"
            );
        }
        Ok(purged)
    }

    pub async fn snapshot(&self) -> SimulationState {
        self.clock.read().await.state().clone()
    }

    /// Reference instant for series queries; the simulation may run ahead of
    /// the wall clock.
    pub async fn series_anchor(&self) -> DateTime<Utc> {
        let sim_time = self.clock.read().await.state().current_time;
        sim_time.max(Utc::now())
    }

    pub async fn start(&self) -> SimulationState {
        let mut clock = self.clock.write().await;
        clock.start();
        info!(speed = clock.state().speed_multiplier, "simulation started");
        clock.state().clone()
    }

    pub async fn stop(&self) -> SimulationState {
        let mut clock = self.clock.write().await;
        clock.stop();
        info!("simulation stopped");
        clock.state().clone()
    }

    pub async fn set_speed(&self, multiplier: f64) -> Result<SimulationState, SimulationError> {
        let mut clock = self.clock.write().await;
        clock.set_speed(multiplier)?;
        info!(speed = multiplier, "simulation speed changed");
        Ok(clock.state().clone())
    }

    pub async fn reset(&self, now: DateTime<Utc>) -> SimulationState {
        let mut clock = self.clock.write().await;
        clock.reset(now);
        info!(%now, "simulation reset");
        clock.state().clone()
    }

    pub async fn add_device(&self, template_id: &str) -> Result<SimulatedDevice, SimulationError> {
        let device = self.clock.write().await.add_device(template_id)?;
        info!(device_id = %device.id, template = template_id, "device added");
        Ok(device)
    }

    pub async fn remove_device(&self, id: Uuid) -> Result<(), SimulationError> {
        self.clock.write().await.remove_device(id)
    }

    pub async fn set_device_status(
        &self,
        id: Uuid,
        status: DeviceStatus,
    ) -> Result<SimulatedDevice, SimulationError> {
        self.clock.write().await.set_device_status(id, status)
    }

    pub async fn schedule_task(
        &self,
        device_id: Uuid,
        action: TaskAction,
        scheduled_time: DateTime<Utc>,
        value: Option<f64>,
        recurrence: Option<Recurrence>,
    ) -> Result<ScheduledTask, SimulationError> {
        self.clock
            .write()
            .await
            .schedule_task(device_id, action, scheduled_time, value, recurrence)
    }

    pub async fn cancel_task(&self, device_id: Uuid, task_id: Uuid) -> Result<(), SimulationError> {
        self.clock.write().await.cancel_task(device_id, task_id)
    }

    /// `energy-simulation` function: one sample at `now`, persisted as demo data
    pub async fn simulate_once(&self, now: DateTime<Utc>) -> StoreResult<EnergySimulationResponse> {
        let mut env = self.on_demand.lock().await;
        functions::run_energy_simulation(&self.repos, &mut env, &self.evaluator, now, self.cfg.retention())
            .await
    }

    pub async fn backfill(
        &self,
        request: &BackfillRequest,
        now: DateTime<Utc>,
    ) -> Result<RecordsCreated, FunctionError> {
        let mut generator = self.backfill.lock().await;
        functions::backfill(&self.repos, &mut generator, request, now).await
    }

    pub async fn check_gamification(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<GamificationOutcome, FunctionError> {
        functions::check_gamification(
            &self.repos,
            user_id,
            now,
            &self.cfg.reconcile_config(),
            &self.cfg.gamification,
        )
        .await
    }

    pub async fn series(&self, user_id: Option<Uuid>) -> StoreResult<ReconciledSeries> {
        let anchor = self.series_anchor().await;
        series::load_series(&self.repos, anchor, &self.cfg.reconcile_config(), user_id).await
    }
}
