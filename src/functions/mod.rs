//! Backend functions invoked by the dashboard: the demo energy simulation
//! run, historical backfill and the achievement check.

use thiserror::Error;

use crate::repo::StoreError;

pub mod backfill;
pub mod energy_simulation;
pub mod gamification;

pub use backfill::{backfill, BackfillGenerator, BackfillRequest, BackfillResponse};
pub use energy_simulation::{
    record_sample, run_energy_simulation, EnergySimulationResponse, RecordOutcome, SimulationData,
};
pub use gamification::{check_gamification, GamificationOutcome, GamificationRules};

#[derive(Debug, Error)]
pub enum FunctionError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("invalid request: {0}")]
    Validation(#[from] validator::ValidationErrors),
}
