//! Residential energy dashboard backend.
//!
//! A weather, solar, consumption and pricing simulation feeding advisory
//! alerts, a reconciliation layer that turns stored records into chartable
//! series, and the HTTP surface the dashboard talks to.

pub mod api;
pub mod config;
pub mod controller;
pub mod domain;
pub mod functions;
pub mod prefs;
pub mod repo;
pub mod series;
pub mod simulation;
pub mod telemetry;
